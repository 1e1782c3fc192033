//! Keybind footer bar and the toast line above it.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::state::Toast;
use crate::tui::theme::Theme;

pub(crate) fn draw_footer(
    area: Rect,
    f: &mut ratatui::Frame,
    theme: &Theme,
    hints: &[(&str, &str)],
) {
    let mut spans = Vec::new();
    for (i, (key, action)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(theme.muted)));
        }
        spans.push(Span::styled(*key, Style::default().fg(theme.oracle)));
        spans.push(Span::styled(
            format!(" {action}"),
            Style::default().fg(theme.muted),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub(crate) fn draw_toast(area: Rect, f: &mut ratatui::Frame, theme: &Theme, toast: Option<&Toast>) {
    let Some(toast) = toast else {
        return;
    };
    let line = Line::from(vec![
        Span::styled("● ", Style::default().fg(theme.oracle)),
        Span::styled(
            toast.notification.title.as_str(),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", toast.notification.description),
            Style::default().fg(theme.text_dim),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}
