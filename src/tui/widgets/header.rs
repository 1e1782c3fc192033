//! Top header bar with title and context.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::theme::Theme;

pub(crate) fn draw_header(
    area: Rect,
    f: &mut ratatui::Frame,
    theme: &Theme,
    context: Option<&str>,
    player: &str,
) {
    let mut spans = vec![Span::styled(
        "CHROMA RECALL",
        Style::default()
            .fg(theme.oracle)
            .add_modifier(Modifier::BOLD),
    )];

    if let Some(ctx) = context {
        spans.push(Span::styled(
            format!("  //  {ctx}"),
            Style::default().fg(theme.text_dim),
        ));
    }

    let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let tag = format!("@{player}");
    let gap = (area.width as usize).saturating_sub(used + tag.chars().count());
    if gap > 1 {
        spans.push(Span::raw(" ".repeat(gap)));
        spans.push(Span::styled(tag, Style::default().fg(theme.muted)));
    }

    let header_line = Line::from(spans);
    let rule = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(theme.border),
    ));

    f.render_widget(Paragraph::new(vec![header_line, rule]), area);
}
