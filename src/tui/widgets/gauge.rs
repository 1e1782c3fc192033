//! Horizontal countdown gauge bar.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::theme::Theme;

#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_gauge(
    area: Rect,
    f: &mut ratatui::Frame,
    theme: &Theme,
    label: &str,
    value: f64,
    max: f64,
    suffix: &str,
    fill: Color,
) {
    let label_width = 12;
    let suffix_str = format!(" {:>8}", suffix);
    let bar_width = (area.width as usize)
        .saturating_sub(label_width)
        .saturating_sub(suffix_str.chars().count());

    let ratio = if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (bar_width as f64 * ratio).round() as usize;
    let empty = bar_width.saturating_sub(filled);

    let line = Line::from(vec![
        Span::styled(
            format!("{:<width$}", label, width = label_width),
            Style::default().fg(theme.text),
        ),
        Span::styled("█".repeat(filled), Style::default().fg(fill)),
        Span::styled("░".repeat(empty), Style::default().fg(theme.muted)),
        Span::styled(suffix_str, Style::default().fg(theme.text)),
    ]);

    f.render_widget(Paragraph::new(line), area);
}
