//! Solid color blocks for targets and options.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use chroma_recall::Color;

use crate::tui::theme::Theme;

const MAX_COLUMNS: usize = 5;

pub(crate) fn draw_swatch(
    area: Rect,
    f: &mut ratatui::Frame,
    theme: &Theme,
    color: Color,
    label: Option<&str>,
    selected: bool,
) {
    let (border_color, border_type) = if selected {
        (theme.oracle, BorderType::Thick)
    } else {
        (theme.border, BorderType::Rounded)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(Theme::swatch(color)));

    let mut lines = Vec::new();
    let inner_height = area.height.saturating_sub(2) as usize;
    lines.extend(std::iter::repeat(Line::from("")).take(inner_height.saturating_sub(1) / 2));
    if let Some(label) = label {
        lines.push(Line::from(Span::styled(
            label,
            Style::default()
                .fg(Theme::swatch_text(color))
                .add_modifier(Modifier::BOLD),
        )));
    }

    let para = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block);
    f.render_widget(para, area);
}

/// Options laid out in rows of up to five, numbered for the digit keys.
pub(crate) fn draw_swatch_grid(
    area: Rect,
    f: &mut ratatui::Frame,
    theme: &Theme,
    options: &[Color],
    cursor: usize,
) {
    if options.is_empty() {
        return;
    }
    let columns = options.len().min(MAX_COLUMNS);
    let rows = options.len().div_ceil(columns);

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(area);

    for (row, chunk) in options.chunks(columns).enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
            .split(row_areas[row]);

        for (col, color) in chunk.iter().enumerate() {
            let index = row * columns + col;
            let key = if index == 9 { 0 } else { index + 1 };
            draw_swatch(
                cells[col],
                f,
                theme,
                *color,
                Some(&key.to_string()),
                index == cursor,
            );
        }
    }
}
