//! Error and info pop-ups drawn over the screen underneath.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Clear;

use crate::tui::state::{App, ModalKind};
use crate::tui::theme::Theme;
use crate::tui::widgets::card::CardWidget;

const MIN_WIDTH: u16 = 36;
const MAX_WIDTH: u16 = 72;
/// Borders, the blank lines around the message and the hint line.
const CHROME_HEIGHT: u16 = 5;

pub(crate) fn draw_modal(area: Rect, f: &mut ratatui::Frame, app: &App, theme: Theme) {
    let Some(modal) = &app.error_modal else {
        return;
    };

    let (badge, color) = match modal.kind {
        ModalKind::Error => ("error", theme.critical),
        ModalKind::Info => ("info", theme.oracle),
    };

    let popup = popup_rect(area, &modal.message);
    f.render_widget(Clear, popup);

    let mut card = CardWidget::new(&modal.title)
        .badge(badge, color)
        .border_color(color)
        .line(Line::from(""));
    for line in modal.message.lines() {
        card = card.line(Line::from(Span::styled(
            format!(" {line}"),
            Style::default().fg(theme.text),
        )));
    }
    card.line(Line::from(""))
        .line(Line::from(Span::styled(
            " Enter/Esc to continue",
            Style::default()
                .fg(theme.muted)
                .add_modifier(Modifier::ITALIC),
        )))
        .render(popup, f, &theme);
}

/// Wide enough for the longest message line (within limits), tall enough for
/// the wrapped message, centered and clipped to `area`.
fn popup_rect(area: Rect, message: &str) -> Rect {
    let longest = message.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = (longest.saturating_add(4).min(u16::MAX as usize) as u16)
        .clamp(MIN_WIDTH, MAX_WIDTH)
        .min(area.width);

    let inner = width.saturating_sub(2).max(1) as usize;
    let rows: usize = message
        .lines()
        .map(|l| (l.chars().count() + 1).div_ceil(inner))
        .sum();
    let height = (rows.min(u16::MAX as usize) as u16)
        .saturating_add(CHROME_HEIGHT)
        .min(area.height);

    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_gets_minimum_centered_popup() {
        let popup = popup_rect(Rect::new(0, 0, 100, 40), "Scores will not be saved.");
        assert_eq!(popup.width, MIN_WIDTH);
        assert_eq!(popup.height, 1 + CHROME_HEIGHT);
        assert_eq!(popup.x, (100 - MIN_WIDTH) / 2);
        assert_eq!(popup.y, (40 - popup.height) / 2);
    }

    #[test]
    fn test_long_message_wraps_and_is_clipped() {
        let long = "x".repeat(200);

        let roomy = popup_rect(Rect::new(0, 0, 80, 40), &long);
        assert_eq!(roomy.width, MAX_WIDTH);
        assert_eq!(roomy.height, 3 + CHROME_HEIGHT);

        let cramped = popup_rect(Rect::new(2, 1, 30, 6), &long);
        assert_eq!(cramped.width, 30);
        assert_eq!(cramped.height, 6);
        assert_eq!((cramped.x, cramped.y), (2, 1));
    }
}
