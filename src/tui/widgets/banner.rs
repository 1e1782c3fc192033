//! ASCII wordmark for the home screen.

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph};

use crate::tui::theme::Theme;

const WORDMARK_FULL: &[&str] = &[
    "  ___ _  _ ___  ___  __  __   _     ___ ___ ___   _   _    _    ",
    " / __| || | _ \\/ _ \\|  \\/  | /_\\   | _ \\ __/ __| /_\\ | |  | |   ",
    "| (__| __ |   / (_) | |\\/| |/ _ \\  |   / _| (__ / _ \\| |__| |__ ",
    " \\___|_||_|_|_\\\\___/|_|  |_/_/ \\_\\ |_|_\\___\\___/_/ \\_\\____|____|",
];

const WORDMARK_COMPACT: &str = "CHROMA RECALL";

const WORDMARK_FULL_MIN_WIDTH: u16 = 66;
const WORDMARK_FULL_HEIGHT: u16 = 4;

/// Each row of the wordmark gets its own hue so the banner reads as a spectrum.
const ROW_HUES: [f64; 4] = [200.0, 260.0, 320.0, 20.0];

pub(crate) fn draw_banner(area: Rect, f: &mut ratatui::Frame, theme: &Theme) {
    f.render_widget(Clear, area);

    let use_full = area.width >= WORDMARK_FULL_MIN_WIDTH && area.height >= WORDMARK_FULL_HEIGHT;
    let lines = if use_full {
        WORDMARK_FULL
            .iter()
            .zip(ROW_HUES)
            .map(|(line, hue)| {
                let color = chroma_recall::Color::from_hsl(chroma_recall::color::Hsl::new(
                    hue, 85.0, 62.0,
                ));
                Line::from(Span::styled(
                    *line,
                    Style::default()
                        .fg(Theme::swatch(color))
                        .add_modifier(Modifier::BOLD),
                ))
            })
            .collect::<Vec<_>>()
    } else {
        vec![Line::from(Span::styled(
            WORDMARK_COMPACT,
            Style::default()
                .fg(theme.oracle)
                .add_modifier(Modifier::BOLD),
        ))]
    };

    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}
