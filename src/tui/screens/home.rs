//! Home screen drawing.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, Paragraph, Wrap};

use crate::tui::state::{App, HomeChoice};
use crate::tui::theme::Theme;
use crate::tui::widgets::banner::draw_banner;
use crate::tui::widgets::footer::draw_footer;

pub(crate) fn draw_home(area: Rect, f: &mut ratatui::Frame, app: &App, theme: Theme) {
    // Keep the menu usable even in short terminals by shrinking the banner/tagline first.
    let min_menu_h: u16 = 3;
    let footer_h: u16 = if area.height >= 1 { 1 } else { 0 };
    let mut banner_h: u16 = 5.min(area.height);
    let mut tagline_h: u16 = 2.min(area.height.saturating_sub(banner_h));

    let target_fixed_max = area.height.saturating_sub(min_menu_h);
    while banner_h.saturating_add(tagline_h).saturating_add(footer_h) > target_fixed_max {
        if tagline_h > 0 {
            tagline_h = tagline_h.saturating_sub(1);
            continue;
        }
        if banner_h > 1 {
            banner_h = banner_h.saturating_sub(1);
            continue;
        }
        break;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_h),
            Constraint::Length(tagline_h),
            Constraint::Min(0),
            Constraint::Length(footer_h),
        ])
        .split(area);

    draw_banner(layout[0], f, &theme);

    if layout[1].height > 0 {
        let best = if app.personal_best > 0 {
            format!("  Personal best: {}", app.personal_best)
        } else {
            String::new()
        };
        let tagline = Paragraph::new(Text::from(vec![Line::from(vec![
            Span::styled(
                "Memorize the color. Find it again before the clock runs out.",
                Style::default().fg(theme.text_dim),
            ),
            Span::styled(best, Style::default().fg(theme.optimal)),
        ])]))
        .wrap(Wrap { trim: true });
        f.render_widget(tagline, layout[1]);
    }

    let items = HomeChoice::ALL
        .into_iter()
        .map(|choice| {
            let (label, desc) = match choice {
                HomeChoice::Play => ("Play", "Start a new game at level 1"),
                HomeChoice::Leaderboard => ("Leaderboard", "Top scores on this machine"),
                HomeChoice::Quit => ("Quit", "Exit the game"),
            };
            let selected = choice == app.home_choice;
            let label_style = if selected {
                Style::default()
                    .fg(theme.oracle)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text)
            };
            let selector = if selected { "›" } else { " " };

            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!(" {selector} "), label_style),
                    Span::styled(label, label_style),
                ]),
                Line::from(vec![
                    Span::raw("     "),
                    Span::styled(desc, Style::default().fg(theme.muted)),
                ]),
            ])
        })
        .collect::<Vec<_>>();

    let menu_widget = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border)),
    );
    f.render_widget(menu_widget, layout[2]);

    if layout[3].height > 0 {
        draw_footer(
            layout[3],
            f,
            &theme,
            &[
                ("↑/↓", "Navigate"),
                ("Enter", "Select"),
                ("P", "Play"),
                ("L", "Leaderboard"),
                ("Esc", "Quit"),
            ],
        );
    }
}
