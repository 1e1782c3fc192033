//! Top scores table.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Row, Table};

use crate::tui::state::App;
use crate::tui::theme::Theme;
use crate::tui::widgets::footer::draw_footer;

pub(crate) fn draw_leaderboard(area: Rect, f: &mut ratatui::Frame, app: &App, theme: Theme) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let block = Block::default()
        .title(Span::styled(
            format!(" Top {} ", app.leaderboard_capacity),
            Style::default().fg(theme.text_dim),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));

    if app.leaderboard_rows.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "  No scores yet. Finish a game to get on the board.",
            Style::default().fg(theme.muted),
        )))
        .block(block);
        f.render_widget(empty, layout[0]);
    } else {
        let header = Row::new(vec!["#", "Player", "Score", "Level", "When"]).style(
            Style::default()
                .fg(theme.text_dim)
                .add_modifier(Modifier::BOLD),
        );
        let rows = app
            .leaderboard_rows
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let mine = record.username == app.username;
                let style = if mine {
                    Style::default().fg(theme.oracle)
                } else {
                    Style::default().fg(theme.text)
                };
                Row::new(vec![
                    format!("{}", i + 1),
                    record.username.clone(),
                    record.score.to_string(),
                    record.level.to_string(),
                    record.recorded_at.format("%Y-%m-%d %H:%M").to_string(),
                ])
                .style(style)
            })
            .collect::<Vec<_>>();

        let table = Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Min(12),
                Constraint::Length(10),
                Constraint::Length(7),
                Constraint::Length(17),
            ],
        )
        .header(header)
        .block(block);
        f.render_widget(table, layout[0]);
    }

    draw_footer(
        layout[1],
        f,
        &theme,
        &[("R", "Refresh"), ("Esc", "Back")],
    );
}
