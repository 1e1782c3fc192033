//! End-of-session summary.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use chroma_recall::engine::EndReason;

use crate::tui::animation::{GAME_OVER_CROSS, SUCCESS_CHECKMARK};
use crate::tui::state::App;
use crate::tui::theme::Theme;
use crate::tui::widgets::card::CardWidget;
use crate::tui::widgets::footer::{draw_footer, draw_toast};
use crate::tui::widgets::swatch::draw_swatch;

pub(crate) fn draw_game_over(area: Rect, f: &mut ratatui::Frame, app: &App, theme: Theme) {
    let snap = &app.snapshot;
    let accent = theme.end_color(snap.end_reason);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // art + headline
            Constraint::Min(8),    // summary + colors
            Constraint::Length(1), // toast
            Constraint::Length(1), // footer
        ])
        .split(area);

    let art = if snap.end_reason == Some(EndReason::Completed) {
        SUCCESS_CHECKMARK
    } else {
        GAME_OVER_CROSS
    };
    let headline = snap
        .end_reason
        .map(|reason| reason.describe())
        .unwrap_or("Game over");
    let mut lines: Vec<Line> = art
        .iter()
        .map(|row| Line::from(Span::styled(*row, Style::default().fg(accent))))
        .collect();
    if let Some(first) = lines.first_mut() {
        first.spans.push(Span::styled(
            format!("   {headline}"),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ));
    }
    f.render_widget(Paragraph::new(lines), layout[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(layout[1]);

    let mut card = CardWidget::new("Summary")
        .border_color(accent)
        .stat(&theme, "Final score", snap.score.to_string(), theme.oracle)
        .stat(&theme, "Level reached", snap.level.to_string(), theme.text)
        .stat(&theme, "High score", snap.high_score.to_string(), theme.text);
    if app.new_personal_best {
        card = card.badge("New best", theme.optimal);
    }
    if let Some(saved) = app.last_save {
        let color = if saved.is_top_ten {
            theme.optimal
        } else {
            theme.text
        };
        card = card.stat(&theme, "Leaderboard", format!("#{}", saved.rank), color);
    }
    if let Some(outcome) = app.last_outcome.as_ref().filter(|o| o.game_over) {
        card = card.stat(
            &theme,
            "Last pick",
            format!("ΔE {:.2}", outcome.distance),
            theme.verdict_color(outcome.verdict, snap.boss_level),
        );
    }
    card.render(body[0], f, &theme);

    // Target next to the last pick so the miss is visible.
    let colors = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(body[1]);
    if let Some(target) = snap.visible_target() {
        draw_swatch(colors[0], f, &theme, target, Some(&format!("target {target}")), false);
    }
    let ended_on_pick = app.last_outcome.as_ref().is_some_and(|o| o.game_over);
    if let Some(picked) = app.last_pick.filter(|_| ended_on_pick) {
        draw_swatch(colors[1], f, &theme, picked, Some(&format!("picked {picked}")), false);
    }

    draw_toast(layout[2], f, &theme, app.toast.as_ref());
    draw_footer(
        layout[3],
        f,
        &theme,
        &[("Enter/R", "Play again"), ("L", "Leaderboard"), ("Esc", "Home")],
    );
}
