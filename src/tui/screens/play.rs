//! In-game screen: target reveal, option grid, countdown.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use chroma_recall::engine::Phase;

use crate::tui::animation::urgent_blink;
use crate::tui::state::App;
use crate::tui::theme::Theme;
use crate::tui::widgets::footer::{draw_footer, draw_toast};
use crate::tui::widgets::gauge::draw_gauge;
use crate::tui::widgets::swatch::{draw_swatch, draw_swatch_grid};

pub(crate) fn draw_play(area: Rect, f: &mut ratatui::Frame, app: &App, theme: Theme) {
    let snap = &app.snapshot;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // stats
            Constraint::Length(1), // countdown
            Constraint::Length(1), // prompt
            Constraint::Min(3),    // swatches
            Constraint::Length(1), // toast
            Constraint::Length(1), // footer
        ])
        .split(area);

    // Stats line
    let budget = if snap.boss_level {
        app.boss_close_budget
    } else {
        app.close_budget
    };
    let mut stats = vec![
        Span::styled(
            format!("Level {}", snap.level),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ),
        Span::styled("   Score ", Style::default().fg(theme.text_dim)),
        Span::styled(snap.score.to_string(), Style::default().fg(theme.oracle)),
        Span::styled("   Combo ", Style::default().fg(theme.text_dim)),
        Span::styled(
            format!("{:.1}x", snap.combo_multiplier),
            Style::default().fg(theme.optimal),
        ),
        Span::styled("   Close ", Style::default().fg(theme.text_dim)),
        Span::styled(
            format!("{}/{}", snap.close_matches, budget),
            Style::default().fg(theme.caution),
        ),
        Span::styled("   Best ", Style::default().fg(theme.text_dim)),
        Span::styled(snap.high_score.to_string(), Style::default().fg(theme.text)),
    ];
    if snap.boss_level {
        stats.push(Span::styled(
            "   CHROMATIC CHALLENGE",
            Style::default().fg(theme.boss).add_modifier(Modifier::BOLD),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(stats)), layout[0]);

    // Countdown
    let total = snap.phase_duration();
    let label = match snap.phase {
        Phase::ShowingTarget => "Memorize",
        Phase::AwaitingSelection => "Choose",
        _ => "",
    };
    let fill = if urgent_blink(app.animation.tick, snap.time_left)
        && snap.phase == Phase::AwaitingSelection
    {
        theme.critical
    } else {
        theme.time_color(snap.time_left, total)
    };
    draw_gauge(
        layout[1],
        f,
        &theme,
        label,
        snap.time_left as f64,
        total as f64,
        &format!("{}s", snap.time_left),
        fill,
    );

    // Prompt + swatches
    let prompt = match snap.phase {
        Phase::ShowingTarget => format!("{} Remember this color.", app.animation.spinner_char()),
        Phase::AwaitingSelection => {
            format!("Which one was it? ({} options)", snap.options.len())
        }
        Phase::Ended | Phase::Idle => String::new(),
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            prompt,
            Style::default().fg(theme.text_dim),
        ))),
        layout[2],
    );

    match (snap.phase, snap.visible_target()) {
        (Phase::ShowingTarget, Some(target)) => {
            let centered = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(25),
                    Constraint::Percentage(50),
                    Constraint::Percentage(25),
                ])
                .split(layout[3]);
            draw_swatch(centered[1], f, &theme, target, None, false);
        }
        (Phase::AwaitingSelection, _) => {
            draw_swatch_grid(layout[3], f, &theme, &snap.options, app.cursor);
        }
        _ => {}
    }

    draw_toast(layout[4], f, &theme, app.toast.as_ref());

    let hints: &[(&str, &str)] = match snap.phase {
        Phase::AwaitingSelection => &[
            ("1-9/0", "Pick"),
            ("←/→", "Move"),
            ("Enter", "Pick"),
            ("Esc", "Abandon"),
        ],
        _ => &[("Esc", "Abandon")],
    };
    draw_footer(layout[5], f, &theme, hints);
}
