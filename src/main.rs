//! Chroma Recall - timed color memory game
//!
//! A target color is shown for a few seconds, then hidden among look-alikes.
//! Pick it back out before the clock runs out. Runs as a fullscreen terminal
//! UI, with a handful of CLI commands for inspecting the curve, the generator
//! and the local leaderboard.

mod tui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, IsTerminal};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use chroma_recall::config::{self, Config};
use chroma_recall::difficulty::{clamp_rating, CURVE_VERSION};
use chroma_recall::engine::Verdict;
use chroma_recall::storage::{LocalStorage, ScoreStore};
use chroma_recall::{distance, Color, GenerationWorker};

const LOG_ENV: &str = "CHROMA_RECALL_LOG";

/// Chroma Recall - how well do you remember a color?
#[derive(Parser)]
#[command(name = "chroma-recall")]
#[command(author = "ForgeMyPC")]
#[command(version)]
#[command(about = "Memorize a color, then find it again among look-alikes")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play in the fullscreen terminal UI (default)
    Play {
        /// Name recorded with your scores (overrides the config file)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show the local top scores
    Leaderboard {
        /// Number of entries to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Print round parameters for a range of levels
    Curve {
        #[arg(long, default_value_t = 1)]
        from: u32,

        #[arg(long, default_value_t = 20)]
        to: u32,

        /// Performance rating (clamped to 0.9-1.1)
        #[arg(long, default_value_t = 1.0)]
        rating: f64,
    },

    /// Generate sample color sets for a level
    Palette {
        #[arg(short, long, default_value_t = 1)]
        level: u32,

        /// Number of sets to generate
        #[arg(short, long, default_value_t = 3)]
        rounds: u32,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Perceptual distance (CIEDE2000) between two hex colors
    Distance {
        /// First color, e.g. "#3a7bd5"
        a: String,

        /// Second color
        b: String,

        /// Judge the pair with this level's tolerances
        #[arg(short, long, default_value_t = 1)]
        level: u32,
    },

    /// Show configuration file location and effective settings
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = Config::load().unwrap_or_else(|err| {
        eprintln!(
            "{} {:#}",
            "Could not load config, using defaults:".bright_yellow(),
            err
        );
        Config::default()
    });

    match cli.command {
        Some(Commands::Play { name }) => run_play(&cfg, name)?,
        None => run_play(&cfg, None)?,
        Some(Commands::Leaderboard { limit }) => {
            init_logging(LogTarget::Stderr)?;
            show_leaderboard(limit)?;
        }
        Some(Commands::Curve { from, to, rating }) => {
            init_logging(LogTarget::Stderr)?;
            show_curve(&cfg, from, to, rating);
        }
        Some(Commands::Palette {
            level,
            rounds,
            seed,
        }) => {
            init_logging(LogTarget::Stderr)?;
            show_palette(&cfg, level, rounds, seed)?;
        }
        Some(Commands::Distance { a, b, level }) => {
            init_logging(LogTarget::Stderr)?;
            show_distance(&cfg, &a, &b, level)?;
        }
        Some(Commands::Config) => {
            init_logging(LogTarget::Stderr)?;
            show_config_info(&cfg)?;
        }
    }

    Ok(())
}

enum LogTarget {
    Stderr,
    File(std::path::PathBuf),
}

fn init_logging(target: LogTarget) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    match target {
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .with_target(false)
                .init();
        }
        LogTarget::File(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
    }

    Ok(())
}

fn run_play(cfg: &Config, name: Option<String>) -> Result<()> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        println!(
            "{}",
            "The game needs an interactive terminal. Try `chroma-recall curve` or `chroma-recall palette` for non-interactive output."
                .bright_yellow()
        );
        return Ok(());
    }

    // Logging to stderr would tear the alternate screen.
    match LocalStorage::new() {
        Ok(storage) => init_logging(LogTarget::File(storage.log_path()))?,
        Err(_) => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("off"))
                .init();
        }
    }

    let username = name.unwrap_or_else(|| cfg.player.username.clone());
    let rt = tokio::runtime::Runtime::new()?;
    match tui::run_tui(&rt, cfg, username)? {
        tui::TuiExit::Quit => {}
    }
    Ok(())
}

fn show_leaderboard(limit: usize) -> Result<()> {
    let storage = LocalStorage::new()?;
    let rows = storage.top_scores(limit)?;

    println!("{}", "Chroma Recall Leaderboard\n".bright_cyan().bold());
    if rows.is_empty() {
        println!("{}", "No scores yet. Play a game to get on the board!".bright_yellow());
        return Ok(());
    }

    println!(
        "  {:>3}  {:<20} {:>10} {:>6}  {}",
        "#".bright_black(),
        "Player".bright_black(),
        "Score".bright_black(),
        "Level".bright_black(),
        "When".bright_black()
    );
    for (i, record) in rows.iter().enumerate() {
        let rank = format!("{:>3}", i + 1);
        let rank = match i {
            0 => rank.bright_yellow().bold(),
            1 | 2 => rank.bright_white().bold(),
            _ => rank.normal(),
        };
        println!(
            "  {}  {:<20} {:>10} {:>6}  {}",
            rank,
            record.username.bright_white(),
            record.score.to_string().bright_green(),
            record.level,
            record
                .recorded_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black()
        );
    }
    Ok(())
}

fn show_curve(cfg: &Config, from: u32, to: u32, rating: f64) {
    let curve = cfg.curve();
    let rating = clamp_rating(rating);
    let (from, to) = (from.max(1), to.max(from.max(1)));

    println!(
        "{} {}\n",
        format!("Difficulty curve v{CURVE_VERSION}").bright_cyan().bold(),
        format!("(rating {rating:.2})").bright_black()
    );
    println!(
        "  {:>5}  {:>7}  {:>10}  {:>6}  {:>8}",
        "Level".bright_black(),
        "Options".bright_black(),
        "Similarity".bright_black(),
        "View".bright_black(),
        "Select".bright_black()
    );
    for level in from..=to {
        let params = curve.params_for_rated(level, rating);
        let level_label = format!("{level:>5}");
        let level_label = if curve.is_boss_level(level) {
            level_label.bright_magenta().bold()
        } else {
            level_label.normal()
        };
        println!(
            "  {}  {:>7}  {:>10.4}  {:>5}s  {:>7}s",
            level_label,
            params.option_count,
            params.similarity,
            params.view_time_secs,
            params.selection_time_secs
        );
    }
}

fn show_palette(cfg: &Config, level: u32, rounds: u32, seed: Option<u64>) -> Result<()> {
    let curve = cfg.curve();
    let params = curve.params_for(level.max(1));
    let generator = cfg.generator();
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let rt = tokio::runtime::Runtime::new()?;
    let sets = rt.block_on(async {
        let worker = GenerationWorker::spawn_with_rng(generator, rng);
        let mut sets = Vec::new();
        for _ in 0..rounds {
            sets.push(worker.generate(params).await?);
        }
        Ok::<_, anyhow::Error>(sets)
    })?;

    println!(
        "{} {}\n",
        format!("Level {} palettes", level.max(1)).bright_cyan().bold(),
        format!(
            "({} options, similarity {:.3})",
            params.option_count, params.similarity
        )
        .bright_black()
    );

    for (round, set) in sets.iter().enumerate() {
        println!("{}", format!("Round {}", round + 1).bright_white().bold());
        for color in &set.options {
            let marker = if *color == set.target {
                "◀ target".bright_green().to_string()
            } else {
                format!("ΔE {:>6.2}", distance(set.target, *color))
                    .bright_black()
                    .to_string()
            };
            println!("  {}  {}  {}", swatch(*color), color, marker);
        }
        println!();
    }
    Ok(())
}

fn show_distance(cfg: &Config, a: &str, b: &str, level: u32) -> Result<()> {
    let first: Color = a.parse().with_context(|| format!("Invalid first color {a:?}"))?;
    let second: Color = b.parse().with_context(|| format!("Invalid second color {b:?}"))?;

    let d = distance(first, second);
    let params = cfg.curve().params_for(level.max(1));
    let tolerance = cfg.rules.close_tolerance(params.similarity);
    let verdict = Verdict::classify(d, cfg.rules.exact_epsilon, tolerance);

    println!("  {}  {}", swatch(first), first);
    println!("  {}  {}", swatch(second), second);
    println!("\n{} {:.4}", "ΔE00:".bright_cyan(), d);

    let verdict_label = match verdict {
        Verdict::Exact => "exact match".bright_green(),
        Verdict::Close => "close match".bright_yellow(),
        Verdict::Mismatch => "mismatch".bright_red(),
    };
    println!(
        "{} {} {}",
        format!("At level {}:", level.max(1)).bright_cyan(),
        verdict_label,
        format!(
            "(exact < {:.2}, close < {:.2})",
            cfg.rules.exact_epsilon, tolerance
        )
        .bright_black()
    );
    Ok(())
}

fn show_config_info(cfg: &Config) -> Result<()> {
    println!("{}", "Chroma Recall Configuration\n".bright_cyan().bold());

    match config::get_config_path() {
        Ok(path) => {
            println!("{} {}", "Config file:".bright_yellow(), path.bright_white());
            if std::path::Path::new(&path).exists() {
                println!("  {} {}", "Status:".bright_cyan(), "Exists".bright_green());
            } else {
                println!(
                    "  {} {}",
                    "Status:".bright_cyan(),
                    "Not created yet (will use defaults)".bright_yellow()
                );
            }
        }
        Err(e) => {
            println!(
                "{} Could not determine config path: {}",
                "Error:".bright_red(),
                e
            );
        }
    }
    if let Err(err) = Config::init() {
        println!(
            "  {} {}",
            "Note:".bright_yellow(),
            format!("Could not create config file yet: {err}").bright_black()
        );
    }

    match LocalStorage::new() {
        Ok(storage) => println!(
            "{} {}",
            "Data directory:".bright_yellow(),
            storage.data_dir().display().to_string().bright_white()
        ),
        Err(err) => println!(
            "{} {}",
            "Data directory:".bright_yellow(),
            err.to_string().bright_red()
        ),
    }

    println!("\n{}", "Player:".bright_white().bold());
    println!("  {} {}", "Username:".bright_cyan(), cfg.player.username.bright_white());

    println!("\n{}", "Rules:".bright_white().bold());
    println!("  {} {}", "Exact match below:".bright_cyan(), cfg.rules.exact_epsilon);
    println!(
        "  {} {} + {} x (1 - similarity)",
        "Close tolerance:".bright_cyan(),
        cfg.rules.close_tolerance_base,
        cfg.rules.close_tolerance_scale
    );
    println!(
        "  {} {} per cycle ({} on challenge levels)",
        "Close matches:".bright_cyan(),
        cfg.rules.close_match_budget,
        cfg.rules.boss_close_match_budget
    );
    println!(
        "  {} +{} per exact match, max {}x",
        "Combo:".bright_cyan(),
        cfg.rules.combo_step,
        cfg.rules.combo_cap
    );
    println!("  {} {}", "Max level:".bright_cyan(), cfg.rules.max_level);

    println!("\n{}", "Difficulty:".bright_white().bold());
    println!("  {} v{}", "Curve:".bright_cyan(), CURVE_VERSION);
    println!(
        "  {} {}s view, {}s select (min {}s)",
        "Timing:".bright_cyan(),
        cfg.difficulty.view_time_secs,
        cfg.difficulty.base_selection_secs,
        cfg.difficulty.min_selection_secs
    );
    println!(
        "  {} {:.2} to {:.2}",
        "Similarity:".bright_cyan(),
        cfg.difficulty.base_similarity,
        cfg.difficulty.max_similarity
    );

    println!("\n{}", "Leaderboard:".bright_white().bold());
    println!(
        "  {} top {}, cached {}s",
        "Display:".bright_cyan(),
        cfg.leaderboard.capacity,
        cfg.leaderboard.cache_ttl_seconds
    );

    println!(
        "\n{} {}",
        "Tip:".bright_black(),
        format!("set {} to use a different config file.", config::CONFIG_PATH_ENV).bright_black()
    );
    Ok(())
}

fn swatch(color: Color) -> ColoredString {
    "      ".on_truecolor(color.r, color.g, color.b)
}
