//! Color Attack runner (default binary).
//!
//! Interactive mode reads one command per stdin line and prints a line per
//! state change. With `--autoplay` the bot plays whole games in virtual time
//! and only the results are printed.

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use color_attack::autoplay::{Autoplayer, DEFAULT_GAME_LIMIT_MS};
use color_attack::engine::{EngineSnapshot, GameEngine, Phase, VirtualScheduler};
use color_attack::runtime::{
    EventMessage, GameRuntime, RuntimeConfig, RuntimeHandle, Services, SnapshotMessage,
};
use color_attack::types::{GameMode, PlayerAction, DEFAULT_COLOR_POOL};

#[derive(Debug, Parser)]
#[command(name = "color-attack", version, about = "Tap the colour the prompt calls for")]
struct Cli {
    /// Game mode: classic, rapid or chaos
    #[arg(default_value = "classic", value_parser = parse_mode)]
    mode: GameMode,

    /// RNG seed (overrides COLOR_ATTACK_SEED)
    #[arg(long)]
    seed: Option<u64>,

    /// Let the bot play headless, answering correctly with this probability
    #[arg(long, value_name = "ACCURACY")]
    autoplay: Option<f64>,

    /// Number of games to simulate with --autoplay
    #[arg(long, default_value_t = 1)]
    games: u32,

    /// Print snapshots as JSON lines
    #[arg(long)]
    json: bool,

    /// Chaos tap window floor (overrides COLOR_ATTACK_CHAOS_MIN_TAP_MS)
    #[arg(long)]
    chaos_min_tap_ms: Option<u32>,
}

fn parse_mode(s: &str) -> std::result::Result<GameMode, String> {
    GameMode::from_str(s).ok_or_else(|| format!("unknown mode '{}' (classic, rapid, chaos)", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("color_attack=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = RuntimeConfig::from_env();
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(min_tap_ms) = cli.chaos_min_tap_ms {
        config.tuning.chaos_min_tap_ms = min_tap_ms;
    }

    match cli.autoplay {
        Some(accuracy) => simulate(&cli, &config, accuracy),
        None => interactive(&cli, &config).await,
    }
}

/// Headless games in virtual time
fn simulate(cli: &Cli, config: &RuntimeConfig, accuracy: f64) -> Result<()> {
    let mut engine = GameEngine::for_mode(cli.mode, &config.tuning, config.seed);
    let mut sched = VirtualScheduler::new();
    let mut bot = Autoplayer::new(accuracy, config.seed.wrapping_add(1));

    info!(
        mode = cli.mode.as_str(),
        games = cli.games,
        accuracy,
        seed = config.seed,
        "simulating"
    );

    for _ in 0..cli.games {
        let summary = bot.play_game(&mut engine, &mut sched, DEFAULT_GAME_LIMIT_MS);
        sched.take_events();
        sched.take_submissions();

        if cli.json {
            let line = SnapshotMessage::from(&engine.snapshot())
                .to_line()
                .context("encode snapshot")?;
            println!("{}", line);
        } else {
            println!(
                "game {:>3}  score {:>5}  round {:>4}  time {:>6.1}s{}",
                summary.session,
                summary.score,
                summary.round,
                summary.elapsed_ms as f64 / 1000.0,
                if summary.finished { "" } else { "  (capped)" }
            );
        }
    }
    Ok(())
}

async fn interactive(cli: &Cli, config: &RuntimeConfig) -> Result<()> {
    let services = Services::in_memory();
    let handle = GameRuntime::spawn_mode(cli.mode, services, config);

    let best = handle.enter_mode().await;
    println!(
        "{}  best {}  (type a colour or shape, 'pass', 'restart', 'quit')",
        cli.mode, best
    );

    let printer = tokio::spawn(print_snapshots(handle.clone(), cli.json));
    let event_printer = cli.json.then(|| tokio::spawn(print_events(handle.clone())));
    handle.start().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("read stdin")? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        match input.to_lowercase().as_str() {
            "quit" | "exit" | "q" => break,
            "restart" => handle.restart().await?,
            "start" => handle.start().await?,
            "stop" => handle.stop().await?,
            "retry" => handle.retry_score_submission().await?,
            _ => match PlayerAction::parse(input, &DEFAULT_COLOR_POOL) {
                Some(action) => {
                    if !handle.tap(action).await? {
                        println!("(ignored)");
                    }
                }
                None => warn!(input, "unknown command"),
            },
        }
    }

    handle.shutdown().await?;
    printer.abort();
    if let Some(task) = event_printer {
        task.abort();
    }
    Ok(())
}

/// One JSON line per game event
async fn print_events(handle: RuntimeHandle) -> Result<()> {
    let mut rx = handle.subscribe_events();
    loop {
        match rx.recv().await {
            Ok(event) => {
                let line = EventMessage::from(&event)
                    .to_line()
                    .context("encode event")?;
                println!("{}", line);
            }
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "event output lagged"),
            Err(RecvError::Closed) => break,
        }
    }
    Ok(())
}

/// Print a line whenever something other than the countdowns changes
async fn print_snapshots(handle: RuntimeHandle, json: bool) -> Result<()> {
    let mut rx = handle.subscribe_snapshots();
    let mut last: Option<EngineSnapshot> = None;

    while rx.changed().await.is_ok() {
        let snap = rx.borrow_and_update().clone();
        if last.as_ref().is_some_and(|prev| same_screen(prev, &snap)) {
            continue;
        }

        if json {
            let line = SnapshotMessage::from(&snap)
                .to_line()
                .context("encode snapshot")?;
            println!("{}", line);
        } else {
            println!("{}", describe(&snap));
        }
        last = Some(snap);
    }
    Ok(())
}

fn same_screen(a: &EngineSnapshot, b: &EngineSnapshot) -> bool {
    a.phase == b.phase
        && a.round == b.round
        && a.score == b.score
        && a.actions_taken == b.actions_taken
        && a.session == b.session
}

fn describe(s: &EngineSnapshot) -> String {
    match s.phase {
        Phase::Idle => format!("stopped  score {}", s.score),
        Phase::GameOver => format!("GAME OVER  score {}  round {}", s.score, s.round),
        Phase::RoundTransition => format!("score {}  lives {}", s.score, lives(s)),
        Phase::RoundActive => {
            let grid: Vec<&str> = s.grid_colors.iter().map(|c| c.name).collect();
            let mut line = format!(
                "[round {}] {}  |  {}",
                s.round,
                s.prompt_text().replace('\n', " / "),
                grid.join(" ")
            );
            if !s.grid_shapes.is_empty() {
                let shapes: Vec<&str> = s.grid_shapes.iter().map(|sh| sh.as_str()).collect();
                line.push_str(&format!("  |  {}", shapes.join(" ")));
            }
            if let Some(ink) = s.prompt.display_color {
                line.push_str(&format!("  (ink: {})", ink));
            }
            line.push_str(&format!(
                "  |  {:.1}s  lives {}",
                s.remaining_tap_ms as f64 / 1000.0,
                lives(s)
            ));
            if let Some(game_ms) = s.remaining_game_ms {
                line.push_str(&format!("  clock {:.1}s", game_ms as f64 / 1000.0));
            }
            line
        }
    }
}

fn lives(s: &EngineSnapshot) -> String {
    if s.uses_lives {
        format!("{}/{}", s.lives_current, s.lives_max)
    } else {
        "-".to_string()
    }
}
