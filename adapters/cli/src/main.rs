#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Zombie IO matches headlessly.

mod autopilot;

use std::{
    fmt,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use zombie_io_core::{Event, ScoreStore, SessionOutcome};
use zombie_io_game::{Game, GameConfig};
use zombie_io_storage::{default_save_dir, JsonFileStore, MemoryStore};
use zombie_io_world::query;

use crate::autopilot::Autopilot;

#[derive(Parser, Debug)]
#[command(name = "zombie-io")]
#[command(about = "Plays a Zombie IO match with a scripted player and reports the scores")]
struct Cli {
    /// Simulated frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Stop after this many simulated seconds even if the match is still running.
    #[arg(long)]
    seconds: Option<f64>,

    /// Override the match length, in minutes.
    #[arg(long)]
    minutes: Option<f64>,

    /// Seed of the enemy spawn generator.
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file with game tunables; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Profile whose scores are loaded and saved.
    #[arg(long, default_value = "default")]
    profile: String,

    /// Directory holding profile score files.
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Keep scores in memory only.
    #[arg(long)]
    ephemeral: bool,

    /// Frames between two attack presses of the scripted player.
    #[arg(long, default_value_t = 3)]
    attack_every: u32,
}

#[derive(Debug, PartialEq)]
struct Summary {
    outcome: Option<SessionOutcome>,
    simulated: Duration,
    kills: usize,
    score: i64,
    high_score: i64,
    cumulative_score: i64,
    new_record: bool,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self.outcome {
            Some(SessionOutcome::Victory) => "victory",
            Some(SessionOutcome::Defeat) => "defeat",
            None => "unfinished",
        };
        writeln!(f, "outcome:          {outcome}")?;
        writeln!(f, "simulated:        {:.1}s", self.simulated.as_secs_f64())?;
        writeln!(f, "kills:            {}", self.kills)?;
        writeln!(
            f,
            "score:            {}{}",
            self.score,
            if self.new_record { " (new record)" } else { "" }
        )?;
        writeln!(f, "high score:       {}", self.high_score)?;
        write!(f, "cumulative score: {}", self.cumulative_score)
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if cli.fps == 0 {
        bail!("--fps must be greater than zero");
    }
    let config = load_config(&cli)?;
    let limit = match cli.seconds {
        Some(seconds) => Some(
            Duration::try_from_secs_f64(seconds)
                .with_context(|| format!("invalid --seconds value {seconds}"))?,
        ),
        None => None,
    };
    let frame = Duration::from_secs(1) / cli.fps;

    let summary = if cli.ephemeral {
        run_match(&config, MemoryStore::new(), frame, limit, cli.attack_every)?
    } else {
        let dir = match &cli.save_dir {
            Some(dir) => dir.clone(),
            None => default_save_dir()?,
        };
        let store = JsonFileStore::for_profile(&dir, &cli.profile)
            .with_context(|| format!("failed to open profile `{}`", cli.profile))?;
        info!(path = %store.path().display(), "using score file");
        run_match(&config, store, frame, limit, cli.attack_every)?
    };

    println!("{summary}");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn load_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => GameConfig::default(),
    };

    if let Some(seed) = cli.seed {
        config.rng_seed = seed;
    }
    if let Some(minutes) = cli.minutes {
        config.max_match_duration = Duration::try_from_secs_f64(minutes * 60.0)
            .with_context(|| format!("invalid --minutes value {minutes}"))?;
    }
    config.validate().context("invalid game configuration")?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<GameConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
}

fn run_match<S: ScoreStore>(
    config: &GameConfig,
    store: S,
    frame: Duration,
    limit: Option<Duration>,
    attack_every: u32,
) -> Result<Summary> {
    let mut game = Game::new(config, store);
    println!("{}", query::welcome_banner(game.world()));

    let events = game.start_game()?;
    log_events(&events);

    let mut pilot = Autopilot::new(attack_every);
    let mut simulated = Duration::ZERO;
    let mut kills = 0;
    while game.is_active() && limit.map_or(true, |limit| simulated < limit) {
        pilot.observe(&game.character_view());
        let events = game.step(frame, &pilot);
        simulated += frame;
        kills += events
            .iter()
            .filter(|event| matches!(event, Event::ScoreChanged { .. }))
            .count();
        log_events(&events);
    }

    Ok(Summary {
        outcome: game.last_outcome(),
        simulated,
        kills,
        score: game.score(),
        high_score: game.high_score(),
        cumulative_score: game.cumulative_score(),
        new_record: game.is_new_record(),
    })
}

fn log_events(events: &[Event]) {
    for event in events {
        match event {
            Event::MatchStarted
            | Event::MatchEnded { .. }
            | Event::HighScoreChanged { .. }
            | Event::PauseChanged { .. } => info!(?event, "game event"),
            Event::TimeAdvanced { .. } => {}
            _ => debug!(?event, "game event"),
        }
    }
}
