//! Star Raid headless driver
//!
//! Runs a session with the autopilot at a fixed timestep, routes events to a
//! logging audio sink and prints the final HUD as JSON.
//!
//! ```text
//! star-raid [--seed N] [--ticks N] [--tuning FILE] [--settings FILE] [--realtime] [--classic]
//! ```

use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};

use star_raid::audio::{AudioManager, LogSink};
use star_raid::classic::ClassicGame;
use star_raid::consts::*;
use star_raid::sim::{GameState, TickInput, tick};
use star_raid::{Settings, Tuning};

/// Ten minutes of play
const DEFAULT_TICK_LIMIT: u64 = 60 * 60 * 10;

#[derive(Debug)]
struct Options {
    seed: u64,
    ticks: u64,
    tuning: Option<String>,
    settings: Option<String>,
    realtime: bool,
    classic: bool,
}

impl Options {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut opts = Options {
            seed: 0x5eed,
            ticks: DEFAULT_TICK_LIMIT,
            tuning: None,
            settings: None,
            realtime: false,
            classic: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--seed" => {
                    let value = args.next().context("--seed needs a value")?;
                    opts.seed = value
                        .parse()
                        .with_context(|| format!("invalid seed `{value}`"))?;
                }
                "--ticks" => {
                    let value = args.next().context("--ticks needs a value")?;
                    opts.ticks = value
                        .parse()
                        .with_context(|| format!("invalid tick count `{value}`"))?;
                }
                "--tuning" => opts.tuning = Some(args.next().context("--tuning needs a path")?),
                "--settings" => {
                    opts.settings = Some(args.next().context("--settings needs a path")?);
                }
                "--realtime" => opts.realtime = true,
                "--classic" => opts.classic = true,
                other => bail!("unknown argument `{other}`"),
            }
        }
        Ok(opts)
    }
}

/// Fixed-step pacing against the wall clock
struct Pacer {
    accumulator: f32,
    last: Instant,
}

impl Pacer {
    fn new() -> Self {
        Self {
            accumulator: 0.0,
            last: Instant::now(),
        }
    }

    /// Ticks owed since the last call, capped to avoid a spiral of death
    fn due(&mut self) -> u32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32().min(0.1);
        self.last = now;
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }
}

fn run_session(opts: &Options) -> Result<()> {
    let tuning = match &opts.tuning {
        Some(path) => {
            Tuning::load(path).with_context(|| format!("loading tuning from {path}"))?
        }
        None => Tuning::default(),
    };
    let settings = opts
        .settings
        .as_ref()
        .map(Settings::load_or_default)
        .unwrap_or_default();

    let mut state = GameState::with_config(opts.seed, tuning, &settings);
    let mut audio = AudioManager::new(LogSink, &settings);
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };
    let mut pacer = Pacer::new();

    while state.time_ticks < opts.ticks && !state.is_game_over() {
        let steps = if opts.realtime { pacer.due() } else { 1 };
        for _ in 0..steps {
            tick(&mut state, &input);
        }
        for event in state.drain_events() {
            log::debug!("{:?}", event);
            audio.handle(&event);
        }
        if opts.realtime {
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    log::info!(
        "Session ended after {} ticks ({:.1}s)",
        state.time_ticks,
        state.time_ticks as f32 * SIM_DT
    );
    let hud = serde_json::to_string_pretty(&state.hud()).context("serializing HUD")?;
    println!("{hud}");
    Ok(())
}

fn run_classic(opts: &Options) -> Result<()> {
    let mut game = ClassicGame::new(opts.seed);
    while game.time_ticks < opts.ticks && !game.is_over() {
        game.tick(&[]);
    }
    let summary = serde_json::json!({
        "phase": game.phase,
        "score": game.score,
        "lives": game.lives,
        "level": game.level,
        "ticks": game.time_ticks,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("serializing summary")?
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let opts = Options::parse(std::env::args().skip(1))?;
    log::info!("Star Raid (headless) starting, seed {}", opts.seed);

    if opts.classic {
        run_classic(&opts)
    } else {
        run_session(&opts)
    }
}
