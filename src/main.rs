//! Lancer Duel headless runner
//!
//! Runs one match at a fixed 60 Hz frame rate and prints the final snapshot
//! as JSON. Usage:
//!
//! ```text
//! lancer-duel [--seed N] [--preset classic|arcade|sandbox] [--settings path.json] [--seconds S]
//! ```

use std::env;
use std::process::ExitCode;

use lancer_duel::sim::MatchState;
use lancer_duel::{ConfigError, FixedRateSource, FrameDriver, RulesetPreset, Settings};

const FRAME_HZ: f64 = 60.0;
const DEFAULT_SECONDS: f64 = 120.0;
const USAGE: &str = "usage: lancer-duel [--seed N] [--preset classic|arcade|sandbox] \
                     [--settings path.json] [--seconds S]\n\
                     --preset replaces the ruleset tunables loaded from --settings";

struct Args {
    seed: u64,
    preset: Option<RulesetPreset>,
    settings_path: Option<String>,
    seconds: f64,
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .skip_while(|a| a.as_str() != name)
        .nth(1)
        .map(String::as_str)
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().collect();

    let seed = match flag(&args, "--seed") {
        Some(s) => s.parse().map_err(|_| format!("invalid seed: {s}"))?,
        None => 12345,
    };
    let preset = match flag(&args, "--preset") {
        Some(s) => Some(RulesetPreset::from_str(s).ok_or_else(|| format!("unknown preset: {s}"))?),
        None => None,
    };
    let seconds = match flag(&args, "--seconds") {
        Some(s) => s
            .parse::<f64>()
            .ok()
            .filter(|v| *v > 0.0)
            .ok_or_else(|| format!("invalid duration: {s}"))?,
        None => DEFAULT_SECONDS,
    };

    Ok(Args {
        seed,
        preset,
        settings_path: flag(&args, "--settings").map(str::to_owned),
        seconds,
    })
}

fn load_settings(args: &Args) -> Result<Settings, ConfigError> {
    let mut settings = match &args.settings_path {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    // A preset on the command line wins over the file's tunables
    if let Some(preset) = args.preset {
        settings.apply_preset(preset);
    }
    Ok(settings)
}

fn run(args: &Args) -> Result<(), ConfigError> {
    let settings = load_settings(args)?;
    let mut state = MatchState::new(settings, args.seed)?;
    let mut driver = FrameDriver::new();
    let mut source = FixedRateSource::for_duration(FRAME_HZ, args.seconds);

    let mut last_report = 0u32;
    let frames = driver.run(&mut state, &mut source, |snapshot, fps| {
        let second = snapshot.simulation_time as u32;
        if second > last_report {
            last_report = second;
            log::debug!(
                "t={}s hits={} bounces={} fps={:.0}",
                second,
                snapshot.stats.collision_count,
                snapshot.stats.wall_bounce_count,
                fps
            );
        }
    });

    let snapshot = state.snapshot();
    log::info!(
        "{} frames, {:.1}s simulated, {} hits, {} wall bounces, best combo {}",
        frames,
        snapshot.simulation_time,
        snapshot.stats.collision_count,
        snapshot.stats.wall_bounce_count,
        snapshot.stats.max_combo
    );
    match snapshot.outcome() {
        Some(outcome) => log::info!("Outcome: {outcome:?}"),
        None => log::info!("No decision within {:.0}s", args.seconds),
    }

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::init();
    log::info!("Lancer Duel (headless) starting...");

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The headless runner is native only; the library is what wasm hosts embed
}
