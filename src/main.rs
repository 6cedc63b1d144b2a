//! Robot Arena command-line runner
//!
//! Builds the named robots from the registry, runs one battle and prints the
//! outcome.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use robot_arena::recording::{JsonRecorder, NullRecorder, Recorder};
use robot_arena::{
    Battle, BattleLimit, Clock, DamageRounding, RobotRegistry, Settings, SimulatedClock, SystemClock,
};

/// Autonomous robots fight it out on a bounded field
#[derive(Parser, Debug)]
#[command(name = "robot-arena", version)]
#[command(about = "Run a battle between autonomous robots")]
struct Args {
    /// Robot class names, one robot per name (repeat a name for several)
    #[arg(required_unless_present = "list")]
    robots: Vec<String>,

    /// JSON settings file; missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for spawn placement
    #[arg(long)]
    seed: Option<u64>,

    /// End the battle after this many ticks
    #[arg(long, conflicts_with = "max_duration")]
    max_ticks: Option<u64>,

    /// End the battle after this many seconds of battle time
    #[arg(long)]
    max_duration: Option<f32>,

    /// How fractional damage is rounded: truncate, nearest or ceil
    #[arg(long, value_parser = parse_rounding)]
    rounding: Option<DamageRounding>,

    /// Write every tick to this JSON file
    #[arg(long)]
    record: Option<PathBuf>,

    /// Run on simulated time instead of sleeping between ticks
    #[arg(long)]
    simulated: bool,

    /// Print the registered robot names and exit
    #[arg(long)]
    list: bool,
}

fn parse_rounding(s: &str) -> Result<DamageRounding, String> {
    DamageRounding::from_str(s).ok_or_else(|| format!("unknown rounding `{s}`, expected truncate, nearest or ceil"))
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    if let Some(ticks) = args.max_ticks {
        settings.limit = BattleLimit::Ticks(ticks);
    }
    if let Some(seconds) = args.max_duration {
        settings.limit = BattleLimit::Duration(seconds);
    }
    if let Some(rounding) = args.rounding {
        settings.damage_rounding = rounding;
    }
    settings.validate().context("Invalid settings")?;
    log::info!(
        "Seed {}, damage rounding {}",
        settings.seed,
        settings.damage_rounding.as_str()
    );
    Ok(settings)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let registry = RobotRegistry::default();

    if args.list {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(());
    }
    if args.robots.is_empty() {
        bail!("No robots given");
    }

    let settings = load_settings(&args)?;
    log::info!("Robot Arena starting: {}", args.robots.join(", "));
    let robots = registry.build_all(&args.robots)?;
    let mut battle = Battle::new(settings, robots)?;

    let mut clock: Box<dyn Clock> = if args.simulated {
        Box::new(SimulatedClock::new())
    } else {
        Box::new(SystemClock::new())
    };
    let mut recorder: Box<dyn Recorder> = match &args.record {
        Some(path) => Box::new(JsonRecorder::new(path)),
        None => Box::new(NullRecorder),
    };

    let result = battle.run(clock.as_mut(), recorder.as_mut())?;
    println!("{}", result.outcome());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_on_top_of_defaults() {
        let args = Args::try_parse_from([
            "robot-arena",
            "--seed",
            "9",
            "--max-ticks",
            "40",
            "--rounding",
            "ROUND",
            "Sitter",
            "MiddleBot",
        ])
        .unwrap();
        let settings = load_settings(&args).unwrap();
        assert_eq!(settings.seed, 9);
        assert_eq!(settings.limit, BattleLimit::Ticks(40));
        assert_eq!(settings.damage_rounding, DamageRounding::Nearest);
        assert_eq!(args.robots, ["Sitter", "MiddleBot"]);
    }

    #[test]
    fn test_unknown_rounding_rejected() {
        assert!(Args::try_parse_from(["robot-arena", "--rounding", "sideways", "Sitter"]).is_err());
    }

    #[test]
    fn test_list_needs_no_robots() {
        let args = Args::try_parse_from(["robot-arena", "--list"]).unwrap();
        assert!(args.list);
        assert!(Args::try_parse_from(["robot-arena"]).is_err());
    }
}
