//! Battle driver
//!
//! Runs ticks until one robot (or none) is left standing or the battle limit
//! is reached. The wait between ticks is the only place the battle blocks;
//! it goes through a [`Clock`] so tests and replays can run without sleeping.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::BattleError;
use crate::recording::{Recorder, TickSnapshot};
use crate::robot::Robot;
use crate::settings::Settings;
use crate::sim::{Game, RobotId};

/// Source of battle time
pub trait Clock {
    /// Seconds since the clock was created
    fn now(&self) -> f32;
    /// Block (or pretend to) for `seconds`
    fn wait(&mut self, seconds: f32);
}

/// Wall-clock time; `wait` sleeps the thread
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f32 {
        self.origin.elapsed().as_secs_f32()
    }

    fn wait(&mut self, seconds: f32) {
        if seconds > 0.0 {
            std::thread::sleep(Duration::from_secs_f32(seconds));
        }
    }
}

/// Time that only moves when waited on, by exactly the amount waited
#[derive(Debug, Default, Clone)]
pub struct SimulatedClock {
    elapsed: f64,
}

impl SimulatedClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SimulatedClock {
    fn now(&self) -> f32 {
        self.elapsed as f32
    }

    fn wait(&mut self, seconds: f32) {
        self.elapsed += f64::from(seconds.max(0.0));
    }
}

/// Where a battle is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattlePhase {
    NotStarted,
    Running,
    Ended,
}

impl BattlePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            BattlePhase::NotStarted => "not started",
            BattlePhase::Running => "running",
            BattlePhase::Ended => "ended",
        }
    }
}

/// A robot still standing at the end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survivor {
    pub id: RobotId,
    pub tag: String,
    pub damage: u32,
}

impl fmt::Display for Survivor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (damage {})", self.tag, self.damage)
    }
}

/// How the battle went
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleOutcome {
    /// Nobody survived
    AllDestroyed,
    Winner(Survivor),
    /// Time ran out with two or more robots standing
    Stalemate(Vec<Survivor>),
}

impl fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleOutcome::AllDestroyed => write!(f, "All robots were destroyed"),
            BattleOutcome::Winner(survivor) => write!(f, "The winner is {survivor}"),
            BattleOutcome::Stalemate(survivors) => {
                let names: Vec<String> = survivors.iter().map(Survivor::to_string).collect();
                write!(f, "Stalemate. The survivors are {}", names.join(", "))
            }
        }
    }
}

/// Final report of a battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleResult {
    /// Robots still standing, ascending by id
    pub survivors: Vec<Survivor>,
    /// Battle time at the end (seconds)
    pub elapsed: f32,
    pub ticks: u64,
}

impl BattleResult {
    fn from_game(game: &Game) -> Self {
        let survivors = game
            .battlefield()
            .records()
            .iter()
            .filter(|r| r.is_active())
            .map(|r| Survivor {
                id: r.id,
                tag: r.tag.clone(),
                damage: r.damage,
            })
            .collect();
        Self {
            survivors,
            elapsed: game.elapsed(),
            ticks: game.ticks(),
        }
    }

    pub fn outcome(&self) -> BattleOutcome {
        match self.survivors.as_slice() {
            [] => BattleOutcome::AllDestroyed,
            [winner] => BattleOutcome::Winner(winner.clone()),
            survivors => BattleOutcome::Stalemate(survivors.to_vec()),
        }
    }
}

/// One battle from setup to result
pub struct Battle {
    game: Game,
    phase: BattlePhase,
    /// Clock reading that corresponds to battle time 0
    origin: f32,
}

impl Battle {
    /// Set up a battle with robots at seeded random positions
    pub fn new(settings: Settings, robots: Vec<Box<dyn Robot>>) -> Result<Self, BattleError> {
        Ok(Self::from_game(Game::new(settings, robots)?))
    }

    /// Drive an already prepared game
    pub fn from_game(game: Game) -> Self {
        Self {
            game,
            phase: BattlePhase::NotStarted,
            origin: 0.0,
        }
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Position every robot's clock at battle time 0 and send `on_start`
    pub fn start(&mut self, clock: &dyn Clock) -> Result<(), BattleError> {
        if self.phase != BattlePhase::NotStarted {
            return Err(BattleError::WrongPhase(self.phase.as_str()));
        }
        self.origin = clock.now();
        log::info!(
            "Battle starting with {} robots (seed {})",
            self.game.battlefield().len(),
            self.game.seed()
        );
        self.phase = BattlePhase::Running;
        if let Err(err) = self.game.begin(0.0) {
            self.phase = BattlePhase::Ended;
            return Err(err);
        }
        Ok(())
    }

    /// Whether the battle is over: fewer than two robots fighting, or out of time
    pub fn is_decided(&self) -> bool {
        self.game.battlefield().active_count() < 2
            || self
                .game
                .settings()
                .limit
                .reached(self.game.elapsed(), self.game.ticks())
    }

    /// Wait one radar interval and run a tick
    ///
    /// Returns false once the battle has ended.
    pub fn step(&mut self, clock: &mut dyn Clock) -> Result<bool, BattleError> {
        match self.phase {
            BattlePhase::Running => {}
            BattlePhase::Ended => return Ok(false),
            BattlePhase::NotStarted => return Err(BattleError::WrongPhase(self.phase.as_str())),
        }
        if self.is_decided() {
            self.phase = BattlePhase::Ended;
            return Ok(false);
        }

        clock.wait(self.game.settings().radar_interval);
        // Never let battle time run backwards
        let now = (clock.now() - self.origin).max(self.game.elapsed());
        if let Err(err) = self.game.tick(now) {
            self.phase = BattlePhase::Ended;
            return Err(err);
        }
        Ok(true)
    }

    /// Mark the battle ended and report the survivors
    pub fn finish(&mut self) -> BattleResult {
        self.phase = BattlePhase::Ended;
        let result = BattleResult::from_game(&self.game);
        log::info!(
            "Battle ended after {} ticks ({:.2}s): {}",
            result.ticks,
            result.elapsed,
            result.outcome()
        );
        result
    }

    /// Run the whole battle, feeding every tick to `recorder`
    pub fn run(
        &mut self,
        clock: &mut dyn Clock,
        recorder: &mut dyn Recorder,
    ) -> Result<BattleResult, BattleError> {
        self.start(clock)?;
        recorder.start(&self.game)?;
        while self.step(clock)? {
            recorder.after_tick(TickSnapshot::capture(&self.game))?;
        }
        let result = self.finish();
        recorder.finish(&result)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::NullRecorder;
    use crate::robots::{HunterKiller, Sitter};
    use crate::settings::BattleLimit;
    use glam::Vec2;

    fn at<R: Robot + 'static>(robot: R, x: f32, y: f32) -> (Box<dyn Robot>, Vec2) {
        (Box::new(robot), Vec2::new(x, y))
    }

    #[test]
    fn test_simulated_clock_advances_only_on_wait() {
        let mut clock = SimulatedClock::new();
        assert_eq!(clock.now(), 0.0);
        clock.wait(0.25);
        clock.wait(0.25);
        assert_eq!(clock.now(), 0.5);
        clock.wait(-1.0);
        assert_eq!(clock.now(), 0.5);
    }

    #[test]
    fn test_single_robot_wins_immediately() {
        let mut battle = Battle::new(Settings::default(), vec![Box::new(Sitter)]).unwrap();
        assert_eq!(battle.phase(), BattlePhase::NotStarted);
        let result = battle.run(&mut SimulatedClock::new(), &mut NullRecorder).unwrap();
        assert_eq!(battle.phase(), BattlePhase::Ended);
        assert_eq!(result.ticks, 0);
        assert_eq!(
            result.outcome(),
            BattleOutcome::Winner(Survivor {
                id: RobotId(0),
                tag: "Sitter".to_string(),
                damage: 0
            })
        );
        assert_eq!(result.outcome().to_string(), "The winner is Sitter (damage 0)");
    }

    #[test]
    fn test_tick_limit_gives_stalemate() {
        let settings = Settings {
            limit: BattleLimit::Ticks(25),
            ..Settings::default()
        };
        let mut battle = Battle::new(settings, vec![Box::new(Sitter), Box::new(Sitter)]).unwrap();
        let result = battle.run(&mut SimulatedClock::new(), &mut NullRecorder).unwrap();
        assert_eq!(result.ticks, 25);
        assert!((result.elapsed - 0.25).abs() < 1e-4);
        match result.outcome() {
            BattleOutcome::Stalemate(survivors) => {
                assert_eq!(survivors.len(), 2);
                assert_eq!(survivors[0].id, RobotId(0));
                assert_eq!(survivors[1].id, RobotId(1));
            }
            other => panic!("expected stalemate, got {other}"),
        }
        assert_eq!(
            result.outcome().to_string(),
            "Stalemate. The survivors are Sitter (damage 0), Sitter (damage 0)"
        );
    }

    #[test]
    fn test_duration_limit() {
        let settings = Settings {
            radar_interval: 0.5,
            limit: BattleLimit::Duration(2.0),
            ..Settings::default()
        };
        let mut battle = Battle::new(settings, vec![Box::new(Sitter), Box::new(Sitter)]).unwrap();
        let result = battle.run(&mut SimulatedClock::new(), &mut NullRecorder).unwrap();
        assert_eq!(result.ticks, 4);
        assert_eq!(result.elapsed, 2.0);
    }

    #[test]
    fn test_hunter_destroys_sitter() {
        let game = Game::with_positions(
            Settings::default(),
            vec![at(HunterKiller, 10.0, 10.0), at(Sitter, 20.0, 10.0)],
        )
        .unwrap();
        let mut battle = Battle::from_game(game);
        let result = battle.run(&mut SimulatedClock::new(), &mut NullRecorder).unwrap();
        match result.outcome() {
            BattleOutcome::Winner(winner) => {
                assert_eq!(winner.tag, "HunterKiller");
                assert_eq!(winner.id, RobotId(0));
            }
            other => panic!("expected a winner, got {other}"),
        }
        assert_eq!(battle.game().damage(RobotId(1)), Some(100));
        assert!(result.elapsed < 10.0);
    }

    #[test]
    fn test_phase_guards() {
        let mut battle = Battle::new(Settings::default(), vec![Box::new(Sitter)]).unwrap();
        let mut clock = SimulatedClock::new();
        assert!(matches!(battle.step(&mut clock), Err(BattleError::WrongPhase(_))));
        battle.start(&clock).unwrap();
        assert!(matches!(battle.start(&clock), Err(BattleError::WrongPhase(_))));
        assert!(!battle.step(&mut clock).unwrap());
        assert_eq!(battle.phase(), BattlePhase::Ended);
        assert!(!battle.step(&mut clock).unwrap());
    }

    #[test]
    fn test_outcome_all_destroyed() {
        let result = BattleResult {
            survivors: Vec::new(),
            elapsed: 3.0,
            ticks: 300,
        };
        assert_eq!(result.outcome(), BattleOutcome::AllDestroyed);
        assert_eq!(result.outcome().to_string(), "All robots were destroyed");
    }
}
