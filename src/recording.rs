//! Battle recording
//!
//! A [`Recorder`] sees the battle at start, after every tick and at the end.
//! [`JsonRecorder`] keeps every tick in memory and writes one JSON document
//! when the battle finishes.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::driver::BattleResult;
use crate::sim::{Game, RobotId};

/// Errors writing or reading a recording
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Failed to access recording {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode recording: {0}")]
    Json(#[from] serde_json::Error),
}

/// One robot's record at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotState {
    pub position: Vec2,
    pub heading: f32,
    pub speed: f32,
    pub damage: u32,
}

/// Every robot's record after a tick, destroyed robots included
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickSnapshot {
    pub tick: u64,
    pub elapsed: f32,
    pub robots: BTreeMap<RobotId, RobotState>,
}

impl TickSnapshot {
    pub fn capture(game: &Game) -> Self {
        let robots = game
            .battlefield()
            .records()
            .iter()
            .map(|r| {
                (
                    r.id,
                    RobotState {
                        position: r.position,
                        heading: r.heading,
                        speed: r.speed,
                        damage: r.damage,
                    },
                )
            })
            .collect();
        Self {
            tick: game.ticks(),
            elapsed: game.elapsed(),
            robots,
        }
    }
}

/// Observer of a running battle
pub trait Recorder {
    /// Called once after `on_start` has gone out to every robot
    fn start(&mut self, _game: &Game) -> Result<(), RecordError> {
        Ok(())
    }

    /// Called after every tick
    fn after_tick(&mut self, snapshot: TickSnapshot) -> Result<(), RecordError>;

    /// Called once with the final result
    fn finish(&mut self, _result: &BattleResult) -> Result<(), RecordError> {
        Ok(())
    }
}

/// Records nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRecorder;

impl Recorder for NullRecorder {
    fn after_tick(&mut self, _snapshot: TickSnapshot) -> Result<(), RecordError> {
        Ok(())
    }
}

/// A whole battle as written by [`JsonRecorder`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    /// Class tag of every robot by id
    pub robots: BTreeMap<RobotId, String>,
    pub total_time: f32,
    /// Starting positions first, then one entry per tick
    pub ticks: Vec<TickSnapshot>,
    pub result: Option<BattleResult>,
}

impl Recording {
    /// Read a recording back from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| RecordError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

/// Collects every tick and writes them to a JSON file at the end
#[derive(Debug)]
pub struct JsonRecorder {
    path: PathBuf,
    recording: Recording,
}

impl JsonRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            recording: Recording::default(),
        }
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    fn write(&self) -> Result<(), RecordError> {
        let io_err = |source: std::io::Error| RecordError::Io {
            path: self.path.display().to_string(),
            source,
        };
        let file = File::create(&self.path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &self.recording)?;
        writer.flush().map_err(io_err)?;
        Ok(())
    }
}

impl Recorder for JsonRecorder {
    fn start(&mut self, game: &Game) -> Result<(), RecordError> {
        self.recording.robots = game
            .battlefield()
            .records()
            .iter()
            .map(|r| (r.id, r.tag.clone()))
            .collect();
        self.recording.ticks.push(TickSnapshot::capture(game));
        Ok(())
    }

    fn after_tick(&mut self, snapshot: TickSnapshot) -> Result<(), RecordError> {
        self.recording.ticks.push(snapshot);
        Ok(())
    }

    fn finish(&mut self, result: &BattleResult) -> Result<(), RecordError> {
        self.recording.total_time = result.elapsed;
        self.recording.result = Some(result.clone());
        self.write()?;
        log::info!(
            "Wrote {} snapshots to {}",
            self.recording.ticks.len(),
            self.path.display()
        );
        Ok(())
    }
}
