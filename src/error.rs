//! Battle errors
//!
//! Setup problems are reported before any robot runs. A robot handler that
//! fails ends the battle it is in; there is no per-robot sandbox.

use glam::Vec2;
use thiserror::Error;

use crate::recording::RecordError;
use crate::robot::RobotEvent;
use crate::settings::SettingsError;
use crate::sim::RobotId;

/// Failure raised by a robot's own logic
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RobotFault {
    message: String,
}

impl RobotFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors that prevent a battle from starting or finishing
#[derive(Debug, Error)]
pub enum BattleError {
    #[error("no robot registered under the name `{0}`")]
    UnknownRobot(String),
    #[error("a battle needs at least one robot")]
    NoRobots,
    #[error("{tag} cannot start at non-finite position {position}")]
    InvalidPosition { tag: String, position: Vec2 },
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("robot {id} ({tag}) failed while handling {event}: {source}")]
    RobotFault {
        id: RobotId,
        tag: String,
        event: RobotEvent,
        #[source]
        source: RobotFault,
    },
    #[error("battle is {0}")]
    WrongPhase(&'static str),
    #[error(transparent)]
    Record(#[from] RecordError),
}
