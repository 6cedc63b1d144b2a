//! Robot contract
//!
//! Implement [`Robot`] to create a combatant. The engine calls the four
//! handlers as events happen; each runs to completion before the battle moves
//! on. A handler sees the battle only through [`Controls`], which is bound to
//! the robot being notified: it can read that robot's state and steer it, but
//! never touch another robot's record.
//!
//! State a handler needs across calls (for example "has the first radar
//! update been handled yet") lives in the implementing struct's own fields.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::RobotFault;
use crate::settings::Settings;
use crate::sim::{Edge, Game, RobotId};

/// Result type returned by every handler
pub type HandlerResult = Result<(), RobotFault>;

/// One blip on the radar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarContact {
    pub id: RobotId,
    /// Robot class name
    pub tag: String,
    pub position: Vec2,
}

/// A successful hit delivered to its target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strike {
    pub attacker: RobotId,
    /// Attacker's class name
    pub attacker_tag: String,
    /// Damage inflicted by this hit (percent)
    pub damage: u32,
}

/// Kind of notification, used when reporting a failing handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotEvent {
    Start,
    Attacked,
    Bumped,
    Radar,
}

impl fmt::Display for RobotEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RobotEvent::Start => "start",
            RobotEvent::Attacked => "attacked",
            RobotEvent::Bumped => "bumped",
            RobotEvent::Radar => "radar",
        })
    }
}

/// A combatant
///
/// Every handler defaults to doing nothing, so a robot only overrides the
/// events it cares about.
pub trait Robot {
    /// Class name shown on radar and in results
    fn tag(&self) -> &str;

    /// The battle started; `position` is where this robot was placed
    fn on_start(&mut self, ctl: &mut Controls<'_>, position: Vec2) -> HandlerResult {
        let _ = (ctl, position);
        Ok(())
    }

    /// Another robot hit this one
    fn on_attacked(&mut self, ctl: &mut Controls<'_>, strike: &Strike) -> HandlerResult {
        let _ = (ctl, strike);
        Ok(())
    }

    /// This robot ran into an edge of the field and was stopped
    fn on_bumped(&mut self, ctl: &mut Controls<'_>, edge: Edge) -> HandlerResult {
        let _ = (ctl, edge);
        Ok(())
    }

    /// Periodic radar update listing every robot still fighting, this one included
    fn on_radar(&mut self, ctl: &mut Controls<'_>, radar: &[RadarContact]) -> HandlerResult {
        let _ = (ctl, radar);
        Ok(())
    }
}

/// A robot's handle on the battle while one of its handlers runs
pub struct Controls<'a> {
    game: &'a mut Game,
    id: RobotId,
}

impl<'a> Controls<'a> {
    pub(crate) fn new(game: &'a mut Game, id: RobotId) -> Self {
        Self { game, id }
    }

    /// This robot's id
    pub fn id(&self) -> RobotId {
        self.id
    }

    /// Coordinates, origin at the south-west corner of the field
    pub fn position(&self) -> Vec2 {
        self.game.record(self.id).position
    }

    /// Damage, 0 (healthy) to 100 (destroyed)
    pub fn damage(&self) -> u32 {
        self.game.record(self.id).damage
    }

    /// Radians counterclockwise from east
    pub fn heading(&self) -> f32 {
        self.game.record(self.id).heading
    }

    /// Metres per second
    pub fn speed(&self) -> f32 {
        self.game.record(self.id).speed
    }

    pub fn set_heading(&mut self, rads: f32) {
        self.game.set_heading(self.id, rads);
    }

    /// Clamped into `[0, max_speed]`
    pub fn set_speed(&mut self, mps: f32) {
        self.game.set_speed(self.id, mps);
    }

    /// Strike out along the current heading
    ///
    /// Returns false if the attack was declined (still cooling down, or this
    /// robot is already destroyed).
    pub fn attack(&mut self) -> bool {
        self.game.resolve_attack(self.id)
    }

    /// Seconds since the battle started
    pub fn elapsed(&self) -> f32 {
        self.game.elapsed()
    }

    pub fn settings(&self) -> &Settings {
        self.game.settings()
    }
}
