//! Sample robots and the registry that builds robots by name

use std::collections::BTreeMap;

use glam::Vec2;

use crate::error::BattleError;
use crate::robot::{Controls, HandlerResult, RadarContact, Robot, Strike};
use crate::sim::{Edge, distance, heading_to};

/// Drives to the middle of the field and stops
#[derive(Debug, Default)]
pub struct MiddleBot;

impl MiddleBot {
    /// Stop once this close to the middle (metres)
    pub const ARRIVAL_DISTANCE: f32 = 10.0;

    fn move_to_middle(ctl: &mut Controls<'_>, from: Vec2) {
        let middle = ctl.settings().middle();
        let max_speed = ctl.settings().max_speed;
        ctl.set_heading(heading_to(from, middle));
        ctl.set_speed(max_speed);
    }
}

impl Robot for MiddleBot {
    fn tag(&self) -> &str {
        "MiddleBot"
    }

    fn on_start(&mut self, ctl: &mut Controls<'_>, position: Vec2) -> HandlerResult {
        Self::move_to_middle(ctl, position);
        Ok(())
    }

    fn on_bumped(&mut self, ctl: &mut Controls<'_>, _edge: Edge) -> HandlerResult {
        let position = ctl.position();
        Self::move_to_middle(ctl, position);
        Ok(())
    }

    fn on_radar(&mut self, ctl: &mut Controls<'_>, _radar: &[RadarContact]) -> HandlerResult {
        let middle = ctl.settings().middle();
        if distance(ctl.position(), middle) < Self::ARRIVAL_DISTANCE {
            ctl.set_speed(0.0);
        }
        Ok(())
    }
}

/// Chases the closest robot, attacking whenever it is in reach
#[derive(Debug, Default)]
pub struct HunterKiller;

impl HunterKiller {
    /// Attack when the quarry is closer than this (metres)
    pub const STRIKE_DISTANCE: f32 = 3.0;

    /// Closest other robot on the radar and its distance
    fn find_closest<'r>(ctl: &Controls<'_>, radar: &'r [RadarContact]) -> Option<(&'r RadarContact, f32)> {
        let here = ctl.position();
        radar
            .iter()
            .filter(|contact| contact.id != ctl.id())
            .map(|contact| (contact, distance(here, contact.position)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

impl Robot for HunterKiller {
    fn tag(&self) -> &str {
        "HunterKiller"
    }

    fn on_radar(&mut self, ctl: &mut Controls<'_>, radar: &[RadarContact]) -> HandlerResult {
        let Some((quarry, dist)) = Self::find_closest(ctl, radar) else {
            return Ok(());
        };
        let heading = heading_to(ctl.position(), quarry.position);
        let max_speed = ctl.settings().max_speed;
        ctl.set_heading(heading);
        ctl.set_speed(max_speed);
        if dist < Self::STRIKE_DISTANCE {
            let _ = ctl.attack();
        }
        Ok(())
    }
}

/// Never moves and never fights
#[derive(Debug, Default)]
pub struct Sitter;

impl Robot for Sitter {
    fn tag(&self) -> &str {
        "Sitter"
    }
}

/// Holds its ground, sweeping its heading round until something comes into
/// reach, then turns on it and fires. Once hit, it prefers whoever hit it.
#[derive(Debug, Default)]
pub struct Sentry {
    /// Last robot to land a hit on us
    grudge: Option<crate::sim::RobotId>,
}

impl Sentry {
    /// Engage robots closer than this (metres)
    pub const REACH: f32 = 4.0;
    /// Heading change per idle radar update (radians)
    pub const SWEEP_STEP: f32 = 0.2;
}

impl Robot for Sentry {
    fn tag(&self) -> &str {
        "Sentry"
    }

    fn on_attacked(&mut self, _ctl: &mut Controls<'_>, strike: &Strike) -> HandlerResult {
        self.grudge = Some(strike.attacker);
        Ok(())
    }

    fn on_radar(&mut self, ctl: &mut Controls<'_>, radar: &[RadarContact]) -> HandlerResult {
        let here = ctl.position();
        let in_reach = |c: &&RadarContact| c.id != ctl.id() && distance(here, c.position) < Self::REACH;

        let target = radar
            .iter()
            .filter(&in_reach)
            .find(|c| Some(c.id) == self.grudge)
            .or_else(|| radar.iter().find(&in_reach))
            .map(|c| c.position);

        match target {
            Some(position) => {
                ctl.set_heading(heading_to(here, position));
                let _ = ctl.attack();
            }
            None => {
                let heading = crate::normalize_heading(ctl.heading() + Self::SWEEP_STEP);
                ctl.set_heading(heading);
            }
        }
        Ok(())
    }
}

type RobotFactory = Box<dyn Fn() -> Box<dyn Robot>>;

/// Robot constructors by class name
pub struct RobotRegistry {
    factories: BTreeMap<String, RobotFactory>,
}

impl Default for RobotRegistry {
    fn default() -> Self {
        Self::with_samples()
    }
}

impl RobotRegistry {
    /// A registry with nothing in it
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A registry with the sample robots
    pub fn with_samples() -> Self {
        let mut registry = Self::empty();
        registry.register("MiddleBot", || Box::new(MiddleBot));
        registry.register("HunterKiller", || Box::new(HunterKiller));
        registry.register("Sitter", || Box::new(Sitter));
        registry.register("Sentry", || Box::new(Sentry::default()));
        registry
    }

    /// Add (or replace) a constructor
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Robot> + 'static,
    {
        let name = name.into();
        if self.factories.insert(name.clone(), Box::new(factory)).is_some() {
            log::warn!("Robot `{name}` registered twice, keeping the latest");
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build one robot
    pub fn build(&self, name: &str) -> Result<Box<dyn Robot>, BattleError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| BattleError::UnknownRobot(name.to_string()))
    }

    /// Build a roster in the order given; any unknown name fails the lot
    pub fn build_all<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Box<dyn Robot>>, BattleError> {
        names.iter().map(|name| self.build(name.as_ref())).collect()
    }
}
