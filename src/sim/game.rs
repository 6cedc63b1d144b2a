//! Simulation engine
//!
//! `Game` owns the battlefield and every robot. Robot logic runs inside
//! handler calls made by the engine and reaches back in through
//! [`Controls`], so all record writes happen here.
//!
//! A robot's boxed handler object is taken out of its slot for the duration
//! of a call. A strike aimed at a robot whose handler is already on the stack
//! is queued on that slot and delivered as soon as the running handler
//! returns.

use std::collections::VecDeque;

use glam::Vec2;

use super::geometry::{inverse_square_intensity, is_within_cone};
use super::state::{Battlefield, RngState, RobotId, RobotRecord};
use crate::consts::MIN_ATTACK_DISTANCE;
use crate::error::BattleError;
use crate::robot::{Controls, RadarContact, Robot, RobotEvent, Strike};
use crate::settings::Settings;
use crate::sim::Edge;

/// Event payload handed to a robot
pub(crate) enum Notification<'n> {
    Start(Vec2),
    Attacked(Strike),
    Bumped(Edge),
    Radar(&'n [RadarContact]),
}

impl Notification<'_> {
    fn kind(&self) -> RobotEvent {
        match self {
            Notification::Start(_) => RobotEvent::Start,
            Notification::Attacked(_) => RobotEvent::Attacked,
            Notification::Bumped(_) => RobotEvent::Bumped,
            Notification::Radar(_) => RobotEvent::Radar,
        }
    }
}

/// Robot logic plus strikes waiting for it
struct Slot {
    /// `None` while one of this robot's handlers is running
    robot: Option<Box<dyn Robot>>,
    deferred: VecDeque<Strike>,
}

/// Battle engine: battlefield, robots and the battle clock
pub struct Game {
    settings: Settings,
    pub(crate) field: Battlefield,
    slots: Vec<Slot>,
    rng_state: RngState,
    /// Battle time of the current tick (seconds)
    pub(crate) now: f32,
    /// Ticks run so far
    pub(crate) ticks: u64,
    /// First handler failure, held until the outermost dispatch returns
    fault: Option<BattleError>,
}

impl Game {
    /// Set up a battle with robots dropped at seeded random positions
    pub fn new(settings: Settings, robots: Vec<Box<dyn Robot>>) -> Result<Self, BattleError> {
        let mut game = Self::empty(settings, robots.len())?;
        let tags: Vec<String> = robots.iter().map(|r| r.tag().to_string()).collect();
        game.field
            .populate(tags.iter().map(String::as_str), &game.rng_state);
        game.slots = robots.into_iter().map(Slot::new).collect();
        Ok(game)
    }

    /// Set up a battle with every robot at a chosen starting point
    pub fn with_positions(
        settings: Settings,
        robots: Vec<(Box<dyn Robot>, Vec2)>,
    ) -> Result<Self, BattleError> {
        let mut game = Self::empty(settings, robots.len())?;
        for (robot, position) in robots {
            if !position.is_finite() {
                return Err(BattleError::InvalidPosition {
                    tag: robot.tag().to_string(),
                    position,
                });
            }
            game.field.spawn(robot.tag(), position);
            game.slots.push(Slot::new(robot));
        }
        Ok(game)
    }

    fn empty(settings: Settings, count: usize) -> Result<Self, BattleError> {
        settings.validate()?;
        if count == 0 {
            return Err(BattleError::NoRobots);
        }
        Ok(Self {
            field: Battlefield::new(settings.width, settings.height),
            slots: Vec::with_capacity(count),
            rng_state: RngState::new(settings.seed),
            settings,
            now: 0.0,
            ticks: 0,
            fault: None,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn battlefield(&self) -> &Battlefield {
        &self.field
    }

    pub fn seed(&self) -> u64 {
        self.rng_state.seed
    }

    /// Seconds of battle time so far
    pub fn elapsed(&self) -> f32 {
        self.now
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Record of a robot known to exist
    pub(crate) fn record(&self, id: RobotId) -> &RobotRecord {
        &self.field.records()[id.index()]
    }

    // === Queries ===

    pub fn position(&self, id: RobotId) -> Option<Vec2> {
        self.field.get(id).map(|r| r.position)
    }

    pub fn damage(&self, id: RobotId) -> Option<u32> {
        self.field.get(id).map(|r| r.damage)
    }

    pub fn heading(&self, id: RobotId) -> Option<f32> {
        self.field.get(id).map(|r| r.heading)
    }

    pub fn speed(&self, id: RobotId) -> Option<f32> {
        self.field.get(id).map(|r| r.speed)
    }

    pub fn tag(&self, id: RobotId) -> Option<&str> {
        self.field.get(id).map(|r| r.tag.as_str())
    }

    /// Robots still fighting, ascending by id
    pub fn active_robots(&self) -> Vec<RobotId> {
        self.field.active_ids()
    }

    // === Commands ===

    /// Store a new heading; any finite angle is accepted
    pub fn set_heading(&mut self, id: RobotId, rads: f32) {
        if !rads.is_finite() {
            log::warn!("{id} heading {rads} ignored");
            return;
        }
        if let Some(record) = self.field.get_mut(id) {
            record.heading = rads;
            log::debug!("{} {id} heading = {:.0}°", record.tag, rads.to_degrees());
        }
    }

    /// Store a new speed, clamped into `[0, max_speed]`
    pub fn set_speed(&mut self, id: RobotId, mps: f32) {
        let max_speed = self.settings.max_speed;
        let speed = if mps.is_nan() {
            log::warn!("{id} speed NaN treated as 0");
            0.0
        } else {
            mps.clamp(0.0, max_speed)
        };
        if let Some(record) = self.field.get_mut(id) {
            record.speed = speed;
            log::debug!("{} {id} speed = {speed:.2}", record.tag);
        }
    }

    /// Strike out along the robot's heading
    ///
    /// `Ok(false)` means the attack was declined. An error means a target's
    /// `on_attacked` handler failed.
    pub fn attack(&mut self, id: RobotId) -> Result<bool, BattleError> {
        let fired = self.resolve_attack(id);
        match self.fault.take() {
            Some(err) => Err(err),
            None => Ok(fired),
        }
    }

    /// Attack resolution shared by [`Game::attack`] and [`Controls::attack`]
    ///
    /// Modelled on a claymore: everything inside the blast cone takes damage
    /// falling off with the square of the distance, capped at the
    /// close-range maximum.
    pub(crate) fn resolve_attack(&mut self, id: RobotId) -> bool {
        // A failed handler has already ended the battle
        if self.fault.is_some() {
            return false;
        }
        let now = self.now;
        let cooldown = self.settings.attack_cooldown;
        let (origin, heading, tag) = match self.field.get_mut(id) {
            Some(attacker) if attacker.is_active() => {
                if let Some(last) = attacker.last_attacked_at {
                    if now - last < cooldown {
                        log::debug!("{} {id} attack declined, cooling down", attacker.tag);
                        return false;
                    }
                }
                attacker.last_attacked_at = Some(now);
                (attacker.position, attacker.heading, attacker.tag.clone())
            }
            _ => return false,
        };
        log::info!("{tag} {id} attacks");

        let max_damage = self.settings.attack_damage;
        let cone = self.settings.attack_angle;
        let rounding = self.settings.damage_rounding;

        for target_id in self.field.active_ids() {
            if self.fault.is_some() {
                break;
            }
            if target_id == id || !self.field.is_active(target_id) {
                continue;
            }
            let target_pos = self.record(target_id).position;
            // Sharing a spot with the attacker puts a robot inside the blast
            if !is_within_cone(origin, heading, cone, target_pos).unwrap_or(true) {
                continue;
            }
            let intensity = inverse_square_intensity(origin, target_pos, max_damage)
                .unwrap_or(max_damage / (MIN_ATTACK_DISTANCE * MIN_ATTACK_DISTANCE));
            let damage = rounding.apply(intensity.min(max_damage));
            if damage == 0 {
                continue;
            }

            let Some(target) = self.field.get_mut(target_id) else {
                continue;
            };
            let destroyed = target.take_damage(damage);
            log::info!("{} {target_id} suffered {damage} damage", target.tag);
            if destroyed {
                log::info!("{} {target_id} destroyed by {tag} {id}", target.tag);
            }

            let strike = Strike {
                attacker: id,
                attacker_tag: tag.clone(),
                damage,
            };
            if let Err(err) = self.deliver(target_id, Notification::Attacked(strike)) {
                self.fault.get_or_insert(err);
            }
        }
        true
    }

    // === Lifecycle ===

    /// Start the clock at `now` and tell each robot where it stands
    pub fn begin(&mut self, now: f32) -> Result<(), BattleError> {
        self.now = now;
        for record in self.field.records_mut() {
            record.last_moved_at = Some(now);
        }
        for index in 0..self.slots.len() {
            let id = RobotId(index);
            let position = self.record(id).position;
            log::info!("{} {id} started at ({:.1}, {:.1})", self.record(id).tag, position.x, position.y);
            self.deliver(id, Notification::Start(position))?;
        }
        Ok(())
    }

    /// Radar data: every active robot's id, tag and position, ascending by id
    pub fn radar_snapshot(&self) -> Vec<RadarContact> {
        self.field
            .records()
            .iter()
            .filter(|r| r.is_active())
            .map(|r| RadarContact {
                id: r.id,
                tag: r.tag.clone(),
                position: r.position,
            })
            .collect()
    }

    /// Run one of `id`'s handlers, then any strikes queued for it meanwhile
    pub(crate) fn deliver(&mut self, id: RobotId, note: Notification<'_>) -> Result<(), BattleError> {
        if self.fault.is_some() {
            return Ok(());
        }
        let Some(slot) = self.slots.get_mut(id.index()) else {
            return Ok(());
        };
        let Some(mut robot) = slot.robot.take() else {
            if let Notification::Attacked(strike) = note {
                slot.deferred.push_back(strike);
            }
            return Ok(());
        };

        let mut result = Ok(());
        let mut next = Some(note);
        while let Some(note) = next.take() {
            let event = note.kind();
            let outcome = {
                let mut ctl = Controls::new(self, id);
                match &note {
                    Notification::Start(position) => robot.on_start(&mut ctl, *position),
                    Notification::Attacked(strike) => robot.on_attacked(&mut ctl, strike),
                    Notification::Bumped(edge) => robot.on_bumped(&mut ctl, *edge),
                    Notification::Radar(radar) => robot.on_radar(&mut ctl, radar),
                }
            };
            if let Err(source) = outcome {
                result = Err(BattleError::RobotFault {
                    id,
                    tag: robot.tag().to_string(),
                    event,
                    source,
                });
                break;
            }
            if self.fault.is_some() {
                break;
            }
            next = self.slots[id.index()]
                .deferred
                .pop_front()
                .map(Notification::Attacked);
        }

        self.slots[id.index()].robot = Some(robot);
        match self.fault.take() {
            Some(err) => Err(err),
            None => result,
        }
    }
}

impl Slot {
    fn new(robot: Box<dyn Robot>) -> Self {
        Self {
            robot: Some(robot),
            deferred: VecDeque::new(),
        }
    }
}
