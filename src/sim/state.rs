//! Battlefield state
//!
//! Every mutable fact about a robot lives in its `RobotRecord`, and every
//! record lives in the `Battlefield`. Robots never hold a reference to their
//! own record; they reach it through the engine by id.

use std::fmt;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::DESTROYED_DAMAGE;

/// Stable robot identity, assigned in spawn order starting at 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RobotId(pub usize);

impl RobotId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RobotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Simulation record for one robot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotRecord {
    pub id: RobotId,
    /// Robot class name, for reporting and radar only
    pub tag: String,
    pub position: Vec2,
    /// Radians counterclockwise from east
    pub heading: f32,
    /// Metres per second
    pub speed: f32,
    /// Percent, 100 = destroyed
    pub damage: u32,
    /// Battle time of the last motion update
    pub last_moved_at: Option<f32>,
    /// Battle time of the last accepted attack
    pub last_attacked_at: Option<f32>,
}

impl RobotRecord {
    pub fn new(id: RobotId, tag: impl Into<String>, position: Vec2) -> Self {
        Self {
            id,
            tag: tag.into(),
            position,
            heading: 0.0,
            speed: 0.0,
            damage: 0,
            last_moved_at: None,
            last_attacked_at: None,
        }
    }

    /// Still fighting
    #[inline]
    pub fn is_active(&self) -> bool {
        self.damage < DESTROYED_DAMAGE
    }

    /// Add damage, saturating at the destruction threshold
    ///
    /// Returns true if this hit destroyed the robot.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        let was_active = self.is_active();
        self.damage = self.damage.saturating_add(amount).min(DESTROYED_DAMAGE);
        was_active && !self.is_active()
    }
}

/// Spawn RNG wrapper, kept so a battle can report how it was seeded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Field dimensions plus the record of every robot, indexed by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battlefield {
    pub width: f32,
    pub height: f32,
    /// One record per robot, `records[i].id == RobotId(i)`
    records: Vec<RobotRecord>,
}

impl Battlefield {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            records: Vec::new(),
        }
    }

    /// Add robots at seeded random positions, in the order given
    pub fn populate<'a>(&mut self, tags: impl IntoIterator<Item = &'a str>, rng_state: &RngState) {
        let mut rng = rng_state.to_rng();
        for tag in tags {
            // Whole-metre spawn points, like a grid drop
            let x = rng.random_range(0..self.width.max(1.0) as u32) as f32;
            let y = rng.random_range(0..self.height.max(1.0) as u32) as f32;
            self.spawn(tag, Vec2::new(x, y).min(Vec2::new(self.width, self.height)));
        }
    }

    /// Add one robot at a given position (clamped into the field)
    pub fn spawn(&mut self, tag: &str, position: Vec2) -> RobotId {
        let id = RobotId(self.records.len());
        let position = self.clamp(position);
        log::debug!("{tag} {id} spawned at ({:.1}, {:.1})", position.x, position.y);
        self.records.push(RobotRecord::new(id, tag, position));
        id
    }

    /// Clamp a point into the field
    #[inline]
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x.clamp(0.0, self.width), p.y.clamp(0.0, self.height))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn get(&self, id: RobotId) -> Option<&RobotRecord> {
        self.records.get(id.index())
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: RobotId) -> Option<&mut RobotRecord> {
        self.records.get_mut(id.index())
    }

    /// All records in id order, destroyed robots included
    pub fn records(&self) -> &[RobotRecord] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [RobotRecord] {
        &mut self.records
    }

    /// Ids of robots still fighting, ascending
    pub fn active_ids(&self) -> Vec<RobotId> {
        self.records
            .iter()
            .filter(|r| r.is_active())
            .map(|r| r.id)
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_active()).count()
    }

    #[inline]
    pub fn is_active(&self, id: RobotId) -> bool {
        self.get(id).is_some_and(RobotRecord::is_active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_populate_is_deterministic() {
        let mut a = Battlefield::new(100.0, 100.0);
        let mut b = Battlefield::new(100.0, 100.0);
        a.populate(["Alpha", "Beta", "Gamma"], &RngState::new(42));
        b.populate(["Alpha", "Beta", "Gamma"], &RngState::new(42));
        assert_eq!(a.records(), b.records());
        assert_eq!(a.len(), 3);
        for (i, record) in a.records().iter().enumerate() {
            assert_eq!(record.id, RobotId(i));
            assert_eq!(record.speed, 0.0);
            assert_eq!(record.damage, 0);
            assert_eq!(record.heading, 0.0);
            assert_eq!(record.last_moved_at, None);
            assert_eq!(record.last_attacked_at, None);
            assert!((0.0..=100.0).contains(&record.position.x));
            assert!((0.0..=100.0).contains(&record.position.y));
        }
    }

    #[test]
    fn test_damage_saturates_and_reports_destruction() {
        let mut record = RobotRecord::new(RobotId(0), "Tank", Vec2::ZERO);
        assert!(!record.take_damage(60));
        assert!(record.is_active());
        assert!(record.take_damage(60));
        assert_eq!(record.damage, 100);
        assert!(!record.is_active());
        // Already destroyed: no second destruction, no overflow
        assert!(!record.take_damage(u32::MAX));
        assert_eq!(record.damage, 100);
    }

    #[test]
    fn test_active_ids_skip_destroyed() {
        let mut field = Battlefield::new(10.0, 10.0);
        let a = field.spawn("A", Vec2::new(1.0, 1.0));
        let b = field.spawn("B", Vec2::new(2.0, 2.0));
        let c = field.spawn("C", Vec2::new(30.0, -4.0));
        assert_eq!(field.get(c).unwrap().position, Vec2::new(10.0, 0.0));

        field.get_mut(b).unwrap().take_damage(100);
        assert_eq!(field.active_ids(), vec![a, c]);
        assert_eq!(field.active_count(), 2);
        assert!(!field.is_active(b));
        assert!(!field.is_active(RobotId(9)));
        assert_eq!(field.len(), 3);
    }
}
