//! Robot Arena - autonomous robots battling on a bounded field
//!
//! Core modules:
//! - `sim`: Deterministic simulation (geometry, battlefield state, engine)
//! - `robot`: The contract every robot implementation satisfies
//! - `robots`: Sample robots and the name registry
//! - `driver`: Battle state machine and time sources
//! - `recording`: Per-tick snapshots and the JSON recorder
//! - `settings`: Battle configuration

pub mod driver;
pub mod error;
pub mod recording;
pub mod robot;
pub mod robots;
pub mod settings;
pub mod sim;

pub use driver::{Battle, BattleOutcome, BattlePhase, BattleResult, Clock, SimulatedClock, Survivor, SystemClock};
pub use error::{BattleError, RobotFault};
pub use robot::{Controls, Robot, RobotEvent};
pub use robots::RobotRegistry;
pub use settings::{BattleLimit, DamageRounding, Settings};

/// Default battle configuration
pub mod consts {
    /// Field dimensions (metres)
    pub const FIELD_WIDTH: f32 = 100.0;
    pub const FIELD_HEIGHT: f32 = 100.0;

    /// Time between radar updates (seconds)
    pub const RADAR_INTERVAL: f32 = 0.010;
    /// Battle length limit, detects stalemates (seconds)
    pub const MAX_DURATION: f32 = 10.0;

    /// Maximum damage dealt at close range (percent)
    pub const ATTACK_DAMAGE: f32 = 20.0;
    /// Full width of the attack blast (radians, 15 degrees)
    pub const ATTACK_ANGLE: f32 = std::f32::consts::PI / 12.0;
    /// Minimum time between two attacks by the same robot (seconds)
    pub const ATTACK_COOLDOWN: f32 = 0.5;
    /// Distance floor used when attacker and target coincide
    pub const MIN_ATTACK_DISTANCE: f32 = 1.0;

    /// Metres per second
    pub const MAX_SPEED: f32 = 10.0;

    /// Damage at which a robot is destroyed (percent)
    pub const DESTROYED_DAMAGE: u32 = 100;
}

/// Normalize angle to [0, 2π)
#[inline]
pub fn normalize_heading(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(std::f32::consts::TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= std::f32::consts::TAU {
        0.0
    } else {
        wrapped
    }
}

/// Normalize angle difference to (-π, π]
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    angle = angle.rem_euclid(TAU);
    if angle > PI {
        angle -= TAU;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{PI, TAU};

    #[test]
    fn test_normalize_heading_wraps_into_range() {
        assert_eq!(normalize_heading(0.0), 0.0);
        assert!((normalize_heading(-PI / 2.0) - 3.0 * PI / 2.0).abs() < 1e-6);
        assert!((normalize_heading(TAU + 1.0) - 1.0).abs() < 1e-5);
        assert!(normalize_heading(-1e-9) < TAU);
    }

    #[test]
    fn test_normalize_angle_is_symmetric_around_zero() {
        assert!((normalize_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-5);
        assert!((normalize_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-5);
        assert!((normalize_angle(0.25) - 0.25).abs() < 1e-6);
    }
}
