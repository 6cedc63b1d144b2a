//! Battle settings
//!
//! Passed explicitly into the engine and driver at construction. Loaded from a
//! JSON file by the command-line runner.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// How fractional attack damage becomes whole percentage points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DamageRounding {
    /// Drop the fraction (0.8 -> 0)
    #[default]
    Truncate,
    /// Round half away from zero (0.8 -> 1)
    Nearest,
    /// Any fraction counts as a full point (0.2 -> 1)
    Ceil,
}

impl DamageRounding {
    pub fn as_str(&self) -> &'static str {
        match self {
            DamageRounding::Truncate => "truncate",
            DamageRounding::Nearest => "nearest",
            DamageRounding::Ceil => "ceil",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "truncate" | "trunc" | "floor" => Some(DamageRounding::Truncate),
            "nearest" | "round" => Some(DamageRounding::Nearest),
            "ceil" | "ceiling" => Some(DamageRounding::Ceil),
            _ => None,
        }
    }

    /// Convert raw (non-negative) damage to whole points
    pub fn apply(&self, raw: f32) -> u32 {
        let rounded = match self {
            DamageRounding::Truncate => raw.trunc(),
            DamageRounding::Nearest => raw.round(),
            DamageRounding::Ceil => raw.ceil(),
        };
        rounded.max(0.0) as u32
    }
}

/// When a battle that still has two or more robots standing is called off
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleLimit {
    /// Stop once this many seconds of battle time have elapsed
    Duration(f32),
    /// Stop after this many ticks
    Ticks(u64),
}

impl Default for BattleLimit {
    fn default() -> Self {
        BattleLimit::Duration(MAX_DURATION)
    }
}

impl BattleLimit {
    /// Whether a battle at `elapsed` seconds after `ticks` ticks has run out
    pub fn reached(&self, elapsed: f32, ticks: u64) -> bool {
        match *self {
            BattleLimit::Duration(max) => elapsed >= max,
            BattleLimit::Ticks(max) => ticks >= max,
        }
    }
}

/// Errors loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{name}`: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Battle configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Field ===
    /// Field width (metres)
    pub width: f32,
    /// Field height (metres)
    pub height: f32,

    // === Movement ===
    /// Maximum robot speed (metres per second)
    pub max_speed: f32,

    // === Combat ===
    /// Full angular width of the attack blast (radians)
    pub attack_angle: f32,
    /// Damage at unit range (percent)
    pub attack_damage: f32,
    /// Minimum seconds between attacks by one robot
    pub attack_cooldown: f32,
    /// Fractional damage handling
    pub damage_rounding: DamageRounding,

    // === Timing ===
    /// Seconds between radar updates (and ticks)
    pub radar_interval: f32,
    /// When to call off an undecided battle
    pub limit: BattleLimit,

    /// Spawn placement seed
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: FIELD_WIDTH,
            height: FIELD_HEIGHT,

            max_speed: MAX_SPEED,

            attack_angle: ATTACK_ANGLE,
            attack_damage: ATTACK_DAMAGE,
            attack_cooldown: ATTACK_COOLDOWN,
            damage_rounding: DamageRounding::Truncate,

            radar_interval: RADAR_INTERVAL,
            limit: BattleLimit::default(),

            seed: 0,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        fn positive(name: &'static str, value: f32) -> Result<(), SettingsError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(SettingsError::Invalid {
                    name,
                    reason: format!("must be a positive number, got {value}"),
                })
            }
        }
        fn non_negative(name: &'static str, value: f32) -> Result<(), SettingsError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(SettingsError::Invalid {
                    name,
                    reason: format!("must be zero or more, got {value}"),
                })
            }
        }

        positive("width", self.width)?;
        positive("height", self.height)?;
        non_negative("max_speed", self.max_speed)?;
        non_negative("attack_angle", self.attack_angle)?;
        non_negative("attack_damage", self.attack_damage)?;
        non_negative("attack_cooldown", self.attack_cooldown)?;
        positive("radar_interval", self.radar_interval)?;
        match self.limit {
            BattleLimit::Duration(max) => non_negative("limit", max)?,
            BattleLimit::Ticks(_) => {}
        }
        Ok(())
    }

    /// Centre of the field
    pub fn middle(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_classic_arena() {
        let settings = Settings::default();
        assert_eq!(settings.width, 100.0);
        assert_eq!(settings.height, 100.0);
        assert_eq!(settings.max_speed, 10.0);
        assert_eq!(settings.attack_damage, 20.0);
        assert!((settings.attack_angle.to_degrees() - 15.0).abs() < 1e-4);
        assert_eq!(settings.limit, BattleLimit::Duration(10.0));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{"width": 50, "limit": {"ticks": 20}}"#).unwrap();
        assert_eq!(settings.width, 50.0);
        assert_eq!(settings.height, 100.0);
        assert_eq!(settings.limit, BattleLimit::Ticks(20));
    }

    #[test]
    fn test_invalid_field_rejected() {
        let err = Settings::from_json(r#"{"height": 0}"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { name: "height", .. }));

        let err = Settings::from_json(r#"{"radar_interval": -1}"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { name: "radar_interval", .. }));
    }

    #[test]
    fn test_damage_rounding() {
        assert_eq!(DamageRounding::Truncate.apply(0.8), 0);
        assert_eq!(DamageRounding::Nearest.apply(0.8), 1);
        assert_eq!(DamageRounding::Ceil.apply(0.2), 1);
        assert_eq!(DamageRounding::Truncate.apply(20.0), 20);
        assert_eq!(DamageRounding::from_str("ROUND"), Some(DamageRounding::Nearest));
        assert_eq!(DamageRounding::from_str("sideways"), None);
    }

    #[test]
    fn test_limit_reached() {
        assert!(!BattleLimit::Duration(1.0).reached(0.5, 1000));
        assert!(BattleLimit::Duration(1.0).reached(1.0, 0));
        assert!(!BattleLimit::Ticks(3).reached(100.0, 2));
        assert!(BattleLimit::Ticks(3).reached(0.0, 3));
    }
}
