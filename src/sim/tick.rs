//! Simulation tick
//!
//! One tick broadcasts radar, then integrates every active robot's motion
//! over the time since it last moved. Both passes walk robots in ascending id
//! order; a robot destroyed part way through a tick is skipped for the rest
//! of it.

use super::collision::{clamp_to_field, destination};
use super::game::{Game, Notification};
use crate::error::BattleError;

impl Game {
    /// Advance the battle to battle time `now` (seconds)
    pub fn tick(&mut self, now: f32) -> Result<(), BattleError> {
        self.now = now;
        self.ticks += 1;
        log::debug!("tick {} at {now:.3}s, {} active", self.ticks, self.field.active_count());

        self.radar_pass()?;
        self.motion_pass()?;
        Ok(())
    }

    fn radar_pass(&mut self) -> Result<(), BattleError> {
        let radar = self.radar_snapshot();
        for contact in &radar {
            if !self.field.is_active(contact.id) {
                continue;
            }
            self.deliver(contact.id, Notification::Radar(&radar))?;
        }
        Ok(())
    }

    fn motion_pass(&mut self) -> Result<(), BattleError> {
        let now = self.now;
        let (width, height) = (self.field.width, self.field.height);

        for id in self.field.active_ids() {
            let Some(record) = self.field.get_mut(id) else {
                continue;
            };
            if !record.is_active() {
                continue;
            }
            let dt = record.last_moved_at.map_or(0.0, |then| (now - then).max(0.0));
            let to = destination(record.position, record.heading, record.speed, dt);
            let result = clamp_to_field(to, width, height);

            record.position = result.position;
            record.last_moved_at = Some(now);
            if !result.bumped() {
                continue;
            }

            record.speed = 0.0;
            log::info!(
                "{} {id} bumped into the {} wall at ({:.1}, {:.1})",
                record.tag,
                result.edges().map(|e| e.as_str()).collect::<Vec<_>>().join("/"),
                result.position.x,
                result.position.y
            );
            for edge in result.edges() {
                self.deliver(id, Notification::Bumped(edge))?;
            }
        }
        Ok(())
    }
}
