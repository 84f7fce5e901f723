//! Physics configuration

use crate::error::{PhysicsError, Result};
use serde::{Deserialize, Serialize};

/// Collision and timing constants for one simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Largest frame delta the simulation accepts (seconds)
    pub max_delta: f32,

    /// Collision radius of enemies and NPCs
    pub creature_radius: f32,

    /// Collision radius of the player
    pub player_radius: f32,

    /// Extra push added on top of half the overlap
    pub separation_epsilon: f32,

    /// Highest ledge the player can step onto
    pub step_height: f32,

    /// Vertical acceleration applied to damage numbers
    pub damage_number_gravity: f32,

    /// Damage number lifetime (seconds)
    pub damage_number_lifetime: f32,

    /// Time a corpse stays before it is removed (seconds)
    pub corpse_lifetime: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            max_delta: 0.1,
            creature_radius: 0.4,
            player_radius: 0.5,
            separation_epsilon: 0.01,
            step_height: 0.6,
            damage_number_gravity: -2.0,
            damage_number_lifetime: 1.5,
            corpse_lifetime: 60.0,
        }
    }
}

impl PhysicsConfig {
    /// Looser delta clamp for hosts stepping at low frame rates
    pub fn lenient() -> Self {
        Self {
            max_delta: 0.25,
            ..Default::default()
        }
    }

    /// Set maximum frame delta
    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        self.max_delta = max_delta;
        self
    }

    /// Set creature radius
    pub fn with_creature_radius(mut self, radius: f32) -> Self {
        self.creature_radius = radius;
        self
    }

    /// Set player radius
    pub fn with_player_radius(mut self, radius: f32) -> Self {
        self.player_radius = radius;
        self
    }

    /// Set corpse lifetime
    pub fn with_corpse_lifetime(mut self, seconds: f32) -> Self {
        self.corpse_lifetime = seconds;
        self
    }

    /// Clamp a frame delta into `[0, max_delta]`
    ///
    /// NaN becomes zero.
    pub fn clamp_delta(&self, dt: f32) -> f32 {
        if dt.is_nan() {
            log::warn!("NaN frame delta treated as zero");
            return 0.0;
        }
        if dt > self.max_delta {
            log::debug!("Clamping frame delta {:.3}s to {:.3}s", dt, self.max_delta);
        }
        dt.max(0.0).min(self.max_delta)
    }

    /// Reject values the solver cannot work with
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("max_delta", self.max_delta),
            ("creature_radius", self.creature_radius),
            ("player_radius", self.player_radius),
            ("damage_number_lifetime", self.damage_number_lifetime),
            ("corpse_lifetime", self.corpse_lifetime),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(PhysicsError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.separation_epsilon < 0.0 || self.step_height < 0.0 {
            return Err(PhysicsError::InvalidConfig(
                "separation_epsilon and step_height must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
