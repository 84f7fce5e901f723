//! Floating damage numbers
//!
//! Purely visual. They rise, arc under gravity and expire; nothing in the
//! simulation reads them back.

use metal_core::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default downward acceleration (units/s²)
pub const DEFAULT_GRAVITY: f32 = -2.0;
/// Default lifetime in seconds
pub const DEFAULT_LIFETIME: f32 = 1.5;

/// Initial rise speed
const RISE_SPEED: f32 = 2.0;
/// Extra rise speed for critical hits
const CRIT_RISE_BONUS: f32 = 0.5;
/// Horizontal drift range (each axis, ±)
const DRIFT_RANGE: f32 = 0.5;
/// Height above the entity origin where numbers appear
const SPAWN_HEIGHT: f32 = 2.0;

/// Type of damage number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageNumberKind {
    /// Regular damage
    Damage,
    /// Critical hit
    Critical,
    /// Healing
    Heal,
    /// Blocked
    Block,
}

/// A floating damage number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageNumber {
    /// The value to display
    pub amount: u32,
    /// Kind of number
    pub kind: DamageNumberKind,
    /// World position
    pub position: Vec3,
    /// Current velocity
    pub velocity: Vec3,
    /// Time alive
    pub age: f32,
}

impl DamageNumber {
    /// Create a damage number above `origin` with a random horizontal drift
    pub fn new<R: Rng + ?Sized>(
        amount: u32,
        kind: DamageNumberKind,
        origin: Vec3,
        rng: &mut R,
    ) -> Self {
        let drift_x = rng.gen_range(-DRIFT_RANGE..=DRIFT_RANGE);
        let drift_z = rng.gen_range(-DRIFT_RANGE..=DRIFT_RANGE);
        Self::with_drift(amount, kind, origin, drift_x, drift_z)
    }

    /// Create a damage number with an explicit drift
    pub fn with_drift(
        amount: u32,
        kind: DamageNumberKind,
        origin: Vec3,
        drift_x: f32,
        drift_z: f32,
    ) -> Self {
        let rise = match kind {
            DamageNumberKind::Critical => RISE_SPEED + CRIT_RISE_BONUS,
            _ => RISE_SPEED,
        };
        Self {
            amount,
            kind,
            position: origin + Vec3::new(0.0, SPAWN_HEIGHT, 0.0),
            velocity: Vec3::new(drift_x, rise, drift_z),
            age: 0.0,
        }
    }

    /// Advance by `dt` under `gravity`
    pub fn update(&mut self, dt: f32, gravity: f32) {
        self.age += dt;
        self.velocity.y += gravity * dt;
        self.position += self.velocity * dt;
    }

    /// Whether the number has outlived `lifetime`
    pub fn is_expired(&self, lifetime: f32) -> bool {
        self.age > lifetime
    }

    /// Opacity, fading over the last third of `lifetime`
    pub fn opacity(&self, lifetime: f32) -> f32 {
        let fade_start = lifetime * (2.0 / 3.0);
        if self.age <= fade_start {
            1.0
        } else {
            (1.0 - (self.age - fade_start) / (lifetime - fade_start)).clamp(0.0, 1.0)
        }
    }

    /// Display color (RGB)
    pub fn color(&self) -> [f32; 3] {
        match self.kind {
            DamageNumberKind::Damage => [1.0, 1.0, 1.0],
            DamageNumberKind::Critical => [1.0, 0.8, 0.0], // Gold
            DamageNumberKind::Heal => [0.2, 1.0, 0.2],
            DamageNumberKind::Block => [0.5, 0.5, 0.5],
        }
    }

    /// Display text
    pub fn text(&self) -> String {
        match self.kind {
            DamageNumberKind::Block => "BLOCKED".to_string(),
            DamageNumberKind::Heal => format!("+{}", self.amount),
            DamageNumberKind::Critical => format!("{}!", self.amount),
            DamageNumberKind::Damage => self.amount.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_damage_number() {
        let mut rng = StdRng::seed_from_u64(1);
        let dn = DamageNumber::new(50, DamageNumberKind::Damage, Vec3::ZERO, &mut rng);

        assert_eq!(dn.amount, 50);
        assert_eq!(dn.text(), "50");
        assert!(dn.velocity.y > 0.0);
        assert!(dn.velocity.x.abs() <= DRIFT_RANGE);
    }

    #[test]
    fn test_text_per_kind() {
        let at = Vec3::ZERO;
        assert_eq!(DamageNumber::with_drift(25, DamageNumberKind::Heal, at, 0.0, 0.0).text(), "+25");
        assert_eq!(DamageNumber::with_drift(9, DamageNumberKind::Critical, at, 0.0, 0.0).text(), "9!");
        assert_eq!(DamageNumber::with_drift(0, DamageNumberKind::Block, at, 0.0, 0.0).text(), "BLOCKED");
    }

    #[test]
    fn test_gravity() {
        let mut dn = DamageNumber::with_drift(5, DamageNumberKind::Damage, Vec3::ZERO, 0.0, 0.0);

        dn.update(0.5, DEFAULT_GRAVITY);
        assert_relative_eq!(dn.velocity.y, 1.0);
        assert_relative_eq!(dn.age, 0.5);
        assert!(dn.position.y > SPAWN_HEIGHT);
    }

    #[test]
    fn test_expiry() {
        let mut dn = DamageNumber::with_drift(5, DamageNumberKind::Damage, Vec3::ZERO, 0.0, 0.0);

        dn.update(1.5, DEFAULT_GRAVITY);
        assert!(!dn.is_expired(DEFAULT_LIFETIME));
        dn.update(0.01, DEFAULT_GRAVITY);
        assert!(dn.is_expired(DEFAULT_LIFETIME));
        assert_relative_eq!(dn.opacity(DEFAULT_LIFETIME), 0.0);
    }
}
