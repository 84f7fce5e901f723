//! HP, XP and level

use serde::{Deserialize, Serialize};

/// Base max HP at level 1
pub const BASE_MAX_HP: u32 = 100;

/// XP needed to advance from `level`: `floor(100 * 1.5^level)`
///
/// Saturates at `u64::MAX` for absurd levels.
pub fn xp_threshold(level: u32) -> u64 {
    let exponent = i32::try_from(level).unwrap_or(i32::MAX);
    (100.0 * 1.5f64.powi(exponent)).floor() as u64
}

/// Character vitals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterVitals {
    pub current_hp: u32,
    /// Max HP before equipment and strength
    pub max_hp: u32,
    pub current_xp: u64,
    pub xp_to_next_level: u64,
    pub level: u32,
}

impl Default for CharacterVitals {
    fn default() -> Self {
        Self {
            current_hp: BASE_MAX_HP,
            max_hp: BASE_MAX_HP,
            current_xp: 0,
            xp_to_next_level: xp_threshold(1),
            level: 1,
        }
    }
}

impl CharacterVitals {
    /// Fraction of XP collected toward the next level
    pub fn xp_progress(&self) -> f32 {
        if self.xp_to_next_level == 0 {
            return 0.0;
        }
        (self.current_xp as f64 / self.xp_to_next_level as f64).min(1.0) as f32
    }
}
