//! Enemy type table

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Enemy kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyType {
    Bandit,
    Wolf,
    Mutant,
    CastleGuard,
}

/// Level 1 stats for an enemy type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub name: &'static str,
    pub max_hp: u32,
    pub damage: u32,
    pub xp_reward: u32,
    pub gold_min: u32,
    pub gold_max: u32,
    /// Chase speed in units per second
    pub speed: f32,
    pub detection_range: f32,
    pub attack_range: f32,
    /// Seconds between swings
    pub attack_cooldown: f32,
}

static ENEMY_TABLE: [EnemyStats; 4] = [
    EnemyStats {
        name: "Bandit",
        max_hp: 50,
        damage: 5,
        xp_reward: 25,
        gold_min: 5,
        gold_max: 15,
        speed: 3.0,
        detection_range: 12.0,
        attack_range: 1.5,
        attack_cooldown: 1.5,
    },
    EnemyStats {
        name: "Wolf",
        max_hp: 35,
        damage: 4,
        xp_reward: 20,
        gold_min: 0,
        gold_max: 5,
        speed: 5.0,
        detection_range: 15.0,
        attack_range: 1.2,
        attack_cooldown: 1.0,
    },
    EnemyStats {
        name: "Mutant",
        max_hp: 90,
        damage: 9,
        xp_reward: 50,
        gold_min: 10,
        gold_max: 25,
        speed: 2.5,
        detection_range: 10.0,
        attack_range: 1.8,
        attack_cooldown: 2.0,
    },
    EnemyStats {
        name: "Castle Guard",
        max_hp: 120,
        damage: 12,
        xp_reward: 75,
        gold_min: 20,
        gold_max: 40,
        speed: 2.8,
        detection_range: 14.0,
        attack_range: 2.0,
        attack_cooldown: 1.8,
    },
];

/// Percent growth per level above 1
const HP_GROWTH: u64 = 15;
const DAMAGE_GROWTH: u64 = 10;
const XP_GROWTH: u64 = 20;
const GOLD_GROWTH: u64 = 15;

/// `base * (100 + growth * (level - 1)) / 100`, floored
fn scale(base: u32, growth: u64, level: u32) -> u32 {
    let level = u64::from(level.max(1));
    let factor = 100 + growth * (level - 1);
    let scaled = u64::from(base) * factor / 100;
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Stats after level scaling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaledStats {
    pub max_hp: u32,
    pub damage: u32,
    pub xp_reward: u32,
    /// Always `<= gold_max`
    pub gold_min: u32,
    pub gold_max: u32,
}

impl EnemyStats {
    /// Scale HP, damage, XP and gold to `level`
    ///
    /// Both gold bounds are scaled independently and then ordered, so the
    /// range can never be inverted.
    pub fn scaled(&self, level: u32) -> ScaledStats {
        let a = scale(self.gold_min, GOLD_GROWTH, level);
        let b = scale(self.gold_max, GOLD_GROWTH, level);
        ScaledStats {
            max_hp: scale(self.max_hp, HP_GROWTH, level).max(1),
            damage: scale(self.damage, DAMAGE_GROWTH, level),
            xp_reward: scale(self.xp_reward, XP_GROWTH, level),
            gold_min: a.min(b),
            gold_max: a.max(b),
        }
    }
}

impl EnemyType {
    /// Every type
    pub const ALL: [EnemyType; 4] = [Self::Bandit, Self::Wolf, Self::Mutant, Self::CastleGuard];

    /// Table row
    pub fn stats(self) -> &'static EnemyStats {
        &ENEMY_TABLE[self as usize]
    }

    /// Display name
    pub fn name(self) -> &'static str {
        self.stats().name
    }

    /// Pick a type uniformly
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Spawn level: the player's level shifted by -1, 0 or +1, never below 1
pub fn roll_spawn_level<R: Rng + ?Sized>(player_level: u32, rng: &mut R) -> u32 {
    let shift: i64 = rng.gen_range(-1..=1);
    let level = (i64::from(player_level) + shift).max(1);
    u32::try_from(level).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_bandit_row() {
        let bandit = EnemyType::Bandit.stats();
        assert_eq!(bandit.max_hp, 50);
        assert_eq!(bandit.damage, 5);
        assert_eq!(bandit.xp_reward, 25);
        assert_eq!((bandit.gold_min, bandit.gold_max), (5, 15));
        assert_eq!(bandit.detection_range, 12.0);
        assert_eq!(bandit.attack_range, 1.5);
    }

    #[test]
    fn test_table_order_matches_enum() {
        for ty in EnemyType::ALL {
            let expected = match ty {
                EnemyType::Bandit => "Bandit",
                EnemyType::Wolf => "Wolf",
                EnemyType::Mutant => "Mutant",
                EnemyType::CastleGuard => "Castle Guard",
            };
            assert_eq!(ty.name(), expected);
        }
    }

    #[test]
    fn test_level_one_is_unscaled() {
        let s = EnemyType::Bandit.stats().scaled(1);
        assert_eq!(s.max_hp, 50);
        assert_eq!(s.damage, 5);
        assert_eq!(s.xp_reward, 25);
        assert_eq!((s.gold_min, s.gold_max), (5, 15));
    }

    #[test]
    fn test_level_three_bandit() {
        let s = EnemyType::Bandit.stats().scaled(3);
        assert_eq!(s.max_hp, 65);
        assert_eq!(s.damage, 6);
        assert_eq!(s.xp_reward, 35);
        assert_eq!((s.gold_min, s.gold_max), (6, 19));
    }

    #[test]
    fn test_gold_range_never_inverts() {
        for ty in EnemyType::ALL {
            for level in [1, 2, 5, 50, 10_000] {
                let s = ty.stats().scaled(level);
                assert!(s.gold_min <= s.gold_max, "{ty:?} level {level}");
            }
        }
    }

    #[test]
    fn test_level_zero_treated_as_one() {
        assert_eq!(EnemyType::Wolf.stats().scaled(0), EnemyType::Wolf.stats().scaled(1));
    }

    #[test]
    fn test_spawn_level_bounds() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            assert!(roll_spawn_level(1, &mut rng) >= 1);
            let l = roll_spawn_level(5, &mut rng);
            assert!((4..=6).contains(&l));
        }
    }
}
