//! Enemy loot rolls

use metal_inventory::catalog::{self, ArmorQuality, GemKind, ShieldQuality, SwordQuality};
use metal_inventory::{Item, Loot};
use rand::Rng;

/// Item family dropped by a corpse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LootDrop {
    Sword,
    Armor,
    Shield,
    HealthPotion,
    Gem,
    Nothing,
}

impl LootDrop {
    /// Map a single roll in `[0, 1)` to a drop family
    pub fn from_roll(roll: f64) -> Self {
        match roll {
            r if r < 0.10 => Self::Sword,
            r if r < 0.18 => Self::Armor,
            r if r < 0.26 => Self::Shield,
            r if r < 0.45 => Self::HealthPotion,
            r if r < 0.65 => Self::Gem,
            _ => Self::Nothing,
        }
    }

    /// Build the item, drawing its quality tier
    pub fn build<R: Rng + ?Sized>(self, rng: &mut R) -> Option<Item> {
        let item = match self {
            Self::Sword => catalog::sword(SwordQuality::roll(rng)),
            Self::Armor => catalog::armor(ArmorQuality::roll(rng)),
            Self::Shield => catalog::shield(ShieldQuality::roll(rng)),
            Self::HealthPotion => catalog::health_potion(),
            Self::Gem => catalog::gem(GemKind::roll(rng)),
            Self::Nothing => return None,
        };
        Some(item)
    }
}

/// Roll a full drop: gold from `[gold_min, gold_max]` plus maybe an item
pub fn roll_loot<R: Rng + ?Sized>(gold_min: u32, gold_max: u32, rng: &mut R) -> Loot {
    let drop = LootDrop::from_roll(rng.gen::<f64>());
    let item = drop.build(rng);
    let (lo, hi) = if gold_min <= gold_max {
        (gold_min, gold_max)
    } else {
        (gold_max, gold_min)
    };
    let gold = rng.gen_range(lo..=hi);
    Loot { gold, item }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_drop_bands() {
        assert_eq!(LootDrop::from_roll(0.0), LootDrop::Sword);
        assert_eq!(LootDrop::from_roll(0.0999), LootDrop::Sword);
        assert_eq!(LootDrop::from_roll(0.10), LootDrop::Armor);
        assert_eq!(LootDrop::from_roll(0.18), LootDrop::Shield);
        assert_eq!(LootDrop::from_roll(0.26), LootDrop::HealthPotion);
        assert_eq!(LootDrop::from_roll(0.45), LootDrop::Gem);
        assert_eq!(LootDrop::from_roll(0.65), LootDrop::Nothing);
        assert_eq!(LootDrop::from_roll(0.9999), LootDrop::Nothing);
    }

    #[test]
    fn test_build_families() {
        let mut rng = StdRng::seed_from_u64(5);
        let sword = LootDrop::Sword.build(&mut rng).unwrap();
        assert!(sword.key.ends_with("sword") || sword.key == "legendary_blade");
        assert_eq!(LootDrop::HealthPotion.build(&mut rng).unwrap().key, "health_potion");
        assert!(LootDrop::Nothing.build(&mut rng).is_none());
    }

    #[test]
    fn test_gold_within_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let loot = roll_loot(5, 15, &mut rng);
            assert!((5..=15).contains(&loot.gold));
        }
        assert_eq!(roll_loot(7, 7, &mut rng).gold, 7);
    }

    #[test]
    fn test_drop_rate_is_plausible() {
        let mut rng = StdRng::seed_from_u64(123);
        let drops = (0..10_000)
            .filter(|_| roll_loot(0, 0, &mut rng).item.is_some())
            .count();
        // 65% expected
        assert!((6_000..7_000).contains(&drops), "{drops}");
    }
}
