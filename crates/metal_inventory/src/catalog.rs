//! Item catalog
//!
//! Every item family is a static table indexed by its quality tag. Tiered
//! draws map a single uniform roll in `[0, 1)` onto cumulative bands, so the
//! pure `from_roll` functions can be tested at the band edges without an RNG.

use crate::equipment::EquipmentSlot;
use crate::item::{Item, ItemBonuses, ItemCategory, ItemRarity};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Stack limit for potions
pub const POTION_STACK: u32 = 10;
/// Stack limit for gems
pub const GEM_STACK: u32 = 20;
/// Stack limit for tomes
pub const TOME_STACK: u32 = 5;

/// One row of a gear table
#[derive(Debug, Clone, Copy)]
pub struct GearRow {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub rarity: ItemRarity,
    pub value: u32,
    pub bonuses: ItemBonuses,
}

const fn gear_bonuses(damage: u32, armor: u32, hp: u32, strength: u32, dexterity: u32, block: u32) -> ItemBonuses {
    ItemBonuses {
        strength,
        dexterity,
        intelligence: 0,
        hp,
        damage,
        armor,
        block_chance: block,
    }
}

/// Pick the first band whose upper bound exceeds `roll`, or `last`
fn band<T: Copy>(roll: f64, bands: &[(f64, T)], last: T) -> T {
    bands
        .iter()
        .find(|(upper, _)| roll < *upper)
        .map(|(_, value)| *value)
        .unwrap_or(last)
}

fn gear_item(row: &GearRow, category: ItemCategory, slot: EquipmentSlot) -> Item {
    Item::new(row.key, row.name)
        .with_description(row.description)
        .with_category(category)
        .with_rarity(row.rarity)
        .with_value(row.value)
        .with_bonuses(row.bonuses)
        .with_equip_slot(slot)
}

// ---------------------------------------------------------------------------
// Swords
// ---------------------------------------------------------------------------

/// Sword quality tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwordQuality {
    Rusty,
    Iron,
    Steel,
    Mithril,
    Legendary,
}

static SWORDS: [GearRow; 5] = [
    GearRow {
        key: "rusty_sword",
        name: "Rusty Sword",
        description: "Pitted and dull, but still sharp at the tip.",
        rarity: ItemRarity::Common,
        value: 10,
        bonuses: gear_bonuses(3, 0, 0, 0, 0, 0),
    },
    GearRow {
        key: "iron_sword",
        name: "Iron Sword",
        description: "A plain, dependable blade.",
        rarity: ItemRarity::Uncommon,
        value: 30,
        bonuses: gear_bonuses(6, 0, 0, 0, 0, 0),
    },
    GearRow {
        key: "steel_sword",
        name: "Steel Sword",
        description: "Well balanced and keen.",
        rarity: ItemRarity::Rare,
        value: 75,
        bonuses: gear_bonuses(10, 0, 0, 1, 0, 0),
    },
    GearRow {
        key: "mithril_sword",
        name: "Mithril Sword",
        description: "Light as a feather, hard as diamond.",
        rarity: ItemRarity::Epic,
        value: 200,
        bonuses: gear_bonuses(15, 0, 0, 2, 2, 0),
    },
    GearRow {
        key: "legendary_blade",
        name: "Legendary Blade",
        description: "Forged for a king who never returned.",
        rarity: ItemRarity::Legendary,
        value: 500,
        bonuses: gear_bonuses(25, 0, 10, 5, 0, 0),
    },
];

impl SwordQuality {
    /// All tiers, weakest first
    pub const ALL: [SwordQuality; 5] = [
        Self::Rusty,
        Self::Iron,
        Self::Steel,
        Self::Mithril,
        Self::Legendary,
    ];

    /// Map a roll in `[0, 1)` to a tier
    pub fn from_roll(roll: f64) -> Self {
        band(
            roll,
            &[
                (0.50, Self::Rusty),
                (0.80, Self::Iron),
                (0.95, Self::Steel),
                (0.99, Self::Mithril),
            ],
            Self::Legendary,
        )
    }

    /// Draw a tier
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_roll(rng.gen::<f64>())
    }

    /// Table row for this tier
    pub fn row(self) -> &'static GearRow {
        &SWORDS[self as usize]
    }
}

/// Build a sword
pub fn sword(quality: SwordQuality) -> Item {
    gear_item(quality.row(), ItemCategory::Weapon, EquipmentSlot::MainHand)
}

// ---------------------------------------------------------------------------
// Body armor
// ---------------------------------------------------------------------------

/// Body armor quality tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArmorQuality {
    Leather,
    Chain,
    Plate,
    Dragon,
}

static ARMORS: [GearRow; 4] = [
    GearRow {
        key: "leather_armor",
        name: "Leather Armor",
        description: "Boiled leather, stitched tight.",
        rarity: ItemRarity::Common,
        value: 15,
        bonuses: gear_bonuses(0, 2, 5, 0, 0, 0),
    },
    GearRow {
        key: "chain_mail",
        name: "Chain Mail",
        description: "Interlocking rings of iron.",
        rarity: ItemRarity::Uncommon,
        value: 45,
        bonuses: gear_bonuses(0, 5, 10, 0, 0, 0),
    },
    GearRow {
        key: "plate_armor",
        name: "Plate Armor",
        description: "Heavy steel plates over padding.",
        rarity: ItemRarity::Rare,
        value: 120,
        bonuses: gear_bonuses(0, 9, 20, 0, 0, 0),
    },
    GearRow {
        key: "dragon_armor",
        name: "Dragon Scale Armor",
        description: "Scales that still feel warm.",
        rarity: ItemRarity::Legendary,
        value: 400,
        bonuses: gear_bonuses(0, 15, 40, 2, 0, 0),
    },
];

impl ArmorQuality {
    /// All tiers, weakest first
    pub const ALL: [ArmorQuality; 4] = [Self::Leather, Self::Chain, Self::Plate, Self::Dragon];

    /// Map a roll in `[0, 1)` to a tier
    pub fn from_roll(roll: f64) -> Self {
        band(
            roll,
            &[(0.55, Self::Leather), (0.85, Self::Chain), (0.97, Self::Plate)],
            Self::Dragon,
        )
    }

    /// Draw a tier
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_roll(rng.gen::<f64>())
    }

    /// Table row for this tier
    pub fn row(self) -> &'static GearRow {
        &ARMORS[self as usize]
    }
}

/// Build a piece of body armor
pub fn armor(quality: ArmorQuality) -> Item {
    gear_item(quality.row(), ItemCategory::Armor, EquipmentSlot::Chest)
}

// ---------------------------------------------------------------------------
// Shields
// ---------------------------------------------------------------------------

/// Shield quality tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShieldQuality {
    Wooden,
    Iron,
    Tower,
    Aegis,
}

static SHIELDS: [GearRow; 4] = [
    GearRow {
        key: "wooden_shield",
        name: "Wooden Shield",
        description: "Oak planks bound with rope.",
        rarity: ItemRarity::Common,
        value: 12,
        bonuses: gear_bonuses(0, 1, 0, 0, 0, 10),
    },
    GearRow {
        key: "iron_shield",
        name: "Iron Shield",
        description: "A round shield with an iron boss.",
        rarity: ItemRarity::Uncommon,
        value: 40,
        bonuses: gear_bonuses(0, 2, 0, 0, 0, 20),
    },
    GearRow {
        key: "tower_shield",
        name: "Tower Shield",
        description: "Tall enough to hide behind.",
        rarity: ItemRarity::Rare,
        value: 110,
        bonuses: gear_bonuses(0, 4, 0, 0, 0, 30),
    },
    GearRow {
        key: "aegis",
        name: "Aegis",
        description: "No blade has ever marked it.",
        rarity: ItemRarity::Legendary,
        value: 350,
        bonuses: gear_bonuses(0, 6, 20, 0, 0, 45),
    },
];

impl ShieldQuality {
    /// All tiers, weakest first
    pub const ALL: [ShieldQuality; 4] = [Self::Wooden, Self::Iron, Self::Tower, Self::Aegis];

    /// Map a roll in `[0, 1)` to a tier
    pub fn from_roll(roll: f64) -> Self {
        band(
            roll,
            &[(0.55, Self::Wooden), (0.85, Self::Iron), (0.97, Self::Tower)],
            Self::Aegis,
        )
    }

    /// Draw a tier
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_roll(rng.gen::<f64>())
    }

    /// Table row for this tier
    pub fn row(self) -> &'static GearRow {
        &SHIELDS[self as usize]
    }
}

/// Build a shield
pub fn shield(quality: ShieldQuality) -> Item {
    gear_item(quality.row(), ItemCategory::Armor, EquipmentSlot::OffHand)
}

// ---------------------------------------------------------------------------
// Gems
// ---------------------------------------------------------------------------

/// Gem kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GemKind {
    Ruby,
    Sapphire,
    Emerald,
    Diamond,
}

impl GemKind {
    /// All kinds, most common first
    pub const ALL: [GemKind; 4] = [Self::Ruby, Self::Sapphire, Self::Emerald, Self::Diamond];

    /// Map a roll in `[0, 1)` to a kind
    pub fn from_roll(roll: f64) -> Self {
        band(
            roll,
            &[(0.45, Self::Ruby), (0.75, Self::Sapphire), (0.93, Self::Emerald)],
            Self::Diamond,
        )
    }

    /// Draw a kind
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_roll(rng.gen::<f64>())
    }

    /// (key, name, rarity, value)
    fn data(self) -> (&'static str, &'static str, ItemRarity, u32) {
        match self {
            Self::Ruby => ("ruby", "Ruby", ItemRarity::Uncommon, 25),
            Self::Sapphire => ("sapphire", "Sapphire", ItemRarity::Uncommon, 40),
            Self::Emerald => ("emerald", "Emerald", ItemRarity::Rare, 60),
            Self::Diamond => ("diamond", "Diamond", ItemRarity::Epic, 120),
        }
    }
}

/// Build a gem
pub fn gem(kind: GemKind) -> Item {
    let (key, name, rarity, value) = kind.data();
    Item::new(key, name)
        .with_description("A cut gemstone. Vendors pay well for these.")
        .with_category(ItemCategory::Material)
        .with_rarity(rarity)
        .with_max_stack(GEM_STACK)
        .with_value(value)
}

// ---------------------------------------------------------------------------
// Consumables
// ---------------------------------------------------------------------------

/// Restores 30 HP
pub fn health_potion() -> Item {
    Item::new("health_potion", "Health Potion")
        .with_description("Restores 30 HP.")
        .with_category(ItemCategory::Consumable)
        .with_max_stack(POTION_STACK)
        .with_value(15)
        .with_heal(30)
}

/// Restores 75 HP
pub fn greater_health_potion() -> Item {
    Item::new("greater_health_potion", "Greater Health Potion")
        .with_description("Restores 75 HP.")
        .with_category(ItemCategory::Consumable)
        .with_rarity(ItemRarity::Uncommon)
        .with_max_stack(POTION_STACK)
        .with_value(40)
        .with_heal(75)
}

/// Grants 100 XP
pub fn xp_tome() -> Item {
    Item::new("xp_tome", "Tome of Experience")
        .with_description("Reading it grants 100 XP.")
        .with_category(ItemCategory::Consumable)
        .with_rarity(ItemRarity::Rare)
        .with_max_stack(TOME_STACK)
        .with_value(80)
        .with_xp(100)
}

// ---------------------------------------------------------------------------
// Vendor gear
// ---------------------------------------------------------------------------

/// Simple leather cap
pub fn leather_cap() -> Item {
    Item::new("leather_cap", "Leather Cap")
        .with_category(ItemCategory::Armor)
        .with_value(12)
        .with_bonuses(gear_bonuses(0, 1, 5, 0, 0, 0))
        .with_equip_slot(EquipmentSlot::Head)
}

/// Leather boots
pub fn leather_boots() -> Item {
    Item::new("leather_boots", "Leather Boots")
        .with_category(ItemCategory::Armor)
        .with_value(14)
        .with_bonuses(gear_bonuses(0, 1, 0, 0, 1, 0))
        .with_equip_slot(EquipmentSlot::Feet)
}

/// Leather gloves
pub fn leather_gloves() -> Item {
    Item::new("leather_gloves", "Leather Gloves")
        .with_category(ItemCategory::Armor)
        .with_value(14)
        .with_bonuses(gear_bonuses(0, 1, 0, 1, 0, 0))
        .with_equip_slot(EquipmentSlot::Hands)
}

/// Leather leggings
pub fn leather_leggings() -> Item {
    Item::new("leather_leggings", "Leather Leggings")
        .with_category(ItemCategory::Armor)
        .with_value(18)
        .with_bonuses(gear_bonuses(0, 2, 5, 0, 0, 0))
        .with_equip_slot(EquipmentSlot::Legs)
}

/// Ring of the scholar
pub fn scholar_ring() -> Item {
    Item::new("scholar_ring", "Scholar's Ring")
        .with_category(ItemCategory::Misc)
        .with_rarity(ItemRarity::Uncommon)
        .with_value(60)
        .with_bonuses(ItemBonuses {
            intelligence: 3,
            ..ItemBonuses::default()
        })
        .with_equip_slot(EquipmentSlot::Accessory1)
}

/// Amulet of vigor
pub fn vigor_amulet() -> Item {
    Item::new("vigor_amulet", "Amulet of Vigor")
        .with_category(ItemCategory::Misc)
        .with_rarity(ItemRarity::Rare)
        .with_value(90)
        .with_bonuses(ItemBonuses {
            hp: 15,
            strength: 1,
            ..ItemBonuses::default()
        })
        .with_equip_slot(EquipmentSlot::Accessory1)
}

/// Build an item from its template key
pub fn by_key(key: &str) -> Option<Item> {
    let item = match key {
        "health_potion" => health_potion(),
        "greater_health_potion" => greater_health_potion(),
        "xp_tome" => xp_tome(),
        "leather_cap" => leather_cap(),
        "leather_boots" => leather_boots(),
        "leather_gloves" => leather_gloves(),
        "leather_leggings" => leather_leggings(),
        "scholar_ring" => scholar_ring(),
        "vigor_amulet" => vigor_amulet(),
        _ => {
            if let Some(q) = SwordQuality::ALL.iter().find(|q| q.row().key == key) {
                sword(*q)
            } else if let Some(q) = ArmorQuality::ALL.iter().find(|q| q.row().key == key) {
                armor(*q)
            } else if let Some(q) = ShieldQuality::ALL.iter().find(|q| q.row().key == key) {
                shield(*q)
            } else if let Some(g) = GemKind::ALL.iter().find(|g| g.data().0 == key) {
                gem(*g)
            } else {
                return None;
            }
        }
    };
    Some(item)
}
