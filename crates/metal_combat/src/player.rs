//! The player character
//!
//! Effective stats are never stored. Every accessor recomputes them from the
//! base attributes and whatever is equipped right now, so equipping an item
//! can never leave a stale total behind.

use crate::attributes::{Attribute, CharacterAttributes, BASE_ATTRIBUTE};
use crate::error::{ConsumeError, ProgressionError};
use crate::vitals::{xp_threshold, CharacterVitals};
use metal_core::Vec3;
use metal_inventory::{
    EquipError, Equipment, EquipmentSlot, Inventory, InventoryError, Item, ItemBonuses, Loot,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Damage dealt with no strength and no weapon
pub const BASE_DAMAGE: u32 = 5;
/// Block chance cap in percent
pub const MAX_BLOCK_CHANCE: u32 = 75;
/// Chance for a swing to crit
pub const CRIT_CHANCE: f64 = 0.10;
/// Crit damage multiplier
pub const CRIT_MULTIPLIER: u32 = 2;
/// Attribute points per level
pub const POINTS_PER_LEVEL: u32 = 3;
/// Walk speed before the dexterity modifier
pub const BASE_MOVE_SPEED: f32 = 5.0;

/// Outcome of an attack roll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackRoll {
    pub damage: u32,
    pub critical: bool,
}

/// What using a consumable did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumableEffect {
    pub healed: u32,
    pub xp_gained: u64,
    pub levels_gained: u32,
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerCharacter {
    pub name: String,
    pub attributes: CharacterAttributes,
    pub vitals: CharacterVitals,
    pub inventory: Inventory,
    pub equipment: Equipment,
    pub unspent_points: u32,
    pub position: Vec3,
    pub yaw: f32,
}

impl PlayerCharacter {
    /// Create a fresh level 1 character at full health
    pub fn new(name: impl Into<String>) -> Self {
        let mut player = Self {
            name: name.into(),
            attributes: CharacterAttributes::default(),
            vitals: CharacterVitals::default(),
            inventory: Inventory::default(),
            equipment: Equipment::new(),
            unspent_points: 0,
            position: Vec3::ZERO,
            yaw: 0.0,
        };
        player.vitals.current_hp = player.effective_max_hp();
        player
    }

    /// Set the starting position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    // ------------------------------------------------------------------
    // Derived stats
    // ------------------------------------------------------------------

    /// Sum of equipped bonuses
    pub fn equipment_bonuses(&self) -> ItemBonuses {
        self.equipment.bonuses()
    }

    pub fn effective_strength(&self) -> u32 {
        self.attributes.strength + self.equipment_bonuses().strength
    }

    pub fn effective_dexterity(&self) -> u32 {
        self.attributes.dexterity + self.equipment_bonuses().dexterity
    }

    pub fn effective_intelligence(&self) -> u32 {
        self.attributes.intelligence + self.equipment_bonuses().intelligence
    }

    /// Base max HP + equipment HP + 5 per point of strength
    pub fn effective_max_hp(&self) -> u32 {
        self.vitals
            .max_hp
            .saturating_add(self.equipment_bonuses().hp)
            .saturating_add(self.effective_strength().saturating_mul(5))
    }

    /// Raw swing damage
    pub fn effective_damage(&self) -> u32 {
        BASE_DAMAGE + self.effective_strength() / 2 + self.equipment_bonuses().damage
    }

    /// Flat damage reduction
    pub fn effective_armor(&self) -> u32 {
        self.equipment_bonuses().armor + self.effective_dexterity() / 4
    }

    /// Block chance in percent, capped
    pub fn effective_block_chance(&self) -> u32 {
        self.equipment_bonuses().block_chance.min(MAX_BLOCK_CHANCE)
    }

    /// Movement speed multiplier from dexterity
    pub fn speed_modifier(&self) -> f32 {
        1.0 + (self.effective_dexterity() as f32 - BASE_ATTRIBUTE as f32) * 0.02
    }

    /// Walk speed in units per second
    pub fn move_speed(&self) -> f32 {
        BASE_MOVE_SPEED * self.speed_modifier()
    }

    // ------------------------------------------------------------------
    // Combat
    // ------------------------------------------------------------------

    pub fn is_dead(&self) -> bool {
        self.vitals.current_hp == 0
    }

    pub fn current_hp(&self) -> u32 {
        self.vitals.current_hp
    }

    pub fn level(&self) -> u32 {
        self.vitals.level
    }

    /// Damage after armor for a raw hit
    ///
    /// Armor absorbs at most `raw - 1`, so any nonzero hit deals at least 1.
    pub fn mitigated_damage(&self, raw: u32) -> u32 {
        if raw == 0 {
            return 0;
        }
        let reduction = (raw - 1).min(self.effective_armor());
        (raw - reduction).max(1)
    }

    /// Apply a raw hit, returning HP actually lost
    pub fn take_damage(&mut self, raw: u32) -> u32 {
        let actual = self.mitigated_damage(raw).min(self.vitals.current_hp);
        self.vitals.current_hp -= actual;
        if actual > 0 && self.is_dead() {
            log::info!("{} has fallen", self.name);
        }
        actual
    }

    /// Heal up to the effective max, returning HP actually restored
    pub fn heal(&mut self, amount: u32) -> u32 {
        if self.is_dead() {
            return 0;
        }
        let room = self.effective_max_hp().saturating_sub(self.vitals.current_hp);
        let healed = amount.min(room);
        self.vitals.current_hp += healed;
        healed
    }

    /// Bring a dead character back at full health
    pub fn revive(&mut self) {
        self.vitals.current_hp = self.effective_max_hp();
        log::info!("{} revived with {} HP", self.name, self.vitals.current_hp);
    }

    /// Whether an incoming hit is blocked
    pub fn roll_block<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        let chance = self.effective_block_chance();
        chance > 0 && rng.gen_range(0..100) < chance
    }

    /// Roll a swing
    pub fn roll_attack<R: Rng + ?Sized>(&self, rng: &mut R) -> AttackRoll {
        self.attack_from_roll(rng.gen::<f64>())
    }

    /// Resolve a swing from a roll in `[0, 1)`
    pub fn attack_from_roll(&self, roll: f64) -> AttackRoll {
        let base = self.effective_damage();
        if roll < CRIT_CHANCE {
            AttackRoll {
                damage: base * CRIT_MULTIPLIER,
                critical: true,
            }
        } else {
            AttackRoll {
                damage: base,
                critical: false,
            }
        }
    }

    // ------------------------------------------------------------------
    // Progression
    // ------------------------------------------------------------------

    /// XP after the intelligence modifier
    pub fn scaled_xp(&self, amount: u32) -> u64 {
        let modifier = 1.0 + (self.effective_intelligence() as f64 - BASE_ATTRIBUTE as f64) * 0.02;
        (amount as f64 * modifier).floor().max(0.0) as u64
    }

    /// Award XP, returning the number of levels gained
    ///
    /// Large grants can cross several thresholds; each one is a full level-up
    /// and the remainder carries over.
    pub fn gain_xp(&mut self, amount: u32) -> u32 {
        let gained = self.scaled_xp(amount);
        self.vitals.current_xp = self.vitals.current_xp.saturating_add(gained);

        let mut levels = 0;
        while self.vitals.current_xp >= self.vitals.xp_to_next_level {
            self.vitals.current_xp -= self.vitals.xp_to_next_level;
            self.level_up();
            levels += 1;
        }
        levels
    }

    fn level_up(&mut self) {
        self.vitals.level += 1;
        self.vitals.xp_to_next_level = xp_threshold(self.vitals.level);

        let hp_gain = 10 + self.attributes.strength / 2;
        self.vitals.max_hp = self.vitals.max_hp.saturating_add(hp_gain);
        self.vitals.current_hp = self
            .vitals
            .current_hp
            .saturating_add(hp_gain)
            .min(self.effective_max_hp());
        self.unspent_points += POINTS_PER_LEVEL;

        log::info!(
            "{} reached level {} (+{} max HP, {} points to spend)",
            self.name,
            self.vitals.level,
            hp_gain,
            self.unspent_points
        );
    }

    /// Spend one unspent point on an attribute
    pub fn allocate_point(&mut self, attribute: Attribute) -> Result<(), ProgressionError> {
        if self.unspent_points == 0 {
            return Err(ProgressionError::NoUnspentPoints);
        }
        self.unspent_points -= 1;
        self.attributes.increase(attribute, 1);
        log::debug!("{} raised {:?}", self.name, attribute);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    /// Equip the item in an inventory slot, returning what it displaced
    pub fn equip(&mut self, at: usize) -> Result<Option<Item>, EquipError> {
        let previous = self.equipment.equip_from(&mut self.inventory, at)?;
        self.clamp_hp();
        Ok(previous)
    }

    /// Move an equipped item back to the inventory
    pub fn unequip(&mut self, slot: EquipmentSlot) -> Result<Item, EquipError> {
        let item = self.equipment.unequip_to(&mut self.inventory, slot)?;
        self.clamp_hp();
        Ok(item)
    }

    /// Use one unit of the consumable in an inventory slot
    pub fn use_item(&mut self, at: usize) -> Result<ConsumableEffect, ConsumeError> {
        if self.is_dead() {
            return Err(ConsumeError::Dead);
        }
        let stack = self.inventory.slot(at).ok_or(ConsumeError::EmptySlot(at))?;
        if !stack.item.is_consumable() {
            return Err(ConsumeError::NotConsumable(stack.item.name.clone()));
        }

        let item = self
            .inventory
            .remove_one(at)
            .ok_or(ConsumeError::EmptySlot(at))?;

        let mut effect = ConsumableEffect::default();
        if let Some(heal) = item.heal_amount {
            effect.healed = self.heal(heal);
        }
        if let Some(xp) = item.xp_amount {
            effect.xp_gained = self.scaled_xp(xp);
            effect.levels_gained = self.gain_xp(xp);
        }
        log::debug!("{} used {}: {:?}", self.name, item.name, effect);
        Ok(effect)
    }

    /// Whether a loot drop fits
    pub fn can_take_loot(&self, loot: &Loot) -> bool {
        loot.item
            .as_ref()
            .map(|item| self.inventory.can_add(item, 1))
            .unwrap_or(true)
    }

    /// Take gold and item from a drop; nothing is taken if the item does not fit
    pub fn add_loot(&mut self, loot: Loot) -> Result<(), InventoryError> {
        if let Some(item) = loot.item {
            self.inventory.add_item(item, 1)?;
        }
        self.inventory.add_gold(loot.gold);
        Ok(())
    }

    pub fn gold(&self) -> u32 {
        self.inventory.gold()
    }

    /// Keep current HP inside the effective max after bonuses change
    fn clamp_hp(&mut self) {
        let max = self.effective_max_hp();
        if self.vitals.current_hp > max {
            self.vitals.current_hp = max;
        }
    }
}
