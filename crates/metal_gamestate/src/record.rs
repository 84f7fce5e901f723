//! Flat player save record

use crate::save::{SaveError, SAVE_VERSION};
use metal_combat::{CharacterAttributes, CharacterVitals, PlayerCharacter};
use metal_core::Vec3;
use metal_inventory::item::next_item_id;
use metal_inventory::{EquipmentSlot, Item, ItemBonuses, ItemCategory, ItemRarity, ItemStack};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Every field of an item except its instance id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedItem {
    pub key: String,
    pub name: String,
    pub description: String,
    pub category: ItemCategory,
    pub rarity: ItemRarity,
    pub stackable: bool,
    pub max_stack_size: u32,
    pub value: u32,
    pub bonuses: ItemBonuses,
    pub equip_slot: Option<EquipmentSlot>,
    pub heal_amount: Option<u32>,
    pub xp_amount: Option<u32>,
}

impl SavedItem {
    pub fn from_item(item: &Item) -> Self {
        Self {
            key: item.key.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            category: item.category,
            rarity: item.rarity,
            stackable: item.stackable,
            max_stack_size: item.max_stack_size,
            value: item.value,
            bonuses: item.bonuses,
            equip_slot: item.equip_slot,
            heal_amount: item.heal_amount,
            xp_amount: item.xp_amount,
        }
    }

    /// Rebuild the item under a fresh id
    pub fn to_item(&self) -> Item {
        Item {
            id: next_item_id(),
            key: self.key.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category,
            rarity: self.rarity,
            stackable: self.stackable,
            max_stack_size: self.max_stack_size.max(1),
            value: self.value,
            bonuses: self.bonuses,
            equip_slot: self.equip_slot,
            heal_amount: self.heal_amount,
            xp_amount: self.xp_amount,
        }
    }
}

/// An inventory stack at a slot index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedStack {
    pub slot: usize,
    pub item: SavedItem,
    pub quantity: u32,
}

/// An equipped item under its slot name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedEquipment {
    pub slot: String,
    pub item: SavedItem,
}

/// Everything needed to rebuild a player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub version: u32,
    /// Unix seconds
    pub timestamp: u64,
    pub player_name: String,

    pub level: u32,
    pub current_hp: u32,
    /// Base max HP, before equipment and strength
    pub max_hp: u32,
    pub current_xp: u64,
    pub xp_to_next_level: u64,
    pub gold: u32,

    pub strength: u32,
    pub dexterity: u32,
    pub intelligence: u32,
    pub unspent_points: u32,

    pub position: [f32; 3],
    pub yaw: f32,

    pub inventory: Vec<SavedStack>,
    pub equipment: Vec<SavedEquipment>,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl SaveRecord {
    /// Snapshot a player
    pub fn capture(player: &PlayerCharacter) -> Self {
        let inventory = player
            .inventory
            .items()
            .map(|(slot, stack)| SavedStack {
                slot,
                item: SavedItem::from_item(&stack.item),
                quantity: stack.quantity,
            })
            .collect();

        let equipment = player
            .equipment
            .iter()
            .map(|(slot, item)| SavedEquipment {
                slot: slot.name().to_string(),
                item: SavedItem::from_item(item),
            })
            .collect();

        Self {
            version: SAVE_VERSION,
            timestamp: now_secs(),
            player_name: player.name.clone(),
            level: player.vitals.level,
            current_hp: player.vitals.current_hp,
            max_hp: player.vitals.max_hp,
            current_xp: player.vitals.current_xp,
            xp_to_next_level: player.vitals.xp_to_next_level,
            gold: player.gold(),
            strength: player.attributes.strength,
            dexterity: player.attributes.dexterity,
            intelligence: player.attributes.intelligence,
            unspent_points: player.unspent_points,
            position: player.position.to_array(),
            yaw: player.yaw,
            inventory,
            equipment,
        }
    }

    /// Override the timestamp
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Rebuild the player
    ///
    /// Items come back with fresh ids. Current HP is clamped to the restored
    /// effective maximum.
    pub fn restore(&self) -> Result<PlayerCharacter, SaveError> {
        let mut player = PlayerCharacter::new(self.player_name.clone());
        player.attributes = CharacterAttributes {
            strength: self.strength,
            dexterity: self.dexterity,
            intelligence: self.intelligence,
        };
        player.vitals = CharacterVitals {
            current_hp: self.current_hp,
            max_hp: self.max_hp,
            current_xp: self.current_xp,
            xp_to_next_level: self.xp_to_next_level,
            level: self.level.max(1),
        };
        player.unspent_points = self.unspent_points;
        player.position = Vec3::from_array(self.position);
        player.yaw = self.yaw;
        player.inventory.add_gold(self.gold);

        for saved in &self.inventory {
            if saved.quantity == 0 {
                continue;
            }
            if saved.quantity > saved.item.max_stack_size.max(1) {
                return Err(SaveError::Corrupted(format!(
                    "inventory slot {}: {} {} exceeds stack size {}",
                    saved.slot, saved.quantity, saved.item.key, saved.item.max_stack_size
                )));
            }
            let stack = ItemStack::new(saved.item.to_item(), saved.quantity);
            player
                .inventory
                .place_in_slot(saved.slot, stack)
                .map_err(|e| SaveError::Corrupted(format!("inventory slot {}: {}", saved.slot, e)))?;
        }

        for saved in &self.equipment {
            let slot = EquipmentSlot::from_name(&saved.slot)
                .ok_or_else(|| SaveError::Corrupted(format!("unknown equipment slot '{}'", saved.slot)))?;
            player.equipment.put_in(slot, saved.item.to_item());
        }

        player.vitals.current_hp = player.vitals.current_hp.min(player.effective_max_hp());
        Ok(player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metal_inventory::catalog::{self, ArmorQuality, SwordQuality};

    fn veteran() -> PlayerCharacter {
        let mut p = PlayerCharacter::new("Veteran").with_position(Vec3::new(4.0, 1.5, -2.0));
        p.yaw = 0.75;
        p.gain_xp(400);
        p.inventory.add_gold(321);
        p.inventory.add_item(catalog::health_potion(), 4).unwrap();
        p.inventory.add_item(catalog::sword(SwordQuality::Steel), 1).unwrap();
        p.inventory.add_item(catalog::armor(ArmorQuality::Chain), 1).unwrap();
        let at = p.inventory.find_key("chain_mail").unwrap();
        p.equip(at).unwrap();
        p.take_damage(30);
        p
    }

    #[test]
    fn test_capture_flattens_player() {
        let p = veteran();
        let record = SaveRecord::capture(&p);
        assert_eq!(record.player_name, "Veteran");
        assert_eq!(record.level, p.level());
        assert_eq!(record.gold, 321);
        assert_eq!(record.position, [4.0, 1.5, -2.0]);
        assert_eq!(record.inventory.len(), 2);
        assert_eq!(record.equipment.len(), 1);
        assert_eq!(record.equipment[0].slot, "chest");
        assert_eq!(record.version, SAVE_VERSION);
    }

    #[test]
    fn test_restore_matches_capture() {
        let p = veteran();
        let restored = SaveRecord::capture(&p).restore().unwrap();

        assert_eq!(restored.name, p.name);
        assert_eq!(restored.vitals, p.vitals);
        assert_eq!(restored.attributes, p.attributes);
        assert_eq!(restored.gold(), p.gold());
        assert_eq!(restored.effective_max_hp(), p.effective_max_hp());
        assert_eq!(restored.effective_armor(), p.effective_armor());
        assert_eq!(restored.inventory.count_key("health_potion"), 4);
        assert_eq!(restored.yaw, p.yaw);

        // Same slots, new identities
        for (slot, stack) in p.inventory.items() {
            let other = restored.inventory.slot(slot).unwrap();
            assert_eq!(other.item.key, stack.item.key);
            assert_ne!(other.item.id, stack.item.id);
        }
    }

    #[test]
    fn test_restore_rejects_bad_slot_name() {
        let mut record = SaveRecord::capture(&veteran());
        record.equipment[0].slot = "tail".to_string();
        assert!(matches!(record.restore(), Err(SaveError::Corrupted(_))));
    }

    #[test]
    fn test_restore_rejects_out_of_range_slot() {
        let mut record = SaveRecord::capture(&veteran());
        record.inventory[0].slot = 999;
        assert!(matches!(record.restore(), Err(SaveError::Corrupted(_))));
    }

    #[test]
    fn test_restore_rejects_oversized_stack() {
        let mut record = SaveRecord::capture(&veteran());
        let potions = record
            .inventory
            .iter_mut()
            .find(|s| s.item.key == "health_potion")
            .unwrap();
        potions.quantity = potions.item.max_stack_size + 1;
        assert!(matches!(record.restore(), Err(SaveError::Corrupted(_))));
    }

    #[test]
    fn test_restore_clamps_hp() {
        let mut record = SaveRecord::capture(&PlayerCharacter::new("Hero"));
        record.current_hp = 10_000;
        let p = record.restore().unwrap();
        assert_eq!(p.current_hp(), p.effective_max_hp());
    }
}
