//! Equipment system

use crate::inventory::Inventory;
use crate::item::{Item, ItemBonuses, ItemStack};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Equipment slot types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    /// Head armor (helmet, cap)
    Head,
    /// Chest armor
    Chest,
    /// Leg armor
    Legs,
    /// Foot armor (boots)
    Feet,
    /// Hand armor (gloves)
    Hands,
    /// Main hand weapon
    MainHand,
    /// Off hand (shield)
    OffHand,
    /// Accessory slot 1 (ring, amulet)
    Accessory1,
    /// Accessory slot 2
    Accessory2,
}

impl EquipmentSlot {
    /// Every slot in storage order
    pub const ALL: [EquipmentSlot; 9] = [
        Self::Head,
        Self::Chest,
        Self::Legs,
        Self::Feet,
        Self::Hands,
        Self::MainHand,
        Self::OffHand,
        Self::Accessory1,
        Self::Accessory2,
    ];

    /// Stable name used in save files
    pub fn name(&self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Chest => "chest",
            Self::Legs => "legs",
            Self::Feet => "feet",
            Self::Hands => "hands",
            Self::MainHand => "main_hand",
            Self::OffHand => "off_hand",
            Self::Accessory1 => "accessory1",
            Self::Accessory2 => "accessory2",
        }
    }

    /// Parse a slot name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|slot| slot.name() == name)
    }

    /// Check if this is a weapon slot
    pub fn is_weapon(&self) -> bool {
        matches!(self, Self::MainHand | Self::OffHand)
    }

    /// Check if this is an armor slot
    pub fn is_armor(&self) -> bool {
        matches!(
            self,
            Self::Head | Self::Chest | Self::Legs | Self::Feet | Self::Hands
        )
    }

    /// Check if this is an accessory slot
    pub fn is_accessory(&self) -> bool {
        matches!(self, Self::Accessory1 | Self::Accessory2)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Equipment errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EquipError {
    #[error("item cannot be equipped")]
    NotEquippable,
    #[error("inventory slot {0} is empty")]
    EmptySlot(usize),
    #[error("no inventory room for the displaced item")]
    NoRoom,
    #[error("nothing equipped in {0:?}")]
    NothingEquipped(EquipmentSlot),
}

/// Equipped items, one per slot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Equipment {
    slots: [Option<Item>; 9],
}

impl Equipment {
    /// Create empty equipment
    pub fn new() -> Self {
        Self::default()
    }

    /// Get equipped item in slot
    pub fn get(&self, slot: EquipmentSlot) -> Option<&Item> {
        self.slots[slot.index()].as_ref()
    }

    /// Check if slot is occupied
    pub fn is_occupied(&self, slot: EquipmentSlot) -> bool {
        self.get(slot).is_some()
    }

    /// Slot an item would go into
    ///
    /// Accessories fall through to the second accessory slot when the first
    /// is taken and the second is free.
    pub fn target_slot(&self, item: &Item) -> Option<EquipmentSlot> {
        let slot = item.equip_slot?;
        if slot.is_accessory() && self.is_occupied(slot) {
            let other = match slot {
                EquipmentSlot::Accessory1 => EquipmentSlot::Accessory2,
                _ => EquipmentSlot::Accessory1,
            };
            if !self.is_occupied(other) {
                return Some(other);
            }
        }
        Some(slot)
    }

    /// Place an item into its slot, returning the previous occupant
    pub fn put(&mut self, item: Item) -> Result<Option<Item>, EquipError> {
        let slot = self.target_slot(&item).ok_or(EquipError::NotEquippable)?;
        Ok(self.put_in(slot, item))
    }

    /// Place an item into an explicit slot, returning the previous occupant
    pub fn put_in(&mut self, slot: EquipmentSlot, item: Item) -> Option<Item> {
        self.slots[slot.index()].replace(item)
    }

    /// Take the item out of a slot
    pub fn take(&mut self, slot: EquipmentSlot) -> Option<Item> {
        self.slots[slot.index()].take()
    }

    /// Equip the item in an inventory slot
    ///
    /// One unit leaves the inventory and the previous occupant of the target
    /// slot goes back in. Nothing changes when the displaced item has nowhere
    /// to go. Returns the displaced item, if any.
    pub fn equip_from(
        &mut self,
        inventory: &mut Inventory,
        at: usize,
    ) -> Result<Option<Item>, EquipError> {
        let stack = inventory.slot(at).ok_or(EquipError::EmptySlot(at))?;
        let slot = self
            .target_slot(&stack.item)
            .ok_or(EquipError::NotEquippable)?;
        let frees_slot = stack.quantity <= 1;

        if let Some(previous) = self.get(slot) {
            if !frees_slot && !inventory.can_add(previous, 1) {
                log::warn!("Cannot equip {}: no room for {}", stack.item.key, previous.key);
                return Err(EquipError::NoRoom);
            }
        }

        let item = inventory.remove_one(at).ok_or(EquipError::EmptySlot(at))?;
        log::debug!("Equipped {} in {}", item.key, slot.name());
        let previous = self.put_in(slot, item);

        if let Some(prev) = &previous {
            let returned = if frees_slot {
                inventory
                    .place_in_slot(at, ItemStack::single(prev.clone()))
                    .is_ok()
            } else {
                inventory.add_item(prev.clone(), 1).is_ok()
            };
            debug_assert!(returned, "displaced item lost");
        }

        Ok(previous)
    }

    /// Move the item in `slot` back into the inventory
    pub fn unequip_to(
        &mut self,
        inventory: &mut Inventory,
        slot: EquipmentSlot,
    ) -> Result<Item, EquipError> {
        let item = self.get(slot).ok_or(EquipError::NothingEquipped(slot))?;
        if !inventory.can_add(item, 1) {
            log::warn!("Cannot unequip {}: inventory full", item.key);
            return Err(EquipError::NoRoom);
        }

        let item = self.take(slot).ok_or(EquipError::NothingEquipped(slot))?;
        inventory
            .add_item(item.clone(), 1)
            .map_err(|_| EquipError::NoRoom)?;
        log::debug!("Unequipped {} from {}", item.key, slot.name());
        Ok(item)
    }

    /// Iterate over equipped items
    pub fn iter(&self) -> impl Iterator<Item = (EquipmentSlot, &Item)> {
        EquipmentSlot::ALL
            .into_iter()
            .zip(self.slots.iter())
            .filter_map(|(slot, item)| item.as_ref().map(|i| (slot, i)))
    }

    /// Get count of equipped items
    pub fn equipped_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Sum of every equipped item's bonuses
    pub fn bonuses(&self) -> ItemBonuses {
        self.iter()
            .fold(ItemBonuses::default(), |acc, (_, item)| acc.combined(item.bonuses))
    }

    /// Clear all equipment
    pub fn clear(&mut self) -> Vec<Item> {
        self.slots.iter_mut().filter_map(Option::take).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{self, ArmorQuality, ShieldQuality, SwordQuality};

    #[test]
    fn test_slot_names_roundtrip() {
        for slot in EquipmentSlot::ALL {
            assert_eq!(EquipmentSlot::from_name(slot.name()), Some(slot));
        }
        assert_eq!(EquipmentSlot::from_name("tail"), None);
    }

    #[test]
    fn test_bonus_sum() {
        let mut eq = Equipment::new();
        eq.put(catalog::sword(SwordQuality::Steel)).unwrap();
        eq.put(catalog::armor(ArmorQuality::Chain)).unwrap();
        eq.put(catalog::shield(ShieldQuality::Iron)).unwrap();

        let b = eq.bonuses();
        assert_eq!(b.damage, 10);
        assert_eq!(b.armor, 5 + 2);
        assert_eq!(b.block_chance, 20);
        assert_eq!(b.strength, 1);
        assert_eq!(eq.equipped_count(), 3);
    }

    #[test]
    fn test_put_rejects_non_equippable() {
        let mut eq = Equipment::new();
        assert_eq!(eq.put(catalog::health_potion()), Err(EquipError::NotEquippable));
        assert_eq!(eq.equipped_count(), 0);
    }

    #[test]
    fn test_accessories_fill_both_slots() {
        let mut eq = Equipment::new();
        eq.put(catalog::scholar_ring()).unwrap();
        eq.put(catalog::vigor_amulet()).unwrap();
        assert!(eq.is_occupied(EquipmentSlot::Accessory1));
        assert!(eq.is_occupied(EquipmentSlot::Accessory2));

        let third = eq.put(catalog::scholar_ring()).unwrap();
        assert_eq!(third.map(|i| i.key), Some("scholar_ring".to_string()));
    }

    #[test]
    fn test_equip_swap_returns_previous_to_inventory() {
        let mut inv = Inventory::new(4);
        let mut eq = Equipment::new();
        inv.add_item(catalog::sword(SwordQuality::Iron), 1).unwrap();
        inv.add_item(catalog::sword(SwordQuality::Steel), 1).unwrap();

        assert_eq!(eq.equip_from(&mut inv, 0), Ok(None));
        let previous = eq.equip_from(&mut inv, 1).unwrap().unwrap();

        assert_eq!(previous.key, "iron_sword");
        assert_eq!(eq.get(EquipmentSlot::MainHand).unwrap().key, "steel_sword");
        assert_eq!(inv.slot(1).unwrap().item.key, "iron_sword");
        assert_eq!(inv.used_slots(), 1);
    }

    #[test]
    fn test_equip_errors_leave_state_alone() {
        let mut inv = Inventory::new(2);
        let mut eq = Equipment::new();
        inv.add_item(catalog::health_potion(), 3).unwrap();

        assert_eq!(eq.equip_from(&mut inv, 0), Err(EquipError::NotEquippable));
        assert_eq!(eq.equip_from(&mut inv, 1), Err(EquipError::EmptySlot(1)));
        assert_eq!(inv.count_key("health_potion"), 3);
        assert_eq!(eq.equipped_count(), 0);
    }

    #[test]
    fn test_unequip_needs_room() {
        let mut inv = Inventory::new(1);
        let mut eq = Equipment::new();
        eq.put(catalog::armor(ArmorQuality::Leather)).unwrap();
        inv.add_item(catalog::gem(catalog::GemKind::Ruby), 1).unwrap();

        assert_eq!(eq.unequip_to(&mut inv, EquipmentSlot::Chest), Err(EquipError::NoRoom));
        assert!(eq.is_occupied(EquipmentSlot::Chest));
        assert_eq!(
            eq.unequip_to(&mut inv, EquipmentSlot::Head),
            Err(EquipError::NothingEquipped(EquipmentSlot::Head))
        );

        inv.remove_item(0);
        let item = eq.unequip_to(&mut inv, EquipmentSlot::Chest).unwrap();
        assert_eq!(item.key, "leather_armor");
        assert_eq!(inv.find_item(item.id), Some(0));
    }
}
