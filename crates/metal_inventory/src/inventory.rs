//! Inventory component

use crate::item::{Item, ItemId, ItemStack};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of inventory slots
pub const DEFAULT_CAPACITY: usize = 20;

/// Inventory errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("inventory full, {overflow} item(s) would not fit")]
    Full { overflow: u32 },
    #[error("slot {0} is out of range")]
    InvalidSlot(usize),
    #[error("slot {0} is empty")]
    EmptySlot(usize),
    #[error("slot {0} is occupied")]
    SlotOccupied(usize),
    #[error("not enough gold: need {needed}, have {available}")]
    InsufficientGold { needed: u32, available: u32 },
}

/// Fixed-capacity inventory with a gold purse
///
/// Slots are ordered; stacking fills existing compatible stacks in slot order
/// before opening new ones. Adds are all-or-nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    /// Inventory slots (None = empty)
    slots: Vec<Option<ItemStack>>,
    /// Gold carried
    gold: u32,
}

impl Inventory {
    /// Create a new inventory with given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            gold: 0,
        }
    }

    /// Get inventory capacity
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Get number of used slots
    pub fn used_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Get number of free slots
    pub fn free_slots(&self) -> usize {
        self.capacity() - self.used_slots()
    }

    /// Check if inventory is full
    pub fn is_full(&self) -> bool {
        self.free_slots() == 0
    }

    /// Check if inventory is empty
    pub fn is_empty(&self) -> bool {
        self.used_slots() == 0
    }

    /// Get slot contents
    pub fn slot(&self, at: usize) -> Option<&ItemStack> {
        self.slots.get(at)?.as_ref()
    }

    /// Find first empty slot
    pub fn find_empty_slot(&self) -> Option<usize> {
        self.slots.iter().position(|s| s.is_none())
    }

    /// Find slot holding the item with this id
    pub fn find_item(&self, id: ItemId) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.as_ref().map(|stack| stack.item.id == id).unwrap_or(false))
    }

    /// Find first slot holding this template
    pub fn find_key(&self, key: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.as_ref().map(|stack| stack.item.key == key).unwrap_or(false))
    }

    /// Count total quantity of a template
    pub fn count_key(&self, key: &str) -> u32 {
        self.items()
            .filter(|(_, stack)| stack.item.key == key)
            .map(|(_, stack)| stack.quantity)
            .sum()
    }

    /// How many of `quantity` copies of `item` would not fit
    fn overflow_for(&self, item: &Item, quantity: u32) -> u32 {
        let free = self.free_slots() as u64;
        let capacity = if item.is_stackable() {
            let in_stacks: u64 = self
                .items()
                .filter(|(_, stack)| stack.item.stacks_with(item))
                .map(|(_, stack)| stack.space() as u64)
                .sum();
            in_stacks + free * item.max_stack_size as u64
        } else {
            free
        };
        (quantity as u64).saturating_sub(capacity) as u32
    }

    /// Check whether `quantity` copies of `item` fit
    pub fn can_add(&self, item: &Item, quantity: u32) -> bool {
        self.overflow_for(item, quantity) == 0
    }

    /// Add `quantity` copies of an item
    ///
    /// Existing compatible stacks are topped up first, in slot order, then
    /// empty slots are filled. Every new slot past the first holds a fresh
    /// copy of the item. Nothing changes when the whole quantity cannot fit.
    pub fn add_item(&mut self, item: Item, quantity: u32) -> Result<(), InventoryError> {
        if quantity == 0 {
            return Ok(());
        }

        let overflow = self.overflow_for(&item, quantity);
        if overflow > 0 {
            log::warn!(
                "Inventory full: cannot add {} x {} ({} overflow)",
                quantity,
                item.key,
                overflow
            );
            return Err(InventoryError::Full { overflow });
        }

        let mut remaining = quantity;

        if item.is_stackable() {
            for stack in self.slots.iter_mut().flatten() {
                if remaining == 0 {
                    break;
                }
                if stack.item.stacks_with(&item) {
                    remaining = stack.add(remaining);
                }
            }
        }

        let mut next = Some(item);
        while remaining > 0 {
            let Some(empty) = self.find_empty_slot() else {
                break;
            };
            let Some(current) = next.take() else {
                break;
            };
            let amount = remaining.min(current.max_stack_size);
            remaining -= amount;
            if remaining > 0 {
                next = Some(current.duplicate());
            }
            self.slots[empty] = Some(ItemStack::new(current, amount));
        }

        debug_assert_eq!(remaining, 0);
        Ok(())
    }

    /// Put a stack into a specific empty slot
    pub fn place_in_slot(&mut self, at: usize, stack: ItemStack) -> Result<(), InventoryError> {
        match self.slots.get_mut(at) {
            None => Err(InventoryError::InvalidSlot(at)),
            Some(Some(_)) => Err(InventoryError::SlotOccupied(at)),
            Some(slot) => {
                *slot = Some(stack);
                Ok(())
            }
        }
    }

    /// Take the whole stack out of a slot
    pub fn remove_item(&mut self, at: usize) -> Option<ItemStack> {
        self.slots.get_mut(at)?.take()
    }

    /// Take a single unit out of a slot
    ///
    /// When units remain, the removed one is a fresh copy.
    pub fn remove_one(&mut self, at: usize) -> Option<Item> {
        let slot = self.slots.get_mut(at)?;
        let stack = slot.as_mut()?;
        if stack.quantity <= 1 {
            return slot.take().map(|s| s.item);
        }
        stack.remove(1);
        Some(stack.item.duplicate())
    }

    /// Take up to `amount` units out of a slot
    pub fn remove_quantity(&mut self, at: usize, amount: u32) -> Option<ItemStack> {
        let slot = self.slots.get_mut(at)?;
        let stack = slot.as_mut()?;
        if amount == 0 {
            return None;
        }
        if amount >= stack.quantity {
            return slot.take();
        }
        stack.split(amount).map(|mut part| {
            part.item = part.item.duplicate();
            part
        })
    }

    /// Swap two slots
    pub fn swap_slots(&mut self, a: usize, b: usize) -> bool {
        if a >= self.capacity() || b >= self.capacity() {
            return false;
        }
        self.slots.swap(a, b);
        true
    }

    /// Remove everything
    pub fn clear(&mut self) -> Vec<ItemStack> {
        self.slots.iter_mut().filter_map(Option::take).collect()
    }

    /// Iterate over occupied slots
    pub fn items(&self) -> impl Iterator<Item = (usize, &ItemStack)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|stack| (i, stack)))
    }

    /// Gold carried
    pub fn gold(&self) -> u32 {
        self.gold
    }

    /// Add gold
    pub fn add_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Spend gold, leaving the purse untouched if there is not enough
    pub fn spend_gold(&mut self, amount: u32) -> Result<(), InventoryError> {
        if amount > self.gold {
            return Err(InventoryError::InsufficientGold {
                needed: amount,
                available: self.gold,
            });
        }
        self.gold -= amount;
        Ok(())
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    #[test]
    fn test_potions_stack_into_two_slots() {
        let mut inv = Inventory::new(20);
        inv.add_item(catalog::health_potion(), 15).unwrap();

        assert_eq!(inv.used_slots(), 2);
        assert_eq!(inv.slot(0).unwrap().quantity, 10);
        assert_eq!(inv.slot(1).unwrap().quantity, 5);
        assert_eq!(inv.count_key("health_potion"), 15);
        assert_ne!(inv.slot(0).unwrap().item.id, inv.slot(1).unwrap().item.id);
    }

    #[test]
    fn test_fills_existing_stacks_first() {
        let mut inv = Inventory::new(4);
        inv.add_item(catalog::health_potion(), 7).unwrap();
        inv.add_item(catalog::gem(catalog::GemKind::Ruby), 1).unwrap();
        inv.add_item(catalog::health_potion(), 5).unwrap();

        assert_eq!(inv.slot(0).unwrap().quantity, 10);
        assert_eq!(inv.slot(1).unwrap().item.key, "ruby");
        assert_eq!(inv.slot(2).unwrap().quantity, 2);
    }

    #[test]
    fn test_add_is_all_or_nothing() {
        let mut inv = Inventory::new(2);
        inv.add_item(catalog::health_potion(), 8).unwrap();

        let err = inv.add_item(catalog::health_potion(), 13).unwrap_err();
        assert_eq!(err, InventoryError::Full { overflow: 1 });
        assert_eq!(inv.used_slots(), 1);
        assert_eq!(inv.count_key("health_potion"), 8);

        assert!(inv.add_item(catalog::health_potion(), 12).is_ok());
        assert!(inv.is_full());
    }

    #[test]
    fn test_non_stackable_copies_get_fresh_ids() {
        let mut inv = Inventory::new(5);
        let sword = catalog::sword(catalog::SwordQuality::Iron);
        let original = sword.id;
        inv.add_item(sword, 3).unwrap();

        assert_eq!(inv.used_slots(), 3);
        assert_eq!(inv.find_item(original), Some(0));
        let ids: Vec<_> = inv.items().map(|(_, s)| s.item.id).collect();
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
    }

    #[test]
    fn test_zero_quantity_is_noop() {
        let mut inv = Inventory::new(1);
        assert!(inv.add_item(catalog::health_potion(), 0).is_ok());
        assert!(inv.is_empty());
    }

    #[test]
    fn test_remove_on_empty_slot() {
        let mut inv = Inventory::new(3);
        assert!(inv.remove_item(0).is_none());
        assert!(inv.remove_one(1).is_none());
        assert!(inv.remove_item(99).is_none());
    }

    #[test]
    fn test_remove_one_and_quantity() {
        let mut inv = Inventory::new(3);
        inv.add_item(catalog::health_potion(), 4).unwrap();
        let kept = inv.slot(0).unwrap().item.id;

        let one = inv.remove_one(0).unwrap();
        assert_ne!(one.id, kept);
        assert_eq!(inv.slot(0).unwrap().quantity, 3);

        let two = inv.remove_quantity(0, 2).unwrap();
        assert_eq!(two.quantity, 2);
        assert_eq!(inv.slot(0).unwrap().quantity, 1);

        let last = inv.remove_one(0).unwrap();
        assert_eq!(last.id, kept);
        assert!(inv.slot(0).is_none());
    }

    #[test]
    fn test_place_and_swap() {
        let mut inv = Inventory::new(3);
        inv.place_in_slot(2, ItemStack::single(catalog::xp_tome())).unwrap();
        assert_eq!(
            inv.place_in_slot(2, ItemStack::single(catalog::xp_tome())),
            Err(InventoryError::SlotOccupied(2))
        );
        assert_eq!(
            inv.place_in_slot(5, ItemStack::single(catalog::xp_tome())),
            Err(InventoryError::InvalidSlot(5))
        );

        assert!(inv.swap_slots(0, 2));
        assert_eq!(inv.slot(0).unwrap().item.key, "xp_tome");
        assert!(!inv.swap_slots(0, 9));
    }

    #[test]
    fn test_gold() {
        let mut inv = Inventory::default();
        inv.add_gold(50);
        assert!(inv.spend_gold(20).is_ok());
        assert_eq!(inv.gold(), 30);

        let err = inv.spend_gold(31).unwrap_err();
        assert_eq!(err, InventoryError::InsufficientGold { needed: 31, available: 30 });
        assert_eq!(inv.gold(), 30);
    }
}
