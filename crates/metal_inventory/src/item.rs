//! Item templates and stacks

use crate::equipment::EquipmentSlot;
use metal_core::IdGenerator;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Per-instance item identity
pub type ItemId = u64;

static ITEM_IDS: IdGenerator = IdGenerator::new();

/// Allocate a fresh item id
pub fn next_item_id() -> ItemId {
    ITEM_IDS.next()
}

/// Item category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    /// Swords and other weapons
    Weapon,
    /// Armor pieces and shields
    Armor,
    /// Potions, tomes
    Consumable,
    /// Gems and crafting materials
    Material,
    /// Quest items
    Quest,
    /// Everything else
    Misc,
}

impl Default for ItemCategory {
    fn default() -> Self {
        Self::Misc
    }
}

/// Item rarity, ordered from most to least common
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemRarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Default for ItemRarity {
    fn default() -> Self {
        Self::Common
    }
}

impl ItemRarity {
    /// Get color associated with rarity (RGB)
    pub fn color(&self) -> [f32; 3] {
        match self {
            Self::Common => [1.0, 1.0, 1.0],     // White
            Self::Uncommon => [0.0, 1.0, 0.0],   // Green
            Self::Rare => [0.0, 0.5, 1.0],       // Blue
            Self::Epic => [0.5, 0.0, 1.0],       // Purple
            Self::Legendary => [1.0, 0.5, 0.0],  // Orange
        }
    }
}

/// Stat bonuses granted while an item is equipped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemBonuses {
    pub strength: u32,
    pub dexterity: u32,
    pub intelligence: u32,
    pub hp: u32,
    pub damage: u32,
    pub armor: u32,
    /// Percent chance to block an incoming hit
    pub block_chance: u32,
}

impl ItemBonuses {
    /// Component-wise sum
    pub fn combined(self, other: ItemBonuses) -> ItemBonuses {
        ItemBonuses {
            strength: self.strength.saturating_add(other.strength),
            dexterity: self.dexterity.saturating_add(other.dexterity),
            intelligence: self.intelligence.saturating_add(other.intelligence),
            hp: self.hp.saturating_add(other.hp),
            damage: self.damage.saturating_add(other.damage),
            armor: self.armor.saturating_add(other.armor),
            block_chance: self.block_chance.saturating_add(other.block_chance),
        }
    }

    /// True when every bonus is zero
    pub fn is_empty(&self) -> bool {
        *self == ItemBonuses::default()
    }
}

/// An item
///
/// Items are immutable once built. Two items are the same item only when their
/// ids match; `key` names the template and decides which items may share a
/// stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Instance identity
    pub id: ItemId,
    /// Template key ("health_potion", "iron_sword", ...)
    pub key: String,
    /// Display name
    pub name: String,
    /// Description
    pub description: String,
    /// Category
    pub category: ItemCategory,
    /// Rarity
    pub rarity: ItemRarity,
    /// Whether several can share one slot
    pub stackable: bool,
    /// Maximum stack size (always 1 when not stackable)
    pub max_stack_size: u32,
    /// Base value in gold
    pub value: u32,
    /// Equipped stat bonuses
    pub bonuses: ItemBonuses,
    /// Slot this item equips into
    pub equip_slot: Option<EquipmentSlot>,
    /// HP restored on use
    pub heal_amount: Option<u32>,
    /// XP granted on use
    pub xp_amount: Option<u32>,
}

impl Item {
    /// Create a new item with a fresh id
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: next_item_id(),
            key: key.into(),
            name: name.into(),
            description: String::new(),
            category: ItemCategory::default(),
            rarity: ItemRarity::default(),
            stackable: false,
            max_stack_size: 1,
            value: 0,
            bonuses: ItemBonuses::default(),
            equip_slot: None,
            heal_amount: None,
            xp_amount: None,
        }
    }

    /// Set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Set category
    pub fn with_category(mut self, category: ItemCategory) -> Self {
        self.category = category;
        self
    }

    /// Set rarity
    pub fn with_rarity(mut self, rarity: ItemRarity) -> Self {
        self.rarity = rarity;
        self
    }

    /// Make stackable up to `max`
    pub fn with_max_stack(mut self, max: u32) -> Self {
        self.max_stack_size = max.max(1);
        self.stackable = self.max_stack_size > 1;
        self
    }

    /// Set value
    pub fn with_value(mut self, value: u32) -> Self {
        self.value = value;
        self
    }

    /// Set equipped bonuses
    pub fn with_bonuses(mut self, bonuses: ItemBonuses) -> Self {
        self.bonuses = bonuses;
        self
    }

    /// Set the equip slot
    pub fn with_equip_slot(mut self, slot: EquipmentSlot) -> Self {
        self.equip_slot = Some(slot);
        self
    }

    /// Set heal amount
    pub fn with_heal(mut self, amount: u32) -> Self {
        self.heal_amount = Some(amount);
        self
    }

    /// Set XP amount
    pub fn with_xp(mut self, amount: u32) -> Self {
        self.xp_amount = Some(amount);
        self
    }

    /// Same template, new identity
    pub fn duplicate(&self) -> Item {
        Item {
            id: next_item_id(),
            ..self.clone()
        }
    }

    /// Check if stackable
    pub fn is_stackable(&self) -> bool {
        self.stackable && self.max_stack_size > 1
    }

    /// Check if this item can be equipped
    pub fn is_equippable(&self) -> bool {
        self.equip_slot.is_some()
    }

    /// Check if using this item does something
    pub fn is_consumable(&self) -> bool {
        self.heal_amount.is_some() || self.xp_amount.is_some()
    }

    /// Whether `other` may share a stack with this item
    pub fn stacks_with(&self, other: &Item) -> bool {
        self.is_stackable() && other.is_stackable() && self.key == other.key
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A stack of items in an inventory slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    /// The item
    pub item: Item,
    /// Quantity (1 for non-stackable items)
    pub quantity: u32,
}

impl ItemStack {
    /// Create a new item stack, clamped to the item's stack limit
    pub fn new(item: Item, quantity: u32) -> Self {
        let quantity = quantity.min(item.max_stack_size);
        Self { item, quantity }
    }

    /// Create a single item
    pub fn single(item: Item) -> Self {
        Self::new(item, 1)
    }

    /// Check if this stack is empty
    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }

    /// Room left before the stack limit
    pub fn space(&self) -> u32 {
        self.item.max_stack_size.saturating_sub(self.quantity)
    }

    /// Add to this stack (returns overflow if any)
    pub fn add(&mut self, amount: u32) -> u32 {
        let to_add = amount.min(self.space());
        self.quantity += to_add;
        amount - to_add
    }

    /// Remove from this stack (returns amount actually removed)
    pub fn remove(&mut self, amount: u32) -> u32 {
        let to_remove = amount.min(self.quantity);
        self.quantity -= to_remove;
        to_remove
    }

    /// Split `amount` off into a new stack
    pub fn split(&mut self, amount: u32) -> Option<ItemStack> {
        if amount > 0 && amount < self.quantity {
            self.quantity -= amount;
            Some(ItemStack {
                item: self.item.clone(),
                quantity: amount,
            })
        } else {
            None
        }
    }

    /// Total gold value of the stack
    pub fn total_value(&self) -> u32 {
        self.item.value.saturating_mul(self.quantity)
    }
}

/// What a corpse or chest hands over
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Loot {
    /// Gold, always awarded
    pub gold: u32,
    /// Optional item drop
    pub item: Option<Item>,
}

impl Loot {
    /// Gold only
    pub fn gold(gold: u32) -> Self {
        Self { gold, item: None }
    }

    /// Gold plus an item
    pub fn with_item(gold: u32, item: Item) -> Self {
        Self {
            gold,
            item: Some(item),
        }
    }

    /// Nothing at all
    pub fn is_empty(&self) -> bool {
        self.gold == 0 && self.item.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn potion() -> Item {
        Item::new("health_potion", "Health Potion")
            .with_category(ItemCategory::Consumable)
            .with_max_stack(10)
            .with_heal(30)
    }

    #[test]
    fn test_item_builder() {
        let item = potion().with_value(15);

        assert_eq!(item.key, "health_potion");
        assert!(item.is_stackable());
        assert!(item.is_consumable());
        assert!(!item.is_equippable());
        assert_eq!(item.value, 15);
    }

    #[test]
    fn test_identity_is_by_id() {
        let a = potion();
        let b = potion();
        assert_ne!(a, b);
        assert!(a.stacks_with(&b));

        let copy = a.clone();
        assert_eq!(a, copy);

        let dup = a.duplicate();
        assert_ne!(a, dup);
        assert_eq!(a.key, dup.key);
    }

    #[test]
    fn test_non_stackable_never_stacks() {
        let sword = Item::new("iron_sword", "Iron Sword").with_max_stack(1);
        assert!(!sword.is_stackable());
        assert!(!sword.stacks_with(&sword.duplicate()));
        assert_eq!(ItemStack::new(sword, 5).quantity, 1);
    }

    #[test]
    fn test_item_stack() {
        let mut stack = ItemStack::new(potion(), 4);

        let overflow = stack.add(9);
        assert_eq!(stack.quantity, 10);
        assert_eq!(overflow, 3);

        let removed = stack.remove(20);
        assert_eq!(removed, 10);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_stack_split() {
        let mut stack = ItemStack::new(potion(), 8);

        let split = stack.split(3).unwrap();
        assert_eq!(stack.quantity, 5);
        assert_eq!(split.quantity, 3);
        assert!(stack.split(5).is_none());
    }

    #[test]
    fn test_rarity_order() {
        assert!(ItemRarity::Common < ItemRarity::Uncommon);
        assert!(ItemRarity::Epic < ItemRarity::Legendary);
    }

    #[test]
    fn test_bonus_sum() {
        let a = ItemBonuses { strength: 2, armor: 3, ..Default::default() };
        let b = ItemBonuses { strength: 1, block_chance: 20, ..Default::default() };
        let sum = a.combined(b);
        assert_eq!(sum.strength, 3);
        assert_eq!(sum.armor, 3);
        assert_eq!(sum.block_chance, 20);
        assert!(ItemBonuses::default().is_empty());
    }
}
