//! Metal Inventory - Item, Inventory and Equipment System
//!
//! This crate provides the RPG item model shared by the player, enemy loot
//! and vendors.
//!
//! # Features
//!
//! - Items as immutable templates with per-instance identity
//! - Stat bonuses, equip slots and consumable effects
//! - Fixed-capacity inventory with stacking and a gold purse
//! - Nine-slot equipment with bonus aggregation
//! - Item catalog with tiered quality rolls
//!
//! # Example
//!
//! ```ignore
//! use metal_inventory::prelude::*;
//!
//! let mut inventory = Inventory::new(20);
//! inventory.add_item(metal_inventory::catalog::health_potion(), 15)?;
//! assert_eq!(inventory.used_slots(), 2);
//! ```

pub mod catalog;
pub mod equipment;
pub mod inventory;
pub mod item;

pub mod prelude {
    pub use crate::catalog::{ArmorQuality, GemKind, ShieldQuality, SwordQuality};
    pub use crate::equipment::{EquipError, Equipment, EquipmentSlot};
    pub use crate::inventory::{Inventory, InventoryError};
    pub use crate::item::{Item, ItemBonuses, ItemCategory, ItemId, ItemRarity, ItemStack, Loot};
}

pub use prelude::*;
