//! Metal Combat - Player Progression and Combat Math
//!
//! This crate turns base attributes and equipped items into the numbers the
//! rest of the simulation fights with.
//!
//! # Features
//!
//! - Base attributes and vitals with the geometric XP curve
//! - Effective stats derived on every read from base + equipment
//! - Armor reduction with a one-point damage floor, capped block chance
//! - Multi-level XP gain, attribute point allocation
//! - Transactional equip/unequip and consumable use
//! - Floating damage numbers
//!
//! # Example
//!
//! ```ignore
//! use metal_combat::prelude::*;
//!
//! let mut player = PlayerCharacter::new("Hero");
//! let taken = player.take_damage(12);
//! let levels = player.gain_xp(200);
//! ```

pub mod attributes;
pub mod damage_number;
pub mod error;
pub mod player;
pub mod vitals;

pub mod prelude {
    pub use crate::attributes::{Attribute, CharacterAttributes};
    pub use crate::damage_number::{DamageNumber, DamageNumberKind};
    pub use crate::error::{ConsumeError, ProgressionError};
    pub use crate::player::{AttackRoll, ConsumableEffect, PlayerCharacter};
    pub use crate::vitals::{xp_threshold, CharacterVitals};
}

pub use prelude::*;
