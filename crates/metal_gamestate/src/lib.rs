//! Metal GameState - Save and Load
//!
//! Player progress is flattened into a [`SaveRecord`] that stores every item
//! by value, so a save never depends on in-memory item identity. The
//! [`SaveManager`] writes records to named slots as JSON or bincode.
//!
//! # Features
//!
//! - Flat save record captured from and restored into a player character
//! - JSON (human readable) or binary (compact) slot files
//! - Save version check on load
//! - Slot listing, newest first
//!
//! # Example
//!
//! ```ignore
//! use metal_gamestate::prelude::*;
//!
//! let mut saves = SaveManager::new("saves").with_format(SaveFormat::Json);
//! saves.save("slot1", &SaveRecord::capture(&player))?;
//! let player = saves.load("slot1")?.restore()?;
//! ```

pub mod record;
pub mod save;

pub mod prelude {
    pub use crate::record::{SaveRecord, SavedEquipment, SavedItem, SavedStack};
    pub use crate::save::{SaveError, SaveFormat, SaveManager, SaveSlot, SAVE_VERSION};
}

pub use prelude::*;
