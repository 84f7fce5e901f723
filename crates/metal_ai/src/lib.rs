//! Metal AI - Enemies and NPCs
//!
//! Per-enemy behaviour is a small state machine driven by horizontal distance
//! to the player. The [`EnemyManager`] owns every enemy, steps them in a fixed
//! order and resolves their collisions; NPCs run a simpler facing and wave
//! routine and double as vendors.
//!
//! # Features
//!
//! - Enemy type table with per-level stat scaling
//! - Idle, patrol, chase, attack, hurt and dead states with hysteresis
//! - Frame-rate independent patrol start
//! - Loot rolls with nested quality draws, rolled and taken once
//! - Generational enemy handles, corpse despawn, damage numbers
//! - Vendors with limited stock, purchase and sell-back
//!
//! # Example
//!
//! ```ignore
//! use metal_ai::prelude::*;
//!
//! let mut enemies = EnemyManager::new(PhysicsConfig::default());
//! let bandit = enemies.spawn_enemy_at_level(EnemyType::Bandit, 1, Vec3::ZERO);
//! let events = enemies.update(dt, player_position, &terrain, 0.5, &mut rng);
//! for (enemy, damage) in enemies.check_enemy_attacks(player_position) {
//!     player.take_damage(damage);
//! }
//! ```

pub mod enemy;
pub mod enemy_type;
pub mod loot;
pub mod manager;
pub mod npc;

pub mod prelude {
    pub use crate::enemy::{DamageOutcome, Enemy, EnemyState};
    pub use crate::enemy_type::{EnemyStats, EnemyType, ScaledStats};
    pub use crate::loot::LootDrop;
    pub use crate::manager::{EnemyEvent, EnemyHandle, EnemyManager};
    pub use crate::npc::{Npc, NpcManager, NpcType, ShopError, ShopItem};
    pub use metal_physics::PhysicsConfig;
}

pub use prelude::*;
