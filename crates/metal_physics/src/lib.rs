//! Metal Physics - Horizontal Collision and Terrain Sampling
//!
//! The simulation resolves collisions on the horizontal (x, z) plane only.
//! Height comes from a terrain oracle or from the top of a climbable object.
//!
//! # Features
//!
//! - Circle, rotated box and climbable colliders
//! - Push-out queries and multi-collider movement resolution
//! - Standable height lookup for climbable tops
//! - Symmetric circle-circle separation
//! - Terrain oracle trait with a central-difference normal
//!
//! # Example
//!
//! ```ignore
//! use metal_physics::prelude::*;
//!
//! let rock = Collider::circle(Vec3::new(2.0, 0.0, 0.0), 1.0);
//! let resolved = resolve_movement(Vec3::new(1.5, 0.0, 0.0), 0.5, &[rock]);
//! assert!(horizontal_distance(resolved, rock.center()) >= 1.5);
//! ```

pub mod collider;
pub mod config;
pub mod error;
pub mod separation;
pub mod terrain;

pub mod prelude {
    pub use crate::collider::{resolve_movement, resolve_movement_at_height, standable_height, Collider};
    pub use crate::config::PhysicsConfig;
    pub use crate::error::{PhysicsError, Result};
    pub use crate::separation::{push_from, separate_pair};
    pub use crate::terrain::{FlatTerrain, Terrain};
    pub use metal_core::{horizontal_distance, Vec3};
}

pub use prelude::*;
