//! # metal_core - MetalMan Core
//!
//! Primitives with no required dependencies shared by every simulation crate:
//! - **Handles**: generational indices so entities can be removed while
//!   other code still holds a reference to them
//! - **Math**: a small `Vec3` plus the horizontal-plane helpers the AI and
//!   collision code are written against
//! - **Ids**: monotonic instance ids for item identity

pub mod handle;
pub mod id;
pub mod math;

pub use handle::*;
pub use id::*;
pub use math::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::handle::{Handle, HandleAllocator, HandleMap};
    pub use crate::id::IdGenerator;
    pub use crate::math::{horizontal_distance, wrap_angle, yaw_towards, Vec3};
}
