//! A physics-world management layer built on rapier3d
//!
//! This crate sits between an application layer and the rigid-body solver:
//! - collidable lifecycle (dynamic, kinematic, static) behind opaque handles
//! - handle-to-application-object registry
//! - per-collidable contact materials with a symmetric pair-combination policy
//! - fixed-floor timestep loop parallelized over a rayon worker pool
//! - closest-hit ray casts resolved back to application objects

pub mod dispatch;
pub mod error;
pub mod filter;
pub mod handles;
pub mod integration;
pub mod material;
pub mod registry;
pub mod shapes;
pub mod world;

// Re-exports for convenience
pub use glam;
pub use rapier3d;

pub use dispatch::{StepDispatcher, recommended_worker_count};
pub use error::PhysicsError;
pub use handles::{BodyHandle, BodyKind, CollidableHandle, CollidableRef, StaticHandle};
pub use integration::IntegrationSettings;
pub use material::{MaterialProperties, MaterialStore, SpringSettings};
pub use registry::HandleRegistry;
pub use shapes::{CYLINDER_ROTATION_FIX, ShapeDesc};
pub use world::{MIN_TIMESTEP, PhysicsWorld, Pose, RaycastHit, Velocity};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::PhysicsError;
    pub use crate::handles::{BodyHandle, BodyKind, CollidableRef, StaticHandle};
    pub use crate::integration::IntegrationSettings;
    pub use crate::material::{MaterialProperties, SpringSettings};
    pub use crate::shapes::ShapeDesc;
    pub use crate::world::{PhysicsWorld, Pose, RaycastHit, Velocity};
    pub use glam::{Quat, Vec3};
}
