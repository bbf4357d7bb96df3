//! Collision shape descriptors
//!
//! Immutable geometry descriptions converted into solver shapes at creation
//! time. Every creation call registers a fresh solver shape even for identical
//! geometry; shared shape handles would interact with per-instance inertia
//! computation, so deduplication is deliberately left out.

use glam::Quat;
use rapier3d::geometry::SharedShape;

/// Orientation applied to every cylinder on top of the caller's orientation.
///
/// Cylinders are authored along a different principal axis than the solver's
/// canonical one; this fixed 90° rotation about +Y compensates. It is a
/// shape-authoring correction, not a physical effect, and applies identically
/// to static and dynamic cylinders.
pub const CYLINDER_ROTATION_FIX: Quat = Quat::from_xyzw(
    0.0,
    std::f32::consts::FRAC_1_SQRT_2,
    0.0,
    std::f32::consts::FRAC_1_SQRT_2,
);

/// Immutable geometric descriptor for a collidable
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeDesc {
    /// Sphere with the given radius
    Sphere {
        /// Radius
        radius: f32,
    },
    /// Axis-aligned box given by its full extents
    Box {
        /// Extent along X
        width: f32,
        /// Extent along Y
        height: f32,
        /// Extent along Z
        length: f32,
    },
    /// Cylinder along the vertical axis
    Cylinder {
        /// Radius
        radius: f32,
        /// Full length along the principal axis
        length: f32,
    },
}

impl ShapeDesc {
    /// Build the solver-side shape for this descriptor
    #[must_use]
    pub fn shared(&self) -> SharedShape {
        match *self {
            Self::Sphere { radius } => SharedShape::ball(radius),
            Self::Box {
                width,
                height,
                length,
            } => SharedShape::cuboid(width * 0.5, height * 0.5, length * 0.5),
            Self::Cylinder { radius, length } => SharedShape::cylinder(length * 0.5, radius),
        }
    }

    /// Compose the caller's orientation with any authoring correction the
    /// shape requires
    #[must_use]
    pub fn corrected_orientation(&self, orientation: Quat) -> Quat {
        match self {
            Self::Cylinder { .. } => orientation * CYLINDER_ROTATION_FIX,
            _ => orientation,
        }
    }
}
