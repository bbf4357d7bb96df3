//! Opaque handles for simulated collidables
//!
//! Handles wrap rapier's generational indices, so a handle kept across a
//! removal fails the next live lookup instead of aliasing a recycled slot.

/// Handle to a dynamic or kinematic rigid body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub rapier3d::dynamics::RigidBodyHandle);

/// Handle to an immovable collidable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StaticHandle(pub rapier3d::dynamics::RigidBodyHandle);

/// Mobility class of a collidable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    /// Full rigid body with mass and inertia, responds to forces and impulses
    Dynamic,
    /// Moves under direct control, infinite mass, still generates contacts
    Kinematic,
    /// Immovable collision geometry
    Static,
}

/// Tagged reference to any collidable in the world
///
/// Key of the handle registry; returned by ray casts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollidableRef {
    /// A dynamic body
    Dynamic(BodyHandle),
    /// A kinematic body
    Kinematic(BodyHandle),
    /// A static
    Static(StaticHandle),
}

impl CollidableRef {
    /// Mobility class of the referenced collidable
    #[must_use]
    pub fn kind(&self) -> BodyKind {
        match self {
            Self::Dynamic(_) => BodyKind::Dynamic,
            Self::Kinematic(_) => BodyKind::Kinematic,
            Self::Static(_) => BodyKind::Static,
        }
    }

    /// The underlying solver handle
    #[must_use]
    pub fn raw(&self) -> rapier3d::dynamics::RigidBodyHandle {
        match self {
            Self::Dynamic(h) | Self::Kinematic(h) => h.0,
            Self::Static(h) => h.0,
        }
    }
}

/// Handle types accepted by pose queries (bodies and statics alike)
pub trait CollidableHandle: Copy {
    /// The underlying solver handle
    fn raw(self) -> rapier3d::dynamics::RigidBodyHandle;
}

impl CollidableHandle for BodyHandle {
    fn raw(self) -> rapier3d::dynamics::RigidBodyHandle {
        self.0
    }
}

impl CollidableHandle for StaticHandle {
    fn raw(self) -> rapier3d::dynamics::RigidBodyHandle {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapier3d::dynamics::RigidBodySet;
    use rapier3d::prelude::RigidBodyBuilder;

    #[test]
    fn test_collidable_ref_kind() {
        let mut bodies = RigidBodySet::new();
        let h = bodies.insert(RigidBodyBuilder::dynamic().build());

        let dynamic = CollidableRef::Dynamic(BodyHandle(h));
        let kinematic = CollidableRef::Kinematic(BodyHandle(h));
        let fixed = CollidableRef::Static(StaticHandle(h));

        assert_eq!(dynamic.kind(), BodyKind::Dynamic);
        assert_eq!(kinematic.kind(), BodyKind::Kinematic);
        assert_eq!(fixed.kind(), BodyKind::Static);

        // Same slot, different mobility tags: still distinct registry keys
        assert_ne!(dynamic, kinematic);
        assert_eq!(dynamic.raw(), fixed.raw());
    }
}
