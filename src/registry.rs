//! Handle registry: collidable handles to application objects
//!
//! Pure bookkeeping, no simulation logic. Owned by the world facade and scoped
//! to its lifetime; all mutation happens through the facade's create/remove
//! paths. Absent keys mean "no associated object", never an error, so
//! callbacks can skip untracked collidables.

use rapier3d::geometry::ColliderHandle;
use rustc_hash::FxHashMap;

use crate::handles::CollidableRef;

/// Mapping from collidables to the caller's opaque objects
///
/// Also keeps the reverse collider-to-collidable mapping used to resolve
/// ray-cast results back into application terms.
#[derive(Debug)]
pub struct HandleRegistry<T> {
    objects: FxHashMap<CollidableRef, T>,
    colliders: FxHashMap<ColliderHandle, CollidableRef>,
}

impl<T> HandleRegistry<T> {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: FxHashMap::default(),
            colliders: FxHashMap::default(),
        }
    }

    /// Track a newly created collidable and its application object
    pub fn insert(&mut self, collidable: CollidableRef, collider: ColliderHandle, object: T) {
        self.objects.insert(collidable, object);
        self.colliders.insert(collider, collidable);
    }

    /// Stop tracking the collidable attached to `collider`, returning its
    /// reference and object if it was tracked
    pub fn remove(&mut self, collider: ColliderHandle) -> Option<(CollidableRef, T)> {
        let collidable = self.colliders.remove(&collider)?;
        let object = self.objects.remove(&collidable)?;
        Some((collidable, object))
    }

    /// Application object for a collidable
    #[must_use]
    pub fn get(&self, collidable: &CollidableRef) -> Option<&T> {
        self.objects.get(collidable)
    }

    /// Collidable attached to a collider handle
    #[must_use]
    pub fn resolve(&self, collider: ColliderHandle) -> Option<CollidableRef> {
        self.colliders.get(&collider).copied()
    }

    /// Number of tracked collidables
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl<T> Default for HandleRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handles::{BodyHandle, StaticHandle};
    use rapier3d::geometry::{ColliderBuilder, ColliderSet};
    use rapier3d::prelude::{RigidBodyBuilder, RigidBodySet};

    fn test_handles() -> (CollidableRef, CollidableRef, ColliderHandle, ColliderHandle) {
        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        let b = bodies.insert(RigidBodyBuilder::dynamic().build());
        let s = bodies.insert(RigidBodyBuilder::fixed().build());
        let cb = colliders.insert_with_parent(ColliderBuilder::ball(1.0).build(), b, &mut bodies);
        let cs = colliders.insert_with_parent(ColliderBuilder::ball(1.0).build(), s, &mut bodies);

        (
            CollidableRef::Dynamic(BodyHandle(b)),
            CollidableRef::Static(StaticHandle(s)),
            cb,
            cs,
        )
    }

    #[test]
    fn test_insert_lookup_resolve() {
        let (body, fixed, cb, cs) = test_handles();
        let mut registry = HandleRegistry::new();

        registry.insert(body, cb, "ball");
        registry.insert(fixed, cs, "floor");

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(&body), Some(&"ball"));
        assert_eq!(registry.get(&fixed), Some(&"floor"));
        assert_eq!(registry.resolve(cb), Some(body));
        assert_eq!(registry.resolve(cs), Some(fixed));
    }

    #[test]
    fn test_absent_key_is_none_not_error() {
        let (body, _, cb, _) = test_handles();
        let registry: HandleRegistry<u32> = HandleRegistry::new();

        assert!(registry.get(&body).is_none());
        assert!(registry.resolve(cb).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_clears_both_directions() {
        let (body, _, cb, _) = test_handles();
        let mut registry = HandleRegistry::new();
        registry.insert(body, cb, 7u32);

        assert_eq!(registry.remove(cb), Some((body, 7)));
        assert!(registry.get(&body).is_none());
        assert!(registry.resolve(cb).is_none());
        assert!(registry.remove(cb).is_none());
    }
}
