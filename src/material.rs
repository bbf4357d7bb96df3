//! Per-collidable contact material parameters
//!
//! The store runs parallel to the solver's own body/static tables: one entry
//! per live collidable, keyed by its collider handle, erased on removal. The
//! collision filter reads it from worker threads during a step.

use rapier3d::geometry::ColliderHandle;
use rustc_hash::FxHashMap;

/// Contact spring parameters controlling contact softness
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringSettings {
    /// Natural frequency in Hz, must be positive
    pub frequency: f32,
    /// Damping ratio, 1.0 is critically damped
    pub damping_ratio: f32,
}

impl Default for SpringSettings {
    fn default() -> Self {
        Self {
            frequency: 30.0,
            damping_ratio: 1.0,
        }
    }
}

/// Contact material attached to one collidable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialProperties {
    /// Friction coefficient, non-negative
    pub friction: f32,
    /// Cap on penetration-recovery speed; `f32::INFINITY` leaves it unbounded
    pub max_recovery_velocity: f32,
    /// Contact spring settings
    pub spring: SpringSettings,
}

impl Default for MaterialProperties {
    fn default() -> Self {
        Self {
            friction: 1.0,
            max_recovery_velocity: f32::INFINITY,
            spring: SpringSettings::default(),
        }
    }
}

impl MaterialProperties {
    /// Default material for kinematic bodies: recovery velocity capped at 1
    /// so a fast-moving kinematic does not launch whatever it overlaps
    #[must_use]
    pub fn kinematic() -> Self {
        Self {
            max_recovery_velocity: 1.0,
            ..Self::default()
        }
    }

    /// Combine the materials of a contact pair into one pair material.
    ///
    /// Friction is the geometric mean; spring settings and recovery cap come
    /// from whichever side has the lower maximum recovery velocity (the more
    /// restrictive surface wins). This is contact policy, not asserted
    /// physics; it is kept exactly because downstream behavior depends on it.
    /// Ties break on spring frequency, then damping ratio, so swapping the
    /// pair always yields identical results.
    #[must_use]
    pub fn combine(&self, other: &Self) -> Self {
        let softer = if self.pair_order() <= other.pair_order() {
            self
        } else {
            other
        };
        Self {
            friction: (self.friction * other.friction).sqrt(),
            max_recovery_velocity: softer.max_recovery_velocity,
            spring: softer.spring,
        }
    }

    fn pair_order(&self) -> (f32, f32, f32) {
        (
            self.max_recovery_velocity,
            self.spring.frequency,
            self.spring.damping_ratio,
        )
    }
}

/// Handle-keyed table of material properties
///
/// Generational collider handles make stale reuse impossible: a recycled slot
/// carries a new generation and misses the old entry.
#[derive(Debug, Default)]
pub struct MaterialStore {
    entries: FxHashMap<ColliderHandle, MaterialProperties>,
}

impl MaterialStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the material for a collidable
    pub fn insert(&mut self, collider: ColliderHandle, material: MaterialProperties) {
        self.entries.insert(collider, material);
    }

    /// Remove the entry for a collidable, returning it if present
    pub fn remove(&mut self, collider: ColliderHandle) -> Option<MaterialProperties> {
        self.entries.remove(&collider)
    }

    /// Material for a collidable, if it is tracked
    #[must_use]
    pub fn get(&self, collider: ColliderHandle) -> Option<&MaterialProperties> {
        self.entries.get(&collider)
    }

    /// Mutable material for a collidable, if it is tracked
    pub fn get_mut(&mut self, collider: ColliderHandle) -> Option<&mut MaterialProperties> {
        self.entries.get_mut(&collider)
    }

    /// Number of tracked collidables
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_material() {
        let m = MaterialProperties::default();

        assert!((m.friction - 1.0).abs() < 1e-6);
        assert!(m.max_recovery_velocity.is_infinite());
        assert!((m.spring.frequency - 30.0).abs() < 1e-6);
        assert!((m.spring.damping_ratio - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_kinematic_default_caps_recovery() {
        let m = MaterialProperties::kinematic();

        assert!((m.max_recovery_velocity - 1.0).abs() < 1e-6);
        assert!((m.friction - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_combine_friction_is_geometric_mean() {
        let a = MaterialProperties {
            friction: 0.5,
            ..Default::default()
        };
        let b = MaterialProperties {
            friction: 2.0,
            ..Default::default()
        };

        let pair = a.combine(&b);
        assert!((pair.friction - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_combine_lower_recovery_side_wins() {
        let soft = MaterialProperties {
            max_recovery_velocity: 1.0,
            spring: SpringSettings {
                frequency: 10.0,
                damping_ratio: 0.5,
            },
            ..Default::default()
        };
        let hard = MaterialProperties::default();

        let pair = hard.combine(&soft);
        assert!((pair.max_recovery_velocity - 1.0).abs() < 1e-6);
        assert!((pair.spring.frequency - 10.0).abs() < 1e-6);
        assert!((pair.spring.damping_ratio - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_combine_is_symmetric() {
        let a = MaterialProperties {
            friction: 0.3,
            max_recovery_velocity: 2.0,
            spring: SpringSettings {
                frequency: 20.0,
                damping_ratio: 0.9,
            },
        };
        let b = MaterialProperties {
            friction: 0.7,
            max_recovery_velocity: 2.0,
            spring: SpringSettings {
                frequency: 40.0,
                damping_ratio: 0.2,
            },
        };

        assert_eq!(a.combine(&b), b.combine(&a));
    }

    #[test]
    fn test_store_insert_remove() {
        use rapier3d::geometry::{ColliderBuilder, ColliderSet};

        let mut colliders = ColliderSet::new();
        let handle = colliders.insert(ColliderBuilder::ball(1.0).build());

        let mut store = MaterialStore::new();
        assert!(store.is_empty());

        store.insert(handle, MaterialProperties::default());
        assert_eq!(store.len(), 1);
        assert!(store.get(handle).is_some());

        store.get_mut(handle).unwrap().friction = 0.25;
        assert!((store.get(handle).unwrap().friction - 0.25).abs() < 1e-6);

        assert!(store.remove(handle).is_some());
        assert!(store.remove(handle).is_none());
        assert!(store.get(handle).is_none());
    }
}
