//! Collision filtering and contact material resolution
//!
//! [`ContactMaterials`] is the policy object handed to the solver for the span
//! of one step. The solver invokes it from worker threads during broad-phase
//! pair admission and narrow-phase contact generation, so it only holds shared
//! references.

use rapier3d::prelude::*;

use crate::material::{MaterialProperties, MaterialStore};

/// Admit a pair when at least one side can move.
///
/// Static-static pairs never need contacts.
pub(crate) fn admit_pair(fixed1: bool, fixed2: bool) -> bool {
    !(fixed1 && fixed2)
}

/// Solver callback resolving per-pair contact materials from the store
pub struct ContactMaterials<'a> {
    materials: &'a MaterialStore,
}

impl<'a> ContactMaterials<'a> {
    /// Borrow the material store for one solver step
    #[must_use]
    pub fn new(materials: &'a MaterialStore) -> Self {
        Self { materials }
    }

    fn material_of(&self, collider: ColliderHandle) -> MaterialProperties {
        // Untracked collidables fall back to the default material
        self.materials
            .get(collider)
            .copied()
            .unwrap_or_default()
    }
}

impl PhysicsHooks for ContactMaterials<'_> {
    fn filter_contact_pair(&self, context: &PairFilterContext) -> Option<SolverFlags> {
        let fixed1 = context
            .rigid_body1
            .is_none_or(|h| context.bodies[h].is_fixed());
        let fixed2 = context
            .rigid_body2
            .is_none_or(|h| context.bodies[h].is_fixed());

        if admit_pair(fixed1, fixed2) {
            Some(SolverFlags::COMPUTE_IMPULSES)
        } else {
            None
        }
    }

    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        let pair = self
            .material_of(context.collider1)
            .combine(&self.material_of(context.collider2));

        for contact in context.solver_contacts.iter_mut() {
            contact.friction = pair.friction;
        }
    }
}
