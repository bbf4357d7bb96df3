//! World facade: the public API of the simulation layer
//!
//! Owns the solver sets and pipelines, the handle registry, the material
//! store and the worker pool. All creation, mutation, query, removal and
//! stepping goes through [`PhysicsWorld`]; nothing else mutates the stores.

use glam::{Quat, Vec3};
use nalgebra::UnitQuaternion;
use rapier3d::prelude::*;
use std::num::NonZeroUsize;

use crate::dispatch::{StepDispatcher, recommended_worker_count};
use crate::error::PhysicsError;
use crate::filter::ContactMaterials;
use crate::handles::{BodyHandle, CollidableHandle, CollidableRef, StaticHandle};
use crate::integration::IntegrationSettings;
use crate::material::{MaterialProperties, MaterialStore, SpringSettings};
use crate::registry::HandleRegistry;
use crate::shapes::ShapeDesc;

/// Floor applied to every timestep; larger stalls still advance by one step
/// of at least this duration instead of destabilizing the solver
pub const MIN_TIMESTEP: f32 = 1.0 / 240.0;

/// Velocity iterations per substep
const VELOCITY_ITERATIONS: usize = 8;

/// Substeps per solver step
const SOLVER_SUBSTEPS: NonZeroUsize = NonZeroUsize::new(4).unwrap();

/// Position and orientation of a collidable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// World-space position
    pub position: Vec3,
    /// World-space orientation, unit quaternion
    pub orientation: Quat,
}

impl Pose {
    /// Pose from position and orientation
    #[must_use]
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Pose at `position` with identity orientation
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::from_position(Vec3::ZERO)
    }
}

/// Linear and angular velocity of a body
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    /// Linear velocity
    pub linear: Vec3,
    /// Angular velocity
    pub angular: Vec3,
}

/// Result of a closest-hit ray cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// The collidable that was hit
    pub collidable: CollidableRef,
    /// World-space point of intersection
    pub point: Vec3,
    /// Distance from the ray origin
    pub distance: f32,
}

/// Convert glam Quat to a solver-side unit quaternion
fn quat_to_rapier(q: Quat) -> UnitQuaternion<f32> {
    UnitQuaternion::from_quaternion(nalgebra::Quaternion::new(q.w, q.x, q.y, q.z))
}

/// Convert a solver-side unit quaternion to glam Quat
fn rapier_to_quat(uq: &UnitQuaternion<f32>) -> Quat {
    let q = uq.quaternion();
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn to_vec3(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn to_isometry(position: Vec3, orientation: Quat) -> Isometry<Real> {
    Isometry::from_parts(
        nalgebra::Translation3::new(position.x, position.y, position.z),
        quat_to_rapier(orientation),
    )
}

/// Physics world manager
///
/// `T` is the caller's opaque object reference, stored per collidable and
/// returned from lookups; the world never interprets it.
pub struct PhysicsWorld<T> {
    integration: IntegrationSettings,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    dispatcher: StepDispatcher,
    registry: HandleRegistry<T>,
    materials: MaterialStore,
    query_dirty: bool,
}

impl<T> PhysicsWorld<T> {
    /// Create a world with default gravity and damping and a worker pool
    /// sized for the host
    pub fn new() -> Result<Self, PhysicsError> {
        Self::with_settings(IntegrationSettings::default(), recommended_worker_count())
    }

    /// Create a world with explicit integration settings and worker count
    pub fn with_settings(
        integration: IntegrationSettings,
        workers: usize,
    ) -> Result<Self, PhysicsError> {
        let dispatcher = StepDispatcher::new(workers)?;

        let default_spring = SpringSettings::default();
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.num_solver_iterations = SOLVER_SUBSTEPS;
        integration_parameters.num_internal_pgs_iterations = VELOCITY_ITERATIONS;
        integration_parameters.contact_natural_frequency = default_spring.frequency;
        integration_parameters.contact_damping_ratio = default_spring.damping_ratio;

        log::info!(
            "Physics world initialized: {} workers, {} substeps, {} velocity iterations",
            dispatcher.workers(),
            SOLVER_SUBSTEPS,
            VELOCITY_ITERATIONS
        );

        Ok(Self {
            integration,
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            dispatcher,
            registry: HandleRegistry::new(),
            materials: MaterialStore::new(),
            query_dirty: false,
        })
    }

    /// Advance the simulation by exactly one step of `delta_time` seconds,
    /// clamped to [`MIN_TIMESTEP`]. Blocking; internal work runs on the
    /// worker pool.
    pub fn update(&mut self, delta_time: f32) {
        let dt = if delta_time < MIN_TIMESTEP {
            log::trace!("Timestep {delta_time} clamped to {MIN_TIMESTEP}");
            MIN_TIMESTEP
        } else {
            delta_time
        };
        self.integration_parameters.dt = dt;
        let gravity = to_vector(self.integration.gravity);

        let Self {
            integration_parameters,
            pipeline,
            island_manager,
            broad_phase,
            narrow_phase,
            bodies,
            colliders,
            impulse_joints,
            multibody_joints,
            ccd_solver,
            query_pipeline,
            dispatcher,
            materials,
            ..
        } = self;

        let hooks = ContactMaterials::new(materials);
        dispatcher.install(|| {
            pipeline.step(
                &gravity,
                integration_parameters,
                island_manager,
                broad_phase,
                narrow_phase,
                bodies,
                colliders,
                impulse_joints,
                multibody_joints,
                ccd_solver,
                Some(query_pipeline),
                &hooks,
                &(),
            );
        });

        self.query_dirty = false;
    }

    /// Create a dynamic body with inertia computed from `mass` and the shape
    pub fn add_dynamic(&mut self, object: T, pose: Pose, shape: ShapeDesc, mass: f32) -> BodyHandle {
        let orientation = shape.corrected_orientation(pose.orientation);
        let body = RigidBodyBuilder::dynamic()
            .position(to_isometry(pose.position, orientation))
            .linear_damping(self.integration.linear_coefficient())
            .angular_damping(self.integration.angular_coefficient())
            .build();

        let (handle, collider) =
            self.insert_body(body, &shape, MaterialProperties::default(), Some(mass));
        let handle = BodyHandle(handle);
        self.registry
            .insert(CollidableRef::Dynamic(handle), collider, object);
        handle
    }

    /// Create a dynamic sphere
    pub fn add_dynamic_sphere(
        &mut self,
        object: T,
        pose: Pose,
        radius: f32,
        mass: f32,
    ) -> BodyHandle {
        self.add_dynamic(object, pose, ShapeDesc::Sphere { radius }, mass)
    }

    /// Create a dynamic box from its full extents
    pub fn add_dynamic_box(
        &mut self,
        object: T,
        pose: Pose,
        width: f32,
        height: f32,
        length: f32,
        mass: f32,
    ) -> BodyHandle {
        self.add_dynamic(
            object,
            pose,
            ShapeDesc::Box {
                width,
                height,
                length,
            },
            mass,
        )
    }

    /// Create a dynamic cylinder
    pub fn add_dynamic_cylinder(
        &mut self,
        object: T,
        pose: Pose,
        radius: f32,
        length: f32,
        mass: f32,
    ) -> BodyHandle {
        self.add_dynamic(object, pose, ShapeDesc::Cylinder { radius, length }, mass)
    }

    /// Create an immovable collidable
    pub fn add_static(&mut self, object: T, pose: Pose, shape: ShapeDesc) -> StaticHandle {
        let orientation = shape.corrected_orientation(pose.orientation);
        let body = RigidBodyBuilder::fixed()
            .position(to_isometry(pose.position, orientation))
            .build();

        let (handle, collider) = self.insert_body(body, &shape, MaterialProperties::default(), None);
        let handle = StaticHandle(handle);
        self.registry
            .insert(CollidableRef::Static(handle), collider, object);
        handle
    }

    /// Create a static sphere
    pub fn add_static_sphere(&mut self, object: T, pose: Pose, radius: f32) -> StaticHandle {
        self.add_static(object, pose, ShapeDesc::Sphere { radius })
    }

    /// Create a static box from its full extents
    pub fn add_static_box(
        &mut self,
        object: T,
        pose: Pose,
        width: f32,
        height: f32,
        length: f32,
    ) -> StaticHandle {
        self.add_static(
            object,
            pose,
            ShapeDesc::Box {
                width,
                height,
                length,
            },
        )
    }

    /// Create a static cylinder
    pub fn add_static_cylinder(
        &mut self,
        object: T,
        pose: Pose,
        radius: f32,
        length: f32,
    ) -> StaticHandle {
        self.add_static(object, pose, ShapeDesc::Cylinder { radius, length })
    }

    /// Create a kinematic box: moves under direct control, infinite mass,
    /// still generates contacts
    pub fn add_kinematic_box(
        &mut self,
        object: T,
        pose: Pose,
        width: f32,
        height: f32,
        length: f32,
    ) -> BodyHandle {
        let shape = ShapeDesc::Box {
            width,
            height,
            length,
        };
        let body = RigidBodyBuilder::kinematic_position_based()
            .position(to_isometry(pose.position, pose.orientation))
            .build();

        let (handle, collider) =
            self.insert_body(body, &shape, MaterialProperties::kinematic(), None);
        let handle = BodyHandle(handle);
        self.registry
            .insert(CollidableRef::Kinematic(handle), collider, object);
        handle
    }

    fn insert_body(
        &mut self,
        body: RigidBody,
        shape: &ShapeDesc,
        material: MaterialProperties,
        mass: Option<f32>,
    ) -> (RigidBodyHandle, rapier3d::geometry::ColliderHandle) {
        let handle = self.bodies.insert(body);

        let mut builder = ColliderBuilder::new(shape.shared())
            .friction(material.friction)
            .active_hooks(ActiveHooks::FILTER_CONTACT_PAIRS | ActiveHooks::MODIFY_SOLVER_CONTACTS);
        if let Some(mass) = mass {
            builder = builder.mass(mass);
        }

        let collider = self
            .colliders
            .insert_with_parent(builder.build(), handle, &mut self.bodies);
        self.materials.insert(collider, material);
        self.query_dirty = true;
        (handle, collider)
    }

    /// World-space position of a body or static
    pub fn position<H: CollidableHandle>(&self, handle: H) -> Result<Vec3, PhysicsError> {
        let rb = self
            .bodies
            .get(handle.raw())
            .ok_or(PhysicsError::InvalidHandle)?;
        Ok(to_vec3(rb.translation()))
    }

    /// World-space orientation of a body or static
    pub fn orientation<H: CollidableHandle>(&self, handle: H) -> Result<Quat, PhysicsError> {
        let rb = self
            .bodies
            .get(handle.raw())
            .ok_or(PhysicsError::InvalidHandle)?;
        Ok(rapier_to_quat(rb.rotation()))
    }

    /// Pose of a body or static
    pub fn pose<H: CollidableHandle>(&self, handle: H) -> Result<Pose, PhysicsError> {
        Ok(Pose::new(self.position(handle)?, self.orientation(handle)?))
    }

    /// Linear velocity of a body
    pub fn linear_velocity(&self, handle: BodyHandle) -> Result<Vec3, PhysicsError> {
        let rb = self.bodies.get(handle.0).ok_or(PhysicsError::InvalidHandle)?;
        Ok(to_vec3(rb.linvel()))
    }

    /// Angular velocity of a body
    pub fn angular_velocity(&self, handle: BodyHandle) -> Result<Vec3, PhysicsError> {
        let rb = self.bodies.get(handle.0).ok_or(PhysicsError::InvalidHandle)?;
        Ok(to_vec3(rb.angvel()))
    }

    /// Linear and angular velocity of a body
    pub fn velocity(&self, handle: BodyHandle) -> Result<Velocity, PhysicsError> {
        Ok(Velocity {
            linear: self.linear_velocity(handle)?,
            angular: self.angular_velocity(handle)?,
        })
    }

    /// Whether a body is in the active simulation set
    pub fn is_awake(&self, handle: BodyHandle) -> Result<bool, PhysicsError> {
        let rb = self.bodies.get(handle.0).ok_or(PhysicsError::InvalidHandle)?;
        Ok(!rb.is_sleeping())
    }

    /// Force a sleeping body back into the active simulation set
    pub fn awake(&mut self, handle: BodyHandle) -> Result<(), PhysicsError> {
        let rb = self
            .bodies
            .get_mut(handle.0)
            .ok_or(PhysicsError::InvalidHandle)?;
        rb.wake_up(true);
        Ok(())
    }

    /// Apply `normalize(direction) * force * delta_time * inverse_mass` as an
    /// impulse at `position + offset`, emulating a continuous force over one
    /// frame. Wakes the body.
    pub fn apply_impulse(
        &mut self,
        handle: BodyHandle,
        direction: Vec3,
        offset: Vec3,
        force: f32,
        delta_time: f32,
    ) -> Result<(), PhysicsError> {
        let rb = self
            .bodies
            .get_mut(handle.0)
            .ok_or(PhysicsError::InvalidHandle)?;

        let mass = rb.mass();
        let inverse_mass = if mass > 0.0 { 1.0 / mass } else { 0.0 };
        let impulse = direction.normalize_or_zero() * force * delta_time * inverse_mass;
        let at = to_vec3(rb.translation()) + offset;

        rb.apply_impulse_at_point(to_vector(impulse), point![at.x, at.y, at.z], true);
        Ok(())
    }

    /// Teleport a body, zeroing its linear velocity so no residual velocity
    /// carries over. Orientation and angular velocity are left untouched.
    pub fn set_position(&mut self, handle: BodyHandle, position: Vec3) -> Result<(), PhysicsError> {
        let rb = self
            .bodies
            .get_mut(handle.0)
            .ok_or(PhysicsError::InvalidHandle)?;

        rb.set_translation(to_vector(position), true);
        rb.set_linvel(Vector::zeros(), true);
        self.query_dirty = true;
        Ok(())
    }

    /// Set the linear velocity of a body
    pub fn set_linear_velocity(
        &mut self,
        handle: BodyHandle,
        velocity: Vec3,
    ) -> Result<(), PhysicsError> {
        let rb = self
            .bodies
            .get_mut(handle.0)
            .ok_or(PhysicsError::InvalidHandle)?;
        rb.set_linvel(to_vector(velocity), true);
        Ok(())
    }

    /// Remove a body along with its registry and material entries
    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<(), PhysicsError> {
        self.remove_collidable(handle.0)
    }

    /// Remove a static along with its registry and material entries
    pub fn remove_static(&mut self, handle: StaticHandle) -> Result<(), PhysicsError> {
        self.remove_collidable(handle.0)
    }

    fn remove_collidable(&mut self, handle: RigidBodyHandle) -> Result<(), PhysicsError> {
        let rb = self.bodies.get(handle).ok_or(PhysicsError::InvalidHandle)?;
        let attached: Vec<_> = rb.colliders().to_vec();

        for collider in attached {
            self.materials.remove(collider);
            if let Some((collidable, _)) = self.registry.remove(collider) {
                log::debug!("Removed collidable {collidable:?}");
            }
        }

        self.bodies.remove(
            handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        self.query_dirty = true;
        Ok(())
    }

    /// Cast a ray and return the closest hit, if any.
    ///
    /// Valid between creation and the next step: the query structure is
    /// refreshed lazily when collidables changed since the last step.
    pub fn ray_cast(
        &mut self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Option<RaycastHit> {
        if self.query_dirty {
            self.query_pipeline.update(&self.colliders);
            self.query_dirty = false;
        }

        let ray = Ray::new(point![origin.x, origin.y, origin.z], to_vector(direction));
        self.query_pipeline
            .cast_ray(
                &self.bodies,
                &self.colliders,
                &ray,
                max_distance,
                true,
                QueryFilter::default(),
            )
            .and_then(|(collider, distance)| {
                let collidable = self.registry.resolve(collider)?;
                let point = ray.point_at(distance);
                Some(RaycastHit {
                    collidable,
                    point: Vec3::new(point.x, point.y, point.z),
                    distance,
                })
            })
    }

    /// Application object associated with a collidable
    #[must_use]
    pub fn object(&self, collidable: &CollidableRef) -> Option<&T> {
        self.registry.get(collidable)
    }

    /// Material of a body or static
    pub fn material<H: CollidableHandle>(
        &self,
        handle: H,
    ) -> Result<&MaterialProperties, PhysicsError> {
        let rb = self
            .bodies
            .get(handle.raw())
            .ok_or(PhysicsError::InvalidHandle)?;
        let collider = *rb.colliders().first().ok_or(PhysicsError::InvalidHandle)?;
        self.materials.get(collider).ok_or(PhysicsError::InvalidHandle)
    }

    /// Mutable material of a body or static
    pub fn material_mut<H: CollidableHandle>(
        &mut self,
        handle: H,
    ) -> Result<&mut MaterialProperties, PhysicsError> {
        let rb = self
            .bodies
            .get(handle.raw())
            .ok_or(PhysicsError::InvalidHandle)?;
        let collider = *rb.colliders().first().ok_or(PhysicsError::InvalidHandle)?;
        self.materials
            .get_mut(collider)
            .ok_or(PhysicsError::InvalidHandle)
    }

    /// Integration settings of this world
    #[must_use]
    pub fn settings(&self) -> &IntegrationSettings {
        &self.integration
    }

    /// Number of live collidables
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether the world has no collidables
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}
