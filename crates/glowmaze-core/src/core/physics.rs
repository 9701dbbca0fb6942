use glam::Vec2;
use rapier2d::prelude::*;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use crate::api::types::EntityId;
use crate::components::shape::ShapeDesc;

// ---------------------------------------------------------------------------
// Conversion helpers (private) — glam ↔ nalgebra
// ---------------------------------------------------------------------------

fn vec2_to_na(v: Vec2) -> nalgebra::Vector2<f32> {
    nalgebra::Vector2::new(v.x, v.y)
}

fn na_to_vec2(v: &nalgebra::Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The kind of rigid body. The maze only needs the static/dynamic split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Static,
    Dynamic,
}

impl BodyKind {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyKind::Static => RigidBodyType::Fixed,
            BodyKind::Dynamic => RigidBodyType::Dynamic,
        }
    }
}

/// Body descriptor — the entity's authoritative physics state while no live
/// body exists. Once activated the live body is authoritative and this value
/// is stale until `deactivate` copies the live state back.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub fixed_rotation: bool,
    pub gravity_scale: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub awake: bool,
    pub can_sleep: bool,
    /// True while a live body exists for this descriptor.
    pub active: bool,
}

impl BodyDesc {
    pub fn dynamic() -> Self {
        Self {
            kind: BodyKind::Dynamic,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            fixed_rotation: true,
            gravity_scale: 1.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            awake: true,
            can_sleep: true,
            active: false,
        }
    }

    pub fn fixed() -> Self {
        Self {
            kind: BodyKind::Static,
            gravity_scale: 0.0,
            ..Self::dynamic()
        }
    }

    pub fn with_position(mut self, pos: Vec2) -> Self {
        self.position = pos;
        self
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.velocity = vel;
        self
    }

    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }
}

/// Fixture descriptor shared by every collider on a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixtureDesc {
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub sensor: bool,
    /// Collision filter: groups this fixture belongs to.
    pub memberships: u32,
    /// Collision filter: groups this fixture collides with.
    pub mask: u32,
}

impl Default for FixtureDesc {
    fn default() -> Self {
        Self {
            density: 1.0,
            friction: 0.4,
            restitution: 0.0,
            sensor: false,
            memberships: u32::MAX,
            mask: u32::MAX,
        }
    }
}

impl FixtureDesc {
    fn groups(&self) -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_truncate(self.memberships),
            Group::from_bits_truncate(self.mask),
        )
    }
}

/// Explicit mass override; when present it replaces the shape-derived values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassData {
    pub center: Vec2,
    pub mass: f32,
    pub inertia: f32,
}

impl MassData {
    fn to_rapier(self) -> MassProperties {
        MassProperties::new(
            nalgebra::Point2::new(self.center.x, self.center.y),
            self.mass,
            self.inertia,
        )
    }
}

/// Handles stored on an Entity, referencing Rapier internals.
/// Non-owning: the physics world owns the body and colliders.
#[derive(Debug, Clone)]
pub struct PhysicsBody {
    pub body_handle: RigidBodyHandle,
    pub collider_handles: Vec<ColliderHandle>,
}

/// A collision event between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub entity_a: EntityId,
    pub entity_b: EntityId,
    /// `true` when the contact just began, `false` when it ended.
    pub started: bool,
}

// ---------------------------------------------------------------------------
// Event collector
// ---------------------------------------------------------------------------

struct DirectEventCollector {
    collisions: Mutex<Vec<CollisionEvent>>,
}

impl DirectEventCollector {
    fn new() -> Self {
        Self {
            collisions: Mutex::new(Vec::new()),
        }
    }

    fn drain_collisions(&self) -> Vec<CollisionEvent> {
        std::mem::take(&mut *self.collisions.lock().unwrap())
    }
}

impl EventHandler for DirectEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        self.collisions.lock().unwrap().push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
        // Contact forces are unused; the trait requires this.
    }
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Wraps all Rapier2D boilerplate into a single struct.
///
/// Bodies carry their `EntityId` in `user_data`; `step_into` resolves contact
/// events back to entity pairs and silently drops events whose colliders no
/// longer map to a known body (a body removed mid-step, or foreign user data).
pub struct PhysicsWorld {
    gravity: nalgebra::Vector2<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    event_collector: DirectEventCollector,
}

impl PhysicsWorld {
    /// Create a new physics world. The maze is top-down, so the usual
    /// gravity is `Vec2::ZERO`.
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: vec2_to_na(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            event_collector: DirectEventCollector::new(),
        }
    }

    /// Set the integration timestep.
    pub fn set_dt(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
    }

    /// Set the solver sub-step count used by each world step.
    pub fn set_solver_iterations(&mut self, iterations: usize) {
        self.integration_parameters.num_solver_iterations =
            NonZeroUsize::new(iterations).unwrap_or(NonZeroUsize::MIN);
    }

    /// Create a rigid body and its colliders from descriptors.
    ///
    /// Returns `None` if no collider could be built from the shape (the
    /// recoverable activation-failure path).
    pub fn create_body(
        &mut self,
        entity_id: EntityId,
        desc: &BodyDesc,
        fixture: &FixtureDesc,
        shape: &ShapeDesc,
        mass: Option<MassData>,
    ) -> Option<PhysicsBody> {
        let builders = shape.collider_builders()?;

        let mut rb = RigidBodyBuilder::new(desc.kind.to_rapier())
            .translation(vec2_to_na(desc.position))
            .linvel(vec2_to_na(desc.velocity))
            .gravity_scale(desc.gravity_scale)
            .locked_axes(if desc.fixed_rotation {
                LockedAxes::ROTATION_LOCKED
            } else {
                LockedAxes::empty()
            })
            .linear_damping(desc.linear_damping)
            .angular_damping(desc.angular_damping)
            .can_sleep(desc.can_sleep)
            .sleeping(!desc.awake)
            .user_data(entity_id.0 as u128);
        if let Some(mass) = mass {
            rb = rb.additional_mass_properties(mass.to_rapier());
        }

        let body_handle = self.bodies.insert(rb.build());
        let collider_handles = self.attach_colliders(body_handle, builders, fixture);
        if mass.is_some() {
            // rapier 0.22 defers folding additional mass props into the body
            // until the next pipeline step; fold them in now so mass_data
            // reads the override immediately after activation.
            if let Some(rb) = self.bodies.get_mut(body_handle) {
                rb.recompute_mass_properties_from_colliders(&self.colliders);
            }
        }

        Some(PhysicsBody {
            body_handle,
            collider_handles,
        })
    }

    /// Remove a body and all its colliders from the simulation.
    pub fn remove_body(&mut self, body: &PhysicsBody) {
        self.bodies.remove(
            body.body_handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Destroy and rebuild a live body's colliders from the current shape
    /// and fixture descriptors. Returns false (leaving the old colliders
    /// removed) when the shape is degenerate.
    pub fn rebuild_colliders(
        &mut self,
        body: &mut PhysicsBody,
        shape: &ShapeDesc,
        fixture: &FixtureDesc,
    ) -> bool {
        let Some(builders) = shape.collider_builders() else {
            log::warn!("collider rebuild skipped: degenerate shape {:?}", shape);
            return false;
        };
        for handle in body.collider_handles.drain(..) {
            self.colliders
                .remove(handle, &mut self.island_manager, &mut self.bodies, true);
        }
        body.collider_handles = self.attach_colliders(body.body_handle, builders, fixture);
        true
    }

    fn attach_colliders(
        &mut self,
        body_handle: RigidBodyHandle,
        builders: Vec<ColliderBuilder>,
        fixture: &FixtureDesc,
    ) -> Vec<ColliderHandle> {
        builders
            .into_iter()
            .map(|builder| {
                let collider = builder
                    .density(fixture.density)
                    .friction(fixture.friction)
                    .restitution(fixture.restitution)
                    .sensor(fixture.sensor)
                    .collision_groups(fixture.groups())
                    .active_events(ActiveEvents::COLLISION_EVENTS)
                    .build();
                self.colliders
                    .insert_with_parent(collider, body_handle, &mut self.bodies)
            })
            .collect()
    }

    /// Step the simulation and collect collision events into the provided Vec.
    pub fn step_into(&mut self, collision_events: &mut Vec<CollisionPair>) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.event_collector,
        );

        for event in self.event_collector.drain_collisions() {
            let (h1, h2, started) = match event {
                CollisionEvent::Started(h1, h2, _) => (h1, h2, true),
                CollisionEvent::Stopped(h1, h2, _) => (h1, h2, false),
            };

            // Drop events whose colliders no longer resolve to an entity.
            let entity_a = self.collider_to_entity(h1);
            let entity_b = self.collider_to_entity(h2);

            if let (Some(a), Some(b)) = (entity_a, entity_b) {
                collision_events.push(CollisionPair {
                    entity_a: a,
                    entity_b: b,
                    started,
                });
            }
        }
    }

    // -- Body state accessors --

    pub fn body_position(&self, body: &PhysicsBody) -> Vec2 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_to_vec2(rb.translation()))
            .unwrap_or(Vec2::ZERO)
    }

    pub fn set_position(&mut self, body: &PhysicsBody, pos: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_translation(vec2_to_na(pos), true);
        }
    }

    pub fn velocity(&self, body: &PhysicsBody) -> Vec2 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_to_vec2(rb.linvel()))
            .unwrap_or(Vec2::ZERO)
    }

    pub fn set_velocity(&mut self, body: &PhysicsBody, vel: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_linvel(vec2_to_na(vel), true);
        }
    }

    pub fn is_sleeping(&self, body: &PhysicsBody) -> bool {
        self.bodies
            .get(body.body_handle)
            .map(|rb| rb.is_sleeping())
            .unwrap_or(false)
    }

    /// Replace or clear a live body's mass override. Clearing falls back to
    /// the shape-derived mass properties.
    pub fn set_mass_override(&mut self, body: &PhysicsBody, mass: Option<MassData>) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            match mass {
                Some(mass) => rb.set_additional_mass_properties(mass.to_rapier(), true),
                None => rb.set_additional_mass(0.0, true),
            }
            rb.recompute_mass_properties_from_colliders(&self.colliders);
        }
    }

    /// Read a live body's mass data: local center of mass, total mass, and
    /// principal angular inertia.
    pub fn mass_data(&self, body: &PhysicsBody) -> Option<MassData> {
        let rb = self.bodies.get(body.body_handle)?;
        let local = &rb.mass_properties().local_mprops;
        Some(MassData {
            center: Vec2::new(local.local_com.x, local.local_com.y),
            mass: rb.mass(),
            inertia: local.principal_inertia(),
        })
    }

    // -- Fixture property propagation (all colliders of the body) --

    pub fn set_density(&mut self, body: &PhysicsBody, density: f32) {
        for handle in &body.collider_handles {
            if let Some(co) = self.colliders.get_mut(*handle) {
                co.set_density(density);
            }
        }
    }

    pub fn set_friction(&mut self, body: &PhysicsBody, friction: f32) {
        for handle in &body.collider_handles {
            if let Some(co) = self.colliders.get_mut(*handle) {
                co.set_friction(friction);
            }
        }
    }

    pub fn set_restitution(&mut self, body: &PhysicsBody, restitution: f32) {
        for handle in &body.collider_handles {
            if let Some(co) = self.colliders.get_mut(*handle) {
                co.set_restitution(restitution);
            }
        }
    }

    pub fn set_sensor(&mut self, body: &PhysicsBody, sensor: bool) {
        for handle in &body.collider_handles {
            if let Some(co) = self.colliders.get_mut(*handle) {
                co.set_sensor(sensor);
            }
        }
    }

    pub fn set_collision_groups(&mut self, body: &PhysicsBody, memberships: u32, mask: u32) {
        let groups = InteractionGroups::new(
            Group::from_bits_truncate(memberships),
            Group::from_bits_truncate(mask),
        );
        for handle in &body.collider_handles {
            if let Some(co) = self.colliders.get_mut(*handle) {
                co.set_collision_groups(groups);
            }
        }
    }

    /// Snapshot the live fixture properties (read from the first collider),
    /// used when deactivation copies live state back into descriptors.
    pub fn fixture_snapshot(&self, body: &PhysicsBody) -> Option<FixtureDesc> {
        let handle = body.collider_handles.first()?;
        let co = self.colliders.get(*handle)?;
        let groups = co.collision_groups();
        Some(FixtureDesc {
            density: co.density(),
            friction: co.friction(),
            restitution: co.restitution(),
            sensor: co.is_sensor(),
            memberships: groups.memberships.bits(),
            mask: groups.filter.bits(),
        })
    }

    /// Number of rigid bodies in the simulation.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of colliders in the simulation.
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    // -- private helpers --

    fn collider_to_entity(&self, collider_handle: ColliderHandle) -> Option<EntityId> {
        let collider = self.colliders.get(collider_handle)?;
        let body_handle = collider.parent()?;
        let body = self.bodies.get(body_handle)?;
        Some(EntityId(body.user_data as u32))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
