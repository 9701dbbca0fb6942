use glam::Vec2;

use crate::api::types::EntityId;
use crate::components::shape::ShapeDesc;
use crate::core::grid::Direction;
use crate::core::physics::{BodyDesc, FixtureDesc, MassData, PhysicsBody, PhysicsWorld};

/// Collision filter group bits.
pub mod filter {
    pub const STATIC: u32 = 1 << 0;
    pub const PLAYER: u32 = 1 << 1;
    pub const ENEMY: u32 = 1 << 2;
    pub const RIVER: u32 = 1 << 3;
    pub const DECOY: u32 = 1 << 4;
    pub const BOULDER: u32 = 1 << 5;
    pub const ALL: u32 = u32::MAX;
}

/// Ticks a charge lasts once started.
pub const CHARGE_TICKS: u32 = 45;
/// Ticks an enemy stays stunned.
pub const STUN_TICKS: u32 = 120;

/// The player's three forms. Transforming swaps the shape and fixture
/// descriptors on the same live body; nothing is copy-constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerForm {
    /// Light form; passes over rivers.
    Wisp,
    /// Heavy form; the only form that can charge.
    Ram,
    /// Digging form; gnaws through edible walls.
    Mole,
}

/// Per-form behavior record consumed by [`Entity::transform`].
#[derive(Debug, Clone)]
pub struct FormSpec {
    pub shape: ShapeDesc,
    pub density: f32,
    /// Movement speed in world units per second.
    pub move_speed: f32,
    pub memberships: u32,
    pub mask: u32,
}

impl PlayerForm {
    pub fn spec(self) -> FormSpec {
        match self {
            PlayerForm::Wisp => FormSpec {
                shape: ShapeDesc::Circle { radius: 10.0 },
                density: 0.6,
                move_speed: 160.0,
                memberships: filter::PLAYER,
                mask: filter::ALL & !filter::RIVER,
            },
            PlayerForm::Ram => FormSpec {
                shape: ShapeDesc::Circle { radius: 14.0 },
                density: 2.0,
                move_speed: 140.0,
                memberships: filter::PLAYER,
                mask: filter::ALL,
            },
            PlayerForm::Mole => FormSpec {
                shape: ShapeDesc::Circle { radius: 12.0 },
                density: 1.0,
                move_speed: 110.0,
                memberships: filter::PLAYER,
                mask: filter::ALL,
            },
        }
    }
}

/// Closed set of entity kinds, carrying the per-kind gameplay state.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Wall,
    EdibleWall,
    Enemy {
        stunned: bool,
        collided: bool,
        stun_ticks: u32,
    },
    Goal,
    Player {
        form: PlayerForm,
        charging: bool,
        collided: bool,
        charge_ticks: u32,
    },
    Decoy,
    Switch,
    Resource,
    River,
    Boulder {
        pushed: bool,
    },
    Firefly,
}

impl EntityKind {
    pub fn player(form: PlayerForm) -> Self {
        EntityKind::Player {
            form,
            charging: false,
            collided: false,
            charge_ticks: 0,
        }
    }

    pub fn enemy() -> Self {
        EntityKind::Enemy {
            stunned: false,
            collided: false,
            stun_ticks: 0,
        }
    }

    pub fn boulder() -> Self {
        EntityKind::Boulder { pushed: false }
    }

    pub fn tag(&self) -> EntityTag {
        match self {
            EntityKind::Wall => EntityTag::Wall,
            EntityKind::EdibleWall => EntityTag::EdibleWall,
            EntityKind::Enemy { .. } => EntityTag::Enemy,
            EntityKind::Goal => EntityTag::Goal,
            EntityKind::Player { .. } => EntityTag::Player,
            EntityKind::Decoy => EntityTag::Decoy,
            EntityKind::Switch => EntityTag::Switch,
            EntityKind::Resource => EntityTag::Resource,
            EntityKind::River => EntityTag::River,
            EntityKind::Boulder { .. } => EntityTag::Boulder,
            EntityKind::Firefly => EntityTag::Firefly,
        }
    }
}

/// Fieldless mirror of [`EntityKind`], used as the collision dispatch key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityTag {
    Wall,
    EdibleWall,
    Enemy,
    Goal,
    Player,
    Decoy,
    Switch,
    Resource,
    River,
    Boulder,
    Firefly,
}

impl EntityTag {
    pub const ALL: [EntityTag; 11] = [
        EntityTag::Wall,
        EntityTag::EdibleWall,
        EntityTag::Enemy,
        EntityTag::Goal,
        EntityTag::Player,
        EntityTag::Decoy,
        EntityTag::Switch,
        EntityTag::Resource,
        EntityTag::River,
        EntityTag::Boulder,
        EntityTag::Firefly,
    ];
}

/// A simulated object: descriptors plus an optional live physics handle.
///
/// While no live handle exists every accessor reads/writes the descriptors.
/// Once activated the live body is authoritative and the descriptors are
/// stale; `deactivate` copies the live state back so an
/// activate → mutate → deactivate → activate cycle round-trips losslessly
/// (modulo float precision).
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    /// Debug-only name tag.
    pub name: String,
    pub kind: EntityKind,
    pub body_desc: BodyDesc,
    pub fixture: FixtureDesc,
    pub shape: ShapeDesc,
    pub mass_override: Option<MassData>,
    /// Live physics handle; `None` while inactive. The physics world owns
    /// the body itself.
    pub body: Option<PhysicsBody>,
    pub draw_scale: f32,
    pub facing: Direction,
    /// Grid cell this entity occupies, kept consistent by the spatial grid.
    pub grid_pos: Option<(i32, i32)>,
    removed: bool,
    dirty: bool,
}

impl Entity {
    /// Create an entity of the given kind at a world position. Body type,
    /// fixture defaults, and shape are derived from the kind; builders below
    /// override them where a level needs something else.
    pub fn new(id: EntityId, kind: EntityKind, pos: Vec2) -> Self {
        let tag = kind.tag();
        let body_desc = match tag {
            EntityTag::Player | EntityTag::Enemy | EntityTag::Boulder => {
                BodyDesc::dynamic().with_position(pos)
            }
            _ => BodyDesc::fixed().with_position(pos),
        };
        let mut fixture = FixtureDesc {
            memberships: match tag {
                EntityTag::Player => filter::PLAYER,
                EntityTag::Enemy => filter::ENEMY,
                EntityTag::River => filter::RIVER,
                EntityTag::Decoy => filter::DECOY,
                EntityTag::Boulder => filter::BOULDER,
                _ => filter::STATIC,
            },
            ..FixtureDesc::default()
        };
        fixture.sensor = matches!(
            tag,
            EntityTag::Decoy | EntityTag::Switch | EntityTag::Resource | EntityTag::Firefly
        );
        let mut shape = ShapeDesc::square(16.0);
        let mut mass_override = None;
        if let EntityKind::Player { form, .. } = &kind {
            let spec = form.spec();
            shape = spec.shape;
            fixture.density = spec.density;
            fixture.memberships = spec.memberships;
            fixture.mask = spec.mask;
        }
        if tag == EntityTag::Enemy {
            shape = ShapeDesc::Circle { radius: 12.0 };
        }
        if tag == EntityTag::Boulder {
            shape = ShapeDesc::Circle { radius: 14.0 };
            // Heavy enough that only a charge moves it.
            mass_override = Some(MassData {
                center: Vec2::ZERO,
                mass: 50.0,
                inertia: 1.0,
            });
        }
        if matches!(tag, EntityTag::Decoy | EntityTag::Firefly | EntityTag::Resource) {
            shape = ShapeDesc::Circle { radius: 8.0 };
        }

        Self {
            id,
            name: String::new(),
            kind,
            body_desc,
            fixture,
            shape,
            mass_override,
            body: None,
            draw_scale: 1.0,
            facing: Direction::Right,
            grid_pos: None,
            removed: false,
            dirty: false,
        }
    }

    // -- Builder pattern --

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_shape(mut self, shape: ShapeDesc) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_fixture(mut self, fixture: FixtureDesc) -> Self {
        self.fixture = fixture;
        self
    }

    pub fn with_draw_scale(mut self, scale: f32) -> Self {
        self.draw_scale = scale;
        self
    }

    pub fn tag(&self) -> EntityTag {
        self.kind.tag()
    }

    // -- Lifecycle --

    /// Bind this entity to a live physics body built from its descriptors.
    ///
    /// Returns false (leaving the entity inactive) if no body could be
    /// allocated; the caller may retry or discard the entity.
    pub fn activate(&mut self, physics: &mut PhysicsWorld) -> bool {
        if self.body.is_some() {
            return true;
        }
        match physics.create_body(
            self.id,
            &self.body_desc,
            &self.fixture,
            &self.shape,
            self.mass_override,
        ) {
            Some(body) => {
                self.body = Some(body);
                self.body_desc.active = true;
                true
            }
            None => {
                self.body_desc.active = false;
                log::warn!("entity {:?} '{}': body allocation failed", self.id, self.name);
                false
            }
        }
    }

    /// Copy the live state back into the descriptors, destroy the live body,
    /// and clear the handle. No-op when already inactive.
    pub fn deactivate(&mut self, physics: &mut PhysicsWorld) {
        let Some(body) = self.body.take() else {
            return;
        };
        self.body_desc.position = physics.body_position(&body);
        self.body_desc.velocity = physics.velocity(&body);
        self.body_desc.awake = !physics.is_sleeping(&body);
        if let Some(snapshot) = physics.fixture_snapshot(&body) {
            self.fixture = snapshot;
        }
        physics.remove_body(&body);
        self.body_desc.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.body.is_some()
    }

    /// Per-tick update: rebuild fixtures if dirty, then run the kind's
    /// timers (charge wind-down, stun decay).
    pub fn update(&mut self, physics: &mut PhysicsWorld, _dt: f32) {
        if self.dirty {
            if let Some(body) = self.body.as_mut() {
                physics.rebuild_colliders(body, &self.shape, &self.fixture);
            }
            self.dirty = false;
        }
        match &mut self.kind {
            EntityKind::Player {
                charging,
                charge_ticks,
                ..
            } => {
                if *charging {
                    *charge_ticks = charge_ticks.saturating_sub(1);
                    if *charge_ticks == 0 {
                        *charging = false;
                    }
                }
            }
            EntityKind::Enemy {
                stunned,
                stun_ticks,
                ..
            } => {
                if *stunned {
                    *stun_ticks = stun_ticks.saturating_sub(1);
                    if *stun_ticks == 0 {
                        *stunned = false;
                    }
                }
            }
            _ => {}
        }
    }

    // -- Deferred removal protocol --

    /// Flag (or unflag) this entity for removal. Nothing is destroyed here;
    /// the owning collection deactivates and erases flagged entities on its
    /// next collection pass, never from inside a contact callback.
    pub fn mark_removed(&mut self, removed: bool) {
        self.removed = removed;
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Force a fixture rebuild on the next update.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // -- Live-vs-descriptor delegating accessors --

    pub fn position(&self, physics: &PhysicsWorld) -> Vec2 {
        match &self.body {
            Some(body) => physics.body_position(body),
            None => self.body_desc.position,
        }
    }

    pub fn set_position(&mut self, physics: &mut PhysicsWorld, pos: Vec2) {
        match &self.body {
            Some(body) => physics.set_position(body, pos),
            None => self.body_desc.position = pos,
        }
    }

    pub fn velocity(&self, physics: &PhysicsWorld) -> Vec2 {
        match &self.body {
            Some(body) => physics.velocity(body),
            None => self.body_desc.velocity,
        }
    }

    pub fn set_velocity(&mut self, physics: &mut PhysicsWorld, vel: Vec2) {
        match &self.body {
            Some(body) => physics.set_velocity(body, vel),
            None => self.body_desc.velocity = vel,
        }
    }

    /// Set the density on every fixture of the live body, or on the
    /// descriptor while inactive. The other fixture setters follow the same
    /// rule.
    pub fn set_density(&mut self, physics: &mut PhysicsWorld, density: f32) {
        match &self.body {
            Some(body) => physics.set_density(body, density),
            None => self.fixture.density = density,
        }
    }

    pub fn set_friction(&mut self, physics: &mut PhysicsWorld, friction: f32) {
        match &self.body {
            Some(body) => physics.set_friction(body, friction),
            None => self.fixture.friction = friction,
        }
    }

    pub fn set_restitution(&mut self, physics: &mut PhysicsWorld, restitution: f32) {
        match &self.body {
            Some(body) => physics.set_restitution(body, restitution),
            None => self.fixture.restitution = restitution,
        }
    }

    pub fn set_sensor(&mut self, physics: &mut PhysicsWorld, sensor: bool) {
        match &self.body {
            Some(body) => physics.set_sensor(body, sensor),
            None => self.fixture.sensor = sensor,
        }
    }

    pub fn set_collision_groups(&mut self, physics: &mut PhysicsWorld, memberships: u32, mask: u32) {
        match &self.body {
            Some(body) => physics.set_collision_groups(body, memberships, mask),
            None => {
                self.fixture.memberships = memberships;
                self.fixture.mask = mask;
            }
        }
    }

    /// Live fixture properties while a body exists, descriptor otherwise.
    /// Backs every fixture getter below.
    fn live_fixture(&self, physics: &PhysicsWorld) -> FixtureDesc {
        self.body
            .as_ref()
            .and_then(|body| physics.fixture_snapshot(body))
            .unwrap_or(self.fixture)
    }

    pub fn density(&self, physics: &PhysicsWorld) -> f32 {
        self.live_fixture(physics).density
    }

    pub fn friction(&self, physics: &PhysicsWorld) -> f32 {
        self.live_fixture(physics).friction
    }

    pub fn restitution(&self, physics: &PhysicsWorld) -> f32 {
        self.live_fixture(physics).restitution
    }

    pub fn is_sensor(&self, physics: &PhysicsWorld) -> bool {
        self.live_fixture(physics).sensor
    }

    /// Collision filter as (memberships, mask).
    pub fn collision_groups(&self, physics: &PhysicsWorld) -> (u32, u32) {
        let fixture = self.live_fixture(physics);
        (fixture.memberships, fixture.mask)
    }

    /// Mass data: on the live path the body's actual center of mass, total
    /// mass, and angular inertia; while inactive the pending override.
    /// Shape-derived mass only exists once a body is live, so an inactive
    /// entity without an override reports `None`.
    pub fn mass_data(&self, physics: &PhysicsWorld) -> Option<MassData> {
        match &self.body {
            Some(body) => physics.mass_data(body),
            None => self.mass_override,
        }
    }

    /// Replace the mass override. The descriptor is updated on both paths so
    /// the value survives a deactivate/activate cycle.
    pub fn set_mass_data(&mut self, physics: &mut PhysicsWorld, mass: MassData) {
        self.mass_override = Some(mass);
        if let Some(body) = &self.body {
            physics.set_mass_override(body, Some(mass));
        }
    }

    /// Clear any custom mass override and fall back to shape-derived values.
    pub fn reset_mass_data(&mut self, physics: &mut PhysicsWorld) {
        self.mass_override = None;
        if let Some(body) = &self.body {
            physics.set_mass_override(body, None);
        }
    }

    // -- Player --

    /// Swap the player to a new form: the shape and fixture descriptors are
    /// replaced from the form's behavior record and the entity is marked
    /// dirty so the fixtures rebuild on the same live body next update.
    /// Returns false for non-player entities.
    pub fn transform(&mut self, new_form: PlayerForm) -> bool {
        let EntityKind::Player { form, .. } = &mut self.kind else {
            return false;
        };
        if *form == new_form {
            return true;
        }
        *form = new_form;
        let spec = new_form.spec();
        self.shape = spec.shape;
        self.fixture.density = spec.density;
        self.fixture.memberships = spec.memberships;
        self.fixture.mask = spec.mask;
        self.dirty = true;
        true
    }

    pub fn form(&self) -> Option<PlayerForm> {
        match &self.kind {
            EntityKind::Player { form, .. } => Some(*form),
            _ => None,
        }
    }

    /// Movement speed for the player's current form; zero for other kinds.
    pub fn move_speed(&self) -> f32 {
        match &self.kind {
            EntityKind::Player { form, .. } => form.spec().move_speed,
            _ => 0.0,
        }
    }

    /// Begin a charge. Only the Ram form can charge; returns whether a
    /// charge is now running.
    pub fn begin_charge(&mut self) -> bool {
        match &mut self.kind {
            EntityKind::Player {
                form: PlayerForm::Ram,
                charging,
                charge_ticks,
                ..
            } => {
                if !*charging {
                    *charging = true;
                    *charge_ticks = CHARGE_TICKS;
                }
                true
            }
            _ => false,
        }
    }

    pub fn is_charging(&self) -> bool {
        matches!(&self.kind, EntityKind::Player { charging: true, .. })
    }

    pub fn end_charge(&mut self) {
        if let EntityKind::Player {
            charging,
            charge_ticks,
            ..
        } = &mut self.kind
        {
            *charging = false;
            *charge_ticks = 0;
        }
    }

    // -- Collision flags (player and enemy) --

    pub fn is_collided(&self) -> bool {
        match &self.kind {
            EntityKind::Player { collided, .. } => *collided,
            EntityKind::Enemy { collided, .. } => *collided,
            _ => false,
        }
    }

    pub fn set_collided(&mut self, value: bool) {
        match &mut self.kind {
            EntityKind::Player { collided, .. } => *collided = value,
            EntityKind::Enemy { collided, .. } => *collided = value,
            _ => {}
        }
    }

    // -- Enemy --

    /// Stun this enemy for [`STUN_TICKS`] updates. No-op for other kinds.
    pub fn stun(&mut self) {
        if let EntityKind::Enemy {
            stunned,
            stun_ticks,
            ..
        } = &mut self.kind
        {
            *stunned = true;
            *stun_ticks = STUN_TICKS;
        }
    }

    pub fn is_stunned(&self) -> bool {
        matches!(&self.kind, EntityKind::Enemy { stunned: true, .. })
    }

    // -- Boulder --

    pub fn is_pushed(&self) -> bool {
        matches!(&self.kind, EntityKind::Boulder { pushed: true })
    }

    pub fn set_pushed(&mut self, value: bool) {
        if let EntityKind::Boulder { pushed } = &mut self.kind {
            *pushed = value;
        }
    }
}
