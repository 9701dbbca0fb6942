pub mod api;
pub mod components;
pub mod core;
pub mod input;
pub mod level;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::game::{SimConfig, SimContext};
pub use api::types::{EntityId, GameEvent};
pub use components::entity::{Entity, EntityKind, EntityTag, FormSpec, PlayerForm};
pub use components::shape::ShapeDesc;
pub use crate::core::grid::{Direction, SpatialGrid};
pub use crate::core::physics::{
    BodyDesc, BodyKind, CollisionPair, FixtureDesc, MassData, PhysicsBody, PhysicsWorld,
};
pub use crate::core::scene::Scene;
pub use crate::core::time::{FixedTimestep, TickCounter};
pub use input::queue::{Intent, IntentQueue};
pub use level::{EnemyDesc, LevelDesc};
pub use systems::ai::{AiController, AiState, Axis, TurnRule};
pub use systems::collision::{resolve, LevelStatus};
pub use systems::debug::{collect_outlines, DebugOutline};
