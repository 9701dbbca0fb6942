/// Unique identifier for an entity in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// A gameplay event surfaced to the host layer (HUD, audio, level select).
/// The core only produces these; consuming them is out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// The player touched a live enemy without a charge running.
    LevelFailed,
    /// The player reached the goal with the exit precondition satisfied.
    LevelComplete,
    /// An enemy was stunned by a charging player.
    EnemyStunned(EntityId),
    /// A decoy was consumed by an enemy.
    DecoyConsumed(EntityId),
    /// A boulder was shoved by a charging player and started its slide.
    BoulderPushed(EntityId),
}
