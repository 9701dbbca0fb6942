use crate::components::entity::PlayerForm;
use crate::core::grid::Direction;

/// Game-level intents the simulation understands. The host translates raw
/// device input into these; the core never reads a keyboard or a global
/// input singleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Move the player in a direction (also sets facing).
    Move(Direction),
    /// Stop the player.
    Halt,
    /// Transform the player to the given form.
    Transform(PlayerForm),
    /// Begin a charge (Ram form only).
    StartCharge,
    /// Drop a decoy on the player's current tile.
    PlaceDecoy,
    /// Eat the edible wall in front of the player (Mole form only).
    Gnaw,
}

/// A queue of intents, drained once per simulation tick.
pub struct IntentQueue {
    intents: Vec<Intent>,
}

impl IntentQueue {
    pub fn new() -> Self {
        Self {
            intents: Vec::with_capacity(8),
        }
    }

    pub fn push(&mut self, intent: Intent) {
        self.intents.push(intent);
    }

    /// Drain all pending intents, clearing the queue.
    pub fn drain(&mut self) -> Vec<Intent> {
        std::mem::take(&mut self.intents)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Intent> {
        self.intents.iter()
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}

impl Default for IntentQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain() {
        let mut q = IntentQueue::new();
        q.push(Intent::Move(Direction::Up));
        q.push(Intent::StartCharge);
        assert_eq!(q.len(), 2);
        let intents = q.drain();
        assert_eq!(intents.len(), 2);
        assert!(q.is_empty());
        assert_eq!(intents[0], Intent::Move(Direction::Up));
    }
}
