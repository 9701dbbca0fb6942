use crate::api::types::EntityId;
use crate::components::entity::{Entity, EntityTag};

/// Flat-Vec entity storage. A maze level holds a few hundred entities at
/// most, so linear id lookup beats the bookkeeping of anything fancier.
pub struct Scene {
    entities: Vec<Entity>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: Vec::with_capacity(256),
        }
    }

    /// Add an entity to the scene.
    pub fn spawn(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// Remove an entity by id, returning it if found. Callers are expected
    /// to deactivate the returned entity themselves.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let idx = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.swap_remove(idx))
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Mutable access to two distinct entities at once, as the collision
    /// dispatcher needs. Returns `None` when either id is missing or the ids
    /// are equal. References come back in (a, b) order.
    pub fn get_pair_mut(
        &mut self,
        a: EntityId,
        b: EntityId,
    ) -> Option<(&mut Entity, &mut Entity)> {
        if a == b {
            return None;
        }
        let ia = self.entities.iter().position(|e| e.id == a)?;
        let ib = self.entities.iter().position(|e| e.id == b)?;
        let (lo, hi) = if ia < ib { (ia, ib) } else { (ib, ia) };
        let (head, tail) = self.entities.split_at_mut(hi);
        let (first, second) = (&mut head[lo], &mut tail[0]);
        if ia < ib {
            Some((first, second))
        } else {
            Some((second, first))
        }
    }

    /// First entity with the given tag.
    pub fn find_by_tag(&self, tag: EntityTag) -> Option<&Entity> {
        self.entities.iter().find(|e| e.tag() == tag)
    }

    /// Ids of all entities flagged for removal.
    pub fn removed_ids(&self) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|e| e.is_removed())
            .map(|e| e.id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
