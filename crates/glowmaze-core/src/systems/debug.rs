//! Debug wireframes — outline extraction for an external debug-draw layer.
//!
//! The core never draws; it hands back polyline loops and the host decides
//! what to do with them. Simulation correctness never depends on this module.

use glam::Vec2;

use crate::api::types::EntityId;
use crate::core::physics::PhysicsWorld;
use crate::core::scene::Scene;

/// A closed outline for one entity's shape at its current position.
#[derive(Debug, Clone)]
pub struct DebugOutline {
    pub entity: EntityId,
    pub points: Vec<Vec2>,
}

/// Collect wireframe outlines for every active entity in the scene.
/// Inactive entities (no live body) are skipped.
pub fn collect_outlines(scene: &Scene, physics: &PhysicsWorld) -> Vec<DebugOutline> {
    scene
        .iter()
        .filter(|e| e.is_active())
        .map(|e| DebugOutline {
            entity: e.id,
            points: e.shape.outline(e.position(physics)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::entity::EntityKind;

    #[test]
    fn only_active_entities_get_outlines() {
        let mut physics = PhysicsWorld::new(Vec2::ZERO);
        let mut scene = Scene::new();

        let mut active = crate::components::entity::Entity::new(
            EntityId(1),
            EntityKind::Wall,
            Vec2::new(16.0, 16.0),
        );
        assert!(active.activate(&mut physics));
        scene.spawn(active);
        scene.spawn(crate::components::entity::Entity::new(
            EntityId(2),
            EntityKind::Wall,
            Vec2::ZERO,
        ));

        let outlines = collect_outlines(&scene, &physics);
        assert_eq!(outlines.len(), 1);
        assert_eq!(outlines[0].entity, EntityId(1));
        assert!(!outlines[0].points.is_empty());
    }
}
