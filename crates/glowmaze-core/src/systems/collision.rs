//! Contact dispatch — turns begin-contact pairs into gameplay state changes.
//!
//! All effects are flag mutations on the involved entities or on the shared
//! [`LevelStatus`]; nothing is destroyed or created here, so it is safe to
//! run while the physics engine is still iterating contacts.

use crate::components::entity::{Entity, EntityTag};

/// Shared per-level outcome flags, consumed by the driver on the next tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LevelStatus {
    /// The player touched a live enemy without a charge running.
    pub failed: bool,
    /// Set from `exit_ready` whenever the player touches the goal.
    pub complete: bool,
    /// Exit precondition: a decoy currently sits on a switch tile.
    pub exit_ready: bool,
}

/// Resolve one contact pair. Symmetric: `resolve(a, b)` and `resolve(b, a)`
/// produce identical flags, because each directed rule is applied in both
/// orders. Pairs not covered by any rule are silent no-ops.
pub fn resolve(a: &mut Entity, b: &mut Entity, status: &mut LevelStatus) {
    apply(a, b, status);
    apply(b, a, status);
}

/// One direction of the rule table. `first` is the acting side of each rule.
fn apply(first: &mut Entity, second: &mut Entity, status: &mut LevelStatus) {
    use EntityTag as T;
    match (first.tag(), second.tag()) {
        (T::Player, T::Enemy) => {
            if first.is_charging() {
                second.stun();
                first.set_collided(true);
            } else if !second.is_stunned() {
                status.failed = true;
            }
        }
        (T::Player, T::Boulder) => {
            if first.is_charging() {
                second.set_pushed(true);
                first.set_collided(true);
            }
        }
        (T::Player, T::Wall | T::EdibleWall | T::Goal) => {
            if second.tag() == T::Goal {
                status.complete = status.exit_ready;
            }
            if first.is_charging() {
                first.set_collided(true);
            }
        }
        (T::Decoy, T::Enemy) => {
            first.mark_removed(true);
        }
        (T::Enemy, T::Enemy) => {
            first.set_collided(true);
        }
        (T::Enemy, T::River | T::Wall | T::EdibleWall | T::Boulder) => {
            first.set_collided(true);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::EntityId;
    use crate::components::entity::{EntityKind, PlayerForm};
    use glam::Vec2;

    fn entity(id: u32, kind: EntityKind) -> Entity {
        Entity::new(EntityId(id), kind, Vec2::ZERO)
    }

    fn player(charging: bool) -> Entity {
        let mut e = entity(1, EntityKind::player(PlayerForm::Ram));
        if charging {
            e.begin_charge();
        }
        e
    }

    #[test]
    fn idle_player_touching_live_enemy_fails_the_level() {
        let mut status = LevelStatus::default();
        let mut p = player(false);
        let mut e = entity(2, EntityKind::enemy());
        resolve(&mut p, &mut e, &mut status);
        assert!(status.failed);
        assert!(!e.is_stunned());
    }

    #[test]
    fn idle_player_touching_stunned_enemy_is_safe() {
        let mut status = LevelStatus::default();
        let mut p = player(false);
        let mut e = entity(2, EntityKind::enemy());
        e.stun();
        resolve(&mut p, &mut e, &mut status);
        assert!(!status.failed);
    }

    #[test]
    fn charging_player_stuns_enemy_without_failing() {
        let mut status = LevelStatus::default();
        let mut p = player(true);
        let mut e = entity(2, EntityKind::enemy());
        resolve(&mut p, &mut e, &mut status);
        assert!(!status.failed);
        assert!(e.is_stunned());
        assert!(p.is_collided());
    }

    #[test]
    fn charging_player_pushes_boulder() {
        let mut status = LevelStatus::default();
        let mut p = player(true);
        let mut b = entity(2, EntityKind::boulder());
        resolve(&mut p, &mut b, &mut status);
        assert!(b.is_pushed());
        assert!(p.is_collided());
    }

    #[test]
    fn idle_player_does_not_move_boulders() {
        let mut status = LevelStatus::default();
        let mut p = player(false);
        let mut b = entity(2, EntityKind::boulder());
        resolve(&mut p, &mut b, &mut status);
        assert!(!b.is_pushed());
    }

    #[test]
    fn goal_outcome_follows_the_exit_precondition() {
        let mut p = player(false);
        let mut goal = entity(2, EntityKind::Goal);

        let mut status = LevelStatus::default();
        resolve(&mut p, &mut goal, &mut status);
        assert!(!status.complete);

        let mut status = LevelStatus {
            exit_ready: true,
            ..LevelStatus::default()
        };
        resolve(&mut goal, &mut p, &mut status);
        assert!(status.complete);
    }

    #[test]
    fn charging_player_flags_collided_on_walls() {
        let mut status = LevelStatus::default();
        let mut p = player(true);
        let mut wall = entity(2, EntityKind::Wall);
        resolve(&mut wall, &mut p, &mut status);
        assert!(p.is_collided());
    }

    #[test]
    fn decoy_is_consumed_by_enemy() {
        let mut status = LevelStatus::default();
        let mut d = entity(1, EntityKind::Decoy);
        let mut e = entity(2, EntityKind::enemy());
        resolve(&mut e, &mut d, &mut status);
        assert!(d.is_removed());
        assert!(!e.is_removed());
    }

    #[test]
    fn enemy_pair_flags_both() {
        let mut status = LevelStatus::default();
        let mut a = entity(1, EntityKind::enemy());
        let mut b = entity(2, EntityKind::enemy());
        resolve(&mut a, &mut b, &mut status);
        assert!(a.is_collided());
        assert!(b.is_collided());
    }

    #[test]
    fn enemy_flags_collided_on_terrain() {
        for kind in [
            EntityKind::River,
            EntityKind::Wall,
            EntityKind::EdibleWall,
            EntityKind::boulder(),
        ] {
            let mut status = LevelStatus::default();
            let mut e = entity(1, EntityKind::enemy());
            let mut t = entity(2, kind);
            resolve(&mut t, &mut e, &mut status);
            assert!(e.is_collided());
        }
    }

    #[test]
    fn uncovered_pairs_are_silent_noops() {
        let mut status = LevelStatus::default();
        let mut p = player(false);
        let mut f = entity(2, EntityKind::Firefly);
        resolve(&mut p, &mut f, &mut status);
        assert_eq!(status, LevelStatus::default());
        assert!(!p.is_collided());
        assert!(!f.is_removed());
    }

    mod symmetry {
        use super::*;
        use crate::components::entity::EntityTag;
        use proptest::prelude::*;

        fn kind_for(tag: EntityTag, charging: bool, stunned: bool) -> EntityKind {
            match tag {
                EntityTag::Wall => EntityKind::Wall,
                EntityTag::EdibleWall => EntityKind::EdibleWall,
                EntityTag::Enemy => {
                    let mut kind = EntityKind::enemy();
                    if stunned {
                        if let EntityKind::Enemy {
                            stunned, stun_ticks, ..
                        } = &mut kind
                        {
                            *stunned = true;
                            *stun_ticks = 10;
                        }
                    }
                    kind
                }
                EntityTag::Goal => EntityKind::Goal,
                EntityTag::Player => {
                    let mut kind = EntityKind::player(PlayerForm::Ram);
                    if charging {
                        if let EntityKind::Player {
                            charging,
                            charge_ticks,
                            ..
                        } = &mut kind
                        {
                            *charging = true;
                            *charge_ticks = 10;
                        }
                    }
                    kind
                }
                EntityTag::Decoy => EntityKind::Decoy,
                EntityTag::Switch => EntityKind::Switch,
                EntityTag::Resource => EntityKind::Resource,
                EntityTag::River => EntityKind::River,
                EntityTag::Boulder => EntityKind::boulder(),
                EntityTag::Firefly => EntityKind::Firefly,
            }
        }

        fn snapshot(e: &Entity) -> (EntityKind, bool) {
            (e.kind.clone(), e.is_removed())
        }

        proptest! {
            #[test]
            fn resolve_is_argument_order_independent(
                ti in 0usize..EntityTag::ALL.len(),
                tj in 0usize..EntityTag::ALL.len(),
                charging: bool,
                stunned: bool,
                exit_ready: bool,
            ) {
                let ka = kind_for(EntityTag::ALL[ti], charging, stunned);
                let kb = kind_for(EntityTag::ALL[tj], charging, stunned);

                let mut a1 = entity(1, ka.clone());
                let mut b1 = entity(2, kb.clone());
                let mut s1 = LevelStatus { exit_ready, ..LevelStatus::default() };
                resolve(&mut a1, &mut b1, &mut s1);

                let mut a2 = entity(1, ka);
                let mut b2 = entity(2, kb);
                let mut s2 = LevelStatus { exit_ready, ..LevelStatus::default() };
                resolve(&mut b2, &mut a2, &mut s2);

                prop_assert_eq!(s1, s2);
                prop_assert_eq!(snapshot(&a1), snapshot(&a2));
                prop_assert_eq!(snapshot(&b1), snapshot(&b2));
            }
        }
    }
}
