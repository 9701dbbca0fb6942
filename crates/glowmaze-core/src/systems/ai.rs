//! Enemy patrol AI — a waypoint-following controller with a small FSM.
//!
//! Movement is direct position integration: the controller computes the next
//! position and the driver writes it through the entity, bypassing forces.

use glam::Vec2;

use crate::api::types::EntityId;
use crate::core::grid::Direction;

/// Tight arrival tolerance: within this distance the current waypoint counts
/// as reached. Larger than one tick of base speed so approach distance
/// decreases strictly until arrival.
pub const EPS_ARRIVE: f32 = 2.0;
/// Loose corner-cut tolerance against the next waypoints.
pub const EPS_CORNER: f32 = 12.0;
/// World units per tick at normal patrol speed.
pub const BASE_SPEED: f32 = 1.5;
/// World units per tick after cutting a corner.
pub const BOOST_SPEED: f32 = 2.75;
/// The FSM re-evaluates every this-many ticks, not every tick.
pub const REPLAN_INTERVAL: u64 = 10;

/// Declared for the Chase transition; no transition rule consumes it yet.
pub const CHASE_DIST: f32 = 256.0;
/// Declared for the Attack transition; no transition rule consumes it yet.
pub const ATTACK_DIST: f32 = 96.0;

/// Coarse behavior states. Only `Spawn -> Wander` ever fires; `Chase` and
/// `Attack` are extension points with no transition rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiState {
    Spawn,
    Wander,
    Chase,
    Attack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Data-driven facing trigger: when the enemy's position crosses `boundary`
/// on `axis`, its facing becomes `facing`. One uniform loop consumes these
/// for every enemy; there is no per-enemy special casing.
#[derive(Debug, Clone, Copy)]
pub struct TurnRule {
    pub axis: Axis,
    pub boundary: f32,
    /// Trigger when the coordinate is beyond (greater than) the boundary;
    /// otherwise when it is below.
    pub beyond: bool,
    pub facing: Direction,
}

impl TurnRule {
    fn triggered(&self, pos: Vec2) -> bool {
        let coord = match self.axis {
            Axis::X => pos.x,
            Axis::Y => pos.y,
        };
        if self.beyond {
            coord > self.boundary
        } else {
            coord < self.boundary
        }
    }
}

/// One controller per enemy. Owns the cyclic waypoint list and the cursor
/// into it; the enemy entity itself holds no path state.
pub struct AiController {
    pub enemy: EntityId,
    waypoints: Vec<Vec2>,
    index: usize,
    state: AiState,
    speed: f32,
    turn_rules: Vec<TurnRule>,
    pub facing: Direction,
}

impl AiController {
    /// The waypoint list is fixed for the controller's lifetime and must be
    /// non-empty.
    pub fn new(enemy: EntityId, waypoints: Vec<Vec2>) -> Self {
        assert!(!waypoints.is_empty(), "waypoint path must be non-empty");
        Self {
            enemy,
            waypoints,
            index: 0,
            state: AiState::Spawn,
            speed: BASE_SPEED,
            turn_rules: Vec::new(),
            facing: Direction::Right,
        }
    }

    pub fn with_turn_rules(mut self, rules: Vec<TurnRule>) -> Self {
        self.turn_rules = rules;
        self
    }

    pub fn state(&self) -> AiState {
        self.state
    }

    pub fn target_index(&self) -> usize {
        self.index
    }

    pub fn current_target(&self) -> Vec2 {
        self.waypoints[self.index]
    }

    /// Advance one simulation tick and return the enemy's next position.
    ///
    /// A stunned enemy skips all movement (including waypoint advancement)
    /// for the tick; the periodic FSM re-evaluation still runs.
    pub fn step(&mut self, tick: u64, pos: Vec2, stunned: bool) -> Vec2 {
        if tick % REPLAN_INTERVAL == 0 {
            self.reevaluate();
        }
        if stunned {
            return pos;
        }

        let n = self.waypoints.len();
        if pos.distance(self.waypoints[self.index]) < EPS_ARRIVE {
            self.index = (self.index + 1) % n;
            self.speed = BASE_SPEED;
        } else if pos.distance(self.waypoints[(self.index + 1) % n]) < EPS_CORNER {
            // Already close to the waypoint after the current one: cut the
            // corner and hurry to make up the skipped leg.
            self.index = (self.index + 1) % n;
            self.speed = BOOST_SPEED;
        } else if pos.distance(self.waypoints[(self.index + 2) % n]) < EPS_CORNER {
            self.index = (self.index + 2) % n;
            self.speed = BOOST_SPEED;
        }

        let target = self.waypoints[self.index];
        pos + (target - pos).normalize_or_zero() * self.speed
    }

    /// Apply the facing triggers for the enemy's new position.
    pub fn apply_turn_rules(&mut self, pos: Vec2) {
        for rule in &self.turn_rules {
            if rule.triggered(pos) {
                self.facing = rule.facing;
            }
        }
    }

    /// Coarse state transition, run every [`REPLAN_INTERVAL`] ticks. Only
    /// `Spawn -> Wander` is unconditional; the remaining states have no
    /// transition rules and stay where they are.
    fn reevaluate(&mut self) {
        if self.state == AiState::Spawn {
            self.state = AiState::Wander;
        }
    }
}
