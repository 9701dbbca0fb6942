//! Level descriptor — the JSON interface the level-description layer feeds
//! the simulation. The core spawns from these records; authoring and file
//! I/O belong to the host.

use serde::{Deserialize, Serialize};

use crate::core::grid::Direction;
use crate::systems::ai::{Axis, TurnRule};

/// A complete level: grid dimensions, static geometry by cell, the goal and
/// player cells, and the enemy patrols.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDesc {
    /// Human-readable name, used for logging only.
    pub name: String,
    #[serde(default = "default_grid_width")]
    pub grid_width: u32,
    #[serde(default = "default_grid_height")]
    pub grid_height: u32,
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    #[serde(default)]
    pub walls: Vec<[i32; 2]>,
    #[serde(default)]
    pub edible_walls: Vec<[i32; 2]>,
    #[serde(default)]
    pub rivers: Vec<[i32; 2]>,
    #[serde(default)]
    pub boulders: Vec<[i32; 2]>,
    #[serde(default)]
    pub switches: Vec<[i32; 2]>,
    #[serde(default)]
    pub resources: Vec<[i32; 2]>,
    #[serde(default)]
    pub fireflies: Vec<[i32; 2]>,
    pub goal: [i32; 2],
    pub player: [i32; 2],
    #[serde(default)]
    pub enemies: Vec<EnemyDesc>,
}

/// One enemy: spawn cell, cyclic patrol path, and facing triggers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyDesc {
    pub spawn: [i32; 2],
    pub waypoints: Vec<[i32; 2]>,
    #[serde(default)]
    pub turn_rules: Vec<TurnRuleDesc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TurnRuleDesc {
    pub axis: AxisDesc,
    pub boundary: f32,
    #[serde(default)]
    pub beyond: bool,
    pub facing: FacingDesc,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisDesc {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingDesc {
    Up,
    Down,
    Left,
    Right,
}

impl From<AxisDesc> for Axis {
    fn from(value: AxisDesc) -> Self {
        match value {
            AxisDesc::X => Axis::X,
            AxisDesc::Y => Axis::Y,
        }
    }
}

impl From<FacingDesc> for Direction {
    fn from(value: FacingDesc) -> Self {
        match value {
            FacingDesc::Up => Direction::Up,
            FacingDesc::Down => Direction::Down,
            FacingDesc::Left => Direction::Left,
            FacingDesc::Right => Direction::Right,
        }
    }
}

impl From<TurnRuleDesc> for TurnRule {
    fn from(value: TurnRuleDesc) -> Self {
        TurnRule {
            axis: value.axis.into(),
            boundary: value.boundary,
            beyond: value.beyond,
            facing: value.facing.into(),
        }
    }
}

impl LevelDesc {
    /// Parse a level from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn default_grid_width() -> u32 {
    32
}

fn default_grid_height() -> u32 {
    18
}

fn default_tile_size() -> f32 {
    32.0
}
