use glam::Vec2;

use crate::api::types::EntityId;
use crate::components::entity::Entity;

/// One of the four cardinal directions, used for facing and for discrete
/// "what is next to the avatar" grid queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Cell offset of one step in this direction (grid is y-up).
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Unit vector of this direction in world space.
    pub fn unit(self) -> Vec2 {
        let (dx, dy) = self.offset();
        Vec2::new(dx as f32, dy as f32)
    }
}

/// Snap a world position to its grid cell.
///
/// This is the single source of truth for world-to-cell rounding: it floors,
/// so any position inside tile (x, y) maps to (x, y), including negative
/// coordinates. Every call site must go through this function rather than
/// re-deriving the rounding locally.
pub fn cell_of(pos: Vec2, tile_size: f32) -> (i32, i32) {
    (
        (pos.x / tile_size).floor() as i32,
        (pos.y / tile_size).floor() as i32,
    )
}

/// World position of the center of a grid cell. Inverse of [`cell_of`] up to
/// the half-tile offset.
pub fn cell_center(cell: (i32, i32), tile_size: f32) -> Vec2 {
    Vec2::new(
        (cell.0 as f32 + 0.5) * tile_size,
        (cell.1 as f32 + 0.5) * tile_size,
    )
}

/// Fixed-size spatial index: one cell per tile, each holding a non-owning
/// reference to at most one entity.
///
/// Cells are stored row-major (`index = y * width + x`). A cell's occupant
/// must be cleared before a different occupant is assigned, unless the caller
/// intends to overwrite it.
pub struct SpatialGrid {
    width: u32,
    height: u32,
    tile_size: f32,
    cells: Vec<Option<EntityId>>,
}

impl SpatialGrid {
    pub fn new(width: u32, height: u32, tile_size: f32) -> Self {
        Self {
            width,
            height,
            tile_size,
            cells: vec![None; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some((y as u32 * self.width + x as u32) as usize)
    }

    /// Occupant of cell (x, y). Out-of-range coordinates are a normal part
    /// of gameplay (looking outward from the grid's edge) and return `None`
    /// rather than erroring.
    pub fn at(&self, x: i32, y: i32) -> Option<EntityId> {
        self.index(x, y).and_then(|i| self.cells[i])
    }

    /// Place an entity into cell (x, y) and record the cell on the entity so
    /// the two stay consistent.
    pub fn place(&mut self, entity: &mut Entity, x: i32, y: i32) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = Some(entity.id);
            entity.grid_pos = Some((x, y));
        }
    }

    /// Empty cell (x, y).
    pub fn clear(&mut self, x: i32, y: i32) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = None;
        }
    }

    /// Occupant of the cell adjacent to `origin` in `dir`, or `None` when
    /// `origin` is already at that boundary edge.
    pub fn neighbor(&self, origin: (i32, i32), dir: Direction) -> Option<EntityId> {
        let (dx, dy) = dir.offset();
        self.at(origin.0 + dx, origin.1 + dy)
    }

    /// Snap a world position to a cell using this grid's tile size.
    pub fn cell_of(&self, pos: Vec2) -> (i32, i32) {
        cell_of(pos, self.tile_size)
    }

    /// World-space center of a cell using this grid's tile size.
    pub fn cell_center(&self, cell: (i32, i32)) -> Vec2 {
        cell_center(cell, self.tile_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::entity::EntityKind;

    fn wall(id: u32) -> Entity {
        Entity::new(EntityId(id), EntityKind::Wall, Vec2::ZERO)
    }

    #[test]
    fn place_at_clear_round_trip() {
        let mut grid = SpatialGrid::new(8, 8, 32.0);
        let mut e = wall(1);
        grid.place(&mut e, 3, 4);
        assert_eq!(grid.at(3, 4), Some(EntityId(1)));
        assert_eq!(e.grid_pos, Some((3, 4)));
        grid.clear(3, 4);
        assert_eq!(grid.at(3, 4), None);
    }

    #[test]
    fn out_of_bounds_lookup_is_none() {
        let grid = SpatialGrid::new(4, 4, 32.0);
        assert_eq!(grid.at(-1, 0), None);
        assert_eq!(grid.at(0, -1), None);
        assert_eq!(grid.at(4, 0), None);
        assert_eq!(grid.at(0, 4), None);
    }

    #[test]
    fn neighbor_queries_respect_edges() {
        let mut grid = SpatialGrid::new(4, 4, 32.0);
        let mut e = wall(7);
        grid.place(&mut e, 1, 0);
        assert_eq!(grid.neighbor((0, 0), Direction::Right), Some(EntityId(7)));
        assert_eq!(grid.neighbor((0, 0), Direction::Left), None);
        assert_eq!(grid.neighbor((0, 0), Direction::Down), None);
        assert_eq!(grid.neighbor((3, 3), Direction::Up), None);
    }

    #[test]
    fn cell_of_floors_including_negatives() {
        assert_eq!(cell_of(Vec2::new(0.0, 0.0), 32.0), (0, 0));
        assert_eq!(cell_of(Vec2::new(31.9, 31.9), 32.0), (0, 0));
        assert_eq!(cell_of(Vec2::new(32.0, 0.0), 32.0), (1, 0));
        assert_eq!(cell_of(Vec2::new(-0.1, -0.1), 32.0), (-1, -1));
        assert_eq!(cell_of(Vec2::new(-32.0, 5.0), 32.0), (-1, 0));
    }

    #[test]
    fn cell_center_maps_back_to_same_cell() {
        for cell in [(0, 0), (3, 7), (15, 1)] {
            let center = cell_center(cell, 32.0);
            assert_eq!(cell_of(center, 32.0), cell);
        }
    }

    #[test]
    fn exclusivity_via_clear_then_place() {
        let mut grid = SpatialGrid::new(4, 4, 32.0);
        let mut a = wall(1);
        let mut b = wall(2);
        grid.place(&mut a, 2, 2);
        grid.clear(2, 2);
        grid.place(&mut b, 2, 2);
        assert_eq!(grid.at(2, 2), Some(EntityId(2)));
    }
}
