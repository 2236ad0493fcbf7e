//! # Grid
//!
//! Fixed-size row-major tile index with bounds, border and neighbour queries.

use crate::{DelveError, DelveResult, Position, Terrain, Tile};
use serde::{Deserialize, Serialize};

/// Owns exactly one [`Tile`] per coordinate of a `width` x `height` rectangle.
///
/// Border cells are walls, every interior cell starts as hidden floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Builds a grid with wall borders and a floor interior.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Grid, Terrain};
    ///
    /// let grid = Grid::new(10, 8);
    /// assert_eq!(grid.get(0, 0).unwrap().terrain(), Terrain::Wall);
    /// assert_eq!(grid.get(2, 2).unwrap().terrain(), Terrain::Floor);
    /// assert!(grid.get(10, 0).is_none());
    /// ```
    pub fn new(width: u32, height: u32) -> Self {
        let mut tiles = Vec::with_capacity((width as usize).saturating_mul(height as usize));
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let terrain = if Self::on_border(width, height, x, y) {
                    Terrain::Wall
                } else {
                    Terrain::Floor
                };
                tiles.push(Tile::new(Position::new(x, y), terrain));
            }
        }

        Self {
            width,
            height,
            tiles,
        }
    }

    fn on_border(width: u32, height: u32, x: i32, y: i32) -> bool {
        x == 0 || y == 0 || x == width as i32 - 1 || y == height as i32 - 1
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    /// True iff the coordinate lies on the outer ring of the grid.
    pub fn is_border(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && Self::on_border(self.width, self.height, x, y)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Tile> {
        self.index(x, y).map(|index| &self.tiles[index])
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        self.index(x, y).map(move |index| &mut self.tiles[index])
    }

    pub fn tile(&self, position: Position) -> Option<&Tile> {
        self.get(position.x, position.y)
    }

    pub fn tile_mut(&mut self, position: Position) -> Option<&mut Tile> {
        self.get_mut(position.x, position.y)
    }

    /// Like [`Grid::tile_mut`] but reports out-of-bounds coordinates as an error.
    pub fn require_mut(&mut self, position: Position) -> DelveResult<&mut Tile> {
        self.tile_mut(position)
            .ok_or(DelveError::OutOfBounds { position })
    }

    /// Iterates over all tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut()
    }

    /// In-bounds neighbour coordinates: orthogonal only, or all eight.
    pub fn neighbor_positions(
        &self,
        x: i32,
        y: i32,
        include_diagonals: bool,
    ) -> Vec<Position> {
        let origin = Position::new(x, y);
        let candidates = if include_diagonals {
            origin.adjacent_positions()
        } else {
            origin.cardinal_adjacent_positions()
        };

        candidates
            .into_iter()
            .filter(|pos| self.in_bounds(pos.x, pos.y))
            .collect()
    }

    /// In-bounds neighbour tiles: orthogonal only, or all eight.
    pub fn neighbors(&self, x: i32, y: i32, include_diagonals: bool) -> Vec<&Tile> {
        self.neighbor_positions(x, y, include_diagonals)
            .into_iter()
            .filter_map(|pos| self.tile(pos))
            .collect()
    }

    /// Sprite-variant bitmask from orthogonal wall neighbours.
    ///
    /// left = 1, top = 2, right = 4, bottom = 8. Diagonals never count.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::Grid;
    ///
    /// let grid = Grid::new(5, 5);
    /// // Top-left corner: right and bottom neighbours are walls
    /// assert_eq!(grid.wall_layout(0, 0), 4 + 8);
    /// // Interior tile away from the border has no wall neighbours
    /// assert_eq!(grid.wall_layout(2, 2), 0);
    /// ```
    pub fn wall_layout(&self, x: i32, y: i32) -> u8 {
        let origin = Position::new(x, y);
        self.neighbors(x, y, false)
            .into_iter()
            .filter(|tile| tile.is_wall())
            .map(|tile| match tile.position() - origin {
                Position { x: -1, .. } => 1,
                Position { y: -1, .. } => 2,
                Position { x: 1, .. } => 4,
                _ => 8,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_coordinate_has_one_tile() {
        let grid = Grid::new(7, 4);
        assert_eq!(grid.tiles().count(), 28);
        for y in 0..4 {
            for x in 0..7 {
                let tile = grid.get(x, y).unwrap();
                assert_eq!(tile.position(), Position::new(x, y));
            }
        }
    }

    #[test]
    fn test_border_is_wall() {
        let grid = Grid::new(10, 8);
        for tile in grid.tiles() {
            let border = grid.is_border(tile.x(), tile.y());
            assert_eq!(tile.is_wall(), border, "tile {:?}", tile.position());
        }
    }

    #[test]
    fn test_out_of_bounds_queries() {
        let grid = Grid::new(4, 4);
        assert!(!grid.in_bounds(-1, 0));
        assert!(!grid.in_bounds(0, 4));
        assert!(!grid.is_border(-1, -1));
        assert!(grid.get(4, 0).is_none());
    }

    #[test]
    fn test_neighbors_at_corner() {
        let grid = Grid::new(5, 5);
        assert_eq!(grid.neighbors(0, 0, false).len(), 2);
        assert_eq!(grid.neighbors(0, 0, true).len(), 3);
        assert_eq!(grid.neighbors(2, 2, false).len(), 4);
        assert_eq!(grid.neighbors(2, 2, true).len(), 8);
    }

    #[test]
    fn test_wall_layout_bits() {
        let grid = Grid::new(5, 5);
        // Top edge, not a corner: left, right walls; bottom is floor
        assert_eq!(grid.wall_layout(2, 0), 1 + 4);
        // Left edge: top and bottom walls
        assert_eq!(grid.wall_layout(0, 2), 2 + 8);
        // Bottom-right corner: left and top
        assert_eq!(grid.wall_layout(4, 4), 1 + 2);
        // Interior next to the left wall
        assert_eq!(grid.wall_layout(1, 2), 1);
    }

    #[test]
    fn test_wall_layout_ignores_diagonals() {
        let grid = Grid::new(5, 5);
        // (1,1) touches walls on the left and top only; corner (0,0) is diagonal
        assert_eq!(grid.wall_layout(1, 1), 1 + 2);
    }

    #[test]
    fn test_wall_layout_all_sides() {
        let mut grid = Grid::new(5, 5);
        for pos in [(1, 2), (3, 2), (2, 1), (2, 3)] {
            grid.get_mut(pos.0, pos.1).unwrap().set_terrain(Terrain::Wall);
        }
        assert_eq!(grid.wall_layout(2, 2), 15);
    }
}
