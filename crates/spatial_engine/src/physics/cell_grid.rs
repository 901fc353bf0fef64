//! Uniform grid broad phase
//!
//! Hulls are bucketed by position into fixed-size cells. Candidate pairs for
//! a hull come from its own cell and the eight cells around it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::collision_hull::HullId;
use crate::config::ConfigError;
use crate::foundation::math::Vec2;

/// Cells in a neighbourhood (3x3 block, index 4 is the centre cell)
pub const NEIGHBOURHOOD_SIZE: usize = 9;

/// Grid extent and resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// World position of the grid's minimum corner
    pub origin: Vec2,
    /// Covered width in world units
    pub width: f32,
    /// Covered height in world units
    pub height: f32,
    /// Side length of one square cell
    pub cell_size: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            origin: Vec2::zeros(),
            width: 10000.0,
            height: 10000.0,
            cell_size: 50.0,
        }
    }
}

impl GridConfig {
    /// Check dimensions are finite and positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dimensions = [("width", self.width), ("height", self.height), ("cell_size", self.cell_size)];
        for (name, value) in dimensions {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!("collision grid {name} must be positive, got {value}")));
            }
        }
        if !self.origin.x.is_finite() || !self.origin.y.is_finite() {
            return Err(ConfigError::Invalid("collision grid origin must be finite".to_string()));
        }
        Ok(())
    }
}

/// Grid cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    /// Column, counted from the origin along x
    pub column: usize,
    /// Row, counted from the origin along y
    pub row: usize,
}

/// Spatial bucketing used by the collision manager to find candidates
pub trait BroadPhaseGrid: Send + Sync {
    /// Place or re-place a hull at `position`
    fn place(&mut self, position: Vec2, id: HullId);

    /// Forget a hull
    fn remove(&mut self, id: HullId);

    /// Cell containing `position`; positions off the grid map to a border cell
    fn cell_at(&self, position: Vec2) -> CellRef;

    /// Neighbour `index` (0..9, row-major) of `cell`, `None` past the border
    fn sibling(&self, cell: CellRef, index: usize) -> Option<CellRef>;

    /// Hulls bucketed in `cell`
    fn objects_in(&self, cell: CellRef) -> &[HullId];

    /// Forget every hull
    fn clear(&mut self);

    /// Number of placed hulls
    fn object_count(&self) -> usize;
}

/// Fixed-size uniform grid
#[derive(Debug, Clone)]
pub struct CellGrid {
    config: GridConfig,
    columns: usize,
    rows: usize,
    cells: Vec<Vec<HullId>>,
    locations: HashMap<HullId, usize>,
}

impl CellGrid {
    /// Build a grid from a validated configuration
    pub fn new(config: GridConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn build(config: GridConfig) -> Self {
        let columns = ((config.width / config.cell_size).ceil() as usize).max(1);
        let rows = ((config.height / config.cell_size).ceil() as usize).max(1);
        log::debug!("Collision grid {columns}x{rows} cells of {} units", config.cell_size);

        Self {
            config,
            columns,
            rows,
            cells: vec![Vec::new(); columns * rows],
            locations: HashMap::new(),
        }
    }

    /// Grid configuration
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Number of columns
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    fn slot(&self, cell: CellRef) -> usize {
        cell.row * self.columns + cell.column
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn axis_cell(offset: f32, cell_size: f32, count: usize) -> usize {
        let last = (count - 1) as f32;
        (offset / cell_size).floor().clamp(0.0, last) as usize
    }
}

impl Default for CellGrid {
    fn default() -> Self {
        Self::build(GridConfig::default())
    }
}

impl BroadPhaseGrid for CellGrid {
    fn place(&mut self, position: Vec2, id: HullId) {
        let slot = self.slot(self.cell_at(position));
        if let Some(&previous) = self.locations.get(&id) {
            if previous == slot {
                return;
            }
            self.cells[previous].retain(|&other| other != id);
        }
        self.cells[slot].push(id);
        self.locations.insert(id, slot);
    }

    fn remove(&mut self, id: HullId) {
        if let Some(slot) = self.locations.remove(&id) {
            self.cells[slot].retain(|&other| other != id);
        }
    }

    fn cell_at(&self, position: Vec2) -> CellRef {
        let local = position - self.config.origin;
        CellRef {
            column: Self::axis_cell(local.x, self.config.cell_size, self.columns),
            row: Self::axis_cell(local.y, self.config.cell_size, self.rows),
        }
    }

    fn sibling(&self, cell: CellRef, index: usize) -> Option<CellRef> {
        if index >= NEIGHBOURHOOD_SIZE {
            return None;
        }
        let dx = (index % 3) as isize - 1;
        let dy = (index / 3) as isize - 1;

        let column = cell.column.checked_add_signed(dx).filter(|&c| c < self.columns)?;
        let row = cell.row.checked_add_signed(dy).filter(|&r| r < self.rows)?;
        Some(CellRef { column, row })
    }

    fn objects_in(&self, cell: CellRef) -> &[HullId] {
        if cell.column >= self.columns || cell.row >= self.rows {
            return &[];
        }
        self.cells.get(self.slot(cell)).map_or(&[], Vec::as_slice)
    }

    fn clear(&mut self) {
        self.cells.iter_mut().for_each(Vec::clear);
        self.locations.clear();
    }

    fn object_count(&self) -> usize {
        self.locations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_grid() -> CellGrid {
        CellGrid::new(GridConfig {
            origin: Vec2::zeros(),
            width: 100.0,
            height: 100.0,
            cell_size: 10.0,
        })
        .unwrap()
    }

    #[test]
    fn test_default_dimensions() {
        let grid = CellGrid::default();
        assert_eq!(grid.columns(), 200);
        assert_eq!(grid.rows(), 200);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GridConfig { cell_size: 0.0, ..GridConfig::default() };
        assert!(matches!(CellGrid::new(config), Err(ConfigError::Invalid(_))));

        let config = GridConfig { width: f32::NAN, ..GridConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cell_at_clamps_to_border() {
        let grid = small_grid();
        assert_eq!(grid.cell_at(Vec2::new(25.0, 5.0)), CellRef { column: 2, row: 0 });
        assert_eq!(grid.cell_at(Vec2::new(-30.0, 500.0)), CellRef { column: 0, row: 9 });
    }

    #[test]
    fn test_origin_offsets_cells() {
        let grid = CellGrid::new(GridConfig {
            origin: Vec2::new(-50.0, -50.0),
            width: 100.0,
            height: 100.0,
            cell_size: 10.0,
        })
        .unwrap();
        assert_eq!(grid.cell_at(Vec2::new(0.0, 0.0)), CellRef { column: 5, row: 5 });
    }

    #[test]
    fn test_siblings_row_major_with_centre() {
        let grid = small_grid();
        let cell = CellRef { column: 4, row: 4 };

        assert_eq!(grid.sibling(cell, 0), Some(CellRef { column: 3, row: 3 }));
        assert_eq!(grid.sibling(cell, 4), Some(cell));
        assert_eq!(grid.sibling(cell, 5), Some(CellRef { column: 5, row: 4 }));
        assert_eq!(grid.sibling(cell, 8), Some(CellRef { column: 5, row: 5 }));
        assert_eq!(grid.sibling(cell, 9), None);
    }

    #[test]
    fn test_siblings_absent_past_border() {
        let grid = small_grid();
        let corner = CellRef { column: 0, row: 0 };

        let present = (0..NEIGHBOURHOOD_SIZE).filter(|&i| grid.sibling(corner, i).is_some()).count();
        assert_eq!(present, 4);
        assert_eq!(grid.sibling(CellRef { column: 9, row: 9 }, 8), None);
    }

    #[test]
    fn test_place_moves_between_cells() {
        let mut grid = small_grid();
        grid.place(Vec2::new(5.0, 5.0), 1);
        grid.place(Vec2::new(6.0, 6.0), 1);
        assert_eq!(grid.objects_in(CellRef { column: 0, row: 0 }), &[1]);

        grid.place(Vec2::new(55.0, 5.0), 1);
        assert!(grid.objects_in(CellRef { column: 0, row: 0 }).is_empty());
        assert_eq!(grid.objects_in(CellRef { column: 5, row: 0 }), &[1]);
        assert_eq!(grid.object_count(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut grid = small_grid();
        grid.place(Vec2::new(5.0, 5.0), 1);
        grid.place(Vec2::new(5.0, 5.0), 2);
        grid.remove(1);
        grid.remove(42);
        assert_eq!(grid.objects_in(CellRef { column: 0, row: 0 }), &[2]);

        grid.clear();
        assert_eq!(grid.object_count(), 0);
        assert!(grid.objects_in(CellRef { column: 0, row: 0 }).is_empty());
        assert!(grid.objects_in(CellRef { column: 50, row: 0 }).is_empty());
    }
}
