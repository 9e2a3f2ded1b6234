//! Grid geometry and the conversion between grid cells and external units.

use crate::game::Position;

/// A cell addressed by grid index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub column: usize,
    pub row: usize,
}

impl GridCell {
    pub fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }
}

/// Fixed dimensions of the board plus the size of one cell in external units.
///
/// Everything inside the adaptive engine is stored grid-indexed; positions
/// crossing the engine boundary are multiples of `cell_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    width: usize,
    height: usize,
    cell_size: i32,
}

impl GridSpec {
    /// Zero dimensions and a zero cell size are bumped to 1.
    pub fn new(width: usize, height: usize, cell_size: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            cell_size: i32::try_from(cell_size.max(1)).unwrap_or(i32::MAX),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_size(&self) -> i32 {
        self.cell_size
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        cell.column < self.width && cell.row < self.height
    }

    /// Row-major buffer index, `None` when out of bounds
    pub fn index_of(&self, cell: GridCell) -> Option<usize> {
        self.contains(cell).then(|| cell.row * self.width + cell.column)
    }

    /// Inverse of [`GridSpec::index_of`]
    pub fn cell_at(&self, index: usize) -> GridCell {
        GridCell::new(index % self.width, index / self.width)
    }

    pub fn to_external(&self, cell: GridCell) -> Position {
        Position::new(
            cell.column as i32 * self.cell_size,
            cell.row as i32 * self.cell_size,
        )
    }

    /// Map an external position onto its grid cell, `None` when outside the board
    pub fn from_external(&self, position: Position) -> Option<GridCell> {
        if position.x < 0 || position.y < 0 {
            return None;
        }
        let cell = GridCell::new(
            (position.x / self.cell_size) as usize,
            (position.y / self.cell_size) as usize,
        );
        self.contains(cell).then_some(cell)
    }

    /// The last-resort placement cell
    pub fn origin(&self) -> Position {
        self.to_external(GridCell::new(0, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_round_trip() {
        let spec = GridSpec::new(30, 20, 20);
        let cell = GridCell::new(7, 19);
        let external = spec.to_external(cell);
        assert_eq!(external, Position::new(140, 380));
        assert_eq!(spec.from_external(external), Some(cell));
    }

    #[test]
    fn test_from_external_rejects_out_of_bounds() {
        let spec = GridSpec::new(10, 10, 20);
        assert_eq!(spec.from_external(Position::new(-20, 0)), None);
        assert_eq!(spec.from_external(Position::new(200, 0)), None);
        assert_eq!(spec.from_external(Position::new(0, 200)), None);
        assert_eq!(
            spec.from_external(Position::new(199, 199)),
            Some(GridCell::new(9, 9))
        );
    }

    #[test]
    fn test_index_is_row_major() {
        let spec = GridSpec::new(4, 3, 1);
        assert_eq!(spec.index_of(GridCell::new(1, 2)), Some(9));
        assert_eq!(spec.cell_at(9), GridCell::new(1, 2));
        assert_eq!(spec.index_of(GridCell::new(4, 0)), None);
    }

    #[test]
    fn test_degenerate_dimensions_are_bumped() {
        let spec = GridSpec::new(0, 0, 0);
        assert_eq!(spec.cell_count(), 1);
        assert_eq!(spec.cell_size(), 1);
    }
}
