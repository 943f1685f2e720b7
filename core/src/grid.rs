//! Dense rectangular cell map shared by the world and the search systems.

use crate::{CellCoord, Direction};

/// Kind of terrain stored in a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Impassable cell.
    Wall,
    /// Walkable cell.
    Open,
}

/// Rectangular map of cell kinds stored in row-major order.
///
/// Dimensions are fixed at construction; only the kind of individual cells
/// may change through [`Grid::set_cell`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<CellKind>,
}

impl Grid {
    /// Creates a grid of the given dimensions with every cell set to `kind`.
    #[must_use]
    pub fn filled(columns: u32, rows: u32, kind: CellKind) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![kind; capacity],
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Kind stored at the cell, or `None` outside the grid.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<CellKind> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the cell is open terrain.
    ///
    /// Callers are expected to check bounds first; cells outside the grid
    /// report `false`.
    #[must_use]
    pub fn is_passable(&self, cell: CellCoord) -> bool {
        self.cell(cell) == Some(CellKind::Open)
    }

    /// Reports whether the cell is both inside the grid and open.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.in_bounds(cell) && self.is_passable(cell)
    }

    /// Replaces the kind stored at the cell. Cells outside the grid are ignored.
    pub fn set_cell(&mut self, cell: CellCoord, kind: CellKind) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = kind;
            }
        }
    }

    /// Cell adjacent to `cell` in `direction`, or `None` when it leaves the grid.
    #[must_use]
    pub fn step(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        let (column_offset, row_offset) = direction.offset();
        let column = cell.column().checked_add_signed(column_offset)?;
        let row = cell.row().checked_add_signed(row_offset)?;
        let next = CellCoord::new(column, row);
        self.in_bounds(next).then_some(next)
    }

    /// Walkable neighbors of `cell` in the fixed order up, down, left, right.
    pub fn neighbors4(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.step(cell, direction))
            .filter(move |neighbor| self.is_passable(*neighbor))
    }

    /// Iterator over every cell coordinate in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = CellCoord> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| (0..columns).map(move |column| CellCoord::new(column, row)))
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}
