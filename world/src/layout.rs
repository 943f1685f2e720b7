//! ASCII level parsing.

use pellet_chase_core::{CellCoord, CellKind, CellRect, CellRectSize, Grid, PursuerKind};
use thiserror::Error;

/// Level shipped with the game.
///
/// `#` wall, `.` collectible, ` ` open floor, `P` player spawn, `G` regular
/// pursuer, `S` always-chase pursuer.
pub const DEFAULT_LAYOUT: &str = "\
####################
#P.....#G.....#...S#
#.###..#..##..#..#.#
#...#..#..G...#..#.#
#.#.#..###..###..#.#
#.#.#....G......##.#
#.#.####.##.####.#.#
#......G.......#...#
#.####.######..#.###
#....#........S#...#
#.#..#.######..#.###
#.#..#......#..#...#
#.#..#.##.G.#..#.###
#....#..S....#..G.P#
####################";

/// Territories handed to regular pursuers in encounter order.
///
/// Top-right quadrant, middle band, bottom-left and bottom-right of
/// [`DEFAULT_LAYOUT`].
pub const DEFAULT_TERRITORIES: [CellRect; 4] = [
    CellRect::from_origin_and_size(CellCoord::new(10, 1), CellRectSize::new(9, 7)),
    CellRect::from_origin_and_size(CellCoord::new(1, 5), CellRectSize::new(18, 7)),
    CellRect::from_origin_and_size(CellCoord::new(1, 10), CellRectSize::new(9, 4)),
    CellRect::from_origin_and_size(CellCoord::new(10, 10), CellRectSize::new(9, 4)),
];

/// Half-width of the fallback territory box centred on a pursuer's spawn.
const FALLBACK_TERRITORY_RADIUS: u32 = 2;

/// Reasons a level description cannot be turned into a playable layout.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The description contains no rows or no columns.
    #[error("layout is empty")]
    Empty,
    /// A row's length differs from the first row's length.
    #[error("row {row} has {found} cells but the layout is {expected} cells wide")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width established by the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A cell uses a character outside the level alphabet.
    #[error("unknown symbol {symbol:?} at row {row}, column {column}")]
    UnknownSymbol {
        /// Zero-based row of the symbol.
        row: usize,
        /// Zero-based column of the symbol.
        column: usize,
        /// The unrecognised character.
        symbol: char,
    },
    /// No `P` marker was found.
    #[error("layout has no player spawn")]
    MissingPlayerSpawn,
    /// The layout does not fit the grid's coordinate range.
    #[error("layout dimensions exceed the supported grid size")]
    TooLarge,
}

/// Spawn description of a single pursuer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PursuerSpawn {
    /// Cell the pursuer starts on.
    pub cell: CellCoord,
    /// Behavioural variant.
    pub kind: PursuerKind,
    /// Chase territory; `None` for always-chase pursuers.
    pub territory: Option<CellRect>,
}

/// Parsed, immutable level template used to lay out every session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    grid: Grid,
    player_spawn: CellCoord,
    pursuers: Vec<PursuerSpawn>,
    markers: Vec<CellCoord>,
}

impl Layout {
    /// Parses a layout using [`DEFAULT_TERRITORIES`].
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        Self::parse_with_territories(text, &DEFAULT_TERRITORIES)
    }

    /// Parses a layout, assigning `territories` to regular pursuers in
    /// row-major encounter order.
    ///
    /// Pursuers beyond the end of the list receive a 5×5 box centred on their
    /// spawn, clipped to the grid. Extra `P` markers after the first become
    /// collectibles.
    pub fn parse_with_territories(
        text: &str,
        territories: &[CellRect],
    ) -> Result<Self, LayoutError> {
        let rows: Vec<&str> = text.lines().collect();
        let width = rows.first().map_or(0, |row| row.chars().count());
        if rows.is_empty() || width == 0 {
            return Err(LayoutError::Empty);
        }

        for (index, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(LayoutError::RaggedRow {
                    row: index,
                    expected: width,
                    found,
                });
            }
        }

        let columns = u32::try_from(width).map_err(|_| LayoutError::TooLarge)?;
        let row_count = u32::try_from(rows.len()).map_err(|_| LayoutError::TooLarge)?;

        let mut grid = Grid::filled(columns, row_count, CellKind::Open);
        let mut player_spawn = None;
        let mut pursuers = Vec::new();
        let mut markers = Vec::new();
        let mut regular_count = 0;

        for (row_index, row) in rows.iter().enumerate() {
            for (column_index, symbol) in row.chars().enumerate() {
                let cell = CellCoord::new(column_index as u32, row_index as u32);
                match symbol {
                    '#' => grid.set_cell(cell, CellKind::Wall),
                    ' ' => {}
                    '.' => markers.push(cell),
                    'P' => {
                        if player_spawn.is_none() {
                            player_spawn = Some(cell);
                        } else {
                            markers.push(cell);
                        }
                    }
                    'G' => {
                        let territory = territories.get(regular_count).copied().unwrap_or_else(
                            || fallback_territory(cell, columns, row_count),
                        );
                        regular_count += 1;
                        pursuers.push(PursuerSpawn {
                            cell,
                            kind: PursuerKind::Regular,
                            territory: Some(territory),
                        });
                    }
                    'S' => pursuers.push(PursuerSpawn {
                        cell,
                        kind: PursuerKind::AlwaysChase,
                        territory: None,
                    }),
                    other => {
                        return Err(LayoutError::UnknownSymbol {
                            row: row_index,
                            column: column_index,
                            symbol: other,
                        })
                    }
                }
            }
        }

        let player_spawn = player_spawn.ok_or(LayoutError::MissingPlayerSpawn)?;
        if u32::try_from(pursuers.len()).is_err() {
            return Err(LayoutError::TooLarge);
        }

        Ok(Self {
            grid,
            player_spawn,
            pursuers,
            markers,
        })
    }

    /// Terrain of the level.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Canonical player spawn cell.
    #[must_use]
    pub const fn player_spawn(&self) -> CellCoord {
        self.player_spawn
    }

    /// Pursuer spawns in row-major encounter order.
    #[must_use]
    pub fn pursuer_spawns(&self) -> &[PursuerSpawn] {
        &self.pursuers
    }

    /// Cells seeded with a collectible marker, in row-major order.
    #[must_use]
    pub fn markers(&self) -> &[CellCoord] {
        &self.markers
    }
}

impl Default for Layout {
    fn default() -> Self {
        match Self::parse(DEFAULT_LAYOUT) {
            Ok(layout) => layout,
            Err(error) => unreachable!("built-in layout is valid: {error}"),
        }
    }
}

fn fallback_territory(spawn: CellCoord, columns: u32, rows: u32) -> CellRect {
    let column_start = spawn.column().saturating_sub(FALLBACK_TERRITORY_RADIUS);
    let row_start = spawn.row().saturating_sub(FALLBACK_TERRITORY_RADIUS);
    let column_end = spawn
        .column()
        .saturating_add(FALLBACK_TERRITORY_RADIUS + 1)
        .min(columns);
    let row_end = spawn
        .row()
        .saturating_add(FALLBACK_TERRITORY_RADIUS + 1)
        .min(rows);
    CellRect::from_ranges(column_start..column_end, row_start..row_end)
}
