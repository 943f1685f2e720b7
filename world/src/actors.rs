use pellet_chase_core::{
    CellCoord, CellRect, Direction, Grid, PlayerSnapshot, PursuerId, PursuerKind, PursuerSnapshot,
};

use crate::layout::PursuerSpawn;

/// Attempts a single-cell step, committing it only when the target is walkable.
///
/// Returns the new cell on success. A blocked step leaves both `cell` and
/// `facing` untouched.
pub(crate) fn move_by(
    grid: &Grid,
    cell: &mut CellCoord,
    facing: &mut Option<Direction>,
    direction: Direction,
) -> Option<CellCoord> {
    let next = grid.step(*cell, direction)?;
    if !grid.is_walkable(next) {
        return None;
    }
    *cell = next;
    *facing = Some(direction);
    Some(next)
}

#[derive(Clone, Debug)]
pub(crate) struct Player {
    pub(crate) cell: CellCoord,
    pub(crate) facing: Option<Direction>,
    pub(crate) alive: bool,
    pub(crate) spawn: CellCoord,
}

impl Player {
    pub(crate) fn at_spawn(spawn: CellCoord) -> Self {
        Self {
            cell: spawn,
            facing: None,
            alive: true,
            spawn,
        }
    }

    pub(crate) fn move_by(&mut self, grid: &Grid, direction: Direction) -> Option<CellCoord> {
        move_by(grid, &mut self.cell, &mut self.facing, direction)
    }

    /// Puts the player back on its spawn cell after losing a life.
    pub(crate) fn return_to_spawn(&mut self) {
        self.cell = self.spawn;
        self.facing = None;
    }

    pub(crate) fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            cell: self.cell,
            facing: self.facing,
            alive: self.alive,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Pursuer {
    pub(crate) id: PursuerId,
    pub(crate) kind: PursuerKind,
    pub(crate) cell: CellCoord,
    pub(crate) facing: Option<Direction>,
    pub(crate) alive: bool,
    pub(crate) territory: Option<CellRect>,
}

impl Pursuer {
    pub(crate) fn from_spawn(id: PursuerId, spawn: &PursuerSpawn) -> Self {
        Self {
            id,
            kind: spawn.kind,
            cell: spawn.cell,
            facing: None,
            alive: true,
            territory: spawn.territory,
        }
    }

    pub(crate) fn move_by(&mut self, grid: &Grid, direction: Direction) -> Option<CellCoord> {
        move_by(grid, &mut self.cell, &mut self.facing, direction)
    }

    pub(crate) fn snapshot(&self) -> PursuerSnapshot {
        PursuerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            facing: self.facing,
            alive: self.alive,
            territory: self.territory,
        }
    }
}
