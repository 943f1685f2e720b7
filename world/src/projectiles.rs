use pellet_chase_core::{CellCoord, Direction, Grid, Owner, ProjectileId, ProjectileSnapshot};

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) owner: Owner,
    pub(crate) cell: CellCoord,
    pub(crate) direction: Direction,
    pub(crate) active: bool,
}

impl Projectile {
    pub(crate) const fn new(
        id: ProjectileId,
        owner: Owner,
        cell: CellCoord,
        direction: Direction,
    ) -> Self {
        Self {
            id,
            owner,
            cell,
            direction,
            active: true,
        }
    }

    /// Advances one cell along the direction of travel.
    ///
    /// Returns `true` when this step deactivated the projectile because the
    /// next cell is a wall or lies outside the grid. Inactive projectiles do
    /// not move.
    pub(crate) fn step(&mut self, grid: &Grid) -> bool {
        if !self.active {
            return false;
        }
        match grid.step(self.cell, self.direction) {
            Some(next) if grid.is_passable(next) => {
                self.cell = next;
                false
            }
            _ => {
                self.active = false;
                true
            }
        }
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            owner: self.owner,
            cell: self.cell,
            direction: self.direction,
            active: self.active,
        }
    }
}
