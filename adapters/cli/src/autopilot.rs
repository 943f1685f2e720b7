//! Scripted player used to drive headless sessions.

use pellet_chase_core::{CellCoord, Command, Direction, Grid, Owner, PursuerView};
use pellet_chase_system_pathfinding::breadth_first;

/// Frames between two player steps.
const MOVE_PERIOD: u64 = 4;
/// Frames the autopilot waits between two shots.
const FIRE_COOLDOWN: u64 = 10;
/// Cells a shot is expected to cover before a target counts as lined up.
const FIRE_RANGE: u32 = 6;

/// Walks toward the nearest marker and shoots pursuers lined up ahead.
#[derive(Debug, Default)]
pub(crate) struct Autopilot {
    last_shot: Option<u64>,
}

impl Autopilot {
    /// Emits the player's intents for `frame`.
    pub(crate) fn decide(
        &mut self,
        frame: u64,
        grid: &Grid,
        player: CellCoord,
        facing: Option<Direction>,
        pursuers: &PursuerView,
        markers: &[CellCoord],
        out: &mut Vec<Command>,
    ) {
        let aim = facing.unwrap_or(Direction::East);
        let cooled_down = self
            .last_shot
            .map_or(true, |last| frame.saturating_sub(last) >= FIRE_COOLDOWN);
        if cooled_down && target_ahead(grid, player, aim, pursuers) {
            self.last_shot = Some(frame);
            out.push(Command::Fire {
                shooter: Owner::Player,
            });
        }

        if frame % MOVE_PERIOD != 0 {
            return;
        }
        if let Some(direction) = step_toward_nearest(grid, player, markers) {
            out.push(Command::MovePlayer { direction });
        }
    }
}

fn target_ahead(grid: &Grid, from: CellCoord, direction: Direction, pursuers: &PursuerView) -> bool {
    let mut cell = from;
    for _ in 0..FIRE_RANGE {
        let Some(next) = grid.step(cell, direction).filter(|next| grid.is_walkable(*next)) else {
            return false;
        };
        cell = next;
        if pursuers
            .iter()
            .any(|pursuer| pursuer.alive && pursuer.cell == cell)
        {
            return true;
        }
    }
    false
}

/// First step of the shortest walk to the closest reachable marker.
///
/// Markers are tried in order of Manhattan distance, nearest first.
fn step_toward_nearest(grid: &Grid, from: CellCoord, markers: &[CellCoord]) -> Option<Direction> {
    let mut candidates: Vec<CellCoord> = markers.to_vec();
    candidates.sort_by_key(|cell| (from.manhattan_distance(*cell), cell.row(), cell.column()));

    candidates.into_iter().find_map(|marker| {
        let path = breadth_first(grid, from, marker);
        path.first()
            .and_then(|next| Direction::between(from, *next))
    })
}
