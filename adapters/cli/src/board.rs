//! ASCII snapshot of a running session.

use std::fmt::Write as _;

use pellet_chase_core::{CellCoord, PursuerKind};
use pellet_chase_world::{query, World};

/// Renders the board one text row per grid row.
///
/// Actors take precedence over projectiles, which take precedence over
/// markers.
pub(crate) fn render(world: &World) -> String {
    let grid = query::grid(world);
    let player = query::player(world);
    let pursuers = query::pursuer_view(world);
    let projectiles = query::projectile_view(world);

    let symbol_at = |cell: CellCoord| -> char {
        if !grid.is_passable(cell) {
            return '#';
        }
        if player.cell == cell {
            return 'P';
        }
        if let Some(pursuer) = pursuers
            .iter()
            .filter(|pursuer| pursuer.cell == cell)
            .max_by_key(|pursuer| pursuer.alive)
        {
            return match (pursuer.alive, pursuer.kind) {
                (false, _) => 'x',
                (true, PursuerKind::Regular) => 'G',
                (true, PursuerKind::AlwaysChase) => 'S',
            };
        }
        if projectiles
            .iter()
            .any(|projectile| projectile.active && projectile.cell == cell)
        {
            return '*';
        }
        if query::has_marker(world, cell) {
            return '.';
        }
        ' '
    };

    let mut board = String::new();
    for row in 0..grid.rows() {
        for column in 0..grid.columns() {
            board.push(symbol_at(CellCoord::new(column, row)));
        }
        board.push('\n');
    }
    let _ = write!(
        board,
        "score {}  lives {}  phase {:?}",
        query::score(world),
        query::lives(world),
        query::phase(world)
    );
    board
}

#[cfg(test)]
mod tests {
    use super::*;
    use pellet_chase_core::{Command, Difficulty};
    use pellet_chase_world::{apply, Config, Layout};

    #[test]
    fn renders_a_fresh_session() {
        let layout = Layout::parse("#####\n#P.S#\n#####").expect("valid layout");
        let mut world = World::new(layout, Config::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StartGame {
                difficulty: Difficulty::Easy,
            },
            &mut events,
        );

        assert_eq!(
            render(&world),
            "#####\n#P.S#\n#####\nscore 0  lives 5  phase Playing"
        );
    }
}
