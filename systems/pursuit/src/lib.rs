#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pursuit system that decides, once per AI tick, how every pursuer moves and
//! whether it fires.
//!
//! A pursuer chases when the player stands inside its territory (always-chase
//! pursuers ignore territory) and patrols otherwise. Chasing follows the
//! search strategy bound to the active difficulty. All randomness comes from
//! the caller-provided generator so decisions replay exactly for a given seed.

use pellet_chase_core::{
    CellCoord, Command, Difficulty, Direction, Event, Grid, Owner, PursuerKind, PursuerSnapshot,
    PursuerView,
};
use pellet_chase_system_pathfinding::Algorithm;
use rand::{seq::SliceRandom, Rng};
use serde::Deserialize;
use tracing::trace;

/// Probability per difficulty level.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct DifficultyOdds {
    /// Probability used on [`Difficulty::Easy`].
    pub easy: f64,
    /// Probability used on [`Difficulty::Medium`].
    pub medium: f64,
    /// Probability used on [`Difficulty::Hard`].
    pub hard: f64,
}

impl DifficultyOdds {
    /// Probability bound to `difficulty`.
    #[must_use]
    pub const fn for_difficulty(&self, difficulty: Difficulty) -> f64 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}

/// Behavioural constants of the pursuit system.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Largest Manhattan distance to the target at which a chasing pursuer
    /// may fire.
    pub fire_range: u32,
    /// Fire probability of always-chase pursuers, regardless of difficulty.
    pub always_chase_fire: f64,
    /// Fire probability of regular pursuers per difficulty.
    pub fire: DifficultyOdds,
    /// Probability that a patrolling pursuer moves on a given AI tick.
    pub patrol: DifficultyOdds,
}

impl Tuning {
    fn fire_probability(&self, kind: PursuerKind, difficulty: Difficulty) -> f64 {
        match kind {
            PursuerKind::AlwaysChase => self.always_chase_fire,
            PursuerKind::Regular => self.fire.for_difficulty(difficulty),
        }
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            fire_range: 6,
            always_chase_fire: 0.25,
            fire: DifficultyOdds {
                easy: 0.08,
                medium: 0.12,
                hard: 0.20,
            },
            patrol: DifficultyOdds {
                easy: 0.18,
                medium: 0.28,
                hard: 0.38,
            },
        }
    }
}

/// Pure system that reacts to AI ticks and emits pursuer commands.
#[derive(Debug)]
pub struct Pursuit {
    tuning: Tuning,
    difficulty: Difficulty,
}

impl Pursuit {
    /// Creates the system with the provided tuning.
    #[must_use]
    pub fn new(tuning: Tuning) -> Self {
        Self {
            tuning,
            difficulty: Difficulty::default(),
        }
    }

    /// Difficulty the next decisions will use.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Consumes world events and immutable views to emit pursuer commands.
    ///
    /// Decisions are only taken when `events` contains
    /// [`Event::AiTickElapsed`]. Difficulty changes announced in the same
    /// batch take effect before deciding.
    pub fn handle<R>(
        &mut self,
        events: &[Event],
        pursuers: &PursuerView,
        target: CellCoord,
        grid: &Grid,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: Rng + ?Sized,
    {
        let mut ai_tick = false;
        for event in events {
            match event {
                Event::SessionStarted { difficulty, .. }
                | Event::DifficultyChanged { difficulty } => self.difficulty = *difficulty,
                Event::AiTickElapsed => ai_tick = true,
                _ => {}
            }
        }

        if !ai_tick {
            return;
        }

        for pursuer in pursuers.iter().filter(|pursuer| pursuer.alive) {
            if pursuer.is_in_territory(target) {
                self.chase(pursuer, target, grid, rng, out);
            } else {
                self.patrol(pursuer, grid, rng, out);
            }
        }
    }

    fn chase<R>(
        &self,
        pursuer: &PursuerSnapshot,
        target: CellCoord,
        grid: &Grid,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: Rng + ?Sized,
    {
        let algorithm = Algorithm::for_difficulty(self.difficulty);
        let path = algorithm.search(grid, pursuer.cell, target);
        let step = match path.first() {
            Some(next) => Direction::between(pursuer.cell, *next),
            None => approach_directly(grid, pursuer.cell, target),
        };

        let mut cell = pursuer.cell;
        if let Some(direction) = step {
            if let Some(next) = grid.step(cell, direction).filter(|next| grid.is_walkable(*next)) {
                cell = next;
            }
            trace!(
                pursuer = pursuer.id.get(),
                algorithm = algorithm.label(),
                ?direction,
                "chasing"
            );
            out.push(Command::MovePursuer {
                pursuer: pursuer.id,
                direction,
            });
        }

        if cell.manhattan_distance(target) > self.tuning.fire_range {
            return;
        }
        let probability = self.tuning.fire_probability(pursuer.kind, self.difficulty);
        if rng.gen_bool(chance(probability)) {
            trace!(pursuer = pursuer.id.get(), "firing");
            out.push(Command::Fire {
                shooter: Owner::Pursuer(pursuer.id),
            });
        }
    }

    fn patrol<R>(&self, pursuer: &PursuerSnapshot, grid: &Grid, rng: &mut R, out: &mut Vec<Command>)
    where
        R: Rng + ?Sized,
    {
        let probability = self.tuning.patrol.for_difficulty(self.difficulty);
        if !rng.gen_bool(chance(probability)) {
            return;
        }

        let mut directions = Direction::ALL;
        directions.shuffle(rng);

        let walkable = |direction: Direction| {
            grid.step(pursuer.cell, direction)
                .filter(|next| grid.is_walkable(*next))
        };
        let choice = directions
            .iter()
            .copied()
            .find(|direction| {
                walkable(*direction).is_some_and(|next| pursuer.is_in_territory(next))
            })
            .or_else(|| {
                directions
                    .iter()
                    .copied()
                    .find(|direction| walkable(*direction).is_some())
            });

        if let Some(direction) = choice {
            trace!(pursuer = pursuer.id.get(), ?direction, "patrolling");
            out.push(Command::MovePursuer {
                pursuer: pursuer.id,
                direction,
            });
        }
    }
}

impl Default for Pursuit {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}

/// Clamps a configured probability into `gen_bool`'s domain; NaN never fires.
fn chance(probability: f64) -> f64 {
    if probability.is_nan() {
        0.0
    } else {
        probability.clamp(0.0, 1.0)
    }
}

/// Cardinal step toward `target` used when no path exists.
///
/// Prefers the axis with the larger displacement, the row axis on ties, and
/// falls back to the other axis when the preferred step is blocked. Returns
/// `None` when both steps are blocked.
fn approach_directly(grid: &Grid, from: CellCoord, target: CellCoord) -> Option<Direction> {
    let vertical = match target.row().cmp(&from.row()) {
        std::cmp::Ordering::Greater => Some(Direction::South),
        std::cmp::Ordering::Less => Some(Direction::North),
        std::cmp::Ordering::Equal => None,
    };
    let horizontal = match target.column().cmp(&from.column()) {
        std::cmp::Ordering::Greater => Some(Direction::East),
        std::cmp::Ordering::Less => Some(Direction::West),
        std::cmp::Ordering::Equal => None,
    };

    let (primary, secondary) =
        if from.column().abs_diff(target.column()) > from.row().abs_diff(target.row()) {
            (horizontal, vertical)
        } else {
            (vertical, horizontal)
        };

    let open = |direction: Direction| {
        grid.step(from, direction)
            .is_some_and(|next| grid.is_walkable(next))
    };

    [primary, secondary]
        .into_iter()
        .flatten()
        .find(|direction| open(*direction))
}
