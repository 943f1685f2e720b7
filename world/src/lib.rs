#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Pellet Chase.
//!
//! The world owns the grid, the actors, the projectiles and the session
//! bookkeeping. Every mutation flows through [`apply`], which records the
//! observable consequences as [`Event`] values.

mod actors;
mod layout;
mod projectiles;
mod respawn;

use std::{collections::BTreeMap, time::Duration};

use pellet_chase_core::{
    CellCoord, Command, Difficulty, Direction, Event, Grid, Outcome, Owner, Phase, ProjectileId,
    PursuerId, PursuerKind, RejectionReason,
};
use serde::Deserialize;
use tracing::{debug, info, trace};

use actors::{Player, Pursuer};
use projectiles::Projectile;
use respawn::RespawnQueue;

pub use layout::{Layout, LayoutError, PursuerSpawn, DEFAULT_LAYOUT, DEFAULT_TERRITORIES};

/// Tunable session rules.
///
/// Every field falls back to its default when omitted from a configuration
/// file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minimum simulated time between two AI ticks, in milliseconds.
    pub ai_tick_interval_ms: u64,
    /// Delay before a destroyed regular pursuer returns, in milliseconds.
    pub regular_respawn_ms: u64,
    /// Delay before a destroyed always-chase pursuer returns, in milliseconds.
    pub always_chase_respawn_ms: u64,
    /// Lives granted at the start of every session.
    pub starting_lives: u32,
    /// Score awarded per collected marker.
    pub marker_value: u32,
    /// Score awarded per destroyed pursuer.
    pub kill_bonus: u32,
}

impl Config {
    /// Minimum simulated time between two AI ticks.
    #[must_use]
    pub const fn ai_tick_interval(&self) -> Duration {
        Duration::from_millis(self.ai_tick_interval_ms)
    }

    /// Respawn delay applied to a destroyed pursuer of the given kind.
    #[must_use]
    pub const fn respawn_delay(&self, kind: PursuerKind) -> Duration {
        match kind {
            PursuerKind::Regular => Duration::from_millis(self.regular_respawn_ms),
            PursuerKind::AlwaysChase => Duration::from_millis(self.always_chase_respawn_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ai_tick_interval_ms: 200,
            regular_respawn_ms: 4_000,
            always_chase_respawn_ms: 3_000,
            starting_lives: 5,
            marker_value: 10,
            kill_bonus: 100,
        }
    }
}

/// Represents the authoritative Pellet Chase world state.
#[derive(Debug)]
pub struct World {
    layout: Layout,
    config: Config,
    grid: Grid,
    player: Player,
    pursuers: Vec<Pursuer>,
    projectiles: Vec<Projectile>,
    markers: BTreeMap<CellCoord, bool>,
    score: u32,
    lives: u32,
    difficulty: Difficulty,
    phase: Phase,
    outcome: Option<Outcome>,
    epoch: u64,
    clock: Duration,
    last_ai_tick: Option<Duration>,
    respawns: RespawnQueue,
    next_projectile: u32,
}

impl World {
    /// Creates a world in the menu phase laid out from `layout`.
    #[must_use]
    pub fn new(layout: Layout, config: Config) -> Self {
        let grid = layout.grid().clone();
        let player = Player::at_spawn(layout.player_spawn());
        let lives = config.starting_lives;
        let mut world = Self {
            layout,
            config,
            grid,
            player,
            pursuers: Vec::new(),
            projectiles: Vec::new(),
            markers: BTreeMap::new(),
            score: 0,
            lives,
            difficulty: Difficulty::default(),
            phase: Phase::Menu,
            outcome: None,
            epoch: 0,
            clock: Duration::ZERO,
            last_ai_tick: None,
            respawns: RespawnQueue::default(),
            next_projectile: 0,
        };
        world.lay_out();
        world
    }

    /// Restores every per-session field from the layout template.
    fn lay_out(&mut self) {
        self.grid = self.layout.grid().clone();
        self.player = Player::at_spawn(self.layout.player_spawn());
        self.pursuers = self
            .layout
            .pursuer_spawns()
            .iter()
            .zip(0..)
            .map(|(spawn, index)| Pursuer::from_spawn(PursuerId::new(index), spawn))
            .collect();
        self.projectiles.clear();
        self.markers = self
            .layout
            .markers()
            .iter()
            .map(|cell| (*cell, true))
            .collect();
        self.score = 0;
        self.lives = self.config.starting_lives;
        self.outcome = None;
        self.clock = Duration::ZERO;
        self.last_ai_tick = None;
        self.next_projectile = 0;
    }

    fn start_session(&mut self, out_events: &mut Vec<Event>) {
        self.epoch = self.epoch.wrapping_add(1);
        self.lay_out();
        info!(
            epoch = self.epoch,
            difficulty = ?self.difficulty,
            markers = self.markers.len(),
            pursuers = self.pursuers.len(),
            "session started"
        );
        out_events.push(Event::SessionStarted {
            epoch: self.epoch,
            difficulty: self.difficulty,
        });
        self.transition(Phase::Playing, out_events);
    }

    fn transition(&mut self, to: Phase, out_events: &mut Vec<Event>) {
        let from = self.phase;
        self.phase = to;
        debug!(?from, ?to, "phase changed");
        out_events.push(Event::PhaseChanged { from, to });
    }

    fn end_session(&mut self, outcome: Outcome, out_events: &mut Vec<Event>) {
        self.outcome = Some(outcome);
        info!(?outcome, score = self.score, "session ended");
        out_events.push(Event::SessionEnded {
            outcome,
            score: self.score,
        });
        self.transition(Phase::Over, out_events);
    }

    fn reject_phase(&self, out_events: &mut Vec<Event>) {
        out_events.push(Event::CommandRejected {
            reason: RejectionReason::InvalidPhase { phase: self.phase },
        });
    }

    fn pursuer_index(&self, pursuer: PursuerId) -> Option<usize> {
        self.pursuers
            .binary_search_by_key(&pursuer, |candidate| candidate.id)
            .ok()
    }

    /// Looks up a living pursuer, reporting why it cannot act otherwise.
    fn living_pursuer(&self, pursuer: PursuerId) -> Result<usize, RejectionReason> {
        let index = self
            .pursuer_index(pursuer)
            .ok_or(RejectionReason::MissingPursuer { pursuer })?;
        if self.pursuers[index].alive {
            Ok(index)
        } else {
            Err(RejectionReason::InactivePursuer { pursuer })
        }
    }

    fn advance_clock(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.clock = self.clock.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        for entry in self.respawns.drain_due(self.clock) {
            if entry.epoch != self.epoch {
                trace!(pursuer = entry.pursuer.get(), "discarding stale respawn");
                continue;
            }
            let Some(index) = self.pursuer_index(entry.pursuer) else {
                continue;
            };
            let pursuer = &mut self.pursuers[index];
            if pursuer.alive {
                continue;
            }
            pursuer.alive = true;
            debug!(pursuer = entry.pursuer.get(), "pursuer respawned");
            out_events.push(Event::PursuerRespawned {
                pursuer: entry.pursuer,
                cell: entry.cell,
            });
        }

        let interval = self.config.ai_tick_interval();
        let due = match self.last_ai_tick {
            None => true,
            Some(last) => self.clock.saturating_sub(last) > interval,
        };
        if due {
            self.last_ai_tick = Some(self.clock);
            out_events.push(Event::AiTickElapsed);
        }
    }

    fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let from = self.player.cell;
        let Some(to) = self.player.move_by(&self.grid, direction) else {
            return;
        };
        out_events.push(Event::PlayerMoved { from, to });

        let Some(present) = self.markers.get_mut(&to) else {
            return;
        };
        if !*present {
            return;
        }
        *present = false;
        self.score = self.score.saturating_add(self.config.marker_value);
        out_events.push(Event::MarkerCollected {
            cell: to,
            score: self.score,
        });

        if self.markers.values().all(|present| !present) {
            self.end_session(Outcome::Won, out_events);
        }
    }

    fn fire(&mut self, shooter: Owner, out_events: &mut Vec<Event>) {
        let (cell, direction) = match shooter {
            Owner::Player => (
                self.player.cell,
                self.player.facing.unwrap_or(Direction::East),
            ),
            Owner::Pursuer(pursuer) => {
                let index = match self.living_pursuer(pursuer) {
                    Ok(index) => index,
                    Err(reason) => {
                        out_events.push(Event::CommandRejected { reason });
                        return;
                    }
                };
                let pursuer = &self.pursuers[index];
                let Some(direction) = pursuer.facing else {
                    return;
                };
                (pursuer.cell, direction)
            }
        };

        let id = ProjectileId::new(self.next_projectile);
        self.next_projectile = self.next_projectile.wrapping_add(1);
        self.projectiles
            .push(Projectile::new(id, shooter, cell, direction));
        out_events.push(Event::ProjectileFired {
            projectile: id,
            owner: shooter,
            cell,
            direction,
        });
    }

    fn step_projectiles(&mut self, out_events: &mut Vec<Event>) {
        for projectile in &mut self.projectiles {
            if projectile.step(&self.grid) {
                out_events.push(Event::ProjectileBlocked {
                    projectile: projectile.id,
                    cell: projectile.cell,
                });
            }
        }
        self.projectiles.retain(|projectile| projectile.active);
        self.resolve_collisions(out_events);
    }

    fn resolve_collisions(&mut self, out_events: &mut Vec<Event>) {
        let mut player_hit = false;

        for projectile in &mut self.projectiles {
            if !projectile.active {
                continue;
            }
            match projectile.owner {
                Owner::Player => {
                    let Some(pursuer) = self
                        .pursuers
                        .iter_mut()
                        .find(|pursuer| pursuer.alive && pursuer.cell == projectile.cell)
                    else {
                        continue;
                    };
                    pursuer.alive = false;
                    projectile.active = false;
                    let due = self
                        .clock
                        .saturating_add(self.config.respawn_delay(pursuer.kind));
                    self.respawns
                        .schedule(due, self.epoch, pursuer.id, pursuer.cell);
                    self.score = self.score.saturating_add(self.config.kill_bonus);
                    info!(pursuer = pursuer.id.get(), score = self.score, "pursuer destroyed");
                    out_events.push(Event::PursuerKilled {
                        pursuer: pursuer.id,
                        cell: pursuer.cell,
                        score: self.score,
                    });
                }
                Owner::Pursuer(_) => {
                    if self.player.alive && projectile.cell == self.player.cell {
                        projectile.active = false;
                        player_hit = true;
                    }
                }
            }
        }

        if self.player.alive
            && self
                .pursuers
                .iter()
                .any(|pursuer| pursuer.alive && pursuer.cell == self.player.cell)
        {
            player_hit = true;
        }

        if player_hit {
            self.lose_life(out_events);
        }
    }

    fn lose_life(&mut self, out_events: &mut Vec<Event>) {
        self.lives = self.lives.saturating_sub(1);
        info!(lives = self.lives, "player damaged");
        out_events.push(Event::PlayerDamaged { lives: self.lives });
        if self.lives == 0 {
            self.end_session(Outcome::Lost, out_events);
        } else {
            self.player.return_to_spawn();
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Layout::default(), Config::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartGame { difficulty } => {
            if world.phase != Phase::Menu {
                world.reject_phase(out_events);
                return;
            }
            world.difficulty = difficulty;
            world.start_session(out_events);
        }
        Command::Restart => {
            if world.phase != Phase::Over {
                world.reject_phase(out_events);
                return;
            }
            world.start_session(out_events);
        }
        Command::Pause => {
            if world.phase != Phase::Playing {
                world.reject_phase(out_events);
                return;
            }
            world.transition(Phase::Paused, out_events);
        }
        Command::Resume => {
            if world.phase != Phase::Paused {
                world.reject_phase(out_events);
                return;
            }
            world.transition(Phase::Playing, out_events);
        }
        Command::QuitToMenu => {
            if !matches!(world.phase, Phase::Paused | Phase::Over) {
                world.reject_phase(out_events);
                return;
            }
            world.transition(Phase::Menu, out_events);
        }
        Command::SetDifficulty { difficulty } => {
            if !matches!(world.phase, Phase::Menu | Phase::Paused) {
                world.reject_phase(out_events);
                return;
            }
            world.difficulty = difficulty;
            out_events.push(Event::DifficultyChanged { difficulty });
        }
        Command::Tick { dt } => {
            if world.phase == Phase::Playing {
                world.advance_clock(dt, out_events);
            }
        }
        Command::StepProjectiles => {
            if world.phase == Phase::Playing {
                world.step_projectiles(out_events);
            }
        }
        Command::MovePlayer { direction } => {
            if world.phase != Phase::Playing {
                world.reject_phase(out_events);
                return;
            }
            world.move_player(direction, out_events);
        }
        Command::MovePursuer { pursuer, direction } => {
            if world.phase != Phase::Playing {
                world.reject_phase(out_events);
                return;
            }
            let index = match world.living_pursuer(pursuer) {
                Ok(index) => index,
                Err(reason) => {
                    out_events.push(Event::CommandRejected { reason });
                    return;
                }
            };
            let actor = &mut world.pursuers[index];
            let from = actor.cell;
            if let Some(to) = actor.move_by(&world.grid, direction) {
                trace!(pursuer = pursuer.get(), ?direction, "pursuer moved");
                out_events.push(Event::PursuerMoved { pursuer, from, to });
            }
        }
        Command::Fire { shooter } => {
            if world.phase != Phase::Playing {
                world.reject_phase(out_events);
                return;
            }
            world.fire(shooter, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use pellet_chase_core::{
        CellCoord, Difficulty, Grid, Outcome, Phase, PlayerSnapshot, ProjectileSnapshot,
        ProjectileView, PursuerSnapshot, PursuerView,
    };

    use super::World;

    /// Provides read-only access to the session grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Captures the player's current state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player.snapshot()
    }

    /// Captures a read-only view of every pursuer, dead or alive.
    #[must_use]
    pub fn pursuer_view(world: &World) -> PursuerView {
        let snapshots: Vec<PursuerSnapshot> =
            world.pursuers.iter().map(|pursuer| pursuer.snapshot()).collect();
        PursuerView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of the projectiles still tracked by the world.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        let snapshots: Vec<ProjectileSnapshot> = world
            .projectiles
            .iter()
            .map(|projectile| projectile.snapshot())
            .collect();
        ProjectileView::from_snapshots(snapshots)
    }

    /// Reports whether `cell` still holds an uncollected marker.
    #[must_use]
    pub fn has_marker(world: &World, cell: CellCoord) -> bool {
        world.markers.get(&cell).copied().unwrap_or(false)
    }

    /// Cells that still hold an uncollected marker, in row-major order.
    #[must_use]
    pub fn remaining_markers(world: &World) -> Vec<CellCoord> {
        let mut cells: Vec<CellCoord> = world
            .markers
            .iter()
            .filter(|(_, present)| **present)
            .map(|(cell, _)| *cell)
            .collect();
        cells.sort_by_key(|cell| (cell.row(), cell.column()));
        cells
    }

    /// Current score.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Lives the player has left.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.phase
    }

    /// Active difficulty.
    #[must_use]
    pub fn difficulty(world: &World) -> Difficulty {
        world.difficulty
    }

    /// Outcome of the most recent session, if it has ended.
    #[must_use]
    pub fn outcome(world: &World) -> Option<Outcome> {
        world.outcome
    }

    /// Epoch tag of the current session; zero before the first session.
    #[must_use]
    pub fn epoch(world: &World) -> u64 {
        world.epoch
    }

    /// Simulated time elapsed in the current session.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.clock
    }

    /// Number of respawns still waiting in the queue, stale entries included.
    #[must_use]
    pub fn pending_respawns(world: &World) -> usize {
        world.respawns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORRIDOR: &str = "\
#######
#P. G #
#######";

    fn playing(layout: &str) -> (World, Vec<Event>) {
        let layout = Layout::parse_with_territories(layout, &[]).expect("valid layout");
        let mut world = World::new(layout, Config::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StartGame {
                difficulty: Difficulty::Medium,
            },
            &mut events,
        );
        (world, events)
    }

    #[test]
    fn start_game_lays_out_a_fresh_session() {
        let (world, events) = playing(CORRIDOR);

        assert_eq!(
            events,
            vec![
                Event::SessionStarted {
                    epoch: 1,
                    difficulty: Difficulty::Medium,
                },
                Event::PhaseChanged {
                    from: Phase::Menu,
                    to: Phase::Playing,
                },
            ]
        );
        assert_eq!(query::lives(&world), 5);
        assert_eq!(query::score(&world), 0);
        assert_eq!(query::remaining_markers(&world), vec![CellCoord::new(2, 1)]);
        assert_eq!(query::pursuer_view(&world).iter().count(), 1);
    }

    #[test]
    fn commands_outside_their_phase_are_rejected() {
        let mut world = World::default();
        let mut events = Vec::new();

        apply(&mut world, Command::Pause, &mut events);
        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::East,
            },
            &mut events,
        );
        apply(&mut world, Command::Restart, &mut events);

        let rejection = Event::CommandRejected {
            reason: RejectionReason::InvalidPhase { phase: Phase::Menu },
        };
        assert_eq!(events, vec![rejection.clone(), rejection.clone(), rejection]);
        assert_eq!(query::phase(&world), Phase::Menu);
    }

    #[test]
    fn pause_freezes_time_and_resume_continues() {
        let (mut world, _) = playing(CORRIDOR);
        let mut events = Vec::new();

        apply(&mut world, Command::Pause, &mut events);
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(33),
            },
            &mut events,
        );
        assert_eq!(query::elapsed(&world), Duration::ZERO);
        assert_eq!(
            events,
            vec![Event::PhaseChanged {
                from: Phase::Playing,
                to: Phase::Paused,
            }]
        );

        events.clear();
        apply(&mut world, Command::Resume, &mut events);
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(33),
            },
            &mut events,
        );
        assert_eq!(query::elapsed(&world), Duration::from_millis(33));
    }

    #[test]
    fn difficulty_changes_only_in_menu_or_pause() {
        let (mut world, _) = playing(CORRIDOR);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SetDifficulty {
                difficulty: Difficulty::Hard,
            },
            &mut events,
        );
        assert_eq!(query::difficulty(&world), Difficulty::Medium);

        apply(&mut world, Command::Pause, &mut events);
        events.clear();
        apply(
            &mut world,
            Command::SetDifficulty {
                difficulty: Difficulty::Hard,
            },
            &mut events,
        );
        assert_eq!(query::difficulty(&world), Difficulty::Hard);
        assert_eq!(
            events,
            vec![Event::DifficultyChanged {
                difficulty: Difficulty::Hard,
            }]
        );
    }

    #[test]
    fn ai_ticks_respect_the_interval() {
        let (mut world, _) = playing(CORRIDOR);
        let mut ticks = 0;

        for _ in 0..30 {
            let mut events = Vec::new();
            apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_millis(33),
                },
                &mut events,
            );
            ticks += events
                .iter()
                .filter(|event| matches!(event, Event::AiTickElapsed))
                .count();
        }

        // 990 ms of frames: ticks at 33, 264, 495, 726 and 957 ms.
        assert_eq!(ticks, 5);
    }

    #[test]
    fn blocked_player_move_is_silent() {
        let (mut world, _) = playing(CORRIDOR);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::North,
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::player(&world).cell, CellCoord::new(1, 1));
        assert_eq!(query::player(&world).facing, None);
    }

    #[test]
    fn collecting_the_last_marker_wins() {
        let (mut world, _) = playing(CORRIDOR);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::East,
            },
            &mut events,
        );

        assert_eq!(query::score(&world), 10);
        assert_eq!(query::phase(&world), Phase::Over);
        assert_eq!(query::outcome(&world), Some(Outcome::Won));
        assert!(events.contains(&Event::SessionEnded {
            outcome: Outcome::Won,
            score: 10,
        }));

        events.clear();
        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::East,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::CommandRejected {
                reason: RejectionReason::InvalidPhase { phase: Phase::Over },
            }]
        );
    }

    #[test]
    fn pursuer_contact_costs_one_life_and_resets_player() {
        let (mut world, _) = playing("#######\n#P . G#\n#######");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::East,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MovePursuer {
                pursuer: PursuerId::new(0),
                direction: Direction::West,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MovePursuer {
                pursuer: PursuerId::new(0),
                direction: Direction::West,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MovePursuer {
                pursuer: PursuerId::new(0),
                direction: Direction::West,
            },
            &mut events,
        );
        apply(&mut world, Command::StepProjectiles, &mut events);

        assert_eq!(query::lives(&world), 4);
        assert_eq!(query::player(&world).cell, CellCoord::new(1, 1));
        assert_eq!(query::player(&world).facing, None);
        assert_eq!(query::score(&world), 0);
        assert_eq!(query::phase(&world), Phase::Playing);
    }

    #[test]
    fn losing_the_last_life_ends_the_session() {
        let (mut world, _) = playing("####\n#PG#\n# .#\n####");
        let mut events = Vec::new();

        // The pursuer sits next to the spawn; walk into it five times.
        for _ in 0..5 {
            apply(
                &mut world,
                Command::MovePlayer {
                    direction: Direction::East,
                },
                &mut events,
            );
            apply(&mut world, Command::StepProjectiles, &mut events);
        }

        assert_eq!(query::lives(&world), 0);
        assert_eq!(query::phase(&world), Phase::Over);
        assert_eq!(query::outcome(&world), Some(Outcome::Lost));

        events.clear();
        apply(&mut world, Command::Restart, &mut events);
        assert_eq!(query::phase(&world), Phase::Playing);
        assert_eq!(query::lives(&world), 5);
        assert_eq!(query::epoch(&world), 2);
    }

    #[test]
    fn simultaneous_hits_cost_a_single_life() {
        let (mut world, _) = playing("######\n#P G.#\n######");
        let mut events = Vec::new();
        let pursuer = PursuerId::new(0);

        // Turn the pursuer towards the player, fire twice from the adjacent
        // cell, then step onto the player so contact and both projectiles
        // land on the same frame.
        for direction in [Direction::East, Direction::West, Direction::West] {
            apply(
                &mut world,
                Command::MovePursuer { pursuer, direction },
                &mut events,
            );
        }
        for _ in 0..2 {
            apply(
                &mut world,
                Command::Fire {
                    shooter: Owner::Pursuer(pursuer),
                },
                &mut events,
            );
        }
        apply(
            &mut world,
            Command::MovePursuer {
                pursuer,
                direction: Direction::West,
            },
            &mut events,
        );
        apply(&mut world, Command::StepProjectiles, &mut events);

        assert_eq!(query::lives(&world), 4);
        let damage = events
            .iter()
            .filter(|event| matches!(event, Event::PlayerDamaged { .. }))
            .count();
        assert_eq!(damage, 1);
        assert!(query::projectile_view(&world)
            .iter()
            .all(|projectile| !projectile.active));
    }

    #[test]
    fn player_projectile_kills_and_pursuer_respawns() {
        let (mut world, _) = playing("#######\n#P  G #\n#######");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(10),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Fire {
                shooter: Owner::Player,
            },
            &mut events,
        );
        for _ in 0..3 {
            apply(&mut world, Command::StepProjectiles, &mut events);
        }

        assert!(events.contains(&Event::PursuerKilled {
            pursuer: PursuerId::new(0),
            cell: CellCoord::new(4, 1),
            score: 100,
        }));
        assert!(!query::pursuer_view(&world).iter().any(|pursuer| pursuer.alive));

        events.clear();
        apply(
            &mut world,
            Command::MovePursuer {
                pursuer: PursuerId::new(0),
                direction: Direction::West,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::CommandRejected {
                reason: RejectionReason::InactivePursuer {
                    pursuer: PursuerId::new(0),
                },
            }]
        );

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(3_999),
            },
            &mut events,
        );
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::PursuerRespawned { .. })));

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(1),
            },
            &mut events,
        );
        assert!(events.contains(&Event::PursuerRespawned {
            pursuer: PursuerId::new(0),
            cell: CellCoord::new(4, 1),
        }));
    }

    #[test]
    fn stale_respawn_never_revives_a_new_session_pursuer() {
        let (mut world, _) = playing("#####\n#PG.#\n#####");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Fire {
                shooter: Owner::Player,
            },
            &mut events,
        );
        apply(&mut world, Command::StepProjectiles, &mut events);
        assert_eq!(query::pending_respawns(&world), 1);

        // Finish the session by collecting the only marker, then restart.
        for _ in 0..2 {
            apply(
                &mut world,
                Command::MovePlayer {
                    direction: Direction::East,
                },
                &mut events,
            );
        }
        assert_eq!(query::outcome(&world), Some(Outcome::Won));
        apply(&mut world, Command::Restart, &mut events);

        // Kill the new pursuer later so only the stale entry comes due.
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(2),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Fire {
                shooter: Owner::Player,
            },
            &mut events,
        );
        apply(&mut world, Command::StepProjectiles, &mut events);
        events.clear();

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(2),
            },
            &mut events,
        );
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::PursuerRespawned { .. })));
        assert!(!query::pursuer_view(&world).iter().any(|pursuer| pursuer.alive));
        assert_eq!(query::pending_respawns(&world), 1);
    }

    #[test]
    fn respawned_pursuer_keeps_its_facing_and_can_fire() {
        let (mut world, _) = playing("########\n#P   G #\n########");
        let mut events = Vec::new();
        let pursuer = PursuerId::new(0);

        apply(
            &mut world,
            Command::MovePursuer {
                pursuer,
                direction: Direction::West,
            },
            &mut events,
        );
        let before = query::pursuer_view(&world).into_vec()[0];
        assert_eq!(before.facing, Some(Direction::West));

        apply(
            &mut world,
            Command::Fire {
                shooter: Owner::Player,
            },
            &mut events,
        );
        for _ in 0..3 {
            apply(&mut world, Command::StepProjectiles, &mut events);
        }
        assert!(!query::pursuer_view(&world).into_vec()[0].alive);

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(5),
            },
            &mut events,
        );
        let after = query::pursuer_view(&world).into_vec()[0];
        assert!(after.alive);
        assert_eq!(after.cell, before.cell);
        assert_eq!(after.facing, before.facing);

        events.clear();
        apply(
            &mut world,
            Command::Fire {
                shooter: Owner::Pursuer(pursuer),
            },
            &mut events,
        );
        assert!(matches!(
            events.as_slice(),
            [Event::ProjectileFired {
                direction: Direction::West,
                ..
            }]
        ));
    }

    #[test]
    fn quitting_to_menu_lets_a_new_session_start() {
        let (mut world, _) = playing(CORRIDOR);
        let mut events = Vec::new();

        apply(&mut world, Command::Pause, &mut events);
        events.clear();
        apply(&mut world, Command::QuitToMenu, &mut events);
        assert_eq!(
            events,
            vec![Event::PhaseChanged {
                from: Phase::Paused,
                to: Phase::Menu,
            }]
        );

        apply(
            &mut world,
            Command::StartGame {
                difficulty: Difficulty::Easy,
            },
            &mut events,
        );
        assert_eq!(query::phase(&world), Phase::Playing);
        assert_eq!(query::epoch(&world), 2);
        assert_eq!(query::difficulty(&world), Difficulty::Easy);

        // Win the session, then leave from the game-over screen.
        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::East,
            },
            &mut events,
        );
        assert_eq!(query::phase(&world), Phase::Over);
        events.clear();
        apply(&mut world, Command::QuitToMenu, &mut events);
        assert_eq!(
            events,
            vec![Event::PhaseChanged {
                from: Phase::Over,
                to: Phase::Menu,
            }]
        );

        apply(
            &mut world,
            Command::StartGame {
                difficulty: Difficulty::Medium,
            },
            &mut events,
        );
        assert_eq!(query::epoch(&world), 3);
        assert_eq!(query::score(&world), 0);
        assert_eq!(query::outcome(&world), None);
        assert_eq!(query::player(&world).cell, CellCoord::new(1, 1));
        assert_eq!(query::remaining_markers(&world), vec![CellCoord::new(2, 1)]);
    }

    #[test]
    fn quit_to_menu_is_rejected_while_playing() {
        let (mut world, _) = playing(CORRIDOR);
        let mut events = Vec::new();

        apply(&mut world, Command::QuitToMenu, &mut events);

        assert_eq!(
            events,
            vec![Event::CommandRejected {
                reason: RejectionReason::InvalidPhase {
                    phase: Phase::Playing,
                },
            }]
        );
    }

    #[test]
    fn layout_without_markers_is_never_won() {
        let (mut world, _) = playing("######\n#P  G#\n######");
        let mut events = Vec::new();
        assert!(query::remaining_markers(&world).is_empty());

        for direction in [Direction::East, Direction::East, Direction::West] {
            apply(&mut world, Command::MovePlayer { direction }, &mut events);
            apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_millis(33),
                },
                &mut events,
            );
            apply(&mut world, Command::StepProjectiles, &mut events);
        }

        assert_eq!(query::phase(&world), Phase::Playing);
        assert_eq!(query::outcome(&world), None);
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::SessionEnded { .. })));
    }

    #[test]
    fn pursuer_ids_follow_spawn_order() {
        let world = World::default();
        let ids: Vec<u32> = query::pursuer_view(&world)
            .iter()
            .map(|pursuer| pursuer.id.get())
            .collect();
        let expected: Vec<u32> = (0..9).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn pursuer_without_facing_cannot_fire() {
        let (mut world, _) = playing(CORRIDOR);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Fire {
                shooter: Owner::Pursuer(PursuerId::new(0)),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Fire {
                shooter: Owner::Pursuer(PursuerId::new(9)),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::CommandRejected {
                reason: RejectionReason::MissingPursuer {
                    pursuer: PursuerId::new(9),
                },
            }]
        );
        assert!(query::projectile_view(&world).is_empty());
    }

    #[test]
    fn blocked_projectiles_are_dropped_on_the_next_step() {
        let (mut world, _) = playing("#####\n#P .#\n#####");
        let mut events = Vec::new();

        for direction in [Direction::East, Direction::West] {
            apply(&mut world, Command::MovePlayer { direction }, &mut events);
        }
        apply(
            &mut world,
            Command::Fire {
                shooter: Owner::Player,
            },
            &mut events,
        );
        assert_eq!(query::projectile_view(&world).len(), 1);

        events.clear();
        apply(&mut world, Command::StepProjectiles, &mut events);
        assert_eq!(
            events,
            vec![Event::ProjectileBlocked {
                projectile: ProjectileId::new(0),
                cell: CellCoord::new(1, 1),
            }]
        );
        assert!(query::projectile_view(&world).is_empty());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: Config = toml::from_str("starting_lives = 3\nkill_bonus = 50").expect("config");
        assert_eq!(config.starting_lives, 3);
        assert_eq!(config.kill_bonus, 50);
        assert_eq!(config.ai_tick_interval(), Duration::from_millis(200));
        assert_eq!(
            config.respawn_delay(PursuerKind::AlwaysChase),
            Duration::from_secs(3)
        );
    }
}
