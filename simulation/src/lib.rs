#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame loop that pumps commands through the world and the pursuit system.
//!
//! Each frame ticks the world clock, lets pursuers react when an AI tick
//! elapsed, and then advances projectiles and resolves collisions. The random
//! generator is seeded explicitly so a session replays exactly.

use std::time::Duration;

use pellet_chase_core::{Command, Event, Phase};
use pellet_chase_system_pursuit::Pursuit;
use pellet_chase_world::{self as world, query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

/// Nominal wall-clock period of one frame.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Owns the world, the pursuit system and the seeded random source.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    pursuit: Pursuit,
    rng: ChaCha8Rng,
    frame: u64,
}

impl Simulation {
    /// Creates a simulation whose pursuit decisions derive from `seed`.
    #[must_use]
    pub fn new(world: World, pursuit: Pursuit, seed: u64) -> Self {
        Self {
            world,
            pursuit,
            rng: ChaCha8Rng::seed_from_u64(seed),
            frame: 0,
        }
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Number of frames advanced while playing.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Applies an adapter command and lets systems react to its events.
    ///
    /// Every event produced, including those caused by system reactions, is
    /// appended to `out_events`.
    pub fn submit(&mut self, command: Command, out_events: &mut Vec<Event>) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.dispatch(events, out_events);
    }

    /// Runs one frame of `dt` simulated time.
    ///
    /// Frames outside [`Phase::Playing`] do nothing.
    pub fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if query::phase(&self.world) != Phase::Playing {
            return;
        }
        self.frame = self.frame.saturating_add(1);
        trace!(frame = self.frame, "advancing frame");

        self.submit(Command::Tick { dt }, out_events);
        self.submit(Command::StepProjectiles, out_events);
    }

    fn dispatch(&mut self, pending_events: Vec<Event>, out_events: &mut Vec<Event>) {
        let mut events = pending_events;

        loop {
            if events.is_empty() {
                break;
            }
            out_events.extend(events.iter().cloned());

            let pursuers = query::pursuer_view(&self.world);
            let target = query::player(&self.world).cell;
            let mut commands = Vec::new();
            self.pursuit.handle(
                &events,
                &pursuers,
                target,
                query::grid(&self.world),
                &mut self.rng,
                &mut commands,
            );

            if commands.is_empty() {
                break;
            }

            events.clear();
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }
    }
}
