#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Pellet Chase engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing player intents, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots such as [`PursuerView`] and the [`Grid`], and respond exclusively
//! with new command batches.

mod grid;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use grid::{CellKind, Grid};

/// Coarse lifecycle phase of a game session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the player to pick a difficulty and start.
    Menu,
    /// Simulation is running; movement, firing and AI are live.
    Playing,
    /// Simulation is frozen until resumed or abandoned.
    Paused,
    /// The session finished with an [`Outcome`].
    Over,
}

/// Result of a finished session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Every collectible marker was cleared.
    Won,
    /// The player ran out of lives.
    Lost,
}

/// Named difficulty levels, each bound to one search strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Pursuers chase with depth-first search.
    Easy,
    /// Pursuers chase with breadth-first search.
    #[default]
    Medium,
    /// Pursuers chase with A* search.
    Hard,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Leaves the menu and starts a fresh session at the given difficulty.
    StartGame {
        /// Difficulty the new session runs at.
        difficulty: Difficulty,
    },
    /// Freezes a running session.
    Pause,
    /// Continues a paused session.
    Resume,
    /// Starts a fresh session after the previous one ended.
    Restart,
    /// Abandons a paused or finished session and returns to the menu.
    QuitToMenu,
    /// Selects the difficulty used by the next chase decisions.
    SetDifficulty {
        /// Difficulty to activate.
        difficulty: Difficulty,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the player advance a single cell.
    MovePlayer {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that a pursuer advance a single cell.
    MovePursuer {
        /// Identifier of the pursuer attempting to move.
        pursuer: PursuerId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that an actor launch a projectile along its facing.
    Fire {
        /// Actor that fires.
        shooter: Owner,
    },
    /// Advances projectiles one cell and resolves collisions.
    StepProjectiles,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces a phase transition.
    PhaseChanged {
        /// Phase before the transition.
        from: Phase,
        /// Phase after the transition.
        to: Phase,
    },
    /// Announces that a fresh session was laid out.
    SessionStarted {
        /// Epoch tag of the new session.
        epoch: u64,
        /// Difficulty the session runs at.
        difficulty: Difficulty,
    },
    /// Confirms a difficulty change.
    DifficultyChanged {
        /// Difficulty that became active.
        difficulty: Difficulty,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Signals that pursuers are due for a new round of decisions.
    AiTickElapsed,
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: CellCoord,
        /// Cell the player occupies after moving.
        to: CellCoord,
    },
    /// Confirms that a pursuer moved between two cells.
    PursuerMoved {
        /// Identifier of the pursuer that moved.
        pursuer: PursuerId,
        /// Cell the pursuer occupied before moving.
        from: CellCoord,
        /// Cell the pursuer occupies after moving.
        to: CellCoord,
    },
    /// Confirms that the player consumed a collectible marker.
    MarkerCollected {
        /// Cell that held the marker.
        cell: CellCoord,
        /// Score after the pickup.
        score: u32,
    },
    /// Confirms that a projectile entered play.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Actor that fired it.
        owner: Owner,
        /// Cell the projectile starts from.
        cell: CellCoord,
        /// Direction of travel.
        direction: Direction,
    },
    /// Reports that a projectile struck a wall or left the grid.
    ProjectileBlocked {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Cell the projectile stopped on.
        cell: CellCoord,
    },
    /// Reports that a player projectile destroyed a pursuer.
    PursuerKilled {
        /// Identifier of the destroyed pursuer.
        pursuer: PursuerId,
        /// Cell where the pursuer died.
        cell: CellCoord,
        /// Score after the kill bonus.
        score: u32,
    },
    /// Reports that a destroyed pursuer returned to play.
    PursuerRespawned {
        /// Identifier of the pursuer.
        pursuer: PursuerId,
        /// Cell the pursuer reappeared on.
        cell: CellCoord,
    },
    /// Reports that the player lost a life.
    PlayerDamaged {
        /// Lives remaining after the hit.
        lives: u32,
    },
    /// Reports that the session reached a terminal outcome.
    SessionEnded {
        /// How the session ended.
        outcome: Outcome,
        /// Final score.
        score: u32,
    },
    /// Reports that a command was refused.
    CommandRejected {
        /// Specific reason the command failed.
        reason: RejectionReason,
    },
}

/// Reasons a command may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    /// The command is not legal in the current phase.
    InvalidPhase {
        /// Phase the world was in.
        phase: Phase,
    },
    /// No pursuer with the provided identifier exists.
    MissingPursuer {
        /// Identifier named by the command.
        pursuer: PursuerId,
    },
    /// The pursuer exists but is waiting to respawn.
    InactivePursuer {
        /// Identifier named by the command.
        pursuer: PursuerId,
    },
}

/// Cardinal movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
    /// Movement toward increasing column indices.
    East,
}

impl Direction {
    /// All directions in neighbor order: up, down, left, right.
    ///
    /// Search tie-breaking depends on this order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Column and row offsets of a single step.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::West => (-1, 0),
            Self::East => (1, 0),
        }
    }

    /// Direction of a single cardinal step between two adjacent cells.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Self> {
        let column_diff = from.column().abs_diff(to.column());
        let row_diff = from.row().abs_diff(to.row());

        if column_diff + row_diff != 1 {
            return None;
        }

        if column_diff == 1 {
            if to.column() > from.column() {
                Some(Self::East)
            } else {
                Some(Self::West)
            }
        } else if to.row() > from.row() {
            Some(Self::South)
        } else {
            Some(Self::North)
        }
    }
}

/// Unique identifier assigned to a pursuer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PursuerId(u32);

impl PursuerId {
    /// Creates a new pursuer identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Actor responsible for a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    /// The controllable player.
    Player,
    /// An AI pursuer.
    Pursuer(PursuerId),
}

/// Behavioural variant of a pursuer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PursuerKind {
    /// Chases only while the target stands inside its territory.
    Regular,
    /// Ignores territory and always chases.
    AlwaysChase,
}

impl PursuerKind {
    /// Reports whether a pursuer of this kind treats `cell` as chase ground.
    ///
    /// Always-chase pursuers accept every cell. A missing territory means
    /// "everywhere".
    #[must_use]
    pub fn admits(self, territory: Option<CellRect>, cell: CellCoord) -> bool {
        match (self, territory) {
            (Self::AlwaysChase, _) | (Self::Regular, None) => true,
            (Self::Regular, Some(region)) => region.contains(cell),
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Constructs a rectangle from half-open column and row ranges.
    ///
    /// Empty or inverted ranges produce a zero-sized rectangle.
    #[must_use]
    pub fn from_ranges(
        columns: std::ops::Range<u32>,
        rows: std::ops::Range<u32>,
    ) -> Self {
        let width = columns.end.saturating_sub(columns.start);
        let height = rows.end.saturating_sub(rows.start);
        Self::from_origin_and_size(
            CellCoord::new(columns.start, rows.start),
            CellRectSize::new(width, height),
        )
    }

    /// Reports whether the rectangle covers the provided cell.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let column = cell.column();
        let row = cell.row();
        column >= self.origin.column()
            && row >= self.origin.row()
            && u64::from(column) < u64::from(self.origin.column()) + u64::from(self.size.width())
            && u64::from(row) < u64::from(self.origin.row()) + u64::from(self.size.height())
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Immutable representation of the player's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerSnapshot {
    /// Grid cell currently occupied by the player.
    pub cell: CellCoord,
    /// Direction of the last successful move, if any.
    pub facing: Option<Direction>,
    /// Indicates whether the player is in play.
    pub alive: bool,
}

/// Immutable representation of a single pursuer's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PursuerSnapshot {
    /// Unique identifier assigned to the pursuer.
    pub id: PursuerId,
    /// Behavioural variant of the pursuer.
    pub kind: PursuerKind,
    /// Grid cell currently occupied by the pursuer.
    pub cell: CellCoord,
    /// Direction of the last successful move, if any.
    pub facing: Option<Direction>,
    /// Indicates whether the pursuer is in play.
    pub alive: bool,
    /// Region where the pursuer chases; `None` means everywhere.
    pub territory: Option<CellRect>,
}

impl PursuerSnapshot {
    /// Reports whether `cell` lies in the pursuer's chase territory.
    #[must_use]
    pub fn is_in_territory(&self, cell: CellCoord) -> bool {
        self.kind.admits(self.territory, cell)
    }
}

/// Read-only snapshot describing all pursuers within the maze.
#[derive(Clone, Debug, Default)]
pub struct PursuerView {
    snapshots: Vec<PursuerSnapshot>,
}

impl PursuerView {
    /// Creates a new pursuer view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<PursuerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured pursuer snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &PursuerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<PursuerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single projectile used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile by the world.
    pub id: ProjectileId,
    /// Actor that fired the projectile.
    pub owner: Owner,
    /// Cell the projectile currently occupies.
    pub cell: CellCoord,
    /// Direction of travel.
    pub direction: Direction,
    /// Indicates whether the projectile can still hit anything.
    pub active: bool,
}

/// Read-only snapshot describing all projectiles in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of projectiles captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no projectile is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}
