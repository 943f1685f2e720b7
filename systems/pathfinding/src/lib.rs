#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid path search used by pursuers to reach the player.
//!
//! Every search shares one contract: given a [`Grid`], a start cell and a goal
//! cell, return the cells from the step after `start` up to and including
//! `goal`. The result is empty when `start == goal` or when the goal cannot be
//! reached. Neighbors are always expanded in the grid's fixed up, down, left,
//! right order, which makes every search fully deterministic.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, VecDeque},
};

use pellet_chase_core::{CellCoord, Difficulty, Grid};

/// Search strategy available to pursuers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Stack-driven exploration; finds a path, not necessarily a short one.
    DepthFirst,
    /// Level-order exploration; finds a shortest path.
    BreadthFirst,
    /// Manhattan-guided best-first exploration; finds a shortest path.
    AStar,
}

impl Algorithm {
    /// Strategy bound to the provided difficulty.
    #[must_use]
    pub const fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self::DepthFirst,
            Difficulty::Medium => Self::BreadthFirst,
            Difficulty::Hard => Self::AStar,
        }
    }

    /// Short human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DepthFirst => "DFS",
            Self::BreadthFirst => "BFS",
            Self::AStar => "A*",
        }
    }

    /// Runs the strategy between `start` and `goal`.
    #[must_use]
    pub fn search(self, grid: &Grid, start: CellCoord, goal: CellCoord) -> Vec<CellCoord> {
        match self {
            Self::DepthFirst => depth_first(grid, start, goal),
            Self::BreadthFirst => breadth_first(grid, start, goal),
            Self::AStar => a_star(grid, start, goal),
        }
    }
}

/// Depth-first search.
///
/// Neighbors are pushed in up, down, left, right order and popped last-in
/// first-out, so the right-hand neighbor is explored first. A cell's parent is
/// fixed the first time it is discovered.
#[must_use]
pub fn depth_first(grid: &Grid, start: CellCoord, goal: CellCoord) -> Vec<CellCoord> {
    if start == goal {
        return Vec::new();
    }
    let Some(mut parents) = ParentMap::rooted_at(grid, start) else {
        return Vec::new();
    };

    let mut visited = vec![false; parents.len()];
    let mut stack = vec![start];

    while let Some(cell) = stack.pop() {
        let Some(slot) = parents.slot(cell) else {
            continue;
        };
        if visited[slot] {
            continue;
        }
        visited[slot] = true;

        if cell == goal {
            break;
        }

        for neighbor in grid.neighbors4(cell) {
            let seen = parents.slot(neighbor).map_or(true, |index| visited[index]);
            if seen || parents.is_discovered(neighbor) {
                continue;
            }
            parents.record(neighbor, cell);
            stack.push(neighbor);
        }
    }

    parents.path_to(goal)
}

/// Breadth-first search.
///
/// The first discovery of a cell is along a minimum-edge route, so the
/// reconstructed path is a shortest one.
#[must_use]
pub fn breadth_first(grid: &Grid, start: CellCoord, goal: CellCoord) -> Vec<CellCoord> {
    if start == goal {
        return Vec::new();
    }
    let Some(mut parents) = ParentMap::rooted_at(grid, start) else {
        return Vec::new();
    };

    let mut queue = VecDeque::from([start]);

    while let Some(cell) = queue.pop_front() {
        if cell == goal {
            break;
        }

        for neighbor in grid.neighbors4(cell) {
            if parents.is_discovered(neighbor) {
                continue;
            }
            parents.record(neighbor, cell);
            queue.push_back(neighbor);
        }
    }

    parents.path_to(goal)
}

/// A* search with the Manhattan heuristic and unit edge costs.
///
/// The heuristic is admissible and consistent on a four-connected grid, so the
/// returned path is a shortest one. Improved costs re-enqueue a cell; older
/// heap entries stay behind and are skipped once their cost is out of date.
/// Equal priorities resolve toward the lower row, then the lower column.
#[must_use]
pub fn a_star(grid: &Grid, start: CellCoord, goal: CellCoord) -> Vec<CellCoord> {
    if start == goal {
        return Vec::new();
    }
    let Some(mut parents) = ParentMap::rooted_at(grid, start) else {
        return Vec::new();
    };

    let mut best_cost = vec![u32::MAX; parents.len()];
    if let Some(slot) = parents.slot(start) {
        best_cost[slot] = 0;
    }

    let mut open = BinaryHeap::new();
    open.push(Reverse(OpenEntry::new(0, start, 0)));

    while let Some(Reverse(entry)) = open.pop() {
        let cell = entry.cell();
        let Some(slot) = parents.slot(cell) else {
            continue;
        };
        if entry.cost != best_cost[slot] {
            continue;
        }

        if cell == goal {
            break;
        }

        let tentative = entry.cost.saturating_add(1);
        for neighbor in grid.neighbors4(cell) {
            let Some(neighbor_slot) = parents.slot(neighbor) else {
                continue;
            };
            if tentative >= best_cost[neighbor_slot] {
                continue;
            }

            best_cost[neighbor_slot] = tentative;
            parents.record(neighbor, cell);
            let estimate = tentative.saturating_add(neighbor.manhattan_distance(goal));
            open.push(Reverse(OpenEntry::new(estimate, neighbor, tentative)));
        }
    }

    parents.path_to(goal)
}

/// Heap entry ordered by estimate, then row, then column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenEntry {
    estimate: u32,
    row: u32,
    column: u32,
    cost: u32,
}

impl OpenEntry {
    fn new(estimate: u32, cell: CellCoord, cost: u32) -> Self {
        Self {
            estimate,
            row: cell.row(),
            column: cell.column(),
            cost,
        }
    }

    fn cell(&self) -> CellCoord {
        CellCoord::new(self.column, self.row)
    }
}

/// Dense parent pointers for every cell of a grid.
#[derive(Debug)]
struct ParentMap {
    width: usize,
    start: CellCoord,
    discovered: Vec<bool>,
    parents: Vec<Option<CellCoord>>,
}

impl ParentMap {
    /// Creates a map with only `start` discovered. Returns `None` when `start`
    /// lies outside the grid.
    fn rooted_at(grid: &Grid, start: CellCoord) -> Option<Self> {
        if !grid.in_bounds(start) {
            return None;
        }

        let width = usize::try_from(grid.columns()).ok()?;
        let height = usize::try_from(grid.rows()).ok()?;
        let cell_count = width.checked_mul(height)?;

        let mut map = Self {
            width,
            start,
            discovered: vec![false; cell_count],
            parents: vec![None; cell_count],
        };
        let slot = map.slot(start)?;
        map.discovered[slot] = true;
        Some(map)
    }

    fn len(&self) -> usize {
        self.discovered.len()
    }

    fn slot(&self, cell: CellCoord) -> Option<usize> {
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        if column >= self.width {
            return None;
        }
        let index = row.checked_mul(self.width)?.checked_add(column)?;
        (index < self.discovered.len()).then_some(index)
    }

    fn is_discovered(&self, cell: CellCoord) -> bool {
        self.slot(cell)
            .map_or(false, |index| self.discovered[index])
    }

    fn record(&mut self, cell: CellCoord, parent: CellCoord) {
        if let Some(index) = self.slot(cell) {
            self.discovered[index] = true;
            self.parents[index] = Some(parent);
        }
    }

    /// Walks parent pointers back from `goal`, returning the forward path
    /// without the start cell.
    fn path_to(&self, goal: CellCoord) -> Vec<CellCoord> {
        if goal == self.start || !self.is_discovered(goal) {
            return Vec::new();
        }

        let mut path = Vec::new();
        let mut current = goal;
        while current != self.start {
            path.push(current);
            let Some(parent) = self.slot(current).and_then(|index| self.parents[index]) else {
                return Vec::new();
            };
            if path.len() > self.len() {
                return Vec::new();
            }
            current = parent;
        }
        path.reverse();
        path
    }
}
