use std::{cmp::Reverse, collections::BinaryHeap, time::Duration};

use pellet_chase_core::{CellCoord, PursuerId};

/// Pending pursuer revival tagged with the session it was scheduled in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Respawn {
    pub(crate) due: Duration,
    pub(crate) sequence: u64,
    pub(crate) epoch: u64,
    pub(crate) pursuer: PursuerId,
    pub(crate) cell: CellCoord,
}

/// Time-indexed min-heap of scheduled respawns.
///
/// Entries pop in `(due, sequence)` order so equal deadlines resolve in the
/// order they were scheduled.
#[derive(Debug, Default)]
pub(crate) struct RespawnQueue {
    entries: BinaryHeap<Reverse<Respawn>>,
    next_sequence: u64,
}

impl RespawnQueue {
    pub(crate) fn schedule(&mut self, due: Duration, epoch: u64, pursuer: PursuerId, cell: CellCoord) {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        self.entries.push(Reverse(Respawn {
            due,
            sequence,
            epoch,
            pursuer,
            cell,
        }));
    }

    /// Removes and returns every entry due at or before `now`.
    pub(crate) fn drain_due(&mut self, now: Duration) -> Vec<Respawn> {
        let mut due = Vec::new();
        while let Some(Reverse(entry)) = self.entries.peek() {
            if entry.due > now {
                break;
            }
            if let Some(Reverse(entry)) = self.entries.pop() {
                due.push(entry);
            }
        }
        due
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_only_due_entries_in_deadline_order() {
        let mut queue = RespawnQueue::default();
        let cell = CellCoord::new(1, 1);
        queue.schedule(Duration::from_secs(4), 1, PursuerId::new(0), cell);
        queue.schedule(Duration::from_secs(3), 1, PursuerId::new(1), cell);
        queue.schedule(Duration::from_secs(3), 1, PursuerId::new(2), cell);

        assert!(queue.drain_due(Duration::from_millis(2_999)).is_empty());

        let due: Vec<PursuerId> = queue
            .drain_due(Duration::from_secs(3))
            .into_iter()
            .map(|entry| entry.pursuer)
            .collect();
        assert_eq!(due, vec![PursuerId::new(1), PursuerId::new(2)]);
        assert_eq!(queue.len(), 1);

        let rest = queue.drain_due(Duration::from_secs(10));
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].pursuer, PursuerId::new(0));
        assert_eq!(queue.len(), 0);
    }
}
