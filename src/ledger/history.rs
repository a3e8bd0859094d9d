//! Bounded undo buffer of full game snapshots.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::ledger::types::GameSnapshot;

/// How many snapshots are retained before the oldest are discarded.
pub const HISTORY_LIMIT: usize = 20;

/// Most recent snapshot at the front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    entries: VecDeque<GameSnapshot>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(HISTORY_LIMIT)
    }
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a snapshot, silently evicting the oldest entries beyond capacity.
    pub fn push(&mut self, snapshot: GameSnapshot) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_front(snapshot);
        self.entries.truncate(self.capacity);
    }

    pub fn pop(&mut self) -> Option<GameSnapshot> {
        self.entries.pop_front()
    }

    pub fn peek(&self) -> Option<&GameSnapshot> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
