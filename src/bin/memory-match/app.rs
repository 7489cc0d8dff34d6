//! Frontend state: the latest snapshot plus the board cursor.

use memory_match::{CardIndex, Snapshot};

/// Cards per board row.
pub const COLUMNS: usize = 5;

pub struct App {
    pub snapshot: Snapshot,
    /// Position of the highlighted card.
    pub cursor: usize,
}

impl App {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot, cursor: 0 }
    }

    /// Replace the snapshot, keeping the cursor on the board.
    pub fn update(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
        self.cursor = self.cursor.min(self.snapshot.deck.len().saturating_sub(1));
    }

    /// Card under the cursor.
    pub fn selected(&self) -> CardIndex {
        CardIndex::new(self.cursor as u16)
    }

    /// Move the cursor by whole cells, stopping at the board edges.
    pub fn move_cursor(&mut self, dx: isize, dy: isize) {
        let len = self.snapshot.deck.len();
        if len == 0 {
            return;
        }

        let rows = len.div_ceil(COLUMNS);
        let row = (self.cursor / COLUMNS) as isize + dy;
        let col = (self.cursor % COLUMNS) as isize + dx;
        if !(0..rows as isize).contains(&row) || !(0..COLUMNS as isize).contains(&col) {
            return;
        }

        let target = row as usize * COLUMNS + col as usize;
        if target < len {
            self.cursor = target;
        }
    }
}
