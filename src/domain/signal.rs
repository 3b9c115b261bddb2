//! Signal output rows.

use crate::domain::policy::Action;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalRow {
    pub timestamp: NaiveDateTime,
    pub signal: Action,
}

/// One signal per aligned row, ascending by timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalFrame {
    pub rows: Vec<SignalRow>,
}

impl SignalFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn actions(&self) -> Vec<Action> {
        self.rows.iter().map(|r| r.signal).collect()
    }

    pub fn count(&self, action: Action) -> usize {
        self.rows.iter().filter(|r| r.signal == action).count()
    }
}
