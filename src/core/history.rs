//! Transition journal.
//!
//! Machines keep a bounded record of committed transitions, by shape name only,
//! for diagnostics. State payloads are never recorded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single committed transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Position of this transition in the machine's lifetime, starting at 1
    pub sequence: u64,
    /// Shape the machine left
    pub from: String,
    /// Shape the machine entered
    pub to: String,
    /// When the new state was committed
    pub timestamp: DateTime<Utc>,
}

/// Bounded ring of the most recent transitions.
///
/// A capacity of zero disables recording but still counts transitions.
#[derive(Debug)]
pub struct Journal {
    capacity: usize,
    recorded: u64,
    records: VecDeque<TransitionRecord>,
}

impl Journal {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            recorded: 0,
            records: VecDeque::with_capacity(capacity.min(64)),
        }
    }

    /// Append a transition, evicting the oldest record when full.
    pub fn record(&mut self, from: &str, to: &str) {
        self.recorded += 1;
        if self.capacity == 0 {
            return;
        }
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(TransitionRecord {
            sequence: self.recorded,
            from: from.to_string(),
            to: to.to_string(),
            timestamp: Utc::now(),
        });
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total number of transitions ever recorded, including evicted ones.
    pub fn total(&self) -> u64 {
        self.recorded
    }

    pub fn snapshot(&self) -> StateHistory {
        StateHistory {
            transitions: self.records.iter().cloned().collect(),
        }
    }
}

/// Immutable copy of a machine's journal.
///
/// # Example
///
/// ```rust
/// use fsm_core::core::Journal;
///
/// let mut journal = Journal::new(8);
/// journal.record("Idle", "Processing");
/// journal.record("Processing", "Finished");
///
/// let history = journal.snapshot();
/// assert_eq!(history.get_path(), vec!["Idle", "Processing", "Finished"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: Vec<TransitionRecord>,
}

impl StateHistory {
    /// Get the path of shapes traversed.
    ///
    /// Returns the `from` shape of the oldest retained transition followed by
    /// the `to` shape of each transition.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(first.from.as_str());
        }
        for transition in &self.transitions {
            path.push(transition.to.as_str());
        }
        path
    }

    /// Duration between the first and last retained transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
