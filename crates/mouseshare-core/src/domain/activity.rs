//! Bounded activity log shown to the user.
//!
//! The log is a FIFO ring of the most recent [`ACTIVITY_LOG_CAPACITY`]
//! entries.  Pushing onto a full log evicts the oldest entry.  It is purely
//! observational: nothing in the session reads it back to make decisions.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Maximum number of entries retained.
pub const ACTIVITY_LOG_CAPACITY: usize = 20;

/// One line of the activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    /// Wall-clock time the entry was recorded, in microseconds since the Unix epoch.
    pub timestamp_us: u64,
    pub text: String,
}

/// Append-only ring of recent activity.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<ActivityLogEntry>,
    capacity: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityLog {
    /// Creates an empty log holding at most [`ACTIVITY_LOG_CAPACITY`] entries.
    pub fn new() -> Self {
        Self::with_capacity(ACTIVITY_LOG_CAPACITY)
    }

    /// Creates an empty log with a custom cap (at least 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `text` stamped with the current time and returns the new entry.
    pub fn push(&mut self, text: impl Into<String>) -> &ActivityLogEntry {
        self.push_at(current_timestamp_us(), text)
    }

    /// Appends `text` with an explicit timestamp.
    pub fn push_at(&mut self, timestamp_us: u64, text: impl Into<String>) -> &ActivityLogEntry {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(ActivityLogEntry {
            timestamp_us,
            text: text.into(),
        });
        let newest = self.entries.len() - 1;
        &self.entries[newest]
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ActivityLogEntry> {
        self.entries.iter()
    }

    /// Entries from newest to oldest, the order the UI displays them in.
    pub fn latest_first(&self) -> Vec<ActivityLogEntry> {
        self.entries.iter().rev().cloned().collect()
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
}

/// Current wall-clock time in microseconds since the Unix epoch (0 if the
/// clock is before the epoch).
pub fn current_timestamp_us() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_log_is_empty_with_default_capacity() {
        let log = ActivityLog::new();
        assert!(log.is_empty());
        assert_eq!(log.capacity(), 20);
    }

    #[test]
    fn test_push_never_exceeds_capacity() {
        // Arrange
        let mut log = ActivityLog::new();

        // Act
        for i in 0..100 {
            log.push(format!("entry {i}"));
            // Assert – the cap holds after every push
            assert!(log.len() <= ACTIVITY_LOG_CAPACITY);
        }

        assert_eq!(log.len(), ACTIVITY_LOG_CAPACITY);
    }

    #[test]
    fn test_twenty_first_push_evicts_oldest() {
        // Arrange
        let mut log = ActivityLog::new();
        for i in 0..20 {
            log.push_at(i, format!("entry {i}"));
        }

        // Act
        log.push_at(20, "entry 20");

        // Assert
        assert_eq!(log.len(), 20);
        assert_eq!(log.iter().next().unwrap().text, "entry 1");
        assert_eq!(log.iter().last().unwrap().text, "entry 20");
    }

    #[test]
    fn test_latest_first_reverses_order() {
        let mut log = ActivityLog::new();
        log.push_at(1, "a");
        log.push_at(2, "b");
        let texts: Vec<_> = log.latest_first().into_iter().map(|e| e.text).collect();
        assert_eq!(texts, vec!["b", "a"]);
    }

    #[test]
    fn test_push_returns_new_entry() {
        let mut log = ActivityLog::new();
        let entry = log.push_at(42, "hello");
        assert_eq!(entry.timestamp_us, 42);
        assert_eq!(entry.text, "hello");
    }

    #[test]
    fn test_zero_capacity_is_clamped_to_one() {
        let mut log = ActivityLog::with_capacity(0);
        log.push("a");
        log.push("b");
        assert_eq!(log.len(), 1);
        assert_eq!(log.iter().next().unwrap().text, "b");
    }

    #[test]
    fn test_current_timestamp_us_is_positive() {
        assert!(current_timestamp_us() > 0);
    }
}
