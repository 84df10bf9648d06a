//! Scoring history for howlround detection
//!
//! - Entry = one completed analysis
//! - Buffer = bounded ring, oldest evicted first
//! - Window = most recent entries handed to the pattern detectors

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Severity;

/// Default ring capacity
pub const HISTORY_CAPACITY: usize = 20;

/// One completed analysis as seen by the guard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    /// Pipeline score before attenuation (what the detectors look at)
    pub score: f64,
    /// Score returned to the caller
    pub final_score: f64,
    pub pattern_count: usize,
    pub severity: Severity,
    pub attenuation_applied: bool,
    /// SHA-256 prefix of the normalized input
    pub input_digest: String,
}

impl HistoryEntry {
    /// Entry for a score that has not been attenuated (yet)
    pub fn new(score: f64, pattern_count: usize, input_digest: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            score,
            final_score: score,
            pattern_count,
            severity: Severity::from_score(score),
            attenuation_applied: false,
            input_digest: input_digest.into(),
        }
    }

    /// (rounded score, pattern count, severity) used for repetition checks
    pub fn signature(&self) -> (i64, usize, Severity) {
        (self.score.round() as i64, self.pattern_count, self.severity)
    }
}

/// Bounded FIFO of recent entries
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    total_recorded: u64,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryBuffer {
    /// Buffer with the default capacity (20)
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            total_recorded: 0,
        }
    }

    /// Append and evict the oldest entries beyond capacity
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        self.total_recorded += 1;
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Up to `n` most recent entries, oldest first
    pub fn recent(&self, n: usize) -> Vec<HistoryEntry> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
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

    /// Entries ever appended, including evicted ones
    pub fn total_recorded(&self) -> u64 {
        self.total_recorded
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(score: f64) -> HistoryEntry {
        HistoryEntry::new(score, 1, "00")
    }

    #[test]
    fn test_push_and_len() {
        let mut buffer = HistoryBuffer::new();
        assert!(buffer.is_empty());
        buffer.push(entry(10.0));
        buffer.push(entry(20.0));
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_fifo_eviction() {
        let mut buffer = HistoryBuffer::with_capacity(3);
        for s in [1.0, 2.0, 3.0, 4.0, 5.0] {
            buffer.push(entry(s));
        }
        let scores: Vec<f64> = buffer.entries().map(|e| e.score).collect();
        assert_eq!(scores, vec![3.0, 4.0, 5.0]);
        assert_eq!(buffer.total_recorded(), 5);
    }

    #[test]
    fn test_recent_is_oldest_first() {
        let mut buffer = HistoryBuffer::new();
        for s in [1.0, 2.0, 3.0, 4.0] {
            buffer.push(entry(s));
        }
        let recent: Vec<f64> = buffer.recent(2).iter().map(|e| e.score).collect();
        assert_eq!(recent, vec![3.0, 4.0]);
        assert_eq!(buffer.recent(10).len(), 4);
    }

    #[test]
    fn test_signature_rounds_score() {
        let a = HistoryEntry::new(84.6, 2, "aa");
        let b = HistoryEntry::new(85.4, 2, "bb");
        assert_eq!(a.signature(), b.signature());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut buffer = HistoryBuffer::with_capacity(0);
        buffer.push(entry(1.0));
        buffer.push(entry(2.0));
        assert_eq!(buffer.len(), 1);
    }
}
