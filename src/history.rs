//! Bounded log of recent analyses
//!
//! Owned by the host and fed explicitly; nothing in the analyzer records
//! history on its own.

use std::collections::VecDeque;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::analyzer::AnalysisResult;
use crate::calibration::StatusLevel;

/// Summary of one recorded analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// 1-based, never reused
    pub id: u64,
    pub timestamp: DateTime<Local>,
    pub status: StatusLevel,
    pub label: String,
    pub confidence: f64,
    pub days_remaining: String,
}

/// Keeps the newest `capacity` entries
#[derive(Debug, Clone)]
pub struct AnalysisHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    total: u64,
}

impl AnalysisHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            total: 0,
        }
    }

    /// Append a summary of `result`, evicting the oldest entry when full
    pub fn record(&mut self, result: &AnalysisResult) -> HistoryEntry {
        self.total += 1;
        let entry = HistoryEntry {
            id: self.total,
            timestamp: result.timestamp,
            status: result.analysis.status,
            label: result.analysis.label.clone(),
            confidence: result.analysis.confidence,
            days_remaining: result.analysis.days_remaining.clone(),
        };

        if self.capacity > 0 {
            if self.entries.len() == self.capacity {
                self.entries.pop_front();
            }
            self.entries.push_back(entry.clone());
        }
        entry
    }

    /// Up to `n` newest entries, oldest first
    pub fn recent(&self, n: usize) -> Vec<HistoryEntry> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }

    /// Number of analyses ever recorded, including evicted ones
    pub fn total(&self) -> u64 {
        self.total
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
