//! Search progress hooks.
//!
//! Observers receive one event per examined attempt and one report per
//! finished tier, always in attempt order and from the calling thread,
//! even when attempts are generated in parallel.

use super::runner::{Strategy, TierReport};
use super::score::CandidateScore;
use std::sync::Mutex;

/// One examined candidate attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttemptEvent {
    /// Tier the attempt belongs to.
    pub strategy: Strategy,
    /// Zero-based attempt index within the tier.
    pub attempt: usize,
    /// Score of the attempt.
    pub score: CandidateScore,
    /// The attempt replaced the tier's best candidate.
    pub improved: bool,
}

/// Receives progress callbacks from [`GroupingRunner`](super::GroupingRunner).
///
/// Both methods default to no-ops. Useful for logging, UI progress, or
/// collecting statistics in tests.
pub trait SearchObserver {
    fn on_attempt(&self, _event: &AttemptEvent) {}

    fn on_tier_complete(&self, _report: &TierReport) {}
}

/// Ignores every callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// Records every callback for later inspection.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    attempts: Mutex<Vec<AttemptEvent>>,
    tiers: Mutex<Vec<TierReport>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt events received so far.
    pub fn attempts(&self) -> Vec<AttemptEvent> {
        self.attempts
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Tier reports received so far.
    pub fn tiers(&self) -> Vec<TierReport> {
        self.tiers
            .lock()
            .map(|reports| reports.clone())
            .unwrap_or_default()
    }
}

impl SearchObserver for RecordingObserver {
    fn on_attempt(&self, event: &AttemptEvent) {
        if let Ok(mut events) = self.attempts.lock() {
            events.push(*event);
        }
    }

    fn on_tier_complete(&self, report: &TierReport) {
        if let Ok(mut reports) = self.tiers.lock() {
            reports.push(report.clone());
        }
    }
}
