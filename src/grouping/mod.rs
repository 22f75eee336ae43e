//! Tiered group assignment.
//!
//! Partitions a roster into balanced groups with a bounded multi-start
//! greedy search. Each attempt shuffles the roster, places the hardest
//! students first, and scores every placement; the best attempt per tier
//! is kept by a fixed lexicographic comparator.
//!
//! # Key Types
//!
//! - [`GroupingConfig`]: feature flags, attempt budget, scoring weights
//! - [`GroupingRunner`]: runs the strict, relaxed and forced tiers
//! - [`GroupingResult`]: groups, strategy tag and residual counts
//! - [`GroupingProblem`]: precomputed context that builds single candidates
//! - [`CandidateScore`]: the comparator key of one candidate
//! - [`SearchObserver`]: progress hooks for logging and statistics

mod candidate;
mod config;
mod observer;
mod runner;
mod score;

pub use candidate::{Candidate, GeneratedGroup, GroupingProblem, TierRules};
pub use config::{GroupingConfig, ScoreWeights};
pub use observer::{AttemptEvent, NoopObserver, RecordingObserver, SearchObserver};
pub use runner::{GroupingResult, GroupingRunner, Strategy, TierReport};
pub use score::CandidateScore;
