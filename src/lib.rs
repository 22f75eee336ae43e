//! Constraint-aware student group assignment.
//!
//! Splits a roster of students into small, evenly sized groups while
//! honoring pairwise separation rules and balancing gender, ability and
//! support-partner coverage:
//!
//! - **Partitioning**: target group sizes that differ by at most one.
//! - **Roster**: student records, open gender buckets, and the symmetric
//!   separation set derived from them.
//! - **Grouping**: randomized greedy candidates, a fixed comparator, and a
//!   strict → relaxed → forced escalation that always reports how much
//!   relaxation was needed.
//!
//! # Quick Start
//!
//! ```
//! use u_grouping::grouping::{GroupingConfig, GroupingRunner, Strategy};
//! use u_grouping::roster::StudentRecord;
//!
//! let roster = vec![
//!     StudentRecord::new("a", "Ada").with_gender("F").with_separation("b"),
//!     StudentRecord::new("b", "Ben").with_gender("M"),
//!     StudentRecord::new("c", "Cy").with_gender("M"),
//!     StudentRecord::new("d", "Di").with_gender("F"),
//! ];
//! let config = GroupingConfig::default()
//!     .with_preferred_group_size(2)
//!     .with_respect_separations(true)
//!     .with_balance_gender(true)
//!     .with_seed(1);
//!
//! let result = GroupingRunner::run(&roster, &config);
//! assert_eq!(result.strategy, Strategy::Strict);
//! assert_eq!(result.separation_conflicts, 0);
//! ```
//!
//! # Architecture
//!
//! The search is single-threaded and synchronous by default. Attempts
//! share no state, so the `parallel` feature can fan them out with rayon
//! without changing results. Persistence, rendering and roster editing
//! belong to the caller.

pub mod grouping;
pub mod partition;
pub mod random;
pub mod roster;
