//! Roster input: student records and the constraints derived from them.
//!
//! # Key Types
//!
//! - [`StudentRecord`]: one student as supplied by the roster owner
//! - [`Gender`]: open, string-backed gender bucket
//! - [`SeparationSet`]: symmetric "keep apart" pairs over roster positions
//! - [`ConstraintPair`]: a separation pair expressed in student ids

mod separation;
mod student;
mod validation;

pub use separation::{ConstraintPair, SeparationSet};
pub use student::{Gender, StudentId, StudentRecord};
pub use validation::{validate_roster, RosterError, RosterErrorKind, RosterValidation};
