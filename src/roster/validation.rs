//! Pre-flight roster checks.
//!
//! The engine works on roster positions and tolerates any input, but
//! duplicate or blank ids make separation lists ambiguous. Callers can
//! run [`validate_roster`] before grouping to surface those problems.

use super::student::StudentRecord;
use std::collections::HashMap;

/// Roster validation result.
pub type RosterValidation = Result<(), Vec<RosterError>>;

/// A roster problem.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterError {
    /// Error category.
    pub kind: RosterErrorKind,
    /// Roster position of the offending record.
    pub index: usize,
    /// Human-readable description.
    pub message: String,
}

/// Categories of roster problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterErrorKind {
    /// Id is empty or whitespace.
    BlankId,
    /// Id already used by an earlier record.
    DuplicateId,
}

impl RosterError {
    fn new(kind: RosterErrorKind, index: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            index,
            message: message.into(),
        }
    }
}

/// Validates roster ids.
///
/// Checks:
/// 1. No blank ids
/// 2. No duplicate ids
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with every detected issue.
pub fn validate_roster(roster: &[StudentRecord]) -> RosterValidation {
    let mut errors = Vec::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for (i, student) in roster.iter().enumerate() {
        if student.id.trim().is_empty() {
            errors.push(RosterError::new(
                RosterErrorKind::BlankId,
                i,
                format!("student at position {i} has a blank id"),
            ));
            continue;
        }
        if let Some(&first) = seen.get(student.id.as_str()) {
            errors.push(RosterError::new(
                RosterErrorKind::DuplicateId,
                i,
                format!(
                    "duplicate student id '{}' at positions {first} and {i}",
                    student.id
                ),
            ));
        } else {
            seen.insert(student.id.as_str(), i);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
