//! Student records consumed by the grouping engine.

use std::fmt;

/// Stable student identifier supplied by the roster owner.
pub type StudentId = String;

/// Open gender bucket.
///
/// Callers may supply any token; the engine only ever compares buckets
/// for equality, byte for byte. An empty token or exactly `unspecified`
/// maps to [`Gender::Unspecified`], which is balanced like any other
/// bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "String", into = "String")
)]
pub enum Gender {
    /// No gender recorded.
    #[default]
    Unspecified,
    /// Caller-supplied token.
    Tag(String),
}

impl Gender {
    /// Token used for [`Gender::Unspecified`] when rendered.
    pub const UNSPECIFIED: &'static str = "unspecified";

    /// Parses a caller-supplied token.
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        if token.is_empty() || token == Self::UNSPECIFIED {
            Gender::Unspecified
        } else {
            Gender::Tag(token)
        }
    }

    /// Returns the token for this bucket.
    pub fn as_str(&self) -> &str {
        match self {
            Gender::Unspecified => Self::UNSPECIFIED,
            Gender::Tag(tag) => tag,
        }
    }

    pub fn is_unspecified(&self) -> bool {
        matches!(self, Gender::Unspecified)
    }
}

impl From<&str> for Gender {
    fn from(token: &str) -> Self {
        Gender::new(token)
    }
}

impl From<String> for Gender {
    fn from(token: String) -> Self {
        Gender::new(token)
    }
}

impl From<Gender> for String {
    fn from(gender: Gender) -> Self {
        match gender {
            Gender::Unspecified => Gender::UNSPECIFIED.to_string(),
            Gender::Tag(tag) => tag,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A student on the roster.
///
/// Records are owned by the caller and never mutated by the engine.
/// `name` is carried through untouched for display.
///
/// # Examples
///
/// ```
/// use u_grouping::roster::{Gender, StudentRecord};
///
/// let s = StudentRecord::new("s1", "Ada")
///     .with_gender("F")
///     .with_needs_help(true)
///     .with_separation("s7");
///
/// assert_eq!(s.gender, Gender::Tag("F".into()));
/// assert_eq!(s.separate_from, vec!["s7".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StudentRecord {
    /// Stable unique identifier.
    pub id: StudentId,

    /// Display name, pass-through only.
    pub name: String,

    /// Gender bucket used for balancing.
    #[cfg_attr(feature = "serde", serde(default))]
    pub gender: Gender,

    /// Student needs academic support.
    #[cfg_attr(feature = "serde", serde(default))]
    pub needs_help: bool,

    /// Student can assist a needs-help peer in the same group.
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_support_partner: bool,

    /// Ids of students this one must not share a group with.
    ///
    /// Unknown ids and the student's own id are ignored.
    #[cfg_attr(feature = "serde", serde(default))]
    pub separate_from: Vec<StudentId>,
}

impl StudentRecord {
    /// Creates a record with no flags, no separations and an unspecified gender.
    pub fn new(id: impl Into<StudentId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            gender: Gender::Unspecified,
            needs_help: false,
            is_support_partner: false,
            separate_from: Vec::new(),
        }
    }

    pub fn with_gender(mut self, gender: impl Into<Gender>) -> Self {
        self.gender = gender.into();
        self
    }

    pub fn with_needs_help(mut self, needs_help: bool) -> Self {
        self.needs_help = needs_help;
        self
    }

    pub fn with_support_partner(mut self, is_support_partner: bool) -> Self {
        self.is_support_partner = is_support_partner;
        self
    }

    /// Adds one id to the separation list.
    pub fn with_separation(mut self, other: impl Into<StudentId>) -> Self {
        self.separate_from.push(other.into());
        self
    }

    /// Replaces the separation list.
    pub fn with_separations<I, S>(mut self, others: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StudentId>,
    {
        self.separate_from = others.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_parsing() {
        assert_eq!(Gender::new(""), Gender::Unspecified);
        assert_eq!(Gender::new("unspecified"), Gender::Unspecified);
        assert_eq!(Gender::new("F"), Gender::Tag("F".into()));
        // Tokens are kept verbatim.
        assert_eq!(Gender::new("  "), Gender::Tag("  ".into()));
        assert_eq!(Gender::new("Unspecified"), Gender::Tag("Unspecified".into()));
        assert_eq!(Gender::new(" nb "), Gender::Tag(" nb ".into()));
        assert_ne!(Gender::new("F"), Gender::new("F "));
        assert_ne!(Gender::new("F"), Gender::new("f"));
    }

    #[test]
    fn test_gender_is_open() {
        let a = Gender::from("x-custom");
        let b = Gender::from("x-custom".to_string());
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "x-custom");
        assert_eq!(Gender::Unspecified.to_string(), "unspecified");
    }

    #[test]
    fn test_gender_string_roundtrip() {
        let s: String = Gender::new("M").into();
        assert_eq!(s, "M");
        let s: String = Gender::Unspecified.into();
        assert_eq!(Gender::from(s), Gender::Unspecified);
    }

    #[test]
    fn test_record_builder() {
        let s = StudentRecord::new("a", "Alice")
            .with_gender("F")
            .with_support_partner(true)
            .with_separations(["b", "c"]);
        assert_eq!(s.id, "a");
        assert_eq!(s.name, "Alice");
        assert!(s.is_support_partner);
        assert!(!s.needs_help);
        assert_eq!(s.separate_from, vec!["b".to_string(), "c".to_string()]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_record_deserialize_defaults() {
        let json = r#"{"id":"s1","name":"Ada","gender":"F"}"#;
        let s: StudentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(s.gender, Gender::Tag("F".into()));
        assert!(s.separate_from.is_empty());

        let json = r#"{"id":"s2","name":"Bo"}"#;
        let s: StudentRecord = serde_json::from_str(json).unwrap();
        assert!(s.gender.is_unspecified());
    }
}
