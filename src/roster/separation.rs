//! Separation constraints between students.
//!
//! A [`SeparationSet`] is the symmetric, self-free, deduplicated set of
//! student pairs that must not share a group. Pairs are stored by roster
//! position so that scoring never touches string ids.

use super::student::{StudentId, StudentRecord};
use std::collections::{BTreeSet, HashMap};

/// Unordered pair of student ids that must be kept apart.
///
/// The lexicographically smaller id is always stored in `first`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintPair {
    pub first: StudentId,
    pub second: StudentId,
}

impl ConstraintPair {
    /// Creates a normalized pair. Returns `None` for a self-pair.
    pub fn new(a: impl Into<StudentId>, b: impl Into<StudentId>) -> Option<Self> {
        let (a, b) = (a.into(), b.into());
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { first: a, second: b }),
            std::cmp::Ordering::Greater => Some(Self { first: b, second: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Returns `true` if `id` is one side of the pair.
    pub fn involves(&self, id: &str) -> bool {
        self.first == id || self.second == id
    }
}

/// Symmetric separation constraints over roster positions.
///
/// # Examples
///
/// ```
/// use u_grouping::roster::{SeparationSet, StudentRecord};
///
/// let roster = vec![
///     StudentRecord::new("a", "A").with_separation("b"),
///     StudentRecord::new("b", "B").with_separation("a"),
///     StudentRecord::new("c", "C").with_separation("ghost"),
/// ];
///
/// let set = SeparationSet::build(&roster, true);
/// assert_eq!(set.len(), 1);
/// assert!(set.contains(0, 1) && set.contains(1, 0));
/// assert_eq!(set.degree(2), 0);
///
/// assert!(SeparationSet::build(&roster, false).is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SeparationSet {
    pairs: BTreeSet<(usize, usize)>,
    adjacency: Vec<Vec<usize>>,
}

impl SeparationSet {
    /// Creates a set with no constraints for a roster of `n` students.
    pub fn empty(n: usize) -> Self {
        Self {
            pairs: BTreeSet::new(),
            adjacency: vec![Vec::new(); n],
        }
    }

    /// Derives the constraint set from each student's separation list.
    ///
    /// When `respect_separations` is `false` the set is empty and no tier
    /// enforces or penalizes separations. Ids that are not on the roster
    /// and self-references are skipped. With duplicate roster ids, the
    /// last occurrence wins the lookup.
    pub fn build(roster: &[StudentRecord], respect_separations: bool) -> Self {
        let mut set = Self::empty(roster.len());
        if !respect_separations {
            return set;
        }

        let index: HashMap<&str, usize> = roster
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.as_str(), i))
            .collect();

        for (i, student) in roster.iter().enumerate() {
            for other in &student.separate_from {
                if let Some(&j) = index.get(other.as_str()) {
                    set.insert(i, j);
                }
            }
        }
        set
    }

    /// Inserts a pair by roster position. Self-pairs are ignored.
    ///
    /// Returns `true` if the pair was new.
    pub fn insert(&mut self, a: usize, b: usize) -> bool {
        if a == b {
            return false;
        }
        let needed = a.max(b) + 1;
        if self.adjacency.len() < needed {
            self.adjacency.resize(needed, Vec::new());
        }
        let inserted = self.pairs.insert((a.min(b), a.max(b)));
        if inserted {
            self.adjacency[a].push(b);
            self.adjacency[b].push(a);
        }
        inserted
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns `true` if students `a` and `b` must be kept apart.
    pub fn contains(&self, a: usize, b: usize) -> bool {
        a != b && self.pairs.contains(&(a.min(b), a.max(b)))
    }

    /// Number of pairs touching student `i`.
    pub fn degree(&self, i: usize) -> usize {
        self.adjacency.get(i).map_or(0, Vec::len)
    }

    /// Positions of the students `i` must be kept apart from.
    pub fn partners(&self, i: usize) -> &[usize] {
        self.adjacency.get(i).map_or(&[], Vec::as_slice)
    }

    /// Iterates normalized `(low, high)` position pairs in ascending order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pairs.iter().copied()
    }

    /// Resolves every pair to student ids.
    pub fn id_pairs(&self, roster: &[StudentRecord]) -> Vec<ConstraintPair> {
        self.pairs()
            .filter_map(|(a, b)| {
                let (sa, sb) = (roster.get(a)?, roster.get(b)?);
                ConstraintPair::new(sa.id.clone(), sb.id.clone())
            })
            .collect()
    }

    /// Counts how many members of `members` are separation partners of `i`.
    pub fn conflicts_with(&self, i: usize, members: &[usize]) -> usize {
        members.iter().filter(|&&m| self.contains(i, m)).count()
    }

    /// Counts violated pairs across finished groups by a full pairwise scan.
    pub fn count_conflicts(&self, groups: &[Vec<usize>]) -> usize {
        if self.is_empty() {
            return 0;
        }
        groups
            .iter()
            .map(|members| {
                let mut count = 0;
                for (k, &a) in members.iter().enumerate() {
                    for &b in &members[k + 1..] {
                        if self.contains(a, b) {
                            count += 1;
                        }
                    }
                }
                count
            })
            .sum()
    }
}
