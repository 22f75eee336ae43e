//! Candidate scoring and comparison.
//!
//! Final penalties are recomputed from the finished groups rather than
//! accumulated during placement, so two candidates with the same groups
//! always compare equal regardless of the order students were placed in.

use super::candidate::GroupingProblem;
use std::cmp::Ordering;

const PERFECT_EPS: f64 = 1e-12;

/// Quality of one finished candidate. Every component is lower-is-better.
///
/// Candidates are ranked lexicographically by [`CandidateScore::compare`]:
/// unassigned count, then separation conflicts, then support-partner,
/// gender and ability penalties. Correctness always outranks balance.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CandidateScore {
    /// Students that could not be placed.
    pub unassigned: usize,
    /// Separation pairs sharing a group.
    pub separation_conflicts: usize,
    /// Needs-help students in a group without a support partner.
    pub support_partner_penalty: f64,
    /// Deviation of per-group gender counts from the roster share.
    pub gender_penalty: f64,
    /// Deviation of per-group needs-help ratios from the roster ratio.
    pub ability_penalty: f64,
}

impl CandidateScore {
    /// Total order used to pick the best candidate. `Less` means better.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::cmp::Ordering;
    /// use u_grouping::grouping::CandidateScore;
    ///
    /// let clean = CandidateScore { gender_penalty: 9.0, ..Default::default() };
    /// let conflicted = CandidateScore { separation_conflicts: 1, ..Default::default() };
    /// assert_eq!(clean.compare(&conflicted), Ordering::Less);
    /// ```
    pub fn compare(&self, other: &Self) -> Ordering {
        self.unassigned
            .cmp(&other.unassigned)
            .then(self.separation_conflicts.cmp(&other.separation_conflicts))
            .then(
                self.support_partner_penalty
                    .total_cmp(&other.support_partner_penalty),
            )
            .then(self.gender_penalty.total_cmp(&other.gender_penalty))
            .then(self.ability_penalty.total_cmp(&other.ability_penalty))
    }

    /// Returns `true` if `self` ranks strictly ahead of `other`.
    pub fn is_better_than(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Less
    }

    /// Every student placed, no conflicts, no penalties. Nothing can beat this.
    pub fn is_perfect(&self) -> bool {
        self.unassigned == 0
            && self.separation_conflicts == 0
            && self.support_partner_penalty <= PERFECT_EPS
            && self.gender_penalty <= PERFECT_EPS
            && self.ability_penalty <= PERFECT_EPS
    }
}

/// Scores finished groups from scratch.
pub(crate) fn evaluate(
    problem: &GroupingProblem<'_>,
    groups: &[Vec<usize>],
    unassigned: usize,
) -> CandidateScore {
    let config = problem.config();
    CandidateScore {
        unassigned,
        separation_conflicts: problem.separations().count_conflicts(groups),
        support_partner_penalty: if config.pair_support_partners {
            support_partner_penalty(problem, groups)
        } else {
            0.0
        },
        gender_penalty: if config.balance_gender {
            gender_penalty(problem, groups)
        } else {
            0.0
        },
        ability_penalty: if config.balance_ability {
            ability_penalty(problem, groups)
        } else {
            0.0
        },
    }
}

fn support_partner_penalty(problem: &GroupingProblem<'_>, groups: &[Vec<usize>]) -> f64 {
    let roster = problem.roster();
    groups
        .iter()
        .filter(|members| !members.iter().any(|&m| roster[m].is_support_partner))
        .map(|members| {
            members
                .iter()
                .filter(|&&m| roster[m].needs_help && !roster[m].is_support_partner)
                .count()
        })
        .sum::<usize>() as f64
}

fn gender_penalty(problem: &GroupingProblem<'_>, groups: &[Vec<usize>]) -> f64 {
    let mut counts = vec![0usize; problem.gender_bucket_count()];
    let mut penalty = 0.0;
    for members in groups {
        counts.fill(0);
        for &m in members {
            counts[problem.gender_bucket(m)] += 1;
        }
        for (bucket, &count) in counts.iter().enumerate() {
            let target = problem.gender_target(bucket, members.len());
            let ceiling = problem.gender_ceiling(bucket, members.len());
            penalty += (count as f64 - target).abs();
            penalty += count.saturating_sub(ceiling) as f64;
        }
    }
    penalty
}

fn ability_penalty(problem: &GroupingProblem<'_>, groups: &[Vec<usize>]) -> f64 {
    let roster = problem.roster();
    let target = problem.needs_help_ratio();
    groups
        .iter()
        .filter(|members| !members.is_empty())
        .map(|members| {
            let needs_help = members.iter().filter(|&&m| roster[m].needs_help).count();
            (needs_help as f64 / members.len() as f64 - target).abs()
        })
        .sum()
}
