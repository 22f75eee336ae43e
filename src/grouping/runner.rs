//! Tiered grouping search.
//!
//! [`GroupingRunner`] escalates through three tiers, each given the same
//! attempt budget:
//!
//! 1. **Strict**: separations are hard, nobody is forced.
//! 2. **Relaxed constraints**: separations become a heavy penalty.
//! 3. **Forced placement**: leftovers go to the smallest groups.
//!
//! The first tier whose best candidate places everyone wins. If even the
//! forced tier leaves students over, the result is tagged
//! [`Strategy::Failed`]. Unsatisfiable constraints are reported through
//! the tag and counts, never as an error.

use super::candidate::{Candidate, GroupingProblem, TierRules};
use super::config::GroupingConfig;
use super::observer::{AttemptEvent, NoopObserver, SearchObserver};
use super::score::CandidateScore;
use crate::random::{create_rng, draw_seeds};
use crate::roster::StudentRecord;
use rand::Rng;
use std::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How much relaxation was needed to reach a complete assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Strategy {
    /// Every separation honored.
    Strict,
    /// Separations were allowed at a cost.
    RelaxedConstraints,
    /// Leftover students were pushed into groups regardless of rules.
    ForcedPlacement,
    /// Students remain unassigned.
    Failed,
}

impl Strategy {
    /// Search tiers and their placement rules, in escalation order.
    pub const TIERS: [(Strategy, TierRules); 3] = [
        (Strategy::Strict, TierRules::STRICT),
        (Strategy::RelaxedConstraints, TierRules::RELAXED),
        (Strategy::ForcedPlacement, TierRules::FORCED),
    ];

    /// Placement rules of a search tier. `None` for [`Strategy::Failed`].
    pub fn rules(self) -> Option<TierRules> {
        match self {
            Strategy::Strict => Some(TierRules::STRICT),
            Strategy::RelaxedConstraints => Some(TierRules::RELAXED),
            Strategy::ForcedPlacement => Some(TierRules::FORCED),
            Strategy::Failed => None,
        }
    }

    /// Stable tag for consumers.
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Strict => "strict",
            Strategy::RelaxedConstraints => "relaxedConstraints",
            Strategy::ForcedPlacement => "forcedPlacement",
            Strategy::Failed => "failed",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one executed tier.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TierReport {
    pub strategy: Strategy,
    /// Attempts examined. Less than the budget when a perfect candidate
    /// ended the tier early.
    pub attempts: usize,
    /// Score of the tier's best candidate.
    pub best: CandidateScore,
}

/// Final grouping handed back to the caller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupingResult {
    /// Non-empty groups of full records, in group order.
    pub groups: Vec<Vec<StudentRecord>>,

    /// Students left out. Empty unless the strategy is [`Strategy::Failed`].
    pub unassigned: Vec<StudentRecord>,

    /// Tier that produced the groups.
    pub strategy: Strategy,

    /// Separation pairs sharing a group.
    pub separation_conflicts: usize,

    /// Number of students left out.
    pub unassigned_count: usize,

    /// Full score of the selected candidate.
    pub score: CandidateScore,

    /// One report per executed tier, in execution order.
    pub tiers: Vec<TierReport>,
}

impl GroupingResult {
    fn empty() -> Self {
        Self {
            groups: Vec::new(),
            unassigned: Vec::new(),
            strategy: Strategy::Strict,
            separation_conflicts: 0,
            unassigned_count: 0,
            score: CandidateScore::default(),
            tiers: Vec::new(),
        }
    }

    fn from_candidate(
        roster: &[StudentRecord],
        candidate: Candidate,
        strategy: Strategy,
        tiers: Vec<TierReport>,
    ) -> Self {
        let resolve = |members: &[usize]| -> Vec<StudentRecord> {
            members.iter().map(|&i| roster[i].clone()).collect()
        };
        Self {
            groups: candidate.groups.iter().map(|g| resolve(g)).collect(),
            unassigned: resolve(&candidate.unassigned),
            strategy,
            separation_conflicts: candidate.score.separation_conflicts,
            unassigned_count: candidate.score.unassigned,
            score: candidate.score,
            tiers,
        }
    }

    /// Every student was placed.
    pub fn is_complete(&self) -> bool {
        self.unassigned_count == 0
    }

    /// Group members as ids.
    pub fn group_ids(&self) -> Vec<Vec<&str>> {
        self.groups
            .iter()
            .map(|g| g.iter().map(|s| s.id.as_str()).collect())
            .collect()
    }
}

/// Best-so-far fold over the attempts of one tier.
struct TierSearch {
    strategy: Strategy,
    best: Candidate,
    attempts: usize,
}

impl TierSearch {
    /// Starts the fold from the tier's first attempt.
    fn start<O: SearchObserver + ?Sized>(
        strategy: Strategy,
        first: Candidate,
        observer: &O,
    ) -> Self {
        observer.on_attempt(&AttemptEvent {
            strategy,
            attempt: 0,
            score: first.score,
            improved: true,
        });
        Self {
            strategy,
            best: first,
            attempts: 1,
        }
    }

    fn is_done(&self) -> bool {
        self.best.score.is_perfect()
    }

    /// Folds one candidate in. Returns `true` once nothing can improve.
    fn offer<O: SearchObserver + ?Sized>(&mut self, candidate: Candidate, observer: &O) -> bool {
        let improved = candidate.score.is_better_than(&self.best.score);

        observer.on_attempt(&AttemptEvent {
            strategy: self.strategy,
            attempt: self.attempts,
            score: candidate.score,
            improved,
        });
        self.attempts += 1;

        if improved {
            self.best = candidate;
        }
        self.is_done()
    }
}

/// Executes the tiered grouping search.
///
/// # Usage
///
/// ```
/// use u_grouping::grouping::{GroupingConfig, GroupingRunner, Strategy};
/// use u_grouping::roster::StudentRecord;
///
/// let roster: Vec<_> = (0..12)
///     .map(|i| StudentRecord::new(format!("s{i}"), format!("Student {i}")))
///     .collect();
/// let config = GroupingConfig::default().with_seed(42);
///
/// let result = GroupingRunner::run(&roster, &config);
/// assert_eq!(result.strategy, Strategy::Strict);
/// assert_eq!(result.groups.len(), 3);
/// assert!(result.groups.iter().all(|g| g.len() == 4));
/// ```
pub struct GroupingRunner;

impl GroupingRunner {
    /// Runs the search seeded from `config.seed`, or a random seed.
    pub fn run(roster: &[StudentRecord], config: &GroupingConfig) -> GroupingResult {
        let mut rng = create_rng(config.seed.unwrap_or_else(rand::random));
        Self::run_with_rng(roster, config, &mut rng)
    }

    /// Runs the search drawing all randomness from `rng`.
    ///
    /// Identical inputs and an identical random sequence give identical
    /// output. `config.seed` is ignored.
    pub fn run_with_rng<R: Rng + ?Sized>(
        roster: &[StudentRecord],
        config: &GroupingConfig,
        rng: &mut R,
    ) -> GroupingResult {
        Self::run_observed(roster, config, rng, &NoopObserver)
    }

    /// Runs the search, reporting progress to `observer`.
    pub fn run_observed<R, O>(
        roster: &[StudentRecord],
        config: &GroupingConfig,
        rng: &mut R,
        observer: &O,
    ) -> GroupingResult
    where
        R: Rng + ?Sized,
        O: SearchObserver + ?Sized,
    {
        if roster.is_empty() {
            return GroupingResult::empty();
        }

        let problem = GroupingProblem::new(roster, config);
        let attempts = config.effective_attempts();
        let mut tiers = Vec::with_capacity(Strategy::TIERS.len());
        let [strict, relaxed, (forced, forced_rules)] = Strategy::TIERS;

        for (strategy, rules) in [strict, relaxed] {
            let best =
                execute_tier(&problem, strategy, rules, attempts, rng, observer, &mut tiers);
            if best.score.unassigned == 0 {
                return GroupingResult::from_candidate(roster, best, strategy, tiers);
            }
        }

        let best = execute_tier(
            &problem,
            forced,
            forced_rules,
            attempts,
            rng,
            observer,
            &mut tiers,
        );
        let strategy = if best.score.unassigned == 0 {
            forced
        } else {
            Strategy::Failed
        };
        GroupingResult::from_candidate(roster, best, strategy, tiers)
    }
}

/// Runs one tier, reports it, and hands back its best candidate.
fn execute_tier<R, O>(
    problem: &GroupingProblem<'_>,
    strategy: Strategy,
    rules: TierRules,
    attempts: usize,
    rng: &mut R,
    observer: &O,
    tiers: &mut Vec<TierReport>,
) -> Candidate
where
    R: Rng + ?Sized,
    O: SearchObserver + ?Sized,
{
    let first_seed = rng.random::<u64>();
    let rest = draw_seeds(rng, attempts.saturating_sub(1));
    let search = run_tier(problem, strategy, rules, first_seed, &rest, observer);

    let report = TierReport {
        strategy,
        attempts: search.attempts,
        best: search.best.score,
    };
    observer.on_tier_complete(&report);
    tiers.push(report);
    search.best
}

/// Runs every attempt of one tier, one private generator per seed.
fn run_tier<O: SearchObserver + ?Sized>(
    problem: &GroupingProblem<'_>,
    strategy: Strategy,
    rules: TierRules,
    first_seed: u64,
    seeds: &[u64],
    observer: &O,
) -> TierSearch {
    let first = problem.generate(rules, &mut create_rng(first_seed));
    let mut search = TierSearch::start(strategy, first, observer);
    if search.is_done() {
        return search;
    }

    #[cfg(feature = "parallel")]
    {
        if problem.config().parallel {
            let candidates: Vec<Candidate> = seeds
                .par_iter()
                .map(|&seed| problem.generate(rules, &mut create_rng(seed)))
                .collect();
            for candidate in candidates {
                if search.offer(candidate, observer) {
                    break;
                }
            }
            return search;
        }
    }

    for &seed in seeds {
        let candidate = problem.generate(rules, &mut create_rng(seed));
        if search.offer(candidate, observer) {
            break;
        }
    }
    search
}
