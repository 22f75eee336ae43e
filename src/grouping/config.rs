//! Grouping configuration.
//!
//! [`GroupingConfig`] holds the feature flags, attempt budget and scoring
//! weights that control a grouping run.

use crate::partition::{MAX_GROUP_SIZE, MIN_GROUP_SIZE};

/// Weights of the per-placement composite score.
///
/// Lower composite scores are preferred. The magnitudes are empirically
/// tuned; what matters is their ordering:
/// conflict avoidance ≫ hard gender cap > soft balancing > fill ratio.
/// [`GroupingConfig::validate`] rejects weights that break this ordering.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScoreWeights {
    /// Multiplier on `current_size / target_size`.
    pub fill: f64,

    /// Cost per separation partner already in the group (relaxed tiers only).
    pub conflict: f64,

    /// Multiplier on the needs-help ratio deviation.
    pub ability: f64,

    /// Multiplier on the gender count deviation.
    pub gender: f64,

    /// Flat cost when a gender bucket exceeds its ceiling share.
    pub gender_cap_base: f64,

    /// Additional cost per member above the ceiling share.
    pub gender_cap_step: f64,

    /// Cost when a needs-help student is left without a support partner.
    pub unmatched_needs_help: f64,

    /// Bonus (subtracted) when a support partner joins an unmatched group.
    pub partner_joins_unmatched: f64,

    /// Bonus (subtracted) when a needs-help student joins a group with a partner.
    pub needs_help_joins_partner: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            fill: 5.0,
            conflict: 1000.0,
            ability: 100.0,
            gender: 20.0,
            gender_cap_base: 200.0,
            gender_cap_step: 120.0,
            unmatched_needs_help: 180.0,
            partner_joins_unmatched: 90.0,
            needs_help_joins_partner: 60.0,
        }
    }
}

impl ScoreWeights {
    fn entries(&self) -> [(&'static str, f64); 9] {
        [
            ("fill", self.fill),
            ("conflict", self.conflict),
            ("ability", self.ability),
            ("gender", self.gender),
            ("gender_cap_base", self.gender_cap_base),
            ("gender_cap_step", self.gender_cap_step),
            ("unmatched_needs_help", self.unmatched_needs_help),
            ("partner_joins_unmatched", self.partner_joins_unmatched),
            ("needs_help_joins_partner", self.needs_help_joins_partner),
        ]
    }

    /// Validates sign and relative ordering of the weights.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in self.entries() {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("weight {name} must be finite and >= 0, got {value}"));
            }
        }
        if self.conflict <= self.gender_cap_base {
            return Err(format!(
                "conflict weight ({}) must exceed gender_cap_base ({})",
                self.conflict, self.gender_cap_base
            ));
        }
        let soft = [
            self.ability,
            self.gender,
            self.unmatched_needs_help,
            self.partner_joins_unmatched,
            self.needs_help_joins_partner,
        ];
        if soft.iter().any(|&w| w >= self.gender_cap_base) {
            return Err("soft balancing weights must stay below gender_cap_base".into());
        }
        if soft.iter().any(|&w| w <= self.fill) {
            return Err("soft balancing weights must exceed the fill weight".into());
        }
        Ok(())
    }
}

/// Configuration for a grouping run.
///
/// # Defaults
///
/// ```
/// use u_grouping::grouping::GroupingConfig;
///
/// let config = GroupingConfig::default();
/// assert_eq!(config.preferred_group_size, 4);
/// assert_eq!(config.max_attempts, 32);
/// assert!(!config.respect_separations);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_grouping::grouping::GroupingConfig;
///
/// let config = GroupingConfig::default()
///     .with_preferred_group_size(3)
///     .with_balance_gender(true)
///     .with_respect_separations(true)
///     .with_max_attempts(64)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GroupingConfig {
    /// Preferred members per group. Clamped into `[2, 10]` at run time.
    pub preferred_group_size: usize,

    /// Spread each gender bucket evenly across groups.
    pub balance_gender: bool,

    /// Spread needs-help students evenly across groups.
    pub balance_ability: bool,

    /// Try to place a support partner alongside needs-help students.
    pub pair_support_partners: bool,

    /// Keep students listed in each other's separation lists apart.
    pub respect_separations: bool,

    /// Candidate attempts per strategy tier. Raised to 1 at run time.
    pub max_attempts: usize,

    /// Composite scoring weights.
    pub weights: ScoreWeights,

    /// Generate the attempts of a tier in parallel using rayon.
    ///
    /// Only takes effect with the `parallel` feature. Output is identical
    /// either way.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed. Ignored by
    /// [`GroupingRunner::run_with_rng`](super::GroupingRunner::run_with_rng).
    pub seed: Option<u64>,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            preferred_group_size: 4,
            balance_gender: false,
            balance_ability: false,
            pair_support_partners: false,
            respect_separations: false,
            max_attempts: 32,
            weights: ScoreWeights::default(),
            parallel: false,
            seed: None,
        }
    }
}

impl GroupingConfig {
    pub fn with_preferred_group_size(mut self, size: usize) -> Self {
        self.preferred_group_size = size;
        self
    }

    pub fn with_balance_gender(mut self, enabled: bool) -> Self {
        self.balance_gender = enabled;
        self
    }

    pub fn with_balance_ability(mut self, enabled: bool) -> Self {
        self.balance_ability = enabled;
        self
    }

    pub fn with_pair_support_partners(mut self, enabled: bool) -> Self {
        self.pair_support_partners = enabled;
        self
    }

    pub fn with_respect_separations(mut self, enabled: bool) -> Self {
        self.respect_separations = enabled;
        self
    }

    pub fn with_max_attempts(mut self, n: usize) -> Self {
        self.max_attempts = n;
        self
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Group size actually used by the partitioner.
    pub fn effective_group_size(&self) -> usize {
        crate::partition::clamp_group_size(self.preferred_group_size)
    }

    /// Attempt budget actually used per tier.
    pub fn effective_attempts(&self) -> usize {
        self.max_attempts.max(1)
    }

    /// Ability or support pairing is on; needs-help students are placed earlier.
    pub(crate) fn prioritizes_needs_help(&self) -> bool {
        self.balance_ability || self.pair_support_partners
    }

    /// Validates the configuration.
    ///
    /// The runner clamps out-of-range sizes and attempt counts instead of
    /// failing, so this is for callers that want to reject bad input early.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".into());
        }
        if !(MIN_GROUP_SIZE..=MAX_GROUP_SIZE).contains(&self.preferred_group_size) {
            return Err(format!(
                "preferred_group_size must be in [{MIN_GROUP_SIZE}, {MAX_GROUP_SIZE}], got {}",
                self.preferred_group_size
            ));
        }
        self.weights.validate()
    }
}
