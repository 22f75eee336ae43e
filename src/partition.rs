//! Group size partitioning.
//!
//! Splits `n` students into `ceil(n / p)` groups whose sizes differ by
//! at most one and sum to exactly `n`.

/// Smallest accepted preferred group size.
pub const MIN_GROUP_SIZE: usize = 2;

/// Largest accepted preferred group size.
pub const MAX_GROUP_SIZE: usize = 10;

/// Clamps a preferred group size into `[MIN_GROUP_SIZE, MAX_GROUP_SIZE]`.
pub fn clamp_group_size(preferred: usize) -> usize {
    preferred.clamp(MIN_GROUP_SIZE, MAX_GROUP_SIZE)
}

/// Computes target group sizes for `n` students.
///
/// The preferred size is clamped first. The first `n % groups` groups get
/// one extra member.
///
/// # Examples
///
/// ```
/// use u_grouping::partition::group_sizes;
///
/// assert_eq!(group_sizes(12, 4), vec![4, 4, 4]);
/// assert_eq!(group_sizes(10, 4), vec![4, 3, 3]);
/// assert_eq!(group_sizes(5, 1), vec![2, 2, 1]); // size clamped to 2
/// assert!(group_sizes(0, 4).is_empty());
/// ```
pub fn group_sizes(n: usize, preferred: usize) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    let size = clamp_group_size(preferred);
    let groups = n.div_ceil(size);
    let base = n / groups;
    let extra = n % groups;
    (0..groups)
        .map(|g| if g < extra { base + 1 } else { base })
        .collect()
}
