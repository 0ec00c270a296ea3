//! Desired-object filter.
//!
//! Restricts which objects are tracked based on their rank (`oid`). The rank
//! is assigned by the sensor, lower meaning older. `Newest` compares against
//! the scene's reported object count, which is live and can diverge from the
//! registry, so its selection is best-effort rather than a strict top-N.

use serde::{Deserialize, Serialize};

/// Which objects to track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesiredMode {
    #[default]
    All,
    Oldest,
    Newest,
}

impl std::str::FromStr for DesiredMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(DesiredMode::All),
            "oldest" => Ok(DesiredMode::Oldest),
            "newest" => Ok(DesiredMode::Newest),
            other => Err(format!("unknown desired object mode '{other}'")),
        }
    }
}

/// Filter policy: a mode plus how many objects it keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DesiredObjects {
    pub mode: DesiredMode,
    pub count: i32,
}

impl DesiredObjects {
    pub const fn new(mode: DesiredMode, count: i32) -> Self {
        Self { mode, count }
    }

    /// Evaluates the policy for one rank.
    pub fn is_desired(&self, oid: i32, reported_count: i32) -> bool {
        is_desired(oid, self.mode, self.count, reported_count)
    }
}

/// Returns true if an object with rank `oid` should be tracked.
pub fn is_desired(oid: i32, mode: DesiredMode, count: i32, reported_count: i32) -> bool {
    match mode {
        DesiredMode::All => true,
        DesiredMode::Oldest => oid < count,
        DesiredMode::Newest => oid >= reported_count.saturating_sub(count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_accepts_everything() {
        assert!(is_desired(0, DesiredMode::All, 0, 0));
        assert!(is_desired(99, DesiredMode::All, 1, 2));
    }

    #[test]
    fn test_oldest_keeps_low_ranks() {
        let policy = DesiredObjects::new(DesiredMode::Oldest, 2);
        assert!(policy.is_desired(0, 10));
        assert!(policy.is_desired(1, 10));
        assert!(!policy.is_desired(2, 10));
    }

    #[test]
    fn test_newest_depends_on_reported_count() {
        let policy = DesiredObjects::new(DesiredMode::Newest, 2);
        assert!(!policy.is_desired(2, 5));
        assert!(policy.is_desired(3, 5));
        assert!(policy.is_desired(4, 5));

        // Same rank, smaller population: now among the newest.
        assert!(policy.is_desired(2, 4));
    }

    #[test]
    fn test_newest_with_extreme_counts() {
        assert!(is_desired(0, DesiredMode::Newest, 1, i32::MIN));
        assert!(is_desired(i32::MIN + 1, DesiredMode::Newest, i32::MAX, 0));
        assert!(!is_desired(i32::MIN, DesiredMode::Newest, i32::MAX, 0));
        assert!(!is_desired(0, DesiredMode::Newest, i32::MIN, i32::MAX));
        assert!(is_desired(i32::MAX, DesiredMode::Newest, i32::MIN, i32::MAX));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Oldest".parse::<DesiredMode>(), Ok(DesiredMode::Oldest));
        assert!("loudest".parse::<DesiredMode>().is_err());
    }
}
