//! Retention policy: capacity bound and minimum time between backups

use crate::error::{BackupError, Result};
use serde::{Deserialize, Serialize};

/// The default maximum number of backups
pub const DEFAULT_MAX_BACKUPS: i64 = 10;

/// The default minimum number of minutes between backups
pub const DEFAULT_MINUTES: i64 = 10;

/// Retention policy for one watch session
///
/// Fixed for the lifetime of a session. Inputs are signed so that
/// out-of-range values coming from a command line or config file can be
/// rejected with a proper error instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Number of backups to keep before the oldest is deleted
    pub max_backups: i64,
    /// Minutes that must pass since the most recent backup
    pub min_interval_minutes: i64,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            max_backups: DEFAULT_MAX_BACKUPS,
            min_interval_minutes: DEFAULT_MINUTES,
        }
    }
}

impl Policy {
    /// Create a validated policy
    pub fn new(max_backups: i64, min_interval_minutes: i64) -> Result<Self> {
        let policy = Self {
            max_backups,
            min_interval_minutes,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Check that capacity is positive and the interval non-negative
    pub fn validate(&self) -> Result<()> {
        if self.max_backups <= 0 {
            return Err(BackupError::InvalidPolicy(format!(
                "max backups must be a positive integer (got {})",
                self.max_backups
            )));
        }
        if self.min_interval_minutes < 0 {
            return Err(BackupError::InvalidPolicy(format!(
                "minutes between backups must not be negative (got {})",
                self.min_interval_minutes
            )));
        }
        Ok(())
    }

    /// Capacity as a queue length
    pub fn capacity(&self) -> usize {
        usize::try_from(self.max_backups).unwrap_or(0)
    }

    /// Whether enough time has passed for a new backup
    pub fn interval_elapsed(&self, elapsed_minutes: f64) -> bool {
        elapsed_minutes >= self.min_interval_minutes as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_defaults() {
        let policy = Policy::default();
        assert_eq!(policy.max_backups, 10);
        assert_eq!(policy.min_interval_minutes, 10);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_capacity() {
        assert_eq!(Policy::new(0, 5).unwrap_err().kind(), ErrorKind::InvalidPolicy);
        assert_eq!(Policy::new(-3, 5).unwrap_err().kind(), ErrorKind::InvalidPolicy);
    }

    #[test]
    fn test_rejects_negative_interval() {
        assert_eq!(Policy::new(1, -1).unwrap_err().kind(), ErrorKind::InvalidPolicy);
        assert!(Policy::new(1, 0).is_ok());
    }

    #[test]
    fn test_interval_threshold_is_inclusive() {
        let policy = Policy::new(3, 10).unwrap();
        assert!(!policy.interval_elapsed(9.99));
        assert!(policy.interval_elapsed(10.0));
        assert!(policy.interval_elapsed(42.5));

        let zero = Policy::new(3, 0).unwrap();
        assert!(zero.interval_elapsed(0.0));
        assert!(!zero.interval_elapsed(-0.5));
    }
}
