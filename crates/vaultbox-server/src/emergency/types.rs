//! Policy knobs and result types for the emergency access workflow.

use serde::Serialize;

use crate::vault::EntryView;

pub const SECS_PER_DAY: i64 = 86_400;

/// Tunables for the inactivity sweep and the shared-entries projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    /// Owners active more recently than this are skipped by the sweep.
    pub recency_threshold_secs: i64,
    /// Minimum gap between two status-update emails for one pending request.
    pub status_notice_interval_secs: i64,
    /// Hide `UnlockAfter` entries from contacts until the entry's own
    /// `unlock_after` instant has passed.
    pub enforce_entry_unlock_after: bool,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            recency_threshold_secs: SECS_PER_DAY,
            status_notice_interval_secs: SECS_PER_DAY,
            enforce_entry_unlock_after: false,
        }
    }
}

/// Whole days elapsed between `reference` and `now`, never negative.
pub fn inactive_days(now: i64, reference: i64) -> i64 {
    (now - reference).div_euclid(SECS_PER_DAY).max(0)
}

/// Result of a trusted contact asking for access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRequestOutcome {
    Granted,
    Pending {
        unlock_after_days: i64,
        inactive_days: i64,
    },
}

impl AccessRequestOutcome {
    pub const fn status(&self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Pending { .. } => "pending",
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            Self::Granted => "Access granted due to user inactivity",
            Self::Pending { .. } => "Access request sent to vault owner",
        }
    }
}

/// Counters from one pass of the inactivity sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Contact rows whose owner was past the recency threshold.
    pub scanned: usize,
    /// Rows this pass moved to `Granted`.
    pub granted: usize,
    pub status_updates: usize,
    /// Rows that errored; the pass carried on past them.
    pub failures: usize,
}

/// An owner's entry as seen by an unlocked trusted contact.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedVaultEntry {
    #[serde(flatten)]
    pub entry: EntryView,
    pub vault_owner: VaultOwner,
}

/// Owner reference nested in a shared entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VaultOwner {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultOwnerAccess {
    pub owner_email: String,
    pub is_unlock_active: bool,
    pub unlock_after_days: i64,
    pub last_requested_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessSummary {
    pub is_trusted_contact: bool,
    pub vault_owners: Vec<VaultOwnerAccess>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_days_floors_partial_days() {
        assert_eq!(inactive_days(SECS_PER_DAY - 1, 0), 0);
        assert_eq!(inactive_days(SECS_PER_DAY, 0), 1);
        assert_eq!(inactive_days(10 * SECS_PER_DAY + 3_600, 0), 10);
    }

    #[test]
    fn inactive_days_clamps_future_reference() {
        assert_eq!(inactive_days(0, SECS_PER_DAY * 2), 0);
    }

    #[test]
    fn outcome_status_strings() {
        assert_eq!(AccessRequestOutcome::Granted.status(), "granted");
        let pending = AccessRequestOutcome::Pending {
            unlock_after_days: 30,
            inactive_days: 2,
        };
        assert_eq!(pending.status(), "pending");
        assert_eq!(pending.message(), "Access request sent to vault owner");
    }
}
