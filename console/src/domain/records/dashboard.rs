//! Admin dashboard counters.

use serde::{Deserialize, Serialize};

/// One line of the recent-activity feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityEntry {
    /// What happened.
    pub description: Option<String>,
    /// When it happened, as sent by the backend.
    pub timestamp: Option<String>,
}

/// Response of `GET /admin/dashboard`; absent counters read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    /// Registered donors.
    pub total_donors: u64,
    /// Donors currently eligible.
    pub active_donors: u64,
    /// Registered facilities.
    pub total_facilities: u64,
    /// Facilities awaiting review.
    pub pending_facilities: u64,
    /// Approval requests awaiting action.
    pub pending_approvals: u64,
    /// Donations recorded.
    pub total_donations: u64,
    /// Blood groups below the critical stock threshold.
    pub critical_stock: u64,
    /// Donation camps scheduled.
    pub upcoming_camps: u64,
    /// Latest activity, newest first.
    pub recent_activity: Vec<ActivityEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_counters_default_to_zero() {
        let stats: DashboardStats = serde_json::from_value(json!({
            "totalDonors": 120,
            "pendingFacilities": 3,
            "recentActivity": [{ "description": "Facility approved" }]
        }))
        .expect("stats");
        assert_eq!(stats.total_donors, 120);
        assert_eq!(stats.pending_facilities, 3);
        assert_eq!(stats.critical_stock, 0);
        assert_eq!(stats.recent_activity.len(), 1);
        assert_eq!(stats.recent_activity[0].timestamp, None);
    }
}
