//! Submission monitoring statistics

use serde::{Deserialize, Serialize};
use super::common::id_string;

/// Submission counters shared by the total and per-organization entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionStats {
    pub total_count: u64,
    pub on_time_count: u64,
    pub late_count: u64,
    pub missed_count: u64,
    pub on_time_percentage: f64,
    pub late_percentage: f64,
    pub missed_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringOrganization {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub stats: SubmissionStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringResults {
    pub total_stats: SubmissionStats,
    #[serde(default)]
    pub organizations: Vec<MonitoringOrganization>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitoring_organization_flattens_stats() {
        let json = r#"{"id": "o1", "name": "Vazirlik", "total_count": 4, "on_time_count": 2,
            "late_count": 1, "missed_count": 1, "on_time_percentage": 50.0,
            "late_percentage": 25.0, "missed_percentage": 25.0}"#;
        let organization: MonitoringOrganization = serde_json::from_str(json).unwrap();
        assert_eq!(organization.stats.total_count, 4);
        assert_eq!(organization.stats.on_time_percentage, 50.0);
    }
}
