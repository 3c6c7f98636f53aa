//! Monitoring service implementation

use crate::client::ApiClient;
use crate::models::{MonitoringResults, PageParams, Paginated};
use crate::utils::errors::Result;
use super::logged;

#[derive(Clone, Debug)]
pub struct MonitoringService {
    client: ApiClient,
}

impl MonitoringService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Submission statistics per organization
    pub async fn by_organizations(&self, params: &PageParams) -> Result<Paginated<MonitoringResults>> {
        logged(
            "monitoring.by_organizations",
            self.client
                .get("/journal/monitoring-by-organizations/", &params.to_query())
                .await,
        )
    }
}
