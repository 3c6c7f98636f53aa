//! Activity log service

use crate::client::ApiClient;
use crate::models::{LogFilter, LogItem, Paginated};
use crate::utils::errors::Result;
use super::logged;

#[derive(Clone, Debug)]
pub struct LogService {
    client: ApiClient,
}

impl LogService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// One page of audited calls matching `filter`
    pub async fn list(&self, filter: &LogFilter) -> Result<Paginated<Vec<LogItem>>> {
        logged("log.list", self.client.get_list("/logs/all/", &filter.to_query()).await)
    }
}
