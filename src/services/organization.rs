//! Organization service implementation

use crate::client::ApiClient;
use crate::models::{Organization, OrganizationCreate, OrganizationUpdate, PageParams, Paginated};
use crate::utils::errors::Result;
use super::{logged, mutated, segment};

const RESOURCE: &str = "organization";

#[derive(Clone, Debug)]
pub struct OrganizationService {
    client: ApiClient,
}

impl OrganizationService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, params: &PageParams) -> Result<Paginated<Vec<Organization>>> {
        logged("organization.list", self.client.get_list("/organizations/all/", &params.to_query()).await)
    }

    pub async fn create(&self, body: &OrganizationCreate) -> Result<Organization> {
        let result = self.client.post("/organizations/create/", body).await;
        mutated(RESOURCE, "create", None, result)
    }

    /// Partial update addressed by `body.id`
    pub async fn update(&self, body: &OrganizationUpdate) -> Result<Organization> {
        let result = self
            .client
            .patch(&format!("/organizations/{}/", segment(&body.id)), body)
            .await;
        mutated(RESOURCE, "update", Some(&body.id), result)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = self.client.delete(&format!("/organizations/{}/", segment(id))).await;
        mutated(RESOURCE, "delete", Some(id), result)
    }
}
