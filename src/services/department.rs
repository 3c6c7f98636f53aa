//! Department (secondary organization) service implementation

use crate::client::ApiClient;
use crate::models::{Department, DepartmentCreate, DepartmentUpdate, PageParams, Paginated};
use crate::utils::errors::Result;
use super::{logged, mutated, segment};

const RESOURCE: &str = "department";

#[derive(Clone, Debug)]
pub struct DepartmentService {
    client: ApiClient,
}

impl DepartmentService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, params: &PageParams) -> Result<Paginated<Vec<Department>>> {
        logged(
            "department.list",
            self.client.get_list("/secondary-organizations/all/", &params.to_query()).await,
        )
    }

    pub async fn create(&self, body: &DepartmentCreate) -> Result<Department> {
        let result = self.client.post("/secondary-organizations/create/", body).await;
        mutated(RESOURCE, "create", None, result)
    }

    /// Full replacement addressed by `body.id`
    pub async fn update(&self, body: &DepartmentUpdate) -> Result<Department> {
        let result = self
            .client
            .put(&format!("/secondary-organizations/{}/", segment(&body.id)), body)
            .await;
        mutated(RESOURCE, "update", Some(&body.id), result)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = self
            .client
            .delete(&format!("/secondary-organizations/{}/", segment(id)))
            .await;
        mutated(RESOURCE, "delete", Some(id), result)
    }
}
