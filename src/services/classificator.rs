//! Classificator and element service implementation

use crate::client::ApiClient;
use crate::models::{Classificator, ClassificatorCreate, Element, ElementCreate, PageParams, Paginated};
use crate::utils::errors::Result;
use super::{logged, mutated, segment};

#[derive(Clone, Debug)]
pub struct ClassificatorService {
    client: ApiClient,
}

impl ClassificatorService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, params: &PageParams) -> Result<Paginated<Vec<Classificator>>> {
        logged("classificator.list", self.client.get_list("/classificator/all/", &params.to_query()).await)
    }

    /// A classificator with its elements
    pub async fn detail(&self, id: &str) -> Result<Classificator> {
        logged(
            "classificator.detail",
            self.client.get(&format!("/classificator/{}/", segment(id)), &[]).await,
        )
    }

    pub async fn create(&self, body: &ClassificatorCreate) -> Result<Classificator> {
        let result = self.client.post("/classificator/create/", body).await;
        mutated("classificator", "create", None, result)
    }

    pub async fn update(&self, id: &str, body: &ClassificatorCreate) -> Result<Classificator> {
        let result = self.client.patch(&format!("/classificator/{}/", segment(id)), body).await;
        mutated("classificator", "update", Some(id), result)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = self.client.delete(&format!("/classificator/{}/", segment(id))).await;
        mutated("classificator", "delete", Some(id), result)
    }

    pub async fn create_element(&self, body: &ElementCreate) -> Result<Element> {
        let result = self.client.post("/classificator/element/create/", body).await;
        mutated("classificator_element", "create", None, result)
    }

    pub async fn update_element(&self, id: &str, body: &ElementCreate) -> Result<Element> {
        let result = self
            .client
            .patch(&format!("/classificator/element/{}/", segment(id)), body)
            .await;
        mutated("classificator_element", "update", Some(id), result)
    }

    pub async fn delete_element(&self, id: &str) -> Result<()> {
        let result = self
            .client
            .delete(&format!("/classificator/element/{}/", segment(id)))
            .await;
        mutated("classificator_element", "delete", Some(id), result)
    }
}
