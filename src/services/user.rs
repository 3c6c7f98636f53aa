//! User service implementation

use crate::client::ApiClient;
use crate::models::{CreateUserRequest, PageParams, Paginated, UpdateUserRequest, UserData};
use crate::utils::errors::Result;
use super::{logged, mutated, segment};

const RESOURCE: &str = "user";

#[derive(Clone, Debug)]
pub struct UserService {
    client: ApiClient,
}

impl UserService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, params: &PageParams) -> Result<Paginated<Vec<UserData>>> {
        logged("user.list", self.client.get_list("/user/all/", &params.to_query()).await)
    }

    pub async fn detail(&self, id: &str) -> Result<UserData> {
        logged("user.detail", self.client.get(&format!("/user/{}/", segment(id)), &[]).await)
    }

    pub async fn create(&self, body: &CreateUserRequest) -> Result<UserData> {
        let result = self.client.post("/user/create/", body).await;
        mutated(RESOURCE, "create", None, result)
    }

    pub async fn update(&self, id: &str, body: &UpdateUserRequest) -> Result<UserData> {
        let result = self.client.put(&format!("/user/{}/", segment(id)), body).await;
        mutated(RESOURCE, "update", Some(id), result)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = self.client.delete(&format!("/user/{}/", segment(id))).await;
        mutated(RESOURCE, "delete", Some(id), result)
    }
}
