//! Bulletin service implementation
//!
//! Bulletins, their rows and their uploaded files.

use reqwest::Method;
use tracing::debug;
use crate::client::{ApiClient, MultipartField};
use crate::models::{
    Bulletin, BulletinCreateBody, BulletinCreateRow, BulletinFile, BulletinFileUpdate, BulletinRow,
    BulletinUpdateBody, FileStatusHistoryRequest, PageParams, Paginated, UploadFile,
};
use crate::utils::errors::Result;
use super::{logged, mutated, segment};

const RESOURCE: &str = "bulletin";

#[derive(Clone, Debug)]
pub struct BulletinService {
    client: ApiClient,
}

impl BulletinService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// One page of bulletins
    pub async fn list(&self, params: &PageParams) -> Result<Paginated<Vec<Bulletin>>> {
        debug!(page = ?params.page, "Fetching bulletins");
        logged("bulletin.list", self.client.get_list("/journal/all/", &params.to_query()).await)
    }

    /// A bulletin with its columns, rows and files
    pub async fn detail(&self, id: &str) -> Result<Bulletin> {
        logged(
            "bulletin.detail",
            self.client.get(&format!("/journal/{}/", segment(id)), &[]).await,
        )
    }

    pub async fn create(&self, body: &BulletinCreateBody) -> Result<Bulletin> {
        let result = self.client.post("/journal/create/", body).await;
        mutated(RESOURCE, "create", None, result)
    }

    /// Partial update
    pub async fn update(&self, id: &str, body: &BulletinUpdateBody) -> Result<Bulletin> {
        let result = self.client.patch(&format!("/journal/{}/", segment(id)), body).await;
        mutated(RESOURCE, "update", Some(id), result)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = self.client.delete(&format!("/journal/{}/", segment(id))).await;
        mutated(RESOURCE, "delete", Some(id), result)
    }

    pub async fn create_row(&self, body: &BulletinCreateRow) -> Result<BulletinRow> {
        let result = self.client.post("/journal/row/create/", body).await;
        mutated("bulletin_row", "create", None, result)
    }

    pub async fn update_row(&self, id: &str, body: &BulletinCreateRow) -> Result<BulletinRow> {
        let result = self.client.patch(&format!("/journal/row/{}/", segment(id)), body).await;
        mutated("bulletin_row", "update", Some(id), result)
    }

    pub async fn delete_row(&self, id: &str) -> Result<()> {
        let result = self.client.delete(&format!("/journal/row/{}/", segment(id))).await;
        mutated("bulletin_row", "delete", Some(id), result)
    }

    /// Upload a file against a bulletin
    pub async fn upload_file(&self, journal_id: &str, file: UploadFile) -> Result<BulletinFile> {
        let fields = vec![
            MultipartField::text("journal", journal_id),
            MultipartField::file("upload_file", file),
        ];
        let result = self
            .client
            .multipart(Method::POST, "/journal/upload-history/", fields)
            .await;
        mutated("bulletin_file", "upload", Some(journal_id), result)
    }

    /// Change the editable flag of an upload, optionally replacing the file
    pub async fn update_file(&self, id: &str, update: BulletinFileUpdate) -> Result<()> {
        let mut fields = Vec::with_capacity(2);
        if let Some(file) = update.upload_file {
            fields.push(MultipartField::file("upload_file", file));
        }
        fields.push(MultipartField::text("editable", update.editable.to_string()));

        let result: Result<serde_json::Value> = self
            .client
            .multipart(Method::PATCH, &format!("/journal-upload/only-permitted/{}/", segment(id)), fields)
            .await;
        mutated("bulletin_file", "update", Some(id), result).map(|_| ())
    }

    /// Record a new version of an upload with a change description
    pub async fn create_status_history(&self, request: FileStatusHistoryRequest) -> Result<serde_json::Value> {
        let upload_id = request.upload_history_id.clone();
        let fields = vec![
            MultipartField::text("j_upload_history_id", request.upload_history_id),
            MultipartField::file("upload_file", request.upload_file),
            MultipartField::text("description", request.description),
            MultipartField::text("journal_id", request.journal_id),
        ];
        let result = self
            .client
            .multipart(Method::POST, "/journal/upload-status-history/", fields)
            .await;
        mutated("bulletin_file", "status_history", Some(&upload_id), result)
    }
}
