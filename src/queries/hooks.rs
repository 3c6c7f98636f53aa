//! Cached reads and invalidating mutations
//!
//! Reads go through the [`QueryCache`] with the configured retry policy.
//! Mutations are never retried; on success they invalidate the keys whose
//! data they changed so the next read refetches.

use crate::config::CacheConfig;
use crate::models::{
    Bulletin, BulletinCreateBody, BulletinCreateRow, BulletinFile, BulletinFileUpdate, BulletinRow,
    BulletinUpdateBody, Classificator, ClassificatorCreate, CreateUserRequest, Department,
    DepartmentCreate, DepartmentUpdate, Element, ElementCreate, FileStatusHistoryRequest, LogFilter, LogItem,
    MonitoringResults, Organization, OrganizationCreate, OrganizationUpdate, PageParams, Paginated,
    UpdateUserRequest, UploadFile, UserData,
};
use crate::services::Services;
use crate::utils::errors::Result;
use super::cache::{QueryCache, RetryPolicy};
use super::keys::{QueryKey, Resource};

/// Query client over all resource services
///
/// Failed reads come back with their original variant. Errors wrapping a
/// transport source may arrive as [`ConsoleError::Shared`] when several
/// callers waited on the same load; classify those through
/// [`ConsoleError::root`].
///
/// [`ConsoleError::Shared`]: crate::utils::errors::ConsoleError::Shared
/// [`ConsoleError::root`]: crate::utils::errors::ConsoleError::root
#[derive(Clone, Debug)]
pub struct Queries {
    services: Services,
    cache: QueryCache,
    retry: RetryPolicy,
}

impl Queries {
    pub fn new(services: Services, config: &CacheConfig) -> Self {
        Self {
            services,
            cache: QueryCache::new(config),
            retry: RetryPolicy::from_config(config),
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // Reads

    pub async fn bulletins(&self, params: &PageParams) -> Result<Paginated<Vec<Bulletin>>> {
        let service = &self.services.bulletins;
        self.cache
            .fetch(QueryKey::bulletins(params), self.retry.run(|| service.list(params)))
            .await
    }

    pub async fn bulletin_detail(&self, id: &str) -> Result<Bulletin> {
        let service = &self.services.bulletins;
        self.cache
            .fetch(QueryKey::bulletin_detail(id), self.retry.run(|| service.detail(id)))
            .await
    }

    pub async fn organizations(&self, params: &PageParams) -> Result<Paginated<Vec<Organization>>> {
        let service = &self.services.organizations;
        self.cache
            .fetch(QueryKey::list(Resource::Organizations, params), self.retry.run(|| service.list(params)))
            .await
    }

    pub async fn departments(&self, params: &PageParams) -> Result<Paginated<Vec<Department>>> {
        let service = &self.services.departments;
        self.cache
            .fetch(QueryKey::list(Resource::Departments, params), self.retry.run(|| service.list(params)))
            .await
    }

    pub async fn users(&self, params: &PageParams) -> Result<Paginated<Vec<UserData>>> {
        let service = &self.services.users;
        self.cache
            .fetch(QueryKey::list(Resource::Users, params), self.retry.run(|| service.list(params)))
            .await
    }

    pub async fn user_detail(&self, id: &str) -> Result<UserData> {
        let service = &self.services.users;
        self.cache
            .fetch(QueryKey::user_detail(id), self.retry.run(|| service.detail(id)))
            .await
    }

    pub async fn classificators(&self, params: &PageParams) -> Result<Paginated<Vec<Classificator>>> {
        let service = &self.services.classificators;
        self.cache
            .fetch(QueryKey::list(Resource::Classificators, params), self.retry.run(|| service.list(params)))
            .await
    }

    /// Classificator with elements; a failure surfaces at once
    pub async fn classificator_detail(&self, id: &str) -> Result<Classificator> {
        let service = &self.services.classificators;
        self.cache
            .fetch(QueryKey::classificator_detail(id), RetryPolicy::none().run(|| service.detail(id)))
            .await
    }

    pub async fn monitoring(&self, params: &PageParams) -> Result<Paginated<MonitoringResults>> {
        let service = &self.services.monitoring;
        self.cache
            .fetch(
                QueryKey::list(Resource::Monitoring, params),
                self.retry.run(|| service.by_organizations(params)),
            )
            .await
    }

    /// Activity log page; read-only, so nothing invalidates it
    pub async fn logs(&self, filter: &LogFilter) -> Result<Paginated<Vec<LogItem>>> {
        let service = &self.services.logs;
        self.cache
            .fetch(QueryKey::logs(filter), self.retry.run(|| service.list(filter)))
            .await
    }

    // Bulletin mutations

    pub async fn create_bulletin(&self, body: &BulletinCreateBody) -> Result<Bulletin> {
        let created = self.services.bulletins.create(body).await?;
        self.cache.invalidate_resource(Resource::Bulletins);
        Ok(created)
    }

    pub async fn update_bulletin(&self, id: &str, body: &BulletinUpdateBody) -> Result<Bulletin> {
        let updated = self.services.bulletins.update(id, body).await?;
        self.cache.invalidate_resource(Resource::Bulletins);
        self.cache.invalidate(&QueryKey::bulletin_detail(id)).await;
        Ok(updated)
    }

    pub async fn delete_bulletin(&self, id: &str) -> Result<()> {
        self.services.bulletins.delete(id).await?;
        self.cache.invalidate_resource(Resource::Bulletins);
        self.cache.invalidate(&QueryKey::bulletin_detail(id)).await;
        Ok(())
    }

    pub async fn create_row(&self, body: &BulletinCreateRow) -> Result<BulletinRow> {
        let row = self.services.bulletins.create_row(body).await?;
        self.cache.invalidate(&QueryKey::bulletin_detail(&body.journal)).await;
        Ok(row)
    }

    pub async fn update_row(&self, id: &str, body: &BulletinCreateRow) -> Result<BulletinRow> {
        let row = self.services.bulletins.update_row(id, body).await?;
        self.cache.invalidate(&QueryKey::bulletin_detail(&body.journal)).await;
        Ok(row)
    }

    /// Delete a row of `bulletin_id`
    pub async fn delete_row(&self, bulletin_id: &str, row_id: &str) -> Result<()> {
        self.services.bulletins.delete_row(row_id).await?;
        self.cache.invalidate(&QueryKey::bulletin_detail(bulletin_id)).await;
        Ok(())
    }

    pub async fn upload_file(&self, bulletin_id: &str, file: UploadFile) -> Result<BulletinFile> {
        let uploaded = self.services.bulletins.upload_file(bulletin_id, file).await?;
        self.cache.invalidate(&QueryKey::bulletin_detail(bulletin_id)).await;
        Ok(uploaded)
    }

    pub async fn update_file(&self, bulletin_id: &str, file_id: &str, update: BulletinFileUpdate) -> Result<()> {
        self.services.bulletins.update_file(file_id, update).await?;
        self.cache.invalidate(&QueryKey::bulletin_detail(bulletin_id)).await;
        Ok(())
    }

    pub async fn create_status_history(&self, request: FileStatusHistoryRequest) -> Result<serde_json::Value> {
        let bulletin_id = request.journal_id.clone();
        let created = self.services.bulletins.create_status_history(request).await?;
        self.cache.invalidate(&QueryKey::bulletin_detail(&bulletin_id)).await;
        Ok(created)
    }

    // Organization, department and user mutations

    pub async fn create_organization(&self, body: &OrganizationCreate) -> Result<Organization> {
        let created = self.services.organizations.create(body).await?;
        self.cache.invalidate_resource(Resource::Organizations);
        Ok(created)
    }

    pub async fn update_organization(&self, body: &OrganizationUpdate) -> Result<Organization> {
        let updated = self.services.organizations.update(body).await?;
        self.cache.invalidate_resource(Resource::Organizations);
        Ok(updated)
    }

    pub async fn delete_organization(&self, id: &str) -> Result<()> {
        self.services.organizations.delete(id).await?;
        self.cache.invalidate_resource(Resource::Organizations);
        Ok(())
    }

    pub async fn create_department(&self, body: &DepartmentCreate) -> Result<Department> {
        let created = self.services.departments.create(body).await?;
        self.cache.invalidate_resource(Resource::Departments);
        Ok(created)
    }

    pub async fn update_department(&self, body: &DepartmentUpdate) -> Result<Department> {
        let updated = self.services.departments.update(body).await?;
        self.cache.invalidate_resource(Resource::Departments);
        Ok(updated)
    }

    pub async fn delete_department(&self, id: &str) -> Result<()> {
        self.services.departments.delete(id).await?;
        self.cache.invalidate_resource(Resource::Departments);
        Ok(())
    }

    pub async fn create_user(&self, body: &CreateUserRequest) -> Result<UserData> {
        let created = self.services.users.create(body).await?;
        self.cache.invalidate_resource(Resource::Users);
        Ok(created)
    }

    pub async fn update_user(&self, id: &str, body: &UpdateUserRequest) -> Result<UserData> {
        let updated = self.services.users.update(id, body).await?;
        self.cache.invalidate_resource(Resource::Users);
        self.cache.invalidate(&QueryKey::user_detail(id)).await;
        Ok(updated)
    }

    pub async fn delete_user(&self, id: &str) -> Result<()> {
        self.services.users.delete(id).await?;
        self.cache.invalidate_resource(Resource::Users);
        self.cache.invalidate(&QueryKey::user_detail(id)).await;
        Ok(())
    }

    // Classificator mutations

    pub async fn create_classificator(&self, body: &ClassificatorCreate) -> Result<Classificator> {
        let created = self.services.classificators.create(body).await?;
        self.cache.invalidate_resource(Resource::Classificators);
        Ok(created)
    }

    pub async fn update_classificator(&self, id: &str, body: &ClassificatorCreate) -> Result<Classificator> {
        let updated = self.services.classificators.update(id, body).await?;
        self.cache.invalidate_resource(Resource::Classificators);
        self.cache.invalidate(&QueryKey::classificator_detail(id)).await;
        Ok(updated)
    }

    pub async fn delete_classificator(&self, id: &str) -> Result<()> {
        self.services.classificators.delete(id).await?;
        self.cache.invalidate_resource(Resource::Classificators);
        self.cache.invalidate(&QueryKey::classificator_detail(id)).await;
        Ok(())
    }

    pub async fn create_element(&self, body: &ElementCreate) -> Result<Element> {
        let created = self.services.classificators.create_element(body).await?;
        self.cache.invalidate(&QueryKey::classificator_detail(&body.classificator)).await;
        Ok(created)
    }

    pub async fn update_element(&self, id: &str, body: &ElementCreate) -> Result<Element> {
        let updated = self.services.classificators.update_element(id, body).await?;
        self.cache.invalidate(&QueryKey::classificator_detail(&body.classificator)).await;
        Ok(updated)
    }

    /// Delete an element of `classificator_id`
    pub async fn delete_element(&self, classificator_id: &str, element_id: &str) -> Result<()> {
        self.services.classificators.delete_element(element_id).await?;
        self.cache.invalidate(&QueryKey::classificator_detail(classificator_id)).await;
        Ok(())
    }
}
