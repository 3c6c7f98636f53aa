//! Drives a [`BulletinGrid`] against the API
//!
//! Every finished mutation is reported through the [`Notifier`].

use std::sync::Arc;
use tracing::{info, warn};
use crate::models::{BulletinFile, UploadFile};
use crate::notify::{Notification, Notifier};
use crate::queries::Queries;
use crate::utils::errors::{ConsoleError, Result};
use super::grid::{BulletinGrid, DeleteAction, SaveAction};

const SUCCESS_TITLE: &str = "Muvaffaqiyatli";
const ERROR_TITLE: &str = "Xatolik";

pub struct GridController {
    queries: Queries,
    notifier: Arc<dyn Notifier>,
    grid: BulletinGrid,
}

impl GridController {
    /// Fetch the bulletin and the classificators its columns use
    pub async fn load(queries: Queries, notifier: Arc<dyn Notifier>, bulletin_id: &str) -> Result<Self> {
        let bulletin = queries.bulletin_detail(bulletin_id).await?;
        let mut controller = Self {
            grid: BulletinGrid::new(&bulletin),
            queries,
            notifier,
        };
        controller.load_classificators().await;
        Ok(controller)
    }

    pub fn grid(&self) -> &BulletinGrid {
        &self.grid
    }

    /// Local edits that need no request
    pub fn grid_mut(&mut self) -> &mut BulletinGrid {
        &mut self.grid
    }

    /// Load option lists of classificator columns
    ///
    /// A classificator that fails to load leaves its column showing raw
    /// values.
    pub async fn load_classificators(&mut self) {
        for id in self.grid.classificator_ids() {
            match self.queries.classificator_detail(&id).await {
                Ok(classificator) => self.grid.set_classificator(classificator),
                Err(e) => warn!(classificator_id = %id, error = %e, "Classificator options unavailable"),
            }
        }
    }

    /// Refetch the bulletin and merge its rows
    pub async fn refresh(&mut self) -> Result<()> {
        let bulletin = self.queries.bulletin_detail(self.grid.bulletin_id()).await?;
        self.grid.sync_rows(bulletin.rows);
        Ok(())
    }

    /// Save a row being edited
    pub async fn save_row(&mut self, row_id: &str) -> Result<()> {
        let action = match self.grid.prepare_save(row_id) {
            Ok(action) => action,
            Err(ConsoleError::EmptyRow) => {
                self.notify(Notification::error(ERROR_TITLE, "Qator bo'sh bo'lmasligi kerak")).await;
                return Err(ConsoleError::EmptyRow);
            }
            Err(e) => return Err(e),
        };

        let (outcome, success, failure) = match &action {
            SaveAction::Create(body) => (
                self.queries.create_row(body).await.map(|_| ()),
                "Bulletin qatori muvaffaqiyatli yaratildi",
                "Bulletin qatori yaratishda xatolik",
            ),
            SaveAction::Update { id, body } => (
                self.queries.update_row(id, body).await.map(|_| ()),
                "Qator muvaffaqiyatli yangilandi",
                "Qator yangilashda xatolik yuz berdi",
            ),
        };

        self.grid.complete_save(row_id, &outcome)?;
        self.report(&outcome, success, failure).await;
        if outcome.is_ok() {
            self.refresh_quietly().await;
        }
        outcome
    }

    /// Delete a row; unsaved rows go without a request
    pub async fn delete_row(&mut self, row_id: &str) -> Result<()> {
        let id = match self.grid.delete_row(row_id)? {
            DeleteAction::Local => return Ok(()),
            DeleteAction::Remote(id) => id,
        };

        let outcome = self.queries.delete_row(self.grid.bulletin_id(), &id).await;
        self.grid.complete_delete(&id, &outcome)?;
        self.report(&outcome, "Qator muvaffaqiyatli o'chirildi", "Qator o'chirishda xatolik yuz berdi")
            .await;
        outcome
    }

    /// Upload a file against this bulletin
    pub async fn upload_file(&mut self, file: UploadFile) -> Result<BulletinFile> {
        let outcome = self.queries.upload_file(self.grid.bulletin_id(), file).await;
        self.report(&outcome, "Fayl muvaffaqiyatli yuklandi", "Fayl yuklashda xatolik").await;
        if let Ok(uploaded) = &outcome {
            info!(bulletin_id = %self.grid.bulletin_id(), file_id = %uploaded.id, "File uploaded");
        }
        outcome
    }

    async fn refresh_quietly(&mut self) {
        if let Err(e) = self.refresh().await {
            warn!(bulletin_id = %self.grid.bulletin_id(), error = %e, "Refetch after save failed");
        }
    }

    async fn report<T>(&self, outcome: &Result<T>, success: &str, failure: &str) {
        let notification = match outcome {
            Ok(_) => Notification::success(SUCCESS_TITLE, success),
            Err(e) => Notification::error(failure, e.user_message()),
        };
        self.notify(notification).await;
    }

    async fn notify(&self, notification: Notification) {
        self.notifier.notify(notification).await;
    }
}
