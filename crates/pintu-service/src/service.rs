//! The three request flows: upload, stitch and task export.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use pintu_core::{compress, probe, stitch, CompressionStatus, Direction, StitchedImage};
use uuid::Uuid;

use crate::auth::Credential;
use crate::config::ServiceConfig;
use crate::error::{AuthError, ServiceError};
use crate::records::{NewImage, NewTask, Principal, TaskImage, TaskStatus};
use crate::requests::{
    ExportResponse, StitchRequest, StitchResponse, UploadRequest, UploadResponse,
};
use crate::resolve::{check_canvas_budget, check_pixel_budget, resolve_sources};
use crate::source::{ImageSource, SourceRef};
use crate::traits::{IdentityProvider, MetadataStore, ObjectStore, RemoteFetcher};

/// Request layer over the core pipeline and its collaborators.
///
/// Holds no per-request state; all methods take `&self` and may run
/// concurrently.
pub struct CollageService<O, M, I, F> {
    config: Arc<ServiceConfig>,
    objects: O,
    metadata: M,
    identity: I,
    fetcher: F,
}

impl<O, M, I, F> CollageService<O, M, I, F>
where
    O: ObjectStore,
    M: MetadataStore,
    I: IdentityProvider,
    F: RemoteFetcher,
{
    pub fn new(config: ServiceConfig, objects: O, metadata: M, identity: I, fetcher: F) -> Self {
        Self {
            config: Arc::new(config),
            objects,
            metadata,
            identity,
            fetcher,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn objects(&self) -> &O {
        &self.objects
    }

    pub fn metadata(&self) -> &M {
        &self.metadata
    }

    /// Resolve an open-API credential. Both header forms carry an API key.
    pub async fn authenticate_api_key(
        &self,
        credential: &Credential,
    ) -> Result<Principal, ServiceError> {
        Ok(self.identity.lookup_api_key(credential.secret()).await?)
    }

    /// Resolve a session credential; only bearer tokens are accepted.
    pub async fn authenticate_session(
        &self,
        credential: &Credential,
    ) -> Result<Principal, ServiceError> {
        match credential {
            Credential::Bearer(token) => Ok(self.identity.verify_token(token).await?),
            Credential::ApiKey(_) => Err(AuthError::Missing.into()),
        }
    }

    /// Store an uploaded image, compressing it first when it is over budget.
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadResponse, ServiceError> {
        request.validate()?;

        let extension = request.extension();
        let declared_size = request
            .declared_size
            .unwrap_or(request.bytes.len() as u64);
        let policy = self.config.pipeline.compression.clone();
        let bytes = request.bytes;

        let outcome = tokio::task::spawn_blocking(move || {
            compress(bytes, declared_size, &extension, &policy)
        })
        .await?;

        let meta = probe(&outcome.bytes)?;
        let content_type = match &outcome.status {
            CompressionStatus::Compressed { format, .. } => format.mime_type().to_string(),
            _ => request
                .content_type
                .clone()
                .unwrap_or_else(|| meta.format.mime_type().to_string()),
        };

        let storage_path = format!(
            "{}/{}-{}{}",
            self.config.upload_prefix,
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            outcome.extension
        );
        let file_size = outcome.bytes.len() as u64;
        let url = self
            .objects
            .put(&storage_path, outcome.bytes, &content_type)
            .await?;

        let inserted = self
            .metadata
            .insert_image(NewImage {
                original_name: request.file_name,
                storage_path: storage_path.clone(),
                width: meta.width,
                height: meta.height,
                file_size,
            })
            .await;
        let record = match inserted {
            Ok(record) => record,
            Err(e) => {
                // An object without a record is unreachable
                if let Err(cleanup) = self.objects.delete(&[storage_path]).await {
                    log::warn!("Failed to remove orphaned upload: {cleanup}");
                }
                return Err(e.into());
            }
        };
        log::info!(
            "Stored upload {} ({}x{}, {} bytes)",
            record.id,
            record.width,
            record.height,
            file_size
        );

        if let Some(task_id) = &request.task_id {
            self.append_to_task(task_id, &record.id).await?;
        }

        Ok(UploadResponse {
            id: record.id,
            url,
            width: record.width,
            height: record.height,
        })
    }

    async fn append_to_task(&self, task_id: &str, image_id: &str) -> Result<(), ServiceError> {
        if self.metadata.task_by_id(task_id).await?.is_none() {
            log::warn!("Upload references unknown task {task_id}; not linking");
            return Ok(());
        }
        let sort_order = self
            .metadata
            .task_images(task_id)
            .await?
            .iter()
            .map(|entry| entry.sort_order + 1)
            .max()
            .unwrap_or(0);
        self.metadata
            .link_task_images(&[TaskImage {
                task_id: task_id.to_string(),
                image_id: image_id.to_string(),
                sort_order,
            }])
            .await?;
        Ok(())
    }

    /// Stitch referenced images into one stored JPEG.
    ///
    /// When `principal` is present the result is also recorded as a completed
    /// task owned by them. Recording failures are logged and do not fail the
    /// request; the stitched image is already stored at that point.
    pub async fn stitch(
        &self,
        principal: Option<&Principal>,
        request: StitchRequest,
    ) -> Result<StitchResponse, ServiceError> {
        request.validate(self.config.max_sources)?;
        let sources = request.sources();

        let stitched = self.stitch_sources(&sources, request.direction).await?;
        let timestamp = Utc::now().timestamp_millis();
        let storage_path = format!(
            "{}/open_api_{timestamp}_{}{}",
            self.config.export_prefix,
            Uuid::new_v4().simple(),
            stitched.format.extension()
        );
        let file_size = stitched.bytes.len() as u64;
        let (width, height) = (stitched.width, stitched.height);
        let url = self
            .objects
            .put(&storage_path, stitched.bytes, stitched.format.mime_type())
            .await?;

        let id = match self
            .metadata
            .insert_image(NewImage {
                original_name: format!("stitched_{timestamp}{}", stitched.format.extension()),
                storage_path,
                width,
                height,
                file_size,
            })
            .await
        {
            Ok(record) => Some(record.id),
            Err(e) => {
                log::warn!("Failed to record stitched image: {e}");
                None
            }
        };

        let task_id = match principal {
            Some(principal) => self.record_stitch_task(principal, &request, &url).await,
            None => None,
        };

        Ok(StitchResponse {
            id,
            url,
            task_id,
            width,
            height,
            file_size,
        })
    }

    async fn record_stitch_task(
        &self,
        principal: &Principal,
        request: &StitchRequest,
        export_url: &str,
    ) -> Option<String> {
        let task = match self
            .metadata
            .insert_task(NewTask {
                user_id: Some(principal.user_id.clone()),
                name: format!("API Stitch {}", Utc::now().format("%Y-%m-%d %H:%M:%S")),
                direction: request.direction,
                status: TaskStatus::Completed,
                export_url: Some(export_url.to_string()),
            })
            .await
        {
            Ok(task) => task,
            Err(e) => {
                log::warn!("Failed to record stitch task for {}: {e}", principal.user_id);
                return None;
            }
        };

        // Only stored images can be linked; URL sources have no record
        let links: Vec<TaskImage> = request
            .images
            .iter()
            .filter_map(|reference| match reference {
                SourceRef::Id(id) => Some(id.clone()),
                _ => None,
            })
            .zip(0u32..)
            .map(|(image_id, sort_order)| TaskImage {
                task_id: task.id.clone(),
                image_id,
                sort_order,
            })
            .collect();

        if !links.is_empty() {
            if let Err(e) = self.metadata.link_task_images(&links).await {
                log::warn!("Failed to link images to task {}: {e}", task.id);
            }
        }
        Some(task.id)
    }

    /// Stitch a saved task's images in their stored order and mark it completed.
    pub async fn export_task(&self, task_id: &str) -> Result<ExportResponse, ServiceError> {
        let task = self
            .metadata
            .task_by_id(task_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Task {task_id}")))?;

        let entries = self.metadata.task_images(task_id).await?;
        if entries.is_empty() {
            return Err(ServiceError::EmptyInput(
                "No images in this task".to_string(),
            ));
        }
        if entries.len() > self.config.max_sources {
            return Err(ServiceError::Validation(format!(
                "Task has {} images (max {})",
                entries.len(),
                self.config.max_sources
            )));
        }

        let sources: Vec<ImageSource> = entries
            .into_iter()
            .map(|entry| {
                ImageSource::path(entry.image.storage_path)
                    .with_hints(entry.image.width, entry.image.height)
            })
            .collect();

        let stitched = self.stitch_sources(&sources, task.direction).await?;
        let storage_path = format!(
            "{}/{}_{}{}",
            self.config.export_prefix,
            task.id,
            Utc::now().timestamp_millis(),
            stitched.format.extension()
        );
        let file_size = stitched.bytes.len() as u64;
        let (width, height) = (stitched.width, stitched.height);
        let download_url = self
            .objects
            .put(&storage_path, stitched.bytes, stitched.format.mime_type())
            .await?;

        self.metadata.complete_task(&task.id, &download_url).await?;
        log::info!("Exported task {} to {}", task.id, storage_path);

        Ok(ExportResponse {
            download_url,
            file_size,
            width,
            height,
        })
    }

    /// Fetch, bound-check and stitch on a blocking thread.
    async fn stitch_sources(
        &self,
        sources: &[ImageSource],
        direction: Direction,
    ) -> Result<StitchedImage, ServiceError> {
        let start = Instant::now();
        let buffers =
            resolve_sources(sources, &self.objects, &self.metadata, &self.fetcher).await?;
        let fetched = start.elapsed();

        let config = Arc::clone(&self.config);
        let count = sources.len();
        let sources = sources.to_vec();
        let stitched = tokio::task::spawn_blocking(move || {
            let settings = &config.pipeline.stitch;
            check_pixel_budget(&buffers, &sources, config.max_total_pixels)?;
            check_canvas_budget(&buffers, direction, settings, config.max_total_pixels)?;
            stitch(&buffers, direction, settings).map_err(ServiceError::from)
        })
        .await??;

        log::debug!(
            "Stitched {count} sources {direction} into {}x{} (fetch {:?}, total {:?})",
            stitched.width,
            stitched.height,
            fetched,
            start.elapsed()
        );
        Ok(stitched)
    }
}
