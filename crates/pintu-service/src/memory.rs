//! `HashMap`-backed collaborators for tests and local runs.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use uuid::Uuid;

use crate::error::{AuthError, FetchError, StoreError};
use crate::records::{
    ImageRecord, NewImage, NewTask, Principal, TaskImage, TaskImageEntry, TaskRecord, TaskStatus,
};
use crate::traits::{IdentityProvider, MetadataStore, ObjectStore, RemoteFetcher};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

/// Object store keeping every blob in memory.
#[derive(Debug)]
pub struct InMemoryObjectStore {
    base_url: String,
    bucket: String,
    objects: Mutex<HashMap<String, StoredObject>>,
}

impl InMemoryObjectStore {
    pub fn new(base_url: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    /// Content type recorded for `path`.
    pub fn content_type(&self, path: &str) -> Option<String> {
        lock(&self.objects)
            .get(path)
            .map(|object| object.content_type.clone())
    }

    /// All stored paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = lock(&self.objects).keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        lock(&self.objects).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.objects).is_empty()
    }
}

impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, StoreError> {
        lock(&self.objects).insert(
            path.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(self.public_url(path))
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        lock(&self.objects)
            .get(path)
            .map(|object| object.bytes.clone())
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn delete(&self, paths: &[String]) -> Result<(), StoreError> {
        let mut objects = lock(&self.objects);
        for path in paths {
            objects.remove(path);
        }
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.bucket, path)
    }
}

#[derive(Debug, Default)]
struct Tables {
    images: HashMap<String, ImageRecord>,
    tasks: HashMap<String, TaskRecord>,
    task_images: Vec<TaskImage>,
}

/// Metadata store keeping records in memory.
#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    tables: Mutex<Tables>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image_count(&self) -> usize {
        lock(&self.tables).images.len()
    }

    pub fn task_count(&self) -> usize {
        lock(&self.tables).tasks.len()
    }

    /// Tasks owned by `user_id`, oldest first.
    pub fn tasks_for_user(&self, user_id: &str) -> Vec<TaskRecord> {
        let tables = lock(&self.tables);
        let mut tasks: Vec<TaskRecord> = tables
            .tasks
            .values()
            .filter(|task| task.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect();
        tasks.sort_by_key(|task| task.created_at);
        tasks
    }
}

impl MetadataStore for InMemoryMetadataStore {
    async fn insert_image(&self, image: NewImage) -> Result<ImageRecord, StoreError> {
        let record = ImageRecord {
            id: Uuid::new_v4().to_string(),
            original_name: image.original_name,
            storage_path: image.storage_path,
            width: image.width,
            height: image.height,
            file_size: image.file_size,
            created_at: Utc::now(),
        };
        lock(&self.tables)
            .images
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn images_by_ids(&self, ids: &[String]) -> Result<Vec<ImageRecord>, StoreError> {
        let tables = lock(&self.tables);
        // HashMap iteration order, like a database without ORDER BY
        Ok(tables
            .images
            .values()
            .filter(|image| ids.contains(&image.id))
            .cloned()
            .collect())
    }

    async fn task_by_id(&self, id: &str) -> Result<Option<TaskRecord>, StoreError> {
        Ok(lock(&self.tables).tasks.get(id).cloned())
    }

    async fn task_images(&self, task_id: &str) -> Result<Vec<TaskImageEntry>, StoreError> {
        let tables = lock(&self.tables);
        let mut entries: Vec<TaskImageEntry> = tables
            .task_images
            .iter()
            .filter(|link| link.task_id == task_id)
            .filter_map(|link| {
                tables.images.get(&link.image_id).map(|image| TaskImageEntry {
                    sort_order: link.sort_order,
                    image: image.clone(),
                })
            })
            .collect();
        entries.sort_by_key(|entry| entry.sort_order);
        Ok(entries)
    }

    async fn insert_task(&self, task: NewTask) -> Result<TaskRecord, StoreError> {
        let now = Utc::now();
        let record = TaskRecord {
            id: Uuid::new_v4().to_string(),
            user_id: task.user_id,
            name: task.name,
            direction: task.direction,
            status: task.status,
            export_url: task.export_url,
            created_at: now,
            updated_at: now,
        };
        lock(&self.tables)
            .tasks
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn link_task_images(&self, links: &[TaskImage]) -> Result<(), StoreError> {
        let mut tables = lock(&self.tables);
        for link in links {
            if !tables.tasks.contains_key(&link.task_id) {
                return Err(StoreError::NotFound(format!("task {}", link.task_id)));
            }
            if !tables.images.contains_key(&link.image_id) {
                return Err(StoreError::NotFound(format!("image {}", link.image_id)));
            }
        }
        tables.task_images.extend_from_slice(links);
        Ok(())
    }

    async fn complete_task(&self, task_id: &str, export_url: &str) -> Result<(), StoreError> {
        let mut tables = lock(&self.tables);
        let task = tables
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| StoreError::NotFound(format!("task {task_id}")))?;
        task.status = TaskStatus::Completed;
        task.export_url = Some(export_url.to_string());
        task.updated_at = Utc::now();
        Ok(())
    }
}

/// Identity provider with a fixed set of tokens and API keys.
#[derive(Debug, Default)]
pub struct StaticIdentityProvider {
    tokens: HashMap<String, Principal>,
    api_keys: HashMap<String, Principal>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, principal: Principal) -> Self {
        self.tokens.insert(token.into(), principal);
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>, principal: Principal) -> Self {
        self.api_keys.insert(key.into(), principal);
        self
    }
}

impl IdentityProvider for StaticIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<Principal, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }

    async fn lookup_api_key(&self, key: &str) -> Result<Principal, AuthError> {
        self.api_keys
            .get(key)
            .cloned()
            .ok_or(AuthError::InvalidApiKey)
    }
}

/// Fetcher serving canned responses keyed by URL.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    responses: HashMap<String, Vec<u8>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.responses.insert(url.into(), bytes);
        self
    }
}

impl RemoteFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.responses
            .get(url)
            .cloned()
            .ok_or(FetchError::Status { status: 404 })
    }
}
