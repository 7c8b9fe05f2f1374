//! Collaborator interfaces.
//!
//! The request layer never talks to a concrete database, bucket or identity
//! backend; it is generic over these traits. Every returned future is `Send`
//! so flows can run on a multi-threaded runtime.

use std::future::Future;

use crate::error::{AuthError, FetchError, StoreError};
use crate::records::{
    ImageRecord, NewImage, NewTask, Principal, TaskImage, TaskImageEntry, TaskRecord,
};

/// Blob storage addressed by path within one bucket.
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` at `path` (overwriting) and return its public URL.
    fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    /// Read the object at `path`. `StoreError::NotFound` if absent.
    fn get(&self, path: &str) -> impl Future<Output = Result<Vec<u8>, StoreError>> + Send;

    /// Remove objects; missing paths are ignored. Used to drop an upload
    /// whose record could not be written.
    fn delete(&self, paths: &[String]) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Public URL for `path`. Does not check existence.
    fn public_url(&self, path: &str) -> String;
}

/// Persistent image and task records.
pub trait MetadataStore: Send + Sync {
    fn insert_image(
        &self,
        image: NewImage,
    ) -> impl Future<Output = Result<ImageRecord, StoreError>> + Send;

    /// Records for `ids`, in no particular order. Unknown ids are omitted.
    fn images_by_ids(
        &self,
        ids: &[String],
    ) -> impl Future<Output = Result<Vec<ImageRecord>, StoreError>> + Send;

    fn task_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<TaskRecord>, StoreError>> + Send;

    /// Images of a task ordered by ascending `sort_order`.
    fn task_images(
        &self,
        task_id: &str,
    ) -> impl Future<Output = Result<Vec<TaskImageEntry>, StoreError>> + Send;

    fn insert_task(
        &self,
        task: NewTask,
    ) -> impl Future<Output = Result<TaskRecord, StoreError>> + Send;

    fn link_task_images(
        &self,
        links: &[TaskImage],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Mark a task completed with the URL of its export.
    fn complete_task(
        &self,
        task_id: &str,
        export_url: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Resolves credentials to principals.
pub trait IdentityProvider: Send + Sync {
    /// Verify a session token.
    fn verify_token(&self, token: &str)
        -> impl Future<Output = Result<Principal, AuthError>> + Send;

    /// Look up the owner of an API key.
    fn lookup_api_key(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Principal, AuthError>> + Send;
}

/// Downloads externally hosted images.
pub trait RemoteFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}
