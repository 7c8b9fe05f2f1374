//! Pintu Service - request flows over the core pipeline
//!
//! Sits between HTTP routing and [`pintu_core`]. Each flow validates its typed
//! request, talks to storage through collaborator traits, and runs the CPU-bound
//! pipeline stages on blocking threads:
//!
//! - [`CollageService::upload`] - compress, probe, store, record
//! - [`CollageService::stitch`] - resolve sources in order, stitch, store
//! - [`CollageService::export_task`] - stitch a saved task and mark it completed
//!
//! Collaborators are [`ObjectStore`], [`MetadataStore`], [`IdentityProvider`]
//! and [`RemoteFetcher`]. In-memory versions live in [`memory`];
//! [`HttpFetcher`] downloads URL sources with `reqwest`.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod records;
pub mod requests;
pub mod resolve;
pub mod service;
pub mod source;
pub mod traits;

pub use auth::Credential;
pub use config::ServiceConfig;
pub use error::{AuthError, FetchError, ServiceError, StoreError};
pub use http::HttpFetcher;
pub use memory::{InMemoryMetadataStore, InMemoryObjectStore, StaticFetcher, StaticIdentityProvider};
pub use records::{
    ImageRecord, NewImage, NewTask, Principal, TaskImage, TaskImageEntry, TaskRecord, TaskStatus,
};
pub use requests::{ExportResponse, StitchRequest, StitchResponse, UploadRequest, UploadResponse};
pub use resolve::resolve_sources;
pub use service::CollageService;
pub use source::{ImageSource, SourceRef};
pub use traits::{IdentityProvider, MetadataStore, ObjectStore, RemoteFetcher};
