//! Metadata records exchanged with the [`crate::MetadataStore`].

use chrono::{DateTime, Utc};
use pintu_core::Direction;
use serde::{Deserialize, Serialize};

/// A stored image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: String,
    pub original_name: String,
    pub storage_path: String,
    pub width: u32,
    pub height: u32,
    pub file_size: u64,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new image record; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImage {
    pub original_name: String,
    pub storage_path: String,
    pub width: u32,
    pub height: u32,
    pub file_size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Draft,
    Completed,
}

/// A saved collage: an ordered set of images plus a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub direction: Direction,
    pub status: TaskStatus,
    pub export_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub user_id: Option<String>,
    pub name: String,
    pub direction: Direction,
    pub status: TaskStatus,
    pub export_url: Option<String>,
}

/// Link between a task and one of its images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskImage {
    pub task_id: String,
    pub image_id: String,
    pub sort_order: u32,
}

/// An image of a task together with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskImageEntry {
    pub sort_order: u32,
    pub image: ImageRecord,
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Principal {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            roles: vec!["user".to_string()],
        }
    }
}
