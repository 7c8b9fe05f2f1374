//! Typed request and response bodies.

use pintu_core::Direction;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::source::{ImageSource, SourceRef};

/// A file received by the upload endpoint.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    /// Size reported by the transport; defaults to the buffer length.
    pub declared_size: Option<u64>,
    /// Append the stored image to this task.
    pub task_id: Option<String>,
}

impl UploadRequest {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
            declared_size: None,
            task_id: None,
        }
    }

    pub fn with_task(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    /// Lower-cased extension of the file name including the dot, or "".
    pub fn extension(&self) -> String {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.bytes.is_empty() {
            return Err(ServiceError::Validation("No file uploaded".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Body of the stitch endpoint.
///
/// ```json
/// {"images": [{"id": "..."}, {"url": "https://..."}], "direction": "right"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StitchRequest {
    pub images: Vec<SourceRef>,
    #[serde(default)]
    pub direction: Direction,
}

impl StitchRequest {
    /// Request stitching stored images by id.
    pub fn from_ids<I, S>(ids: I, direction: Direction) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            images: ids.into_iter().map(|id| SourceRef::Id(id.into())).collect(),
            direction,
        }
    }

    /// Check shape and the source-count bound.
    pub fn validate(&self, max_sources: usize) -> Result<(), ServiceError> {
        if self.images.is_empty() {
            return Err(ServiceError::EmptyInput(
                "No images provided".to_string(),
            ));
        }
        if self.images.len() > max_sources {
            return Err(ServiceError::Validation(format!(
                "Too many images: {} (max {max_sources})",
                self.images.len()
            )));
        }
        for (index, reference) in self.images.iter().enumerate() {
            reference
                .validate()
                .map_err(|reason| ServiceError::Validation(format!("image #{index}: {reason}")))?;
        }
        Ok(())
    }

    pub fn sources(&self) -> Vec<ImageSource> {
        self.images.iter().cloned().map(ImageSource::from).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StitchResponse {
    /// Id of the stored result, when the record could be written.
    pub id: Option<String>,
    pub url: String,
    /// Task recording the stitch, for authenticated callers.
    pub task_id: Option<String>,
    pub width: u32,
    pub height: u32,
    pub file_size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    pub download_url: String,
    pub file_size: u64,
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        assert_eq!(UploadRequest::new("Photo.JPG", vec![1]).extension(), ".jpg");
        assert_eq!(UploadRequest::new("a.b.webp", vec![1]).extension(), ".webp");
        assert_eq!(UploadRequest::new("noext", vec![1]).extension(), "");
    }

    #[test]
    fn test_empty_upload_rejected() {
        assert!(matches!(
            UploadRequest::new("a.png", Vec::new()).validate(),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_stitch_request_json() {
        let request: StitchRequest = serde_json::from_str(
            r#"{"images": [{"id": "a"}, {"url": "https://x/b.png"}], "direction": "right"}"#,
        )
        .unwrap();
        assert_eq!(request.direction, Direction::Right);
        assert_eq!(
            request.images,
            vec![
                SourceRef::Id("a".into()),
                SourceRef::Url("https://x/b.png".into())
            ]
        );

        let request: StitchRequest = serde_json::from_str(r#"{"images": [{"id": "a"}]}"#).unwrap();
        assert_eq!(request.direction, Direction::Down);

        assert!(serde_json::from_str::<StitchRequest>(
            r#"{"images": [{"id": "a"}], "direction": "up"}"#
        )
        .is_err());
    }

    #[test]
    fn test_stitch_request_bounds() {
        let empty = StitchRequest::from_ids(Vec::<String>::new(), Direction::Down);
        assert!(matches!(empty.validate(50), Err(ServiceError::EmptyInput(_))));

        let many = StitchRequest::from_ids((0..51).map(|i| i.to_string()), Direction::Down);
        assert!(matches!(many.validate(50), Err(ServiceError::Validation(_))));
        assert!(many.validate(51).is_ok());

        let bad_url = StitchRequest {
            images: vec![SourceRef::Url("ftp://x".into())],
            direction: Direction::Down,
        };
        assert!(matches!(bad_url.validate(50), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_export_response_is_camel_case() {
        let json = serde_json::to_value(ExportResponse {
            download_url: "u".into(),
            file_size: 3,
            width: 1,
            height: 2,
        })
        .unwrap();
        assert_eq!(json["downloadUrl"], "u");
        assert_eq!(json["fileSize"], 3);
    }
}
