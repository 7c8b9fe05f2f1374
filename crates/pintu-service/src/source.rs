//! Where a stitch input comes from.
//!
//! A source is either a stored image record (`id`), an object-store path, or
//! an externally hosted URL. Dimension hints travel with a source but are never
//! trusted for layout: every buffer is probed again after it is fetched.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reference to one input image.
///
/// Serialized externally tagged, e.g. `{"id": "..."}` or `{"url": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceRef {
    /// A record in the metadata store.
    Id(String),
    /// A path inside the object store.
    Path(String),
    /// An `http(s)` URL fetched directly.
    Url(String),
}

impl SourceRef {
    /// Check the reference is well-formed before any I/O happens.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            SourceRef::Id(id) if id.trim().is_empty() => Err("image id is empty".to_string()),
            SourceRef::Path(path) if path.trim().is_empty() => {
                Err("storage path is empty".to_string())
            }
            SourceRef::Url(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                Err(format!("unsupported URL scheme: {url}"))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRef::Id(id) => write!(f, "id {id}"),
            SourceRef::Path(path) => write!(f, "path {path}"),
            SourceRef::Url(url) => write!(f, "url {url}"),
        }
    }
}

/// A reference plus optional, untrusted dimension hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    pub reference: SourceRef,
    pub width_hint: Option<u32>,
    pub height_hint: Option<u32>,
}

impl ImageSource {
    pub fn new(reference: SourceRef) -> Self {
        Self {
            reference,
            width_hint: None,
            height_hint: None,
        }
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::new(SourceRef::Id(id.into()))
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self::new(SourceRef::Path(path.into()))
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::new(SourceRef::Url(url.into()))
    }

    /// Attach recorded dimensions. Zero is treated as unknown.
    pub fn with_hints(mut self, width: u32, height: u32) -> Self {
        self.width_hint = (width > 0).then_some(width);
        self.height_hint = (height > 0).then_some(height);
        self
    }

    /// Both hints, when present.
    pub fn hints(&self) -> Option<(u32, u32)> {
        Some((self.width_hint?, self.height_hint?))
    }
}

impl From<SourceRef> for ImageSource {
    fn from(reference: SourceRef) -> Self {
        Self::new(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_hints_are_unknown() {
        let source = ImageSource::path("uploads/a.png").with_hints(0, 480);
        assert_eq!(source.width_hint, None);
        assert_eq!(source.height_hint, Some(480));
        assert_eq!(source.hints(), None);

        let source = ImageSource::path("uploads/a.png").with_hints(640, 480);
        assert_eq!(source.hints(), Some((640, 480)));
    }

    #[test]
    fn test_validate() {
        assert!(SourceRef::Id("abc".into()).validate().is_ok());
        assert!(SourceRef::Id("  ".into()).validate().is_err());
        assert!(SourceRef::Path(String::new()).validate().is_err());
        assert!(SourceRef::Url("https://cdn.example.com/a.jpg".into())
            .validate()
            .is_ok());
        assert!(SourceRef::Url("file:///etc/passwd".into()).validate().is_err());
    }

    #[test]
    fn test_display_names_kind() {
        assert_eq!(SourceRef::Id("42".into()).to_string(), "id 42");
        assert_eq!(
            SourceRef::Url("http://x/y.png".into()).to_string(),
            "url http://x/y.png"
        );
    }
}
