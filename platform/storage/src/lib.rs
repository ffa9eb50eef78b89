//! Client side of the content-addressed storage network used for HR
//! document uploads.
//!
//! [`ContentStore`] is the seam: the HTTP bridge client implements it in
//! production and tests swap in fakes. [`SharedContentStore`] builds the
//! client lazily, at most once per process, on the first upload.

mod http;
mod shared;

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use http::{HttpContentStore, Space, StorageSettings, select_space};
pub use shared::{Connector, SharedContentStore};

/// Hash-derived pointer returned by the storage network for an upload.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContentId(String);

impl ContentId {
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, StorageError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(StorageError::InvalidResponse(
                "empty content identifier".into(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file handed over for upload.
#[derive(Clone, Debug)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("storage service rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("unexpected storage response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn upload(&self, file: UploadFile) -> Result<ContentId, StorageError>;
}
