//! Per-environment fixture documents
//!
//! `<dir>/<environment>.json`:
//!
//! ```json
//! {
//!   "baseUrl": "https://jsonplaceholder.typicode.com",
//!   "testData": {
//!     "posts": { "validPost": {...}, "invalidPost": {...} },
//!     "comments": { "validComment": {...}, "invalidComment": {...} }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::DataLoadError;
use crate::resources::{CommentPayload, PostPayload};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDataDocument {
    pub base_url: String,
    pub test_data: TestDataContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDataContent {
    pub posts: PostFixtures,
    pub comments: CommentFixtures,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFixtures {
    pub valid_post: PostPayload,
    pub invalid_post: PostPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentFixtures {
    pub valid_comment: CommentPayload,
    pub invalid_comment: CommentPayload,
}

/// Loads fixture documents from one directory. Nothing is cached.
#[derive(Debug, Clone)]
pub struct TestDataLoader {
    dir: PathBuf,
}

impl TestDataLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `environment`; the name is trimmed and lower-cased.
    pub fn path_for(&self, environment: &str) -> PathBuf {
        self.dir
            .join(format!("{}.json", environment.trim().to_lowercase()))
    }

    pub async fn load(&self, environment: &str) -> Result<TestDataDocument, DataLoadError> {
        let path = self.path_for(environment);
        debug!("Loading test data from {}", path.display());

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DataLoadError::NotFound {
                    environment: environment.to_string(),
                    path,
                })
            }
            Err(source) => return Err(DataLoadError::Io { path, source }),
        };

        serde_json::from_str(&content).map_err(|e| DataLoadError::Malformed {
            path,
            reason: e.to_string(),
        })
    }
}
