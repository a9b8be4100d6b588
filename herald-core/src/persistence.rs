//! Last generated blog post, kept in a small JSON file

use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{HeraldError, Result};

#[derive(Debug, Default, Serialize, Deserialize)]
struct BlogFile {
    #[serde(default)]
    blog_content: String,
}

/// File-backed store for the most recent blog post. Last write wins.
#[derive(Debug, Clone)]
pub struct BlogStore {
    path: PathBuf,
}

impl BlogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn save(&self, content: &str) -> Result<()> {
        let body = serde_json::to_vec(&BlogFile {
            blog_content: content.to_string(),
        })?;
        tokio::fs::write(&self.path, body).await.map_err(|e| {
            HeraldError::Persistence(format!("cannot write {}: {}", self.path.display(), e))
        })
    }

    /// Saved content, or an empty string when nothing has been saved.
    pub async fn load(&self) -> Result<String> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(String::new()),
            Err(e) => {
                return Err(HeraldError::Persistence(format!(
                    "cannot read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let file: BlogFile = serde_json::from_slice(&bytes)?;
        Ok(file.blog_content)
    }

    /// Remove the saved content. Clearing an empty store is not an error.
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(HeraldError::Persistence(format!(
                "cannot remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}
