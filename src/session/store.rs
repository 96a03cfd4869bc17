// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Config persistence collaborator
//!
//! The builder only needs create and update of a config record. The
//! filesystem store keeps one `<id>.yaml` file per record.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{BuilderError, BuilderResult};

/// Partial update of a config record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigPatch {
    pub config_yaml: Option<String>,
}

/// Storage for config documents
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Store a new record and return its id
    async fn create(&self, yaml: &str) -> BuilderResult<u64>;

    /// Apply a patch to an existing record
    async fn update(&self, id: u64, patch: &ConfigPatch) -> BuilderResult<u64>;

    /// Read a record's document
    async fn fetch(&self, id: u64) -> BuilderResult<String>;
}

/// Default store directory for this user
pub fn default_store_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "gradeflow").map(|dirs| dirs.data_dir().join("configs"))
}

/// Store keeping each record as `<id>.yaml` in a directory
#[derive(Debug, Clone)]
pub struct FilesystemStore {
    dir: PathBuf,
}

impl FilesystemStore {
    /// Open a store, creating its directory if needed
    pub fn new(dir: PathBuf) -> BuilderResult<Self> {
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| BuilderError::Store {
                message: format!("Failed to create store directory '{}': {}", dir.display(), e),
            })?;
        }

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: u64) -> PathBuf {
        self.dir.join(format!("{}.yaml", id))
    }

    /// Ids of all stored records
    pub async fn ids(&self) -> BuilderResult<Vec<u64>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(|e| BuilderError::Store {
            message: format!("Failed to read store directory: {}", e),
        })?;

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| BuilderError::Store {
            message: format!("Failed to read store entry: {}", e),
        })? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u64>().ok())
            {
                ids.push(id);
            }
        }

        ids.sort_unstable();
        Ok(ids)
    }

    async fn write(&self, id: u64, yaml: &str) -> BuilderResult<()> {
        tokio::fs::write(self.record_path(id), yaml)
            .await
            .map_err(|e| BuilderError::Store {
                message: format!("Failed to write config {}: {}", id, e),
            })
    }
}

#[async_trait]
impl ConfigStore for FilesystemStore {
    async fn create(&self, yaml: &str) -> BuilderResult<u64> {
        let id = self.ids().await?.last().map_or(1, |last| last + 1);
        self.write(id, yaml).await?;

        tracing::info!(id, dir = %self.dir.display(), "Created config");
        Ok(id)
    }

    async fn update(&self, id: u64, patch: &ConfigPatch) -> BuilderResult<u64> {
        if !self.record_path(id).exists() {
            return Err(BuilderError::ConfigNotFound { id });
        }

        if let Some(yaml) = &patch.config_yaml {
            self.write(id, yaml).await?;
        }

        tracing::info!(id, "Updated config");
        Ok(id)
    }

    async fn fetch(&self, id: u64) -> BuilderResult<String> {
        let path = self.record_path(id);
        if !path.exists() {
            return Err(BuilderError::ConfigNotFound { id });
        }

        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| BuilderError::FileReadError {
                path,
                error: e.to_string(),
            })
    }
}
