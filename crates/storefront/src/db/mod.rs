//! Document storage for the storefront.
//!
//! Products, orders and user records are kept as JSON documents, one file
//! per document:
//!
//! ```text
//! <data_dir>/
//!   products/<id>.json
//!   orders/<id>.json
//!   users/<uid>.json
//! ```
//!
//! Collections are schemaless. Each caller owns the shape of its documents.

pub mod users;

use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

/// Errors that can occur during document operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Filesystem operation failed.
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Document could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored document is corrupted or has the wrong shape.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Document id contains characters that cannot be stored.
    #[error("invalid document id: {0:?}")]
    InvalidId(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// A named collection of JSON documents of type `T`.
pub struct DocumentCollection<T> {
    name: String,
    dir: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for DocumentCollection<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            dir: self.dir.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for DocumentCollection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCollection")
            .field("name", &self.name)
            .field("dir", &self.dir)
            .finish()
    }
}

impl<T> DocumentCollection<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    /// Open the collection `name` under `data_dir`, creating its directory.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidId` if `name` is not a plain
    /// identifier, or `RepositoryError::Io` if the directory cannot be created.
    pub async fn open(data_dir: &Path, name: &str) -> Result<Self, RepositoryError> {
        validate_id(name)?;
        let dir = data_dir.join(name);
        tokio::fs::create_dir_all(&dir).await?;

        Ok(Self {
            name: name.to_owned(),
            dir,
            _marker: PhantomData,
        })
    }

    /// The collection name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert a document under a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the document cannot be written.
    #[instrument(skip(self, doc), fields(collection = %self.name))]
    pub async fn insert(&self, doc: &T) -> Result<String, RepositoryError> {
        let id = Uuid::new_v4().simple().to_string();
        self.put(&id, doc).await?;
        Ok(id)
    }

    /// Write a document under `id`, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the id is invalid or the write fails.
    pub async fn put(&self, id: &str, doc: &T) -> Result<(), RepositoryError> {
        let path = self.path_for(id)?;
        let json = serde_json::to_vec_pretty(doc)?;

        let tmp = self.dir.join(format!(".{id}.tmp"));
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;

        Ok(())
    }

    /// Read the document stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored JSON does not
    /// decode as `T`.
    pub async fn get(&self, id: &str) -> Result<Option<T>, RepositoryError> {
        let path = self.path_for(id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        decode(&self.name, id, &bytes).map(Some)
    }

    /// All documents in the collection, sorted by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the directory cannot be read or any
    /// document is corrupted.
    pub async fn list(&self) -> Result<Vec<(String, T)>, RepositoryError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut ids = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str())
                && validate_id(stem).is_ok()
            {
                ids.push(stem.to_owned());
            }
        }
        ids.sort();

        let mut docs = Vec::with_capacity(ids.len());
        for id in ids {
            let bytes = tokio::fs::read(self.dir.join(format!("{id}.json"))).await?;
            let doc = decode(&self.name, &id, &bytes)?;
            docs.push((id, doc));
        }

        Ok(docs)
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, RepositoryError> {
        validate_id(id)?;
        Ok(self.dir.join(format!("{id}.json")))
    }
}

fn decode<T: DeserializeOwned>(collection: &str, id: &str, bytes: &[u8]) -> Result<T, RepositoryError> {
    serde_json::from_slice(bytes)
        .map_err(|e| RepositoryError::DataCorruption(format!("{collection}/{id}: {e}")))
}

/// Ids become file names, so only `[A-Za-z0-9_-]` is allowed.
fn validate_id(id: &str) -> Result<(), RepositoryError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(RepositoryError::InvalidId(id.to_owned()))
    }
}
