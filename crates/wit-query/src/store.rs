//! Dataset file storage.
//!
//! A [`Dataset`] snapshot is kept as a JSON file. By default it lives in the
//! platform data directory (`~/.local/share/wit/dataset.json` on Linux), but
//! any path can be used.
//!
//! Both synchronous and asynchronous I/O methods are provided:
//! - `save()`, `load()` - Synchronous methods using `std::fs`
//! - `save_async()`, `load_async()` - Asynchronous methods using `tokio::fs`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use thiserror::Error;

use crate::Dataset;

/// Default dataset filename.
const DATASET_FILENAME: &str = "dataset.json";

/// Application qualifier (for platform paths).
const QUALIFIER: &str = "";

/// Application organization (for platform paths).
const ORGANIZATION: &str = "";

/// Application name (for platform paths).
const APPLICATION: &str = "wit";

/// Errors that can occur during dataset storage operations.
#[derive(Debug, Error)]
pub enum DatasetStoreError {
    /// Failed to determine the platform data directory.
    #[error("failed to determine data directory: no valid home directory found")]
    NoDataDir,

    /// I/O error during file read.
    #[error("failed to read dataset file '{path}': {source}")]
    ReadError {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error during file write.
    #[error("failed to write dataset file '{path}': {source}")]
    WriteError {
        /// The path that failed to write.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error during directory creation.
    #[error("failed to create data directory '{path}': {source}")]
    CreateDirError {
        /// The directory path that failed to create.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file does not hold a valid dataset.
    #[error("invalid dataset file '{path}': {source}")]
    ParseError {
        /// The path that failed to parse.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DatasetStoreError {
    /// Returns true if the error means the dataset file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DatasetStoreError::ReadError { source, .. } if source.kind() == io::ErrorKind::NotFound
        )
    }
}

/// Result type for dataset store operations.
pub type Result<T> = std::result::Result<T, DatasetStoreError>;

/// Persistent storage for a [`Dataset`].
///
/// # Example
///
/// ```no_run
/// use wit_query::{Dataset, DatasetStore};
///
/// let store = DatasetStore::new()?;
/// let dataset = store.load_or_default()?;
/// store.save(&dataset)?;
/// # Ok::<(), wit_query::DatasetStoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DatasetStore {
    /// Path to the dataset file.
    path: PathBuf,
}

impl DatasetStore {
    /// Creates a store at the default platform path.
    ///
    /// # Errors
    ///
    /// Returns `DatasetStoreError::NoDataDir` if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        let path = Self::default_path()?;
        Ok(Self { path })
    }

    /// Creates a store for the given file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the default dataset path.
    ///
    /// On Linux: `~/.local/share/wit/dataset.json`
    /// On macOS: `~/Library/Application Support/wit/dataset.json`
    /// On Windows: `C:\Users\<User>\AppData\Roaming\wit\data\dataset.json`
    ///
    /// # Errors
    ///
    /// Returns `DatasetStoreError::NoDataDir` if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .ok_or(DatasetStoreError::NoDataDir)?;

        Ok(project_dirs.data_dir().join(DATASET_FILENAME))
    }

    /// Returns the path to the dataset file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the dataset file exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn decode(&self, contents: &str) -> Result<Dataset> {
        serde_json::from_str(contents).map_err(|e| DatasetStoreError::ParseError {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Loads the dataset from disk.
    ///
    /// # Errors
    ///
    /// - Returns `DatasetStoreError::ReadError` if the file cannot be read.
    /// - Returns `DatasetStoreError::ParseError` if the file is not a valid dataset.
    pub fn load(&self) -> Result<Dataset> {
        let contents =
            fs::read_to_string(&self.path).map_err(|e| DatasetStoreError::ReadError {
                path: self.path.clone(),
                source: e,
            })?;
        self.decode(&contents)
    }

    /// Loads the dataset, returning an empty one if the file doesn't exist.
    pub fn load_or_default(&self) -> Result<Dataset> {
        match self.load() {
            Err(e) if e.is_not_found() => Ok(Dataset::default()),
            other => other,
        }
    }

    /// Saves the dataset atomically (temp file + rename), creating the parent
    /// directory when needed.
    pub fn save(&self, dataset: &Dataset) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| DatasetStoreError::CreateDirError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(dataset)?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &json).map_err(|e| DatasetStoreError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|e| DatasetStoreError::WriteError {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Async I/O Methods
    // =========================================================================

    /// Loads the dataset from disk asynchronously.
    ///
    /// This is the async equivalent of [`load()`](Self::load).
    pub async fn load_async(&self) -> Result<Dataset> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            DatasetStoreError::ReadError {
                path: self.path.clone(),
                source: e,
            }
        })?;
        self.decode(&contents)
    }

    /// Loads the dataset asynchronously, returning an empty one if the file
    /// doesn't exist.
    pub async fn load_or_default_async(&self) -> Result<Dataset> {
        match self.load_async().await {
            Err(e) if e.is_not_found() => Ok(Dataset::default()),
            other => other,
        }
    }

    /// Saves the dataset asynchronously using atomic write.
    pub async fn save_async(&self, dataset: &Dataset) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DatasetStoreError::CreateDirError {
                    path: parent.to_path_buf(),
                    source: e,
                }
            })?;
        }

        let json = serde_json::to_string_pretty(dataset)?;

        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &json)
            .await
            .map_err(|e| DatasetStoreError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| DatasetStoreError::WriteError {
                path: self.path.clone(),
                source: e,
            })?;

        Ok(())
    }
}
