//! Command implementations for the wit CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod completions;
pub mod config;
pub mod filter;
pub mod links;
pub mod list;
pub mod search;

use std::path::PathBuf;

use wit_query::{Dataset, DatasetStore};

use crate::cli::Cli;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Filter parsing error.
    #[error("filter error: {0}")]
    Filter(#[from] wit_query::filter::FilterError),

    /// Listing or search error.
    #[error("{0}")]
    Listing(#[from] wit_query::listing::ListingError),

    /// Known-URL registry error.
    #[error("registry error: {0}")]
    Registry(#[from] wit_query::registry::RegistryError),

    /// Dataset store error.
    #[error("dataset error: {0}")]
    DatasetStore(#[from] wit_query::DatasetStoreError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A command argument has an invalid value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
    /// Whether to be verbose.
    pub verbose: bool,
    /// Dataset file given on the command line.
    pub data_path: Option<PathBuf>,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments.
    ///
    /// Colors are disabled by `--no-color`, by the `NO_COLOR` environment
    /// variable or by `output.color = false` in the config file.
    pub fn from_cli(cli: &Cli, config: &config::Config) -> Self {
        let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color && !no_color_env && config.output.color.unwrap_or(true),
            quiet: cli.quiet,
            verbose: cli.verbose,
            data_path: cli.data.clone(),
        }
    }

    /// Returns the dataset store, resolving the path with priority:
    /// `--data` flag > `data` in config > platform data directory.
    pub fn dataset_store(&self, config: &config::Config) -> Result<DatasetStore> {
        if let Some(path) = self.data_path.as_ref().or(config.data.as_ref()) {
            return Ok(DatasetStore::with_path(path));
        }
        Ok(DatasetStore::new()?)
    }

    /// Loads the dataset, treating a missing file as an empty dataset.
    pub async fn load_dataset(&self, config: &config::Config) -> Result<Dataset> {
        let store = self.dataset_store(config)?;
        if !store.exists() {
            tracing::warn!(path = %store.path().display(), "dataset file not found, using an empty dataset");
        }
        let dataset = store.load_or_default_async().await?;
        tracing::debug!(
            path = %store.path().display(),
            work_items = dataset.work_items.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }
}

/// Parses a UUID argument.
pub fn parse_uuid_arg(name: &str, value: &str) -> Result<uuid::Uuid> {
    uuid::Uuid::parse_str(value.trim())
        .map_err(|_| CommandError::InvalidArgument(format!("{name} must be a UUID, got '{value}'")))
}
