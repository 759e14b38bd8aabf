//! Error types for rule generation, with messages that name the failing resource

use std::path::PathBuf;
use thiserror::Error;

/// Failures while talking to the tool registry
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The request never produced a response (DNS, connect, TLS, interrupted body)
    #[error("Failed to fetch the scan tool metadata from {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The registry answered with a non-success status
    #[error("Failed to fetch the scan tool metadata with status code: {status} ({url})")]
    Status { url: String, status: u16 },

    /// The body was not the expected metadata object
    #[error("Registry response from {url} is not valid scan tool metadata")]
    Malformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures while downloading or scanning the tool archive
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The download request failed before a response arrived
    #[error("Failed to download the scan tool from {url}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The download answered with a non-success status
    #[error("Failed to download the scan tool with status code: {status} ({url})")]
    Status { url: String, status: u16 },

    /// Reading the archive stream failed mid-way
    #[error("Failed to read the scan tool archive stream")]
    Stream {
        #[source]
        source: std::io::Error,
    },

    /// The stream is not a readable ZIP archive
    #[error("Scan tool archive is not a valid ZIP stream: {reason}")]
    Format { reason: String },

    /// The rule entry exists but does not hold a JSON array of rules
    #[error("Failed to parse {entry} in the scan tool archive")]
    Malformed {
        entry: String,
        #[source]
        source: serde_json::Error,
    },

    /// The archive ended without the rule entry
    #[error("Failed to find {entry} in the scan tool archive")]
    EntryNotFound { entry: String },

    /// The blocking scan task panicked or was cancelled
    #[error("Scan tool archive worker failed")]
    Worker {
        #[source]
        source: tokio::task::JoinError,
    },
}

/// Any failure of one generation pass
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// Failures while assembling a generator from configuration
#[derive(Error, Debug)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client itself could not be constructed
    #[error("Failed to create HTTP client")]
    Client {
        #[source]
        source: reqwest::Error,
    },
}

/// Rule cache read/write failures
#[derive(Error, Debug)]
pub enum CacheError {
    /// No cache has been written yet
    #[error("Rule cache file does not exist at {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read rule cache file at {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a JSON array of rules
    #[error("Rule cache file at {path} is corrupted")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to create rule cache directory at {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to save rules into cache at {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize rule catalog")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration loading failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// Neither a home directory nor a platform config directory could be resolved
    #[error("Could not determine the user home directory")]
    NoHomeDir,
}
