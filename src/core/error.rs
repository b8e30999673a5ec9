// Copyright © 2024 Assets Core. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Error Handling for Assets Core
//!
//! This module defines the error type shared by the directory resolver,
//! the asset enumerator, the passthrough registrar and the configuration
//! layer. The `thiserror` crate is used to derive the `Display` and
//! `Error` implementations.
//!
//! Only failures that the host is expected to act on surface as errors.
//! A failed filesystem scan or a missing assets directory at passthrough
//! time are recovered inside the plugin and never reach the caller.

use std::path::PathBuf;
use thiserror::Error;

/// A unified result type for the Assets Core library.
pub type Result<T> = std::result::Result<T, AssetsError>;

/// The main error type for Assets Core.
#[derive(Error, Debug)]
pub enum AssetsError {
    /// Error related to loading or applying configuration.
    ///
    /// Raised for unreadable or unparsable configuration files and for
    /// override values that cannot be converted to the target type.
    #[error("Configuration error: {message}.")]
    ConfigError {
        /// Detailed description of the configuration error.
        message: String,
        /// Optional path of the configuration file that caused the error.
        path: Option<PathBuf>,
    },

    /// A configured glob pattern could not be compiled.
    #[error("Invalid glob pattern `{pattern}`: {source}")]
    PatternError {
        /// The pattern as it was handed to the glob engine.
        pattern: String,
        /// The underlying glob parse error.
        #[source]
        source: globset::Error,
    },

    /// A filesystem scan failed.
    ///
    /// The enumerator recovers from this variant and yields an empty
    /// collection instead.
    #[error("Asset scan error: {message}.")]
    ScanError {
        /// Description of the scan failure.
        message: String,
        /// Optional source error providing additional context.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An entry of the directories object was defined a second time.
    #[error("Directory `{key}` is already defined and cannot be redefined.")]
    DirectoryRedefined {
        /// The directory key.
        key: String,
    },

    /// A collection was requested that no plugin registered.
    #[error("Unknown collection `{name}`.")]
    UnknownCollection {
        /// The requested collection name.
        name: String,
    },

    /// A record could not be converted into template data.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error encountered during file operations.
    #[error("File IO error at `{path:?}`: {source}")]
    IOError {
        /// Path associated with the IO error.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for AssetsError {
    /// Converts a standard IO error into an `AssetsError::IOError` with an
    /// empty path.
    fn from(source: std::io::Error) -> Self {
        AssetsError::IOError {
            path: PathBuf::new(),
            source,
        }
    }
}

impl AssetsError {
    /// Creates a `ConfigError` with a specific message.
    ///
    /// # Parameters
    /// - `message`: A description of the configuration error.
    /// - `path`: Optional path of the configuration file causing the error.
    pub fn config_error<S: Into<String>>(
        message: S,
        path: Option<PathBuf>,
    ) -> Self {
        AssetsError::ConfigError {
            message: message.into(),
            path,
        }
    }

    /// Creates a `ScanError` with a message and optional source.
    pub fn scan_error<S: Into<String>>(
        message: S,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        AssetsError::ScanError {
            message: message.into(),
            source,
        }
    }

    /// Wraps a glob parse error together with the offending pattern.
    pub fn pattern_error<S: Into<String>>(
        pattern: S,
        source: globset::Error,
    ) -> Self {
        AssetsError::PatternError {
            pattern: pattern.into(),
            source,
        }
    }

    /// Wraps an IO error as an `IOError` variant with the specified path.
    pub fn io_error(path: PathBuf, source: std::io::Error) -> Self {
        AssetsError::IOError { path, source }
    }
}
