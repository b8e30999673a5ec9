// Copyright © 2024 Assets Core. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Assets Core Library
//!
//! Assets Core is a static site generator plugin that gives a site one
//! configurable assets directory. It resolves the directory against the
//! build's input directory, exposes it to templates, enumerates the files
//! inside it as a collection and optionally mirrors it into the build
//! output.
//!
//! The plugin talks to its host through the traits in [`core::traits`];
//! [`host::MemoryHost`] is an in-process host.

#![doc = include_str!("../README.md")]
#![doc(html_root_url = "https://docs.rs/assets-core")]
#![crate_name = "assets_core"]
#![crate_type = "lib"]

/// Module containing core utilities, such as configuration, error handling
/// and the host traits.
pub mod core {
    /// Handles configuration of the plugin.
    pub mod config;
    /// Contains error types and handling for Assets Core.
    pub mod error;
    /// The plugin and host traits.
    pub mod traits;
}

/// Enumerates the files of the assets directory.
pub mod collection;

/// Per-build state shared by the plugin's handlers.
pub mod context;

/// The host's directory table.
pub mod directories;

/// An in-process host.
pub mod host;

/// Mirrors the assets directory into the output.
pub mod passthrough;

/// Forward-slash path helpers.
pub mod path;

/// The plugin itself.
pub mod plugin;

/// Resolves the assets directory.
pub mod resolver;

/// Public asset URLs.
pub mod url;

pub use crate::collection::AssetRecord;
pub use crate::core::config::{AssetsConfig, ConfigBuilder};
pub use crate::core::error::{AssetsError, Result};
pub use crate::core::traits::{Host, Plugin, Registry};
pub use crate::directories::{Directories, DirectoryConfig};
pub use crate::host::MemoryHost;
pub use crate::plugin::AssetsCore;
pub use crate::resolver::AssetDirectoryResolution;

/// Creates the plugin from a configuration file, with `ASSETS_*`
/// environment variables applied on top.
///
/// # Errors
///
/// Returns an error if the file cannot be read or holds invalid options.
pub fn from_config_file<P: AsRef<std::path::Path>>(
    path: P,
) -> Result<AssetsCore> {
    let config = ConfigBuilder::new()
        .with_file(path.as_ref())
        .with_env_prefix("ASSETS_")
        .build()?;
    Ok(AssetsCore::new(config))
}
