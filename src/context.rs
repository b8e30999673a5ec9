// Copyright © 2024 Assets Core. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Build Context
//!
//! State of one plugin instance for one build. The context is created when
//! the plugin registers with a host and is shared by the resolver, the
//! enumerator and the passthrough registrar.
//!
//! The directory resolution is computed at most once per context, by
//! whichever of the *directories resolved* handler and the collection
//! producer runs first. Both compute it from the same inputs, so the
//! winner is not observable.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::warn;

use crate::core::config::AssetsConfig;
use crate::directories::DirectoryConfig;
use crate::resolver::{resolve, AssetDirectoryResolution};
use crate::url::AssetUrl;

/// Per-build state of the assets plugin.
#[derive(Debug)]
pub struct AssetsContext {
    config: AssetsConfig,
    dir_config: DirectoryConfig,
    working_dir: PathBuf,
    urls: AssetUrl,
    resolution: OnceLock<AssetDirectoryResolution>,
}

impl AssetsContext {
    /// Creates a context from the plugin options, the host's configured
    /// directory table and the project working directory.
    ///
    /// Empty `dir_key` and `passthrough_output` options take their defaults.
    pub fn new<P: Into<PathBuf>>(
        config: AssetsConfig,
        dir_config: DirectoryConfig,
        working_dir: P,
    ) -> Self {
        let config = config.or_defaults();
        let urls = AssetUrl::new(&config.passthrough_output);
        Self {
            config,
            dir_config,
            working_dir: working_dir.into(),
            urls,
            resolution: OnceLock::new(),
        }
    }

    /// The plugin options.
    pub fn config(&self) -> &AssetsConfig {
        &self.config
    }

    /// The host's configured directory table, as seen at registration.
    pub fn dir_config(&self) -> &DirectoryConfig {
        &self.dir_config
    }

    /// The project working directory.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// The `assetUrl` mapping for the configured output prefix.
    pub fn urls(&self) -> &AssetUrl {
        &self.urls
    }

    /// Whether plugin log output is enabled.
    pub fn verbose(&self) -> bool {
        self.config.verbose
    }

    /// The raw assets directory: the host's `dir` entry under the
    /// configured key, or the key itself.
    pub fn raw_dir(&self) -> &str {
        self.dir_config
            .get(&self.config.dir_key)
            .filter(|dir| !dir.is_empty())
            .unwrap_or(self.config.dir_key.as_str())
    }

    /// The resolution, if it has been computed.
    pub fn resolution(&self) -> Option<&AssetDirectoryResolution> {
        self.resolution.get()
    }

    /// Returns the resolution, computing it against `input_dir` if this is
    /// the first request of the build.
    pub fn resolve(&self, input_dir: &str) -> &AssetDirectoryResolution {
        self.resolution
            .get_or_init(|| resolve(input_dir, self.raw_dir()))
    }

    /// Returns the resolution, falling back to the configured input
    /// directory when the *directories resolved* event has not fired yet.
    pub fn resolve_or_fallback(&self) -> &AssetDirectoryResolution {
        if let Some(resolution) = self.resolution.get() {
            return resolution;
        }
        if self.verbose() {
            warn!("[assets-core] Fallback directory resolution");
        }
        self.resolve(&self.dir_config.input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(dir_config: DirectoryConfig) -> AssetsContext {
        AssetsContext::new(AssetsConfig::default(), dir_config, "/site")
    }

    #[test]
    fn test_raw_dir_prefers_host_entry() {
        let ctx = context(
            DirectoryConfig::new("src", "dist").with_dir("assets", "media"),
        );
        assert_eq!(ctx.raw_dir(), "media");

        let ctx = context(DirectoryConfig::new("src", "dist"));
        assert_eq!(ctx.raw_dir(), "assets");

        let ctx =
            context(DirectoryConfig::new("src", "dist").with_dir("assets", ""));
        assert_eq!(ctx.raw_dir(), "assets");
    }

    #[test]
    fn test_resolution_is_computed_once() {
        let ctx = context(DirectoryConfig::new("src", "dist"));
        assert!(ctx.resolution().is_none());

        let first = ctx.resolve("src").clone();
        let second = ctx.resolve("elsewhere").clone();
        assert_eq!(first, second);
        assert_eq!(first.absolute_dir, "src/assets/");
    }

    #[test]
    fn test_fallback_matches_event_resolution() {
        let fallback = context(DirectoryConfig::new("src", "dist"));
        let event = context(DirectoryConfig::new("src", "dist"));

        assert_eq!(
            fallback.resolve_or_fallback(),
            event.resolve("src")
        );
    }

    #[test]
    fn test_empty_options_take_defaults() {
        let ctx = AssetsContext::new(
            AssetsConfig::default()
                .with_dir_key("")
                .with_passthrough_output(""),
            DirectoryConfig::new("src", "dist"),
            "/site",
        );

        assert_eq!(ctx.config().dir_key, "assets");
        assert_eq!(ctx.raw_dir(), "assets");
        assert_eq!(ctx.resolve("src").absolute_dir, "src/assets/");
        assert_eq!(ctx.urls().prefix(), "/assets/");
        assert_eq!(ctx.urls().url_for(Some("img/a.png")), "/assets/img/a.png");
    }

    #[test]
    fn test_urls_follow_config() {
        let ctx = AssetsContext::new(
            AssetsConfig::default().with_passthrough_output("static"),
            DirectoryConfig::default(),
            "/site",
        );
        assert_eq!(ctx.urls().prefix(), "/static/");
        assert_eq!(ctx.working_dir(), Path::new("/site"));
    }
}
