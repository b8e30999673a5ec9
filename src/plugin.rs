// Copyright © 2024 Assets Core. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Assets Core Plugin
//!
//! Wires the resolver, the enumerator and the passthrough registrar into a
//! [`Host`].
//!
//! ## Example
//!
//! ```rust
//! use assets_core::core::config::AssetsConfig;
//! use assets_core::core::traits::Plugin;
//! use assets_core::directories::DirectoryConfig;
//! use assets_core::host::MemoryHost;
//! use assets_core::plugin::AssetsCore;
//!
//! let mut host = MemoryHost::new(DirectoryConfig::new("src", "dist"), ".");
//! let plugin = AssetsCore::new(AssetsConfig::default().with_passthrough(true));
//! host.add_plugin(&plugin).unwrap();
//!
//! host.resolve_directories().unwrap();
//! assert_eq!(host.global_data("assetsDir").unwrap(), "src/assets/");
//! assert_eq!(host.filter("assetUrl", Some("img/a.png")).unwrap(), "/assets/img/a.png");
//! ```

use std::sync::Arc;

use futures::FutureExt;

use crate::collection::{enumerate_json, COLLECTION_NAME};
use crate::context::AssetsContext;
use crate::core::config::AssetsConfig;
use crate::core::error::Result;
use crate::core::traits::{Host, Plugin, Registry};
use crate::directories::Directories;
use crate::passthrough;
use crate::resolver;

/// Display name of the plugin.
pub const PLUGIN_NAME: &str = "assets-core";

/// The assets plugin.
///
/// Every registration creates a fresh [`AssetsContext`]; state never leaks
/// from one build (or one host) into another.
#[derive(Debug, Clone, Default)]
pub struct AssetsCore {
    config: AssetsConfig,
}

impl AssetsCore {
    /// Creates the plugin with the given options.
    pub fn new(config: AssetsConfig) -> Self {
        Self { config }
    }

    /// The plugin options.
    pub fn config(&self) -> &AssetsConfig {
        &self.config
    }

    /// Registers with `host` and returns the build context shared by the
    /// registered handlers.
    pub fn install(&self, host: &mut dyn Host) -> Result<Arc<AssetsContext>> {
        let context = Arc::new(AssetsContext::new(
            self.config.clone(),
            host.dir_config().clone(),
            host.working_dir(),
        ));

        let ctx = Arc::clone(&context);
        host.on_directories_resolved(Box::new(
            move |directories: &mut Directories, registry: &mut dyn Registry| {
                resolver::on_directories_resolved(&ctx, directories, registry)
            },
        ));

        let ctx = Arc::clone(&context);
        host.add_collection(
            COLLECTION_NAME,
            Box::new(move || {
                let ctx = Arc::clone(&ctx);
                async move { enumerate_json(&ctx).await }.boxed()
            }),
        );

        if self.config.passthrough {
            let ctx = Arc::clone(&context);
            host.on_before_build(Box::new(
                move |directories: &Directories, registry: &mut dyn Registry| {
                    passthrough::on_before_build(&ctx, directories, registry)
                },
            ));
        }

        Ok(context)
    }
}

impl Plugin for AssetsCore {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn register(&self, host: &mut dyn Host) -> Result<()> {
        let _ = self.install(host)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AssetsError;
    use crate::directories::DirectoryConfig;
    use crate::host::{MemoryHost, PassthroughCopy};
    use serde_json::Value as JsonValue;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn site() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let assets = temp_dir.path().join("src/assets");
        fs::create_dir_all(assets.join("img")).unwrap();
        fs::write(assets.join("img/a.png"), "png").unwrap();
        fs::write(assets.join("site.css"), "css").unwrap();
        temp_dir
    }

    fn host(temp_dir: &TempDir, dir_config: DirectoryConfig) -> MemoryHost {
        MemoryHost::new(dir_config, temp_dir.path())
    }

    fn input_paths(records: &[JsonValue]) -> BTreeSet<String> {
        records
            .iter()
            .filter_map(|record| record["inputPath"].as_str())
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_default_build() {
        init_logger();
        let temp_dir = site();
        let mut host = host(&temp_dir, DirectoryConfig::new("src", "dist"));
        host.add_plugin(&AssetsCore::default()).unwrap();
        host.build().unwrap();

        assert_eq!(host.global_data("assetsDir").unwrap(), "src/assets/");
        assert_eq!(host.global_data("assetsDirRelative").unwrap(), "assets");
        assert_eq!(
            host.directories().unwrap().get("assets"),
            Some("src/assets/")
        );
        assert_eq!(host.watch_targets(), ["src/assets/**/*".to_string()]);
        assert!(host.passthrough_copies().is_empty());

        assert_eq!(
            host.filter("assetUrl", Some("img/a.png")).as_deref(),
            Some("/assets/img/a.png")
        );
        assert_eq!(
            host.shortcode("assetUrl", None).as_deref(),
            Some("/assets/")
        );

        let records = host.collection("assets").await.unwrap();
        assert_eq!(
            input_paths(&records),
            BTreeSet::from([
                "./src/assets/img/a.png".to_string(),
                "./src/assets/site.css".to_string(),
            ])
        );
        assert!(records.iter().all(|record| record.get("url").is_none()));
    }

    #[tokio::test]
    async fn test_passthrough_build() {
        init_logger();
        let temp_dir = site();
        let mut host = host(&temp_dir, DirectoryConfig::new("src", "dist"));
        let plugin = AssetsCore::new(
            AssetsConfig::default()
                .with_passthrough(true)
                .with_passthrough_output("static")
                .with_verbose(true),
        );
        host.add_plugin(&plugin).unwrap();
        host.build().unwrap();

        assert_eq!(
            host.passthrough_copies(),
            [PassthroughCopy {
                source: "src/assets/".to_string(),
                destination: "/static/".to_string(),
            }]
        );

        let records = host.collection("assets").await.unwrap();
        let png = records
            .iter()
            .find(|record| record["basename"] == "a.png")
            .unwrap();
        assert_eq!(png["url"], "/static/img/a.png");
        assert_eq!(png["slug"], "a");
        assert_eq!(png["extension"], "png");
        assert_eq!(png["outputPath"], "assets/img/a.png");
    }

    #[tokio::test]
    async fn test_collection_before_resolution_matches_after() {
        let temp_dir = site();

        let mut early = host(&temp_dir, DirectoryConfig::new("src", "dist"));
        early.add_plugin(&AssetsCore::default()).unwrap();
        let before = early.collection("assets").await.unwrap();

        let mut late = host(&temp_dir, DirectoryConfig::new("src", "dist"));
        late.add_plugin(&AssetsCore::default()).unwrap();
        late.build().unwrap();
        let after = late.collection("assets").await.unwrap();

        assert_eq!(input_paths(&before), input_paths(&after));
        assert_eq!(before.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_directory_yields_empty_collection() {
        let temp_dir = site();
        let mut host = host(&temp_dir, DirectoryConfig::new("site", "dist"));
        host.add_plugin(&AssetsCore::default()).unwrap();
        host.build().unwrap();

        assert!(host.collection("assets").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_options_keep_default_directory_and_prefix() {
        let temp_dir = site();
        let mut host = host(&temp_dir, DirectoryConfig::new("src", "dist"));
        let plugin = AssetsCore::new(
            AssetsConfig::default()
                .with_dir_key("")
                .with_passthrough_output("")
                .with_passthrough(true),
        );
        host.add_plugin(&plugin).unwrap();
        host.build().unwrap();

        assert_eq!(host.global_data("assetsDir").unwrap(), "src/assets/");
        assert_eq!(
            host.passthrough_copies(),
            [PassthroughCopy {
                source: "src/assets/".to_string(),
                destination: "/assets/".to_string(),
            }]
        );

        let records = host.collection("assets").await.unwrap();
        assert_eq!(records.len(), 2);
        let png = records
            .iter()
            .find(|record| record["basename"] == "a.png")
            .unwrap();
        assert_eq!(png["url"], "/assets/img/a.png");
    }

    #[test]
    fn test_configured_directory_wins_over_dir_key() {
        let temp_dir = site();
        let mut host = host(
            &temp_dir,
            DirectoryConfig::new("src", "dist").with_dir("assets", "media/"),
        );
        host.add_plugin(&AssetsCore::default()).unwrap();
        host.build().unwrap();

        assert_eq!(host.global_data("assetsDir").unwrap(), "src/media/");
        assert_eq!(host.global_data("assetsDirRelative").unwrap(), "media");
    }

    #[test]
    fn test_virtual_directory_cannot_be_redefined() {
        let temp_dir = site();
        let mut host = host(&temp_dir, DirectoryConfig::new("src", "dist"));
        host.add_plugin(&AssetsCore::default()).unwrap();

        assert!(host.resolve_directories().is_ok());
        let result = host.resolve_directories();
        assert!(matches!(
            result,
            Err(AssetsError::DirectoryRedefined { ref key }) if key == "assets"
        ));
    }

    #[test]
    fn test_install_returns_shared_context() {
        let temp_dir = site();
        let mut host = host(&temp_dir, DirectoryConfig::new("src", "dist"));
        let context = AssetsCore::default().install(&mut host).unwrap();

        assert!(context.resolution().is_none());
        let _ = host.resolve_directories().unwrap();
        assert_eq!(
            context.resolution().map(|r| r.absolute_dir.as_str()),
            Some("src/assets/")
        );
    }

    #[test]
    fn test_plugin_name() {
        assert_eq!(AssetsCore::default().name(), "assets-core");
    }
}
