// Copyright © 2024 Assets Core. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Directory Resolver
//!
//! Resolves the configured assets directory against the build's input
//! directory and, when the host fires the *directories resolved* event,
//! publishes the result to templates and to the host's file watcher.

use std::sync::Arc;

use log::info;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::context::AssetsContext;
use crate::core::error::Result;
use crate::core::traits::Registry;
use crate::directories::Directories;
use crate::path;
use crate::url::ASSET_URL_NAME;

/// Global data key holding the assets directory.
pub const ASSETS_DIR_DATA: &str = "assetsDir";
/// Global data key holding the assets directory relative to the input dir.
pub const ASSETS_DIR_RELATIVE_DATA: &str = "assetsDirRelative";

/// Where the assets of a build live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDirectoryResolution {
    /// The assets root below the input directory, ending in exactly one
    /// `/` (e.g. `src/assets/`).
    pub absolute_dir: String,
    /// The assets root relative to the input directory, without a leading
    /// `./` or a trailing `/` (e.g. `assets`).
    pub relative_dir: String,
    /// The normalised input directory the resolution was computed against.
    pub input_dir: String,
}

/// Resolves the assets directory for a build.
///
/// Pure and total: malformed input normalises to `.`-equivalent paths.
///
/// ```
/// use assets_core::resolver::resolve;
///
/// let resolution = resolve("./src", "./assets/");
/// assert_eq!(resolution.absolute_dir, "src/assets/");
/// assert_eq!(resolution.relative_dir, "assets");
/// ```
pub fn resolve(input_dir: &str, raw_key: &str) -> AssetDirectoryResolution {
    let input_dir = clean(input_dir);
    let relative_dir = clean(raw_key);
    let absolute_dir =
        path::add_trailing_slash(&path::join(&input_dir, &relative_dir));

    AssetDirectoryResolution {
        absolute_dir,
        relative_dir,
        input_dir,
    }
}

/// Builds one watch target per glob pattern.
///
/// Relative patterns are anchored on the assets root, with glob syntax in
/// the root escaped; absolute patterns are kept as they are.
pub fn watch_targets(
    resolution: &AssetDirectoryResolution,
    patterns: &[String],
) -> Vec<String> {
    let root = globset::escape(&resolution.absolute_dir);
    patterns
        .iter()
        .map(|pattern| {
            let pattern = path::to_slash(pattern);
            if path::is_absolute(&pattern) {
                pattern
            } else {
                path::join(&root, &pattern)
            }
        })
        .collect()
}

/// Handles the host's *directories resolved* event.
///
/// Defines the virtual assets directory on `directories`, publishes the
/// `assetsDir` and `assetsDirRelative` global data, registers the
/// `assetUrl` filter and shortcode and adds the watch targets.
///
/// # Errors
///
/// Fails if the directories object already has an entry under the
/// configured key.
pub fn on_directories_resolved(
    context: &AssetsContext,
    directories: &mut Directories,
    registry: &mut dyn Registry,
) -> Result<()> {
    let input_dir = match directories.input() {
        "" => "./",
        input => input,
    };
    let resolution = context.resolve(input_dir);

    directories.define_virtual(
        context.config().dir_key.clone(),
        resolution.absolute_dir.clone(),
    )?;

    registry.add_global_data(
        ASSETS_DIR_DATA,
        JsonValue::String(resolution.absolute_dir.clone()),
    );
    registry.add_global_data(
        ASSETS_DIR_RELATIVE_DATA,
        JsonValue::String(resolution.relative_dir.clone()),
    );

    let asset_url = context.urls().to_template_function();
    registry.add_filter(ASSET_URL_NAME, Arc::clone(&asset_url));
    registry.add_shortcode(ASSET_URL_NAME, asset_url);

    for target in watch_targets(resolution, &context.config().patterns) {
        registry.add_watch_target(target);
    }

    if context.verbose() {
        info!("[assets-core] assetsDir = {}", resolution.absolute_dir);
        info!(
            "[assets-core] passthroughOutput = {}",
            context.urls().prefix()
        );
    }
    Ok(())
}

fn clean(raw: &str) -> String {
    let normalized = path::normalize(raw.trim());
    match path::strip_trailing_slash(&normalized) {
        "" => ".".to_string(),
        stripped => stripped.to_string(),
    }
}
