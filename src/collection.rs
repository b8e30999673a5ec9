// Copyright © 2024 Assets Core. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Asset Enumerator
//!
//! Produces the `assets` collection: one [`AssetRecord`] per file matched
//! by the configured glob patterns below the assets root.
//!
//! Every call rescans the filesystem. The scan runs on tokio's blocking
//! pool and is the only suspension point of the plugin. A failed scan is
//! not an error: the collection is simply empty. Invalid glob syntax, on
//! the other hand, is a configuration mistake and is returned to the host.
//!
//! The order of the records follows the scan and is not part of the
//! contract. Compare collections by `input_path`.

use std::collections::HashSet;
use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use walkdir::WalkDir;

use crate::context::AssetsContext;
use crate::core::error::{AssetsError, Result};
use crate::path;
use crate::url::AssetUrl;

/// Name of the collection registered with the host.
pub const COLLECTION_NAME: &str = "assets";

/// A file of the assets collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    /// Project-relative source path with a leading `./`.
    pub input_path: String,
    /// Path relative to the input directory.
    pub output_path: String,
    /// File name including the extension.
    pub basename: String,
    /// File name without the extension.
    pub slug: String,
    /// Lowercase extension without the dot, empty if there is none.
    pub extension: String,
    /// Directory containing the file, in the form of `input_path`.
    pub directory: String,
    /// Public URL, present when passthrough copying is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Anchors for turning absolute matches into records.
#[derive(Debug, Clone)]
pub struct RecordMapper {
    working_dir: String,
    input_dir: String,
    assets_dir: String,
    urls: Option<AssetUrl>,
}

impl RecordMapper {
    /// Creates a mapper from absolute, forward-slash anchors.
    ///
    /// `urls` is `Some` when records should carry a public URL.
    pub fn new(
        working_dir: &str,
        input_dir: &str,
        assets_dir: &str,
        urls: Option<AssetUrl>,
    ) -> Self {
        Self {
            working_dir: path::normalize(working_dir),
            input_dir: path::normalize(input_dir),
            assets_dir: path::normalize(assets_dir),
            urls,
        }
    }

    /// Maps an absolute file path onto its record.
    pub fn map(&self, absolute_path: &str) -> AssetRecord {
        let absolute_path = path::normalize(absolute_path);

        let project_relative =
            path::strip_leading_sub_path(&absolute_path, &self.working_dir);
        let input_path = path::add_leading_dot_slash(&project_relative);

        let basename = path::last_segment(&absolute_path).to_string();
        let (slug, extension) = path::split_extension(&basename);
        let (slug, extension) = (slug.to_string(), extension.to_lowercase());

        let output_path =
            path::strip_leading_sub_path(&absolute_path, &self.input_dir);
        let directory = path::parent_dir(&input_path).to_string();

        let url = self.urls.as_ref().map(|urls| {
            let relative =
                path::strip_leading_sub_path(&absolute_path, &self.assets_dir);
            urls.url_for(Some(&relative))
        });

        AssetRecord {
            input_path,
            output_path,
            basename,
            slug,
            extension,
            directory,
            url,
        }
    }
}

/// Enumerates the assets collection for a build.
///
/// Uses the cached directory resolution, or resolves the directory itself
/// when the host has not fired the *directories resolved* event yet.
///
/// # Errors
///
/// Returns [`AssetsError::PatternError`] when a configured glob pattern is
/// invalid. Scan failures are logged (in verbose mode) and yield an empty
/// collection.
pub async fn enumerate(context: &AssetsContext) -> Result<Vec<AssetRecord>> {
    let resolution = context.resolve_or_fallback();
    let working_dir = path::from_path(context.working_dir());

    let assets_dir = path::add_trailing_slash(&path::absolute(
        &working_dir,
        &resolution.absolute_dir,
    ));
    let input_dir = path::absolute(&working_dir, &resolution.input_dir);

    let roots = plan_scan(&assets_dir, &context.config().patterns)?;
    if context.verbose() {
        info!(
            "[assets-core] scanning {} for {:?}",
            assets_dir,
            context.config().patterns
        );
    }

    let entries = match scan(roots).await {
        Ok(entries) => entries,
        Err(e) => {
            if context.verbose() {
                error!("[assets-core] Error scanning assets: {}", e);
            }
            return Ok(Vec::new());
        }
    };

    let urls = context
        .config()
        .passthrough
        .then(|| context.urls().clone());
    let mapper = RecordMapper::new(&working_dir, &input_dir, &assets_dir, urls);

    Ok(entries.iter().map(|entry| mapper.map(entry)).collect())
}

/// Enumerates the collection and converts the records into template data.
pub async fn enumerate_json(context: &AssetsContext) -> Result<Vec<JsonValue>> {
    enumerate(context)
        .await?
        .into_iter()
        .map(|record| serde_json::to_value(record).map_err(AssetsError::from))
        .collect()
}

/// A directory to walk and the globs its files must match.
#[derive(Debug, Clone)]
pub struct ScanRoot {
    base: String,
    matcher: GlobSet,
    anchored: bool,
}

impl ScanRoot {
    /// The directory the walk starts from.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Tests an absolute, forward-slash file path against the globs.
    ///
    /// Anchored roots match the path relative to the base directory,
    /// others match the absolute path.
    pub fn is_match(&self, absolute_path: &str) -> bool {
        if self.anchored {
            let relative =
                path::strip_leading_sub_path(absolute_path, &self.base);
            self.matcher.is_match(relative.as_str())
        } else {
            self.matcher.is_match(absolute_path)
        }
    }
}

/// Groups the configured patterns into scan roots.
///
/// Relative patterns share one root anchored on the absolute assets
/// directory. Each absolute pattern is used verbatim and walked from its
/// longest literal directory prefix.
///
/// # Errors
///
/// Returns [`AssetsError::PatternError`] for invalid glob syntax.
pub fn plan_scan(
    assets_dir: &str,
    patterns: &[String],
) -> Result<Vec<ScanRoot>> {
    let (absolute, relative): (Vec<String>, Vec<String>) = patterns
        .iter()
        .map(|pattern| path::to_slash(pattern))
        .partition(|pattern| path::is_absolute(pattern));

    let mut roots = Vec::new();
    if !relative.is_empty() {
        roots.push(ScanRoot {
            base: assets_dir.to_string(),
            matcher: compile(&relative)?,
            anchored: true,
        });
    }
    for pattern in absolute {
        roots.push(ScanRoot {
            base: literal_prefix(&pattern),
            matcher: compile(std::slice::from_ref(&pattern))?,
            anchored: false,
        });
    }
    Ok(roots)
}

fn compile(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| AssetsError::pattern_error(pattern.as_str(), e))?;
        _ = builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| AssetsError::pattern_error(patterns.join(", "), e))
}

/// The leading segments of `pattern` that contain no glob syntax.
fn literal_prefix(pattern: &str) -> String {
    let literal: Vec<&str> = pattern
        .split('/')
        .take_while(|segment| !segment.contains(&GLOB_META[..]))
        .collect();
    let prefix = literal.join("/");
    if prefix.is_empty() {
        "/".to_string()
    } else {
        prefix
    }
}

const GLOB_META: [char; 4] = ['*', '?', '[', '{'];

/// Walks the scan roots for regular files.
///
/// Matches are absolute forward-slash paths; a file matched by several
/// roots is reported once, at its first occurrence.
async fn scan(roots: Vec<ScanRoot>) -> Result<Vec<String>> {
    tokio::task::spawn_blocking(move || scan_blocking(&roots))
        .await
        .map_err(|e| {
            let source: Box<dyn std::error::Error + Send + Sync> =
                Box::new(e);
            AssetsError::scan_error("Scan task failed", Some(source))
        })?
}

fn scan_blocking(roots: &[ScanRoot]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for root in roots {
        let base = Path::new(root.base());
        if !base.exists() {
            continue;
        }

        for entry in WalkDir::new(base).follow_links(true) {
            let entry = entry.map_err(|e| {
                let source: Box<dyn std::error::Error + Send + Sync> =
                    Box::new(e);
                AssetsError::scan_error(
                    format!("Failed to read `{}`", root.base()),
                    Some(source),
                )
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let entry = path::from_path(entry.path());
            if root.is_match(&entry) && seen.insert(entry.clone()) {
                entries.push(entry);
            }
        }
    }
    Ok(entries)
}
