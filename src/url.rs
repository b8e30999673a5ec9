// Copyright © 2024 Assets Core. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Asset URLs
//!
//! Maps a path relative to the assets root onto its public URL below the
//! passthrough output prefix. The mapping is exposed to templates as the
//! `assetUrl` filter and shortcode.

use std::sync::Arc;

use crate::core::traits::TemplateFunction;
use crate::path;

/// Template name of the URL helper, used for the filter and the shortcode.
pub const ASSET_URL_NAME: &str = "assetUrl";

/// Normalises a passthrough output setting into a URL prefix that starts
/// and ends with exactly one `/`.
///
/// ```
/// use assets_core::url::normalize_output_prefix;
///
/// assert_eq!(normalize_output_prefix("assets"), "/assets/");
/// assert_eq!(normalize_output_prefix("//static/files//"), "/static/files/");
/// assert_eq!(normalize_output_prefix(""), "/");
/// ```
pub fn normalize_output_prefix(output: &str) -> String {
    let trimmed = output.trim_start_matches('/').trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

/// The `assetUrl` mapping with a fixed output prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUrl {
    prefix: String,
}

impl AssetUrl {
    /// Creates the mapping for a passthrough output setting.
    pub fn new(passthrough_output: &str) -> Self {
        Self {
            prefix: normalize_output_prefix(passthrough_output),
        }
    }

    /// The normalised output prefix, e.g. `/assets/`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Maps a path relative to the assets root onto its public URL.
    ///
    /// Without a path (or with an empty one) the bare prefix is returned.
    /// Otherwise leading slashes are dropped, the path is joined onto the
    /// prefix and one trailing slash is stripped.
    ///
    /// ```
    /// use assets_core::url::AssetUrl;
    ///
    /// let urls = AssetUrl::new("assets");
    /// assert_eq!(urls.url_for(Some("/img/logo.png")), "/assets/img/logo.png");
    /// assert_eq!(urls.url_for(None), "/assets/");
    /// ```
    pub fn url_for(&self, relative_path: Option<&str>) -> String {
        match relative_path {
            None | Some("") => self.prefix.clone(),
            Some(relative_path) => {
                let relative_path = relative_path.trim_start_matches('/');
                let joined = path::join(&self.prefix, relative_path);
                path::strip_trailing_slash(&joined).to_string()
            }
        }
    }

    /// Wraps the mapping for registration as a filter or shortcode.
    pub fn to_template_function(&self) -> TemplateFunction {
        let urls = self.clone();
        Arc::new(move |relative_path: Option<&str>| {
            urls.url_for(relative_path)
        })
    }
}
