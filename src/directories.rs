// Copyright © 2024 Assets Core. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Host Directories
//!
//! Two views of the host's directory layout:
//!
//! - [`DirectoryConfig`] is the configured `dir` table (what the site
//!   author wrote), including custom keys such as `assets`.
//! - [`Directories`] is the resolved directories object the host passes
//!   to lifecycle handlers. Plugins may add *virtual* entries to it so
//!   that other components can read them through the same interface as
//!   the built-in `input` and `output` directories. An entry can be
//!   defined once and never redefined or removed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::error::{AssetsError, Result};

/// Key of the built-in input directory.
pub const INPUT_KEY: &str = "input";
/// Key of the built-in output directory.
pub const OUTPUT_KEY: &str = "output";

/// The host's configured directory table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default = "default_input")]
    /// Input (source) directory of the build, relative to the project root.
    pub input: String,

    #[serde(default = "default_output")]
    /// Output directory of the build, relative to the project root.
    pub output: String,

    #[serde(flatten)]
    /// Additional directory keys, such as `assets` or `includes`.
    pub custom: BTreeMap<String, String>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            custom: BTreeMap::new(),
        }
    }
}

impl DirectoryConfig {
    /// Creates a directory table with the given input and output dirs.
    pub fn new<S: Into<String>>(input: S, output: S) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            custom: BTreeMap::new(),
        }
    }

    /// Adds a custom directory key.
    pub fn with_dir<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        _ = self.custom.insert(key.into(), value.into());
        self
    }

    /// Looks up a directory by key, built-in keys included.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            INPUT_KEY => Some(self.input.as_str()),
            OUTPUT_KEY => Some(self.output.as_str()),
            _ => self.custom.get(key).map(String::as_str),
        }
    }
}

/// The resolved directories object of a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directories {
    input: String,
    output: String,
    virtual_dirs: BTreeMap<String, String>,
}

impl Directories {
    /// Creates the directories object for a build.
    pub fn new<S: Into<String>>(input: S, output: S) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            virtual_dirs: BTreeMap::new(),
        }
    }

    /// Builds the directories object from a configured table.
    ///
    /// Custom keys are not copied: they only become visible once a plugin
    /// defines them as virtual directories.
    pub fn from_config(config: &DirectoryConfig) -> Self {
        Self::new(config.input.clone(), config.output.clone())
    }

    /// The resolved input directory.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The resolved output directory.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Reads a directory by key, built-in or virtual.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            INPUT_KEY => Some(self.input.as_str()),
            OUTPUT_KEY => Some(self.output.as_str()),
            _ => self.virtual_dirs.get(key).map(String::as_str),
        }
    }

    /// Defines a read-only virtual directory.
    ///
    /// # Errors
    ///
    /// Returns [`AssetsError::DirectoryRedefined`] if `key` names a
    /// built-in directory or a virtual directory that already exists.
    pub fn define_virtual<K, V>(&mut self, key: K, value: V) -> Result<()>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let key = key.into();
        if self.get(&key).is_some() {
            return Err(AssetsError::DirectoryRedefined { key });
        }
        _ = self.virtual_dirs.insert(key, value.into());
        Ok(())
    }

    /// Iterates over every directory, built-in entries first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        [(INPUT_KEY, self.input.as_str()), (OUTPUT_KEY, self.output.as_str())]
            .into_iter()
            .chain(
                self.virtual_dirs
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.as_str())),
            )
    }
}

fn default_input() -> String {
    ".".to_string()
}

fn default_output() -> String {
    "_site".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_config_lookup() {
        let config = DirectoryConfig::new("src", "dist")
            .with_dir("assets", "static/assets");

        assert_eq!(config.get("input"), Some("src"));
        assert_eq!(config.get("output"), Some("dist"));
        assert_eq!(config.get("assets"), Some("static/assets"));
        assert_eq!(config.get("includes"), None);
    }

    #[test]
    fn test_directory_config_from_toml() {
        let config: DirectoryConfig = toml::from_str(
            "input = 'src'\noutput = 'dist'\nassets = 'media'\n",
        )
        .unwrap();

        assert_eq!(config.input, "src");
        assert_eq!(config.get("assets"), Some("media"));

        let defaults: DirectoryConfig = toml::from_str("").unwrap();
        assert_eq!(defaults, DirectoryConfig::default());
    }

    #[test]
    fn test_define_virtual_directory() {
        let mut dirs = Directories::new("src", "dist");
        dirs.define_virtual("assets", "src/assets/").unwrap();

        assert_eq!(dirs.get("assets"), Some("src/assets/"));
        let keys: Vec<&str> = dirs.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["input", "output", "assets"]);
    }

    #[test]
    fn test_virtual_directory_cannot_be_redefined() {
        let mut dirs = Directories::new("src", "dist");
        dirs.define_virtual("assets", "src/assets/").unwrap();

        let result = dirs.define_virtual("assets", "elsewhere/");
        assert!(matches!(
            result,
            Err(AssetsError::DirectoryRedefined { ref key }) if key == "assets"
        ));
        assert_eq!(dirs.get("assets"), Some("src/assets/"));
    }

    #[test]
    fn test_builtin_directory_cannot_be_redefined() {
        let mut dirs = Directories::new("src", "dist");
        assert!(dirs.define_virtual("input", "other").is_err());
        assert_eq!(dirs.input(), "src");
    }
}
