// Copyright © 2024 Assets Core. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Configuration Module
//!
//! Options of the assets plugin. A configuration can be written in code,
//! loaded from a TOML file, overridden from environment variables and
//! overridden again programmatically. Precedence, lowest first: defaults,
//! file, environment, explicit overrides.
//!
//! Values are not otherwise validated. A malformed glob pattern surfaces
//! as an error from the glob engine when the collection is enumerated.
//!
//! ## Example
//!
//! ```rust,no_run
//! use assets_core::core::config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .with_file("assets.toml")
//!     .with_env_prefix("ASSETS_")
//!     .with_override("passthrough", true)
//!     .build()
//!     .unwrap();
//!
//! assert!(config.passthrough);
//! ```

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use toml::Value as TomlValue;

use crate::core::error::{AssetsError, Result};

/// Default key of the virtual assets directory.
pub const DEFAULT_DIR_KEY: &str = "assets";
/// Default glob pattern, matching every file below the assets root.
pub const DEFAULT_PATTERN: &str = "**/*";
/// Default public output prefix for passthrough copies.
pub const DEFAULT_PASSTHROUGH_OUTPUT: &str = "assets";

/// Name of the optional table that holds the options in a TOML file.
const FILE_SECTION: &str = "assets";

/// Options of one plugin instance.
///
/// The configuration is immutable for the life of a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "default_dir_key", alias = "dirKey")]
    /// Name under which the assets directory is exposed on the host's
    /// directories object. Also the raw directory when the host config
    /// has no entry under this key.
    pub dir_key: String,

    #[serde(default = "default_patterns")]
    /// Glob patterns, matched relative to the assets root unless
    /// absolute.
    pub patterns: Vec<String>,

    #[serde(default)]
    /// Copies the assets directory into the build output when enabled.
    pub passthrough: bool,

    #[serde(
        default = "default_passthrough_output",
        alias = "passthroughOutput"
    )]
    /// Public URL prefix of the copied assets.
    pub passthrough_output: String,

    #[serde(default)]
    /// Enables the plugin's log output.
    pub verbose: bool,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir_key: default_dir_key(),
            patterns: default_patterns(),
            passthrough: false,
            passthrough_output: default_passthrough_output(),
            verbose: false,
        }
    }
}

impl AssetsConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory key.
    pub fn with_dir_key<S: Into<String>>(mut self, dir_key: S) -> Self {
        self.dir_key = dir_key.into();
        self
    }

    /// Replaces the glob patterns.
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Enables or disables passthrough copying.
    pub fn with_passthrough(mut self, enable: bool) -> Self {
        self.passthrough = enable;
        self
    }

    /// Sets the public output prefix of the copied assets.
    pub fn with_passthrough_output<S: Into<String>>(
        mut self,
        output: S,
    ) -> Self {
        self.passthrough_output = output.into();
        self
    }

    /// Enables or disables log output.
    pub fn with_verbose(mut self, enable: bool) -> Self {
        self.verbose = enable;
        self
    }

    /// Replaces an empty `dir_key` or `passthrough_output` with its
    /// default.
    pub fn or_defaults(mut self) -> Self {
        if self.dir_key.is_empty() {
            self.dir_key = default_dir_key();
        }
        if self.passthrough_output.is_empty() {
            self.passthrough_output = default_passthrough_output();
        }
        self
    }
}

/// Builds an [`AssetsConfig`] from several sources.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_file: Option<PathBuf>,
    env_prefix: Option<String>,
    overrides: Vec<(String, TomlValue)>,
}

impl ConfigBuilder {
    /// Initialises a new `ConfigBuilder` instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a TOML configuration file to the builder.
    ///
    /// The options may sit at the top level of the file or inside an
    /// `[assets]` table.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Adds a prefix for environment variables overriding configuration
    /// values (e.g. `ASSETS_` reads `ASSETS_DIR_KEY`).
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Adds a key-value pair overriding a configuration value.
    pub fn with_override<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<TomlValue>,
    {
        self.overrides.push((key.into(), value.into()));
        self
    }

    /// Builds the final configuration.
    pub fn build(self) -> Result<AssetsConfig> {
        let mut config = match self.config_file {
            Some(path) => load_from_file(&path)?,
            None => AssetsConfig::default(),
        };

        if let Some(prefix) = self.env_prefix {
            apply_env_overrides(&mut config, &prefix, env::vars())?;
        }

        for (key, value) in &self.overrides {
            apply_config_value(&mut config, key, value)?;
        }

        Ok(config)
    }
}

// Internal helper functions

fn load_from_file(path: &Path) -> Result<AssetsConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        AssetsError::config_error(
            format!("Failed to read config file: {}", e),
            Some(path.to_path_buf()),
        )
    })?;

    let mut table: toml::Table = toml::from_str(&content).map_err(|e| {
        AssetsError::config_error(
            format!("Failed to parse config file: {}", e),
            Some(path.to_path_buf()),
        )
    })?;

    let section = match table.remove(FILE_SECTION) {
        Some(TomlValue::Table(section)) => section,
        Some(_) => {
            return Err(AssetsError::config_error(
                format!("`{}` must be a table", FILE_SECTION),
                Some(path.to_path_buf()),
            ));
        }
        None => table,
    };

    TomlValue::Table(section).try_into().map_err(|e| {
        AssetsError::config_error(
            format!("Invalid config file: {}", e),
            Some(path.to_path_buf()),
        )
    })
}

fn apply_env_overrides<I>(
    config: &mut AssetsConfig,
    prefix: &str,
    vars: I,
) -> Result<()>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut values: HashMap<String, String> = HashMap::new();
    for (key, value) in vars {
        // Strip the prefix and ensure no leading underscores remain
        if let Some(stripped) = key.strip_prefix(prefix) {
            let config_key = stripped.trim_start_matches('_').to_lowercase();
            _ = values.insert(config_key, value);
        }
    }

    for (key, value) in values {
        let value = match key.as_str() {
            "patterns" => TomlValue::Array(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|pattern| !pattern.is_empty())
                    .map(|pattern| TomlValue::String(pattern.to_string()))
                    .collect(),
            ),
            _ => TomlValue::String(value),
        };
        apply_config_value(config, &key, &value)?;
    }
    Ok(())
}

fn apply_config_value(
    config: &mut AssetsConfig,
    key: &str,
    value: &TomlValue,
) -> Result<()> {
    match key {
        "dir_key" | "dirkey" => config.dir_key = string_value(key, value)?,
        "patterns" => config.patterns = patterns_value(value)?,
        "passthrough" => config.passthrough = bool_value(key, value)?,
        "passthrough_output" | "passthroughoutput" => {
            config.passthrough_output = string_value(key, value)?
        }
        "verbose" => config.verbose = bool_value(key, value)?,
        _ => {
            return Err(AssetsError::config_error(
                format!("Unknown configuration key: {}", key),
                None,
            ));
        }
    }
    Ok(())
}

fn string_value(key: &str, value: &TomlValue) -> Result<String> {
    match value {
        TomlValue::String(s) => Ok(s.clone()),
        other => Err(AssetsError::config_error(
            format!("Invalid {} value '{}': expected a string", key, other),
            None,
        )),
    }
}

fn bool_value(key: &str, value: &TomlValue) -> Result<bool> {
    match value {
        TomlValue::Boolean(b) => Ok(*b),
        TomlValue::String(s) => s.trim().parse().map_err(|e| {
            AssetsError::config_error(
                format!("Invalid {} value '{}': {}", key, s, e),
                None,
            )
        }),
        other => Err(AssetsError::config_error(
            format!("Invalid {} value '{}': expected a boolean", key, other),
            None,
        )),
    }
}

fn patterns_value(value: &TomlValue) -> Result<Vec<String>> {
    match value {
        TomlValue::String(s) => Ok(vec![s.clone()]),
        TomlValue::Array(items) => items
            .iter()
            .map(|item| string_value("patterns", item))
            .collect(),
        other => Err(AssetsError::config_error(
            format!("Invalid patterns value '{}'", other),
            None,
        )),
    }
}

// Default value functions
fn default_dir_key() -> String {
    DEFAULT_DIR_KEY.to_string()
}

fn default_patterns() -> Vec<String> {
    vec![DEFAULT_PATTERN.to_string()]
}

fn default_passthrough_output() -> String {
    DEFAULT_PASSTHROUGH_OUTPUT.to_string()
}

/// Tests for the configuration module.
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = AssetsConfig::default();
        assert_eq!(config.dir_key, "assets");
        assert_eq!(config.patterns, vec!["**/*".to_string()]);
        assert!(!config.passthrough);
        assert_eq!(config.passthrough_output, "assets");
        assert!(!config.verbose);
    }

    #[test]
    fn test_or_defaults_replaces_empty_values() {
        let config = AssetsConfig::default()
            .with_dir_key("")
            .with_passthrough_output("")
            .or_defaults();
        assert_eq!(config.dir_key, DEFAULT_DIR_KEY);
        assert_eq!(config.passthrough_output, DEFAULT_PASSTHROUGH_OUTPUT);

        let config = AssetsConfig::default().with_dir_key("media").or_defaults();
        assert_eq!(config.dir_key, "media");
    }

    #[test]
    fn test_load_from_file_top_level() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("assets.toml");
        fs::write(
            &config_file,
            "dir_key = 'media'\npatterns = ['**/*.png', '**/*.svg']\n",
        )
        .unwrap();

        let config = load_from_file(&config_file).unwrap();
        assert_eq!(config.dir_key, "media");
        assert_eq!(config.patterns.len(), 2);
        assert_eq!(config.passthrough_output, "assets");
    }

    #[test]
    fn test_load_from_file_section_with_aliases() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("site.toml");
        fs::write(
            &config_file,
            "[assets]\ndirKey = 'static'\npassthrough = true\npassthroughOutput = 'files'\n",
        )
        .unwrap();

        let config = ConfigBuilder::new()
            .with_file(&config_file)
            .build()
            .unwrap();
        assert_eq!(config.dir_key, "static");
        assert!(config.passthrough);
        assert_eq!(config.passthrough_output, "files");
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_from_file(Path::new("missing/assets.toml"));
        assert!(matches!(
            result,
            Err(AssetsError::ConfigError { path: Some(_), .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AssetsConfig::default();
        apply_env_overrides(
            &mut config,
            "ASSETS",
            vars(&[
                ("ASSETS_DIR_KEY", "media"),
                ("ASSETS_PATTERNS", "**/*.css, **/*.js"),
                ("ASSETS_PASSTHROUGH", "true"),
                ("OTHER_VERBOSE", "true"),
            ]),
        )
        .unwrap();

        assert_eq!(config.dir_key, "media");
        assert_eq!(
            config.patterns,
            vec!["**/*.css".to_string(), "**/*.js".to_string()]
        );
        assert!(config.passthrough);
        assert!(!config.verbose);
    }

    #[test]
    fn test_env_override_rejects_bad_bool() {
        let mut config = AssetsConfig::default();
        let result = apply_env_overrides(
            &mut config,
            "ASSETS_",
            vars(&[("ASSETS_VERBOSE", "loud")]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_win_over_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("assets.toml");
        fs::write(&config_file, "passthrough_output = 'files'\n").unwrap();

        let config = ConfigBuilder::new()
            .with_file(&config_file)
            .with_override("passthrough_output", "static")
            .with_override("verbose", true)
            .build()
            .unwrap();
        assert_eq!(config.passthrough_output, "static");
        assert!(config.verbose);
    }

    #[test]
    fn test_unknown_override_key() {
        let result = ConfigBuilder::new()
            .with_override("output_dir", "public")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_methods() {
        let config = AssetsConfig::new()
            .with_dir_key("media")
            .with_patterns(["img/**/*"])
            .with_passthrough(true)
            .with_passthrough_output("static")
            .with_verbose(true);
        assert_eq!(config.dir_key, "media");
        assert_eq!(config.patterns, vec!["img/**/*".to_string()]);
        assert!(config.passthrough);
        assert_eq!(config.passthrough_output, "static");
        assert!(config.verbose);
    }
}
