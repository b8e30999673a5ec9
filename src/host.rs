// Copyright © 2024 Assets Core. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # In-Memory Host
//!
//! [`MemoryHost`] implements the host traits in process. It records every
//! registration and drives the build lifecycle on request, which makes it
//! suitable for embedding plugins in a Rust build driver and for testing
//! them end to end.
//!
//! A build with `MemoryHost` runs in this order:
//!
//! 1. [`MemoryHost::add_plugin`] for every plugin,
//! 2. [`MemoryHost::resolve_directories`] (*directories resolved* event),
//! 3. [`MemoryHost::before_build`] (*before build* event),
//! 4. [`MemoryHost::collection`] for every collection the templates use.
//!
//! Collections may also be requested before step 2.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;
use serde_json::Value as JsonValue;

use crate::core::error::{AssetsError, Result};
use crate::core::traits::{
    BeforeBuildHandler, CollectionProducer, DirectoriesHandler, Host, Plugin,
    Registry, TemplateFunction,
};
use crate::directories::{Directories, DirectoryConfig};

/// A directory-to-directory (or file) copy registered for the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassthroughCopy {
    /// Source path, relative to the project root.
    pub source: String,
    /// Destination prefix in the build output.
    pub destination: String,
}

/// Everything plugins registered with the host.
#[derive(Default)]
pub struct Registrations {
    global_data: BTreeMap<String, JsonValue>,
    filters: BTreeMap<String, TemplateFunction>,
    shortcodes: BTreeMap<String, TemplateFunction>,
    collections: BTreeMap<String, CollectionProducer>,
    watch_targets: Vec<String>,
    passthrough_copies: Vec<PassthroughCopy>,
}

impl fmt::Debug for Registrations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registrations")
            .field("global_data", &self.global_data)
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .field("shortcodes", &self.shortcodes.keys().collect::<Vec<_>>())
            .field("collections", &self.collections.keys().collect::<Vec<_>>())
            .field("watch_targets", &self.watch_targets)
            .field("passthrough_copies", &self.passthrough_copies)
            .finish()
    }
}

impl Registry for Registrations {
    fn add_global_data(&mut self, key: &str, value: JsonValue) {
        debug!("global data `{}` = {}", key, value);
        _ = self.global_data.insert(key.to_string(), value);
    }

    fn add_filter(&mut self, name: &str, filter: TemplateFunction) {
        debug!("filter `{}`", name);
        _ = self.filters.insert(name.to_string(), filter);
    }

    fn add_shortcode(&mut self, name: &str, shortcode: TemplateFunction) {
        debug!("shortcode `{}`", name);
        _ = self.shortcodes.insert(name.to_string(), shortcode);
    }

    fn add_collection(&mut self, name: &str, producer: CollectionProducer) {
        debug!("collection `{}`", name);
        _ = self.collections.insert(name.to_string(), producer);
    }

    fn add_watch_target(&mut self, pattern: String) {
        debug!("watch target `{}`", pattern);
        self.watch_targets.push(pattern);
    }

    fn add_passthrough_copy(&mut self, source: String, destination: String) {
        debug!("passthrough copy `{}` -> `{}`", source, destination);
        self.passthrough_copies.push(PassthroughCopy {
            source,
            destination,
        });
    }
}

/// An in-process static site generator host.
pub struct MemoryHost {
    dir_config: DirectoryConfig,
    working_dir: PathBuf,
    directories_handlers: Vec<DirectoriesHandler>,
    before_build_handlers: Vec<BeforeBuildHandler>,
    directories: Option<Directories>,
    registrations: Registrations,
}

impl fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryHost")
            .field("dir_config", &self.dir_config)
            .field("working_dir", &self.working_dir)
            .field("directories_handlers", &self.directories_handlers.len())
            .field("before_build_handlers", &self.before_build_handlers.len())
            .field("directories", &self.directories)
            .field("registrations", &self.registrations)
            .finish()
    }
}

impl MemoryHost {
    /// Creates a host for a configured directory table and the project
    /// working directory.
    pub fn new<P: Into<PathBuf>>(
        dir_config: DirectoryConfig,
        working_dir: P,
    ) -> Self {
        Self {
            dir_config,
            working_dir: working_dir.into(),
            directories_handlers: Vec::new(),
            before_build_handlers: Vec::new(),
            directories: None,
            registrations: Registrations::default(),
        }
    }

    /// Lets `plugin` register itself.
    pub fn add_plugin(&mut self, plugin: &dyn Plugin) -> Result<()> {
        debug!("adding plugin `{}`", plugin.name());
        plugin.register(self)
    }

    /// Fires the *directories resolved* event.
    ///
    /// The first call builds the directories object from the configured
    /// table; later calls fire the event again on the same object.
    pub fn resolve_directories(&mut self) -> Result<&Directories> {
        let directories = self
            .directories
            .get_or_insert_with(|| Directories::from_config(&self.dir_config));
        debug!("directories resolved: input `{}`", directories.input());

        let registry: &mut dyn Registry = &mut self.registrations;
        for handler in &self.directories_handlers {
            handler(&mut *directories, &mut *registry)?;
        }
        Ok(directories)
    }

    /// Fires the *before build* event.
    ///
    /// Resolves the directories first if that has not happened yet.
    pub fn before_build(&mut self) -> Result<()> {
        if self.directories.is_none() {
            let _ = self.resolve_directories()?;
        }
        let directories = match &self.directories {
            Some(directories) => directories,
            None => return Ok(()),
        };

        let registry: &mut dyn Registry = &mut self.registrations;
        for handler in &self.before_build_handlers {
            handler(directories, &mut *registry)?;
        }
        Ok(())
    }

    /// Runs a build: resolves the directories and fires *before build*.
    pub fn build(&mut self) -> Result<()> {
        let _ = self.resolve_directories()?;
        self.before_build()
    }

    /// Produces a collection.
    ///
    /// # Errors
    ///
    /// Returns [`AssetsError::UnknownCollection`] if no plugin registered
    /// `name`, or the producer's own error.
    pub async fn collection(&self, name: &str) -> Result<Vec<JsonValue>> {
        let producer =
            self.registrations.collections.get(name).ok_or_else(|| {
                AssetsError::UnknownCollection {
                    name: name.to_string(),
                }
            })?;
        producer().await
    }

    /// Applies a registered filter.
    pub fn filter(&self, name: &str, value: Option<&str>) -> Option<String> {
        self.registrations.filters.get(name).map(|filter| filter(value))
    }

    /// Calls a registered shortcode.
    pub fn shortcode(&self, name: &str, value: Option<&str>) -> Option<String> {
        self.registrations
            .shortcodes
            .get(name)
            .map(|shortcode| shortcode(value))
    }

    /// The resolved directories object, once the event has fired.
    pub fn directories(&self) -> Option<&Directories> {
        self.directories.as_ref()
    }

    /// Reads a global data value.
    pub fn global_data(&self, key: &str) -> Option<&JsonValue> {
        self.registrations.global_data.get(key)
    }

    /// Registered watch targets, in registration order.
    pub fn watch_targets(&self) -> &[String] {
        &self.registrations.watch_targets
    }

    /// Registered passthrough copies, in registration order.
    pub fn passthrough_copies(&self) -> &[PassthroughCopy] {
        &self.registrations.passthrough_copies
    }

    /// Everything registered so far.
    pub fn registrations(&self) -> &Registrations {
        &self.registrations
    }
}

impl Registry for MemoryHost {
    fn add_global_data(&mut self, key: &str, value: JsonValue) {
        self.registrations.add_global_data(key, value);
    }

    fn add_filter(&mut self, name: &str, filter: TemplateFunction) {
        self.registrations.add_filter(name, filter);
    }

    fn add_shortcode(&mut self, name: &str, shortcode: TemplateFunction) {
        self.registrations.add_shortcode(name, shortcode);
    }

    fn add_collection(&mut self, name: &str, producer: CollectionProducer) {
        self.registrations.add_collection(name, producer);
    }

    fn add_watch_target(&mut self, pattern: String) {
        self.registrations.add_watch_target(pattern);
    }

    fn add_passthrough_copy(&mut self, source: String, destination: String) {
        self.registrations.add_passthrough_copy(source, destination);
    }
}

impl Host for MemoryHost {
    fn dir_config(&self) -> &DirectoryConfig {
        &self.dir_config
    }

    fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn on_directories_resolved(&mut self, handler: DirectoriesHandler) {
        self.directories_handlers.push(handler);
    }

    fn on_before_build(&mut self, handler: BeforeBuildHandler) {
        self.before_build_handlers.push(handler);
    }
}
