// Copyright © 2024 Assets Core. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Host Traits Module
//!
//! The plugin/event/hook surface of a static site generator, as consumed by
//! plugins. The host owns the build; plugins only subscribe to lifecycle
//! events and register template-facing items.
//!
//! ## Key Traits
//!
//! - [`Registry`]: registration of global data, filters, shortcodes,
//!   collections, watch targets and passthrough copies
//! - [`Host`]: a [`Registry`] that also exposes the configured directory
//!   table and lifecycle event subscription
//! - [`Plugin`]: a unit of configuration that registers itself with a host
//!
//! [`MemoryHost`](crate::host::MemoryHost) is an in-process implementation of
//! these traits.

use std::path::Path;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value as JsonValue;

use crate::core::error::Result;
use crate::directories::{Directories, DirectoryConfig};

/// A string function usable as both a template filter and a shortcode.
///
/// The argument is `None` when the template passes no value.
pub type TemplateFunction =
    Arc<dyn Fn(Option<&str>) -> String + Send + Sync>;

/// An asynchronous collection producer.
///
/// Each call starts a fresh enumeration and yields the collection items as
/// template data.
pub type CollectionProducer = Box<
    dyn Fn() -> BoxFuture<'static, Result<Vec<JsonValue>>> + Send + Sync,
>;

/// Handler of the *directories resolved* event.
///
/// Receives the mutable directories object, so that virtual directories can
/// be defined, and the registry of the host.
pub type DirectoriesHandler = Box<
    dyn Fn(&mut Directories, &mut dyn Registry) -> Result<()> + Send + Sync,
>;

/// Handler of the *before build* event.
pub type BeforeBuildHandler = Box<
    dyn Fn(&Directories, &mut dyn Registry) -> Result<()> + Send + Sync,
>;

/// Registration surface of a host.
pub trait Registry: Send {
    /// Publishes a value as global template data under `key`.
    fn add_global_data(&mut self, key: &str, value: JsonValue);

    /// Registers a template filter.
    fn add_filter(&mut self, name: &str, filter: TemplateFunction);

    /// Registers a template shortcode.
    fn add_shortcode(&mut self, name: &str, shortcode: TemplateFunction);

    /// Registers a named collection.
    fn add_collection(&mut self, name: &str, producer: CollectionProducer);

    /// Adds a glob pattern to the host's file watcher.
    fn add_watch_target(&mut self, pattern: String);

    /// Registers a verbatim copy of `source` to `destination` in the output.
    ///
    /// A `source` ending in `/` denotes a directory-to-directory copy.
    fn add_passthrough_copy(&mut self, source: String, destination: String);
}

/// A static site generator host as seen by plugins.
pub trait Host: Registry {
    /// The configured directory table of the build.
    fn dir_config(&self) -> &DirectoryConfig;

    /// The working directory that relative project paths are anchored on.
    fn working_dir(&self) -> &Path;

    /// Subscribes to the *directories resolved* event, fired once per build
    /// when the input, output and virtual directories become final.
    fn on_directories_resolved(&mut self, handler: DirectoriesHandler);

    /// Subscribes to the *before build* event, fired once per build before
    /// any content is processed.
    fn on_before_build(&mut self, handler: BeforeBuildHandler);
}

/// A plugin that configures a host.
pub trait Plugin: Send + Sync + std::fmt::Debug {
    /// The plugin's display name.
    fn name(&self) -> &str;

    /// Registers the plugin's handlers and template items with `host`.
    ///
    /// # Errors
    ///
    /// Returns an error if the plugin cannot be set up with the host's
    /// configuration.
    fn register(&self, host: &mut dyn Host) -> Result<()>;
}
