// Copyright © 2024 Assets Core. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Passthrough Registrar
//!
//! Mirrors the assets directory into the build output. The copy is
//! registered directory-to-directory (the source always ends in `/`) so the
//! host copies the tree in one operation instead of file by file.

use log::{info, warn};

use crate::context::AssetsContext;
use crate::core::error::Result;
use crate::core::traits::Registry;
use crate::directories::Directories;
use crate::path;

/// Determines the source directory of the passthrough copy.
///
/// The live entry on the directories object wins over the cached
/// resolution, so that a host that reconfigured the directory is respected.
pub fn source_dir(
    context: &AssetsContext,
    directories: &Directories,
) -> Option<String> {
    directories
        .get(&context.config().dir_key)
        .filter(|dir| !dir.is_empty())
        .map(str::to_string)
        .or_else(|| {
            context
                .resolution()
                .map(|resolution| resolution.absolute_dir.clone())
        })
}

/// Handles the host's *before build* event.
///
/// Registers the copy of the assets directory to the normalised output
/// prefix. Without a known assets directory nothing is registered.
pub fn on_before_build(
    context: &AssetsContext,
    directories: &Directories,
    registry: &mut dyn Registry,
) -> Result<()> {
    let Some(source) = source_dir(context, directories) else {
        if context.verbose() {
            warn!("[assets-core] No assets directory found for passthrough");
        }
        return Ok(());
    };

    let source = path::add_trailing_slash(&source);
    let destination = context.urls().prefix().to_string();

    if context.verbose() {
        info!("[assets-core] passthrough: {} -> {}", source, destination);
    }
    registry.add_passthrough_copy(source, destination);
    Ok(())
}
