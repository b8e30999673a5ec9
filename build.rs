// Copyright © 2024 Assets Core. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build script that checks the compiler against the minimum supported
//! Rust version declared in `Cargo.toml`.

use std::process;

/// The minimum supported Rust version.
const MIN_RUSTC_VERSION: &str = "1.70.0";

fn main() {
    match version_check::is_min_version(MIN_RUSTC_VERSION) {
        Some(true) => {}
        Some(false) => {
            eprintln!(
                "assets-core requires rustc {} or newer.",
                MIN_RUSTC_VERSION
            );
            process::exit(1);
        }
        None => {
            println!(
                "cargo:warning=Unable to determine the rustc version."
            );
        }
    }
}
