// Copyright © 2024 Assets Core. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Path Normalisation
//!
//! String-based path helpers shared by the resolver, the enumerator and
//! the URL helper. Every function works on forward-slash paths so that
//! the directories, watch targets, record paths and URLs handed to the
//! host look the same on every platform, regardless of the native
//! separator used when the files were discovered on disk.
//!
//! Nothing here touches the filesystem. Malformed input is tolerated and
//! normalises to a `.`-equivalent path rather than failing.

use std::path::Path;

/// Converts native separators to forward slashes.
pub fn to_slash(path: &str) -> String {
    path.replace('\\', "/")
}

/// Converts a native path into a forward-slash string.
pub fn from_path(path: &Path) -> String {
    to_slash(&path.to_string_lossy())
}

/// Returns `true` when `path` is absolute, either in the forward-slash
/// sense or according to the host platform.
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/') || Path::new(path).is_absolute()
}

/// Lexically normalises a path.
///
/// Separators are standardised, repeated separators collapse, `.`
/// segments are dropped and `..` segments consume their parent where one
/// exists. A leading `/` and a trailing `/` are preserved. An empty
/// result becomes `.`.
///
/// ```
/// use assets_core::path::normalize;
///
/// assert_eq!(normalize("./src//assets/../img/"), "src/img/");
/// assert_eq!(normalize(""), ".");
/// ```
pub fn normalize(path: &str) -> String {
    let path = to_slash(path);
    if path.is_empty() {
        return ".".to_string();
    }

    let absolute = path.starts_with('/');
    let trailing = path.ends_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    let _ = segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let mut normalized = segments.join("/");
    if absolute {
        normalized.insert(0, '/');
        if normalized.len() == 1 {
            return normalized;
        }
    } else if normalized.is_empty() {
        normalized.push('.');
    }

    if trailing {
        normalized.push('/');
    }
    normalized
}

/// Joins two paths and normalises the result.
///
/// Empty parts are skipped. The second part is appended even when it is
/// itself absolute, mirroring a plain string join.
pub fn join(base: &str, path: &str) -> String {
    match (base.is_empty(), path.is_empty()) {
        (true, true) => ".".to_string(),
        (true, false) => normalize(path),
        (false, true) => normalize(base),
        (false, false) => normalize(&format!("{base}/{path}")),
    }
}

/// Appends a `/` unless the path already ends with one.
pub fn add_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

/// Removes exactly one trailing `/`, if present.
pub fn strip_trailing_slash(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

/// Removes every leading `./` marker.
pub fn strip_leading_dot_slash(path: &str) -> &str {
    let mut stripped = path;
    while let Some(rest) = stripped.strip_prefix("./") {
        stripped = rest;
    }
    stripped
}

/// Prefixes a relative path with the `./` marker.
///
/// Absolute paths and paths already starting with `./` or `../` are
/// returned unchanged.
pub fn add_leading_dot_slash(path: &str) -> String {
    if path == "." || path == ".." {
        return format!("{path}/");
    }
    if is_absolute(path) || path.starts_with("./") || path.starts_with("../")
    {
        return path.to_string();
    }
    format!("./{path}")
}

/// Strips `sub_path` from the front of `path`.
///
/// Both arguments are normalised first. When `path` does not live below
/// `sub_path` (or `sub_path` is `.`), the normalised `path` is returned.
///
/// ```
/// use assets_core::path::strip_leading_sub_path;
///
/// assert_eq!(
///     strip_leading_sub_path("/site/src/assets/a.png", "/site/src/"),
///     "assets/a.png"
/// );
/// ```
pub fn strip_leading_sub_path(path: &str, sub_path: &str) -> String {
    let path = normalize(path);
    let sub_path = normalize(sub_path);
    let sub_path = strip_trailing_slash(&sub_path);

    if sub_path == "." || sub_path.is_empty() {
        return path;
    }
    if path == sub_path {
        return String::new();
    }

    let prefix = add_trailing_slash(sub_path);
    match path.strip_prefix(prefix.as_str()) {
        Some(rest) => rest.to_string(),
        None => path,
    }
}

/// Anchors `path` on `base` unless it is already absolute.
pub fn absolute(base: &str, path: &str) -> String {
    if is_absolute(path) {
        normalize(path)
    } else {
        join(base, strip_leading_dot_slash(path))
    }
}

/// Returns the final segment of a path.
pub fn last_segment(path: &str) -> &str {
    strip_trailing_slash(path)
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

/// Returns the directory portion of a file path, or `.` when there is
/// none.
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(index) => &path[..index],
        None => ".",
    }
}

/// Splits a file name into its stem and extension.
///
/// The extension is the text after the last `.`. A leading dot (as in
/// `.gitignore`) or a trailing dot does not start an extension, in which
/// case the stem is the whole name and the extension is empty.
///
/// ```
/// use assets_core::path::split_extension;
///
/// assert_eq!(split_extension("logo.min.svg"), ("logo.min", "svg"));
/// assert_eq!(split_extension(".gitignore"), (".gitignore", ""));
/// ```
pub fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(index) if index > 0 && index + 1 < file_name.len() => {
            (&file_name[..index], &file_name[index + 1..])
        }
        _ => (file_name, ""),
    }
}
