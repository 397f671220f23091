// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Finding files in observation directories by pattern.

use std::path::{Path, PathBuf};

use log::trace;
use thiserror::Error;

/// Glob for `pattern` inside `dir`. Special characters in `dir` are not
/// treated as part of the pattern, since observation directories are often
/// named after targets (e.g. "HD1234[a]"). Matches are in alphabetical order.
pub(crate) fn glob_in_dir(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, GlobError> {
    let escaped = glob::Pattern::escape(&dir.display().to_string());
    let g = format!("{escaped}/{pattern}");
    let entries = glob::glob(&g)?.collect::<Result<Vec<_>, _>>()?;
    trace!("{g} matched {} files", entries.len());
    Ok(entries)
}

#[derive(Error, Debug)]
pub enum GlobError {
    #[error(transparent)]
    GlobCrate(#[from] glob::GlobError),

    #[error(transparent)]
    PatternError(#[from] glob::PatternError),
}
