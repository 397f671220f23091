// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Deciding what to do about the outputs of a step that may have run before.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use thiserror::Error;

use super::{glob_in_dir, GlobError};

/// What was found (and done) about a step's existing outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outputs {
    /// Nothing was there; the step should run.
    Absent,
    /// Old outputs were deleted; the step should run.
    Removed,
    /// Old outputs exist and overwriting is off; the step should be skipped
    /// and the old outputs reused.
    Kept,
}

impl Outputs {
    pub(crate) fn should_run(self) -> bool {
        !matches!(self, Outputs::Kept)
    }
}

/// Look for the outputs matching `patterns` (globs relative to `dir`). If
/// there are any, delete them when `overwrite` is set, otherwise leave them
/// alone and say that `what` is being skipped.
pub(crate) fn prepare_outputs<S: AsRef<str>>(
    dir: &Path,
    patterns: &[S],
    overwrite: bool,
    what: &str,
) -> Result<Outputs, OutputsError> {
    let mut existing = vec![];
    for p in patterns {
        existing.extend(glob_in_dir(dir, p.as_ref())?);
    }
    existing.sort();
    existing.dedup();

    if existing.is_empty() {
        debug!("No old outputs for {what} in {}", dir.display());
        return Ok(Outputs::Absent);
    }
    if overwrite {
        for f in &existing {
            warn!("Removing old {}", f.display());
            remove(f)?;
        }
        Ok(Outputs::Removed)
    } else {
        warn!(
            "Output exists and overwrite is not set ({} and {} other file(s)); skipping {what}",
            existing[0].display(),
            existing.len() - 1
        );
        Ok(Outputs::Kept)
    }
}

/// The same as [`prepare_outputs`], but for a single known file.
pub(crate) fn prepare_output(
    file: &Path,
    overwrite: bool,
    what: &str,
) -> Result<Outputs, OutputsError> {
    if !file.exists() {
        return Ok(Outputs::Absent);
    }
    if overwrite {
        warn!("Removing old {}", file.display());
        remove(file)?;
        Ok(Outputs::Removed)
    } else {
        warn!(
            "{} exists and overwrite is not set; skipping {what}",
            file.display()
        );
        Ok(Outputs::Kept)
    }
}

/// Delete a file (or directory tree). A file that's already gone is fine.
pub(crate) fn remove(path: &Path) -> Result<(), OutputsError> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(OutputsError::Remove {
            path: path.to_path_buf(),
            err,
        }),
    }
}

#[derive(Error, Debug)]
pub enum OutputsError {
    #[error(transparent)]
    Glob(#[from] GlobError),

    #[error("Couldn't remove {path}: {err}")]
    Remove { path: PathBuf, err: io::Error },
}
