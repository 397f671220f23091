// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from the baseline calibration of a calibration directory.

use std::path::PathBuf;

use thiserror::Error;

use crate::{
    instrument::InstrumentError,
    io::{FitsError, GlobError, ManifestError, OutputsError},
    toolkit::ToolkitError,
};

#[derive(Error, Debug)]
pub enum BaselineError {
    #[error("{0} has no ARRAYID; can't pick a bad-pixel mask")]
    NoArrayId(PathBuf),

    #[error("nssdist identified no pinholes in {0}; check the pinhole frames and try running nssdist interactively")]
    NoPinholes(PathBuf),

    #[error("Couldn't read {path}: {err}")]
    Read { path: PathBuf, err: std::io::Error },

    #[error("Couldn't read interactive input: {0}")]
    Prompt(std::io::Error),

    #[error(transparent)]
    Instrument(#[from] InstrumentError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Outputs(#[from] OutputsError),

    #[error(transparent)]
    Glob(#[from] GlobError),

    #[error(transparent)]
    Fits(#[from] FitsError),

    #[error(transparent)]
    Toolkit(#[from] ToolkitError),
}
