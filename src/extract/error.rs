// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from extracting 1D spectra.

use std::path::PathBuf;

use thiserror::Error;

use crate::{
    instrument::InstrumentError,
    io::{FitsError, ManifestError, OutputsError},
    toolkit::ToolkitError,
};

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("The combined source image {0} is not available; combine the 2D spectra first or provide it manually")]
    MissingCombinedSource(PathBuf),

    #[error("{file} has {found} SCI extensions after re-extraction, but {expected} orders were expected; the aperture may be too close to the end of the slit")]
    MissingExtensions {
        file: PathBuf,
        found: usize,
        expected: usize,
    },

    #[error("{0} has no QOFFSET; can't work out where the science target should be")]
    NoQOffset(PathBuf),

    #[error("{0} has no PIXSCALE")]
    NoPixelScale(PathBuf),

    #[error("IO error on {path}: {err}")]
    Io { path: PathBuf, err: std::io::Error },

    #[error("Couldn't read interactive input: {0}")]
    Prompt(std::io::Error),

    #[error(transparent)]
    Instrument(#[from] InstrumentError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Outputs(#[from] OutputsError),

    #[error(transparent)]
    Fits(#[from] FitsError),

    #[error(transparent)]
    Toolkit(#[from] ToolkitError),
}
