// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use crate::{headers::HeaderError, io::ManifestError};

#[derive(Error, Debug)]
pub enum CheckDataError {
    #[error("The most common exposure time in {list} is not unique (exposure times: {exptimes}); the list needs to be fixed by hand")]
    AmbiguousExposureTime { list: PathBuf, exptimes: String },

    #[error("No raw frames (N*.fits) were found in {0}")]
    NoFrames(PathBuf),

    #[error("No calibration directory matches the date, configuration and coordinates of {0}")]
    NoMatchingCalibrations(PathBuf),

    #[error("No telluric directory matches the date and configuration of {0}")]
    NoMatchingTelluric(PathBuf),

    #[error(transparent)]
    Header(#[from] HeaderError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}
