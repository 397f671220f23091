// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use crate::{
    instrument::InstrumentError,
    io::{spectrum::SpectrumError, FitsError, OutputsError},
    toolkit::ToolkitError,
};

#[derive(Error, Debug)]
pub enum ReportError {
    #[cfg(not(feature = "plotting"))]
    #[error("gnirs_pype was not compiled with the \"plotting\" feature.\nYou need to compile gnirs_pype with this feature to write data sheets.")]
    NoPlottingFeature,

    #[error("Can't summarise {0}: the combined source frame doesn't exist")]
    MissingCombinedSource(PathBuf),

    #[error("{0} has no OBJECT keyword, so its combined spectrum can't be found")]
    MissingObject(PathBuf),

    #[error("The combined spectrum {0} doesn't exist; has the target been flux calibrated?")]
    MissingSpectrum(PathBuf),

    #[error("The spectrum {0} is empty")]
    EmptySpectrum(PathBuf),

    #[error("IO error on {path}: {err}")]
    Io { path: PathBuf, err: std::io::Error },

    #[cfg(feature = "plotting")]
    #[error("Error from the plotters library: {0}")]
    Draw(#[from] super::plot::DrawError),

    #[error(transparent)]
    Toolkit(#[from] ToolkitError),

    #[error(transparent)]
    Instrument(#[from] InstrumentError),

    #[error(transparent)]
    Fits(#[from] FitsError),

    #[error(transparent)]
    Outputs(#[from] OutputsError),

    #[error(transparent)]
    Spectrum(#[from] SpectrumError),
}
