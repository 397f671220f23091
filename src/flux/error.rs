// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from flux calibration.

use std::path::PathBuf;

use thiserror::Error;

use crate::{
    config::FluxCalibrationMethod,
    instrument::{InstrumentError, Order},
    io::{spectrum::SpectrumError, FitsError, OutputsError},
};

#[derive(Error, Debug)]
pub enum FluxCalError {
    #[error("The flux calibration method is '{method}', but the standard star directory {path} doesn't exist")]
    MissingStandard {
        method: FluxCalibrationMethod,
        path: PathBuf,
    },

    #[error("Found the flux standard in {0}, but the 'fluxcalibrator' method is not implemented; use 'telluricapproximate'")]
    FluxCalibratorUnavailable(PathBuf),

    #[error("Flux calibration needs {0}, which doesn't exist")]
    MissingSpectrum(PathBuf),

    #[error("{path} has no {key} keyword")]
    MissingKey { path: PathBuf, key: &'static str },

    #[error("There are no settings for the standard star '{0}'; add a [standards.{0}] section to the configuration file")]
    UnknownStandard(String),

    #[error("A magnitude was given for order {0}, but there's no zero-magnitude flux for it")]
    NoZeroPoint(Order),

    #[error("Order {0} isn't an anchor order and no order was scaled before it")]
    NoPreviousOrder(Order),

    #[error("Orders {previous} and {order} do not overlap in wavelength; this suggests the grating was not at the expected position. Plot the calibrated arc spectrum to see if the data cover the wavelength range you need")]
    NoOverlap { previous: Order, order: Order },

    #[error("{file} has {found} pixels, but the blackbody for order {order} has {expected}")]
    LengthMismatch {
        file: PathBuf,
        order: Order,
        found: usize,
        expected: usize,
    },

    #[error("IO error on {path}: {err}")]
    Io { path: PathBuf, err: std::io::Error },

    #[error("Couldn't read interactive input: {0}")]
    Prompt(std::io::Error),

    #[error(transparent)]
    Instrument(#[from] InstrumentError),

    #[error(transparent)]
    Fits(#[from] FitsError),

    #[error(transparent)]
    Outputs(#[from] OutputsError),

    #[error(transparent)]
    Spectrum(#[from] SpectrumError),
}
