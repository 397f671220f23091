// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from reading and validating the pipeline configuration.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Couldn't read the configuration file {file}: {err}")]
    Read { file: PathBuf, err: std::io::Error },

    #[error("Couldn't decode toml structure from {file}:\n{err}")]
    Toml { file: PathBuf, err: toml::de::Error },

    #[error("Couldn't decode json structure from {file}:\n{err}")]
    Json {
        file: PathBuf,
        err: serde_json::Error,
    },

    #[error("The configuration file {0} has an unsupported extension; supported formats: toml, json")]
    UnsupportedFormat(PathBuf),

    #[error("Unknown flux calibration method '{0}'; supported methods: {}", *super::FLUX_METHODS_COMMA_SEPARATED)]
    UnknownFluxMethod(String),

    #[error("Unknown background subtraction '{0}'; supported values: {}", *super::BACKGROUNDS_COMMA_SEPARATED)]
    UnknownBackground(String),

    #[error("In [{section}], '{key}' is not a spectral order")]
    BadOrderKey { section: &'static str, key: String },

    #[error("In [orderScalingRegions], order {order} has an invalid region '{value}'; expected 'start:end' with start < end")]
    BadScalingRegion { order: u8, value: String },

    #[error("In [nominalWavelengths], order {order} has a start wavelength ({start}) that is not below its end ({end})")]
    BadNominalWavelengths { order: u8, start: f64, end: f64 },

    #[error("Anchor order {0} has no zero-magnitude flux in [zeroMagnitudeFluxes]")]
    AnchorWithoutZeroPoint(u8),

    #[error("No anchor orders were specified in [fluxCalibration]; at least one is needed to scale the blackbody")]
    NoAnchorOrders,

    #[error("The standard '{name}' has a non-positive temperature ({temperature} K)")]
    BadTemperature { name: String, temperature: f64 },

    #[error("The wavelength accuracy must be a positive percentage; got {0}")]
    BadAccuracy(f64),

    #[error("The extraction aperture radius must be positive; got {0}")]
    BadApertureRadius(f64),

    #[error("The peak-matching tolerance must be positive; got {0}")]
    BadTolerance(f64),
}
