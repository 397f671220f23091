// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all gnirs_pype-related errors. This should be the *only*
//! error enum that is publicly visible.

use thiserror::Error;

use crate::{
    baseline::BaselineError,
    check_data::CheckDataError,
    config::ConfigError,
    extract::ExtractError,
    flux::FluxCalError,
    headers::HeaderError,
    instrument::InstrumentError,
    io::{spectrum::SpectrumError, FitsError, GlobError, ManifestError, OutputsError},
    report::ReportError,
    toolkit::ToolkitError,
};

/// The *only* publicly visible error from gnirs_pype. Each error message should
/// say where to look to fix it, unless it's "generic".
#[derive(Error, Debug)]
pub enum PypeError {
    /// An error in the configuration file or the command-line overrides.
    #[error("{0}\n\nCheck the configuration file; 'gnirs-pype <subcommand> --dry-run <config>' shows what was understood.")]
    Config(String),

    /// An error with the file lists of an observation directory.
    #[error("{0}\n\nEach observation directory needs the lists written when the raw data were sorted (e.g. all.list, src.list, arcs.list).")]
    Manifest(String),

    /// An error related to check-data.
    #[error("{0}")]
    CheckData(String),

    /// An error related to baseline calibration.
    #[error("{0}\n\nSteps can be re-run individually with --start and --stop.")]
    Calibration(String),

    /// An error related to extraction.
    #[error("{0}")]
    Extraction(String),

    /// An error related to flux calibration.
    #[error("{0}\n\nStandard stars and their magnitudes are listed in the [standards] section of the configuration file.")]
    FluxCalibration(String),

    /// An error related to data sheets.
    #[error("{0}")]
    Report(String),

    /// An error from the instrument tables (array IDs, cross-dispersed
    /// configurations).
    #[error("{0}\n\nThe header values of this observation aren't supported by gnirs_pype.")]
    Instrument(String),

    /// An error from running an IRAF task.
    #[error("{0}\n\nThe IRAF log (gnirs.log) has the details. Is 'irafCommand' in [defaults] correct?")]
    Toolkit(String),

    /// A cfitsio error. Because these are usually quite spartan, some
    /// suggestions are provided here.
    #[error("cfitsio error: {0}\n\nIf you don't know what this means, try turning up verbosity (-v or -vv).")]
    Cfitsio(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

// Stage errors.

impl From<ConfigError> for PypeError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<CheckDataError> for PypeError {
    fn from(e: CheckDataError) -> Self {
        let s = e.to_string();
        match e {
            CheckDataError::AmbiguousExposureTime { .. }
            | CheckDataError::NoFrames(_)
            | CheckDataError::NoMatchingCalibrations(_)
            | CheckDataError::NoMatchingTelluric(_) => Self::CheckData(s),
            CheckDataError::Header(e) => Self::from(e),
            CheckDataError::Manifest(e) => Self::from(e),
        }
    }
}

impl From<BaselineError> for PypeError {
    fn from(e: BaselineError) -> Self {
        let s = e.to_string();
        match e {
            BaselineError::NoArrayId(_) | BaselineError::NoPinholes(_) => Self::Calibration(s),
            BaselineError::Read { .. } | BaselineError::Prompt(_) => Self::Generic(s),
            BaselineError::Instrument(e) => Self::from(e),
            BaselineError::Manifest(e) => Self::from(e),
            BaselineError::Outputs(e) => Self::from(e),
            BaselineError::Glob(e) => Self::from(e),
            BaselineError::Fits(e) => Self::from(e),
            BaselineError::Toolkit(e) => Self::from(e),
        }
    }
}

impl From<ExtractError> for PypeError {
    fn from(e: ExtractError) -> Self {
        let s = e.to_string();
        match e {
            ExtractError::MissingCombinedSource(_)
            | ExtractError::MissingExtensions { .. }
            | ExtractError::NoQOffset(_)
            | ExtractError::NoPixelScale(_) => Self::Extraction(s),
            ExtractError::Io { .. } | ExtractError::Prompt(_) => Self::Generic(s),
            ExtractError::Instrument(e) => Self::from(e),
            ExtractError::Manifest(e) => Self::from(e),
            ExtractError::Outputs(e) => Self::from(e),
            ExtractError::Fits(e) => Self::from(e),
            ExtractError::Toolkit(e) => Self::from(e),
        }
    }
}

impl From<FluxCalError> for PypeError {
    fn from(e: FluxCalError) -> Self {
        let s = e.to_string();
        match e {
            FluxCalError::MissingStandard { .. }
            | FluxCalError::FluxCalibratorUnavailable(_)
            | FluxCalError::MissingSpectrum(_)
            | FluxCalError::MissingKey { .. }
            | FluxCalError::UnknownStandard(_)
            | FluxCalError::NoZeroPoint(_)
            | FluxCalError::NoPreviousOrder(_)
            | FluxCalError::NoOverlap { .. }
            | FluxCalError::LengthMismatch { .. } => Self::FluxCalibration(s),
            FluxCalError::Io { .. } | FluxCalError::Prompt(_) => Self::Generic(s),
            FluxCalError::Instrument(e) => Self::from(e),
            FluxCalError::Fits(e) => Self::from(e),
            FluxCalError::Outputs(e) => Self::from(e),
            FluxCalError::Spectrum(e) => Self::from(e),
        }
    }
}

impl From<ReportError> for PypeError {
    fn from(e: ReportError) -> Self {
        let s = e.to_string();
        match e {
            #[cfg(not(feature = "plotting"))]
            ReportError::NoPlottingFeature => Self::Report(s),
            ReportError::MissingCombinedSource(_)
            | ReportError::MissingObject(_)
            | ReportError::MissingSpectrum(_)
            | ReportError::EmptySpectrum(_) => Self::Report(s),
            #[cfg(feature = "plotting")]
            ReportError::Draw(_) => Self::Report(s),
            ReportError::Io { .. } => Self::Generic(s),
            ReportError::Toolkit(e) => Self::from(e),
            ReportError::Instrument(e) => Self::from(e),
            ReportError::Fits(e) => Self::from(e),
            ReportError::Outputs(e) => Self::from(e),
            ReportError::Spectrum(e) => Self::from(e),
        }
    }
}

// Library code errors.

impl From<ManifestError> for PypeError {
    fn from(e: ManifestError) -> Self {
        let s = e.to_string();
        match e {
            ManifestError::Missing { .. } | ManifestError::Empty { .. } => Self::Manifest(s),
            ManifestError::Io { .. } => Self::Generic(s),
        }
    }
}

impl From<HeaderError> for PypeError {
    fn from(e: HeaderError) -> Self {
        match e {
            HeaderError::Glob(e) => Self::from(e),
            HeaderError::Fits(e) => Self::from(e),
        }
    }
}

impl From<ToolkitError> for PypeError {
    fn from(e: ToolkitError) -> Self {
        let s = e.to_string();
        match e {
            ToolkitError::Spawn { .. }
            | ToolkitError::TaskFailed { .. }
            | ToolkitError::ExitStatus { .. } => Self::Toolkit(s),
            ToolkitError::Io { .. } | ToolkitError::NotADirectory(_) => Self::Generic(s),
        }
    }
}

impl From<InstrumentError> for PypeError {
    fn from(e: InstrumentError) -> Self {
        Self::Instrument(e.to_string())
    }
}

impl From<FitsError> for PypeError {
    fn from(e: FitsError) -> Self {
        Self::Cfitsio(e.to_string())
    }
}

impl From<OutputsError> for PypeError {
    fn from(e: OutputsError) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<SpectrumError> for PypeError {
    fn from(e: SpectrumError) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<GlobError> for PypeError {
    fn from(e: GlobError) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<std::io::Error> for PypeError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
