// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fixed facts about GNIRS and the Gemini observatories.
//!
//! Observation and calibration directories are named after the instrument
//! configuration they hold (e.g. `.../LB_SXD_32mm_111mm/...`), so most lookups
//! here work on a directory path.

use std::path::Path;

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::constants::{BPM_2011, BPM_2012, GEMINI_NORTH_LAT_DEG, GEMINI_SOUTH_LAT_DEG};

/// A spectral order of a cross-dispersed observation.
pub type Order = u8;

/// The cross-dispersion configurations supported by the pipeline.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, EnumIter, EnumString)]
pub enum XdConfig {
    /// Long camera, short cross-dispersing prism.
    #[strum(serialize = "LB_SXD")]
    LongBlueSxd,

    /// Long camera, long cross-dispersing prism.
    #[strum(serialize = "LB_LXD")]
    LongBlueLxd,

    /// Short camera, short cross-dispersing prism.
    #[strum(serialize = "SB_SXD")]
    ShortBlueSxd,
}

impl XdConfig {
    /// Identify the configuration from a directory path. The first
    /// configuration whose name appears in the path wins.
    pub fn from_path(path: &Path) -> Result<XdConfig, InstrumentError> {
        let s = path.to_string_lossy();
        XdConfig::iter()
            .find(|c| s.contains(&c.to_string()))
            .ok_or_else(|| InstrumentError::UnknownXdConfig(path.display().to_string()))
    }

    /// The orders (and therefore the number of SCI extensions) expected from
    /// this configuration.
    pub fn orders(self) -> &'static [Order] {
        match self {
            XdConfig::LongBlueSxd => &[3, 4, 5],
            XdConfig::LongBlueLxd | XdConfig::ShortBlueSxd => &[3, 4, 5, 6, 7, 8],
        }
    }

    pub fn camera(self) -> Camera {
        match self {
            XdConfig::LongBlueSxd | XdConfig::LongBlueLxd => Camera::Long,
            XdConfig::ShortBlueSxd => Camera::Short,
        }
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Camera {
    Long,
    Short,
}

impl Camera {
    /// The pinhole coordinate list given to nssdist and the number of pinholes
    /// it should identify.
    pub fn pinholes(self) -> (&'static str, usize) {
        match self {
            Camera::Long => ("gnirs$data/pinholes-long-dense-north.lis", 9),
            Camera::Short => ("gnirs$data/pinholes-short-dense-north.lis", 6),
        }
    }
}

/// Get the bad-pixel mask appropriate for a detector. The detector's
/// controller was changed in the summer of 2012.
pub fn bad_pixel_mask(array_id: &str) -> Result<&'static str, InstrumentError> {
    match array_id.trim() {
        "SN7638228.1" => Ok(BPM_2011),
        "SN7638228.1.2" => Ok(BPM_2012),
        other => Err(InstrumentError::UnknownArrayId(other.to_string())),
    }
}

/// Get the arc line list for the grating encoded in a calibration directory
/// path.
pub fn arc_line_list(path: &Path) -> Result<&'static str, InstrumentError> {
    let s = path.to_string_lossy();
    if s.contains("10") && s.contains("32") {
        Ok("gnirs$data/lowresargon.dat")
    } else if s.contains("110") {
        Ok("gnirs$data/argon.dat")
    } else {
        Err(InstrumentError::UnknownGrating(path.display().to_string()))
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, EnumIter, EnumString)]
pub enum Observatory {
    #[strum(serialize = "Gemini-North")]
    GeminiNorth,

    #[strum(serialize = "Gemini-South")]
    GeminiSouth,
}

impl Observatory {
    pub fn latitude_deg(self) -> f64 {
        match self {
            Observatory::GeminiNorth => GEMINI_NORTH_LAT_DEG,
            Observatory::GeminiSouth => GEMINI_SOUTH_LAT_DEG,
        }
    }
}

#[derive(Error, Debug)]
pub enum InstrumentError {
    #[error("Unknown GNIRS XD configuration in '{0}'; expected one of LB_SXD, LB_LXD, SB_SXD")]
    UnknownXdConfig(String),

    #[error("Unknown ARRAYID '{0}'; can't pick a bad-pixel mask")]
    UnknownArrayId(String),

    #[error("Can't determine the grating (and arc line list) from '{0}'")]
    UnknownGrating(String),
}
