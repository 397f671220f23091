// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Per-target numbers shown on a data sheet, and the geometry needed to work
//! out the parallactic angle.

use std::str::FromStr;

use indexmap::IndexMap;
use log::{debug, warn};

use crate::instrument::Observatory;

/// Shown in place of anything that couldn't be read or measured.
pub(crate) const UNKNOWN: &str = "unknown";

/// The primary-header keywords shown on a data sheet.
pub(crate) const HEADER_KEYS: [&str; 13] = [
    "GEMPRGID", "AIRMASS", "RA", "DEC", "HA", "AZIMUTH", "PA", "OBSERVAT", "RAWIQ", "RAWCC",
    "RAWWV", "RAWBG", "DATE-OBS",
];

/// Column labels of the first table (after the program/date cell).
pub(crate) const PROFILE_LABELS: [&str; 5] = [
    "Total counts, K",
    "FWHM (\"), K",
    "S/N, 2.1-2.2 um",
    "Airmass",
    "HA",
];

/// Column labels of the second table (after the program/date cell).
pub(crate) const CONDITIONS_LABELS: [&str; 7] =
    ["Slit Angle", "Par. Angle", "Diff", "IQ", "CC", "WV", "SB"];

/// Convert sexagesimal `[-]HH:MM:SS.sss` hours into decimal degrees.
pub(crate) fn hms2deg(angle: &str) -> Option<f64> {
    let angle = angle.trim();
    let (sign, angle) = match angle.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, angle.strip_prefix('+').unwrap_or(angle)),
    };
    let mut parts = angle.split(':').map(|p| p.trim().parse::<f64>());
    let (h, m, s) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(Ok(h)), Some(Ok(m)), Some(Ok(s)), None) => (h, m, s),
        _ => return None,
    };
    let hours = h + m / 60.0 + s / 3600.0;
    Some(sign * hours / 24.0 * 360.0)
}

/// The parallactic angle [degrees] of a target at declination `dec`, hour
/// angle `ha` and azimuth `az`, seen from latitude `lat`. All in degrees.
pub(crate) fn parallactic(dec: f64, ha: f64, lat: f64, az: f64) -> f64 {
    let (dec, ha, lat, az) = (
        dec.to_radians(),
        ha.to_radians(),
        lat.to_radians(),
        az.to_radians(),
    );
    let pa = if dec.cos() != 0.0 {
        let sinp = -az.sin() * lat.cos() / dec.cos();
        let cosp = -az.cos() * ha.cos() - az.sin() * ha.sin() * lat.sin();
        sinp.atan2(cosp)
    } else if lat > 0.0 {
        std::f64::consts::PI
    } else {
        0.0
    };
    let pa = pa.to_degrees();
    debug!("Parallactic angle: {pa:.3} degrees");
    pa
}

/// Everything shown on a data sheet about one target (the science target or
/// its telluric).
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TargetSummary {
    /// The alphanumeric characters of `OBJECT`.
    pub(crate) object: Option<String>,

    /// Header values by keyword. Keywords that couldn't be read are absent.
    pub(crate) headers: IndexMap<&'static str, String>,

    /// The fitted peak of the spatial profile [counts].
    pub(crate) peak: Option<f64>,

    /// The FWHM of the spatial profile [pixels].
    pub(crate) fwhm: Option<f64>,

    pub(crate) snr: Option<f64>,
}

impl TargetSummary {
    pub(crate) fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|s| s.as_str())
    }

    fn header_f64(&self, key: &str) -> Option<f64> {
        self.header(key).and_then(|v| v.parse().ok())
    }

    fn field(&self, key: &str) -> String {
        self.header(key).unwrap_or(UNKNOWN).to_string()
    }

    /// The parallactic angle [degrees], if all of its inputs are known.
    pub(crate) fn parallactic_angle(&self) -> Option<f64> {
        let name = self.object.as_deref().unwrap_or(UNKNOWN);
        let inputs = (
            self.header_f64("DEC"),
            self.header("HA").and_then(hms2deg),
            self.header("OBSERVAT")
                .and_then(|o| Observatory::from_str(o).ok()),
            self.header_f64("AZIMUTH"),
        );
        match inputs {
            (Some(dec), Some(ha), Some(observatory), Some(az)) => {
                Some(parallactic(dec, ha, observatory.latitude_deg(), az))
            }
            _ => {
                warn!("Can't work out the parallactic angle of {name}: {inputs:?}");
                None
            }
        }
    }

    /// The difference between the slit and parallactic angles [degrees].
    pub(crate) fn angle_difference(&self) -> Option<f64> {
        Some((self.header_f64("PA")? - self.parallactic_angle()?).abs())
    }

    /// The first cell of each row.
    fn name(&self) -> String {
        self.object.clone().unwrap_or_else(|| UNKNOWN.to_string())
    }

    /// Profile and observing numbers: object, peak, FWHM, S/N, airmass, HA.
    pub(crate) fn profile_row(&self) -> [String; 6] {
        [
            self.name(),
            format_option(self.peak, 1),
            format_option(self.fwhm, 2),
            format_option(self.snr, 1),
            self.field("AIRMASS"),
            self.field("HA"),
        ]
    }

    /// Angles and conditions: object, slit angle, parallactic angle, their
    /// difference, IQ, CC, WV, SB.
    pub(crate) fn conditions_row(&self) -> [String; 8] {
        [
            self.name(),
            self.field("PA"),
            format_option(self.parallactic_angle(), 1),
            format_option(self.angle_difference(), 1),
            self.field("RAWIQ"),
            self.field("RAWCC"),
            self.field("RAWWV"),
            self.field("RAWBG"),
        ]
    }

    /// The top-left cell of both tables.
    pub(crate) fn program_and_date(&self) -> String {
        format!("{} {}", self.field("GEMPRGID"), self.field("DATE-OBS"))
    }
}

fn format_option(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => UNKNOWN.to_string(),
    }
}
