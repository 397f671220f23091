// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Checking that nsextract found the science target where the telluric
//! standard says it should be.
//!
//! For faint targets nsextract often picks up a noise peak. The telluric is
//! bright, so its aperture centers are trusted; the science target should be
//! at the same place along the slit, shifted by the difference between the
//! two targets' Q offsets from their acquisitions.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::toolkit::parse::read_aperture_center;

use super::ExtractError;

/// The aperture recorded by nsextract for one extension of an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApertureRecord {
    /// The (1-indexed) SCI extension.
    pub extension: usize,
    /// `None` if the aperture file is missing or has no `center` line.
    pub center: Option<f64>,
}

/// The aperture database file of an extension of an image.
pub(crate) fn aperture_file(database: &Path, image_stem: &str, extension: usize) -> PathBuf {
    database.join(format!("ap{image_stem}_SCI_{extension}_"))
}

/// Read the aperture centers of extensions `1..=num_extensions` of an image.
pub fn read_apertures(
    database: &Path,
    image_stem: &str,
    num_extensions: usize,
) -> Result<Vec<ApertureRecord>, ExtractError> {
    (1..=num_extensions)
        .map(|extension| {
            let path = aperture_file(database, image_stem, extension);
            let center =
                read_aperture_center(&path).map_err(|err| ExtractError::Io { path, err })?;
            Ok(ApertureRecord { extension, center })
        })
        .collect()
}

/// The Q offsets (along the slit, [arcsec]) of a target's acquisition image
/// and combined source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QOffsets {
    pub acquisition: f64,
    pub combined: f64,
}

impl QOffsets {
    /// How far the target is from where it was acquired [arcsec].
    fn absolute(&self) -> f64 {
        (self.acquisition - self.combined).abs()
    }
}

/// The expected position of the science peak relative to the telluric peak
/// [pixels].
pub fn expected_pixel_offset(science: QOffsets, telluric: QOffsets, pixel_scale: f64) -> f64 {
    (science.absolute() - telluric.absolute()) / pixel_scale
}

/// How one extension's science peak compares with its expected position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakMatch {
    pub extension: usize,
    /// The telluric aperture center.
    pub reference: f64,
    /// Where nsextract put the science aperture, if anywhere.
    pub located: Option<f64>,
    /// The telluric aperture center plus the expected offset.
    pub expected: f64,
    pub matched: bool,
}

impl PeakMatch {
    /// The center of the re-extraction aperture: the telluric center if the
    /// peak matched, otherwise the expected position.
    pub fn aperture_center(&self) -> f64 {
        if self.matched {
            self.reference
        } else {
            self.expected
        }
    }
}

/// Compare the science apertures with the telluric ones. A science peak
/// matches if it's strictly within `tolerance` pixels of the expected
/// position; a missing science peak never matches. Extensions without a
/// telluric center can't be checked and are left out.
pub fn match_peaks(
    science: &[ApertureRecord],
    telluric: &[ApertureRecord],
    offset: f64,
    tolerance: f64,
) -> Vec<PeakMatch> {
    let mut matches = Vec::with_capacity(telluric.len());
    for tel in telluric {
        let Some(tel_center) = tel.center else {
            warn!(
                "No telluric aperture center for extension {}; can't check the science peak",
                tel.extension
            );
            continue;
        };
        let expected = tel_center + offset;
        let located = science
            .iter()
            .find(|s| s.extension == tel.extension)
            .and_then(|s| s.center);
        let matched = match located {
            Some(l) if (l - expected).abs() < tolerance => {
                info!(
                    "Extension {}: science spectrum found close to the expected position (located {l:.4} vs. expected {expected:.4})",
                    tel.extension
                );
                true
            }
            Some(l) => {
                warn!(
                    "Extension {}: science spectrum found at an unexpected position (located {l:.4} vs. expected {expected:.4}); it's probably noise",
                    tel.extension
                );
                false
            }
            None => {
                warn!(
                    "Extension {}: nothing extracted for the science; expected a peak at {expected:.4}",
                    tel.extension
                );
                false
            }
        };
        matches.push(PeakMatch {
            extension: tel.extension,
            reference: tel_center,
            located,
            expected,
            matched,
        });
    }
    matches
}
