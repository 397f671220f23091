// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Blackbody spectra standing in for the continuum of a standard star, and
//! the flux density they get scaled to.

use std::path::Path;

use ndarray::prelude::*;

use crate::{
    constants::{BOLTZMANN_K, CM_PER_ANGSTROM, PLANCK_H, SPEED_OF_LIGHT},
    io::{
        fits::{read_spectrum_fits, write_spectrum_fits, LinearWcs},
        FitsError,
    },
};

/// The value of a freshly made blackbody at the middle of its wavelength
/// range.
pub(crate) const CONTINUUM_LEVEL: f64 = 1000.0;

/// Header value of `FUNITS` for an absolute flux calibration.
pub(crate) const ABSOLUTE_UNITS: &str = "erg/cm^2/s/A";
/// Header value of `FUNITS` for a relative flux calibration.
pub(crate) const RELATIVE_UNITS: &str = "Flambda, relative";

/// Planck's law per unit wavelength [erg/s/cm^2/cm/sr], for a wavelength in
/// Angstroms and a temperature in Kelvin.
pub(crate) fn planck_flambda(wavelength: f64, temperature: f64) -> f64 {
    let l = wavelength * CM_PER_ANGSTROM;
    let hc = PLANCK_H * SPEED_OF_LIGHT;
    2.0 * hc * SPEED_OF_LIGHT / l.powi(5) / (hc / (l * BOLTZMANN_K * temperature)).exp_m1()
}

/// The flux density a standard's blackbody is scaled to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum FluxDensity {
    /// From the standard's magnitude [erg/cm^2/s/A].
    Absolute(f64),
    /// Only the exposure-time ratio is known.
    Relative(f64),
}

impl FluxDensity {
    /// `exptime_ratio` is the standard's exposure time over the science's.
    /// With a magnitude, `zero_magnitude_flux` must also be given.
    pub(crate) fn new(
        magnitude: Option<f64>,
        zero_magnitude_flux: Option<f64>,
        exptime_ratio: f64,
    ) -> Option<FluxDensity> {
        match magnitude {
            Some(mag) => {
                let zero = zero_magnitude_flux?;
                Some(FluxDensity::Absolute(
                    10_f64.powf(-mag / 2.5) * zero * exptime_ratio,
                ))
            }
            None => Some(FluxDensity::Relative(exptime_ratio)),
        }
    }

    pub(crate) fn value(self) -> f64 {
        match self {
            FluxDensity::Absolute(f) | FluxDensity::Relative(f) => f,
        }
    }

    pub(crate) fn units(self) -> &'static str {
        match self {
            FluxDensity::Absolute(_) => ABSOLUTE_UNITS,
            FluxDensity::Relative(_) => RELATIVE_UNITS,
        }
    }
}

/// A blackbody sampled on a linear wavelength grid.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Blackbody {
    pub(crate) wcs: LinearWcs,
    pub(crate) flux: Array1<f64>,
}

impl Blackbody {
    /// A blackbody at `temperature` [K] over the grid of `wcs`, normalised to
    /// [`CONTINUUM_LEVEL`] at the middle of the grid.
    pub(crate) fn new(wcs: LinearWcs, temperature: f64) -> Blackbody {
        let middle = 0.5 * (wcs.start() + wcs.end());
        let norm = CONTINUUM_LEVEL / planck_flambda(middle, temperature);
        let flux = Array1::from(wcs.wavelengths()).mapv(|w| planck_flambda(w, temperature) * norm);
        Blackbody { wcs, flux }
    }

    pub(crate) fn mean(&self) -> f64 {
        self.flux.mean().unwrap_or(0.0)
    }

    /// The mean of the pixels with wavelengths in `[start, end]`, if there are
    /// any.
    pub(crate) fn mean_between(&self, start: f64, end: f64) -> Option<f64> {
        let (sum, count) = self
            .wcs
            .wavelengths()
            .into_iter()
            .zip(self.flux.iter())
            .filter(|(w, _)| (start..=end).contains(w))
            .fold((0.0, 0_usize), |(sum, count), (_, f)| (sum + f, count + 1));
        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }

    pub(crate) fn scaled(&self, factor: f64) -> Blackbody {
        Blackbody {
            wcs: self.wcs,
            flux: &self.flux * factor,
        }
    }

    pub(crate) fn write(&self, file: &Path) -> Result<(), FitsError> {
        write_spectrum_fits(file, &self.wcs, &self.flux.to_vec())
    }

    pub(crate) fn read(file: &Path) -> Result<Blackbody, FitsError> {
        let (wcs, data) = read_spectrum_fits(file, 0)?;
        Ok(Blackbody {
            wcs,
            flux: Array1::from(data),
        })
    }
}

/// The factor that brings `current` (unscaled) in line with the already
/// scaled blackbody of the previous order, using their means over the overlap
/// from the start of the previous order to the end of the current one. `None`
/// if the orders don't overlap.
pub(crate) fn overlap_scale(previous: &Blackbody, current: &Blackbody) -> Option<f64> {
    let (start, end) = (previous.wcs.start(), current.wcs.end());
    if end < start {
        return None;
    }
    let previous_mean = previous.mean_between(start, end)?;
    let current_mean = current.mean_between(start, end)?;
    Some(previous_mean / current_mean)
}
