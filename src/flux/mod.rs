// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Flux calibration of the telluric-corrected science spectra.
//!
//! A blackbody at the standard star's temperature is made for each order. The
//! anchor orders' blackbodies are scaled to the standard's flux density; every
//! other order's blackbody is scaled to match the previous order's where the
//! two overlap. The science spectrum of each order is then multiplied by its
//! scaled blackbody.

pub(crate) mod blackbody;
mod error;
#[cfg(test)]
mod tests;

pub use error::FluxCalError;

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use crate::{
    config::{FluxCalibrationMethod, PypeConfig, StandardStar},
    constants::{FINAL_DIR, INTERMEDIATE_DIR, STANDARD_LINK, TELLURIC_LINK},
    instrument::{Order, XdConfig},
    interact::{pause, Prompter},
    io::{
        fits::{
            fits_edit, fits_get_image, fits_get_primary_key, fits_open_hdu, fits_write_image,
            fits_write_key, read_spectrum_fits,
        },
        prepare_outputs,
        spectrum::TextSpectrum,
    },
};
use blackbody::{overlap_scale, Blackbody, FluxDensity};

/// Flux calibrate every enabled science directory.
pub fn run(config: &PypeConfig, prompter: &mut dyn Prompter) -> Result<(), FluxCalError> {
    for record in &config.science_directories {
        if record.enabled {
            calibrate_directory(config, prompter, &record.path)?;
        } else {
            warn!(
                "Flux calibration turned off for {}; skipping it",
                record.path.display()
            );
        }
    }
    Ok(())
}

/// The name of a target's combined spectrum in its `Final` directory. Only
/// the alphanumeric characters of the object name are kept.
pub(crate) fn combined_spectrum_name(object: &str) -> String {
    let object: String = object.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    format!("{object}_src.txt")
}

/// Where the standard star's reduced data are, for a science directory.
pub(crate) fn standard_directory(method: FluxCalibrationMethod, obs_dir: &Path) -> PathBuf {
    let link = match method {
        FluxCalibrationMethod::TelluricApproximate => TELLURIC_LINK,
        FluxCalibrationMethod::FluxCalibrator => STANDARD_LINK,
    };
    obs_dir.join(link).join(INTERMEDIATE_DIR)
}

fn required_key<T: std::str::FromStr>(path: &Path, key: &'static str) -> Result<T, FluxCalError> {
    fits_get_primary_key(path, key)?.ok_or_else(|| FluxCalError::MissingKey {
        path: path.to_path_buf(),
        key,
    })
}

/// Flux calibrate the spectra of one science directory.
pub fn calibrate_directory(
    config: &PypeConfig,
    prompter: &mut dyn Prompter,
    obs_dir: &Path,
) -> Result<(), FluxCalError> {
    let dir = obs_dir.join(INTERMEDIATE_DIR);
    info!("Flux calibrating the spectra in {}", dir.display());
    let method = config.flux.method;
    let std_dir = standard_directory(method, obs_dir);
    if !std_dir.is_dir() {
        return Err(FluxCalError::MissingStandard {
            method,
            path: std_dir,
        });
    }
    if method == FluxCalibrationMethod::FluxCalibrator {
        return Err(FluxCalError::FluxCalibratorUnavailable(std_dir));
    }
    debug!("Standard star directory: {}", std_dir.display());

    let names = &config.filenames;
    let orders = XdConfig::from_path(&dir)?.orders();
    let sci_files: Vec<PathBuf> = orders
        .iter()
        .map(|&o| dir.join(names.science_order_spectrum(o)))
        .collect();
    let std_files: Vec<PathBuf> = orders
        .iter()
        .map(|&o| std_dir.join(names.standard_order_spectrum(o)))
        .collect();
    if let Some(missing) = sci_files.iter().chain(&std_files).find(|f| !f.exists()) {
        return Err(FluxCalError::MissingSpectrum(missing.clone()));
    }

    let std_name: String = required_key(&std_files[0], "OBJECT")?;
    let std_name = std_name.trim();
    let standard = config
        .standards
        .get(std_name)
        .ok_or_else(|| FluxCalError::UnknownStandard(std_name.to_string()))?;
    debug!("Standard {std_name}: {standard:?}");

    let sci_exptime: f64 = required_key(&sci_files[0], "EXPTIME")?;
    let std_exptime: f64 = required_key(&std_files[0], "EXPTIME")?;
    debug!("Science exposure time {sci_exptime} s, standard exposure time {std_exptime} s");

    if config.manual_mode {
        pause(prompter, "About to start flux calibration.").map_err(FluxCalError::Prompt)?;
    }

    let calibrator = OrderCalibrator {
        config,
        dir: &dir,
        standard,
        exptime_ratio: std_exptime / sci_exptime,
    };
    let mut previous: Option<(Order, Blackbody)> = None;
    for ((&order, sci_file), std_file) in orders.iter().zip(&sci_files).zip(&std_files) {
        let scaled = calibrator.calibrate(order, sci_file, std_file, previous.as_ref())?;
        previous = Some((order, scaled));
    }

    let object: String = required_key(&sci_files[0], "OBJECT")?;
    combine_orders(config, obs_dir, orders, &object)?;
    info!("Flux calibration completed for {}", dir.display());
    Ok(())
}

struct OrderCalibrator<'a> {
    config: &'a PypeConfig,
    dir: &'a Path,
    standard: &'a StandardStar,
    exptime_ratio: f64,
}

impl OrderCalibrator<'_> {
    /// Flux calibrate one order, returning its scaled blackbody. If the
    /// order's outputs exist and overwriting is off, the scaled blackbody is
    /// read back instead.
    fn calibrate(
        &self,
        order: Order,
        sci_file: &Path,
        std_file: &Path,
        previous: Option<&(Order, Blackbody)>,
    ) -> Result<Blackbody, FluxCalError> {
        let names = &self.config.filenames;
        let unscaled_name = format!("{}{order}.fits", names.bb_unscaled);
        let scaled_name = format!("{}{order}.fits", names.bb_scaled);
        let output_name = format!(
            "{}{}",
            names.flux_calib_prefix,
            names.science_order_spectrum(order)
        );
        let output = self.dir.join(&output_name);
        let text = self.dir.join(names.final_order_text(order));

        let outputs = prepare_outputs(
            self.dir,
            &[&unscaled_name, &scaled_name, &output_name],
            self.config.overwrite,
            &format!("flux calibration of order {order}"),
        )?;
        if !outputs.should_run() {
            if !text.exists() {
                export_text(&output, &text)?;
            }
            return Ok(Blackbody::read(&self.dir.join(&scaled_name))?);
        }

        info!("Flux calibrating order {order} of {}", sci_file.display());
        let density = FluxDensity::new(
            self.standard.magnitudes.get(&order).copied(),
            self.config.zero_magnitude_fluxes.get(&order).copied(),
            self.exptime_ratio,
        )
        .ok_or(FluxCalError::NoZeroPoint(order))?;
        match density {
            FluxDensity::Absolute(f) => {
                info!("Absolute flux calibration of order {order}: flambda = {f:e}")
            }
            FluxDensity::Relative(f) => {
                info!("Relative flux calibration of order {order}: flambda = {f}")
            }
        }

        let (wcs, _) = read_spectrum_fits(std_file, 1)?;
        info!(
            "Making a {}K blackbody from {:.1} to {:.1} A",
            self.standard.temperature,
            wcs.start(),
            wcs.end()
        );
        let unscaled = Blackbody::new(wcs, self.standard.temperature);

        let factor = if self.config.flux.anchor_orders.contains(&order) {
            density.value() / unscaled.mean()
        } else {
            let (previous_order, previous) =
                previous.ok_or(FluxCalError::NoPreviousOrder(order))?;
            overlap_scale(previous, &unscaled).ok_or(FluxCalError::NoOverlap {
                previous: *previous_order,
                order,
            })?
        };
        info!("The blackbody scale factor for order {order} is {factor:e}");
        let scaled = unscaled.scaled(factor);
        unscaled.write(&self.dir.join(&unscaled_name))?;
        scaled.write(&self.dir.join(&scaled_name))?;

        apply_blackbody(sci_file, &output, order, &scaled, density.units())?;
        export_text(&output, &text)?;
        info!("Completed flux calibrating order {order}");
        Ok(scaled)
    }
}

/// Write a copy of `sci_file` with its spectrum (extension 1) multiplied by
/// the blackbody and its flux units recorded.
fn apply_blackbody(
    sci_file: &Path,
    output: &Path,
    order: Order,
    blackbody: &Blackbody,
    units: &str,
) -> Result<(), FluxCalError> {
    fs::copy(sci_file, output).map_err(|err| FluxCalError::Io {
        path: output.to_path_buf(),
        err,
    })?;
    let mut fptr = fits_edit(output)?;
    let hdu = fits_open_hdu(&mut fptr, 1)?;
    let mut data: Vec<f64> = fits_get_image(&mut fptr, &hdu)?;
    if data.len() != blackbody.flux.len() {
        return Err(FluxCalError::LengthMismatch {
            file: sci_file.to_path_buf(),
            order,
            found: data.len(),
            expected: blackbody.flux.len(),
        });
    }
    data.iter_mut()
        .zip(blackbody.flux.iter())
        .for_each(|(d, b)| *d *= b);
    fits_write_image(&mut fptr, &hdu, &data)?;
    fits_write_key(&mut fptr, &hdu, "FUNITS", units)?;
    Ok(())
}

/// Write a flux-calibrated order as a plain-text spectrum.
fn export_text(output: &Path, text: &Path) -> Result<(), FluxCalError> {
    let (wcs, fluxes) = read_spectrum_fits(output, 1)?;
    let spectrum = TextSpectrum {
        wavelengths: wcs.wavelengths(),
        fluxes,
    };
    spectrum.write(text)?;
    debug!("Wrote {}", text.display());
    Ok(())
}

/// Join the accepted region of every order into the target's combined
/// spectrum in its `Final` directory.
fn combine_orders(
    config: &PypeConfig,
    obs_dir: &Path,
    orders: &[Order],
    object: &str,
) -> Result<PathBuf, FluxCalError> {
    let dir = obs_dir.join(INTERMEDIATE_DIR);
    let mut pieces = Vec::with_capacity(orders.len());
    for &order in orders {
        let spectrum = TextSpectrum::read(&dir.join(config.filenames.final_order_text(order)))?;
        let piece = match config.order_scaling_regions.get(&order) {
            Some(&(start, end)) => spectrum.region(start, end),
            None => {
                warn!("No scaling region for order {order}; using all of it");
                spectrum
            }
        };
        pieces.push(piece);
    }

    let final_dir = obs_dir.join(FINAL_DIR);
    fs::create_dir_all(&final_dir).map_err(|err| FluxCalError::Io {
        path: final_dir.clone(),
        err,
    })?;
    let combined = final_dir.join(combined_spectrum_name(object));
    TextSpectrum::combine(&pieces).write(&combined)?;
    info!("Wrote the combined spectrum {}", combined.display());
    Ok(combined)
}
