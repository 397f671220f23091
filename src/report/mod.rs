// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Data sheets: a one-page summary of the quality of a reduced target.
//!
//! For the science target and its telluric, the spatial profile is measured
//! with `imexam`, the S/N with `continuum` and `bplot`, and a handful of
//! header values are collected. The sheet also shows the combined spectrum
//! and each order that went into it.

mod error;
pub(crate) mod metrics;
pub(crate) mod plot;
#[cfg(test)]
mod tests;

pub use error::ReportError;

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use crate::{
    config::PypeConfig,
    constants::{FINAL_DIR, IMEXAM_ROW, INTERMEDIATE_DIR, SNR_WINDOW, TELLURIC_LINK},
    flux::combined_spectrum_name,
    instrument::{Order, XdConfig},
    io::{
        fits::{fits_get_optional_key, fits_open, fits_open_hdu},
        outputs::remove,
        spectrum::TextSpectrum,
    },
    toolkit::{
        parse::{bplot_snr, imexam_fit, read_aperture_center, GaussianFit},
        resolve_dir, with_directory, Task, Toolkit,
    },
};
use metrics::{TargetSummary, HEADER_KEYS};
use plot::{scale_reference, DataSheet, OrderTrace};

/// The name of a data sheet in a target's `Final` directory.
pub const DATA_SHEET: &str = "data_sheet.png";

/// The reference star spectrum in the runtime data directory.
const REFERENCE_SPECTRUM: &str = "vega.txt";

const TMP_CURSOR: &str = "tmp.cur";
const TMP_LOG: &str = "tmp.log";
const TMP_FITS: &str = "tmp.fits";

/// Write a data sheet for every enabled science directory.
pub fn run(config: &PypeConfig, toolkit: &mut dyn Toolkit) -> Result<(), ReportError> {
    for record in &config.science_directories {
        if record.enabled {
            report_directory(config, toolkit, &record.path)?;
        } else {
            warn!(
                "Data sheet turned off for {}; skipping it",
                record.path.display()
            );
        }
    }
    Ok(())
}

/// Write the data sheet of one science directory, returning its path.
pub fn report_directory(
    config: &PypeConfig,
    toolkit: &mut dyn Toolkit,
    obs_dir: &Path,
) -> Result<PathBuf, ReportError> {
    let obs_dir = resolve_dir(toolkit.cwd(), obs_dir);
    info!("Writing the data sheet for {}", obs_dir.display());
    let sheet = collect(config, toolkit, &obs_dir)?;

    let final_dir = obs_dir.join(FINAL_DIR);
    fs::create_dir_all(&final_dir).map_err(|err| ReportError::Io {
        path: final_dir.clone(),
        err,
    })?;
    let output = final_dir.join(DATA_SHEET);
    plot::write_data_sheet(&sheet, &output)?;
    info!("Wrote {}", output.display());
    Ok(output)
}

/// Measure and read everything that goes on a data sheet.
pub(crate) fn collect(
    config: &PypeConfig,
    toolkit: &mut dyn Toolkit,
    obs_dir: &Path,
) -> Result<DataSheet, ReportError> {
    let names = &config.filenames;
    let orders = XdConfig::from_path(obs_dir)?.orders();
    let sci_dir = obs_dir.join(INTERMEDIATE_DIR);
    let tel_dir = obs_dir.join(TELLURIC_LINK);
    // The S/N window is in the first (reddest) order.
    let snr_order = orders[0];
    let sci_spectrum = format!(
        "{}{}",
        names.flux_calib_prefix,
        names.science_order_spectrum(snr_order)
    );

    let mut science = measure_target(config, toolkit, obs_dir)?;
    let mut telluric = measure_target(config, toolkit, &tel_dir)?;
    if config.extraction.calculate_snr {
        science.snr = estimate_snr(toolkit, &sci_dir, &sci_spectrum)?;
        telluric.snr = estimate_snr(
            toolkit,
            &tel_dir.join(INTERMEDIATE_DIR),
            &names.standard_order_spectrum(snr_order),
        )?;
    } else {
        info!("S/N estimation is turned off");
    }
    debug!("Science: {science:?}");
    debug!("Telluric: {telluric:?}");

    let object = science
        .object
        .clone()
        .ok_or_else(|| ReportError::MissingObject(sci_dir.join(&names.combined_src)))?;
    let spectrum_file = obs_dir.join(FINAL_DIR).join(combined_spectrum_name(&object));
    if !spectrum_file.exists() {
        return Err(ReportError::MissingSpectrum(spectrum_file));
    }
    let spectrum = TextSpectrum::read(&spectrum_file)?;
    if spectrum.is_empty() {
        return Err(ReportError::EmptySpectrum(spectrum_file));
    }

    let reference_file = config.runtime_data.join(REFERENCE_SPECTRUM);
    let reference = if reference_file.exists() {
        let mut reference = TextSpectrum::read(&reference_file)?;
        scale_reference(&mut reference, &spectrum);
        Some(reference)
    } else {
        warn!(
            "The reference spectrum {} doesn't exist; it won't be plotted",
            reference_file.display()
        );
        None
    };

    let units = flux_units(&sci_dir.join(&sci_spectrum)).unwrap_or_else(|| {
        warn!("The flux units of {object} are unknown");
        "F_lambda".to_string()
    });

    Ok(DataSheet {
        science,
        telluric,
        spectrum,
        reference,
        units,
        orders: order_traces(config, &sci_dir, orders)?,
        footer: format!(
            "gnirs_pype {}, {}",
            env!("CARGO_PKG_VERSION"),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ),
    })
}

/// The primary-header values and spatial profile of a target directory.
fn measure_target(
    config: &PypeConfig,
    toolkit: &mut dyn Toolkit,
    target_dir: &Path,
) -> Result<TargetSummary, ReportError> {
    let combined = target_dir
        .join(INTERMEDIATE_DIR)
        .join(&config.filenames.combined_src);
    if !combined.exists() {
        return Err(ReportError::MissingCombinedSource(combined));
    }
    let mut summary = read_headers(&combined)?;

    let fit = with_directory(
        toolkit,
        target_dir,
        |toolkit| -> Result<Option<GaussianFit>, ReportError> { fit_profile(config, toolkit) },
    )?;
    match fit {
        Some(fit) => {
            debug!("Profile fit of {}: {fit:?}", combined.display());
            summary.peak = Some(fit.peak);
            summary.fwhm = Some(fit.fwhm);
        }
        None => warn!(
            "Couldn't measure the spatial profile of {}",
            combined.display()
        ),
    }
    Ok(summary)
}

/// Read the data-sheet keywords of a file's primary header. Keywords that
/// can't be read are left out.
fn read_headers(file: &Path) -> Result<TargetSummary, ReportError> {
    let mut fptr = fits_open(file)?;
    let hdu = fits_open_hdu(&mut fptr, 0)?;
    let mut summary = TargetSummary::default();
    for key in HEADER_KEYS {
        match fits_get_optional_key::<String>(&mut fptr, &hdu, key) {
            Ok(Some(value)) => {
                summary.headers.insert(key, value.trim().to_string());
            }
            Ok(None) => warn!("{}[{key}] is undefined", file.display()),
            Err(e) => warn!("{}[{key}] is unreadable: {e}", file.display()),
        }
    }
    match fits_get_optional_key::<String>(&mut fptr, &hdu, "OBJECT") {
        Ok(Some(object)) => {
            summary.object = Some(object.chars().filter(|c| c.is_ascii_alphanumeric()).collect())
        }
        Ok(None) => warn!("{}[OBJECT] is undefined", file.display()),
        Err(e) => warn!("{}[OBJECT] is unreadable: {e}", file.display()),
    }
    Ok(summary)
}

/// Fit a Gaussian to the spatial profile of the first order of the combined
/// source frame, at the extraction aperture. The toolkit must be in the
/// target's directory.
fn fit_profile(
    config: &PypeConfig,
    toolkit: &mut dyn Toolkit,
) -> Result<Option<GaussianFit>, ReportError> {
    let names = &config.filenames;
    let cwd = toolkit.cwd().to_path_buf();
    let ap_file = cwd
        .join(INTERMEDIATE_DIR)
        .join(&names.database_dir)
        .join(format!("ap{}_SCI_1_", names.combined_src_stem()));
    let center = match read_aperture_center(&ap_file) {
        Ok(Some(center)) => center,
        Ok(None) => {
            warn!("{} has no aperture center", ap_file.display());
            return Ok(None);
        }
        Err(e) => {
            warn!("Couldn't read {}: {e}", ap_file.display());
            return Ok(None);
        }
    };
    debug!("Spectrum X-position: {center:.2} pix");

    let cursor = cwd.join(TMP_CURSOR);
    let log = cwd.join(TMP_LOG);
    remove(&log)?;
    write_file(&cursor, &format!("{center:.3} {IMEXAM_ROW:.3}\n"))?;

    info!("Running imexam to measure the spectrum peak and FWHM");
    toolkit.run(
        &Task::new("imexam")
            .param(
                "input",
                format!("{}/{}[SCI,1]", INTERMEDIATE_DIR, names.combined_src),
            )
            .param("frame", 1)
            .param("output", "")
            .param("logfile", TMP_LOG)
            .param("keeplog", true)
            .param("defkey", "j")
            .param("ncstat", 5)
            .param("nlstat", 5)
            .param("imagecur", TMP_CURSOR)
            .param("use_display", false),
    )?;

    let fit = match fs::read_to_string(&log) {
        Ok(text) => imexam_fit(&text),
        Err(e) => {
            warn!("Couldn't read the imexam log {}: {e}", log.display());
            None
        }
    };
    remove(&cursor)?;
    remove(&log)?;
    Ok(fit)
}

/// Estimate the S/N of a spectrum (extension 1 of `file` in `dir`) over
/// [`SNR_WINDOW`].
fn estimate_snr(
    toolkit: &mut dyn Toolkit,
    dir: &Path,
    file: &str,
) -> Result<Option<f64>, ReportError> {
    let dir = resolve_dir(toolkit.cwd(), dir);
    if !dir.join(file).exists() {
        warn!(
            "Can't estimate the S/N of {}: it doesn't exist",
            dir.join(file).display()
        );
        return Ok(None);
    }

    with_directory(toolkit, &dir, |toolkit| -> Result<Option<f64>, ReportError> {
        info!("Estimating the S/N of {file}");
        let (start, end) = SNR_WINDOW;
        let cursor = dir.join(TMP_CURSOR);
        for tmp in [TMP_LOG, TMP_FITS] {
            remove(&dir.join(tmp))?;
        }
        write_file(&cursor, &format!("{start:.0} 0 1 m\n{end:.0} 0 1 m\nq"))?;

        toolkit.run(
            &Task::new("continuum")
                .param("input", format!("{file}[1]"))
                .param("output", TMP_FITS)
                .param("lines", "*")
                .param("bands", "1")
                .param("type", "ratio")
                .param("replace", false)
                .param("wavescale", true)
                .param("logscale", false)
                .param("override", false)
                .param("logfile", TMP_LOG)
                .param("interactive", false)
                .param("sample", format!("{start:.0}:{end:.0}"))
                .param("naverage", 1)
                .param("function", "spline3")
                .param("order", 3)
                .param("low_reject", 2.0)
                .param("high_reject", 3.0)
                .param("niterate", 5)
                .param("grow", 1.0),
        )?;
        let output = toolkit.run(
            &Task::new("bplot")
                .param("images", TMP_FITS)
                .param("apertures", "")
                .param("band", 1)
                .param("cursor", TMP_CURSOR)
                .param("next_image", "")
                .param("new_image", "")
                .param("overwrite", false)
                .param("spec2", "")
                .param("constant", 0.0)
                .param("wavelength", 0.0)
                .param("linelist", "")
                .param("wstart", 0.0)
                .param("wend", 0.0)
                .param("dw", 0.0)
                .param("boxsize", 2),
        )?;

        let snr = bplot_snr(&output.stdout);
        match snr {
            Some(snr) => debug!("S/N of {file}: {snr}"),
            None => warn!("bplot didn't report an S/N for {file}"),
        }
        for tmp in [TMP_CURSOR, TMP_LOG, TMP_FITS] {
            remove(&dir.join(tmp))?;
        }
        Ok(snr)
    })
}

/// `FUNITS` of a flux-calibrated spectrum, if it can be read.
fn flux_units(file: &Path) -> Option<String> {
    let mut fptr = fits_open(file).ok()?;
    let hdu = fits_open_hdu(&mut fptr, 1).ok()?;
    fits_get_optional_key(&mut fptr, &hdu, "FUNITS").ok()?
}

/// Every order's text spectrum, with its accepted region. Orders without a
/// text spectrum are left out.
fn order_traces(
    config: &PypeConfig,
    sci_dir: &Path,
    orders: &[Order],
) -> Result<Vec<OrderTrace>, ReportError> {
    let mut traces = Vec::with_capacity(orders.len());
    for &order in orders {
        let file = sci_dir.join(config.filenames.final_order_text(order));
        if !file.exists() {
            warn!("{} doesn't exist; order {order} won't be plotted", file.display());
            continue;
        }
        let full = TextSpectrum::read(&file)?;
        let accepted = match config.order_scaling_regions.get(&order) {
            Some(&(start, end)) => full.region(start, end),
            None => full.clone(),
        };
        traces.push(OrderTrace {
            order,
            full,
            accepted,
        });
    }
    Ok(traces)
}

fn write_file(path: &Path, contents: &str) -> Result<(), ReportError> {
    fs::write(path, contents).map_err(|err| ReportError::Io {
        path: path.to_path_buf(),
        err,
    })
}
