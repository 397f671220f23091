// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Extracting 1D spectra from the combined 2D spectra of telluric and
//! science targets.
//!
//! Telluric directories are done first; their aperture centers are the
//! reference used to check (and, if needed, force) the science extraction.

mod error;
pub(crate) mod peaks;

pub use error::ExtractError;

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use strum_macros::Display;

use crate::{
    config::{Background, PypeConfig, RuntimeFilenames},
    constants::{
        ACQ_LIST, APALL_TRACING_COLUMNS, APERTURE_TABLE, EXTRACTION_LINE, INTERMEDIATE_DIR,
        REEXTRACT_PREFIX, SUM_TRACING_COLUMNS, TELLURIC_LINK,
    },
    instrument::XdConfig,
    interact::{pause, Prompter},
    io::{
        fits::{fits_get_primary_key, fits_open, fits_sci_hdus},
        outputs::remove,
        prepare_output, Manifest, ManifestError,
    },
    toolkit::{parse::rewrite_aperture, resolve_dir, with_directory, Task, TaskValue, Toolkit},
};
use peaks::{aperture_file, expected_pixel_offset, match_peaks, read_apertures, QOffsets};

/// The kind of target in an observation directory.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    #[strum(serialize = "telluric")]
    Telluric,

    #[strum(serialize = "science")]
    Science,
}

/// Extract the spectra of every enabled telluric directory, then every
/// enabled science directory.
pub fn run(
    config: &PypeConfig,
    toolkit: &mut dyn Toolkit,
    prompter: &mut dyn Prompter,
) -> Result<(), ExtractError> {
    for (target, records) in [
        (Target::Telluric, &config.telluric_directories),
        (Target::Science, &config.science_directories),
    ] {
        for record in records {
            if record.enabled {
                extract_directory(config, toolkit, prompter, &record.path, target)?;
            } else {
                warn!(
                    "Extraction turned off for {target} directory {}; not extracting it",
                    record.path.display()
                );
            }
        }
    }
    Ok(())
}

/// The nsextract settings for one directory.
#[derive(Debug, Clone)]
pub(crate) struct ExtractionParams {
    pub(crate) interactive: bool,
    pub(crate) use_apall: bool,
    pub(crate) background: Background,
    /// Half the aperture width [arcsec].
    pub(crate) radius: f64,
}

impl ExtractionParams {
    pub(crate) fn new(config: &PypeConfig) -> ExtractionParams {
        let interactive = config.interactive.nsextract_inter;
        let background = if interactive {
            Background::Fit
        } else {
            config.extraction.subtract_bkg
        };
        ExtractionParams {
            interactive,
            use_apall: config.extraction.use_apall,
            background,
            radius: config.extraction.aperture_radius,
        }
    }

    pub(crate) fn tracing_columns(&self) -> i64 {
        if self.use_apall {
            APALL_TRACING_COLUMNS
        } else {
            SUM_TRACING_COLUMNS
        }
    }

    /// An nsextract call on `image`. An empty `trace` traces the image
    /// itself.
    pub(crate) fn task(&self, image: &str, prefix: &str, trace: &str) -> Task {
        Task::new("nsextract")
            .param("inimages", image)
            .param("outspectra", "")
            .param("outprefix", prefix)
            .param("dispaxis", 1)
            .param("database", "")
            .param("line", EXTRACTION_LINE)
            .param("nsum", self.tracing_columns())
            .param("ylevel", TaskValue::Indef)
            .param("upper", self.radius)
            .param("lower", -self.radius)
            .param("background", self.background.to_string())
            .param("fl_vardq", true)
            .param("fl_addvar", false)
            .param("fl_skylines", true)
            .param("fl_inter", self.interactive)
            .param("fl_apall", self.use_apall)
            .param("fl_trace", false)
            .param("aptable", APERTURE_TABLE)
            .param("fl_usetabap", false)
            .param("fl_flipped", true)
            .param("fl_project", true)
            .param("fl_findneg", false)
            .param("bgsample", "*")
            .param("trace", trace)
            .param("tr_nsum", 10)
            .param("tr_step", 10)
            .param("tr_nlost", 3)
            .param("tr_function", "legendre")
            .param("tr_order", 5)
            .param("tr_sample", "*")
            .param("tr_naver", 1)
            .param("tr_niter", 0)
            .param("tr_lowrej", 3.0)
            .param("tr_highrej", 3.0)
            .param("tr_grow", 0.0)
            .param("weights", "variance")
            .param("verbose", true)
    }
}

/// Extract the spectra of one observation directory. `obs_dir` is the
/// target's directory; the work happens in its `Intermediate` subdirectory.
pub fn extract_directory(
    config: &PypeConfig,
    toolkit: &mut dyn Toolkit,
    prompter: &mut dyn Prompter,
    obs_dir: &Path,
    target: Target,
) -> Result<(), ExtractError> {
    let obs_dir = resolve_dir(toolkit.cwd(), obs_dir);
    let dir = obs_dir.join(INTERMEDIATE_DIR);
    info!("Extracting {target} spectra in {}", dir.display());
    let names = &config.filenames;

    let src = dir.join(&names.combined_src);
    if !src.exists() {
        return Err(ExtractError::MissingCombinedSource(src));
    }
    let mut calculate_snr = config.extraction.calculate_snr;
    if calculate_snr && !dir.join(&names.combined_sky).exists() {
        warn!(
            "{} is not available; not extracting the sky spectrum, so the S/N can't be calculated for {}",
            names.combined_sky,
            dir.display()
        );
        calculate_snr = false;
    }
    let xd = XdConfig::from_path(&dir)?;
    let params = ExtractionParams::new(config);
    debug!("{xd} configuration; extraction settings {params:?}");

    with_directory(toolkit, &dir, |toolkit| -> Result<(), ExtractError> {
        if config.manual_mode {
            pause(prompter, "About to enter extract 1D spectra.").map_err(ExtractError::Prompt)?;
        }

        extract(toolkit, config, &dir, &names.combined_src, &params)?;
        if calculate_snr {
            info!("Extracting the combined sky spectrum for the S/N");
            extract(toolkit, config, &dir, &names.combined_sky, &params)?;
        }

        if target == Target::Science {
            if params.interactive {
                info!("nsextract was run interactively; not checking the science peaks");
            } else if config.extraction.check_peaks_match {
                check_science_peaks(config, toolkit, &obs_dir, xd, &params)?;
            } else {
                warn!("Neither interactive extraction nor peak checking is on; check the science extraction by hand");
            }
        }
        Ok(())
    })?;

    info!("1D extraction completed for {}", dir.display());
    Ok(())
}

/// Run nsextract on `image` unless its output already exists.
fn extract(
    toolkit: &mut dyn Toolkit,
    config: &PypeConfig,
    dir: &Path,
    image: &str,
    params: &ExtractionParams,
) -> Result<(), ExtractError> {
    let prefix = &config.filenames.extract_regular_prefix;
    let output = dir.join(format!("{prefix}{image}"));
    if prepare_output(&output, config.overwrite, &format!("extracting {image}"))?.should_run() {
        toolkit.run(&params.task(image, prefix, ""))?;
    }
    Ok(())
}

/// Read the Q offsets of a target's last acquisition image and its combined
/// source image.
fn q_offsets(dir: &Path, names: &RuntimeFilenames) -> Result<QOffsets, ExtractError> {
    let acq = Manifest::read(dir, ACQ_LIST)?;
    let acq_file = acq
        .file_paths()
        .pop()
        .ok_or(ManifestError::Empty { path: acq.path })?;
    let src = dir.join(&names.combined_src);
    let read = |file: PathBuf| -> Result<f64, ExtractError> {
        fits_get_primary_key(&file, "QOFFSET")?.ok_or(ExtractError::NoQOffset(file))
    };
    Ok(QOffsets {
        acquisition: read(acq_file)?,
        combined: read(src)?,
    })
}

/// Compare the science apertures with the telluric ones, and re-extract the
/// science at the expected positions if any peak is off.
fn check_science_peaks(
    config: &PypeConfig,
    toolkit: &mut dyn Toolkit,
    obs_dir: &Path,
    xd: XdConfig,
    params: &ExtractionParams,
) -> Result<(), ExtractError> {
    let names = &config.filenames;
    let stem = names.combined_src_stem();
    let num_orders = xd.orders().len();
    let dir = obs_dir.join(INTERMEDIATE_DIR);
    let tel_dir = obs_dir.join(TELLURIC_LINK).join(INTERMEDIATE_DIR);
    let tel_db = tel_dir.join(&names.database_dir);

    let tel_apertures = if tel_db.is_dir() {
        read_apertures(&tel_db, &stem, num_orders)?
    } else {
        vec![]
    };
    if tel_apertures.is_empty() || tel_apertures.iter().any(|a| a.center.is_none()) {
        warn!(
            "Peak checking is on, but the telluric aperture files in {} are not all available; not checking the science peaks",
            tel_db.display()
        );
        return Ok(());
    }

    let sci_db = dir.join(&names.database_dir);
    let sci_apertures = read_apertures(&sci_db, &stem, num_orders)?;
    let src = dir.join(&names.combined_src);
    let pixel_scale: f64 =
        fits_get_primary_key(&src, "PIXSCALE")?.ok_or(ExtractError::NoPixelScale(src))?;
    let offset = expected_pixel_offset(
        q_offsets(&dir, names)?,
        q_offsets(&tel_dir, names)?,
        pixel_scale,
    );
    info!("Expected science peak offset from the telluric: {offset:.4} pixels");

    let matches = match_peaks(
        &sci_apertures,
        &tel_apertures,
        offset,
        config.extraction.tolerance_offset,
    );
    if matches.iter().all(|m| m.matched) {
        info!("All science peaks are where they were expected; not re-extracting");
        return Ok(());
    }

    info!("Re-extracting the science spectrum using the telluric apertures shifted to the expected positions");
    let new_stem = format!("{REEXTRACT_PREFIX}{stem}");
    for m in &matches {
        remove(&aperture_file(&sci_db, &stem, m.extension))?;
        let old = aperture_file(&tel_db, &stem, m.extension);
        let text = fs::read_to_string(&old).map_err(|err| ExtractError::Io { path: old, err })?;
        let new = aperture_file(&tel_db, &new_stem, m.extension);
        let rewritten = rewrite_aperture(&text, &stem, &new_stem, m.aperture_center());
        fs::write(&new, rewritten).map_err(|err| ExtractError::Io { path: new, err })?;
    }

    let reference = format!("{REEXTRACT_PREFIX}{}", names.combined_src);
    let (from, to) = (
        tel_dir.join(&names.combined_src),
        tel_dir.join(&reference),
    );
    fs::copy(&from, &to).map_err(|err| ExtractError::Io { path: to, err })?;

    let prefix = &names.extract_regular_prefix;
    let output = dir.join(format!("{prefix}{}", names.combined_src));
    remove(&output)?;

    let trace = Path::new("..")
        .join(TELLURIC_LINK)
        .join(INTERMEDIATE_DIR)
        .join(&reference);
    let forced = ExtractionParams {
        use_apall: true,
        ..params.clone()
    };
    toolkit.run(&forced.task(
        &names.combined_src,
        prefix,
        &trace.display().to_string(),
    ))?;

    let mut fptr = fits_open(&output)?;
    let found = fits_sci_hdus(&mut fptr)?.len();
    if found < num_orders {
        return Err(ExtractError::MissingExtensions {
            file: output,
            found,
            expected: num_orders,
        });
    }
    info!("Science spectrum re-extracted with {found} orders");
    Ok(())
}
