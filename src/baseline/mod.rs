// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Baseline calibration: turning the raw flats, arcs and pinhole frames of a
//! calibration directory into a master flat, a spatial-distortion solution and
//! a wavelength solution.
//!
//! The work is split into five steps which run in order. Each step checks for
//! its outputs first; existing outputs are reused unless overwriting is
//! requested, so a directory can be re-run safely.

mod error;

pub use error::BaselineError;

use std::{
    fs,
    ops::RangeInclusive,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::{
    config::{nofits, PypeConfig, RuntimeFilenames},
    constants::{
        ALL_LIST, APERTURE_TABLE, ARCS_LIST, ARC_CALIBRATED, ARC_CHECK_COLUMNS, ARC_LAST_PIXEL,
        ARC_ORDERS_LIST, ARRAY_TABLE, CONFIG_TABLE, IR_FLATS_LIST, NSAPPWAVE_TABLE,
        PINHOLES_LIST, QH_FLATS_LIST,
    },
    instrument::{arc_line_list, bad_pixel_mask, Order, XdConfig},
    interact::{pause, valid_step_range, Prompter},
    io::{
        fits::{fits_get_primary_key, fits_get_required_key, fits_open, fits_sci_hdus},
        glob_in_dir, outputs::remove, prepare_output, prepare_outputs, Manifest, ManifestError,
    },
    toolkit::{parse::feature_count, resolve_dir, with_directory, Task, TaskValue, Toolkit},
};

/// The steps of the baseline calibration.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, EnumIter)]
#[repr(u8)]
pub enum CalibrationStep {
    #[strum(serialize = "clean calibration frames")]
    Clean = 1,

    #[strum(serialize = "prepare calibration frames")]
    Prepare = 2,

    #[strum(serialize = "create flat field")]
    Flat = 3,

    #[strum(serialize = "spatial curvature and spectral distortion")]
    SpatialDistortion = 4,

    #[strum(serialize = "wavelength solution")]
    WavelengthCal = 5,
}

impl CalibrationStep {
    pub fn number(self) -> u8 {
        self as u8
    }

    /// The steps from `start` to `stop`, inclusive. Numbers outside 1-5 are
    /// ignored.
    pub fn range(steps: RangeInclusive<i64>) -> impl Iterator<Item = CalibrationStep> {
        CalibrationStep::iter().filter(move |s| steps.contains(&i64::from(s.number())))
    }
}

/// The number of the last step.
pub const LAST_STEP: i64 = CalibrationStep::WavelengthCal as i64;

/// Calibrate every enabled calibration directory.
pub fn run(
    config: &PypeConfig,
    toolkit: &mut dyn Toolkit,
    prompter: &mut dyn Prompter,
) -> Result<(), BaselineError> {
    let (start, stop) = valid_step_range(
        prompter,
        config.calibration.start,
        config.calibration.stop,
        LAST_STEP,
    )
    .map_err(BaselineError::Prompt)?;

    for record in &config.calibration_directories {
        if record.enabled {
            calibrate_directory(config, toolkit, prompter, &record.path, start..=stop)?;
        } else {
            warn!(
                "Baseline calibration turned off for {}; not reducing it",
                record.path.display()
            );
        }
    }
    Ok(())
}

/// The manifests a calibration directory must have.
#[derive(Debug)]
struct CalibrationLists {
    all: Manifest,
    pinholes: Manifest,
}

impl CalibrationLists {
    fn read(dir: &Path) -> Result<CalibrationLists, BaselineError> {
        info!("Checking that the required lists are in {}", dir.display());
        let all = Manifest::read(dir, ALL_LIST)?;
        for name in [QH_FLATS_LIST, IR_FLATS_LIST] {
            Manifest::read(dir, name)?;
        }
        let pinholes = Manifest::read(dir, PINHOLES_LIST)?;
        Manifest::read(dir, ARCS_LIST)?;
        Ok(CalibrationLists { all, pinholes })
    }
}

/// Run steps `steps` of the baseline calibration on one directory.
pub fn calibrate_directory(
    config: &PypeConfig,
    toolkit: &mut dyn Toolkit,
    prompter: &mut dyn Prompter,
    dir: &Path,
    steps: RangeInclusive<i64>,
) -> Result<(), BaselineError> {
    let dir = resolve_dir(toolkit.cwd(), dir);
    info!("Working on calibrations in {}", dir.display());
    let xd = XdConfig::from_path(&dir)?;
    debug!("{xd} configuration; expecting orders {:?}", xd.orders());
    let lists = CalibrationLists::read(&dir)?;

    let calibrator = Calibrator {
        config,
        names: &config.filenames,
        dir: dir.clone(),
        xd,
        sdist_ref_image: format!(
            "{}{}{}",
            config.filenames.reduced_prefix,
            config.filenames.prepared_prefix,
            lists.pinholes.first().unwrap_or_default()
        ),
        lists,
    };

    with_directory(toolkit, &dir, |toolkit| -> Result<(), BaselineError> {
        for step in CalibrationStep::range(steps) {
            if config.manual_mode {
                pause(
                    prompter,
                    &format!("About to enter step {}: {step}.", step.number()),
                )
                .map_err(BaselineError::Prompt)?;
            }
            match step {
                CalibrationStep::Clean => calibrator.clean()?,
                CalibrationStep::Prepare => calibrator.prepare(toolkit)?,
                CalibrationStep::Flat => calibrator.flat(toolkit)?,
                CalibrationStep::SpatialDistortion => calibrator.spatial_distortion(toolkit)?,
                CalibrationStep::WavelengthCal => calibrator.wavelength_solution(toolkit)?,
            }
            info!("Step {}: {step} - completed", step.number());
        }
        Ok(())
    })?;

    info!("Calibration reductions completed for {}", dir.display());
    Ok(())
}

struct Calibrator<'a> {
    config: &'a PypeConfig,
    names: &'a RuntimeFilenames,
    dir: PathBuf,
    xd: XdConfig,
    lists: CalibrationLists,
    /// The first reduced pinhole frame; the spatial distortion is measured on
    /// it.
    sdist_ref_image: String,
}

impl Calibrator<'_> {
    fn overwrite(&self) -> bool {
        self.config.overwrite
    }

    /// Step 1. Cleaning pattern noise isn't available; when it's requested,
    /// stale cleaned frames are still dealt with.
    fn clean(&self) -> Result<(), BaselineError> {
        let flags = &self.config.calibration.clean;
        let pattern = [format!("{}N*.fits", self.names.cleanir_prefix)];
        for (what, requested) in [
            ("QH flats", flags.qh_flats),
            ("IR flats", flags.ir_flats),
            ("arcs", flags.arcs),
            ("pinholes", flags.pinholes),
        ] {
            if !requested {
                warn!("{what} not cleaned");
                continue;
            }
            let outputs = prepare_outputs(&self.dir, &pattern, self.overwrite(), "cleaning")?;
            if outputs.should_run() {
                warn!("Cleaning of {what} was requested, but pattern-noise cleaning isn't available; using the raw frames");
            }
        }
        Ok(())
    }

    /// Step 2. Attach the MDF and variance/DQ planes to every frame, then cut
    /// the orders out into separate extensions.
    fn prepare(&self, toolkit: &mut dyn Toolkit) -> Result<(), BaselineError> {
        let first = self
            .lists
            .all
            .file_paths()
            .into_iter()
            .next()
            .ok_or_else(|| ManifestError::Empty {
                path: self.lists.all.path.clone(),
            })?;
        let array_id: String = fits_get_primary_key(&first, "ARRAYID")?
            .ok_or_else(|| BaselineError::NoArrayId(first.clone()))?;
        let bpm = bad_pixel_mask(&array_id)?;
        debug!("ARRAYID {array_id}; using bad-pixel mask {bpm}");

        let n = &self.names.prepared_prefix;
        let r = &self.names.reduced_prefix;
        let outputs = prepare_outputs(
            &self.dir,
            &[format!("{n}N*.fits"), format!("{r}{n}N*.fits")],
            self.overwrite(),
            "nsprepare and nsreduce for all calibration frames",
        )?;
        if !outputs.should_run() {
            return Ok(());
        }

        let lists = [QH_FLATS_LIST, IR_FLATS_LIST, ARCS_LIST, PINHOLES_LIST];
        let prepare = Task::new("nsprepare")
            .param(
                "inimages",
                lists.iter().map(|l| format!("@{l}")).collect::<Vec<_>>().join(","),
            )
            .param("rawpath", "")
            .param("outimages", "")
            .param("outprefix", n)
            .param("bpm", bpm)
            .param("fl_vardq", true)
            .param("fl_cravg", false)
            .param("crradius", 0.0)
            .param("fl_dark_mdf", false)
            .param("fl_correct", false)
            .param("fl_saturated", true)
            .param("fl_nonlinear", true)
            .param("fl_checkwcs", true)
            .param("fl_forcewcs", true)
            .param("arraytable", ARRAY_TABLE)
            .param("configtable", CONFIG_TABLE)
            .param("specsec", "[*,*]")
            .param("offsetsec", "none")
            .param("pixscale", "0.15")
            .param("shiftimage", "")
            .param("shiftx", TaskValue::Indef)
            .param("shifty", TaskValue::Indef)
            .param("obstype", "FLAT")
            .param("fl_inter", self.config.interactive.nsprepare_inter)
            .param("verbose", true);
        toolkit.run(&prepare)?;

        let reduce = Task::new("nsreduce")
            .param(
                "inimages",
                lists
                    .iter()
                    .map(|l| format!("{n}//@{l}"))
                    .collect::<Vec<_>>()
                    .join(","),
            )
            .param("outimages", "")
            .param("outprefix", r)
            .param("fl_cut", true)
            .param("section", "")
            .param("fl_corner", true)
            .param("fl_process_cut", true)
            .param("fl_nsappwave", false)
            .param("nsappwavedb", NSAPPWAVE_TABLE)
            .param("crval", TaskValue::Indef)
            .param("cdelt", TaskValue::Indef)
            .param("fl_dark", false)
            .param("fl_save_dark", false)
            .param("fl_sky", false)
            .param("fl_flat", false)
            .param("fl_vardq", true)
            .param("verbose", true);
        toolkit.run(&reduce)?;
        Ok(())
    }

    /// Step 3. Normalised QH and IR flats, then the master flat: order 3 from
    /// the IR flat and orders 4-18 from the QH flat.
    fn flat(&self, toolkit: &mut dyn Toolkit) -> Result<(), BaselineError> {
        let prefix = format!("{}{}", self.names.reduced_prefix, self.names.prepared_prefix);
        let flats = [
            (QH_FLATS_LIST, &self.names.qh_flat, &self.names.qh_flat_bpm, 4.0, 5, "median"),
            (IR_FLATS_LIST, &self.names.ir_flat, &self.names.ir_flat_bpm, 1.5, 10, "none"),
        ];
        for (list, flat, bpm, thr_fup, order, scale) in flats {
            let outputs = [self.dir.join(flat), self.dir.join(bpm)];
            if !self.overwrite() && outputs.iter().all(|f| f.exists()) {
                warn!("{flat} and {bpm} exist and overwrite is not set; using them for further reduction");
                continue;
            }
            for f in &outputs {
                if f.exists() {
                    warn!("Removing old {}", f.display());
                    remove(f)?;
                }
            }

            let task = Task::new("nsflat")
                .param("lampson", format!("{prefix}//@{list}"))
                .param("darks", "")
                .param("flatfile", flat)
                .param("darkfile", "")
                .param("fl_corner", true)
                .param("fl_save_darks", false)
                .param("bpmfile", bpm)
                .param("process", "fit")
                .param("statsec", "MDF")
                .param("fitsec", "MDF")
                .param("thr_flo", 0.35)
                .param("thr_fup", thr_fup)
                .param("thr_dlo", -20)
                .param("thr_dup", 100)
                .param("fl_inter", self.config.interactive.nsflat_inter)
                .param("fl_range", false)
                .param("fl_fixbad", true)
                .param("fixvalue", 1.0)
                .param("function", "spline3")
                .param("order", order)
                .param("normstat", "midpt")
                .param("rejtype", "ccdclip")
                .param("scale", scale)
                .param("zero", "none")
                .param("lthreshold", 50.0)
                .param("hthreshold", TaskValue::Indef)
                .param("box_width", 20)
                .param("box_length", 1)
                .param("traceproc", "none")
                .param("threshold", 100.0)
                .param("aptable", APERTURE_TABLE)
                .param("apsum", 10)
                .param("tr_step", 10)
                .param("tr_nlost", 3)
                .param("tr_function", "legendre")
                .param("tr_order", 5)
                .param("ap_lower", -30)
                .param("ap_upper", 30)
                .param("fl_vardq", true)
                .param("verbose", true);
            toolkit.run(&task)?;
        }

        let master = &self.names.master_flat;
        if prepare_output(&self.dir.join(master), self.overwrite(), "creating the master flat")?
            .should_run()
        {
            toolkit.run(
                &Task::new("fxcopy")
                    .param("input", &self.names.ir_flat)
                    .param("output", master)
                    .param("group", "0-3")
                    .param("new_file", true)
                    .param("verbose", false),
            )?;
            toolkit.run(
                &Task::new("fxinsert")
                    .param("input", &self.names.qh_flat)
                    .param("output", format!("{master}[3]"))
                    .param("groups", "4-18")
                    .param("verbose", false),
            )?;
        }
        Ok(())
    }

    /// Step 4. Trace the pinholes to get the spatial distortion, then make
    /// sure the right number of pinholes were found.
    fn spatial_distortion(&self, toolkit: &mut dyn Toolkit) -> Result<(), BaselineError> {
        let (coordlist, expected) = self.xd.camera().pinholes();
        let db = &self.names.database_dir;
        let id_pattern = format!(
            "{db}/id{}{}*",
            self.names.reduced_prefix, self.names.prepared_prefix
        );
        let outputs = prepare_outputs(
            &self.dir,
            &[&id_pattern],
            self.overwrite(),
            "the spatial distortion calculation and check for pinholes",
        )?;
        if !outputs.should_run() {
            return Ok(());
        }

        let task = Task::new("nssdist")
            .param("inimages", &self.sdist_ref_image)
            .param("outsuffix", "_sdist")
            .param("pixscale", 1.0)
            .param("dispaxis", 1)
            .param("database", db)
            .param("firstcoord", 0.0)
            .param("coordlist", coordlist)
            .param("aptable", APERTURE_TABLE)
            .param("fl_inter", self.config.interactive.nssdist_inter)
            .param("fl_dbwrite", true)
            .param("section", "default")
            .param("nsum", 30)
            .param("ftype", "emission")
            .param("fwidth", 10.0)
            .param("cradius", 10.0)
            .param("threshold", 1000.0)
            .param("minsep", 5.0)
            .param("match", -6.0)
            .param("function", "legendre")
            .param("order", 5)
            .param("niterate", 3)
            .param("low_reject", 5.0)
            .param("high_reject", 5.0)
            .param("refit", true)
            .param("step", 10)
            .param("trace", false)
            .param("nlost", 0)
            .param("verbose", false);
        toolkit.run(&task)?;

        info!("Checking that the right number of pinholes were identified");
        check_pinhole_counts(&self.dir, &id_pattern, expected)?;
        Ok(())
    }

    /// Step 5. Combine the arcs, rectify them, find the wavelength solution and
    /// make a wavelength-calibrated arc spectrum from all orders.
    fn wavelength_solution(&self, toolkit: &mut dyn Toolkit) -> Result<(), BaselineError> {
        let coordlist = arc_line_list(&self.dir)?;
        let n = self.names;
        let (f, t, w) = (
            &n.fitcoords_prefix,
            &n.transform_prefix,
            &n.wave_calib_prefix,
        );
        let db = &n.database_dir;
        let arc = &n.combined_arc;
        let stem = nofits(arc);
        let inter = &self.config.interactive;

        if prepare_output(&self.dir.join(arc), self.overwrite(), "combining arcs")?.should_run() {
            let combine = Task::new("nscombine")
                .param(
                    "inimages",
                    format!("{}{}//@{ARCS_LIST}", n.reduced_prefix, n.prepared_prefix),
                )
                .param("tolerance", 0.5)
                .param("output", arc)
                .param("output_suffix", "_comb")
                .param("bpm", "")
                .param("dispaxis", 1)
                .param("pixscale", 1.0)
                .param("fl_cross", false)
                .param("fl_keepshift", false)
                .param("fl_shiftint", true)
                .param("interptype", "linear")
                .param("boundary", "nearest")
                .param("combtype", "average")
                .param("rejtype", "sigclip")
                .param("masktype", "goodvalue")
                .param("maskvalue", 0.0)
                .param("scale", "none")
                .param("zero", "none")
                .param("weight", "none")
                .param("lsigma", 5.0)
                .param("hsigma", 5.0)
                .param("fl_vardq", true)
                .param("fl_inter", inter.nscombine_inter)
                .param("verbose", true);
            toolkit.run(&combine)?;
        }

        let outputs = prepare_outputs(
            &self.dir,
            &[
                format!("*{f}{stem}*"),
                format!("{db}/id{w}{t}{f}*"),
                format!("{db}/*_sdist"),
                format!("{db}/*_lamp"),
                "arcorders*".to_string(),
                "arc_calibrated*".to_string(),
            ],
            self.overwrite(),
            "wavelength calibration and spatial distortion correction of arcs",
        )?;
        if !outputs.should_run() {
            return Ok(());
        }

        let fitcoords = |input: String, lamp: String, sdist: &str| {
            Task::new("nsfitcoords")
                .param("inimages", input)
                .param("outspectra", "")
                .param("outprefix", f)
                .param("lamptransf", lamp)
                .param("sdisttransf", sdist)
                .param("dispaxis", 1)
                .param("database", db)
                .param("fl_inter", inter.nsfitcoords_inter)
                .param("fl_align", false)
                .param("function", "chebyshev")
                .param("lxorder", 2)
                .param("lyorder", 4)
                .param("sxorder", 4)
                .param("syorder", 4)
                .param("pixscale", 1.0)
                .param("verbose", true)
        };
        let transform = |input: String| {
            Task::new("nstransform")
                .param("inimages", input)
                .param("outspectra", "")
                .param("outprefix", t)
                .param("dispaxis", 1)
                .param("database", db)
                .param("fl_stripe", false)
                .param("interptype", "poly3")
                .param("xlog", false)
                .param("ylog", false)
                .param("pixscale", 1.0)
        };

        info!("Rectifying the combined arc with nsfitcoords and nstransform before nswavelength");
        toolkit.run(&fitcoords(arc.clone(), String::new(), &self.sdist_ref_image))?;
        toolkit.run(&transform(format!("{f}{arc}")))?;

        info!("Running nswavelength on the transformed arc");
        let wavelength = Task::new("nswavelength")
            .param("lampspectra", format!("{t}{f}{arc}"))
            .param("outspectra", "")
            .param("outprefix", w)
            .param("crval", TaskValue::Indef)
            .param("cdelt", TaskValue::Indef)
            .param("crpix", TaskValue::Indef)
            .param("dispaxis", 2)
            .param("database", db)
            .param("coordlist", coordlist)
            .param("fl_inter", inter.nswavelength_inter)
            .param("nsappwavedb", NSAPPWAVE_TABLE)
            .param("fl_median", false)
            .param("sdist", "")
            .param("sdorder", 4)
            .param("xorder", 2)
            .param("yorder", 2)
            .param("aptable", APERTURE_TABLE)
            .param("section", "auto")
            .param("nsum", 10)
            .param("ftype", "emission")
            .param("fwidth", 5.0)
            .param("cradius", 5.0)
            .param("threshold", 300.0)
            .param("minsep", 2.0)
            .param("match", -6.0)
            .param("function", "chebyshev")
            .param("order", 4)
            .param("sample", "*")
            .param("niterate", 10)
            .param("low_reject", 3.0)
            .param("high_reject", 3.0)
            .param("refit", true)
            .param("step", 2)
            .param("trace", false)
            .param("nlost", 10)
            .param("fl_overwrite", true)
            .param("fmatch", 0.2)
            .param("nfound", 6)
            .param("sigma", 0.05)
            .param("rms", 0.1)
            .param("verbose", true);
        toolkit.run(&wavelength)?;

        info!("Straightening the arc lines with the wavelength solution");
        toolkit.run(&fitcoords(
            format!("{t}{f}{arc}"),
            format!("{w}{t}{f}{arc}"),
            "",
        ))?;
        toolkit.run(&transform(format!("{f}{t}{f}{arc}")))?;

        info!("Creating a wavelength calibrated arc spectrum");
        let transformed = format!("{t}{f}{t}{f}{arc}");
        let mut order_files = vec![];
        for (i, column) in ARC_CHECK_COLUMNS.iter().take(self.xd.orders().len()).enumerate() {
            let ext = i + 1;
            let output = format!("{t}{f}{t}{f}{stem}_order{ext}.fits");
            toolkit.run(
                &Task::new("imcopy")
                    .param("input", format!("{transformed}[SCI,{ext}][{column},*]"))
                    .param("output", &output)
                    .param("verbose", true),
            )?;
            order_files.push(output);
        }
        Manifest::write(&self.dir.join(ARC_ORDERS_LIST), &order_files)?;
        let odcombine = Task::new("odcombine")
            .param("input", format!("@{ARC_ORDERS_LIST}//[SCI,1]"))
            .param("output", ARC_CALIBRATED)
            .param("apertures", "")
            .param("group", "all")
            .param("first", false)
            .param("w1", TaskValue::Indef)
            .param("w2", TaskValue::Indef)
            .param("dw", TaskValue::Indef)
            .param("nw", TaskValue::Indef)
            .param("log", false)
            .param("combine", "average")
            .param("reject", "none")
            .param("outtype", "real")
            .param("smaskformat", "bpmspectrum")
            .param("smasktype", "none")
            .param("blank", 0.0)
            .param("scale", "none")
            .param("zero", "none")
            .param("weight", "none")
            .param("offsets", "physical")
            .param("masktype", "none");
        toolkit.run(&odcombine)?;

        info!("Checking the first and last wavelengths of the wavelength solution");
        self.check_wavelengths(&self.dir.join(&transformed))
    }

    /// Compare each order's wavelength coverage with the nominal one.
    fn check_wavelengths(&self, transformed_arc: &Path) -> Result<(), BaselineError> {
        let pct = self.config.calibration.wavelength_accuracy_percent;
        let mut fptr = fits_open(transformed_arc)?;
        let hdus = fits_sci_hdus(&mut fptr)?;
        if hdus.len() != self.xd.orders().len() {
            warn!(
                "{} has {} SCI extensions, but {} orders were expected",
                transformed_arc.display(),
                hdus.len(),
                self.xd.orders().len()
            );
        }
        for (ext, (hdu, &order)) in hdus.iter().zip(self.xd.orders()).enumerate() {
            let ext = ext + 1;
            let start: f64 = fits_get_required_key(&mut fptr, hdu, "CRVAL2")?;
            let delta: f64 = fits_get_required_key(&mut fptr, hdu, "CDELT2")?;
            let end = start + ARC_LAST_PIXEL * delta;
            let Some(&nominal) = self.config.nominal_wavelengths.get(&order) else {
                warn!("No nominal wavelengths for order {order}; not checking extension {ext}");
                continue;
            };
            let check = WavelengthCheck::new(order, (start, end), nominal, pct);
            check.log(ext, pct);
        }
        Ok(())
    }
}

/// Compare the number of features in every spatial-distortion database file
/// with the expected number of pinholes. A mismatch is only a warning, but if
/// nothing was identified at all the distortion solution is useless.
pub(crate) fn check_pinhole_counts(
    dir: &Path,
    pattern: &str,
    expected: usize,
) -> Result<Vec<Option<usize>>, BaselineError> {
    let mut files = glob_in_dir(dir, pattern)?;
    files.sort();
    let mut counts = Vec::with_capacity(files.len());
    for (i, file) in files.iter().enumerate() {
        let text = fs::read_to_string(file).map_err(|err| BaselineError::Read {
            path: file.clone(),
            err,
        })?;
        let count = feature_count(&text);
        match count {
            Some(c) if c == expected => {
                info!("Right number of pinholes detected by nssdist in extension {i}")
            }
            Some(c) => {
                warn!("Expected {expected} pinholes to be detected by nssdist, but found {c} in extension {i}");
                warn!("This can cause inter-order offsets; check the transformed data files later");
            }
            None => warn!("{} has no 'features' line", file.display()),
        }
        counts.push(count);
    }
    if counts.iter().all(|c| c.unwrap_or(0) == 0) {
        return Err(BaselineError::NoPinholes(dir.to_path_buf()));
    }
    Ok(counts)
}

/// How an order's wavelength coverage compares with the nominal coverage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WavelengthCheck {
    pub(crate) order: Order,
    pub(crate) actual: (f64, f64),
    pub(crate) nominal: (f64, f64),
    /// The allowed deviation [Angstroms].
    pub(crate) tolerance: f64,
}

impl WavelengthCheck {
    pub(crate) fn new(
        order: Order,
        actual: (f64, f64),
        nominal: (f64, f64),
        accuracy_percent: f64,
    ) -> WavelengthCheck {
        WavelengthCheck {
            order,
            actual,
            nominal,
            tolerance: (nominal.1 - nominal.0) * accuracy_percent / 100.0,
        }
    }

    pub(crate) fn start_ok(&self) -> bool {
        (self.actual.0 - self.nominal.0).abs() <= self.tolerance
    }

    pub(crate) fn end_ok(&self) -> bool {
        (self.actual.1 - self.nominal.1).abs() <= self.tolerance
    }

    fn log(&self, ext: usize, pct: f64) {
        for (which, ok, actual, nominal) in [
            ("Starting", self.start_ok(), self.actual.0, self.nominal.0),
            ("Ending", self.end_ok(), self.actual.1, self.nominal.1),
        ] {
            let msg = format!(
                "{which} wavelength for extension {ext} (order {}): {actual:.1} vs. expected {nominal:.1} +/- {:.1}",
                self.order, self.tolerance
            );
            if ok {
                info!("{msg}");
            } else {
                warn!("{msg}; more than {pct}% away");
            }
        }
    }
}
