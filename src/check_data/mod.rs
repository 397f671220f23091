// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Checking that every observation has consistent frame lists and the
//! calibrations and telluric standard it needs.

mod error;
#[cfg(test)]
mod tests;

pub use error::CheckDataError;

use std::path::{Path, PathBuf};

use chrono::Duration;
use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, error, info, warn};
use strum_macros::Display;

use crate::{
    config::PypeConfig,
    constants::{
        ALL_LIST, ARCS_LIST, INTERMEDIATE_DIR, IR_FLATS_LIST, PINHOLES_LIST, QH_FLATS_LIST,
        SKY_LIST, SRC_LIST, TELLURIC_MAX_HOURS,
    },
    headers::{read_directory_headers, HeaderRecord},
    io::{manifest::with_fits, Manifest, ManifestError},
};

/// A header value that should be the same for every frame of a list.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    #[strum(serialize = "configurations")]
    Config,
    #[strum(serialize = "coordinates")]
    Coords,
    #[strum(serialize = "target names")]
    Object,
    #[strum(serialize = "observation types")]
    ObsType,
}

/// What was found wrong with a list. Nothing here stops the pipeline.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ListCheck {
    /// Listed files without a header record.
    pub missing: Vec<String>,
    /// Fields that differ between listed files.
    pub inconsistent: Vec<Field>,
    /// The list has fewer files than its observation type needs.
    pub too_few: bool,
    /// When exposure times differed, the list was pruned to this one.
    pub pruned_to: Option<f64>,
}

/// The minimum number of frames needed for an observation type.
fn min_files(obstype: &str) -> usize {
    match obstype {
        "OBJECT" => 2,
        _ => 1,
    }
}

/// Find the most common exposure time and how often it occurs. It's an error
/// if more than one exposure time occurs that often.
pub fn most_common_exptime(list: &Path, exptimes: &[f64]) -> Result<(f64, usize), CheckDataError> {
    let mut counts: Vec<(f64, usize)> = vec![];
    for &e in exptimes {
        match counts.iter_mut().find(|(v, _)| *v == e) {
            Some((_, n)) => *n += 1,
            None => counts.push((e, 1)),
        }
    }
    let max = counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
    let mut modes = counts.iter().filter(|(_, n)| *n == max);
    match (modes.next(), modes.next()) {
        (Some(&mode), None) => Ok(mode),
        _ => Err(CheckDataError::AmbiguousExposureTime {
            list: list.to_path_buf(),
            exptimes: exptimes.iter().join(", "),
        }),
    }
}

/// Check a list of frames against their headers: every file must be known,
/// and configuration, coordinates, target and observation type must agree.
/// If exposure times differ, the list is rewritten to keep only the most
/// common one (the original is kept as `<list>.bak`).
///
/// A missing list is logged and yields `None`.
pub fn check_list(
    dir: &Path,
    list_name: &str,
    headers: &IndexMap<String, HeaderRecord>,
) -> Result<Option<ListCheck>, CheckDataError> {
    debug!("Checking {}/{list_name}", dir.display());
    let mut manifest = match Manifest::read_allow_empty(&dir.join(list_name)) {
        Ok(m) => m,
        Err(ManifestError::Missing { path }) => {
            error!("Could not find {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    info!("Found {}", manifest.path.display());

    let mut check = ListCheck::default();
    let mut records = vec![];
    for f in &manifest.files {
        match headers.get(&with_fits(f)) {
            Some(r) => records.push(r),
            None => {
                error!("{f} is in {list_name} but can not be found");
                check.missing.push(f.clone());
            }
        }
    }

    let min = records
        .last()
        .map(|r| min_files(&r.obstype))
        .unwrap_or(1);
    if manifest.files.len() < min {
        error!("{list_name} only has {} files", manifest.files.len());
        check.too_few = true;
    }

    let fields: [(Field, fn(&HeaderRecord) -> &str); 4] = [
        (Field::Config, |r| r.config.as_str()),
        (Field::Coords, |r| r.coords.as_str()),
        (Field::Object, |r| r.object.as_str()),
        (Field::ObsType, |r| r.obstype.as_str()),
    ];
    for (field, get) in fields {
        let values = records.iter().map(|r| get(r)).collect::<Vec<_>>();
        if values.iter().all_equal() {
            debug!("{list_name}: {field} match");
        } else {
            error!("{list_name}: multiple {field}: {values:?}");
            check.inconsistent.push(field);
        }
    }

    let exptimes = records.iter().map(|r| r.exptime).collect::<Vec<_>>();
    if !exptimes.iter().all_equal() {
        warn!("{list_name}: multiple exposure times: {exptimes:?}");
        let (mode, num) = most_common_exptime(&manifest.path, &exptimes)?;
        info!("The most common exposure time is {mode:.2} sec");
        let kept = manifest
            .files
            .iter()
            .filter(|f| {
                headers
                    .get(&with_fits(f))
                    .map(|r| r.exptime == mode)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        warn!("Updating {list_name} to only include files with EXPTIME = {mode}");
        manifest.rewrite_with_backup(kept)?;
        check.pruned_to = Some(mode);
        if num < min {
            error!("{list_name} only has {num} files");
            check.too_few = true;
        }
    }

    Ok(Some(check))
}

/// The calibration frames that decide whether a calibration directory goes
/// with an observation: the first arc, IR flat and QH flat.
fn calibration_matches(sci: &HeaderRecord, cal: &IndexMap<String, HeaderRecord>) -> bool {
    let first = |pred: &dyn Fn(&HeaderRecord) -> bool| cal.values().find(|r| pred(r));
    let arc = first(&|r| r.obstype == "ARC");
    let ir_flat = first(&|r| r.obstype == "FLAT" && r.gcal_lamp.as_deref() == Some("IRhigh"));
    let qh_flat = first(&|r| {
        r.obstype == "FLAT" && r.gcal_lamp.as_deref() == Some("QH") && !r.slit.contains("Pinholes")
    });

    [("arcs", arc), ("IRflats", ir_flat), ("QHflats", qh_flat)]
        .into_iter()
        .all(|(name, r)| match r {
            Some(r) => {
                let m = r.date_obs == sci.date_obs && r.config == sci.config && r.coords == sci.coords;
                debug!("{name}: {} {}", r.file, if m { "matches" } else { "doesn't match" });
                m
            }
            None => {
                debug!("No {name} found");
                false
            }
        })
}

/// Find the first calibration directory matching the science frame.
pub fn find_calibrations<'a>(
    sci: &HeaderRecord,
    cal_dirs: impl IntoIterator<Item = &'a Path>,
) -> Result<Option<(PathBuf, IndexMap<String, HeaderRecord>)>, CheckDataError> {
    for cdir in cal_dirs {
        debug!("...{}", cdir.display());
        let cal_info = read_directory_headers(cdir)?;
        if calibration_matches(sci, &cal_info) {
            info!("Calibration directory {} matches", cdir.display());
            return Ok(Some((cdir.to_path_buf(), cal_info)));
        }
    }
    Ok(None)
}

/// Find the telluric directory taken on the same night in the same
/// configuration closest in time to the science frame. Returns the
/// directory (its `Intermediate` subdirectory) and the time between them.
pub fn find_telluric<'a>(
    sci: &HeaderRecord,
    tel_dirs: impl IntoIterator<Item = &'a Path>,
) -> Result<Option<(PathBuf, Duration)>, CheckDataError> {
    let mut best: Option<(PathBuf, Duration)> = None;
    for tdir in tel_dirs {
        let tdir = tdir.join(INTERMEDIATE_DIR);
        debug!("...{}", tdir.display());
        let tel_info = read_directory_headers(&tdir)?;
        let Some(tel) = tel_info.values().next() else {
            warn!("No raw frames in {}", tdir.display());
            continue;
        };
        if tel.config != sci.config || tel.date_obs != sci.date_obs {
            continue;
        }
        let dt = match (tel.mid_exposure, sci.mid_exposure) {
            (Some(t), Some(s)) if t >= s => t - s,
            (Some(t), Some(s)) => s - t,
            _ => {
                warn!("Can't work out when {} was taken; ignoring it", tel.file);
                continue;
            }
        };
        debug!("This telluric directory matches; dt = {dt}");
        if best.as_ref().map(|(_, b)| dt < *b).unwrap_or(true) {
            best = Some((tdir, dt));
        }
    }
    Ok(best)
}

/// Check every enabled science directory.
pub fn run(config: &PypeConfig) -> Result<(), CheckDataError> {
    info!("Checking that each observation has the required calibrations");
    if config.science_directories.is_empty() {
        error!("No science directories are listed");
    }
    if config.calibration_directories.is_empty() {
        error!("No calibration directories are listed");
    }
    if config.telluric_directories.is_empty() {
        error!("No telluric directories are listed");
    }

    for sdir in config.enabled_science_directories() {
        info!("Checking science directory {}...", sdir.display());
        let sdir = sdir.join(INTERMEDIATE_DIR);
        let sci_info = read_directory_headers(&sdir)?;
        check_list(&sdir, ALL_LIST, &sci_info)?;
        check_list(&sdir, SRC_LIST, &sci_info)?;
        if sdir.join(SKY_LIST).exists() {
            check_list(&sdir, SKY_LIST, &sci_info)?;
        }
        let sci = sci_info
            .values()
            .next()
            .ok_or_else(|| CheckDataError::NoFrames(sdir.clone()))?;

        info!("Searching for matching calibrations...");
        let (cdir, cal_info) = find_calibrations(sci, config.enabled_calibration_directories())?
            .ok_or_else(|| CheckDataError::NoMatchingCalibrations(sdir.clone()))?;
        for list in [ARCS_LIST, IR_FLATS_LIST, QH_FLATS_LIST, PINHOLES_LIST] {
            check_list(&cdir, list, &cal_info)?;
        }

        info!("Searching for matching telluric standards...");
        let (tdir, dt) = find_telluric(sci, config.enabled_telluric_directories())?
            .ok_or_else(|| CheckDataError::NoMatchingTelluric(sdir.clone()))?;
        info!("The best telluric is {}", tdir.display());
        if dt > Duration::milliseconds((TELLURIC_MAX_HOURS * 3_600_000.0) as i64) {
            warn!("Telluric was taken {dt} from the science");
        }
        let tel_info = read_directory_headers(&tdir)?;
        check_list(&tdir, ALL_LIST, &tel_info)?;
        check_list(&tdir, SRC_LIST, &tel_info)?;
    }

    Ok(())
}
