// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The header summary of raw GNIRS frames.

use std::path::Path;

use chrono::{Duration, NaiveDateTime};
use indexmap::IndexMap;
use log::{debug, trace};

use crate::io::{
    fits::{fits_get_optional_key, fits_get_required_key, fits_open, fits_open_hdu},
    glob_in_dir, FitsError, GlobError,
};

/// The parts of a raw frame's primary header that decide which frames belong
/// together.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderRecord {
    /// The file name (no directory).
    pub(crate) file: String,
    pub(crate) obstype: String,
    pub(crate) object: String,
    /// Exposure time of the sum of all coadds [seconds].
    pub(crate) exptime: f64,
    /// The instrument configuration: camera, grating, prism, decker and slit.
    pub(crate) config: String,
    /// "RA DEC" [degrees].
    pub(crate) coords: String,
    pub(crate) date_obs: String,
    pub(crate) gcal_lamp: Option<String>,
    pub(crate) slit: String,
    /// The middle of the exposure, if the date and time could be parsed.
    pub(crate) mid_exposure: Option<NaiveDateTime>,
}

impl HeaderRecord {
    pub(crate) fn read(file: &Path) -> Result<HeaderRecord, FitsError> {
        let mut fptr = fits_open(file)?;
        let hdu = fits_open_hdu(&mut fptr, 0)?;
        let mut get = |key: &str| -> Result<String, FitsError> {
            Ok(fits_get_optional_key::<String>(&mut fptr, &hdu, key)?
                .map(|s| s.trim().to_string())
                .unwrap_or_default())
        };

        let obstype = get("OBSTYPE")?;
        let object = get("OBJECT")?;
        let date_obs = get("DATE-OBS")?;
        let time_obs = get("TIME-OBS")?;
        let slit = get("SLIT")?;
        let config = ["CAMERA", "GRATING", "PRISM", "DECKER", "SLIT"]
            .into_iter()
            .map(&mut get)
            .collect::<Result<Vec<_>, _>>()?
            .join(" ");
        let ra = get("RA")?;
        let dec = get("DEC")?;
        let coords = format!("{ra} {dec}");
        let gcal_lamp = Some(get("GCALLAMP")?).filter(|s| !s.is_empty());
        let exptime: f64 = fits_get_required_key(&mut fptr, &hdu, "EXPTIME")?;

        let mid_exposure = mid_exposure(&date_obs, &time_obs, exptime);
        let record = HeaderRecord {
            file: file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_default(),
            obstype,
            object,
            exptime,
            config,
            coords,
            date_obs,
            gcal_lamp,
            slit,
            mid_exposure,
        };
        trace!("{record:?}");
        Ok(record)
    }
}

/// The middle of an exposure that started at `date` `time`.
pub(crate) fn mid_exposure(date: &str, time: &str, exptime: f64) -> Option<NaiveDateTime> {
    let start = NaiveDateTime::parse_from_str(&format!("{date}T{time}"), "%Y-%m-%dT%H:%M:%S%.f")
        .ok()?;
    let half = Duration::milliseconds((exptime * 500.0).round() as i64);
    Some(start + half)
}

/// Read the headers of every raw (`N*.fits`) frame in a directory, keyed by
/// file name, in name order.
pub(crate) fn read_directory_headers(
    dir: &Path,
) -> Result<IndexMap<String, HeaderRecord>, HeaderError> {
    let mut files = glob_in_dir(dir, "N*.fits")?;
    files.sort();
    debug!("Reading headers of {} files in {}", files.len(), dir.display());
    let mut records = IndexMap::with_capacity(files.len());
    for file in files {
        let record = HeaderRecord::read(&file)?;
        records.insert(record.file.clone(), record);
    }
    Ok(records)
}

#[derive(thiserror::Error, Debug)]
pub enum HeaderError {
    #[error(transparent)]
    Glob(#[from] GlobError),

    #[error(transparent)]
    Fits(#[from] FitsError),
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;

    use chrono::{NaiveDate, Timelike};
    use fitsio::FitsFile;
    use tempfile::tempdir;

    use super::*;

    /// Headers for a synthetic raw frame.
    #[derive(Clone)]
    pub(crate) struct FakeFrame<'a> {
        pub(crate) obstype: &'a str,
        pub(crate) object: &'a str,
        pub(crate) exptime: f64,
        pub(crate) date: &'a str,
        pub(crate) time: &'a str,
        pub(crate) gcal_lamp: &'a str,
        pub(crate) slit: &'a str,
        pub(crate) ra: f64,
    }

    impl Default for FakeFrame<'_> {
        fn default() -> Self {
            Self {
                obstype: "OBJECT",
                object: "HD 1234",
                exptime: 30.0,
                date: "2012-01-01",
                time: "10:00:00.0",
                gcal_lamp: "",
                slit: "0.30arcsec",
                ra: 150.0,
            }
        }
    }

    /// Write a primary-only FITS file with the frame's headers.
    pub(crate) fn write_fake_frame(dir: &Path, name: &str, frame: &FakeFrame) -> PathBuf {
        let path = dir.join(name);
        let mut fptr = FitsFile::create(&path).open().unwrap();
        let hdu = fptr.hdu(0).unwrap();
        hdu.write_key(&mut fptr, "OBSTYPE", frame.obstype).unwrap();
        hdu.write_key(&mut fptr, "OBJECT", frame.object).unwrap();
        hdu.write_key(&mut fptr, "EXPTIME", frame.exptime).unwrap();
        hdu.write_key(&mut fptr, "DATE-OBS", frame.date).unwrap();
        hdu.write_key(&mut fptr, "TIME-OBS", frame.time).unwrap();
        hdu.write_key(&mut fptr, "CAMERA", "LongBlue_G5542").unwrap();
        hdu.write_key(&mut fptr, "GRATING", "32/mm_G5533").unwrap();
        hdu.write_key(&mut fptr, "PRISM", "SXD_G5536").unwrap();
        hdu.write_key(&mut fptr, "DECKER", "SCXD_G5531").unwrap();
        hdu.write_key(&mut fptr, "SLIT", frame.slit).unwrap();
        hdu.write_key(&mut fptr, "RA", frame.ra).unwrap();
        hdu.write_key(&mut fptr, "DEC", 20.0).unwrap();
        if !frame.gcal_lamp.is_empty() {
            hdu.write_key(&mut fptr, "GCALLAMP", frame.gcal_lamp).unwrap();
        }
        path
    }

    #[test]
    fn read_a_raw_frame() {
        let dir = tempdir().unwrap();
        let path = write_fake_frame(dir.path(), "N20120101S0001.fits", &FakeFrame::default());

        let record = HeaderRecord::read(&path).unwrap();
        assert_eq!(record.file, "N20120101S0001.fits");
        assert_eq!(record.obstype, "OBJECT");
        assert_eq!(
            record.config,
            "LongBlue_G5542 32/mm_G5533 SXD_G5536 SCXD_G5531 0.30arcsec"
        );
        assert!(record.gcal_lamp.is_none());
        let mid = record.mid_exposure.unwrap();
        assert_eq!(mid.date(), NaiveDate::from_ymd_opt(2012, 1, 1).unwrap());
        assert_eq!(mid.second(), 15);
    }

    #[test]
    fn directory_headers_ignore_reduced_frames() {
        let dir = tempdir().unwrap();
        write_fake_frame(dir.path(), "N20120101S0002.fits", &FakeFrame::default());
        write_fake_frame(dir.path(), "N20120101S0001.fits", &FakeFrame::default());
        write_fake_frame(dir.path(), "rnN20120101S0001.fits", &FakeFrame::default());

        let records = read_directory_headers(dir.path()).unwrap();
        assert_eq!(
            records.keys().collect::<Vec<_>>(),
            vec!["N20120101S0001.fits", "N20120101S0002.fits"]
        );
    }

    #[test]
    fn unparsable_times_have_no_mid_exposure() {
        assert!(mid_exposure("2012-01-01", "garbage", 10.0).is_none());
        let mid = mid_exposure("2012-01-01", "23:59:59", 4.0).unwrap();
        assert_eq!(mid.date(), NaiveDate::from_ymd_opt(2012, 1, 2).unwrap());
    }
}
