// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helper functions for reading and writing FITS files.
//!
//! Gemini multi-extension files keep their data in `SCI` extensions (one per
//! spectral order once the orders are cut out), interleaved with `VAR` and
//! `DQ` extensions. Keys are always read as strings and parsed on our side.

mod error;

pub(crate) use error::FitsError;

use std::{fmt::Display, path::Path};

use fitsio::{
    hdu::{DescribesHdu, FitsHdu, HduInfo},
    headers::WritesKey,
    images::{ImageDescription, ImageType, ReadImage, WriteImage},
    FitsFile,
};

/// Open a fits file.
#[track_caller]
pub(crate) fn fits_open<P: AsRef<Path>>(file: P) -> Result<FitsFile, FitsError> {
    FitsFile::open(file.as_ref()).map_err(|e| {
        let caller = std::panic::Location::caller();
        FitsError::Open {
            fits_error: Box::new(e),
            fits_filename: file.as_ref().to_path_buf().into_boxed_path(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })
}

/// Open a fits file for editing.
#[track_caller]
pub(crate) fn fits_edit<P: AsRef<Path>>(file: P) -> Result<FitsFile, FitsError> {
    FitsFile::edit(file.as_ref()).map_err(|e| {
        let caller = std::panic::Location::caller();
        FitsError::Open {
            fits_error: Box::new(e),
            fits_filename: file.as_ref().to_path_buf().into_boxed_path(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })
}

/// Create a new fits file whose primary HDU is a 1D double-precision image of
/// the given length.
#[track_caller]
pub(crate) fn fits_create_1d<P: AsRef<Path>>(file: P, len: usize) -> Result<FitsFile, FitsError> {
    let description = ImageDescription {
        data_type: ImageType::Double,
        dimensions: &[len],
    };
    FitsFile::create(file.as_ref())
        .with_custom_primary(&description)
        .open()
        .map_err(|e| {
            let caller = std::panic::Location::caller();
            FitsError::Create {
                fits_error: Box::new(e),
                fits_filename: file.as_ref().to_path_buf().into_boxed_path(),
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            }
        })
}

/// Open a fits file's HDU.
#[track_caller]
pub(crate) fn fits_open_hdu<T: DescribesHdu + Display + Copy>(
    fits_fptr: &mut FitsFile,
    hdu_description: T,
) -> Result<FitsHdu, FitsError> {
    fits_fptr.hdu(hdu_description).map_err(|e| {
        let caller = std::panic::Location::caller();
        FitsError::Fitsio {
            fits_error: Box::new(e),
            fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
            hdu_description: format!("{hdu_description}").into_boxed_str(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })
}

/// Get all of the `SCI` HDUs of a multi-extension file, in file order.
#[track_caller]
pub(crate) fn fits_sci_hdus(fits_fptr: &mut FitsFile) -> Result<Vec<FitsHdu>, FitsError> {
    let num_hdus = fits_fptr.num_hdus().map_err(|e| {
        let caller = std::panic::Location::caller();
        FitsError::Fitsio {
            fits_error: Box::new(e),
            fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
            hdu_description: "all".into(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })?;

    let mut sci_hdus = vec![];
    for i_hdu in 1..num_hdus {
        let hdu = fits_open_hdu(fits_fptr, i_hdu)?;
        let extname: Option<String> = fits_get_optional_key(fits_fptr, &hdu, "EXTNAME")?;
        if extname.as_deref().map(str::trim) == Some("SCI") {
            sci_hdus.push(hdu);
        }
    }
    Ok(sci_hdus)
}

/// Given a FITS file pointer, a HDU that belongs to it, and a keyword that may
/// or may not exist, pull out the value of the keyword, parsing it into the
/// desired type.
#[track_caller]
pub(crate) fn fits_get_optional_key<T: std::str::FromStr>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    keyword: &str,
) -> Result<Option<T>, FitsError> {
    let unparsed_value: String = match hdu.read_key(fits_fptr, keyword) {
        Ok(key_value) => key_value,
        Err(fitsio::errors::Error::Fits(fe)) if matches!(fe.status, 202 | 204) => return Ok(None),
        Err(e) => {
            let caller = std::panic::Location::caller();
            return Err(FitsError::Fitsio {
                fits_error: Box::new(e),
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_description: format!("{}", hdu.number + 1).into_boxed_str(),
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            });
        }
    };

    match unparsed_value.trim().parse() {
        Ok(parsed_value) => Ok(Some(parsed_value)),
        Err(_) => {
            let caller = std::panic::Location::caller();
            Err(FitsError::Parse {
                key: keyword.to_string().into_boxed_str(),
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
    }
}

/// Given a FITS file pointer, a HDU that belongs to it, and a keyword, pull out
/// the value of the keyword, parsing it into the desired type.
#[track_caller]
pub(crate) fn fits_get_required_key<T: std::str::FromStr>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    keyword: &str,
) -> Result<T, FitsError> {
    match fits_get_optional_key(fits_fptr, hdu, keyword) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => {
            let caller = std::panic::Location::caller();
            Err(FitsError::MissingKey {
                key: keyword.to_string().into_boxed_str(),
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
        Err(error) => Err(error),
    }
}

/// Read a keyword from the primary HDU of a file.
#[track_caller]
pub(crate) fn fits_get_primary_key<T: std::str::FromStr, P: AsRef<Path>>(
    file: P,
    keyword: &str,
) -> Result<Option<T>, FitsError> {
    let mut fptr = fits_open(file)?;
    let hdu = fits_open_hdu(&mut fptr, 0)?;
    fits_get_optional_key(&mut fptr, &hdu, keyword)
}

/// Given a FITS file pointer and a HDU, read the associated image.
#[track_caller]
pub(crate) fn fits_get_image<T: ReadImage>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
) -> Result<T, FitsError> {
    match &hdu.info {
        HduInfo::ImageInfo { .. } => hdu.read_image(fits_fptr).map_err(|e| {
            let caller = std::panic::Location::caller();
            FitsError::Fitsio {
                fits_error: Box::new(e),
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_description: format!("{}", hdu.number + 1).into_boxed_str(),
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            }
        }),
        _ => {
            let caller = std::panic::Location::caller();
            Err(FitsError::NotImage {
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
    }
}

/// Write a keyword into a HDU, replacing any existing value.
#[track_caller]
pub(crate) fn fits_write_key<T: WritesKey>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    keyword: &str,
    value: T,
) -> Result<(), FitsError> {
    hdu.write_key(fits_fptr, keyword, value).map_err(|e| {
        let caller = std::panic::Location::caller();
        FitsError::Fitsio {
            fits_error: Box::new(e),
            fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
            hdu_description: format!("{}", hdu.number + 1).into_boxed_str(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })
}

/// Write data into an image HDU.
#[track_caller]
pub(crate) fn fits_write_image<T: WriteImage>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    data: &[T],
) -> Result<(), FitsError> {
    hdu.write_image(fits_fptr, data).map_err(|e| {
        let caller = std::panic::Location::caller();
        FitsError::Fitsio {
            fits_error: Box::new(e),
            fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
            hdu_description: format!("{}", hdu.number + 1).into_boxed_str(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })
}

/// The linear wavelength solution of a 1D spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LinearWcs {
    /// The reference pixel (1-indexed).
    pub(crate) crpix: f64,
    /// The wavelength at the reference pixel.
    pub(crate) crval: f64,
    /// The wavelength step per pixel.
    pub(crate) delta: f64,
    /// The number of pixels.
    pub(crate) naxis: usize,
}

impl LinearWcs {
    /// The wavelength of the first pixel.
    pub(crate) fn start(&self) -> f64 {
        self.crval - (self.crpix - 1.0) * self.delta
    }

    /// The wavelength just past the last pixel.
    pub(crate) fn end(&self) -> f64 {
        self.start() + self.naxis as f64 * self.delta
    }

    /// The wavelength of every pixel.
    pub(crate) fn wavelengths(&self) -> Vec<f64> {
        let start = self.start();
        (0..self.naxis)
            .map(|i| start + i as f64 * self.delta)
            .collect()
    }
}

/// Read the linear wavelength solution of a 1D spectrum's HDU. `CD1_1` is
/// preferred, `CDELT1` is the fallback.
#[track_caller]
pub(crate) fn fits_get_linear_wcs(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
) -> Result<LinearWcs, FitsError> {
    let crpix = fits_get_required_key(fits_fptr, hdu, "CRPIX1")?;
    let crval = fits_get_required_key(fits_fptr, hdu, "CRVAL1")?;
    let delta = match fits_get_optional_key(fits_fptr, hdu, "CD1_1")? {
        Some(d) => d,
        None => fits_get_required_key(fits_fptr, hdu, "CDELT1")?,
    };
    let naxis = fits_get_required_key(fits_fptr, hdu, "NAXIS1")?;
    Ok(LinearWcs {
        crpix,
        crval,
        delta,
        naxis,
    })
}

/// Write a 1D spectrum with a linear wavelength solution into a new file.
pub(crate) fn write_spectrum_fits(
    file: &Path,
    wcs: &LinearWcs,
    data: &[f64],
) -> Result<(), FitsError> {
    let mut fptr = fits_create_1d(file, data.len())?;
    let hdu = fits_open_hdu(&mut fptr, 0)?;
    fits_write_image(&mut fptr, &hdu, data)?;
    fits_write_key(&mut fptr, &hdu, "CRPIX1", wcs.crpix)?;
    fits_write_key(&mut fptr, &hdu, "CRVAL1", wcs.crval)?;
    fits_write_key(&mut fptr, &hdu, "CD1_1", wcs.delta)?;
    fits_write_key(&mut fptr, &hdu, "CDELT1", wcs.delta)?;
    Ok(())
}

/// Read a 1D spectrum (data and wavelength solution) from a HDU of a file.
pub(crate) fn read_spectrum_fits<T: DescribesHdu + Display + Copy>(
    file: &Path,
    hdu_description: T,
) -> Result<(LinearWcs, Vec<f64>), FitsError> {
    let mut fptr = fits_open(file)?;
    let hdu = fits_open_hdu(&mut fptr, hdu_description)?;
    let wcs = fits_get_linear_wcs(&mut fptr, &hdu)?;
    let data: Vec<f64> = fits_get_image(&mut fptr, &hdu)?;
    Ok((wcs, data))
}
