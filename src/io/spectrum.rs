// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Plain-text spectra: two whitespace-separated columns (wavelength, flux).
//! Lines starting with `#` are comments.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TextSpectrum {
    pub(crate) wavelengths: Vec<f64>,
    pub(crate) fluxes: Vec<f64>,
}

impl TextSpectrum {
    pub(crate) fn read(path: &Path) -> Result<TextSpectrum, SpectrumError> {
        let fh = File::open(path).map_err(|err| SpectrumError::Io {
            path: path.to_path_buf(),
            err,
        })?;
        let mut spectrum = TextSpectrum::default();
        for (i_line, line) in BufReader::new(fh).lines().enumerate() {
            let line = line.map_err(|err| SpectrumError::Io {
                path: path.to_path_buf(),
                err,
            })?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut cols = line.split_whitespace().map(|c| c.parse::<f64>());
            match (cols.next(), cols.next()) {
                (Some(Ok(w)), Some(Ok(f))) => {
                    spectrum.wavelengths.push(w);
                    spectrum.fluxes.push(f);
                }
                _ => {
                    return Err(SpectrumError::BadLine {
                        path: path.to_path_buf(),
                        line_num: i_line + 1,
                    })
                }
            }
        }
        Ok(spectrum)
    }

    pub(crate) fn write(&self, path: &Path) -> Result<(), SpectrumError> {
        let io_err = |err| SpectrumError::Io {
            path: path.to_path_buf(),
            err,
        };
        let mut fh = BufWriter::new(File::create(path).map_err(io_err)?);
        for (w, f) in self.wavelengths.iter().zip(self.fluxes.iter()) {
            writeln!(fh, "{w:.4} {f:e}").map_err(io_err)?;
        }
        fh.flush().map_err(io_err)
    }

    pub(crate) fn len(&self) -> usize {
        self.wavelengths.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    /// The part of the spectrum in the pixel range `[start, end)`, clamped to
    /// the spectrum's length.
    pub(crate) fn region(&self, start: usize, end: usize) -> TextSpectrum {
        let end = end.min(self.len());
        let start = start.min(end);
        TextSpectrum {
            wavelengths: self.wavelengths[start..end].to_vec(),
            fluxes: self.fluxes[start..end].to_vec(),
        }
    }

    pub(crate) fn max_flux(&self) -> Option<f64> {
        self.fluxes.iter().copied().reduce(f64::max)
    }

    pub(crate) fn min_flux(&self) -> Option<f64> {
        self.fluxes.iter().copied().reduce(f64::min)
    }

    /// Multiply every flux by a constant.
    pub(crate) fn scale(&mut self, factor: f64) {
        self.fluxes.iter_mut().for_each(|f| *f *= factor);
    }

    /// Join pieces of spectra into one, sorted by wavelength.
    pub(crate) fn combine(pieces: &[TextSpectrum]) -> TextSpectrum {
        let mut pairs: Vec<(f64, f64)> = pieces
            .iter()
            .flat_map(|p| p.wavelengths.iter().copied().zip(p.fluxes.iter().copied()))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (wavelengths, fluxes) = pairs.into_iter().unzip();
        TextSpectrum {
            wavelengths,
            fluxes,
        }
    }
}

#[derive(Error, Debug)]
pub enum SpectrumError {
    #[error("Couldn't parse line {line_num} of {path} as 'wavelength flux'")]
    BadLine { path: PathBuf, line_num: usize },

    #[error("IO error on spectrum {path}: {err}")]
    Io { path: PathBuf, err: std::io::Error },
}
