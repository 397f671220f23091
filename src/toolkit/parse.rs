// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parsing the text artifacts written by toolkit tasks.
//!
//! All of these are lenient: a line that doesn't look the way we expect is
//! skipped, and a value that can't be found comes back as `None`.

use std::{fs, io, path::Path};

/// The aperture center recorded in an aperture database file: the first value
/// after the first line starting with `center`. `None` if there's no such
/// line or the value isn't a number.
pub fn aperture_center(text: &str) -> Option<f64> {
    text.lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>())
        .find(|tokens| tokens.first() == Some(&"center"))
        .and_then(|tokens| tokens.get(1).and_then(|v| v.parse().ok()))
}

/// Read an aperture database file and get its center. A missing file is
/// `Ok(None)`.
pub fn read_aperture_center(path: &Path) -> io::Result<Option<f64>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(aperture_center(&text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// The raw (textual) center value of an aperture file, exactly as written.
fn aperture_center_token(text: &str) -> Option<&str> {
    text.lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>())
        .find(|tokens| tokens.first() == Some(&"center"))
        .and_then(|tokens| tokens.get(1).copied())
}

/// Rewrite an aperture database file so that it describes `new_image` with
/// its center at `new_center`. Every occurrence of the old center token is
/// replaced, as are occurrences of the old image name. Lines are otherwise
/// left alone.
pub fn rewrite_aperture(text: &str, old_image: &str, new_image: &str, new_center: f64) -> String {
    let old_center = aperture_center_token(text).map(|s| s.to_string());
    let new_center = format!("{new_center:.4}");
    let mut out = String::with_capacity(text.len() + 16);
    for line in text.lines() {
        let line = match &old_center {
            Some(old) if line.split_whitespace().any(|t| t == old) => {
                let indent = &line[..line.len() - line.trim_start().len()];
                let tokens = line
                    .split_whitespace()
                    .map(|t| if t == old { new_center.as_str() } else { t })
                    .collect::<Vec<_>>();
                format!("{indent}{}", tokens.join("\t"))
            }
            _ => line.to_string(),
        };
        out.push_str(&line.replace(old_image, new_image));
        out.push('\n');
    }
    out
}

/// The number of features identified in a spatial-distortion database
/// (`idrn*`) file: the value on the first `features N` line.
pub fn feature_count(text: &str) -> Option<usize> {
    text.lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>())
        .find(|tokens| tokens.first() == Some(&"features"))
        .and_then(|tokens| tokens.get(1).and_then(|v| v.parse().ok()))
}

/// A 1D Gaussian fit recorded in an `imexam` log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianFit {
    pub center: f64,
    pub peak: f64,
    pub fwhm: f64,
}

/// Get the first Gaussian fit from an `imexam` log. Comment lines (with a
/// `#`) are skipped; `=` separators are treated as whitespace. The fit line
/// starts with `Lines` and has the center, peak and FWHM as its fourth,
/// sixth and tenth values.
pub fn imexam_fit(text: &str) -> Option<GaussianFit> {
    for line in text.lines() {
        if line.contains('#') {
            continue;
        }
        let line = line.replace('=', " ");
        let vals = line.split_whitespace().collect::<Vec<_>>();
        if vals.first() != Some(&"Lines") {
            continue;
        }
        let get = |i: usize| vals.get(i).and_then(|v| v.parse::<f64>().ok());
        return match (get(3), get(5), get(9)) {
            (Some(center), Some(peak), Some(fwhm)) => Some(GaussianFit { center, peak, fwhm }),
            _ => None,
        };
    }
    None
}

/// Get the signal-to-noise ratio printed by `bplot`: the last value of the
/// last line mentioning `snr`.
pub fn bplot_snr<S: AsRef<str>>(lines: &[S]) -> Option<f64> {
    lines
        .iter()
        .map(|l| l.as_ref())
        .filter(|l| l.contains("snr"))
        .filter_map(|l| l.split_whitespace().last().and_then(|v| v.parse().ok()))
        .last()
}
