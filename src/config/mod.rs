// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pipeline configuration.
//!
//! The configuration file is read into [`ConfigFile`], a loosely-typed mirror
//! of the file's sections (case-sensitive keys, every key optional). Command-
//! line overrides are applied to the [`ConfigFile`], and then it is validated
//! once into a [`PypeConfig`], which is what every stage reads. A
//! [`ConfigFile`] can be written back out to reproduce a run.

mod error;
#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::{
    collections::BTreeMap,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};

use indexmap::IndexMap;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{cli::Warn, instrument::Order};

lazy_static::lazy_static! {
    pub(crate) static ref FLUX_METHODS_COMMA_SEPARATED: String = FluxCalibrationMethod::iter().join(", ");

    pub(crate) static ref BACKGROUNDS_COMMA_SEPARATED: String = Background::iter().join(", ");
}

/// The supported formats of configuration files.
#[derive(Debug, Display, EnumIter, EnumString)]
enum ConfigFileType {
    #[strum(serialize = "toml")]
    Toml,

    #[strum(serialize = "json")]
    Json,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, EnumIter, EnumString)]
pub enum FluxCalibrationMethod {
    /// Use the telluric standard as an approximate flux calibrator.
    #[strum(serialize = "telluricapproximate")]
    TelluricApproximate,

    /// Use a dedicated flux standard. Not implemented.
    #[strum(serialize = "fluxcalibrator")]
    FluxCalibrator,
}

/// Background subtraction done by nsextract.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Background {
    None,
    Average,
    Median,
    Minimum,
    Fit,
}

// The raw configuration-file sections.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub defaults: DefaultsSection,

    #[serde(default)]
    pub interactive: InteractiveFlags,

    #[serde(default, rename = "runtimeFilenames")]
    pub runtime_filenames: RuntimeFilenames,

    #[serde(default, rename = "calibrationReduction")]
    pub calibration_reduction: CalibrationReductionSection,

    #[serde(default, rename = "extractSpectra1D")]
    pub extract_spectra_1d: ExtractSpectra1dSection,

    #[serde(default, rename = "fluxCalibration")]
    pub flux_calibration: FluxCalibrationSection,

    #[serde(default = "default_zero_magnitude_fluxes", rename = "zeroMagnitudeFluxes")]
    pub zero_magnitude_fluxes: IndexMap<String, f64>,

    #[serde(default = "default_nominal_wavelengths", rename = "nominalWavelengths")]
    pub nominal_wavelengths: IndexMap<String, [f64; 2]>,

    #[serde(default = "default_order_scaling_regions", rename = "orderScalingRegions")]
    pub order_scaling_regions: IndexMap<String, String>,

    /// Standard stars, keyed by their `OBJECT` header value.
    #[serde(default)]
    pub standards: IndexMap<String, StandardSection>,

    #[serde(default, rename = "CalibrationDirectories")]
    pub calibration_directories: IndexMap<PathBuf, bool>,

    #[serde(default, rename = "ScienceDirectories")]
    pub science_directories: IndexMap<PathBuf, bool>,

    #[serde(default, rename = "TelluricDirectories")]
    pub telluric_directories: IndexMap<PathBuf, bool>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            defaults: DefaultsSection::default(),
            interactive: InteractiveFlags::default(),
            runtime_filenames: RuntimeFilenames::default(),
            calibration_reduction: CalibrationReductionSection::default(),
            extract_spectra_1d: ExtractSpectra1dSection::default(),
            flux_calibration: FluxCalibrationSection::default(),
            zero_magnitude_fluxes: default_zero_magnitude_fluxes(),
            nominal_wavelengths: default_nominal_wavelengths(),
            order_scaling_regions: default_order_scaling_regions(),
            standards: IndexMap::new(),
            calibration_directories: IndexMap::new(),
            science_directories: IndexMap::new(),
            telluric_directories: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DefaultsSection {
    pub manual_mode: bool,
    pub overwrite: bool,
    /// Directory with data shipped alongside the pipeline (e.g. `vega.txt`).
    pub runtime_data: PathBuf,
    /// The IRAF command-language executable.
    pub iraf_command: String,
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            manual_mode: false,
            overwrite: false,
            runtime_data: PathBuf::from("runtimeData"),
            iraf_command: "cl".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InteractiveFlags {
    pub nsprepare_inter: bool,
    pub nsflat_inter: bool,
    pub nscombine_inter: bool,
    pub nssdist_inter: bool,
    pub nswavelength_inter: bool,
    pub nsfitcoords_inter: bool,
    pub nsextract_inter: bool,
}

/// Names of the files (and prefixes of files) produced along the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeFilenames {
    #[serde(rename = "cleanirPrefix")]
    pub cleanir_prefix: String,
    #[serde(rename = "preparedPrefix")]
    pub prepared_prefix: String,
    #[serde(rename = "reducedPrefix")]
    pub reduced_prefix: String,
    #[serde(rename = "QHflat")]
    pub qh_flat: String,
    #[serde(rename = "QHflat_bpm")]
    pub qh_flat_bpm: String,
    #[serde(rename = "IRflat")]
    pub ir_flat: String,
    #[serde(rename = "IRflat_bpm")]
    pub ir_flat_bpm: String,
    #[serde(rename = "masterflat")]
    pub master_flat: String,
    #[serde(rename = "combinedarc")]
    pub combined_arc: String,
    #[serde(rename = "databaseDir")]
    pub database_dir: String,
    #[serde(rename = "fitcoordsPrefix")]
    pub fitcoords_prefix: String,
    #[serde(rename = "transformPrefix")]
    pub transform_prefix: String,
    #[serde(rename = "waveCalibPrefix")]
    pub wave_calib_prefix: String,
    #[serde(rename = "combinedsrc")]
    pub combined_src: String,
    #[serde(rename = "combinedsky")]
    pub combined_sky: String,
    #[serde(rename = "extractRegularPrefix")]
    pub extract_regular_prefix: String,
    #[serde(rename = "extractFullSlitPrefix")]
    pub extract_full_slit_prefix: String,
    #[serde(rename = "extractStepwiseTracePrefix")]
    pub extract_stepwise_trace_prefix: String,
    #[serde(rename = "extractStepwisePrefix")]
    pub extract_stepwise_prefix: String,
    #[serde(rename = "hLinePrefix")]
    pub h_line_prefix: String,
    #[serde(rename = "telluricPrefix")]
    pub telluric_prefix: String,
    #[serde(rename = "dividedTelContinuumPrefix")]
    pub divided_tel_continuum_prefix: String,
    #[serde(rename = "fluxCalibPrefix")]
    pub flux_calib_prefix: String,
    #[serde(rename = "finalPrefix")]
    pub final_prefix: String,
    pub bb_unscaled: String,
    pub bb_scaled: String,
}

impl Default for RuntimeFilenames {
    fn default() -> Self {
        Self {
            cleanir_prefix: "c".to_string(),
            prepared_prefix: "n".to_string(),
            reduced_prefix: "r".to_string(),
            qh_flat: "QHflat.fits".to_string(),
            qh_flat_bpm: "QHflat_bpm.pl".to_string(),
            ir_flat: "IRflat.fits".to_string(),
            ir_flat_bpm: "IRflat_bpm.pl".to_string(),
            master_flat: "masterflat.fits".to_string(),
            combined_arc: "arc_comb.fits".to_string(),
            database_dir: "database".to_string(),
            fitcoords_prefix: "f".to_string(),
            transform_prefix: "t".to_string(),
            wave_calib_prefix: "w".to_string(),
            combined_src: "src_comb.fits".to_string(),
            combined_sky: "sky_comb.fits".to_string(),
            extract_regular_prefix: "x".to_string(),
            extract_full_slit_prefix: "fs".to_string(),
            extract_stepwise_trace_prefix: "st".to_string(),
            extract_stepwise_prefix: "s".to_string(),
            h_line_prefix: "h".to_string(),
            telluric_prefix: "a".to_string(),
            divided_tel_continuum_prefix: "d".to_string(),
            flux_calib_prefix: "f".to_string(),
            final_prefix: "3".to_string(),
            bb_unscaled: "bb_unscaled".to_string(),
            bb_scaled: "bb_scaled".to_string(),
        }
    }
}

impl RuntimeFilenames {
    /// The combined source image's name without a `.fits` suffix.
    pub fn combined_src_stem(&self) -> String {
        nofits(&self.combined_src)
    }

    /// The extracted, telluric-corrected and continuum-divided science
    /// spectrum of an order.
    pub fn science_order_spectrum(&self, order: Order) -> String {
        format!(
            "{}{}{}{}_order{order}.fits",
            self.divided_tel_continuum_prefix,
            self.telluric_prefix,
            self.extract_regular_prefix,
            self.combined_src_stem()
        )
    }

    /// The extracted, H-line-removed and continuum-divided telluric spectrum
    /// of an order.
    pub fn standard_order_spectrum(&self, order: Order) -> String {
        format!(
            "{}{}{}{}_order{order}.fits",
            self.divided_tel_continuum_prefix,
            self.h_line_prefix,
            self.extract_regular_prefix,
            self.combined_src_stem()
        )
    }

    /// The plain-text, flux-calibrated spectrum of an order ready for
    /// combination.
    pub fn final_order_text(&self, order: Order) -> String {
        format!(
            "{}{}{}{}{}{}_order{order}.txt",
            self.final_prefix,
            self.flux_calib_prefix,
            self.divided_tel_continuum_prefix,
            self.telluric_prefix,
            self.extract_regular_prefix,
            self.combined_src_stem()
        )
    }
}

/// Remove the `.fits` extension from a file name.
pub fn nofits(filename: &str) -> String {
    filename.replace(".fits", "")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationReductionSection {
    #[serde(rename = "Start")]
    pub start: i64,
    #[serde(rename = "Stop")]
    pub stop: i64,
    #[serde(rename = "cleanir_QHflats")]
    pub cleanir_qh_flats: bool,
    #[serde(rename = "cleanir_IRflats")]
    pub cleanir_ir_flats: bool,
    pub cleanir_arcs: bool,
    pub cleanir_pinholes: bool,
    /// How far (as a percentage of an order's coverage) the wavelength
    /// solution may stray from the nominal wavelengths before a warning.
    #[serde(rename = "wavelengthAccuracyPercent")]
    pub wavelength_accuracy_percent: f64,
}

impl Default for CalibrationReductionSection {
    fn default() -> Self {
        Self {
            start: 1,
            stop: 5,
            cleanir_qh_flats: false,
            cleanir_ir_flats: false,
            cleanir_arcs: false,
            cleanir_pinholes: false,
            wavelength_accuracy_percent: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractSpectra1dSection {
    pub use_apall: bool,
    pub subtract_bkg: String,
    pub extract_aperture_radius: f64,
    pub check_peaks_match: bool,
    pub tolerance_offset: f64,
    pub extract_full_slit: bool,
    pub extract_stepwise: bool,
    pub extract_step_size: f64,
    #[serde(rename = "calculateSpectrumSNR")]
    pub calculate_spectrum_snr: bool,
}

impl Default for ExtractSpectra1dSection {
    fn default() -> Self {
        Self {
            use_apall: true,
            subtract_bkg: Background::None.to_string(),
            extract_aperture_radius: 12.0,
            check_peaks_match: true,
            tolerance_offset: 5.0,
            extract_full_slit: false,
            extract_stepwise: false,
            extract_step_size: 6.0,
            calculate_spectrum_snr: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FluxCalibrationSection {
    pub flux_calibration_method: String,
    pub anchor_orders: Vec<Order>,
}

impl Default for FluxCalibrationSection {
    fn default() -> Self {
        Self {
            flux_calibration_method: FluxCalibrationMethod::TelluricApproximate.to_string(),
            anchor_orders: vec![3, 4, 5],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardSection {
    /// The blackbody temperature of the standard [K].
    #[serde(rename = "Temperature")]
    pub temperature: f64,

    /// Magnitudes keyed by order. Orders without a magnitude are calibrated
    /// relatively.
    #[serde(default)]
    pub magnitudes: IndexMap<String, f64>,
}

fn default_zero_magnitude_fluxes() -> IndexMap<String, f64> {
    // erg/cm^2/s/A; K for order 3, H for order 4, J for the rest.
    [
        ("3", 4.283e-11),
        ("4", 1.133e-10),
        ("5", 3.129e-10),
        ("6", 3.129e-10),
        ("7", 3.129e-10),
        ("8", 3.129e-10),
    ]
    .into_iter()
    .map(|(o, f)| (o.to_string(), f))
    .collect()
}

fn default_nominal_wavelengths() -> IndexMap<String, [f64; 2]> {
    [
        ("3", [18690.0, 25310.0]),
        ("4", [14020.0, 18980.0]),
        ("5", [11220.0, 15180.0]),
        ("6", [9350.0, 12650.0]),
        ("7", [8020.0, 10840.0]),
        ("8", [7020.0, 9480.0]),
    ]
    .into_iter()
    .map(|(o, w)| (o.to_string(), w))
    .collect()
}

fn default_order_scaling_regions() -> IndexMap<String, String> {
    [
        ("3", "38:999"),
        ("4", "48:1005"),
        ("5", "55:1010"),
        ("6", "62:1012"),
        ("7", "70:1015"),
        ("8", "80:1018"),
    ]
    .into_iter()
    .map(|(o, r)| (o.to_string(), r.to_string()))
    .collect()
}

impl ConfigFile {
    /// Read a configuration file. The format is determined by the file's
    /// extension.
    pub fn read(file: &Path) -> Result<ConfigFile, ConfigError> {
        debug!("Attempting to parse configuration file {}", file.display());
        let file_type = file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ConfigFileType::from_str(&e).ok())
            .ok_or_else(|| ConfigError::UnsupportedFormat(file.to_path_buf()))?;

        let mut contents = String::new();
        File::open(file)
            .and_then(|mut fh| fh.read_to_string(&mut contents))
            .map_err(|err| ConfigError::Read {
                file: file.to_path_buf(),
                err,
            })?;

        match file_type {
            ConfigFileType::Toml => {
                debug!("Parsing toml file...");
                toml::from_str(&contents).map_err(|err| ConfigError::Toml {
                    file: file.to_path_buf(),
                    err,
                })
            }
            ConfigFileType::Json => {
                debug!("Parsing json file...");
                serde_json::from_str(&contents).map_err(|err| ConfigError::Json {
                    file: file.to_path_buf(),
                    err,
                })
            }
        }
    }

    /// Validate the configuration. Anything that can't be used fails here,
    /// before any stage runs.
    pub fn parse(self) -> Result<PypeConfig, ConfigError> {
        let ConfigFile {
            defaults,
            interactive,
            runtime_filenames,
            calibration_reduction,
            extract_spectra_1d,
            flux_calibration,
            zero_magnitude_fluxes,
            nominal_wavelengths,
            order_scaling_regions,
            standards,
            calibration_directories,
            science_directories,
            telluric_directories,
        } = self;

        let method = FluxCalibrationMethod::from_str(&flux_calibration.flux_calibration_method)
            .map_err(|_| {
                ConfigError::UnknownFluxMethod(flux_calibration.flux_calibration_method.clone())
            })?;
        if method == FluxCalibrationMethod::FluxCalibrator {
            "The 'fluxcalibrator' flux calibration method is not available; flux calibration will stop once it finds the standard".warn();
        }

        let subtract_bkg = Background::from_str(&extract_spectra_1d.subtract_bkg.to_lowercase())
            .map_err(|_| ConfigError::UnknownBackground(extract_spectra_1d.subtract_bkg.clone()))?;
        if extract_spectra_1d.extract_aperture_radius <= 0.0 {
            return Err(ConfigError::BadApertureRadius(
                extract_spectra_1d.extract_aperture_radius,
            ));
        }
        if extract_spectra_1d.tolerance_offset <= 0.0 {
            return Err(ConfigError::BadTolerance(extract_spectra_1d.tolerance_offset));
        }
        if extract_spectra_1d.extract_full_slit {
            "Full-slit extraction was requested, but it is not available; ignoring".warn();
        }
        if extract_spectra_1d.extract_stepwise {
            "Stepwise extraction was requested, but it is not available; ignoring".warn();
        }

        if calibration_reduction.wavelength_accuracy_percent <= 0.0 {
            return Err(ConfigError::BadAccuracy(
                calibration_reduction.wavelength_accuracy_percent,
            ));
        }

        let zero_magnitude_fluxes = parse_order_table("zeroMagnitudeFluxes", zero_magnitude_fluxes)?;
        let nominal_wavelengths = parse_order_table("nominalWavelengths", nominal_wavelengths)?
            .into_iter()
            .map(|(order, [start, end])| {
                if start < end {
                    Ok((order, (start, end)))
                } else {
                    Err(ConfigError::BadNominalWavelengths { order, start, end })
                }
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        let order_scaling_regions =
            parse_order_table("orderScalingRegions", order_scaling_regions)?
                .into_iter()
                .map(|(order, value)| {
                    parse_scaling_region(&value)
                        .map(|r| (order, r))
                        .ok_or(ConfigError::BadScalingRegion { order, value })
                })
                .collect::<Result<BTreeMap<_, _>, _>>()?;

        if flux_calibration.anchor_orders.is_empty() {
            return Err(ConfigError::NoAnchorOrders);
        }
        for &anchor in &flux_calibration.anchor_orders {
            if !zero_magnitude_fluxes.contains_key(&anchor) {
                return Err(ConfigError::AnchorWithoutZeroPoint(anchor));
            }
        }

        let mut parsed_standards = IndexMap::with_capacity(standards.len());
        for (name, section) in standards {
            if section.temperature <= 0.0 {
                return Err(ConfigError::BadTemperature {
                    name,
                    temperature: section.temperature,
                });
            }
            let magnitudes = parse_order_table("standards", section.magnitudes)?;
            parsed_standards.insert(
                name,
                StandardStar {
                    temperature: section.temperature,
                    magnitudes,
                },
            );
        }

        let to_records = |table: IndexMap<PathBuf, bool>| -> Vec<DirectoryRecord> {
            table
                .into_iter()
                .map(|(path, enabled)| DirectoryRecord { path, enabled })
                .collect()
        };
        let calibration_directories = to_records(calibration_directories);
        let science_directories = to_records(science_directories);
        let telluric_directories = to_records(telluric_directories);
        if science_directories.iter().all(|d| !d.enabled) {
            "No science directories are enabled".warn();
        }

        Ok(PypeConfig {
            manual_mode: defaults.manual_mode,
            overwrite: defaults.overwrite,
            runtime_data: defaults.runtime_data,
            iraf_command: defaults.iraf_command,
            interactive,
            filenames: runtime_filenames,
            calibration: CalibrationSettings {
                start: calibration_reduction.start,
                stop: calibration_reduction.stop,
                clean: CleanFlags {
                    qh_flats: calibration_reduction.cleanir_qh_flats,
                    ir_flats: calibration_reduction.cleanir_ir_flats,
                    arcs: calibration_reduction.cleanir_arcs,
                    pinholes: calibration_reduction.cleanir_pinholes,
                },
                wavelength_accuracy_percent: calibration_reduction.wavelength_accuracy_percent,
            },
            extraction: ExtractionSettings {
                use_apall: extract_spectra_1d.use_apall,
                subtract_bkg,
                aperture_radius: extract_spectra_1d.extract_aperture_radius,
                check_peaks_match: extract_spectra_1d.check_peaks_match,
                tolerance_offset: extract_spectra_1d.tolerance_offset,
                full_slit: extract_spectra_1d.extract_full_slit,
                stepwise: extract_spectra_1d.extract_stepwise,
                calculate_snr: extract_spectra_1d.calculate_spectrum_snr,
            },
            flux: FluxSettings {
                method,
                anchor_orders: flux_calibration.anchor_orders,
            },
            zero_magnitude_fluxes,
            nominal_wavelengths,
            order_scaling_regions,
            standards: parsed_standards,
            calibration_directories,
            science_directories,
            telluric_directories,
        })
    }
}

/// Convert the string keys of a per-order table into orders.
fn parse_order_table<T>(
    section: &'static str,
    table: IndexMap<String, T>,
) -> Result<BTreeMap<Order, T>, ConfigError> {
    table
        .into_iter()
        .map(|(key, value)| match key.trim().parse::<Order>() {
            Ok(order) => Ok((order, value)),
            Err(_) => Err(ConfigError::BadOrderKey { section, key }),
        })
        .collect()
}

/// Parse "start:end" into a half-open index range.
fn parse_scaling_region(s: &str) -> Option<(usize, usize)> {
    let (start, end) = s.split_once(':')?;
    let start = start.trim().parse().ok()?;
    let end = end.trim().parse().ok()?;
    if start < end {
        Some((start, end))
    } else {
        None
    }
}

// The validated configuration.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRecord {
    pub path: PathBuf,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct CleanFlags {
    pub qh_flats: bool,
    pub ir_flats: bool,
    pub arcs: bool,
    pub pinholes: bool,
}

#[derive(Debug, Clone)]
pub struct CalibrationSettings {
    /// The first baseline-calibration step to run. Not validated here; an
    /// invalid range is corrected interactively.
    pub start: i64,
    pub stop: i64,
    pub clean: CleanFlags,
    pub wavelength_accuracy_percent: f64,
}

#[derive(Debug, Clone)]
pub struct ExtractionSettings {
    pub use_apall: bool,
    pub subtract_bkg: Background,
    pub aperture_radius: f64,
    pub check_peaks_match: bool,
    /// [pixels]
    pub tolerance_offset: f64,
    pub full_slit: bool,
    pub stepwise: bool,
    pub calculate_snr: bool,
}

#[derive(Debug, Clone)]
pub struct FluxSettings {
    pub method: FluxCalibrationMethod,
    /// Orders whose blackbody is scaled directly from the standard's flux
    /// density rather than from an adjacent order.
    pub anchor_orders: Vec<Order>,
}

#[derive(Debug, Clone)]
pub struct StandardStar {
    /// [K]
    pub temperature: f64,
    pub magnitudes: BTreeMap<Order, f64>,
}

/// Everything the pipeline stages need to know, validated.
#[derive(Debug, Clone)]
pub struct PypeConfig {
    pub manual_mode: bool,
    pub overwrite: bool,
    pub runtime_data: PathBuf,
    pub iraf_command: String,
    pub interactive: InteractiveFlags,
    pub filenames: RuntimeFilenames,
    pub calibration: CalibrationSettings,
    pub extraction: ExtractionSettings,
    pub flux: FluxSettings,
    /// [erg/cm^2/s/A]
    pub zero_magnitude_fluxes: BTreeMap<Order, f64>,
    /// [Angstroms]
    pub nominal_wavelengths: BTreeMap<Order, (f64, f64)>,
    pub order_scaling_regions: BTreeMap<Order, (usize, usize)>,
    pub standards: IndexMap<String, StandardStar>,
    pub calibration_directories: Vec<DirectoryRecord>,
    pub science_directories: Vec<DirectoryRecord>,
    pub telluric_directories: Vec<DirectoryRecord>,
}

impl PypeConfig {
    pub fn enabled_calibration_directories(&self) -> impl Iterator<Item = &Path> {
        enabled(&self.calibration_directories)
    }

    pub fn enabled_science_directories(&self) -> impl Iterator<Item = &Path> {
        enabled(&self.science_directories)
    }

    pub fn enabled_telluric_directories(&self) -> impl Iterator<Item = &Path> {
        enabled(&self.telluric_directories)
    }
}

fn enabled(records: &[DirectoryRecord]) -> impl Iterator<Item = &Path> {
    records.iter().filter(|r| r.enabled).map(|r| r.path.as_path())
}
