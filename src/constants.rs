// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision where they are floats. Wavelengths
are in Angstroms unless stated otherwise.
 */

pub use std::f64::consts::PI;

/// Planck's constant [erg s].
pub const PLANCK_H: f64 = 6.626_070_15e-27;
/// Speed of light [cm/s].
pub const SPEED_OF_LIGHT: f64 = 2.997_924_58e10;
/// Boltzmann's constant [erg/K].
pub const BOLTZMANN_K: f64 = 1.380_649e-16;
/// The number of centimetres in one Angstrom.
pub const CM_PER_ANGSTROM: f64 = 1e-8;

/// The name of the manifest listing every calibration frame.
pub const ALL_LIST: &str = "all.list";
pub const QH_FLATS_LIST: &str = "QHflats.list";
pub const IR_FLATS_LIST: &str = "IRflats.list";
pub const ARCS_LIST: &str = "arcs.list";
pub const PINHOLES_LIST: &str = "pinholes.list";
pub const SRC_LIST: &str = "src.list";
pub const SKY_LIST: &str = "sky.list";
/// Acquisition images for an observation, in time order. The last one is the
/// acquisition image associated with the science frames.
pub const ACQ_LIST: &str = "acq.list";
/// The file name of the list of single-column arc order extractions.
pub const ARC_ORDERS_LIST: &str = "arcorders.list";
/// The wavelength-calibrated arc spectrum made from all orders.
pub const ARC_CALIBRATED: &str = "arc_calibrated.fits";

/// Reduced products of an observation live in this subdirectory.
pub const INTERMEDIATE_DIR: &str = "Intermediate";
/// Final products (combined spectra, data sheets) live in this subdirectory.
pub const FINAL_DIR: &str = "Final";
/// Science directories contain a link to their telluric standard with this
/// name.
pub const TELLURIC_LINK: &str = "Telluric";
/// Science directories contain a link to their flux standard with this name.
pub const STANDARD_LINK: &str = "Standard";

/// Bad-pixel mask for data taken before the summer 2012 lens replacement.
pub const BPM_2011: &str = "gnirs$data/gnirsn_2011apr07_bpm.fits";
/// Bad-pixel mask for data taken after the summer 2012 lens replacement.
pub const BPM_2012: &str = "gnirs$data/gnirsn_2012dec05_bpm.fits";

pub const APERTURE_TABLE: &str = "gnirs$data/apertures.fits";
pub const ARRAY_TABLE: &str = "gnirs$data/array.fits";
pub const CONFIG_TABLE: &str = "gnirs$data/config.fits";
pub const NSAPPWAVE_TABLE: &str = "gnirs$data/nsappwave.fits";

/// The detector row used by nsextract to find apertures.
pub const EXTRACTION_LINE: i64 = 700;

/// The number of pixels along the dispersion axis minus one; used to get the
/// last wavelength of a transformed arc order.
pub const ARC_LAST_PIXEL: f64 = 1022.0;

/// Columns (approximately down the middle of each order) extracted from the
/// transformed arc to check the wavelength solution.
pub const ARC_CHECK_COLUMNS: [u32; 6] = [88, 77, 65, 54, 53, 92];

/// The prefix of rewritten telluric aperture files used to force a science
/// re-extraction.
pub const REEXTRACT_PREFIX: &str = "re";

/// The number of tracing columns used by the weighted (apall) extraction.
pub const APALL_TRACING_COLUMNS: i64 = 20;
/// The number of tracing columns used by the simple-sum extraction.
pub const SUM_TRACING_COLUMNS: i64 = 10;

/// The wavelength window used to estimate a spectrum's signal-to-noise ratio.
pub const SNR_WINDOW: (f64, f64) = (21000.0, 22000.0);

/// The detector row at which spectrum peaks and FWHMs are measured.
pub const IMEXAM_ROW: f64 = 340.0;

/// Tellurics taken further than this from the science [hours] trigger a
/// warning.
pub const TELLURIC_MAX_HOURS: f64 = 1.5;

/// The data-sheet reference spectrum is scaled to this factor of the science
/// peak.
pub const REFERENCE_PEAK_SCALE: f64 = 1.05;

/// Latitude of Gemini North [degrees].
pub const GEMINI_NORTH_LAT_DEG: f64 = 19.823_806;
/// Latitude of Gemini South [degrees].
pub const GEMINI_SOUTH_LAT_DEG: f64 = -30.240_75;
