// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::Write;

use approx::assert_abs_diff_eq;
use indoc::indoc;
use tempfile::Builder;

use super::*;

fn parse_toml(s: &str) -> Result<PypeConfig, ConfigError> {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(s.as_bytes()).unwrap();
    ConfigFile::read(file.path())?.parse()
}

#[test]
fn empty_file_gives_defaults() {
    let config = parse_toml("").unwrap();
    assert!(!config.manual_mode);
    assert!(!config.overwrite);
    assert_eq!(config.iraf_command, "cl");
    assert_eq!(config.calibration.start, 1);
    assert_eq!(config.calibration.stop, 5);
    assert_eq!(config.extraction.subtract_bkg, Background::None);
    assert_eq!(config.flux.method, FluxCalibrationMethod::TelluricApproximate);
    assert_eq!(config.flux.anchor_orders, vec![3, 4, 5]);
    assert_abs_diff_eq!(config.zero_magnitude_fluxes[&3], 4.283e-11);
    assert_eq!(config.nominal_wavelengths[&4], (14020.0, 18980.0));
    assert_eq!(config.filenames.combined_src, "src_comb.fits");
    assert!(config.science_directories.is_empty());
}

#[test]
fn full_file() {
    let config = parse_toml(indoc! {r#"
        [defaults]
        manualMode = true
        runtimeData = "/opt/gnirs/runtimeData"

        [interactive]
        nsextractInter = true

        [runtimeFilenames]
        combinedsrc = "target_comb.fits"
        extractRegularPrefix = "v"

        [calibrationReduction]
        Start = 3
        Stop = 4
        cleanir_arcs = true

        [extractSpectra1D]
        subtractBkg = "Median"
        extractApertureRadius = 8.5
        toleranceOffset = 3

        [fluxCalibration]
        anchorOrders = [3]

        [orderScalingRegions]
        3 = "10:1000"

        [standards.HIP_5678]
        Temperature = 9700
        magnitudes = { 3 = 7.1, 4 = 7.2 }

        [ScienceDirectories]
        "/data/HD1234/LB_SXD/Science" = true
        "/data/HD1234/LB_SXD/Science_2" = false

        [TelluricDirectories]
        "/data/HD1234/LB_SXD/Telluric" = true
    "#})
    .unwrap();

    assert!(config.manual_mode);
    assert_eq!(config.runtime_data, PathBuf::from("/opt/gnirs/runtimeData"));
    assert!(config.interactive.nsextract_inter);
    assert!(!config.interactive.nsflat_inter);
    assert_eq!(config.filenames.combined_src_stem(), "target_comb");
    assert_eq!(
        config.filenames.science_order_spectrum(4),
        "davtarget_comb_order4.fits"
    );
    assert_eq!(config.calibration.start, 3);
    assert!(config.calibration.clean.arcs);
    assert!(!config.calibration.clean.pinholes);
    assert_eq!(config.extraction.subtract_bkg, Background::Median);
    assert_abs_diff_eq!(config.extraction.aperture_radius, 8.5);
    assert_abs_diff_eq!(config.extraction.tolerance_offset, 3.0);
    assert_eq!(config.order_scaling_regions[&3], (10, 1000));
    assert_eq!(config.order_scaling_regions.len(), 1);

    let std = &config.standards["HIP_5678"];
    assert_abs_diff_eq!(std.temperature, 9700.0);
    assert_abs_diff_eq!(std.magnitudes[&4], 7.2);
    assert!(!std.magnitudes.contains_key(&5));

    assert_eq!(config.science_directories.len(), 2);
    assert_eq!(
        config.enabled_science_directories().collect::<Vec<_>>(),
        vec![Path::new("/data/HD1234/LB_SXD/Science")]
    );
    assert_eq!(config.enabled_telluric_directories().count(), 1);
    assert_eq!(config.enabled_calibration_directories().count(), 0);
}

#[test]
fn directories_keep_their_order() {
    let config = parse_toml(indoc! {r#"
        [CalibrationDirectories]
        "/z" = true
        "/a" = true
        "/m" = true
    "#})
    .unwrap();
    let order = config
        .calibration_directories
        .iter()
        .map(|d| d.path.display().to_string())
        .collect::<Vec<_>>();
    assert_eq!(order, vec!["/z", "/a", "/m"]);
}

#[test]
fn unknown_enum_values_are_rejected() {
    let result = parse_toml(indoc! {r#"
        [fluxCalibration]
        fluxCalibrationMethod = "guess"
    "#});
    assert!(matches!(result, Err(ConfigError::UnknownFluxMethod(m)) if m == "guess"));

    let result = parse_toml(indoc! {r#"
        [extractSpectra1D]
        subtractBkg = "sometimes"
    "#});
    let err = result.unwrap_err();
    assert!(matches!(err, ConfigError::UnknownBackground(_)));
    assert!(err.to_string().contains("none, average, median, minimum, fit"));
}

#[test]
fn bad_tables_are_rejected() {
    let result = parse_toml(indoc! {r#"
        [zeroMagnitudeFluxes]
        K = 4.283e-11
    "#});
    assert!(matches!(result, Err(ConfigError::BadOrderKey { .. })));

    let result = parse_toml(indoc! {r#"
        [orderScalingRegions]
        3 = "1000:10"
    "#});
    assert!(matches!(
        result,
        Err(ConfigError::BadScalingRegion { order: 3, .. })
    ));

    let result = parse_toml(indoc! {r#"
        [nominalWavelengths]
        3 = [25310, 18690]
    "#});
    assert!(matches!(
        result,
        Err(ConfigError::BadNominalWavelengths { order: 3, .. })
    ));

    let result = parse_toml(indoc! {r#"
        [fluxCalibration]
        anchorOrders = [9]
    "#});
    assert!(matches!(result, Err(ConfigError::AnchorWithoutZeroPoint(9))));

    let result = parse_toml(indoc! {r#"
        [standards.HIP_1]
        Temperature = -5
    "#});
    assert!(matches!(result, Err(ConfigError::BadTemperature { .. })));
}

#[test]
fn json_is_read_too() {
    let mut file = Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(br#"{"defaults": {"overwrite": true}, "calibrationReduction": {"Stop": 2}}"#)
        .unwrap();
    let config = ConfigFile::read(file.path()).unwrap().parse().unwrap();
    assert!(config.overwrite);
    assert_eq!(config.calibration.stop, 2);
}

#[test]
fn other_extensions_are_rejected() {
    let file = Builder::new().suffix(".cfg").tempfile().unwrap();
    let result = ConfigFile::read(file.path());
    assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
}

#[test]
fn config_survives_a_toml_round_trip() {
    let mut raw = ConfigFile::default();
    raw.science_directories
        .insert(PathBuf::from("/data/Science"), true);
    let s = toml::to_string(&raw).unwrap();
    let back: ConfigFile = toml::from_str(&s).unwrap();
    assert_eq!(back.science_directories.len(), 1);
    assert_eq!(back.runtime_filenames.final_prefix, "3");
}
