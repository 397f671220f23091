// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use fitsio::{
    images::{ImageDescription, ImageType},
    FitsFile,
};
use tempfile::{tempdir, TempDir};

use super::*;
use crate::{
    config::{ConfigFile, StandardSection},
    interact::tests::ScriptedPrompter,
    io::fits::{fits_get_optional_key, fits_open},
};

const NUM_PIXELS: usize = 50;

/// (start wavelength, dispersion) of orders 3, 4 and 5. Each order overlaps
/// the one before it.
const GRIDS: [(f64, f64); 3] = [(18690.0, 130.0), (14020.0, 100.0), (11220.0, 80.0)];

/// Write an order spectrum: a primary header and a 1D spectrum in extension
/// 1.
fn write_order(path: &Path, object: &str, exptime: f64, (start, delta): (f64, f64), value: f64) {
    let mut fptr = FitsFile::create(path).open().unwrap();
    let primary = fptr.hdu(0).unwrap();
    primary.write_key(&mut fptr, "OBJECT", object).unwrap();
    primary.write_key(&mut fptr, "EXPTIME", exptime).unwrap();
    let description = ImageDescription {
        data_type: ImageType::Double,
        dimensions: &[NUM_PIXELS],
    };
    let hdu = fptr.create_image("SCI".to_string(), &description).unwrap();
    hdu.write_image(&mut fptr, &vec![value; NUM_PIXELS]).unwrap();
    hdu.write_key(&mut fptr, "CRPIX1", 1.0).unwrap();
    hdu.write_key(&mut fptr, "CRVAL1", start).unwrap();
    hdu.write_key(&mut fptr, "CD1_1", delta).unwrap();
}

struct Target {
    _root: TempDir,
    obs_dir: PathBuf,
}

impl Target {
    /// A science directory (exposure time 5 s) and its telluric (300 s), with
    /// spectra for orders 3, 4 and 5.
    fn new(grids: [(f64, f64); 3]) -> Target {
        let root = tempdir().unwrap();
        let obs_dir = root.path().join("NGC4736/LB_SXD_32_10/Science");
        let sci = obs_dir.join(INTERMEDIATE_DIR);
        let tel = obs_dir.join(TELLURIC_LINK).join(INTERMEDIATE_DIR);
        fs::create_dir_all(&sci).unwrap();
        fs::create_dir_all(&tel).unwrap();
        for (order, grid) in [3, 4, 5].into_iter().zip(grids) {
            write_order(
                &sci.join(format!("daxsrc_comb_order{order}.fits")),
                "NGC 4736",
                5.0,
                grid,
                2.0,
            );
            write_order(
                &tel.join(format!("dhxsrc_comb_order{order}.fits")),
                "HIP 12345",
                300.0,
                grid,
                1.0,
            );
        }
        Target {
            _root: root,
            obs_dir,
        }
    }

    fn intermediate(&self) -> PathBuf {
        self.obs_dir.join(INTERMEDIATE_DIR)
    }

    fn config(&self, magnitudes: &[(&str, f64)]) -> ConfigFile {
        let mut config = ConfigFile::default();
        config.science_directories.insert(self.obs_dir.clone(), true);
        config.standards.insert(
            "HIP 12345".to_string(),
            StandardSection {
                temperature: 9700.0,
                magnitudes: magnitudes
                    .iter()
                    .map(|&(o, m)| (o.to_string(), m))
                    .collect(),
            },
        );
        for (order, region) in [("3", "0:50"), ("4", "10:40"), ("5", "5:45")] {
            config
                .order_scaling_regions
                .insert(order.to_string(), region.to_string());
        }
        config
    }

    /// The flux-calibrated spectrum of an order, and its FUNITS.
    fn calibrated(&self, order: Order) -> (Vec<f64>, Option<String>) {
        let path = self
            .intermediate()
            .join(format!("fdaxsrc_comb_order{order}.fits"));
        let (_, data) = read_spectrum_fits(&path, 1).unwrap();
        let mut fptr = fits_open(&path).unwrap();
        let hdu = fits_open_hdu(&mut fptr, 1).unwrap();
        let units = fits_get_optional_key(&mut fptr, &hdu, "FUNITS").unwrap();
        (data, units)
    }
}

fn mean(v: &[f64]) -> f64 {
    v.iter().sum::<f64>() / v.len() as f64
}

#[test]
fn object_names_in_file_names() {
    assert_eq!(combined_spectrum_name("NGC 4736"), "NGC4736_src.txt");
    assert_eq!(combined_spectrum_name("HIP-12345 (A)"), "HIP12345A_src.txt");
}

#[test]
fn absolute_calibration_of_anchor_orders() {
    let target = Target::new(GRIDS);
    let config = target
        .config(&[("3", 8.0), ("4", 8.2), ("5", 8.5)])
        .parse()
        .unwrap();
    let mut prompter = ScriptedPrompter::new(&[]);
    run(&config, &mut prompter).unwrap();

    for (order, mag) in [(3, 8.0), (4, 8.2), (5, 8.5)] {
        let flambda = 10_f64.powf(-mag / 2.5) * config.zero_magnitude_fluxes[&order] * 60.0;
        let (data, units) = target.calibrated(order);
        // The science spectrum is 2 everywhere.
        assert_relative_eq!(mean(&data), 2.0 * flambda, max_relative = 1e-9);
        assert_eq!(units.as_deref(), Some("erg/cm^2/s/A"));
        assert!(target
            .intermediate()
            .join(format!("bb_unscaled{order}.fits"))
            .exists());
        assert!(target
            .intermediate()
            .join(format!("3fdaxsrc_comb_order{order}.txt"))
            .exists());
    }

    let combined =
        TextSpectrum::read(&target.obs_dir.join(FINAL_DIR).join("NGC4736_src.txt")).unwrap();
    assert_eq!(combined.len(), 50 + 30 + 40);
    assert!(combined.wavelengths.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn relative_calibration_scales_through_overlaps() {
    let target = Target::new(GRIDS);
    let mut file = target.config(&[]);
    file.flux_calibration.anchor_orders = vec![3];
    let config = file.parse().unwrap();
    let mut prompter = ScriptedPrompter::new(&[]);
    run(&config, &mut prompter).unwrap();

    let (data, units) = target.calibrated(3);
    assert_relative_eq!(mean(&data), 2.0 * 60.0, max_relative = 1e-9);
    assert_eq!(units.as_deref(), Some("Flambda, relative"));

    let dir = target.intermediate();
    let bb = |order: Order| Blackbody::read(&dir.join(format!("bb_scaled{order}.fits"))).unwrap();
    for (previous, current) in [(bb(3), bb(4)), (bb(4), bb(5))] {
        let (start, end) = (previous.wcs.start(), current.wcs.end());
        assert_relative_eq!(
            previous.mean_between(start, end).unwrap(),
            current.mean_between(start, end).unwrap(),
            max_relative = 1e-9
        );
    }
}

#[test]
fn orders_must_overlap() {
    // Order 4 ends at 18000, before order 3 starts.
    let target = Target::new([(18690.0, 130.0), (13000.0, 100.0), (11220.0, 80.0)]);
    let mut file = target.config(&[]);
    file.flux_calibration.anchor_orders = vec![3];
    let config = file.parse().unwrap();
    let mut prompter = ScriptedPrompter::new(&[]);

    let result = run(&config, &mut prompter);
    assert!(matches!(
        result,
        Err(FluxCalError::NoOverlap {
            previous: 3,
            order: 4
        })
    ));
}

#[test]
fn existing_orders_are_reused() {
    let target = Target::new(GRIDS);
    let mut file = target.config(&[]);
    file.flux_calibration.anchor_orders = vec![3];
    let config = file.parse().unwrap();
    let mut prompter = ScriptedPrompter::new(&[]);
    run(&config, &mut prompter).unwrap();
    let (before, _) = target.calibrated(4);

    let text = target.intermediate().join("3fdaxsrc_comb_order4.txt");
    fs::remove_file(&text).unwrap();
    run(&config, &mut prompter).unwrap();
    let (after, _) = target.calibrated(4);
    assert_eq!(before, after);
    // The text export is remade from the existing output.
    assert!(text.exists());

    let mut file = target.config(&[]);
    file.flux_calibration.anchor_orders = vec![3];
    file.defaults.overwrite = true;
    run(&file.parse().unwrap(), &mut prompter).unwrap();
    let (again, _) = target.calibrated(4);
    assert_relative_eq!(mean(&again), mean(&before), max_relative = 1e-9);
}

#[test]
fn missing_standard_is_fatal() {
    let target = Target::new(GRIDS);
    fs::remove_dir_all(target.obs_dir.join(TELLURIC_LINK)).unwrap();
    let config = target.config(&[]).parse().unwrap();
    let mut prompter = ScriptedPrompter::new(&[]);

    let result = run(&config, &mut prompter);
    assert!(matches!(result, Err(FluxCalError::MissingStandard { .. })));
}

#[test]
fn flux_calibrator_method_stops_after_finding_the_standard() {
    let target = Target::new(GRIDS);
    let mut file = target.config(&[]);
    file.flux_calibration.flux_calibration_method = "fluxcalibrator".to_string();
    let config = file.parse().unwrap();
    let mut prompter = ScriptedPrompter::new(&[]);

    let result = run(&config, &mut prompter);
    assert!(matches!(result, Err(FluxCalError::MissingStandard { .. })));

    fs::create_dir_all(target.obs_dir.join(STANDARD_LINK).join(INTERMEDIATE_DIR)).unwrap();
    let result = run(&config, &mut prompter);
    assert!(matches!(
        result,
        Err(FluxCalError::FluxCalibratorUnavailable(_))
    ));
}

#[test]
fn standard_needs_settings() {
    let target = Target::new(GRIDS);
    let mut file = target.config(&[]);
    file.standards.clear();
    let config = file.parse().unwrap();
    let mut prompter = ScriptedPrompter::new(&[]);

    let result = run(&config, &mut prompter);
    assert!(matches!(result, Err(FluxCalError::UnknownStandard(name)) if name == "HIP 12345"));
}
