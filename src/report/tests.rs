// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{cell::RefCell, rc::Rc};

use approx::assert_abs_diff_eq;
use fitsio::{
    images::{ImageDescription, ImageType},
    FitsFile,
};
use tempfile::{tempdir, TempDir};

use super::*;
use crate::{
    config::ConfigFile,
    toolkit::{mock::MockToolkit, TaskOutput},
};

/// Write a combined source frame's primary header.
fn write_combined(path: &Path, object: &str, pa: f64, observatory: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut fptr = FitsFile::create(path).open().unwrap();
    let hdu = fptr.hdu(0).unwrap();
    hdu.write_key(&mut fptr, "OBJECT", object).unwrap();
    hdu.write_key(&mut fptr, "GEMPRGID", "GN-2012A-Q-1").unwrap();
    hdu.write_key(&mut fptr, "DATE-OBS", "2012-01-01").unwrap();
    hdu.write_key(&mut fptr, "AIRMASS", 1.234).unwrap();
    hdu.write_key(&mut fptr, "HA", "00:00:00.0").unwrap();
    hdu.write_key(&mut fptr, "DEC", 60.0).unwrap();
    hdu.write_key(&mut fptr, "AZIMUTH", 0.0).unwrap();
    hdu.write_key(&mut fptr, "PA", pa).unwrap();
    hdu.write_key(&mut fptr, "OBSERVAT", observatory).unwrap();
    hdu.write_key(&mut fptr, "RAWIQ", "70-percentile").unwrap();
    hdu.write_key(&mut fptr, "RAWCC", "50-percentile").unwrap();
    hdu.write_key(&mut fptr, "RAWWV", "Any").unwrap();
    // RAWBG is left out.
}

fn write_aperture(intermediate: &Path, center: f64) {
    let database = intermediate.join("database");
    fs::create_dir_all(&database).unwrap();
    fs::write(
        database.join("apsrc_comb_SCI_1_"),
        format!("begin\taperture src_comb_SCI_1_ 1 {center} 512.\n\tcenter\t{center} 512.\n"),
    )
    .unwrap();
}

/// A flux-calibrated order with its units in extension 1.
fn write_calibrated(path: &Path, units: &str) {
    let mut fptr = FitsFile::create(path).open().unwrap();
    let description = ImageDescription {
        data_type: ImageType::Double,
        dimensions: &[4],
    };
    let hdu = fptr.create_image("SCI".to_string(), &description).unwrap();
    hdu.write_key(&mut fptr, "FUNITS", units).unwrap();
}

fn text_spectrum(path: &Path, start: f64, fluxes: impl Iterator<Item = f64>) {
    let fluxes: Vec<f64> = fluxes.collect();
    let spectrum = TextSpectrum {
        wavelengths: (0..fluxes.len()).map(|i| start + 10.0 * i as f64).collect(),
        fluxes,
    };
    spectrum.write(path).unwrap();
}

struct Target {
    _root: TempDir,
    obs_dir: PathBuf,
    runtime_data: PathBuf,
}

impl Target {
    /// A flux-calibrated science target (profile center 345) with its
    /// telluric (center 300).
    fn new() -> Target {
        let root = tempdir().unwrap();
        let obs_dir = root.path().join("NGC4736/LB_SXD_32_10/Science");
        let sci = obs_dir.join(INTERMEDIATE_DIR);
        let tel = obs_dir.join(TELLURIC_LINK).join(INTERMEDIATE_DIR);
        write_combined(&sci.join("src_comb.fits"), "NGC 4736", 10.0, "Gemini-North");
        write_combined(&tel.join("src_comb.fits"), "HIP 12345", 20.0, "Gemini-North");
        write_aperture(&sci, 345.0);
        write_aperture(&tel, 300.0);
        write_calibrated(&sci.join("fdaxsrc_comb_order3.fits"), "erg/cm^2/s/A");
        write_calibrated(&tel.join("dhxsrc_comb_order3.fits"), "");

        for (order, start) in [(3, 18690.0), (4, 14020.0), (5, 11220.0)] {
            text_spectrum(
                &sci.join(format!("3fdaxsrc_comb_order{order}.txt")),
                start,
                (0..50).map(|i| i as f64),
            );
        }
        let final_dir = obs_dir.join(FINAL_DIR);
        fs::create_dir_all(&final_dir).unwrap();
        text_spectrum(
            &final_dir.join("NGC4736_src.txt"),
            11220.0,
            (0..100).map(|i| 2.0 * i as f64),
        );

        let runtime_data = root.path().join("runtimeData");
        fs::create_dir_all(&runtime_data).unwrap();
        text_spectrum(
            &runtime_data.join("vega.txt"),
            10000.0,
            [5.0, 50.0, 10.0].into_iter(),
        );

        Target {
            _root: root,
            obs_dir,
            runtime_data,
        }
    }

    fn config(&self) -> ConfigFile {
        let mut config = ConfigFile::default();
        config.defaults.runtime_data = self.runtime_data.clone();
        config.science_directories.insert(self.obs_dir.clone(), true);
        config.order_scaling_regions.clear();
        for (order, region) in [("3", "0:50"), ("4", "10:40")] {
            config
                .order_scaling_regions
                .insert(order.to_string(), region.to_string());
        }
        config
    }
}

/// A toolkit whose imexam fits a profile at the cursor's column (peak 1000
/// plus the column) and whose bplot reports an S/N of 42.
fn toolkit(cwd: &Path) -> (MockToolkit, Rc<RefCell<Vec<String>>>) {
    let cursors = Rc::new(RefCell::new(vec![]));
    let seen = cursors.clone();
    let mut toolkit = MockToolkit::new(cwd);
    toolkit.on("imexam", move |cwd, task| {
        let cursor = fs::read_to_string(cwd.join(task.get_str("imagecur").unwrap())).unwrap();
        seen.borrow_mut().push(cursor.clone());
        let column: f64 = cursor.split_whitespace().next().unwrap().parse().unwrap();
        fs::write(
            cwd.join(task.get_str("logfile").unwrap()),
            format!(
                "# [1] src_comb.fits[SCI,1]\nLines 335-345  center=  {column} peak=  {} bkg= 1.0 fwhm=  3.5\n",
                1000.0 + column
            ),
        )
        .unwrap();
        Ok(TaskOutput::default())
    });
    toolkit.on("continuum", |cwd, task| {
        fs::write(cwd.join(task.get_str("output").unwrap()), "").unwrap();
        Ok(TaskOutput::default())
    });
    toolkit.on("bplot", |_, _| {
        Ok(TaskOutput {
            stdout: vec![
                "tmp.fits[1]: NGC 4736".to_string(),
                "  center  cont  flux  eqw  snr  42.0".to_string(),
            ],
        })
    });
    (toolkit, cursors)
}

#[test]
fn everything_on_a_data_sheet() {
    let target = Target::new();
    let config = target.config().parse().unwrap();
    let (mut toolkit, cursors) = toolkit(target._root.path());

    let sheet = collect(&config, &mut toolkit, &target.obs_dir).unwrap();

    let (sci, tel) = (&sheet.science, &sheet.telluric);
    assert_eq!(sci.object.as_deref(), Some("NGC4736"));
    assert_eq!(tel.object.as_deref(), Some("HIP12345"));
    assert_eq!(sci.header("GEMPRGID"), Some("GN-2012A-Q-1"));
    assert_eq!(sci.header("RAWBG"), None);
    assert_abs_diff_eq!(sci.peak.unwrap(), 1345.0);
    assert_abs_diff_eq!(tel.peak.unwrap(), 1300.0);
    assert_abs_diff_eq!(sci.fwhm.unwrap(), 3.5);
    assert_abs_diff_eq!(sci.snr.unwrap(), 42.0);
    assert_abs_diff_eq!(tel.snr.unwrap(), 42.0);
    assert_eq!(sci.conditions_row()[7], "unknown");
    assert_eq!(
        *cursors.borrow(),
        ["345.000 340.000\n", "300.000 340.000\n"]
    );

    // Profiles are measured in each target's directory.
    let imexams: Vec<&PathBuf> = toolkit
        .calls
        .iter()
        .filter(|(_, t)| t.name == "imexam")
        .map(|(cwd, _)| cwd)
        .collect();
    assert_eq!(
        imexams,
        [&target.obs_dir, &target.obs_dir.join(TELLURIC_LINK)]
    );
    let imexam = toolkit.calls_to("imexam")[0];
    assert_eq!(
        imexam.get_str("input"),
        Some("Intermediate/src_comb.fits[SCI,1]")
    );
    let continuum = toolkit.calls_to("continuum");
    assert_eq!(
        continuum[0].get_str("input"),
        Some("fdaxsrc_comb_order3.fits[1]")
    );
    assert_eq!(
        continuum[1].get_str("input"),
        Some("dhxsrc_comb_order3.fits[1]")
    );
    assert_eq!(continuum[0].get_str("sample"), Some("21000:22000"));

    // The reference peaks at 1.05 times the science peak.
    let reference = sheet.reference.as_ref().unwrap();
    assert_abs_diff_eq!(
        reference.max_flux().unwrap(),
        1.05 * 198.0,
        epsilon = 1e-9
    );
    assert_eq!(sheet.units, "erg/cm^2/s/A");

    // Order 5 has no region, so all of it is accepted.
    let accepted: Vec<usize> = sheet.orders.iter().map(|o| o.accepted.len()).collect();
    assert_eq!(accepted, [50, 30, 50]);

    // Nothing temporary is left behind.
    for dir in [
        target.obs_dir.clone(),
        target.obs_dir.join(INTERMEDIATE_DIR),
        target.obs_dir.join(TELLURIC_LINK),
    ] {
        for tmp in [TMP_CURSOR, TMP_LOG, TMP_FITS] {
            assert!(!dir.join(tmp).exists());
        }
    }
    assert_eq!(toolkit.cwd(), target._root.path());
}

#[test]
fn snr_estimation_can_be_turned_off() {
    let target = Target::new();
    let mut file = target.config();
    file.extract_spectra_1d.calculate_spectrum_snr = false;
    let config = file.parse().unwrap();
    let (mut toolkit, _) = toolkit(target._root.path());

    let sheet = collect(&config, &mut toolkit, &target.obs_dir).unwrap();
    assert_eq!(toolkit.task_names(), ["imexam", "imexam"]);
    assert!(sheet.science.snr.is_none());
    assert_eq!(sheet.science.profile_row()[3], "unknown");
}

#[test]
fn unmeasurable_things_are_unknown() {
    let target = Target::new();
    let tel = target.obs_dir.join(TELLURIC_LINK).join(INTERMEDIATE_DIR);
    fs::remove_file(tel.join("database/apsrc_comb_SCI_1_")).unwrap();
    fs::remove_file(tel.join("dhxsrc_comb_order3.fits")).unwrap();
    fs::remove_file(target.runtime_data.join("vega.txt")).unwrap();
    let config = target.config().parse().unwrap();
    let (mut toolkit, _) = toolkit(target._root.path());

    let sheet = collect(&config, &mut toolkit, &target.obs_dir).unwrap();
    assert_eq!(toolkit.calls_to("imexam").len(), 1);
    assert_eq!(toolkit.calls_to("bplot").len(), 1);
    assert!(sheet.telluric.peak.is_none());
    assert!(sheet.telluric.snr.is_none());
    assert_eq!(sheet.telluric.profile_row()[1..4], ["unknown"; 3]);
    assert!(sheet.reference.is_none());
}

#[test]
fn missing_combined_spectrum_is_fatal() {
    let target = Target::new();
    fs::remove_file(target.obs_dir.join(FINAL_DIR).join("NGC4736_src.txt")).unwrap();
    let config = target.config().parse().unwrap();
    let (mut toolkit, _) = toolkit(target._root.path());

    let result = collect(&config, &mut toolkit, &target.obs_dir);
    assert!(matches!(result, Err(ReportError::MissingSpectrum(_))));
}

#[test]
fn missing_combined_source_is_fatal() {
    let target = Target::new();
    fs::remove_file(
        target
            .obs_dir
            .join(TELLURIC_LINK)
            .join(INTERMEDIATE_DIR)
            .join("src_comb.fits"),
    )
    .unwrap();
    let config = target.config().parse().unwrap();
    let (mut toolkit, _) = toolkit(target._root.path());

    let result = collect(&config, &mut toolkit, &target.obs_dir);
    assert!(matches!(result, Err(ReportError::MissingCombinedSource(_))));
}

#[test]
#[cfg(not(feature = "plotting"))]
fn data_sheets_need_plotting() {
    let target = Target::new();
    let config = target.config().parse().unwrap();
    let (mut toolkit, _) = toolkit(target._root.path());

    let result = run(&config, &mut toolkit);
    assert!(matches!(result, Err(ReportError::NoPlottingFeature)));
}
