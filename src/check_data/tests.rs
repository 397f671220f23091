// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs;

use tempfile::tempdir;

use super::*;
use crate::{
    config::ConfigFile,
    headers::tests::{write_fake_frame, FakeFrame},
};

#[test]
fn most_common_exptime_is_unique() {
    let list = Path::new("src.list");
    assert_eq!(most_common_exptime(list, &[5.0, 5.0, 5.0, 300.0]).unwrap(), (5.0, 3));
    assert_eq!(most_common_exptime(list, &[300.0]).unwrap(), (300.0, 1));

    let result = most_common_exptime(list, &[5.0, 5.0, 300.0, 300.0]);
    assert!(matches!(
        result,
        Err(CheckDataError::AmbiguousExposureTime { .. })
    ));
}

#[test]
fn mixed_exposure_times_are_pruned_with_a_backup() {
    let dir = tempdir().unwrap();
    let names = ["N1.fits", "N2.fits", "N3.fits", "N4.fits"];
    for (name, exptime) in names.iter().zip([5.0, 5.0, 5.0, 300.0]) {
        write_fake_frame(
            dir.path(),
            name,
            &FakeFrame {
                exptime,
                ..Default::default()
            },
        );
    }
    fs::write(dir.path().join("src.list"), names.join("\n")).unwrap();
    let headers = read_directory_headers(dir.path()).unwrap();

    let check = check_list(dir.path(), "src.list", &headers).unwrap().unwrap();
    assert_eq!(check.pruned_to, Some(5.0));
    assert!(check.inconsistent.is_empty());
    assert!(!check.too_few);

    let kept = Manifest::read(dir.path(), "src.list").unwrap();
    assert_eq!(kept.files, vec!["N1.fits", "N2.fits", "N3.fits"]);
    let backup = Manifest::read(dir.path(), "src.list.bak").unwrap();
    assert_eq!(backup.files, names);
}

#[test]
fn tied_exposure_times_are_fatal() {
    let dir = tempdir().unwrap();
    let names = ["N1.fits", "N2.fits"];
    for (name, exptime) in names.iter().zip([5.0, 300.0]) {
        write_fake_frame(
            dir.path(),
            name,
            &FakeFrame {
                exptime,
                ..Default::default()
            },
        );
    }
    fs::write(dir.path().join("src.list"), names.join("\n")).unwrap();
    let headers = read_directory_headers(dir.path()).unwrap();

    let result = check_list(dir.path(), "src.list", &headers);
    assert!(matches!(
        result,
        Err(CheckDataError::AmbiguousExposureTime { .. })
    ));
    // Nothing was rewritten.
    assert!(!dir.path().join("src.list.bak").exists());
}

#[test]
fn inconsistencies_and_missing_files_are_reported() {
    let dir = tempdir().unwrap();
    write_fake_frame(dir.path(), "N1.fits", &FakeFrame::default());
    write_fake_frame(
        dir.path(),
        "N2.fits",
        &FakeFrame {
            object: "HD 9999",
            ra: 151.0,
            ..Default::default()
        },
    );
    fs::write(dir.path().join("all.list"), "N1.fits\nN2.fits\nN3.fits\n").unwrap();
    let headers = read_directory_headers(dir.path()).unwrap();

    let check = check_list(dir.path(), "all.list", &headers).unwrap().unwrap();
    assert_eq!(check.missing, vec!["N3.fits"]);
    assert_eq!(check.inconsistent, vec![Field::Coords, Field::Object]);
    assert!(check.pruned_to.is_none());
}

#[test]
fn short_object_lists_are_flagged() {
    let dir = tempdir().unwrap();
    write_fake_frame(dir.path(), "N1.fits", &FakeFrame::default());
    fs::write(dir.path().join("src.list"), "N1.fits\n").unwrap();
    let headers = read_directory_headers(dir.path()).unwrap();

    let check = check_list(dir.path(), "src.list", &headers).unwrap().unwrap();
    assert!(check.too_few);

    // A missing list isn't fatal.
    assert!(check_list(dir.path(), "sky.list", &headers).unwrap().is_none());
}

/// Lay out a science, calibration and two telluric directories. The second
/// telluric is closer in time to the science.
fn observation(root: &Path, cal_date: &str) -> ConfigFile {
    let sci = root.join("HD1234/LB_SXD/Science");
    let cal = root.join("HD1234/LB_SXD/Calibrations");
    let tel_far = root.join("HD1234/LB_SXD/Telluric_1");
    let tel_near = root.join("HD1234/LB_SXD/Telluric_2");
    for d in [&sci, &cal, &tel_far, &tel_near] {
        fs::create_dir_all(d.join(INTERMEDIATE_DIR)).unwrap();
    }

    let sci_int = sci.join(INTERMEDIATE_DIR);
    write_fake_frame(&sci_int, "N1.fits", &FakeFrame::default());
    write_fake_frame(&sci_int, "N2.fits", &FakeFrame::default());
    fs::write(sci_int.join("all.list"), "N1.fits\nN2.fits\n").unwrap();
    fs::write(sci_int.join("src.list"), "N1.fits\nN2.fits\n").unwrap();

    let cal_frame = FakeFrame {
        date: cal_date,
        ..Default::default()
    };
    write_fake_frame(
        &cal,
        "N10.fits",
        &FakeFrame {
            obstype: "ARC",
            ..cal_frame.clone()
        },
    );
    write_fake_frame(
        &cal,
        "N11.fits",
        &FakeFrame {
            obstype: "FLAT",
            gcal_lamp: "IRhigh",
            ..cal_frame.clone()
        },
    );
    write_fake_frame(
        &cal,
        "N12.fits",
        &FakeFrame {
            obstype: "FLAT",
            gcal_lamp: "QH",
            ..cal_frame
        },
    );
    fs::write(cal.join("arcs.list"), "N10.fits\n").unwrap();
    fs::write(cal.join("IRflats.list"), "N11.fits\n").unwrap();
    fs::write(cal.join("QHflats.list"), "N12.fits\n").unwrap();

    for (d, time) in [(&tel_far, "06:00:00.0"), (&tel_near, "10:30:00.0")] {
        let int = d.join(INTERMEDIATE_DIR);
        let frame = FakeFrame {
            object: "HIP 5678",
            time,
            ..Default::default()
        };
        write_fake_frame(&int, "N20.fits", &frame);
        write_fake_frame(&int, "N21.fits", &frame);
        fs::write(int.join("all.list"), "N20.fits\nN21.fits\n").unwrap();
        fs::write(int.join("src.list"), "N20.fits\nN21.fits\n").unwrap();
    }

    let mut config = ConfigFile::default();
    config.science_directories.insert(sci, true);
    config.calibration_directories.insert(cal, true);
    config.telluric_directories.insert(tel_far, true);
    config.telluric_directories.insert(tel_near.clone(), true);
    config
}

#[test]
fn closest_telluric_is_picked() {
    let dir = tempdir().unwrap();
    let config = observation(dir.path(), "2012-01-01").parse().unwrap();
    let sci_info = read_directory_headers(
        &config.science_directories[0].path.join(INTERMEDIATE_DIR),
    )
    .unwrap();
    let sci = sci_info.values().next().unwrap();

    let (tdir, dt) = find_telluric(sci, config.enabled_telluric_directories())
        .unwrap()
        .unwrap();
    assert_eq!(
        tdir,
        config.telluric_directories[1].path.join(INTERMEDIATE_DIR)
    );
    assert_eq!(dt, Duration::minutes(30));
}

#[test]
fn whole_check_passes() {
    let dir = tempdir().unwrap();
    let config = observation(dir.path(), "2012-01-01").parse().unwrap();
    let result = run(&config);
    assert!(result.is_ok(), "{:?}", result.err());
}

#[test]
fn calibrations_from_another_night_are_fatal() {
    let dir = tempdir().unwrap();
    let config = observation(dir.path(), "2012-01-02").parse().unwrap();
    let result = run(&config);
    assert!(matches!(
        result,
        Err(CheckDataError::NoMatchingCalibrations(_))
    ));
}
