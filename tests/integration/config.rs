// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reading configuration files from the command line.

use tempfile::TempDir;

use crate::{get_cmd_output, gnirs_pype, make_file_in_dir, OFF_CONFIG};

#[test]
fn help_lists_every_stage() {
    let cmd = gnirs_pype().arg("--help").ok();
    assert!(cmd.is_ok(), "{:?}", cmd.err());
    let (stdout, _) = get_cmd_output(cmd);
    for stage in [
        "check-data",
        "calibrate",
        "extract",
        "flux-calibrate",
        "report",
        "run",
    ] {
        assert!(stdout.contains(stage), "{stage} missing from help:\n{stdout}");
    }
}

#[test]
fn dry_run_prints_the_configuration() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let config = make_file_in_dir("config.toml", tmp_dir.path(), OFF_CONFIG);

    #[rustfmt::skip]
    let cmd = gnirs_pype()
        .current_dir(tmp_dir.path())
        .args([
            "calibrate", &format!("{}", config.display()),
            "--start", "2",
            "--stop", "4",
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "dry run failed: {:?}", cmd.err());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Calibration steps 2 to 4"), "{stdout}");
    assert!(stdout.contains("NGC4736/LB_SXD_32_10/Science (off)"), "{stdout}");
    assert!(stdout.contains("No science directories are enabled"), "{stdout}");
    assert!(stdout.contains("Dry run"), "{stdout}");
    // Nothing ran, so IRAF never logged anything.
    assert!(!tmp_dir.path().join("gnirs.log").exists());
}

#[test]
fn save_toml_round_trips() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let config = make_file_in_dir("config.toml", tmp_dir.path(), OFF_CONFIG);
    let saved = tmp_dir.path().join("saved.toml");

    #[rustfmt::skip]
    let cmd = gnirs_pype()
        .args([
            "extract", &format!("{}", config.display()),
            "--overwrite",
            "--dry-run",
            "--save-toml", &format!("{}", saved.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "saving failed: {:?}", cmd.err());
    assert!(saved.exists());

    // The saved file includes the override, and is itself a usable
    // configuration.
    let contents = std::fs::read_to_string(&saved).unwrap();
    assert!(contents.contains("overwrite = true"), "{contents}");
    let cmd = gnirs_pype()
        .args(["report", &format!("{}", saved.display()), "--dry-run"])
        .ok();
    assert!(cmd.is_ok(), "reading the saved file failed: {:?}", cmd.err());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("overwrite: true"), "{stdout}");
}

#[test]
fn missing_config_is_an_error() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let config = tmp_dir.path().join("nope.toml");
    let cmd = gnirs_pype()
        .args(["check-data", &format!("{}", config.display())])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Couldn't read the configuration file"), "{stderr}");
}

#[test]
fn unknown_flux_method_is_an_error() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let config = make_file_in_dir(
        "config.toml",
        tmp_dir.path(),
        &OFF_CONFIG.replace("telluricapproximate", "magic"),
    );
    let cmd = gnirs_pype()
        .args(["flux-calibrate", &format!("{}", config.display()), "--dry-run"])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Unknown flux calibration method 'magic'"), "{stderr}");
}

#[test]
fn steps_are_only_for_calibration() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let config = make_file_in_dir("config.toml", tmp_dir.path(), OFF_CONFIG);
    let cmd = gnirs_pype()
        .args(["extract", &format!("{}", config.display()), "--start", "2"])
        .ok();
    assert!(cmd.is_err());
}
