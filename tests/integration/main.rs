// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod config;
mod no_stderr;

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};
use indoc::indoc;

fn gnirs_pype() -> Command {
    Command::cargo_bin("gnirs-pype").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

fn make_file_in_dir<T: AsRef<Path>, U: AsRef<Path>>(filename: T, dir: U, contents: &str) -> PathBuf {
    let path = dir.as_ref().join(filename);
    let mut f = File::create(&path).expect("couldn't make file");
    f.write_all(contents.as_bytes()).expect("couldn't write file");
    path
}

/// A configuration with one science observation (and its calibrations and
/// telluric) listed, but switched off.
const OFF_CONFIG: &str = indoc! {r#"
    [defaults]
    manualMode = false
    overwrite = false
    irafCommand = "cl"

    [calibrationReduction]
    Start = 1
    Stop = 5

    [fluxCalibration]
    fluxCalibrationMethod = "telluricapproximate"

    [standards.HIP94510]
    Temperature = 9700.0
    magnitudes = { "3" = 6.52 }

    [CalibrationDirectories]
    "NGC4736/20190301/Calibrations_LB_SXD_32_10" = false

    [ScienceDirectories]
    "NGC4736/LB_SXD_32_10/Science" = false

    [TelluricDirectories]
    "NGC4736/LB_SXD_32_10/Tellurics/obs25" = false
"#};
