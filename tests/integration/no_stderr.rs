// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use tempfile::TempDir;

use crate::{get_cmd_output, gnirs_pype, make_file_in_dir, OFF_CONFIG};

#[test]
fn test_dry_run_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let config = make_file_in_dir("config.toml", tmp_dir.path(), OFF_CONFIG);
    let cmd = gnirs_pype()
        .args(["run", &format!("{}", config.display()), "--dry-run"])
        .ok();
    assert!(cmd.is_ok(), "run --dry-run failed: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_check_data_no_stderr() {
    // With every directory switched off, check-data has nothing to check and
    // never needs IRAF.
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let config = make_file_in_dir("config.toml", tmp_dir.path(), OFF_CONFIG);
    let cmd = gnirs_pype()
        .current_dir(tmp_dir.path())
        .args(["check-data", &format!("{}", config.display())])
        .ok();
    assert!(cmd.is_ok(), "check-data failed: {}", cmd.err().unwrap());
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
    assert!(stdout.contains("check-data complete"), "{stdout}");
}
