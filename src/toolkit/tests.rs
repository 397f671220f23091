// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use tempfile::tempdir;

use super::{mock::MockToolkit, *};

#[test]
fn task_renders_in_order() {
    let task = Task::new("nsextract")
        .arg("src_comb.fits")
        .param("outprefix", "x")
        .param("line", 700)
        .param("upper", 12.0)
        .param("lower", -12.0)
        .param("fl_apall", true)
        .param("ylevel", TaskValue::Indef);
    assert_eq!(
        task.to_cl(),
        "nsextract \"src_comb.fits\" outprefix=\"x\" line=700 upper=12.0 lower=-12.0 fl_apall=yes ylevel=INDEF"
    );
    assert_eq!(task.get_str("outprefix"), Some("x"));
    assert_eq!(task.get("fl_apall"), Some(&TaskValue::Bool(true)));
}

#[test]
fn strings_are_quoted() {
    let task = Task::new("hedit").param("value", "say \"hi\"");
    assert_eq!(task.to_cl(), "hedit value=\"say \\\"hi\\\"\"");
}

#[test]
fn session_script_loads_packages_first() {
    let session = IrafSession::new("cl", PathBuf::from("/tmp"));
    let script = session.script(&Task::new("nsflat").param("flatfile", "QHflat.fits"));
    let lines: Vec<&str> = script.lines().collect();
    assert_eq!(&lines[..4], &["gemini", "gemtools", "gnirs", "onedspec"]);
    assert!(lines.contains(&"reset clobber=yes"));
    assert_eq!(lines[lines.len() - 3], "unlearn nsflat");
    assert_eq!(lines[lines.len() - 2], "nsflat flatfile=\"QHflat.fits\"");
    assert_eq!(lines[lines.len() - 1], "logout");
}

#[test]
fn with_directory_restores_on_success() {
    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join("Intermediate")).unwrap();
    let mut toolkit = MockToolkit::new(dir.path());

    let result: Result<(), ToolkitError> =
        with_directory(&mut toolkit, Path::new("Intermediate"), |t| {
            assert_eq!(t.cwd(), dir.path().join("Intermediate"));
            t.run(&Task::new("imcopy"))?;
            Ok(())
        });
    assert!(result.is_ok());
    assert_eq!(toolkit.cwd(), dir.path());
    assert_eq!(toolkit.calls[0].0, dir.path().join("Intermediate"));
}

#[test]
fn with_directory_restores_on_error() {
    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join("Intermediate")).unwrap();
    let mut toolkit = MockToolkit::new(dir.path());
    toolkit.on("nsflat", |_, t| {
        Err(ToolkitError::TaskFailed {
            task: t.name.clone(),
            message: "ERROR - NSFLAT: no flats".to_string(),
        })
    });

    let result = with_directory(&mut toolkit, &dir.path().join("Intermediate"), |t| {
        t.run(&Task::new("nsflat"))
    });
    assert!(matches!(result, Err(ToolkitError::TaskFailed { .. })));
    assert_eq!(toolkit.cwd(), dir.path());
}

#[test]
fn chdir_to_nowhere_fails() {
    let dir = tempdir().unwrap();
    let mut toolkit = MockToolkit::new(dir.path());
    let result = with_directory(&mut toolkit, Path::new("missing"), |_| {
        Ok::<(), ToolkitError>(())
    });
    assert!(matches!(result, Err(ToolkitError::NotADirectory(_))));
    assert_eq!(toolkit.cwd(), dir.path());
}
