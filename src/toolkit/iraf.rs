// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! An IRAF session driven through its command language (`cl`).
//!
//! Each task runs in a fresh `cl` process started in the session's working
//! directory. The script given to `cl` loads the Gemini packages, sets the
//! session-wide options, resets the task's parameters and then runs it.

use std::{
    io::Write,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use log::{debug, trace};

use super::{resolve_dir, Task, TaskOutput, Toolkit, ToolkitError};

/// The packages loaded before every task.
const PACKAGES: [&str; 4] = ["gemini", "gemtools", "gnirs", "onedspec"];

#[derive(Debug)]
pub struct IrafSession {
    /// The `cl` executable.
    command: String,

    cwd: PathBuf,

    /// Where the Gemini tasks write their logs. Relative paths are relative to
    /// each task's working directory.
    logfile: Option<PathBuf>,
}

impl IrafSession {
    pub fn new<S: Into<String>>(command: S, cwd: PathBuf) -> IrafSession {
        IrafSession {
            command: command.into(),
            cwd,
            logfile: None,
        }
    }

    pub fn with_logfile(mut self, logfile: PathBuf) -> IrafSession {
        self.logfile = Some(logfile);
        self
    }

    /// The command-language script that runs a task.
    pub(crate) fn script(&self, task: &Task) -> String {
        let mut script = String::new();
        for package in PACKAGES {
            script.push_str(package);
            script.push('\n');
        }
        script.push_str("set stdimage=imt1024\n");
        script.push_str("reset clobber=yes\n");
        match &self.logfile {
            Some(l) => script.push_str(&format!("nsheaders \"gnirs\" logfile=\"{}\"\n", l.display())),
            None => script.push_str("nsheaders \"gnirs\"\n"),
        }
        script.push_str(&format!("unlearn {}\n", task.name));
        script.push_str(&task.to_cl());
        script.push('\n');
        script.push_str("logout\n");
        script
    }
}

impl Toolkit for IrafSession {
    fn cwd(&self) -> &Path {
        &self.cwd
    }

    fn chdir(&mut self, dir: &Path) -> Result<(), ToolkitError> {
        let new = resolve_dir(&self.cwd, dir);
        if !new.is_dir() {
            return Err(ToolkitError::NotADirectory(new));
        }
        self.cwd = new;
        Ok(())
    }

    fn run(&mut self, task: &Task) -> Result<TaskOutput, ToolkitError> {
        let script = self.script(task);
        debug!("Running IRAF task in {}: {}", self.cwd.display(), task.to_cl());
        trace!("cl script:\n{script}");

        let mut child = Command::new(&self.command)
            .current_dir(&self.cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| ToolkitError::Spawn {
                command: self.command.clone(),
                err,
            })?;

        let io_err = |err| ToolkitError::Io {
            task: task.name.clone(),
            err,
        };
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(script.as_bytes()).map_err(io_err)?;
        }
        let output = child.wait_with_output().map_err(io_err)?;

        let stdout: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|l| l.to_string())
            .collect();
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in &stdout {
            trace!("{}: {line}", task.name);
        }

        let errors = stdout
            .iter()
            .map(|l| l.as_str())
            .chain(stderr.lines())
            .filter(|l| l.contains("ERROR"))
            .collect::<Vec<_>>();
        if !errors.is_empty() {
            return Err(ToolkitError::TaskFailed {
                task: task.name.clone(),
                message: errors.join("\n"),
            });
        }
        if !output.status.success() {
            return Err(ToolkitError::ExitStatus {
                task: task.name.clone(),
                status: output.status.to_string(),
            });
        }

        Ok(TaskOutput { stdout })
    }
}
