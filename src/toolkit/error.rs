// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from driving the image-processing toolkit.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolkitError {
    #[error("Couldn't start the toolkit command '{command}': {err}")]
    Spawn {
        command: String,
        err: std::io::Error,
    },

    #[error("IO error talking to the toolkit while running '{task}': {err}")]
    Io { task: String, err: std::io::Error },

    #[error("Toolkit task '{task}' failed:\n{message}")]
    TaskFailed { task: String, message: String },

    #[error("The toolkit exited with status {status} while running '{task}'")]
    ExitStatus { task: String, status: String },

    #[error("Can't change the toolkit's working directory to {0}: not a directory")]
    NotADirectory(PathBuf),
}
