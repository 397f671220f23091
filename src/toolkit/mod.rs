// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The image-processing toolkit session.
//!
//! Every reduction step is delegated to toolkit tasks. A [`Task`] is a task
//! name with an ordered set of parameters; a [`Toolkit`] runs tasks in its
//! current working directory. The real implementation is [`IrafSession`],
//! which drives IRAF's `cl`.

mod error;
mod iraf;
#[cfg(test)]
pub(crate) mod mock;
pub(crate) mod parse;
#[cfg(test)]
mod tests;

pub use error::ToolkitError;
pub use iraf::IrafSession;

use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use log::{debug, error};

/// A parameter value of a toolkit task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// The toolkit's "undefined" value.
    Indef,
}

impl Display for TaskValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskValue::Str(s) => write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            TaskValue::Int(i) => write!(f, "{i}"),
            TaskValue::Float(x) => write!(f, "{x:?}"),
            TaskValue::Bool(true) => write!(f, "yes"),
            TaskValue::Bool(false) => write!(f, "no"),
            TaskValue::Indef => write!(f, "INDEF"),
        }
    }
}

impl From<&str> for TaskValue {
    fn from(s: &str) -> Self {
        TaskValue::Str(s.to_string())
    }
}

impl From<String> for TaskValue {
    fn from(s: String) -> Self {
        TaskValue::Str(s)
    }
}

impl From<&String> for TaskValue {
    fn from(s: &String) -> Self {
        TaskValue::Str(s.clone())
    }
}

impl From<&Path> for TaskValue {
    fn from(p: &Path) -> Self {
        TaskValue::Str(p.display().to_string())
    }
}

impl From<i64> for TaskValue {
    fn from(i: i64) -> Self {
        TaskValue::Int(i)
    }
}

impl From<i32> for TaskValue {
    fn from(i: i32) -> Self {
        TaskValue::Int(i.into())
    }
}

impl From<usize> for TaskValue {
    fn from(i: usize) -> Self {
        TaskValue::Int(i as i64)
    }
}

impl From<f64> for TaskValue {
    fn from(x: f64) -> Self {
        TaskValue::Float(x)
    }
}

impl From<bool> for TaskValue {
    fn from(b: bool) -> Self {
        TaskValue::Bool(b)
    }
}

/// A toolkit task invocation: a name, positional arguments and named
/// parameters (kept in insertion order).
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub name: String,
    pub args: Vec<TaskValue>,
    pub params: IndexMap<String, TaskValue>,
}

impl Task {
    pub fn new<S: Into<String>>(name: S) -> Task {
        Task {
            name: name.into(),
            args: vec![],
            params: IndexMap::new(),
        }
    }

    /// Add a positional argument.
    pub fn arg<V: Into<TaskValue>>(mut self, value: V) -> Task {
        self.args.push(value.into());
        self
    }

    /// Add (or replace) a named parameter.
    pub fn param<K: Into<String>, V: Into<TaskValue>>(mut self, key: K, value: V) -> Task {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&TaskValue> {
        self.params.get(key)
    }

    /// The value of a string parameter, if it's there.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.params.get(key) {
            Some(TaskValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Render the task as a command-language call.
    pub fn to_cl(&self) -> String {
        let mut s = self.name.clone();
        for arg in &self.args {
            s.push(' ');
            s.push_str(&arg.to_string());
        }
        for (k, v) in &self.params {
            s.push(' ');
            s.push_str(k);
            s.push('=');
            s.push_str(&v.to_string());
        }
        s
    }
}

/// Whatever a task printed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskOutput {
    pub stdout: Vec<String>,
}

/// A session of the image-processing toolkit. Tasks run in the session's
/// working directory, which is independent of this process's.
pub trait Toolkit {
    fn cwd(&self) -> &Path;

    /// Change the session's working directory. Relative paths are relative to
    /// the current working directory.
    fn chdir(&mut self, dir: &Path) -> Result<(), ToolkitError>;

    fn run(&mut self, task: &Task) -> Result<TaskOutput, ToolkitError>;
}

/// Run `f` with the toolkit in `dir`. The previous working directory is
/// restored afterwards, whether or not `f` succeeded.
pub fn with_directory<T, R, E, F>(toolkit: &mut T, dir: &Path, f: F) -> Result<R, E>
where
    T: Toolkit + ?Sized,
    E: From<ToolkitError>,
    F: FnOnce(&mut T) -> Result<R, E>,
{
    let previous = toolkit.cwd().to_path_buf();
    debug!("Moving to {}", dir.display());
    toolkit.chdir(dir)?;
    let mut guard = scopeguard::guard(toolkit, |toolkit| {
        debug!("Moving back to {}", previous.display());
        if let Err(e) = toolkit.chdir(&previous) {
            error!("Couldn't return to {}: {e}", previous.display());
        }
    });
    f(&mut **guard)
}

/// Resolve `dir` against a working directory.
pub(crate) fn resolve_dir(cwd: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        cwd.join(dir)
    }
}
