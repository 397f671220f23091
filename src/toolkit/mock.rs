// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A toolkit that records calls instead of running anything. Handlers can be
//! registered per task to create the files a real task would.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use super::{resolve_dir, Task, TaskOutput, Toolkit, ToolkitError};

type Handler = Box<dyn FnMut(&Path, &Task) -> Result<TaskOutput, ToolkitError>>;

pub(crate) struct MockToolkit {
    cwd: PathBuf,
    pub(crate) calls: Vec<(PathBuf, Task)>,
    handlers: HashMap<String, Handler>,
}

impl MockToolkit {
    pub(crate) fn new(cwd: &Path) -> MockToolkit {
        MockToolkit {
            cwd: cwd.to_path_buf(),
            calls: vec![],
            handlers: HashMap::new(),
        }
    }

    /// Run `handler` whenever `task` is run.
    pub(crate) fn on<F>(&mut self, task: &str, handler: F)
    where
        F: FnMut(&Path, &Task) -> Result<TaskOutput, ToolkitError> + 'static,
    {
        self.handlers.insert(task.to_string(), Box::new(handler));
    }

    /// Create `files` (relative to the working directory) whenever `task` is
    /// run.
    pub(crate) fn creates(&mut self, task: &str, files: &[&str]) {
        let files: Vec<String> = files.iter().map(|f| f.to_string()).collect();
        self.on(task, move |cwd, _| {
            for f in &files {
                touch(&cwd.join(f));
            }
            Ok(TaskOutput::default())
        });
    }

    pub(crate) fn task_names(&self) -> Vec<&str> {
        self.calls.iter().map(|(_, t)| t.name.as_str()).collect()
    }

    pub(crate) fn calls_to(&self, name: &str) -> Vec<&Task> {
        self.calls
            .iter()
            .filter(|(_, t)| t.name == name)
            .map(|(_, t)| t)
            .collect()
    }
}

/// Create an empty file (and its parent directories).
pub(crate) fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, "").unwrap();
}

impl Toolkit for MockToolkit {
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
        self.calls.push((self.cwd.clone(), task.clone()));
        match self.handlers.get_mut(&task.name) {
            Some(handler) => handler(&self.cwd, task),
            None => Ok(TaskOutput::default()),
        }
    }
}
