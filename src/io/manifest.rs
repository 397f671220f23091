// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Manifests: plain-text lists of FITS file names, one per line, naming the
//! frames of one category (arcs, flats, source frames, ...) in a directory.

use std::{
    fs::{self, File},
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use log::debug;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Manifest {
    /// The list file itself.
    pub(crate) path: PathBuf,

    /// The listed file names, in order. Blank lines are dropped.
    pub(crate) files: Vec<String>,
}

impl Manifest {
    /// Read `name` inside `dir`. A missing or empty manifest is an error.
    pub(crate) fn read(dir: &Path, name: &str) -> Result<Manifest, ManifestError> {
        let path = dir.join(name);
        let manifest = Manifest::read_allow_empty(&path)?;
        if manifest.files.is_empty() {
            return Err(ManifestError::Empty { path });
        }
        Ok(manifest)
    }

    /// Read a manifest that may legitimately be empty.
    pub(crate) fn read_allow_empty(path: &Path) -> Result<Manifest, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::Missing {
                path: path.to_path_buf(),
            });
        }
        let fh = File::open(path).map_err(|err| ManifestError::Io {
            path: path.to_path_buf(),
            err,
        })?;
        let mut files = vec![];
        for line in BufReader::new(fh).lines() {
            let line = line.map_err(|err| ManifestError::Io {
                path: path.to_path_buf(),
                err,
            })?;
            let line = line.trim();
            if !line.is_empty() {
                files.push(line.to_string());
            }
        }
        debug!("Read {} entries from {}", files.len(), path.display());
        Ok(Manifest {
            path: path.to_path_buf(),
            files,
        })
    }

    /// Write a new manifest from scratch.
    pub(crate) fn write(path: &Path, files: &[String]) -> Result<Manifest, ManifestError> {
        let manifest = Manifest {
            path: path.to_path_buf(),
            files: files.to_vec(),
        };
        manifest.write_to_disk()?;
        Ok(manifest)
    }

    /// Copy the manifest to `<name>.bak`, then replace its contents with
    /// `files`.
    pub(crate) fn rewrite_with_backup(&mut self, files: Vec<String>) -> Result<(), ManifestError> {
        let backup = self.backup_path();
        fs::copy(&self.path, &backup).map_err(|err| ManifestError::Io {
            path: backup.clone(),
            err,
        })?;
        debug!("Backed up {} to {}", self.path.display(), backup.display());
        self.files = files;
        self.write_to_disk()
    }

    pub(crate) fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".bak");
        PathBuf::from(name)
    }

    /// The directory containing the manifest, which is also where the listed
    /// files live.
    pub(crate) fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// The full paths of the listed files. Names without a `.fits` extension
    /// get one.
    pub(crate) fn file_paths(&self) -> Vec<PathBuf> {
        let dir = self.dir();
        self.files.iter().map(|f| dir.join(with_fits(f))).collect()
    }

    pub(crate) fn first(&self) -> Option<&str> {
        self.files.first().map(|s| s.as_str())
    }

    pub(crate) fn last(&self) -> Option<&str> {
        self.files.last().map(|s| s.as_str())
    }

    fn write_to_disk(&self) -> Result<(), ManifestError> {
        let mut fh = File::create(&self.path).map_err(|err| ManifestError::Io {
            path: self.path.clone(),
            err,
        })?;
        for f in &self.files {
            writeln!(fh, "{f}").map_err(|err| ManifestError::Io {
                path: self.path.clone(),
                err,
            })?;
        }
        Ok(())
    }
}

/// Add a `.fits` extension to a file name if it doesn't have one.
pub(crate) fn with_fits(name: &str) -> String {
    if name.ends_with(".fits") {
        name.to_string()
    } else {
        format!("{name}.fits")
    }
}

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Required list {path} does not exist")]
    Missing { path: PathBuf },

    #[error("Required list {path} is empty")]
    Empty { path: PathBuf },

    #[error("IO error on list {path}: {err}")]
    Io { path: PathBuf, err: std::io::Error },
}
