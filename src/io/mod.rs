// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! File stuff (manifests, FITS headers and images, plain-text spectra,
//! globs, step outputs).

pub(crate) mod fits;
mod glob;
pub(crate) mod manifest;
pub(crate) mod outputs;
pub(crate) mod spectrum;

pub(crate) use self::glob::{glob_in_dir, GlobError};
pub(crate) use fits::FitsError;
pub(crate) use manifest::{Manifest, ManifestError};
pub(crate) use outputs::{prepare_output, prepare_outputs, Outputs, OutputsError};
