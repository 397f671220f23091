// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Data reduction of Gemini GNIRS cross-dispersed spectra.

The pipeline drives IRAF's Gemini tasks through a [`toolkit::Toolkit`]; each
stage reads a validated [`config::PypeConfig`] and works over the
observation directories it lists.
 */

pub mod baseline;
pub mod check_data;
mod cli;
pub mod config;
pub mod constants;
pub mod extract;
pub mod flux;
pub(crate) mod headers;
pub mod instrument;
pub mod interact;
pub(crate) mod io;
pub mod report;
pub mod toolkit;

// Re-exports.
pub use cli::{GnirsPype, PypeError};
