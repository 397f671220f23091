// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Common arguments for command-line interfaces. Every stage subcommand reads
//! the same configuration file, and some of its `[defaults]` can be
//! overridden on the command line.

mod printers;

pub(super) use printers::InfoPrinter;
pub(crate) use printers::{display_warnings, Warn};

use std::path::PathBuf;

use clap::Args;
use log::debug;

use super::PypeError;
use crate::config::ConfigFile;

#[derive(Debug, Clone, Default, Args)]
pub(super) struct StageArgs {
    /// The pipeline configuration file. Supported formats: toml, json.
    #[clap(name = "CONFIG_FILE", parse(from_os_str))]
    pub(super) config: PathBuf,

    /// Remove the outputs of previous runs rather than stopping when they're
    /// found. Overrides "overwrite" in [defaults].
    #[clap(long)]
    pub(super) overwrite: bool,

    /// Pause before every step. Overrides "manualMode" in [defaults].
    #[clap(long)]
    pub(super) manual_mode: bool,
}

impl StageArgs {
    /// Read the configuration file and apply the command-line overrides.
    pub(super) fn merge(&self) -> Result<ConfigFile, PypeError> {
        let mut file = ConfigFile::read(&self.config)?;
        if self.overwrite {
            debug!("Overwriting outputs of previous runs (--overwrite)");
            file.defaults.overwrite = true;
        }
        if self.manual_mode {
            debug!("Running in manual mode (--manual-mode)");
            file.defaults.manual_mode = true;
        }
        Ok(file)
    }
}

/// Which baseline-calibration steps to run.
#[derive(Debug, Clone, Default, Args)]
pub(super) struct StepArgs {
    /// The first calibration step to run (1-5). Overrides "Start" in
    /// [calibrationReduction].
    #[clap(long)]
    pub(super) start: Option<i64>,

    /// The last calibration step to run (1-5). Overrides "Stop" in
    /// [calibrationReduction].
    #[clap(long)]
    pub(super) stop: Option<i64>,
}

impl StepArgs {
    pub(super) fn apply(&self, file: &mut ConfigFile) {
        if let Some(start) = self.start {
            debug!("First calibration step: {start} (--start)");
            file.calibration_reduction.start = start;
        }
        if let Some(stop) = self.stop {
            debug!("Last calibration step: {stop} (--stop)");
            file.calibration_reduction.stop = stop;
        }
    }
}
