// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Command-line interface code. Each pipeline stage is a subcommand, and `run`
//! chains all of them.
//!
//! Only 3 things should be public in this module: `GnirsPype`,
//! `GnirsPype::run`, and `PypeError`.

mod common;
mod error;

pub(crate) use common::Warn;
pub use error::PypeError;

use std::{
    borrow::Cow,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use clap::{AppSettings, Args, Parser, Subcommand};
use log::info;

use common::{display_warnings, InfoPrinter, StageArgs, StepArgs};
use crate::{
    baseline, check_data,
    config::{ConfigFile, DirectoryRecord, PypeConfig},
    extract, flux,
    interact::TermPrompter,
    report,
    toolkit::IrafSession,
};

// Add build-time information from the "built" crate.
include!(concat!(env!("OUT_DIR"), "/built.rs"));

/// Where the Gemini IRAF tasks write their logs, relative to where
/// gnirs-pype was started.
const IRAF_LOG: &str = "gnirs.log";

#[derive(Debug, Parser)]
#[clap(
    version,
    author,
    about = r#"Reduction of Gemini GNIRS cross-dispersed spectra, driving IRAF
from baseline calibrations to flux-calibrated spectra and a data sheet"#
)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
#[clap(disable_help_subcommand = true)]
#[clap(infer_subcommands = true)]
#[clap(propagate_version = true)]
#[clap(infer_long_args = true)]
pub struct GnirsPype {
    #[clap(flatten)]
    global_opts: GlobalArgs,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// The verbosity of the program. Increase by specifying multiple times
    /// (e.g. -vv). The default is to print only high-level information.
    #[clap(short, long, parse(from_occurrences))]
    #[clap(global = true)]
    verbosity: u8,

    /// Only verify that the configuration was correctly ingested and print
    /// out high-level information.
    #[clap(long)]
    #[clap(global = true)]
    dry_run: bool,

    /// Save the configuration (with command-line overrides) into a new TOML
    /// file that can be used to reproduce this run.
    #[clap(long)]
    #[clap(global = true)]
    save_toml: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct CalibrateArgs {
    #[clap(flatten)]
    stage: StageArgs,

    #[clap(flatten)]
    steps: StepArgs,
}

#[derive(Debug, Subcommand)]
#[clap(arg_required_else_help = true)]
enum Command {
    #[clap(about = "Check that the science, telluric and calibration directories belong together.")]
    CheckData(StageArgs),

    #[clap(alias = "baseline")]
    #[clap(
        about = "Reduce the baseline calibrations: flats, pinhole traces and the wavelength solution."
    )]
    Calibrate(CalibrateArgs),

    #[clap(about = "Extract 1D spectra of every order of the telluric and science targets.")]
    Extract(StageArgs),

    #[clap(alias = "flux")]
    #[clap(about = "Flux calibrate the science spectra against the telluric standard.")]
    FluxCalibrate(StageArgs),

    #[clap(about = r#"Write a data sheet for each science target. Only available if compiled with the "plotting" feature."#)]
    Report(StageArgs),

    #[clap(about = "Run every stage in order: check-data, calibrate, extract, flux-calibrate, report.")]
    Run(CalibrateArgs),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::CheckData(_) => "check-data",
            Command::Calibrate(_) => "calibrate",
            Command::Extract(_) => "extract",
            Command::FluxCalibrate(_) => "flux-calibrate",
            Command::Report(_) => "report",
            Command::Run(_) => "run",
        }
    }

    /// Read the configuration file and apply this command's overrides.
    fn merge(&self) -> Result<ConfigFile, PypeError> {
        match self {
            Command::CheckData(args)
            | Command::Extract(args)
            | Command::FluxCalibrate(args)
            | Command::Report(args) => args.merge(),
            Command::Calibrate(args) | Command::Run(args) => {
                let mut file = args.stage.merge()?;
                args.steps.apply(&mut file);
                Ok(file)
            }
        }
    }
}

impl GnirsPype {
    pub fn run(self) -> Result<(), PypeError> {
        // Set up logging.
        let GlobalArgs {
            verbosity,
            dry_run,
            save_toml,
        } = self.global_opts;
        setup_logging(verbosity).expect("Failed to initialise logging.");

        // Print the version of gnirs-pype and its build-time information.
        let sub_command = self.command.name();
        info!("gnirs-pype {} {}", sub_command, env!("CARGO_PKG_VERSION"));
        display_build_info();

        let file = self.command.merge()?;
        if let Some(toml) = save_toml {
            save_config(&file, &toml)?;
        }
        let config = file.parse()?;
        display_warnings();
        display_config(&config);

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        let cwd = std::env::current_dir()?;
        let mut toolkit = IrafSession::new(config.iraf_command.clone(), cwd.clone())
            .with_logfile(cwd.join(IRAF_LOG));
        let mut prompter = TermPrompter::new();

        match self.command {
            Command::CheckData(_) => check_data::run(&config)?,
            Command::Calibrate(_) => baseline::run(&config, &mut toolkit, &mut prompter)?,
            Command::Extract(_) => extract::run(&config, &mut toolkit, &mut prompter)?,
            Command::FluxCalibrate(_) => flux::run(&config, &mut prompter)?,
            Command::Report(_) => report::run(&config, &mut toolkit)?,
            Command::Run(_) => {
                check_data::run(&config)?;
                baseline::run(&config, &mut toolkit, &mut prompter)?;
                extract::run(&config, &mut toolkit, &mut prompter)?;
                flux::run(&config, &mut prompter)?;
                report::run(&config, &mut toolkit)?;
            }
        }

        info!("gnirs-pype {} complete.", sub_command);
        Ok(())
    }
}

fn save_config(file: &ConfigFile, path: &Path) -> Result<(), PypeError> {
    let toml_str = toml::to_string(file)
        .map_err(|e| PypeError::Generic(format!("Couldn't serialise the configuration: {e}")))?;
    let mut f = BufWriter::new(File::create(path)?);
    f.write_all(toml_str.as_bytes())?;
    f.flush()?;
    info!("Saved the configuration to {}", path.display());
    Ok(())
}

/// Print what a run will do.
fn display_config(config: &PypeConfig) {
    let mut printer = InfoPrinter::new("gnirs-pype configuration".into());
    printer.push_block(vec![
        format!(
            "Manual mode: {}, overwrite: {}",
            config.manual_mode, config.overwrite
        )
        .into(),
        format!("IRAF: {}", config.iraf_command).into(),
        format!("Runtime data: {}", config.runtime_data.display()).into(),
    ]);
    printer.push_line(
        format!(
            "Calibration steps {} to {}",
            config.calibration.start, config.calibration.stop
        )
        .into(),
    );
    printer.push_line(
        format!(
            "Extraction: {}, aperture radius {}, background {}",
            if config.extraction.use_apall { "apall" } else { "nsextract" },
            config.extraction.aperture_radius,
            config.extraction.subtract_bkg
        )
        .into(),
    );
    printer.push_line(
        format!(
            "Flux calibration: {}, anchored on orders {:?}",
            config.flux.method, config.flux.anchor_orders
        )
        .into(),
    );
    for (title, records) in [
        ("Calibration directories", &config.calibration_directories),
        ("Telluric directories", &config.telluric_directories),
        ("Science directories", &config.science_directories),
    ] {
        printer.push_block(directory_lines(title, records));
    }
    printer.display();
}

fn directory_lines(title: &'static str, records: &[DirectoryRecord]) -> Vec<Cow<'static, str>> {
    let mut lines: Vec<Cow<'static, str>> = Vec::with_capacity(records.len() + 1);
    lines.push(title.into());
    if records.is_empty() {
        lines.push("  (none)".into());
    }
    for record in records {
        let state = if record.enabled { "" } else { " (off)" };
        lines.push(format!("  {}{state}", record.path.display()).into());
    }
    lines
}

/// Activate a logger. All log messages are put onto `stdout`. `env_logger`
/// automatically only uses colours and fancy symbols if we're on a tty (e.g. a
/// terminal); piped output will be formatted sensibly. Source code lines are
/// displayed in log messages when verbosity >= 3.
fn setup_logging(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stdout);
    builder.format_target(false);
    match verbosity {
        0 => builder.filter_level(log::LevelFilter::Info),
        1 => builder.filter_level(log::LevelFilter::Debug),
        2 => builder.filter_level(log::LevelFilter::Trace),
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
            builder.format(|buf, record| {
                let timestamp = buf.timestamp();
                let level = record.level();
                let target = record.target();
                let line = record.line().unwrap_or(0);
                let message = record.args();

                writeln!(buf, "[{timestamp} {level} {target}:{line}] {message}")
            })
        }
    };
    builder.try_init()
}

/// Write many info-level log lines of how this executable was compiled.
fn display_build_info() {
    let dirty = match GIT_DIRTY {
        Some(true) => " (dirty)",
        _ => "",
    };
    match GIT_COMMIT_HASH_SHORT {
        Some(hash) => {
            info!("Compiled on git commit hash: {hash}{dirty}");
        }
        None => info!("Compiled on git commit hash: <no git info>"),
    }
    if let Some(hr) = GIT_HEAD_REF {
        info!("            git head ref: {}", hr);
    }
    info!("            {}", BUILT_TIME_UTC);
    info!("         with compiler {}", RUSTC_VERSION);
    info!("");
}
