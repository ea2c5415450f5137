use std::{
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};

use clap::ValueEnum;
use thiserror::Error;
use tracing::{debug, instrument, trace, warn};

use crate::{convert::EML_SUFFIX, report::Reporter, select::has_suffix};

/// Starts emulating whatever tag image was last loaded.
pub const SIMULATE_COMMAND: &str = "hf mfu sim -t 7";

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("{} is not an eml file", .0.display())]
    NotEml(PathBuf),
    #[error("could not start proxmark client at {}", .bin.display())]
    Spawn {
        bin: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` failed with {status}")]
    Failed { command: String, status: ExitStatus },
}

/// How the emulator memory load command is spelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LoadFormat {
    /// `hf mfu eload -f <path>`
    #[default]
    Mfu,
    /// `hf mf eload u <path without .eml>`
    Mf,
}

impl LoadFormat {
    pub fn command(self, eml: &Path) -> String {
        let eml = eml.to_string_lossy();

        match self {
            LoadFormat::Mfu => format!("hf mfu eload -f {eml}"),
            LoadFormat::Mf => {
                let base = eml.strip_suffix(EML_SUFFIX).unwrap_or(&eml);
                format!("hf mf eload u {base}")
            }
        }
    }
}

/// Drives the Proxmark client one command per process.
#[derive(Debug, Clone)]
pub struct Proxmark {
    bin: PathBuf,
    device: String,
    load_format: LoadFormat,
}

impl Proxmark {
    pub fn new(
        bin: impl Into<PathBuf>,
        device: impl Into<String>,
        load_format: LoadFormat,
    ) -> Self {
        Self {
            bin: bin.into(),
            device: device.into(),
            load_format,
        }
    }

    pub fn load_eml(&self, path: &Path, reporter: &dyn Reporter) -> Result<(), DeviceError> {
        if !has_suffix(path, EML_SUFFIX) {
            return Err(DeviceError::NotEml(path.to_path_buf()));
        }

        self.run(&self.load_format.command(path), reporter)
    }

    pub fn simulate(&self, reporter: &dyn Reporter) -> Result<(), DeviceError> {
        self.run(SIMULATE_COMMAND, reporter)
    }

    /// Run a single client command against the device and wait for it.
    #[instrument(skip(self, reporter), fields(device = %self.device))]
    pub fn run(&self, command: &str, reporter: &dyn Reporter) -> Result<(), DeviceError> {
        reporter.info(command);

        let output = Command::new(&self.bin)
            .arg(&self.device)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| DeviceError::Spawn {
                bin: self.bin.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        reporter.info(stdout.trim_end());
        trace!(stderr = %String::from_utf8_lossy(&output.stderr), "client stderr");
        debug!(status = %output.status, "client exited");

        if !output.status.success() {
            warn!(status = %output.status, "client reported failure");
            return Err(DeviceError::Failed {
                command: command.to_string(),
                status: output.status,
            });
        }

        Ok(())
    }
}
