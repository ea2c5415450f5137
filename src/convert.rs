use std::{
    io::Write,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, instrument, trace};

use crate::report::Reporter;

/// First trailing stderr line must start with this to be a load instruction.
pub const LOAD_COMMAND_PREFIX: &str = "hf mf eload u";

pub const EML_SUFFIX: &str = ".eml";

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("could not start mfubin2eml at {}", .bin.display())]
    Spawn {
        bin: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("mfubin2eml exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
    #[error("could not write eml temporary file")]
    TempFile(#[from] std::io::Error),
    #[error("eml temporary file {} does not exist", .0.display())]
    Missing(PathBuf),
    #[error("didn't get load commands correctly: {0:?}")]
    MalformedCommands(Vec<String>),
}

/// Converted dump on disk plus the command the converter wants run next.
///
/// The file is removed when this is dropped.
#[derive(Debug)]
pub struct EmlArtifact {
    file: NamedTempFile,
    follow_up: String,
}

impl EmlArtifact {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn follow_up(&self) -> &str {
        &self.follow_up
    }
}

/// Wrapper around the external `mfubin2eml` converter.
#[derive(Debug, Clone)]
pub struct Mfubin2eml {
    bin: PathBuf,
}

impl Mfubin2eml {
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into() }
    }

    #[instrument(skip(self, reporter), fields(path = %path.display()))]
    pub fn convert(
        &self,
        path: &Path,
        reporter: &dyn Reporter,
    ) -> Result<EmlArtifact, ConvertError> {
        reporter.info("Invoking mfubin2eml");

        let output = Command::new(&self.bin)
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ConvertError::Spawn {
                bin: self.bin.clone(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        trace!(%stderr, "mfubin2eml finished");

        if !output.status.success() {
            return Err(ConvertError::Failed {
                status: output.status,
                stderr: stderr.trim_end().to_string(),
            });
        }

        let mut file = tempfile::Builder::new().suffix(EML_SUFFIX).tempfile()?;
        reporter.info(&format!("eml path: {}", file.path().display()));
        ensure_exists(file.path())?;

        reporter.info("Writing eml");
        file.write_all(&output.stdout)?;
        file.flush()?;
        debug!(len = output.stdout.len(), "wrote eml");

        let (load, follow_up) = load_commands(&stderr)?;
        debug!(%load, %follow_up, "got device commands");
        ensure_exists(file.path())?;

        Ok(EmlArtifact { file, follow_up })
    }
}

fn ensure_exists(path: &Path) -> Result<(), ConvertError> {
    if path.exists() {
        Ok(())
    } else {
        Err(ConvertError::Missing(path.to_path_buf()))
    }
}

/// Pull the load and follow-up commands off the last two lines of stderr.
pub fn load_commands(stderr: &str) -> Result<(String, String), ConvertError> {
    let lines: Vec<&str> = stderr.lines().collect();
    let tail = &lines[lines.len().saturating_sub(2)..];

    match tail {
        [load, follow_up] if load.starts_with(LOAD_COMMAND_PREFIX) => {
            Ok((load.trim_end().to_string(), follow_up.trim_end().to_string()))
        }
        _ => Err(ConvertError::MalformedCommands(
            tail.iter().map(|line| line.to_string()).collect(),
        )),
    }
}
