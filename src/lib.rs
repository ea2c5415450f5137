use rand::Rng;
use thiserror::Error;
use tracing::{debug, instrument};

pub mod config;
pub mod convert;
pub mod device;
pub mod report;
pub mod select;

#[cfg(all(test, unix))]
mod testing;

pub use config::Config;
use convert::{ConvertError, Mfubin2eml};
use device::{DeviceError, Proxmark};
use report::Reporter;
use select::SelectError;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Select(#[from] SelectError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error("--process needs the mfubin2eml converter (set MFUBIN2EML)")]
    MissingConverter,
}

/// Broad class of a failure, separating bad input from broken invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Selection,
    Conversion,
    Device,
    Internal,
}

impl ErrorKind {
    /// Process exit status for a run that failed this way.
    ///
    /// Bad input shares clap's usage status; broken invariants use
    /// `EX_SOFTWARE` from sysexits.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Config => 2,
            ErrorKind::Internal => 70,
            ErrorKind::Selection | ErrorKind::Conversion | ErrorKind::Device => 1,
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingConverter | Error::Select(SelectError::WrongSuffix { .. }) => {
                ErrorKind::Config
            }
            Error::Select(_) => ErrorKind::Selection,
            Error::Convert(ConvertError::Missing(_)) => ErrorKind::Internal,
            Error::Convert(_) => ErrorKind::Conversion,
            Error::Device(DeviceError::NotEml(_)) => ErrorKind::Internal,
            Error::Device(_) => ErrorKind::Device,
        }
    }
}

/// Pick an amiibo, load it onto the device and start simulating it.
#[instrument(skip_all, fields(source = %config.source.display()))]
pub fn run<R: Rng + ?Sized>(
    config: &Config,
    reporter: &dyn Reporter,
    rng: &mut R,
) -> Result<(), Error> {
    let amiibo = select::select(&config.source, config.suffix(), config.single, rng)?;
    debug!(amiibo = %amiibo.display(), "selected amiibo");
    if config.reveal {
        reporter.info(&format!("Loading {}", amiibo.display()));
    }

    let proxmark = Proxmark::new(&config.proxmark, &config.device, config.load_format);

    if config.process {
        let converter = config
            .mfubin2eml
            .as_ref()
            .map(Mfubin2eml::new)
            .ok_or(Error::MissingConverter)?;

        let eml = converter.convert(&amiibo, reporter)?;
        proxmark.load_eml(eml.path(), reporter)?;
        proxmark.run(eml.follow_up(), reporter)?;
    } else {
        proxmark.load_eml(&amiibo, reporter)?;
        proxmark.simulate(reporter)?;
    }

    Ok(())
}
