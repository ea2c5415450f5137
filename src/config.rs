use std::path::PathBuf;

use clap::Parser;

use crate::{convert::EML_SUFFIX, device::LoadFormat};

/// Raw amiibo dumps, as fed to mfubin2eml.
pub const BIN_SUFFIX: &str = ".bin";

pub const DEFAULT_DEVICE: &str = "/dev/ttyACM0";

/// Load random amiibo
#[derive(Parser, Debug, Clone)]
#[command(name = "amiibo-roulette", version)]
pub struct Config {
    /// Source of amiibo to load
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Load the specified amiibo instead of random one
    #[arg(long)]
    pub single: bool,

    /// Tell you which amiibo is being loaded if you hate surprises
    #[arg(long)]
    pub reveal: bool,

    /// Use the specified device
    #[arg(long, value_name = "PATH", default_value = DEFAULT_DEVICE)]
    pub device: String,

    /// Source holds raw .bin dumps that need converting to eml first
    #[arg(long)]
    pub process: bool,

    /// Spelling of the emulator load command
    #[arg(long, value_enum, default_value_t = LoadFormat::Mfu)]
    pub load_format: LoadFormat,

    /// Path to the mfubin2eml converter
    #[arg(long, env = "MFUBIN2EML", value_name = "PATH", required_if_eq("process", "true"))]
    pub mfubin2eml: Option<PathBuf>,

    /// Path to the proxmark client
    #[arg(long, env = "PROXMARK", value_name = "PATH")]
    pub proxmark: PathBuf,

    /// Tracing filter for diagnostics on stderr
    #[arg(short = 'l', long = "log", env = "RUST_LOG", value_name = "FILTER")]
    pub rust_log: Option<String>,
}

impl Config {
    /// Suffix the selected file has to carry.
    pub fn suffix(&self) -> &'static str {
        if self.process { BIN_SUFFIX } else { EML_SUFFIX }
    }
}
