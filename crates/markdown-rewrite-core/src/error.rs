use std::io;
use std::path::PathBuf;

use markdown_rewrite_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    NotApplicable = 1,
    InvalidArguments = 2,
    Io = 3,
    Config = 4,
}

impl ExitCode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Success),
            1 => Some(Self::NotApplicable),
            2 => Some(Self::InvalidArguments),
            3 => Some(Self::Io),
            4 => Some(Self::Config),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("failed to read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RewriteError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidArguments(_) => ExitCode::InvalidArguments,
            Self::Read { .. } | Self::Write { .. } | Self::Io(_) => ExitCode::Io,
            Self::Config(_) => ExitCode::Config,
        }
    }
}

pub type RewriteResult<T> = Result<T, RewriteError>;
