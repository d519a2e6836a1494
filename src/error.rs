use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A configuration file, skeleton root, account or topology property is absent
    #[error("{0}: not found")]
    NotFound(String),

    /// Input exists but lacks the expected key or structure
    #[error("failed to parse {what}: {reason}")]
    Parse { what: String, reason: String },

    /// External command exited non-zero; `output` is what it printed
    #[error("{program} failed: {output}")]
    Subprocess { program: String, output: String },

    #[error("bus call failed: {0}")]
    Bus(#[from] zbus::Error),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound(what.into())
    }

    pub fn parse(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Parse {
            what: what.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Missing files surface as `NotFound` so callers can fall back on them
    pub fn from_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(path.display().to_string())
        } else {
            Error::io(path, source)
        }
    }
}

impl From<zbus::fdo::Error> for Error {
    fn from(e: zbus::fdo::Error) -> Self {
        Error::Bus(zbus::Error::from(e))
    }
}
