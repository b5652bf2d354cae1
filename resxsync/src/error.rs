//! All error types for the resxsync crate.
//!
//! Low-level variants come straight from the parsers; `Read`, `Parse` and `Write`
//! attach the path of the file an operation failed on.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read translation table `{}`: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("failed to parse resource file `{}`: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("failed to write resource file `{}`: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("CSV parse error: {0}")]
    CsvParse(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("invalid translation table: {0}")]
    InvalidTable(String),

    #[error("invalid resource: {0}")]
    InvalidResource(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wraps `source` as a failure to load the translation table at `path`.
    pub fn read(path: impl Into<PathBuf>, source: Error) -> Self {
        Error::Read {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Wraps `source` as a failure to parse the resource file at `path`.
    pub fn parse(path: impl Into<PathBuf>, source: Error) -> Self {
        Error::Parse {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Wraps `source` as a failure to write the resource file at `path`.
    pub fn write(path: impl Into<PathBuf>, source: Error) -> Self {
        Error::Write {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Creates a new configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// True for per-file parse failures, the only errors an error policy may skip.
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse { .. })
    }
}
