use std::path::{Path, PathBuf};
use thiserror::Error;

/// Everything that can stop a conversion run
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration file is missing, malformed or inconsistent
    #[error("invalid configuration: {0}")]
    ConfigError(String),
    /// A timetable or the stop catalog cannot be interpreted
    #[error("{file}, row {row}, column {column}: {message}")]
    InputFormatError {
        file: String,
        /// 1-based line in the file
        row: usize,
        /// 1-based column in the file
        column: usize,
        message: String,
    },
    #[error("impossible to access '{}'", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Gtfs(#[from] gtfs_structures::Error),
}

impl Error {
    pub(crate) fn input_format(
        file: &str,
        row: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Error::InputFormatError {
            file: file.to_owned(),
            row,
            column,
            message: message.into(),
        }
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Error::IoError {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
