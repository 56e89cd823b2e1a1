//! Module for the error management
use thiserror::Error;

/// Specific line from a CSV file that could not be read
#[derive(Debug)]
pub struct LineError {
    /// Headers of the CSV file
    pub headers: Vec<String>,
    /// Values of the line that could not be parsed
    pub values: Vec<String>,
}

/// An error that can occur when reading or writing GTFS data.
#[derive(Error, Debug)]
pub enum Error {
    /// A mandatory file is not present in the archive or directory
    #[error("Cound not find file {0}")]
    MissingFile(String),
    /// A table references an Id that is not present
    #[error("The id {0} is not known")]
    ReferenceError(String),
    /// An Id is used by two objects of the same table
    #[error("The id {0} is defined more than once")]
    DuplicateId(String),
    /// The given path to the GTFS is neither a file nor a directory
    #[error("Could not read GTFS: {0} is neither a file nor a directory")]
    NotFileNorDirectory(String),
    /// The time is not given in the HH:MM:SS format
    #[error("'{0}' is not a valid time; HH:MM:SS format is expected.")]
    InvalidTime(String),
    /// Generic Input/Output error while reading or writing a file
    #[error("impossible to access file")]
    IO(#[from] std::io::Error),
    /// Impossible to read or write a named file
    #[error("impossible to access '{file_name}'")]
    NamedFileIO {
        /// The file name that could not be read or written
        file_name: String,
        /// The inital error that caused the unability to access the file
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Impossible to read or write a CSV file
    #[error("impossible to process csv file '{file_name}'")]
    CSVError {
        /// File name that could not be processed as CSV
        file_name: String,
        /// The initial error by the csv library
        #[source]
        source: csv::Error,
        /// The line that could not be parsed by the csv library
        line_in_error: Option<LineError>,
    },
    /// Error when reading or writing a GTFS archive
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}
