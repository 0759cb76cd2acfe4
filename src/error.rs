use snafu::Snafu;
use std::path::PathBuf;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("could not open DICOM file {}", path.display()))]
    OpenFile {
        path: PathBuf,
        source: dicom::object::ReadError,
    },

    #[snafu(display("could not read instance records from {}", path.display()))]
    ReadRecords {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("malformed instance records in {}", path.display()))]
    ParseRecords {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[snafu(display("skipping instance record #{index} in {}", path.display()))]
    InvalidRecord {
        path: PathBuf,
        index: usize,
        source: serde_json::Error,
    },

    /// Unknown attribute keyword `{keyword}` in split rule
    UnknownKeyword { keyword: String },

    /// Unknown split criterion `{criterion}` (expected `presence` or `value`)
    UnknownCriterion { criterion: String },

    /// A SOP class handler must have a name
    UnnamedHandler,

    /// A SOP class handler named `{name}` is already registered
    DuplicateHandler { name: String },

    /// SOP class handler `{name}` declares no SOP classes
    NoSopClasses { name: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
