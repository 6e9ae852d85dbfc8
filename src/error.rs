use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Reasons a detection event is refused. All of them are the camera's fault:
/// `TooLarge` is answered with 413, everything else with 400.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: u64 },
    #[error("unable to read request body: {0}")]
    Body(#[from] warp::Error),
    #[error("request body is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("request body is not well-formed XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("missing required field {0}")]
    MissingField(&'static str),
    #[error("invalid value {value:?} for field {field}")]
    InvalidValue { field: &'static str, value: String },
    #[error("unknown {table} code {code:?}")]
    Lookup { table: &'static str, code: String },
    #[error("multipart body has no XML part")]
    MissingMetadata,
    #[error("unable to read multipart body: {0}")]
    Multipart(#[from] multer::Error),
}

/// Failure to persist one picture. These never fail the request.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unable to create directory {path:?}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("directory {path:?} could not be created")]
    DirectoryUnavailable { path: PathBuf },
    #[error("filename {original:?} is empty once sanitized")]
    EmptyFilename { original: String },
    #[error("unable to write {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
}
