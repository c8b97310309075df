use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Required input is missing or unreadable: {path}")]
    MissingInput { path: PathBuf },

    #[error("Expected artifact was not created or is empty: {path}")]
    MissingArtifact { path: PathBuf },

    #[error("Read header lacks barcodelabel=/ccs= markers: {header}")]
    MalformedHeader { header: String },

    #[error("External tool '{tool}' failed: {reason}")]
    ToolFailed { tool: String, reason: String },

    #[error("Malformed row in {path} at line {line}: {msg}")]
    InvalidTable {
        path: PathBuf,
        line: usize,
        msg: String,
    },

    #[error("Invalid FASTQ record at line {line}: {msg}")]
    InvalidFastq { line: usize, msg: String },

    #[error("Invalid FASTA record in {path}: {msg}")]
    InvalidFasta { path: PathBuf, msg: String },

    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),
}

pub type Result<T> = std::result::Result<T, AnnotError>;
