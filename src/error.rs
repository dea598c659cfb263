//! Error types for grid document generation.
//!
//! Failures come in two tiers:
//!
//! * [`GridError`] aborts a call. Bad configuration, an upload batch that breaks
//!   the caller policy, or a document that cannot be serialized.
//! * [`EmbedError`] belongs to a single cell. The builder records it in the
//!   [`crate::builder::BuildReport`], writes an error marker into the cell and
//!   keeps going.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors returned by the public API.
#[derive(Debug, Error)]
pub enum GridError {
    /// Column count was zero or negative.
    #[error("Invalid column count: {0} (must be at least 1)")]
    InvalidColumns(i64),

    /// Target size cannot produce a usable aspect ratio.
    #[error("Degenerate target size {width}x{height}")]
    DegenerateTargetSize { width: i64, height: i64 },

    /// Upload batch was empty.
    #[error("Please upload at least one image.")]
    NoImages,

    /// Upload batch exceeded the per-request cap.
    #[error("You can upload a maximum of {max} files (got {count}).")]
    TooManyImages { count: usize, max: usize },

    /// Config file could not be read or parsed.
    #[error("Invalid config '{path}': {reason}")]
    Config { path: PathBuf, reason: String },

    /// docx packaging failed; no buffer is produced.
    #[error("Failed to serialize document: {0}")]
    Serialize(String),

    /// A produced document could not be read back.
    #[error("Failed to inspect document: {0}")]
    Inspect(String),

    /// Filesystem error while writing output.
    #[error("IO error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single image could not be placed in its cell.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("cannot read '{path}': {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{name}' is empty")]
    Empty { name: String },

    #[error("cannot decode '{name}': {reason}")]
    Decode { name: String, reason: String },

    #[error("cannot re-encode '{name}' as PNG: {reason}")]
    Encode { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, GridError>;
