//! Lay a set of images out as a captioned table grid in a Word document.
//!
//! ```no_run
//! use docx_grid::{GridConfig, GridDocumentBuilder, ImageRef};
//!
//! let images = vec![Some(ImageRef::from_path("a.png")), Some(ImageRef::from_path("b.png"))];
//! let captions = vec!["one".to_string(), "two".to_string()];
//! let config = GridConfig::new(2, 400, 300)?;
//!
//! let doc = GridDocumentBuilder::new(config).build(&images, &captions)?;
//! doc.write_to("grid.docx".as_ref())?;
//! # Ok::<(), docx_grid::GridError>(())
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod image_source;
pub mod inspect;
pub mod layout;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_utils;

pub use builder::{
    build, BuildReport, CellFailure, DocumentBuffer, GridDocumentBuilder, DEFAULT_FILENAME,
    DOCX_CONTENT_TYPE, ERROR_MARKER_PREFIX,
};
pub use config::GridConfig;
pub use error::{EmbedError, GridError, Result};
pub use image_source::{ImageRef, ImageSource};
pub use inspect::{inspect, DocumentSummary};
pub use layout::{blank_placeholders, plan_rows, GridCell, GridRow};
pub use upload::{UploadBatch, MAX_IMAGES};
