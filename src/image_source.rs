use std::fmt;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use log::debug;

use crate::error::EmbedError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes { name: String, data: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    source: ImageSource,
    dimensions: Option<(u32, u32)>,
}

/// A decoded image, re-encoded as PNG for the document package.
#[derive(Debug)]
pub struct LoadedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ImageRef {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: ImageSource::Path(path.into()),
            dimensions: None,
        }
    }

    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            source: ImageSource::Bytes {
                name: name.into(),
                data,
            },
            dimensions: None,
        }
    }

    /// Record pixel dimensions known by the caller (e.g. from an upload form).
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Some((width, height));
        self
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }

    pub fn name(&self) -> String {
        match &self.source {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Bytes { name, .. } => name.clone(),
        }
    }

    pub fn load(&self) -> Result<LoadedImage, EmbedError> {
        let name = self.name();
        let raw = match &self.source {
            ImageSource::Path(path) => read_path(path)?,
            ImageSource::Bytes { data, .. } => data.clone(),
        };
        if raw.is_empty() {
            return Err(EmbedError::Empty { name });
        }

        let decoded = image::load_from_memory(&raw).map_err(|e| EmbedError::Decode {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        let (width, height) = (decoded.width(), decoded.height());

        let mut png = Vec::new();
        decoded
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| EmbedError::Encode {
                name: name.clone(),
                reason: e.to_string(),
            })?;

        debug!(
            "Loaded {} ({}x{} px, {} bytes as PNG)",
            name,
            width,
            height,
            png.len()
        );
        Ok(LoadedImage { png, width, height })
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

fn read_path(path: &Path) -> Result<Vec<u8>, EmbedError> {
    fs::read(path).map_err(|source| EmbedError::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}
