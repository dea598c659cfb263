//! Caller-side upload workflow.
//!
//! Collects the images of one "generate document" request, enforces the upload
//! cap, assigns default captions and lets the user override them before the
//! builder runs once.

use std::path::PathBuf;

use log::{debug, warn};

use crate::builder::{DocumentBuffer, GridDocumentBuilder};
use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::image_source::ImageRef;
use crate::layout::blank_placeholders;

pub const MAX_IMAGES: usize = 12;

#[derive(Debug, Clone)]
pub struct UploadBatch {
    images: Vec<Option<ImageRef>>,
    captions: Vec<String>,
}

impl UploadBatch {
    pub fn new(images: Vec<ImageRef>) -> Result<Self> {
        match images.len() {
            0 => return Err(GridError::NoImages),
            count if count > MAX_IMAGES => {
                return Err(GridError::TooManyImages {
                    count,
                    max: MAX_IMAGES,
                })
            }
            _ => {}
        }

        let captions = (1..=images.len()).map(default_caption).collect();
        debug!("Accepted upload batch of {} images", images.len());
        Ok(Self {
            images: images.into_iter().map(Some).collect(),
            captions,
        })
    }

    pub fn from_paths<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::new(paths.into_iter().map(ImageRef::from_path).collect())
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn captions(&self) -> &[String] {
        &self.captions
    }

    /// Replace captions in order. Slots without an override keep their default.
    pub fn apply_captions<I, S>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut extra = 0;
        for (index, caption) in overrides.into_iter().enumerate() {
            match self.captions.get_mut(index) {
                Some(slot) => *slot = caption.into(),
                None => extra += 1,
            }
        }
        if extra > 0 {
            warn!("Ignoring {} captions without a matching image", extra);
        }
    }

    /// Replace a single caption. Returns `false` if `index` is out of range.
    pub fn set_caption(&mut self, index: usize, caption: impl Into<String>) -> bool {
        match self.captions.get_mut(index) {
            Some(slot) => {
                *slot = caption.into();
                true
            }
            None => false,
        }
    }

    /// Blank preview cells needed to complete the last row.
    pub fn blank_placeholders(&self, columns: u32) -> usize {
        blank_placeholders(self.images.len(), columns as usize)
    }

    pub fn generate(&self, config: GridConfig) -> Result<DocumentBuffer> {
        GridDocumentBuilder::new(config).build(&self.images, &self.captions)
    }
}

fn default_caption(position: usize) -> String {
    format!("Image {position}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("{i}.png"))).collect()
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert!(matches!(
            UploadBatch::from_paths(paths(0)),
            Err(GridError::NoImages)
        ));
    }

    #[test]
    fn test_cap_enforced() {
        assert!(UploadBatch::from_paths(paths(MAX_IMAGES)).is_ok());
        assert!(matches!(
            UploadBatch::from_paths(paths(MAX_IMAGES + 1)),
            Err(GridError::TooManyImages { count: 13, max: 12 })
        ));
    }

    #[test]
    fn test_default_captions() {
        let batch = UploadBatch::from_paths(paths(3)).unwrap();
        assert_eq!(batch.captions(), ["Image 1", "Image 2", "Image 3"]);
    }

    #[test]
    fn test_caption_overrides() {
        let mut batch = UploadBatch::from_paths(paths(3)).unwrap();
        batch.apply_captions(["first", "second", "third", "extra"]);
        assert_eq!(batch.captions(), ["first", "second", "third"]);

        let mut batch = UploadBatch::from_paths(paths(3)).unwrap();
        batch.apply_captions(["only"]);
        assert_eq!(batch.captions(), ["only", "Image 2", "Image 3"]);

        assert!(batch.set_caption(2, "last"));
        assert!(!batch.set_caption(3, "nope"));
        assert_eq!(batch.captions()[2], "last");
    }

    #[test]
    fn test_blank_placeholders() {
        let batch = UploadBatch::from_paths(paths(5)).unwrap();
        assert_eq!(batch.blank_placeholders(3), 1);
        assert_eq!(batch.blank_placeholders(5), 0);
    }
}
