use itertools::{EitherOrBoth, Itertools};

use crate::error::{GridError, Result};
use crate::image_source::ImageRef;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell<'a> {
    pub image: Option<&'a ImageRef>,
    pub caption: &'a str,
}

impl GridCell<'_> {
    /// Cells without an image are rendered empty, caption included.
    pub fn is_padding(&self) -> bool {
        self.image.is_none()
    }
}

/// One horizontal band of exactly `columns` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow<'a> {
    pub index: usize,
    pub cells: Vec<GridCell<'a>>,
}

pub fn row_count(items: usize, columns: usize) -> usize {
    items.div_ceil(columns)
}

/// Split images and captions into rows, padding both to `columns`.
///
/// The two lists may differ in length; the longer one decides the row count.
pub fn plan_rows<'a>(
    images: &'a [Option<ImageRef>],
    captions: &'a [String],
    columns: u32,
) -> Result<Vec<GridRow<'a>>> {
    if columns == 0 {
        return Err(GridError::InvalidColumns(0));
    }
    let columns = columns as usize;

    let rows = images
        .chunks(columns)
        .zip_longest(captions.chunks(columns))
        .enumerate()
        .map(|(index, pair)| {
            let (row_images, row_captions) = match pair {
                EitherOrBoth::Both(i, c) => (i, c),
                EitherOrBoth::Left(i) => (i, &[][..]),
                EitherOrBoth::Right(c) => (&[][..], c),
            };
            let cells = row_images
                .iter()
                .map(Option::as_ref)
                .pad_using(columns, |_| None)
                .zip(
                    row_captions
                        .iter()
                        .map(String::as_str)
                        .pad_using(columns, |_| ""),
                )
                .map(|(image, caption)| GridCell { image, caption })
                .collect();
            GridRow { index, cells }
        })
        .collect();

    Ok(rows)
}

/// Blank cells needed to square off the last row of `count` images.
pub fn blank_placeholders(count: usize, columns: usize) -> usize {
    if count == 0 || columns == 0 {
        return 0;
    }
    match count % columns {
        0 => 0,
        remainder => columns - remainder,
    }
}
