use std::fs;
use std::io::Cursor;
use std::path::Path;

use docx_rs::{
    Docx, Paragraph, Pic, Run, Table, TableCell, TableLayoutType, TableRow, WidthType,
};
use log::{debug, info, warn};

use crate::config::GridConfig;
use crate::error::{EmbedError, GridError, Result};
use crate::image_source::ImageRef;
use crate::layout::{plan_rows, GridCell};

pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub const DEFAULT_FILENAME: &str = "bavaal_tools_grid.docx";

/// Text written into a cell whose image could not be embedded.
pub const ERROR_MARKER_PREFIX: &str = "Error loading image:";

#[derive(Debug)]
pub struct CellFailure {
    pub row: usize,
    pub column: usize,
    pub error: EmbedError,
}

#[derive(Debug, Default)]
pub struct BuildReport {
    pub rows: usize,
    pub embedded: usize,
    pub failed: Vec<CellFailure>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A finished `.docx` package, owned by the caller.
#[derive(Debug)]
pub struct DocumentBuffer {
    bytes: Vec<u8>,
    report: BuildReport,
}

impl DocumentBuffer {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        debug!("Writing {} bytes to {}", self.bytes.len(), path.display());
        fs::write(path, &self.bytes).map_err(|source| GridError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct GridDocumentBuilder {
    config: GridConfig,
}

impl GridDocumentBuilder {
    pub fn new(config: GridConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Build the document.
    ///
    /// A `None` image slot, or a slot past the end of `images`, becomes an empty
    /// cell. Images that fail to load leave an error marker in their cell and are
    /// listed in the [`BuildReport`]; only configuration and serialization
    /// failures abort the call.
    pub fn build(
        &self,
        images: &[Option<ImageRef>],
        captions: &[String],
    ) -> Result<DocumentBuffer> {
        self.config.validate()?;

        let width_emu = self.config.column_width_emu();
        let height_emu = self.config.image_height_emu();
        let width_twips = self.config.column_width_twips();
        let columns = self.config.columns as usize;
        debug!(
            "Grid: {} columns, image {}x{} EMU, ratio {:.3}",
            columns,
            width_emu,
            height_emu,
            self.config.aspect_ratio()
        );

        let rows = plan_rows(images, captions, self.config.columns)?;
        debug!(
            "Processing {} images and {} captions into {} rows",
            images.len(),
            captions.len(),
            rows.len()
        );

        let mut docx = Docx::new();
        let mut report = BuildReport::default();

        for row in &rows {
            let mut cells = Vec::with_capacity(columns);
            for (column, cell) in row.cells.iter().enumerate() {
                let content = match render_cell(cell, width_emu, height_emu) {
                    Ok(content) => {
                        if cell.image.is_some() {
                            report.embedded += 1;
                        }
                        content
                    }
                    Err(error) => {
                        warn!(
                            "Error adding picture {} at row {}, column {}: {}",
                            cell.image.map(ImageRef::name).unwrap_or_default(),
                            row.index,
                            column,
                            error
                        );
                        let marker = error_marker(cell, &error);
                        report.failed.push(CellFailure {
                            row: row.index,
                            column,
                            error,
                        });
                        marker
                    }
                };
                cells.push(content.width(width_twips, WidthType::Dxa));
            }

            let table = Table::new(vec![TableRow::new(cells)])
                .set_grid(vec![width_twips; columns])
                .layout(TableLayoutType::Fixed);

            // Empty paragraph keeps consecutive rows apart.
            docx = docx.add_table(table).add_paragraph(Paragraph::new());
            report.rows += 1;
        }

        let mut bytes = Vec::new();
        docx.build()
            .pack(Cursor::new(&mut bytes))
            .map_err(|e| GridError::Serialize(e.to_string()))?;

        info!(
            "Document built: {} rows, {} images embedded, {} failed, {} bytes",
            report.rows,
            report.embedded,
            report.failed.len(),
            bytes.len()
        );
        Ok(DocumentBuffer { bytes, report })
    }
}

pub fn build(
    images: &[Option<ImageRef>],
    captions: &[String],
    config: GridConfig,
) -> Result<DocumentBuffer> {
    GridDocumentBuilder::new(config).build(images, captions)
}

fn render_cell(
    cell: &GridCell<'_>,
    width_emu: u32,
    height_emu: u32,
) -> std::result::Result<TableCell, EmbedError> {
    let Some(image) = cell.image else {
        return Ok(TableCell::new().add_paragraph(Paragraph::new()));
    };

    let loaded = image.load()?;
    let pic = Pic::new_with_dimensions(loaded.png, loaded.width, loaded.height)
        .size(width_emu, height_emu);

    Ok(TableCell::new()
        .add_paragraph(Paragraph::new().add_run(Run::new().add_image(pic)))
        .add_paragraph(caption_paragraph(cell.caption)))
}

fn error_marker(cell: &GridCell<'_>, error: &EmbedError) -> TableCell {
    let text = format!("{} {}", ERROR_MARKER_PREFIX, error);
    TableCell::new()
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)))
        .add_paragraph(caption_paragraph(cell.caption))
}

fn caption_paragraph(caption: &str) -> Paragraph {
    if caption.is_empty() {
        Paragraph::new()
    } else {
        Paragraph::new().add_run(Run::new().add_text(caption))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::inspect;
    use crate::test_utils::png_bytes;

    fn image(name: &str) -> Option<ImageRef> {
        Some(ImageRef::from_bytes(name, png_bytes(16, 9)))
    }

    fn captions(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_three_images_in_two_columns() {
        let images = vec![image("A"), image("B"), image("C")];
        let doc = build(
            &images,
            &captions(&["one", "two", "three"]),
            GridConfig::default(),
        )
        .unwrap();
        assert_eq!(doc.report().rows, 2);
        assert_eq!(doc.report().embedded, 3);
        assert!(doc.report().is_clean());

        let summary = inspect(doc.as_bytes()).unwrap();
        assert_eq!(summary.tables.len(), 2);
        assert_eq!(summary.body_paragraphs, 2);
        assert!(summary.tables.iter().all(|t| t.cells.len() == 2));

        let last = &summary.tables[1];
        assert_eq!(last.cells[0].drawings(), 1);
        assert_eq!(last.cells[0].text(), "three");
        assert!(last.cells[1].is_blank());
    }

    #[test]
    fn test_corrupt_image_gets_marker() {
        let images = vec![
            image("A"),
            Some(ImageRef::from_bytes("B", b"garbage".to_vec())),
            image("C"),
        ];
        let doc = build(
            &images,
            &captions(&["one", "two", "three"]),
            GridConfig::default(),
        )
        .unwrap();

        let report = doc.report();
        assert_eq!(report.embedded, 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!((report.failed[0].row, report.failed[0].column), (0, 1));
        assert!(matches!(report.failed[0].error, EmbedError::Decode { .. }));

        let summary = inspect(doc.as_bytes()).unwrap();
        let broken = &summary.tables[0].cells[1];
        assert_eq!(broken.drawings(), 0);
        assert!(broken.has_error_marker());
        assert!(broken.text().ends_with("two"));
        assert_eq!(summary.tables[1].cells[0].drawings(), 1);
    }

    #[test]
    fn test_images_sized_by_reference_ratio() {
        let images = vec![image("wide")];
        let config = GridConfig::new(2, 100, 100).unwrap();
        let doc = build(&images, &[], config).unwrap();

        let summary = inspect(doc.as_bytes()).unwrap();
        let extent = summary.tables[0].cells[0].extents[0];
        assert_eq!(extent.cx, u64::from(config.column_width_emu()));
        assert_eq!(extent.cx, extent.cy);
        assert_eq!(
            summary.tables[0].grid_columns,
            vec![config.column_width_twips() as u64; 2]
        );
    }

    #[test]
    fn test_caption_without_image_renders_blank() {
        let images = vec![image("A")];
        let doc = build(
            &images,
            &captions(&["one", "two", "three"]),
            GridConfig::default(),
        )
        .unwrap();
        assert_eq!(doc.report().rows, 2);
        assert_eq!(doc.report().embedded, 1);

        let summary = inspect(doc.as_bytes()).unwrap();
        assert_eq!(summary.tables.len(), 2);
        assert_eq!(summary.tables[0].cells[0].text(), "one");
        assert!(summary.tables[0].cells[1].is_blank());
        assert!(summary.tables[1].cells[0].is_blank());
        assert!(summary.tables[1].cells[1].is_blank());
    }

    #[test]
    fn test_empty_input_still_serializes() {
        let doc = build(&[], &[], GridConfig::default()).unwrap();
        assert!(!doc.is_empty());
        assert_eq!(doc.report().rows, 0);

        let summary = inspect(doc.as_bytes()).unwrap();
        assert!(summary.tables.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected_before_layout() {
        let config = GridConfig {
            columns: 0,
            ..GridConfig::default()
        };
        let images = vec![image("A")];
        assert!(matches!(
            GridDocumentBuilder::new(config).build(&images, &[]),
            Err(GridError::InvalidColumns(0))
        ));
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_FILENAME);
        let doc = build(&[image("A")], &captions(&["a"]), GridConfig::default()).unwrap();

        doc.write_to(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), doc.as_bytes());
    }
}
