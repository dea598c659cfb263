//! Reads a produced `.docx` back into a table/cell summary.
//!
//! Only the parts of `word/document.xml` the grid writes are understood: body
//! tables, their cells, drawings with their `wp:extent`, and run text.

use std::io::{Cursor, Read};

use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::builder::ERROR_MARKER_PREFIX;
use crate::error::{GridError, Result};

const DOCUMENT_PART: &str = "word/document.xml";

/// A drawing's rendered size in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub cx: u64,
    pub cy: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellSummary {
    pub extents: Vec<Extent>,
    pub paragraphs: Vec<String>,
}

impl CellSummary {
    pub fn drawings(&self) -> usize {
        self.extents.len()
    }

    /// Non-empty paragraph texts joined by newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .filter(|p| !p.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_blank(&self) -> bool {
        self.extents.is_empty() && self.text().is_empty()
    }

    pub fn has_error_marker(&self) -> bool {
        self.paragraphs
            .iter()
            .any(|p| p.starts_with(ERROR_MARKER_PREFIX))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSummary {
    pub rows: usize,
    pub grid_columns: Vec<u64>,
    pub cells: Vec<CellSummary>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentSummary {
    pub tables: Vec<TableSummary>,
    /// Paragraphs directly in the body, outside any table.
    pub body_paragraphs: usize,
}

impl DocumentSummary {
    pub fn cells(&self) -> impl Iterator<Item = &CellSummary> {
        self.tables.iter().flat_map(|t| t.cells.iter())
    }
}

pub fn inspect(bytes: &[u8]) -> Result<DocumentSummary> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| GridError::Inspect(e.to_string()))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| GridError::Inspect(format!("{DOCUMENT_PART}: {e}")))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| GridError::Inspect(e.to_string()))?;
    debug!("Read {} ({} bytes)", DOCUMENT_PART, xml.len());

    parse_document_xml(&xml)
}

#[derive(Default)]
struct Walker {
    summary: DocumentSummary,
    table: Option<TableSummary>,
    cell: Option<CellSummary>,
    in_text: bool,
}

impl Walker {
    fn open(&mut self, element: &BytesStart<'_>, empty: bool) -> Result<()> {
        match element.name().as_ref() {
            b"w:tbl" => self.table = Some(TableSummary::default()),
            b"w:tr" => {
                if let Some(table) = self.table.as_mut() {
                    table.rows += 1;
                }
            }
            b"w:gridCol" => {
                if let (Some(table), Some(w)) = (self.table.as_mut(), attr_u64(element, b"w:w")?) {
                    table.grid_columns.push(w);
                }
            }
            b"w:tc" => self.cell = Some(CellSummary::default()),
            b"w:p" => match self.cell.as_mut() {
                Some(cell) => cell.paragraphs.push(String::new()),
                None if self.table.is_none() => self.summary.body_paragraphs += 1,
                None => {}
            },
            b"wp:extent" => {
                if let (Some(cell), Some(cx), Some(cy)) = (
                    self.cell.as_mut(),
                    attr_u64(element, b"cx")?,
                    attr_u64(element, b"cy")?,
                ) {
                    cell.extents.push(Extent { cx, cy });
                }
            }
            b"w:t" => self.in_text = !empty,
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"w:tbl" => {
                if let Some(table) = self.table.take() {
                    self.summary.tables.push(table);
                }
            }
            b"w:tc" => {
                if let (Some(table), Some(cell)) = (self.table.as_mut(), self.cell.take()) {
                    table.cells.push(cell);
                }
            }
            b"w:t" => self.in_text = false,
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if !self.in_text {
            return;
        }
        if let Some(paragraph) = self.cell.as_mut().and_then(|c| c.paragraphs.last_mut()) {
            paragraph.push_str(text);
        }
    }
}

fn parse_document_xml(xml: &str) -> Result<DocumentSummary> {
    let mut reader = Reader::from_str(xml);
    let mut walker = Walker::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => walker.open(&e, false)?,
            Ok(Event::Empty(e)) => {
                walker.open(&e, true)?;
                walker.close(e.name().as_ref());
            }
            Ok(Event::End(e)) => walker.close(e.name().as_ref()),
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| GridError::Inspect(e.to_string()))?;
                walker.text(&text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(GridError::Inspect(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    debug!(
        "Found {} tables, {} body paragraphs",
        walker.summary.tables.len(),
        walker.summary.body_paragraphs
    );
    Ok(walker.summary)
}

fn attr_u64(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<u64>> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| GridError::Inspect(e.to_string()))?;
        if attr.key.as_ref() == key {
            let value = attr
                .unescape_value()
                .map_err(|e| GridError::Inspect(e.to_string()))?;
            return Ok(value.trim().parse().ok());
        }
    }
    Ok(None)
}
