//! Readers for the OCR collaborator's output: Tesseract `image_to_data` TSV
//! and a plain JSON token list.

use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use tracing::debug;

use crate::error::{LabOcrError, Result};
use crate::types::{BoundingBox, OcrLineKey, OcrToken};

const REQUIRED_COLUMNS: &[&str] = &["left", "top", "width", "height", "conf", "text"];

/// One `image_to_data` row; unknown columns (level, word_num, ...) are ignored.
#[derive(Debug, Deserialize)]
struct TsvRow {
    left: i32,
    top: i32,
    width: i32,
    height: i32,
    conf: f64,
    #[serde(default)]
    text: String,
    #[serde(default)]
    block_num: Option<u32>,
    #[serde(default)]
    par_num: Option<u32>,
    #[serde(default)]
    line_num: Option<u32>,
}

impl From<TsvRow> for OcrToken {
    fn from(row: TsvRow) -> Self {
        let line_key = match (row.block_num, row.par_num, row.line_num) {
            (Some(block), Some(paragraph), Some(line)) => Some(OcrLineKey {
                block,
                paragraph,
                line,
            }),
            _ => None,
        };
        OcrToken {
            text: row.text,
            confidence: row.conf as i32,
            bbox: BoundingBox::new(row.left, row.top, row.width, row.height),
            line_key,
        }
    }
}

fn malformed(row: usize, err: csv::Error) -> LabOcrError {
    LabOcrError::MalformedRow {
        row: err.position().map_or(row, |p| p.line() as usize),
        reason: err.to_string(),
    }
}

/// Parse Tesseract TSV. Columns are found by header name; every data row
/// becomes a token, including the empty structural rows (the line
/// reconstructor discards those).
pub fn parse_tesseract_tsv(tsv: &str) -> Result<Vec<OcrToken>> {
    if tsv.trim().is_empty() {
        return Ok(Vec::new());
    }

    // OCR text may carry stray quotes, so no quoting at all
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(tsv.as_bytes());

    let headers = reader.headers().map_err(|e| malformed(1, e))?.clone();
    for &name in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == name) {
            return Err(LabOcrError::MissingColumn(name));
        }
    }

    let mut tokens = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let mut record: StringRecord = result.map_err(|e| malformed(index + 2, e))?;
        let row = record.position().map_or(index + 2, |p| p.line() as usize);
        // the text column may be cut off on structural rows
        while record.len() < headers.len() {
            record.push_field("");
        }
        let parsed: TsvRow = record
            .deserialize(Some(&headers))
            .map_err(|e| LabOcrError::MalformedRow {
                row,
                reason: e.to_string(),
            })?;
        tokens.push(parsed.into());
    }

    debug!(tokens = tokens.len(), "parsed tesseract TSV");
    Ok(tokens)
}

pub fn parse_tokens_json(json: &str) -> Result<Vec<OcrToken>> {
    Ok(serde_json::from_str(json)?)
}

/// Read a token dump, picking the format from the extension (`.json` for
/// JSON, anything else is treated as Tesseract TSV).
pub fn read_tokens(path: &Path) -> Result<Vec<OcrToken>> {
    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        parse_tokens_json(&content)
    } else {
        parse_tesseract_tsv(&content)
    }
}
