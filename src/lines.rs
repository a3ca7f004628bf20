//! Reading-order line reconstruction from scattered OCR word boxes.

use tracing::debug;

use crate::types::OcrToken;

/// Words whose top offsets lie within this many pixels share a line.
pub const DEFAULT_LINE_TOLERANCE_PX: i32 = 15;

/// Tokens sharing an approximate vertical offset, sorted left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// Top offset of the first token that opened the line
    pub key: i32,
    pub tokens: Vec<OcrToken>,
}

impl TextLine {
    /// Token texts joined with single spaces
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Group tokens into lines, top to bottom.
///
/// Empty or negative-confidence tokens are dropped. A token joins the first
/// line (in creation order) whose key is within `tolerance` of its top
/// offset, otherwise it opens a new line keyed by its own top offset.
pub fn reconstruct_lines(tokens: &[OcrToken], tolerance: i32) -> Vec<TextLine> {
    let mut lines: Vec<TextLine> = Vec::new();
    let mut dropped = 0usize;

    for token in tokens {
        let text = token.text.trim();
        if text.is_empty() || token.confidence < 0 {
            dropped += 1;
            continue;
        }
        let token = OcrToken {
            text: text.to_string(),
            ..token.clone()
        };
        let top = token.bbox.top;
        match lines.iter_mut().find(|l| l.key.abs_diff(top) <= tolerance.unsigned_abs()) {
            Some(line) => line.tokens.push(token),
            None => lines.push(TextLine {
                key: top,
                tokens: vec![token],
            }),
        }
    }

    for line in &mut lines {
        line.tokens.sort_by_key(|t| t.bbox.left);
    }
    lines.sort_by_key(|l| l.key);

    debug!(lines = lines.len(), dropped, "reconstructed OCR lines");
    lines
}
