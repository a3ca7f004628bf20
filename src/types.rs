use serde::{Deserialize, Serialize};

use crate::error::{LabOcrError, Result};

/// Axis-aligned box in source-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.left.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.top.saturating_add(self.height)
    }

    /// Smallest box covering both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BoundingBox::new(left, top, right.saturating_sub(left), bottom.saturating_sub(top))
    }

    /// `[x0, y0, x1, y1]`, the layout the answering model consumes.
    pub fn corners(&self) -> [i32; 4] {
        [self.left, self.top, self.right(), self.bottom()]
    }

    /// Corners rescaled onto a 0-1000 page grid. A zero page dimension leaves
    /// the pixel corners as they are.
    pub fn normalized(&self, page_width: u32, page_height: u32) -> [i32; 4] {
        if page_width == 0 || page_height == 0 {
            return self.corners();
        }
        let scale = |v: i32, dim: u32| (1000.0 * f64::from(v) / f64::from(dim)) as i32;
        [
            scale(self.left, page_width),
            scale(self.top, page_height),
            scale(self.right(), page_width),
            scale(self.bottom(), page_height),
        ]
    }
}

/// Tesseract's (block, paragraph, line) triple for a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OcrLineKey {
    pub block: u32,
    pub paragraph: u32,
    pub line: u32,
}

/// One word reported by the OCR engine. A negative confidence marks a
/// non-text artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrToken {
    pub text: String,
    pub confidence: i32,
    pub bbox: BoundingBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_key: Option<OcrLineKey>,
}

impl OcrToken {
    pub fn new(text: impl Into<String>, confidence: i32, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            confidence,
            bbox,
            line_key: None,
        }
    }
}

/// All tokens of one scanned page plus the identifier (usually the file
/// name) used to build example ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrDocument {
    pub id: String,
    pub tokens: Vec<OcrToken>,
}

/// A question/answer training example with a single-token answer span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaExample {
    pub id: String,
    pub question: String,
    pub tokens: Vec<String>,
    pub bboxes: Vec<[i32; 4]>,
    pub answer: String,
    pub start_position: usize,
    pub end_position: usize,
}

impl QaExample {
    /// Check the shape invariants the answering model relies on.
    pub fn validate(&self) -> Result<()> {
        if self.tokens.len() != self.bboxes.len() {
            return Err(LabOcrError::TokenBoxMismatch {
                id: self.id.clone(),
                tokens: self.tokens.len(),
                bboxes: self.bboxes.len(),
            });
        }
        if self.start_position > self.end_position || self.end_position >= self.tokens.len() {
            return Err(LabOcrError::SpanOutOfRange {
                id: self.id.clone(),
                start: self.start_position,
                end: self.end_position,
                len: self.tokens.len(),
            });
        }
        Ok(())
    }

    /// Rescale every box onto the 0-1000 page grid.
    pub fn normalize_boxes(&mut self, page_width: u32, page_height: u32) {
        if page_width == 0 || page_height == 0 {
            return;
        }
        for b in &mut self.bboxes {
            let [x0, y0, x1, y1] = *b;
            *b = BoundingBox::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
                .normalized(page_width, page_height);
        }
    }
}

/// Everything the core produces for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentExtraction {
    pub document_id: String,
    pub dossier: Option<String>,
    pub examples: Vec<QaExample>,
}
