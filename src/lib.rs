//! Structured lab-value extraction from noisy OCR of scanned medical reports.
//!
//! The pipeline turns a flat list of OCR tokens into question/answer examples
//! for a layout-aware answering model:
//!
//! 1. [`lines`] groups word boxes into reading-order lines.
//! 2. [`correct`] repairs field names and units against the controlled
//!    [`vocabulary`], after [`tokenize`] splits digits from units.
//! 3. [`extract`] finds each analyte's first line, reads its value and pins
//!    it to a token (numeric tokens fused, boxes unioned).
//! 4. [`value`] rescales the model's predicted values before they are stored
//!    through [`records`].
//!
//! Everything is synchronous and side-effect free; the vocabulary is built
//! once and shared read-only.

pub mod answer;
pub mod config;
pub mod correct;
pub mod error;
pub mod extract;
pub mod lines;
pub mod normalize;
pub mod ocr_input;
pub mod pipeline;
pub mod records;
pub mod tokenize;
pub mod types;
pub mod value;
pub mod vocabulary;

#[cfg(feature = "python")]
mod python;

pub use config::PipelineConfig;
pub use error::{LabOcrError, Result};
pub use pipeline::{Extractor, extract_document};
pub use types::{BoundingBox, DocumentExtraction, OcrDocument, OcrLineKey, OcrToken, QaExample};
pub use value::{CorrectedValue, correct_value};
pub use vocabulary::LabVocabulary;
