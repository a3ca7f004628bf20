use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::correct::LineCorrector;
use crate::extract::{build_example, extract_dossier, field_in_line};
use crate::lines::{TextLine, reconstruct_lines};
use crate::types::{DocumentExtraction, OcrDocument, OcrToken};
use crate::vocabulary::LabVocabulary;

/// Turns one page of OCR tokens into QA examples and a dossier identifier.
///
/// Holds only read-only state, so one extractor can serve many documents
/// concurrently.
pub struct Extractor<'v> {
    config: PipelineConfig,
    vocabulary: &'v LabVocabulary,
}

impl Extractor<'static> {
    /// Default configuration over the built-in vocabulary
    pub fn builtin() -> Self {
        Extractor::new(PipelineConfig::default(), LabVocabulary::builtin())
    }
}

impl<'v> Extractor<'v> {
    pub fn new(config: PipelineConfig, vocabulary: &'v LabVocabulary) -> Self {
        Self { config, vocabulary }
    }

    pub fn extract(&self, document_id: &str, tokens: &[OcrToken]) -> DocumentExtraction {
        let lines = reconstruct_lines(tokens, self.config.line_tolerance_px);
        if lines.is_empty() {
            debug!(document = document_id, "no readable tokens");
            return DocumentExtraction {
                document_id: document_id.to_string(),
                ..DocumentExtraction::default()
            };
        }

        let corrector = LineCorrector::new(self.vocabulary, &self.config);
        let raw: Vec<String> = lines.iter().map(TextLine::text).collect();
        let corrected: Vec<String> = raw.iter().map(|l| corrector.correct_line(l)).collect();

        let mut examples = Vec::new();
        for field in self.vocabulary.fields() {
            // first matching line only; a repeated field is not looked up again
            let Some(idx) = corrected.iter().position(|l| field_in_line(field, l)) else {
                continue;
            };
            let Some(example) = build_example(document_id, field, &raw[idx], &lines[idx]) else {
                continue;
            };
            match example.validate() {
                Ok(()) => examples.push(example),
                Err(e) => warn!(document = document_id, error = %e, "rejected example"),
            }
        }

        let dossier = extract_dossier(&corrected, &self.config.dossier_marker);
        debug!(
            document = document_id,
            examples = examples.len(),
            dossier = dossier.as_deref().unwrap_or("-"),
            "extracted document"
        );

        DocumentExtraction {
            document_id: document_id.to_string(),
            dossier,
            examples,
        }
    }

    /// Extract several documents in parallel; output order follows input order.
    pub fn extract_batch(&self, documents: &[OcrDocument]) -> Vec<DocumentExtraction> {
        documents
            .par_iter()
            .map(|doc| self.extract(&doc.id, &doc.tokens))
            .collect()
    }
}

/// [`Extractor::extract`] with the default configuration and vocabulary.
pub fn extract_document(document_id: &str, tokens: &[OcrToken]) -> DocumentExtraction {
    Extractor::builtin().extract(document_id, tokens)
}
