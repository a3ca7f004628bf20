//! Controlled vocabularies for lab-report OCR correction.
//!
//! Holds the canonical analyte names the extractor looks for (with their
//! question templates) and the accepted unit spellings, including the
//! degenerate forms OCR tends to produce. Both lists are compared only in
//! folded form. The built-in vocabulary is constructed once and shared
//! read-only across threads.

use std::sync::OnceLock;

use similar::TextDiff;
use tracing::debug;

use crate::normalize::{fold, fold_strict};

/// Built-in vocabulary instance (built once, reused)
static BUILTIN: OnceLock<LabVocabulary> = OnceLock::new();

/// Analytes searched for in every report, in extraction order.
pub const CANONICAL_FIELDS: &[&str] = &[
    "leucocytes",
    "hématies",
    "plaquettes",
    "hémoglobine",
    "hématocrite",
    "neutrophiles",
    "lymphocytes",
    "eosinophiles",
    "basophiles",
    "monocytes",
    "globules rouges",
    "globules blancs",
    "vgm",
    "ccmh",
    "tcmh",
];

/// Abbreviated indices take a masculine singular article in the question.
const SINGULAR_FIELDS: &[&str] = &["vgm", "ccmh", "tcmh"];

/// Accepted unit spellings, OCR variants included.
pub const UNIT_SPELLINGS: &[&str] = &[
    "g/dL",
    "pg",
    "µm³",
    "um³",
    "fL",
    "%",
    "10^3/uL",
    "10^6/uL",
    "mm³",
    "10*3/uL",
    "10*6/uL",
    "/mm³",
    "10*3/mm³",
    "10*6/mm³",
    "/ml",
    "g/dl",
    "Pg",
    "10*6/µl",
    "/µl",
    "/ul",
    "millions/mm",
    "M/mm³",
    "femtolites",
    "10⁶/mm³",
    "10p6/mm³",
    "10p3/mm³",
    "10 p 6/mm³",
    "10 p 3/mm³",
];

/// One analyte the extractor can produce an example for.
#[derive(Debug, Clone)]
pub struct CanonicalField {
    /// Display spelling, accents included
    pub name: String,
    /// Strictly folded form used for matching
    pub folded: String,
    /// Natural-language question put to the answering model
    pub question: String,
}

impl CanonicalField {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let folded = fold_strict(&name);
        let article = if SINGULAR_FIELDS.contains(&folded.as_str()) {
            "du"
        } else {
            "des"
        };
        let question = format!("Quelle est la valeur {} {} ?", article, name);
        Self {
            name,
            folded,
            question,
        }
    }

    /// Key used by the unit table and the value corrector.
    pub fn key(&self) -> String {
        fold(&self.name)
    }
}

#[derive(Debug, Clone)]
struct UnitEntry {
    spelling: String,
    folded: String,
}

/// Field and unit vocabularies
pub struct LabVocabulary {
    fields: Vec<CanonicalField>,
    units: Vec<UnitEntry>,
}

impl LabVocabulary {
    /// Build a vocabulary from explicit lists
    pub fn new<F, U>(fields: F, units: U) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        U: IntoIterator,
        U::Item: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(CanonicalField::new).collect(),
            units: units
                .into_iter()
                .map(|u| {
                    let spelling = u.into();
                    let folded = fold(&spelling);
                    UnitEntry { spelling, folded }
                })
                .collect(),
        }
    }

    /// The process-wide French hematology vocabulary
    pub fn builtin() -> &'static LabVocabulary {
        BUILTIN.get_or_init(|| {
            let vocab = LabVocabulary::new(
                CANONICAL_FIELDS.iter().copied(),
                UNIT_SPELLINGS.iter().copied(),
            );
            debug!("{}", vocab.stats());
            vocab
        })
    }

    pub fn fields(&self) -> &[CanonicalField] {
        &self.fields
    }

    /// Closest canonical field to `word`, if its similarity reaches `cutoff`.
    ///
    /// Apostrophes and backticks are dropped and the word is strictly folded
    /// before comparison.
    pub fn match_field(&self, word: &str, cutoff: f64) -> Option<&CanonicalField> {
        let cleaned: String = word.chars().filter(|c| *c != '\'' && *c != '`').collect();
        let candidate = fold_strict(&cleaned);
        closest(&candidate, self.fields.iter().map(|f| f.folded.as_str()), cutoff)
            .map(|i| &self.fields[i])
    }

    /// Closest accepted unit spelling to `word`, if its similarity reaches `cutoff`.
    pub fn match_unit(&self, word: &str, cutoff: f64) -> Option<&str> {
        let candidate = fold(word);
        closest(&candidate, self.units.iter().map(|u| u.folded.as_str()), cutoff)
            .map(|i| self.units[i].spelling.as_str())
    }

    /// Get stats about the loaded vocabulary
    pub fn stats(&self) -> String {
        format!("Vocabulary loaded: fields={}, units={}", self.fields.len(), self.units.len())
    }
}

/// Matching-character ratio `2*M/T` of two strings, compared char by char.
fn similarity(a: &str, b: &str) -> f64 {
    f64::from(TextDiff::from_chars(a, b).ratio())
}

/// Index of the most similar entry at or above `cutoff`; the earliest entry
/// wins ties.
fn closest<'a>(
    candidate: &str,
    entries: impl Iterator<Item = &'a str>,
    cutoff: f64,
) -> Option<usize> {
    if candidate.is_empty() {
        return None;
    }
    let mut best: Option<(usize, f64)> = None;
    for (i, entry) in entries.enumerate() {
        let score = similarity(candidate, entry);
        if score < cutoff {
            continue;
        }
        match best {
            Some((_, s)) if s >= score => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_shared() {
        let a = LabVocabulary::builtin();
        let b = LabVocabulary::builtin();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.fields().len(), CANONICAL_FIELDS.len());
        assert_eq!(a.stats(), "Vocabulary loaded: fields=15, units=28");
    }

    #[test]
    fn test_questions_use_article() {
        let vocab = LabVocabulary::builtin();
        let q = |name: &str| {
            vocab
                .fields()
                .iter()
                .find(|f| f.name == name)
                .map(|f| f.question.clone())
                .unwrap()
        };
        assert_eq!(q("plaquettes"), "Quelle est la valeur des plaquettes ?");
        assert_eq!(q("vgm"), "Quelle est la valeur du vgm ?");
    }

    #[test]
    fn test_every_field_matches_itself() {
        let vocab = LabVocabulary::builtin();
        for field in vocab.fields() {
            let hit = vocab.match_field(&field.name, 1.0).unwrap();
            assert_eq!(hit.name, field.name);
        }
    }

    #[test]
    fn test_every_unit_matches_itself() {
        let vocab = LabVocabulary::builtin();
        for unit in UNIT_SPELLINGS {
            let hit = vocab.match_unit(unit, 1.0).unwrap();
            assert_eq!(fold(hit), fold(unit));
        }
    }

    #[test]
    fn test_field_matching_tolerates_ocr_noise() {
        let vocab = LabVocabulary::builtin();
        assert_eq!(vocab.match_field("Hemoglobne", 0.7).unwrap().name, "hémoglobine");
        assert_eq!(vocab.match_field("PLAQUETTES", 0.7).unwrap().name, "plaquettes");
        assert_eq!(vocab.match_field("Leuc'ocytes", 0.7).unwrap().name, "leucocytes");
    }

    #[test]
    fn test_below_cutoff_is_rejected() {
        let vocab = LabVocabulary::builtin();
        assert!(vocab.match_field("Patient", 0.7).is_none());
        assert!(vocab.match_field(":", 0.7).is_none());
        assert!(vocab.match_unit("13", 0.6).is_none());
        assert!(vocab.match_unit("/", 0.6).is_none());
        assert!(vocab.match_field("Hemo", 0.7).is_none());
    }

    #[test]
    fn test_similarity_ratio() {
        assert_eq!(similarity("hemoglobine", "hemoglobine"), 1.0);
        assert!((similarity("hemogl", "hemoglobine") - 12.0 / 17.0).abs() < 1e-6);
        assert!((similarity("dl", "g/dl") - 4.0 / 6.0).abs() < 1e-6);
        assert!((similarity("g", "pg") - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(similarity("13", "%"), 0.0);
    }

    #[test]
    fn test_truncated_field_names() {
        let vocab = LabVocabulary::builtin();
        assert_eq!(vocab.match_field("Hemogl", 0.7).unwrap().name, "hémoglobine");
        assert_eq!(vocab.match_field("Hémogl.", 0.7).unwrap().name, "hémoglobine");
        assert_eq!(vocab.match_field("Lympho", 0.7).unwrap().name, "lymphocytes");
    }

    #[test]
    fn test_unit_matching() {
        let vocab = LabVocabulary::builtin();
        assert_eq!(vocab.match_unit("mm3", 0.6), Some("mm³"));
        assert_eq!(vocab.match_unit("FL", 0.6), Some("fL"));
        assert_eq!(vocab.match_unit("dL", 0.6), Some("g/dL"));
        assert_eq!(vocab.match_unit("g", 0.6), Some("pg"));
    }

    #[test]
    fn test_custom_vocabulary() {
        let vocab = LabVocabulary::new(["glycémie"], ["mmol/L"]);
        assert_eq!(vocab.match_field("glycemie", 0.7).unwrap().name, "glycémie");
        assert_eq!(vocab.match_unit("mmol/l", 0.6), Some("mmol/L"));
        assert!(vocab.stats().contains("fields=1"));
    }
}
