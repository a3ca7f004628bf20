//! Analyte records handed to the persistence collaborator.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::answer::clean_predicted_answer;
use crate::error::Result;
use crate::normalize::fold;
use crate::value::{CorrectedValue, correct_value};
use crate::vocabulary::LabVocabulary;

/// Key for predictions whose question names no known analyte
pub const UNKNOWN_ANALYTE: &str = "autres";

/// Unit stored when an analyte has no entry in [`UNIT_TABLE`]
pub const DEFAULT_UNIT: &str = "%";

/// Reporting unit per analyte key
const UNIT_TABLE: &[(&str, &str)] = &[
    ("leucocytes", "/mm3"),
    ("plaquettes", "/mm3"),
    ("hematocrite", "%"),
    ("hemoglobine", "g/dl"),
    ("globules rouges", "millions/mm3"),
    ("vgm", "um3"),
    ("ccmh", "pg"),
    ("tcmh", "g/dl"),
    ("neutrophiles", "%"),
    ("eosinophiles", "%"),
    ("monocytes", "%"),
    ("basophiles", "%"),
    ("lymphocytes", "%"),
];

/// A question and the answer text predicted for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub question: String,
    pub answer: String,
}

/// One stored measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyteRecord {
    pub analyte: String,
    pub value: CorrectedValue,
    pub unit: String,
}

/// Anything that can store records for a dossier (a database collection,
/// a file, a test double).
pub trait RecordSink {
    fn insert_many(&mut self, collection: &str, records: &[AnalyteRecord]) -> Result<()>;
}

pub fn unit_for(analyte: &str) -> &'static str {
    let key = fold(analyte);
    UNIT_TABLE
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, unit)| *unit)
        .unwrap_or(DEFAULT_UNIT)
}

/// Recover the analyte key a question was generated for.
pub fn analyte_key_for_question(vocabulary: &LabVocabulary, question: &str) -> String {
    let folded = fold(question);
    vocabulary
        .fields()
        .iter()
        .map(|f| f.key())
        .find(|key| folded.contains(key.as_str()))
        .unwrap_or_else(|| UNKNOWN_ANALYTE.to_string())
}

/// Turn predictions into records: analyte key, scale-corrected value, unit.
pub fn build_records(vocabulary: &LabVocabulary, predictions: &[Prediction]) -> Vec<AnalyteRecord> {
    predictions
        .iter()
        .map(|p| {
            let analyte = analyte_key_for_question(vocabulary, &p.question);
            let (cleaned, subs) = clean_predicted_answer(&p.answer);
            if subs > 0 {
                debug!(
                    analyte = %analyte,
                    raw = %p.answer,
                    cleaned = %cleaned,
                    "repaired predicted answer"
                );
            }
            AnalyteRecord {
                unit: unit_for(&analyte).to_string(),
                value: correct_value(&analyte, &cleaned),
                analyte,
            }
        })
        .collect()
}

/// Store `records` under the dossier identifier. Nothing is written without
/// an identifier or without records; returns how many records were sent.
pub fn persist<S: RecordSink + ?Sized>(
    sink: &mut S,
    dossier: Option<&str>,
    records: &[AnalyteRecord],
) -> Result<usize> {
    let Some(dossier) = dossier else {
        debug!(records = records.len(), "no dossier identifier, records not stored");
        return Ok(0);
    };
    if records.is_empty() {
        return Ok(0);
    }
    sink.insert_many(dossier, records)?;
    info!(dossier, records = records.len(), "stored analyte records");
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemorySink {
        collections: HashMap<String, Vec<AnalyteRecord>>,
    }

    impl RecordSink for MemorySink {
        fn insert_many(&mut self, collection: &str, records: &[AnalyteRecord]) -> Result<()> {
            self.collections
                .entry(collection.to_string())
                .or_default()
                .extend_from_slice(records);
            Ok(())
        }
    }

    fn predictions() -> Vec<Prediction> {
        vec![
            Prediction {
                question: "Quelle est la valeur des hémoglobine ?".to_string(),
                answer: "13 2".to_string(),
            },
            Prediction {
                question: "Quelle est la valeur des neutrophiles ?".to_string(),
                answer: "4500".to_string(),
            },
            Prediction {
                question: "Quelle est la valeur des hématies ?".to_string(),
                answer: "illisible".to_string(),
            },
        ]
    }

    #[test]
    fn test_unit_for() {
        assert_eq!(unit_for("plaquettes"), "/mm3");
        assert_eq!(unit_for("Hémoglobine"), "g/dl");
        assert_eq!(unit_for("hematies"), DEFAULT_UNIT);
    }

    #[test]
    fn test_analyte_key_for_question() {
        let vocab = LabVocabulary::builtin();
        assert_eq!(analyte_key_for_question(vocab, "Quelle est la valeur du vgm ?"), "vgm");
        assert_eq!(
            analyte_key_for_question(vocab, "Quelle est la valeur des globules rouges ?"),
            "globules rouges"
        );
        assert_eq!(analyte_key_for_question(vocab, "Quel est le groupe sanguin ?"), UNKNOWN_ANALYTE);
    }

    #[test]
    fn test_build_records() {
        let records = build_records(LabVocabulary::builtin(), &predictions());
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].analyte, "hemoglobine");
        assert_eq!(records[0].unit, "g/dl");
        assert!((records[0].value.as_f64().unwrap() - 13.2).abs() < 1e-9);
        assert_eq!(records[1].value, CorrectedValue::Number(45.0));
        assert_eq!(records[2].analyte, "hematies");
        assert_eq!(records[2].value, CorrectedValue::Raw("illisible".to_string()));
    }

    #[test]
    fn test_persist_requires_dossier() {
        let records = build_records(LabVocabulary::builtin(), &predictions());
        let mut sink = MemorySink::default();
        assert_eq!(persist(&mut sink, None, &records).unwrap(), 0);
        assert!(sink.collections.is_empty());

        assert_eq!(persist(&mut sink, Some("12 345/67"), &records).unwrap(), 3);
        assert_eq!(sink.collections["12 345/67"].len(), 3);
        assert_eq!(persist(&mut sink, Some("12 345/67"), &[]).unwrap(), 0);
    }
}
