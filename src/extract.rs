//! Field and dossier extraction over corrected lines.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::lines::TextLine;
use crate::normalize::fold_strict;
use crate::tokenize::{fuse_positioned_tokens, split_digit_units};
use crate::types::QaExample;
use crate::vocabulary::CanonicalField;

lazy_static! {
    // decimal separator pulled away from its digits by OCR spacing
    static ref SPLIT_DECIMAL: Regex = Regex::new(r"([0-9])\s*([.,])\s*([0-9])").unwrap();
    static ref NUMERIC_LITERAL: Regex = Regex::new(r"[0-9]+[.,]?[0-9]*").unwrap();
    static ref DOSSIER_NUMBER: Regex = Regex::new(r"[0-9]+\s+[0-9]+(?:\s*/\s*[0-9]+)?").unwrap();
    static ref SLASH_SPACING: Regex = Regex::new(r"\s*/\s*").unwrap();
}

/// True when the field's folded name occurs inside the folded line.
pub fn field_in_line(field: &CanonicalField, line: &str) -> bool {
    fold_strict(line).contains(&field.folded)
}

/// First numeric literal of `line`, with `.` as decimal separator.
pub fn extract_first_value(line: &str) -> Option<String> {
    let split = split_digit_units(line);
    let joined = SPLIT_DECIMAL.replace_all(&split, "$1$2$3");
    NUMERIC_LITERAL
        .find(&joined)
        .map(|m| m.as_str().replace(',', "."))
}

/// Canonical form for comparing a value with token text: spaces and colons
/// removed, `,` read as `.`, lower-cased.
pub fn normalize_value_text(text: &str) -> String {
    text.chars()
        .filter(|c| *c != ' ' && *c != ':')
        .map(|c| if c == ',' { '.' } else { c })
        .collect::<String>()
        .to_lowercase()
}

/// Index of the first token whose normalized text contains the normalized
/// value.
pub fn locate_value<S: AsRef<str>>(tokens: &[S], value: &str) -> Option<usize> {
    let needle = normalize_value_text(value);
    if needle.is_empty() {
        return None;
    }
    tokens
        .iter()
        .position(|t| normalize_value_text(t.as_ref()).contains(&needle))
}

/// Build the example for `field` from its matching line, or `None` when no
/// value can be read or pinned to a token.
pub fn build_example(
    document_id: &str,
    field: &CanonicalField,
    raw_line: &str,
    line: &TextLine,
) -> Option<QaExample> {
    let Some(value) = extract_first_value(raw_line) else {
        debug!(field = %field.name, line = raw_line, "no numeric value on field line");
        return None;
    };
    let (tokens, boxes) = fuse_positioned_tokens(&line.tokens);
    let Some(index) = locate_value(&tokens, &value) else {
        debug!(field = %field.name, value = %value, "value not found among line tokens");
        return None;
    };
    Some(QaExample {
        id: format!("{}_{}", document_id, field.name),
        question: field.question.clone(),
        tokens,
        bboxes: boxes.iter().map(|b| b.corners()).collect(),
        answer: value,
        start_position: index,
        end_position: index,
    })
}

/// Case number from the first line carrying `marker`, e.g. `12 345/67`.
///
/// Only that first line is searched. Whitespace around the slash is
/// collapsed.
pub fn extract_dossier<S: AsRef<str>>(lines: &[S], marker: &str) -> Option<String> {
    let marker = marker.to_lowercase();
    let line = lines
        .iter()
        .map(S::as_ref)
        .find(|l| l.to_lowercase().contains(&marker))?;
    let found = DOSSIER_NUMBER.find(line)?;
    Some(SLASH_SPACING.replace_all(found.as_str().trim(), "/").into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundingBox, OcrToken};
    use crate::vocabulary::LabVocabulary;

    fn field(name: &str) -> &'static CanonicalField {
        LabVocabulary::builtin()
            .fields()
            .iter()
            .find(|f| f.name == name)
            .unwrap()
    }

    fn line(words: &[&str]) -> TextLine {
        let tokens = words
            .iter()
            .enumerate()
            .map(|(i, w)| OcrToken::new(*w, 90, BoundingBox::new(i as i32 * 40, 100, 30, 12)))
            .collect();
        TextLine { key: 100, tokens }
    }

    #[test]
    fn test_field_in_line() {
        assert!(field_in_line(field("hémoglobine"), "hémoglobine : 13 , 2 g / dL"));
        assert!(field_in_line(field("globules rouges"), "GLOBULES ROUGES 4,5"));
        assert!(!field_in_line(field("plaquettes"), "hémoglobine 13"));
    }

    #[test]
    fn test_extract_first_value() {
        assert_eq!(extract_first_value("Hemoglobine : 13 , 2 g / dL").as_deref(), Some("13.2"));
        assert_eq!(extract_first_value("VGM 88fL").as_deref(), Some("88"));
        assert_eq!(extract_first_value("Neutrophiles 62.5 %").as_deref(), Some("62.5"));
        assert_eq!(extract_first_value("Plaquettes absentes"), None);
    }

    #[test]
    fn test_locate_value() {
        let tokens = ["Hemoglobine", ":", "13,2", "g"];
        assert_eq!(locate_value(&tokens, "13.2"), Some(2));
        assert_eq!(locate_value(&tokens, "14"), None);
        assert_eq!(locate_value(&["VGM:88"], "88"), Some(0));
    }

    #[test]
    fn test_build_example_with_split_decimal() {
        let raw = "Hemoglobine : 13 , 2 g / dL";
        let l = line(&["Hemoglobine", ":", "13", ",", "2", "g", "/", "dL"]);
        let ex = build_example("scan.jpg", field("hémoglobine"), raw, &l).unwrap();
        assert_eq!(ex.id, "scan.jpg_hémoglobine");
        assert_eq!(ex.answer, "13.2");
        assert_eq!(ex.tokens[ex.start_position], "13,2");
        assert_eq!(ex.start_position, ex.end_position);
        assert_eq!(ex.tokens.len(), ex.bboxes.len());
        assert_eq!(ex.tokens.len(), 6);
        assert_eq!(ex.bboxes[2], [80, 100, 190, 112]);
    }

    #[test]
    fn test_build_example_without_value() {
        let l = line(&["Plaquettes", "absentes"]);
        assert!(build_example("scan.jpg", field("plaquettes"), "Plaquettes absentes", &l).is_none());
    }

    #[test]
    fn test_extract_dossier() {
        let lines = ["Laboratoire central", "Dossier n° 12 345/67 autres texte"];
        assert_eq!(extract_dossier(&lines, "dossier n°").as_deref(), Some("12 345/67"));
        let corrected = ["DOSSIER N° 12 345 / 67"];
        assert_eq!(extract_dossier(&corrected, "dossier n°").as_deref(), Some("12 345/67"));
        assert_eq!(extract_dossier(&["Dossier n° 12 345"], "dossier n°").as_deref(), Some("12 345"));
    }

    #[test]
    fn test_extract_dossier_absent() {
        assert_eq!(extract_dossier(&["Patient 12 345/67"], "dossier n°"), None);
        assert_eq!(extract_dossier(&["Dossier n° inconnu", "12 345"], "dossier n°"), None);
        assert_eq!(extract_dossier::<&str>(&[], "dossier n°"), None);
    }
}
