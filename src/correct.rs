use crate::config::PipelineConfig;
use crate::tokenize::split_digit_units;
use crate::vocabulary::LabVocabulary;

/// Word-by-word vocabulary correction of a reconstructed line.
///
/// Each word is first tried against the field names; the unit vocabulary is
/// consulted only when that left the word unchanged. The corrected line is
/// used for detection only, token spans always come from the raw tokens.
pub struct LineCorrector<'v> {
    vocabulary: &'v LabVocabulary,
    field_cutoff: f64,
    unit_cutoff: f64,
}

impl<'v> LineCorrector<'v> {
    pub fn new(vocabulary: &'v LabVocabulary, config: &PipelineConfig) -> Self {
        Self {
            vocabulary,
            field_cutoff: config.field_cutoff,
            unit_cutoff: config.unit_cutoff,
        }
    }

    pub fn correct_word(&self, word: &str) -> String {
        if let Some(field) = self.vocabulary.match_field(word, self.field_cutoff) {
            if field.name != word {
                return field.name.clone();
            }
        }
        match self.vocabulary.match_unit(word, self.unit_cutoff) {
            Some(unit) => unit.to_string(),
            None => word.to_string(),
        }
    }

    pub fn correct_line(&self, line: &str) -> String {
        split_digit_units(line)
            .split_whitespace()
            .map(|w| self.correct_word(w))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
