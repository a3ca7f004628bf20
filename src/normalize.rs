//! Accent and case folding used by every string comparison in the pipeline.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Lower-case `text` and drop diacritics (canonical decomposition, combining
/// marks removed).
///
/// Lower-casing happens before decomposition so characters whose lower-case
/// form carries a combining mark (e.g. `İ`) come out clean.
pub fn fold(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// [`fold`], then keep only ASCII letters, ASCII digits and whitespace.
pub fn fold_strict(text: &str) -> String {
    fold(text)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_strips_accents_and_case() {
        assert_eq!(fold("Hématies"), "hematies");
        assert_eq!(fold("HÉMOGLOBINE"), "hemoglobine");
        assert_eq!(fold("Éosinophiles"), "eosinophiles");
    }

    #[test]
    fn test_fold_keeps_punctuation() {
        assert_eq!(fold("g/dL"), "g/dl");
        assert_eq!(fold("10*6/µl"), "10*6/µl");
    }

    #[test]
    fn test_fold_strict_drops_punctuation() {
        assert_eq!(fold_strict("Hémoglobine :"), "hemoglobine ");
        assert_eq!(fold_strict("n°"), "n");
        assert_eq!(fold_strict("g/dL"), "gdl");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(fold(""), "");
        assert_eq!(fold_strict(""), "");
    }

    #[test]
    fn test_fold_is_idempotent() {
        for s in ["Plaquettes", "İstanbul", "ÇA VA", "mm³", "Ångström 12,5"] {
            let once = fold(s);
            assert_eq!(fold(&once), once);
            assert!(!once.chars().any(is_combining_mark));
            assert!(!once.chars().any(char::is_uppercase));

            let strict = fold_strict(s);
            assert_eq!(fold_strict(&strict), strict);
        }
    }
}
