use lazy_static::lazy_static;
use regex::Regex;

use crate::extract::normalize_value_text;

// Pre-compile digit-confusion patterns at module load time
lazy_static! {
    static ref DIGIT_PATTERNS: Vec<(Regex, &'static str)> = {
        vec![
            // O/o read for zero
            (Regex::new(r"([0-9])[Oo]").unwrap(), "${1}0"),
            (Regex::new(r"[Oo]([0-9])").unwrap(), "0${1}"),

            // l/I/| read for one
            (Regex::new(r"([0-9])[lI|]").unwrap(), "${1}1"),
            (Regex::new(r"[lI|]([0-9])").unwrap(), "1${1}"),

            // S for 5 and B for 8, only when boxed in by digits
            (Regex::new(r"([0-9])S([0-9])").unwrap(), "${1}5${2}"),
            (Regex::new(r"([0-9])B([0-9])").unwrap(), "${1}8${2}"),

            // decimal separator pulled away from its digits
            (Regex::new(r"([0-9])\s*([.,])\s*([0-9])").unwrap(), "${1}${2}${3}"),
        ]
    };
}

/// Text of the predicted span `tokens[start..=end]`, space-joined.
pub fn answer_from_span<S: AsRef<str>>(tokens: &[S], start: usize, end: usize) -> Option<String> {
    if start > end || end >= tokens.len() {
        return None;
    }
    Some(
        tokens[start..=end]
            .iter()
            .map(S::as_ref)
            .collect::<Vec<_>>()
            .join(" "),
    )
}

/// Repair digit confusions in a predicted answer, then normalize it the way
/// token text is normalized for span matching.
///
/// Returns the cleaned text and the number of pattern substitutions. Answers
/// without any digit only get the normalization.
pub fn clean_predicted_answer(text: &str) -> (String, u64) {
    let mut result = text.to_string();
    let mut total_subs: u64 = 0;

    if result.chars().any(|c| c.is_ascii_digit()) {
        for (pattern, replacement) in DIGIT_PATTERNS.iter() {
            // a replaced digit can anchor the next confusion ("1OO"), so repeat until stable
            loop {
                let hits = pattern.find_iter(&result).count() as u64;
                if hits == 0 {
                    break;
                }
                let replaced = pattern.replace_all(&result, *replacement).into_owned();
                if replaced == result {
                    break;
                }
                result = replaced;
                total_subs += hits;
            }
        }
    }

    (normalize_value_text(&result), total_subs)
}
