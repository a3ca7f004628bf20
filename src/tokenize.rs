use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{BoundingBox, OcrToken};

lazy_static! {
    // digit followed by a unit character (letter, µ, / or %), and the reverse
    static ref DIGIT_THEN_UNIT: Regex = Regex::new(r"([0-9])([A-Za-zµ/%])").unwrap();
    static ref UNIT_THEN_DIGIT: Regex = Regex::new(r"([A-Za-zµ/%])([0-9])").unwrap();

    // Compound units OCR glues together, e.g. 10p6/mm3
    static ref COMPLEX_UNIT: Regex = Regex::new(r"^[0-9]+[a-z]+[0-9]+/[a-z0-9/³*^]+$").unwrap();
}

/// True for compound unit shapes (`10p6/mm3`, `10e3/ul`) that must not be
/// split apart.
pub fn is_complex_unit(word: &str) -> bool {
    COMPLEX_UNIT.is_match(&word.to_lowercase())
}

/// Insert a space at every digit/letter boundary of each word, so `12g/dL`
/// becomes `12 g/dL`. Words are re-joined with single spaces.
pub fn split_digit_units(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            if is_complex_unit(word) {
                word.to_string()
            } else {
                let step = DIGIT_THEN_UNIT.replace_all(word, "$1 $2");
                UNIT_THEN_DIGIT.replace_all(&step, "$1 $2").into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A token made only of ASCII digits and commas.
pub fn is_numeric_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit() || c == ',')
}

/// Index ranges covering `tokens`: each maximal run of numeric tokens is one
/// range, every other token its own.
fn numeric_runs<S: AsRef<str>>(tokens: &[S]) -> Vec<Range<usize>> {
    let mut runs = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let mut end = i + 1;
        if is_numeric_token(tokens[i].as_ref()) {
            while end < tokens.len() && is_numeric_token(tokens[end].as_ref()) {
                end += 1;
            }
        }
        runs.push(i..end);
        i = end;
    }
    runs
}

/// Concatenate adjacent numeric tokens left to right, undoing OCR splits
/// such as `12` `3` for `123` or `13` `,` `2` for `13,2`.
pub fn fuse_digit_tokens<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    numeric_runs(tokens)
        .into_iter()
        .map(|run| tokens[run].iter().map(S::as_ref).collect())
        .collect()
}

/// [`fuse_digit_tokens`] over positioned tokens; a fused token gets the union
/// of its sources' boxes.
pub fn fuse_positioned_tokens(tokens: &[OcrToken]) -> (Vec<String>, Vec<BoundingBox>) {
    let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    numeric_runs(&texts)
        .into_iter()
        .map(|run| {
            let source = &tokens[run];
            let text: String = source.iter().map(|t| t.text.as_str()).collect();
            let bbox = source[1..]
                .iter()
                .fold(source[0].bbox, |acc, t| acc.union(&t.bbox));
            (text, bbox)
        })
        .unzip()
}
