use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::answer::clean_predicted_answer;
use crate::ocr_input::parse_tesseract_tsv;
use crate::pipeline::extract_document;
use crate::value::{self, CorrectedValue};

#[derive(IntoPyObject)]
enum PyCorrected {
    Number(f64),
    Raw(String),
}

/// Extract QA examples from Tesseract TSV text.
/// Returns: JSON `{"document_id", "dossier", "examples"}`
#[pyfunction]
fn extract_from_tsv(document_id: String, tsv: String) -> PyResult<String> {
    let tokens = parse_tesseract_tsv(&tsv).map_err(|e| PyValueError::new_err(e.to_string()))?;
    let extraction = extract_document(&document_id, &tokens);
    serde_json::to_string(&extraction).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Rescale a predicted value for an analyte
/// Returns: float, or the input string when it is not a number
#[pyfunction]
fn correct_value(analyte: String, raw: String) -> PyResult<PyCorrected> {
    Ok(match value::correct_value(&analyte, &raw) {
        CorrectedValue::Number(v) => PyCorrected::Number(v),
        CorrectedValue::Raw(s) => PyCorrected::Raw(s),
    })
}

/// Repair digit confusions in a predicted answer
/// Returns: (cleaned_text, substitution_count)
#[pyfunction]
fn clean_answer(text: String) -> PyResult<(String, u64)> {
    Ok(clean_predicted_answer(&text))
}

#[pymodule]
fn lab_ocr_qa(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(extract_from_tsv, m)?)?;
    m.add_function(wrap_pyfunction!(correct_value, m)?)?;
    m.add_function(wrap_pyfunction!(clean_answer, m)?)?;
    Ok(())
}
