//! Attach vocabulary phrases to analysed speech intervals
//!
//! An enrollment recording contains the app model's vocabulary spoken in
//! order, repeated `enrollmentRepeats` times. Interval `i` is therefore
//! labeled with word `i mod vocabulary.len()`.

use tracing::warn;
use vocalis_domain::{Interval, Result, TimeSpan, VocalisError};

/// Label `spans` in order with the cycled vocabulary.
///
/// A span count that differs from `vocabulary.len() * repeats` is logged but
/// still labeled; the service decides whether the submission is usable.
///
/// # Errors
/// `Validation` when the vocabulary is empty.
pub fn label_intervals(vocabulary: &[String], repeats: u32, spans: &[TimeSpan]) -> Result<Vec<Interval>> {
    if vocabulary.is_empty() {
        return Err(VocalisError::Validation(
            "cannot label intervals with an empty vocabulary".into(),
        ));
    }

    let expected = vocabulary.len().saturating_mul(repeats as usize);
    if spans.len() != expected {
        warn!(
            expected,
            actual = spans.len(),
            "analysed interval count does not match vocabulary x repeats"
        );
    }

    Ok(spans
        .iter()
        .enumerate()
        .map(|(i, span)| span.labeled(vocabulary[i % vocabulary.len()].clone()))
        .collect())
}

/// The phrase sequence a speaker is asked to say
pub fn phrase_sequence(vocabulary: &[String], repeats: u32) -> Vec<String> {
    (0..repeats).flat_map(|_| vocabulary.iter().cloned()).collect()
}
