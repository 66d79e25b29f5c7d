use log::debug;

use crate::complex::Complex;
use crate::correlation::{
    correlate_complex, correlate_real, natural_length, xcorr_real, StopBounds, StopIndicator,
};
use crate::error::{CorrelationError, Result};

/// 11-chip Barker code as bipolar samples
/// Properties: autocorrelation peak of 11, sidelobe magnitude of at most 1
pub fn barker_sequence() -> Vec<f64> {
    vec![1.0, 1.0, 1.0, -1.0, -1.0, -1.0, 1.0, -1.0, -1.0, 1.0, -1.0]
}

/// Barker code on the real axis, for the complex correlation path
pub fn barker_sequence_complex() -> Vec<Complex> {
    barker_sequence().into_iter().map(Complex::from).collect()
}

/// Index of the largest absolute value, `None` for an empty slice
pub fn peak_index(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.abs().total_cmp(&b.abs()))
        .map(|(i, _)| i)
}

/// Start position of the window that best matches `template`
///
/// Runs a full unbounded correlation and maps the strongest tap back to the
/// sample where `template[0]` lines up. Taps whose window starts before the
/// first received sample are clamped to 0.
pub fn best_alignment(received: &[f64], template: &[f64]) -> Option<usize> {
    if template.is_empty() {
        return None;
    }
    let natural = natural_length(received.len(), template.len());
    let correlation = xcorr_real(received, template, natural);
    peak_index(&correlation.values).map(|k| window_start(k, template.len()))
}

/// Find the first window whose correlation with `template` rises above `threshold`
///
/// The engine stops at the first tap above the bound, so the search never
/// computes past the detection point. Returns the start position in
/// `received` of that window, or `None` if no tap crossed the threshold.
pub fn detect_sequence(received: &[f64], template: &[f64], threshold: f64) -> Result<Option<usize>> {
    validate_search(template.len(), threshold)?;

    let natural = natural_length(received.len(), template.len());
    let correlation = correlate_real(received, template, natural, StopBounds::upper(threshold));
    Ok(stop_to_start(correlation.stop, template.len()))
}

/// Complex counterpart of [`detect_sequence`], bounded on tap magnitude
///
/// Phase rotation of the received burst does not affect detection.
pub fn detect_sequence_complex(
    received: &[Complex],
    template: &[Complex],
    threshold: f64,
) -> Result<Option<usize>> {
    validate_search(template.len(), threshold)?;

    let natural = natural_length(received.len(), template.len());
    let correlation = correlate_complex(received, template, natural, StopBounds::upper(threshold))?;
    Ok(stop_to_start(correlation.stop, template.len()))
}

fn validate_search(template_len: usize, threshold: f64) -> Result<()> {
    if template_len == 0 {
        return Err(CorrelationError::InvalidInput("template is empty".to_string()));
    }
    if !threshold.is_finite() {
        return Err(CorrelationError::InvalidInput(format!(
            "detection threshold must be finite, got {}",
            threshold
        )));
    }
    Ok(())
}

fn stop_to_start(stop: StopIndicator, template_len: usize) -> Option<usize> {
    match stop {
        StopIndicator::Completed => None,
        StopIndicator::StoppedAt(k) => {
            let start = window_start(k, template_len);
            debug!("sequence detected at tap {} (window start {})", k, start);
            Some(start)
        }
    }
}

// Tap k aligns template[len - 1] with received[k]
fn window_start(tap: usize, template_len: usize) -> usize {
    (tap + 1).saturating_sub(template_len)
}
