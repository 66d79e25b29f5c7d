//! Windowed time-domain correlation for real and complex sample sequences
//!
//! Computes cross-correlation (and autocorrelation as a special case) with a
//! caller-chosen output length and optional early-stop bounds.
//!
//! # Indexing
//!
//! For a `reference` of length M and a `local` of length N, the natural
//! correlation length is `M + N - 1`. Output index k holds
//!
//! ```text
//! output[k] = Σ_i reference[i] · w(local, i - k + N - 1)
//! ```
//!
//! where `w` yields `local[j]` (conjugated on the complex path) for a valid
//! index j and contributes nothing otherwise. Index `N - 1` is therefore the
//! zero-lag tap where `local[0]` aligns with `reference[0]`. The sum runs over
//! the contiguous range `max(0, k - N + 1) ..= min(k, M - 1)`, which covers the
//! rising, plateau and falling overlap regions without special cases.
//!
//! # Output length
//!
//! - Shorter than natural: only the leading positions are computed and a
//!   [`LengthCheck::Truncated`] diagnostic is logged and returned.
//! - Longer than natural: the tail is zero and [`LengthCheck::Padded`] reports
//!   how many padding values were written.
//!
//! # Early stop
//!
//! After each tap is written it is checked against [`StopBounds`]. The real
//! path stops when the value rises above `max` or falls below `min`. The
//! complex path only compares the magnitude against `max`; `min` has no
//! complex counterpart and is ignored there. A stop is reported as
//! [`StopIndicator::StoppedAt`] and is never an error.

use log::{debug, info, warn};
use std::ops::{Add, Mul};

use crate::complex::{Complex, ComplexOps};
use crate::error::{CorrelationError, Result};
use crate::{MAX_THRESHOLD_DISABLED, MIN_THRESHOLD_DISABLED};

/// Number of shift positions with at least one overlapping sample pair.
///
/// Zero when either input is empty.
pub const fn natural_length(reference_len: usize, local_len: usize) -> usize {
    if reference_len == 0 || local_len == 0 {
        0
    } else {
        reference_len + local_len - 1
    }
}

/// Early-stop bounds. `None` disables a bound.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StopBounds {
    pub max: Option<f64>,
    pub min: Option<f64>,
}

impl StopBounds {
    /// Both bounds disabled: the correlation always runs to completion.
    pub const NONE: Self = Self { max: None, min: None };

    pub const fn new(max: Option<f64>, min: Option<f64>) -> Self {
        Self { max, min }
    }

    /// Only an upper bound.
    pub const fn upper(max: f64) -> Self {
        Self { max: Some(max), min: None }
    }

    /// Only a lower bound.
    pub const fn lower(min: f64) -> Self {
        Self { max: None, min: Some(min) }
    }

    /// Build bounds from raw threshold values where the link-simulator
    /// sentinels [`MAX_THRESHOLD_DISABLED`] and [`MIN_THRESHOLD_DISABLED`]
    /// mean "no bound".
    pub fn from_sentinels(max: f64, min: f64) -> Self {
        Self {
            max: (max != MAX_THRESHOLD_DISABLED).then_some(max),
            min: (min != MIN_THRESHOLD_DISABLED).then_some(min),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.max.is_none() && self.min.is_none()
    }

    /// Real-path check: above `max` or below `min`.
    fn exceeded_by(&self, value: f64) -> bool {
        self.max.is_some_and(|max| value > max) || self.min.is_some_and(|min| value < min)
    }

    /// Complex-path check: only the upper bound applies, to the magnitude.
    fn magnitude_exceeds(&self, magnitude: f64) -> bool {
        self.max.is_some_and(|max| magnitude > max)
    }
}

/// How a correlation pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopIndicator {
    /// Every requested position was computed.
    Completed,
    /// A bound was crossed by the tap at this index; later taps were not computed.
    StoppedAt(usize),
}

impl StopIndicator {
    pub fn is_completed(&self) -> bool {
        matches!(self, StopIndicator::Completed)
    }

    pub fn stop_index(&self) -> Option<usize> {
        match self {
            StopIndicator::Completed => None,
            StopIndicator::StoppedAt(k) => Some(*k),
        }
    }
}

/// Requested output length compared to the natural correlation length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthCheck {
    Exact,
    /// Only `requested` of the `natural` positions are computed.
    Truncated { natural: usize, requested: usize },
    /// `padding` zero values follow the `natural` computed positions.
    Padded { natural: usize, padding: usize },
}

impl LengthCheck {
    pub fn evaluate(natural: usize, requested: usize) -> Self {
        if requested < natural {
            LengthCheck::Truncated { natural, requested }
        } else if requested > natural {
            LengthCheck::Padded {
                natural,
                padding: requested - natural,
            }
        } else {
            LengthCheck::Exact
        }
    }

    fn report(&self) {
        match *self {
            LengthCheck::Exact => {}
            LengthCheck::Truncated { natural, requested } => warn!(
                "correlation output truncated: {} of {} positions requested",
                requested, natural
            ),
            LengthCheck::Padded { natural, padding } => info!(
                "correlation output has {} zero-padded values after position {}",
                padding, natural
            ),
        }
    }
}

/// Status of a correlation written into a caller-supplied buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub stop: StopIndicator,
    pub length: LengthCheck,
}

/// Owned correlation output with its status.
#[derive(Debug, Clone, PartialEq)]
pub struct Correlation<T> {
    pub values: Vec<T>,
    pub stop: StopIndicator,
    pub length: LengthCheck,
}

impl<T> Correlation<T> {
    fn from_parts(values: Vec<T>, outcome: Outcome) -> Self {
        Self {
            values,
            stop: outcome.stop,
            length: outcome.length,
        }
    }
}

/// Shared bounded-sum kernel. `weights` is `local` as it should enter the
/// product (already conjugated on the complex path). `output` must be zeroed.
fn run_window<T, F>(output: &mut [T], reference: &[T], weights: &[T], should_stop: F) -> StopIndicator
where
    T: Copy + Default + Add<Output = T> + Mul<Output = T>,
    F: Fn(T) -> bool,
{
    let m = reference.len();
    let n = weights.len();
    let computed = output.len().min(natural_length(m, n));

    for k in 0..computed {
        let first = k.saturating_sub(n - 1);
        let last = k.min(m - 1);
        // weight index for reference[i] is i + n - 1 - k, contiguous in i
        let offset = first + n - 1 - k;
        let window = &weights[offset..=offset + (last - first)];

        let tap = reference[first..=last]
            .iter()
            .zip(window)
            .fold(T::default(), |acc, (&r, &w)| acc + r * w);
        output[k] = tap;

        if should_stop(tap) {
            return StopIndicator::StoppedAt(k);
        }
    }

    StopIndicator::Completed
}

/// Real cross-correlation into a caller-supplied buffer.
///
/// The buffer length is the requested output length. It is zeroed before
/// computation, so positions after an early stop read as zero.
pub fn correlate_real_into(
    output: &mut [f64],
    reference: &[f64],
    local: &[f64],
    bounds: StopBounds,
) -> Outcome {
    let length = LengthCheck::evaluate(natural_length(reference.len(), local.len()), output.len());
    length.report();

    output.fill(0.0);
    let stop = run_window(output, reference, local, |tap| bounds.exceeded_by(tap));
    if let StopIndicator::StoppedAt(k) = stop {
        debug!("real correlation stopped at index {} (value {})", k, output[k]);
    }

    Outcome { stop, length }
}

/// Real cross-correlation returning `output_len` values.
pub fn correlate_real(
    reference: &[f64],
    local: &[f64],
    output_len: usize,
    bounds: StopBounds,
) -> Correlation<f64> {
    let mut values = vec![0.0; output_len];
    let outcome = correlate_real_into(&mut values, reference, local, bounds);
    Correlation::from_parts(values, outcome)
}

/// Complex cross-correlation of `reference` with the conjugate of `local`,
/// into a caller-supplied buffer.
///
/// # Errors
///
/// Returns [`CorrelationError::ScratchAllocation`] if the conjugate scratch
/// buffer cannot be reserved. Nothing is written to `output` in that case.
pub fn correlate_complex_into(
    output: &mut [Complex],
    reference: &[Complex],
    local: &[Complex],
    bounds: StopBounds,
) -> Result<Outcome> {
    let conjugated = conjugated_copy(local)?;

    let length = LengthCheck::evaluate(natural_length(reference.len(), local.len()), output.len());
    length.report();

    if bounds.min.is_some() {
        debug!("minimum bound has no complex counterpart and is ignored");
    }

    output.fill(Complex::default());
    let stop = run_window(output, reference, &conjugated, |tap| {
        bounds.magnitude_exceeds(tap.magnitude())
    });
    if let StopIndicator::StoppedAt(k) = stop {
        debug!(
            "complex correlation stopped at index {} (magnitude {})",
            k,
            output[k].magnitude()
        );
    }

    Ok(Outcome { stop, length })
}

/// Complex cross-correlation returning `output_len` values.
///
/// # Errors
///
/// See [`correlate_complex_into`].
pub fn correlate_complex(
    reference: &[Complex],
    local: &[Complex],
    output_len: usize,
    bounds: StopBounds,
) -> Result<Correlation<Complex>> {
    let mut values = vec![Complex::default(); output_len];
    let outcome = correlate_complex_into(&mut values, reference, local, bounds)?;
    Ok(Correlation::from_parts(values, outcome))
}

fn conjugated_copy(local: &[Complex]) -> Result<Vec<Complex>> {
    let mut scratch = Vec::new();
    scratch
        .try_reserve_exact(local.len())
        .map_err(|_| CorrelationError::ScratchAllocation { len: local.len() })?;
    scratch.extend(local.iter().map(|s| s.conjugate()));
    Ok(scratch)
}

/// Unbounded real cross-correlation.
pub fn xcorr_real(reference: &[f64], local: &[f64], output_len: usize) -> Correlation<f64> {
    correlate_real(reference, local, output_len, StopBounds::NONE)
}

/// Unbounded complex cross-correlation.
pub fn xcorr_complex(
    reference: &[Complex],
    local: &[Complex],
    output_len: usize,
) -> Result<Correlation<Complex>> {
    correlate_complex(reference, local, output_len, StopBounds::NONE)
}

/// Real autocorrelation: `signal` correlated with itself.
pub fn autocorrelate_real(signal: &[f64], output_len: usize, bounds: StopBounds) -> Correlation<f64> {
    correlate_real(signal, signal, output_len, bounds)
}

/// Complex autocorrelation: `signal` correlated with its own conjugate.
pub fn autocorrelate_complex(
    signal: &[Complex],
    output_len: usize,
    bounds: StopBounds,
) -> Result<Correlation<Complex>> {
    correlate_complex(signal, signal, output_len, bounds)
}
