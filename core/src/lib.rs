//! Signal-processing toolkit for a communications link simulator
//!
//! Windowed real/complex correlation with zero-padding, truncation and
//! threshold-driven early stop, plus the sync and bit helpers built on it.

pub mod bits;
pub mod complex;
pub mod correlation;
pub mod error;
pub mod sync;

pub use complex::{Complex, ComplexOps};
pub use correlation::{
    autocorrelate_complex, autocorrelate_real, correlate_complex, correlate_complex_into,
    correlate_real, correlate_real_into, natural_length, xcorr_complex, xcorr_real, Correlation,
    LengthCheck, Outcome, StopBounds, StopIndicator,
};
pub use error::{CorrelationError, Result};

// Threshold sentinels meaning "bound disabled"
pub const MAX_THRESHOLD_DISABLED: f64 = -65534.0;
pub const MIN_THRESHOLD_DISABLED: f64 = 65533.0;

// Sync configuration
pub const BARKER_LENGTH: usize = 11;
pub const DEFAULT_DETECTION_THRESHOLD: f64 = 0.7 * BARKER_LENGTH as f64; // 7.7
