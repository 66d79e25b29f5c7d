//! Bit-level helpers for scoring demapped decisions against the source.

use crate::error::{CorrelationError, Result};

/// 4-bit Gray code table: `GRAY_MAPPING[v]` is the Gray label of `v`.
pub const GRAY_MAPPING: [u8; 16] = [0, 1, 3, 2, 6, 7, 5, 4, 12, 13, 15, 14, 10, 11, 9, 8];

/// Count positions where two decision sequences differ.
///
/// Only the overlapping prefix is compared.
pub fn count_bit_errors(expected: &[u8], decided: &[u8]) -> usize {
    expected
        .iter()
        .zip(decided)
        .filter(|(a, b)| a != b)
        .count()
}

pub fn gray_encode(value: u8) -> Result<u8> {
    GRAY_MAPPING
        .get(value as usize)
        .copied()
        .ok_or_else(|| CorrelationError::InvalidInput(format!("{} is not a 4-bit value", value)))
}

pub fn gray_decode(label: u8) -> Result<u8> {
    GRAY_MAPPING
        .iter()
        .position(|&g| g == label)
        .map(|v| v as u8)
        .ok_or_else(|| CorrelationError::InvalidInput(format!("{} is not a 4-bit Gray label", label)))
}
