//! Error types for arithmetic coding.

use rust_decimal::Decimal;
use thiserror::Error;

/// Error variants for coder operations.
///
/// Every operation is all-or-nothing: an error leaves the coder's probability
/// table untouched, so the same instance can serve the next call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The frequency table is empty or its counts sum to zero.
    #[error("invalid model: total frequency must be positive (got {total})")]
    InvalidModel {
        /// Sum of all counts in the offending table.
        total: u64,
    },

    /// A symbol outside the trained alphabet was passed to `encode`.
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    /// The value matched no sub-interval at some narrowing stage.
    #[error("decode failed at stage {stage}: value {value} matches no partition")]
    Decode {
        /// Zero-based stage at which decoding stopped.
        stage: usize,
        /// The value being decoded.
        value: Decimal,
    },

    /// Rounding to the configured precision left a zero-width interval, or
    /// no value strictly inside the final interval, at `stage`.
    #[error("precision exhausted at stage {stage}: interval collapsed to zero width")]
    PrecisionExhausted {
        /// Zero-based symbol position at which the interval collapsed.
        stage: usize,
    },

    /// The binary search needed more bits than the configured maximum.
    #[error("quantization overflow: no code of at most {max_bits} bits fits the interval")]
    QuantizationOverflow {
        /// Configured bit-length bound.
        max_bits: usize,
    },

    /// Interval bounds do not satisfy `0 <= min < max <= 1`.
    #[error("invalid interval [{min}, {max})")]
    InvalidInterval {
        /// Lower bound.
        min: Decimal,
        /// Upper bound.
        max: Decimal,
    },

    /// A binary-fraction string could not be parsed.
    #[error("invalid binary fraction: {0:?}")]
    InvalidBinary(String),

    /// Decimal precision outside `1..=28`.
    #[error("invalid precision: {0} (expected 1..=28 decimal places)")]
    InvalidPrecision(u32),

    /// `max_code_bits` was configured as zero.
    #[error("invalid bit bound: max_code_bits must be positive")]
    InvalidBitBound,

    /// A packed prefix-code artifact is malformed.
    #[error("invalid packed data: {0}")]
    InvalidPacked(&'static str),
}

/// A specialized Result type for coder operations.
pub type Result<T> = std::result::Result<T, Error>;
