//! Coder configuration.

use crate::error::{Error, Result};

/// Largest number of decimal places a `Decimal` can carry.
pub const MAX_PRECISION: u32 = 28;

/// Default bound on the length of a quantized binary code.
pub const DEFAULT_MAX_CODE_BITS: usize = 96;

/// Settings fixed at coder construction.
///
/// `precision` is the number of decimal places every probability and interval
/// bound is rounded to. It bounds the longest message that can be encoded
/// before intervals collapse to zero width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoderConfig {
    /// Decimal places kept after every arithmetic step (1..=28).
    pub precision: u32,
    /// Longest binary code `encode_binary` may search before giving up.
    pub max_code_bits: usize,
    /// Record every stage partition. Memory grows with message length times
    /// alphabet size.
    pub save_history: bool,
}

impl CoderConfig {
    /// Configuration with default precision and history disabled.
    pub fn new() -> Self {
        Self {
            precision: MAX_PRECISION,
            max_code_bits: DEFAULT_MAX_CODE_BITS,
            save_history: false,
        }
    }

    /// Set the decimal precision.
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Set the maximum binary code length.
    pub fn with_max_code_bits(mut self, max_code_bits: usize) -> Self {
        self.max_code_bits = max_code_bits;
        self
    }

    /// Enable or disable stage history.
    pub fn with_history(mut self, save_history: bool) -> Self {
        self.save_history = save_history;
        self
    }

    /// Check that the settings are usable.
    ///
    /// # Errors
    /// Returns `Error::InvalidPrecision` if `precision` is outside `1..=28`,
    /// or `Error::InvalidBitBound` if `max_code_bits` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.precision == 0 || self.precision > MAX_PRECISION {
            return Err(Error::InvalidPrecision(self.precision));
        }
        if self.max_code_bits == 0 {
            return Err(Error::InvalidBitBound);
        }
        Ok(())
    }
}

impl Default for CoderConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = CoderConfig::default();
        assert_eq!(config.precision, 28);
        assert!(!config.save_history);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_precision() {
        assert_eq!(
            CoderConfig::new().with_precision(0).validate(),
            Err(Error::InvalidPrecision(0))
        );
        assert_eq!(
            CoderConfig::new().with_precision(29).validate(),
            Err(Error::InvalidPrecision(29))
        );
    }

    #[test]
    fn test_rejects_zero_bit_bound() {
        assert_eq!(
            CoderConfig::new().with_max_code_bits(0).validate(),
            Err(Error::InvalidBitBound)
        );
    }
}
