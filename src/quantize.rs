//! Binary quantization of a decimal interval.
//!
//! Finds a short binary fraction `0.b1b2...bk` whose dyadic cell
//! `[0.b1...bk, 0.b1...bk + 2^-k)` fits inside a target interval. The search
//! bisects `[0, 1)` bit by bit, following the half that holds the points just
//! below the target's upper bound, and stops at the first child cell that fits.

use std::fmt;

use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::model::Interval;
use crate::numeric;

/// A dyadic cell given by its two bound strings, e.g. `["0.01", "0.1"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinaryCell {
    /// Lower bound as a binary fraction.
    pub lo: String,
    /// Upper bound as a binary fraction.
    pub hi: String,
}

impl BinaryCell {
    fn new(lo: impl Into<String>, hi: impl Into<String>) -> Self {
        Self {
            lo: lo.into(),
            hi: hi.into(),
        }
    }

    /// Decimal bounds of the cell.
    pub fn interval(&self) -> Result<Interval> {
        Ok(Interval {
            min: numeric::to_value(&self.lo)?,
            max: numeric::to_value(&self.hi)?,
        })
    }

    fn fits(&self, target: &Interval) -> Result<bool> {
        Ok(target.encloses(&self.interval()?))
    }
}

/// One bisection step: the lower and upper halves of the current cell.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinaryStage {
    /// `[lo, lo + "1")`.
    pub lower: BinaryCell,
    /// `[lo + "1", hi)`.
    pub upper: BinaryCell,
}

impl BinaryStage {
    fn root() -> Self {
        Self {
            lower: BinaryCell::new("0.0", "0.1"),
            upper: BinaryCell::new("0.1", "1.0"),
        }
    }

    /// Split `cell` by appending one bit to its lower bound.
    fn split(cell: &BinaryCell) -> Self {
        let mid = format!("{}1", cell.lo);
        Self {
            lower: BinaryCell::new(format!("{}0", cell.lo), mid.clone()),
            upper: BinaryCell::new(mid, cell.hi.clone()),
        }
    }
}

/// A binary fraction, stored as the bits after the radix point.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinaryCode {
    bits: String,
}

impl BinaryCode {
    /// Create a code from a string of `0`/`1` digits.
    ///
    /// # Errors
    /// Returns `Error::InvalidBinary` on any other character.
    pub fn new(bits: impl Into<String>) -> Result<Self> {
        let bits = bits.into();
        if !bits.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(Error::InvalidBinary(bits));
        }
        Ok(Self { bits })
    }

    fn from_fraction(fraction: &str) -> Self {
        let bits = fraction.split_once('.').map_or("", |(_, b)| b);
        Self {
            bits: bits.to_string(),
        }
    }

    /// The bit string.
    pub fn bits(&self) -> &str {
        &self.bits
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the code has no bits.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Decimal value of `0.<bits>`.
    pub fn value(&self) -> Decimal {
        numeric::bits_value(self.bits.bytes().map(|b| b == b'1'))
    }

    /// The half-open cell `[value, value + 2^-len)` this code stands for.
    pub fn cell(&self) -> Interval {
        let min = self.value();
        let width = numeric::bits_value(std::iter::repeat(false).take(self.len()).chain([true]))
            * Decimal::TWO;
        Interval {
            min,
            max: min + width,
        }
    }

    /// Centre of [`cell`](Self::cell), strictly inside it.
    pub fn midpoint(&self) -> Decimal {
        let half = numeric::bits_value(std::iter::repeat(false).take(self.len()).chain([true]));
        self.value() + half
    }
}

impl fmt::Display for BinaryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.bits)
    }
}

/// Bounded bisection search for a fitting binary code.
///
/// The search follows the cell just below the target's upper bound and
/// returns the first fitting cell along that path. A shorter cell further
/// left can fit too: `[0.3, 0.55)` yields `10000` although `011` fits.
#[derive(Debug, Clone, Copy)]
pub struct Quantizer {
    max_bits: usize,
}

impl Quantizer {
    /// Create a quantizer that gives up beyond `max_bits` bits.
    pub fn new(max_bits: usize) -> Self {
        Self { max_bits }
    }

    /// Find the code for `[min, max)`.
    ///
    /// Returns the code and the bisection stages visited. Stages are only
    /// collected when `record` is set.
    ///
    /// # Errors
    /// - `Error::InvalidInterval` unless `0 <= min < max <= 1`.
    /// - `Error::QuantizationOverflow` if no code of at most `max_bits` bits
    ///   fits, which happens when the interval is narrower than the decimal
    ///   precision can resolve.
    pub fn search(
        &self,
        min: Decimal,
        max: Decimal,
        record: bool,
    ) -> Result<(BinaryCode, Vec<BinaryStage>)> {
        let target = Interval::new(min, max)?;
        let mut stages = Vec::new();
        let mut stage = BinaryStage::root();

        loop {
            let mid = numeric::to_value(&stage.lower.hi)?;
            let chosen = if target.max <= mid {
                stage.lower.clone()
            } else {
                stage.upper.clone()
            };
            if record {
                stages.push(stage);
            }

            stage = BinaryStage::split(&chosen);
            let depth = stage.lower.lo.len() - 2;
            if depth > self.max_bits {
                debug!(max_bits = self.max_bits, %min, %max, "binary search exhausted");
                return Err(Error::QuantizationOverflow {
                    max_bits: self.max_bits,
                });
            }
            trace!(depth, lo = %chosen.lo, hi = %chosen.hi, "bisect");

            for child in [&stage.lower, &stage.upper] {
                if child.fits(&target)? {
                    if record {
                        stages.push(stage.clone());
                    }
                    let code = BinaryCode::from_fraction(&child.lo);
                    debug!(bits = %code, len = code.len(), "quantized");
                    return Ok((code, stages));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64, scale: u32) -> Decimal {
        Decimal::new(n, scale)
    }

    #[test]
    fn test_quarter_to_half_is_two_bits() {
        let (code, _) = Quantizer::new(96).search(dec(25, 2), dec(5, 1), false).unwrap();
        assert_eq!(code.bits(), "01");
        assert_eq!(code.len(), 2);
        assert_eq!(code.value(), dec(25, 2));
    }

    #[test]
    fn test_code_cell_fits_target() {
        let min = dec(3, 1);
        let max = dec(45, 2);
        let (code, _) = Quantizer::new(96).search(min, max, false).unwrap();
        let cell = code.cell();
        assert!(cell.min >= min && cell.max <= max, "{code} -> {cell:?}");
        // [0.375, 0.5) overshoots 0.45; [0.375, 0.4375) is the first fit.
        assert_eq!(code.bits(), "0110");
    }

    #[test]
    fn test_first_fit_along_path_not_globally_shortest() {
        let (code, _) = Quantizer::new(96).search(dec(3, 1), dec(55, 2), false).unwrap();
        assert_eq!(code.bits(), "10000");
        let left = BinaryCode::new("011").unwrap().cell();
        assert!(left.min >= dec(3, 1) && left.max <= dec(55, 2));
        assert!(left.min < code.value());
    }

    #[test]
    fn test_whole_unit_interval() {
        let (code, _) = Quantizer::new(96).search(dec(0, 0), dec(1, 0), false).unwrap();
        assert_eq!(code.bits(), "10");
    }

    #[test]
    fn test_records_stages_only_when_asked() {
        let q = Quantizer::new(96);
        let (_, stages) = q.search(dec(25, 2), dec(5, 1), false).unwrap();
        assert!(stages.is_empty());
        let (_, stages) = q.search(dec(25, 2), dec(5, 1), true).unwrap();
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0], BinaryStage::root());
        assert_eq!(stages[1].upper, BinaryCell::new("0.01", "0.1"));
    }

    #[test]
    fn test_narrow_interval_overflows() {
        let min = dec(1, 1);
        let max = min + Decimal::new(1, 20);
        assert_eq!(
            Quantizer::new(16).search(min, max, false).unwrap_err(),
            Error::QuantizationOverflow { max_bits: 16 }
        );
    }

    #[test]
    fn test_rejects_invalid_interval() {
        let q = Quantizer::new(96);
        assert!(matches!(
            q.search(dec(5, 1), dec(25, 2), false),
            Err(Error::InvalidInterval { .. })
        ));
        assert!(q.search(dec(5, 1), dec(5, 1), false).is_err());
    }

    #[test]
    fn test_cell_and_midpoint() {
        let code = BinaryCode::new("011").unwrap();
        assert_eq!(code.value(), dec(375, 3));
        assert_eq!(code.cell(), Interval { min: dec(375, 3), max: dec(5, 1) });
        assert_eq!(code.midpoint(), dec(4375, 4));
        assert!(BinaryCode::new("012").is_err());
    }
}
