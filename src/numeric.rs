//! Conversion between binary-fraction strings and decimal values.
//!
//! A binary fraction is written `"<int>.<bits>"` where `<int>` is `0` or `1`
//! and `<bits>` is a (possibly empty) run of `0`/`1` digits, e.g. `"0.011"`
//! for 0.375. The only accepted value with integer part `1` is exactly one
//! (`"1.0"`, `"1.000"`), which the quantizer uses as the top of `[0, 1)`.

use rust_decimal::Decimal;

use crate::error::{Error, Result};

/// Split a binary-fraction string into its integer digit and fraction bits.
fn split(fraction: &str) -> Result<(bool, &str)> {
    let invalid = || Error::InvalidBinary(fraction.to_string());
    let (int, bits) = fraction.split_once('.').ok_or_else(invalid)?;
    if !bits.bytes().all(|b| b == b'0' || b == b'1') {
        return Err(invalid());
    }
    match int {
        "0" => Ok((false, bits)),
        "1" if !bits.contains('1') => Ok((true, bits)),
        _ => Err(invalid()),
    }
}

/// Decimal value of a binary-fraction string.
///
/// Bits whose weight falls below 10^-28 contribute nothing.
///
/// # Errors
/// Returns `Error::InvalidBinary` if the string is malformed or exceeds one.
pub fn to_value(fraction: &str) -> Result<Decimal> {
    let (one, bits) = split(fraction)?;
    if one {
        return Ok(Decimal::ONE);
    }
    Ok(bits_value(bits.bytes().map(|b| b == b'1')))
}

/// Decimal value of a sequence of bits following the radix point.
pub(crate) fn bits_value(bits: impl IntoIterator<Item = bool>) -> Decimal {
    let mut value = Decimal::ZERO;
    let mut weight = Decimal::ONE;
    for bit in bits {
        weight /= Decimal::TWO;
        if weight.is_zero() {
            break;
        }
        if bit {
            value += weight;
        }
    }
    value
}

/// Binary-fraction string of `value`, truncated to `bits` fraction bits.
///
/// # Errors
/// Returns `Error::InvalidBinary` if `value` is outside `[0, 1]`.
pub fn to_binary(value: Decimal, bits: usize) -> Result<String> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(Error::InvalidBinary(value.to_string()));
    }
    if value == Decimal::ONE {
        return Ok(format!("1.{}", "0".repeat(bits.max(1))));
    }

    let mut out = String::with_capacity(bits + 2);
    out.push_str("0.");
    let mut rest = value;
    for _ in 0..bits {
        rest *= Decimal::TWO;
        if rest >= Decimal::ONE {
            out.push('1');
            rest -= Decimal::ONE;
        } else {
            out.push('0');
        }
    }
    if bits == 0 {
        out.push('0');
    }
    Ok(out)
}
