//! # Arithmetic Coding
//!
//! *A whole message as a single number.*
//!
//! ## Intuition First
//!
//! Take a ruler from 0 to 1 and cut it into pieces, one per symbol, each as
//! long as that symbol is likely. The first symbol of the message picks a
//! piece. Cut that piece the same way and let the second symbol pick again.
//! After the last symbol you hold a tiny interval, and any number inside it
//! names the whole message. Likely messages leave wide intervals, and wide
//! intervals need few digits to pin down.
//!
//! ## The Problem
//!
//! Prefix codes (Huffman) spend a whole number of bits on every symbol, so a
//! symbol with probability 0.9 still costs a full bit. Arithmetic coding
//! spends fractional bits by coding the message jointly, at the price of
//! arithmetic whose precision must grow with the message.
//!
//! ## Historical Context
//!
//! ```text
//! 1948  Shannon     Entropy as the fundamental limit
//! 1952  Huffman     Optimal prefix codes
//! 1963  Elias       Recursive interval subdivision (unpublished)
//! 1976  Rissanen    Arithmetic coding with finite precision
//! 1976  Pasco       Source coding algorithms for fast compression
//! 1987  Witten,     Practical arithmetic coding with renormalization
//!       Neal, Cleary
//! ```
//!
//! ## Mathematical Formulation
//!
//! With symbols `s_1..s_n` in a fixed order and probabilities `p_i`, an
//! interval `[lo, hi)` is cut at
//!
//! ```text
//! c_k = lo + (hi - lo) * (p_1 + ... + p_k)
//! ```
//!
//! and symbol `s_k` selects `[c_{k-1}, c_k)`. After the message the interval
//! width equals the product of the probabilities of its symbols, so about
//! `-log2(width)` bits identify it.
//!
//! ## Implementation Notes
//!
//! This crate keeps the whole message in one interval of exact decimals
//! (`rust_decimal`, at most 28 fractional digits) rather than emitting bits
//! as it goes. Precision is a configuration knob; once intervals shrink below
//! it, encoding stops being invertible. It provides:
//! - [`ProbabilityModel`]: counts to probabilities, interval partitioning.
//! - [`ArithmeticCoder`]: encode, decode, and binary quantization.
//! - [`quantize`]: a short binary fraction whose cell fits an interval.
//! - [`huffman`]: a prefix-code baseline over the same frequency tables.
//!
//! ```
//! use arithcode::{ArithmeticCoder, Decimal, FrequencyTable};
//!
//! let table: FrequencyTable<char> = [('A', 1), ('B', 1)].into_iter().collect();
//! let mut coder = ArithmeticCoder::new(&table).unwrap();
//!
//! let encoded = coder.encode("AB".chars()).unwrap();
//! assert_eq!(encoded.value, Decimal::new(375, 3));
//!
//! let code = coder.encode_binary(encoded.min, encoded.max).unwrap();
//! assert_eq!(code.bits(), "01");
//!
//! let decoded: String = coder.decode(encoded.value, 2).unwrap().into_iter().collect();
//! assert_eq!(decoded, "AB");
//! ```
//!
//! ## References
//!
//! - Rissanen, J. (1976). "Generalized Kraft inequality and arithmetic coding."
//! - Witten, I., Neal, R., Cleary, J. (1987). "Arithmetic coding for data compression."

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coder;
pub mod config;
pub mod error;
pub mod history;
pub mod huffman;
pub mod model;
pub mod numeric;
pub mod quantize;

pub use coder::{decode_with, encode_with, ArithmeticCoder, EncodedResult};
pub use config::CoderConfig;
pub use error::{Error, Result};
pub use history::History;
pub use huffman::HuffmanCode;
pub use model::{FrequencyTable, Interval, ProbabilityModel, StagePartition};
pub use quantize::{BinaryCode, BinaryStage, Quantizer};
pub use rust_decimal::Decimal;
