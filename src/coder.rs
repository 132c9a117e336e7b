//! Whole-message arithmetic coder.
//!
//! Encoding narrows `[0, 1]` once per symbol and picks a value in the final
//! interval; decoding replays the same narrowing, choosing at each stage the
//! first symbol whose sub-interval contains the value. The message length is
//! not stored and must travel alongside the value.

use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, trace, warn};

use crate::config::CoderConfig;
use crate::error::{Error, Result};
use crate::history::History;
use crate::model::{FrequencyTable, Interval, ProbabilityModel, StagePartition};
use crate::quantize::{BinaryCode, Quantizer};

/// Final interval of an encoded message and the value chosen inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncodedResult {
    /// Lower bound of the final interval.
    pub min: Decimal,
    /// Upper bound of the final interval.
    pub max: Decimal,
    /// Representative value, the midpoint of the final interval.
    pub value: Decimal,
}

impl EncodedResult {
    /// The final interval.
    pub fn interval(&self) -> Interval {
        Interval {
            min: self.min,
            max: self.max,
        }
    }
}

/// Narrow `[0, 1]` by each symbol of `symbols`.
///
/// Computes one extra partition of the final interval and takes the value as
/// the middle of its outermost bounds.
pub fn encode_with<S, I>(
    model: &ProbabilityModel<S>,
    symbols: I,
    record: bool,
) -> Result<(EncodedResult, Vec<StagePartition>)>
where
    S: Eq + Hash + Clone + Debug,
    I: IntoIterator,
    I::Item: Borrow<S>,
{
    let mut stages = Vec::new();
    let mut interval = Interval::UNIT;
    let mut count = 0usize;

    for symbol in symbols {
        let symbol = symbol.borrow();
        let stage = model.partition(&interval);
        let next = model
            .position(symbol)
            .filter(|_| model.count(symbol).is_some_and(|c| c > 0))
            .and_then(|i| stage.get(i))
            .ok_or_else(|| Error::UnknownSymbol(format!("{symbol:?}")))?;
        if next.min >= next.max {
            debug!(stage = count, ?symbol, "interval collapsed");
            return Err(Error::PrecisionExhausted { stage: count });
        }
        trace!(stage = count, ?symbol, min = %next.min, max = %next.max, "narrow");
        interval = next;
        count += 1;
        if record {
            stages.push(stage);
        }
    }

    let last = model.partition(&interval);
    let (min, max) = last.bounds().unwrap_or((interval.min, interval.max));
    let value = ((min + max) / Decimal::TWO)
        .round_dp_with_strategy(model.precision(), RoundingStrategy::MidpointAwayFromZero);
    if !(min < value && value < max) {
        debug!(stage = count, %min, %max, %value, "no value strictly inside final interval");
        return Err(Error::PrecisionExhausted { stage: count });
    }
    if record {
        stages.push(last);
    }

    debug!(symbols = count, %min, %max, %value, "encoded");
    Ok((EncodedResult { min, max, value }, stages))
}

/// Recover `length` symbols from `value`.
///
/// A value lying on a shared edge resolves to the earlier symbol in table
/// order.
pub fn decode_with<S>(
    model: &ProbabilityModel<S>,
    value: Decimal,
    length: usize,
    record: bool,
) -> Result<(Vec<S>, Vec<StagePartition>)>
where
    S: Eq + Hash + Clone,
{
    let mut stages = Vec::new();
    let mut out = Vec::with_capacity(length);
    let mut interval = Interval::UNIT;

    for stage_no in 0..length {
        let stage = model.partition(&interval);
        let Some(i) = stage.find(value) else {
            debug!(stage = stage_no, %value, "no partition matches");
            return Err(Error::Decode {
                stage: stage_no,
                value,
            });
        };
        interval = stage.parts()[i];
        if interval.min >= interval.max {
            debug!(stage = stage_no, %value, "value selects a zero-width interval");
            return Err(Error::Decode {
                stage: stage_no,
                value,
            });
        }
        out.push(model.symbols()[i].clone());
        trace!(stage = stage_no, index = i, min = %interval.min, max = %interval.max, "select");
        if record {
            stages.push(stage);
        }
    }

    debug!(symbols = length, %value, "decoded");
    Ok((out, stages))
}

/// Arithmetic coder bound to one probability model.
///
/// The model is fixed at construction. Operations take `&mut self` only to
/// append to the optional [`History`]; use [`encode_with`] and
/// [`decode_with`] against a shared [`ProbabilityModel`] for concurrent
/// callers.
#[derive(Debug, Clone)]
pub struct ArithmeticCoder<S> {
    model: ProbabilityModel<S>,
    config: CoderConfig,
    history: Option<History>,
}

impl<S: Eq + Hash + Clone + Debug> ArithmeticCoder<S> {
    /// Create a coder with the default configuration.
    ///
    /// # Errors
    /// Returns `Error::InvalidModel` if the table's total count is zero.
    pub fn new(table: &FrequencyTable<S>) -> Result<Self> {
        Self::with_config(table, CoderConfig::default())
    }

    /// Create a coder with an explicit configuration.
    ///
    /// # Errors
    /// Returns a configuration error from [`CoderConfig::validate`], or
    /// `Error::InvalidModel` if the table's total count is zero.
    pub fn with_config(table: &FrequencyTable<S>, config: CoderConfig) -> Result<Self> {
        config.validate()?;
        let model = ProbabilityModel::build(table, config.precision)?;
        let history = if config.save_history {
            warn!(
                symbols = model.len(),
                "stage history enabled; memory grows with message length times alphabet size"
            );
            Some(History::default())
        } else {
            None
        };
        debug!(symbols = model.len(), precision = config.precision, "coder ready");
        Ok(Self {
            model,
            config,
            history,
        })
    }

    /// The probability model.
    pub fn model(&self) -> &ProbabilityModel<S> {
        &self.model
    }

    /// The configuration this coder was built with.
    pub fn config(&self) -> &CoderConfig {
        &self.config
    }

    /// Recorded stages, if history was enabled.
    pub fn history(&self) -> Option<&History> {
        self.history.as_ref()
    }

    /// Encode a message into its final interval and representative value.
    ///
    /// An empty message yields `[0, 1]` with value 0.5.
    ///
    /// # Errors
    /// - `Error::UnknownSymbol` for a symbol outside the alphabet or one
    ///   trained with a zero count.
    /// - `Error::PrecisionExhausted` once rounding to the configured
    ///   precision collapses the interval. This includes a symbol whose
    ///   positive count rounds to a zero probability.
    pub fn encode<I>(&mut self, symbols: I) -> Result<EncodedResult>
    where
        I: IntoIterator,
        I::Item: Borrow<S>,
    {
        let (result, stages) = encode_with(&self.model, symbols, self.history.is_some())?;
        if let Some(history) = self.history.as_mut() {
            history.extend_encode(stages);
        }
        Ok(result)
    }

    /// Decode `length` symbols from `value`.
    ///
    /// # Errors
    /// Returns `Error::Decode` if the value falls outside every sub-interval
    /// at some stage, or selects a zero-width one.
    pub fn decode(&mut self, value: Decimal, length: usize) -> Result<Vec<S>> {
        let (out, stages) = decode_with(&self.model, value, length, self.history.is_some())?;
        if let Some(history) = self.history.as_mut() {
            history.extend_decode(stages);
        }
        Ok(out)
    }

    /// First binary code along the bisection path whose cell fits inside
    /// `[min, max)`.
    ///
    /// # Errors
    /// Returns `Error::InvalidInterval` for malformed bounds, or
    /// `Error::QuantizationOverflow` if the search exceeds
    /// `config.max_code_bits`.
    pub fn encode_binary(&mut self, min: Decimal, max: Decimal) -> Result<BinaryCode> {
        let quantizer = Quantizer::new(self.config.max_code_bits);
        let (code, stages) = quantizer.search(min, max, self.history.is_some())?;
        if let Some(history) = self.history.as_mut() {
            history.extend_binary(stages);
        }
        Ok(code)
    }

    /// Encode a message and quantize its final interval.
    ///
    /// # Errors
    /// Any error from [`encode`](Self::encode) or
    /// [`encode_binary`](Self::encode_binary).
    pub fn encode_to_binary<I>(&mut self, symbols: I) -> Result<(EncodedResult, BinaryCode)>
    where
        I: IntoIterator,
        I::Item: Borrow<S>,
    {
        let encoded = self.encode(symbols)?;
        let code = self.encode_binary(encoded.min, encoded.max)?;
        Ok((encoded, code))
    }

    /// Decode `length` symbols from a binary code.
    ///
    /// Uses the midpoint of the code's cell, which lies strictly inside the
    /// final interval and so never sits on a partition edge.
    ///
    /// # Errors
    /// Returns `Error::Decode` if the code does not belong to this model.
    pub fn decode_binary(&mut self, code: &BinaryCode, length: usize) -> Result<Vec<S>> {
        self.decode(code.midpoint(), length)
    }
}
