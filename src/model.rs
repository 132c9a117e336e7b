//! Probability model: frequency tables, intervals and stage partitions.
//!
//! The model fixes an order over the alphabet (the insertion order of the
//! frequency table). Every partition, every decode scan and every history
//! snapshot walks the alphabet in that order, so encode and decode always
//! carve an interval into the same sub-intervals.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{Error, Result};

/// Symbol counts in first-insertion order.
#[derive(Debug, Clone)]
pub struct FrequencyTable<S> {
    entries: Vec<(S, u64)>,
    index: HashMap<S, usize>,
}

impl<S: Eq + Hash + Clone> FrequencyTable<S> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Count every symbol of a message, ordered by first appearance.
    pub fn from_symbols<I>(symbols: I) -> Self
    where
        I: IntoIterator,
        I::Item: Borrow<S>,
    {
        let mut table = Self::new();
        for symbol in symbols {
            table.insert(symbol.borrow().clone(), 1);
        }
        table
    }

    /// Add `count` occurrences of `symbol`.
    ///
    /// A symbol seen for the first time is appended; a known symbol keeps its
    /// position and accumulates the count.
    pub fn insert(&mut self, symbol: S, count: u64) {
        match self.index.get(&symbol) {
            Some(&i) => self.entries[i].1 = self.entries[i].1.saturating_add(count),
            None => {
                self.index.insert(symbol.clone(), self.entries.len());
                self.entries.push((symbol, count));
            }
        }
    }

    /// Count recorded for `symbol`, if present.
    pub fn count(&self, symbol: &S) -> Option<u64> {
        self.index.get(symbol).map(|&i| self.entries[i].1)
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, (_, c)| acc.saturating_add(*c))
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no symbols.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(symbol, count)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&S, u64)> {
        self.entries.iter().map(|(s, c)| (s, *c))
    }
}

impl<S: Eq + Hash + Clone> Default for FrequencyTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Eq + Hash + Clone> FromIterator<(S, u64)> for FrequencyTable<S> {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (symbol, count) in iter {
            table.insert(symbol, count);
        }
        table
    }
}

/// A closed range `[min, max]` of decimal values inside `[0, 1]`.
///
/// Intervals produced by narrowing are treated as half-open when reasoning
/// about coverage; decoding tests membership inclusively on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    /// Lower bound.
    pub min: Decimal,
    /// Upper bound.
    pub max: Decimal,
}

impl Interval {
    /// The unit interval `[0, 1]`.
    pub const UNIT: Interval = Interval {
        min: Decimal::ZERO,
        max: Decimal::ONE,
    };

    /// Create an interval, checking `0 <= min < max <= 1`.
    ///
    /// # Errors
    /// Returns `Error::InvalidInterval` if the bounds are out of order or
    /// outside the unit interval.
    pub fn new(min: Decimal, max: Decimal) -> Result<Self> {
        if min < Decimal::ZERO || max > Decimal::ONE || min >= max {
            return Err(Error::InvalidInterval { min, max });
        }
        Ok(Self { min, max })
    }

    /// `max - min`.
    pub fn width(&self) -> Decimal {
        self.max - self.min
    }

    /// Inclusive membership test, `min <= value <= max`.
    pub fn contains(&self, value: Decimal) -> bool {
        self.min <= value && value <= self.max
    }

    /// Whether `other` lies inside `self`.
    pub fn encloses(&self, other: &Interval) -> bool {
        self.min <= other.min && other.max <= self.max
    }
}

/// One interval carved into per-symbol sub-intervals, in table order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StagePartition {
    parent: Interval,
    parts: Vec<Interval>,
}

impl StagePartition {
    /// The interval that was partitioned.
    pub fn parent(&self) -> Interval {
        self.parent
    }

    /// Sub-intervals in table order.
    pub fn parts(&self) -> &[Interval] {
        &self.parts
    }

    /// Sub-interval of the symbol at table position `index`.
    pub fn get(&self, index: usize) -> Option<Interval> {
        self.parts.get(index).copied()
    }

    /// Smallest and largest bound across all sub-intervals.
    pub fn bounds(&self) -> Option<(Decimal, Decimal)> {
        let mut flat = self.parts.iter().flat_map(|p| [p.min, p.max]);
        let first = flat.next()?;
        Some(flat.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// Position of the first sub-interval containing `value` (inclusive).
    pub fn find(&self, value: Decimal) -> Option<usize> {
        self.parts.iter().position(|p| p.contains(value))
    }
}

/// Symbol probabilities derived from a frequency table.
///
/// Immutable once built; it is safe to share between threads.
#[derive(Debug, Clone)]
pub struct ProbabilityModel<S> {
    symbols: Vec<S>,
    counts: Vec<u64>,
    probabilities: Vec<Decimal>,
    index: HashMap<S, usize>,
    precision: u32,
}

impl<S: Eq + Hash + Clone> ProbabilityModel<S> {
    /// Build probabilities `count / total`, rounded to `precision` places.
    ///
    /// # Errors
    /// Returns `Error::InvalidModel` if the table is empty or its total is
    /// zero.
    pub fn build(table: &FrequencyTable<S>, precision: u32) -> Result<Self> {
        let total = table.total();
        if total == 0 {
            return Err(Error::InvalidModel { total });
        }
        let total_dec = Decimal::from(total);

        let mut symbols = Vec::with_capacity(table.len());
        let mut counts = Vec::with_capacity(table.len());
        let mut probabilities = Vec::with_capacity(table.len());
        let mut index = HashMap::with_capacity(table.len());
        for (i, (symbol, count)) in table.iter().enumerate() {
            let p = round(Decimal::from(count) / total_dec, precision);
            index.insert(symbol.clone(), i);
            symbols.push(symbol.clone());
            counts.push(count);
            probabilities.push(p);
        }

        Ok(Self {
            symbols,
            counts,
            probabilities,
            index,
            precision,
        })
    }

    /// Decimal places kept by every arithmetic step.
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Alphabet in table order.
    pub fn symbols(&self) -> &[S] {
        &self.symbols
    }

    /// Number of symbols in the alphabet.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the alphabet is empty (never true for a built model).
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Table position of `symbol`.
    pub fn position(&self, symbol: &S) -> Option<usize> {
        self.index.get(symbol).copied()
    }

    /// Count `symbol` was trained with, if it belongs to the alphabet.
    pub fn count(&self, symbol: &S) -> Option<u64> {
        self.position(symbol).map(|i| self.counts[i])
    }

    /// Probability of `symbol`, if it belongs to the alphabet.
    pub fn probability(&self, symbol: &S) -> Option<Decimal> {
        self.position(symbol).map(|i| self.probabilities[i])
    }

    /// Iterate `(symbol, probability)` in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&S, Decimal)> {
        self.symbols.iter().zip(self.probabilities.iter().copied())
    }

    /// Pair each sub-interval of `stage` with its symbol.
    pub fn label<'a>(
        &'a self,
        stage: &'a StagePartition,
    ) -> impl Iterator<Item = (&'a S, Interval)> + 'a {
        self.symbols.iter().zip(stage.parts.iter().copied())
    }

    /// Carve `interval` into contiguous per-symbol sub-intervals.
    ///
    /// Each width is `probability * (max - min)`, rounded to the model
    /// precision. The first sub-interval starts at `interval.min`; the last
    /// ends exactly at `interval.max`, absorbing rounding slack.
    pub fn partition(&self, interval: &Interval) -> StagePartition {
        let range = interval.width();
        let last = self.probabilities.len().saturating_sub(1);

        let mut parts = Vec::with_capacity(self.probabilities.len());
        let mut lo = interval.min;
        for (i, p) in self.probabilities.iter().enumerate() {
            let hi = if i == last {
                interval.max
            } else {
                (lo + round(*p * range, self.precision)).min(interval.max)
            };
            parts.push(Interval { min: lo, max: hi });
            lo = hi;
        }

        StagePartition {
            parent: *interval,
            parts,
        }
    }

    pub(crate) fn round(&self, value: Decimal) -> Decimal {
        round(value, self.precision)
    }
}

fn round(value: Decimal, precision: u32) -> Decimal {
    value.round_dp_with_strategy(precision, RoundingStrategy::MidpointNearestEven)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(n: i64, scale: u32) -> Decimal {
        Decimal::new(n, scale)
    }

    #[test]
    fn test_frequency_table_keeps_first_appearance_order() {
        let table = FrequencyTable::<char>::from_symbols("abracadabra".chars());
        let order: Vec<_> = table.iter().map(|(s, c)| (*s, c)).collect();
        assert_eq!(
            order,
            vec![('a', 5), ('b', 2), ('r', 2), ('c', 1), ('d', 1)]
        );
        assert_eq!(table.total(), 11);
        assert_eq!(table.count(&'z'), None);
    }

    #[test]
    fn test_build_rejects_zero_total() {
        let table: FrequencyTable<char> = [('X', 0)].into_iter().collect();
        assert_eq!(
            ProbabilityModel::build(&table, 28).unwrap_err(),
            Error::InvalidModel { total: 0 }
        );
        let empty = FrequencyTable::<char>::new();
        assert!(ProbabilityModel::build(&empty, 28).is_err());
    }

    #[test]
    fn test_build_preserves_order_and_probabilities() {
        let table: FrequencyTable<char> = [('b', 3), ('a', 1)].into_iter().collect();
        let model = ProbabilityModel::build(&table, 28).unwrap();
        assert_eq!(model.symbols(), &['b', 'a']);
        assert_eq!(model.probability(&'b'), Some(dec(75, 2)));
        assert_eq!(model.probability(&'a'), Some(dec(25, 2)));
        assert_eq!(model.probability(&'z'), None);
        assert_eq!(model.count(&'b'), Some(3));
    }

    #[test]
    fn test_uniform_binary_partition() {
        let table: FrequencyTable<char> = [('A', 1), ('B', 1)].into_iter().collect();
        let model = ProbabilityModel::build(&table, 28).unwrap();

        let stage = model.partition(&Interval::UNIT);
        assert_eq!(stage.parts()[0], Interval { min: dec(0, 0), max: dec(5, 1) });
        assert_eq!(stage.parts()[1], Interval { min: dec(5, 1), max: dec(1, 0) });

        let stage = model.partition(&stage.parts()[0]);
        assert_eq!(stage.parts()[0], Interval { min: dec(0, 0), max: dec(25, 2) });
        assert_eq!(stage.parts()[1], Interval { min: dec(25, 2), max: dec(5, 1) });
    }

    #[test]
    fn test_find_prefers_earlier_symbol_on_shared_edge() {
        let table: FrequencyTable<char> = [('A', 1), ('B', 1)].into_iter().collect();
        let model = ProbabilityModel::build(&table, 28).unwrap();
        let stage = model.partition(&Interval::UNIT);
        assert_eq!(stage.find(dec(5, 1)), Some(0));
        assert_eq!(stage.find(dec(6, 1)), Some(1));
        assert_eq!(stage.find(dec(11, 1)), None);
    }

    #[test]
    fn test_interval_new_validates() {
        assert!(Interval::new(dec(25, 2), dec(5, 1)).is_ok());
        assert!(Interval::new(dec(5, 1), dec(5, 1)).is_err());
        assert!(Interval::new(dec(-1, 1), dec(5, 1)).is_err());
        assert!(Interval::new(dec(0, 0), dec(11, 1)).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_partition_covers_parent(
            counts in prop::collection::vec(1u64..1000, 1..12),
            lo in 0u32..900_000,
            span in 1u32..100_000,
        ) {
            let table: FrequencyTable<usize> = counts.into_iter().enumerate().collect();
            let model = ProbabilityModel::build(&table, 28).unwrap();
            let parent = Interval {
                min: Decimal::new(lo as i64, 6),
                max: Decimal::new((lo + span) as i64, 6),
            };
            let stage = model.partition(&parent);

            prop_assert_eq!(stage.parts().len(), model.len());
            prop_assert_eq!(stage.parts()[0].min, parent.min);
            prop_assert_eq!(stage.parts().last().unwrap().max, parent.max);
            for pair in stage.parts().windows(2) {
                prop_assert_eq!(pair[0].max, pair[1].min);
                prop_assert!(pair[0].min <= pair[0].max);
            }
            let total: Decimal = stage.parts().iter().map(Interval::width).sum();
            prop_assert_eq!(total, parent.width());
            prop_assert_eq!(stage.bounds(), Some((parent.min, parent.max)));
        }
    }
}
