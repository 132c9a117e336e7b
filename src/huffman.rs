//! Huffman prefix codes.
//!
//! Builds a prefix code from a [`FrequencyTable`] and packs code bits into
//! bytes. Serves as a baseline against the arithmetic coder.
//!
//! # Packed layout
//!
//! ```text
//! byte 0      number of zero bits padding the last byte (0..=7)
//! byte 1..    code bits, most significant bit first
//! ```
//!
//! Ties between equal frequencies are broken by creation order: leaves in
//! table order first, then merged nodes in the order they were built.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

use crate::error::{Error, Result};
use crate::model::FrequencyTable;

/// Huffman tree node.
#[derive(Debug, Clone)]
enum Node {
    Leaf {
        index: usize,
        freq: u64,
        seq: usize,
    },
    Internal {
        left: Box<Node>,
        right: Box<Node>,
        freq: u64,
        seq: usize,
    },
}

impl Node {
    fn freq(&self) -> u64 {
        match self {
            Node::Leaf { freq, .. } => *freq,
            Node::Internal { freq, .. } => *freq,
        }
    }

    fn seq(&self) -> usize {
        match self {
            Node::Leaf { seq, .. } => *seq,
            Node::Internal { seq, .. } => *seq,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.freq() == other.freq() && self.seq() == other.seq()
    }
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-priority queue on (freq, seq).
        other
            .freq()
            .cmp(&self.freq())
            .then_with(|| other.seq().cmp(&self.seq()))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A prefix code over the symbols of a frequency table.
#[derive(Debug, Clone)]
pub struct HuffmanCode<S> {
    symbols: Vec<S>,
    codes: Vec<Vec<u8>>, // symbol index -> bit sequence
    index: HashMap<S, usize>,
    root: Option<Node>,
}

impl<S: Eq + Hash + Clone> HuffmanCode<S> {
    /// Build a code by repeatedly merging the two rarest nodes.
    ///
    /// Symbols with a zero count get no code. A single-symbol alphabet is
    /// coded as `0`.
    pub fn new(table: &FrequencyTable<S>) -> Self {
        let symbols: Vec<S> = table.iter().map(|(s, _)| s.clone()).collect();
        let index = symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();

        let mut pq = BinaryHeap::new();
        let mut seq = 0usize;
        for (i, (_, freq)) in table.iter().enumerate() {
            if freq > 0 {
                pq.push(Node::Leaf {
                    index: i,
                    freq,
                    seq,
                });
                seq += 1;
            }
        }

        while pq.len() > 1 {
            let (Some(left), Some(right)) = (pq.pop(), pq.pop()) else {
                break;
            };
            let freq = left.freq().saturating_add(right.freq());
            pq.push(Node::Internal {
                left: Box::new(left),
                right: Box::new(right),
                freq,
                seq,
            });
            seq += 1;
        }

        let root = pq.pop();
        let mut codes = vec![Vec::new(); symbols.len()];
        if let Some(root) = &root {
            Self::build_codes(root, Vec::new(), &mut codes);
        }

        Self {
            symbols,
            codes,
            index,
            root,
        }
    }

    fn build_codes(node: &Node, prefix: Vec<u8>, codes: &mut [Vec<u8>]) {
        match node {
            Node::Leaf { index, .. } => {
                codes[*index] = if prefix.is_empty() { vec![0] } else { prefix };
            }
            Node::Internal { left, right, .. } => {
                let mut left_prefix = prefix.clone();
                left_prefix.push(0);
                Self::build_codes(left, left_prefix, codes);

                let mut right_prefix = prefix;
                right_prefix.push(1);
                Self::build_codes(right, right_prefix, codes);
            }
        }
    }

    /// Code bits of `symbol`, if it has one.
    pub fn code(&self, symbol: &S) -> Option<&[u8]> {
        self.index
            .get(symbol)
            .map(|&i| self.codes[i].as_slice())
            .filter(|c| !c.is_empty())
    }

    /// Iterate `(symbol, code)` in table order, skipping uncoded symbols.
    pub fn iter(&self) -> impl Iterator<Item = (&S, &[u8])> {
        self.symbols
            .iter()
            .zip(self.codes.iter())
            .filter(|(_, c)| !c.is_empty())
            .map(|(s, c)| (s, c.as_slice()))
    }

    /// Encode a symbol sequence into a bit stream (one bit per byte).
    ///
    /// # Errors
    /// Returns `Error::UnknownSymbol` if a symbol has no code.
    pub fn encode(&self, data: &[S]) -> Result<Vec<u8>>
    where
        S: std::fmt::Debug,
    {
        let mut bits = Vec::new();
        for s in data {
            let code = self
                .code(s)
                .ok_or_else(|| Error::UnknownSymbol(format!("{s:?}")))?;
            bits.extend_from_slice(code);
        }
        Ok(bits)
    }

    /// Decode a bit stream into a symbol sequence.
    ///
    /// # Errors
    /// Returns `Error::InvalidPacked` if the stream ends inside a code.
    pub fn decode(&self, bits: &[u8]) -> Result<Vec<S>> {
        let Some(root) = self.root.as_ref() else {
            return Ok(Vec::new());
        };
        if let Node::Leaf { index, .. } = root {
            return Ok(vec![self.symbols[*index].clone(); bits.len()]);
        }

        let mut out = Vec::new();
        let mut curr = root;
        for &bit in bits {
            if let Node::Internal { left, right, .. } = curr {
                curr = if bit == 0 { left } else { right };
            }
            if let Node::Leaf { index, .. } = curr {
                out.push(self.symbols[*index].clone());
                curr = root;
            }
        }
        if !std::ptr::eq(curr, root) {
            return Err(Error::InvalidPacked("bit stream ends inside a code"));
        }
        Ok(out)
    }

    /// Encode and pack a message.
    ///
    /// # Errors
    /// Returns `Error::UnknownSymbol` if a symbol has no code.
    pub fn compress(&self, data: &[S]) -> Result<Vec<u8>>
    where
        S: std::fmt::Debug,
    {
        Ok(pack(&self.encode(data)?))
    }

    /// Unpack and decode a message produced by [`compress`](Self::compress).
    ///
    /// # Errors
    /// Returns `Error::InvalidPacked` for a malformed artifact.
    pub fn decompress(&self, packed: &[u8]) -> Result<Vec<S>> {
        self.decode(&unpack(packed)?)
    }
}

/// Pack one-bit-per-byte `bits` behind a padding header byte.
pub fn pack(bits: &[u8]) -> Vec<u8> {
    let padding = (8 - bits.len() % 8) % 8;
    let mut out = Vec::with_capacity(1 + (bits.len() + padding) / 8);
    out.push(padding as u8);
    for chunk in bits.chunks(8) {
        let byte = chunk
            .iter()
            .chain(std::iter::repeat(&0))
            .take(8)
            .fold(0u8, |acc, &b| (acc << 1) | (b & 1));
        out.push(byte);
    }
    out
}

/// Inverse of [`pack`].
///
/// # Errors
/// Returns `Error::InvalidPacked` if the header is missing, exceeds 7, or
/// claims padding in an empty payload.
pub fn unpack(packed: &[u8]) -> Result<Vec<u8>> {
    let (&padding, payload) = packed
        .split_first()
        .ok_or(Error::InvalidPacked("missing padding header"))?;
    if padding > 7 {
        return Err(Error::InvalidPacked("padding header above 7"));
    }
    if payload.is_empty() && padding != 0 {
        return Err(Error::InvalidPacked("padding without payload"));
    }

    let mut bits = Vec::with_capacity(payload.len() * 8);
    for &byte in payload {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1);
        }
    }
    bits.truncate(bits.len() - padding as usize);
    Ok(bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(text: &str) -> FrequencyTable<u8> {
        FrequencyTable::from_symbols(text.bytes())
    }

    #[test]
    fn test_huffman_roundtrip() {
        let data = b"abracadabra";
        let code = HuffmanCode::new(&table("abracadabra"));
        let bits = code.encode(data).unwrap();
        assert_eq!(data.to_vec(), code.decode(&bits).unwrap());
    }

    #[test]
    fn test_codes_are_prefix_free() {
        let code = HuffmanCode::new(&table("mississippi river"));
        let all: Vec<&[u8]> = code.iter().map(|(_, c)| c).collect();
        for (i, a) in all.iter().enumerate() {
            for (j, b) in all.iter().enumerate() {
                if i != j {
                    assert!(!b.starts_with(a), "{a:?} prefixes {b:?}");
                }
            }
        }
    }

    #[test]
    fn test_frequent_symbol_gets_shortest_code() {
        let code = HuffmanCode::new(&table("aaaaaaab"));
        assert_eq!(code.code(&b'a').unwrap().len(), 1);
        assert_eq!(code.code(&b'b').unwrap().len(), 1);
        let code = HuffmanCode::new(&table("aaaaaaaabbc"));
        assert!(code.code(&b'a').unwrap().len() < code.code(&b'c').unwrap().len());
    }

    #[test]
    fn test_ties_are_deterministic() {
        let t = table("abcd");
        let first: Vec<Vec<u8>> = HuffmanCode::new(&t).iter().map(|(_, c)| c.to_vec()).collect();
        for _ in 0..10 {
            let again: Vec<Vec<u8>> =
                HuffmanCode::new(&t).iter().map(|(_, c)| c.to_vec()).collect();
            assert_eq!(first, again);
        }
        // a,b merge first (seq 4), then c,d (seq 5), then the two pairs.
        assert_eq!(first, vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]]);
    }

    #[test]
    fn test_single_symbol_alphabet() {
        let code = HuffmanCode::new(&table("zzzz"));
        assert_eq!(code.code(&b'z'), Some(&[0u8][..]));
        let packed = code.compress(b"zzzz").unwrap();
        assert_eq!(code.decompress(&packed).unwrap(), b"zzzz".to_vec());
    }

    #[test]
    fn test_unknown_symbol() {
        let code = HuffmanCode::new(&table("ab"));
        assert!(matches!(code.encode(b"abc"), Err(Error::UnknownSymbol(_))));
    }

    #[test]
    fn test_pack_header_and_padding() {
        let packed = pack(&[1, 0, 1]);
        assert_eq!(packed, vec![5, 0b1010_0000]);
        assert_eq!(unpack(&packed).unwrap(), vec![1, 0, 1]);

        let packed = pack(&[1; 8]);
        assert_eq!(packed, vec![0, 0xFF]);
        assert_eq!(unpack(&packed).unwrap(), vec![1; 8]);

        assert_eq!(pack(&[]), vec![0]);
        assert!(unpack(&[]).is_err());
        assert!(unpack(&[8, 0]).is_err());
        assert!(unpack(&[3]).is_err());
    }

    #[test]
    fn test_compress_roundtrip() {
        let text = b"the quick brown fox jumps over the lazy dog";
        let code = HuffmanCode::new(&FrequencyTable::from_symbols(text.iter()));
        let packed = code.compress(text).unwrap();
        assert!(packed.len() < text.len());
        assert_eq!(code.decompress(&packed).unwrap(), text.to_vec());
    }

    #[test]
    fn test_truncated_stream_is_rejected() {
        let code = HuffmanCode::new(&table("aaaaaaaabbc"));
        let mut bits = code.encode(b"c").unwrap();
        bits.pop();
        assert!(code.decode(&bits).is_err());
    }
}
