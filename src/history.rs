//! Stage history for diagnostics.
//!
//! Each operation appends every partition it computes to its own log. The
//! log only grows; it is dropped with the coder that owns it. Memory is
//! proportional to message length times alphabet size, so recording is
//! opt-in via [`CoderConfig::save_history`](crate::CoderConfig).

use crate::model::StagePartition;
use crate::quantize::BinaryStage;

/// Append-only record of the partitions computed by a coder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct History {
    encode: Vec<StagePartition>,
    decode: Vec<StagePartition>,
    binary: Vec<BinaryStage>,
}

impl History {
    /// Partitions computed by `encode`, including the final extra stage.
    pub fn encode_stages(&self) -> &[StagePartition] {
        &self.encode
    }

    /// Partitions computed by `decode`.
    pub fn decode_stages(&self) -> &[StagePartition] {
        &self.decode
    }

    /// Bisection stages visited by `encode_binary`.
    pub fn binary_stages(&self) -> &[BinaryStage] {
        &self.binary
    }

    pub(crate) fn extend_encode(&mut self, stages: Vec<StagePartition>) {
        self.encode.extend(stages);
    }

    pub(crate) fn extend_decode(&mut self, stages: Vec<StagePartition>) {
        self.decode.extend(stages);
    }

    pub(crate) fn extend_binary(&mut self, stages: Vec<BinaryStage>) {
        self.binary.extend(stages);
    }
}
