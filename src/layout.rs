use std::{fmt, ops::Range};

use crate::{
    error::{ConvertError, Result},
    manifest::WeightSpec,
};

/// Name of the top-level group holding every layer.
pub const LAYERS_GROUP: &str = "layers";

/// Name of the per-layer group holding the numbered variables.
pub const VARS_GROUP: &str = "vars";

/// Dense layers of the policy network, in the order the runtime rebuilds them.
pub const LAYER_NAMES: [&str; 4] = ["dense", "dense_1", "dense_2", "dense_3"];

/// The variables stored by a dense layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightKind {
    Kernel,
    Bias,
}

impl WeightKind {
    /// Kernel precedes bias.
    pub const ALL: [WeightKind; 2] = [WeightKind::Kernel, WeightKind::Bias];

    /// Name of the dataset inside `vars`.
    pub fn var_index(self) -> &'static str {
        match self {
            WeightKind::Kernel => "0",
            WeightKind::Bias => "1",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WeightKind::Kernel => "kernel",
            WeightKind::Bias => "bias",
        }
    }
}

impl fmt::Display for WeightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the tensor name for a layer variable, `<layer_name>/<kind>`.
pub fn weight_name(layer: &str, kind: WeightKind) -> String {
    format!("{layer}/{kind}")
}

/// The eight slots of the shard, in write order.
pub fn weight_order() -> impl Iterator<Item = String> {
    LAYER_NAMES.into_iter().flat_map(|layer| {
        WeightKind::ALL
            .into_iter()
            .map(move |kind| weight_name(layer, kind))
    })
}

/// Maps a flat shard into per-tensor byte ranges.
///
/// Offsets are implied by the order of the specs, tensors are packed back to
/// back without padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardLayout {
    ranges: Vec<Range<usize>>,
}

impl ShardLayout {
    /// # Errors
    /// Returns `Config` if a tensor or the whole shard is larger than `usize`.
    pub fn new(specs: &[WeightSpec]) -> Result<Self> {
        let mut offset = 0usize;
        let mut ranges = Vec::with_capacity(specs.len());

        for spec in specs {
            let end = offset.checked_add(spec.byte_len()?).ok_or_else(|| {
                ConvertError::Config(format!("shard overflows at {}", spec.name))
            })?;
            ranges.push(offset..end);
            offset = end;
        }

        Ok(Self { ranges })
    }

    #[inline]
    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Total size of the shard in bytes.
    pub fn total_bytes(&self) -> usize {
        self.ranges.last().map_or(0, |r| r.end)
    }
}
