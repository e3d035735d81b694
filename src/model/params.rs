//! params — named registry of the classifier's parameter blocks.
//!
//! Purpose
//! -------
//! Address parameter blocks by name instead of by position in an implicit
//! list. Every dense layer `l` owns a kernel `dense_{l}/kernel` of shape
//! `(fan_in, fan_out)` and a bias `dense_{l}/bias` of shape `(1, fan_out)`.
//!
//! Key behaviors
//! -------------
//! - [`BlockId`] parses from and displays as the canonical name.
//! - [`ParamRegistry`] fixes the flattening order used by the optimizer
//!   (layer by layer, kernel before bias, each block row-major) and hands
//!   out offsets and shapes for typed access.
//!
//! Invariants & assumptions
//! ------------------------
//! - Offsets are contiguous and cover `0..total_len()` exactly once.
use crate::model::errors::{ModelError, ModelResult};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Kernel,
    Bias,
}

/// Identifier of one parameter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId {
    pub layer: usize,
    pub kind: BlockKind,
}

impl BlockId {
    pub const fn kernel(layer: usize) -> Self {
        Self { layer, kind: BlockKind::Kernel }
    }

    pub const fn bias(layer: usize) -> Self {
        Self { layer, kind: BlockKind::Bias }
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            BlockKind::Kernel => "kernel",
            BlockKind::Bias => "bias",
        };
        write!(f, "dense_{}/{kind}", self.layer)
    }
}

impl FromStr for BlockId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ModelError::UnknownBlock { name: s.to_string() };
        let rest = s.strip_prefix("dense_").ok_or_else(unknown)?;
        let (layer, kind) = rest.split_once('/').ok_or_else(unknown)?;
        let layer: usize = layer.parse().map_err(|_| unknown())?;
        match kind {
            "kernel" => Ok(BlockId::kernel(layer)),
            "bias" => Ok(BlockId::bias(layer)),
            _ => Err(unknown()),
        }
    }
}

/// Position and shape of one block inside the flat parameter vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockEntry {
    pub id: BlockId,
    pub shape: (usize, usize),
    pub offset: usize,
}

impl BlockEntry {
    pub fn len(&self) -> usize {
        self.shape.0 * self.shape.1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.len()
    }
}

/// Ordered registry of all parameter blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamRegistry {
    entries: Vec<BlockEntry>,
    total: usize,
}

impl ParamRegistry {
    /// Build the registry for a chain of layer widths `(fan_in, fan_out)`.
    pub fn from_layer_dims(dims: &[(usize, usize)]) -> Self {
        let mut entries = Vec::with_capacity(2 * dims.len());
        let mut offset = 0;
        for (layer, &(fan_in, fan_out)) in dims.iter().enumerate() {
            for (id, shape) in
                [(BlockId::kernel(layer), (fan_in, fan_out)), (BlockId::bias(layer), (1, fan_out))]
            {
                entries.push(BlockEntry { id, shape, offset });
                offset += shape.0 * shape.1;
            }
        }
        Self { entries, total: offset }
    }

    pub fn get(&self, id: BlockId) -> ModelResult<&BlockEntry> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| ModelError::UnknownBlock { name: id.to_string() })
    }

    pub fn entries(&self) -> &[BlockEntry] {
        &self.entries
    }

    /// Length of the flat parameter vector.
    pub fn total_len(&self) -> usize {
        self.total
    }
}
