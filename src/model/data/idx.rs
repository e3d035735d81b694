//! Parser for the IDX binary format used by the MNIST distribution.
//!
//! An IDX file starts with a big-endian magic number `0x0000_08DD` where
//! `0x08` marks unsigned bytes and `DD` is the number of dimensions, followed
//! by one big-endian `u32` per dimension and then the raw payload.
use crate::model::errors::{ModelError, ModelResult};

const UBYTE_TYPE: u8 = 0x08;

/// Decoded IDX image tensor (`count × rows × cols` of `u8`).
#[derive(Debug, Clone, PartialEq)]
pub struct IdxImages {
    pub count: usize,
    pub rows: usize,
    pub cols: usize,
    pub pixels: Vec<u8>,
}

/// Parse a rank-3 unsigned-byte IDX file.
pub fn parse_idx_images(bytes: &[u8]) -> ModelResult<IdxImages> {
    let (dims, payload) = parse_header(bytes, 3)?;
    let (count, rows, cols) = (dims[0], dims[1], dims[2]);
    let expected = checked_product(&[count, rows, cols])?;
    check_payload(payload, expected)?;
    Ok(IdxImages { count, rows, cols, pixels: payload.to_vec() })
}

/// Parse a rank-1 unsigned-byte IDX label file.
pub fn parse_idx_labels(bytes: &[u8]) -> ModelResult<Vec<usize>> {
    let (dims, payload) = parse_header(bytes, 1)?;
    check_payload(payload, dims[0])?;
    Ok(payload.iter().map(|&b| usize::from(b)).collect())
}

// ---- Helper methods ----

fn parse_header(bytes: &[u8], rank: usize) -> ModelResult<(Vec<usize>, &[u8])> {
    let header_len = 4 + 4 * rank;
    if bytes.len() < header_len {
        return Err(ModelError::InvalidIdx {
            reason: format!("file has {} bytes, header needs {header_len}", bytes.len()),
        });
    }
    if bytes[0] != 0 || bytes[1] != 0 || bytes[2] != UBYTE_TYPE {
        return Err(ModelError::InvalidIdx {
            reason: format!("bad magic {:02x?}, expected unsigned-byte data", &bytes[..4]),
        });
    }
    if usize::from(bytes[3]) != rank {
        return Err(ModelError::InvalidIdx {
            reason: format!("expected rank {rank}, found {}", bytes[3]),
        });
    }
    let dims = bytes[4..header_len]
        .chunks_exact(4)
        .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]) as usize)
        .collect();
    Ok((dims, &bytes[header_len..]))
}

/// Product of header dimensions, rejecting sizes that overflow `usize`.
pub(crate) fn checked_product(dims: &[usize]) -> ModelResult<usize> {
    dims.iter().try_fold(1_usize, |acc, &d| acc.checked_mul(d)).ok_or_else(|| {
        ModelError::InvalidIdx { reason: format!("dimensions {dims:?} overflow the address space") }
    })
}

fn check_payload(payload: &[u8], expected: usize) -> ModelResult<()> {
    if payload.len() != expected {
        return Err(ModelError::InvalidIdx {
            reason: format!("expected {expected} payload bytes, found {}", payload.len()),
        });
    }
    Ok(())
}
