// EBML variable-length integers
//
// The number of leading zero bits in the first byte, plus one, is the total
// length of the field. Sizes drop the marker bit from the value; element IDs
// keep it so they can be compared against the raw hex IDs.

use crate::error::{DemuxError, DemuxResult};

/// Longest element ID accepted
pub const MAX_ID_LENGTH: usize = 4;

/// A decoded variable-length integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vint {
    /// Encoded length in bytes (1 to 8)
    pub len: usize,
    pub value: u64,
}

impl Vint {
    /// Whether every value bit is set, which EBML reserves for "unknown size".
    pub fn is_unknown(&self) -> bool {
        self.value == (1u64 << (7 * self.len)) - 1
    }
}

/// Field length encoded by the first byte, or `None` if it has no marker bit.
pub fn vint_length(first: u8) -> Option<usize> {
    match first {
        0 => None,
        _ => Some(first.leading_zeros() as usize + 1),
    }
}

/// Decode a size field from the front of `buf`.
///
/// Returns `Ok(None)` if the field extends past the end of `buf`.
pub fn read_vint(buf: &[u8]) -> DemuxResult<Option<Vint>> {
    let Some(&first) = buf.first() else {
        return Ok(None);
    };
    let len = vint_length(first).ok_or(DemuxError::InvalidVint(first))?;
    let Some(bytes) = buf.get(..len) else {
        return Ok(None);
    };

    let mask = ((1u16 << (8 - len)) - 1) as u8;
    let value = bytes[1..]
        .iter()
        .fold(u64::from(first & mask), |acc, &b| (acc << 8) | u64::from(b));

    Ok(Some(Vint { len, value }))
}

/// Decode an element ID from the front of `buf`, marker bits included.
///
/// Returns the encoded length and the raw ID.
pub fn read_element_id(buf: &[u8]) -> DemuxResult<Option<(usize, u32)>> {
    let Some(&first) = buf.first() else {
        return Ok(None);
    };
    let len = match vint_length(first) {
        Some(len) if len <= MAX_ID_LENGTH => len,
        _ => return Err(DemuxError::InvalidElementId(first)),
    };
    let Some(bytes) = buf.get(..len) else {
        return Ok(None);
    };

    let id = bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
    Ok(Some((len, id)))
}

/// Big-endian unsigned integer of any length; only the low 64 bits are kept.
pub fn read_uint(data: &[u8]) -> u64 {
    data.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}
