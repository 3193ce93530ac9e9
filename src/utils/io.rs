// Bounds-checked reading from byte slices

/// Copy `N` bytes starting at `offset`. The caller checks the bounds.
pub fn array_at<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[offset..offset + N]);
    out
}

/// Forward-only reader over a byte slice that never reads past the end.
pub struct SliceReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        SliceReader { data, pos: 0 }
    }

    /// Take the next `len` bytes
    pub fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    /// Read little-endian 32-bit integer
    pub fn read_le_u32(&mut self) -> Option<u32> {
        self.take(4).map(|bytes| u32::from_le_bytes(array_at(bytes, 0)))
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}
