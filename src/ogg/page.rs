use crate::error::{DemuxError, DemuxResult};
use crate::ogg::{
    OGG_HEADER_SIZE, OGG_HEADER_TYPE_BOS, OGG_HEADER_TYPE_CONTINUATION, OGG_HEADER_TYPE_EOS,
    OGG_SIGNATURE,
};
use crate::utils::io::array_at;

/// OGG Page Header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OggPageHeader {
    pub header_type: u8,
    pub granule_position: u64,
    pub bitstream_serial: u32,
    pub page_sequence: u32,
    /// Read but never verified.
    pub crc: u32,
    pub segment_table: Vec<u8>,
}

/// Packet boundaries reconstructed from a segment table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lacing {
    /// Lengths of the packets that end on this page.
    pub packets: Vec<usize>,
    /// Length of a trailing packet that continues on a later page.
    pub open_tail: Option<usize>,
}

impl OggPageHeader {
    /// Parse a page header from the front of `buf`.
    ///
    /// Returns `Ok(None)` if the fixed header or the segment table is not
    /// fully buffered yet. A wrong capture pattern or version is fatal.
    pub fn parse(buf: &[u8]) -> DemuxResult<Option<Self>> {
        if buf.len() < OGG_HEADER_SIZE {
            return Ok(None);
        }

        let capture = [buf[0], buf[1], buf[2], buf[3]];
        if &capture != OGG_SIGNATURE {
            return Err(DemuxError::InvalidCapturePattern(capture));
        }

        let version = buf[4];
        if version != 0 {
            return Err(DemuxError::UnsupportedVersion(version));
        }

        let segment_count = buf[26] as usize;
        let Some(segment_table) = buf.get(OGG_HEADER_SIZE..OGG_HEADER_SIZE + segment_count) else {
            return Ok(None);
        };

        Ok(Some(OggPageHeader {
            header_type: buf[5],
            granule_position: u64::from_le_bytes(array_at(buf, 6)),
            bitstream_serial: u32::from_le_bytes(array_at(buf, 14)),
            page_sequence: u32::from_le_bytes(array_at(buf, 18)),
            crc: u32::from_le_bytes(array_at(buf, 22)),
            segment_table: segment_table.to_vec(),
        }))
    }

    /// Size of the header including the segment table
    pub fn header_size(&self) -> usize {
        OGG_HEADER_SIZE + self.segment_table.len()
    }

    /// Calculate total page data size from segment table
    pub fn body_size(&self) -> usize {
        self.segment_table.iter().map(|&x| x as usize).sum()
    }

    /// Whether the first packet on this page continues one from an earlier page
    pub fn is_continuation(&self) -> bool {
        self.header_type & OGG_HEADER_TYPE_CONTINUATION != 0
    }

    /// Check if this is the beginning of a stream
    pub fn is_bos(&self) -> bool {
        self.header_type & OGG_HEADER_TYPE_BOS != 0
    }

    /// Check if this is the last page of a logical stream
    pub fn is_eos(&self) -> bool {
        self.header_type & OGG_HEADER_TYPE_EOS != 0
    }
}

/// Reconstruct packet lengths from a segment table.
///
/// A run of 255s followed by a smaller value forms one packet. A table that
/// ends in 255 leaves an open packet which continues on the next page.
pub fn lace(table: &[u8]) -> Lacing {
    let mut lacing = Lacing::default();
    let mut pending = 0usize;
    let mut open = false;

    for &len in table {
        pending += len as usize;
        open = true;
        if len < 255 {
            lacing.packets.push(pending);
            pending = 0;
            open = false;
        }
    }

    if open {
        lacing.open_tail = Some(pending);
    }
    lacing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(segments: &[u8]) -> Vec<u8> {
        let mut page = Vec::new();
        page.extend_from_slice(b"OggS");
        page.push(0);
        page.push(OGG_HEADER_TYPE_BOS);
        page.extend_from_slice(&42u64.to_le_bytes());
        page.extend_from_slice(&0xDEADBEEFu32.to_le_bytes());
        page.extend_from_slice(&7u32.to_le_bytes());
        page.extend_from_slice(&0u32.to_le_bytes());
        page.push(segments.len() as u8);
        page.extend_from_slice(segments);
        page
    }

    #[test]
    fn test_lacing_joins_runs_of_255() {
        let lacing = lace(&[255, 255, 10]);
        assert_eq!(lacing.packets, vec![520]);
        assert_eq!(lacing.open_tail, None);
    }

    #[test]
    fn test_lacing_zero_length_segment() {
        let lacing = lace(&[0]);
        assert_eq!(lacing.packets, vec![0]);
        assert_eq!(lacing.open_tail, None);
    }

    #[test]
    fn test_lacing_multiple_and_open_tail() {
        let lacing = lace(&[3, 255, 0, 255, 255]);
        assert_eq!(lacing.packets, vec![3, 255]);
        assert_eq!(lacing.open_tail, Some(510));

        assert_eq!(lace(&[]), Lacing::default());
    }

    #[test]
    fn test_parse_header_fields() {
        let bytes = header_bytes(&[255, 10]);
        let header = OggPageHeader::parse(&bytes).unwrap().unwrap();
        assert_eq!(header.granule_position, 42);
        assert_eq!(header.bitstream_serial, 0xDEADBEEF);
        assert_eq!(header.page_sequence, 7);
        assert_eq!(header.header_size(), 29);
        assert_eq!(header.body_size(), 265);
        assert!(header.is_bos());
        assert!(!header.is_eos());
        assert!(!header.is_continuation());
    }

    #[test]
    fn test_parse_needs_full_segment_table() {
        let bytes = header_bytes(&[1, 2, 3]);
        assert_eq!(OggPageHeader::parse(&bytes[..26]).unwrap(), None);
        assert_eq!(OggPageHeader::parse(&bytes[..29]).unwrap(), None);
        assert!(OggPageHeader::parse(&bytes).unwrap().is_some());
    }

    #[test]
    fn test_parse_rejects_bad_capture_and_version() {
        let mut bytes = header_bytes(&[]);
        bytes[0] = b'X';
        assert!(matches!(
            OggPageHeader::parse(&bytes),
            Err(DemuxError::InvalidCapturePattern(_))
        ));

        let mut bytes = header_bytes(&[]);
        bytes[4] = 1;
        assert!(matches!(
            OggPageHeader::parse(&bytes),
            Err(DemuxError::UnsupportedVersion(1))
        ));
    }
}
