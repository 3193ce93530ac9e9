// WebM-Vorbis head validation
//
// Vorbis codec private data packs the three header packets together:
// - Packet count minus one (1 byte, always 2)
// - Xiph-laced sizes of the first two packets
// - Identification header ("\x01vorbis...")
// - Comment header ("\x03vorbis...")
// - Setup header ("\x05vorbis...", the remainder)
//
// The three headers are emitted as packets ahead of the audio.

use bytes::Bytes;
use tracing::debug;

use crate::error::{DemuxError, DemuxResult};
use crate::webm::walker::{EbmlWalker, HeadValidator};

/// Demuxer for Vorbis audio in WebM.
pub type WebmVorbisDemuxer = EbmlWalker<VorbisHeadValidator>;

pub const VORBIS_SIGNATURE: &[u8; 6] = b"vorbis";

// Packet count minus one
const VORBIS_HEADER_PACKETS: u8 = 2;

#[derive(Debug, Clone, Copy, Default)]
pub struct VorbisHeadValidator;

impl HeadValidator for VorbisHeadValidator {
    fn validate(&mut self, private: &Bytes) -> DemuxResult<Vec<Bytes>> {
        let mismatch = DemuxError::CodecMismatch { expected: "vorbis" };
        if private.first() != Some(&VORBIS_HEADER_PACKETS) {
            return Err(mismatch);
        }

        let mut pos = 1;
        let id_len = read_xiph_size(private, &mut pos)?;
        let comment_len = read_xiph_size(private, &mut pos)?;

        // The identification header starts with its packet type byte
        let signature = private.get(pos + 1..pos + 1 + VORBIS_SIGNATURE.len());
        if signature != Some(&VORBIS_SIGNATURE[..]) {
            return Err(mismatch);
        }

        let comment_start = pos + id_len;
        let setup_start = comment_start + comment_len;
        if setup_start > private.len() {
            return Err(DemuxError::MalformedCodecPrivate(private.len()));
        }

        debug!(id_len, comment_len, setup_len = private.len() - setup_start, "validated vorbis headers");
        Ok(vec![
            private.slice(pos..comment_start),
            private.slice(comment_start..setup_start),
            private.slice(setup_start..),
        ])
    }
}

/// Read one Xiph-laced size: a run of 255s plus a final smaller byte.
fn read_xiph_size(data: &[u8], pos: &mut usize) -> DemuxResult<usize> {
    let mut size = 0usize;
    loop {
        let byte = *data
            .get(*pos)
            .ok_or(DemuxError::MalformedCodecPrivate(data.len()))?;
        *pos += 1;
        size += byte as usize;
        if byte < 255 {
            return Ok(size);
        }
    }
}
