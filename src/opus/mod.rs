// Opus identification header
//
// The identification header is the same in both containers: Ogg carries it
// as the first packet of the stream, WebM carries it as the track's codec
// private data.
//
// Layout (RFC 7845, section 5.1):
// - "OpusHead" (8 bytes)
// - Version (1 byte, major version in the high nibble)
// - Output channel count (1 byte)
// - Pre-skip (2 bytes, little-endian)
// - Input sample rate (4 bytes, little-endian)
// - Output gain (2 bytes, little-endian, Q7.8 dB)
// - Channel mapping family (1 byte)
// - Optional channel mapping table

use serde::Serialize;

pub const OPUS_SIGNATURE: &[u8; 8] = b"OpusHead";
pub const OPUS_TAGS: &[u8; 8] = b"OpusTags";

const OPUS_HEAD_MIN_SIZE: usize = 19;

/// Decoded fields of an `OpusHead` packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpusHead {
    pub version: u8,
    /// Number of channels
    pub channels: u8,
    /// Number of samples to discard from the decoder output when starting playback
    pub pre_skip: u16,
    /// Sample rate of the original input, informational only
    pub input_sample_rate: u32,
    /// Encoded gain to be applied when decoding. To decode into an amplitude scaling factor,
    /// compute `10.0.powf(f32::from(output_gain)/(20.0*256.0))`.
    pub output_gain: i16,
    pub mapping_family: u8,
}

impl OpusHead {
    /// Parse an identification header. Returns `None` if the signature is
    /// missing, the packet is truncated or the major version is unsupported.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < OPUS_HEAD_MIN_SIZE || !data.starts_with(OPUS_SIGNATURE) {
            return None;
        }

        let version = data[8];
        if version & 0xF0 != 0 {
            return None;
        }

        Some(OpusHead {
            version,
            channels: data[9],
            pre_skip: u16::from_le_bytes([data[10], data[11]]),
            input_sample_rate: u32::from_le_bytes([data[12], data[13], data[14], data[15]]),
            output_gain: i16::from_le_bytes([data[16], data[17]]),
            mapping_family: data[18],
        })
    }
}
