// Vorbis comment parsing
//
// Opus (OpusTags) and Vorbis (comment header) share the same comment layout
// after their signatures:
// - Vendor string length (4 bytes, little-endian) + vendor string
// - Comment count (4 bytes, little-endian)
// - For each comment: length (4 bytes, little-endian) + "FIELD=value"

use serde::Serialize;

use crate::opus::OPUS_TAGS;
use crate::utils::encoding::decode_utf8;
use crate::utils::io::SliceReader;

// Vorbis comment header signature, packet type included
pub const VORBIS_COMMENT_SIGNATURE: &[u8; 7] = b"\x03vorbis";

/// Vorbis comment structure
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct VorbisComment {
    pub vendor_string: String,
    pub comments: Vec<(String, String)>,
}

impl VorbisComment {
    /// Parse an OpusTags packet or a Vorbis comment header packet.
    ///
    /// Returns `None` if the packet has neither signature or is truncated.
    pub fn parse(packet: &[u8]) -> Option<Self> {
        let body = packet
            .strip_prefix(&OPUS_TAGS[..])
            .or_else(|| packet.strip_prefix(&VORBIS_COMMENT_SIGNATURE[..]))?;
        Self::parse_body(body)
    }

    /// Parse the comment layout without any signature in front.
    pub fn parse_body(data: &[u8]) -> Option<Self> {
        let mut reader = SliceReader::new(data);

        let vendor_length = reader.read_le_u32()? as usize;
        let vendor_string = decode_utf8(reader.take(vendor_length)?);

        let comment_count = reader.read_le_u32()? as usize;

        // Each comment needs at least its length field
        let mut comments = Vec::with_capacity(comment_count.min(reader.remaining() / 4));
        for _ in 0..comment_count {
            let comment_length = reader.read_le_u32()? as usize;
            let comment_string = decode_utf8(reader.take(comment_length)?);

            // Parse comment (format: FIELD=value)
            if let Some((field, value)) = comment_string.split_once('=') {
                comments.push((field.to_string(), value.to_string()));
            }
        }

        Some(VorbisComment {
            vendor_string,
            comments,
        })
    }

    /// Get a comment value by field name
    pub fn get(&self, field: &str) -> Option<&String> {
        self.comments
            .iter()
            .find(|(f, _)| f.eq_ignore_ascii_case(field))
            .map(|(_, v)| v)
    }
}

/// Common Vorbis comment field names
pub struct VorbisFields;
impl VorbisFields {
    pub const TITLE: &str = "TITLE";
    pub const ARTIST: &str = "ARTIST";
    pub const ALBUM: &str = "ALBUM";
}
