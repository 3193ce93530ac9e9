// Ogg container support
//
// Every page starts with a fixed 27 byte header, all integers little-endian:
//   0  "OggS"
//   4  version, always 0
//   5  flags: 0x01 continued packet, 0x02 first page, 0x04 last page
//   6  granule position (u64)
//  14  bitstream serial (u32)
//  18  page sequence (u32)
//  22  CRC (u32, read and ignored)
//  26  segment count
// followed by the segment table and the body it describes.
//
// An Opus logical stream opens with "OpusHead", which pins its serial, then
// "OpusTags", then audio packets.

pub mod page;
pub mod reader;

pub use page::{lace, Lacing, OggPageHeader};
pub use reader::OggDemuxer;

// OGG signature
pub const OGG_SIGNATURE: &[u8; 4] = b"OggS";

// Fixed part of a page header, up to and including the segment count
pub const OGG_HEADER_SIZE: usize = 27;

// OGG page header types
pub(crate) const OGG_HEADER_TYPE_CONTINUATION: u8 = 0x01;
pub(crate) const OGG_HEADER_TYPE_BOS: u8 = 0x02; // Beginning of Stream
pub(crate) const OGG_HEADER_TYPE_EOS: u8 = 0x04; // End of Stream
