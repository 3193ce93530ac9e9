// WebM / Matroska support
//
// WebM is an EBML document: a tree of elements, each an ID, a size and a
// body. The demuxer needs only a handful of them:
// - EBML header (must come first)
// - Segment > Tracks > TrackEntry > TrackNumber, TrackType, CodecID, CodecPrivate
// - Segment > Cluster > SimpleBlock, or BlockGroup > Block
//
// The codec-specific part is the check of the codec private data, supplied
// to the shared walker as a `HeadValidator`.

pub mod opus;
pub mod tags;
pub mod vint;
pub mod vorbis;
pub mod walker;

pub use opus::{OpusHeadValidator, WebmOpusDemuxer};
pub use vorbis::{VorbisHeadValidator, WebmVorbisDemuxer};
pub use walker::{AudioTrack, EbmlWalker, HeadValidator, TrackDescriptor};

// EBML signature (ID of the EBML header element)
pub const EBML_SIGNATURE: &[u8; 4] = b"\x1a\x45\xdf\xa3";
