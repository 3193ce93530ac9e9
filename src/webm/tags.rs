// EBML element IDs the walker understands

pub const EBML_ROOT: u32 = 0x1A45_DFA3;
pub const SEGMENT: u32 = 0x1853_8067;
pub const CLUSTER: u32 = 0x1F43_B675;
pub const TRACKS: u32 = 0x1654_AE6B;
pub const TRACK_ENTRY: u32 = 0xAE;
pub const TRACK_NUMBER: u32 = 0xD7;
pub const TRACK_TYPE: u32 = 0x83;
pub const CODEC_ID: u32 = 0x86;
pub const CODEC_PRIVATE: u32 = 0x63A2;
pub const SIMPLE_BLOCK: u32 = 0xA3;
pub const BLOCK_GROUP: u32 = 0xA0;
pub const BLOCK: u32 = 0xA1;

/// Track type value for audio tracks
pub const AUDIO_TRACK_TYPE: u64 = 2;

/// Track number, timecode and flags in front of every block payload
pub const BLOCK_HEADER_SIZE: usize = 4;

/// How the walker treats an element body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// Body is a sequence of child elements
    Container,
    /// Body is payload the walker needs
    Leaf,
    /// Body is skipped
    Unknown,
}

pub fn tag_kind(id: u32) -> TagKind {
    match id {
        EBML_ROOT | SEGMENT | CLUSTER | TRACKS | TRACK_ENTRY | BLOCK_GROUP => TagKind::Container,
        TRACK_NUMBER | TRACK_TYPE | CODEC_ID | CODEC_PRIVATE | SIMPLE_BLOCK | BLOCK => {
            TagKind::Leaf
        }
        _ => TagKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_kinds() {
        assert_eq!(tag_kind(0x1a45dfa3), TagKind::Container);
        assert_eq!(tag_kind(0xae), TagKind::Container);
        assert_eq!(tag_kind(0xa3), TagKind::Leaf);
        assert_eq!(tag_kind(0x63a2), TagKind::Leaf);
        assert_eq!(tag_kind(0x4286), TagKind::Unknown);
        assert_eq!(tag_kind(0xe7), TagKind::Unknown);
    }
}
