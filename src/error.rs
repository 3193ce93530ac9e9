// Error types shared by the Ogg and WebM demuxers
//
// Every variant except `Io` describes input that is not the declared container
// or is structurally corrupt. "Need more bytes" is never an error: demuxers
// report it as `Ok(None)` from `poll_event`.

/// Error type for demuxing.
#[derive(Debug, thiserror::Error)]
pub enum DemuxError {
    /// IO error while reading the source.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    /// The Ogg capture pattern is not `OggS`.
    #[error("invalid ogg capture pattern: {0:02x?}")]
    InvalidCapturePattern([u8; 4]),
    /// The Ogg stream structure version is not 0.
    #[error("unsupported ogg stream structure version: {0}")]
    UnsupportedVersion(u8),
    /// The first EBML element is not the EBML root.
    #[error("stream does not start with the EBML root element (found 0x{0:x})")]
    MissingRoot(u32),
    /// A variable-length integer has no marker bit in its first byte.
    #[error("invalid variable-length integer leading byte 0x{0:02x}")]
    InvalidVint(u8),
    /// An element ID is longer than four bytes.
    #[error("invalid element id leading byte 0x{0:02x}")]
    InvalidElementId(u8),
    /// A leaf or unrecognized element declared an unknown size.
    #[error("element 0x{0:x} has unknown size")]
    UnknownSizeUnsupported(u32),
    /// The codec private data does not carry the expected signature.
    #[error("codec mismatch: expected {expected} header")]
    CodecMismatch {
        /// The codec whose header was expected.
        expected: &'static str,
    },
    /// The codec private data is too short for its declared layout.
    #[error("malformed codec private data ({0} bytes)")]
    MalformedCodecPrivate(usize),
    /// A block arrived before any audio track was declared.
    #[error("no audio track declared before the first block")]
    NoAudioTrack,
    /// A block is shorter than its header.
    #[error("malformed block ({0} bytes)")]
    MalformedBlock(usize),
    /// A previous call already failed; the demuxer must be reset.
    #[error("demuxer previously failed and must be reset")]
    Poisoned,
}

pub type DemuxResult<T> = Result<T, DemuxError>;
