// WebM-Opus head validation
//
// Opus keeps its identification header in the track's codec private data.
// Nothing is emitted for it: decoders build their state from the head
// fields, which stay available through `OpusHeadValidator::head`.

use bytes::Bytes;
use tracing::debug;

use crate::error::{DemuxError, DemuxResult};
use crate::opus::{OpusHead, OPUS_SIGNATURE};
use crate::webm::walker::{EbmlWalker, HeadValidator};

/// Demuxer for Opus audio in WebM.
pub type WebmOpusDemuxer = EbmlWalker<OpusHeadValidator>;

#[derive(Debug, Clone, Default)]
pub struct OpusHeadValidator {
    head: Option<OpusHead>,
}

impl OpusHeadValidator {
    /// Fields of the validated identification header.
    pub fn head(&self) -> Option<&OpusHead> {
        self.head.as_ref()
    }
}

impl HeadValidator for OpusHeadValidator {
    fn validate(&mut self, private: &Bytes) -> DemuxResult<Vec<Bytes>> {
        if !private.starts_with(OPUS_SIGNATURE) {
            return Err(DemuxError::CodecMismatch { expected: "OpusHead" });
        }

        self.head = OpusHead::parse(private);
        debug!(head = ?self.head, "validated opus head");
        Ok(Vec::new())
    }

    fn reset(&mut self) {
        self.head = None;
    }
}

impl WebmOpusDemuxer {
    /// Fields of the stream's `OpusHead`, once its codec private data was read.
    pub fn opus_head(&self) -> Option<&OpusHead> {
        self.validator().head()
    }
}
