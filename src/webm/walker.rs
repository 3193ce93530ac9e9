// Incremental EBML tag walker
//
// The element tree is walked with a flat cursor: container headers are
// consumed and their children are read from the same linear buffer, so no
// stack survives between calls. Bodies of unrecognized elements are never
// buffered. If one is not fully present, the walker records the absolute
// stream offset where it ends and drops input until that offset is reached.

use std::collections::VecDeque;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::buffer::ByteCursor;
use crate::demux::Demux;
use crate::error::{DemuxError, DemuxResult};
use crate::event::DemuxEvent;
use crate::utils::encoding::decode_utf8;
use crate::webm::tags::{self, tag_kind, TagKind};
use crate::webm::vint::{read_element_id, read_uint, read_vint};

/// Codec-specific check of a track's codec private data.
///
/// Returns the packets to emit ahead of the audio stream, if the codec keeps
/// its headers there.
pub trait HeadValidator {
    fn validate(&mut self, private: &Bytes) -> DemuxResult<Vec<Bytes>>;

    /// Forget anything learned from a previous stream.
    fn reset(&mut self) {}
}

impl<F> HeadValidator for F
where
    F: FnMut(&Bytes) -> DemuxResult<Vec<Bytes>>,
{
    fn validate(&mut self, private: &Bytes) -> DemuxResult<Vec<Bytes>> {
        self(private)
    }
}

/// Track fields collected inside one track entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackDescriptor {
    pub number: Option<u64>,
    pub track_type: Option<u64>,
    pub codec_id: Option<String>,
}

/// The track whose blocks are emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioTrack {
    pub number: u64,
    pub codec_id: Option<String>,
}

/// Everything the walker carries between calls.
#[derive(Debug, Clone, Default)]
struct WalkState {
    /// Absolute stream offset of the first buffered byte
    consumed: u64,
    /// Absolute stream offset where a skipped body ends
    skip_until: Option<u64>,
    seen_root: bool,
    pending_track: TrackDescriptor,
    audio_track: Option<AudioTrack>,
}

/// Outcome of parsing one element.
enum Step {
    NeedMore,
    Advance {
        state: WalkState,
        len: usize,
        events: Vec<DemuxEvent>,
    },
}

/// Demuxes the first audio track of an EBML (WebM/Matroska) stream.
#[derive(Debug)]
pub struct EbmlWalker<V> {
    input: ByteCursor,
    state: WalkState,
    queued: VecDeque<DemuxEvent>,
    validator: V,
    failed: bool,
}

impl<V: HeadValidator> EbmlWalker<V> {
    pub fn new(validator: V) -> Self {
        Self {
            input: ByteCursor::new(),
            state: WalkState::default(),
            queued: VecDeque::new(),
            validator,
            failed: false,
        }
    }

    /// The resolved audio track, once its entry has been read.
    pub fn audio_track(&self) -> Option<&AudioTrack> {
        self.state.audio_track.as_ref()
    }

    pub fn validator(&self) -> &V {
        &self.validator
    }

    /// Absolute offset of the next unparsed byte.
    pub fn position(&self) -> u64 {
        self.state.consumed
    }

    /// Drop the part of `chunk` that falls inside a pending skip.
    fn skip_input<'a>(&mut self, chunk: &'a [u8]) -> &'a [u8] {
        let Some(target) = self.state.skip_until else {
            return chunk;
        };

        let remaining = target - self.state.consumed;
        if remaining > chunk.len() as u64 {
            self.state.consumed += chunk.len() as u64;
            return &[];
        }

        trace!(offset = target, "skip finished");
        self.state.consumed = target;
        self.state.skip_until = None;
        &chunk[remaining as usize..]
    }

    fn step(&mut self) -> DemuxResult<Step> {
        let buf = self.input.bytes();
        let Some((id_len, id)) = read_element_id(buf)? else {
            return Ok(Step::NeedMore);
        };

        let mut state = self.state.clone();
        if !state.seen_root {
            if id != tags::EBML_ROOT {
                return Err(DemuxError::MissingRoot(id));
            }
            state.seen_root = true;
        }

        let Some(size) = read_vint(&buf[id_len..])? else {
            return Ok(Step::NeedMore);
        };
        let header_len = id_len + size.len;
        trace!(id = format_args!("{id:x}"), size = size.value, "ebml element");

        let kind = tag_kind(id);
        if kind == TagKind::Container {
            if id == tags::TRACK_ENTRY {
                state.pending_track = TrackDescriptor::default();
            }
            return Ok(Step::Advance {
                state,
                len: header_len,
                events: Vec::new(),
            });
        }

        if size.is_unknown() {
            return Err(DemuxError::UnknownSizeUnsupported(id));
        }
        let available = (buf.len() - header_len) as u64;

        if kind == TagKind::Unknown {
            let events = vec![DemuxEvent::UnknownTag { id }];
            if size.value <= available {
                return Ok(Step::Advance {
                    state,
                    len: header_len + size.value as usize,
                    events,
                });
            }

            let target = state.consumed + header_len as u64 + size.value;
            debug!(id = format_args!("{id:x}"), offset = target, "skipping unbuffered element");
            state.skip_until = Some(target);
            return Ok(Step::Advance {
                state,
                len: buf.len(),
                events,
            });
        }

        if size.value > available {
            return Ok(Step::NeedMore);
        }
        let len = header_len + size.value as usize;
        let payload = self.input.slice(header_len..len);
        let events = self.leaf(&mut state, id, payload)?;
        Ok(Step::Advance { state, len, events })
    }

    fn leaf(&mut self, state: &mut WalkState, id: u32, payload: Bytes) -> DemuxResult<Vec<DemuxEvent>> {
        match id {
            tags::TRACK_NUMBER => {
                state.pending_track.number = Some(read_uint(&payload));
                promote(state);
            }
            tags::TRACK_TYPE => {
                state.pending_track.track_type = Some(read_uint(&payload));
                promote(state);
            }
            tags::CODEC_ID => {
                let codec_id = decode_utf8(&payload);
                if let Some(track) = state.audio_track.as_mut() {
                    if Some(track.number) == state.pending_track.number {
                        track.codec_id = Some(codec_id.clone());
                    }
                }
                state.pending_track.codec_id = Some(codec_id);
            }
            tags::CODEC_PRIVATE => {
                if !belongs_to_audio(state) {
                    debug!(track = ?state.pending_track.number, "ignoring codec private data of non-audio track");
                    return Ok(Vec::new());
                }
                let headers = self.validator.validate(&payload)?;
                return Ok(headers.into_iter().map(DemuxEvent::Packet).collect());
            }
            tags::SIMPLE_BLOCK | tags::BLOCK => {
                let track = state.audio_track.as_ref().ok_or(DemuxError::NoAudioTrack)?;
                if payload.len() < tags::BLOCK_HEADER_SIZE {
                    return Err(DemuxError::MalformedBlock(payload.len()));
                }
                if u64::from(payload[0] & 0x0F) == track.number {
                    return Ok(vec![DemuxEvent::Packet(payload.slice(tags::BLOCK_HEADER_SIZE..))]);
                }
            }
            _ => {}
        }
        Ok(Vec::new())
    }

    fn next_event(&mut self) -> DemuxResult<Option<DemuxEvent>> {
        loop {
            if let Some(event) = self.queued.pop_front() {
                return Ok(Some(event));
            }
            if self.state.skip_until.is_some() {
                return Ok(None);
            }

            match self.step()? {
                Step::NeedMore => return Ok(None),
                Step::Advance { mut state, len, events } => {
                    state.consumed += len as u64;
                    self.input.advance(len);
                    self.state = state;
                    self.queued.extend(events);
                }
            }
        }
    }
}

/// Promote the in-progress track once it is a complete audio track.
fn promote(state: &mut WalkState) {
    if state.audio_track.is_some() {
        return;
    }
    if let (Some(number), Some(tags::AUDIO_TRACK_TYPE)) =
        (state.pending_track.number, state.pending_track.track_type)
    {
        debug!(track = number, "resolved audio track");
        state.audio_track = Some(AudioTrack {
            number,
            codec_id: state.pending_track.codec_id.clone(),
        });
    }
}

/// Whether codec private data in the current track entry is the audio track's.
///
/// An entry whose type is not known yet is given the benefit of the doubt.
fn belongs_to_audio(state: &WalkState) -> bool {
    let pending = &state.pending_track;
    if pending.track_type.is_some_and(|t| t != tags::AUDIO_TRACK_TYPE) {
        return false;
    }
    match (&state.audio_track, pending.number) {
        (Some(track), Some(number)) => track.number == number,
        _ => true,
    }
}

impl<V: HeadValidator + Default> Default for EbmlWalker<V> {
    fn default() -> Self {
        Self::new(V::default())
    }
}

impl<V: HeadValidator> Demux for EbmlWalker<V> {
    fn push(&mut self, chunk: &[u8]) -> DemuxResult<()> {
        if self.failed {
            return Err(DemuxError::Poisoned);
        }
        let chunk = self.skip_input(chunk);
        self.input.append(chunk);
        Ok(())
    }

    fn poll_event(&mut self) -> DemuxResult<Option<DemuxEvent>> {
        if self.failed {
            return Err(DemuxError::Poisoned);
        }
        self.next_event().inspect_err(|_| self.failed = true)
    }

    fn reset(&mut self) {
        self.input.clear();
        self.state = WalkState::default();
        self.queued.clear();
        self.validator.reset();
        self.failed = false;
    }

    fn buffered(&self) -> usize {
        self.input.len()
    }
}
