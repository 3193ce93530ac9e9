// Incremental Ogg page reader
//
// Pages are opened only once their header, segment table and full body are
// buffered. The body then stays in the residual buffer and packets are cut
// from its front one per poll, so a paused consumer leaves the cursor on a
// packet boundary.

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use crate::buffer::ByteCursor;
use crate::demux::Demux;
use crate::error::{DemuxError, DemuxResult};
use crate::event::DemuxEvent;
use crate::ogg::page::{lace, OggPageHeader};
use crate::opus::{OPUS_SIGNATURE, OPUS_TAGS};

/// Demuxes an Opus logical stream out of an Ogg physical stream.
#[derive(Debug, Default)]
pub struct OggDemuxer {
    input: ByteCursor,
    /// Serial of the bitstream whose `OpusHead` was seen first
    head_serial: Option<u32>,
    page: Option<OpenPage>,
    /// Prefixes of packets that continue on a later page, per bitstream
    parked: Vec<(u32, BytesMut)>,
    failed: bool,
}

/// A page whose body is fully buffered and partly consumed.
#[derive(Debug)]
struct OpenPage {
    serial: u32,
    eos: bool,
    packets: Vec<usize>,
    next: usize,
    open_tail: Option<usize>,
    /// Prefix from earlier pages to prepend to the first packet
    prefix: Option<BytesMut>,
    /// The first packet is the tail of a packet whose start was never seen
    orphan_head: bool,
}

impl OggDemuxer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serial number of the pinned Opus bitstream, once its head was seen.
    pub fn bitstream_serial(&self) -> Option<u32> {
        self.head_serial
    }

    /// Open the page at the front of the buffer if it is complete.
    fn open_page(&mut self) -> DemuxResult<bool> {
        let Some(header) = OggPageHeader::parse(self.input.bytes())? else {
            return Ok(false);
        };
        if self.input.len() < header.header_size() + header.body_size() {
            return Ok(false);
        }

        trace!(
            serial = header.bitstream_serial,
            sequence = header.page_sequence,
            segments = header.segment_table.len(),
            bos = header.is_bos(),
            "ogg page"
        );

        // No segments means no packet data; parked prefixes stay where they are
        if header.segment_table.is_empty() {
            self.input.advance(header.header_size());
            return Ok(true);
        }

        let serial = header.bitstream_serial;
        let parked = self
            .parked
            .iter()
            .position(|(s, _)| *s == serial)
            .map(|index| self.parked.swap_remove(index).1);

        // A parked prefix only survives onto a page that says it continues
        let (prefix, orphan_head) = match (header.is_continuation(), parked) {
            (true, Some(prefix)) => (Some(prefix), false),
            (true, None) => (None, true),
            (false, _) => (None, false),
        };

        let lacing = lace(&header.segment_table);
        self.input.advance(header.header_size());
        self.page = Some(OpenPage {
            serial,
            eos: header.is_eos(),
            packets: lacing.packets,
            next: 0,
            open_tail: lacing.open_tail,
            prefix,
            orphan_head,
        });
        Ok(true)
    }

    /// Take the next complete packet off the open page, if any remain.
    fn next_packet(&mut self) -> Option<(u32, Option<Bytes>)> {
        let page = self.page.as_mut()?;
        let len = *page.packets.get(page.next)?;
        let first = page.next == 0;
        page.next += 1;

        let data = self.input.slice(0..len);
        self.input.advance(len);

        if first && page.orphan_head {
            return Some((page.serial, None));
        }
        let packet = match page.prefix.take().filter(|_| first) {
            Some(mut prefix) => {
                prefix.extend_from_slice(&data);
                prefix.freeze()
            }
            None => data,
        };
        Some((page.serial, Some(packet)))
    }

    /// Park the open page's trailing packet and drop the page.
    fn close_page(&mut self) {
        let Some(mut page) = self.page.take() else {
            return;
        };

        if let Some(len) = page.open_tail {
            let tail = self.input.slice(0..len);
            self.input.advance(len);

            // With no complete packet on the page the prefix runs straight on
            let continues_orphan = page.packets.is_empty() && page.orphan_head;
            let wanted = self.head_serial.map_or(true, |pinned| pinned == page.serial);
            if !page.eos && !continues_orphan && wanted {
                let mut prefix = match page.prefix.take() {
                    Some(prefix) if page.packets.is_empty() => prefix,
                    _ => BytesMut::new(),
                };
                prefix.extend_from_slice(&tail);
                self.parked.push((page.serial, prefix));
            }
        }
    }

    fn classify(&mut self, serial: u32, packet: Bytes) -> Option<DemuxEvent> {
        match self.head_serial {
            None => {
                if packet.starts_with(OPUS_SIGNATURE) {
                    debug!(serial, "pinned opus bitstream");
                    self.head_serial = Some(serial);
                    Some(DemuxEvent::Head(packet))
                } else {
                    Some(DemuxEvent::UnknownSegment(packet))
                }
            }
            Some(_) if packet.starts_with(OPUS_TAGS) => Some(DemuxEvent::Tags(packet)),
            Some(pinned) if pinned == serial => Some(DemuxEvent::Packet(packet)),
            Some(_) => None,
        }
    }

    fn step(&mut self) -> DemuxResult<Option<DemuxEvent>> {
        loop {
            if self.page.is_none() && !self.open_page()? {
                return Ok(None);
            }

            match self.next_packet() {
                Some((serial, Some(packet))) => {
                    if let Some(event) = self.classify(serial, packet) {
                        return Ok(Some(event));
                    }
                }
                Some((_, None)) => {}
                None => self.close_page(),
            }
        }
    }
}

impl Demux for OggDemuxer {
    fn push(&mut self, chunk: &[u8]) -> DemuxResult<()> {
        if self.failed {
            return Err(DemuxError::Poisoned);
        }
        self.input.append(chunk);
        Ok(())
    }

    fn poll_event(&mut self) -> DemuxResult<Option<DemuxEvent>> {
        if self.failed {
            return Err(DemuxError::Poisoned);
        }
        self.step().inspect_err(|_| self.failed = true)
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn buffered(&self) -> usize {
        self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ogg::{OGG_HEADER_TYPE_BOS, OGG_HEADER_TYPE_CONTINUATION, OGG_HEADER_TYPE_EOS};

    fn page(serial: u32, header_type: u8, segments: &[u8], body: &[u8]) -> Vec<u8> {
        let mut page = Vec::new();
        page.extend_from_slice(b"OggS");
        page.push(0);
        page.push(header_type);
        page.extend_from_slice(&0u64.to_le_bytes());
        page.extend_from_slice(&serial.to_le_bytes());
        page.extend_from_slice(&0u32.to_le_bytes());
        page.extend_from_slice(&0u32.to_le_bytes());
        page.push(segments.len() as u8);
        page.extend_from_slice(segments);
        page.extend_from_slice(body);
        page
    }

    fn head() -> Vec<u8> {
        let mut head = b"OpusHead".to_vec();
        head.extend_from_slice(&[1, 2, 0x38, 0x01, 0x80, 0xbb, 0, 0, 0, 0, 0]);
        head
    }

    #[test]
    fn test_head_tags_and_packets() {
        let tags = b"OpusTags\x00\x00\x00\x00\x00\x00\x00\x00".to_vec();
        let mut stream = page(1, OGG_HEADER_TYPE_BOS, &[head().len() as u8], &head());
        stream.extend(page(1, 0, &[tags.len() as u8], &tags));
        stream.extend(page(1, 0, &[3, 2], b"abcde"));

        let mut demuxer = OggDemuxer::new();
        let events = demuxer.feed(&stream).unwrap();
        assert_eq!(
            events,
            vec![
                DemuxEvent::Head(Bytes::from(head())),
                DemuxEvent::Tags(Bytes::from(tags)),
                DemuxEvent::Packet(Bytes::from_static(b"abc")),
                DemuxEvent::Packet(Bytes::from_static(b"de")),
            ]
        );
        assert_eq!(demuxer.bitstream_serial(), Some(1));
        assert_eq!(demuxer.buffered(), 0);
    }

    #[test]
    fn test_leading_segment_before_head_is_unknown() {
        let mut stream = page(1, OGG_HEADER_TYPE_BOS, &[4], b"junk");
        stream.extend(page(1, 0, &[head().len() as u8], &head()));

        let events = OggDemuxer::new().feed(&stream).unwrap();
        assert_eq!(events[0], DemuxEvent::UnknownSegment(Bytes::from_static(b"junk")));
        assert_eq!(events[1].kind(), crate::event::EventKind::Head);
    }

    #[test]
    fn test_other_bitstreams_are_ignored() {
        let mut stream = page(1, OGG_HEADER_TYPE_BOS, &[head().len() as u8], &head());
        stream.extend(page(2, 0, &[3], b"xyz"));
        stream.extend(page(1, 0, &[3], b"abc"));

        let events = OggDemuxer::new().feed(&stream).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], DemuxEvent::Packet(Bytes::from_static(b"abc")));
    }

    #[test]
    fn test_zero_segment_page_and_zero_length_packet() {
        let mut stream = page(1, OGG_HEADER_TYPE_BOS, &[head().len() as u8], &head());
        stream.extend(page(1, 0, &[], b""));
        stream.extend(page(1, 0, &[0], b""));

        let events = OggDemuxer::new().feed(&stream).unwrap();
        assert_eq!(events[1], DemuxEvent::Packet(Bytes::new()));
    }

    #[test]
    fn test_empty_page_between_spanning_halves() {
        let body: Vec<u8> = (0..300u32).map(|i| i as u8).collect();
        let mut stream = page(1, OGG_HEADER_TYPE_BOS, &[head().len() as u8], &head());
        stream.extend(page(1, 0, &[255], &body[..255]));
        stream.extend(page(1, OGG_HEADER_TYPE_CONTINUATION, &[], b""));
        stream.extend(page(1, OGG_HEADER_TYPE_CONTINUATION, &[45], &body[255..]));

        let mut demuxer = OggDemuxer::new();
        let events = demuxer.feed(&stream).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], DemuxEvent::Packet(Bytes::from(body)));
        assert_eq!(demuxer.buffered(), 0);
    }

    #[test]
    fn test_foreign_open_tail_is_not_parked() {
        let mut stream = page(1, OGG_HEADER_TYPE_BOS, &[head().len() as u8], &head());
        stream.extend(page(9, 0, &[255], &[7; 255]));

        let mut demuxer = OggDemuxer::new();
        demuxer.feed(&stream).unwrap();
        assert!(demuxer.parked.is_empty());

        // Before a head is pinned every bitstream keeps its tail
        let mut demuxer = OggDemuxer::new();
        demuxer.feed(&page(9, 0, &[255], &[7; 255])).unwrap();
        assert_eq!(demuxer.parked.len(), 1);
    }

    #[test]
    fn test_packet_spanning_pages() {
        let body: Vec<u8> = (0..300u32).map(|i| i as u8).collect();
        let mut stream = page(1, OGG_HEADER_TYPE_BOS, &[head().len() as u8], &head());
        stream.extend(page(1, 0, &[255], &body[..255]));
        stream.extend(page(1, OGG_HEADER_TYPE_CONTINUATION, &[45, 1], &[&body[255..], &b"z"[..]].concat()));

        let events = OggDemuxer::new().feed(&stream).unwrap();
        assert_eq!(events[1], DemuxEvent::Packet(Bytes::from(body)));
        assert_eq!(events[2], DemuxEvent::Packet(Bytes::from_static(b"z")));
    }

    #[test]
    fn test_continuation_without_prefix_drops_tail() {
        let mut stream = page(1, OGG_HEADER_TYPE_BOS, &[head().len() as u8], &head());
        stream.extend(page(1, OGG_HEADER_TYPE_CONTINUATION, &[2, 1], b"tlz"));

        let events = OggDemuxer::new().feed(&stream).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], DemuxEvent::Packet(Bytes::from_static(b"z")));
    }

    #[test]
    fn test_eos_drops_open_tail() {
        let mut stream = page(1, OGG_HEADER_TYPE_BOS, &[head().len() as u8], &head());
        stream.extend(page(1, OGG_HEADER_TYPE_EOS, &[255], &[7u8; 255]));
        stream.extend(page(1, OGG_HEADER_TYPE_CONTINUATION, &[1], b"q"));

        let mut demuxer = OggDemuxer::new();
        let events = demuxer.feed(&stream).unwrap();
        assert_eq!(events.len(), 1);
        assert!(demuxer.parked.is_empty());
    }

    #[test]
    fn test_incomplete_page_is_retained() {
        let stream = page(1, OGG_HEADER_TYPE_BOS, &[head().len() as u8], &head());
        let mut demuxer = OggDemuxer::new();
        assert!(demuxer.feed(&stream[..stream.len() - 1]).unwrap().is_empty());
        assert_eq!(demuxer.buffered(), stream.len() - 1);

        let events = demuxer.feed(&stream[stream.len() - 1..]).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_bad_capture_pattern_poisons() {
        let mut stream = page(1, OGG_HEADER_TYPE_BOS, &[head().len() as u8], &head());
        stream[0] = b'X';

        let mut demuxer = OggDemuxer::new();
        assert!(matches!(
            demuxer.feed(&stream),
            Err(DemuxError::InvalidCapturePattern(_))
        ));
        assert!(matches!(demuxer.poll_event(), Err(DemuxError::Poisoned)));

        demuxer.reset();
        assert_eq!(demuxer.buffered(), 0);
        assert!(demuxer.poll_event().unwrap().is_none());
    }

    #[test]
    fn test_paused_consumer_resumes_in_place() {
        let mut stream = page(1, OGG_HEADER_TYPE_BOS, &[head().len() as u8], &head());
        stream.extend(page(1, 0, &[1, 1, 1], b"abc"));

        let mut demuxer = OggDemuxer::new();
        demuxer.push(&stream).unwrap();
        assert_eq!(demuxer.poll_event().unwrap().unwrap().kind(), crate::event::EventKind::Head);
        assert_eq!(demuxer.poll_event().unwrap(), Some(DemuxEvent::Packet(Bytes::from_static(b"a"))));
        assert_eq!(demuxer.buffered(), 2);

        demuxer.push(&[]).unwrap();
        let rest = demuxer.feed(&[]).unwrap();
        assert_eq!(
            rest,
            vec![
                DemuxEvent::Packet(Bytes::from_static(b"b")),
                DemuxEvent::Packet(Bytes::from_static(b"c")),
            ]
        );
    }
}
