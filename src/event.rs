// Output produced by the demuxers

use bytes::Bytes;
use serde::Serialize;

/// Something a demuxer extracted from the container.
///
/// `Packet` carries codec data for the downstream decoder. The other variants
/// are side-channel notices; only `Head` and `Tags` carry data a decoder needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemuxEvent {
    /// Identification header packet (Ogg `OpusHead`).
    Head(Bytes),
    /// Comment header packet (Ogg `OpusTags`).
    Tags(Bytes),
    /// One codec packet from the audio stream.
    Packet(Bytes),
    /// A leading Ogg packet that is not an identification header.
    UnknownSegment(Bytes),
    /// An EBML element that was skipped because its ID is not recognized.
    UnknownTag {
        /// Raw element ID, marker bits included.
        id: u32,
    },
}

/// Discriminant of a [`DemuxEvent`], used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Head,
    Tags,
    Packet,
    UnknownSegment,
    UnknownTag,
}

impl DemuxEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DemuxEvent::Head(_) => EventKind::Head,
            DemuxEvent::Tags(_) => EventKind::Tags,
            DemuxEvent::Packet(_) => EventKind::Packet,
            DemuxEvent::UnknownSegment(_) => EventKind::UnknownSegment,
            DemuxEvent::UnknownTag { .. } => EventKind::UnknownTag,
        }
    }

    /// Payload bytes, if the event carries any.
    pub fn data(&self) -> Option<&Bytes> {
        match self {
            DemuxEvent::Head(data)
            | DemuxEvent::Tags(data)
            | DemuxEvent::Packet(data)
            | DemuxEvent::UnknownSegment(data) => Some(data),
            DemuxEvent::UnknownTag { .. } => None,
        }
    }

    /// Returns the audio packet, if this is one.
    pub fn into_packet(self) -> Option<Bytes> {
        match self {
            DemuxEvent::Packet(data) => Some(data),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Head => write!(f, "head"),
            EventKind::Tags => write!(f, "tags"),
            EventKind::Packet => write!(f, "packet"),
            EventKind::UnknownSegment => write!(f, "unknown_segment"),
            EventKind::UnknownTag => write!(f, "unknown_tag"),
        }
    }
}
