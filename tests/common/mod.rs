// Hand-built Ogg and EBML fixtures shared by the integration tests
#![allow(dead_code)]

use oxidemux::{Demux, DemuxEvent, DemuxResult};

pub const OPUS_HEAD: &[u8] = b"OpusHead\x01\x02\x38\x01\x80\xbb\x00\x00\x00\x00\x00";

pub fn opus_tags() -> Vec<u8> {
    let mut tags = b"OpusTags".to_vec();
    tags.extend_from_slice(&7u32.to_le_bytes());
    tags.extend_from_slice(b"fixture");
    tags.extend_from_slice(&1u32.to_le_bytes());
    tags.extend_from_slice(&10u32.to_le_bytes());
    tags.extend_from_slice(b"TITLE=Demo");
    tags
}

/// One Ogg page with an explicit segment table
pub fn ogg_page(header_type: u8, serial: u32, table: &[u8], body: &[u8]) -> Vec<u8> {
    assert_eq!(table.iter().map(|&s| s as usize).sum::<usize>(), body.len());
    let mut page = b"OggS\x00".to_vec();
    page.push(header_type);
    page.extend_from_slice(&0u64.to_le_bytes());
    page.extend_from_slice(&serial.to_le_bytes());
    page.extend_from_slice(&0u32.to_le_bytes());
    page.extend_from_slice(&0u32.to_le_bytes());
    page.push(table.len() as u8);
    page.extend_from_slice(table);
    page.extend_from_slice(body);
    page
}

/// Segment table entries for one complete packet
pub fn lacing(len: usize) -> Vec<u8> {
    let mut table = vec![255; len / 255];
    table.push((len % 255) as u8);
    table
}

/// One Ogg page holding complete packets
pub fn packets_page(header_type: u8, serial: u32, packets: &[&[u8]]) -> Vec<u8> {
    let table: Vec<u8> = packets.iter().flat_map(|p| lacing(p.len())).collect();
    ogg_page(header_type, serial, &table, &packets.concat())
}

/// A 300 byte packet split over two pages
pub fn spanning_packet() -> Vec<u8> {
    (0..300u32).map(|i| (i % 251) as u8).collect()
}

/// Opus in Ogg with a spanning packet, a foreign bitstream and an EOS page
pub fn ogg_stream() -> Vec<u8> {
    let long = spanning_packet();
    let mut data = packets_page(0x02, 1, &[OPUS_HEAD]);
    data.extend(packets_page(0, 1, &[&opus_tags()]));
    data.extend(ogg_page(0, 1, &[255], &long[..255]));
    data.extend(ogg_page(0x01, 1, &[45, 1, 2], &[&long[255..], &b"a"[..], &b"bb"[..]].concat()));
    data.extend(packets_page(0x02, 77, &[b"foreign"]));
    data.extend(packets_page(0x04, 1, &[b"end"]));
    data
}

pub fn ogg_expected() -> Vec<DemuxEvent> {
    vec![
        DemuxEvent::Head(OPUS_HEAD.to_vec().into()),
        DemuxEvent::Tags(opus_tags().into()),
        DemuxEvent::Packet(spanning_packet().into()),
        DemuxEvent::Packet("a".into()),
        DemuxEvent::Packet("bb".into()),
        DemuxEvent::Packet("end".into()),
    ]
}

/// EBML size field for a known length
pub fn ebml_size(len: usize) -> Vec<u8> {
    match len {
        0..=0x7e => vec![0x80 | len as u8],
        0x7f..=0x3ffe => vec![0x40 | (len >> 8) as u8, len as u8],
        _ => {
            assert!(len < 0x0fff_ffff);
            vec![0x10 | (len >> 24) as u8, (len >> 16) as u8, (len >> 8) as u8, len as u8]
        }
    }
}

pub fn element(id: &[u8], body: &[u8]) -> Vec<u8> {
    let mut out = id.to_vec();
    out.extend(ebml_size(body.len()));
    out.extend_from_slice(body);
    out
}

pub fn container(id: &[u8], children: &[Vec<u8>]) -> Vec<u8> {
    element(id, &children.concat())
}

pub const ROOT: &[u8] = &[0x1a, 0x45, 0xdf, 0xa3];
pub const SEGMENT: &[u8] = &[0x18, 0x53, 0x80, 0x67];
pub const TRACKS: &[u8] = &[0x16, 0x54, 0xae, 0x6b];
pub const CLUSTER: &[u8] = &[0x1f, 0x43, 0xb6, 0x75];
pub const VOID: &[u8] = &[0xec];

pub fn ebml_header() -> Vec<u8> {
    container(ROOT, &[element(&[0x42, 0x82], b"webm")])
}

/// Segment header with the unknown-size marker, as live encoders write it
pub fn segment_start() -> Vec<u8> {
    let mut out = SEGMENT.to_vec();
    out.extend_from_slice(&[0x01, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
    out
}

pub fn track_entry(number: u8, track_type: u8, codec_id: &str, private: Option<&[u8]>) -> Vec<u8> {
    let mut children = vec![
        element(&[0xd7], &[number]),
        element(&[0x83], &[track_type]),
        element(&[0x86], codec_id.as_bytes()),
    ];
    if let Some(private) = private {
        children.push(element(&[0x63, 0xa2], private));
    }
    container(&[0xae], &children)
}

pub fn simple_block(track: u8, payload: &[u8]) -> Vec<u8> {
    element(&[0xa3], &[&[0x80 | track, 0x00, 0x00, 0x80][..], payload].concat())
}

/// Opus in WebM with a video track, a large void element and two clusters
pub fn webm_stream() -> Vec<u8> {
    let mut data = ebml_header();
    data.extend(segment_start());
    data.extend(container(
        TRACKS,
        &[
            track_entry(1, 1, "V_VP9", Some(b"not-audio")),
            track_entry(2, 2, "A_OPUS", Some(OPUS_HEAD)),
        ],
    ));
    data.extend(element(VOID, &[0u8; 700]));
    data.extend(container(
        CLUSTER,
        &[
            element(&[0xe7], &[0]),
            simple_block(1, b"video-frame"),
            simple_block(2, b"opus-1"),
            simple_block(2, b"opus-2"),
        ],
    ));
    data.extend(container(CLUSTER, &[element(&[0xe7], &[20]), simple_block(2, &[0x55; 200])]));
    data
}

pub fn webm_expected() -> Vec<DemuxEvent> {
    vec![
        DemuxEvent::UnknownTag { id: 0x4282 },
        DemuxEvent::UnknownTag { id: 0xec },
        DemuxEvent::UnknownTag { id: 0xe7 },
        DemuxEvent::Packet("opus-1".into()),
        DemuxEvent::Packet("opus-2".into()),
        DemuxEvent::UnknownTag { id: 0xe7 },
        DemuxEvent::Packet(vec![0x55; 200].into()),
    ]
}

/// Feed `data` split at the given chunk size and collect every event
pub fn feed_chunked<D: Demux>(demuxer: &mut D, data: &[u8], chunk_size: usize) -> DemuxResult<Vec<DemuxEvent>> {
    let mut events = Vec::new();
    for chunk in data.chunks(chunk_size) {
        events.extend(demuxer.feed(chunk)?);
    }
    Ok(events)
}
