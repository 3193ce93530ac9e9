//! Oxidemux - incremental Ogg and WebM audio demuxer
//!
//! Container data is pushed in chunks of any size and codec packets are
//! pulled out as soon as they are complete:
//!
//! ```
//! use oxidemux::{Demux, DemuxEvent, OggDemuxer};
//!
//! let mut demuxer = OggDemuxer::new();
//! for chunk in [&b"Ogg"[..], &b"S"[..]] {
//!     demuxer.push(chunk).unwrap();
//!     while let Some(event) = demuxer.poll_event().unwrap() {
//!         if let DemuxEvent::Packet(packet) = event {
//!             println!("{} byte packet", packet.len());
//!         }
//!     }
//! }
//! assert_eq!(demuxer.buffered(), 4);
//! ```

pub mod buffer;
pub mod comment;
pub mod demux;
pub mod detect;
pub mod error;
pub mod event;
pub mod ogg;
pub mod opus;
pub mod reader;
pub mod webm;

mod utils;

pub use buffer::ByteCursor;
pub use comment::VorbisComment;
pub use demux::Demux;
pub use detect::{detect_file, open_demuxer, sniff, Codec, Container};
pub use error::{DemuxError, DemuxResult};
pub use event::{DemuxEvent, EventKind};
pub use ogg::OggDemuxer;
pub use opus::OpusHead;
pub use reader::{PacketReader, ReaderConfig};
pub use webm::{EbmlWalker, HeadValidator, WebmOpusDemuxer, WebmVorbisDemuxer};
