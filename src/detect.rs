// Container detection and demuxer selection

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Serialize;

use crate::demux::Demux;
use crate::ogg::{OggDemuxer, OGG_SIGNATURE};
use crate::webm::{WebmOpusDemuxer, WebmVorbisDemuxer, EBML_SIGNATURE};

/// Supported container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    Ogg,
    Webm,
}

/// Audio codec carried by the container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    #[default]
    Opus,
    Vorbis,
}

impl std::fmt::Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Container::Ogg => write!(f, "ogg"),
            Container::Webm => write!(f, "webm"),
        }
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Codec::Opus => write!(f, "opus"),
            Codec::Vorbis => write!(f, "vorbis"),
        }
    }
}

/// Detect the container from the first bytes of a stream
pub fn sniff(prefix: &[u8]) -> Option<Container> {
    if prefix.starts_with(OGG_SIGNATURE) {
        Some(Container::Ogg)
    } else if prefix.starts_with(EBML_SIGNATURE) {
        Some(Container::Webm)
    } else {
        None
    }
}

/// Detect the container of a file
pub fn detect_file(path: impl AsRef<Path>) -> std::io::Result<Option<Container>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut signature = Vec::with_capacity(4);
    reader.by_ref().take(4).read_to_end(&mut signature)?;
    Ok(sniff(&signature))
}

/// Build a demuxer for a container and codec.
///
/// Returns `None` for Vorbis in Ogg, which is not supported.
pub fn open_demuxer(container: Container, codec: Codec) -> Option<Box<dyn Demux + Send>> {
    match (container, codec) {
        (Container::Ogg, Codec::Opus) => Some(Box::new(OggDemuxer::new())),
        (Container::Ogg, Codec::Vorbis) => None,
        (Container::Webm, Codec::Opus) => Some(Box::new(WebmOpusDemuxer::default())),
        (Container::Webm, Codec::Vorbis) => Some(Box::new(WebmVorbisDemuxer::default())),
    }
}
