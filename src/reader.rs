// Driving a demuxer from a byte source
//
// `PacketReader` reads fixed-size chunks from any `Read` and feeds them to a
// demuxer, yielding events as an iterator. Chunks are only read when the
// demuxer has nothing left to give, so at most one chunk is buffered ahead of
// the consumer.

use std::io::{ErrorKind, Read};

use tracing::debug;

use crate::demux::Demux;
use crate::error::DemuxResult;
use crate::event::DemuxEvent;

/// Reader tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Bytes requested from the source per read
    pub chunk_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            chunk_size: 16 * 1024,
        }
    }
}

/// Iterator over the events of a container read from `R`.
pub struct PacketReader<R, D> {
    source: R,
    demuxer: D,
    chunk: Vec<u8>,
    done: bool,
}

impl<R: Read, D: Demux> PacketReader<R, D> {
    pub fn new(source: R, demuxer: D) -> Self {
        Self::with_config(source, demuxer, ReaderConfig::default())
    }

    pub fn with_config(source: R, demuxer: D, config: ReaderConfig) -> Self {
        PacketReader {
            source,
            demuxer,
            chunk: vec![0; config.chunk_size.max(1)],
            done: false,
        }
    }

    pub fn demuxer(&self) -> &D {
        &self.demuxer
    }

    /// Next event, reading more input as needed. `Ok(None)` at end of input.
    pub fn next_event(&mut self) -> DemuxResult<Option<DemuxEvent>> {
        let result = self.pump();
        if !matches!(result, Ok(Some(_))) {
            self.finish();
        }
        result
    }

    fn pump(&mut self) -> DemuxResult<Option<DemuxEvent>> {
        while !self.done {
            if let Some(event) = self.demuxer.poll_event()? {
                return Ok(Some(event));
            }

            let read = match self.source.read(&mut self.chunk) {
                Ok(read) => read,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if read == 0 {
                return Ok(None);
            }
            self.demuxer.push(&self.chunk[..read])?;
        }
        Ok(None)
    }

    /// Tear down the demuxer; nothing retained can become a packet anymore.
    fn finish(&mut self) {
        if self.done {
            return;
        }
        let trailing = self.demuxer.buffered();
        if trailing > 0 {
            debug!(trailing, "discarding incomplete trailing data");
        }
        self.demuxer.reset();
        self.done = true;
    }
}

impl<R: Read, D: Demux> Iterator for PacketReader<R, D> {
    type Item = DemuxResult<DemuxEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}
