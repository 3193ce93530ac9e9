// Interface shared by the Ogg and WebM demuxers

use crate::error::DemuxResult;
use crate::event::DemuxEvent;

/// An incremental demuxer.
///
/// Input is pushed in chunks of any size; output is pulled one event at a
/// time. Parsing happens inside `poll_event`, so a consumer that stops polling
/// also stops the parser, and the next poll resumes at the same position.
pub trait Demux {
    /// Append a chunk of container data. Does not parse.
    fn push(&mut self, chunk: &[u8]) -> DemuxResult<()>;

    /// Parse until the next event is available.
    ///
    /// Returns `Ok(None)` when more input is needed. Once an error has been
    /// returned every later call fails with `DemuxError::Poisoned` until
    /// [`Demux::reset`].
    fn poll_event(&mut self) -> DemuxResult<Option<DemuxEvent>>;

    /// Discard all retained state and start over.
    fn reset(&mut self);

    /// Number of pushed bytes not yet consumed.
    fn buffered(&self) -> usize;

    /// Push `chunk` and collect every event it completes.
    fn feed(&mut self, chunk: &[u8]) -> DemuxResult<Vec<DemuxEvent>> {
        self.push(chunk)?;
        let mut events = Vec::new();
        while let Some(event) = self.poll_event()? {
            events.push(event);
        }
        Ok(events)
    }
}

impl<D: Demux + ?Sized> Demux for Box<D> {
    fn push(&mut self, chunk: &[u8]) -> DemuxResult<()> {
        (**self).push(chunk)
    }

    fn poll_event(&mut self) -> DemuxResult<Option<DemuxEvent>> {
        (**self).poll_event()
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn buffered(&self) -> usize {
        (**self).buffered()
    }
}
