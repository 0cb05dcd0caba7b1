use std::io::Read;
use std::mem;

use buf_redux::Buffer;

use crate::compression::{Compression, Input};
use crate::detect::{self, Container, Format};
use crate::record::{Record, Slot, SlotState};
use crate::{arc, warc, Error};

/// Format-specific record framing, selected when a reader is bound to an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Framer {
    Warc,
    /// ARC framing, counting entries so the leading file description can be identified.
    Arc { entries: u64 },
}

impl Framer {
    fn for_container(container: Container) -> Self {
        match container {
            Container::Warc => Framer::Warc,
            Container::Arc => Framer::Arc { entries: 0 },
        }
    }

    pub fn frame<R: Read>(&mut self, input: &mut Input<R>, slot: &mut Slot) -> Result<bool, Error> {
        match self {
            Framer::Warc => warc::frame(input, slot),
            Framer::Arc { entries } => {
                let framed = arc::frame(input, slot, *entries == 0)?;
                if framed {
                    *entries += 1;
                }
                Ok(framed)
            }
        }
    }

    pub fn finish<R: Read>(&self, input: &mut Input<R>, slot: &mut Slot) -> Result<(), Error> {
        match self {
            Framer::Warc => warc::finish(input, slot),
            Framer::Arc { .. } => arc::finish(input, slot),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Status {
    /// No recognized input is bound.
    Unbound,
    Ready,
    /// The input is exhausted or iteration failed.
    Done,
    /// The input was closed by the caller.
    Closed,
}

/// Reads records from a WARC or ARC archive.
///
/// The container format and compression of the input are detected when the reader is created.
/// Records are read one at a time: each [`Record`] borrows the reader and must be dropped before
/// the next one is requested, at which point any of its content that was not read is skipped.
///
/// A reader can be rebound to a new input with [`Self::reset`], which reuses its buffers. This is
/// much cheaper than creating a new reader for each of many small files.
///
/// ```
/// # use webarchive::{Reader, RecordKind};
/// let warc = b"WARC/1.0\r\n\
///     WARC-Type: warcinfo\r\n\
///     Content-Length: 0\r\n\
///     \r\n\
///     \r\n\r\n";
/// let mut reader = Reader::new(&warc[..])?;
///
/// let record = reader.next()?.expect("one record");
/// assert_eq!(record.record_type(), &RecordKind::Info);
/// assert!(reader.next()?.is_none());
/// # Ok::<(), webarchive::Error>(())
/// ```
pub struct Reader<R: Read> {
    pub(crate) input: Option<Input<R>>,
    format: Option<Format>,
    pub(crate) framer: Framer,
    pub(crate) status: Status,
    /// An error found ahead of time, to be returned on the next advance.
    pub(crate) deferred: Option<Error>,
    pub(crate) current: Slot,
    /// A record framed ahead of `current`, delivered on the next advance if `has_lookahead`.
    pub(crate) lookahead: Slot,
    pub(crate) has_lookahead: bool,
    spare: Vec<Buffer>,
}

impl<R: Read> Reader<R> {
    /// Create a reader over `input`, detecting its format.
    ///
    /// Fails with [`Error::UnrecognizedFormat`] if the input is not WARC or ARC data, compressed
    /// or otherwise.
    pub fn new(input: R) -> Result<Self, Error> {
        let mut reader = Reader {
            input: None,
            format: None,
            framer: Framer::Warc,
            status: Status::Unbound,
            deferred: None,
            current: Slot::default(),
            lookahead: Slot::default(),
            has_lookahead: false,
            spare: Vec::new(),
        };
        reader.reset(input)?;
        Ok(reader)
    }

    /// Rebind this reader to a new input, discarding all state from the previous one.
    ///
    /// Buffers are kept for reuse. If the new input is not recognized the error is returned and
    /// every further read fails with [`Error::UnrecognizedFormat`] until a successful reset.
    pub fn reset(&mut self, input: R) -> Result<(), Error> {
        if let Some(old) = self.input.take() {
            old.into_buffers(&mut self.spare);
        }
        self.current.clear();
        self.lookahead.clear();
        self.has_lookahead = false;
        self.deferred = None;

        let (input, format) = detect::open(input, &mut self.spare);
        self.input = Some(input);
        match format {
            Ok(format) => {
                debug!("reading {} input", format);
                self.format = Some(format);
                self.framer = Framer::for_container(format.container);
                self.status = Status::Ready;
                Ok(())
            }
            Err(e) => {
                self.format = None;
                self.status = Status::Unbound;
                Err(e)
            }
        }
    }

    /// The detected format of the current input, if it was recognized.
    pub fn format(&self) -> Option<Format> {
        self.format
    }

    /// Get the next record, or `None` at the end of the input.
    ///
    /// After an error is returned the reader cannot locate further records and every following
    /// call returns `None`.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<Record<'_, R>>, Error> {
        if !self.advance()? {
            return Ok(None);
        }
        Ok(self.record())
    }

    /// Release decompression state.
    ///
    /// Further reads of a compressed input return `None`. Closing an uncompressed input has no
    /// effect, and closing more than once is harmless.
    pub fn close(&mut self) {
        let input = match self.input.as_mut() {
            Some(input) if input.compression() == Compression::Gzip => input,
            _ => return,
        };
        input.close();
        if self.status == Status::Ready {
            self.status = Status::Closed;
        }
    }

    pub(crate) fn record(&mut self) -> Option<Record<'_, R>> {
        let input = self.input.as_mut()?;
        Some(Record {
            slot: &mut self.current,
            input,
        })
    }

    /// Move `current` to the next record, returning `false` at the end of input.
    pub(crate) fn advance(&mut self) -> Result<bool, Error> {
        match self.status {
            Status::Unbound => return Err(Error::UnrecognizedFormat),
            Status::Done | Status::Closed => return Ok(false),
            Status::Ready => {}
        }

        let result = match self.deferred.take() {
            Some(e) => Err(e),
            None => self.step(),
        };
        if !matches!(result, Ok(true)) {
            self.status = Status::Done;
        }
        result
    }

    fn step(&mut self) -> Result<bool, Error> {
        let input = match self.input.as_mut() {
            Some(input) => input,
            None => return Ok(false),
        };

        if self.has_lookahead {
            mem::swap(&mut self.current, &mut self.lookahead);
            self.lookahead.clear();
            self.has_lookahead = false;
            return Ok(true);
        }

        if self.current.state == SlotState::Open {
            self.framer.finish(input, &mut self.current)?;
        }
        self.current.clear();
        self.framer.frame(input, &mut self.current)
    }
}
