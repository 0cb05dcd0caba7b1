use std::fmt;
use std::io::{self, BufRead, Read};

use chrono::{DateTime, Utc};

use crate::compression::Input;
use crate::content::Content;
use crate::header::{parse_date, FieldKind, FieldName, Fields, RecordKind, RecordType};
use crate::version::Version;
use crate::{Error, HeaderParseError};

/// Largest header block that will be buffered while looking for its end.
pub(crate) const MAX_HEADER_LEN: usize = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotState {
    /// Nothing framed.
    Empty,
    /// Header framed; content and record tail may still be in the input.
    Open,
    /// Content and tail consumed from the input.
    Finished,
}

/// Position of a record in a sequence of segmented records.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Segment {
    pub number: Option<u64>,
    pub origin: Option<String>,
}

/// Storage for one framed record, reused from record to record.
#[derive(Debug)]
pub(crate) struct Slot {
    pub kind: RecordType,
    pub version: Option<Version>,
    pub fields: Fields,
    pub content: Content,
    pub segment: Segment,
    pub state: SlotState,
}

impl Default for Slot {
    fn default() -> Self {
        Slot {
            kind: RecordType::default(),
            version: None,
            fields: Fields::new(),
            content: Content::default(),
            segment: Segment::default(),
            state: SlotState::Empty,
        }
    }
}

impl Slot {
    /// Forget the current record, keeping allocations.
    pub fn clear(&mut self) {
        self.kind = RecordType::default();
        self.version = None;
        self.fields.clear();
        self.content.reset(0);
        self.segment = Segment::default();
        self.state = SlotState::Empty;
    }

    /// Mark the slot as holding a framed record with `size` bytes of content waiting in the input.
    pub fn open(&mut self, kind: RecordType, version: Option<Version>, size: u64) {
        self.kind = kind;
        self.version = version;
        self.content.reset(size);
        self.state = SlotState::Open;
    }

    /// Returns `true` if this slot holds segment `number` of the record identified by `origin`.
    pub fn continues(&self, origin: &str, number: u64) -> bool {
        self.kind == RecordKind::Continuation
            && self.segment.number == Some(number)
            && self.segment.origin.as_deref() == Some(origin)
    }
}

/// Skip any bare line endings at the current position.
pub(crate) fn skip_blank_lines<R: Read>(input: &mut Input<R>) -> Result<(), Error> {
    loop {
        let buf = input.fill_buf()?;
        let n = buf
            .iter()
            .take_while(|&&b| b == b'\r' || b == b'\n')
            .count();
        let exhausted = n == buf.len();
        input.consume(n);
        if n == 0 || !exhausted {
            return Ok(());
        }
    }
}

/// Frame a header block at the current position of `input`.
///
/// `parse` is given the buffered input and returns the length of a complete header, or
/// [`HeaderParseError::Truncated`] if more input is required. The buffered view is grown until a
/// header is found, the input ends, or the header exceeds [`MAX_HEADER_LEN`]. Returns `false`
/// without calling `parse` if the input is already exhausted.
pub(crate) fn frame_header<R, F>(input: &mut Input<R>, mut parse: F) -> Result<bool, Error>
where
    R: Read,
    F: FnMut(&[u8]) -> Result<usize, HeaderParseError>,
{
    let mut want = 1;
    loop {
        let buf = input.peek(want)?;
        let available = buf.len();
        if available == 0 {
            return Ok(false);
        }

        match parse(buf) {
            Ok(n) => {
                trace!("framed {} byte header", n);
                input.consume(n);
                return Ok(true);
            }
            Err(HeaderParseError::Truncated) if available < want => {
                return Err(HeaderParseError::Truncated.into());
            }
            Err(HeaderParseError::Truncated) if available >= MAX_HEADER_LEN => {
                return Err(HeaderParseError::TooLong(MAX_HEADER_LEN).into());
            }
            Err(HeaderParseError::Truncated) => {
                want = std::cmp::min(available * 2, MAX_HEADER_LEN);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// A record in an archive.
///
/// A record borrows its [`Reader`](crate::Reader) and is valid until the reader advances. Its
/// content may be read sequentially through the [`Read`] and [`BufRead`] impls, or in arbitrary
/// windows with [`Self::slice`] and [`Self::eof_slice`]; all access paths see the same bytes.
///
/// Sequentially read content stays available to slices until about a megabyte has been read.
/// Beyond that, a sequential read releases what it has passed, and slices of released content
/// fail with [`Error::ContentReleased`]. Slice first to keep a large record in memory.
pub struct Record<'a, R: Read> {
    pub(crate) slot: &'a mut Slot,
    pub(crate) input: &'a mut Input<R>,
}

impl<'a, R: Read> Record<'a, R> {
    pub fn record_type(&self) -> &RecordType {
        &self.slot.kind
    }

    /// The WARC version of the record, or `None` for ARC entries.
    pub fn version(&self) -> Option<Version> {
        self.slot.version
    }

    /// The URI the record was captured from, or an empty string if it has none.
    ///
    /// Angle brackets around the URI (as written by WARC 1.0) are removed.
    pub fn url(&self) -> &str {
        self.uri(FieldKind::TargetURI).unwrap_or("")
    }

    /// The first value of a field, with the angle brackets that WARC 1.0 writes around bare URIs
    /// removed.
    ///
    /// Fields whose URIs are bracketed in every WARC version, like `WARC-Record-ID`, are returned
    /// as written.
    pub fn uri<N: Into<FieldName>>(&self, name: N) -> Option<&str> {
        let name = name.into();
        let value = self.slot.fields.get_first(&name)?.trim();
        if !name.value_is_bare_uri() {
            return Some(value);
        }
        Some(
            value
                .strip_prefix('<')
                .and_then(|u| u.strip_suffix('>'))
                .unwrap_or(value),
        )
    }

    /// The capture date, if the record has one that can be parsed.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.slot.fields.get_first(FieldKind::Date).and_then(parse_date)
    }

    /// The length of the content in bytes.
    pub fn size(&self) -> u64 {
        self.slot.content.len()
    }

    pub fn fields(&self) -> &Fields {
        &self.slot.fields
    }

    /// The value of the `WARC-Record-ID` field, if present.
    pub fn record_id(&self) -> Option<&str> {
        self.slot.fields.get_first(FieldKind::RecordId)
    }

    /// Get `len` bytes of content starting at `offset`.
    ///
    /// The sequential read position is not affected. Returns [`Error::OutOfRange`] if the window
    /// extends past the end of the content, or [`Error::ContentReleased`] if a long sequential
    /// read has already released it.
    pub fn slice(&mut self, offset: u64, len: u64) -> Result<&[u8], Error> {
        self.slot.content.slice(&mut *self.input, offset, len)
    }

    /// Get `len` bytes of content ending `offset` bytes before the end.
    ///
    /// This reads the whole content into memory. The sequential read position is not affected.
    pub fn eof_slice(&mut self, offset: u64, len: u64) -> Result<&[u8], Error> {
        self.slot.content.eof_slice(&mut *self.input, offset, len)
    }

    /// Get the whole content, reading it into memory.
    pub fn content(&mut self) -> Result<&[u8], Error> {
        self.slot.content.all(&mut *self.input)
    }
}

impl<'a, R: Read> Read for Record<'a, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.slot
            .content
            .read(&mut *self.input, buf)
            .map_err(io::Error::from)
    }
}

impl<'a, R: Read> BufRead for Record<'a, R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.slot
            .content
            .fill_buf(&mut *self.input)
            .map_err(io::Error::from)
    }

    fn consume(&mut self, amt: usize) {
        self.slot.content.consume(amt)
    }
}

impl<'a, R: Read> fmt::Debug for Record<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Record")
            .field("type", &self.slot.kind)
            .field("version", &self.slot.version)
            .field("size", &self.size())
            .field("fields", &self.slot.fields)
            .finish()
    }
}
