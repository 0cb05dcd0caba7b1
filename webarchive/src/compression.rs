//! Handling of record compression.
//!
//! Web archives can be compressed, but the structure of the compressed data must be managed
//! to ensure a record can be accessed without decompressing every previous one in a file
//! (which may contain many records).
//!
//! In general, records are individually compressed so a file is a concatenation of gzip members,
//! one per record. Provided the file offset of a compressed record is known, a reading tool can
//! read a record alone. When reading sequentially the members are simply decompressed one after
//! another and their output concatenated.

use std::io::{self, BufRead, Read};
use std::path::Path;

use buf_redux::{BufReader, Buffer};
use flate2::bufread::GzDecoder;
use thiserror::Error;

/// Capacity of newly-allocated input buffers.
pub(crate) const BUFFER_CAPACITY: usize = 8 << 10;

/// The supported methods of compressing an archive.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Compression {
    /// Uncompressed data
    None,
    /// `gzip` compression
    ///
    /// gzip uses DEFLATE compression which is relatively simple but doesn't have particularly good
    /// compression. Each member has a gzip header and footer that include some uninteresting
    /// fields but also include a checksum.
    Gzip,
}

impl Compression {
    /// Return the best guess of compression to be used for a file with the given name.
    ///
    /// A file that may be present is not accessed in any way; only the path is used to guess based
    /// on the name. Readers sniff the actual data, so this is only useful as a hint.
    ///
    /// ```
    /// # use webarchive::Compression;
    /// assert_eq!(Compression::guess_for_filename("test.warc.gz"), Compression::Gzip);
    /// assert_eq!(Compression::guess_for_filename("test.arc"), Compression::None);
    /// ```
    pub fn guess_for_filename<P: AsRef<Path>>(path: P) -> Compression {
        match path.as_ref().extension() {
            Some(ext) if ext == "gz" => Compression::Gzip,
            _ => Compression::None,
        }
    }
}

/// A gzip member could not be decompressed.
///
/// Travels inside an [`io::Error`] through the `Read` stack and is unpacked into
/// [`Error::CorruptCompression`](crate::Error::CorruptCompression) at the reader boundary.
#[derive(Debug, Error)]
#[error("gzip member {member} is corrupt: {source}")]
pub(crate) struct CorruptMember {
    pub member: u64,
    pub source: io::Error,
}

enum State<R> {
    Inflating(GzDecoder<R>),
    Between(R),
}

/// Decompresses a sequence of concatenated gzip members as one stream.
///
/// The end of a member is not visible to readers; output continues with the next member until the
/// input is exhausted. A member that fails to decompress ends the stream with an error carrying a
/// [`CorruptMember`].
pub(crate) struct Members<R: BufRead> {
    // Only None while a transition is in progress.
    state: Option<State<R>>,
    /// Zero-based index of the member currently being decompressed.
    member: u64,
    closed: bool,
}

impl<R: BufRead> Members<R> {
    pub fn new(inner: R) -> Self {
        Members {
            state: Some(State::Inflating(GzDecoder::new(inner))),
            member: 0,
            closed: false,
        }
    }

    /// Release decompressor state. Subsequent reads return end-of-stream.
    pub fn close(&mut self) {
        if let Some(State::Inflating(decoder)) = self.state.take() {
            self.state = Some(State::Between(decoder.into_inner()));
        }
        self.closed = true;
    }

    pub fn into_inner(self) -> Option<R> {
        match self.state? {
            State::Inflating(decoder) => Some(decoder.into_inner()),
            State::Between(inner) => Some(inner),
        }
    }

    fn corrupt(&mut self, source: io::Error) -> io::Error {
        self.closed = true;
        io::Error::new(
            io::ErrorKind::InvalidData,
            CorruptMember {
                member: self.member,
                source,
            },
        )
    }
}

fn is_decode_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof
    )
}

impl<R: BufRead> Read for Members<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            if self.closed {
                return Ok(0);
            }

            let mut inner = match self.state.take() {
                Some(State::Inflating(mut decoder)) => {
                    let result = decoder.read(buf);
                    self.state = Some(State::Inflating(decoder));
                    match result {
                        Ok(0) => {}
                        Ok(n) => return Ok(n),
                        Err(e) if is_decode_error(&e) => return Err(self.corrupt(e)),
                        Err(e) => return Err(e),
                    }
                    match self.state.take() {
                        Some(State::Inflating(decoder)) => decoder.into_inner(),
                        Some(State::Between(inner)) => inner,
                        None => return Ok(0),
                    }
                }
                Some(State::Between(inner)) => inner,
                None => return Ok(0),
            };

            let more = match inner.fill_buf() {
                Ok(buf) => !buf.is_empty(),
                Err(e) => {
                    self.state = Some(State::Between(inner));
                    return Err(e);
                }
            };
            if !more {
                self.state = Some(State::Between(inner));
                return Ok(0);
            }

            self.member += 1;
            trace!("starting gzip member {}", self.member);
            self.state = Some(State::Inflating(GzDecoder::new(inner)));
        }
    }
}

/// Buffered, possibly decompressing, input to a reader.
pub(crate) enum Input<R: Read> {
    Plain(BufReader<R>),
    Gzip(BufReader<Members<BufReader<R>>>),
}

impl<R: Read> Input<R> {
    pub fn plain(inner: R, buffer: Buffer) -> Self {
        Input::Plain(BufReader::with_buffer(buffer, inner))
    }

    /// Switch a plain input to decompressing its data, starting from whatever has been buffered.
    ///
    /// An input that is already decompressing is returned unchanged.
    pub fn into_gzip(self, mut buffer: Buffer) -> Self {
        match self {
            Input::Plain(raw) => {
                buffer.clear();
                Input::Gzip(BufReader::with_buffer(buffer, Members::new(raw)))
            }
            gzip => gzip,
        }
    }

    pub fn compression(&self) -> Compression {
        match self {
            Input::Plain(_) => Compression::None,
            Input::Gzip(_) => Compression::Gzip,
        }
    }

    /// Return buffered input without consuming it, holding at least `n` bytes.
    ///
    /// The view may extend past `n` bytes. Fewer are returned only if the input ends first.
    pub fn peek(&mut self, n: usize) -> io::Result<&[u8]> {
        match self {
            Input::Plain(r) => peek_into(r, n),
            Input::Gzip(r) => peek_into(r, n),
        }
    }

    pub fn close(&mut self) {
        if let Input::Gzip(r) = self {
            r.get_mut().close();
        }
    }

    /// Tear down the input, keeping its buffers for reuse.
    pub fn into_buffers(self, spare: &mut Vec<Buffer>) {
        match self {
            Input::Plain(r) => {
                let (_, buffer) = r.into_inner_with_buffer();
                spare.push(buffer);
            }
            Input::Gzip(r) => {
                let (members, buffer) = r.into_inner_with_buffer();
                spare.push(buffer);
                if let Some(raw) = members.into_inner() {
                    let (_, buffer) = raw.into_inner_with_buffer();
                    spare.push(buffer);
                }
            }
        }
    }
}

fn peek_into<R: Read>(r: &mut BufReader<R>, n: usize) -> io::Result<&[u8]> {
    while r.buf_len() < n {
        r.make_room();
        r.reserve(n - r.buf_len());
        match r.read_into_buf() {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(r.buffer())
}

impl<R: Read> Read for Input<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Input::Plain(r) => r.read(buf),
            Input::Gzip(r) => r.read(buf),
        }
    }
}

impl<R: Read> BufRead for Input<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            Input::Plain(r) => r.fill_buf(),
            Input::Gzip(r) => r.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            Input::Plain(r) => r.consume(amt),
            Input::Gzip(r) => r.consume(amt),
        }
    }
}

/// Take a buffer from `spare` or allocate a new one.
pub(crate) fn take_buffer(spare: &mut Vec<Buffer>) -> Buffer {
    match spare.pop() {
        Some(mut buffer) => {
            buffer.clear();
            buffer
        }
        None => Buffer::with_capacity(BUFFER_CAPACITY),
    }
}
