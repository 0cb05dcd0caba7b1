//! Tools for reading web archive files: WARC (Web ARChive) and its predecessor, ARC.
//!
//! ## Background
//!
//! WARC files are used to store digital resources and related information, generally for archival
//! storage. They are most commonly used to store the results of web crawls, wherein a crawler
//! requests resources from any desired web server(s) while storing the request that was sent for
//! each resource, the corresponding response, metadata for each and optionally other related
//! information. The format is formalized in ISO 28500, which to date has two published versions:
//! ISO 28500:2009 (WARC 1.0) and ISO 28500:2017 (WARC 1.1). Freely-available specifications are
//! published by the IIPC: see <https://iipc.github.io/warc-specifications/>.
//!
//! ARC is the format the Internet Archive used before WARC was standardized. An ARC file is a
//! sequence of entries, each of which is a single line of whitespace-separated metadata followed
//! by the captured bytes. The first entry of every ARC file is a `filedesc://` entry describing
//! the file itself.
//!
//! Either format may be compressed with gzip, and writers conventionally compress each record
//! as a separate gzip member so that a record can be extracted given only its file offset.
//!
//! ## WARC structure
//!
//! A WARC file is a simple concatenation of records. Each record has a format similar to an HTTP
//! message, consisting of a version declaration, a number of header fields, and any number of bytes
//! of data. A simple record representing an HTTP request might look like this:
//!
//! ```text
//! WARC/1.1
//! WARC-Type: request
//! WARC-Target-URI: https://example.com
//! Content-Type: application/http;msgtype=request
//! WARC-Record-ID: <urn:uuid:e061d11b-fb0a-4314-88c5-54e4870be701>
//! WARC-Date: 2021-08-24T23:19:14Z
//! Content-Length: 135
//!
//! GET /image/png HTTP/1.1
//! User-Agent: Wget/1.21.1
//! Accept: */*
//! Accept-Encoding: identity
//! Host: httpbin.org
//! Connection: Keep-Alive
//!
//!
//!
//! ```
//!
//! ## Library structure
//!
//! A [`Reader`] is created over any [`Read`](std::io::Read) and detects whether the input is WARC
//! or ARC, compressed or not. [`Reader::next`] yields every record in the input as a [`Record`];
//! [`Reader::next_payload`] yields only records that carry captured content, with HTTP transport
//! headers stripped from responses and segmented records joined back together.
//!
//! ```
//! # use std::io::Read;
//! # use webarchive::{Reader, FieldKind};
//! let warc = b"WARC/1.1\r\n\
//!     WARC-Type: resource\r\n\
//!     WARC-Target-URI: http://example.com/hello.txt\r\n\
//!     WARC-Date: 2021-08-24T23:19:14Z\r\n\
//!     Content-Length: 5\r\n\
//!     \r\n\
//!     hello\r\n\r\n";
//!
//! let mut reader = Reader::new(&warc[..]).unwrap();
//! while let Some(mut record) = reader.next().unwrap() {
//!     assert_eq!(record.url(), "http://example.com/hello.txt");
//!     assert_eq!(record.fields().get_first(FieldKind::ContentLength), Some("5"));
//!
//!     let mut content = String::new();
//!     record.read_to_string(&mut content).unwrap();
//!     assert_eq!(content, "hello");
//! }
//! ```

#[macro_use]
extern crate log;

use std::io;

use thiserror::Error;

mod arc;
mod compression;
mod content;
mod detect;
mod header;
mod payload;
mod reader;
mod record;
#[cfg(test)]
mod tests;
mod version;
mod warc;

pub use compression::Compression;
pub use detect::{Container, Format};
pub use header::{parse_date, FieldKind, FieldName, Fields, RecordKind, RecordType};
pub use reader::Reader;
pub use record::Record;
pub use version::Version;

/// Reasons it may be impossible to frame a record header.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum HeaderParseError {
    /// The WARC/m.n signature marking the start of a record is not present or invalid.
    ///
    /// The contained value is a UTF-8 interpretation of the data that was attempted to be parsed.
    #[error("WARC signature missing or invalid (near \"{0}\")")]
    InvalidSignature(String),
    /// A header field was malformed.
    #[error("header field is malformed")]
    MalformedField,
    /// The input ended before the end of the header.
    #[error("input ended before end of header")]
    Truncated,
    /// The length of the record content could not be determined.
    ///
    /// Contained value is the declared length, if any was present.
    #[error("content length is missing or not a valid integer (found {0:?})")]
    UnknownLength(Option<String>),
    /// The record tail (CRLF CRLF for WARC) did not follow the record content.
    #[error("missing record tail")]
    MissingTail,
    /// An ARC entry's metadata line does not have the expected shape.
    #[error("ARC metadata line is malformed (\"{0}\")")]
    MalformedArcLine(String),
    /// The header grew past the largest size the reader is willing to buffer.
    #[error("header exceeds {0} bytes")]
    TooLong(usize),
}

impl HeaderParseError {
    fn invalid_signature(sig_bytes: &[u8]) -> Self {
        HeaderParseError::InvalidSignature(String::from_utf8_lossy(sig_bytes).into_owned())
    }
}

/// Errors raised while opening an archive or reading its records.
#[derive(Debug, Error)]
pub enum Error {
    /// The input is neither WARC nor ARC, compressed or otherwise.
    #[error("input is not a recognized WARC or ARC stream")]
    UnrecognizedFormat,
    /// A record header could not be framed.
    ///
    /// The reader cannot locate the next record boundary after this error, so iteration ends.
    #[error("record header is not valid: {0}")]
    MalformedHeader(#[from] HeaderParseError),
    /// The input ended before a record's declared content length was reached.
    #[error("record content ended {missing} bytes short of its declared length")]
    TruncatedContent { missing: u64 },
    /// A gzip member failed to decompress.
    #[error("gzip member {member} is corrupt: {source}")]
    CorruptCompression {
        member: u64,
        #[source]
        source: io::Error,
    },
    /// A slice was requested outside the bounds of a record's content.
    ///
    /// This error is local to the slice call and does not affect iteration.
    #[error("requested {len} bytes at offset {offset} of content with length {size}")]
    OutOfRange { offset: u64, len: u64, size: u64 },
    /// A slice was requested of content that a long sequential read has already released.
    ///
    /// Like [`Error::OutOfRange`], this is local to the slice call.
    #[error("content before offset {released} was released by sequential reading; {offset} requested")]
    ContentReleased { offset: u64, released: u64 },
    /// Other I/O error from the underlying input.
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
}

impl From<io::Error> for Error {
    /// Recover engine errors that passed through an [`io::Error`], such as those returned by a
    /// [`Record`]'s `Read` impl or raised inside the gzip layer.
    fn from(e: io::Error) -> Self {
        let wrapped = match e.get_ref() {
            Some(inner) => inner.is::<compression::CorruptMember>() || inner.is::<Error>(),
            None => false,
        };
        if !wrapped {
            return Error::Io(e);
        }

        let kind = e.kind();
        let inner = match e.into_inner() {
            Some(inner) => inner,
            None => return Error::Io(kind.into()),
        };
        let inner = match inner.downcast::<Error>() {
            Ok(e) => return *e,
            Err(other) => other,
        };
        match inner.downcast::<compression::CorruptMember>() {
            Ok(corrupt) => {
                let compression::CorruptMember { member, source } = *corrupt;
                Error::CorruptCompression { member, source }
            }
            Err(other) => Error::Io(io::Error::new(kind, other)),
        }
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Io(e) => e,
            e @ Error::TruncatedContent { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            e => io::Error::new(io::ErrorKind::InvalidData, e),
        }
    }
}

/// WARC EBNF "separators" class
const SEPARATORS: &[u8] = b"()<>@,;:\\\"/[]?={} \t";

/// WARC EBNF "CTL" class: ASCII chars 0-31 and DEL (127)
fn is_ctl(b: u8) -> bool {
    b < 0x20 || b == 0x7f
}
