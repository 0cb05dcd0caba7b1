//! Identification of the container format and compression of an input stream.

use std::fmt;
use std::io::Read;

use buf_redux::Buffer;

use crate::compression::{take_buffer, Compression, Input};
use crate::record::skip_blank_lines;
use crate::Error;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const WARC_SIGNATURE: &[u8] = b"WARC/";
const ARC_SIGNATURE: &[u8] = b"filedesc://";
/// Number of leading bytes inspected to classify a stream.
const SNIFF_LEN: usize = 16;

/// The container formats a [`Reader`](crate::Reader) understands.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Container {
    Warc,
    Arc,
}

impl Container {
    fn classify(bytes: &[u8]) -> Option<Container> {
        if bytes.starts_with(WARC_SIGNATURE) {
            Some(Container::Warc)
        } else if bytes.starts_with(ARC_SIGNATURE) {
            Some(Container::Arc)
        } else {
            None
        }
    }
}

/// The detected shape of an input: container format and compression.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Format {
    pub container: Container,
    pub compression: Compression,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let container = match self.container {
            Container::Warc => "WARC",
            Container::Arc => "ARC",
        };
        match self.compression {
            Compression::None => f.write_str(container),
            Compression::Gzip => write!(f, "{} (gzip)", container),
        }
    }
}

/// Wrap `inner` for reading and classify its contents.
///
/// The input is returned even when detection fails so its buffers can be recovered. Only bare line
/// endings ahead of the first header are consumed, as the framers would skip them anyway.
pub(crate) fn open<R: Read>(inner: R, spare: &mut Vec<Buffer>) -> (Input<R>, Result<Format, Error>) {
    let mut input = Input::plain(inner, take_buffer(spare));

    let gzip = input.peek(SNIFF_LEN).map(|head| head.starts_with(GZIP_MAGIC));
    let gzip = match gzip {
        Ok(gzip) => gzip,
        Err(e) => return (input, Err(e.into())),
    };
    if gzip {
        input = input.into_gzip(take_buffer(spare));
    }

    let compression = input.compression();
    if let Err(e) = skip_blank_lines(&mut input) {
        return (input, Err(e));
    }
    let format = match input.peek(SNIFF_LEN) {
        Ok(head) => match Container::classify(head) {
            Some(container) => Ok(Format {
                container,
                compression,
            }),
            None => {
                debug!(
                    "unrecognized stream starting {:?}",
                    String::from_utf8_lossy(head)
                );
                Err(Error::UnrecognizedFormat)
            }
        },
        Err(e) => Err(e.into()),
    };
    (input, format)
}
