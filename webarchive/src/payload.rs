//! Derivation of the payload stream: captured content with transport framing removed.

use std::cmp;
use std::io::Read;

use crate::compression::Input;
use crate::header::{FieldKind, RecordKind};
use crate::reader::{Framer, Reader, Status};
use crate::record::{Record, Slot};
use crate::Error;

/// Most bytes of a response examined for an HTTP header block.
const HTTP_PROBE_LEN: u64 = 64 << 10;
/// Most HTTP header fields parsed from one response.
const MAX_HTTP_HEADERS: usize = 128;

const SEGMENT_FIELDS: [FieldKind; 3] = [
    FieldKind::SegmentNumber,
    FieldKind::SegmentOriginID,
    FieldKind::SegmentTotalLength,
];

impl<R: Read> Reader<R> {
    /// Get the next record that carries captured content, or `None` at the end of the input.
    ///
    /// Only `resource`, `conversion` and `response` records are returned; other records are
    /// skipped. The HTTP status line and headers are removed from the content of WARC `response`
    /// records and the headers are added to the record's fields, without replacing any field the
    /// record already has. A response that does not begin with a valid HTTP header block is
    /// returned unchanged. Continuation records that follow a segmented record are joined onto
    /// it, so the record's content is the entire reassembled block.
    pub fn next_payload(&mut self) -> Result<Option<Record<'_, R>>, Error> {
        loop {
            if !self.advance()? {
                return Ok(None);
            }
            if self.current.kind.is_payload() {
                break;
            }
            debug!("skipping {} record", self.current.kind);
        }

        if let Err(e) = self.normalize() {
            self.status = Status::Done;
            return Err(e);
        }
        Ok(self.record())
    }

    fn normalize(&mut self) -> Result<(), Error> {
        let input = match self.input.as_mut() {
            Some(input) => input,
            None => return Ok(()),
        };

        if self.framer == Framer::Warc && self.current.kind == RecordKind::Response {
            strip_http(input, &mut self.current)?;
        }
        if self.current.fields.contains(FieldKind::RecordId) {
            self.merge_continuations();
        }
        Ok(())
    }

    /// Join any continuation records that follow `current` onto it.
    ///
    /// A record without a segment number is taken to be the first segment. Reading ahead requires
    /// finishing `current`, so its content is pulled into memory first. The first record that does
    /// not continue `current` is kept as the lookahead, and any error while reading ahead is
    /// deferred to the next advance so `current` can still be returned.
    fn merge_continuations(&mut self) {
        let origin = match self.current.fields.get_first(FieldKind::RecordId) {
            Some(id) => id.trim().to_owned(),
            None => return,
        };
        let first = self.current.segment.number.unwrap_or(1);
        let mut expected = match first.checked_add(1) {
            Some(n) => n,
            None => return,
        };
        let mut merged = false;

        if let Err(e) = self.join_segments(&origin, &mut expected, &mut merged) {
            warn!(
                "error reading ahead of segmented record {}: {}",
                origin, e
            );
            self.deferred = Some(e);
            self.has_lookahead = false;
        }

        if merged {
            debug!(
                "merged {} segments of {}",
                expected - first,
                origin
            );
            for kind in SEGMENT_FIELDS.iter() {
                self.current.fields.remove(kind);
            }
        }
    }

    fn join_segments(
        &mut self,
        origin: &str,
        expected: &mut u64,
        merged: &mut bool,
    ) -> Result<(), Error> {
        let input = match self.input.as_mut() {
            Some(input) => input,
            None => return Ok(()),
        };

        self.current.content.fill_all(input)?;
        self.framer.finish(input, &mut self.current)?;

        loop {
            self.lookahead.clear();
            if !self.framer.frame(input, &mut self.lookahead)? {
                return Ok(());
            }
            if !self.lookahead.continues(origin, *expected) {
                trace!("record after {} is not a continuation", origin);
                self.has_lookahead = true;
                return Ok(());
            }

            let n = self.lookahead.content.len();
            self.current.content.absorb(input, n)?;
            self.lookahead.content.reset(0);
            self.framer.finish(input, &mut self.lookahead)?;
            self.lookahead.clear();
            *merged = true;
            *expected = match expected.checked_add(1) {
                Some(n) => n,
                None => return Ok(()),
            };
        }
    }
}

/// Remove a leading HTTP status line and header block from the content in `slot`, merging the
/// headers into its fields.
///
/// Content that does not start with a complete HTTP response header is left untouched.
fn strip_http<R: Read>(input: &mut Input<R>, slot: &mut Slot) -> Result<(), Error> {
    let window = cmp::min(slot.content.len(), HTTP_PROBE_LEN);
    let head = slot.content.slice(input, 0, window)?;

    let mut headers = [httparse::EMPTY_HEADER; MAX_HTTP_HEADERS];
    let mut response = httparse::Response::new(&mut headers);
    let (header_len, parsed) = match response.parse(head) {
        Ok(httparse::Status::Complete(n)) => {
            let parsed: Vec<(String, String)> = response
                .headers
                .iter()
                .map(|h| {
                    (
                        h.name.to_owned(),
                        String::from_utf8_lossy(h.value).trim().to_owned(),
                    )
                })
                .collect();
            (n, parsed)
        }
        Ok(httparse::Status::Partial) => {
            debug!("HTTP header incomplete in first {} bytes; passing through", window);
            return Ok(());
        }
        Err(e) => {
            debug!("content is not an HTTP response ({}); passing through", e);
            return Ok(());
        }
    };

    trace!("stripping {} byte HTTP header", header_len);
    slot.content.strip_prefix(header_len);
    slot.fields.merge_secondary(parsed);
    Ok(())
}
