//! Framing of WARC records.

use std::io::{BufRead, Read};

use crate::compression::Input;
use crate::header::{parse_field, FieldKind, Fields, RecordType};
use crate::record::{frame_header, skip_blank_lines, Slot, SlotState};
use crate::version::Version;
use crate::{Error, HeaderParseError};

/// The bytes that follow every record's content block.
const RECORD_TAIL: &[u8] = b"\r\n\r\n";

/// Parse a complete header block: version line, fields and the blank line ending the block.
///
/// Fields are written into `fields`, which is cleared first. Returns the version and the number
/// of bytes in the block.
fn parse_header(bytes: &[u8], fields: &mut Fields) -> Result<(Version, usize), HeaderParseError> {
    fields.clear();
    let (mut consumed, version) = Version::parse(bytes)?;

    loop {
        let rest = &bytes[consumed..];
        if rest.starts_with(b"\r\n") {
            return Ok((version, consumed + 2));
        }
        if rest.len() < 2 && b"\r\n".starts_with(rest) {
            return Err(HeaderParseError::Truncated);
        }

        let (name, value, n) = parse_field(rest)?;
        fields.append(name, value);
        consumed += n;
    }
}

fn content_length(fields: &Fields) -> Result<u64, HeaderParseError> {
    match fields.get_first(FieldKind::ContentLength) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| HeaderParseError::UnknownLength(Some(value.to_owned()))),
        None => Err(HeaderParseError::UnknownLength(None)),
    }
}

/// Frame the record at the current position of `input` into `slot`.
///
/// Returns `false` if the input is exhausted before any record begins.
pub(crate) fn frame<R: Read>(input: &mut Input<R>, slot: &mut Slot) -> Result<bool, Error> {
    skip_blank_lines(input)?;

    let mut version = None;
    let fields = &mut slot.fields;
    let framed = frame_header(input, |bytes| {
        let (v, n) = parse_header(bytes, fields)?;
        version = Some(v);
        Ok(n)
    })?;
    if !framed {
        return Ok(false);
    }

    let size = content_length(&slot.fields)?;
    let kind = slot
        .fields
        .get_first(FieldKind::Type)
        .map(RecordType::from)
        .unwrap_or_default();
    slot.segment.number = slot
        .fields
        .get_first(FieldKind::SegmentNumber)
        .and_then(|n| n.trim().parse().ok());
    slot.segment.origin = slot
        .fields
        .get_first(FieldKind::SegmentOriginID)
        .map(|id| id.trim().to_owned());

    debug!("framed {} record of {} bytes", kind, size);
    slot.open(kind, version, size);
    Ok(true)
}

/// Consume the remaining content and record tail of the record in `slot`.
pub(crate) fn finish<R: Read>(input: &mut Input<R>, slot: &mut Slot) -> Result<(), Error> {
    slot.state = SlotState::Finished;
    slot.content.skip(input)?;

    if !input.peek(RECORD_TAIL.len())?.starts_with(RECORD_TAIL) {
        return Err(HeaderParseError::MissingTail.into());
    }
    input.consume(RECORD_TAIL.len());
    Ok(())
}
