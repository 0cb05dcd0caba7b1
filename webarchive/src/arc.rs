//! Framing of ARC entries.
//!
//! An ARC entry is a single line of whitespace-separated metadata followed by the captured bytes
//! and a newline. Version 1 lines have five columns:
//!
//! ```text
//! URL IP-address Archive-date Content-type Archive-length
//! ```
//!
//! and version 2 lines have ten:
//!
//! ```text
//! URL IP-address Archive-date Content-type Result-code Checksum Location Offset Filename Archive-length
//! ```
//!
//! Columns are exposed under the equivalent WARC field names, with the version 2 extras under
//! `ARC-*` names, so both formats present the same field shape.

use std::io::{BufRead, Read};

use crate::compression::Input;
use crate::header::{FieldKind, Fields, RecordKind};
use crate::record::{frame_header, skip_blank_lines, Slot, SlotState};
use crate::{Error, HeaderParseError};

const V1_COLUMNS: usize = 5;
const V2_COLUMNS: usize = 10;

const V2_EXTRAS: [FieldKind; 5] = [
    FieldKind::ArcResultCode,
    FieldKind::ArcChecksum,
    FieldKind::ArcLocation,
    FieldKind::ArcOffset,
    FieldKind::ArcFilename,
];

/// Parse a metadata line into `fields`, returning the content length and the line length
/// including its terminator.
fn parse_line(bytes: &[u8], fields: &mut Fields) -> Result<(u64, usize), HeaderParseError> {
    fields.clear();
    let end = match bytes.iter().position(|&b| b == b'\n') {
        Some(i) => i,
        None => return Err(HeaderParseError::Truncated),
    };
    let mut line = &bytes[..end];
    if let Some(b'\r') = line.last() {
        line = &line[..line.len() - 1];
    }
    let line = String::from_utf8_lossy(line);

    let columns: Vec<&str> = line.split_whitespace().collect();
    if columns.len() < V1_COLUMNS {
        return Err(HeaderParseError::MalformedArcLine(line.to_string()));
    }
    let length = columns[columns.len() - 1];
    let size = length
        .parse()
        .map_err(|_| HeaderParseError::UnknownLength(Some(length.to_owned())))?;

    fields.append(FieldKind::TargetURI, columns[0]);
    fields.append(FieldKind::IpAddress, columns[1]);
    fields.append(FieldKind::Date, columns[2]);
    fields.append(FieldKind::ContentType, columns[3]);
    if columns.len() == V2_COLUMNS {
        for (kind, value) in V2_EXTRAS.iter().zip(&columns[4..9]) {
            fields.append(*kind, *value);
        }
    }
    fields.append(FieldKind::ContentLength, length);

    Ok((size, end + 1))
}

/// Frame the entry at the current position of `input` into `slot`.
///
/// The first entry of a file describes the file itself and is reported as
/// [`warcinfo`](RecordKind::Info); every other entry is a [`resource`](RecordKind::Resource).
pub(crate) fn frame<R: Read>(
    input: &mut Input<R>,
    slot: &mut Slot,
    first: bool,
) -> Result<bool, Error> {
    skip_blank_lines(input)?;

    let mut size = 0;
    let fields = &mut slot.fields;
    let framed = frame_header(input, |bytes| {
        let (length, n) = parse_line(bytes, fields)?;
        size = length;
        Ok(n)
    })?;
    if !framed {
        return Ok(false);
    }

    let kind = if first {
        RecordKind::Info
    } else {
        RecordKind::Resource
    };
    debug!("framed ARC entry of {} bytes", size);
    slot.open(kind.into(), None, size);
    Ok(true)
}

/// Consume the remaining content of the entry in `slot` and its trailing newline, if any.
pub(crate) fn finish<R: Read>(input: &mut Input<R>, slot: &mut Slot) -> Result<(), Error> {
    slot.state = SlotState::Finished;
    slot.content.skip(input)?;

    if input.peek(1)?.first() == Some(&b'\n') {
        input.consume(1);
    }
    Ok(())
}
