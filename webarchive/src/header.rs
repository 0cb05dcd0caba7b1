//! Record header data structures.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use indexmap::map::IndexMap;
use uncased::AsUncased;

pub use fieldkind::FieldKind;
pub use fieldname::FieldName;
pub use recordkind::RecordKind;
pub use recordtype::RecordType;

use crate::{is_ctl, HeaderParseError, SEPARATORS};

mod fieldkind;
mod fieldname;
mod recordkind;
mod recordtype;

// We use an IndexMap to preserve the read order of fields; std::collections::HashMap randomizes
// ordering.
type FieldMap = IndexMap<FieldName, Vec<String>>;

/// The fields of a record header.
///
/// Each field name maps to every value given for it, in the order they were encountered. Names
/// are case-insensitive and a name never maps to an empty list of values.
///
/// ```
/// # use webarchive::{Fields, FieldKind};
/// let mut fields = Fields::new();
/// fields.append(FieldKind::ConcurrentTo, "<urn:uuid:1>");
/// fields.append("warc-concurrent-to", "<urn:uuid:2>");
///
/// assert_eq!(fields.len(), 1);
/// assert_eq!(fields.get("WARC-Concurrent-To").unwrap(), &["<urn:uuid:1>", "<urn:uuid:2>"]);
/// assert_eq!(fields.get_first(FieldKind::ConcurrentTo), Some("<urn:uuid:1>"));
/// ```
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Fields {
    map: FieldMap,
}

impl Fields {
    pub fn new() -> Self {
        Default::default()
    }

    /// Get every value of a field, or None if no such field exists.
    pub fn get<N: AsRef<str>>(&self, name: N) -> Option<&[String]> {
        self.map
            .get(name.as_ref().as_uncased())
            .map(Vec::as_slice)
    }

    /// Get the first value of a field, or None if no such field exists.
    pub fn get_first<N: AsRef<str>>(&self, name: N) -> Option<&str> {
        self.get(name)?.first().map(String::as_str)
    }

    /// Return `true` if a field with the given name exists.
    pub fn contains<N: AsRef<str>>(&self, name: N) -> bool {
        self.map.contains_key(name.as_ref().as_uncased())
    }

    /// The number of distinct field names.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Add a value to a field, after any values it already has.
    pub fn append<N: Into<FieldName>, V: Into<String>>(&mut self, name: N, value: V) {
        self.map
            .entry(name.into())
            .or_insert_with(Vec::new)
            .push(value.into());
    }

    /// Remove a field, returning its values if it existed.
    pub fn remove<N: AsRef<str>>(&mut self, name: N) -> Option<Vec<String>> {
        self.map.shift_remove(name.as_ref().as_uncased())
    }

    /// Iterate over field names and their values, in the order names were first added.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &[String])> {
        self.map.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Remove every field, keeping allocated storage for reuse.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Merge fields from a secondary source without overriding names already present.
    ///
    /// Names that exist when this is called keep their values and the secondary values for them
    /// are discarded. Names new to this map take every value offered for them, in order.
    pub(crate) fn merge_secondary<I, N>(&mut self, secondary: I)
    where
        I: IntoIterator<Item = (N, String)>,
        N: AsRef<str> + Into<FieldName>,
    {
        let native = self.map.len();
        for (name, value) in secondary {
            match self.map.get_index_of(name.as_ref().as_uncased()) {
                Some(i) if i < native => {
                    trace!("keeping native field {} over secondary value", name.as_ref());
                }
                Some(i) => {
                    if let Some((_, values)) = self.map.get_index_mut(i) {
                        values.push(value);
                    }
                }
                None => {
                    self.map.insert(name.into(), vec![value]);
                }
            }
        }
    }
}

/// Parse one `name: value` field line from the start of `bytes`.
///
/// Returns the field name, its value, and the number of bytes consumed including the
/// terminating CRLF. Folded continuation lines (starting with a space or tab) are joined onto
/// the value. If `bytes` ends before the field does, [`HeaderParseError::Truncated`] is returned
/// so the caller can retry with more input.
pub(crate) fn parse_field(bytes: &[u8]) -> Result<(&str, String, usize), HeaderParseError> {
    if bytes.is_empty() {
        return Err(HeaderParseError::Truncated);
    }

    // field-name: at least one token, which is an ASCII value excluding CTL or SEPARATORS
    let name_end = match bytes
        .iter()
        .position(|&b| !b.is_ascii() || is_ctl(b) || SEPARATORS.contains(&b))
    {
        Some(0) => return Err(HeaderParseError::MalformedField),
        Some(i) => i,
        None => return Err(HeaderParseError::Truncated),
    };
    // literal colon must follow field-name
    if bytes[name_end] != b':' {
        return Err(HeaderParseError::MalformedField);
    }
    let name = std::str::from_utf8(&bytes[..name_end]).map_err(|_| HeaderParseError::MalformedField)?;

    let mut chunk_start = name_end + 1;
    let mut value: Vec<u8> = vec![];
    let consumed = loop {
        // Trim leading whitespace
        chunk_start += match bytes[chunk_start..]
            .iter()
            .position(|&x| x != b' ' && x != b'\t')
        {
            None => return Err(HeaderParseError::Truncated),
            Some(idx) => idx,
        };

        // Take data until CRLF
        let chunk_end = match bytes[chunk_start..].windows(2).position(|s| s == b"\r\n") {
            Some(idx) => chunk_start + idx,
            None => return Err(HeaderParseError::Truncated),
        };
        if !value.is_empty() && chunk_end > chunk_start {
            while let Some(b' ') | Some(b'\t') = value.last() {
                value.pop();
            }
            value.push(b' ');
        }
        value.extend_from_slice(&bytes[chunk_start..chunk_end]);

        // Stop if the following byte after CRLF isn't LWS, otherwise continue since it's a
        // folded line.
        match bytes.get(chunk_end + 2) {
            Some(b' ') | Some(b'\t') => {
                chunk_start = chunk_end + 2;
                continue;
            }
            Some(_) => break chunk_end + 2,
            // Absent: can't tell
            None => return Err(HeaderParseError::Truncated),
        }
    };

    while let Some(b' ') | Some(b'\t') = value.last() {
        value.pop();
    }
    let value = match String::from_utf8(value) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    };

    Ok((name, value, consumed))
}

/// Parse a capture timestamp as found in WARC or ARC headers.
///
/// WARC dates follow the W3C profile of ISO 8601 (`2021-08-24T23:19:14Z`, optionally with
/// fractional seconds or reduced to minute or day precision); ARC dates are 14 digits,
/// `YYYYMMDDhhmmss`. All are interpreted as UTC.
///
/// ```
/// # use webarchive::parse_date;
/// assert_eq!(parse_date("2008-04-30T20:48:25Z"), parse_date("20080430204825"));
/// assert!(parse_date("yesterday").is_none());
/// ```
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%dT%H:%MZ", "%Y%m%d%H%M%S"];
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for format in DATE_FORMATS {
        if let Some(naive) = NaiveDate::parse_from_str(s, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    None
}
