use std::convert::TryFrom;
use std::fmt;

use uncased::AsUncased;

use crate::RecordKind;

/// The kind of a single record.
///
/// Every WARC record is specified to have a type in its [`WARC-Type`](crate::FieldKind::Type)
/// field. This enumeration provides variants for those specified in the WARC standard and allows
/// representation of others as might be used by extensions to the core WARC format or future
/// versions.
///
/// Parsed values are case-insensitive and normalize to the standard capitalization, but
/// [unknown](RecordType::Other) values preserve case when parsed.
///
/// ```
/// # use webarchive::{RecordType, RecordKind};
/// let response_type = RecordType::from("Response");
///
/// assert_eq!(response_type, RecordKind::Response);
/// assert_eq!(response_type.as_ref(), "response");
/// ```
#[derive(Debug, Clone)]
pub enum RecordType {
    /// A known (standardized) record type.
    Known(RecordKind),
    /// Any unrecognized record type.
    ///
    /// Software *shall* skip records of unknown type, which may be defined in future versions of
    /// the file format. A record with no `WARC-Type` at all is represented with an empty name.
    Other(Box<str>),
}

impl RecordType {
    /// Returns `true` for the types whose content is a captured resource: `resource`,
    /// `conversion` and `response`.
    pub fn is_payload(&self) -> bool {
        matches!(
            self,
            RecordType::Known(RecordKind::Resource)
                | RecordType::Known(RecordKind::Conversion)
                | RecordType::Known(RecordKind::Response)
        )
    }
}

impl Default for RecordType {
    fn default() -> Self {
        RecordType::Other("".into())
    }
}

impl AsRef<str> for RecordType {
    fn as_ref(&self) -> &str {
        match self {
            RecordType::Known(x) => x.as_ref(),
            RecordType::Other(s) => s,
        }
    }
}

impl From<&str> for RecordType {
    fn from(s: &str) -> Self {
        match RecordKind::try_from(s.trim()) {
            Ok(x) => RecordType::Known(x),
            Err(_) => RecordType::Other(s.into()),
        }
    }
}

impl From<RecordKind> for RecordType {
    fn from(kind: RecordKind) -> Self {
        RecordType::Known(kind)
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RecordType::Known(l), RecordType::Known(r)) => l == r,
            _ => self.as_uncased() == other.as_uncased(),
        }
    }
}

impl Eq for RecordType {}

impl PartialEq<RecordKind> for RecordType {
    fn eq(&self, other: &RecordKind) -> bool {
        match self {
            RecordType::Known(k) => k == other,
            RecordType::Other(s) => s.as_uncased() == other.as_ref(),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}
