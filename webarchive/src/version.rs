use std::fmt;
use std::str::{self, FromStr};

use crate::HeaderParseError;

/// The longest version line that will be searched for a terminator before giving up.
const MAX_VERSION_LINE: usize = 32;

/// The version of a WARC record.
///
/// Versions 0.9, 1.0 and 1.1 are all well-known, corresponding to the IIPC draft
/// WARC specification, ISO 28500 and ISO 28500:2016, respectively. Those well-known
/// versions can be conveniently referred to with associated constants like
/// [`WARC1_0`](Self::WARC1_0) and [`WARC1_1`](Self::WARC1_1).
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct Version {
    /// The integer part of the version number.
    ///
    /// In '12.345', this is 12.
    pub major: u32,
    /// The fractional part of the version number.
    ///
    /// In '12.345', this is 345.
    pub minor: u32,
}

impl Version {
    /// WARC 1.0, as specified by ISO 28500:2009.
    pub const WARC1_0: Self = Version { major: 1, minor: 0 };
    /// WARC 1.1, as specified by ISO 28500:2017.
    pub const WARC1_1: Self = Version { major: 1, minor: 1 };

    /// Parse the version line of a record from a buffer, returning the number of bytes
    /// consumed and the parsed version.
    ///
    /// If the buffer ends before the version line does, [`HeaderParseError::Truncated`] is
    /// returned so the caller can retry with more input.
    ///
    /// ```
    /// # use webarchive::Version;
    /// let buf = b"WARC/1.0\r\n\
    ///             <more here>";
    /// assert_eq!(
    ///     Version::parse(&buf[..]),
    ///     Ok((10, Version::WARC1_0))
    /// );
    /// ```
    pub fn parse(bytes: &[u8]) -> Result<(usize, Version), HeaderParseError> {
        const SIGNATURE: &[u8] = b"WARC/";

        fn bytes_to_u32(bytes: &[u8], line: &[u8]) -> Result<u32, HeaderParseError> {
            match str::from_utf8(bytes).map(u32::from_str) {
                Ok(Ok(x)) => Ok(x),
                Err(_) | Ok(Err(_)) => Err(HeaderParseError::invalid_signature(line)),
            }
        }

        if bytes.len() < SIGNATURE.len() {
            return if SIGNATURE.starts_with(bytes) {
                Err(HeaderParseError::Truncated)
            } else {
                Err(HeaderParseError::invalid_signature(bytes))
            };
        }
        if !bytes.starts_with(SIGNATURE) {
            return Err(HeaderParseError::invalid_signature(&bytes[..SIGNATURE.len()]));
        }

        let line_end = match bytes.windows(2).position(|x| x == b"\r\n") {
            Some(i) => i,
            None if bytes.len() > MAX_VERSION_LINE => {
                return Err(HeaderParseError::invalid_signature(&bytes[..MAX_VERSION_LINE]))
            }
            None => return Err(HeaderParseError::Truncated),
        };
        let line = &bytes[..line_end];

        let number = &line[SIGNATURE.len()..];
        let dot = match number.iter().position(|&x| x == b'.') {
            Some(i) => i,
            None => return Err(HeaderParseError::invalid_signature(line)),
        };
        let major = bytes_to_u32(&number[..dot], line)?;
        let minor = bytes_to_u32(&number[dot + 1..], line)?;

        Ok((line_end + 2, Version { major, minor }))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "WARC/{}.{}", self.major, self.minor)
    }
}
