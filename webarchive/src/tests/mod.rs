use std::io::Write;

use flate2::write::GzEncoder;

use crate::header::parse_field;
use crate::{parse_date, FieldKind, FieldName, Fields, HeaderParseError, Version};

mod reset;
mod slices;

/// Build a WARC/1.1 record with the given type, extra fields and content.
pub(crate) fn warc_record(kind: &str, fields: &[(&str, &str)], content: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    write!(out, "WARC/1.1\r\nWARC-Type: {}\r\n", kind).unwrap();
    for (name, value) in fields {
        write!(out, "{}: {}\r\n", name, value).unwrap();
    }
    write!(out, "Content-Length: {}\r\n\r\n", content.len()).unwrap();
    out.extend_from_slice(content);
    out.extend_from_slice(b"\r\n\r\n");
    out
}

/// Compress each chunk as a separate gzip member.
pub(crate) fn gzip_members<I, C>(chunks: I) -> Vec<u8>
where
    I: IntoIterator<Item = C>,
    C: AsRef<[u8]>,
{
    let mut out = Vec::new();
    for chunk in chunks {
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(chunk.as_ref()).unwrap();
        out.extend(encoder.finish().unwrap());
    }
    out
}

#[test]
fn can_read_field() {
    let text = b"X-Multiline-Test:lol \r\n  multiline headers\r\nNext: field\r\n";

    let (name, value, n) = parse_field(&text[..]).expect("should be valid");
    assert_eq!(name, "X-Multiline-Test");
    assert_eq!(value, "lol multiline headers");
    assert_eq!(&text[n..], b"Next: field\r\n");
}

#[test]
fn field_needs_lookahead() {
    // A following space would fold into this field
    assert_eq!(
        parse_field(b"WARC-Type: resource\r\n"),
        Err(HeaderParseError::Truncated)
    );
    assert_eq!(parse_field(b"WARC-Ty"), Err(HeaderParseError::Truncated));
}

#[test]
fn invalid_fields_are_invalid() {
    assert_eq!(
        parse_field(b"This is not a valid field"),
        Err(HeaderParseError::MalformedField)
    );
    assert_eq!(
        parse_field(b"X-Invalid-UTF-8\xFF: yes"),
        Err(HeaderParseError::MalformedField)
    );
    assert_eq!(
        parse_field(b": no name\r\n\r\n"),
        Err(HeaderParseError::MalformedField)
    );
}

#[test]
fn incorrect_signature_is_invalid() {
    assert!(matches!(
        Version::parse(b"\x89PNG\r\n\x1a\n"),
        Err(HeaderParseError::InvalidSignature(_))
    ));
    assert!(matches!(
        Version::parse(b"WARC/1.0a\r\n"),
        Err(HeaderParseError::InvalidSignature(_))
    ));
    assert_eq!(
        Version::parse(b"WARC/0.17\r\n"),
        Ok((11, Version { major: 0, minor: 17 }))
    );
}

#[test]
fn fields_are_case_insensitive() {
    let mut fields = Fields::new();
    fields.append("x-custom", "1");
    fields.append("X-Custom", "2");
    fields.append(FieldKind::ContentType, "text/plain");

    assert_eq!(fields.len(), 2);
    assert_eq!(fields.get("X-CUSTOM").unwrap(), &["1", "2"]);
    assert!(fields.contains("content-type"));

    let names: Vec<&FieldName> = fields.iter().map(|(name, _)| name).collect();
    assert_eq!(names[0].as_ref(), "x-custom");
    assert_eq!(names[1], &FieldKind::ContentType.into_name());

    assert_eq!(fields.remove("CONTENT-TYPE"), Some(vec!["text/plain".to_owned()]));
    assert!(!fields.contains(FieldKind::ContentType));
}

#[test]
fn secondary_fields_do_not_override() {
    let mut fields = Fields::new();
    fields.append(FieldKind::ContentType, "application/http");

    fields.merge_secondary(vec![
        ("Content-Type".to_owned(), "text/html".to_owned()),
        ("Set-Cookie".to_owned(), "a=1".to_owned()),
        ("set-cookie".to_owned(), "b=2".to_owned()),
    ]);

    assert_eq!(
        fields.get(FieldKind::ContentType).unwrap(),
        &["application/http"]
    );
    assert_eq!(fields.get("Set-Cookie").unwrap(), &["a=1", "b=2"]);
}

#[test]
fn dates() {
    let full = parse_date("2008-04-30T20:48:25Z").expect("W3C date should parse");
    assert_eq!(full.to_rfc3339(), "2008-04-30T20:48:25+00:00");

    assert_eq!(parse_date("20080430204825"), Some(full));
    assert_eq!(parse_date("2008-04-30T20:48:25.000Z"), Some(full));
    assert!(parse_date("2008-04-30T20:48Z").is_some());
    assert!(parse_date("2008-04-30").is_some());
    assert_eq!(parse_date("2008-13-30"), None);
    assert_eq!(parse_date(""), None);
}
