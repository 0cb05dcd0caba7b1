use super::{gzip_members, warc_record};
use crate::{Compression, Container, Error, Reader};

fn urls<R: std::io::Read>(reader: &mut Reader<R>) -> Vec<String> {
    let mut out = Vec::new();
    while let Some(record) = reader.next().unwrap() {
        out.push(record.url().to_owned());
    }
    out
}

#[test]
fn reset_rebinds_to_new_input() {
    let first = gzip_members(vec![
        warc_record("resource", &[("WARC-Target-URI", "http://a.example/")], b"a"),
        warc_record("resource", &[("WARC-Target-URI", "http://b.example/")], b"b"),
    ]);
    let second = b"filedesc://second.arc 0.0.0.0 20080430204825 text/plain 0\n\n\
        http://c.example/ 192.0.2.1 20080430204826 text/plain 1\nc\n"
        .to_vec();

    let mut reader = Reader::new(&first[..]).unwrap();
    // Leave the first input part way through a record
    assert!(reader.next().unwrap().is_some());

    reader.reset(&second[..]).unwrap();
    let format = reader.format().unwrap();
    assert_eq!(format.container, Container::Arc);
    assert_eq!(format.compression, Compression::None);
    assert_eq!(
        urls(&mut reader),
        vec!["filedesc://second.arc".to_owned(), "http://c.example/".to_owned()]
    );

    reader.reset(&first[..]).unwrap();
    assert_eq!(
        urls(&mut reader),
        vec!["http://a.example/".to_owned(), "http://b.example/".to_owned()]
    );
}

#[test]
fn reset_discards_lookahead_and_errors() {
    let mut segmented = warc_record(
        "resource",
        &[
            ("WARC-Record-ID", "<urn:uuid:a>"),
            ("WARC-Segment-Number", "1"),
        ],
        b"alpha",
    );
    segmented.extend(warc_record("metadata", &[], b"meta"));
    let other = warc_record("resource", &[("WARC-Target-URI", "http://other/")], b"x");

    let mut reader = Reader::new(&segmented[..]).unwrap();
    // Leaves the metadata record framed ahead
    assert!(reader.next_payload().unwrap().is_some());

    reader.reset(&other[..]).unwrap();
    assert_eq!(urls(&mut reader), vec!["http://other/".to_owned()]);
}

#[test]
fn failed_reset_is_sticky_until_success() {
    let good = warc_record("resource", &[], b"x");
    let mut reader = Reader::new(&good[..]).unwrap();

    assert!(matches!(
        reader.reset(&b"PK\x03\x04 not an archive"[..]),
        Err(Error::UnrecognizedFormat)
    ));
    assert_eq!(reader.format(), None);
    assert!(matches!(reader.next(), Err(Error::UnrecognizedFormat)));
    assert!(matches!(reader.next_payload(), Err(Error::UnrecognizedFormat)));

    reader.reset(&good[..]).unwrap();
    assert_eq!(urls(&mut reader), vec![String::new()]);
}

#[test]
fn unrecognized_inputs() {
    for input in [
        &b""[..],
        b"\r\n\r\n",
        b"\r\n\r\n<!DOCTYPE html>",
        b"<!DOCTYPE html>",
        b"filedesc:/",
    ]
    .iter()
    {
        assert!(
            matches!(Reader::new(*input), Err(Error::UnrecognizedFormat)),
            "{:?}",
            String::from_utf8_lossy(input)
        );
    }

    // Compressed, but not an archive
    let gzipped = gzip_members(vec![&b"just some text"[..]]);
    assert!(matches!(
        Reader::new(&gzipped[..]),
        Err(Error::UnrecognizedFormat)
    ));
}

#[test]
fn leading_line_endings_are_skipped() {
    let mut data = b"\r\n\n\r\n".to_vec();
    data.extend(warc_record("resource", &[("WARC-Target-URI", "http://a.example/")], b"a"));

    let mut reader = Reader::new(&data[..]).unwrap();
    assert_eq!(reader.format().unwrap().container, Container::Warc);
    assert_eq!(urls(&mut reader), vec!["http://a.example/".to_owned()]);

    let gzipped = gzip_members(vec![&data]);
    let mut reader = Reader::new(&gzipped[..]).unwrap();
    assert_eq!(reader.format().unwrap().compression, Compression::Gzip);
    assert_eq!(urls(&mut reader), vec!["http://a.example/".to_owned()]);
}
