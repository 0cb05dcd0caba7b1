//! Behaviour that must hold for any input, checked over handwritten archives.

use std::io::Read;

use pretty_assertions::assert_eq;
use webarchive::{Error, FieldKind, Reader, RecordKind};

mod common;
use common::{crawl_records, gzip_members, warc_record, Trickle};

#[derive(Debug, PartialEq)]
enum Outcome {
    Record {
        url: String,
        size: u64,
        content: Vec<u8>,
    },
    End,
    Failed(String),
}

fn error_kind(e: &Error) -> String {
    match e {
        Error::UnrecognizedFormat => "unrecognized".into(),
        Error::MalformedHeader(reason) => format!("malformed: {}", reason),
        Error::TruncatedContent { missing } => format!("truncated by {}", missing),
        Error::CorruptCompression { member, .. } => format!("corrupt member {}", member),
        Error::OutOfRange { .. } => "out of range".into(),
        Error::ContentReleased { .. } => "released".into(),
        Error::Io(e) => format!("io: {:?}", e.kind()),
    }
}

/// Drain a reader, recording what each call produced.
fn outcomes<R: Read>(mut reader: Reader<R>, payload: bool) -> Vec<Outcome> {
    let mut out = Vec::new();
    loop {
        let next = if payload {
            reader.next_payload()
        } else {
            reader.next()
        };
        match next {
            Ok(Some(mut record)) => {
                let url = record.url().to_owned();
                let size = record.size();
                let mut content = Vec::new();
                if let Err(e) = record.read_to_end(&mut content) {
                    out.push(Outcome::Failed(format!("read: {:?}", e.kind())));
                    break;
                }
                out.push(Outcome::Record { url, size, content });
            }
            Ok(None) => {
                out.push(Outcome::End);
                break;
            }
            Err(e) => {
                out.push(Outcome::Failed(error_kind(&e)));
                break;
            }
        }
    }
    out
}

fn both_paths(data: &[u8], payload: bool) -> (Vec<Outcome>, Vec<Outcome>) {
    let buffered = outcomes(Reader::new(data).unwrap(), payload);
    let trickled = outcomes(Reader::new(Trickle::new(data, 3)).unwrap(), payload);
    (buffered, trickled)
}

fn sample_inputs() -> Vec<(&'static str, Vec<u8>)> {
    let records = crawl_records();
    let whole = records.concat();

    let mut truncated = whole.clone();
    truncated.truncate(whole.len() - 30);

    let mut missing_tail = records[0].clone();
    missing_tail.truncate(missing_tail.len() - 2);
    missing_tail.extend(records[2].iter());

    vec![
        ("plain", whole.clone()),
        ("member per record", gzip_members(&records)),
        ("single member", gzip_members(vec![&whole])),
        ("truncated", truncated),
        ("missing tail", missing_tail),
    ]
}

#[test]
fn access_paths_agree() {
    for (name, data) in sample_inputs() {
        for &payload in &[false, true] {
            let (buffered, trickled) = both_paths(&data, payload);
            assert_eq!(buffered, trickled, "{} (payload: {})", name, payload);
        }
    }
}

#[test]
fn size_matches_drained_content() {
    for (name, data) in sample_inputs().into_iter().take(3) {
        for &payload in &[false, true] {
            for outcome in outcomes(Reader::new(&data[..]).unwrap(), payload) {
                match outcome {
                    Outcome::Record { size, content, .. } => {
                        assert_eq!(size, content.len() as u64, "{}", name)
                    }
                    Outcome::End => {}
                    Outcome::Failed(e) => panic!("{} failed: {}", name, e),
                }
            }
        }
    }
}

#[test]
fn slices_match_sequential_read() {
    let data = crawl_records().concat();
    let mut reader = Reader::new(&data[..]).unwrap();

    while let Some(mut record) = reader.next().unwrap() {
        let size = record.size();
        let mut read = Vec::new();
        record.read_to_end(&mut read).unwrap();

        for len in 0..=size {
            let head = record.slice(0, len).unwrap().to_vec();
            assert_eq!(&head[..], &read[..len as usize]);
            let window = record.eof_slice(size - len, len).unwrap().to_vec();
            assert_eq!(head, window);
        }
        assert_eq!(record.eof_slice(0, size).unwrap(), &read[..]);
    }
}

#[test]
fn payload_stream_only_has_payload_types() {
    let data = crawl_records().concat();
    let mut reader = Reader::new(&data[..]).unwrap();

    let mut urls = Vec::new();
    while let Some(record) = reader.next_payload().unwrap() {
        let kind = record.record_type();
        assert!(
            *kind == RecordKind::Resource
                || *kind == RecordKind::Response
                || *kind == RecordKind::Conversion,
            "unexpected {}",
            kind
        );
        urls.push(record.url().to_owned());
    }
    assert_eq!(
        urls,
        vec![
            "http://example.com/",
            "http://example.com/logo.png",
            "dns:example.com"
        ]
    );
}

#[test]
fn stripped_response_fields_and_size() {
    let records = crawl_records();
    let original_size = 137;
    let header_len = 106;
    let data = records[2].clone();

    let mut raw = Reader::new(&data[..]).unwrap();
    assert_eq!(raw.next().unwrap().unwrap().size(), original_size);

    let mut reader = Reader::new(&data[..]).unwrap();
    let mut record = reader.next_payload().unwrap().unwrap();
    assert_eq!(record.size(), original_size - header_len);
    assert_eq!(record.content().unwrap(), b"<html><body>hello</body></html>");

    let fields = record.fields();
    assert_eq!(
        fields.get(FieldKind::ContentType).unwrap(),
        &["application/http; msgtype=response"]
    );
    assert_eq!(
        fields.get("set-cookie").unwrap(),
        &["session=1", "theme=dark"]
    );
    assert_eq!(fields.get_first(FieldKind::Date), Some("2008-04-30T20:48:25Z"));
}

#[test]
fn minimal_response_example() {
    let data = warc_record(
        "response",
        &[("WARC-Target-URI", "http://example.com/")],
        b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n<html></html>",
    );
    let mut reader = Reader::new(&data[..]).unwrap();

    let mut record = reader.next_payload().unwrap().unwrap();
    assert_eq!(record.size(), 13);
    assert_eq!(record.content().unwrap(), b"<html></html>");
    assert_eq!(record.fields().get("Content-Type").unwrap(), &["text/html"]);
    assert_eq!(record.fields().get_first(FieldKind::TargetURI), Some("http://example.com/"));
}

#[test]
fn segmented_records_collapse() {
    for n in 2..=5 {
        let parts: Vec<String> = (1..=n).map(|i| format!("[part {}]", i)).collect();
        let mut data = Vec::new();
        for (i, part) in parts.iter().enumerate() {
            let number = (i + 1).to_string();
            let fields: Vec<(&str, &str)> = if i == 0 {
                vec![
                    ("WARC-Record-ID", "<urn:uuid:origin>"),
                    ("WARC-Segment-Number", number.as_str()),
                ]
            } else {
                vec![
                    ("WARC-Segment-Origin-ID", "<urn:uuid:origin>"),
                    ("WARC-Segment-Number", number.as_str()),
                ]
            };
            let kind = if i == 0 { "resource" } else { "continuation" };
            data.extend(warc_record(kind, &fields, part.as_bytes()));
        }

        let mut reader = Reader::new(&data[..]).unwrap();
        let mut record = reader.next_payload().unwrap().unwrap();
        assert_eq!(record.content().unwrap(), parts.concat().as_bytes());
        assert!(reader.next_payload().unwrap().is_none(), "{} segments", n);
    }
}

#[test]
fn reset_is_independent_of_prior_input() {
    let inputs = sample_inputs();
    let fresh: Vec<Vec<Outcome>> = inputs
        .iter()
        .map(|(_, data)| outcomes(Reader::new(&data[..]).unwrap(), true))
        .collect();

    let mut reader = Reader::new(&inputs[0].1[..]).unwrap();
    for ((name, data), expected) in inputs.iter().zip(fresh) {
        reader.reset(&data[..]).unwrap();
        let mut got = Vec::new();
        while let Ok(Some(mut record)) = reader.next_payload() {
            if record.read_to_end(&mut Vec::new()).is_err() {
                break;
            }
            got.push(record.url().to_owned());
        }
        let urls: Vec<String> = expected
            .into_iter()
            .filter_map(|o| match o {
                Outcome::Record { url, .. } => Some(url),
                _ => None,
            })
            .collect();
        assert_eq!(got, urls, "{}", name);
    }
}

#[test]
fn unrecognized_input_is_rejected() {
    assert!(matches!(
        Reader::new(&b"\x89PNG\r\n\x1a\n"[..]),
        Err(Error::UnrecognizedFormat)
    ));
    assert!(matches!(
        Reader::new(Trickle::new(b"GIF89a", 1)),
        Err(Error::UnrecognizedFormat)
    ));
}
