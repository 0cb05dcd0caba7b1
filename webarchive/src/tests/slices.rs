use std::io::Read;

use super::{gzip_members, warc_record};
use crate::{Error, Reader};

const CONTENT: &[u8] = b"The quick brown fox jumps over the lazy dog";

#[test]
fn slice_views_agree() {
    let data = warc_record("resource", &[], CONTENT);
    let mut reader = Reader::new(&data[..]).unwrap();
    let mut record = reader.next().unwrap().unwrap();
    let size = record.size();
    assert_eq!(size, CONTENT.len() as u64);

    assert_eq!(record.slice(4, 5).unwrap(), b"quick");
    assert_eq!(record.eof_slice(0, 3).unwrap(), b"dog");
    assert_eq!(record.eof_slice(13, 4).unwrap(), b"over");

    // Slices did not move the sequential position
    let mut read = Vec::new();
    record.read_to_end(&mut read).unwrap();
    assert_eq!(read, CONTENT);

    // And reading did not invalidate slices
    for len in 0..=size {
        let head = record.slice(0, len).unwrap().to_vec();
        assert_eq!(head, &read[..len as usize]);
        let tail = record.eof_slice(size - len, len).unwrap().to_vec();
        assert_eq!(head, tail);
    }
    assert_eq!(record.eof_slice(0, size).unwrap(), CONTENT);
}

#[test]
fn partial_read_then_slice() {
    let data = gzip_members(vec![warc_record("resource", &[], CONTENT)]);
    let mut reader = Reader::new(&data[..]).unwrap();
    let mut record = reader.next().unwrap().unwrap();

    let mut start = [0u8; 9];
    record.read_exact(&mut start).unwrap();
    assert_eq!(&start, b"The quick");
    assert_eq!(record.slice(10, 5).unwrap(), b"brown");

    let mut rest = String::new();
    record.read_to_string(&mut rest).unwrap();
    assert_eq!(rest, " brown fox jumps over the lazy dog");
}

#[test]
fn out_of_range_does_not_disturb_iteration() {
    let mut data = warc_record("resource", &[], b"abc");
    data.extend(warc_record("resource", &[], b"def"));
    let mut reader = Reader::new(&data[..]).unwrap();

    let mut record = reader.next().unwrap().unwrap();
    match record.slice(1, 3) {
        Err(Error::OutOfRange { offset, len, size }) => {
            assert_eq!((offset, len, size), (1, 3, 3));
        }
        other => panic!("expected out of range, got {:?}", other),
    }
    assert!(matches!(
        record.eof_slice(4, 0),
        Err(Error::OutOfRange { .. })
    ));
    assert_eq!(record.slice(3, 0).unwrap(), b"");

    let mut record = reader.next().unwrap().unwrap();
    assert_eq!(record.content().unwrap(), b"def");
}
