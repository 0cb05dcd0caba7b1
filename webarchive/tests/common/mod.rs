#![allow(dead_code)]

use std::io::{self, Read, Write};

use flate2::write::GzEncoder;

/// A reader that returns at most `step` bytes per call, to exercise every buffering path.
pub struct Trickle<'a> {
    data: &'a [u8],
    step: usize,
}

impl<'a> Trickle<'a> {
    pub fn new(data: &'a [u8], step: usize) -> Self {
        Trickle { data, step }
    }
}

impl<'a> Read for Trickle<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.step.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

pub fn warc_record(kind: &str, fields: &[(&str, &str)], content: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    write!(out, "WARC/1.0\r\nWARC-Type: {}\r\n", kind).unwrap();
    for (name, value) in fields {
        write!(out, "{}: {}\r\n", name, value).unwrap();
    }
    write!(out, "Content-Length: {}\r\n\r\n", content.len()).unwrap();
    out.extend_from_slice(content);
    out.extend_from_slice(b"\r\n\r\n");
    out
}

pub fn gzip_members<I, C>(chunks: I) -> Vec<u8>
where
    I: IntoIterator<Item = C>,
    C: AsRef<[u8]>,
{
    let mut out = Vec::new();
    for chunk in chunks {
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::best());
        encoder.write_all(chunk.as_ref()).unwrap();
        out.extend(encoder.finish().unwrap());
    }
    out
}

/// A small crawl: warcinfo, then request/response/metadata for two pages, one of them segmented.
pub fn crawl_records() -> Vec<Vec<u8>> {
    let page = b"HTTP/1.1 200 OK\r\n\
        Content-Type: text/html; charset=utf-8\r\n\
        Set-Cookie: session=1\r\n\
        Set-Cookie: theme=dark\r\n\
        \r\n\
        <html><body>hello</body></html>";
    let image_head = b"HTTP/1.1 200 OK\r\nContent-Type: image/png\r\n\r\n\x89PNG\r\n";

    vec![
        warc_record(
            "warcinfo",
            &[("Content-Type", "application/warc-fields")],
            b"software: handwritten\r\nformat: WARC File Format 1.0\r\n",
        ),
        warc_record(
            "request",
            &[
                ("WARC-Target-URI", "<http://example.com/>"),
                ("WARC-Record-ID", "<urn:uuid:0001>"),
            ],
            b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n",
        ),
        warc_record(
            "response",
            &[
                ("WARC-Target-URI", "<http://example.com/>"),
                ("WARC-Date", "2008-04-30T20:48:25Z"),
                ("WARC-Record-ID", "<urn:uuid:0002>"),
                ("Content-Type", "application/http; msgtype=response"),
            ],
            page,
        ),
        warc_record(
            "metadata",
            &[("WARC-Target-URI", "<http://example.com/>")],
            b"outlink: http://example.com/logo.png E =EMBED_MISC\r\n",
        ),
        warc_record(
            "response",
            &[
                ("WARC-Target-URI", "<http://example.com/logo.png>"),
                ("WARC-Date", "2008-04-30T20:48:26Z"),
                ("WARC-Record-ID", "<urn:uuid:0003>"),
                ("WARC-Segment-Number", "1"),
            ],
            image_head,
        ),
        warc_record(
            "continuation",
            &[
                ("WARC-Target-URI", "<http://example.com/logo.png>"),
                ("WARC-Segment-Origin-ID", "<urn:uuid:0003>"),
                ("WARC-Segment-Number", "2"),
                ("WARC-Segment-Total-Length", "58"),
            ],
            b"\x00\x00\x00\rIHDR",
        ),
        warc_record(
            "revisit",
            &[("WARC-Target-URI", "<http://example.com/>")],
            b"",
        ),
        warc_record(
            "resource",
            &[
                ("WARC-Target-URI", "<dns:example.com>"),
                ("WARC-Date", "2008-04-30T20:48:27Z"),
            ],
            b"example.com. 3600 IN A 93.184.216.34\n",
        ),
    ]
}
