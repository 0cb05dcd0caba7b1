//! Summarize the records of WARC and ARC files.
//!
//! [`Dumper`] drives a [`webarchive::Reader`] over one input and writes a line per record to an
//! output stream, optionally followed by the record's fields and a digest of its content.

#[macro_use]
extern crate log;

use std::io::{self, Read, Write};

use chrono::SecondsFormat;
use thiserror::Error;
use webarchive::{FieldKind, Reader, Record};

use crate::digest::{digests_match, Digester, Sha1Digester};

pub mod digest;

/// What to print for each record.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Only visit payload records, with transport headers stripped.
    pub payload: bool,
    /// Print every field of each record.
    pub fields: bool,
    /// Print a digest of each record's content.
    pub digest: bool,
}

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("{0}")]
    Archive(#[from] webarchive::Error),
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

/// Totals over the records visited by a [`Dumper`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub records: u64,
    pub bytes: u64,
    /// Records whose content did not match their declared payload digest.
    pub digest_mismatches: u64,
}

pub struct Dumper<W> {
    out: W,
    options: Options,
    stats: Stats,
}

impl<W: Write> Dumper<W> {
    pub fn new(out: W, options: Options) -> Self {
        Dumper {
            out,
            options,
            stats: Stats::default(),
        }
    }

    /// Totals over every input dumped so far.
    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write every record remaining in `reader`.
    ///
    /// Output for records before a failure is kept; the first error ends the dump.
    pub fn dump<R: Read>(&mut self, reader: &mut Reader<R>) -> Result<(), DumpError> {
        loop {
            let next = if self.options.payload {
                reader.next_payload()
            } else {
                reader.next()
            };
            let mut record = match next? {
                Some(record) => record,
                None => break,
            };

            writeln!(self.out, "{}", summary_line(&record)).map_err(DumpError::Output)?;
            if self.options.fields {
                for (name, values) in record.fields().iter() {
                    for value in values {
                        writeln!(self.out, "    {}: {}", name, value).map_err(DumpError::Output)?;
                    }
                }
            }
            if self.options.digest {
                self.write_digest(&mut record)?;
            }

            self.stats.records += 1;
            self.stats.bytes += record.size();
        }
        Ok(())
    }

    fn write_digest<R: Read>(&mut self, record: &mut Record<R>) -> Result<(), DumpError> {
        let digest = Sha1Digester::digest_reader(record).map_err(webarchive::Error::from)?;
        let digest = Sha1Digester::format_digest(&digest);
        writeln!(self.out, "    digest: {}", digest).map_err(DumpError::Output)?;

        if !self.options.payload {
            return Ok(());
        }
        if let Some(declared) = record.fields().get_first(FieldKind::PayloadDigest) {
            if !digests_match(declared, &digest) {
                warn!(
                    "payload of <{}> has digest {} but declares {}",
                    record.url(),
                    digest,
                    declared
                );
                self.stats.digest_mismatches += 1;
            }
        }
        Ok(())
    }
}

/// One line describing a record: its type, URL, capture date and content size.
///
/// Missing values are written as `-`.
pub fn summary_line<R: Read>(record: &Record<R>) -> String {
    let url = match record.url() {
        "" => "-",
        url => url,
    };
    let date = record
        .date()
        .map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "-".into());

    format!("{}\t{}\t{}\t{}", record.record_type(), url, date, record.size())
}
