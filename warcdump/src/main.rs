#[macro_use]
extern crate log;

use std::fs::File;
use std::io::{self, BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{command, value_parser, Arg, ArgAction, ArgMatches};
use indicatif::{ProgressBar, ProgressStyle};
use memmap2::Mmap;

use warcdump::{DumpError, Dumper, Options};
use webarchive::{Compression, Reader};

fn flag(matches: &ArgMatches, id: &str) -> bool {
    matches.get_one::<bool>(id).copied().unwrap_or(false)
}

fn map_file(path: &Path) -> io::Result<Mmap> {
    let file = File::open(path)?;
    // Safety: the mapping is only read, and input files are not expected to change while we run.
    unsafe { Mmap::map(&file) }
}

fn main() {
    pretty_env_logger::init();

    let matches = command!()
        .arg(
            Arg::new("payload")
                .long("payload")
                .action(ArgAction::SetTrue)
                .help("Only show payload records, with HTTP headers stripped and segments joined"),
        )
        .arg(
            Arg::new("fields")
                .long("fields")
                .action(ArgAction::SetTrue)
                .help("Print every header field of each record"),
        )
        .arg(
            Arg::new("digest")
                .long("digest")
                .action(ArgAction::SetTrue)
                .help("Print the SHA-1 digest of each record's content"),
        )
        .arg(
            Arg::new("progress")
                .long("progress")
                .action(ArgAction::SetTrue)
                .help("Show progress over the input files"),
        )
        .arg(
            Arg::new("FILE")
                .required(true)
                .multiple_values(true)
                .value_parser(value_parser!(PathBuf))
                .help("WARC or ARC files to read, optionally gzip-compressed"),
        )
        .get_matches();

    let options = Options {
        payload: flag(&matches, "payload"),
        fields: flag(&matches, "fields"),
        digest: flag(&matches, "digest"),
    };
    let files: Vec<&PathBuf> = matches
        .get_many::<PathBuf>("FILE")
        .map(|files| files.collect())
        .unwrap_or_default();

    let progress = if flag(&matches, "progress") {
        let bar = ProgressBar::new(files.len() as u64);
        if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {wide_msg}") {
            bar.set_style(style);
        }
        bar
    } else {
        ProgressBar::hidden()
    };

    let stdout = io::stdout();
    let mut dumper = Dumper::new(BufWriter::new(stdout.lock()), options);
    let mut reader: Option<Reader<Cursor<Mmap>>> = None;
    let mut failed = 0;

    for path in files {
        progress.set_message(path.display().to_string());
        match dump_file(&mut dumper, &mut reader, path) {
            Ok(()) => {}
            Err(DumpError::Output(e)) => {
                progress.abandon();
                eprintln!("warcdump: {}", e);
                process::exit(2);
            }
            Err(e) => {
                failed += 1;
                progress.suspend(|| eprintln!("{}: {}", path.display(), e));
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    let mut out = dumper.into_inner();
    if let Err(e) = out.flush() {
        eprintln!("warcdump: {}", e);
        process::exit(2);
    }

    if failed > 0 {
        process::exit(1);
    }
}

/// Dump one file, reusing `reader` (and its buffers) from the previous file if there was one.
fn dump_file<W: Write>(
    dumper: &mut Dumper<W>,
    reader: &mut Option<Reader<Cursor<Mmap>>>,
    path: &Path,
) -> Result<(), DumpError> {
    let map = map_file(path).map_err(webarchive::Error::Io)?;
    let input = Cursor::new(map);
    let reader = match reader {
        Some(reader) => {
            reader.reset(input)?;
            reader
        }
        None => reader.get_or_insert(Reader::new(input)?),
    };

    if let Some(format) = reader.format() {
        debug!("{}: {}", path.display(), format);
        let expected = Compression::guess_for_filename(path);
        if expected != format.compression {
            info!(
                "{} is named as if {:?} but contains {}",
                path.display(),
                expected,
                format
            );
        }
    }

    let before = dumper.stats();
    let result = dumper.dump(reader);
    reader.close();

    let after = dumper.stats();
    debug!(
        "{}: {} records, {} content bytes",
        path.display(),
        after.records - before.records,
        after.bytes - before.bytes
    );
    result
}
