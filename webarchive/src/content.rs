//! Buffered access to the content block of one record.

use std::cmp;
use std::io::{self, BufRead, Read};

use crate::Error;

/// Sequentially-read content is kept for slicing until the arena holds this many bytes; past that
/// a streamed read releases what it has consumed. Also the most arena capacity kept across records.
pub(crate) const RETAIN_LIMIT: usize = 1 << 20;

/// The content block of the current record, read on demand from the input.
///
/// Bytes pulled from the input are kept in a growable arena so sequential reads and slices are all
/// views over the same data: the arena holds a window of the content, `released` counts the bytes
/// before that window that a long sequential read has dropped, and `pending` counts the bytes
/// still waiting in the input.
#[derive(Debug, Default)]
pub(crate) struct Content {
    buf: Vec<u8>,
    /// Offset in `buf` of the first held content byte; nonzero once a prefix has been stripped.
    start: usize,
    /// Content bytes dropped from the front of the arena by sequential reads.
    released: u64,
    /// Bytes of content not yet pulled from the input.
    pending: u64,
    /// Sequential read position, relative to `start`.
    cursor: usize,
}

impl Content {
    /// Prepare for a new record of `size` bytes, keeping a bounded arena allocation.
    pub fn reset(&mut self, size: u64) {
        self.buf.clear();
        self.buf.shrink_to(RETAIN_LIMIT);
        self.start = 0;
        self.released = 0;
        self.pending = size;
        self.cursor = 0;
    }

    pub fn len(&self) -> u64 {
        self.released + self.held() as u64 + self.pending
    }

    /// Number of content bytes held in the arena.
    fn held(&self) -> usize {
        self.buf.len() - self.start
    }

    /// Ensure at least the first `end` bytes of content have been pulled into the arena.
    pub fn fill_to<R: BufRead>(&mut self, input: &mut R, end: u64) -> Result<(), Error> {
        let have = self.released + self.held() as u64;
        if end <= have || self.pending == 0 {
            return Ok(());
        }

        let want = cmp::min(end - have, self.pending);
        let before = self.buf.len();
        let result = input.by_ref().take(want).read_to_end(&mut self.buf);
        let got = (self.buf.len() - before) as u64;
        self.pending -= got;
        result?;

        if got < want {
            return Err(Error::TruncatedContent {
                missing: self.pending,
            });
        }
        Ok(())
    }

    pub fn fill_all<R: BufRead>(&mut self, input: &mut R) -> Result<(), Error> {
        self.fill_to(input, self.len())
    }

    /// Discard content that has not been pulled from the input yet.
    pub fn skip<R: BufRead>(&mut self, input: &mut R) -> Result<(), Error> {
        if self.pending == 0 {
            return Ok(());
        }

        let want = self.pending;
        let got = io::copy(&mut input.by_ref().take(want), &mut io::sink())?;
        self.pending -= got;
        if got < want {
            return Err(Error::TruncatedContent {
                missing: self.pending,
            });
        }
        Ok(())
    }

    /// Locate `len` bytes at content offset `offset` in the arena, once it has been filled.
    fn window(&self, offset: u64, len: u64) -> Result<(), Error> {
        let size = self.len();
        match offset.checked_add(len) {
            Some(end) if end <= size => {}
            _ => return Err(Error::OutOfRange { offset, len, size }),
        }
        if offset < self.released {
            return Err(Error::ContentReleased {
                offset,
                released: self.released,
            });
        }
        Ok(())
    }

    fn view(&self, offset: u64, len: u64) -> &[u8] {
        let begin = self.start + (offset - self.released) as usize;
        &self.buf[begin..begin + len as usize]
    }

    /// Get `len` bytes starting `offset` bytes from the beginning of the content.
    pub fn slice<R: BufRead>(
        &mut self,
        input: &mut R,
        offset: u64,
        len: u64,
    ) -> Result<&[u8], Error> {
        self.window(offset, len)?;
        self.fill_to(input, offset + len)?;
        Ok(self.view(offset, len))
    }

    /// Get `len` bytes ending `offset` bytes before the end of the content.
    pub fn eof_slice<R: BufRead>(
        &mut self,
        input: &mut R,
        offset: u64,
        len: u64,
    ) -> Result<&[u8], Error> {
        let size = self.len();
        let begin = match offset.checked_add(len) {
            Some(end) if end <= size => size - end,
            _ => return Err(Error::OutOfRange { offset, len, size }),
        };
        self.window(begin, len)?;
        self.fill_all(input)?;
        Ok(self.view(begin, len))
    }

    /// The entire content, pulling whatever remains from the input.
    pub fn all<R: BufRead>(&mut self, input: &mut R) -> Result<&[u8], Error> {
        let size = self.len();
        self.window(0, size)?;
        self.fill_all(input)?;
        Ok(self.view(0, size))
    }

    /// Drop the first `n` held bytes from the content.
    ///
    /// Resets the sequential cursor; only used before any content has been handed out.
    pub fn strip_prefix(&mut self, n: usize) {
        self.start += cmp::min(n, self.held());
        self.cursor = 0;
    }

    /// Extend the content with the next `n` bytes of input and pull them into the arena.
    pub fn absorb<R: BufRead>(&mut self, input: &mut R, n: u64) -> Result<(), Error> {
        self.fill_all(input)?;
        self.pending = n;
        self.fill_all(input)
    }

    /// Sequential access: the held bytes at the cursor, pulling more input if needed.
    ///
    /// Once the arena has reached [`RETAIN_LIMIT`] and every held byte has been read, the held
    /// bytes are released before more input is pulled, so a streamed read stays bounded.
    pub fn fill_buf<R: BufRead>(&mut self, input: &mut R) -> Result<&[u8], Error> {
        if self.cursor == self.held() && self.pending > 0 {
            let available = input.fill_buf()?;
            let n = cmp::min(available.len() as u64, self.pending) as usize;
            if n == 0 {
                return Err(Error::TruncatedContent {
                    missing: self.pending,
                });
            }
            if self.held() >= RETAIN_LIMIT {
                self.released += self.held() as u64;
                self.buf.clear();
                self.start = 0;
                self.cursor = 0;
            }
            self.buf.extend_from_slice(&available[..n]);
            input.consume(n);
            self.pending -= n as u64;
        }

        Ok(&self.buf[self.start + self.cursor..])
    }

    pub fn consume(&mut self, amt: usize) {
        self.cursor = cmp::min(self.cursor + amt, self.held());
    }

    pub fn read<R: BufRead>(&mut self, input: &mut R, out: &mut [u8]) -> Result<usize, Error> {
        let available = self.fill_buf(input)?;
        let n = cmp::min(available.len(), out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}
