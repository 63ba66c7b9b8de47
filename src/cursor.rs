//! Read positions over byte input.
//!
//! Decoders never read from a slice or a reader directly. They go through a
//! [`ByteCursor`], which lets them look ahead without consuming, consume, and
//! step back over bytes they read speculatively (UTF-16 surrogate look-ahead).

use std::io::{self, Read};

/// Number of consumed bytes a [`StreamCursor`] always keeps for [`ByteCursor::rewind`].
pub const MAX_REWIND: usize = 4;

const READ_CHUNK: usize = 8 * 1024;

/// A position within a sequence of bytes
pub trait ByteCursor {
    /// Returns up to `n` upcoming bytes without consuming them.
    ///
    /// The slice is shorter than `n` only when the input ends first.
    fn peek(&mut self, n: usize) -> io::Result<&[u8]>;

    /// Consumes `n` bytes that a previous [`peek`](ByteCursor::peek) returned.
    fn advance(&mut self, n: usize);

    /// Steps back over the last `n` consumed bytes so they are read again.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `n` bytes can be stepped back over.
    fn rewind(&mut self, n: usize);

    /// Number of bytes consumed so far.
    fn position(&self) -> usize;

    /// Reads one byte, or `None` at end of input.
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = self.peek(1)?.first().copied();
        if byte.is_some() {
            self.advance(1);
        }
        Ok(byte)
    }
}

impl<C: ByteCursor + ?Sized> ByteCursor for &mut C {
    fn peek(&mut self, n: usize) -> io::Result<&[u8]> {
        (**self).peek(n)
    }

    fn advance(&mut self, n: usize) {
        (**self).advance(n)
    }

    fn rewind(&mut self, n: usize) {
        (**self).rewind(n)
    }

    fn position(&self) -> usize {
        (**self).position()
    }
}

/// Cursor over an in-memory byte slice
#[derive(Debug, Clone)]
pub struct SliceCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SliceCursor<'a> {
    /// Create a cursor at the start of `bytes`
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Bytes not consumed yet
    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    /// `true` once every byte has been consumed
    pub fn is_empty(&self) -> bool {
        self.pos == self.bytes.len()
    }
}

impl ByteCursor for SliceCursor<'_> {
    #[inline]
    fn peek(&mut self, n: usize) -> io::Result<&[u8]> {
        let end = self.bytes.len().min(self.pos.saturating_add(n));
        Ok(&self.bytes[self.pos..end])
    }

    #[inline]
    fn advance(&mut self, n: usize) {
        debug_assert!(self.pos + n <= self.bytes.len(), "advanced past end of input");
        self.pos = self.bytes.len().min(self.pos + n);
    }

    fn rewind(&mut self, n: usize) {
        assert!(n <= self.pos, "cannot rewind {n} bytes at offset {}", self.pos);
        self.pos -= n;
    }

    #[inline]
    fn position(&self) -> usize {
        self.pos
    }
}

/// Cursor over a sequential reader
///
/// Bytes are pulled from the reader in chunks as look-ahead requires. The
/// last [`MAX_REWIND`] consumed bytes stay buffered so a rewind never has to
/// seek the underlying reader.
#[derive(Debug)]
pub struct StreamCursor<R> {
    reader: R,
    buf: Vec<u8>,
    head: usize,
    consumed: usize,
    eof: bool,
}

impl<R: Read> StreamCursor<R> {
    /// Wrap `reader`
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(READ_CHUNK + MAX_REWIND),
            head: 0,
            consumed: 0,
            eof: false,
        }
    }

    /// Give back the reader; buffered look-ahead is dropped
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn fill(&mut self) -> io::Result<()> {
        if self.head > MAX_REWIND {
            self.buf.drain(..self.head - MAX_REWIND);
            self.head = MAX_REWIND;
        }

        let filled = self.buf.len();
        self.buf.resize(filled + READ_CHUNK, 0);
        let result = self.reader.read(&mut self.buf[filled..]);
        match result {
            Ok(0) => {
                self.buf.truncate(filled);
                self.eof = true;
                Ok(())
            }
            Ok(read) => {
                self.buf.truncate(filled + read);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                self.buf.truncate(filled);
                Ok(())
            }
            Err(e) => {
                self.buf.truncate(filled);
                Err(e)
            }
        }
    }
}

impl<R: Read> ByteCursor for StreamCursor<R> {
    fn peek(&mut self, n: usize) -> io::Result<&[u8]> {
        while self.buf.len() - self.head < n && !self.eof {
            self.fill()?;
        }
        let end = self.buf.len().min(self.head + n);
        Ok(&self.buf[self.head..end])
    }

    fn advance(&mut self, n: usize) {
        debug_assert!(self.head + n <= self.buf.len(), "advanced past buffered input");
        let n = n.min(self.buf.len() - self.head);
        self.head += n;
        self.consumed += n;
    }

    fn rewind(&mut self, n: usize) {
        assert!(
            n <= self.head,
            "cannot rewind {n} bytes, only {} are buffered",
            self.head
        );
        self.head -= n;
        self.consumed -= n;
    }

    fn position(&self) -> usize {
        self.consumed
    }
}
