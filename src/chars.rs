use std::io;
use std::str;

use crate::error::{new_utf8_error, Result};

/// The size of the byte buffer used by `Utf8Chars`.
const BUF_SIZE: usize = 64 * (1 << 10);

/// The longest UTF-8 encoding of a single codepoint.
const MAX_UTF8_LEN: usize = 4;

/// A source of characters, read one at a time.
///
/// This is the only thing a CSV [`Reader`](struct.Reader.html) needs from
/// its input. Returning `Ok(None)` signals the end of the input. Once a
/// source has returned `Ok(None)`, the reader never calls it again.
///
/// Decoding bytes into characters is the job of the source. This crate
/// provides [`Utf8Chars`](struct.Utf8Chars.html) for UTF-8 encoded
/// `io::Read` implementations, and an implementation for `str::Chars` for
/// in-memory text.
pub trait CharRead {
    /// Read the next character, or `None` at the end of the input.
    fn read_char(&mut self) -> Result<Option<char>>;
}

impl<'a> CharRead for str::Chars<'a> {
    #[inline]
    fn read_char(&mut self) -> Result<Option<char>> {
        Ok(self.next())
    }
}

impl<'a, T: CharRead + ?Sized> CharRead for &'a mut T {
    #[inline]
    fn read_char(&mut self) -> Result<Option<char>> {
        (**self).read_char()
    }
}

impl<T: CharRead + ?Sized> CharRead for Box<T> {
    #[inline]
    fn read_char(&mut self) -> Result<Option<char>> {
        (**self).read_char()
    }
}

/// A character source that decodes UTF-8 from an `io::Read`.
///
/// Bytes are read in large blocks and decoded one character at a time from
/// memory. Sequences split across two reads are handled transparently. A
/// byte order mark is not stripped; it is reported as `U+FEFF` like any
/// other character.
///
/// Invalid UTF-8 results in an [`Error::Utf8`](enum.Error.html) that
/// carries the byte offset of the offending sequence. Reading past an
/// invalid sequence skips it.
#[derive(Debug)]
pub struct Utf8Chars<R> {
    rdr: R,
    buf: Vec<u8>,
    /// The position of the next undecoded byte in `buf`.
    pos: usize,
    /// The number of valid bytes in `buf`.
    len: usize,
    /// Whether `rdr` has reported the end of its input.
    eof: bool,
    /// The number of bytes decoded so far.
    byte: u64,
}

impl<R: io::Read> Utf8Chars<R> {
    /// Create a new UTF-8 character source from the given reader.
    ///
    /// The reader is buffered for you automatically.
    pub fn new(rdr: R) -> Utf8Chars<R> {
        Utf8Chars::with_capacity(BUF_SIZE, rdr)
    }

    /// Create a new UTF-8 character source with a buffer of the given
    /// capacity.
    ///
    /// The capacity is never smaller than the longest UTF-8 sequence.
    pub fn with_capacity(capacity: usize, rdr: R) -> Utf8Chars<R> {
        Utf8Chars {
            rdr,
            buf: vec![0; capacity.max(MAX_UTF8_LEN)],
            pos: 0,
            len: 0,
            eof: false,
            byte: 0,
        }
    }

    /// The number of bytes decoded so far.
    pub fn byte_offset(&self) -> u64 {
        self.byte
    }

    /// Return a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.rdr
    }

    /// Return a mutable reference to the underlying reader.
    ///
    /// Reading from it directly will likely corrupt the decoded stream.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.rdr
    }

    /// Unwrap this source, returning the underlying reader.
    ///
    /// Any bytes buffered but not yet decoded are lost.
    pub fn into_inner(self) -> R {
        self.rdr
    }

    /// Make sure that at least one full UTF-8 sequence is buffered, unless
    /// the underlying reader is exhausted.
    fn fill_buf(&mut self) -> io::Result<()> {
        while !self.eof && self.len - self.pos < MAX_UTF8_LEN {
            if self.pos > 0 {
                self.buf.copy_within(self.pos..self.len, 0);
                self.len -= self.pos;
                self.pos = 0;
            }
            match self.rdr.read(&mut self.buf[self.len..]) {
                Ok(0) => self.eof = true,
                Ok(n) => self.len += n,
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

impl<R: io::Read> CharRead for Utf8Chars<R> {
    fn read_char(&mut self) -> Result<Option<char>> {
        if self.len - self.pos < MAX_UTF8_LEN {
            self.fill_buf()?;
        }
        if self.pos == self.len {
            return Ok(None);
        }
        let (ch, size) = bstr::decode_utf8(&self.buf[self.pos..self.len]);
        let start = self.byte;
        self.pos += size;
        self.byte += size as u64;
        match ch {
            Some(ch) => Ok(Some(ch)),
            None => Err(new_utf8_error(start, size).into()),
        }
    }
}
