use std::{
    collections::VecDeque,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::internal_prelude::*;

/// A character source with a movable read position.
///
/// All offsets are absolute, zero based, character offsets. Any offset previously
/// returned by [`Cursor::tell`] can be passed to [`Cursor::seek`] and the following reads
/// will yield the same characters again (unless it was given up with [`Cursor::release`]).
pub trait Cursor {
    /// Returns the character at the current position without consuming it.
    fn peek(&mut self) -> Result<Option<char>>;

    /// Consumes up to `n` characters. Fewer are only returned at the end of the input.
    fn read(&mut self, n: usize) -> Result<String>;

    fn tell(&self) -> usize;

    fn seek(&mut self, offset: usize) -> Result<()>;

    /// Hint that offsets before the current position will not be revisited.
    fn release(&mut self) {}
}

impl<C: Cursor + ?Sized> Cursor for &mut C {
    fn peek(&mut self) -> Result<Option<char>> {
        (**self).peek()
    }

    fn read(&mut self, n: usize) -> Result<String> {
        (**self).read(n)
    }

    fn tell(&self) -> usize {
        (**self).tell()
    }

    fn seek(&mut self, offset: usize) -> Result<()> {
        (**self).seek(offset)
    }

    fn release(&mut self) {
        (**self).release()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrCursor {
    chars: Vec<char>,
    position: usize,
}

impl StrCursor {
    pub fn new(content: &str) -> Self {
        Self {
            chars: content.chars().collect(),
            position: 0,
        }
    }
}

impl Cursor for StrCursor {
    fn peek(&mut self) -> Result<Option<char>> {
        Ok(self.chars.get(self.position).copied())
    }

    fn read(&mut self, n: usize) -> Result<String> {
        let end = self.chars.len().min(self.position + n);
        let read = self.chars[self.position..end].iter().collect();
        self.position = end;
        Ok(read)
    }

    fn tell(&self) -> usize {
        self.position
    }

    fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.chars.len() {
            return Err(Error::SeekOutOfBounds {
                offset,
                low: 0,
                high: self.chars.len(),
            });
        }
        self.position = offset;
        Ok(())
    }
}

/// A cursor over a byte reader that decodes utf-8 as characters are requested.
///
/// Decoded characters are kept around so the cursor can seek back to them. Call
/// [`Cursor::release`] to forget everything before the current position.
#[derive(Debug)]
pub struct ReadCursor<R> {
    reader: R,
    // decoded characters, `buffer[0]` is at offset `base`
    buffer: VecDeque<char>,
    base: usize,
    position: usize,
}

impl ReadCursor<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Opening source : {}", path.display());
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> ReadCursor<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Default::default(),
            base: 0,
            position: 0,
        }
    }

    fn decoded_end(&self) -> usize {
        self.base + self.buffer.len()
    }

    /// Decodes characters until `offset` is buffered. Returns false if the input ends first.
    fn fill(&mut self, offset: usize) -> Result<bool> {
        while self.decoded_end() <= offset {
            match self.decode_char()? {
                Some(c) => self.buffer.push_back(c),
                None => return Ok(false),
            }
        }
        Ok(true)
    }

    fn decode_char(&mut self) -> Result<Option<char>> {
        let invalid = Error::InvalidUtf8 {
            offset: self.decoded_end(),
        };

        let first = match self.reader.fill_buf()?.first() {
            Some(&b) => b,
            None => return Ok(None),
        };
        self.reader.consume(1);

        let width = match utf8_width(first) {
            Some(width) => width,
            None => return Err(invalid),
        };

        let mut bytes = [first, 0, 0, 0];
        if let Err(e) = self.reader.read_exact(&mut bytes[1..width]) {
            return match e.kind() {
                std::io::ErrorKind::UnexpectedEof => Err(invalid),
                _ => Err(e.into()),
            };
        }

        match std::str::from_utf8(&bytes[..width]) {
            Ok(s) => Ok(s.chars().next()),
            Err(_) => Err(invalid),
        }
    }
}

impl<R: BufRead> Cursor for ReadCursor<R> {
    fn peek(&mut self) -> Result<Option<char>> {
        if !self.fill(self.position)? {
            return Ok(None);
        }
        Ok(self.buffer.get(self.position - self.base).copied())
    }

    fn read(&mut self, n: usize) -> Result<String> {
        let mut read = String::with_capacity(n);
        for _ in 0..n {
            match self.peek()? {
                Some(c) => {
                    read.push(c);
                    self.position += 1;
                }
                None => break,
            }
        }
        Ok(read)
    }

    fn tell(&self) -> usize {
        self.position
    }

    fn seek(&mut self, offset: usize) -> Result<()> {
        if offset < self.base || offset > self.decoded_end() {
            return Err(Error::SeekOutOfBounds {
                offset,
                low: self.base,
                high: self.decoded_end(),
            });
        }
        self.position = offset;
        Ok(())
    }

    fn release(&mut self) {
        let released = self.position - self.base;
        self.buffer.drain(..released);
        self.base = self.position;
        log::trace!("Released {} characters, base is now {}", released, self.base);
    }
}

fn utf8_width(first: u8) -> Option<usize> {
    match first {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}
