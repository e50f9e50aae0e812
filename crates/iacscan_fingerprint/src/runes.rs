//! Character-at-a-time UTF-8 decoding over any reader.
//!
//! Invalid sequences decode as U+FFFD and consume a single byte, so a file
//! with stray binary content still yields one character per bad byte.

use std::io::{self, ErrorKind, Read};

const BUFFER_SIZE: usize = 8 * 1024;
const MAX_UTF8_WIDTH: usize = 4;

pub(crate) struct RuneReader<R> {
    inner: R,
    buf: Vec<u8>,
    start: usize,
    end: usize,
    eof: bool,
}

impl<R: Read> RuneReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self {
            inner,
            buf: vec![0; BUFFER_SIZE],
            start: 0,
            end: 0,
            eof: false,
        }
    }

    /// Returns the next character, or `None` at end of input.
    pub(crate) fn next_rune(&mut self) -> io::Result<Option<char>> {
        if self.end - self.start < MAX_UTF8_WIDTH && !self.eof {
            self.fill()?;
        }
        let pending = self.buf.get(self.start..self.end).unwrap_or_default();
        let Some(&lead) = pending.first() else {
            return Ok(None);
        };
        if lead.is_ascii() {
            self.start += 1;
            return Ok(Some(char::from(lead)));
        }
        let width = utf8_width(lead).min(pending.len());
        let decoded = pending
            .get(..width)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .and_then(|text| text.chars().next());
        match decoded {
            Some(ch) if ch.len_utf8() == width => {
                self.start += width;
                Ok(Some(ch))
            }
            _ => {
                self.start += 1;
                Ok(Some(char::REPLACEMENT_CHARACTER))
            }
        }
    }

    fn fill(&mut self) -> io::Result<()> {
        self.buf.copy_within(self.start..self.end, 0);
        self.end -= self.start;
        self.start = 0;
        while self.end < MAX_UTF8_WIDTH {
            let Some(spare) = self.buf.get_mut(self.end..) else {
                break;
            };
            match self.inner.read(spare) {
                Ok(0) => {
                    self.eof = true;
                    break;
                }
                Ok(n) => self.end += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

const fn utf8_width(lead: u8) -> usize {
    match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}
