use std::slice;

use crate::position::Position;

/// A byte-level scanner over a source buffer with line/column tracking.
#[derive(Debug, Clone)]
pub struct Scanner<'buf> {
    buf: &'buf str,
    iter: slice::Iter<'buf, u8>,
    pos: Position,
    prev_pos: Option<Position>,
}

impl<'buf> Scanner<'buf> {
    pub fn new(buf: &'buf str) -> Self {
        Self {
            buf,
            iter: buf.as_bytes().iter(),
            pos: Position::default(),
            prev_pos: None,
        }
    }

    /// Returns the position of the immediately following byte.
    pub fn pos(&self) -> Position {
        self.pos
    }

    /// Returns the position of the previously returned byte.
    pub fn prev_pos(&self) -> Position {
        self.prev_pos.unwrap_or_default()
    }

    pub fn peek(&self) -> Option<u8> {
        self.iter.clone().next().copied()
    }

    pub fn remaining(&self) -> &'buf str {
        &self.buf[self.pos.byte..]
    }

    pub fn starts_with(&self, value: &str) -> bool {
        self.remaining().starts_with(value)
    }

    pub fn consume_expecting(&mut self, expected: &str) -> Option<&'buf str> {
        self.starts_with(expected)
            .then(|| self.consume_n(expected.len()))
    }

    pub fn consume_n(&mut self, n: usize) -> &'buf str {
        let start = self.pos.byte;

        for _ in 0..n {
            self.next();
        }

        let end = self.pos.byte;

        &self.buf[start..end]
    }

    pub fn consume_while(&mut self, mut predicate: impl FnMut(&u8) -> bool) -> &'buf str {
        self.consume_n(self.iter.clone().take_while(|&c| predicate(c)).count())
    }
}

impl Iterator for Scanner<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.iter.next().copied()?;

        self.prev_pos = Some(self.pos);
        self.pos.byte += 1;

        match c {
            b'\r' if self.peek() == Some(b'\n') => {}

            b'\n' | b'\r' => {
                self.pos.line += 1;
                self.pos.col = 1;
            }

            // only count utf-8 head bytes towards the column
            c if c & 0b1100_0000 != 0b1000_0000 => {
                self.pos.col += 1;
            }

            _ => {}
        }

        Some(c)
    }
}
