//! Input cursor with position tracking and backtracking support
//!
//! Wraps the immutable input as a byte slice and keeps a mutable read
//! position. Combinators save the position before an attempt and restore
//! it afterwards when the attempt fails.

use std::borrow::Cow;
use std::fmt;

/// Read position into an immutable input buffer
#[derive(Clone)]
pub struct Cursor<'input> {
    input: &'input str,
    position: usize,
}

impl<'input> Cursor<'input> {
    /// Create a cursor positioned at the start of `input`
    pub fn new(input: &'input str) -> Self {
        Cursor { input, position: 0 }
    }

    /// Byte at the current position, `None` at end of input
    pub fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.position).copied()
    }

    /// Move forward by `n` bytes, never past the end of input
    pub fn advance(&mut self, n: usize) {
        self.position = (self.position + n).min(self.input.len());
    }

    /// Check if at end of input
    pub fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Compare `literal` against the bytes at the current position without consuming
    pub fn matches_literal(&self, literal: &str) -> bool {
        self.input.as_bytes()[self.position..].starts_with(literal.as_bytes())
    }

    /// Text between two byte offsets
    ///
    /// Offsets are clamped to the input. Spans that cut through a multi-byte
    /// character are decoded lossily.
    pub fn substring(&self, start: usize, end: usize) -> Cow<'input, str> {
        slice_lossy(self.input, start, end)
    }

    /// Current position (byte offset)
    pub fn position(&self) -> usize {
        self.position
    }

    /// Restore a position previously obtained from [`Cursor::position`]
    pub fn set_position(&mut self, position: usize) {
        debug_assert!(position <= self.input.len(), "position outside input");
        self.position = position.min(self.input.len());
    }

    /// Total length in bytes
    pub fn len(&self) -> usize {
        self.input.len()
    }

    /// Check if input is empty
    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// Remaining input (for debugging)
    pub fn remaining(&self) -> Cow<'input, str> {
        self.substring(self.position, self.input.len())
    }
}

/// Slice `input[start..end]`, falling back to lossy decoding off char boundaries
pub(crate) fn slice_lossy(input: &str, start: usize, end: usize) -> Cow<'_, str> {
    let end = end.min(input.len());
    let start = start.min(end);
    match input.get(start..end) {
        Some(text) => Cow::Borrowed(text),
        None => String::from_utf8_lossy(&input.as_bytes()[start..end]),
    }
}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cursor(pos={}, remaining={:?})",
            self.position,
            self.remaining().chars().take(20).collect::<String>()
        )
    }
}
