//! Byte-level character sets
//!
//! A [`CharSet`] is a 256-bit membership bitmap over input bytes. No Unicode
//! classification happens here: a multi-byte character is seen as its bytes.

use std::fmt;
use std::ops::BitOr;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CharSet {
    bits: [u64; 4],
}

/// ASCII letters `a-z` and `A-Z`
pub const LETTERS: CharSet = CharSet::from_range(b'a', b'z').union(CharSet::from_range(b'A', b'Z'));

/// ASCII digits `0-9`
pub const DIGITS: CharSet = CharSet::from_range(b'0', b'9');

/// Letters and digits
pub const ALPHANUMERIC: CharSet = LETTERS.union(DIGITS);

/// Common punctuation
pub const PUNCTUATION: CharSet = CharSet::from_bytes(b".,!?:;'\"@&-/");

/// Space, tab and newline
pub const WHITESPACE: CharSet = CharSet::from_bytes(b" \t\n");

/// Digits and `a-f`, `A-F`
pub const HEX_DIGITS: CharSet = DIGITS
    .union(CharSet::from_range(b'a', b'f'))
    .union(CharSet::from_range(b'A', b'F'));

impl CharSet {
    /// Create an empty set
    pub const fn new() -> Self {
        CharSet { bits: [0; 4] }
    }

    /// Create a set containing every byte of `bytes`
    pub const fn from_bytes(bytes: &[u8]) -> Self {
        let mut set = CharSet::new();
        let mut i = 0;
        while i < bytes.len() {
            set = set.with(bytes[i]);
            i += 1;
        }
        set
    }

    /// Create a set containing the inclusive byte range `start..=end`
    pub const fn from_range(start: u8, end: u8) -> Self {
        let mut set = CharSet::new();
        if start > end {
            return set;
        }
        let mut b = start;
        loop {
            set = set.with(b);
            if b == end {
                break;
            }
            b += 1;
        }
        set
    }

    /// Copy of this set with `byte` added
    pub const fn with(mut self, byte: u8) -> Self {
        self.bits[(byte >> 6) as usize] |= 1u64 << (byte & 63);
        self
    }

    /// Union of two sets
    pub const fn union(self, other: CharSet) -> CharSet {
        CharSet {
            bits: [
                self.bits[0] | other.bits[0],
                self.bits[1] | other.bits[1],
                self.bits[2] | other.bits[2],
                self.bits[3] | other.bits[3],
            ],
        }
    }

    /// Check if the set contains a byte
    pub const fn contains(&self, byte: u8) -> bool {
        self.bits[(byte >> 6) as usize] & (1u64 << (byte & 63)) != 0
    }

    pub fn len(&self) -> usize {
        self.bits.iter().map(|word| word.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|word| *word == 0)
    }

    /// Members in ascending byte order
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(move |b| self.contains(*b))
    }
}

impl From<&str> for CharSet {
    fn from(chars: &str) -> Self {
        CharSet::from_bytes(chars.as_bytes())
    }
}

impl BitOr for CharSet {
    type Output = CharSet;

    fn bitor(self, rhs: CharSet) -> CharSet {
        self.union(rhs)
    }
}

impl fmt::Debug for CharSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CharSet[{}]", escape_bytes(self.iter(), b']'))
    }
}

/// Printable form of a byte sequence
///
/// Backslash and `delimiter` are backslash-escaped, control bytes use the
/// C escapes (`\t`, `\n`, ...) or `\xNN`, and bytes from 0x7f up are `\xNN`.
pub(crate) fn escape_bytes(bytes: impl IntoIterator<Item = u8>, delimiter: u8) -> String {
    let mut out = String::new();
    for b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            0x07 => out.push_str("\\a"),
            0x08 => out.push_str("\\b"),
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            0x0b => out.push_str("\\v"),
            0x0c => out.push_str("\\f"),
            b'\r' => out.push_str("\\r"),
            b if b < 0x20 || b >= 0x7f => out.push_str(&format!("\\x{:02x}", b)),
            b if b == delimiter => {
                out.push('\\');
                out.push(b as char);
            }
            b => out.push(b as char),
        }
    }
    out
}

/// Bracketed form of a set, `[...]` or `[^...]` when negated
pub(crate) fn render_class(set: &CharSet, negated: bool) -> String {
    let body = escape_bytes(set.iter(), b']');
    let mut out = String::from(if negated { "[^" } else { "[" });
    if !negated && body.starts_with('^') {
        out.push('\\');
    }
    out.push_str(&body);
    out.push(']');
    out
}
