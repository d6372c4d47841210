//! Capture tree produced by a match
//!
//! A [`Capture`] is a tagged span of the input with its own ordered children.
//! A [`CaptureList`] is the owned list of captures gathered by one matching
//! attempt; merging two lists always moves captures and empties the source.

use crate::cursor::slice_lossy;
use serde::Serialize;
use std::borrow::Cow;

/// A tagged span `[start, end)` of the input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capture {
    pub tag: String,
    pub start: usize,
    pub end: usize,
    pub children: CaptureList,
}

impl Capture {
    /// Create a capture without children
    pub fn leaf(tag: impl Into<String>, start: usize, end: usize) -> Self {
        Capture {
            tag: tag.into(),
            start,
            end,
            children: CaptureList::new(),
        }
    }

    /// Matched text of this capture
    pub fn text<'a>(&self, input: &'a str) -> Cow<'a, str> {
        slice_lossy(input, self.start, self.end)
    }

    /// Check if the capture has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Ordered, owned list of captures (the capture environment)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CaptureList {
    captures: Vec<Capture>,
}

impl CaptureList {
    pub fn new() -> Self {
        CaptureList {
            captures: Vec::new(),
        }
    }

    /// Append a capture with no children
    pub fn push_leaf(&mut self, tag: &str, start: usize, end: usize) {
        self.captures.push(Capture::leaf(tag, start, end));
    }

    /// Append a capture whose children are everything in `children`
    ///
    /// `children` is left empty.
    pub fn push_wrapped(&mut self, tag: &str, start: usize, end: usize, children: &mut CaptureList) {
        self.captures.push(Capture {
            tag: tag.to_string(),
            start,
            end,
            children: std::mem::take(children),
        });
    }

    /// Move every capture of `other`, in order, to the end of this list
    ///
    /// `other` is left empty.
    pub fn splice_from(&mut self, other: &mut CaptureList) {
        if self.captures.is_empty() {
            std::mem::swap(&mut self.captures, &mut other.captures);
        } else {
            self.captures.append(&mut other.captures);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.captures.len()
    }

    pub fn get(&self, index: usize) -> Option<&Capture> {
        self.captures.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Capture> {
        self.captures.iter()
    }

    /// First capture with `tag`, searched depth-first in document order
    pub fn find(&self, tag: &str) -> Option<&Capture> {
        self.captures.iter().find_map(|capture| {
            if capture.tag == tag {
                Some(capture)
            } else {
                capture.children.find(tag)
            }
        })
    }

    /// All captures with `tag`, depth-first in document order
    pub fn find_all<'a>(&'a self, tag: &str) -> Vec<&'a Capture> {
        let mut found = Vec::new();
        self.collect_tagged(tag, &mut found);
        found
    }

    fn collect_tagged<'a>(&'a self, tag: &str, found: &mut Vec<&'a Capture>) {
        for capture in &self.captures {
            if capture.tag == tag {
                found.push(capture);
            }
            capture.children.collect_tagged(tag, found);
        }
    }
}

impl IntoIterator for CaptureList {
    type Item = Capture;
    type IntoIter = std::vec::IntoIter<Capture>;

    fn into_iter(self) -> Self::IntoIter {
        self.captures.into_iter()
    }
}

impl<'a> IntoIterator for &'a CaptureList {
    type Item = &'a Capture;
    type IntoIter = std::slice::Iter<'a, Capture>;

    fn into_iter(self) -> Self::IntoIter {
        self.captures.iter()
    }
}

/// Render captures one per line as `[tag: text(start,end)]`
///
/// Children are indented one space deeper than their parent, and a parent
/// with children closes its bracket on its own line after them.
pub fn render_captures(captures: &CaptureList, input: &str) -> String {
    let mut out = String::new();
    render_into(&mut out, captures, input, 0);
    out
}

fn render_into(out: &mut String, captures: &CaptureList, input: &str, indent: usize) {
    for capture in captures {
        let pad = " ".repeat(indent);
        out.push_str(&format!(
            "{}[{}: {}({},{})",
            pad,
            capture.tag,
            capture.text(input),
            capture.start,
            capture.end
        ));
        if capture.is_leaf() {
            out.push_str("]\n");
        } else {
            out.push('\n');
            render_into(out, &capture.children, input, indent + 1);
            out.push_str(&pad);
            out.push_str("]\n");
        }
    }
}
