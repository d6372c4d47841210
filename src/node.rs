//! Grammar nodes
//!
//! Nodes live in the arena of a [`Grammar`](crate::grammar::Grammar) and refer
//! to each other through [`NodeId`] handles, so recursive rules are plain
//! index cycles. Each of the ten variants implements [`Pattern`]: how it
//! matches and how it prints.

use crate::capture::CaptureList;
use crate::charset::{escape_bytes, render_class, CharSet};
use crate::engine::Matcher;
use crate::error::MatchError;
use crate::printer::Printer;
use std::fmt;

/// Stable handle to a node in a grammar arena
///
/// Handles carry the identity of the builder that issued them, so a handle
/// from one builder is rejected by every other builder and grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) owner: u32,
    pub(crate) index: usize,
}

impl NodeId {
    pub(crate) const fn new(owner: u32, index: usize) -> Self {
        NodeId { owner, index }
    }

    /// Position in the arena
    pub fn index(self) -> usize {
        self.index
    }

    /// True for the three constants every grammar shares
    pub fn is_shared(self) -> bool {
        self.owner == SHARED_OWNER
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Owner stamp of the shared constants; builders are numbered from 1
pub(crate) const SHARED_OWNER: u32 = 0;

/// Shared node that always succeeds without consuming input
pub const ALWAYS_SUCCEED: NodeId = NodeId::new(SHARED_OWNER, 0);
/// Shared node that always fails
pub const ALWAYS_FAIL: NodeId = NodeId::new(SHARED_OWNER, 1);
/// Shared node that succeeds only at end of input
pub const END_OF_INPUT: NodeId = NodeId::new(SHARED_OWNER, 2);

pub(crate) const SHARED_NODES: usize = 3;

/// Matching and printing capability shared by every node variant
pub(crate) trait Pattern {
    /// Variant-specific matching; captures go into `env`
    fn match_at(&self, m: &mut Matcher<'_, '_>, env: &mut CaptureList) -> Result<bool, MatchError>;

    /// Structural rendering of the node body
    fn print(&self, p: &mut Printer<'_>) -> String;
}

/// An arena entry: the variant plus its decorations
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) kind: Kind,
    pub(crate) name: Option<String>,
    pub(crate) tag: Option<String>,
}

impl Node {
    pub(crate) fn new(kind: Kind) -> Self {
        Node {
            kind,
            name: None,
            tag: None,
        }
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Display name used by the grammar printer
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Capture tag applied when the node matches
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    AlwaysSucceed,
    AlwaysFail,
    EndOfInput,
    Literal(Literal),
    Sequence(Sequence),
    Alternation(Alternation),
    Optional(Optional),
    OneOf(CharClass),
    NoneOf(CharClass),
    Repeat(Repeat),
}

impl Kind {
    pub fn label(&self) -> &'static str {
        match self {
            Kind::AlwaysSucceed => "always-succeed",
            Kind::AlwaysFail => "always-fail",
            Kind::EndOfInput => "end-of-input",
            Kind::Literal(_) => "literal",
            Kind::Sequence(_) => "sequence",
            Kind::Alternation(_) => "alternation",
            Kind::Optional(_) => "optional",
            Kind::OneOf(_) => "one-of",
            Kind::NoneOf(_) => "none-of",
            Kind::Repeat(_) => "repeat",
        }
    }

    /// Handles of the direct children
    pub fn children(&self) -> &[NodeId] {
        match self {
            Kind::Sequence(seq) => &seq.children,
            Kind::Alternation(alt) => &alt.children,
            Kind::Optional(opt) => std::slice::from_ref(&opt.child),
            Kind::Repeat(rep) => std::slice::from_ref(&rep.child),
            _ => &[],
        }
    }
}

impl Pattern for Kind {
    fn match_at(&self, m: &mut Matcher<'_, '_>, env: &mut CaptureList) -> Result<bool, MatchError> {
        match self {
            Kind::AlwaysSucceed => Ok(true),
            Kind::AlwaysFail => Ok(false),
            Kind::EndOfInput => Ok(m.cursor.at_end()),
            Kind::Literal(lit) => lit.match_at(m, env),
            Kind::Sequence(seq) => seq.match_at(m, env),
            Kind::Alternation(alt) => alt.match_at(m, env),
            Kind::Optional(opt) => opt.match_at(m, env),
            Kind::OneOf(class) | Kind::NoneOf(class) => class.match_at(m, env),
            Kind::Repeat(rep) => rep.match_at(m, env),
        }
    }

    fn print(&self, p: &mut Printer<'_>) -> String {
        match self {
            Kind::AlwaysSucceed | Kind::AlwaysFail => String::new(),
            Kind::EndOfInput => "$".to_string(),
            Kind::Literal(lit) => lit.print(p),
            Kind::Sequence(seq) => seq.print(p),
            Kind::Alternation(alt) => alt.print(p),
            Kind::Optional(opt) => opt.print(p),
            Kind::OneOf(class) | Kind::NoneOf(class) => class.print(p),
            Kind::Repeat(rep) => rep.print(p),
        }
    }
}

/// Exact byte string
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub(crate) text: String,
}

impl Pattern for Literal {
    fn match_at(&self, m: &mut Matcher<'_, '_>, _env: &mut CaptureList) -> Result<bool, MatchError> {
        if !m.cursor.matches_literal(&self.text) {
            return Ok(false);
        }
        m.cursor.advance(self.text.len());
        Ok(true)
    }

    fn print(&self, _p: &mut Printer<'_>) -> String {
        format!("\"{}\"", escape_bytes(self.text.bytes(), b'"'))
    }
}

/// Ordered conjunction, short-circuits on the first failing child
///
/// The cursor is not restored on failure; enclosing backtracking
/// combinators do that.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub(crate) children: Vec<NodeId>,
}

impl Pattern for Sequence {
    fn match_at(&self, m: &mut Matcher<'_, '_>, env: &mut CaptureList) -> Result<bool, MatchError> {
        for child in &self.children {
            if !m.dispatch(*child, env)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn print(&self, p: &mut Printer<'_>) -> String {
        let parts: Vec<String> = self
            .children
            .iter()
            .filter(|child| **child != ALWAYS_SUCCEED)
            .map(|child| p.reference(*child))
            .collect();
        format!("({})", parts.join(" "))
    }
}

/// Ordered disjunction: first success wins
#[derive(Debug, Clone, PartialEq)]
pub struct Alternation {
    pub(crate) children: Vec<NodeId>,
}

impl Pattern for Alternation {
    fn match_at(&self, m: &mut Matcher<'_, '_>, env: &mut CaptureList) -> Result<bool, MatchError> {
        let start = m.cursor.position();
        for child in &self.children {
            m.cursor.set_position(start);
            if m.dispatch(*child, env)? {
                return Ok(true);
            }
        }
        m.cursor.set_position(start);
        Ok(false)
    }

    fn print(&self, p: &mut Printer<'_>) -> String {
        let parts: Vec<String> = self
            .children
            .iter()
            .filter(|child| **child != ALWAYS_FAIL)
            .map(|child| p.reference(*child))
            .collect();
        format!("({})", parts.join("|"))
    }
}

/// Zero-width acceptance when the child fails; never fails itself
#[derive(Debug, Clone, PartialEq)]
pub struct Optional {
    pub(crate) child: NodeId,
}

impl Pattern for Optional {
    fn match_at(&self, m: &mut Matcher<'_, '_>, env: &mut CaptureList) -> Result<bool, MatchError> {
        let start = m.cursor.position();
        if !m.dispatch(self.child, env)? {
            m.cursor.set_position(start);
        }
        Ok(true)
    }

    fn print(&self, p: &mut Printer<'_>) -> String {
        format!("{}?", p.reference(self.child))
    }
}

/// Single byte tested against a set (`one_of`), or its complement (`none_of`)
#[derive(Debug, Clone, PartialEq)]
pub struct CharClass {
    pub(crate) set: CharSet,
    pub(crate) negated: bool,
}

impl Pattern for CharClass {
    fn match_at(&self, m: &mut Matcher<'_, '_>, _env: &mut CaptureList) -> Result<bool, MatchError> {
        match m.cursor.peek() {
            Some(b) if self.set.contains(b) != self.negated => {
                m.cursor.advance(1);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn print(&self, _p: &mut Printer<'_>) -> String {
        render_class(&self.set, self.negated)
    }
}

/// Greedy bounded repetition
///
/// Stops at the first failing attempt, at end of input, once `max`
/// repetitions matched, or after a repetition that consumed nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Repeat {
    pub(crate) child: NodeId,
    pub(crate) min: usize,
    pub(crate) max: Option<usize>,
}

impl Repeat {
    fn within_bounds(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }
}

impl Pattern for Repeat {
    fn match_at(&self, m: &mut Matcher<'_, '_>, env: &mut CaptureList) -> Result<bool, MatchError> {
        let mut count = 0;
        let mut last = m.cursor.position();
        while self.max.map_or(true, |max| count < max) {
            if !m.dispatch(self.child, env)? {
                m.cursor.set_position(last);
                break;
            }
            count += 1;
            let position = m.cursor.position();
            let advanced = position != last;
            last = position;
            if m.cursor.at_end() || !advanced {
                break;
            }
        }
        Ok(self.within_bounds(count))
    }

    fn print(&self, p: &mut Printer<'_>) -> String {
        let child = p.reference(self.child);
        let suffix = match (self.min, self.max) {
            (0, None) => "*".to_string(),
            (1, None) => "+".to_string(),
            (min, None) => format!("{{{},}}", min),
            (min, Some(max)) if min == max => format!("{{{}}}", min),
            (min, Some(max)) => format!("{{{},{}}}", min, max),
        };
        format!("{}{}", child, suffix)
    }
}
