//! Grammar arena and construction API
//!
//! Nodes are built through a [`GrammarBuilder`] and frozen into an immutable
//! [`Grammar`]. Composite nodes hold [`NodeId`] handles, never references, so
//! mutually recursive rules are declared first and defined afterwards:
//!
//! ```rust
//! use pegcomb::{GrammarBuilder, charset::LETTERS};
//!
//! let mut g = GrammarBuilder::new();
//! let list = g.declare();
//! let item = g.one_of(LETTERS);
//! let comma = g.literal(",");
//! let rest = g.sequence([comma, list]).unwrap();
//! let more = g.optional(rest).unwrap();
//! let body = g.sequence([item, more]).unwrap();
//! g.define(list, body).unwrap();
//! g.with_name(list, "list").unwrap();
//!
//! let grammar = g.build().unwrap();
//! assert!(grammar.run(list, "a,b,c").unwrap().success);
//! ```

use crate::charset::{CharSet, ALPHANUMERIC, DIGITS, HEX_DIGITS, LETTERS, PUNCTUATION, WHITESPACE};
use crate::engine::{self, MatchOutcome};
use crate::error::{GrammarError, MatchError};
use crate::node::{
    Alternation, CharClass, Kind, Literal, Node, NodeId, Optional, Repeat, Sequence, ALWAYS_FAIL,
    ALWAYS_SUCCEED, END_OF_INPUT, SHARED_NODES, SHARED_OWNER,
};
use crate::parse_context::MatchOptions;
use crate::printer;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::debug;

static NEXT_OWNER: AtomicU32 = AtomicU32::new(SHARED_OWNER + 1);

/// Immutable node graph, safe to share between threads
#[derive(Debug, Clone)]
pub struct Grammar {
    owner: u32,
    nodes: Vec<Node>,
}

impl Grammar {
    /// Run `root` against `input` with default options
    pub fn run(&self, root: NodeId, input: &str) -> Result<MatchOutcome, MatchError> {
        engine::run(self, root, input)
    }

    /// Run `root` against `input`
    pub fn run_with(
        &self,
        root: NodeId,
        input: &str,
        options: &MatchOptions,
    ) -> Result<MatchOutcome, MatchError> {
        engine::run_with(self, root, input, options)
    }

    /// Render the rules reachable from `root`
    pub fn render(&self, root: NodeId) -> String {
        printer::render(self, root)
    }

    /// Look up a node
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if self.contains(id) {
            self.nodes.get(id.index)
        } else {
            None
        }
    }

    /// First node carrying display name `name`
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.name.as_deref() == Some(name))
            .map(|index| NodeId::new(self.owner, index))
    }

    /// Whether `id` was issued for this grammar (or is a shared constant)
    pub fn contains(&self, id: NodeId) -> bool {
        owns(self.owner, self.nodes.len(), id)
    }

    /// Number of nodes, shared constants included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index]
    }
}

fn owns(owner: u32, len: usize, id: NodeId) -> bool {
    if id.is_shared() {
        id.index < SHARED_NODES
    } else {
        id.owner == owner && id.index < len
    }
}

/// Handles of the predefined character-class nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardClasses {
    pub alpha: NodeId,
    pub digit: NodeId,
    pub alphanum: NodeId,
    pub hexdigit: NodeId,
    pub punct: NodeId,
    pub ws: NodeId,
}

/// Mutable arena used to assemble a [`Grammar`]
///
/// A clone keeps the owner stamp, so handles stay valid in both copies.
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    owner: u32,
    nodes: Vec<Node>,
    /// Every slot handed out by `declare`
    declared: BTreeSet<NodeId>,
    /// Declared slots still waiting for `define`
    pending: BTreeSet<NodeId>,
}

impl GrammarBuilder {
    /// Create a builder seeded with the shared constant nodes
    pub fn new() -> Self {
        let mut nodes = Vec::with_capacity(16);
        nodes.push(Node::new(Kind::AlwaysSucceed));
        nodes.push(Node::new(Kind::AlwaysFail));
        nodes.push(Node::new(Kind::EndOfInput));
        debug_assert_eq!(nodes.len(), SHARED_NODES);
        GrammarBuilder {
            owner: NEXT_OWNER.fetch_add(1, Ordering::Relaxed),
            nodes,
            declared: BTreeSet::new(),
            pending: BTreeSet::new(),
        }
    }

    fn push(&mut self, kind: Kind) -> NodeId {
        self.nodes.push(Node::new(kind));
        NodeId::new(self.owner, self.nodes.len() - 1)
    }

    fn check(&self, id: NodeId) -> Result<(), GrammarError> {
        if owns(self.owner, self.nodes.len(), id) {
            Ok(())
        } else {
            Err(GrammarError::UnknownNode(id))
        }
    }

    fn check_all(&self, ids: &[NodeId]) -> Result<(), GrammarError> {
        ids.iter().try_for_each(|id| self.check(*id))
    }

    fn check_decorable(&self, id: NodeId) -> Result<(), GrammarError> {
        self.check(id)?;
        if id.is_shared() {
            return Err(GrammarError::SharedNode(id));
        }
        Ok(())
    }

    pub fn always_succeed(&self) -> NodeId {
        ALWAYS_SUCCEED
    }

    pub fn always_fail(&self) -> NodeId {
        ALWAYS_FAIL
    }

    pub fn end_of_input(&self) -> NodeId {
        END_OF_INPUT
    }

    /// Exact string match
    pub fn literal(&mut self, text: impl Into<String>) -> NodeId {
        self.push(Kind::Literal(Literal { text: text.into() }))
    }

    /// Exact single-character match
    pub fn literal_char(&mut self, c: char) -> NodeId {
        self.literal(c.to_string())
    }

    /// One byte that is a member of `set`
    pub fn one_of(&mut self, set: impl Into<CharSet>) -> NodeId {
        self.push(Kind::OneOf(CharClass {
            set: set.into(),
            negated: false,
        }))
    }

    /// One byte that is not a member of `set`
    pub fn none_of(&mut self, set: impl Into<CharSet>) -> NodeId {
        self.push(Kind::NoneOf(CharClass {
            set: set.into(),
            negated: true,
        }))
    }

    /// Ordered conjunction of `children`
    pub fn sequence(&mut self, children: impl IntoIterator<Item = NodeId>) -> Result<NodeId, GrammarError> {
        let children: Vec<NodeId> = children.into_iter().collect();
        if children.is_empty() {
            return Err(GrammarError::EmptyChildren { kind: "sequence" });
        }
        self.check_all(&children)?;
        Ok(self.push(Kind::Sequence(Sequence { children })))
    }

    /// Ordered choice between `children`
    pub fn alternation(&mut self, children: impl IntoIterator<Item = NodeId>) -> Result<NodeId, GrammarError> {
        let children: Vec<NodeId> = children.into_iter().collect();
        if children.is_empty() {
            return Err(GrammarError::EmptyChildren { kind: "alternation" });
        }
        self.check_all(&children)?;
        Ok(self.push(Kind::Alternation(Alternation { children })))
    }

    pub fn optional(&mut self, child: NodeId) -> Result<NodeId, GrammarError> {
        self.check(child)?;
        Ok(self.push(Kind::Optional(Optional { child })))
    }

    /// Greedy repetition of `child` between `min` and `max` times
    ///
    /// `max = None` means no upper limit.
    pub fn repeat(&mut self, child: NodeId, min: usize, max: Option<usize>) -> Result<NodeId, GrammarError> {
        self.check(child)?;
        if let Some(max) = max {
            if min > max {
                return Err(GrammarError::InvalidBounds { min, max });
            }
        }
        Ok(self.push(Kind::Repeat(Repeat { child, min, max })))
    }

    pub fn zero_or_more(&mut self, child: NodeId) -> Result<NodeId, GrammarError> {
        self.repeat(child, 0, None)
    }

    pub fn one_or_more(&mut self, child: NodeId) -> Result<NodeId, GrammarError> {
        self.repeat(child, 1, None)
    }

    /// Capture the span matched by `id` under `tag`
    pub fn with_tag(&mut self, id: NodeId, tag: impl Into<String>) -> Result<NodeId, GrammarError> {
        self.check_decorable(id)?;
        self.nodes[id.index].tag = Some(tag.into());
        Ok(id)
    }

    /// Give `id` a display name; the printer emits named nodes as rules
    pub fn with_name(&mut self, id: NodeId, name: impl Into<String>) -> Result<NodeId, GrammarError> {
        self.check_decorable(id)?;
        self.nodes[id.index].name = Some(name.into());
        Ok(id)
    }

    /// Reserve a handle to be filled in later by [`GrammarBuilder::define`]
    pub fn declare(&mut self) -> NodeId {
        let id = self.push(Kind::AlwaysFail);
        self.declared.insert(id);
        self.pending.insert(id);
        id
    }

    /// Make the declared `slot` behave like `body`
    ///
    /// The slot keeps its own name and tag; where it has none it takes
    /// those of `body`. A name taken from `body` moves to the slot, so the
    /// rule is listed once even when `body` is also referenced directly.
    pub fn define(&mut self, slot: NodeId, body: NodeId) -> Result<NodeId, GrammarError> {
        self.check(slot)?;
        self.check(body)?;
        if !self.declared.contains(&slot) {
            return Err(GrammarError::NotDeclared(slot));
        }
        if !self.pending.contains(&slot) {
            return Err(GrammarError::AlreadyDefined(slot));
        }
        if self.pending.contains(&body) {
            return Err(GrammarError::Undefined(body));
        }

        let kind = self.nodes[body.index].kind.clone();
        let tag = self.nodes[body.index].tag.clone();
        let name = if self.nodes[slot.index].name.is_none() {
            self.nodes[body.index].name.take()
        } else {
            None
        };

        let target = &mut self.nodes[slot.index];
        target.kind = kind;
        if name.is_some() {
            target.name = name;
        }
        if target.tag.is_none() {
            target.tag = tag;
        }
        self.pending.remove(&slot);
        Ok(slot)
    }

    fn named_class(&mut self, set: CharSet, name: &str) -> NodeId {
        let id = self.one_of(set);
        self.nodes[id.index].name = Some(name.to_string());
        id
    }

    /// Register the predefined character classes as nodes
    ///
    /// All but `ws` carry display names, so the printer lists them as rules.
    pub fn standard_classes(&mut self) -> StandardClasses {
        let alpha = self.named_class(LETTERS, "alpha");
        let digit = self.named_class(DIGITS, "digit");
        let alphanum = self.named_class(ALPHANUMERIC, "alphanum");
        let hexdigit = self.named_class(HEX_DIGITS, "hexdigit");
        let punct = self.named_class(PUNCTUATION, "punct");
        let ws = self.one_of(WHITESPACE);
        StandardClasses {
            alpha,
            digit,
            alphanum,
            hexdigit,
            punct,
            ws,
        }
    }

    /// Freeze the arena
    ///
    /// Fails if any declared slot was never defined.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        if let Some(id) = self.pending.iter().next() {
            return Err(GrammarError::Undefined(*id));
        }
        debug!(nodes = self.nodes.len(), "grammar built");
        Ok(Grammar {
            owner: self.owner,
            nodes: self.nodes,
        })
    }
}

impl Default for GrammarBuilder {
    fn default() -> Self {
        Self::new()
    }
}
