//! Grammar printer
//!
//! Renders a node graph as a flat rule listing. Named nodes are never
//! inlined: a reference prints the name and queues the node to be emitted
//! once as its own `name = body` line. Rules are emitted breadth-first in
//! discovery order, starting with the root, so recursive and mutually
//! recursive grammars print in finite space.
//!
//! Anonymous nodes are inlined structurally. Before printing, a depth-first
//! pass over the inlining edges finds unnamed cycles; every node that closes
//! one is promoted to a rule under its handle, e.g. `#7`, and all references
//! to it print that handle.

use crate::grammar::Grammar;
use crate::node::{NodeId, Pattern};
use std::collections::{HashMap, HashSet, VecDeque};

/// Render every rule reachable from `root`, one per line
pub fn render(grammar: &Grammar, root: NodeId) -> String {
    if !grammar.contains(root) {
        return String::new();
    }

    let mut printer = Printer::new(grammar, unnamed_cycles(grammar, root));
    printer.enqueue(root);

    let mut out = String::new();
    while let Some(id) = printer.queue.pop_front() {
        let name = printer.rule_name(id);
        let body = grammar.node(id).kind.print(&mut printer);
        out.push_str(&format!("{} = {}\n", name, body));
    }
    out
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Active,
    Done,
}

/// Anonymous nodes that must become rules so inlining terminates
///
/// An edge into an anonymous node is an inlining edge. Every cycle of
/// inlining edges contains the target of a DFS back edge, so promoting those
/// targets leaves the remaining inlining acyclic.
fn unnamed_cycles(grammar: &Grammar, root: NodeId) -> HashSet<NodeId> {
    let is_anonymous = |id: NodeId| grammar.node(id).name().is_none();

    let mut reachable = vec![root];
    let mut seen = HashSet::from([root]);
    let mut i = 0;
    while i < reachable.len() {
        for child in grammar.node(reachable[i]).kind.children() {
            if seen.insert(*child) {
                reachable.push(*child);
            }
        }
        i += 1;
    }

    let mut promoted = HashSet::new();
    let mut state: HashMap<NodeId, Visit> = HashMap::new();
    let mut stack: Vec<(NodeId, usize)> = Vec::new();

    for start in reachable {
        if state.contains_key(&start) {
            continue;
        }
        state.insert(start, Visit::Active);
        stack.push((start, 0));

        while let Some(&(id, next)) = stack.last() {
            let children = grammar.node(id).kind.children();
            let Some(&child) = children.get(next) else {
                state.insert(id, Visit::Done);
                stack.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }
            if !is_anonymous(child) {
                continue;
            }
            match state.get(&child) {
                Some(Visit::Active) => {
                    promoted.insert(child);
                }
                Some(Visit::Done) => {}
                None => {
                    state.insert(child, Visit::Active);
                    stack.push((child, 0));
                }
            }
        }
    }
    promoted
}

/// Traversal state for one rendering
pub(crate) struct Printer<'g> {
    grammar: &'g Grammar,
    /// Nodes already queued as rules
    seen: HashSet<NodeId>,
    queue: VecDeque<NodeId>,
    /// Anonymous nodes printed as rules because they close a cycle
    promoted: HashSet<NodeId>,
}

impl<'g> Printer<'g> {
    fn new(grammar: &'g Grammar, promoted: HashSet<NodeId>) -> Self {
        Printer {
            grammar,
            seen: HashSet::new(),
            queue: VecDeque::new(),
            promoted,
        }
    }

    fn enqueue(&mut self, id: NodeId) {
        if self.seen.insert(id) {
            self.queue.push_back(id);
        }
    }

    fn rule_name(&self, id: NodeId) -> String {
        match self.grammar.node(id).name() {
            Some(name) => name.to_string(),
            None => id.to_string(),
        }
    }

    /// Text for a child reference: a rule name, or the inlined body
    pub(crate) fn reference(&mut self, id: NodeId) -> String {
        let grammar = self.grammar;
        let node = grammar.node(id);

        if node.name().is_some() || self.promoted.contains(&id) {
            self.enqueue(id);
            return self.rule_name(id);
        }
        node.kind.print(self)
    }
}
