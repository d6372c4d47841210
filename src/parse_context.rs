//! Per-run matching state
//!
//! Tracks recursion depth through the dispatch wrapper so that runaway
//! self-referential grammars abort with an error instead of overflowing the
//! stack, and counts dispatches for the run summary.

use crate::error::MatchError;

/// Default maximum nesting of node invocations in one run
///
/// Every node entered counts one level while it is active, so recursion
/// through several nodes spends several levels per step: a right-recursive
/// list `item ("," list)?` uses three per item and fits 170 items under the
/// default. Matching recurses on the native stack; raise the limit with
/// [`MatchOptions::with_max_depth`] only as far as the calling thread's
/// stack allows.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Options for a single run
///
/// See [`DEFAULT_MAX_DEPTH`] for how nesting is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Deepest allowed nesting of node invocations
    pub max_depth: usize,
}

impl MatchOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Context maintained during one run
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// Current nesting of node invocations
    pub depth: usize,

    /// Deepest nesting reached so far
    pub max_seen: usize,

    /// Total node invocations
    pub steps: usize,

    limit: usize,
}

impl ParseContext {
    pub fn new(options: &MatchOptions) -> Self {
        ParseContext {
            depth: 0,
            max_seen: 0,
            steps: 0,
            limit: options.max_depth,
        }
    }

    /// Enter a node invocation at `position`
    ///
    /// Fails when the nesting would exceed the configured limit; the depth is
    /// left unchanged in that case.
    pub fn enter(&mut self, position: usize) -> Result<(), MatchError> {
        if self.depth >= self.limit {
            return Err(MatchError::DepthLimitExceeded {
                limit: self.limit,
                position,
            });
        }
        self.depth += 1;
        self.steps += 1;
        self.max_seen = self.max_seen.max(self.depth);
        Ok(())
    }

    /// Leave the current node invocation
    pub fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

impl Default for ParseContext {
    fn default() -> Self {
        Self::new(&MatchOptions::default())
    }
}
