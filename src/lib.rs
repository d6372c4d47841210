//! pegcomb - PEG combinator engine
//!
//! Grammars are built by composing small matchers (literals, character
//! classes, sequences, alternations, repetitions) into a node graph. Running
//! the graph over an input yields success or failure plus a tree of tagged
//! captures, and the graph can be printed back as a rule listing.
//!
//! # Quick Start
//!
//! ```rust
//! use pegcomb::{charset::DIGITS, render_captures, GrammarBuilder};
//!
//! let mut g = GrammarBuilder::new();
//! let digit = g.one_of(DIGITS);
//! let number = g.one_or_more(digit).unwrap();
//! g.with_tag(number, "number").unwrap();
//! g.with_name(number, "number").unwrap();
//! let grammar = g.build().unwrap();
//!
//! let outcome = grammar.run(number, "5672").unwrap();
//! assert!(outcome.success);
//! assert_eq!(render_captures(&outcome.captures, "5672"), "[number: 5672(0,4)]\n");
//! assert_eq!(grammar.render(number), "number = [0123456789]+\n");
//! ```
//!
//! # Features
//!
//! - Ordered choice with backtracking, greedy bounded repetition
//! - Capture tree shaped only by tagged nodes
//! - Cycle-safe grammar printer for recursive rules
//! - Recursion depth guard instead of stack overflow
//! - WebAssembly support for the bundled example grammars

pub mod capture;
pub mod charset;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod grammars;
pub mod node;
pub mod parse_context;
pub mod printer;

// WASM bindings (only when compiling for wasm32)
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export main API
pub use capture::{render_captures, Capture, CaptureList};
pub use charset::CharSet;
pub use cursor::Cursor;
pub use engine::{run, run_with, MatchOutcome};
pub use error::{GrammarError, MatchError};
pub use grammar::{Grammar, GrammarBuilder, StandardClasses};
pub use node::{Kind, Node, NodeId, ALWAYS_FAIL, ALWAYS_SUCCEED, END_OF_INPUT};
pub use parse_context::MatchOptions;
pub use printer::render;

// Re-export WASM API for convenience
#[cfg(target_arch = "wasm32")]
pub use wasm::*;
