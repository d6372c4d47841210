//! Matching engine
//!
//! Every node is invoked through [`Matcher::dispatch`], which applies the
//! capture policy uniformly: a tagged node wraps whatever its body captured
//! (or becomes a leaf), an untagged node splices its captures into the
//! caller, and a failed node contributes nothing.

use crate::capture::CaptureList;
use crate::cursor::Cursor;
use crate::error::MatchError;
use crate::grammar::Grammar;
use crate::node::{NodeId, Pattern};
use crate::parse_context::{MatchOptions, ParseContext};
use tracing::{debug, trace, warn};

/// Result of running a grammar over an input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub success: bool,
    pub captures: CaptureList,
    /// Cursor position when the root node returned
    pub position: usize,
}

/// Run `root` of `grammar` against `input` with default options
pub fn run(grammar: &Grammar, root: NodeId, input: &str) -> Result<MatchOutcome, MatchError> {
    run_with(grammar, root, input, &MatchOptions::default())
}

/// Run `root` of `grammar` against `input`
pub fn run_with(
    grammar: &Grammar,
    root: NodeId,
    input: &str,
    options: &MatchOptions,
) -> Result<MatchOutcome, MatchError> {
    if !grammar.contains(root) {
        return Err(MatchError::UnknownRoot(root));
    }

    let mut matcher = Matcher {
        grammar,
        cursor: Cursor::new(input),
        ctx: ParseContext::new(options),
    };
    let mut captures = CaptureList::new();

    let success = match matcher.dispatch(root, &mut captures) {
        Ok(success) => success,
        Err(e) => {
            warn!(root = %root, error = %e, "run aborted");
            return Err(e);
        }
    };

    let position = matcher.cursor.position();
    debug!(
        root = %root,
        success,
        position,
        input_len = input.len(),
        captures = captures.len(),
        steps = matcher.ctx.steps,
        max_depth = matcher.ctx.max_seen,
        "run finished"
    );

    Ok(MatchOutcome {
        success,
        captures,
        position,
    })
}

/// Live state of one run: the grammar, the cursor and the depth guard
pub(crate) struct Matcher<'g, 'i> {
    grammar: &'g Grammar,
    pub(crate) cursor: Cursor<'i>,
    ctx: ParseContext,
}

impl Matcher<'_, '_> {
    /// Invoke node `id`, merging its captures into `env` on success
    pub(crate) fn dispatch(&mut self, id: NodeId, env: &mut CaptureList) -> Result<bool, MatchError> {
        let grammar = self.grammar;
        let node = grammar.node(id);

        let start = self.cursor.position();
        self.ctx.enter(start)?;
        let mut local = CaptureList::new();
        let result = node.kind.match_at(self, &mut local);
        self.ctx.exit();
        let matched = result?;
        let end = self.cursor.position();

        trace!(
            node = %id,
            kind = node.kind.label(),
            start,
            end,
            matched,
            "dispatch"
        );

        if matched {
            match node.tag.as_deref() {
                Some(tag) if local.is_empty() => env.push_leaf(tag, start, end),
                Some(tag) => env.push_wrapped(tag, start, end, &mut local),
                None => env.splice_from(&mut local),
            }
        }
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Capture;
    use crate::charset::{DIGITS, LETTERS};
    use crate::grammar::GrammarBuilder;
    use crate::node::{ALWAYS_FAIL, ALWAYS_SUCCEED, END_OF_INPUT};
    use crate::parse_context::DEFAULT_MAX_DEPTH;
    use rstest::rstest;

    fn spans(captures: &CaptureList) -> Vec<(String, usize, usize)> {
        captures
            .iter()
            .map(|c| (c.tag.clone(), c.start, c.end))
            .collect()
    }

    #[test]
    fn test_tagged_literal() {
        let mut g = GrammarBuilder::new();
        let foo = g.literal("foo");
        g.with_tag(foo, "word").unwrap();
        let grammar = g.build().unwrap();

        let outcome = run(&grammar, foo, "foo").unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.position, 3);
        assert_eq!(outcome.captures.len(), 1);
        let capture = outcome.captures.get(0).unwrap();
        assert_eq!(capture, &Capture::leaf("word", 0, 3));
        assert_eq!(capture.text("foo"), "foo");
    }

    #[test]
    fn test_nested_tagging() {
        let mut g = GrammarBuilder::new();
        let x = g.literal("x");
        g.with_tag(x, "B").unwrap();
        let y = g.literal("y");
        g.with_tag(y, "C").unwrap();
        let a = g.sequence([x, y]).unwrap();
        g.with_tag(a, "A").unwrap();
        let grammar = g.build().unwrap();

        let outcome = run(&grammar, a, "xy").unwrap();
        assert!(outcome.success);
        assert_eq!(spans(&outcome.captures), vec![("A".to_string(), 0, 2)]);
        let root = outcome.captures.get(0).unwrap();
        assert_eq!(
            spans(&root.children),
            vec![("B".to_string(), 0, 1), ("C".to_string(), 1, 2)]
        );
    }

    #[test]
    fn test_untagged_nodes_are_transparent() {
        let mut g = GrammarBuilder::new();
        let x = g.literal("x");
        g.with_tag(x, "B").unwrap();
        let y = g.literal("y");
        g.with_tag(y, "C").unwrap();
        let inner = g.sequence([y]).unwrap();
        let outer = g.sequence([x, inner]).unwrap();
        let grammar = g.build().unwrap();

        let outcome = run(&grammar, outer, "xy").unwrap();
        assert!(outcome.success);
        assert_eq!(
            spans(&outcome.captures),
            vec![("B".to_string(), 0, 1), ("C".to_string(), 1, 2)]
        );
        assert!(outcome.captures.iter().all(|c| c.is_leaf()));
    }

    #[test]
    fn test_failed_tagged_node_leaves_no_capture() {
        let mut g = GrammarBuilder::new();
        let x = g.literal("x");
        g.with_tag(x, "B").unwrap();
        let z = g.literal("z");
        let seq = g.sequence([x, z]).unwrap();
        g.with_tag(seq, "A").unwrap();
        let grammar = g.build().unwrap();

        let outcome = run(&grammar, seq, "xy").unwrap();
        assert!(!outcome.success);
        assert!(outcome.captures.is_empty());
    }

    #[test]
    fn test_alternation_discards_failed_attempt_captures() {
        let mut g = GrammarBuilder::new();
        let a = g.literal("a");
        g.with_tag(a, "first").unwrap();
        let b = g.literal("b");
        let ab = g.sequence([a, b]).unwrap();
        let ac_a = g.literal("a");
        g.with_tag(ac_a, "second").unwrap();
        let c = g.literal("c");
        let ac = g.sequence([ac_a, c]).unwrap();
        let alt = g.alternation([ab, ac]).unwrap();
        let grammar = g.build().unwrap();

        let outcome = run(&grammar, alt, "ac").unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.position, 2);
        assert_eq!(spans(&outcome.captures), vec![("second".to_string(), 0, 1)]);
    }

    #[test]
    fn test_alternation_restores_cursor_on_failure() {
        let mut g = GrammarBuilder::new();
        let ab = g.literal("ab");
        let a = g.literal("a");
        let x = g.literal("x");
        let ax = g.sequence([a, x]).unwrap();
        let alt = g.alternation([ab, ax]).unwrap();
        let grammar = g.build().unwrap();

        let outcome = run(&grammar, alt, "ay").unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.position, 0);
    }

    #[test]
    fn test_first_alternative_wins() {
        let mut g = GrammarBuilder::new();
        let short = g.literal("amqp");
        g.with_tag(short, "short").unwrap();
        let long = g.literal("amqps");
        g.with_tag(long, "long").unwrap();
        let alt = g.alternation([short, long]).unwrap();
        let grammar = g.build().unwrap();

        let outcome = run(&grammar, alt, "amqps").unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.position, 4);
        assert_eq!(spans(&outcome.captures), vec![("short".to_string(), 0, 4)]);
    }

    #[test]
    fn test_optional_never_fails() {
        let mut g = GrammarBuilder::new();
        let x = g.literal("x");
        let y = g.literal("y");
        let xy = g.sequence([x, y]).unwrap();
        g.with_tag(xy, "pair").unwrap();
        let opt = g.optional(xy).unwrap();
        let grammar = g.build().unwrap();

        let outcome = run(&grammar, opt, "xz").unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.position, 0);
        assert!(outcome.captures.is_empty());

        let outcome = run(&grammar, opt, "xy").unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.position, 2);
        assert_eq!(outcome.captures.len(), 1);
    }

    #[rstest]
    #[case(0, None, true)]
    #[case(1, None, false)]
    #[case(0, Some(3), true)]
    fn test_repeat_over_failing_child(
        #[case] min: usize,
        #[case] max: Option<usize>,
        #[case] expected: bool,
    ) {
        let mut g = GrammarBuilder::new();
        let rep = g.repeat(ALWAYS_FAIL, min, max).unwrap();
        let grammar = g.build().unwrap();

        let outcome = run(&grammar, rep, "abc").unwrap();
        assert_eq!(outcome.success, expected);
        assert_eq!(outcome.position, 0);
    }

    #[rstest]
    #[case("12345", true, 5)]
    #[case("123456", true, 5)]
    #[case("12a", true, 2)]
    #[case("a12", false, 0)]
    #[case("", false, 0)]
    fn test_repeat_digits_one_to_five(
        #[case] input: &str,
        #[case] success: bool,
        #[case] position: usize,
    ) {
        let mut g = GrammarBuilder::new();
        let digit = g.one_of(DIGITS);
        let port = g.repeat(digit, 1, Some(5)).unwrap();
        let grammar = g.build().unwrap();

        let outcome = run(&grammar, port, input).unwrap();
        assert_eq!(outcome.success, success);
        assert_eq!(outcome.position, position);
    }

    #[test]
    fn test_repeat_exact_count() {
        let mut g = GrammarBuilder::new();
        let letter = g.one_of(LETTERS);
        let three = g.repeat(letter, 3, Some(3)).unwrap();
        let seq = g.sequence([three, END_OF_INPUT]).unwrap();
        let grammar = g.build().unwrap();

        assert!(run(&grammar, seq, "abc").unwrap().success);
        assert!(!run(&grammar, seq, "ab").unwrap().success);
        assert!(!run(&grammar, seq, "abcd").unwrap().success);
    }

    #[test]
    fn test_repeat_collects_captures_in_order() {
        let mut g = GrammarBuilder::new();
        let digit = g.one_of(DIGITS);
        g.with_tag(digit, "d").unwrap();
        let digits = g.one_or_more(digit).unwrap();
        let grammar = g.build().unwrap();

        let outcome = run(&grammar, digits, "42x").unwrap();
        assert!(outcome.success);
        assert_eq!(
            spans(&outcome.captures),
            vec![("d".to_string(), 0, 1), ("d".to_string(), 1, 2)]
        );
    }

    #[test]
    fn test_repeat_of_zero_width_child_terminates() {
        let mut g = GrammarBuilder::new();
        let x = g.literal("x");
        let maybe_x = g.optional(x).unwrap();
        let many = g.zero_or_more(maybe_x).unwrap();
        let grammar = g.build().unwrap();

        let outcome = run(&grammar, many, "xxy").unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.position, 2);
    }

    #[test]
    fn test_char_class_failure_does_not_consume() {
        let mut g = GrammarBuilder::new();
        let digit = g.one_of(DIGITS);
        let grammar = g.build().unwrap();

        let outcome = run(&grammar, digit, "a").unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.position, 0);
    }

    #[test]
    fn test_none_of() {
        let mut g = GrammarBuilder::new();
        let idchar = g.none_of("/:@ ");
        let grammar = g.build().unwrap();

        assert!(run(&grammar, idchar, "u").unwrap().success);
        assert!(!run(&grammar, idchar, "@").unwrap().success);
        assert!(!run(&grammar, idchar, "").unwrap().success);
    }

    #[test]
    fn test_literal_failure_does_not_consume() {
        let mut g = GrammarBuilder::new();
        let lit = g.literal("abc");
        let grammar = g.build().unwrap();

        let outcome = run(&grammar, lit, "abd").unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.position, 0);
    }

    #[test]
    fn test_shared_constants() {
        let grammar = GrammarBuilder::new().build().unwrap();
        assert!(run(&grammar, ALWAYS_SUCCEED, "x").unwrap().success);
        assert!(!run(&grammar, ALWAYS_FAIL, "").unwrap().success);
        assert!(run(&grammar, END_OF_INPUT, "").unwrap().success);
        assert!(!run(&grammar, END_OF_INPUT, "x").unwrap().success);
    }

    #[test]
    fn test_left_recursion_hits_depth_limit() {
        let mut g = GrammarBuilder::new();
        let expr = g.declare();
        let plus = g.literal("+");
        let body = g.sequence([expr, plus]).unwrap();
        g.define(expr, body).unwrap();
        let grammar = g.build().unwrap();

        let options = MatchOptions::default().with_max_depth(64);
        let err = run_with(&grammar, expr, "1+1", &options).unwrap_err();
        assert_eq!(
            err,
            MatchError::DepthLimitExceeded {
                limit: 64,
                position: 0
            }
        );
    }

    /// list = item ("," list)?
    fn comma_list() -> (Grammar, NodeId) {
        let mut g = GrammarBuilder::new();
        let list = g.declare();
        let item = g.one_of(LETTERS);
        g.with_tag(item, "item").unwrap();
        let comma = g.literal(",");
        let rest = g.sequence([comma, list]).unwrap();
        let more = g.optional(rest).unwrap();
        let body = g.sequence([item, more]).unwrap();
        g.define(list, body).unwrap();
        (g.build().unwrap(), list)
    }

    #[test]
    fn test_right_recursion_within_limit() {
        let (grammar, list) = comma_list();

        let outcome = run(&grammar, list, "a,b,c").unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.position, 5);
        assert_eq!(outcome.captures.find_all("item").len(), 3);
    }

    #[test]
    fn test_default_depth_admits_170_list_items() {
        let (grammar, list) = comma_list();
        let items = |n: usize| vec!["a"; n].join(",");

        let outcome = run(&grammar, list, &items(170)).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.position, 339);

        assert_eq!(
            run(&grammar, list, &items(171)).unwrap_err(),
            MatchError::DepthLimitExceeded {
                limit: DEFAULT_MAX_DEPTH,
                position: 341
            }
        );

        let options = MatchOptions::default().with_max_depth(1024);
        assert!(run_with(&grammar, list, &items(171), &options).unwrap().success);
    }

    #[test]
    fn test_unknown_root() {
        let grammar = GrammarBuilder::new().build().unwrap();
        let err = run(&grammar, NodeId::new(u32::MAX, 99), "").unwrap_err();
        assert_eq!(err, MatchError::UnknownRoot(NodeId::new(u32::MAX, 99)));
    }

    #[test]
    fn test_deterministic() {
        let mut g = GrammarBuilder::new();
        let letter = g.one_of(LETTERS);
        g.with_tag(letter, "l").unwrap();
        let word = g.one_or_more(letter).unwrap();
        g.with_tag(word, "word").unwrap();
        let grammar = g.build().unwrap();

        let first = run(&grammar, word, "hello world").unwrap();
        let second = run(&grammar, word, "hello world").unwrap();
        assert_eq!(first, second);
    }
}
