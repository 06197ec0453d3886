//! Reparsing after edits: same result as a fresh parse, sharing what the
//! edit did not touch.

use heptagon::{Error, InputEdit, Node, Parser, Tree, parse, reparse};
use rstest::rstest;

use crate::helpers::source_fixtures::{AUTOMATON, COUNTER, long_sum, many_nodes};
use crate::helpers::{
    arithmetic, assert_matches_fresh_parse, assert_no_errors, heptagon_grammar, splice,
};

fn leaves_of_kind(tree: &Tree, kind: &str) -> Vec<Node> {
    tree.root_node()
        .descendants()
        .filter(|n| n.kind() == kind)
        .map(|n| n.node().clone())
        .collect()
}

#[test]
fn test_operator_change_keeps_operands() {
    let mut parser = Parser::new(arithmetic());
    let old = parser.parse("1+2");
    let (source, edit) = splice(&old, 1, 2, "*");
    let new = parser.reparse(&old, &edit, &source).unwrap();

    assert_eq!(new.to_sexp(), "(expr (num 1) * (num 2))");
    assert_matches_fresh_parse(&new);

    let (before, after) = (leaves_of_kind(&old, "num"), leaves_of_kind(&new, "num"));
    assert_eq!(after.len(), 2);
    assert!(Node::ptr_eq(&before[0], &after[0]));
    assert!(Node::ptr_eq(&before[1], &after[1]));
}

#[rstest]
#[case("1+2", 0, 0, "3*")]
#[case("1+2", 3, 3, "-4")]
#[case("1+2", 0, 3, "(5)")]
#[case("(1+2)*3", 1, 4, "7")]
#[case("(1+2)*3", 5, 6, "/")]
#[case("1 + 2", 1, 4, "")]
#[case("1+2", 1, 1, " ")]
#[case("12+34", 1, 4, "")]
fn test_reparse_equals_fresh_parse(
    #[case] source: &str,
    #[case] start: usize,
    #[case] end: usize,
    #[case] text: &str,
) {
    let grammar = arithmetic();
    let old = parse(&grammar, source);
    let (new_source, edit) = splice(&old, start, end, text);
    let new = reparse(&grammar, &old, &edit, &new_source).unwrap();
    assert_eq!(new.source(), new_source.as_slice());
    assert_matches_fresh_parse(&new);
}

#[test]
fn test_small_edit_in_long_input_lexes_little() {
    let mut parser = Parser::new(arithmetic());
    let old = parser.parse(long_sum(200));
    let fresh_tokens = parser.last_stats().tokens_lexed;

    let middle = 200;
    assert_eq!(old.source()[middle], b'1');
    let (source, edit) = splice(&old, middle, middle + 1, "7");
    let new = parser.reparse(&old, &edit, &source).unwrap();

    assert_no_errors(&new);
    assert_matches_fresh_parse(&new);
    let stats = parser.last_stats();
    assert!(stats.nodes_reused > 0);
    assert!(
        stats.tokens_lexed * 10 < fresh_tokens,
        "relexed {} of {} tokens",
        stats.tokens_lexed,
        fresh_tokens
    );

    let (before, after) = (leaves_of_kind(&old, "num"), leaves_of_kind(&new, "num"));
    assert!(Node::ptr_eq(&before[0], &after[0]));
    assert!(Node::ptr_eq(before.last().unwrap(), after.last().unwrap()));
}

/// Relexed tokens after renaming `x` in one equation in the middle of a
/// file of `nodes` nodes with `nodes` equations each.
fn relexed_after_rename(nodes: usize) -> usize {
    let mut parser = Parser::new(heptagon_grammar());
    let source = many_nodes(nodes, nodes);
    let old = parser.parse(&source);
    assert_no_errors(&old);

    let node_start = source.find(&format!("node f{}(", nodes / 2)).unwrap();
    let at = node_start + source[node_start..].find("y = x + 1;").unwrap() + 4;
    let (new_source, edit) = splice(&old, at, at + 1, "z");
    let new = parser.reparse(&old, &edit, &new_source).unwrap();

    assert_no_errors(&new);
    assert_matches_fresh_parse(&new);
    parser.last_stats().tokens_lexed
}

#[test]
fn test_relexing_does_not_grow_with_file_size() {
    let small = relexed_after_rename(10);
    let large = relexed_after_rename(40);
    assert_eq!(small, large);
    assert!(small < 10, "relexed {small} tokens");
}

#[rstest]
#[case::semicolon_at_start("", ";")]
#[case::operator_at_start("", "+")]
#[case::number_at_start("", "1")]
#[case::comment_end_at_start("", "*)")]
#[case::semicolon_after_let("let", ";")]
#[case::operator_after_let("let", "+")]
#[case::comment_after_let("let", " (* c *)")]
fn test_heptagon_insertion_matches_fresh_parse(#[case] after: &str, #[case] text: &str) {
    let source = [COUNTER, AUTOMATON].join("\n");
    let mut parser = Parser::new(heptagon_grammar());
    let old = parser.parse(&source);
    assert_no_errors(&old);

    let at = source.find(after).unwrap() + after.len();
    let (new_source, edit) = splice(&old, at, at, text);
    let new = parser.reparse(&old, &edit, &new_source).unwrap();
    assert_matches_fresh_parse(&new);
    assert!(parser.last_stats().nodes_reused > 0);
}

#[test]
fn test_edit_that_breaks_then_fixes_input() {
    let mut parser = Parser::new(arithmetic());
    let old = parser.parse("1 + 2");

    let (broken_source, edit) = splice(&old, 4, 5, "");
    let broken = parser.reparse(&old, &edit, &broken_source).unwrap();
    assert!(broken.has_error());
    assert_matches_fresh_parse(&broken);

    let (fixed_source, edit) = splice(&broken, 4, 4, "3");
    let fixed = parser.reparse(&broken, &edit, &fixed_source).unwrap();
    assert!(!fixed.has_error());
    assert_eq!(fixed.to_sexp(), "(expr (num 1) + (num 3))");
}

#[test]
fn test_heptagon_rename() {
    let mut parser = Parser::new(heptagon_grammar());
    let old = parser.parse(COUNTER);
    assert_no_errors(&old);

    let at = COUNTER.find("x + 1").unwrap();
    let (source, edit) = splice(&old, at, at + 1, "input");
    let new = parser.reparse(&old, &edit, &source).unwrap();
    assert_no_errors(&new);
    assert_matches_fresh_parse(&new);
    assert!(parser.last_stats().nodes_reused > 0);

    let params_before = leaves_of_kind(&old, "parameter_list");
    let params_after = leaves_of_kind(&new, "parameter_list");
    assert!(Node::ptr_eq(&params_before[0], &params_after[0]));
}

#[test]
fn test_edit_past_the_end_is_rejected() {
    let grammar = arithmetic();
    let old = parse(&grammar, "1+2");
    let edit = InputEdit::new(b"1+2", b"1+2", 2.into(), 10.into(), 3.into());
    assert!(matches!(
        reparse(&grammar, &old, &edit, "1+2"),
        Err(Error::InvalidEdit { .. })
    ));
}

#[test]
fn test_edit_with_wrong_new_length_is_rejected() {
    let grammar = arithmetic();
    let old = parse(&grammar, "1+2");
    let (_, edit) = splice(&old, 0, 1, "10");
    assert!(matches!(
        reparse(&grammar, &old, &edit, "1+2"),
        Err(Error::InvalidEdit { .. })
    ));
}

#[test]
fn test_replace_outside_source_is_rejected() {
    assert!(matches!(
        InputEdit::replace(b"1+2", 2.into(), 9.into(), b"x"),
        Err(Error::InvalidEdit { .. })
    ));
}
