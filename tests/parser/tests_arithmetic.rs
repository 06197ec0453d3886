//! Parsing well-formed arithmetic through the public API.

use heptagon::{ParseOptions, Parser, parse, tree_to_string};
use rstest::rstest;

use crate::helpers::{arithmetic, assert_no_errors};

#[rstest]
#[case("1+2", "(expr (num 1) + (num 2))")]
#[case("42", "(expr (num 42))")]
#[case("(7)", "(expr (parenthesized_expression ( (num 7) )))")]
#[case(" 1 * ( 2 - 3 ) ", "(expr (num 1) * (parenthesized_expression ( (num 2) - (num 3) )))")]
fn test_sexp(#[case] source: &str, #[case] expected: &str) {
    let tree = parse(&arithmetic(), source);
    assert_no_errors(&tree);
    assert_eq!(tree.to_sexp(), expected);
    assert_eq!(usize::from(tree.len()), source.len());
}

#[test]
fn test_ranges_of_visible_nodes() {
    let tree = parse(&arithmetic(), "1+2");
    assert_eq!(
        tree_to_string(&tree),
        r#"(expr [0..3] (num [0..1]) ("+" [1..2]) (num [2..3]))"#
    );
}

#[test]
fn test_multiplication_binds_tighter() {
    let tree = parse(&arithmetic(), "1+2*3");
    let top = &tree.root().children()[0];
    let [left, op, right] = top.children() else {
        panic!("expected a binary node, got {:?}", top);
    };
    assert!(left.is_leaf() || left.children().len() == 1);
    assert_eq!(tree.grammar().symbol_name(op.symbol()), "+");
    assert_eq!(right.children().len(), 3);
}

#[test]
fn test_parser_records_stats() {
    let mut parser = Parser::new(arithmetic());
    let tree = parser.parse("1 + 2 + 3");
    assert_no_errors(&tree);
    let stats = parser.last_stats();
    // five tokens and END
    assert_eq!(stats.tokens_lexed, 6);
    assert_eq!(stats.nodes_reused, 0);
    assert_eq!(stats.recoveries, 0);
    assert!(stats.operations >= stats.tokens_lexed as u64);
}

#[test]
fn test_options_are_kept_between_parses() {
    let options = ParseOptions::new().with_max_recovery_pops(1);
    let mut parser = Parser::new(arithmetic()).with_options(options.clone());
    assert_eq!(parser.options().max_recovery_pops, 1);
    parser.parse("1");
    parser.parse("2");
    assert_eq!(*parser.options(), options);
}

#[test]
fn test_same_input_gives_same_tree() {
    let grammar = arithmetic();
    let a = parse(&grammar, "(1 + 2) * 3 / 4");
    let b = parse(&grammar, "(1 + 2) * 3 / 4");
    assert!(a.structurally_eq(&b));
    assert_eq!(a.to_sexp(), b.to_sexp());
}
