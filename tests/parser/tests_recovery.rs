//! Malformed input always yields a tree covering the whole source.

use heptagon::{ErrorCode, ParseOptions, Parser, parse};
use rstest::rstest;

use crate::helpers::arithmetic;

#[test]
fn test_trailing_operator() {
    let tree = parse(&arithmetic(), "1+");
    assert_eq!(tree.to_sexp(), "(expr (num 1) (ERROR +))");
    let errors = tree.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(u32::from(errors[0].range.start()), 1);
    assert_eq!(u32::from(errors[0].range.end()), 2);
    assert_eq!(errors[0].code, ErrorCode::E0202);
}

#[test]
fn test_missing_operand_in_the_middle() {
    let tree = parse(&arithmetic(), "1 + * 2");
    assert!(tree.has_error());
    assert_eq!(tree.root_node().kind(), "expr");
    let nums: Vec<_> = tree
        .root_node()
        .descendants()
        .filter(|n| n.kind() == "num")
        .filter_map(|n| n.utf8_text())
        .collect();
    assert_eq!(nums, vec!["1", "2"]);
}

#[test]
fn test_unbalanced_parentheses() {
    let tree = parse(&arithmetic(), "(1 + 2");
    assert!(tree.has_error());
    assert_eq!(u32::from(tree.len()), 6);
    assert!(tree.errors().iter().all(|e| !e.message.is_empty()));
}

#[test]
fn test_unknown_characters_become_error_leaves() {
    let tree = parse(&arithmetic(), "1 + @@ 2");
    let errors = tree.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::E0101);
}

#[test]
fn test_empty_input() {
    let tree = parse(&arithmetic(), "");
    assert!(tree.is_empty());
    assert!(tree.has_error());
    assert_eq!(tree.errors()[0].code, ErrorCode::E0202);
}

#[rstest]
#[case(1)]
#[case(8)]
#[case(20)]
fn test_operation_budget(#[case] budget: u64) {
    let source = "(1 + 2) * (3 + 4) * (5 + 6) * (7 + 8)";
    let mut parser =
        Parser::new(arithmetic()).with_options(ParseOptions::new().with_max_operations(budget));
    let tree = parser.parse(source);
    assert!(tree.is_partial());
    assert_eq!(usize::from(tree.len()), source.len());
    assert_eq!(tree.errors()[0].code, ErrorCode::E0301);
}

#[test]
fn test_budget_large_enough_completes() {
    let mut parser =
        Parser::new(arithmetic()).with_options(ParseOptions::new().with_max_operations(10_000));
    let tree = parser.parse("(1 + 2) * 3");
    assert!(!tree.is_partial());
    assert!(!tree.has_error());
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(3)]
#[case(16)]
fn test_recovery_pop_limit_never_loses_text(#[case] pops: usize) {
    let source = "((1 + ) * 2 + ( 3 4";
    let mut parser =
        Parser::new(arithmetic()).with_options(ParseOptions::new().with_max_recovery_pops(pops));
    let tree = parser.parse(source);
    assert!(tree.has_error());
    assert_eq!(usize::from(tree.len()), source.len());
    assert!(tree.syntax().is_some_and(|cst| cst.text() == source));
}
