//! The built-in Heptagon grammar on real programs.

use heptagon::{Point, load_grammar, parse, tree_to_string};
use rstest::rstest;

use crate::helpers::source_fixtures::{AUTOMATON, COMMENTED_COUNTER, CONTROL, COUNTER, TYPES};
use crate::helpers::{assert_no_errors, heptagon_grammar};

#[test]
fn test_counter_node() {
    let tree = parse(&heptagon_grammar(), COUNTER);
    assert_no_errors(&tree);
    assert_eq!(tree.language(), "heptagon");

    let root = tree.root_node();
    assert_eq!(root.kind(), "source_file");
    let named: Vec<_> = root.named_children().iter().map(|n| n.kind()).collect();
    assert_eq!(
        named,
        vec!["identifier", "parameter_list", "parameter_list", "block"]
    );
    assert_eq!(root.named_children()[0].utf8_text(), Some("counter"));
}

#[test]
fn test_equation_structure() {
    let tree = parse(&heptagon_grammar(), COUNTER);
    let equation = tree
        .root_node()
        .descendants()
        .find(|n| n.kind() == "equation")
        .unwrap();
    assert_eq!(equation.utf8_text(), Some("y = x + 1"));
    assert_eq!(equation.start_point(), Point::new(2, 2));

    let sum = equation
        .descendants()
        .find(|n| n.kind() == "sub_expression" && n.child_count() == 3)
        .unwrap();
    let kinds: Vec<_> = sum.named_children().iter().map(|n| n.kind()).collect();
    assert_eq!(kinds, vec!["expression", "binary_operator", "expression"]);
}

#[test]
fn test_comments_are_kept_as_extras() {
    let tree = parse(&heptagon_grammar(), COMMENTED_COUNTER);
    assert_no_errors(&tree);
    let comments: Vec<_> = tree
        .root_node()
        .descendants()
        .filter(|n| n.kind() == "comment")
        .collect();
    assert_eq!(comments.len(), 2);
    assert!(comments.iter().all(|c| c.is_extra() && c.is_named()));
    assert_eq!(comments[1].utf8_text(), Some("(* done *)"));
}

#[rstest]
#[case::types(TYPES, "enum_identifier")]
#[case::automaton(AUTOMATON, "automaton_transition")]
#[case::control(CONTROL, "reset_statement")]
#[case::last(CONTROL, "var_decl_last")]
#[case::ifthenelse(CONTROL, "ifthenelse")]
fn test_programs_parse_cleanly(#[case] source: &str, #[case] expected_kind: &str) {
    let tree = parse(&heptagon_grammar(), source);
    assert_no_errors(&tree);
    assert!(
        tree.root_node().descendants().any(|n| n.kind() == expected_kind),
        "no {expected_kind} in {}",
        tree_to_string(&tree)
    );
}

#[test]
fn test_keywords_are_not_identifiers() {
    let tree = parse(&heptagon_grammar(), COUNTER);
    let identifiers: Vec<_> = tree
        .root_node()
        .descendants()
        .filter(|n| n.kind() == "identifier")
        .filter_map(|n| n.utf8_text())
        .collect();
    assert_eq!(identifiers, vec!["counter", "x", "y", "y", "x"]);
}

#[test]
fn test_missing_expression_is_recovered_locally() {
    let source = "node f() returns (y: int)\nlet\n  y = ;\ntel";
    let tree = parse(&heptagon_grammar(), source);
    assert!(tree.has_error());
    assert_eq!(tree.root_node().kind(), "source_file");
    assert!(tree.root_node().descendants().any(|n| n.kind() == "block"));
    assert_eq!(usize::from(tree.len()), source.len());
}

#[test]
fn test_load_by_name_is_shared() {
    let a = load_grammar("heptagon").unwrap();
    let b = heptagon_grammar();
    assert!(std::sync::Arc::ptr_eq(&a, &b));
    assert!(a.state_count() > 50);
}
