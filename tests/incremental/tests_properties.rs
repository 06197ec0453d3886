//! Property tests: parsing is total and deterministic, and reparsing after
//! any edit matches a fresh parse.

use heptagon::{InputEdit, parse, reparse};
use proptest::prelude::*;

use crate::helpers::source_fixtures::{AUTOMATON, COMMENTED_COUNTER, CONTROL, COUNTER, TYPES};
use crate::helpers::{arithmetic, heptagon_grammar};

const OPERATORS: [&str; 4] = ["+", "-", "*", "/"];

fn expression() -> impl Strategy<Value = String> {
    "[0-9]{1,3}".prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), prop::sample::select(OPERATORS.to_vec()), inner.clone())
                .prop_map(|(a, op, b)| format!("{a} {op} {b}")),
            inner.prop_map(|e| format!("({e})")),
        ]
    })
}

proptest! {
    #[test]
    fn test_parse_covers_every_byte(source in "[0-9+*/() $-]{0,30}") {
        let tree = parse(&arithmetic(), &source);
        prop_assert_eq!(usize::from(tree.len()), source.len());
        let cst = tree.syntax().unwrap();
        prop_assert_eq!(cst.text().to_string(), source);
    }

    #[test]
    fn test_parse_is_deterministic(source in "[0-9+*/() -]{0,30}") {
        let grammar = arithmetic();
        let a = parse(&grammar, &source);
        let b = parse(&grammar, &source);
        prop_assert!(a.structurally_eq(&b));
        prop_assert_eq!(a.errors(), b.errors());
    }

    #[test]
    fn test_heptagon_never_gives_up(source in "[a-z0-9(*);:=| \n]{0,40}") {
        let tree = parse(&heptagon_grammar(), &source);
        prop_assert_eq!(usize::from(tree.len()), source.len());
        prop_assert_eq!(tree.root_node().kind() == "source_file", !tree.root().is_error());
    }

    #[test]
    fn test_reparse_of_valid_edit_matches_fresh_parse(
        source in expression(),
        pick in any::<prop::sample::Index>(),
        digit in "[0-9]",
        op in prop::sample::select(OPERATORS.to_vec()),
    ) {
        let grammar = arithmetic();
        let old = parse(&grammar, &source);
        prop_assert!(!old.has_error());

        let positions: Vec<usize> = source
            .bytes()
            .enumerate()
            .filter(|(_, b)| b.is_ascii_digit() || b"+-*/".contains(b))
            .map(|(i, _)| i)
            .collect();
        let at = positions[pick.index(positions.len())];
        let text = if source.as_bytes()[at].is_ascii_digit() { digit.as_str() } else { op };

        let (new_source, edit) = InputEdit::replace(
            old.source(),
            (at as u32).into(),
            (at as u32 + 1).into(),
            text.as_bytes(),
        ).unwrap();
        let new = reparse(&grammar, &old, &edit, &new_source).unwrap();
        let fresh = parse(&grammar, &new_source);
        prop_assert!(!new.has_error());
        prop_assert!(new.structurally_eq(&fresh), "{} vs {}", new.to_sexp(), fresh.to_sexp());
    }

    #[test]
    fn test_reparse_of_any_edit_matches_fresh_parse(
        source in "[0-9+*() ]{0,20}",
        start in 0usize..=20,
        len in 0usize..=5,
        text in "[0-9+*() ]{0,5}",
    ) {
        let grammar = arithmetic();
        let old = parse(&grammar, &source);
        let start = start.min(source.len());
        let end = (start + len).min(source.len());
        let (new_source, edit) = InputEdit::replace(
            old.source(),
            (start as u32).into(),
            (end as u32).into(),
            text.as_bytes(),
        ).unwrap();
        let new = reparse(&grammar, &old, &edit, &new_source).unwrap();
        prop_assert_eq!(new.source(), new_source.as_slice());
        prop_assert_eq!(usize::from(new.len()), new_source.len());
        let fresh = parse(&grammar, &new_source);
        prop_assert!(new.structurally_eq(&fresh), "{} vs {}", new.to_sexp(), fresh.to_sexp());
    }

    #[test]
    fn test_heptagon_reparse_of_any_edit_matches_fresh_parse(
        source in prop::sample::select(vec![COUNTER, COMMENTED_COUNTER, TYPES, AUTOMATON, CONTROL]),
        start in any::<prop::sample::Index>(),
        len in 0usize..=6,
        text in "[a-z0-9(*);:=+| \n]{0,6}",
    ) {
        let grammar = heptagon_grammar();
        let old = parse(&grammar, source);
        let start = start.index(source.len() + 1);
        let end = (start + len).min(source.len());
        let (new_source, edit) = InputEdit::replace(
            old.source(),
            (start as u32).into(),
            (end as u32).into(),
            text.as_bytes(),
        ).unwrap();
        let new = reparse(&grammar, &old, &edit, &new_source).unwrap();
        let fresh = parse(&grammar, &new_source);
        prop_assert!(new.structurally_eq(&fresh), "{} vs {}", new.to_sexp(), fresh.to_sexp());
        prop_assert_eq!(new.errors(), fresh.errors());
    }
}
