use rstest::rstest;

use super::*;
use crate::errors::Error;
use crate::parser::parse;

fn dangling_else() -> Grammar {
    let mut g = GrammarBuilder::new("dangling_else");
    g.skip(r"\s+");
    let if_kw = g.literal("if");
    let then_kw = g.literal("then");
    let else_kw = g.literal("else");
    let x = g.literal("x");
    let stmt = g.rule("stmt");
    g.production(stmt, &[if_kw, x, then_kw, stmt]);
    g.production(stmt, &[if_kw, x, then_kw, stmt, else_kw, stmt]);
    g.production(stmt, &[x]);
    g.start(stmt);
    g.build().unwrap()
}

fn operators(assoc: Assoc) -> Grammar {
    let mut g = GrammarBuilder::new("operators");
    let n = g.pattern("n", r"[0-9]");
    let op = g.literal("^");
    g.precedence(1, assoc, &[op]);
    let e = g.rule("e");
    g.production(e, &[e, op, e]);
    g.production(e, &[n]);
    g.start(e);
    g.build().unwrap()
}

#[test]
fn test_unresolved_shift_reduce_defaults_to_shift() {
    let grammar = dangling_else();
    let else_kw = grammar.symbol_for_name("else").unwrap();
    let conflicts: Vec<_> = grammar
        .conflicts()
        .iter()
        .filter(|c| c.lookahead == else_kw)
        .collect();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].kind, ConflictKind::ShiftReduce);
    assert!(!conflicts[0].by_precedence);
    assert!(matches!(conflicts[0].chosen, Action::Shift(_)));

    // the else binds to the inner if
    let tree = parse(&Arc::new(grammar), "if x then if x then x else x");
    assert!(!tree.has_error());
    assert_eq!(
        tree.to_sexp(),
        "(stmt if x then (stmt if x then (stmt x) else (stmt x)))"
    );
}

#[test]
fn test_reduce_reduce_keeps_earlier_production() {
    let mut g = GrammarBuilder::new("ambiguous");
    let x = g.literal("x");
    let s = g.rule("s");
    let a = g.rule("a");
    let b = g.rule("b");
    g.production(s, &[a]);
    g.production(s, &[b]);
    g.production(a, &[x]);
    g.production(b, &[x]);
    g.start(s);
    let grammar = g.build().unwrap();

    let conflict = grammar
        .conflicts()
        .iter()
        .find(|c| c.kind == ConflictKind::ReduceReduce)
        .unwrap();
    assert_eq!(conflict.chosen, Action::Reduce(3));
    assert_eq!(grammar.symbol_name(grammar.production(3).unwrap().lhs), "a");

    let tree = parse(&Arc::new(grammar), "x");
    assert_eq!(tree.to_sexp(), "(s (a x))");
}

#[rstest]
#[case(Assoc::Left, 0)]
#[case(Assoc::Right, 2)]
fn test_associativity_decides_nesting(#[case] assoc: Assoc, #[case] nested: usize) {
    let tree = parse(&Arc::new(operators(assoc)), "1^2^3");
    assert!(!tree.has_error());
    let root = tree.root();
    assert_eq!(root.children()[nested].children().len(), 3);
}

#[test]
fn test_non_associative_operator_rejects_chains() {
    let grammar = Arc::new(operators(Assoc::NonAssoc));
    assert!(
        grammar
            .conflicts()
            .iter()
            .any(|c| c.by_precedence && c.chosen == Action::Recover)
    );
    assert!(!parse(&grammar, "1^2").has_error());
    assert!(parse(&grammar, "1^2^3").has_error());
}

#[test]
fn test_missing_start_rule() {
    let mut g = GrammarBuilder::new("nothing");
    let x = g.literal("x");
    let s = g.rule("s");
    g.production(s, &[x]);
    assert_eq!(g.build().unwrap_err(), GrammarError::MissingStart("nothing".into()));
}

#[test]
fn test_rule_without_productions() {
    let mut g = GrammarBuilder::new("hollow");
    let s = g.rule("s");
    let body = g.rule("body");
    g.production(s, &[body]);
    g.start(s);
    assert_eq!(g.build().unwrap_err(), GrammarError::EmptyRule("body".into()));
}

#[test]
fn test_token_and_rule_names_collide() {
    let mut g = GrammarBuilder::new("clash");
    g.pattern("word", r"[a-z]+");
    let s = g.rule("word");
    g.start(s);
    assert_eq!(g.build().unwrap_err(), GrammarError::DuplicateSymbol("word".into()));
}

#[test]
fn test_invalid_regex_is_reported() {
    let mut g = GrammarBuilder::new("broken");
    let open = g.pattern("open", r"(abc");
    let s = g.rule("s");
    g.production(s, &[open]);
    g.start(s);
    assert!(matches!(
        g.build().unwrap_err(),
        GrammarError::InvalidPattern { name, .. } if name == "open"
    ));
}

#[test]
fn test_production_precedence_comes_from_last_operator() {
    let grammar = crate::languages::arithmetic().unwrap();
    let times = grammar.symbol_for_name("*").unwrap();
    let product = grammar
        .productions()
        .iter()
        .find(|p| p.rhs.len() == 3 && p.rhs[1] == times)
        .unwrap();
    assert_eq!(product.precedence, Some(Precedence::new(2, Assoc::Left)));
}

#[test]
fn test_lex_modes_include_extras() {
    let grammar = crate::languages::heptagon().unwrap();
    let comment = grammar.symbol_for_name("comment").unwrap();
    for state in 0..grammar.state_count() as StateId {
        let tokens = grammar.lex_mode_tokens(grammar.lex_mode(state)).unwrap();
        assert!(tokens.contains(comment));
    }
    assert!(grammar.lex_mode_count() < grammar.state_count());
}

#[test]
fn test_registry_lookup() {
    let arithmetic = load_grammar("arithmetic").unwrap();
    assert!(Arc::ptr_eq(&arithmetic, &load_grammar("arithmetic").unwrap()));
    assert!(matches!(
        load_grammar("cobol"),
        Err(Error::GrammarNotFound(name)) if name == "cobol"
    ));

    let mut g = GrammarBuilder::new("registry_probe");
    let x = g.literal("x");
    let s = g.rule("s");
    g.production(s, &[x]);
    g.start(s);
    let handle = register_grammar(g.build().unwrap());
    assert!(Arc::ptr_eq(&handle, &load_grammar("registry_probe").unwrap()));

    let names = registered_grammars();
    for expected in ["arithmetic", "heptagon", "registry_probe"] {
        assert!(names.iter().any(|n| n == expected));
    }
}
