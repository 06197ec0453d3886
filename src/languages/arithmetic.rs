use crate::grammar::{Assoc, Grammar, GrammarBuilder, GrammarError};

pub(super) fn grammar() -> Result<Grammar, GrammarError> {
    let mut g = GrammarBuilder::new("arithmetic");
    g.skip(r"\s+");

    let num = g.pattern("num", r"\d+");
    let plus = g.literal("+");
    let minus = g.literal("-");
    let times = g.literal("*");
    let divide = g.literal("/");
    let open = g.literal("(");
    let close = g.literal(")");
    g.precedence(1, Assoc::Left, &[plus, minus]);
    g.precedence(2, Assoc::Left, &[times, divide]);

    let expr = g.rule("expr");
    let inner = g.rule("_expr");
    let parenthesized = g.rule("parenthesized_expression");

    g.production(expr, &[inner]);
    for op in [plus, minus, times, divide] {
        g.production(inner, &[inner, op, inner]);
    }
    g.production(inner, &[num]);
    g.production(inner, &[parenthesized]);
    g.production(parenthesized, &[open, inner, close]);

    g.start(expr);
    g.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Action, Symbol};

    #[test]
    fn test_arithmetic_conflicts_are_all_settled_by_precedence() {
        let grammar = grammar().unwrap();
        assert!(!grammar.conflicts().is_empty());
        assert!(grammar.conflicts().iter().all(|c| c.by_precedence));
    }

    #[test]
    fn test_initial_state_shifts_numbers() {
        let grammar = grammar().unwrap();
        let num = grammar.symbol_for_name("num").unwrap();
        assert!(matches!(grammar.action(0, num), Action::Shift(_)));
        assert_eq!(grammar.action(0, Symbol::END), Action::Recover);
    }
}
