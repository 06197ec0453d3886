//! Heptagon: nodes and functions over synchronous streams, with automata,
//! switch/present/reset control structures, records, enums and clocks.

use crate::grammar::{Assoc, Grammar, GrammarBuilder, GrammarError, Sym};

const BINARY_OPERATORS: [&str; 24] = [
    "->", "fby", "+.", "-.", "*.", "/.", "+", "-", "*", "/", "<>", "=<.", "=.", "<.", ">.", "=<",
    ">=", "=", "<", ">", "and", "or", "%", "^",
];

const UNARY_OPERATORS: [&str; 5] = ["-.", "-", "pre", "not", "last"];

const BINARY_PRECEDENCE: i32 = 9;
const UNARY_PRECEDENCE: i32 = 10;

pub(super) fn grammar() -> Result<Grammar, GrammarError> {
    let mut g = GrammarBuilder::new("heptagon");
    g.skip(r"\s+");

    let comment = g.pattern("comment", r"\(\*[^*]*\*+([^*)][^*]*\*+)*\)");
    g.extra(comment);
    let identifier = g.pattern("identifier", r"[a-z][a-z0-9_]*'*");
    g.word(identifier);
    let enum_identifier = g.pattern("enum_identifier", r"[A-Z][A-Za-z0-9_]*");
    let state_identifier = g.pattern("state_identifier", r"[A-Za-z][A-Za-z0-9_]*");
    let l_number = g.pattern("l_number", r"\d+\.\d+|\d+");

    let operators: Vec<Sym> = BINARY_OPERATORS.iter().map(|op| g.literal(op)).collect();
    g.precedence(BINARY_PRECEDENCE, Assoc::Left, &operators);

    let t = Tokens::declare(&mut g);
    let r = Rules::declare(&mut g);

    // Definitions
    let definitions = g.repeat(r.definition);
    g.production(r.source_file, &[definitions]);
    g.production(r.definition, &[r.function_def]);
    g.production(r.definition, &[r.type_def]);

    let function_kw = g.rule("_function_kw");
    g.production(function_kw, &[t.fun]);
    g.production(function_kw, &[t.node]);
    let static_param = g.rule("_static_parameter");
    g.production(
        static_param,
        &[t.open_static, identifier, t.colon, r.lit_type, t.close_static],
    );
    let static_param = g.optional(static_param);
    let local_vars = g.optional(r.local_vars);
    g.production(
        r.function_def,
        &[
            function_kw,
            identifier,
            static_param,
            r.parameter_list,
            t.returns,
            r.parameter_list,
            local_vars,
            r.block,
        ],
    );

    g.production(r.parameter_list, &[t.lparen, t.rparen]);
    g.production(r.parameter_list, &[t.lparen, r.param_var_decl_list, t.rparen]);

    // Types
    g.production(r.lit_type, &[r.primitive_type]);
    g.production(r.lit_type, &[r.array_type]);
    g.production(r.lit_type, &[identifier]);
    for primitive in [t.bool, t.int, t.float] {
        g.production(r.primitive_type, &[primitive]);
    }
    let caret = g.literal("^");
    g.production(r.array_type, &[r.lit_type, caret, identifier]);
    g.production(r.array_type, &[r.lit_type, caret, l_number]);

    // Variable declarations
    g.production(r.local_vars, &[t.var, r.local_var_decl_list]);
    let var_decls = g.rule("_var_decls");
    g.production(var_decls, &[r.var_decl]);
    g.production(var_decls, &[var_decls, t.semicolon, r.var_decl]);
    g.production(r.param_var_decl_list, &[var_decls]);
    g.production(r.param_var_decl_list, &[var_decls, t.semicolon]);
    g.production(r.local_var_decl_list, &[var_decls, t.semicolon]);

    g.production(r.var_decl, &[r.var_decl_base]);
    g.production(r.var_decl, &[r.var_decl_last]);

    let ident_list = g.rule("_identifier_list");
    g.production(ident_list, &[identifier]);
    g.production(ident_list, &[ident_list, t.comma, identifier]);
    g.production(r.var_decl_base, &[ident_list, t.colon, r.lit_type]);
    g.production(
        r.var_decl_base,
        &[ident_list, t.colon, r.lit_type, r.var_decl_clock],
    );

    let clock_on = g.rule("_clock_on");
    g.production(
        clock_on,
        &[t.on, state_identifier, t.lparen, identifier, t.rparen],
    );
    let clock_ons = g.repeat1(clock_on);
    g.production(r.var_decl_clock, &[t.double_colon, t.dot, clock_ons]);

    g.production(r.var_decl_last, &[t.last, r.var_decl_base, t.equals, identifier]);
    g.production(r.var_decl_last, &[t.last, r.var_decl_base, t.equals, r.literal]);

    // Statements
    let statements = g.repeat(r.statement);
    let statements1 = g.repeat1(r.statement);
    g.production(r.block, &[t.let_, statements, t.tel]);
    for statement in [
        r.equation_list,
        r.automaton,
        r.switch_statement,
        r.present_statement,
        r.reset_statement,
    ] {
        g.production(r.statement, &[statement]);
    }

    let equations = g.rule("_equations");
    g.production(equations, &[r.equation]);
    g.production(equations, &[equations, t.semicolon, r.equation]);
    g.production(r.equation_list, &[equations]);
    g.production(r.equation_list, &[equations, t.semicolon]);

    let lhs = g.rule("_equation_lhs");
    g.production(lhs, &[identifier]);
    g.production(lhs, &[t.lparen, ident_list, t.rparen]);
    g.production(r.equation, &[lhs, t.equals, r.expression]);

    // Expressions
    g.production(r.expression, &[r.ifthenelse]);
    g.production(r.expression, &[r.sub_expression]);

    g.production(r.sub_expression, &[r.literal]);
    g.production(r.sub_expression, &[identifier]);
    g.production(r.sub_expression, &[t.lparen, r.expression, t.rparen]);
    g.production(r.sub_expression, &[r.unary_operator, r.expression])
        .prec_right(UNARY_PRECEDENCE);
    g.production(
        r.sub_expression,
        &[r.expression, r.binary_operator, r.expression],
    )
    .prec_left(BINARY_PRECEDENCE);
    g.production(r.sub_expression, &[r.record_construction]);
    g.production(r.sub_expression, &[r.function_call]);
    g.production(r.sub_expression, &[r.tuple]);

    let expressions = g.rule("_expression_list");
    g.production(expressions, &[r.expression]);
    g.production(expressions, &[expressions, t.comma, r.expression]);

    g.production(
        r.tuple,
        &[t.lparen, r.expression, t.comma, expressions, t.rparen],
    );
    g.production(r.function_call, &[identifier, t.lparen, t.rparen]);
    g.production(r.function_call, &[identifier, t.lparen, expressions, t.rparen]);

    let field_init = g.rule("_field_init");
    g.production(field_init, &[identifier, t.equals, r.expression]);
    let field_inits = g.rule("_field_inits");
    g.production(field_inits, &[field_init]);
    g.production(field_inits, &[field_inits, t.semicolon, field_init]);
    g.production(r.record_construction, &[t.lbrace, field_inits, t.rbrace]);

    g.production(
        r.ifthenelse,
        &[t.if_, r.expression, t.then, r.expression, t.else_, r.expression],
    );

    // Control structures
    let switch_case = g.rule("_switch_case");
    g.production(switch_case, &[t.bar, enum_identifier, t.do_, statements1]);
    let switch_cases = g.repeat(switch_case);
    g.production(
        r.switch_statement,
        &[t.switch, identifier, switch_cases, t.end],
    );

    let present_case = g.rule("_present_case");
    g.production(present_case, &[t.bar, r.expression, t.do_, r.statement]);
    let present_cases = g.repeat(present_case);
    let present_default = g.rule("_present_default");
    g.production(present_default, &[t.default, t.do_, r.statement]);
    let present_default = g.optional(present_default);
    g.production(
        r.present_statement,
        &[t.present, present_cases, present_default, t.end],
    );

    g.production(r.reset_statement, &[t.reset, statements, t.every, r.expression]);

    let states = g.repeat(r.automaton_state);
    g.production(r.automaton, &[t.automaton, local_vars, states, t.end]);
    let transitions = g.repeat(r.automaton_transition);
    g.production(
        r.automaton_state,
        &[
            t.state,
            state_identifier,
            local_vars,
            t.do_,
            statements,
            transitions,
        ],
    );
    let transition_kw = g.rule("_transition_kw");
    g.production(transition_kw, &[t.unless]);
    g.production(transition_kw, &[t.until]);
    g.production(
        r.automaton_transition,
        &[transition_kw, r.expression, t.then, state_identifier],
    );

    // Type definitions
    let field_decl = g.rule("_field_decl");
    g.production(field_decl, &[identifier, t.colon, r.lit_type]);
    let field_decls = g.rule("_field_decls");
    g.production(field_decls, &[field_decl]);
    g.production(field_decls, &[field_decls, t.semicolon, field_decl]);
    let record_type = g.rule("_record_type_def");
    g.production(record_type, &[t.lbrace, field_decls, t.rbrace]);

    let enum_list = g.rule("_enum_list");
    g.production(enum_list, &[enum_identifier]);
    g.production(enum_list, &[enum_list, t.bar, enum_identifier]);
    let enum_type = g.rule("_enum_type_def");
    g.production(enum_type, &[enum_list]);
    g.production(enum_type, &[t.bar, enum_list]);

    for body in [record_type, enum_type] {
        g.production(r.type_def, &[t.type_, identifier, t.equals, body]);
    }

    // Literals and operators
    g.production(r.literal, &[l_number]);
    g.production(r.literal, &[r.l_bool]);
    g.production(r.literal, &[r.l_array]);
    g.production(r.l_bool, &[t.true_]);
    g.production(r.l_bool, &[t.false_]);
    g.production(r.l_array, &[t.lbracket, t.rbracket]);
    g.production(r.l_array, &[t.lbracket, expressions, t.rbracket]);

    for op in UNARY_OPERATORS {
        let token = g.literal(op);
        g.production(r.unary_operator, &[token]);
    }
    for op in operators {
        g.production(r.binary_operator, &[op]);
    }

    g.start(r.source_file);
    g.build()
}

/// Keywords and punctuation
struct Tokens {
    fun: Sym,
    node: Sym,
    returns: Sym,
    var: Sym,
    let_: Sym,
    tel: Sym,
    bool: Sym,
    int: Sym,
    float: Sym,
    on: Sym,
    last: Sym,
    if_: Sym,
    then: Sym,
    else_: Sym,
    switch: Sym,
    do_: Sym,
    end: Sym,
    present: Sym,
    default: Sym,
    reset: Sym,
    every: Sym,
    automaton: Sym,
    state: Sym,
    unless: Sym,
    until: Sym,
    type_: Sym,
    true_: Sym,
    false_: Sym,
    lparen: Sym,
    rparen: Sym,
    lbrace: Sym,
    rbrace: Sym,
    lbracket: Sym,
    rbracket: Sym,
    open_static: Sym,
    close_static: Sym,
    colon: Sym,
    double_colon: Sym,
    semicolon: Sym,
    comma: Sym,
    dot: Sym,
    equals: Sym,
    bar: Sym,
}

impl Tokens {
    fn declare(g: &mut GrammarBuilder) -> Self {
        Self {
            fun: g.literal("fun"),
            node: g.literal("node"),
            returns: g.literal("returns"),
            var: g.literal("var"),
            let_: g.literal("let"),
            tel: g.literal("tel"),
            bool: g.literal("bool"),
            int: g.literal("int"),
            float: g.literal("float"),
            on: g.literal("on"),
            last: g.literal("last"),
            if_: g.literal("if"),
            then: g.literal("then"),
            else_: g.literal("else"),
            switch: g.literal("switch"),
            do_: g.literal("do"),
            end: g.literal("end"),
            present: g.literal("present"),
            default: g.literal("default"),
            reset: g.literal("reset"),
            every: g.literal("every"),
            automaton: g.literal("automaton"),
            state: g.literal("state"),
            unless: g.literal("unless"),
            until: g.literal("until"),
            type_: g.literal("type"),
            true_: g.literal("true"),
            false_: g.literal("false"),
            lparen: g.literal("("),
            rparen: g.literal(")"),
            lbrace: g.literal("{"),
            rbrace: g.literal("}"),
            lbracket: g.literal("["),
            rbracket: g.literal("]"),
            open_static: g.literal("<<"),
            close_static: g.literal(">>"),
            colon: g.literal(":"),
            double_colon: g.literal("::"),
            semicolon: g.literal(";"),
            comma: g.literal(","),
            dot: g.literal("."),
            equals: g.literal("="),
            bar: g.literal("|"),
        }
    }
}

/// Rules referenced before their productions are written
struct Rules {
    source_file: Sym,
    definition: Sym,
    function_def: Sym,
    type_def: Sym,
    parameter_list: Sym,
    lit_type: Sym,
    primitive_type: Sym,
    array_type: Sym,
    local_vars: Sym,
    param_var_decl_list: Sym,
    local_var_decl_list: Sym,
    var_decl: Sym,
    var_decl_base: Sym,
    var_decl_clock: Sym,
    var_decl_last: Sym,
    block: Sym,
    statement: Sym,
    equation_list: Sym,
    equation: Sym,
    expression: Sym,
    sub_expression: Sym,
    tuple: Sym,
    function_call: Sym,
    record_construction: Sym,
    ifthenelse: Sym,
    switch_statement: Sym,
    present_statement: Sym,
    reset_statement: Sym,
    automaton: Sym,
    automaton_state: Sym,
    automaton_transition: Sym,
    literal: Sym,
    l_bool: Sym,
    l_array: Sym,
    unary_operator: Sym,
    binary_operator: Sym,
}

impl Rules {
    fn declare(g: &mut GrammarBuilder) -> Self {
        Self {
            source_file: g.rule("source_file"),
            definition: g.rule("_definition"),
            function_def: g.rule("_function_def"),
            type_def: g.rule("_type_def"),
            parameter_list: g.rule("parameter_list"),
            lit_type: g.rule("lit_type"),
            primitive_type: g.rule("primitive_type"),
            array_type: g.rule("array_type"),
            local_vars: g.rule("local_vars"),
            param_var_decl_list: g.rule("param_var_decl_list"),
            local_var_decl_list: g.rule("local_var_decl_list"),
            var_decl: g.rule("var_decl"),
            var_decl_base: g.rule("var_decl_base"),
            var_decl_clock: g.rule("var_decl_clock"),
            var_decl_last: g.rule("var_decl_last"),
            block: g.rule("block"),
            statement: g.rule("_statement"),
            equation_list: g.rule("equation_list"),
            equation: g.rule("equation"),
            expression: g.rule("expression"),
            sub_expression: g.rule("sub_expression"),
            tuple: g.rule("tuple"),
            function_call: g.rule("function_call"),
            record_construction: g.rule("record_construction"),
            ifthenelse: g.rule("ifthenelse"),
            switch_statement: g.rule("switch_statement"),
            present_statement: g.rule("present_statement"),
            reset_statement: g.rule("reset_statement"),
            automaton: g.rule("automaton"),
            automaton_state: g.rule("automaton_state"),
            automaton_transition: g.rule("automaton_transition"),
            literal: g.rule("literal"),
            l_bool: g.rule("l_bool"),
            l_array: g.rule("l_array"),
            unary_operator: g.rule("unary_operator"),
            binary_operator: g.rule("binary_operator"),
        }
    }
}
