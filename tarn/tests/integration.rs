//! Integration tests for the Tarn interpreter
//!
//! Whole programs are assembled with `tarn::syntax::build` (or decoded from
//! JSON) and run through `Interpreter`, checking what they print and how
//! they fail.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use pretty_assertions::assert_eq;
use tarn::interp::{ErrorKind, RuntimeError};
use tarn::syntax::build::*;
use tarn::syntax::SyntaxNode;
use tarn::{Config, Interpreter, ParseTree, Span, Value};

/// Shared buffer so the test can read program output after the run
#[derive(Clone, Default)]
struct Output(Rc<RefCell<Vec<u8>>>);

impl Output {
    fn text(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Helper: run a program with `config`, returning the result and output
fn run_with(statements: Vec<SyntaxNode>, config: Config) -> (Result<Value, RuntimeError>, String) {
    let out = Output::default();
    let tree = ParseTree::from_syntax(program(statements));
    tree.validate().unwrap();
    let mut interp = Interpreter::with_config(tree, config).with_output(out.clone());
    let result = interp.run_program();
    (result, out.text())
}

/// Helper: run a program that must succeed and return what it printed
fn run_ok(statements: Vec<SyntaxNode>) -> String {
    let (result, out) = run_with(statements, Config::default());
    if let Err(e) = result {
        panic!("program failed: {e} (output so far: {out:?})");
    }
    out
}

/// Helper: run a program that must fail
fn run_err(statements: Vec<SyntaxNode>) -> RuntimeError {
    run_with(statements, Config::default()).0.unwrap_err()
}

/// `fact(n)`: accumulates into a local returned by the return expression
fn factorial() -> SyntaxNode {
    function(
        "fact",
        &["n"],
        block(vec![
            declare("r"),
            if_(
                le(ident("n"), int(1)),
                block(vec![assign(ident("r"), int(1))]),
                Some(block(vec![assign(
                    ident("r"),
                    mul(ident("n"), invoke("fact", vec![sub(ident("n"), int(1))])),
                )])),
            ),
        ]),
        Some(ident("r")),
    )
}

/// `sum(n)`: 0 + 1 + ... + n, one call per step
fn recursive_sum() -> SyntaxNode {
    function(
        "sum",
        &["n"],
        block(vec![
            declare("r"),
            if_(
                eq(ident("n"), int(0)),
                block(vec![assign(ident("r"), int(0))]),
                Some(block(vec![assign(
                    ident("r"),
                    add(ident("n"), invoke("sum", vec![sub(ident("n"), int(1))])),
                )])),
            ),
        ]),
        Some(ident("r")),
    )
}

// ============================================
// Loops and Block Scope
// ============================================

#[test]
fn test_for_loop_sums_and_tears_down_init() {
    let statements = vec![
        let_("i", int(0)),
        for_(
            let_("j", int(0)),
            lt(ident("j"), int(3)),
            post_inc(ident("j")),
            block(vec![assign(ident("i"), add(ident("i"), ident("j")))]),
        ),
        write(vec![ident("i")]),
    ];
    assert_eq!(run_ok(statements.clone()), "3");

    let mut after_loop = statements;
    after_loop.push(write(vec![ident("j")]));
    let (result, out) = run_with(after_loop, Config::default());
    assert_eq!(out, "3");
    let err = result.unwrap_err();
    assert_eq!(err.kind, ErrorKind::UndefinedVariable);
    assert_eq!(err.message, "variable 'j' is undefined");
}

#[test]
fn test_while_countdown() {
    let out = run_ok(vec![
        let_("n", int(5)),
        while_(
            gt(ident("n"), int(0)),
            block(vec![write(vec![ident("n")]), post_dec(ident("n"))]),
        ),
    ]);
    assert_eq!(out, "54321");
}

#[test]
fn test_loop_body_bindings_are_fresh_each_iteration() {
    let out = run_ok(vec![for_(
        let_("k", int(0)),
        lt(ident("k"), int(3)),
        pre_inc(ident("k")),
        block(vec![let_("sq", mul(ident("k"), ident("k"))), write(vec![ident("sq"), string(",")])]),
    )]);
    assert_eq!(out, "0,1,4,");
}

#[test]
fn test_sibling_blocks_reuse_names() {
    let out = run_ok(vec![
        block(vec![let_("x", int(1)), write(vec![ident("x")])]),
        block(vec![let_("x", int(2)), write(vec![ident("x")])]),
    ]);
    assert_eq!(out, "12");
}

#[test]
fn test_block_cannot_rebind_name_of_same_level() {
    let err = run_err(vec![let_("x", int(1)), block(vec![let_("x", int(2))])]);
    assert_eq!(err.kind, ErrorKind::Redefinition);
}

#[test]
fn test_function_local_shadows_outer() {
    let out = run_ok(vec![
        let_("x", int(1)),
        function("f", &[], block(vec![let_("x", int(2)), write(vec![ident("x")])]), None),
        call("f", vec![]),
        write(vec![ident("x")]),
    ]);
    assert_eq!(out, "21");
}

#[test]
fn test_function_sees_enclosing_variables() {
    let out = run_ok(vec![
        let_("count", int(0)),
        function("bump", &[], add_assign(ident("count"), int(1)), None),
        call("bump", vec![]),
        call("bump", vec![]),
        write(vec![ident("count")]),
    ]);
    assert_eq!(out, "2");
}

#[test]
fn test_non_boolean_loop_test() {
    let err = run_err(vec![while_(int(1), empty())]);
    assert_eq!(err.kind, ErrorKind::TypeError);
    assert_eq!(err.message, "while test must be a Boolean, got Integer 1");
}

// ============================================
// Functions and Recursion
// ============================================

#[test]
fn test_recursive_factorial() {
    let out = run_ok(vec![factorial(), write(vec![invoke("fact", vec![int(10)])])]);
    assert_eq!(out, "3628800");
}

#[test]
fn test_recursion_keeps_each_frame_intact() {
    // every activation prints its own local after the nested call returns
    let out = run_ok(vec![
        function(
            "f",
            &["n"],
            block(vec![
                let_("local", mul(ident("n"), int(10))),
                if_(
                    gt(ident("n"), int(0)),
                    block(vec![call("f", vec![sub(ident("n"), int(1))])]),
                    None,
                ),
                write(vec![ident("local"), string(" ")]),
            ]),
            None,
        ),
        call("f", vec![int(3)]),
    ]);
    assert_eq!(out, "0 10 20 30 ");
}

#[test]
fn test_deep_recursion() {
    let out = run_ok(vec![recursive_sum(), write(vec![invoke("sum", vec![int(3000)])])]);
    assert_eq!(out, "4501500");
}

#[test]
fn test_call_depth_limit() {
    let config = Config {
        max_call_depth: 50,
        ..Config::default()
    };
    let (result, _) = run_with(
        vec![recursive_sum(), write(vec![invoke("sum", vec![int(100)])])],
        config,
    );
    assert_eq!(result.unwrap_err().kind, ErrorKind::StackOverflow);
}

#[test]
fn test_nesting_deeper_than_display() {
    let config = Config {
        display_capacity: 2,
        ..Config::default()
    };
    let inner = function("inner", &[], empty(), None);
    let outer = function("outer", &[], block(vec![inner, call("inner", vec![])]), None);
    let (result, _) = run_with(vec![outer, call("outer", vec![])], config);
    assert_eq!(result.unwrap_err().kind, ErrorKind::StackOverflow);
}

#[test]
fn test_nested_function_reads_outer_locals() {
    let out = run_ok(vec![
        function(
            "outer",
            &["x"],
            block(vec![
                let_("base", int(100)),
                function("inner", &["y"], empty(), Some(add(ident("base"), ident("y")))),
            ]),
            Some(invoke("inner", vec![ident("x")])),
        ),
        write(vec![invoke("outer", vec![int(5)])]),
    ]);
    assert_eq!(out, "105");
}

#[test]
fn test_nested_function_is_private_to_its_parent() {
    let err = run_err(vec![
        function("outer", &[], function("helper", &[], empty(), None), None),
        call("outer", vec![]),
        call("helper", vec![]),
    ]);
    assert_eq!(err.kind, ErrorKind::UndefinedFunction);
}

#[test]
fn test_nested_function_shared_by_recursive_activations() {
    // the outer activation defines `g`; the inner one calls it before its
    // own definition statement has run
    let out = run_ok(vec![
        function(
            "f",
            &["n"],
            block(vec![
                if_(eq(ident("n"), int(0)), block(vec![call("g", vec![])]), None),
                function("g", &[], write(vec![string("g")]), None),
                if_(
                    gt(ident("n"), int(0)),
                    block(vec![call("f", vec![sub(ident("n"), int(1))])]),
                    None,
                ),
            ]),
            None,
        ),
        call("f", vec![int(1)]),
    ]);
    assert_eq!(out, "g");
}

#[test]
fn test_function_redefinition() {
    let err = run_err(vec![
        function("f", &[], empty(), None),
        function("f", &["x"], empty(), None),
    ]);
    assert_eq!(err.kind, ErrorKind::Redefinition);
}

#[test]
fn test_function_definition_in_loop_is_reused() {
    let out = run_ok(vec![for_(
        let_("i", int(0)),
        lt(ident("i"), int(2)),
        post_inc(ident("i")),
        block(vec![
            function("show", &["v"], write(vec![ident("v")]), None),
            call("show", vec![ident("i")]),
        ]),
    )]);
    assert_eq!(out, "01");
}

#[test]
fn test_arity_mismatch() {
    let err = run_err(vec![factorial(), write(vec![invoke("fact", vec![])])]);
    assert_eq!(err.kind, ErrorKind::ArityMismatch);
    assert_eq!(err.message, "fact(n) expects 1 argument(s), got 0");
}

#[test]
fn test_statement_function_used_as_value() {
    let err = run_err(vec![
        function("noop", &[], empty(), None),
        let_("x", invoke("noop", vec![])),
    ]);
    assert_eq!(err.kind, ErrorKind::TypeError);
}

#[test]
fn test_anonymous_functions_in_collections() {
    let out = run_ok(vec![
        let_(
            "ops",
            list(vec![
                lambda(&["a", "b"], empty(), Some(add(ident("a"), ident("b")))),
                lambda(&["a", "b"], empty(), Some(mul(ident("a"), ident("b")))),
            ]),
        ),
        for_(
            let_("i", int(0)),
            lt(ident("i"), method(ident("ops"), "size", vec![])),
            post_inc(ident("i")),
            write(vec![
                invoke_value(deref(ident("ops"), vec![index(ident("i"))]), vec![int(6), int(7)]),
                string(" "),
            ]),
        ),
    ]);
    assert_eq!(out, "13 42 ");
}

#[test]
fn test_function_passed_as_argument() {
    let out = run_ok(vec![
        function(
            "twice",
            &["f", "x"],
            empty(),
            Some(invoke("f", vec![invoke("f", vec![ident("x")])])),
        ),
        write(vec![invoke(
            "twice",
            vec![lambda(&["n"], empty(), Some(mul(ident("n"), int(3)))), int(2)],
        )]),
    ]);
    assert_eq!(out, "18");
}

// ============================================
// Constants and Assignment
// ============================================

#[test]
fn test_constant_cannot_be_reassigned() {
    let err = run_err(vec![const_("k", int(1)), assign(ident("k"), int(2))]);
    assert_eq!(err.kind, ErrorKind::ConstantViolation);

    let err = run_err(vec![const_("k", int(1)), post_inc(ident("k"))]);
    assert_eq!(err.kind, ErrorKind::ConstantViolation);
}

#[test]
fn test_constant_cannot_be_redefined() {
    let err = run_err(vec![const_("k", int(1)), const_("k", int(2))]);
    assert_eq!(err.kind, ErrorKind::Redefinition);
    assert_eq!(err.message, "constant 'k' is already defined in this scope");
}

#[test]
fn test_compound_assignment_to_constant() {
    let err = run_err(vec![const_("k", int(1)), add_assign(ident("k"), int(2))]);
    assert_eq!(err.kind, ErrorKind::ConstantViolation);
}

#[test]
fn test_constant_contents_stay_mutable() {
    let out = run_ok(vec![
        const_("xs", list(vec![])),
        method(ident("xs"), "append", vec![int(1)]),
        assign(deref(ident("xs"), vec![index(int(0))]), int(9)),
        write(vec![ident("xs")]),
    ]);
    assert_eq!(out, "[9]");
}

#[test]
fn test_assignment_to_undefined_name() {
    let err = run_err(vec![assign(ident("ghost"), int(1))]);
    assert_eq!(err.kind, ErrorKind::UndefinedVariable);
}

#[test]
fn test_compound_assignment_on_elements() {
    let out = run_ok(vec![
        let_("o", object(vec![("hits", int(1)), ("name", string("a"))])),
        add_assign(deref(ident("o"), vec![member("hits")]), int(4)),
        add_assign(deref(ident("o"), vec![member("name")]), string("b")),
        mul_assign(deref(ident("o"), vec![member("hits")]), number("0.5")),
        write(vec![ident("o")]),
    ]);
    assert_eq!(out, "{hits: 2.5, name: \"ab\"}");
}

#[test]
fn test_lists_are_shared_by_reference() {
    let out = run_ok(vec![
        let_("a", list(vec![int(1)])),
        let_("b", ident("a")),
        method(ident("b"), "append", vec![int(2)]),
        let_("c", method(ident("a"), "copy", vec![])),
        method(ident("c"), "append", vec![int(3)]),
        write(vec![ident("a"), ident("c")]),
    ]);
    assert_eq!(out, "[1, 2][1, 2, 3]");
}

// ============================================
// Arrays and Bounds
// ============================================

#[test]
fn test_array_capacity_is_enforced() {
    let (result, out) = run_with(
        vec![
            declare_array("a", Some(int(2))),
            method(ident("a"), "append", vec![int(1)]),
            method(ident("a"), "append", vec![int(2)]),
            write(vec![ident("a")]),
            method(ident("a"), "append", vec![int(3)]),
        ],
        Config::default(),
    );
    assert_eq!(out, "[1, 2]");
    assert_eq!(result.unwrap_err().kind, ErrorKind::CapacityExceeded);
}

#[test]
fn test_array_resize_then_append() {
    let out = run_ok(vec![
        let_("a", array(vec![int(1)])),
        method(ident("a"), "resize", vec![int(3)]),
        method(ident("a"), "append", vec![int(2)]),
        assign(deref(ident("a"), vec![index(int(0))]), int(7)),
        write(vec![ident("a"), string(" "), method(ident("a"), "capacity", vec![])]),
    ]);
    assert_eq!(out, "[7, 2] 3");
}

#[test]
fn test_index_out_of_range() {
    let err = run_err(vec![
        let_("xs", list(vec![int(1)])),
        write(vec![deref(ident("xs"), vec![index(int(5))])]),
    ]);
    assert_eq!(err.kind, ErrorKind::IndexOutOfBounds);
    assert_eq!(err.message, "index 5 out of bounds for length 1");

    let err = run_err(vec![
        let_("xs", list(vec![])),
        assign(deref(ident("xs"), vec![index(int(0))]), int(1)),
    ]);
    assert_eq!(err.kind, ErrorKind::IndexOutOfBounds);
}

#[test]
fn test_non_integer_index() {
    let err = run_err(vec![
        let_("xs", list(vec![int(1)])),
        write(vec![deref(ident("xs"), vec![index(string("0"))])]),
    ]);
    assert_eq!(err.kind, ErrorKind::TypeError);
}

#[test]
fn test_missing_object_key() {
    let err = run_err(vec![
        let_("o", object(vec![])),
        write(vec![deref(ident("o"), vec![member("nope")])]),
    ]);
    assert_eq!(err.kind, ErrorKind::IndexOutOfBounds);
}

#[test]
fn test_string_indexing() {
    let out = run_ok(vec![
        let_("s", string("héllo")),
        write(vec![deref(ident("s"), vec![index(int(1))]), method(ident("s"), "length", vec![])]),
    ]);
    assert_eq!(out, "é5");
}

// ============================================
// Numeric Promotion
// ============================================

#[test]
fn test_integral_results_collapse_to_integer() {
    let out = run_ok(vec![
        writeln_all(vec![
            div(int(4), int(2)),
            div(int(3), int(2)),
            add(number("1.5"), number("2.5")),
            add(number("2L"), int(3)),
            modulo(int(7), int(3)),
        ]),
        write(vec![method(div(int(4), int(2)), "getClass", vec![])]),
        write(vec![string(" "), method(div(int(3), int(2)), "getClass", vec![])]),
        write(vec![string(" "), method(add(number("2L"), int(3)), "getClass", vec![])]),
    ]);
    assert_eq!(out, "2 1.5 4 5 1\nInteger Double Integer");
}

#[test]
fn test_division_by_zero_is_ieee() {
    let out = run_ok(vec![write(vec![div(int(1), int(0)), string(" "), div(number("-1.0"), int(0))])]);
    assert_eq!(out, "inf -inf");
}

#[test]
fn test_string_concatenation() {
    let out = run_ok(vec![write(vec![add(string("n="), int(3))])]);
    assert_eq!(out, "n=3");
    let err = run_err(vec![write(vec![add(int(3), string("x"))])]);
    assert_eq!(err.kind, ErrorKind::TypeError);
}

#[test]
fn test_mixed_equality() {
    let out = run_ok(vec![write(vec![
        eq(int(1), number("1.0")),
        ne(number("2L"), int(2)),
        eq(list(vec![int(1), string("a")]), list(vec![int(1), string("a")])),
        lt(string("abc"), string("abd")),
    ])]);
    assert_eq!(out, "truefalsetruetrue");
}

#[test]
fn test_cyclic_lists_compare_without_crashing() {
    let setup = vec![
        let_("a", list(vec![])),
        method(ident("a"), "append", vec![ident("a")]),
        let_("b", list(vec![])),
        method(ident("b"), "append", vec![ident("b")]),
    ];

    let mut same = setup.clone();
    same.push(write(vec![
        eq(ident("a"), ident("a")),
        method(ident("a"), "contains", vec![ident("a")]),
        method(ident("a"), "contains", vec![ident("b")]),
    ]));
    assert_eq!(run_ok(same), "truetruefalse");

    let mut distinct = setup;
    distinct.push(write(vec![eq(ident("a"), ident("b"))]));
    let err = run_err(distinct);
    assert_eq!(err.kind, ErrorKind::TypeError);
}

/// `writeln` of its arguments separated by spaces
fn writeln_all(args: Vec<SyntaxNode>) -> SyntaxNode {
    let mut spaced = Vec::new();
    for (i, arg) in args.into_iter().enumerate() {
        if i > 0 {
            spaced.push(string(" "));
        }
        spaced.push(arg);
    }
    call("writeln", spaced)
}

// ============================================
// Prototype Methods
// ============================================

#[test]
fn test_list_methods() {
    let out = run_ok(vec![
        let_("xs", list(vec![int(3), int(1)])),
        method(ident("xs"), "append", vec![int(4)]),
        method(ident("xs"), "insert", vec![int(0), int(9)]),
        let_("popped", method(ident("xs"), "pop", vec![])),
        writeln_all(vec![
            ident("xs"),
            ident("popped"),
            method(ident("xs"), "indexOf", vec![int(1)]),
            method(ident("xs"), "contains", vec![int(7)]),
            method(ident("xs"), "size", vec![]),
        ]),
    ]);
    assert_eq!(out, "[9, 3, 1] 4 2 false 3\n");
}

#[test]
fn test_object_methods() {
    let out = run_ok(vec![
        let_("o", object(vec![("b", int(2)), ("a", int(1))])),
        method(ident("o"), "remove", vec![string("b")]),
        writeln_all(vec![
            method(ident("o"), "keys", vec![]),
            method(ident("o"), "has", vec![string("b")]),
            method(ident("o"), "size", vec![]),
        ]),
    ]);
    assert_eq!(out, "[\"a\"] false 1\n");
}

#[test]
fn test_unknown_method() {
    let err = run_err(vec![write(vec![method(int(1), "append", vec![int(2)])])]);
    assert_eq!(err.kind, ErrorKind::UnknownMethod);
}

#[test]
fn test_pop_from_empty_list() {
    let err = run_err(vec![method(list(vec![]), "pop", vec![])]);
    assert_eq!(err.kind, ErrorKind::IndexOutOfBounds);
}

// ============================================
// Natives
// ============================================

#[test]
fn test_file_natives() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    let path = path.to_str().unwrap();
    let out = run_ok(vec![
        write(vec![invoke("fileExists", vec![string(path)])]),
        call("writeFile", vec![string(path), add(string("x="), int(1))]),
        write(vec![string(" "), invoke("fileExists", vec![string(path)])]),
        write(vec![string(" "), invoke("readFile", vec![string(path)])]),
    ]);
    assert_eq!(out, "false true x=1");
    assert_eq!(std::fs::read_to_string(path).unwrap(), "x=1");
}

#[test]
fn test_host_failure_is_a_runtime_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt");
    let err = run_err(vec![write(vec![invoke(
        "readFile",
        vec![string(missing.to_str().unwrap())],
    )])]);
    assert_eq!(err.kind, ErrorKind::Native);
    assert!(err.message.starts_with("readFile: "));
}

#[test]
fn test_flags_from_config() {
    let mut config = Config::from_toml("[flags]\nmode = \"slow\"").unwrap();
    config.apply_flags(["mode=fast"]).unwrap();
    let (result, out) = run_with(
        vec![write(vec![invoke("flag", vec![string("mode")]), invoke("flag", vec![string("other")])])],
        config,
    );
    result.unwrap();
    assert_eq!(out, "fastnull");
}

#[test]
fn test_random_within_bound() {
    let out = run_ok(vec![for_(
        let_("i", int(0)),
        lt(ident("i"), int(20)),
        post_inc(ident("i")),
        block(vec![
            let_("r", invoke("random", vec![int(3)])),
            if_(
                or(lt(ident("r"), int(0)), ge(ident("r"), int(3))),
                write(vec![string("out of range")]),
                None,
            ),
        ]),
    )]);
    assert_eq!(out, "");
}

#[test]
fn test_dump_shows_kinds() {
    let out = run_ok(vec![call(
        "dump",
        vec![list(vec![int(1), number("2L"), string("s"), array(vec![])])],
    )]);
    insta::assert_snapshot!(out.trim_end(), @r#"List[Integer(1), Long(2), String("s"), Array(0/0)[]]"#);
}

// ============================================
// Tree Interchange and Diagnostics
// ============================================

#[test]
fn test_program_from_json() {
    let json = r#"{
        "kind": "program",
        "children": [
            {"kind": "let_definition", "token": "x", "children": [
                {"kind": "number_literal", "token": "40"}
            ]},
            {"kind": "call", "token": "write", "children": [
                {"kind": "add", "children": [
                    {"kind": "identifier", "token": "x"},
                    {"kind": "number_literal", "token": "2"}
                ]}
            ]}
        ]
    }"#;
    let tree = ParseTree::from_json(json).unwrap();
    tree.validate().unwrap();
    let out = Output::default();
    let mut interp = Interpreter::new(tree).with_output(out.clone());
    interp.run_program().unwrap();
    assert_eq!(out.text(), "42");
}

#[test]
fn test_error_span_from_json() {
    let json = r#"{
        "kind": "program",
        "children": [
            {"kind": "call", "token": "write", "span": {"start": 0, "end": 12},
             "children": [{"kind": "identifier", "token": "nope", "span": {"start": 6, "end": 10}}]}
        ]
    }"#;
    let mut interp = Interpreter::new(ParseTree::from_json(json).unwrap()).with_output(Output::default());
    let err = interp.run_program().unwrap_err();
    assert_eq!(err.span, Some(Span::new(6, 10)));
}

#[test]
fn test_malformed_tree_fails_validation() {
    let json = r#"{"kind": "program", "children": [{"kind": "let_definition", "token": "x"}]}"#;
    let problems = ParseTree::from_json(json).unwrap().validate().unwrap_err();
    assert_eq!(problems.len(), 1);
}

#[test]
fn test_program_arguments() {
    let out = Output::default();
    let tree = ParseTree::from_syntax(program(vec![write(vec![method(
        invoke("argv", vec![]),
        "size",
        vec![],
    )])]));
    let mut interp = Interpreter::new(tree)
        .with_output(out.clone())
        .with_args(vec!["a".into(), "b".into()]);
    interp.run_program().unwrap();
    assert_eq!(out.text(), "2");
}
