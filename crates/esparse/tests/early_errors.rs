//! Integration tests for early errors and goal-dependent grammar.

use esparse::{parse_module, parse_script, ErrorKind, ParserOptions};

fn assert_script_ok(sources: &[&str]) {
    for source in sources {
        if let Err(err) = parse_script(source, ParserOptions::default()) {
            panic!("expected {source:?} to parse as a script: {err}");
        }
    }
}

fn assert_script_err(sources: &[&str]) {
    for source in sources {
        assert!(
            parse_script(source, ParserOptions::default()).is_err(),
            "expected {source:?} to be rejected as a script"
        );
    }
}

fn assert_module_err(sources: &[&str]) {
    for source in sources {
        assert!(
            parse_module(source, ParserOptions::default()).is_err(),
            "expected {source:?} to be rejected as a module"
        );
    }
}

#[test]
fn test_sloppy_script_accepts() {
    assert_script_ok(&[
        "({a, a: 1})",
        "var a; var a;",
        "function f(a, a) {}",
        "with (a) {}",
        "var yield, let, static;",
        "async => async",
        "0777",
        "'\\07'",
        "label: for (;;) { continue label; }",
        "if (a) function f() {}",
        "<!-- html comment\nx",
        "x\n--> also a comment",
        "for (var x = 1 in o);",
        "function* g() { yield* g(); }",
        "async function f() { for await (const x of y); }",
        "({ __proto__: a, ['__proto__']: b })",
        "class A { static async *gen() {} get #x() { return 1; } set #x(v) {} }",
    ]);
}

#[test]
fn test_script_rejects() {
    assert_script_err(&[
        "-a ** b",
        "a ?? b || c",
        "let a; let a;",
        "({a = 1})",
        "({__proto__: a, __proto__: b})",
        "function f(a, a) { 'use strict' }",
        "(a, a) => 1",
        "(a) => { let a; }",
        "'use strict'; with (a) {}",
        "'use strict'; var yield;",
        "break;",
        "foo: { continue foo; }",
        "return 1",
        "new.target",
        "super()",
        "class A { constructor() {} constructor() {} }",
        "class A { #x; #x; }",
        "x => {}()",
        "`${a`",
        "0b12",
        "import.meta",
        "await 1",
        "1 = 2",
        "a?.b = 1",
    ]);
}

#[test]
fn test_module_rejects() {
    assert_module_err(&[
        "with (a) {}",
        "delete x",
        "<!-- x",
        "let a; var a;",
        "var a, b; export {a, b as a}",
        "export { c }",
        "0777",
        "function f() { import x from 'm'; }",
        "await => 1",
    ]);
}

#[test]
fn test_module_accepts() {
    for source in [
        "export let x = 0;",
        "import.meta.url",
        "await Promise.resolve(1)",
        "export { a as default }; function a() {}",
        "export * as ns from 'm'",
        "var a, b; export { a, b as c }",
    ] {
        if let Err(err) = parse_module(source, ParserOptions::default()) {
            panic!("expected {source:?} to parse as a module: {err}");
        }
    }
}

#[test]
fn test_retroactive_octal() {
    assert_script_err(&[
        "function f() { '\\07'; 'use strict'; }",
        "'\\07'; 'use strict';",
        "'use strict'; 07",
    ]);
    assert_script_ok(&["function f() { '\\07'; 'not strict'; }"]);
}

#[test]
fn test_disabled_web_compat() {
    let options = ParserOptions::default().with_web_compat(false);
    for source in ["<!-- x", "if (a) function f() {}", "for (var x = 1 in o);"] {
        assert!(parse_script(source, options).is_err(), "{source:?}");
    }
}

#[test]
fn test_implied_strict() {
    let options = ParserOptions::default().with_implied_strict(true);
    assert!(parse_script("with (a) {}", options).is_err());
    assert!(parse_script("var x = 1;", options).is_ok());
}

#[test]
fn test_global_return() {
    let options = ParserOptions::default().with_global_return(true);
    assert!(parse_script("return 1", options).is_ok());
    assert!(parse_module("return 1", options).is_err());
}

#[test]
fn test_error_position() {
    let err = parse_script("'use strict';\nwith (a) {}", ParserOptions::default()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert_eq!((err.line, err.column), (2, 0));
    assert_eq!(err.offset, 14);
    assert_eq!(err.to_string(), format!("{} (2:0)", err.message));

    let err = parse_script("'\\u{110000}'", ParserOptions::default()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Lexical);
}

#[test]
fn test_module_syntax_needs_module_goal() {
    for source in ["export let x = 0;", "import a from 'm';", "export default 1;"] {
        assert!(parse_module(source, ParserOptions::default()).is_ok(), "{source:?}");
        assert!(parse_script(source, ParserOptions::default()).is_err(), "{source:?}");
    }
}

#[test]
fn test_staged_productions() {
    let next = ParserOptions::default().with_next(true);
    let stable = ParserOptions::default();

    assert!(parse_script("{ using x = a; }", next).is_ok());
    assert!(parse_script("{ using x = a; }", stable).is_err());
    assert!(parse_script("{ using x; }", next).is_err());
    assert!(parse_script("using x = a;", next).is_err());
    assert!(parse_module("using x = a;", next).is_ok());
    assert!(parse_script("var using = 1; using;", next).is_ok());

    let import = "import j from 'm' with { type: 'json' };";
    assert!(parse_module(import, next).is_ok());
    assert!(parse_module(import, stable).is_err());
    assert!(parse_module("import j from 'm' with { type: 'json', type: 'css' };", next).is_err());

    assert!(parse_script("import('m', { with: {} })", next).is_ok());
    assert!(parse_script("import('m', { with: {} })", stable).is_err());
}

#[test]
fn test_escaped_keywords() {
    assert_script_err(&[
        "\\u0061sync function f(){}",
        "l\\u0065t x = 1",
        "function *g(){ \\u0079ield 1 }",
        "'use strict'; \\u0079ield: 1",
    ]);
    assert_script_ok(&["var \\u0061sync;", "({ \\u0061sync: 1 })"]);
}

#[test]
fn test_identifiers_outside_xid() {
    assert_script_ok(&["var \u{309B};", "var \u{037A}x;", "var a\u{FF9E} = \u{309C};"]);
    assert_script_err(&["var \u{00D7};"]);
}
