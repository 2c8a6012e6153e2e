//! Integration tests for the ESTree output of `esparse::parse`.

use esparse::{parse, parse_module, parse_script, ParserOptions};
use serde_json::{json, Value};

fn script(source: &str) -> Value {
    parse_script(source, ParserOptions::default())
        .unwrap_or_else(|err| panic!("{source:?} failed: {err}"))
        .to_estree()
}

fn module(source: &str) -> Value {
    parse_module(source, ParserOptions::default())
        .unwrap_or_else(|err| panic!("{source:?} failed: {err}"))
        .to_estree()
}

fn first_expr(tree: &Value) -> &Value {
    &tree["body"][0]["expression"]
}

#[test]
fn test_export_let_shape() {
    let tree = module("export let x = 0;");
    assert_eq!(tree["sourceType"], "module");
    assert_eq!(tree["start"], 0);
    assert_eq!(tree["end"], 17);

    let export = &tree["body"][0];
    assert_eq!(export["type"], "ExportNamedDeclaration");
    assert_eq!(export["specifiers"], json!([]));
    assert_eq!(export["source"], Value::Null);
    assert_eq!(export["attributes"], json!([]));

    let decl = &export["declaration"];
    assert_eq!(decl["type"], "VariableDeclaration");
    assert_eq!(decl["kind"], "let");
    assert_eq!(decl["start"], 7);
    let declarator = &decl["declarations"][0];
    assert_eq!(declarator["id"], json!({ "type": "Identifier", "start": 11, "end": 12, "name": "x" }));
    assert_eq!(declarator["init"]["value"], 0);
}

#[test]
fn test_script_source_type() {
    let tree = script("var x;");
    assert_eq!(tree["type"], "Program");
    assert_eq!(tree["sourceType"], "script");
    assert_eq!(tree["body"][0]["declarations"][0]["init"], Value::Null);
}

#[test]
fn test_exponent_binds_tighter_than_addition() {
    let tree = script("a ** b + c");
    let expr = first_expr(&tree);
    assert_eq!(expr["type"], "BinaryExpression");
    assert_eq!(expr["operator"], "+");
    assert_eq!(expr["left"]["operator"], "**");
    assert_eq!(expr["right"]["name"], "c");

    let tree = script("a ** b ** c");
    assert_eq!(first_expr(&tree)["right"]["operator"], "**");
}

#[test]
fn test_arrow_versus_sequence() {
    let tree = script("(a, b);");
    let seq = first_expr(&tree);
    assert_eq!(seq["type"], "SequenceExpression");
    assert_eq!(seq["start"], 1);
    assert_eq!(seq["end"], 5);

    let tree = script("(a, b) => c");
    let arrow = first_expr(&tree);
    assert_eq!(arrow["type"], "ArrowFunctionExpression");
    assert_eq!(arrow["expression"], true);
    assert_eq!(arrow["params"].as_array().map(Vec::len), Some(2));
    assert_eq!(arrow["params"][1]["name"], "b");
}

#[test]
fn test_regex_versus_division() {
    let tree = script("x = a\n/b/g");
    let right = &first_expr(&tree)["right"];
    assert_eq!(right["operator"], "/");
    assert_eq!(right["left"]["operator"], "/");
    assert_eq!(right["right"]["name"], "g");

    let tree = script("/b/g.test(x)");
    let regex = &first_expr(&tree)["callee"]["object"];
    assert_eq!(regex["regex"], json!({ "pattern": "b", "flags": "g" }));
}

#[test]
fn test_asi_splits_update() {
    let tree = script("a\n++b");
    assert_eq!(tree["body"].as_array().map(Vec::len), Some(2));
    let update = &tree["body"][1]["expression"];
    assert_eq!(update["type"], "UpdateExpression");
    assert_eq!(update["prefix"], true);
}

#[test]
fn test_class_members() {
    let tree = script("class A extends B { static x = 1; #y; constructor() { super(); } static {} }");
    let class = &tree["body"][0];
    assert_eq!(class["type"], "ClassDeclaration");
    assert_eq!(class["superClass"]["name"], "B");

    let members = &class["body"]["body"];
    assert_eq!(members[0]["type"], "PropertyDefinition");
    assert_eq!(members[0]["static"], true);
    assert_eq!(members[1]["key"]["type"], "PrivateIdentifier");
    assert_eq!(members[1]["value"], Value::Null);
    assert_eq!(members[2]["type"], "MethodDefinition");
    assert_eq!(members[2]["kind"], "constructor");
    assert_eq!(members[2]["value"]["body"]["body"][0]["expression"]["callee"]["type"], "Super");
    assert_eq!(members[3]["type"], "StaticBlock");
}

#[test]
fn test_import_specifiers() {
    let tree = module("import d, * as ns from 'm'; import { a as b, 'c' as c } from 'n';");
    let first = &tree["body"][0];
    assert_eq!(first["specifiers"][0]["type"], "ImportDefaultSpecifier");
    assert_eq!(first["specifiers"][1]["type"], "ImportNamespaceSpecifier");
    assert_eq!(first["source"]["value"], "m");

    let second = &tree["body"][1]["specifiers"];
    assert_eq!(second[0]["imported"]["name"], "a");
    assert_eq!(second[0]["local"]["name"], "b");
    assert_eq!(second[1]["imported"]["type"], "Literal");
}

#[test]
fn test_optional_chain_wrapping() {
    let tree = script("a?.b.c(d)");
    let chain = first_expr(&tree);
    assert_eq!(chain["type"], "ChainExpression");
    let call = &chain["expression"];
    assert_eq!(call["type"], "CallExpression");
    assert_eq!(call["optional"], false);
    assert_eq!(call["callee"]["object"]["optional"], true);
}

#[test]
fn test_template_elements() {
    let tree = script("t`a${b}\\unicode`");
    let quasi = &first_expr(&tree)["quasi"];
    let quasis = &quasi["quasis"];
    assert_eq!(quasis[0]["value"], json!({ "raw": "a", "cooked": "a" }));
    assert_eq!(quasis[1]["value"]["cooked"], Value::Null);
    assert_eq!(quasis[1]["tail"], true);
    assert_eq!(quasi["expressions"][0]["name"], "b");
}

#[test]
fn test_options_from_json() {
    let options: ParserOptions = serde_json::from_str(r#"{"module": true, "ranges": true}"#).unwrap();
    let tree = parse("export {};", options).unwrap().to_estree();
    assert_eq!(tree["range"], json!([0, 10]));
    assert_eq!(tree["body"][0]["range"], json!([0, 10]));
    assert!(tree.get("loc").is_none());
}

#[test]
fn test_serialize_matches_to_estree() {
    let program = parse_module("export default function () {}", ParserOptions::default()).unwrap();
    let text = serde_json::to_string(&program).unwrap();
    let reparsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(reparsed, program.to_estree());
    assert_eq!(reparsed["body"][0]["declaration"]["id"], Value::Null);
}
