//! ESTree emission.
//!
//! Converts the typed AST into ESTree-shaped JSON. Every node carries
//! `type`, `start` and `end`; `loc` and `range` are added when the parse
//! options request them. Offsets are UTF-16 code units.

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::ast::*;
use crate::options::ParserOptions;
use crate::span::Span;

/// Largest integer a JSON consumer can hold exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

impl Program {
    /// Convert the program to an ESTree `Program` node.
    pub fn to_estree(&self) -> Value {
        Emitter::new(self).emit_program()
    }
}

impl Serialize for Program {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_estree().serialize(serializer)
    }
}

/// The ESTree emitter.
struct Emitter<'a> {
    program: &'a Program,
    options: ParserOptions,
}

impl<'a> Emitter<'a> {
    fn new(program: &'a Program) -> Self {
        Self {
            program,
            options: program.options,
        }
    }

    // =========================================================================
    // Node Construction
    // =========================================================================

    fn offset(&self, byte_offset: u32) -> u32 {
        match &self.program.line_index {
            Some(index) => index.utf16_offset(byte_offset),
            None => byte_offset,
        }
    }

    /// Build a node of type `kind` covering `span` with the given fields.
    fn node(&self, kind: &str, span: Span, fields: Value) -> Value {
        let start = self.offset(span.start);
        let end = self.offset(span.end);

        let mut map = Map::new();
        map.insert("type".into(), Value::from(kind));
        map.insert("start".into(), Value::from(start));
        map.insert("end".into(), Value::from(end));
        if self.options.loc {
            if let Some(index) = &self.program.line_index {
                let from = index.position(span.start);
                let to = index.position(span.end);
                map.insert(
                    "loc".into(),
                    json!({
                        "start": { "line": from.line, "column": from.column },
                        "end": { "line": to.line, "column": to.column },
                    }),
                );
            }
        }
        if self.options.ranges {
            map.insert("range".into(), json!([start, end]));
        }
        if let Value::Object(fields) = fields {
            map.extend(fields);
        }
        Value::Object(map)
    }

    fn ident(&self, id: &Identifier) -> Value {
        self.node("Identifier", id.span, json!({ "name": id.name }))
    }

    fn opt_ident(&self, id: Option<&Identifier>) -> Value {
        id.map_or(Value::Null, |id| self.ident(id))
    }

    fn literal(&self, span: Span, value: Value, extra: Value) -> Value {
        let mut fields = json!({ "value": value });
        if self.options.raw {
            fields["raw"] = Value::from(span.slice(&self.program.source));
        }
        if let (Value::Object(fields), Value::Object(extra)) = (&mut fields, extra) {
            fields.extend(extra);
        }
        self.node("Literal", span, fields)
    }

    // =========================================================================
    // Program and Statements
    // =========================================================================

    fn emit_program(&self) -> Value {
        let program = self.program;
        let mut fields = json!({
            "body": self.emit_stmts(&program.body),
            "sourceType": program.source_type.as_str(),
        });
        if self.options.comments {
            let comments: Vec<Value> = program.comments.iter().map(|c| self.emit_comment(c)).collect();
            fields["comments"] = Value::Array(comments);
        }
        self.node("Program", program.span, fields)
    }

    fn emit_comment(&self, comment: &Comment) -> Value {
        let kind = match comment.kind {
            CommentKind::Block => "Block",
            CommentKind::Line | CommentKind::Html => "Line",
        };
        self.node(kind, comment.span, json!({ "value": comment.value }))
    }

    fn emit_stmts(&self, stmts: &[Stmt]) -> Value {
        Value::Array(stmts.iter().map(|s| self.emit_stmt(s)).collect())
    }

    fn emit_block(&self, block: &BlockStmt) -> Value {
        self.node("BlockStatement", block.span, json!({ "body": self.emit_stmts(&block.body) }))
    }

    fn emit_stmt(&self, stmt: &Stmt) -> Value {
        let span = stmt.span;
        match &stmt.kind {
            StmtKind::Var(decl) => self.emit_var_decl(decl),
            StmtKind::Function(function) => self.emit_function("FunctionDeclaration", function),
            StmtKind::Class(class) => self.emit_class("ClassDeclaration", class),
            StmtKind::Expr { expr, directive } => {
                let mut fields = json!({ "expression": self.emit_expr(expr) });
                if let Some(directive) = directive {
                    fields["directive"] = Value::from(directive.as_str());
                }
                self.node("ExpressionStatement", span, fields)
            }
            StmtKind::Block(block) => self.emit_block(block),
            StmtKind::Empty => self.node("EmptyStatement", span, json!({})),
            StmtKind::Debugger => self.node("DebuggerStatement", span, json!({})),
            StmtKind::With { object, body } => self.node(
                "WithStatement",
                span,
                json!({ "object": self.emit_expr(object), "body": self.emit_stmt(body) }),
            ),
            StmtKind::Return(arg) => self.node(
                "ReturnStatement",
                span,
                json!({ "argument": self.emit_opt_expr(arg.as_deref()) }),
            ),
            StmtKind::Labeled { label, body } => self.node(
                "LabeledStatement",
                span,
                json!({ "body": self.emit_stmt(body), "label": self.ident(label) }),
            ),
            StmtKind::Break(label) => self.node("BreakStatement", span, json!({ "label": self.opt_ident(label.as_ref()) })),
            StmtKind::Continue(label) => {
                self.node("ContinueStatement", span, json!({ "label": self.opt_ident(label.as_ref()) }))
            }
            StmtKind::If { test, consequent, alternate } => self.node(
                "IfStatement",
                span,
                json!({
                    "test": self.emit_expr(test),
                    "consequent": self.emit_stmt(consequent),
                    "alternate": alternate.as_deref().map_or(Value::Null, |s| self.emit_stmt(s)),
                }),
            ),
            StmtKind::Switch { discriminant, cases } => {
                let cases: Vec<Value> = cases
                    .iter()
                    .map(|case| {
                        self.node(
                            "SwitchCase",
                            case.span,
                            json!({
                                "consequent": self.emit_stmts(&case.consequent),
                                "test": self.emit_opt_expr(case.test.as_ref()),
                            }),
                        )
                    })
                    .collect();
                self.node(
                    "SwitchStatement",
                    span,
                    json!({ "discriminant": self.emit_expr(discriminant), "cases": cases }),
                )
            }
            StmtKind::Throw(arg) => self.node("ThrowStatement", span, json!({ "argument": self.emit_expr(arg) })),
            StmtKind::Try { block, handler, finalizer } => {
                let handler = handler.as_ref().map_or(Value::Null, |clause| {
                    self.node(
                        "CatchClause",
                        clause.span,
                        json!({
                            "param": clause.param.as_ref().map_or(Value::Null, |p| self.emit_pattern(p)),
                            "body": self.emit_block(&clause.body),
                        }),
                    )
                });
                self.node(
                    "TryStatement",
                    span,
                    json!({
                        "block": self.emit_block(block),
                        "handler": handler,
                        "finalizer": finalizer.as_ref().map_or(Value::Null, |b| self.emit_block(b)),
                    }),
                )
            }
            StmtKind::While { test, body } => self.node(
                "WhileStatement",
                span,
                json!({ "test": self.emit_expr(test), "body": self.emit_stmt(body) }),
            ),
            StmtKind::DoWhile { body, test } => self.node(
                "DoWhileStatement",
                span,
                json!({ "body": self.emit_stmt(body), "test": self.emit_expr(test) }),
            ),
            StmtKind::For { init, test, update, body } => {
                let init = match init {
                    Some(ForInit::Var(decl)) => self.emit_var_decl(decl),
                    Some(ForInit::Expr(expr)) => self.emit_expr(expr),
                    None => Value::Null,
                };
                self.node(
                    "ForStatement",
                    span,
                    json!({
                        "init": init,
                        "test": self.emit_opt_expr(test.as_deref()),
                        "update": self.emit_opt_expr(update.as_deref()),
                        "body": self.emit_stmt(body),
                    }),
                )
            }
            StmtKind::ForIn { left, right, body } => self.node(
                "ForInStatement",
                span,
                json!({
                    "left": self.emit_for_head(left),
                    "right": self.emit_expr(right),
                    "body": self.emit_stmt(body),
                }),
            ),
            StmtKind::ForOf { left, right, body, is_await } => self.node(
                "ForOfStatement",
                span,
                json!({
                    "await": is_await,
                    "left": self.emit_for_head(left),
                    "right": self.emit_expr(right),
                    "body": self.emit_stmt(body),
                }),
            ),
            StmtKind::Import(decl) => self.emit_import(decl, span),
            StmtKind::Export(decl) => self.emit_export(decl, span),
        }
    }

    fn emit_var_decl(&self, decl: &VarDecl) -> Value {
        let declarations: Vec<Value> = decl
            .decls
            .iter()
            .map(|d| {
                self.node(
                    "VariableDeclarator",
                    d.span,
                    json!({ "id": self.emit_pattern(&d.id), "init": self.emit_opt_expr(d.init.as_ref()) }),
                )
            })
            .collect();
        self.node(
            "VariableDeclaration",
            decl.span,
            json!({ "declarations": declarations, "kind": decl.kind.as_str() }),
        )
    }

    fn emit_for_head(&self, head: &ForHead) -> Value {
        match head {
            ForHead::Var(decl) => self.emit_var_decl(decl),
            ForHead::Pattern(pattern) => self.emit_pattern(pattern),
        }
    }

    // =========================================================================
    // Modules
    // =========================================================================

    fn emit_attributes(&self, attributes: &[ImportAttribute]) -> Value {
        Value::Array(
            attributes
                .iter()
                .map(|a| {
                    self.node(
                        "ImportAttribute",
                        a.span,
                        json!({ "key": self.emit_expr(&a.key), "value": self.emit_expr(&a.value) }),
                    )
                })
                .collect(),
        )
    }

    fn emit_import(&self, decl: &ImportDecl, span: Span) -> Value {
        let specifiers: Vec<Value> = decl
            .specifiers
            .iter()
            .map(|spec| match spec {
                ImportSpecifier::Default { local, span } => {
                    self.node("ImportDefaultSpecifier", *span, json!({ "local": self.ident(local) }))
                }
                ImportSpecifier::Namespace { local, span } => {
                    self.node("ImportNamespaceSpecifier", *span, json!({ "local": self.ident(local) }))
                }
                ImportSpecifier::Named { imported, local, span } => self.node(
                    "ImportSpecifier",
                    *span,
                    json!({ "imported": self.emit_expr(imported), "local": self.ident(local) }),
                ),
            })
            .collect();
        self.node(
            "ImportDeclaration",
            span,
            json!({
                "specifiers": specifiers,
                "source": self.emit_expr(&decl.source),
                "attributes": self.emit_attributes(&decl.attributes),
            }),
        )
    }

    fn emit_export(&self, decl: &ExportDecl, span: Span) -> Value {
        match decl {
            ExportDecl::Named { declaration, specifiers, source, attributes } => {
                let specifiers: Vec<Value> = specifiers
                    .iter()
                    .map(|s| {
                        self.node(
                            "ExportSpecifier",
                            s.span,
                            json!({ "local": self.emit_expr(&s.local), "exported": self.emit_expr(&s.exported) }),
                        )
                    })
                    .collect();
                self.node(
                    "ExportNamedDeclaration",
                    span,
                    json!({
                        "declaration": declaration.as_deref().map_or(Value::Null, |s| self.emit_stmt(s)),
                        "specifiers": specifiers,
                        "source": self.emit_opt_expr(source.as_ref()),
                        "attributes": self.emit_attributes(attributes),
                    }),
                )
            }
            ExportDecl::Default(default) => {
                let declaration = match default {
                    DefaultDecl::Function(function) => self.emit_function("FunctionDeclaration", function),
                    DefaultDecl::Class(class) => self.emit_class("ClassDeclaration", class),
                    DefaultDecl::Expr(expr) => self.emit_expr(expr),
                };
                self.node("ExportDefaultDeclaration", span, json!({ "declaration": declaration }))
            }
            ExportDecl::All { exported, source, attributes } => self.node(
                "ExportAllDeclaration",
                span,
                json!({
                    "exported": self.emit_opt_expr(exported.as_ref()),
                    "source": self.emit_expr(source),
                    "attributes": self.emit_attributes(attributes),
                }),
            ),
        }
    }

    // =========================================================================
    // Functions and Classes
    // =========================================================================

    fn emit_params(&self, params: &[Pattern]) -> Value {
        Value::Array(params.iter().map(|p| self.emit_pattern(p)).collect())
    }

    fn emit_function(&self, kind: &str, function: &Function) -> Value {
        self.node(
            kind,
            function.span,
            json!({
                "id": self.opt_ident(function.id.as_ref()),
                "expression": false,
                "generator": function.is_generator,
                "async": function.is_async,
                "params": self.emit_params(&function.params),
                "body": self.emit_block(&function.body),
            }),
        )
    }

    fn emit_arrow(&self, arrow: &ArrowFunction) -> Value {
        let (expression, body) = match &arrow.body {
            ArrowBody::Expr(expr) => (true, self.emit_expr(expr)),
            ArrowBody::Block(block) => (false, self.emit_block(block)),
        };
        self.node(
            "ArrowFunctionExpression",
            arrow.span,
            json!({
                "id": null,
                "expression": expression,
                "generator": false,
                "async": arrow.is_async,
                "params": self.emit_params(&arrow.params),
                "body": body,
            }),
        )
    }

    fn emit_class(&self, kind: &str, class: &Class) -> Value {
        let members: Vec<Value> = class.body.iter().map(|m| self.emit_class_member(m)).collect();
        self.node(
            kind,
            class.span,
            json!({
                "id": self.opt_ident(class.id.as_ref()),
                "superClass": class.super_class.as_deref().map_or(Value::Null, |e| self.emit_expr(e)),
                "body": self.node("ClassBody", class.body_span, json!({ "body": members })),
            }),
        )
    }

    fn emit_class_member(&self, member: &ClassMember) -> Value {
        match &member.kind {
            ClassMemberKind::Method { key, value, kind, computed, is_static } => self.node(
                "MethodDefinition",
                member.span,
                json!({
                    "static": is_static,
                    "computed": computed,
                    "key": self.emit_expr(key),
                    "kind": kind.as_str(),
                    "value": self.emit_function("FunctionExpression", value),
                }),
            ),
            ClassMemberKind::Property { key, value, computed, is_static } => self.node(
                "PropertyDefinition",
                member.span,
                json!({
                    "static": is_static,
                    "computed": computed,
                    "key": self.emit_expr(key),
                    "value": self.emit_opt_expr(value.as_ref()),
                }),
            ),
            ClassMemberKind::StaticBlock(body) => {
                self.node("StaticBlock", member.span, json!({ "body": self.emit_stmts(body) }))
            }
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn emit_opt_expr(&self, expr: Option<&Expr>) -> Value {
        expr.map_or(Value::Null, |e| self.emit_expr(e))
    }

    fn emit_exprs(&self, exprs: &[Expr]) -> Value {
        Value::Array(exprs.iter().map(|e| self.emit_expr(e)).collect())
    }

    fn emit_expr(&self, expr: &Expr) -> Value {
        let span = expr.span;
        match &expr.kind {
            ExprKind::Null => self.literal(span, Value::Null, json!({})),
            ExprKind::Bool(value) => self.literal(span, Value::from(*value), json!({})),
            ExprKind::Number(n) => self.literal(span, number_value(*n), json!({})),
            ExprKind::String(s) => self.literal(span, Value::from(s.as_str()), json!({})),
            ExprKind::BigInt(digits) => self.literal(span, Value::Null, json!({ "bigint": digits })),
            ExprKind::Regex { pattern, flags } => self.literal(
                span,
                Value::Null,
                json!({ "regex": { "pattern": pattern, "flags": flags } }),
            ),
            ExprKind::Template(template) => self.emit_template(template),
            ExprKind::TaggedTemplate { tag, quasi } => self.node(
                "TaggedTemplateExpression",
                span,
                json!({ "tag": self.emit_expr(tag), "quasi": self.emit_template(quasi) }),
            ),
            ExprKind::Ident(name) => self.node("Identifier", span, json!({ "name": name })),
            ExprKind::PrivateName(name) => self.node("PrivateIdentifier", span, json!({ "name": name })),
            ExprKind::This => self.node("ThisExpression", span, json!({})),
            ExprKind::Super => self.node("Super", span, json!({})),
            ExprKind::Array(elements) => {
                let elements: Vec<Value> = elements.iter().map(|e| self.emit_opt_expr(e.as_ref())).collect();
                self.node("ArrayExpression", span, json!({ "elements": elements }))
            }
            ExprKind::Object(members) => {
                let properties: Vec<Value> = members
                    .iter()
                    .map(|member| match member {
                        ObjectMember::Property(property) => self.emit_property(property),
                        ObjectMember::Spread(spread) => self.emit_expr(spread),
                    })
                    .collect();
                self.node("ObjectExpression", span, json!({ "properties": properties }))
            }
            ExprKind::Function(function) => self.emit_function("FunctionExpression", function),
            ExprKind::Arrow(arrow) => self.emit_arrow(arrow),
            ExprKind::Class(class) => self.emit_class("ClassExpression", class),
            ExprKind::Unary { op, arg } => self.node(
                "UnaryExpression",
                span,
                json!({ "operator": op.as_str(), "prefix": true, "argument": self.emit_expr(arg) }),
            ),
            ExprKind::Binary { op, left, right } => {
                let kind = if op.is_logical() { "LogicalExpression" } else { "BinaryExpression" };
                self.node(
                    kind,
                    span,
                    json!({ "left": self.emit_expr(left), "operator": op.as_str(), "right": self.emit_expr(right) }),
                )
            }
            ExprKind::Assign { op, left, right } => self.node(
                "AssignmentExpression",
                span,
                json!({ "operator": op.as_str(), "left": self.emit_pattern(left), "right": self.emit_expr(right) }),
            ),
            ExprKind::Update { op, prefix, arg } => self.node(
                "UpdateExpression",
                span,
                json!({ "operator": op.as_str(), "prefix": prefix, "argument": self.emit_expr(arg) }),
            ),
            ExprKind::Conditional { test, consequent, alternate } => self.node(
                "ConditionalExpression",
                span,
                json!({
                    "test": self.emit_expr(test),
                    "consequent": self.emit_expr(consequent),
                    "alternate": self.emit_expr(alternate),
                }),
            ),
            ExprKind::Sequence(exprs) => self.node("SequenceExpression", span, json!({ "expressions": self.emit_exprs(exprs) })),
            ExprKind::Member { object, property, optional } => {
                let (property, computed) = match property {
                    MemberProp::Ident(id) => (self.ident(id), false),
                    MemberProp::Private(id) => (self.node("PrivateIdentifier", id.span, json!({ "name": id.name })), false),
                    MemberProp::Computed(expr) => (self.emit_expr(expr), true),
                };
                self.node(
                    "MemberExpression",
                    span,
                    json!({
                        "object": self.emit_expr(object),
                        "property": property,
                        "computed": computed,
                        "optional": optional,
                    }),
                )
            }
            ExprKind::Call { callee, args, optional } => self.node(
                "CallExpression",
                span,
                json!({ "callee": self.emit_expr(callee), "arguments": self.emit_exprs(args), "optional": optional }),
            ),
            ExprKind::Chain(inner) => self.node("ChainExpression", span, json!({ "expression": self.emit_expr(inner) })),
            ExprKind::New { callee, args } => self.node(
                "NewExpression",
                span,
                json!({ "callee": self.emit_expr(callee), "arguments": self.emit_exprs(args) }),
            ),
            ExprKind::Spread(arg) => self.node("SpreadElement", span, json!({ "argument": self.emit_expr(arg) })),
            ExprKind::Yield { arg, delegate } => self.node(
                "YieldExpression",
                span,
                json!({ "delegate": delegate, "argument": self.emit_opt_expr(arg.as_deref()) }),
            ),
            ExprKind::Await(arg) => self.node("AwaitExpression", span, json!({ "argument": self.emit_expr(arg) })),
            ExprKind::Import { source, options } => {
                let mut fields = json!({ "source": self.emit_expr(source) });
                if let Some(options) = options {
                    fields["options"] = self.emit_expr(options);
                }
                self.node("ImportExpression", span, fields)
            }
            ExprKind::MetaProperty { meta, property } => self.node(
                "MetaProperty",
                span,
                json!({ "meta": self.ident(meta), "property": self.ident(property) }),
            ),
        }
    }

    fn emit_property(&self, property: &Property) -> Value {
        let (kind, method) = match property.kind {
            PropertyKind::Init => ("init", false),
            PropertyKind::Method => ("init", true),
            PropertyKind::Get => ("get", false),
            PropertyKind::Set => ("set", false),
        };
        self.node(
            "Property",
            property.span,
            json!({
                "method": method,
                "shorthand": property.shorthand,
                "computed": property.computed,
                "key": self.emit_expr(&property.key),
                "value": self.emit_expr(&property.value),
                "kind": kind,
            }),
        )
    }

    fn emit_template(&self, template: &TemplateLiteral) -> Value {
        let quasis: Vec<Value> = template
            .quasis
            .iter()
            .map(|q| {
                self.node(
                    "TemplateElement",
                    q.span,
                    json!({ "value": { "raw": q.raw, "cooked": q.cooked }, "tail": q.tail }),
                )
            })
            .collect();
        self.node(
            "TemplateLiteral",
            template.span,
            json!({ "expressions": self.emit_exprs(&template.exprs), "quasis": quasis }),
        )
    }

    // =========================================================================
    // Patterns
    // =========================================================================

    fn emit_pattern(&self, pattern: &Pattern) -> Value {
        let span = pattern.span;
        match &pattern.kind {
            PatternKind::Ident(name) => self.node("Identifier", span, json!({ "name": name })),
            PatternKind::Member(expr) => self.emit_expr(expr),
            PatternKind::Array(elements) => {
                let elements: Vec<Value> = elements
                    .iter()
                    .map(|e| e.as_ref().map_or(Value::Null, |p| self.emit_pattern(p)))
                    .collect();
                self.node("ArrayPattern", span, json!({ "elements": elements }))
            }
            PatternKind::Object(props) => {
                let properties: Vec<Value> = props
                    .iter()
                    .map(|prop| match prop {
                        ObjectPatternProp::Property(p) => self.node(
                            "Property",
                            p.span,
                            json!({
                                "method": false,
                                "shorthand": p.shorthand,
                                "computed": p.computed,
                                "key": self.emit_expr(&p.key),
                                "value": self.emit_pattern(&p.value),
                                "kind": "init",
                            }),
                        ),
                        ObjectPatternProp::Rest(rest) => self.emit_pattern(rest),
                    })
                    .collect();
                self.node("ObjectPattern", span, json!({ "properties": properties }))
            }
            PatternKind::Assign { left, right } => self.node(
                "AssignmentPattern",
                span,
                json!({ "left": self.emit_pattern(left), "right": self.emit_expr(right) }),
            ),
            PatternKind::Rest(arg) => self.node("RestElement", span, json!({ "argument": self.emit_pattern(arg) })),
        }
    }
}

/// Integral values below 2^53 are emitted as JSON integers; other finite
/// values as floats; non-finite values (`1e400`) as null.
fn number_value(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER {
        return Value::from(n as i64);
    }
    serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn estree(source: &str, options: ParserOptions) -> Value {
        Parser::new(source, options).unwrap().parse().unwrap().to_estree()
    }

    #[test]
    fn test_number_values() {
        assert_eq!(number_value(1.0), json!(1));
        assert_eq!(number_value(0.5), json!(0.5));
        assert_eq!(number_value(f64::INFINITY), Value::Null);
        assert_eq!(number_value(1e300), json!(1e300));
    }

    #[test]
    fn test_literals() {
        let options = ParserOptions::default().with_raw(true);
        let tree = estree("0x10; 'a'; /b/g; 10n; null", options);
        let body = &tree["body"];
        assert_eq!(body[0]["expression"]["value"], json!(16));
        assert_eq!(body[0]["expression"]["raw"], json!("0x10"));
        assert_eq!(body[1]["expression"]["value"], json!("a"));
        assert_eq!(body[2]["expression"]["regex"]["flags"], json!("g"));
        assert_eq!(body[3]["expression"]["bigint"], json!("10"));
        assert_eq!(body[4]["expression"]["value"], Value::Null);
    }

    #[test]
    fn test_directive_field() {
        let tree = estree("'use strict'; 'a'", ParserOptions::default());
        assert_eq!(tree["body"][0]["directive"], json!("use strict"));
        assert_eq!(tree["body"][1]["directive"], json!("a"));
        let tree = estree("('a')", ParserOptions::default());
        assert!(tree["body"][0].get("directive").is_none());
    }

    #[test]
    fn test_locations_and_ranges() {
        let options = ParserOptions::default().with_loc(true).with_ranges(true);
        let tree = estree("a;\n  b;", options);
        let second = &tree["body"][1];
        assert_eq!(second["loc"]["start"], json!({ "line": 2, "column": 2 }));
        assert_eq!(second["range"], json!([5, 7]));
        assert!(estree("a", ParserOptions::default())["body"][0].get("loc").is_none());
    }

    #[test]
    fn test_utf16_offsets() {
        // "😀" is four bytes but two UTF-16 units.
        let tree = estree("'😀'; x", ParserOptions::default());
        assert_eq!(tree["body"][0]["end"], json!(5));
        assert_eq!(tree["body"][1]["start"], json!(6));
        assert_eq!(tree["end"], json!(7));
    }

    #[test]
    fn test_logical_and_chain() {
        let tree = estree("a && b; a?.b", ParserOptions::default());
        assert_eq!(tree["body"][0]["expression"]["type"], json!("LogicalExpression"));
        let chain = &tree["body"][1]["expression"];
        assert_eq!(chain["type"], json!("ChainExpression"));
        assert_eq!(chain["expression"]["optional"], json!(true));
    }

    #[test]
    fn test_methods() {
        let tree = estree("({ m(a) {}, get x() {} })", ParserOptions::default());
        let props = &tree["body"][0]["expression"]["properties"];
        assert_eq!(props[0]["method"], json!(true));
        assert_eq!(props[0]["value"]["type"], json!("FunctionExpression"));
        assert_eq!(props[0]["value"]["start"], json!(4));
        assert_eq!(props[1]["kind"], json!("get"));
    }

    #[test]
    fn test_comments() {
        let options = ParserOptions::default().with_comments(true);
        let tree = estree("// a\n/* b */ x", options);
        assert_eq!(tree["comments"][0]["type"], json!("Line"));
        assert_eq!(tree["comments"][1]["value"], json!(" b "));
    }
}
