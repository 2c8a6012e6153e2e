//! Functions, arrow functions, classes, and module declarations.

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::ast::*;
use crate::context::Context;
use crate::error::ParseError;
use crate::expr::Cover;
use crate::parser::Parser;
use crate::pattern::BoundNames;
use crate::scope::{DeclKind, PrivateKind, ScopeKind};
use crate::span::Span;
use crate::token::TokenKind;

/// How a function's parameter list is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionKind {
    /// Declarations and expressions.
    Plain,
    /// Object and class methods, including accessors.
    Method(PropertyKind),
}

impl<'a> Parser<'a> {
    // =========================================================================
    // Functions
    // =========================================================================

    /// Parse a function declaration; `async` has already been consumed.
    ///
    /// With `single_statement` the declaration is the body of an `if` or a
    /// label (Annex B), where only plain functions are allowed.
    pub(crate) fn parse_function_declaration(
        &mut self,
        ctx: Context,
        start: u32,
        is_async: bool,
        single_statement: bool,
    ) -> Result<Function, ParseError> {
        self.parse_declared_function(ctx, start, is_async, single_statement, false)
    }

    fn parse_declared_function(
        &mut self,
        ctx: Context,
        start: u32,
        is_async: bool,
        single_statement: bool,
        optional_name: bool,
    ) -> Result<Function, ParseError> {
        self.expect(&TokenKind::Function)?;
        let is_generator = self.eat(&TokenKind::Star)?;
        if single_statement && (is_async || is_generator) {
            return Err(self.error_at(
                self.span_from(start),
                "Async and generator functions are not allowed in this statement position",
            ));
        }

        let id = if optional_name && !matches!(self.peek(), TokenKind::Identifier(_)) {
            None
        } else {
            let id = self.parse_binding_identifier(ctx)?;
            let kind = self.scopes.function_decl_kind(!is_async && !is_generator);
            self.declare(&id.name, id.span, kind, ctx)?;
            Some(id)
        };

        self.parse_function_rest(ctx, start, id, is_async, is_generator, FunctionKind::Plain, Context::NONE)
    }

    /// Parse a function expression starting at `function` (after any `async`).
    pub(crate) fn parse_function_expr(&mut self, ctx: Context, start: u32, is_async: bool) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::Function)?;
        let is_generator = self.eat(&TokenKind::Star)?;

        // The name of a function expression is scoped to the function itself.
        let id = if matches!(self.peek(), TokenKind::Identifier(_)) {
            let name_ctx = ctx
                .without(Context::IN_GENERATOR | Context::IN_ASYNC | Context::IN_STATIC_BLOCK)
                .set(Context::IN_GENERATOR, is_generator)
                .set(Context::IN_ASYNC, is_async);
            Some(self.parse_binding_identifier(name_ctx)?)
        } else {
            None
        };

        let function = self.parse_function_rest(ctx, start, id, is_async, is_generator, FunctionKind::Plain, Context::NONE)?;
        Ok(Expr::new(ExprKind::Function(Box::new(function)), self.span_from(start)))
    }

    /// Parse the parameters and body of a method. The function spans from
    /// `(` to `}`.
    pub(crate) fn parse_method_function(
        &mut self,
        ctx: Context,
        is_async: bool,
        is_generator: bool,
        kind: PropertyKind,
        super_flags: Context,
    ) -> Result<Function, ParseError> {
        let start = self.current.span.start;
        self.parse_function_rest(ctx, start, None, is_async, is_generator, FunctionKind::Method(kind), super_flags)
    }

    fn parse_function_rest(
        &mut self,
        ctx: Context,
        start: u32,
        id: Option<Identifier>,
        is_async: bool,
        is_generator: bool,
        kind: FunctionKind,
        super_flags: Context,
    ) -> Result<Function, ParseError> {
        let fn_ctx = ctx
            .without(Context::FUNCTION_RESET | Context::ALLOW_SUPER_PROPERTY | Context::ALLOW_SUPER_CALL)
            .with(Context::IN_FUNCTION | Context::ALLOW_NEW_TARGET | Context::ALLOW_RETURN)
            .with(super_flags)
            .set(Context::IN_GENERATOR, is_generator)
            .set(Context::IN_ASYNC, is_async);

        let outer_labels = std::mem::take(&mut self.labels);
        self.scopes.push(ScopeKind::Function);

        let params_start = self.current.span.start;
        let (params, names, simple) = self.parse_formal_params(fn_ctx)?;
        let params_span = self.span_from(params_start);
        match kind {
            FunctionKind::Method(PropertyKind::Get) if !params.is_empty() => {
                return Err(self.error_at(params_span, "Getter must not have any formal parameters"));
            }
            FunctionKind::Method(PropertyKind::Set) => {
                if params.len() != 1 {
                    return Err(self.error_at(params_span, "Setter must have exactly one formal parameter"));
                }
                if matches!(params[0].kind, PatternKind::Rest(_)) {
                    return Err(self.error_at(params[0].span, "Setter function argument must not be a rest parameter"));
                }
            }
            _ => {}
        }

        let body_start = self.current.span.start;
        let (body, use_strict) = self.parse_function_body(fn_ctx)?;
        if use_strict {
            if !simple {
                return Err(self.error_at(
                    Span::new(body_start, body.span.end),
                    "Illegal 'use strict' directive in function with non-simple parameter list",
                ));
            }
            if !fn_ctx.is_strict() {
                if let Some(id) = &id {
                    self.check_binding_name(&id.name, id.span, Context::STRICT)?;
                }
                self.recheck_strict_params(&names)?;
            }
        }

        let strict = fn_ctx.is_strict() || use_strict;
        if strict || !simple || is_async || is_generator || kind != FunctionKind::Plain {
            self.check_duplicate_params(&names)?;
        }

        self.scopes.pop();
        self.labels = outer_labels;

        Ok(Function {
            id,
            params,
            body,
            is_async,
            is_generator,
            span: self.span_from(start),
        })
    }

    /// Parse `(a, [b], c = 1, ...d)` and declare the bound names in the
    /// current (function) scope. Returns the parameters, their bound names,
    /// and whether the list is simple.
    fn parse_formal_params(&mut self, fn_ctx: Context) -> Result<(Vec<Pattern>, BoundNames, bool), ParseError> {
        let ctx = fn_ctx.with(Context::IN_PARAMETERS);
        self.expect(&TokenKind::LParen)?;

        let mut params = Vec::new();
        let mut names = BoundNames::new();
        let mut simple = true;
        while !self.check(&TokenKind::RParen) {
            if self.check(&TokenKind::Spread) {
                params.push(self.parse_binding_rest(ctx, &mut names)?);
                simple = false;
                if !self.check(&TokenKind::RParen) {
                    return Err(self.error_at(self.current.span, "Rest parameter must be last formal parameter"));
                }
                break;
            }
            let param = self.parse_binding_element(ctx, &mut names)?;
            simple &= matches!(param.kind, PatternKind::Ident(_));
            params.push(param);
            if !self.check(&TokenKind::RParen) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RParen)?;

        for (name, span) in &names {
            self.declare(name, *span, DeclKind::Param, ctx)?;
        }
        Ok((params, names, simple))
    }

    /// Parse `{ directives statements }`. Returns the block and whether its
    /// prologue contains `"use strict"`.
    fn parse_function_body(&mut self, fn_ctx: Context) -> Result<(BlockStmt, bool), ParseError> {
        let start = self.current.span.start;
        self.expect(&TokenKind::LBrace)?;
        let (mut body, use_strict) = self.parse_directives(fn_ctx)?;
        let ctx = fn_ctx.set(Context::STRICT, fn_ctx.is_strict() || use_strict);
        self.parse_statement_list(ctx, &mut body)?;
        self.expect(&TokenKind::RBrace)?;
        Ok((BlockStmt { body, span: self.span_from(start) }, use_strict))
    }

    fn check_duplicate_params(&self, names: &BoundNames) -> Result<(), ParseError> {
        let mut seen = FxHashSet::default();
        for (name, span) in names {
            if !seen.insert(name.as_str()) {
                return Err(self.error_at(*span, "Duplicate parameter name not allowed in this context"));
            }
        }
        Ok(())
    }

    /// A `"use strict"` body makes its parameter names strict too.
    fn recheck_strict_params(&self, names: &BoundNames) -> Result<(), ParseError> {
        for (name, span) in names {
            self.check_binding_name(name, *span, Context::STRICT)?;
        }
        Ok(())
    }

    // =========================================================================
    // Arrow Functions
    // =========================================================================

    /// Parse `=> body` for already-parsed parameters.
    ///
    /// `params` are the covered expressions between the parentheses (or the
    /// single identifier) and `list_cover` what was learned parsing them.
    pub(crate) fn parse_arrow_function(
        &mut self,
        ctx: Context,
        start: u32,
        params: Vec<Expr>,
        is_async: bool,
        list_cover: Cover,
    ) -> Result<Expr, ParseError> {
        if self.current.newline_before {
            return Err(self.error_at(self.current.span, "Line terminator not permitted before arrow"));
        }
        if let Some(span) = list_cover.yield_await {
            return Err(self.error_at(span, "Arrow parameters cannot contain yield or await expressions"));
        }
        if is_async {
            if let Some(span) = list_cover.await_ident {
                return Err(self.error_at(span, "'await' is not a valid identifier name in an async function"));
            }
        }
        self.expect(&TokenKind::Arrow)?;

        let param_ctx = if is_async { ctx.with(Context::IN_ASYNC) } else { ctx };
        let mut names = BoundNames::new();
        let params = self.to_arrow_params(params, &list_cover, param_ctx, &mut names)?;
        let simple = params.iter().all(|p| matches!(p.kind, PatternKind::Ident(_)));
        self.check_duplicate_params(&names)?;

        let body_ctx = ctx
            .without(
                Context::IN_GENERATOR
                    | Context::IN_ASYNC
                    | Context::IN_PARAMETERS
                    | Context::IN_ITERATION
                    | Context::IN_SWITCH
                    | Context::TOP_LEVEL,
            )
            .set(Context::IN_ASYNC, is_async);

        let outer_labels = std::mem::take(&mut self.labels);
        self.scopes.push(ScopeKind::Function);
        for (name, span) in &names {
            self.declare(name, *span, DeclKind::Param, body_ctx)?;
        }

        let body = if self.check(&TokenKind::LBrace) {
            let block_ctx = body_ctx.without(Context::DISALLOW_IN).with(Context::ALLOW_RETURN);
            let body_start = self.current.span.start;
            let (block, use_strict) = self.parse_function_body(block_ctx)?;
            if use_strict {
                if !simple {
                    return Err(self.error_at(
                        Span::new(body_start, block.span.end),
                        "Illegal 'use strict' directive in function with non-simple parameter list",
                    ));
                }
                if !block_ctx.is_strict() {
                    self.recheck_strict_params(&names)?;
                }
            }
            ArrowBody::Block(block)
        } else {
            ArrowBody::Expr(Box::new(self.parse_assign_expr(body_ctx)?))
        };

        self.scopes.pop();
        self.labels = outer_labels;

        Ok(Expr::new(
            ExprKind::Arrow(Box::new(ArrowFunction {
                params,
                body,
                is_async,
                span: self.span_from(start),
            })),
            self.span_from(start),
        ))
    }

    // =========================================================================
    // Classes
    // =========================================================================

    /// Parse a class declaration or expression. Class code is always strict.
    ///
    /// Declarations need a name unless they are `export default class`.
    pub(crate) fn parse_class(&mut self, ctx: Context, is_declaration: bool, default_export: bool) -> Result<Class, ParseError> {
        let start = self.current.span.start;
        self.expect(&TokenKind::Class)?;
        let class_ctx = ctx.with(Context::STRICT);

        let id = if matches!(self.peek(), TokenKind::Identifier(_)) {
            let id = self.parse_binding_identifier(class_ctx)?;
            if is_declaration {
                self.declare(&id.name, id.span, DeclKind::Class, ctx)?;
            }
            Some(id)
        } else if is_declaration && !default_export {
            return Err(self.error_at(self.current.span, "A class declaration must have a name"));
        } else {
            None
        };

        let super_class = if self.eat(&TokenKind::Extends)? {
            let mut cover = Cover::default();
            let heritage = self.parse_lhs_expr(class_ctx, &mut cover)?;
            self.finish_cover(&mut Cover::default(), cover)?;
            Some(Box::new(heritage))
        } else {
            None
        };

        self.private_names.enter_class();
        let body_start = self.current.span.start;
        self.expect(&TokenKind::LBrace)?;
        let mut body = Vec::new();
        let mut has_constructor = false;
        while !self.check(&TokenKind::RBrace) {
            if self.eat(&TokenKind::Semicolon)? {
                continue;
            }
            body.push(self.parse_class_member(class_ctx, super_class.is_some(), &mut has_constructor)?);
        }
        self.expect(&TokenKind::RBrace)?;
        let body_span = self.span_from(body_start);

        if let Err((message, span)) = self.private_names.exit_class() {
            return Err(self.error_at(span, message));
        }
        trace!(members = body.len(), "class body");

        Ok(Class {
            id,
            super_class,
            body,
            body_span,
            span: self.span_from(start),
        })
    }

    fn parse_class_member(&mut self, ctx: Context, derived: bool, has_constructor: &mut bool) -> Result<ClassMember, ParseError> {
        let start = self.current.span.start;

        let mut is_static = false;
        if self.is_contextual("static") {
            if self.lookahead()?.kind == TokenKind::LBrace {
                return self.parse_static_block(ctx, start);
            }
            if !self.modifier_is_name()? {
                self.advance()?;
                is_static = true;
            }
        }

        let mut is_async = false;
        let mut is_generator = false;
        let mut accessor = None;
        if self.is_contextual("async") && !self.modifier_is_name()? && !self.lookahead()?.newline_before {
            self.advance()?;
            is_async = true;
        }
        if self.eat(&TokenKind::Star)? {
            is_generator = true;
        }
        if !is_async && !is_generator && (self.is_contextual("get") || self.is_contextual("set")) && !self.modifier_is_name()? {
            accessor = Some(if self.is_contextual("get") { PropertyKind::Get } else { PropertyKind::Set });
            self.advance()?;
        }

        // Key
        let (key, computed, private) = if let TokenKind::PrivateName(name) = self.peek() {
            let name = name.clone();
            let token = self.advance()?;
            if name == "constructor" {
                return Err(self.error_at(token.span, "Classes may not have a private field named '#constructor'"));
            }
            (Expr::new(ExprKind::PrivateName(name.clone()), token.span), false, Some(name))
        } else {
            let mut cover = Cover::default();
            let (key, computed) = self.parse_property_key(ctx, &mut cover)?;
            self.finish_cover(&mut Cover::default(), cover)?;
            (key, computed, None)
        };
        let key_name = if computed || private.is_some() { None } else { key.static_name() };
        if is_static && key_name.as_deref() == Some("prototype") {
            return Err(self.error_at(key.span, "Classes may not have a static property named 'prototype'"));
        }

        // Method
        if accessor.is_some() || is_async || is_generator || self.check(&TokenKind::LParen) {
            let is_constructor = !is_static && key_name.as_deref() == Some("constructor");
            let kind = if is_constructor {
                if accessor.is_some() || is_async || is_generator {
                    return Err(self.error_at(key.span, "Class constructor may not be an accessor, async or generator"));
                }
                if *has_constructor {
                    return Err(self.error_at(key.span, "A class may only have one constructor"));
                }
                *has_constructor = true;
                MethodKind::Constructor
            } else {
                match accessor {
                    Some(PropertyKind::Get) => MethodKind::Get,
                    Some(PropertyKind::Set) => MethodKind::Set,
                    _ => MethodKind::Method,
                }
            };

            if let Some(name) = &private {
                let private_kind = match kind {
                    MethodKind::Get => PrivateKind::Getter,
                    MethodKind::Set => PrivateKind::Setter,
                    _ => PrivateKind::Method,
                };
                self.declare_private(name, private_kind, is_static, key.span)?;
            }

            let mut super_flags = Context::ALLOW_SUPER_PROPERTY;
            if is_constructor && derived {
                super_flags = super_flags.with(Context::ALLOW_SUPER_CALL);
            }
            let value = self.parse_method_function(
                ctx,
                is_async,
                is_generator,
                accessor.unwrap_or(PropertyKind::Method),
                super_flags,
            )?;
            return Ok(ClassMember {
                kind: ClassMemberKind::Method { key, value, kind, computed, is_static },
                span: self.span_from(start),
            });
        }

        // Field
        if key_name.as_deref() == Some("constructor") {
            return Err(self.error_at(key.span, "Classes may not have a field named 'constructor'"));
        }
        if let Some(name) = &private {
            self.declare_private(name, PrivateKind::Field, is_static, key.span)?;
        }
        let value = if self.eat(&TokenKind::Eq)? {
            let field_ctx = ctx
                .without(Context::FUNCTION_RESET | Context::ALLOW_SUPER_CALL | Context::ALLOW_RETURN)
                .with(Context::IN_CLASS_FIELD | Context::ALLOW_SUPER_PROPERTY | Context::ALLOW_NEW_TARGET);
            Some(self.parse_assign_expr(field_ctx)?)
        } else {
            None
        };
        self.expect_semicolon()?;

        Ok(ClassMember {
            kind: ClassMemberKind::Property { key, value, computed, is_static },
            span: self.span_from(start),
        })
    }

    fn parse_static_block(&mut self, ctx: Context, start: u32) -> Result<ClassMember, ParseError> {
        self.advance()?; // static
        self.expect(&TokenKind::LBrace)?;

        let block_ctx = ctx
            .without(Context::FUNCTION_RESET | Context::ALLOW_SUPER_CALL | Context::ALLOW_RETURN)
            .with(Context::IN_STATIC_BLOCK | Context::ALLOW_SUPER_PROPERTY | Context::ALLOW_NEW_TARGET);
        let outer_labels = std::mem::take(&mut self.labels);
        self.scopes.push(ScopeKind::StaticBlock);
        let mut body = Vec::new();
        self.parse_statement_list(block_ctx, &mut body)?;
        self.scopes.pop();
        self.labels = outer_labels;
        self.expect(&TokenKind::RBrace)?;

        Ok(ClassMember {
            kind: ClassMemberKind::StaticBlock(body),
            span: self.span_from(start),
        })
    }

    fn declare_private(&mut self, name: &str, kind: PrivateKind, is_static: bool, span: Span) -> Result<(), ParseError> {
        self.private_names
            .declare(name, kind, is_static)
            .map_err(|message| self.error_at(span, message))
    }

    // =========================================================================
    // Imports
    // =========================================================================

    /// Parse an import declaration.
    pub(crate) fn parse_import_decl(&mut self, ctx: Context) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        if !ctx.is_module() || !ctx.contains(Context::TOP_LEVEL) {
            return Err(self.module_item_error(ctx));
        }
        self.advance()?; // import

        let mut specifiers = Vec::new();
        if !matches!(self.peek(), TokenKind::String(_)) {
            // Default import
            let mut need_more = true;
            if matches!(self.peek(), TokenKind::Identifier(_)) {
                let local = self.parse_import_binding(ctx)?;
                let span = local.span;
                specifiers.push(ImportSpecifier::Default { local, span });
                need_more = self.eat(&TokenKind::Comma)?;
            }

            if need_more {
                match self.peek() {
                    TokenKind::Star => {
                        let ns_start = self.current.span.start;
                        self.advance()?;
                        self.expect_contextual("as")?;
                        let local = self.parse_import_binding(ctx)?;
                        specifiers.push(ImportSpecifier::Namespace { local, span: self.span_from(ns_start) });
                    }
                    TokenKind::LBrace => self.parse_named_imports(ctx, &mut specifiers)?,
                    _ => return Err(self.unexpected()),
                }
            }
            self.expect_contextual("from")?;
        }

        let source = self.parse_module_source()?;
        let attributes = self.parse_import_attributes(ctx)?;
        self.expect_semicolon()?;

        Ok(Stmt::new(
            StmtKind::Import(Box::new(ImportDecl { specifiers, source, attributes })),
            self.span_from(start),
        ))
    }

    /// Parse `{ a, b as c, "d" as e }`.
    fn parse_named_imports(&mut self, ctx: Context, specifiers: &mut Vec<ImportSpecifier>) -> Result<(), ParseError> {
        self.expect(&TokenKind::LBrace)?;
        while !self.check(&TokenKind::RBrace) {
            let spec_start = self.current.span.start;
            let escaped = self.current.escaped;
            let imported = self.parse_module_export_name()?;
            let local = if self.is_contextual("as") {
                self.advance()?;
                self.parse_import_binding(ctx)?
            } else {
                let ExprKind::Ident(name) = &imported.kind else {
                    return Err(self.error_at(imported.span, "A string literal cannot be used as an imported binding"));
                };
                if escaped && crate::token::keyword_from_str(name).is_some() {
                    return Err(self.error_at(imported.span, "Keyword must not contain escaped characters"));
                }
                self.check_binding_name(name, imported.span, ctx)?;
                let local = Identifier::new(name.clone(), imported.span);
                self.declare(&local.name, local.span, DeclKind::Import, ctx)?;
                local
            };
            specifiers.push(ImportSpecifier::Named { imported, local, span: self.span_from(spec_start) });
            if !self.check(&TokenKind::RBrace) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(())
    }

    /// A local import binding, declared in the module scope.
    fn parse_import_binding(&mut self, ctx: Context) -> Result<Identifier, ParseError> {
        let local = self.parse_binding_identifier(ctx)?;
        self.declare(&local.name, local.span, DeclKind::Import, ctx)?;
        Ok(local)
    }

    /// ModuleExportName: an IdentifierName or a string literal.
    fn parse_module_export_name(&mut self) -> Result<Expr, ParseError> {
        if let TokenKind::String(value) = self.peek() {
            let value = value.clone();
            let token = self.advance()?;
            return Ok(Expr::new(ExprKind::String(value), token.span));
        }
        let id = self.parse_identifier_name()?;
        Ok(Expr::new(ExprKind::Ident(id.name), id.span))
    }

    fn parse_module_source(&mut self) -> Result<Expr, ParseError> {
        let TokenKind::String(value) = self.peek() else {
            return Err(self.unexpected());
        };
        let value = value.clone();
        let token = self.advance()?;
        Ok(Expr::new(ExprKind::String(value), token.span))
    }

    /// Parse `with { type: "json" }` (staged syntax).
    fn parse_import_attributes(&mut self, ctx: Context) -> Result<Vec<ImportAttribute>, ParseError> {
        if !self.check(&TokenKind::With) || !ctx.contains(Context::NEXT) {
            return Ok(Vec::new());
        }
        self.advance()?; // with
        self.expect(&TokenKind::LBrace)?;

        let mut attributes = Vec::new();
        let mut keys = FxHashSet::default();
        while !self.check(&TokenKind::RBrace) {
            let attr_start = self.current.span.start;
            let key = self.parse_module_export_name()?;
            let key_name = key.static_name().unwrap_or_default();
            if !keys.insert(key_name.clone()) {
                return Err(self.error_at(key.span, format!("Duplicate attribute key '{key_name}'")));
            }
            self.expect(&TokenKind::Colon)?;
            let value = self.parse_module_source()?;
            attributes.push(ImportAttribute { key, value, span: self.span_from(attr_start) });
            if !self.check(&TokenKind::RBrace) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(attributes)
    }

    // =========================================================================
    // Exports
    // =========================================================================

    /// Parse an export declaration.
    pub(crate) fn parse_export_decl(&mut self, ctx: Context) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        if !ctx.is_module() || !ctx.contains(Context::TOP_LEVEL) {
            return Err(self.module_item_error(ctx));
        }
        self.advance()?; // export

        let decl = match self.peek() {
            TokenKind::Star => {
                self.advance()?;
                let exported = if self.is_contextual("as") {
                    self.advance()?;
                    let exported = self.parse_module_export_name()?;
                    self.add_export(&exported)?;
                    Some(exported)
                } else {
                    None
                };
                self.expect_contextual("from")?;
                let source = self.parse_module_source()?;
                let attributes = self.parse_import_attributes(ctx)?;
                self.expect_semicolon()?;
                ExportDecl::All { exported, source, attributes }
            }
            TokenKind::Default => {
                let default_token = self.advance()?;
                if let Err(message) = self.exports.add_export("default") {
                    return Err(self.error_at(default_token.span, message));
                }
                ExportDecl::Default(self.parse_export_default(ctx)?)
            }
            TokenKind::LBrace => self.parse_export_clause(ctx)?,
            _ => {
                let declaration = self.parse_export_declaration(ctx)?;
                ExportDecl::Named {
                    declaration: Some(Box::new(declaration)),
                    specifiers: Vec::new(),
                    source: None,
                    attributes: Vec::new(),
                }
            }
        };

        Ok(Stmt::new(StmtKind::Export(Box::new(decl)), self.span_from(start)))
    }

    fn add_export(&mut self, exported: &Expr) -> Result<(), ParseError> {
        let name = exported.static_name().unwrap_or_default();
        self.exports
            .add_export(&name)
            .map_err(|message| self.error_at(exported.span, message))
    }

    /// `export default` followed by a function, class or expression.
    fn parse_export_default(&mut self, ctx: Context) -> Result<DefaultDecl, ParseError> {
        let start = self.current.span.start;
        if self.check(&TokenKind::Function) {
            let function = self.parse_declared_function(ctx, start, false, false, true)?;
            return Ok(DefaultDecl::Function(Box::new(function)));
        }
        if self.is_contextual("async") && self.is_async_function()? {
            self.advance()?; // async
            let function = self.parse_declared_function(ctx, start, true, false, true)?;
            return Ok(DefaultDecl::Function(Box::new(function)));
        }
        if self.check(&TokenKind::Class) {
            let class = self.parse_class(ctx, true, true)?;
            return Ok(DefaultDecl::Class(Box::new(class)));
        }
        let expr = self.parse_assign_expr(ctx)?;
        self.expect_semicolon()?;
        Ok(DefaultDecl::Expr(Box::new(expr)))
    }

    /// `export { a, b as c } [from "mod"];`
    fn parse_export_clause(&mut self, ctx: Context) -> Result<ExportDecl, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut specifiers = Vec::new();
        let mut local_tokens = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let spec_start = self.current.span.start;
            let escaped = self.current.escaped;
            let local = self.parse_module_export_name()?;
            let exported = if self.is_contextual("as") {
                self.advance()?;
                self.parse_module_export_name()?
            } else {
                local.clone()
            };
            self.add_export(&exported)?;
            local_tokens.push(escaped);
            specifiers.push(ExportSpecifier { local, exported, span: self.span_from(spec_start) });
            if !self.check(&TokenKind::RBrace) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RBrace)?;

        let (source, attributes) = if self.is_contextual("from") {
            self.advance()?;
            let source = self.parse_module_source()?;
            (Some(source), self.parse_import_attributes(ctx)?)
        } else {
            // Without `from`, local names refer to bindings of this module.
            for (spec, escaped) in specifiers.iter().zip(local_tokens) {
                let ExprKind::Ident(name) = &spec.local.kind else {
                    return Err(self.error_at(
                        spec.local.span,
                        "A string literal cannot be used as an exported binding without `from`",
                    ));
                };
                if escaped && crate::token::keyword_from_str(name).is_some() {
                    return Err(self.error_at(spec.local.span, "Keyword must not contain escaped characters"));
                }
                self.check_reference_name(name, spec.local.span, ctx)?;
                self.exports.add_local(name, spec.local.span);
            }
            (None, Vec::new())
        };
        self.expect_semicolon()?;

        Ok(ExportDecl::Named { declaration: None, specifiers, source, attributes })
    }

    /// `export var|let|const|using|function|async function|class ...`
    fn parse_export_declaration(&mut self, ctx: Context) -> Result<Stmt, ParseError> {
        let is_declaration = if matches!(
            self.peek(),
            TokenKind::Var | TokenKind::Const | TokenKind::Function | TokenKind::Class
        ) {
            true
        } else if self.is_contextual("let") {
            self.is_let_declaration()?
        } else if self.is_contextual("async") {
            self.is_async_function()?
        } else {
            self.is_using_declaration(ctx)?
        };
        if !is_declaration {
            return Err(self.unexpected());
        }

        let stmt = self.parse_statement_list_item(ctx)?;
        let mut names = BoundNames::new();
        match &stmt.kind {
            StmtKind::Var(decl) => {
                for declarator in &decl.decls {
                    collect_bound_names(&declarator.id, &mut names);
                }
            }
            StmtKind::Function(function) => names.extend(function.id.iter().map(|id| (id.name.clone(), id.span))),
            StmtKind::Class(class) => names.extend(class.id.iter().map(|id| (id.name.clone(), id.span))),
            _ => {}
        }
        for (name, span) in names {
            if let Err(message) = self.exports.add_export(&name) {
                return Err(self.error_at(span, message));
            }
        }
        Ok(stmt)
    }
}

/// Names bound by a declaration pattern.
fn collect_bound_names(pattern: &Pattern, names: &mut BoundNames) {
    match &pattern.kind {
        PatternKind::Ident(name) => names.push((name.clone(), pattern.span)),
        PatternKind::Member(_) => {}
        PatternKind::Array(elements) => {
            for element in elements.iter().flatten() {
                collect_bound_names(element, names);
            }
        }
        PatternKind::Object(props) => {
            for prop in props {
                match prop {
                    ObjectPatternProp::Property(property) => collect_bound_names(&property.value, names),
                    ObjectPatternProp::Rest(rest) => collect_bound_names(rest, names),
                }
            }
        }
        PatternKind::Assign { left, .. } => collect_bound_names(left, names),
        PatternKind::Rest(target) => collect_bound_names(target, names),
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::error::ParseError;
    use crate::options::ParserOptions;
    use crate::parser::Parser;

    fn parse(source: &str) -> Result<Program, ParseError> {
        Parser::new(source, ParserOptions::default())?.parse()
    }

    fn parse_module(source: &str) -> Result<Program, ParseError> {
        let options = ParserOptions { module: true, ..Default::default() };
        Parser::new(source, options)?.parse()
    }

    fn parse_next_module(source: &str) -> Result<Program, ParseError> {
        let options = ParserOptions { module: true, next: true, ..Default::default() };
        Parser::new(source, options)?.parse()
    }

    #[test]
    fn test_function_declaration() {
        let program = parse("async function* f(a, b = 1) { yield await a; }").unwrap();
        let StmtKind::Function(function) = &program.body[0].kind else { panic!() };
        assert!(function.is_async && function.is_generator);
        assert_eq!(function.params.len(), 2);
        assert_eq!(function.id.as_ref().unwrap().name, "f");
    }

    #[test]
    fn test_duplicate_params() {
        assert!(parse("function f(a, a) {}").is_ok());
        assert!(parse("'use strict'; function f(a, a) {}").is_err());
        assert!(parse("function f(a, a) { 'use strict' }").is_err());
        assert!(parse("function f(a, [a]) {}").is_err());
        assert!(parse("function* g(a, a) {}").is_err());
        assert!(parse("({ m(a, a) {} })").is_err());
    }

    #[test]
    fn test_use_strict_retroactive() {
        assert!(parse("function eval() { 'use strict' }").is_err());
        assert!(parse("function f(eval) { 'use strict' }").is_err());
        assert!(parse("function f(a = 1) { 'use strict' }").is_err());
        assert!(parse("function f(interface) { 'use strict' }").is_err());
        assert!(parse("function f(interface) {}").is_ok());
        assert!(parse("(a = 1) => { 'use strict' }").is_err());
    }

    #[test]
    fn test_generator_and_async_names() {
        assert!(parse("function* g() { var yield; }").is_err());
        assert!(parse("function* yield() {}").is_ok());
        assert!(parse("(function* yield() {})").is_err());
        assert!(parse("async function f() { var await; }").is_err());
        assert!(parse("function* g(a = yield) {}").is_err());
        assert!(parse("async function f(a = await 1) {}").is_err());
    }

    #[test]
    fn test_accessors() {
        assert!(parse("({ get a() {}, set a(v) {} })").is_ok());
        assert!(parse("({ get a(x) {} })").is_err());
        assert!(parse("({ set a() {} })").is_err());
        assert!(parse("({ set a(...v) {} })").is_err());
        assert!(parse("({ get() {}, set: 1, async: 2 })").is_ok());
    }

    #[test]
    fn test_class_members() {
        let program = parse("class A extends B { constructor() { super(); } static x = 1; #y; get #y2() {} static { this.z = 1; } }").unwrap();
        let StmtKind::Class(class) = &program.body[0].kind else { panic!() };
        assert_eq!(class.body.len(), 5);
        assert!(matches!(class.body[0].kind, ClassMemberKind::Method { kind: MethodKind::Constructor, .. }));
        assert!(matches!(class.body[4].kind, ClassMemberKind::StaticBlock(_)));
    }

    #[test]
    fn test_class_errors() {
        assert!(parse("class A { constructor() {} constructor() {} }").is_err());
        assert!(parse("class A { get constructor() {} }").is_err());
        assert!(parse("class A { constructor = 1 }").is_err());
        assert!(parse("class A { static prototype() {} }").is_err());
        assert!(parse("class A { #constructor() {} }").is_err());
        assert!(parse("class A { constructor() { super(); } }").is_err());
        assert!(parse("class A { m() { super.x; } }").is_ok());
        assert!(parse("class A { #a; #a; }").is_err());
        assert!(parse("class A { get #a() {} set #a(v) {} }").is_ok());
        assert!(parse("class A { x = arguments; }").is_err());
        assert!(parse("class A { static { return; } }").is_err());
        assert!(parse("class A { static { await; } }").is_err());
        assert!(parse("class { }").is_err());
    }

    #[test]
    fn test_private_names() {
        assert!(parse("class A { #x; m() { return this.#x; } }").is_ok());
        assert!(parse("class A { m() { return this.#x; } }").is_err());
        assert!(parse("class A { m() { class B { n() { this.#x; } } } #x; }").is_ok());
        assert!(parse("class A { #x; m(o) { return #x in o; } }").is_ok());
        assert!(parse("this.#x").is_err());
        assert!(parse("class A { #x; m() { delete this.#x; } }").is_err());
    }

    #[test]
    fn test_imports() {
        let program = parse_module("import a, { b as c, d } from 'm'; import * as ns from 'n'; import 'o';").unwrap();
        let StmtKind::Import(import) = &program.body[0].kind else { panic!() };
        assert_eq!(import.specifiers.len(), 3);
        assert!(parse_module("import { a, a } from 'm';").is_err());
        assert!(parse_module("import { 'x' } from 'm';").is_err());
        assert!(parse_module("import { 'x' as y } from 'm';").is_ok());
        assert!(parse_module("import { if } from 'm';").is_err());
        assert!(parse("import a from 'm';").is_err());
        assert!(parse_module("{ import a from 'm'; }").is_err());
    }

    #[test]
    fn test_exports() {
        let program = parse_module("export let x = 0;").unwrap();
        let StmtKind::Export(export) = &program.body[0].kind else { panic!() };
        assert!(matches!(
            export.as_ref(),
            ExportDecl::Named { declaration: Some(_), specifiers, source: None, .. } if specifiers.is_empty()
        ));

        assert!(parse_module("let a, b; export { a, b as c };").is_ok());
        assert!(parse_module("let a, b; export { a, b as a };").is_err());
        assert!(parse_module("export { x };").is_err());
        assert!(parse_module("export { x } from 'm';").is_ok());
        assert!(parse_module("export { 'x' };").is_err());
        assert!(parse_module("export * as ns from 'm'; export * from 'n';").is_ok());
        assert!(parse_module("export default function () {} export default 1;").is_err());
        assert!(parse_module("export default class {}").is_ok());
        assert!(parse_module("export default async function f() {} f();").is_ok());
        assert!(parse_module("export var [a, {b}] = c; export { a as d };").is_ok());
        assert!(parse_module("export var a; export function a() {}").is_err());
    }

    #[test]
    fn test_import_attributes() {
        let program = parse_next_module("import a from 'm' with { type: 'json' };").unwrap();
        let StmtKind::Import(import) = &program.body[0].kind else { panic!() };
        assert_eq!(import.attributes.len(), 1);
        assert!(parse_next_module("import a from 'm' with { type: 'json', type: 'css' };").is_err());
        assert!(parse_module("import a from 'm' with { type: 'json' };").is_err());
    }
}
