//! ECMAScript parser.
//!
//! A recursive descent parser for statements with precedence climbing for
//! binary expressions. The grammar context travels as a [`Context`] value
//! through every call; scopes, labels and private names live on the parser.
//!
//! The parser is split across files:
//! - `parser.rs`: state, token handling, ASI, directives and statements
//! - `expr.rs`: expressions and the cover grammar
//! - `pattern.rs`: binding patterns and reinterpretation of expressions
//! - `decl.rs`: functions, classes, imports and exports

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::ast::*;
use crate::context::Context;
use crate::error::ParseError;
use crate::expr::Cover;
use crate::lexer::Lexer;
use crate::options::ParserOptions;
use crate::scope::{DeclKind, ExportLedger, PrivateNames, ScopeKind, ScopeStack};
use crate::span::{LineIndex, Span};
use crate::token::{is_strict_reserved, keyword_from_str, Token, TokenKind};

/// An active label.
#[derive(Debug, Clone)]
pub(crate) struct Label {
    pub name: String,
    /// Start of the label itself.
    pub name_start: u32,
    /// Start of the labelled statement.
    pub body_start: u32,
    /// The label (directly or through other labels) names a loop.
    pub iteration: bool,
}

/// The parser.
pub struct Parser<'a> {
    /// The lexer.
    pub(crate) lexer: Lexer<'a>,
    /// Current token.
    pub(crate) current: Token,
    /// End of the last consumed token.
    pub(crate) prev_end: u32,
    /// Parser options.
    pub(crate) options: ParserOptions,
    /// Source code.
    pub(crate) source: &'a str,
    pub(crate) scopes: ScopeStack,
    pub(crate) exports: ExportLedger,
    pub(crate) private_names: PrivateNames,
    /// Labels of the current function.
    pub(crate) labels: Vec<Label>,
    /// Spans of expressions that were wrapped in parentheses.
    pub(crate) parenthesized: FxHashSet<Span>,
}

impl<'a> Parser<'a> {
    /// Create a new parser and scan the first token.
    ///
    /// Offsets are `u32`, so sources longer than `u32::MAX` bytes are
    /// rejected with a syntax error at offset 0.
    pub fn new(source: &'a str, options: ParserOptions) -> Result<Self, ParseError> {
        check_source_len(source.len())?;
        let mut lexer = Lexer::new(source)
            .with_module(options.module)
            .with_web_compat(options.web_compat())
            .with_comments(options.comments);
        let current = lexer.next_token(false)?;
        let root = if options.module { ScopeKind::Module } else { ScopeKind::Script };
        Ok(Self {
            lexer,
            current,
            prev_end: 0,
            options,
            source,
            scopes: ScopeStack::new(root, options.web_compat()),
            exports: ExportLedger::default(),
            private_names: PrivateNames::default(),
            labels: Vec::new(),
            parenthesized: FxHashSet::default(),
        })
    }

    /// Parse the entire source into a [`Program`].
    pub fn parse(mut self) -> Result<Program, ParseError> {
        let mut ctx = self.root_context();
        let (mut body, strict) = self.parse_directives(ctx)?;
        if strict {
            ctx = ctx.with(Context::STRICT);
        }
        while !self.is_eof() {
            body.push(self.parse_statement_list_item(ctx)?);
        }

        if self.options.module {
            if let Some((name, span)) = self.exports.unresolved(&self.scopes) {
                return Err(self.error_at(span, format!("Export '{name}' is not defined in module")));
            }
        }

        let comments = self.lexer.take_comments();
        let options = self.options;
        let line_index = (options.loc || !self.source.is_ascii()).then(|| LineIndex::new(self.source));
        Ok(Program {
            body,
            source_type: if options.module { SourceType::Module } else { SourceType::Script },
            span: Span::new(0, self.source.len() as u32),
            comments,
            source: self.source.to_string(),
            options,
            line_index,
        })
    }

    fn root_context(&self) -> Context {
        let options = &self.options;
        let mut ctx = Context::TOP_LEVEL;
        if options.module {
            ctx = ctx | Context::MODULE | Context::STRICT | Context::IN_ASYNC;
        }
        if options.implied_strict {
            ctx = ctx.with(Context::STRICT);
        }
        if options.web_compat() {
            ctx = ctx.with(Context::WEB_COMPAT);
        }
        if options.next {
            ctx = ctx.with(Context::NEXT);
        }
        if options.global_return && !options.module {
            ctx = ctx.with(Context::ALLOW_RETURN);
        }
        ctx
    }

    // =========================================================================
    // Token Handling
    // =========================================================================

    /// Get the current token kind.
    pub(crate) fn peek(&self) -> &TokenKind {
        &self.current.kind
    }

    /// Advance to the next token and return the previous.
    pub(crate) fn advance(&mut self) -> Result<Token, ParseError> {
        let next = self.lexer.next_token(false)?;
        let prev = std::mem::replace(&mut self.current, next);
        self.prev_end = prev.span.end;
        Ok(prev)
    }

    /// Scan the token after the current one without consuming anything.
    pub(crate) fn lookahead(&mut self) -> Result<Token, ParseError> {
        self.lexer.peek()
    }

    /// Check if the current token matches the given kind.
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(kind)
    }

    /// Check if at end of file.
    pub(crate) fn is_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    /// The current token is the unescaped contextual keyword `word`.
    pub(crate) fn is_contextual(&self, word: &str) -> bool {
        self.current.is_contextual(word)
    }

    /// Consume a token if it matches, otherwise return an error.
    pub(crate) fn expect(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            self.advance()
        } else {
            Err(self.unexpected())
        }
    }

    /// Consume a token if it matches, returning true if consumed.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> Result<bool, ParseError> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume the contextual keyword `word`.
    pub(crate) fn expect_contextual(&mut self, word: &str) -> Result<Token, ParseError> {
        if self.is_contextual(word) {
            self.advance()
        } else {
            Err(self.unexpected())
        }
    }

    /// Consume a semicolon (with ASI support).
    pub(crate) fn expect_semicolon(&mut self) -> Result<(), ParseError> {
        // 1. Explicit semicolon
        if self.eat(&TokenKind::Semicolon)? {
            return Ok(());
        }
        // 2. Before closing brace, 3. at end of file,
        // 4. after a line terminator
        if self.check(&TokenKind::RBrace) || self.is_eof() || self.current.newline_before {
            return Ok(());
        }
        Err(self.unexpected())
    }

    /// Span from `start` to the end of the last consumed token.
    #[inline]
    pub(crate) fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.prev_end)
    }

    pub(crate) fn error_at(&self, span: Span, message: impl Into<String>) -> ParseError {
        ParseError::syntax(message, self.source, span)
    }

    /// Error for the current token.
    pub(crate) fn unexpected(&self) -> ParseError {
        let message = match &self.current.kind {
            TokenKind::Eof => "Unexpected end of input".to_string(),
            kind => format!("Unexpected token {kind}"),
        };
        self.error_at(self.current.span, message)
    }

    pub(crate) fn is_parenthesized(&self, expr: &Expr) -> bool {
        self.parenthesized.contains(&expr.span)
    }

    /// Declare `name` in the current scope.
    pub(crate) fn declare(&mut self, name: &str, span: Span, kind: DeclKind, ctx: Context) -> Result<(), ParseError> {
        self.scopes
            .declare(name, kind, ctx.is_strict())
            .map_err(|message| self.error_at(span, message))
    }

    // =========================================================================
    // Identifiers
    // =========================================================================

    /// Consume an IdentifierName (reserved words allowed).
    pub(crate) fn parse_identifier_name(&mut self) -> Result<Identifier, ParseError> {
        let name = match &self.current.kind {
            TokenKind::Identifier(name) => name.clone(),
            kind => match kind.keyword_str() {
                Some(word) => word.to_string(),
                None => return Err(self.unexpected()),
            },
        };
        let token = self.advance()?;
        Ok(Identifier::new(name, token.span))
    }

    /// Consume a BindingIdentifier.
    pub(crate) fn parse_binding_identifier(&mut self, ctx: Context) -> Result<Identifier, ParseError> {
        let TokenKind::Identifier(name) = &self.current.kind else {
            return Err(self.unexpected());
        };
        let name = name.clone();
        let token = self.advance()?;
        self.check_escaped_keyword(&token, &name)?;
        self.check_binding_name(&name, token.span, ctx)?;
        Ok(Identifier::new(name, token.span))
    }

    /// Reserved words may not be spelled with escapes.
    pub(crate) fn check_escaped_keyword(&self, token: &Token, name: &str) -> Result<(), ParseError> {
        if token.escaped && keyword_from_str(name).is_some() {
            return Err(self.error_at(token.span, "Keyword must not contain escaped characters"));
        }
        Ok(())
    }

    /// Validate the name of a binding.
    pub(crate) fn check_binding_name(&self, name: &str, span: Span, ctx: Context) -> Result<(), ParseError> {
        if ctx.is_strict() && (name == "eval" || name == "arguments") {
            return Err(self.error_at(span, format!("Unexpected '{name}' in strict mode")));
        }
        self.check_reference_name(name, span, ctx)
    }

    /// Validate an identifier reference or label.
    pub(crate) fn check_reference_name(&self, name: &str, span: Span, ctx: Context) -> Result<(), ParseError> {
        if keyword_from_str(name).is_some() {
            return Err(self.error_at(span, format!("Unexpected keyword '{name}'")));
        }
        if ctx.is_strict() && is_strict_reserved(name) {
            return Err(self.error_at(span, format!("Unexpected strict mode reserved word '{name}'")));
        }
        match name {
            "yield" if ctx.yield_is_keyword() => {
                Err(self.error_at(span, "Unexpected reserved word 'yield'"))
            }
            "await" if ctx.await_is_keyword() => {
                Err(self.error_at(span, "Unexpected reserved word 'await'"))
            }
            "arguments" if ctx.intersects(Context::IN_CLASS_FIELD | Context::IN_STATIC_BLOCK) => Err(self.error_at(
                span,
                "'arguments' is not allowed in class field initializer or static initialization block",
            )),
            _ => Ok(()),
        }
    }

    // =========================================================================
    // Directives and Statement Lists
    // =========================================================================

    /// Parse the directive prologue of a script, module or function body.
    ///
    /// Returns the prologue statements and whether it contains `"use strict"`.
    /// Legacy octal escapes earlier in the same prologue become errors once
    /// the directive is seen.
    pub(crate) fn parse_directives(&mut self, ctx: Context) -> Result<(Vec<Stmt>, bool), ParseError> {
        let mut stmts = Vec::new();
        let mut use_strict = false;
        let mut octal: Option<Span> = None;

        while let TokenKind::String(_) = self.peek() {
            let token_span = self.current.span;
            if self.current.legacy_octal && octal.is_none() {
                octal = Some(token_span);
            }
            let stmt_ctx = ctx.set(Context::STRICT, ctx.is_strict() || use_strict);
            let mut stmt = self.parse_statement_list_item(stmt_ctx)?;

            let is_directive = matches!(
                &stmt.kind,
                StmtKind::Expr { expr, .. }
                    if stmt.span.start == token_span.start
                        && expr.span == token_span
                        && matches!(expr.kind, ExprKind::String(_))
            );
            if !is_directive {
                stmts.push(stmt);
                break;
            }

            let source = self.source;
            let raw = &source[token_span.start as usize + 1..token_span.end as usize - 1];
            if raw == "use strict" && !use_strict {
                use_strict = true;
                trace!(offset = token_span.start, "strict mode directive");
                if let Some(span) = octal {
                    return Err(self.error_at(span, "Octal escape sequences are not allowed in strict mode"));
                }
            }
            if let StmtKind::Expr { directive, .. } = &mut stmt.kind {
                *directive = Some(raw.to_string());
            }
            stmts.push(stmt);
        }

        Ok((stmts, use_strict))
    }

    /// Parse statements until `}` or end of input.
    pub(crate) fn parse_statement_list(&mut self, ctx: Context, stmts: &mut Vec<Stmt>) -> Result<(), ParseError> {
        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            stmts.push(self.parse_statement_list_item(ctx)?);
        }
        Ok(())
    }

    /// Parse a StatementListItem: a statement or a declaration.
    pub(crate) fn parse_statement_list_item(&mut self, ctx: Context) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;

        if matches!(self.peek(), TokenKind::Identifier(_)) {
            if self.is_contextual("let") && self.is_let_declaration()? {
                return self.parse_var_stmt(ctx, VarKind::Let);
            }
            if self.is_contextual("async") && self.is_async_function()? {
                self.advance()?; // async
                let function = self.parse_function_declaration(ctx, start, true, false)?;
                return Ok(Stmt::new(StmtKind::Function(Box::new(function)), self.span_from(start)));
            }
            if self.is_using_declaration(ctx)? {
                return self.parse_var_stmt(ctx, VarKind::Using);
            }
        }

        match self.peek() {
            TokenKind::Function => {
                let function = self.parse_function_declaration(ctx, start, false, false)?;
                Ok(Stmt::new(StmtKind::Function(Box::new(function)), self.span_from(start)))
            }
            TokenKind::Class => {
                let class = self.parse_class(ctx, true, false)?;
                Ok(Stmt::new(StmtKind::Class(Box::new(class)), self.span_from(start)))
            }
            TokenKind::Const => self.parse_var_stmt(ctx, VarKind::Const),
            TokenKind::Import => {
                let next = self.lookahead()?;
                if matches!(next.kind, TokenKind::LParen | TokenKind::Dot) {
                    self.parse_expr_stmt(ctx)
                } else {
                    self.parse_import_decl(ctx)
                }
            }
            TokenKind::Export => self.parse_export_decl(ctx),
            _ => self.parse_statement(ctx),
        }
    }

    /// `let` followed by a binding starts a lexical declaration.
    pub(crate) fn is_let_declaration(&mut self) -> Result<bool, ParseError> {
        let next = self.lookahead()?;
        Ok(matches!(
            next.kind,
            TokenKind::Identifier(_) | TokenKind::LBracket | TokenKind::LBrace
        ))
    }

    /// `async` followed by `function` on the same line.
    pub(crate) fn is_async_function(&mut self) -> Result<bool, ParseError> {
        let next = self.lookahead()?;
        Ok(next.kind == TokenKind::Function && !next.newline_before)
    }

    /// `using` followed by an identifier on the same line.
    pub(crate) fn is_using_declaration(&mut self, ctx: Context) -> Result<bool, ParseError> {
        if !ctx.contains(Context::NEXT) || !self.is_contextual("using") {
            return Ok(false);
        }
        // Script top level has no lexical environment for disposal.
        if ctx.contains(Context::TOP_LEVEL) && !ctx.is_module() {
            return Ok(false);
        }
        let next = self.lookahead()?;
        Ok(matches!(next.kind, TokenKind::Identifier(_)) && !next.newline_before)
    }

    // =========================================================================
    // Statement Parsing
    // =========================================================================

    /// Parse a Statement (declarations are not allowed here).
    pub(crate) fn parse_statement(&mut self, ctx: Context) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;

        match self.peek() {
            TokenKind::LBrace => {
                let block = self.parse_block(ctx)?;
                Ok(Stmt::new(StmtKind::Block(block), self.span_from(start)))
            }
            TokenKind::Semicolon => {
                self.advance()?;
                Ok(Stmt::new(StmtKind::Empty, self.span_from(start)))
            }
            TokenKind::Var => self.parse_var_stmt(ctx, VarKind::Var),
            TokenKind::If => self.parse_if_stmt(ctx),
            TokenKind::For => self.parse_for_stmt(ctx),
            TokenKind::While => self.parse_while_stmt(ctx),
            TokenKind::Do => self.parse_do_while_stmt(ctx),
            TokenKind::Continue => self.parse_continue_stmt(ctx),
            TokenKind::Break => self.parse_break_stmt(ctx),
            TokenKind::Return => self.parse_return_stmt(ctx),
            TokenKind::With => self.parse_with_stmt(ctx),
            TokenKind::Switch => self.parse_switch_stmt(ctx),
            TokenKind::Throw => self.parse_throw_stmt(ctx),
            TokenKind::Try => self.parse_try_stmt(ctx),
            TokenKind::Debugger => {
                self.advance()?;
                self.expect_semicolon()?;
                Ok(Stmt::new(StmtKind::Debugger, self.span_from(start)))
            }

            TokenKind::Function => Err(self.error_at(
                self.current.span,
                if ctx.is_strict() {
                    "In strict mode code, functions can only be declared at top level or inside a block"
                } else {
                    "Function declarations are not allowed in this statement position"
                },
            )),
            TokenKind::Class | TokenKind::Const => Err(self.error_at(
                self.current.span,
                "Lexical declaration cannot appear in a single-statement context",
            )),
            TokenKind::Import => {
                let next = self.lookahead()?;
                if matches!(next.kind, TokenKind::LParen | TokenKind::Dot) {
                    self.parse_expr_stmt(ctx)
                } else {
                    Err(self.module_item_error(ctx))
                }
            }
            TokenKind::Export => Err(self.module_item_error(ctx)),

            TokenKind::Identifier(_) if self.is_contextual("let") => {
                let next = self.lookahead()?;
                let declaration = next.kind == TokenKind::LBracket
                    || (matches!(next.kind, TokenKind::Identifier(_) | TokenKind::LBrace) && !next.newline_before);
                if declaration {
                    return Err(self.error_at(
                        self.current.span,
                        "Lexical declaration cannot appear in a single-statement context",
                    ));
                }
                self.parse_expr_stmt(ctx)
            }
            TokenKind::Identifier(_) if self.is_contextual("async") => {
                if self.is_async_function()? {
                    return Err(self.error_at(
                        self.current.span,
                        "Async functions can only be declared at the top level or inside a block",
                    ));
                }
                self.parse_expr_stmt(ctx)
            }

            _ => self.parse_expr_stmt(ctx),
        }
    }

    /// Error for `import`/`export` outside module top level.
    pub(crate) fn module_item_error(&self, ctx: Context) -> ParseError {
        let keyword = if self.check(&TokenKind::Import) { "import" } else { "export" };
        if ctx.is_module() {
            self.error_at(self.current.span, "'import' and 'export' may only appear at the top level")
        } else {
            self.error_at(
                self.current.span,
                format!("Cannot use '{keyword}' statement outside a module"),
            )
        }
    }

    /// Parse a block: `{ ... }` in its own scope.
    pub(crate) fn parse_block(&mut self, ctx: Context) -> Result<BlockStmt, ParseError> {
        let start = self.current.span.start;
        self.expect(&TokenKind::LBrace)?;
        self.scopes.push(ScopeKind::Block);
        let mut body = Vec::new();
        self.parse_statement_list(ctx.without(Context::TOP_LEVEL), &mut body)?;
        self.expect(&TokenKind::RBrace)?;
        self.scopes.pop();
        Ok(BlockStmt { body, span: self.span_from(start) })
    }

    /// Parse an expression statement or a labelled statement.
    fn parse_expr_stmt(&mut self, ctx: Context) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        let expr = self.parse_expr(ctx.without(Context::DISALLOW_IN))?;

        if self.check(&TokenKind::Colon) && expr.span.start == start && !self.is_parenthesized(&expr) {
            if let ExprKind::Ident(name) = &expr.kind {
                let label = Identifier::new(name.clone(), expr.span);
                return self.parse_labeled_stmt(ctx, label);
            }
        }

        self.expect_semicolon()?;
        Ok(Stmt::new(
            StmtKind::Expr { expr: Box::new(expr), directive: None },
            self.span_from(start),
        ))
    }

    /// Parse variable declaration statement.
    fn parse_var_stmt(&mut self, ctx: Context, kind: VarKind) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        let decl = self.parse_var_decl(ctx, kind, false)?;
        self.expect_semicolon()?;
        Ok(Stmt::new(StmtKind::Var(Box::new(decl)), self.span_from(start)))
    }

    /// Parse a variable declaration without the terminating semicolon.
    ///
    /// In a for-statement head (`in_for_head`) initializers are checked by
    /// the caller, which knows whether the loop is `in`/`of`.
    pub(crate) fn parse_var_decl(&mut self, ctx: Context, kind: VarKind, in_for_head: bool) -> Result<VarDecl, ParseError> {
        let start = self.current.span.start;
        self.advance()?; // var, let, const or using

        let decl_kind = match kind {
            VarKind::Var => DeclKind::Var,
            VarKind::Let => DeclKind::Let,
            VarKind::Const => DeclKind::Const,
            VarKind::Using => DeclKind::Using,
        };

        let mut decls = Vec::new();
        loop {
            let decl_start = self.current.span.start;
            let mut names = Vec::new();
            let id = self.parse_binding_target(ctx, &mut names)?;
            if kind == VarKind::Using && !matches!(id.kind, PatternKind::Ident(_)) {
                return Err(self.error_at(id.span, "'using' declarations may not have binding patterns"));
            }
            for (name, span) in &names {
                if kind != VarKind::Var && name == "let" {
                    return Err(self.error_at(*span, "'let' is disallowed as a lexically bound name"));
                }
                self.declare(name, *span, decl_kind, ctx)?;
            }

            let init = if self.eat(&TokenKind::Eq)? {
                Some(self.parse_assign_expr(ctx)?)
            } else {
                None
            };
            let declarator = VarDeclarator { id, init, span: self.span_from(decl_start) };
            if !in_for_head {
                self.check_declarator_init(kind, &declarator)?;
            }
            decls.push(declarator);

            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }

        Ok(VarDecl { kind, decls, span: self.span_from(start) })
    }

    /// `const`, `using` and destructuring declarations need an initializer.
    pub(crate) fn check_declarator_init(&self, kind: VarKind, decl: &VarDeclarator) -> Result<(), ParseError> {
        if decl.init.is_some() {
            return Ok(());
        }
        match kind {
            VarKind::Const | VarKind::Using => Err(self.error_at(
                decl.span,
                format!("Missing initializer in {} declaration", kind.as_str()),
            )),
            _ if !matches!(decl.id.kind, PatternKind::Ident(_)) => {
                Err(self.error_at(decl.span, "Missing initializer in destructuring declaration"))
            }
            _ => Ok(()),
        }
    }

    /// Parse if statement.
    fn parse_if_stmt(&mut self, ctx: Context) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        self.advance()?; // if
        self.expect(&TokenKind::LParen)?;
        let test = self.parse_expr(ctx.without(Context::DISALLOW_IN))?;
        self.expect(&TokenKind::RParen)?;

        let consequent = self.parse_if_body(ctx)?;
        let alternate = if self.eat(&TokenKind::Else)? {
            Some(Box::new(self.parse_if_body(ctx)?))
        } else {
            None
        };

        Ok(Stmt::new(
            StmtKind::If {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate,
            },
            self.span_from(start),
        ))
    }

    /// The body of `if` or `else`. Sloppy web-compatible code may use a
    /// plain function declaration here, scoped as if wrapped in a block.
    fn parse_if_body(&mut self, ctx: Context) -> Result<Stmt, ParseError> {
        let ctx = ctx.without(Context::TOP_LEVEL);
        if self.check(&TokenKind::Function) && !ctx.is_strict() && ctx.web_compat() {
            let start = self.current.span.start;
            self.scopes.push(ScopeKind::Block);
            let function = self.parse_function_declaration(ctx, start, false, true)?;
            self.scopes.pop();
            return Ok(Stmt::new(StmtKind::Function(Box::new(function)), self.span_from(start)));
        }
        self.parse_statement(ctx)
    }

    /// Parse the body of a loop.
    fn parse_loop_body(&mut self, ctx: Context) -> Result<Stmt, ParseError> {
        self.parse_statement(ctx.without(Context::DISALLOW_IN | Context::TOP_LEVEL).with(Context::IN_ITERATION))
    }

    /// Parse a for, for-in or for-of statement.
    fn parse_for_stmt(&mut self, ctx: Context) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        self.advance()?; // for

        let is_await = if self.is_contextual("await") && ctx.await_is_keyword() {
            if !ctx.contains(Context::IN_ASYNC) {
                return Err(self.error_at(
                    self.current.span,
                    "for await is only valid in async functions and the top level bodies of modules",
                ));
            }
            self.advance()?;
            true
        } else {
            false
        };
        self.expect(&TokenKind::LParen)?;

        let head_ctx = ctx.without(Context::TOP_LEVEL).with(Context::DISALLOW_IN);
        let depth = self.scopes.depth();

        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else if let Some(kind) = self.for_declaration_kind(ctx)? {
            if kind != VarKind::Var {
                self.scopes.push(ScopeKind::Block);
            }
            let decl = self.parse_var_decl(head_ctx, kind, true)?;
            if self.check(&TokenKind::In) || self.is_contextual("of") {
                self.check_for_in_of_declaration(ctx, &decl)?;
                let stmt = self.parse_for_in_of_rest(ctx, start, ForHead::Var(Box::new(decl)), is_await);
                self.pop_scopes_to(depth);
                return stmt;
            }
            for declarator in &decl.decls {
                self.check_declarator_init(kind, declarator)?;
            }
            Some(ForInit::Var(Box::new(decl)))
        } else {
            let expr_start = self.current.span.start;
            let starts_with_let = self.is_contextual("let");
            let starts_with_async = self.is_contextual("async");
            let mut cover = Cover::default();
            let expr = self.parse_assign_cover(head_ctx, &mut cover)?;

            let is_of = self.is_contextual("of");
            if self.check(&TokenKind::In) || is_of {
                if is_of && starts_with_let {
                    return Err(self.error_at(expr.span, "The left-hand side of a for-of loop may not be 'let'"));
                }
                let bare_async = starts_with_async && expr.span.start == expr_start && expr.as_ident() == Some("async");
                if is_of && bare_async && !is_await {
                    return Err(self.error_at(expr.span, "The left-hand side of a for-of loop may not be 'async'"));
                }
                let target = self.to_assign_target(expr, &cover, head_ctx)?;
                return self.parse_for_in_of_rest(ctx, start, ForHead::Pattern(target), is_await);
            }

            self.finish_cover(&mut Cover::default(), cover)?;
            let expr = self.parse_sequence_rest(head_ctx, expr_start, expr)?;
            Some(ForInit::Expr(Box::new(expr)))
        };

        if is_await {
            return Err(self.error_at(self.current.span, "for await requires an 'of' clause"));
        }
        self.expect(&TokenKind::Semicolon)?;
        let test = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_expr(ctx.without(Context::DISALLOW_IN))?))
        };
        self.expect(&TokenKind::Semicolon)?;
        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.parse_expr(ctx.without(Context::DISALLOW_IN))?))
        };
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_loop_body(ctx)?;
        self.pop_scopes_to(depth);

        Ok(Stmt::new(
            StmtKind::For { init, test, update, body: Box::new(body) },
            self.span_from(start),
        ))
    }

    /// The declaration keyword starting a for-statement head, if any.
    fn for_declaration_kind(&mut self, ctx: Context) -> Result<Option<VarKind>, ParseError> {
        match self.peek() {
            TokenKind::Var => return Ok(Some(VarKind::Var)),
            TokenKind::Const => return Ok(Some(VarKind::Const)),
            _ => {}
        }
        if self.is_contextual("let") {
            let declaration = self.is_let_declaration()?;
            return Ok(declaration.then_some(VarKind::Let));
        }
        if ctx.contains(Context::NEXT) && self.is_contextual("using") {
            let next = self.lookahead()?;
            let declaration = !next.newline_before
                && matches!(&next.kind, TokenKind::Identifier(name) if name != "of" && name != "in");
            return Ok(declaration.then_some(VarKind::Using));
        }
        Ok(None)
    }

    /// A for-in/of head declares exactly one binding without initializer.
    fn check_for_in_of_declaration(&self, ctx: Context, decl: &VarDecl) -> Result<(), ParseError> {
        let is_of = self.is_contextual("of");
        let loop_kind = if is_of { "for-of" } else { "for-in" };
        if decl.decls.len() != 1 {
            return Err(self.error_at(
                decl.span,
                format!("Invalid left-hand side in {loop_kind} loop: Must have a single binding"),
            ));
        }
        let declarator = &decl.decls[0];
        if decl.kind == VarKind::Using && !is_of {
            return Err(self.error_at(decl.span, "'using' declarations are not allowed in for-in loops"));
        }
        if declarator.init.is_some() {
            // Annex B: `for (var x = 1 in obj)`
            let legacy = !is_of
                && decl.kind == VarKind::Var
                && !ctx.is_strict()
                && ctx.web_compat()
                && matches!(declarator.id.kind, PatternKind::Ident(_));
            if !legacy {
                return Err(self.error_at(
                    declarator.span,
                    format!("{loop_kind} loop variable declaration may not have an initializer"),
                ));
            }
        }
        Ok(())
    }

    /// Parse `in expr) body` or `of expr) body`.
    fn parse_for_in_of_rest(&mut self, ctx: Context, start: u32, left: ForHead, is_await: bool) -> Result<Stmt, ParseError> {
        let is_of = self.is_contextual("of");
        if is_await && !is_of {
            return Err(self.error_at(self.current.span, "for await requires an 'of' clause"));
        }
        self.advance()?; // in or of

        let right = if is_of {
            self.parse_assign_expr(ctx.without(Context::DISALLOW_IN))?
        } else {
            self.parse_expr(ctx.without(Context::DISALLOW_IN))?
        };
        self.expect(&TokenKind::RParen)?;
        let body = Box::new(self.parse_loop_body(ctx)?);
        let right = Box::new(right);

        let kind = if is_of {
            StmtKind::ForOf { left, right, body, is_await }
        } else {
            StmtKind::ForIn { left, right, body }
        };
        Ok(Stmt::new(kind, self.span_from(start)))
    }

    fn pop_scopes_to(&mut self, depth: usize) {
        while self.scopes.depth() > depth {
            self.scopes.pop();
        }
    }

    /// Parse while statement.
    fn parse_while_stmt(&mut self, ctx: Context) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        self.advance()?; // while
        self.expect(&TokenKind::LParen)?;
        let test = self.parse_expr(ctx.without(Context::DISALLOW_IN))?;
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_loop_body(ctx)?;

        Ok(Stmt::new(
            StmtKind::While { test: Box::new(test), body: Box::new(body) },
            self.span_from(start),
        ))
    }

    /// Parse do-while statement.
    fn parse_do_while_stmt(&mut self, ctx: Context) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        self.advance()?; // do
        let body = self.parse_loop_body(ctx)?;
        self.expect(&TokenKind::While)?;
        self.expect(&TokenKind::LParen)?;
        let test = self.parse_expr(ctx.without(Context::DISALLOW_IN))?;
        self.expect(&TokenKind::RParen)?;
        // A semicolon is always inserted after a do-while.
        self.eat(&TokenKind::Semicolon)?;

        Ok(Stmt::new(
            StmtKind::DoWhile { body: Box::new(body), test: Box::new(test) },
            self.span_from(start),
        ))
    }

    /// Parse the optional label of `break` or `continue`.
    fn parse_jump_label(&mut self, ctx: Context) -> Result<Option<Identifier>, ParseError> {
        if !matches!(self.peek(), TokenKind::Identifier(_)) || self.current.newline_before {
            return Ok(None);
        }
        let TokenKind::Identifier(name) = &self.current.kind else {
            return Ok(None);
        };
        let name = name.clone();
        let token = self.advance()?;
        self.check_escaped_keyword(&token, &name)?;
        self.check_reference_name(&name, token.span, ctx)?;
        Ok(Some(Identifier::new(name, token.span)))
    }

    /// Parse continue statement.
    fn parse_continue_stmt(&mut self, ctx: Context) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        let keyword = self.advance()?;
        let label = self.parse_jump_label(ctx)?;

        if !ctx.contains(Context::IN_ITERATION) {
            return Err(self.error_at(keyword.span, "Illegal continue statement: no surrounding iteration statement"));
        }
        if let Some(label) = &label {
            match self.labels.iter().rev().find(|l| l.name == label.name) {
                Some(l) if l.iteration => {}
                Some(_) => {
                    return Err(self.error_at(
                        label.span,
                        format!("Illegal continue statement: '{}' does not denote an iteration statement", label.name),
                    ))
                }
                None => return Err(self.error_at(label.span, format!("Undefined label '{}'", label.name))),
            }
        }
        self.expect_semicolon()?;
        Ok(Stmt::new(StmtKind::Continue(label), self.span_from(start)))
    }

    /// Parse break statement.
    fn parse_break_stmt(&mut self, ctx: Context) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        let keyword = self.advance()?;
        let label = self.parse_jump_label(ctx)?;

        match &label {
            Some(label) => {
                if !self.labels.iter().any(|l| l.name == label.name) {
                    return Err(self.error_at(label.span, format!("Undefined label '{}'", label.name)));
                }
            }
            None if !ctx.intersects(Context::IN_ITERATION | Context::IN_SWITCH) => {
                return Err(self.error_at(keyword.span, "Illegal break statement"));
            }
            None => {}
        }
        self.expect_semicolon()?;
        Ok(Stmt::new(StmtKind::Break(label), self.span_from(start)))
    }

    /// Parse return statement.
    fn parse_return_stmt(&mut self, ctx: Context) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        let keyword = self.advance()?;
        if !ctx.contains(Context::ALLOW_RETURN) {
            return Err(self.error_at(keyword.span, "Illegal return statement"));
        }

        // Restricted production: no line terminator before the argument.
        let argument = if self.check(&TokenKind::Semicolon)
            || self.check(&TokenKind::RBrace)
            || self.is_eof()
            || self.current.newline_before
        {
            None
        } else {
            Some(Box::new(self.parse_expr(ctx.without(Context::DISALLOW_IN))?))
        };
        self.expect_semicolon()?;
        Ok(Stmt::new(StmtKind::Return(argument), self.span_from(start)))
    }

    /// Parse with statement.
    fn parse_with_stmt(&mut self, ctx: Context) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        let keyword = self.advance()?;
        if ctx.is_strict() {
            return Err(self.error_at(keyword.span, "Strict mode code may not include a with statement"));
        }
        self.expect(&TokenKind::LParen)?;
        let object = self.parse_expr(ctx.without(Context::DISALLOW_IN))?;
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_statement(ctx.without(Context::TOP_LEVEL))?;

        Ok(Stmt::new(
            StmtKind::With { object: Box::new(object), body: Box::new(body) },
            self.span_from(start),
        ))
    }

    /// Parse switch statement.
    fn parse_switch_stmt(&mut self, ctx: Context) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        self.advance()?; // switch
        self.expect(&TokenKind::LParen)?;
        let discriminant = self.parse_expr(ctx.without(Context::DISALLOW_IN))?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::LBrace)?;

        self.scopes.push(ScopeKind::Block);
        let case_ctx = ctx.without(Context::TOP_LEVEL | Context::DISALLOW_IN).with(Context::IN_SWITCH);
        let mut cases = Vec::new();
        let mut seen_default = false;

        while !self.check(&TokenKind::RBrace) {
            let case_start = self.current.span.start;
            let test = if self.eat(&TokenKind::Case)? {
                Some(self.parse_expr(case_ctx)?)
            } else if self.check(&TokenKind::Default) {
                let token = self.advance()?;
                if seen_default {
                    return Err(self.error_at(token.span, "More than one default clause in switch statement"));
                }
                seen_default = true;
                None
            } else {
                return Err(self.unexpected());
            };
            self.expect(&TokenKind::Colon)?;

            let mut consequent = Vec::new();
            while !matches!(self.peek(), TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof) {
                consequent.push(self.parse_statement_list_item(case_ctx)?);
            }
            cases.push(SwitchCase { test, consequent, span: self.span_from(case_start) });
        }
        self.expect(&TokenKind::RBrace)?;
        self.scopes.pop();

        Ok(Stmt::new(
            StmtKind::Switch { discriminant: Box::new(discriminant), cases },
            self.span_from(start),
        ))
    }

    /// Parse throw statement.
    fn parse_throw_stmt(&mut self, ctx: Context) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        self.advance()?; // throw
        if self.current.newline_before {
            return Err(self.error_at(self.current.span, "Illegal newline after throw"));
        }
        let argument = self.parse_expr(ctx.without(Context::DISALLOW_IN))?;
        self.expect_semicolon()?;
        Ok(Stmt::new(StmtKind::Throw(Box::new(argument)), self.span_from(start)))
    }

    /// Parse try statement.
    fn parse_try_stmt(&mut self, ctx: Context) -> Result<Stmt, ParseError> {
        let start = self.current.span.start;
        self.advance()?; // try
        let block = self.parse_block(ctx)?;

        let handler = if self.check(&TokenKind::Catch) {
            Some(self.parse_catch_clause(ctx)?)
        } else {
            None
        };
        let finalizer = if self.eat(&TokenKind::Finally)? {
            Some(self.parse_block(ctx)?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return Err(self.error_at(self.current.span, "Missing catch or finally after try"));
        }

        Ok(Stmt::new(StmtKind::Try { block, handler, finalizer }, self.span_from(start)))
    }

    /// Parse a catch clause. The catch body shares the parameter's scope.
    fn parse_catch_clause(&mut self, ctx: Context) -> Result<CatchClause, ParseError> {
        let start = self.current.span.start;
        self.advance()?; // catch
        let ctx = ctx.without(Context::TOP_LEVEL);

        let param = if self.eat(&TokenKind::LParen)? {
            let mut names = Vec::new();
            let pattern = self.parse_binding_target(ctx, &mut names)?;
            self.expect(&TokenKind::RParen)?;
            let simple = matches!(pattern.kind, PatternKind::Ident(_));
            self.scopes.push_catch(!simple);
            let kind = if simple { DeclKind::CatchSimple } else { DeclKind::CatchPattern };
            for (name, span) in &names {
                self.declare(name, *span, kind, ctx)?;
            }
            Some(pattern)
        } else {
            self.scopes.push_catch(false);
            None
        };

        let body_start = self.current.span.start;
        self.expect(&TokenKind::LBrace)?;
        let mut body = Vec::new();
        self.parse_statement_list(ctx, &mut body)?;
        self.expect(&TokenKind::RBrace)?;
        self.scopes.pop();

        Ok(CatchClause {
            param,
            body: BlockStmt { body, span: self.span_from(body_start) },
            span: self.span_from(start),
        })
    }

    // =========================================================================
    // Labels
    // =========================================================================

    /// Parse the rest of `label: body` after the label expression.
    fn parse_labeled_stmt(&mut self, ctx: Context, label: Identifier) -> Result<Stmt, ParseError> {
        let start = label.span.start;
        self.advance()?; // :

        if self.labels.iter().any(|l| l.name == label.name) {
            return Err(self.error_at(label.span, format!("Label '{}' has already been declared", label.name)));
        }
        self.labels.push(Label {
            name: label.name.clone(),
            name_start: label.span.start,
            body_start: self.current.span.start,
            iteration: false,
        });
        if matches!(self.peek(), TokenKind::For | TokenKind::While | TokenKind::Do) {
            self.mark_label_chain_iteration();
        }

        let ctx = ctx.without(Context::TOP_LEVEL);
        let body = if self.check(&TokenKind::Function) {
            if ctx.is_strict() || !ctx.web_compat() {
                return Err(self.error_at(
                    self.current.span,
                    "In strict mode code, functions can only be declared at top level or inside a block",
                ));
            }
            let fn_start = self.current.span.start;
            let function = self.parse_function_declaration(ctx, fn_start, false, true)?;
            Stmt::new(StmtKind::Function(Box::new(function)), self.span_from(fn_start))
        } else {
            self.parse_statement(ctx)?
        };
        self.labels.pop();

        Ok(Stmt::new(
            StmtKind::Labeled { label, body: Box::new(body) },
            self.span_from(start),
        ))
    }

    /// Mark the innermost label, and every label directly labelling it, as
    /// naming an iteration statement.
    fn mark_label_chain_iteration(&mut self) {
        let mut i = self.labels.len();
        while i > 0 {
            i -= 1;
            self.labels[i].iteration = true;
            if i == 0 || self.labels[i - 1].body_start != self.labels[i].name_start {
                break;
            }
        }
    }
}

/// Sources must fit in `u32` offsets.
fn check_source_len(len: usize) -> Result<(), ParseError> {
    if u32::try_from(len).is_err() {
        return Err(ParseError::syntax("Source text is too large (over 4 GiB)", "", Span::empty(0)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_len_limit() {
        assert!(check_source_len(0).is_ok());
        assert!(check_source_len(u32::MAX as usize).is_ok());
        if let Ok(len) = usize::try_from(u64::from(u32::MAX) + 1) {
            let err = check_source_len(len).unwrap_err();
            assert_eq!(err.offset, 0);
            assert_eq!((err.line, err.column), (1, 0));
        }
    }

    fn parse(source: &str) -> Result<Program, ParseError> {
        Parser::new(source, ParserOptions::default())?.parse()
    }

    fn parse_module(source: &str) -> Result<Program, ParseError> {
        Parser::new(source, ParserOptions::module())?.parse()
    }

    fn stmt_kind(source: &str) -> StmtKind {
        parse(source).unwrap().body.remove(0).kind
    }

    #[test]
    fn test_var_decl() {
        match stmt_kind("var x = 1, y;") {
            StmtKind::Var(decl) => {
                assert_eq!(decl.kind, VarKind::Var);
                assert_eq!(decl.decls.len(), 2);
                assert!(decl.decls[1].init.is_none());
            }
            other => panic!("expected var, got {other:?}"),
        }
        assert!(parse("const x;").is_err());
        assert!(parse("let [a];").is_err());
        assert!(parse("let let = 1;").is_err());
    }

    #[test]
    fn test_asi() {
        let program = parse("a\nb\n;c").unwrap();
        assert_eq!(program.body.len(), 3);
        assert!(parse("a b").is_err());
        // `return` is a restricted production.
        let program = parse("function f() { return\n1 }").unwrap();
        let StmtKind::Function(f) = &program.body[0].kind else { panic!() };
        assert_eq!(f.body.body.len(), 2);
        assert!(matches!(f.body.body[0].kind, StmtKind::Return(None)));
        // A do-while always gets its semicolon.
        assert_eq!(parse("do x; while (y) z").unwrap().body.len(), 2);
    }

    #[test]
    fn test_throw_newline() {
        assert!(parse("throw\nx").is_err());
        assert!(parse("throw x").is_ok());
    }

    #[test]
    fn test_directives() {
        let program = parse("'use strict'; 'other'\nx").unwrap();
        assert!(matches!(
            &program.body[0].kind,
            StmtKind::Expr { directive: Some(d), .. } if d == "use strict"
        ));
        assert!(matches!(
            &program.body[1].kind,
            StmtKind::Expr { directive: Some(d), .. } if d == "other"
        ));
        assert!(matches!(&program.body[2].kind, StmtKind::Expr { directive: None, .. }));
        // Parenthesized strings are not directives.
        assert!(matches!(&stmt_kind("('use strict')"), StmtKind::Expr { directive: None, .. }));
        assert!(parse("'use strict'; with (a) {}").is_err());
        assert!(parse("('use strict'); with (a) {}").is_ok());
    }

    #[test]
    fn test_strict_retroactive_octal() {
        assert!(parse("'\\07'; 'use strict';").is_err());
        assert!(parse("'use strict'; '\\07';").is_err());
        assert!(parse("'\\07';").is_ok());
        assert!(parse("function f() { '\\08'; 'use strict'; }").is_err());
        assert!(parse("'use strict'; 010").is_err());
    }

    #[test]
    fn test_labels() {
        assert!(parse("a: while (1) { continue a; }").is_ok());
        assert!(parse("a: b: for (;;) { continue a; }").is_ok());
        assert!(parse("a: { continue a; }").is_err());
        assert!(parse("a: { break a; }").is_ok());
        assert!(parse("a: a: ;").is_err());
        assert!(parse("break;").is_err());
        assert!(parse("while (1) break b;").is_err());
        assert!(parse("a: while (1) { function f() { break a; } }").is_err());
        assert!(parse("a: function f() {}").is_ok());
        assert!(parse("'use strict'; a: function f() {}").is_err());
    }

    #[test]
    fn test_switch() {
        assert!(parse("switch (x) { case 1: break; default: }").is_ok());
        assert!(parse("switch (x) { default: default: }").is_err());
        assert!(parse("switch (x) { case 1: let a; case 2: let a; }").is_err());
    }

    #[test]
    fn test_try() {
        assert!(parse("try {} catch {}").is_ok());
        assert!(parse("try {} finally {}").is_ok());
        assert!(parse("try {}").is_err());
        assert!(parse("try {} catch (e) { var e; }").is_ok());
        assert!(parse("try {} catch (e) { let e; }").is_err());
        assert!(parse("try {} catch ([e]) { var e; }").is_err());
        assert!(parse("try {} catch ([e, e]) {}").is_err());
    }

    #[test]
    fn test_for_heads() {
        assert!(parse("for (;;) {}").is_ok());
        assert!(parse("for (var i = 0, j; i < 1; i++) {}").is_ok());
        assert!(parse("for (let x of y) {}").is_ok());
        assert!(parse("for (x in y) {}").is_ok());
        assert!(parse("for ([a, b] of c) {}").is_ok());
        assert!(parse("for (let a, b of c) {}").is_err());
        assert!(parse("for (let a = 1 of c) {}").is_err());
        assert!(parse("for (var a = 1 in c) {}").is_ok());
        assert!(parse("'use strict'; for (var a = 1 in c) {}").is_err());
        assert!(parse("for (let of x) {}").is_err());
        assert!(parse("for (let in x) {}").is_ok());
        assert!(parse("for (async of x) {}").is_err());
        assert!(parse("for ((async) of x) {}").is_ok());
        assert!(parse("for (const x;;) {}").is_err());
        assert!(parse("for (let i;;) { var i; }").is_err());
        assert!(parse("for (a + b of c) {}").is_err());
    }

    #[test]
    fn test_for_await() {
        assert!(parse("async function f() { for await (x of y) {} }").is_ok());
        assert!(parse("function f() { for await (x of y) {} }").is_err());
        assert!(parse_module("for await (x of y) {}").is_ok());
        assert!(parse("async function f() { for await (x in y) {} }").is_err());
    }

    #[test]
    fn test_single_statement_positions() {
        assert!(parse("if (x) let y;").is_err());
        assert!(parse("if (x) let [a] = b;").is_err());
        assert!(parse("if (x) const y = 1;").is_err());
        assert!(parse("while (x) class C {}").is_err());
        assert!(parse("if (x) function f() {}").is_ok());
        assert!(parse("if (x) function* f() {}").is_err());
        assert!(parse("while (x) function f() {}").is_err());
        let sloppy_off = ParserOptions::default().with_web_compat(false);
        assert!(Parser::new("if (x) function f() {}", sloppy_off).unwrap().parse().is_err());
    }

    #[test]
    fn test_return_placement() {
        assert!(parse("return;").is_err());
        let options = ParserOptions::default().with_global_return(true);
        assert!(Parser::new("return 1;", options).unwrap().parse().is_ok());
    }
}
