//! Expression parsing.
//!
//! Object literals, array literals and parenthesized lists are parsed once
//! as expressions. Whether they are really patterns is only known at the
//! following token (`=`, `=>`, `in`, `of`); until then the facts that would
//! make one reading invalid are carried in a [`Cover`].

use crate::ast::*;
use crate::context::Context;
use crate::error::ParseError;
use crate::parser::Parser;
use crate::span::Span;
use crate::token::TokenKind;

/// Facts gathered while parsing an expression that may later be
/// reinterpreted as a pattern.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Cover {
    /// `{a = 1}`: only valid as a pattern.
    pub shorthand_init: Option<Span>,
    /// A second `__proto__: v`: only valid as a pattern.
    pub duplicate_proto: Option<Span>,
    /// `[...a,]` or `{...a,}`: only valid as an expression.
    pub trailing_rest: Option<Span>,
    /// A `yield` or `await` expression: invalid in arrow parameters.
    pub yield_await: Option<Span>,
    /// An `await` identifier: invalid in async arrow parameters.
    pub await_ident: Option<Span>,
}

impl Cover {
    pub fn merge(&mut self, other: Cover) {
        self.shorthand_init = self.shorthand_init.or(other.shorthand_init);
        self.duplicate_proto = self.duplicate_proto.or(other.duplicate_proto);
        self.trailing_rest = self.trailing_rest.or(other.trailing_rest);
        self.yield_await = self.yield_await.or(other.yield_await);
        self.await_ident = self.await_ident.or(other.await_ident);
    }
}

/// Tokens that may begin an expression (used after `yield`).
fn starts_expression(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier(_)
            | TokenKind::PrivateName(_)
            | TokenKind::String(_)
            | TokenKind::Number(_)
            | TokenKind::BigInt(_)
            | TokenKind::Regex { .. }
            | TokenKind::TemplateNoSub(_)
            | TokenKind::TemplateHead(_)
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::LBrace
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Bang
            | TokenKind::Tilde
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus
            | TokenKind::Slash
            | TokenKind::SlashEq
            | TokenKind::Function
            | TokenKind::Class
            | TokenKind::New
            | TokenKind::Delete
            | TokenKind::Typeof
            | TokenKind::Void
            | TokenKind::This
            | TokenKind::Super
            | TokenKind::Null
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Import
    )
}

/// Precedence of the relational operators, `in` among them.
const RELATIONAL_PRECEDENCE: u8 = 8;

impl<'a> Parser<'a> {
    // =========================================================================
    // Cover Bookkeeping
    // =========================================================================

    /// Settle `inner` as an expression: pattern-only constructs become
    /// errors, and yield/await sightings move to `outer`.
    pub(crate) fn finish_cover(&self, outer: &mut Cover, inner: Cover) -> Result<(), ParseError> {
        if let Some(span) = inner.shorthand_init {
            return Err(self.error_at(span, "Invalid shorthand property initializer"));
        }
        if let Some(span) = inner.duplicate_proto {
            return Err(self.error_at(span, "Duplicate __proto__ fields are not allowed in object literals"));
        }
        outer.yield_await = outer.yield_await.or(inner.yield_await);
        outer.await_ident = outer.await_ident.or(inner.await_ident);
        Ok(())
    }

    /// An unparenthesized arrow function cannot be an operand.
    fn is_bare_arrow(&self, expr: &Expr) -> bool {
        matches!(expr.kind, ExprKind::Arrow(_)) && !self.is_parenthesized(expr)
    }

    fn reject_arrow_operand(&self, expr: &Expr) -> Result<(), ParseError> {
        if self.is_bare_arrow(expr) {
            return Err(self.error_at(expr.span, "Malformed arrow function parameter list"));
        }
        Ok(())
    }

    // =========================================================================
    // Expression Entry Points
    // =========================================================================

    /// Parse an Expression (comma-separated sequence).
    pub(crate) fn parse_expr(&mut self, ctx: Context) -> Result<Expr, ParseError> {
        let mut cover = Cover::default();
        self.parse_expr_into(ctx, &mut cover)
    }

    fn parse_expr_into(&mut self, ctx: Context, cover: &mut Cover) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        let first = self.parse_assign_into(ctx, cover)?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut exprs = vec![first];
        while self.eat(&TokenKind::Comma)? {
            exprs.push(self.parse_assign_into(ctx, cover)?);
        }
        Ok(Expr::new(ExprKind::Sequence(exprs), self.span_from(start)))
    }

    /// Continue a sequence expression whose first element is parsed.
    pub(crate) fn parse_sequence_rest(&mut self, ctx: Context, start: u32, first: Expr) -> Result<Expr, ParseError> {
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut exprs = vec![first];
        while self.eat(&TokenKind::Comma)? {
            exprs.push(self.parse_assign_expr(ctx)?);
        }
        Ok(Expr::new(ExprKind::Sequence(exprs), self.span_from(start)))
    }

    /// Parse an AssignmentExpression that must be an expression.
    pub(crate) fn parse_assign_expr(&mut self, ctx: Context) -> Result<Expr, ParseError> {
        let mut cover = Cover::default();
        self.parse_assign_into(ctx, &mut cover)
    }

    fn parse_assign_into(&mut self, ctx: Context, outer: &mut Cover) -> Result<Expr, ParseError> {
        let mut inner = Cover::default();
        let expr = self.parse_assign_cover(ctx, &mut inner)?;
        self.finish_cover(outer, inner)?;
        Ok(expr)
    }

    // =========================================================================
    // Assignment, Conditional and Binary Expressions
    // =========================================================================

    /// Parse an AssignmentExpression that may still turn out to be a pattern.
    pub(crate) fn parse_assign_cover(&mut self, ctx: Context, cover: &mut Cover) -> Result<Expr, ParseError> {
        if self.is_contextual("yield") && ctx.contains(Context::IN_GENERATOR) {
            return self.parse_yield_expr(ctx, cover);
        }

        let start = self.current.span.start;
        let mut inner = Cover::default();
        let left = self.parse_conditional_expr(ctx, &mut inner)?;

        let Some(op) = self.assign_op() else {
            cover.merge(inner);
            return Ok(left);
        };

        let destructuring = op == AssignOp::Assign
            && matches!(left.kind, ExprKind::Object(_) | ExprKind::Array(_))
            && !self.is_parenthesized(&left);
        let target = if destructuring {
            let target = self.to_assign_target(left, &inner, ctx)?;
            cover.yield_await = cover.yield_await.or(inner.yield_await);
            cover.await_ident = cover.await_ident.or(inner.await_ident);
            target
        } else {
            self.finish_cover(cover, inner)?;
            self.to_simple_target(left, ctx, "Invalid left-hand side in assignment")?
        };

        self.advance()?; // operator
        let right = self.parse_assign_into(ctx, cover)?;
        Ok(Expr::new(
            ExprKind::Assign {
                op,
                left: Box::new(target),
                right: Box::new(right),
            },
            self.span_from(start),
        ))
    }

    fn assign_op(&self) -> Option<AssignOp> {
        match self.peek() {
            TokenKind::Eq => Some(AssignOp::Assign),
            TokenKind::PlusEq => Some(AssignOp::AddAssign),
            TokenKind::MinusEq => Some(AssignOp::SubAssign),
            TokenKind::StarEq => Some(AssignOp::MulAssign),
            TokenKind::SlashEq => Some(AssignOp::DivAssign),
            TokenKind::PercentEq => Some(AssignOp::ModAssign),
            TokenKind::StarStarEq => Some(AssignOp::PowAssign),
            TokenKind::LtLtEq => Some(AssignOp::ShlAssign),
            TokenKind::GtGtEq => Some(AssignOp::ShrAssign),
            TokenKind::GtGtGtEq => Some(AssignOp::UShrAssign),
            TokenKind::PipeEq => Some(AssignOp::BitOrAssign),
            TokenKind::CaretEq => Some(AssignOp::BitXorAssign),
            TokenKind::AmpEq => Some(AssignOp::BitAndAssign),
            TokenKind::AmpAmpEq => Some(AssignOp::AndAssign),
            TokenKind::PipePipeEq => Some(AssignOp::OrAssign),
            TokenKind::QuestionQuestionEq => Some(AssignOp::NullishAssign),
            _ => None,
        }
    }

    /// Parse `yield`, `yield expr` or `yield* expr`.
    fn parse_yield_expr(&mut self, ctx: Context, cover: &mut Cover) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        let token = self.advance()?; // yield
        if ctx.contains(Context::IN_PARAMETERS) {
            return Err(self.error_at(token.span, "Yield expression not allowed in formal parameter"));
        }
        cover.yield_await = cover.yield_await.or(Some(token.span));

        let (arg, delegate) = if self.current.newline_before {
            (None, false)
        } else if self.eat(&TokenKind::Star)? {
            (Some(Box::new(self.parse_assign_into(ctx, cover)?)), true)
        } else if starts_expression(self.peek()) {
            (Some(Box::new(self.parse_assign_into(ctx, cover)?)), false)
        } else {
            (None, false)
        };

        Ok(Expr::new(ExprKind::Yield { arg, delegate }, self.span_from(start)))
    }

    /// Parse conditional expression (ternary).
    fn parse_conditional_expr(&mut self, ctx: Context, cover: &mut Cover) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        let mut inner = Cover::default();
        let test = self.parse_binary_expr(ctx, 0, &mut inner)?;

        if !self.check(&TokenKind::Question) || self.is_bare_arrow(&test) {
            cover.merge(inner);
            return Ok(test);
        }
        self.finish_cover(cover, inner)?;
        self.advance()?; // ?

        let consequent = self.parse_assign_into(ctx.without(Context::DISALLOW_IN), cover)?;
        self.expect(&TokenKind::Colon)?;
        let alternate = self.parse_assign_into(ctx, cover)?;
        Ok(Expr::new(
            ExprKind::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
            self.span_from(start),
        ))
    }

    /// Parse binary expression using precedence climbing.
    fn parse_binary_expr(&mut self, ctx: Context, min_prec: u8, cover: &mut Cover) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        let mut operand = Cover::default();

        let mut left = if let TokenKind::PrivateName(name) = self.peek() {
            // `#x in obj`
            let name = name.clone();
            let token = self.advance()?;
            let in_allowed = !ctx.contains(Context::DISALLOW_IN) && min_prec <= RELATIONAL_PRECEDENCE;
            if !self.check(&TokenKind::In) || !in_allowed {
                return Err(self.error_at(token.span, format!("Unexpected private name '#{name}'")));
            }
            self.reference_private(&name, token.span)?;
            Expr::new(ExprKind::PrivateName(name), token.span)
        } else {
            self.parse_unary_expr(ctx, &mut operand)?
        };
        let mut operand = Some(operand);

        loop {
            let prec = match self.peek().binary_precedence() {
                Some(prec) if prec >= min_prec => prec,
                _ => break,
            };
            let Some(op) = self.binary_op(ctx) else {
                break; // `in` in a for-statement head
            };
            if self.is_bare_arrow(&left) {
                break;
            }
            if let Some(inner) = operand.take() {
                self.finish_cover(cover, inner)?;
            }

            if op == BinaryOp::Pow
                && !self.is_parenthesized(&left)
                && matches!(left.kind, ExprKind::Unary { .. } | ExprKind::Await(_))
            {
                return Err(self.error_at(
                    left.span,
                    "Unary operator used immediately before exponentiation expression. \
                     Parenthesis must be used to disambiguate operator precedence",
                ));
            }

            let is_right_assoc = self.peek().is_right_associative();
            self.advance()?;

            let next_prec = if is_right_assoc { prec } else { prec + 1 };
            let mut right_cover = Cover::default();
            let right = self.parse_binary_expr(ctx, next_prec, &mut right_cover)?;
            self.finish_cover(cover, right_cover)?;
            self.reject_arrow_operand(&right)?;
            self.check_nullish_mixing(op, &left, &right)?;

            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                self.span_from(start),
            );
        }

        if let Some(inner) = operand {
            cover.merge(inner);
        }
        Ok(left)
    }

    fn binary_op(&self, ctx: Context) -> Option<BinaryOp> {
        match self.peek() {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::Percent => Some(BinaryOp::Mod),
            TokenKind::StarStar => Some(BinaryOp::Pow),
            TokenKind::EqEq => Some(BinaryOp::Eq),
            TokenKind::BangEq => Some(BinaryOp::NotEq),
            TokenKind::EqEqEq => Some(BinaryOp::StrictEq),
            TokenKind::BangEqEq => Some(BinaryOp::StrictNotEq),
            TokenKind::Lt => Some(BinaryOp::Lt),
            TokenKind::LtEq => Some(BinaryOp::LtEq),
            TokenKind::Gt => Some(BinaryOp::Gt),
            TokenKind::GtEq => Some(BinaryOp::GtEq),
            TokenKind::Pipe => Some(BinaryOp::BitOr),
            TokenKind::Caret => Some(BinaryOp::BitXor),
            TokenKind::Amp => Some(BinaryOp::BitAnd),
            TokenKind::LtLt => Some(BinaryOp::Shl),
            TokenKind::GtGt => Some(BinaryOp::Shr),
            TokenKind::GtGtGt => Some(BinaryOp::UShr),
            TokenKind::AmpAmp => Some(BinaryOp::And),
            TokenKind::PipePipe => Some(BinaryOp::Or),
            TokenKind::QuestionQuestion => Some(BinaryOp::NullishCoalesce),
            TokenKind::In if !ctx.contains(Context::DISALLOW_IN) => Some(BinaryOp::In),
            TokenKind::Instanceof => Some(BinaryOp::Instanceof),
            _ => None,
        }
    }

    /// `??` cannot share an operand with `&&` or `||` without parentheses.
    fn check_nullish_mixing(&self, op: BinaryOp, left: &Expr, right: &Expr) -> Result<(), ParseError> {
        let conflicts = |expr: &Expr| {
            if self.is_parenthesized(expr) {
                return false;
            }
            match &expr.kind {
                ExprKind::Binary { op: inner, .. } => match op {
                    BinaryOp::NullishCoalesce => matches!(inner, BinaryOp::And | BinaryOp::Or),
                    BinaryOp::And | BinaryOp::Or => *inner == BinaryOp::NullishCoalesce,
                    _ => false,
                },
                _ => false,
            }
        };
        if conflicts(left) || conflicts(right) {
            return Err(self.error_at(
                left.span.merge(right.span),
                "Logical expressions and coalesce expressions cannot be mixed. Wrap either by parentheses",
            ));
        }
        Ok(())
    }

    // =========================================================================
    // Unary and Postfix Expressions
    // =========================================================================

    /// Parse unary expression.
    pub(crate) fn parse_unary_expr(&mut self, ctx: Context, cover: &mut Cover) -> Result<Expr, ParseError> {
        let start = self.current.span.start;

        // Prefix unary operators
        let op = match self.peek() {
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::Delete => Some(UnaryOp::Delete),
            _ => None,
        };

        if let Some(op) = op {
            self.advance()?;
            let arg = self.parse_operand(ctx, cover)?;
            if op == UnaryOp::Delete {
                self.check_delete_operand(&arg, ctx)?;
            }
            return Ok(Expr::new(
                ExprKind::Unary { op, arg: Box::new(arg) },
                self.span_from(start),
            ));
        }

        // Prefix update operators
        if matches!(self.peek(), TokenKind::PlusPlus | TokenKind::MinusMinus) {
            let op = if self.check(&TokenKind::PlusPlus) {
                UpdateOp::Increment
            } else {
                UpdateOp::Decrement
            };
            self.advance()?;
            let arg = self.parse_operand(ctx, cover)?;
            self.check_simple_target(&arg, ctx, "Invalid left-hand side expression in prefix operation")?;
            return Ok(Expr::new(
                ExprKind::Update { op, prefix: true, arg: Box::new(arg) },
                self.span_from(start),
            ));
        }

        // Await expression
        if self.is_contextual("await") && ctx.contains(Context::IN_ASYNC) {
            let token = self.advance()?;
            if ctx.contains(Context::IN_PARAMETERS) {
                return Err(self.error_at(token.span, "Illegal await-expression in formal parameters of async function"));
            }
            cover.yield_await = cover.yield_await.or(Some(token.span));
            let arg = self.parse_operand(ctx, cover)?;
            return Ok(Expr::new(ExprKind::Await(Box::new(arg)), self.span_from(start)));
        }

        self.parse_postfix_expr(ctx, cover)
    }

    /// The operand of a prefix operator.
    fn parse_operand(&mut self, ctx: Context, cover: &mut Cover) -> Result<Expr, ParseError> {
        let mut inner = Cover::default();
        let arg = self.parse_unary_expr(ctx, &mut inner)?;
        self.finish_cover(cover, inner)?;
        self.reject_arrow_operand(&arg)?;
        Ok(arg)
    }

    fn check_delete_operand(&self, arg: &Expr, ctx: Context) -> Result<(), ParseError> {
        if ctx.is_strict() && matches!(arg.kind, ExprKind::Ident(_)) {
            return Err(self.error_at(arg.span, "Delete of an unqualified identifier in strict mode"));
        }
        let member = match &arg.kind {
            ExprKind::Chain(inner) => &inner.kind,
            kind => kind,
        };
        if let ExprKind::Member { property: MemberProp::Private(_), .. } = member {
            return Err(self.error_at(arg.span, "Private fields can not be deleted"));
        }
        Ok(())
    }

    /// Parse postfix expression.
    fn parse_postfix_expr(&mut self, ctx: Context, cover: &mut Cover) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        let mut inner = Cover::default();
        let expr = self.parse_lhs_expr(ctx, &mut inner)?;

        // Restricted production: no line terminator before `++`/`--`.
        let postfix = matches!(self.peek(), TokenKind::PlusPlus | TokenKind::MinusMinus)
            && !self.current.newline_before
            && !self.is_bare_arrow(&expr);
        if !postfix {
            cover.merge(inner);
            return Ok(expr);
        }

        self.finish_cover(cover, inner)?;
        self.check_simple_target(&expr, ctx, "Invalid left-hand side expression in postfix operation")?;
        let op = if self.check(&TokenKind::PlusPlus) {
            UpdateOp::Increment
        } else {
            UpdateOp::Decrement
        };
        self.advance()?;
        Ok(Expr::new(
            ExprKind::Update { op, prefix: false, arg: Box::new(expr) },
            self.span_from(start),
        ))
    }

    /// Parse left-hand-side expression (call, member access).
    pub(crate) fn parse_lhs_expr(&mut self, ctx: Context, cover: &mut Cover) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        let mut inner = Cover::default();
        let expr = self.parse_primary_expr(ctx, &mut inner)?;
        if self.is_bare_arrow(&expr) {
            cover.merge(inner);
            return Ok(expr);
        }
        self.parse_member_tail(ctx, start, expr, inner, cover, false)
    }

    /// Parse member accesses, calls and tagged templates after `expr`.
    ///
    /// `inner` is the cover of `expr` itself; it is settled as an expression
    /// as soon as any suffix applies. With `no_call` (a `new` callee) the
    /// tail stops before arguments.
    fn parse_member_tail(
        &mut self,
        ctx: Context,
        start: u32,
        mut expr: Expr,
        inner: Cover,
        cover: &mut Cover,
        no_call: bool,
    ) -> Result<Expr, ParseError> {
        let mut pending = Some(inner);
        let mut in_chain = false;

        loop {
            let suffix = match self.peek() {
                TokenKind::Dot | TokenKind::QuestionDot | TokenKind::LBracket => true,
                TokenKind::LParen => !no_call,
                TokenKind::TemplateNoSub(_) | TokenKind::TemplateHead(_) => true,
                _ => false,
            };
            if !suffix {
                break;
            }
            if let Some(inner) = pending.take() {
                self.finish_cover(cover, inner)?;
            }

            match self.peek() {
                TokenKind::Dot => {
                    self.advance()?;
                    let property = self.parse_member_property()?;
                    expr = Expr::new(
                        ExprKind::Member { object: Box::new(expr), property, optional: false },
                        self.span_from(start),
                    );
                }
                TokenKind::QuestionDot => {
                    let token = self.advance()?;
                    if no_call {
                        return Err(self.error_at(token.span, "Invalid optional chain from new expression"));
                    }
                    in_chain = true;
                    expr = match self.peek() {
                        TokenKind::LParen => {
                            let args = self.parse_arguments(ctx, cover)?;
                            Expr::new(
                                ExprKind::Call { callee: Box::new(expr), args, optional: true },
                                self.span_from(start),
                            )
                        }
                        TokenKind::LBracket => {
                            self.advance()?;
                            let property = self.parse_expr_into(ctx.without(Context::DISALLOW_IN), cover)?;
                            self.expect(&TokenKind::RBracket)?;
                            Expr::new(
                                ExprKind::Member {
                                    object: Box::new(expr),
                                    property: MemberProp::Computed(Box::new(property)),
                                    optional: true,
                                },
                                self.span_from(start),
                            )
                        }
                        TokenKind::TemplateNoSub(_) | TokenKind::TemplateHead(_) => {
                            return Err(self.error_at(self.current.span, "Invalid tagged template on optional chain"));
                        }
                        _ => {
                            let property = self.parse_member_property()?;
                            Expr::new(
                                ExprKind::Member { object: Box::new(expr), property, optional: true },
                                self.span_from(start),
                            )
                        }
                    };
                }
                TokenKind::LBracket => {
                    self.advance()?;
                    let property = self.parse_expr_into(ctx.without(Context::DISALLOW_IN), cover)?;
                    self.expect(&TokenKind::RBracket)?;
                    expr = Expr::new(
                        ExprKind::Member {
                            object: Box::new(expr),
                            property: MemberProp::Computed(Box::new(property)),
                            optional: false,
                        },
                        self.span_from(start),
                    );
                }
                TokenKind::LParen => {
                    let args = self.parse_arguments(ctx, cover)?;
                    expr = Expr::new(
                        ExprKind::Call { callee: Box::new(expr), args, optional: false },
                        self.span_from(start),
                    );
                }
                _ => {
                    if in_chain {
                        return Err(self.error_at(self.current.span, "Invalid tagged template on optional chain"));
                    }
                    let quasi = self.parse_template_literal(ctx, true, cover)?;
                    expr = Expr::new(
                        ExprKind::TaggedTemplate { tag: Box::new(expr), quasi: Box::new(quasi) },
                        self.span_from(start),
                    );
                }
            }
        }

        if let Some(inner) = pending {
            cover.merge(inner);
        }
        if in_chain {
            let span = expr.span;
            expr = Expr::new(ExprKind::Chain(Box::new(expr)), span);
        }
        Ok(expr)
    }

    /// The property after `.` or `?.`: a name or a private name.
    fn parse_member_property(&mut self) -> Result<MemberProp, ParseError> {
        if let TokenKind::PrivateName(name) = self.peek() {
            let name = name.clone();
            let token = self.advance()?;
            self.reference_private(&name, token.span)?;
            return Ok(MemberProp::Private(Identifier::new(name, token.span)));
        }
        Ok(MemberProp::Ident(self.parse_identifier_name()?))
    }

    /// Record a use of `#name`.
    pub(crate) fn reference_private(&mut self, name: &str, span: Span) -> Result<(), ParseError> {
        self.private_names
            .reference(name, span)
            .map_err(|message| self.error_at(span, message))
    }

    /// Parse function call arguments.
    fn parse_arguments(&mut self, ctx: Context, cover: &mut Cover) -> Result<Vec<Expr>, ParseError> {
        let ctx = ctx.without(Context::DISALLOW_IN);
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        while !self.check(&TokenKind::RParen) {
            if self.check(&TokenKind::Spread) {
                let start = self.current.span.start;
                self.advance()?;
                let arg = self.parse_assign_into(ctx, cover)?;
                args.push(Expr::new(ExprKind::Spread(Box::new(arg)), self.span_from(start)));
            } else {
                args.push(self.parse_assign_into(ctx, cover)?);
            }
            if !self.check(&TokenKind::RParen) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(args)
    }

    /// Parse `new` expressions and `new.target`.
    fn parse_new_expr(&mut self, ctx: Context, cover: &mut Cover) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        let new_token = self.advance()?; // new

        if self.check(&TokenKind::Dot) {
            self.advance()?;
            let escaped = self.current.escaped;
            let property = self.parse_identifier_name()?;
            if property.name != "target" || escaped {
                return Err(self.error_at(property.span, "The only valid meta property for new is 'new.target'"));
            }
            if !ctx.contains(Context::ALLOW_NEW_TARGET) {
                return Err(self.error_at(self.span_from(start), "new.target expression is not allowed here"));
            }
            return Ok(Expr::new(
                ExprKind::MetaProperty { meta: Identifier::new("new", new_token.span), property },
                self.span_from(start),
            ));
        }
        if self.check(&TokenKind::Import) {
            return Err(self.error_at(self.current.span, "Cannot use new with import"));
        }

        let callee_start = self.current.span.start;
        let mut inner = Cover::default();
        let callee = self.parse_primary_expr(ctx, &mut inner)?;
        self.reject_arrow_operand(&callee)?;
        let callee = self.parse_member_tail(ctx, callee_start, callee, inner, cover, true)?;
        let args = if self.check(&TokenKind::LParen) {
            self.parse_arguments(ctx, cover)?
        } else {
            Vec::new()
        };
        Ok(Expr::new(
            ExprKind::New { callee: Box::new(callee), args },
            self.span_from(start),
        ))
    }

    // =========================================================================
    // Primary Expressions
    // =========================================================================

    /// Parse primary expression.
    fn parse_primary_expr(&mut self, ctx: Context, cover: &mut Cover) -> Result<Expr, ParseError> {
        let start = self.current.span.start;

        match self.peek() {
            TokenKind::Identifier(_) => self.parse_identifier_expr(ctx, cover),
            TokenKind::Number(n) => {
                let n = *n;
                self.check_legacy_octal(ctx)?;
                self.advance()?;
                Ok(Expr::new(ExprKind::Number(n), self.span_from(start)))
            }
            TokenKind::BigInt(digits) => {
                let digits = digits.clone();
                self.advance()?;
                Ok(Expr::new(ExprKind::BigInt(digits), self.span_from(start)))
            }
            TokenKind::String(s) => {
                let s = s.clone();
                self.check_legacy_octal(ctx)?;
                self.advance()?;
                Ok(Expr::new(ExprKind::String(s), self.span_from(start)))
            }
            TokenKind::Slash | TokenKind::SlashEq | TokenKind::Regex { .. } => {
                if !matches!(self.peek(), TokenKind::Regex { .. }) {
                    self.current = self.lexer.rescan_regex(start)?;
                }
                let token = self.advance()?;
                let TokenKind::Regex { pattern, flags } = token.kind else {
                    return Err(self.error_at(token.span, "Invalid regular expression"));
                };
                Ok(Expr::new(ExprKind::Regex { pattern, flags }, token.span))
            }
            TokenKind::TemplateNoSub(_) | TokenKind::TemplateHead(_) => {
                let template = self.parse_template_literal(ctx, false, cover)?;
                let span = template.span;
                Ok(Expr::new(ExprKind::Template(Box::new(template)), span))
            }
            TokenKind::LParen => self.parse_paren_or_arrow(ctx, cover),
            TokenKind::LBracket => self.parse_array_literal(ctx, cover),
            TokenKind::LBrace => self.parse_object_literal(ctx, cover),
            TokenKind::Function => self.parse_function_expr(ctx, start, false),
            TokenKind::Class => {
                let class = self.parse_class(ctx, false, false)?;
                Ok(Expr::new(ExprKind::Class(Box::new(class)), self.span_from(start)))
            }
            TokenKind::New => self.parse_new_expr(ctx, cover),
            TokenKind::This => {
                self.advance()?;
                Ok(Expr::new(ExprKind::This, self.span_from(start)))
            }
            TokenKind::Null => {
                self.advance()?;
                Ok(Expr::new(ExprKind::Null, self.span_from(start)))
            }
            TokenKind::True | TokenKind::False => {
                let value = self.check(&TokenKind::True);
                self.advance()?;
                Ok(Expr::new(ExprKind::Bool(value), self.span_from(start)))
            }
            TokenKind::Super => self.parse_super(ctx),
            TokenKind::Import => self.parse_import_expr(ctx),
            _ => Err(self.unexpected()),
        }
    }

    /// Legacy octal literals and escapes are errors in strict code.
    fn check_legacy_octal(&self, ctx: Context) -> Result<(), ParseError> {
        if !self.current.legacy_octal || !ctx.is_strict() {
            return Ok(());
        }
        let message = if matches!(self.peek(), TokenKind::String(_)) {
            "Octal escape sequences are not allowed in strict mode"
        } else {
            "Octal literals are not allowed in strict mode"
        };
        Err(self.error_at(self.current.span, message))
    }

    /// Parse an identifier reference, or an arrow function or async form
    /// that starts with one.
    fn parse_identifier_expr(&mut self, ctx: Context, cover: &mut Cover) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        let TokenKind::Identifier(name) = self.peek() else {
            return Err(self.unexpected());
        };
        let name = name.clone();

        if self.is_contextual("async") {
            let async_token = self.advance()?;
            if !self.current.newline_before {
                match self.peek() {
                    TokenKind::Function => return self.parse_function_expr(ctx, start, true),
                    TokenKind::Identifier(_) => {
                        // `async x => ...`
                        if self.lookahead()?.kind == TokenKind::Arrow {
                            let param = self.parse_arrow_param_ident()?;
                            return self.parse_arrow_function(ctx, start, vec![param], true, Cover::default());
                        }
                    }
                    TokenKind::LParen => return self.parse_async_call_or_arrow(ctx, start, async_token.span, cover),
                    _ => {}
                }
            }
            if self.check(&TokenKind::Arrow) {
                let param = Expr::new(ExprKind::Ident(name), async_token.span);
                return self.parse_arrow_function(ctx, start, vec![param], false, Cover::default());
            }
            return Ok(Expr::new(ExprKind::Ident(name), async_token.span));
        }

        let token = self.advance()?;
        self.check_escaped_keyword(&token, &name)?;
        if self.check(&TokenKind::Arrow) {
            // `x => ...`
            let param = Expr::new(ExprKind::Ident(name), token.span);
            return self.parse_arrow_function(ctx, start, vec![param], false, Cover::default());
        }

        self.check_reference_name(&name, token.span, ctx)?;
        if name == "await" {
            cover.await_ident = cover.await_ident.or(Some(token.span));
        }
        Ok(Expr::new(ExprKind::Ident(name), token.span))
    }

    /// The single parameter of `async x => ...`.
    fn parse_arrow_param_ident(&mut self) -> Result<Expr, ParseError> {
        let TokenKind::Identifier(name) = self.peek() else {
            return Err(self.unexpected());
        };
        let name = name.clone();
        let token = self.advance()?;
        self.check_escaped_keyword(&token, &name)?;
        Ok(Expr::new(ExprKind::Ident(name), token.span))
    }

    /// Parse `super.x`, `super[x]` or `super(...)`.
    fn parse_super(&mut self, ctx: Context) -> Result<Expr, ParseError> {
        let token = self.advance()?; // super
        let allowed = match self.peek() {
            TokenKind::LParen => ctx.contains(Context::ALLOW_SUPER_CALL),
            TokenKind::Dot | TokenKind::LBracket => ctx.contains(Context::ALLOW_SUPER_PROPERTY),
            _ => false,
        };
        if !allowed {
            return Err(self.error_at(token.span, "'super' keyword unexpected here"));
        }
        Ok(Expr::new(ExprKind::Super, token.span))
    }

    /// Parse `import(...)` or `import.meta`.
    fn parse_import_expr(&mut self, ctx: Context) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        let import_token = self.advance()?; // import

        if self.check(&TokenKind::Dot) {
            self.advance()?;
            let escaped = self.current.escaped;
            let property = self.parse_identifier_name()?;
            if property.name != "meta" || escaped {
                return Err(self.error_at(property.span, "The only valid meta property for import is 'import.meta'"));
            }
            if !ctx.is_module() {
                return Err(self.error_at(self.span_from(start), "Cannot use 'import.meta' outside a module"));
            }
            return Ok(Expr::new(
                ExprKind::MetaProperty { meta: Identifier::new("import", import_token.span), property },
                self.span_from(start),
            ));
        }

        let ctx = ctx.without(Context::DISALLOW_IN);
        self.expect(&TokenKind::LParen)?;
        let source = self.parse_assign_expr(ctx)?;
        let mut options = None;
        if self.check(&TokenKind::Comma) {
            if !ctx.contains(Context::NEXT) {
                return Err(self.unexpected());
            }
            self.advance()?;
            if !self.check(&TokenKind::RParen) {
                options = Some(Box::new(self.parse_assign_expr(ctx)?));
                self.eat(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(Expr::new(
            ExprKind::Import { source: Box::new(source), options },
            self.span_from(start),
        ))
    }

    /// Parse a template literal. Invalid escapes are allowed only when
    /// `tagged`.
    fn parse_template_literal(&mut self, ctx: Context, tagged: bool, cover: &mut Cover) -> Result<TemplateLiteral, ParseError> {
        let start = self.current.span.start;
        let mut quasis = Vec::new();
        let mut exprs = Vec::new();

        loop {
            let (part, tail) = match self.peek() {
                TokenKind::TemplateNoSub(part) | TokenKind::TemplateTail(part) => (part.clone(), true),
                TokenKind::TemplateHead(part) | TokenKind::TemplateMiddle(part) => (part.clone(), false),
                _ => return Err(self.unexpected()),
            };
            let span = self.current.span;
            if !tagged && part.cooked.is_none() {
                return Err(self.error_at(span, "Invalid escape sequence in template"));
            }
            // Strip the delimiters: "`" or "}" before, "`" or "${" after.
            let closer = if tail { 1 } else { 2 };
            quasis.push(TemplateElement {
                cooked: part.cooked,
                raw: part.raw,
                tail,
                span: Span::new(span.start + 1, span.end - closer),
            });
            self.advance()?;
            if tail {
                break;
            }

            exprs.push(self.parse_expr_into(ctx.without(Context::DISALLOW_IN), cover)?);
            if !self.check(&TokenKind::RBrace) {
                return Err(self.unexpected());
            }
            self.current = self.lexer.rescan_template_continuation(self.current.span.start)?;
        }

        Ok(TemplateLiteral { quasis, exprs, span: self.span_from(start) })
    }

    // =========================================================================
    // Array, Object and Parenthesized Covers
    // =========================================================================

    /// Parse array literal: `[a, , ...b]`
    fn parse_array_literal(&mut self, ctx: Context, cover: &mut Cover) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        self.advance()?; // [
        let ctx = ctx.without(Context::DISALLOW_IN);

        let mut elements = Vec::new();
        while !self.check(&TokenKind::RBracket) {
            if self.eat(&TokenKind::Comma)? {
                // Elision
                elements.push(None);
                continue;
            }

            let is_spread = self.check(&TokenKind::Spread);
            let element = if is_spread {
                let spread_start = self.current.span.start;
                self.advance()?;
                let arg = self.parse_assign_cover(ctx, cover)?;
                Expr::new(ExprKind::Spread(Box::new(arg)), self.span_from(spread_start))
            } else {
                self.parse_assign_cover(ctx, cover)?
            };
            let element_span = element.span;
            elements.push(Some(element));

            if !self.check(&TokenKind::RBracket) {
                self.expect(&TokenKind::Comma)?;
                if is_spread && self.check(&TokenKind::RBracket) {
                    cover.trailing_rest = cover.trailing_rest.or(Some(element_span));
                }
            }
        }
        self.expect(&TokenKind::RBracket)?;

        Ok(Expr::new(ExprKind::Array(elements), self.span_from(start)))
    }

    /// Parse object literal: `{a: 1, b, ...c, m() {}}`
    fn parse_object_literal(&mut self, ctx: Context, cover: &mut Cover) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        self.advance()?; // {
        let ctx = ctx.without(Context::DISALLOW_IN);

        let mut members = Vec::new();
        let mut has_proto = false;
        while !self.check(&TokenKind::RBrace) {
            if self.check(&TokenKind::Spread) {
                let spread_start = self.current.span.start;
                self.advance()?;
                let arg = self.parse_assign_cover(ctx, cover)?;
                let spread = Expr::new(ExprKind::Spread(Box::new(arg)), self.span_from(spread_start));
                let spread_span = spread.span;
                members.push(ObjectMember::Spread(spread));
                if !self.check(&TokenKind::RBrace) {
                    self.expect(&TokenKind::Comma)?;
                    if self.check(&TokenKind::RBrace) {
                        cover.trailing_rest = cover.trailing_rest.or(Some(spread_span));
                    }
                }
                continue;
            }

            let property = self.parse_object_property(ctx, cover, &mut has_proto)?;
            members.push(ObjectMember::Property(Box::new(property)));
            if !self.check(&TokenKind::RBrace) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RBrace)?;

        Ok(Expr::new(ExprKind::Object(members), self.span_from(start)))
    }

    /// True when the token after a `get`, `set` or `async` prefix means the
    /// prefix is itself the property name.
    pub(crate) fn modifier_is_name(&mut self) -> Result<bool, ParseError> {
        let next = self.lookahead()?;
        Ok(matches!(
            next.kind,
            TokenKind::Comma | TokenKind::Colon | TokenKind::LParen | TokenKind::RBrace | TokenKind::Eq | TokenKind::Semicolon
        ))
    }

    fn parse_object_property(&mut self, ctx: Context, cover: &mut Cover, has_proto: &mut bool) -> Result<Property, ParseError> {
        let start = self.current.span.start;
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

        let key_token = self.current.clone();
        let (key, computed) = self.parse_property_key(ctx, cover)?;

        if accessor.is_some() || is_async || is_generator || self.check(&TokenKind::LParen) {
            let kind = accessor.unwrap_or(PropertyKind::Method);
            let function = self.parse_method_function(ctx, is_async, is_generator, kind, Context::ALLOW_SUPER_PROPERTY)?;
            let span = function.span;
            return Ok(Property {
                key,
                value: Expr::new(ExprKind::Function(Box::new(function)), span),
                kind,
                shorthand: false,
                computed,
                span: self.span_from(start),
            });
        }

        if self.eat(&TokenKind::Colon)? {
            let value = self.parse_assign_cover(ctx, cover)?;
            if !computed && key.static_name().as_deref() == Some("__proto__") {
                if *has_proto {
                    cover.duplicate_proto = cover.duplicate_proto.or(Some(key.span));
                }
                *has_proto = true;
            }
            return Ok(Property {
                key,
                value,
                kind: PropertyKind::Init,
                shorthand: false,
                computed,
                span: self.span_from(start),
            });
        }

        // Shorthand: `{a}` or, as a pattern only, `{a = 1}`
        let TokenKind::Identifier(name) = &key_token.kind else {
            return Err(self.unexpected());
        };
        let name = name.clone();
        self.check_escaped_keyword(&key_token, &name)?;
        self.check_reference_name(&name, key_token.span, ctx)?;
        if name == "await" {
            cover.await_ident = cover.await_ident.or(Some(key_token.span));
        }

        let value = if self.check(&TokenKind::Eq) {
            self.check_simple_assign_name(&name, key_token.span, ctx)?;
            let eq = self.advance()?;
            cover.shorthand_init = cover.shorthand_init.or(Some(eq.span));
            let right = self.parse_assign_into(ctx, cover)?;
            Expr::new(
                ExprKind::Assign {
                    op: AssignOp::Assign,
                    left: Box::new(Pattern::new(PatternKind::Ident(name), key_token.span)),
                    right: Box::new(right),
                },
                self.span_from(start),
            )
        } else {
            Expr::new(ExprKind::Ident(name), key_token.span)
        };

        Ok(Property {
            key,
            value,
            kind: PropertyKind::Init,
            shorthand: true,
            computed: false,
            span: self.span_from(start),
        })
    }

    /// Parse a property name: identifier (reserved words allowed), string,
    /// number or `[computed]`. Returns the key and whether it is computed.
    pub(crate) fn parse_property_key(&mut self, ctx: Context, cover: &mut Cover) -> Result<(Expr, bool), ParseError> {
        let start = self.current.span.start;
        let kind = match self.peek() {
            TokenKind::Identifier(name) => ExprKind::Ident(name.clone()),
            TokenKind::String(s) => {
                let s = s.clone();
                self.check_legacy_octal(ctx)?;
                ExprKind::String(s)
            }
            TokenKind::Number(n) => {
                let n = *n;
                self.check_legacy_octal(ctx)?;
                ExprKind::Number(n)
            }
            TokenKind::BigInt(digits) => ExprKind::BigInt(digits.clone()),
            TokenKind::LBracket => {
                self.advance()?;
                let key = self.parse_assign_into(ctx.without(Context::DISALLOW_IN), cover)?;
                self.expect(&TokenKind::RBracket)?;
                return Ok((key, true));
            }
            kind => match kind.keyword_str() {
                Some(word) => ExprKind::Ident(word.to_string()),
                None => return Err(self.unexpected()),
            },
        };
        self.advance()?;
        Ok((Expr::new(kind, self.span_from(start)), false))
    }

    /// Parse `( ... )`: a parenthesized expression or arrow parameters.
    fn parse_paren_or_arrow(&mut self, ctx: Context, cover: &mut Cover) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        self.advance()?; // (
        let inner_start = self.current.span.start;
        let inner_ctx = ctx.without(Context::DISALLOW_IN);

        let mut list_cover = Cover::default();
        let mut exprs = Vec::new();
        // Rest element or trailing comma: only an arrow head can follow.
        let mut arrow_only = false;

        while !self.check(&TokenKind::RParen) {
            if self.check(&TokenKind::Spread) {
                let spread_start = self.current.span.start;
                self.advance()?;
                let arg = self.parse_assign_cover(inner_ctx, &mut list_cover)?;
                exprs.push(Expr::new(ExprKind::Spread(Box::new(arg)), self.span_from(spread_start)));
                arrow_only = true;
                if !self.check(&TokenKind::RParen) {
                    return Err(self.error_at(self.current.span, "Rest parameter must be last formal parameter"));
                }
                break;
            }
            exprs.push(self.parse_assign_cover(inner_ctx, &mut list_cover)?);
            if !self.check(&TokenKind::RParen) {
                self.expect(&TokenKind::Comma)?;
                if self.check(&TokenKind::RParen) {
                    arrow_only = true;
                }
            }
        }
        let inner_end = self.prev_end;
        self.expect(&TokenKind::RParen)?;

        if self.check(&TokenKind::Arrow) {
            return self.parse_arrow_function(ctx, start, exprs, false, list_cover);
        }
        if arrow_only || exprs.is_empty() {
            return Err(self.unexpected());
        }

        self.finish_cover(cover, list_cover)?;
        let expr = if exprs.len() == 1 {
            exprs.remove(0)
        } else {
            Expr::new(ExprKind::Sequence(exprs), Span::new(inner_start, inner_end))
        };
        self.parenthesized.insert(expr.span);
        Ok(expr)
    }

    /// Parse `async(...)` as a call, or as async arrow parameters when `=>`
    /// follows.
    fn parse_async_call_or_arrow(&mut self, ctx: Context, start: u32, async_span: Span, cover: &mut Cover) -> Result<Expr, ParseError> {
        self.advance()?; // (
        let inner_ctx = ctx.without(Context::DISALLOW_IN);
        let mut list_cover = Cover::default();
        let mut args = Vec::new();
        let mut rest_not_last = None;

        while !self.check(&TokenKind::RParen) {
            if self.check(&TokenKind::Spread) {
                let spread_start = self.current.span.start;
                self.advance()?;
                let arg = self.parse_assign_cover(inner_ctx, &mut list_cover)?;
                let spread = Expr::new(ExprKind::Spread(Box::new(arg)), self.span_from(spread_start));
                if !self.check(&TokenKind::RParen) {
                    rest_not_last = rest_not_last.or(Some(spread.span));
                }
                args.push(spread);
            } else {
                args.push(self.parse_assign_cover(inner_ctx, &mut list_cover)?);
            }
            if !self.check(&TokenKind::RParen) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RParen)?;

        if self.check(&TokenKind::Arrow) && !self.current.newline_before {
            if let Some(span) = rest_not_last {
                return Err(self.error_at(span, "Rest parameter must be last formal parameter"));
            }
            return self.parse_arrow_function(ctx, start, args, true, list_cover);
        }

        self.finish_cover(cover, list_cover)?;
        Ok(Expr::new(
            ExprKind::Call {
                callee: Box::new(Expr::new(ExprKind::Ident("async".into()), async_span)),
                args,
                optional: false,
            },
            self.span_from(start),
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::error::ParseError;
    use crate::options::ParserOptions;
    use crate::parser::Parser;

    fn parse_expr(source: &str) -> Result<Expr, ParseError> {
        let program = Parser::new(source, ParserOptions::default())?.parse()?;
        match program.body.into_iter().next().map(|s| s.kind) {
            Some(StmtKind::Expr { expr, .. }) => Ok(*expr),
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    fn parses(source: &str) -> bool {
        Parser::new(source, ParserOptions::default()).and_then(|p| p.parse()).is_ok()
    }

    #[test]
    fn test_precedence() {
        // a + b * c => a + (b * c)
        let expr = parse_expr("a + b * c").unwrap();
        let ExprKind::Binary { op: BinaryOp::Add, right, .. } = expr.kind else { panic!() };
        assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn test_exponent() {
        // a ** b + c => (a ** b) + c
        let expr = parse_expr("a ** b + c").unwrap();
        let ExprKind::Binary { op: BinaryOp::Add, left, .. } = expr.kind else { panic!() };
        assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Pow, .. }));

        // Right associative: a ** b ** c => a ** (b ** c)
        let expr = parse_expr("a ** b ** c").unwrap();
        let ExprKind::Binary { right, .. } = expr.kind else { panic!() };
        assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Pow, .. }));

        assert!(!parses("-a ** b"));
        assert!(!parses("typeof a ** b"));
        assert!(parses("(-a) ** b"));
        assert!(parses("-(a ** b)"));
        assert!(parses("a ** -b"));
    }

    #[test]
    fn test_nullish_mixing() {
        assert!(!parses("a ?? b || c"));
        assert!(!parses("a || b ?? c"));
        assert!(!parses("a && b ?? c"));
        assert!(parses("(a || b) ?? c"));
        assert!(parses("a ?? (b && c)"));
        assert!(parses("a ?? b ?? c"));
    }

    #[test]
    fn test_arrow_vs_sequence() {
        let expr = parse_expr("(a, b) => a").unwrap();
        let ExprKind::Arrow(arrow) = expr.kind else { panic!() };
        assert_eq!(arrow.params.len(), 2);

        let expr = parse_expr("(a, b)").unwrap();
        let ExprKind::Sequence(exprs) = expr.kind else { panic!() };
        assert_eq!(exprs.len(), 2);
        // The sequence span excludes the parentheses.
        assert_eq!(expr.span.start, 1);
        assert_eq!(expr.span.end, 5);
    }

    #[test]
    fn test_arrow_params() {
        assert!(parses("(a, ...b) => a"));
        assert!(parses("([a, b], {c}) => a"));
        assert!(parses("(a = 1, {b = 2}) => a"));
        assert!(parses("(a,) => a"));
        assert!(!parses("(a,)"));
        assert!(!parses("()"));
        assert!(!parses("(...a, b) => a"));
        assert!(!parses("(a, a) => a"));
        assert!(!parses("((a)) => a"));
        assert!(!parses("(a.b) => a"));
        assert!(!parses("(1) => a"));
        assert!(!parses("(a)\n=> a"));
        assert!(!parses("function* g() { (a = yield) => a }"));
        assert!(!parses("async function f() { (a = await b) => a }"));
    }

    #[test]
    fn test_async_arrows() {
        let expr = parse_expr("async (a) => a").unwrap();
        assert!(matches!(&expr.kind, ExprKind::Arrow(arrow) if arrow.is_async));
        let expr = parse_expr("async x => x").unwrap();
        assert!(matches!(&expr.kind, ExprKind::Arrow(arrow) if arrow.is_async));
        let expr = parse_expr("async(a, b)").unwrap();
        assert!(matches!(expr.kind, ExprKind::Call { .. }));
        let expr = parse_expr("async => async").unwrap();
        assert!(matches!(&expr.kind, ExprKind::Arrow(arrow) if !arrow.is_async));
        assert!(!parses("async (await) => 1"));
        assert!(!parses("async (x = await) => 1"));
        assert!(parses("async (x = await)"));
    }

    #[test]
    fn test_destructuring_assignment() {
        let expr = parse_expr("[a, b] = c").unwrap();
        let ExprKind::Assign { left, .. } = expr.kind else { panic!() };
        assert!(matches!(left.kind, PatternKind::Array(_)));

        assert!(parses("({a, b: c.d, e = 1} = f)"));
        assert!(parses("[a.b, [c]] = d"));
        assert!(!parses("({a = 1})"));
        assert!(!parses("[{a = 1}]"));
        assert!(parses("[{a = 1}] = b"));
        assert!(!parses("[...a, b] = c"));
        assert!(!parses("[...a,] = c"));
        assert!(parses("[...a,]"));
        assert!(!parses("({a}) = b"));
        assert!(parses("(a) = b"));
        assert!(!parses("a + b = c"));
        assert!(!parses("a?.b = c"));
        assert!(!parses("({get a() {}} = b)"));
    }

    #[test]
    fn test_duplicate_proto() {
        assert!(!parses("({__proto__: a, __proto__: b})"));
        assert!(parses("({__proto__: a, __proto__: b} = c)"));
        assert!(parses("({__proto__: a, ['__proto__']: b})"));
        assert!(parses("({a, a: 1})"));
    }

    #[test]
    fn test_optional_chains() {
        let expr = parse_expr("a?.b.c").unwrap();
        let ExprKind::Chain(inner) = expr.kind else { panic!() };
        assert!(matches!(inner.kind, ExprKind::Member { optional: false, .. }));
        assert!(parses("a?.[b]?.(c)"));
        assert!(!parses("a?.b`c`"));
        assert!(!parses("new a?.b()"));
    }

    #[test]
    fn test_templates() {
        let expr = parse_expr("`a${b}c`").unwrap();
        let ExprKind::Template(template) = expr.kind else { panic!() };
        assert_eq!(template.quasis.len(), 2);
        assert_eq!(template.exprs.len(), 1);
        assert_eq!(template.quasis[0].span.start, 1);
        assert_eq!(template.quasis[0].span.end, 2);
        assert!(!parses("`\\unicode`"));
        assert!(parses("tag`\\unicode`"));
        assert!(parses("`${ {a: `${b}`} }`"));
    }

    #[test]
    fn test_regex_and_division() {
        let expr = parse_expr("a / b").unwrap();
        assert!(matches!(expr.kind, ExprKind::Binary { op: BinaryOp::Div, .. }));
        let expr = parse_expr("/x/g").unwrap();
        assert!(matches!(expr.kind, ExprKind::Regex { .. }));
        let expr = parse_expr("a = /=/").unwrap();
        let ExprKind::Assign { right, .. } = expr.kind else { panic!() };
        assert!(matches!(right.kind, ExprKind::Regex { ref pattern, .. } if pattern == "="));
    }

    #[test]
    fn test_update_targets() {
        assert!(parses("a++; --b.c"));
        assert!(!parses("1++"));
        assert!(!parses("++a()"));
        assert!(!parses("'use strict'; eval++"));
        let program = Parser::new("a\n++b", ParserOptions::default()).unwrap().parse().unwrap();
        assert_eq!(program.body.len(), 2);
    }

    #[test]
    fn test_new_and_meta() {
        let expr = parse_expr("new a.b(c).d").unwrap();
        let ExprKind::Member { object, .. } = expr.kind else { panic!() };
        assert!(matches!(object.kind, ExprKind::New { ref args, .. } if args.len() == 1));
        assert!(!parses("new.target"));
        assert!(parses("function f() { new.target }"));
        assert!(parses("function f() { () => new.target }"));
        assert!(!parses("import.meta"));
    }

    #[test]
    fn test_strict_delete() {
        assert!(parses("delete a"));
        assert!(!parses("'use strict'; delete a"));
        assert!(!parses("'use strict'; delete (a)"));
        assert!(parses("'use strict'; delete a.b"));
    }
}
