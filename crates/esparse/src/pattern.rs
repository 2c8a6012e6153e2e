//! Binding patterns and the conversion of covered expressions into
//! assignment targets and arrow parameters.

use crate::ast::*;
use crate::context::Context;
use crate::error::ParseError;
use crate::expr::Cover;
use crate::parser::Parser;
use crate::span::Span;
use crate::token::TokenKind;

/// Names bound by a pattern, in source order.
pub(crate) type BoundNames = Vec<(String, Span)>;

const INVALID_TARGET: &str = "Invalid destructuring assignment target";
const REST_NOT_LAST: &str = "Rest element must be last element";

impl<'a> Parser<'a> {
    // =========================================================================
    // Binding Patterns
    // =========================================================================

    /// Parse a BindingIdentifier or BindingPattern, collecting bound names.
    pub(crate) fn parse_binding_target(&mut self, ctx: Context, names: &mut BoundNames) -> Result<Pattern, ParseError> {
        match self.peek() {
            TokenKind::LBracket => self.parse_array_binding(ctx, names),
            TokenKind::LBrace => self.parse_object_binding(ctx, names),
            _ => {
                let id = self.parse_binding_identifier(ctx)?;
                names.push((id.name.clone(), id.span));
                Ok(Pattern::new(PatternKind::Ident(id.name), id.span))
            }
        }
    }

    /// Parse a binding target with an optional `= default`.
    pub(crate) fn parse_binding_element(&mut self, ctx: Context, names: &mut BoundNames) -> Result<Pattern, ParseError> {
        let start = self.current.span.start;
        let target = self.parse_binding_target(ctx, names)?;
        if !self.eat(&TokenKind::Eq)? {
            return Ok(target);
        }
        let right = self.parse_assign_expr(ctx.without(Context::DISALLOW_IN))?;
        Ok(Pattern::new(
            PatternKind::Assign { left: Box::new(target), right: Box::new(right) },
            self.span_from(start),
        ))
    }

    /// Parse `[a, , b = 1, ...rest]`.
    fn parse_array_binding(&mut self, ctx: Context, names: &mut BoundNames) -> Result<Pattern, ParseError> {
        let start = self.current.span.start;
        self.advance()?; // [

        let mut elements = Vec::new();
        while !self.check(&TokenKind::RBracket) {
            if self.eat(&TokenKind::Comma)? {
                elements.push(None);
                continue;
            }
            if self.check(&TokenKind::Spread) {
                elements.push(Some(self.parse_binding_rest(ctx, names)?));
                if !self.check(&TokenKind::RBracket) {
                    return Err(self.error_at(self.current.span, REST_NOT_LAST));
                }
                break;
            }
            elements.push(Some(self.parse_binding_element(ctx, names)?));
            if !self.check(&TokenKind::RBracket) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RBracket)?;

        Ok(Pattern::new(PatternKind::Array(elements), self.span_from(start)))
    }

    /// Parse `...target`.
    pub(crate) fn parse_binding_rest(&mut self, ctx: Context, names: &mut BoundNames) -> Result<Pattern, ParseError> {
        let start = self.current.span.start;
        self.advance()?; // ...
        let target = self.parse_binding_target(ctx, names)?;
        if self.check(&TokenKind::Eq) {
            return Err(self.error_at(self.current.span, "Rest elements cannot have a default value"));
        }
        Ok(Pattern::new(PatternKind::Rest(Box::new(target)), self.span_from(start)))
    }

    /// Parse `{a, b: c, d = 1, ...rest}`.
    fn parse_object_binding(&mut self, ctx: Context, names: &mut BoundNames) -> Result<Pattern, ParseError> {
        let start = self.current.span.start;
        self.advance()?; // {

        let mut props = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.check(&TokenKind::Spread) {
                let rest_start = self.current.span.start;
                self.advance()?;
                let id = self.parse_binding_identifier(ctx)?;
                names.push((id.name.clone(), id.span));
                let target = Pattern::new(PatternKind::Ident(id.name), id.span);
                props.push(ObjectPatternProp::Rest(Pattern::new(
                    PatternKind::Rest(Box::new(target)),
                    self.span_from(rest_start),
                )));
                if !self.check(&TokenKind::RBrace) {
                    return Err(self.error_at(self.current.span, REST_NOT_LAST));
                }
                break;
            }

            props.push(ObjectPatternProp::Property(Box::new(self.parse_binding_property(ctx, names)?)));
            if !self.check(&TokenKind::RBrace) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RBrace)?;

        Ok(Pattern::new(PatternKind::Object(props), self.span_from(start)))
    }

    fn parse_binding_property(&mut self, ctx: Context, names: &mut BoundNames) -> Result<PatternProperty, ParseError> {
        let start = self.current.span.start;
        let key_token = self.current.clone();
        let mut cover = Cover::default();
        let (key, computed) = self.parse_property_key(ctx, &mut cover)?;
        self.finish_cover(&mut Cover::default(), cover)?;

        if self.eat(&TokenKind::Colon)? {
            let value = self.parse_binding_element(ctx, names)?;
            return Ok(PatternProperty { key, value, computed, shorthand: false, span: self.span_from(start) });
        }

        // Shorthand: only a plain identifier can be both key and binding.
        let TokenKind::Identifier(name) = &key_token.kind else {
            return Err(self.unexpected());
        };
        let name = name.clone();
        self.check_escaped_keyword(&key_token, &name)?;
        self.check_binding_name(&name, key_token.span, ctx)?;
        names.push((name.clone(), key_token.span));

        let mut value = Pattern::new(PatternKind::Ident(name), key_token.span);
        if self.eat(&TokenKind::Eq)? {
            let right = self.parse_assign_expr(ctx.without(Context::DISALLOW_IN))?;
            value = Pattern::new(
                PatternKind::Assign { left: Box::new(value), right: Box::new(right) },
                self.span_from(start),
            );
        }
        Ok(PatternProperty { key, value, computed: false, shorthand: true, span: self.span_from(start) })
    }

    // =========================================================================
    // Simple Assignment Targets
    // =========================================================================

    /// `eval` and `arguments` cannot be assigned in strict code.
    pub(crate) fn check_simple_assign_name(&self, name: &str, span: Span, ctx: Context) -> Result<(), ParseError> {
        if ctx.is_strict() && (name == "eval" || name == "arguments") {
            return Err(self.error_at(span, format!("Assigning to '{name}' in strict mode")));
        }
        Ok(())
    }

    /// Only identifiers and member expressions (parentheses allowed) are
    /// simple targets; optional chains are not.
    pub(crate) fn check_simple_target(&self, expr: &Expr, ctx: Context, message: &str) -> Result<(), ParseError> {
        match &expr.kind {
            ExprKind::Ident(name) => self.check_simple_assign_name(name, expr.span, ctx),
            ExprKind::Member { .. } => Ok(()),
            _ => Err(self.error_at(expr.span, message)),
        }
    }

    /// The left side of a compound assignment or of `=` with a simple target.
    pub(crate) fn to_simple_target(&self, expr: Expr, ctx: Context, message: &str) -> Result<Pattern, ParseError> {
        self.check_simple_target(&expr, ctx, message)?;
        let span = expr.span;
        let kind = match expr.kind {
            ExprKind::Ident(name) => PatternKind::Ident(name),
            kind => PatternKind::Member(Box::new(Expr::new(kind, span))),
        };
        Ok(Pattern::new(kind, span))
    }

    // =========================================================================
    // Destructuring Assignment Targets
    // =========================================================================

    /// Reinterpret an expression as the target of `=` or of a for-in/of
    /// head.
    pub(crate) fn to_assign_target(&self, expr: Expr, cover: &Cover, ctx: Context) -> Result<Pattern, ParseError> {
        if let Some(span) = cover.trailing_rest {
            return Err(self.error_at(span, REST_NOT_LAST));
        }
        self.expr_to_assign_pattern(expr, ctx)
    }

    fn expr_to_assign_pattern(&self, expr: Expr, ctx: Context) -> Result<Pattern, ParseError> {
        let parenthesized = self.is_parenthesized(&expr);
        let span = expr.span;
        match expr.kind {
            ExprKind::Ident(name) => {
                self.check_simple_assign_name(&name, span, ctx)?;
                Ok(Pattern::new(PatternKind::Ident(name), span))
            }
            kind @ ExprKind::Member { .. } => Ok(Pattern::new(PatternKind::Member(Box::new(Expr::new(kind, span))), span)),
            ExprKind::Array(elements) if !parenthesized => {
                let last = elements.len().saturating_sub(1);
                let mut patterns = Vec::with_capacity(elements.len());
                for (i, element) in elements.into_iter().enumerate() {
                    let Some(element) = element else {
                        patterns.push(None);
                        continue;
                    };
                    let pattern = if let ExprKind::Spread(arg) = element.kind {
                        if i != last {
                            return Err(self.error_at(element.span, REST_NOT_LAST));
                        }
                        let target = self.expr_to_assign_pattern(*arg, ctx)?;
                        Pattern::new(PatternKind::Rest(Box::new(target)), element.span)
                    } else {
                        self.expr_to_assign_element(element, ctx)?
                    };
                    patterns.push(Some(pattern));
                }
                Ok(Pattern::new(PatternKind::Array(patterns), span))
            }
            ExprKind::Object(members) if !parenthesized => {
                let last = members.len().saturating_sub(1);
                let mut props = Vec::with_capacity(members.len());
                for (i, member) in members.into_iter().enumerate() {
                    match member {
                        ObjectMember::Property(property) => {
                            let property = *property;
                            if property.kind != PropertyKind::Init {
                                return Err(self.error_at(property.span, INVALID_TARGET));
                            }
                            let value = self.expr_to_assign_element(property.value, ctx)?;
                            props.push(ObjectPatternProp::Property(Box::new(PatternProperty {
                                key: property.key,
                                value,
                                computed: property.computed,
                                shorthand: property.shorthand,
                                span: property.span,
                            })));
                        }
                        ObjectMember::Spread(spread) => {
                            if i != last {
                                return Err(self.error_at(spread.span, REST_NOT_LAST));
                            }
                            let ExprKind::Spread(arg) = spread.kind else {
                                return Err(self.error_at(spread.span, INVALID_TARGET));
                            };
                            if !matches!(arg.kind, ExprKind::Ident(_) | ExprKind::Member { .. }) {
                                return Err(self.error_at(
                                    arg.span,
                                    "`...` must be followed by an assignable reference in assignment contexts",
                                ));
                            }
                            let target = self.expr_to_assign_pattern(*arg, ctx)?;
                            props.push(ObjectPatternProp::Rest(Pattern::new(
                                PatternKind::Rest(Box::new(target)),
                                spread.span,
                            )));
                        }
                    }
                }
                Ok(Pattern::new(PatternKind::Object(props), span))
            }
            _ => Err(self.error_at(span, INVALID_TARGET)),
        }
    }

    /// An element of an array or object target, which may carry a default.
    fn expr_to_assign_element(&self, expr: Expr, ctx: Context) -> Result<Pattern, ParseError> {
        if self.is_parenthesized(&expr) {
            if let ExprKind::Assign { .. } = expr.kind {
                return Err(self.error_at(expr.span, INVALID_TARGET));
            }
        }
        match expr.kind {
            ExprKind::Assign { op: AssignOp::Assign, left, right } => Ok(Pattern::new(
                PatternKind::Assign { left, right },
                expr.span,
            )),
            ExprKind::Assign { .. } => Err(self.error_at(expr.span, INVALID_TARGET)),
            kind => self.expr_to_assign_pattern(Expr::new(kind, expr.span), ctx),
        }
    }

    // =========================================================================
    // Arrow Parameters
    // =========================================================================

    /// Reinterpret a parenthesized list as arrow function parameters.
    pub(crate) fn to_arrow_params(
        &self,
        exprs: Vec<Expr>,
        cover: &Cover,
        ctx: Context,
        names: &mut BoundNames,
    ) -> Result<Vec<Pattern>, ParseError> {
        if let Some(span) = cover.trailing_rest {
            return Err(self.error_at(span, REST_NOT_LAST));
        }
        let mut params = Vec::with_capacity(exprs.len());
        for expr in exprs {
            let param = match expr.kind {
                ExprKind::Spread(arg) => {
                    let target = self.expr_to_binding(*arg, ctx, names)?;
                    Pattern::new(PatternKind::Rest(Box::new(target)), expr.span)
                }
                kind => self.expr_to_binding_element(Expr::new(kind, expr.span), ctx, names)?,
            };
            params.push(param);
        }
        Ok(params)
    }

    fn expr_to_binding(&self, expr: Expr, ctx: Context, names: &mut BoundNames) -> Result<Pattern, ParseError> {
        if self.is_parenthesized(&expr) {
            return Err(self.error_at(expr.span, INVALID_TARGET));
        }
        let span = expr.span;
        match expr.kind {
            ExprKind::Ident(name) => {
                self.check_binding_name(&name, span, ctx)?;
                names.push((name.clone(), span));
                Ok(Pattern::new(PatternKind::Ident(name), span))
            }
            ExprKind::Array(elements) => {
                let last = elements.len().saturating_sub(1);
                let mut patterns = Vec::with_capacity(elements.len());
                for (i, element) in elements.into_iter().enumerate() {
                    let Some(element) = element else {
                        patterns.push(None);
                        continue;
                    };
                    let pattern = if let ExprKind::Spread(arg) = element.kind {
                        if i != last {
                            return Err(self.error_at(element.span, REST_NOT_LAST));
                        }
                        let target = self.expr_to_binding(*arg, ctx, names)?;
                        Pattern::new(PatternKind::Rest(Box::new(target)), element.span)
                    } else {
                        self.expr_to_binding_element(element, ctx, names)?
                    };
                    patterns.push(Some(pattern));
                }
                Ok(Pattern::new(PatternKind::Array(patterns), span))
            }
            ExprKind::Object(members) => {
                let last = members.len().saturating_sub(1);
                let mut props = Vec::with_capacity(members.len());
                for (i, member) in members.into_iter().enumerate() {
                    match member {
                        ObjectMember::Property(property) => {
                            let property = *property;
                            if property.kind != PropertyKind::Init {
                                return Err(self.error_at(property.span, INVALID_TARGET));
                            }
                            let value = self.expr_to_binding_element(property.value, ctx, names)?;
                            props.push(ObjectPatternProp::Property(Box::new(PatternProperty {
                                key: property.key,
                                value,
                                computed: property.computed,
                                shorthand: property.shorthand,
                                span: property.span,
                            })));
                        }
                        ObjectMember::Spread(spread) => {
                            if i != last {
                                return Err(self.error_at(spread.span, REST_NOT_LAST));
                            }
                            let ExprKind::Spread(arg) = spread.kind else {
                                return Err(self.error_at(spread.span, INVALID_TARGET));
                            };
                            if !matches!(arg.kind, ExprKind::Ident(_)) {
                                return Err(self.error_at(arg.span, INVALID_TARGET));
                            }
                            let target = self.expr_to_binding(*arg, ctx, names)?;
                            props.push(ObjectPatternProp::Rest(Pattern::new(
                                PatternKind::Rest(Box::new(target)),
                                spread.span,
                            )));
                        }
                    }
                }
                Ok(Pattern::new(PatternKind::Object(props), span))
            }
            _ => Err(self.error_at(span, INVALID_TARGET)),
        }
    }

    fn expr_to_binding_element(&self, expr: Expr, ctx: Context, names: &mut BoundNames) -> Result<Pattern, ParseError> {
        if self.is_parenthesized(&expr) {
            return Err(self.error_at(expr.span, INVALID_TARGET));
        }
        match expr.kind {
            ExprKind::Assign { op: AssignOp::Assign, left, right } => {
                let left = self.pattern_to_binding(*left, ctx, names)?;
                Ok(Pattern::new(PatternKind::Assign { left: Box::new(left), right }, expr.span))
            }
            kind => self.expr_to_binding(Expr::new(kind, expr.span), ctx, names),
        }
    }

    /// Validate an assignment pattern as a binding pattern: no member
    /// targets, no parenthesized parts, and legal binding names.
    fn pattern_to_binding(&self, pattern: Pattern, ctx: Context, names: &mut BoundNames) -> Result<Pattern, ParseError> {
        let span = pattern.span;
        if self.parenthesized.contains(&span)
            && matches!(pattern.kind, PatternKind::Ident(_) | PatternKind::Array(_) | PatternKind::Object(_))
        {
            return Err(self.error_at(span, INVALID_TARGET));
        }
        let kind = match pattern.kind {
            PatternKind::Ident(name) => {
                self.check_binding_name(&name, span, ctx)?;
                names.push((name.clone(), span));
                PatternKind::Ident(name)
            }
            PatternKind::Member(_) => return Err(self.error_at(span, INVALID_TARGET)),
            PatternKind::Array(elements) => PatternKind::Array(
                elements
                    .into_iter()
                    .map(|element| element.map(|p| self.pattern_to_binding(p, ctx, names)).transpose())
                    .collect::<Result<_, _>>()?,
            ),
            PatternKind::Object(props) => {
                let mut converted = Vec::with_capacity(props.len());
                for prop in props {
                    converted.push(match prop {
                        ObjectPatternProp::Property(property) => {
                            let mut property = *property;
                            property.value = self.pattern_to_binding(property.value, ctx, names)?;
                            ObjectPatternProp::Property(Box::new(property))
                        }
                        ObjectPatternProp::Rest(rest) => ObjectPatternProp::Rest(self.pattern_to_binding(rest, ctx, names)?),
                    });
                }
                PatternKind::Object(converted)
            }
            PatternKind::Assign { left, right } => PatternKind::Assign {
                left: Box::new(self.pattern_to_binding(*left, ctx, names)?),
                right,
            },
            PatternKind::Rest(target) => PatternKind::Rest(Box::new(self.pattern_to_binding(*target, ctx, names)?)),
        };
        Ok(Pattern::new(kind, span))
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

    fn first_declarator(source: &str) -> Pattern {
        let program = parse(source).unwrap();
        let Some(StmtKind::Var(decl)) = program.body.into_iter().next().map(|s| s.kind) else {
            panic!("expected declaration");
        };
        decl.decls.into_iter().next().unwrap().id
    }

    #[test]
    fn test_binding_patterns() {
        let pattern = first_declarator("var [a, , b = 1, ...c] = d;");
        let PatternKind::Array(elements) = pattern.kind else { panic!() };
        assert_eq!(elements.len(), 4);
        assert!(elements[1].is_none());
        assert!(matches!(elements[2].as_ref().unwrap().kind, PatternKind::Assign { .. }));
        assert!(matches!(elements[3].as_ref().unwrap().kind, PatternKind::Rest(_)));

        let pattern = first_declarator("let {a, b: [c], d = 1, ...e} = f;");
        let PatternKind::Object(props) = pattern.kind else { panic!() };
        assert_eq!(props.len(), 4);
        assert!(matches!(&props[3], ObjectPatternProp::Rest(p) if matches!(p.kind, PatternKind::Rest(_))));
    }

    #[test]
    fn test_binding_errors() {
        assert!(parse("var [...a, b] = c").is_err());
        assert!(parse("var {...a, b} = c").is_err());
        assert!(parse("var [...a = 1] = c").is_err());
        assert!(parse("var {...[a]} = c").is_err());
        assert!(parse("var {if} = c").is_err());
        assert!(parse("var {'a'} = c").is_err());
        assert!(parse("'use strict'; var {eval} = c").is_err());
        assert!(parse("let [a, a] = c").is_err());
        assert!(parse("var [a, a] = c").is_ok());
    }

    #[test]
    fn test_assignment_targets() {
        assert!(parse("[a, ...b.c] = d").is_ok());
        assert!(parse("({...a.b} = c)").is_ok());
        assert!(parse("({...[a]} = c)").is_err());
        assert!(parse("[(a)] = b").is_ok());
        assert!(parse("[([a])] = b").is_err());
        assert!(parse("[(a = 1)] = b").is_err());
        assert!(parse("[a += 1] = b").is_err());
        assert!(parse("'use strict'; [eval] = a").is_err());
        assert!(parse("'use strict'; ({arguments = 1} = a)").is_err());
    }

    #[test]
    fn test_arrow_param_conversion() {
        assert!(parse("([a, ...b], {c: d, ...e}) => 0").is_ok());
        assert!(parse("([a.b]) => 0").is_err());
        assert!(parse("({a: (b)}) => 0").is_err());
        assert!(parse("([(a)] = []) => 0").is_err());
        assert!(parse("({...{a}}) => 0").is_err());
        assert!(parse("'use strict'; (eval) => 0").is_err());
        assert!(parse("(eval) => 0").is_ok());
    }
}
