//! esparse: a validating ECMAScript parser producing ESTree ASTs.
//!
//! # Design Principles
//!
//! 1. **Everything is an Expression, Pattern, or Statement**
//!    - Expressions: `foo(1)`, `a + b`, `x.y`
//!    - Patterns: `a`, `[a, b]`, `{x: y}`
//!    - Statements: `let a = 1;`, `if (x) {}`, `return x;`
//!
//! 2. **Lexing on-demand**
//!    - Lexer is called during parsing, not upfront
//!    - Enables context-sensitive tokenization (regex vs division,
//!      template continuations)
//!
//! 3. **Validate while parsing**
//!    - Early errors (redeclarations, strict mode names, duplicate
//!      parameters, invalid targets) are reported in the same pass
//!    - The first error aborts the parse
//!
//! 4. **ESTree output**
//!    - The typed AST converts to ESTree JSON with [`Program::to_estree`]
//!    - Offsets are UTF-16 code units, as JavaScript tools expect
//!
//! # Example
//!
//! ```
//! use esparse::{parse_module, ParserOptions};
//!
//! let program = parse_module("export const x = 1 + 2;", ParserOptions::default()).unwrap();
//! let tree = program.to_estree();
//! assert_eq!(tree["sourceType"], "module");
//! ```

mod chars;
mod context;
mod decl;
mod error;
mod estree;
mod expr;
mod lexer;
mod literal;
mod options;
mod parser;
mod pattern;
mod scope;
mod span;
mod token;

pub mod ast;

use tracing::{debug, debug_span};

// Re-exports
pub use ast::{Program, SourceType};
pub use error::{ErrorKind, ParseError};
pub use lexer::Lexer;
pub use options::ParserOptions;
pub use parser::Parser;
pub use span::{LineIndex, Position, Span};
pub use token::{TemplatePart, Token, TokenKind};

/// Parse source text into a [`Program`].
///
/// The goal symbol (script or module) comes from `options.module`.
pub fn parse(source: &str, options: ParserOptions) -> Result<Program, ParseError> {
    let goal = if options.module { "module" } else { "script" };
    let _span = debug_span!("parse", goal, len = source.len()).entered();

    let result = Parser::new(source, options).and_then(Parser::parse);
    match &result {
        Ok(program) => debug!(statements = program.body.len(), "parsed"),
        Err(err) => debug!(offset = err.offset, message = %err.message, "parse failed"),
    }
    result
}

/// Parse with the Script goal symbol.
pub fn parse_script(source: &str, options: ParserOptions) -> Result<Program, ParseError> {
    parse(source, options.with_module(false))
}

/// Parse with the Module goal symbol.
pub fn parse_module(source: &str, options: ParserOptions) -> Result<Program, ParseError> {
    parse(source, options.with_module(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_selection() {
        let program = parse_script("var x = 1", ParserOptions::module()).unwrap();
        assert_eq!(program.source_type, SourceType::Script);
        let program = parse_module("var x = 1", ParserOptions::default()).unwrap();
        assert_eq!(program.source_type, SourceType::Module);
    }

    #[test]
    fn test_error_display() {
        let err = parse("let a;\nlet a;", ParserOptions::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.line, 2);
        assert!(err.to_string().ends_with("(2:4)"), "{err}");
    }

    #[test]
    fn test_serialize_program() {
        let program = parse("a + 1", ParserOptions::default()).unwrap();
        let json = serde_json::to_value(&program).unwrap();
        assert_eq!(json, program.to_estree());
        assert_eq!(json["body"][0]["expression"]["type"], "BinaryExpression");
    }
}
