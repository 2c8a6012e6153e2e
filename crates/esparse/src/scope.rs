//! Binding and scope validation.
//!
//! The parser pushes a [`Scope`] on entry to every block, function, catch
//! clause and module, and declares each bound name as it is parsed. Hoisted
//! declarations walk outward to the nearest function boundary, leaving a
//! trace in every scope they pass through so that a later lexical
//! declaration in one of those scopes still conflicts with them.
//!
//! Methods return `Err(message)`; the parser attaches the source span.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::span::Span;

/// The kind of a scope record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Script,
    Module,
    /// Function or arrow body, including its parameters.
    Function,
    /// Class static block (a `var` boundary without parameters).
    StaticBlock,
    Block,
    /// Catch clause; the catch body shares this scope.
    Catch,
}

impl ScopeKind {
    /// `var` declarations stop here.
    fn is_var_boundary(self) -> bool {
        matches!(
            self,
            ScopeKind::Script | ScopeKind::Module | ScopeKind::Function | ScopeKind::StaticBlock
        )
    }
}

/// How a name was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Var,
    Let,
    Const,
    Using,
    Class,
    Import,
    /// Function declaration at function or script top level.
    FunctionVar,
    /// Function declaration in a block or at module top level.
    LexicalFunction,
    /// Plain (non-async, non-generator) function declaration in a block.
    /// Sloppy web-compatible code may redeclare these.
    BlockFunction,
    Param,
    CatchSimple,
    CatchPattern,
}

impl DeclKind {
    fn is_lexical(self) -> bool {
        matches!(
            self,
            DeclKind::Let
                | DeclKind::Const
                | DeclKind::Using
                | DeclKind::Class
                | DeclKind::Import
                | DeclKind::LexicalFunction
                | DeclKind::BlockFunction
        )
    }
}

/// One scope record.
#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    /// Block-scoped names declared directly in this scope.
    lexical: FxHashMap<String, DeclKind>,
    /// `var` names declared in, or hoisted through, this scope, plus
    /// top-level function declarations of a function or script.
    vars: FxHashSet<String>,
    /// Parameters, or the catch parameter's bound names.
    params: FxHashSet<String>,
    /// The catch parameter is a destructuring pattern.
    catch_pattern: bool,
}

impl Scope {
    fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            lexical: FxHashMap::default(),
            vars: FxHashSet::default(),
            params: FxHashSet::default(),
            catch_pattern: false,
        }
    }

    fn has_lexical(&self, name: &str) -> bool {
        self.lexical.contains_key(name)
    }

    /// Any binding with this name, for export resolution.
    fn binds(&self, name: &str) -> bool {
        self.lexical.contains_key(name) || self.vars.contains(name)
    }
}

/// Stack of scope records. The parent of each scope is the entry below it.
#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
    /// Sloppy web-compatible code (Annex B redeclarations).
    web_compat: bool,
}

impl ScopeStack {
    pub fn new(root: ScopeKind, web_compat: bool) -> Self {
        Self {
            scopes: vec![Scope::new(root)],
            web_compat,
        }
    }

    pub fn push(&mut self, kind: ScopeKind) {
        self.scopes.push(Scope::new(kind));
    }

    /// Push a catch scope. `pattern` is true for destructuring parameters.
    pub fn push_catch(&mut self, pattern: bool) {
        let mut scope = Scope::new(ScopeKind::Catch);
        scope.catch_pattern = pattern;
        self.scopes.push(scope);
    }

    pub fn pop(&mut self) {
        // The root scope lives as long as the stack.
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn current_kind(&self) -> ScopeKind {
        self.current().kind
    }

    fn current(&self) -> &Scope {
        &self.scopes[self.scopes.len() - 1]
    }

    fn current_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// The `DeclKind` a function declaration gets in the current scope.
    pub fn function_decl_kind(&self, plain: bool) -> DeclKind {
        match self.current_kind() {
            ScopeKind::Script | ScopeKind::Function | ScopeKind::StaticBlock => DeclKind::FunctionVar,
            ScopeKind::Module => DeclKind::LexicalFunction,
            ScopeKind::Block | ScopeKind::Catch if plain => DeclKind::BlockFunction,
            ScopeKind::Block | ScopeKind::Catch => DeclKind::LexicalFunction,
        }
    }

    /// Declare `name` in the current scope.
    ///
    /// `strict` is the strictness of the declaring code; it decides whether
    /// block-level function redeclarations are tolerated.
    pub fn declare(&mut self, name: &str, kind: DeclKind, strict: bool) -> Result<(), String> {
        let result = match kind {
            DeclKind::Var => self.declare_var(name),
            DeclKind::FunctionVar => self.declare_function_var(name),
            DeclKind::Param => {
                self.current_mut().params.insert(name.to_string());
                Ok(())
            }
            DeclKind::CatchSimple | DeclKind::CatchPattern => self.declare_catch_param(name),
            _ => self.declare_lexical(name, kind, strict),
        };
        if let Err(message) = &result {
            trace!(name, ?kind, message = message.as_str(), "declaration rejected");
        }
        result
    }

    fn declare_lexical(&mut self, name: &str, kind: DeclKind, strict: bool) -> Result<(), String> {
        let annex_b = self.web_compat && !strict;
        let scope = self.current_mut();
        if let Some(existing) = scope.lexical.get(name) {
            let both_plain = *existing == DeclKind::BlockFunction && kind == DeclKind::BlockFunction;
            if both_plain && annex_b {
                return Ok(());
            }
            return Err(already_declared(name));
        }
        if scope.vars.contains(name) || scope.params.contains(name) {
            return Err(already_declared(name));
        }
        debug_assert!(kind.is_lexical());
        scope.lexical.insert(name.to_string(), kind);
        Ok(())
    }

    fn declare_var(&mut self, name: &str) -> Result<(), String> {
        for scope in self.scopes.iter_mut().rev() {
            if scope.has_lexical(name) {
                return Err(already_declared(name));
            }
            if scope.kind == ScopeKind::Catch && scope.catch_pattern && scope.params.contains(name) {
                return Err(already_declared(name));
            }
            scope.vars.insert(name.to_string());
            if scope.kind.is_var_boundary() {
                break;
            }
        }
        Ok(())
    }

    fn declare_function_var(&mut self, name: &str) -> Result<(), String> {
        let scope = self.current_mut();
        if scope.has_lexical(name) {
            return Err(already_declared(name));
        }
        scope.vars.insert(name.to_string());
        Ok(())
    }

    fn declare_catch_param(&mut self, name: &str) -> Result<(), String> {
        let scope = self.current_mut();
        if !scope.params.insert(name.to_string()) {
            return Err(already_declared(name));
        }
        Ok(())
    }

    /// True if the root (module) scope binds `name`.
    pub fn root_binds(&self, name: &str) -> bool {
        self.scopes[0].binds(name)
    }
}

fn already_declared(name: &str) -> String {
    format!("Identifier '{name}' has already been declared")
}

// =============================================================================
// Exports
// =============================================================================

/// Module-level export bookkeeping.
#[derive(Debug, Default)]
pub struct ExportLedger {
    exported: FxHashSet<String>,
    /// Local names of `export { a }` clauses, resolved at the end of the
    /// module.
    locals: Vec<(String, Span)>,
}

impl ExportLedger {
    /// Record an exported name. Each name may be exported once.
    pub fn add_export(&mut self, name: &str) -> Result<(), String> {
        if !self.exported.insert(name.to_string()) {
            return Err(if name == "default" {
                "Duplicate export of 'default'".to_string()
            } else {
                format!("Duplicate export of '{name}'")
            });
        }
        Ok(())
    }

    pub fn add_local(&mut self, name: &str, span: Span) {
        self.locals.push((name.to_string(), span));
    }

    /// The first local export that `scopes` cannot resolve.
    pub fn unresolved(&self, scopes: &ScopeStack) -> Option<(&str, Span)> {
        self.locals
            .iter()
            .find(|(name, _)| !scopes.root_binds(name))
            .map(|(name, span)| (name.as_str(), *span))
    }
}

// =============================================================================
// Private names
// =============================================================================

/// What a private name is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivateKind {
    Field,
    Method,
    Getter,
    Setter,
    /// A getter and a setter with the same staticness.
    Accessor,
}

#[derive(Debug, Default)]
struct ClassFrame {
    declared: FxHashMap<String, (PrivateKind, bool)>,
    unresolved: Vec<(String, Span)>,
}

/// Stack of class bodies for `#name` resolution.
#[derive(Debug, Default)]
pub struct PrivateNames {
    frames: Vec<ClassFrame>,
}

impl PrivateNames {
    pub fn enter_class(&mut self) {
        self.frames.push(ClassFrame::default());
    }

    /// Declare `#name` in the innermost class body.
    pub fn declare(&mut self, name: &str, kind: PrivateKind, is_static: bool) -> Result<(), String> {
        let frame = self
            .frames
            .last_mut()
            .ok_or_else(|| format!("Private field '#{name}' must be declared in an enclosing class"))?;
        match frame.declared.get(name).copied() {
            None => {
                frame.declared.insert(name.to_string(), (kind, is_static));
                Ok(())
            }
            Some((PrivateKind::Getter, s)) if kind == PrivateKind::Setter && s == is_static => {
                frame.declared.insert(name.to_string(), (PrivateKind::Accessor, s));
                Ok(())
            }
            Some((PrivateKind::Setter, s)) if kind == PrivateKind::Getter && s == is_static => {
                frame.declared.insert(name.to_string(), (PrivateKind::Accessor, s));
                Ok(())
            }
            Some(_) => Err(format!("Identifier '#{name}' has already been declared")),
        }
    }

    /// Record a use of `#name`; it is resolved when its class body closes.
    pub fn reference(&mut self, name: &str, span: Span) -> Result<(), String> {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.unresolved.push((name.to_string(), span));
                Ok(())
            }
            None => Err(undeclared_private(name)),
        }
    }

    /// Close the innermost class body. References it does not declare move
    /// to the enclosing class, or fail at the outermost one.
    pub fn exit_class(&mut self) -> Result<(), (String, Span)> {
        let Some(frame) = self.frames.pop() else {
            return Ok(());
        };
        for (name, span) in frame.unresolved {
            if frame.declared.contains_key(&name) {
                continue;
            }
            match self.frames.last_mut() {
                Some(outer) => outer.unresolved.push((name, span)),
                None => return Err((undeclared_private(&name), span)),
            }
        }
        Ok(())
    }
}

fn undeclared_private(name: &str) -> String {
    format!("Private field '#{name}' must be declared in an enclosing class")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script() -> ScopeStack {
        ScopeStack::new(ScopeKind::Script, true)
    }

    #[test]
    fn test_lexical_conflicts() {
        let mut scopes = script();
        scopes.declare("a", DeclKind::Let, false).unwrap();
        assert!(scopes.declare("a", DeclKind::Const, false).is_err());
        assert!(scopes.declare("a", DeclKind::Var, false).is_err());

        scopes.declare("b", DeclKind::Var, false).unwrap();
        scopes.declare("b", DeclKind::Var, false).unwrap();
        assert!(scopes.declare("b", DeclKind::Let, false).is_err());
    }

    #[test]
    fn test_var_hoists_through_blocks() {
        let mut scopes = script();
        scopes.push(ScopeKind::Block);
        scopes.declare("x", DeclKind::Var, false).unwrap();
        scopes.pop();
        // The hoisted var now conflicts at the top level.
        assert!(scopes.declare("x", DeclKind::Let, false).is_err());

        let mut scopes = script();
        scopes.declare("y", DeclKind::Let, false).unwrap();
        scopes.push(ScopeKind::Block);
        assert!(scopes.declare("y", DeclKind::Var, false).is_err());
    }

    #[test]
    fn test_var_stops_at_function() {
        let mut scopes = script();
        scopes.declare("x", DeclKind::Let, false).unwrap();
        scopes.push(ScopeKind::Function);
        scopes.declare("x", DeclKind::Var, false).unwrap();
        scopes.pop();
        assert_eq!(scopes.depth(), 1);
    }

    #[test]
    fn test_block_function_redeclaration() {
        let mut scopes = script();
        scopes.push(ScopeKind::Block);
        let kind = scopes.function_decl_kind(true);
        assert_eq!(kind, DeclKind::BlockFunction);
        scopes.declare("f", kind, false).unwrap();
        scopes.declare("f", kind, false).unwrap();
        assert!(scopes.declare("f", kind, true).is_err());

        let mut strict_off = ScopeStack::new(ScopeKind::Script, false);
        strict_off.push(ScopeKind::Block);
        strict_off.declare("f", DeclKind::BlockFunction, false).unwrap();
        assert!(strict_off.declare("f", DeclKind::BlockFunction, false).is_err());
    }

    #[test]
    fn test_top_level_functions() {
        let mut scopes = script();
        scopes.declare("f", DeclKind::FunctionVar, false).unwrap();
        scopes.declare("f", DeclKind::FunctionVar, false).unwrap();
        scopes.declare("f", DeclKind::Var, false).unwrap();
        assert!(scopes.declare("f", DeclKind::Let, false).is_err());

        let mut module = ScopeStack::new(ScopeKind::Module, false);
        assert_eq!(module.function_decl_kind(true), DeclKind::LexicalFunction);
        module.declare("f", DeclKind::LexicalFunction, true).unwrap();
        assert!(module.declare("f", DeclKind::LexicalFunction, true).is_err());
    }

    #[test]
    fn test_params_and_catch() {
        let mut scopes = script();
        scopes.push(ScopeKind::Function);
        scopes.declare("a", DeclKind::Param, false).unwrap();
        scopes.declare("a", DeclKind::Var, false).unwrap();
        assert!(scopes.declare("a", DeclKind::Let, false).is_err());
        scopes.pop();

        scopes.push_catch(false);
        scopes.declare("e", DeclKind::CatchSimple, false).unwrap();
        scopes.declare("e", DeclKind::Var, false).unwrap();
        assert!(scopes.declare("e", DeclKind::Let, false).is_err());
        scopes.pop();

        scopes.push_catch(true);
        scopes.declare("e", DeclKind::CatchPattern, false).unwrap();
        assert!(scopes.declare("e", DeclKind::CatchPattern, false).is_err());
        assert!(scopes.declare("e", DeclKind::Var, false).is_err());
    }

    #[test]
    fn test_exports() {
        let mut scopes = ScopeStack::new(ScopeKind::Module, false);
        scopes.declare("a", DeclKind::Var, true).unwrap();
        let mut ledger = ExportLedger::default();
        ledger.add_export("a").unwrap();
        assert!(ledger.add_export("a").is_err());
        ledger.add_local("a", Span::new(0, 1));
        assert!(ledger.unresolved(&scopes).is_none());
        ledger.add_local("b", Span::new(5, 6));
        assert_eq!(ledger.unresolved(&scopes), Some(("b", Span::new(5, 6))));
    }

    #[test]
    fn test_private_names() {
        let mut private = PrivateNames::default();
        assert!(private.reference("x", Span::new(0, 2)).is_err());

        private.enter_class();
        private.declare("x", PrivateKind::Getter, false).unwrap();
        private.declare("x", PrivateKind::Setter, false).unwrap();
        assert!(private.declare("x", PrivateKind::Field, false).is_err());
        private.reference("y", Span::new(3, 5)).unwrap();

        private.enter_class();
        private.reference("x", Span::new(7, 9)).unwrap();
        assert!(private.exit_class().is_ok());
        // `#y` is never declared.
        assert_eq!(private.exit_class(), Err((undeclared_private("y"), Span::new(3, 5))));
    }
}
