//! Grammar context flags.
//!
//! A `Context` is passed by value into every recursive parse call. Callees
//! derive the flags for their children with [`Context::with`] and
//! [`Context::without`]; nothing is ever restored by hand, so a flag set
//! for one subtree cannot leak into its siblings.

use std::fmt;
use std::ops::BitOr;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Context(u32);

impl Context {
    pub const NONE: Context = Context(0);
    /// Module goal symbol.
    pub const MODULE: Context = Context(1 << 0);
    pub const STRICT: Context = Context(1 << 1);
    /// Inside any non-arrow function body or parameter list.
    pub const IN_FUNCTION: Context = Context(1 << 2);
    pub const IN_GENERATOR: Context = Context(1 << 3);
    /// `await` is a keyword here (async function or module top level).
    pub const IN_ASYNC: Context = Context(1 << 4);
    /// Unlabelled `continue` and `break` are legal.
    pub const IN_ITERATION: Context = Context(1 << 5);
    /// Unlabelled `break` is legal.
    pub const IN_SWITCH: Context = Context(1 << 6);
    /// `in` is not a binary operator (for-statement heads).
    pub const DISALLOW_IN: Context = Context(1 << 7);
    /// Annex B productions are accepted.
    pub const WEB_COMPAT: Context = Context(1 << 8);
    /// Statement list of a Script or Module, outside any block or function.
    pub const TOP_LEVEL: Context = Context(1 << 9);
    /// Parsing formal parameters (`yield`/`await` expressions are rejected).
    pub const IN_PARAMETERS: Context = Context(1 << 10);
    /// `super.x` and `super[x]` are legal.
    pub const ALLOW_SUPER_PROPERTY: Context = Context(1 << 11);
    /// `super(...)` is legal.
    pub const ALLOW_SUPER_CALL: Context = Context(1 << 12);
    pub const ALLOW_NEW_TARGET: Context = Context(1 << 13);
    /// Class field initializer: `arguments` is rejected.
    pub const IN_CLASS_FIELD: Context = Context(1 << 14);
    /// Class static block: `await` is reserved, `arguments` is rejected.
    pub const IN_STATIC_BLOCK: Context = Context(1 << 15);
    /// Staged productions are enabled.
    pub const NEXT: Context = Context(1 << 16);
    /// `return` is legal.
    pub const ALLOW_RETURN: Context = Context(1 << 17);

    /// Flags cleared when entering any function body.
    pub const FUNCTION_RESET: Context = Context(
        Self::IN_GENERATOR.0
            | Self::IN_ASYNC.0
            | Self::IN_ITERATION.0
            | Self::IN_SWITCH.0
            | Self::DISALLOW_IN.0
            | Self::TOP_LEVEL.0
            | Self::IN_PARAMETERS.0
            | Self::IN_CLASS_FIELD.0
            | Self::IN_STATIC_BLOCK.0,
    );

    #[inline]
    pub const fn contains(self, other: Context) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any flag of `other` is set.
    #[inline]
    pub const fn intersects(self, other: Context) -> bool {
        self.0 & other.0 != 0
    }

    #[must_use]
    #[inline]
    pub const fn with(self, other: Context) -> Context {
        Context(self.0 | other.0)
    }

    #[must_use]
    #[inline]
    pub const fn without(self, other: Context) -> Context {
        Context(self.0 & !other.0)
    }

    /// Set or clear `other` according to `on`.
    #[must_use]
    #[inline]
    pub const fn set(self, other: Context, on: bool) -> Context {
        if on {
            self.with(other)
        } else {
            self.without(other)
        }
    }

    #[inline]
    pub const fn is_strict(self) -> bool {
        self.contains(Self::STRICT)
    }

    #[inline]
    pub const fn is_module(self) -> bool {
        self.contains(Self::MODULE)
    }

    #[inline]
    pub const fn web_compat(self) -> bool {
        self.contains(Self::WEB_COMPAT)
    }

    /// `yield` is a keyword rather than an identifier.
    #[inline]
    pub const fn yield_is_keyword(self) -> bool {
        self.intersects(Context(Self::STRICT.0 | Self::IN_GENERATOR.0))
    }

    /// `await` is a keyword rather than an identifier.
    #[inline]
    pub const fn await_is_keyword(self) -> bool {
        self.intersects(Context(
            Self::MODULE.0 | Self::IN_ASYNC.0 | Self::IN_STATIC_BLOCK.0,
        ))
    }
}

impl BitOr for Context {
    type Output = Context;

    fn bitor(self, rhs: Context) -> Context {
        self.with(rhs)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: &[(Context, &str)] = &[
            (Context::MODULE, "MODULE"),
            (Context::STRICT, "STRICT"),
            (Context::IN_FUNCTION, "IN_FUNCTION"),
            (Context::IN_GENERATOR, "IN_GENERATOR"),
            (Context::IN_ASYNC, "IN_ASYNC"),
            (Context::IN_ITERATION, "IN_ITERATION"),
            (Context::IN_SWITCH, "IN_SWITCH"),
            (Context::DISALLOW_IN, "DISALLOW_IN"),
            (Context::WEB_COMPAT, "WEB_COMPAT"),
            (Context::TOP_LEVEL, "TOP_LEVEL"),
            (Context::IN_PARAMETERS, "IN_PARAMETERS"),
            (Context::ALLOW_SUPER_PROPERTY, "ALLOW_SUPER_PROPERTY"),
            (Context::ALLOW_SUPER_CALL, "ALLOW_SUPER_CALL"),
            (Context::ALLOW_NEW_TARGET, "ALLOW_NEW_TARGET"),
            (Context::IN_CLASS_FIELD, "IN_CLASS_FIELD"),
            (Context::IN_STATIC_BLOCK, "IN_STATIC_BLOCK"),
            (Context::NEXT, "NEXT"),
            (Context::ALLOW_RETURN, "ALLOW_RETURN"),
        ];
        let mut list = f.debug_set();
        for (flag, name) in NAMES {
            if self.contains(*flag) {
                list.entry(&format_args!("{name}"));
            }
        }
        list.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_do_not_leak() {
        let outer = Context::STRICT | Context::IN_ITERATION;
        let inner = outer.without(Context::IN_ITERATION).with(Context::IN_SWITCH);
        assert!(inner.contains(Context::IN_SWITCH));
        assert!(!inner.contains(Context::IN_ITERATION));
        // The caller's copy is untouched.
        assert!(outer.contains(Context::IN_ITERATION));
        assert!(!outer.contains(Context::IN_SWITCH));
    }

    #[test]
    fn test_keyword_predicates() {
        assert!(!Context::NONE.yield_is_keyword());
        assert!(Context::STRICT.yield_is_keyword());
        assert!(Context::IN_GENERATOR.yield_is_keyword());
        assert!(Context::MODULE.await_is_keyword());
        assert!(Context::IN_STATIC_BLOCK.await_is_keyword());
        assert!(!Context::STRICT.await_is_keyword());
    }

    #[test]
    fn test_function_reset() {
        let ctx = Context::IN_ASYNC | Context::IN_SWITCH | Context::STRICT;
        let body = ctx.without(Context::FUNCTION_RESET);
        assert!(body.is_strict());
        assert!(!body.contains(Context::IN_ASYNC));
        assert!(!body.contains(Context::IN_SWITCH));
    }

    #[test]
    fn test_debug_lists_flags() {
        let rendered = format!("{:?}", Context::MODULE | Context::STRICT);
        assert_eq!(rendered, "{MODULE, STRICT}");
    }
}
