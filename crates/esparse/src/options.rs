use serde::{Deserialize, Serialize};

/// Parser configuration.
///
/// Every field defaults to `false`, so a partial JSON object such as
/// `{"module": true, "loc": true}` deserializes cleanly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParserOptions {
    /// Use the Module goal symbol. Implies strict mode.
    pub module: bool,
    /// Start scripts in strict mode.
    pub implied_strict: bool,
    /// Reject Annex B productions (HTML comments, block-level function
    /// redeclaration, labelled functions, `for (var x = 1 in o)`).
    pub disable_web_compat: bool,
    /// Attach `loc` line/column pairs to every node.
    pub loc: bool,
    /// Attach `range: [start, end]` to every node.
    pub ranges: bool,
    /// Enable staged productions (import attributes, `using` declarations).
    pub next: bool,
    /// Attach `raw` source text to literals.
    pub raw: bool,
    /// Allow `return` at the top level of a script.
    pub global_return: bool,
    /// Collect comments onto `Program.comments`.
    pub comments: bool,
}

impl ParserOptions {
    /// Options for the Script goal.
    #[must_use]
    pub fn script() -> Self {
        Self::default()
    }

    /// Options for the Module goal.
    #[must_use]
    pub fn module() -> Self {
        Self {
            module: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_module(mut self, module: bool) -> Self {
        self.module = module;
        self
    }

    #[must_use]
    pub fn with_implied_strict(mut self, strict: bool) -> Self {
        self.implied_strict = strict;
        self
    }

    #[must_use]
    pub fn with_web_compat(mut self, enabled: bool) -> Self {
        self.disable_web_compat = !enabled;
        self
    }

    /// Attach line/column locations.
    #[must_use]
    pub fn with_loc(mut self, loc: bool) -> Self {
        self.loc = loc;
        self
    }

    #[must_use]
    pub fn with_ranges(mut self, ranges: bool) -> Self {
        self.ranges = ranges;
        self
    }

    #[must_use]
    pub fn with_next(mut self, next: bool) -> Self {
        self.next = next;
        self
    }

    #[must_use]
    pub fn with_raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    #[must_use]
    pub fn with_global_return(mut self, allow: bool) -> Self {
        self.global_return = allow;
        self
    }

    #[must_use]
    pub fn with_comments(mut self, comments: bool) -> Self {
        self.comments = comments;
        self
    }

    /// Whether Annex B productions are accepted.
    pub fn web_compat(&self) -> bool {
        !self.disable_web_compat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_partial() {
        let opts: ParserOptions =
            serde_json::from_str(r#"{"module": true, "disableWebCompat": true, "loc": true}"#)
                .unwrap();
        assert!(opts.module);
        assert!(opts.loc);
        assert!(!opts.web_compat());
        assert!(!opts.ranges);
    }

    #[test]
    fn test_builders() {
        let opts = ParserOptions::script()
            .with_implied_strict(true)
            .with_ranges(true)
            .with_web_compat(false);
        assert!(opts.implied_strict);
        assert!(opts.ranges);
        assert!(opts.disable_web_compat);
        assert!(!opts.module);
    }

    #[test]
    fn test_serialize_camel_case() {
        let json = serde_json::to_value(ParserOptions::module().with_global_return(true)).unwrap();
        assert_eq!(json["module"], true);
        assert_eq!(json["globalReturn"], true);
        assert_eq!(json["impliedStrict"], false);
    }
}
