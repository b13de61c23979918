//! Records of applied rewrites and the assembled output

/// One rewrite applied by a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    /// Name of the rule that produced it
    pub rule: String,
    /// 1-based line of the first consumed token
    pub line: usize,
    /// Byte offset of the first consumed token
    pub offset: usize,
    /// Source text of the consumed tokens
    pub original: String,
    /// Text emitted in their place
    pub replacement: String,
    /// Text this fix queued in front of later tokens, such as the `, true`
    /// closing an argument list
    pub inserted: Vec<String>,
}

impl Fix {
    pub fn new(
        rule: impl Into<String>,
        line: usize,
        offset: usize,
        original: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            rule: rule.into(),
            line,
            offset,
            original: original.into(),
            replacement: replacement.into(),
            inserted: Vec::new(),
        }
    }

    /// Attach the texts queued by this fix
    pub fn with_inserted(mut self, inserted: Vec<String>) -> Self {
        self.inserted = inserted;
        self
    }
}

/// Result of one rewrite session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteOutput {
    /// The complete rewritten source
    pub text: String,
    /// Applied fixes in source order
    pub fixes: Vec<Fix>,
}

impl RewriteOutput {
    pub fn fix_count(&self) -> usize {
        self.fixes.len()
    }

    /// Only a changed output should ever be persisted
    pub fn is_changed(&self) -> bool {
        !self.fixes.is_empty()
    }
}
