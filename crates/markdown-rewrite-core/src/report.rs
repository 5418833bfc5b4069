use std::fmt;

/// Counters and diagnostics collected while a transform runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub labels_promoted: usize,
    pub toc_inserted: bool,
    pub embeds_rewritten: usize,
    pub images_rewritten: usize,
    pub headings_rewritten: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl RewriteReport {
    pub fn total_rewrites(&self) -> usize {
        self.labels_promoted
            + usize::from(self.toc_inserted)
            + self.embeds_rewritten
            + self.images_rewritten
            + self.headings_rewritten
    }
}

/// A rule matched a line but declined to rewrite it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}
