//! Source locations shared by the lexer, parser, checker and evaluator.

use std::path::PathBuf;

/// A span of source lines, used for error reporting.
///
/// Lines are 0-indexed for consistency with editor/LSP tooling that might
/// one day sit on top of this crate, even though none ships here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub start_line: usize,
    pub end_line: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        let file = file.into();
        SourceLocation {
            file,
            start_line: line,
            end_line: line,
        }
    }

    pub fn span(file: impl Into<PathBuf>, start_line: usize, end_line: usize) -> Self {
        debug_assert!(start_line <= end_line);
        SourceLocation {
            file: file.into(),
            start_line,
            end_line,
        }
    }

    /// A placeholder for locations synthesized outside any real source file
    /// (host-native function bodies, the reference CLI's in-memory scripts).
    pub fn synthetic() -> Self {
        SourceLocation::new("<synthetic>", 0)
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start_line == self.end_line {
            write!(f, "{}:{}", self.file.display(), self.start_line + 1)
        } else {
            write!(
                f,
                "{}:{}-{}",
                self.file.display(),
                self.start_line + 1,
                self.end_line + 1
            )
        }
    }
}
