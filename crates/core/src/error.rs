//! The single error type shared by every layer of the script pipeline.
//!
//! Each crate in this workspace raises one of the [`ScriptError`] variants;
//! the runner never needs to match on crate-specific error types. Mirrors
//! the hand-written `Display`/`Error` shape the teacher uses for
//! `SerializeError` rather than pulling in a derive-macro error crate.

use crate::source::SourceLocation;
use std::fmt;

/// A single underlying failure, named and located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            location: None,
        }
    }

    pub fn at(message: impl Into<String>, location: SourceLocation) -> Self {
        Diagnostic {
            message: message.into(),
            location: Some(location),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{}: {}", loc, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// The error kinds enumerated in the error-handling design.
///
/// `Check` carries every failure the checker found in one pass rather than
/// just the first, so a caller can display all of them at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    Parse(Diagnostic),
    Check(Vec<Diagnostic>),
    EntryShape(Diagnostic),
    BridgeUnsupported(Diagnostic),
    Host(Diagnostic),
    Unreachable(Diagnostic),
    Decode(Diagnostic),
}

impl ScriptError {
    pub fn parse(message: impl Into<String>, location: SourceLocation) -> Self {
        ScriptError::Parse(Diagnostic::at(message, location))
    }

    pub fn check(diagnostics: Vec<Diagnostic>) -> Self {
        ScriptError::Check(diagnostics)
    }

    pub fn entry_shape(message: impl Into<String>) -> Self {
        ScriptError::EntryShape(Diagnostic::new(message))
    }

    pub fn bridge_unsupported(message: impl Into<String>) -> Self {
        ScriptError::BridgeUnsupported(Diagnostic::new(message))
    }

    pub fn host(message: impl Into<String>) -> Self {
        ScriptError::Host(Diagnostic::new(message))
    }

    pub fn unreachable(message: impl Into<String>, location: SourceLocation) -> Self {
        ScriptError::Unreachable(Diagnostic::at(message, location))
    }

    pub fn decode(message: impl Into<String>) -> Self {
        ScriptError::Decode(Diagnostic::new(message))
    }

    /// The ordered list of underlying diagnostics, so a caller can display
    /// all of them regardless of which variant fired.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            ScriptError::Check(ds) => ds,
            ScriptError::Parse(d)
            | ScriptError::EntryShape(d)
            | ScriptError::BridgeUnsupported(d)
            | ScriptError::Host(d)
            | ScriptError::Unreachable(d)
            | ScriptError::Decode(d) => std::slice::from_ref(d),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            ScriptError::Parse(_) => "parse error",
            ScriptError::Check(_) => "type error",
            ScriptError::EntryShape(_) => "entry shape error",
            ScriptError::BridgeUnsupported(_) => "unsupported host value",
            ScriptError::Host(_) => "host error",
            ScriptError::Unreachable(_) => "internal fault",
            ScriptError::Decode(_) => "storage decode error",
        }
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let diags = self.diagnostics();
        if diags.len() == 1 {
            write!(f, "{}: {}", self.kind_name(), diags[0])
        } else {
            writeln!(f, "{} ({} issues):", self.kind_name(), diags.len())?;
            for (i, d) in diags.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, d)?;
            }
            Ok(())
        }
    }
}

impl std::error::Error for ScriptError {}

pub type ScriptResult<T> = Result<T, ScriptError>;
