use log::{debug, warn};
use thiserror::Error;

/// A non-fatal problem found while parsing geometry or material text.
///
/// The offending line (or face) is dropped and parsing carries on.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// 1-based line number in the source text.
    pub line: usize,
    pub kind: DiagnosticKind,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    #[error("'{directive}' needs at least {expected} arguments, found {found}")]
    TooFewArguments {
        directive: String,
        expected: usize,
        found: usize,
    },
    #[error("'{directive}' has a non-numeric argument '{token}'")]
    InvalidNumber { directive: String, token: String },
    #[error("face with unsupported number of vertices: {0}")]
    UnsupportedFaceArity(usize),
    #[error("face corner '{0}' has no usable position index")]
    InvalidCorner(String),
    #[error("face index {index} is outside the {available} positions declared so far")]
    IndexOutOfRange { index: i64, available: usize },
    #[error("unhandled keyword: {0}")]
    UnknownKeyword(String),
    #[error("'{0}' appears before any newmtl and was discarded")]
    PropertyWithoutMaterial(String),
}

impl Diagnostic {
    pub fn new(line: usize, kind: DiagnosticKind) -> Self {
        Self { line, kind }
    }

    /// Emits the diagnostic through `log`. Short lines are the quiet class and go to
    /// `debug`; everything else is a `warn`.
    pub fn report(&self, source: &str) {
        match self.kind {
            DiagnosticKind::TooFewArguments { .. } => {
                debug!("{}:{}: {}", source, self.line, self.kind)
            }
            _ => warn!("{}:{}: {}", source, self.line, self.kind),
        }
    }
}

/// A parse result together with the diagnostics collected while producing it.
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Parsed<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Parsed<U> {
        Parsed {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }

    /// Logs every diagnostic under `source` and returns the value.
    pub fn report(self, source: &str) -> T {
        for d in &self.diagnostics {
            d.report(source);
        }
        self.value
    }
}
