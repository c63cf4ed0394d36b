pub mod diagnostic;
pub mod error_kind;
pub mod formatter;

use colored::*;

use crate::{diagnostic::Diagnostic, error_kind::Severity, formatter::DiagnosticFormatter};

/// Collector for diagnostics raised while handling one request. A request
/// here resolves to at most one error (parsing/compiling/executing an
/// expression stops at the first failure), but the engine still
/// accumulates so callers that want to keep going (e.g. a REPL) can.
#[derive(Debug, Default)]
pub struct DiagnosticEngine {
  diagnostics: Vec<Diagnostic>,
  error_count: usize,
  warning_count: usize,
}

impl DiagnosticEngine {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn emit(&mut self, diagnostic: Diagnostic) {
    match diagnostic.severity {
      Severity::Error => self.error_count += 1,
      Severity::Warning => self.warning_count += 1,
      _ => {},
    }
    self.diagnostics.push(diagnostic);
  }

  pub fn has_errors(&self) -> bool {
    self.error_count > 0
  }

  pub fn error_count(&self) -> usize {
    self.error_count
  }

  /// The first emitted diagnostic, if any — what a single-expression
  /// request should report back to its caller.
  pub fn first(&self) -> Option<&Diagnostic> {
    self.diagnostics.first()
  }

  pub fn print_all(&self, source: &str) {
    for diagnostic in &self.diagnostics {
      print!("{}", DiagnosticFormatter::new(diagnostic, source).format());
    }
    self.print_summary();
  }

  pub fn format_all_plain(&self, source: &str) -> String {
    let mut output = String::new();
    for diagnostic in &self.diagnostics {
      output.push_str(&DiagnosticFormatter::new(diagnostic, source).format_plain());
      output.push('\n');
    }
    output
  }

  fn print_summary(&self) {
    if self.has_errors() {
      println!(
        "{}: could not evaluate expression due to {} previous {}",
        "error".red().bold(),
        self.error_count.to_string().red().bold(),
        if self.error_count == 1 { "error" } else { "errors" },
      );
    }
  }

  pub fn get_diagnostics(&self) -> &[Diagnostic] {
    &self.diagnostics
  }
}

/// The HTTP response shape a `Diagnostic` maps to: `{"detail": <message>}`
/// plus a status code. Kept here (rather than in `api`) so every crate that
/// raises a `Diagnostic` can be unit-tested against the exact status it
/// produces.
pub struct HttpError {
  pub status: u16,
  pub detail: String,
}

impl From<&Diagnostic> for HttpError {
  fn from(diagnostic: &Diagnostic) -> Self {
    Self {
      status: diagnostic.kind.http_status(),
      detail: diagnostic.message.clone(),
    }
  }
}
