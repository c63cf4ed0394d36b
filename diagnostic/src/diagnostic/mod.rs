use crate::error_kind::{ErrorKind, Severity};

/// A source span, present only for diagnostics raised during lexing/parsing
/// (workers and the coordinator have no source position to point at).
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
  pub line: usize,
  pub column: usize,
  pub length: usize,
}

/// Label for underlining a specific part of the input expression.
#[derive(Debug, Clone)]
pub struct Label {
  pub span: Span,
  pub message: Option<String>,
  pub style: LabelStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
  Primary,
  Secondary,
}

impl Label {
  pub fn primary(span: Span, message: Option<String>) -> Self {
    Self {
      span,
      message,
      style: LabelStyle::Primary,
    }
  }

  pub fn secondary(span: Span, message: Option<String>) -> Self {
    Self {
      span,
      message,
      style: LabelStyle::Secondary,
    }
  }
}

/// A single diagnostic: one error kind, one message, with optional source
/// labels and notes. Parser/compiler errors attach a label; worker and
/// coordinator errors (divide-by-zero, timeout, broker failure) do not.
#[derive(Debug, Clone)]
pub struct Diagnostic {
  pub kind: ErrorKind,
  pub severity: Severity,
  pub message: String,
  pub labels: Vec<Label>,
  pub notes: Vec<String>,
  pub help: Option<String>,
}

impl Diagnostic {
  pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
    Self {
      severity: kind.severity(),
      kind,
      message: message.into(),
      labels: Vec::new(),
      notes: Vec::new(),
      help: None,
    }
  }

  /// Build a diagnostic from the kind's own default message fragment.
  pub fn from_kind(kind: ErrorKind) -> Self {
    Self::new(kind, kind.default_message())
  }

  pub fn with_label(mut self, label: Label) -> Self {
    self.labels.push(label);
    self
  }

  pub fn with_note(mut self, note: impl Into<String>) -> Self {
    self.notes.push(note.into());
    self
  }

  pub fn with_help(mut self, help: impl Into<String>) -> Self {
    self.help = Some(help.into());
    self
  }
}
