/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
  Error,
  Warning,
  Note,
  Help,
}

/// The closed error taxonomy of the system. Each variant maps 1:1 to an
/// HTTP status and a stable message fragment the caller can match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
  SyntaxEmpty,
  SyntaxInvalidChars,
  SyntaxMalformed,
  UnsupportedOperator,
  UnaryOnComplex,
  DivideByZero,
  WorkerTypeError,
  Timeout,
  BrokerUnavailable,
  Internal,
}

impl ErrorKind {
  /// Short machine-readable code, analogous to rustc's `E0xxx` codes.
  pub fn code(&self) -> &'static str {
    match self {
      Self::SyntaxEmpty => "SYNTAX_EMPTY",
      Self::SyntaxInvalidChars => "SYNTAX_INVALID_CHARS",
      Self::SyntaxMalformed => "SYNTAX_MALFORMED",
      Self::UnsupportedOperator => "UNSUPPORTED_OPERATOR",
      Self::UnaryOnComplex => "UNARY_ON_COMPLEX",
      Self::DivideByZero => "DIVIDE_BY_ZERO",
      Self::WorkerTypeError => "WORKER_TYPE_ERROR",
      Self::Timeout => "TIMEOUT",
      Self::BrokerUnavailable => "BROKER_UNAVAILABLE",
      Self::Internal => "INTERNAL",
    }
  }

  pub fn severity(&self) -> Severity {
    // every kind in this taxonomy is fatal to the request; the Severity
    // scale exists so the formatter can share code with a future linter
    // pass, not because any kind here is a warning today.
    Severity::Error
  }

  /// Default message fragment. Call sites may still attach a more specific
  /// message via `Diagnostic::new`.
  pub fn default_message(&self) -> &'static str {
    match self {
      Self::SyntaxEmpty => "Expression cannot be empty",
      Self::SyntaxInvalidChars => "Expression contains invalid characters",
      Self::SyntaxMalformed => "Syntax error",
      Self::UnsupportedOperator => "Unsupported operator",
      Self::UnaryOnComplex => "Unary subtraction on complex expression is not supported",
      Self::DivideByZero => "Cannot divide by zero",
      Self::WorkerTypeError => "Worker received an operand of the wrong type",
      Self::Timeout => "timeout",
      Self::BrokerUnavailable => "An unexpected error occurred",
      Self::Internal => "An unexpected error occurred",
    }
  }

  /// HTTP status the API surface should answer with.
  pub fn http_status(&self) -> u16 {
    match self {
      Self::BrokerUnavailable | Self::Internal => 500,
      _ => 400,
    }
  }
}
