use diagnostic::{
  diagnostic::{Diagnostic, Label, Span},
  error_kind::ErrorKind,
  DiagnosticEngine, HttpError,
};

#[test]
fn test_diagnostic_formatting() {
  let source = "1 + + 2";

  let mut engine = DiagnosticEngine::new();

  let error = Diagnostic::new(ErrorKind::SyntaxMalformed, "unexpected token '+'")
    .with_label(Label::primary(
      Span {
        line: 1,
        column: 4,
        length: 1,
      },
      Some("expected a number or '('".to_string()),
    ))
    .with_help("remove the extra operator".to_string());

  engine.emit(error);

  assert!(engine.has_errors());
  let plain = engine.format_all_plain(source);
  assert!(plain.contains("SYNTAX_MALFORMED"));
  assert!(plain.contains("unexpected token"));
}

#[test]
fn http_error_maps_syntax_kind_to_400() {
  let diagnostic = Diagnostic::from_kind(ErrorKind::SyntaxEmpty);
  let http: HttpError = (&diagnostic).into();
  assert_eq!(http.status, 400);
  assert_eq!(http.detail, "Expression cannot be empty");
}

#[test]
fn http_error_maps_broker_unavailable_to_500() {
  let diagnostic = Diagnostic::from_kind(ErrorKind::BrokerUnavailable);
  let http: HttpError = (&diagnostic).into();
  assert_eq!(http.status, 500);
}
