use diagnostic::{
  diagnostic::{Diagnostic, Label, Span},
  error_kind::ErrorKind,
  DiagnosticEngine,
};

pub mod token;

use token::{types::TokenType, Token};

/// Characters that look like an operator but aren't one of the four this
/// system supports. Recognizing them as their own lexeme lets the lexer
/// raise `UNSUPPORTED_OPERATOR` instead of the generic
/// `SYNTAX_INVALID_CHARS` a letter or symbol would get.
const EXTRA_OPERATOR_CHARS: &[char] = &['%', '^', '=', '<', '>', '!', '&', '|', '~'];

pub struct Lexer {
  source: Vec<char>,
  start: usize,
  current: usize,
  tokens: Vec<Token>,
}

impl Lexer {
  pub fn new(source: &str) -> Self {
    Self {
      source: source.chars().collect(),
      start: 0,
      current: 0,
      tokens: Vec::new(),
    }
  }

  /// Scans `source` into a token stream. Stops at the first error: the
  /// grammar this system accepts has no recovery story.
  pub fn scan(mut self, engine: &mut DiagnosticEngine) -> Vec<Token> {
    self.scan_tokens(engine);
    self.tokens
  }

  fn scan_tokens(&mut self, engine: &mut DiagnosticEngine) {
    while !self.is_at_end() {
      if engine.has_errors() {
        return;
      }

      self.start = self.current;
      let c = self.advance();

      match c {
        '(' => self.add_token(TokenType::LeftParen),
        ')' => self.add_token(TokenType::RightParen),
        '+' => self.add_token(TokenType::Plus),
        '-' => self.add_token(TokenType::Minus),
        '*' => self.add_token(TokenType::Star),
        '/' => self.add_token(TokenType::Slash),

        ' ' | '\t' | '\r' | '\n' => {},

        '0'..='9' | '.' => self.tokenize_number(engine),

        c if EXTRA_OPERATOR_CHARS.contains(&c) => {
          let diagnostic = Diagnostic::new(
            ErrorKind::UnsupportedOperator,
            format!("unsupported operator '{}'", c),
          )
          .with_label(Label::primary(
            Span {
              line: 1,
              column: self.start,
              length: 1,
            },
            None,
          ));
          engine.emit(diagnostic);
        },

        c => {
          let diagnostic = Diagnostic::new(
            ErrorKind::SyntaxInvalidChars,
            format!("unexpected character {:?}", c),
          )
          .with_label(Label::primary(
            Span {
              line: 1,
              column: self.start,
              length: 1,
            },
            None,
          ));
          engine.emit(diagnostic);
        },
      }
    }

    self.tokens.push(Token::new(TokenType::Eof, String::new(), self.current));
  }

  /// Consumes a run of digits with at most one decimal point. No exponent
  /// form.
  fn tokenize_number(&mut self, engine: &mut DiagnosticEngine) {
    let mut saw_digit = self.source[self.start] != '.';
    let mut saw_dot = self.source[self.start] == '.';

    while let Some(c) = self.peek() {
      match c {
        '0'..='9' => {
          saw_digit = true;
          self.advance();
        },
        '.' if !saw_dot => {
          saw_dot = true;
          self.advance();
        },
        _ => break,
      }
    }

    if !saw_digit {
      let diagnostic = Diagnostic::new(ErrorKind::SyntaxMalformed, "a lone '.' is not a number")
        .with_label(Label::primary(
          Span {
            line: 1,
            column: self.start,
            length: self.current - self.start,
          },
          Some("expected digits around the decimal point".to_string()),
        ));
      engine.emit(diagnostic);
      return;
    }

    self.add_token(TokenType::Number);
  }

  fn add_token(&mut self, token_type: TokenType) {
    let lexeme: String = self.source[self.start..self.current].iter().collect();
    self.tokens.push(Token::new(token_type, lexeme, self.start));
  }

  fn is_at_end(&self) -> bool {
    self.current >= self.source.len()
  }

  fn advance(&mut self) -> char {
    let c = self.source[self.current];
    self.current += 1;
    c
  }

  fn peek(&self) -> Option<char> {
    self.source.get(self.current).copied()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn scan_ok(source: &str) -> Vec<Token> {
    let mut engine = DiagnosticEngine::new();
    let tokens = Lexer::new(source).scan(&mut engine);
    assert!(!engine.has_errors(), "unexpected errors for {:?}", source);
    tokens
  }

  #[test]
  fn scans_simple_expression() {
    let tokens = scan_ok("5 + 3");
    let types: Vec<_> = tokens.iter().map(|t| t.token_type).collect();
    assert_eq!(
      types,
      vec![TokenType::Number, TokenType::Plus, TokenType::Number, TokenType::Eof]
    );
  }

  #[test]
  fn scans_decimal_numbers() {
    let tokens = scan_ok("1.5 * .25");
    assert_eq!(tokens[0].lexeme, "1.5");
    assert_eq!(tokens[2].lexeme, ".25");
  }

  #[test]
  fn rejects_invalid_characters() {
    let mut engine = DiagnosticEngine::new();
    Lexer::new("5 + a").scan(&mut engine);
    assert!(engine.has_errors());
    assert_eq!(engine.first().unwrap().kind.code(), "SYNTAX_INVALID_CHARS");
  }

  #[test]
  fn rejects_unsupported_operator() {
    let mut engine = DiagnosticEngine::new();
    Lexer::new("5 % 2").scan(&mut engine);
    assert!(engine.has_errors());
    assert_eq!(engine.first().unwrap().kind.code(), "UNSUPPORTED_OPERATOR");
  }
}
