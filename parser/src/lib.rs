pub mod tree;

use diagnostic::{
  diagnostic::{Diagnostic, Label, Span},
  error_kind::ErrorKind,
  DiagnosticEngine,
};
use lexer::{
  token::{types::TokenType, Token},
  Lexer,
};

use tree::{Op, OperatorTree};

/// Parses an input string into a normalized operator tree. Returns `None`
/// and emits exactly one diagnostic on the first failure — this grammar
/// has no error recovery.
pub fn parse(source: &str, engine: &mut DiagnosticEngine) -> Option<OperatorTree> {
  if source.trim().is_empty() {
    engine.emit(Diagnostic::from_kind(ErrorKind::SyntaxEmpty));
    return None;
  }

  let tokens = Lexer::new(source).scan(engine);
  if engine.has_errors() {
    return None;
  }

  let mut parser = Parser::new(tokens);
  let tree = parser.parse_expr(engine)?;

  if !parser.is_at_end() {
    let token = parser.peek();
    engine.emit(malformed(&format!("unexpected trailing input near {:?}", token.lexeme), token.column));
    return None;
  }

  Some(tree)
}

fn malformed(message: &str, column: usize) -> Diagnostic {
  Diagnostic::new(ErrorKind::SyntaxMalformed, message.to_string()).with_label(Label::primary(
    Span {
      line: 1,
      column,
      length: 1,
    },
    None,
  ))
}

struct Parser {
  tokens: Vec<Token>,
  current: usize,
}

impl Parser {
  fn new(tokens: Vec<Token>) -> Self {
    Self { tokens, current: 0 }
  }

  /// `expr := term (('+'|'-') term)*`
  fn parse_expr(&mut self, engine: &mut DiagnosticEngine) -> Option<OperatorTree> {
    let mut lhs = self.parse_term(engine)?;

    loop {
      let op = match self.peek().token_type {
        TokenType::Plus => Op::Add,
        TokenType::Minus => Op::Sub,
        _ => break,
      };
      self.advance();
      let rhs = self.parse_term(engine)?;
      lhs = OperatorTree::binary(op, lhs, rhs);
    }

    Some(lhs)
  }

  /// `term := unary (('*'|'/') unary)*`
  fn parse_term(&mut self, engine: &mut DiagnosticEngine) -> Option<OperatorTree> {
    let mut lhs = self.parse_unary(engine)?;

    loop {
      let op = match self.peek().token_type {
        TokenType::Star => Op::Mul,
        TokenType::Slash => Op::Div,
        _ => break,
      };
      self.advance();
      let rhs = self.parse_unary(engine)?;
      lhs = OperatorTree::binary(op, lhs, rhs);
    }

    Some(lhs)
  }

  /// `unary := '-' unary | primary`. Unary minus is only legal directly on
  /// a literal: `-5` folds to `Literal(-5.0)`, but `-(1+2)` (anything that
  /// isn't already a bare literal once parsed) is `UNARY_ON_COMPLEX`.
  fn parse_unary(&mut self, engine: &mut DiagnosticEngine) -> Option<OperatorTree> {
    if self.peek().token_type == TokenType::Minus {
      let minus_column = self.peek().column;
      self.advance();
      let operand = self.parse_unary(engine)?;

      return match operand {
        OperatorTree::Literal(v) => Some(OperatorTree::Literal(-v)),
        other => {
          engine.emit(
            Diagnostic::from_kind(ErrorKind::UnaryOnComplex).with_label(Label::primary(
              Span {
                line: 1,
                column: minus_column,
                length: 1,
              },
              Some(format!("unary '-' applied to '{}'", other)),
            )),
          );
          None
        },
      };
    }

    self.parse_primary(engine)
  }

  /// `primary := number | '(' expr ')'`
  fn parse_primary(&mut self, engine: &mut DiagnosticEngine) -> Option<OperatorTree> {
    let token = self.peek().clone();

    match token.token_type {
      TokenType::Number => {
        self.advance();
        match token.lexeme.parse::<f64>() {
          Ok(v) if v.is_finite() => Some(OperatorTree::Literal(v)),
          _ => {
            engine.emit(malformed(&format!("invalid numeric literal '{}'", token.lexeme), token.column));
            None
          },
        }
      },
      TokenType::LeftParen => {
        self.advance();
        let inner = self.parse_expr(engine)?;
        if self.peek().token_type != TokenType::RightParen {
          engine.emit(malformed("'(' was never closed", token.column));
          return None;
        }
        self.advance();
        Some(inner)
      },
      TokenType::Eof => {
        engine.emit(malformed("unexpected end of expression", token.column));
        None
      },
      _ => {
        engine.emit(malformed(&format!("unexpected token '{}'", token.lexeme), token.column));
        None
      },
    }
  }

  fn peek(&self) -> &Token {
    &self.tokens[self.current]
  }

  fn advance(&mut self) -> &Token {
    if !self.is_at_end() {
      self.current += 1;
    }
    &self.tokens[self.current - 1]
  }

  fn is_at_end(&self) -> bool {
    self.peek().token_type == TokenType::Eof
  }
}
