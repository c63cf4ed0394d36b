/// This grammar only needs four operators, two parens and a number
/// literal; there are no keywords or identifiers in this language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
  Plus,
  Minus,
  Star,
  Slash,
  LeftParen,
  RightParen,
  Number,
  Eof,
}
