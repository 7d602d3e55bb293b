//! Lexical analysis: turns the raw source text into tokens on demand.
//!
//! The lexer is pull-based. The parser asks for one token at a time with
//! [`Lexer::scan`] and may inspect the next one with [`Lexer::peek`]; a single
//! buffered token is all the lookahead the grammar needs. Line numbers are
//! tracked as characters are consumed so every token knows where it started.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use snafu::{ResultExt, ensure};
use tracing::trace;

use crate::error::{
  CompileResult, IdentifierTooLongSnafu, IntegerOverflowSnafu, UnrecognisedCharSnafu,
};

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  Eof,
  Plus,
  Minus,
  Star,
  Slash,
  IntLit,
  Semi,
  Print,
  Equals,
  Int,
  Ident,
}

impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let text = match self {
      Self::Eof => "EOF",
      Self::Plus => "\"+\"",
      Self::Minus => "\"-\"",
      Self::Star => "\"*\"",
      Self::Slash => "\"/\"",
      Self::IntLit => "an integer literal",
      Self::Semi => "\";\"",
      Self::Print => "\"print\"",
      Self::Equals => "\"=\"",
      Self::Int => "\"int\"",
      Self::Ident => "an identifier",
    };
    f.write_str(text)
  }
}

/// A scanned token together with the line it started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub kind: TokenKind,
  /// Set for `IntLit` tokens.
  pub value: Option<i64>,
  /// Set for `Ident` tokens.
  pub text: Option<String>,
  pub line: usize,
}

impl Token {
  fn new(kind: TokenKind, line: usize) -> Self {
    Self {
      kind,
      value: None,
      text: None,
      line,
    }
  }

  fn int_lit(value: i64, line: usize) -> Self {
    Self {
      value: Some(value),
      ..Self::new(TokenKind::IntLit, line)
    }
  }

  fn ident(text: String, line: usize) -> Self {
    Self {
      text: Some(text),
      ..Self::new(TokenKind::Ident, line)
    }
  }
}

/// Human-friendly description used in diagnostics.
pub fn describe_token(token: &Token) -> String {
  match (token.kind, token.value, token.text.as_deref()) {
    (TokenKind::IntLit, Some(value), _) => value.to_string(),
    (TokenKind::Ident, _, Some(text)) => format!("\"{text}\""),
    (kind, _, _) => kind.to_string(),
  }
}

pub struct Lexer<'src> {
  chars: Peekable<Chars<'src>>,
  line: usize,
  max_ident_len: usize,
  lookahead: Option<Token>,
}

impl<'src> Lexer<'src> {
  pub fn new(source: &'src str, max_ident_len: usize) -> Self {
    Self {
      chars: source.chars().peekable(),
      line: 1,
      max_ident_len,
      lookahead: None,
    }
  }

  /// Current 1-based line of the read position.
  pub fn line(&self) -> usize {
    self.line
  }

  /// Consume and return the next token. Once input is exhausted every call
  /// yields `Eof` again.
  pub fn scan(&mut self) -> CompileResult<Token> {
    match self.lookahead.take() {
      Some(token) => Ok(token),
      None => self.lex_token(),
    }
  }

  /// Look at the next token without consuming it.
  pub fn peek(&mut self) -> CompileResult<&Token> {
    let token = match self.lookahead.take() {
      Some(token) => token,
      None => self.lex_token()?,
    };
    Ok(self.lookahead.insert(token))
  }

  fn lex_token(&mut self) -> CompileResult<Token> {
    self.skip_whitespace();
    let line = self.line;

    let Some(c) = self.chars.next() else {
      return Ok(Token::new(TokenKind::Eof, line));
    };

    let token = match c {
      '+' => Token::new(TokenKind::Plus, line),
      '-' => Token::new(TokenKind::Minus, line),
      '*' => Token::new(TokenKind::Star, line),
      '/' => Token::new(TokenKind::Slash, line),
      ';' => Token::new(TokenKind::Semi, line),
      '=' => Token::new(TokenKind::Equals, line),
      c if c.is_ascii_digit() => self.lex_int(c)?,
      c if c.is_ascii_alphabetic() || c == '_' => {
        let text = self.lex_word(c);
        match text.as_str() {
          "print" => Token::new(TokenKind::Print, line),
          "int" => Token::new(TokenKind::Int, line),
          _ => {
            ensure!(
              text.len() <= self.max_ident_len,
              IdentifierTooLongSnafu {
                line,
                max: self.max_ident_len,
              }
            );
            Token::ident(text, line)
          }
        }
      }
      ch => return UnrecognisedCharSnafu { line, ch }.fail(),
    };

    trace!(kind = ?token.kind, line, "scanned token");
    Ok(token)
  }

  fn skip_whitespace(&mut self) {
    while let Some(&c) = self.chars.peek() {
      match c {
        '\n' => self.line += 1,
        ' ' | '\t' | '\r' | '\x0c' => {}
        _ => break,
      }
      self.chars.next();
    }
  }

  fn lex_int(&mut self, first: char) -> CompileResult<Token> {
    let line = self.line;
    let mut literal = String::from(first);
    while let Some(c) = self.chars.next_if(char::is_ascii_digit) {
      literal.push(c);
    }
    let value = literal
      .parse::<i64>()
      .context(IntegerOverflowSnafu { line, literal: &literal })?;
    Ok(Token::int_lit(value, line))
  }

  /// Keyword or identifier text; the length limit is applied by the caller.
  fn lex_word(&mut self, first: char) -> String {
    let mut text = String::from(first);
    while let Some(c) = self
      .chars
      .next_if(|c| c.is_ascii_alphanumeric() || *c == '_')
    {
      text.push(c);
    }
    text
  }
}

/// Lex the whole input into a vector of tokens terminated by a single `Eof`.
pub fn tokenize(source: &str, max_ident_len: usize) -> CompileResult<Vec<Token>> {
  let mut lexer = Lexer::new(source, max_ident_len);
  let mut tokens = Vec::new();
  loop {
    let token = lexer.scan()?;
    let done = token.kind == TokenKind::Eof;
    tokens.push(token);
    if done {
      return Ok(tokens);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::DEFAULT_MAX_IDENT_LEN;
  use crate::error::{CompileError, ErrorKind};

  fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source, DEFAULT_MAX_IDENT_LEN)
      .unwrap()
      .into_iter()
      .map(|token| token.kind)
      .collect()
  }

  #[test]
  fn test_arithmetic_statement() {
    let tokens = tokenize("12+3*4;", DEFAULT_MAX_IDENT_LEN).unwrap();
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
      kinds,
      vec![
        TokenKind::IntLit,
        TokenKind::Plus,
        TokenKind::IntLit,
        TokenKind::Star,
        TokenKind::IntLit,
        TokenKind::Semi,
        TokenKind::Eof,
      ]
    );
    let values: Vec<_> = tokens.iter().filter_map(|t| t.value).collect();
    assert_eq!(values, vec![12, 3, 4]);
  }

  #[test]
  fn test_keywords_and_identifiers() {
    assert_eq!(
      kinds("int x; x = 5; print x;"),
      vec![
        TokenKind::Int,
        TokenKind::Ident,
        TokenKind::Semi,
        TokenKind::Ident,
        TokenKind::Equals,
        TokenKind::IntLit,
        TokenKind::Semi,
        TokenKind::Print,
        TokenKind::Ident,
        TokenKind::Semi,
        TokenKind::Eof,
      ]
    );
  }

  #[test]
  fn test_keyword_prefix_is_an_identifier() {
    let tokens = tokenize("printer integer _tmp1", DEFAULT_MAX_IDENT_LEN).unwrap();
    let texts: Vec<_> = tokens.iter().filter_map(|t| t.text.as_deref()).collect();
    assert_eq!(texts, vec!["printer", "integer", "_tmp1"]);
  }

  #[test]
  fn test_line_numbers() {
    let tokens = tokenize("1\n\n  2\t\r\n3", DEFAULT_MAX_IDENT_LEN).unwrap();
    let lines: Vec<_> = tokens.iter().map(|t| t.line).collect();
    assert_eq!(lines, vec![1, 3, 4, 4]);
  }

  #[test]
  fn test_eof_is_repeatable() {
    let mut lexer = Lexer::new("  ", DEFAULT_MAX_IDENT_LEN);
    assert_eq!(lexer.scan().unwrap().kind, TokenKind::Eof);
    assert_eq!(lexer.scan().unwrap().kind, TokenKind::Eof);
    assert_eq!(lexer.peek().unwrap().kind, TokenKind::Eof);
  }

  #[test]
  fn test_peek_does_not_consume() {
    let mut lexer = Lexer::new("7 ;", DEFAULT_MAX_IDENT_LEN);
    assert_eq!(lexer.peek().unwrap().value, Some(7));
    assert_eq!(lexer.peek().unwrap().value, Some(7));
    assert_eq!(lexer.scan().unwrap().value, Some(7));
    assert_eq!(lexer.scan().unwrap().kind, TokenKind::Semi);
  }

  #[test]
  fn test_unrecognised_char() {
    let err = tokenize("1 +\n  @", DEFAULT_MAX_IDENT_LEN).unwrap_err();
    assert!(matches!(
      err,
      CompileError::UnrecognisedChar { line: 2, ch: '@' }
    ));
    assert_eq!(err.kind(), ErrorKind::Lex);
  }

  #[test]
  fn test_integer_overflow() {
    let err = tokenize("99999999999999999999;", DEFAULT_MAX_IDENT_LEN).unwrap_err();
    assert!(matches!(err, CompileError::IntegerOverflow { line: 1, .. }));
  }

  #[test]
  fn test_identifier_length_limit() {
    assert!(tokenize("abcd", 4).is_ok());
    let err = tokenize("abcde", 4).unwrap_err();
    assert!(matches!(
      err,
      CompileError::IdentifierTooLong { line: 1, max: 4 }
    ));
  }

  #[test]
  fn test_keywords_ignore_identifier_length_limit() {
    let err = tokenize("print abcd;\nint ab;", 2).unwrap_err();
    assert!(matches!(
      err,
      CompileError::IdentifierTooLong { line: 1, max: 2 }
    ));

    let kinds: Vec<_> = tokenize("print ab; int a;", 2)
      .unwrap()
      .into_iter()
      .map(|token| token.kind)
      .collect();
    assert_eq!(
      kinds,
      vec![
        TokenKind::Print,
        TokenKind::Ident,
        TokenKind::Semi,
        TokenKind::Int,
        TokenKind::Ident,
        TokenKind::Semi,
        TokenKind::Eof,
      ]
    );
  }
}
