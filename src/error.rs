//! Shared error type used across the compilation pipeline.
//!
//! Every failure is fatal: the first error aborts compilation and is reported
//! with the source line it was detected on, in the terse style of classic
//! single-pass compilers (`syntax error on line 3: ...`).

use std::num::ParseIntError;

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CompileError {
  #[snafu(display("unrecognised character '{ch}' on line {line}"))]
  UnrecognisedChar { line: usize, ch: char },

  #[snafu(display("integer literal {literal} is out of range on line {line}"))]
  IntegerOverflow {
    line: usize,
    literal: String,
    source: ParseIntError,
  },

  #[snafu(display("identifier longer than {max} characters on line {line}"))]
  IdentifierTooLong { line: usize, max: usize },

  #[snafu(display("syntax error on line {line}: expected {expected}, but got {got}"))]
  Syntax {
    line: usize,
    expected: String,
    got: String,
  },

  #[snafu(display("undeclared variable '{name}' on line {line}"))]
  UndeclaredVariable { line: usize, name: String },

  #[snafu(display("too many global symbols (limit {capacity}) on line {line}"))]
  SymbolTableFull { line: usize, capacity: usize },

  #[snafu(display("expression has more than {max} operators on line {line}"))]
  ExpressionTooLong { line: usize, max: usize },

  #[snafu(display("unknown operator token {token} on line {line}"))]
  UnknownOperator { line: usize, token: String },

  #[snafu(display("unknown AST operator {op}"))]
  UnknownAstOperator { op: String },

  #[snafu(display("no global in slot {slot}"))]
  UnknownGlobal { slot: usize },

  #[snafu(display("out of registers ({available} available)"))]
  OutOfRegisters { available: usize },
}

/// Coarse classification of a [`CompileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Lex,
  Syntax,
  UndeclaredVariable,
  UnknownOperator,
  UnknownAstOperator,
  /// Back-end invariant broken by a hand-built operation list.
  Internal,
  Resource,
}

impl CompileError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::UnrecognisedChar { .. }
      | Self::IntegerOverflow { .. }
      | Self::IdentifierTooLong { .. } => ErrorKind::Lex,
      Self::Syntax { .. } => ErrorKind::Syntax,
      Self::UndeclaredVariable { .. } => ErrorKind::UndeclaredVariable,
      Self::UnknownOperator { .. } => ErrorKind::UnknownOperator,
      Self::UnknownAstOperator { .. } => ErrorKind::UnknownAstOperator,
      Self::UnknownGlobal { .. } => ErrorKind::Internal,
      Self::SymbolTableFull { .. }
      | Self::ExpressionTooLong { .. }
      | Self::OutOfRegisters { .. } => ErrorKind::Resource,
    }
  }

  /// Source line the error was detected on, if it came from the front-end.
  pub fn line(&self) -> Option<usize> {
    match self {
      Self::UnrecognisedChar { line, .. }
      | Self::IntegerOverflow { line, .. }
      | Self::IdentifierTooLong { line, .. }
      | Self::Syntax { line, .. }
      | Self::UndeclaredVariable { line, .. }
      | Self::SymbolTableFull { line, .. }
      | Self::ExpressionTooLong { line, .. }
      | Self::UnknownOperator { line, .. } => Some(*line),
      Self::UnknownAstOperator { .. }
      | Self::UnknownGlobal { .. }
      | Self::OutOfRegisters { .. } => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_messages_carry_line_numbers() {
    let err = CompileError::Syntax {
      line: 3,
      expected: "\";\"".into(),
      got: "EOF".into(),
    };
    assert_eq!(
      err.to_string(),
      "syntax error on line 3: expected \";\", but got EOF"
    );
    assert_eq!(err.line(), Some(3));
    assert_eq!(err.kind(), ErrorKind::Syntax);
  }

  #[test]
  fn test_back_end_errors_have_no_line() {
    let err = CompileError::OutOfRegisters { available: 4 };
    assert_eq!(err.line(), None);
    assert_eq!(err.kind(), ErrorKind::Resource);
  }
}
