//! Recursive-descent parser producing one statement at a time.
//!
//! Statements are parsed by hand-written recursive descent; expressions use
//! two precedence levels (`* /` over `+ -`), each folding left to right so
//! operators of equal precedence associate to the left. Identifiers are
//! resolved against the global symbol table while parsing, so every `Ident`
//! and `LvIdent` node already carries its slot.

use std::fmt;

use snafu::ensure;
use tracing::debug;

use crate::config::CompileOptions;
use crate::error::{
  CompileResult, ExpressionTooLongSnafu, SyntaxSnafu, UndeclaredVariableSnafu,
  UnknownOperatorSnafu,
};
use crate::symtab::SymbolTable;
use crate::tokenizer::{Lexer, Token, TokenKind, describe_token};

/// Binary operators recognised by the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
}

impl BinaryOp {
  /// Map an operator token to its AST operation.
  pub fn from_token(token: &Token) -> CompileResult<Self> {
    match token.kind {
      TokenKind::Plus => Ok(Self::Add),
      TokenKind::Minus => Ok(Self::Sub),
      TokenKind::Star => Ok(Self::Mul),
      TokenKind::Slash => Ok(Self::Div),
      _ => UnknownOperatorSnafu {
        line: token.line,
        token: describe_token(token),
      }
      .fail(),
    }
  }
}

impl fmt::Display for BinaryOp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Self::Add => "ADD",
      Self::Sub => "SUBTRACT",
      Self::Mul => "MULTIPLY",
      Self::Div => "DIVIDE",
    };
    f.write_str(name)
  }
}

/// Expression tree produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstNode {
  Num {
    value: i64,
  },
  /// Read of a global.
  Ident {
    slot: usize,
  },
  /// Global used as a store target.
  LvIdent {
    slot: usize,
  },
  Binary {
    op: BinaryOp,
    lhs: Box<AstNode>,
    rhs: Box<AstNode>,
  },
  /// `value` is evaluated first and then stored into `target`.
  Assign {
    value: Box<AstNode>,
    target: Box<AstNode>,
  },
}

impl AstNode {
  pub fn number(value: i64) -> Self {
    Self::Num { value }
  }

  pub fn ident(slot: usize) -> Self {
    Self::Ident { slot }
  }

  pub fn lv_ident(slot: usize) -> Self {
    Self::LvIdent { slot }
  }

  pub fn binary(op: BinaryOp, lhs: AstNode, rhs: AstNode) -> Self {
    Self::Binary {
      op,
      lhs: Box::new(lhs),
      rhs: Box::new(rhs),
    }
  }

  pub fn assign(value: AstNode, target: AstNode) -> Self {
    Self::Assign {
      value: Box::new(value),
      target: Box::new(target),
    }
  }

  /// Tag used in diagnostics.
  pub fn op_name(&self) -> String {
    match self {
      Self::Num { .. } => "INTLIT".to_string(),
      Self::Ident { .. } => "IDENT".to_string(),
      Self::LvIdent { .. } => "LVIDENT".to_string(),
      Self::Binary { op, .. } => op.to_string(),
      Self::Assign { .. } => "ASSIGN".to_string(),
    }
  }
}

/// A top-level statement. Printing and declaring are statement-level actions
/// rather than tree nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
  Print(AstNode),
  Declare { name: String, slot: usize },
  Assign(AstNode),
}

pub struct Parser<'src> {
  lexer: Lexer<'src>,
  symbols: SymbolTable,
  max_expr_ops: usize,
  /// Operators folded into the expression being parsed.
  expr_ops: usize,
}

impl<'src> Parser<'src> {
  pub fn new(source: &'src str, options: &CompileOptions) -> Self {
    Self {
      lexer: Lexer::new(source, options.max_ident_len),
      symbols: SymbolTable::new(options.max_symbols),
      max_expr_ops: options.max_expr_ops,
      expr_ops: 0,
    }
  }

  pub fn symbols(&self) -> &SymbolTable {
    &self.symbols
  }

  pub fn into_symbols(self) -> SymbolTable {
    self.symbols
  }

  /// Parse the next statement, or return `None` once input is exhausted.
  pub fn parse_statement(&mut self) -> CompileResult<Option<Stmt>> {
    let token = self.lexer.scan()?;
    let stmt = match token.kind {
      TokenKind::Eof => return Ok(None),
      TokenKind::Print => {
        let expr = self.parse_expr()?;
        self.skip(TokenKind::Semi)?;
        Stmt::Print(expr)
      }
      TokenKind::Int => self.parse_declaration()?,
      TokenKind::Ident => self.parse_assignment(token)?,
      _ => return syntax_error(&token, "a statement"),
    };

    debug!(?stmt, line = self.lexer.line(), "parsed statement");
    Ok(Some(stmt))
  }

  fn parse_declaration(&mut self) -> CompileResult<Stmt> {
    let (name, line) = self.get_ident()?;
    self.skip(TokenKind::Semi)?;
    let slot = self.symbols.add_global(&name, line)?;
    Ok(Stmt::Declare { name, slot })
  }

  fn parse_assignment(&mut self, ident: Token) -> CompileResult<Stmt> {
    let target = AstNode::lv_ident(self.resolve(&ident)?);
    self.skip(TokenKind::Equals)?;
    let value = self.parse_expr()?;
    self.skip(TokenKind::Semi)?;
    Ok(Stmt::Assign(AstNode::assign(value, target)))
  }

  /// Parse an expression, stopping at the first token that cannot continue it.
  pub fn parse_expr(&mut self) -> CompileResult<AstNode> {
    self.expr_ops = 0;
    self.parse_add()
  }

  fn parse_add(&mut self) -> CompileResult<AstNode> {
    let mut node = self.parse_mul()?;

    while matches!(self.lexer.peek()?.kind, TokenKind::Plus | TokenKind::Minus) {
      let op = self.scan_operator()?;
      let rhs = self.parse_mul()?;
      node = AstNode::binary(op, node, rhs);
    }

    Ok(node)
  }

  fn parse_mul(&mut self) -> CompileResult<AstNode> {
    let mut node = self.parse_primary()?;

    while matches!(self.lexer.peek()?.kind, TokenKind::Star | TokenKind::Slash) {
      let op = self.scan_operator()?;
      let rhs = self.parse_primary()?;
      node = AstNode::binary(op, node, rhs);
    }

    Ok(node)
  }

  fn scan_operator(&mut self) -> CompileResult<BinaryOp> {
    let token = self.lexer.scan()?;
    self.expr_ops += 1;
    ensure!(
      self.expr_ops <= self.max_expr_ops,
      ExpressionTooLongSnafu {
        line: token.line,
        max: self.max_expr_ops,
      }
    );
    BinaryOp::from_token(&token)
  }

  fn parse_primary(&mut self) -> CompileResult<AstNode> {
    let token = self.lexer.scan()?;
    match (token.kind, token.value) {
      (TokenKind::IntLit, Some(value)) => Ok(AstNode::number(value)),
      (TokenKind::Ident, _) => Ok(AstNode::ident(self.resolve(&token)?)),
      _ => syntax_error(&token, "an integer literal or identifier"),
    }
  }

  /// Look up an identifier token in the symbol table.
  fn resolve(&self, token: &Token) -> CompileResult<usize> {
    let name = token.text.as_deref().unwrap_or_default();
    self.symbols.find_global(name).ok_or_else(|| {
      UndeclaredVariableSnafu {
        line: token.line,
        name,
      }
      .build()
    })
  }

  fn skip(&mut self, kind: TokenKind) -> CompileResult<()> {
    let token = self.lexer.scan()?;
    if token.kind == kind {
      Ok(())
    } else {
      syntax_error(&token, kind.to_string())
    }
  }

  fn get_ident(&mut self) -> CompileResult<(String, usize)> {
    let token = self.lexer.scan()?;
    match token {
      Token {
        kind: TokenKind::Ident,
        text: Some(text),
        line,
        ..
      } => Ok((text, line)),
      _ => syntax_error(&token, "an identifier"),
    }
  }
}

fn syntax_error<T>(got: &Token, expected: impl Into<String>) -> CompileResult<T> {
  SyntaxSnafu {
    line: got.line,
    expected,
    got: describe_token(got),
  }
  .fail()
}
