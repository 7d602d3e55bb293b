//! Tunable limits of the compiler.

/// Registers available to the code generator by default (`%r8`-`%r11`).
pub const DEFAULT_REGISTERS: usize = 4;
/// Global symbol table capacity.
pub const DEFAULT_MAX_SYMBOLS: usize = 1024;
/// Longest identifier accepted by the lexer.
pub const DEFAULT_MAX_IDENT_LEN: usize = 511;
/// Operators allowed in one expression. Bounds the depth of the tree the
/// code generator walks recursively.
pub const DEFAULT_MAX_EXPR_OPS: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
  /// Size of the abstract register pool.
  pub registers: usize,
  pub max_symbols: usize,
  pub max_ident_len: usize,
  pub max_expr_ops: usize,
}

impl Default for CompileOptions {
  fn default() -> Self {
    Self {
      registers: DEFAULT_REGISTERS,
      max_symbols: DEFAULT_MAX_SYMBOLS,
      max_ident_len: DEFAULT_MAX_IDENT_LEN,
      max_expr_ops: DEFAULT_MAX_EXPR_OPS,
    }
  }
}
