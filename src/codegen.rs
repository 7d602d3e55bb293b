//! Code generation: lower statement ASTs into abstract register operations.
//!
//! Expressions are evaluated into a small fixed pool of registers. A node's
//! children are lowered before the node itself, and a binary operation writes
//! its result into the left operand's register and releases the right one.
//! The driver frees the whole pool after each top-level statement, so no
//! register outlives the statement that allocated it.

use std::fmt;

use tracing::{debug, trace};

use crate::error::{CompileResult, OutOfRegistersSnafu, UnknownAstOperatorSnafu};
use crate::parser::{AstNode, BinaryOp, Stmt};

/// Index into the register pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register(pub usize);

impl fmt::Display for Register {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "r{}", self.0)
  }
}

/// Target operation emitted by the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
  Preamble,
  Postamble,
  DeclareGlobal {
    name: String,
  },
  LoadImmediate {
    value: i64,
    dst: Register,
  },
  LoadGlobal {
    slot: usize,
    dst: Register,
  },
  Binary {
    op: BinaryOp,
    lhs: Register,
    rhs: Register,
    dst: Register,
  },
  StoreGlobal {
    src: Register,
    slot: usize,
  },
  Print {
    reg: Register,
  },
}

impl fmt::Display for Op {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Preamble => write!(f, "preamble"),
      Self::Postamble => write!(f, "postamble"),
      Self::DeclareGlobal { name } => write!(f, "declare_global {name}"),
      Self::LoadImmediate { value, dst } => write!(f, "{dst} = load_immediate {value}"),
      Self::LoadGlobal { slot, dst } => write!(f, "{dst} = load_global #{slot}"),
      Self::Binary { op, lhs, rhs, dst } => {
        let name = match op {
          BinaryOp::Add => "add",
          BinaryOp::Sub => "sub",
          BinaryOp::Mul => "mul",
          BinaryOp::Div => "div",
        };
        write!(f, "{dst} = {name} {lhs}, {rhs}")
      }
      Self::StoreGlobal { src, slot } => write!(f, "store_global {src}, #{slot}"),
      Self::Print { reg } => write!(f, "print {reg}"),
    }
  }
}

#[derive(Debug)]
struct RegisterPool {
  in_use: Vec<bool>,
}

impl RegisterPool {
  fn new(size: usize) -> Self {
    Self {
      in_use: vec![false; size],
    }
  }

  fn alloc(&mut self) -> CompileResult<Register> {
    match self.in_use.iter().position(|used| !used) {
      Some(index) => {
        self.in_use[index] = true;
        Ok(Register(index))
      }
      None => OutOfRegistersSnafu {
        available: self.in_use.len(),
      }
      .fail(),
    }
  }

  fn free(&mut self, reg: Register) {
    debug_assert!(self.in_use[reg.0], "freeing unallocated register {reg}");
    self.in_use[reg.0] = false;
  }

  fn free_all(&mut self) {
    self.in_use.fill(false);
  }
}

/// Accumulates the operation sequence for one compilation unit.
#[derive(Debug)]
pub struct CodeGenerator {
  ops: Vec<Op>,
  registers: RegisterPool,
}

impl CodeGenerator {
  pub fn new(registers: usize) -> Self {
    Self {
      ops: Vec::new(),
      registers: RegisterPool::new(registers),
    }
  }

  pub fn emit_preamble(&mut self) {
    self.emit(Op::Preamble);
  }

  pub fn emit_postamble(&mut self) {
    self.emit(Op::Postamble);
  }

  pub fn emit_declare_global(&mut self, name: &str) {
    self.emit(Op::DeclareGlobal {
      name: name.to_string(),
    });
  }

  pub fn emit_print(&mut self, reg: Register) {
    self.emit(Op::Print { reg });
  }

  pub fn free_all_registers(&mut self) {
    self.registers.free_all();
  }

  /// Lower an expression tree and return the register holding its value.
  pub fn lower(&mut self, node: &AstNode) -> CompileResult<Register> {
    match node {
      AstNode::Num { value } => {
        let dst = self.registers.alloc()?;
        self.emit(Op::LoadImmediate { value: *value, dst });
        Ok(dst)
      }
      AstNode::Ident { slot } => {
        let dst = self.registers.alloc()?;
        self.emit(Op::LoadGlobal { slot: *slot, dst });
        Ok(dst)
      }
      AstNode::Binary { op, lhs, rhs } => {
        let lhs = self.lower(lhs)?;
        let rhs = self.lower(rhs)?;
        self.emit(Op::Binary {
          op: *op,
          lhs,
          rhs,
          dst: lhs,
        });
        self.registers.free(rhs);
        Ok(lhs)
      }
      AstNode::Assign { value, target } => {
        let src = self.lower(value)?;
        match target.as_ref() {
          AstNode::LvIdent { slot } => {
            self.emit(Op::StoreGlobal { src, slot: *slot });
            Ok(src)
          }
          other => UnknownAstOperatorSnafu {
            op: other.op_name(),
          }
          .fail(),
        }
      }
      AstNode::LvIdent { .. } => UnknownAstOperatorSnafu {
        op: node.op_name(),
      }
      .fail(),
    }
  }

  /// Emit everything one top-level statement needs, then release its registers.
  pub fn lower_statement(&mut self, stmt: &Stmt) -> CompileResult<()> {
    let start = self.ops.len();
    match stmt {
      Stmt::Print(expr) => {
        let reg = self.lower(expr)?;
        self.emit_print(reg);
      }
      Stmt::Declare { name, .. } => self.emit_declare_global(name),
      Stmt::Assign(tree) => {
        self.lower(tree)?;
      }
    }
    self.free_all_registers();
    debug!(ops = self.ops.len() - start, "lowered statement");
    Ok(())
  }

  pub fn ops(&self) -> &[Op] {
    &self.ops
  }

  pub fn finish(self) -> Vec<Op> {
    self.ops
  }

  fn emit(&mut self, op: Op) {
    trace!(%op, "emit");
    self.ops.push(op);
  }
}
