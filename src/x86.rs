//! Render the abstract operation sequence as x86-64 AT&T assembly.
//!
//! Pool registers map onto `%r8`-`%r11`. Globals live in common symbols and
//! are addressed relative to `%rip`. Their names carry a `g_` prefix so a
//! variable can never collide with `main`, `printint` or other labels. Printing goes through a small `printint`
//! helper that hands the value to `printf`.

use crate::codegen::{Op, Register};
use crate::error::{CompileResult, OutOfRegistersSnafu, UnknownGlobalSnafu};
use crate::parser::BinaryOp;
use crate::symtab::SymbolTable;

// Caller-saved only; `main` never saves anything on entry.
const REGISTER_NAMES: [&str; 4] = ["%r8", "%r9", "%r10", "%r11"];

/// Largest register pool this target can back.
pub const MAX_REGISTERS: usize = REGISTER_NAMES.len();

pub fn render(ops: &[Op], symbols: &SymbolTable) -> CompileResult<String> {
  let mut asm = String::new();
  for op in ops {
    emit_op(op, symbols, &mut asm)?;
  }
  Ok(asm)
}

fn emit_op(op: &Op, symbols: &SymbolTable, asm: &mut String) -> CompileResult<()> {
  match op {
    Op::Preamble => emit_preamble(asm),
    Op::Postamble => {
      asm.push_str("    movl $0, %eax\n");
      asm.push_str("    popq %rbp\n");
      asm.push_str("    ret\n");
    }
    Op::DeclareGlobal { name } => asm.push_str(&format!("    .comm g_{name},8,8\n")),
    Op::LoadImmediate { value, dst } => {
      let dst = reg(*dst)?;
      asm.push_str(&format!("    movq ${value}, {dst}\n"));
    }
    Op::LoadGlobal { slot, dst } => {
      let name = global(symbols, *slot)?;
      let dst = reg(*dst)?;
      asm.push_str(&format!("    movq g_{name}(%rip), {dst}\n"));
    }
    Op::Binary { op, lhs, rhs, dst } => {
      let (lhs, rhs, dst) = (reg(*lhs)?, reg(*rhs)?, reg(*dst)?);
      match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => {
          let mnemonic = match op {
            BinaryOp::Add => "addq",
            BinaryOp::Sub => "subq",
            _ => "imulq",
          };
          if dst != lhs {
            asm.push_str(&format!("    movq {lhs}, {dst}\n"));
          }
          asm.push_str(&format!("    {mnemonic} {rhs}, {dst}\n"));
        }
        BinaryOp::Div => {
          asm.push_str(&format!("    movq {lhs}, %rax\n"));
          asm.push_str("    cqo\n");
          asm.push_str(&format!("    idivq {rhs}\n"));
          asm.push_str(&format!("    movq %rax, {dst}\n"));
        }
      }
    }
    Op::StoreGlobal { src, slot } => {
      let name = global(symbols, *slot)?;
      let src = reg(*src)?;
      asm.push_str(&format!("    movq {src}, g_{name}(%rip)\n"));
    }
    Op::Print { reg: value } => {
      let value = reg(*value)?;
      asm.push_str(&format!("    movq {value}, %rdi\n"));
      asm.push_str("    call printint\n");
    }
  }
  Ok(())
}

fn emit_preamble(asm: &mut String) {
  asm.push_str("    .text\n");
  asm.push_str(".LC0:\n");
  asm.push_str("    .string \"%ld\\n\"\n");
  asm.push_str("printint:\n");
  asm.push_str("    pushq %rbp\n");
  asm.push_str("    movq %rsp, %rbp\n");
  asm.push_str("    movq %rdi, %rsi\n");
  asm.push_str("    leaq .LC0(%rip), %rdi\n");
  asm.push_str("    movl $0, %eax\n");
  asm.push_str("    call printf@PLT\n");
  asm.push_str("    popq %rbp\n");
  asm.push_str("    ret\n");
  asm.push('\n');
  asm.push_str("    .globl main\n");
  asm.push_str("    .type main, @function\n");
  asm.push_str("main:\n");
  asm.push_str("    pushq %rbp\n");
  asm.push_str("    movq %rsp, %rbp\n");
}

fn reg(reg: Register) -> CompileResult<&'static str> {
  match REGISTER_NAMES.get(reg.0) {
    Some(name) => Ok(*name),
    None => OutOfRegistersSnafu {
      available: MAX_REGISTERS,
    }
    .fail(),
  }
}

fn global(symbols: &SymbolTable, slot: usize) -> CompileResult<&str> {
  match symbols.name(slot) {
    Some(name) => Ok(name),
    None => UnknownGlobalSnafu { slot }.fail(),
  }
}
