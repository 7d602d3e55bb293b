//! Crate root: wires together the compilation pipeline.
//!
//! The stages are small and run statement by statement:
//! - `tokenizer` scans source text into tokens on demand.
//! - `parser` builds one statement AST at a time, resolving names through `symtab`.
//! - `codegen` lowers each statement into abstract register operations.
//! - `x86` renders the finished operation list as x86-64 assembly.
//! - `error` holds the error type shared by all stages.

pub mod codegen;
pub mod config;
pub mod error;
pub mod parser;
pub mod symtab;
pub mod tokenizer;
pub mod x86;

use tracing::debug;

pub use codegen::{CodeGenerator, Op, Register};
pub use config::CompileOptions;
pub use error::{CompileError, CompileResult, ErrorKind};
pub use symtab::SymbolTable;

use parser::Parser;

/// Output of a successful compilation.
#[derive(Debug)]
pub struct Program {
  pub ops: Vec<Op>,
  pub symbols: SymbolTable,
}

/// Compile a source string with the default limits.
pub fn compile(source: &str) -> CompileResult<Program> {
  compile_with(source, &CompileOptions::default())
}

/// Compile a source string into a framed operation sequence. Nothing is
/// returned unless every statement compiled.
pub fn compile_with(source: &str, options: &CompileOptions) -> CompileResult<Program> {
  let mut parser = Parser::new(source, options);
  let mut codegen = CodeGenerator::new(options.registers);

  codegen.emit_preamble();
  while let Some(stmt) = parser.parse_statement()? {
    codegen.lower_statement(&stmt)?;
  }
  codegen.emit_postamble();

  let ops = codegen.finish();
  debug!(
    ops = ops.len(),
    globals = parser.symbols().len(),
    "compiled unit"
  );
  Ok(Program {
    ops,
    symbols: parser.into_symbols(),
  })
}

/// Compile a source string into AT&T assembly.
pub fn generate_assembly(source: &str) -> CompileResult<String> {
  generate_assembly_with(source, &CompileOptions::default())
}

pub fn generate_assembly_with(source: &str, options: &CompileOptions) -> CompileResult<String> {
  let program = compile_with(source, options)?;
  x86::render(&program.ops, &program.symbols)
}
