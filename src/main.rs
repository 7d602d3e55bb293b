use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use clap::builder::RangedU64ValueParser;
use rsubc::config::{
  DEFAULT_MAX_EXPR_OPS, DEFAULT_MAX_IDENT_LEN, DEFAULT_MAX_SYMBOLS, DEFAULT_REGISTERS,
};
use rsubc::{CompileOptions, x86};
use tracing::{Level, debug};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
  /// Source file to compile
  input: PathBuf,
  /// Where to write the assembly
  #[arg(short, long, default_value = "out.s")]
  output: PathBuf,
  /// Print the abstract operation listing instead of writing assembly
  #[arg(long)]
  ops: bool,
  /// Size of the register pool
  #[arg(
    long,
    default_value_t = DEFAULT_REGISTERS,
    value_parser = RangedU64ValueParser::<usize>::new().range(1..=x86::MAX_REGISTERS as u64)
  )]
  registers: usize,
  /// Global symbol table capacity
  #[arg(long, default_value_t = DEFAULT_MAX_SYMBOLS)]
  max_symbols: usize,
  /// Longest identifier accepted
  #[arg(long, default_value_t = DEFAULT_MAX_IDENT_LEN)]
  max_ident_len: usize,
  /// Most operators allowed in one expression
  #[arg(long, default_value_t = DEFAULT_MAX_EXPR_OPS)]
  max_expr_ops: usize,
  /// Increase log verbosity (-v debug, -vv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

fn main() {
  let args = Args::parse();

  let level = match args.verbose {
    0 => Level::WARN,
    1 => Level::DEBUG,
    _ => Level::TRACE,
  };
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_target(false)
    .with_max_level(level)
    .init();

  let source = match fs::read_to_string(&args.input) {
    Ok(source) => source,
    Err(err) => {
      eprintln!("cannot read {}: {err}", args.input.display());
      process::exit(1);
    }
  };

  let options = CompileOptions {
    registers: args.registers,
    max_symbols: args.max_symbols,
    max_ident_len: args.max_ident_len,
    max_expr_ops: args.max_expr_ops,
  };
  debug!(?options, input = %args.input.display(), "compiling");

  let program = match rsubc::compile_with(&source, &options) {
    Ok(program) => program,
    Err(err) => {
      eprintln!("{err}");
      process::exit(1);
    }
  };

  if args.ops {
    for op in &program.ops {
      println!("{op}");
    }
    return;
  }

  let written = x86::render(&program.ops, &program.symbols)
    .map_err(|err| err.to_string())
    .and_then(|asm| fs::write(&args.output, asm).map_err(|err| err.to_string()));
  if let Err(err) = written {
    eprintln!("{err}");
    process::exit(1);
  }
  debug!(output = %args.output.display(), "wrote assembly");
}
