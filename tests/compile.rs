use rsubc::parser::BinaryOp;
use rsubc::{CompileError, CompileOptions, ErrorKind, Op, Register, compile, compile_with};

fn body(ops: &[Op]) -> &[Op] {
  assert_eq!(ops.first(), Some(&Op::Preamble));
  assert_eq!(ops.last(), Some(&Op::Postamble));
  &ops[1..ops.len() - 1]
}

#[test]
fn declaration_and_assignment() {
  let program = compile("int x; x = 5;").unwrap();
  let slot = program.symbols.find_global("x").unwrap();

  assert_eq!(
    body(&program.ops),
    &[
      Op::DeclareGlobal { name: "x".into() },
      Op::LoadImmediate {
        value: 5,
        dst: Register(0)
      },
      Op::StoreGlobal {
        src: Register(0),
        slot
      },
    ]
  );
  assert_eq!(program.symbols.find_global("x"), Some(slot));
}

#[test]
fn print_expression() {
  let program = compile("print 2 * 3 + 4;").unwrap();
  assert_eq!(
    body(&program.ops),
    &[
      Op::LoadImmediate {
        value: 2,
        dst: Register(0)
      },
      Op::LoadImmediate {
        value: 3,
        dst: Register(1)
      },
      Op::Binary {
        op: BinaryOp::Mul,
        lhs: Register(0),
        rhs: Register(1),
        dst: Register(0)
      },
      Op::LoadImmediate {
        value: 4,
        dst: Register(1)
      },
      Op::Binary {
        op: BinaryOp::Add,
        lhs: Register(0),
        rhs: Register(1),
        dst: Register(0)
      },
      Op::Print { reg: Register(0) },
    ]
  );
}

#[test]
fn variables_read_back() {
  let program = compile("int a;\nint b;\na = 7;\nb = a - 2;\nprint a * b;\n").unwrap();
  let ops = body(&program.ops);
  assert!(ops.contains(&Op::LoadGlobal {
    slot: 0,
    dst: Register(0)
  }));
  assert_eq!(ops.last(), Some(&Op::Print { reg: Register(0) }));
  assert_eq!(program.symbols.len(), 2);
}

#[test]
fn empty_program_is_just_framing() {
  let program = compile(" \n\t").unwrap();
  assert_eq!(program.ops, vec![Op::Preamble, Op::Postamble]);
}

#[test]
fn undeclared_assignment_fails_with_line() {
  let err = compile("int x;\nx = 1;\ny = 2;").unwrap_err();
  assert_eq!(err.kind(), ErrorKind::UndeclaredVariable);
  assert_eq!(err.line(), Some(3));
  assert_eq!(err.to_string(), "undeclared variable 'y' on line 3");
}

#[test]
fn missing_semicolon_fails() {
  let err = compile("print 1;\nprint 2").unwrap_err();
  assert!(matches!(err, CompileError::Syntax { line: 2, .. }));
}

#[test]
fn unknown_character_fails() {
  let err = compile("print 1 % 2;").unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Lex);
}

#[test]
fn limits_are_configurable() {
  let options = CompileOptions {
    max_symbols: 1,
    ..CompileOptions::default()
  };
  let err = compile_with("int a; int b;", &options).unwrap_err();
  assert!(matches!(err, CompileError::SymbolTableFull { line: 1, .. }));

  let options = CompileOptions {
    registers: 2,
    ..CompileOptions::default()
  };
  let err = compile_with("print 1 + 2 * 3;", &options).unwrap_err();
  assert!(matches!(err, CompileError::OutOfRegisters { available: 2 }));
}

#[test]
fn assembly_output() {
  let asm = rsubc::generate_assembly("int x; x = 6 / 3; print x;").unwrap();
  assert!(asm.contains("main:\n"));
  assert!(asm.contains("    .comm g_x,8,8\n"));
  assert!(asm.contains("    idivq %r9\n"));
  assert!(asm.contains("    movq %r8, g_x(%rip)\n"));
  assert!(asm.contains("    movq g_x(%rip), %r8\n"));
  assert!(asm.contains("    call printint\n"));
}

#[test]
fn keywords_fit_any_identifier_limit() {
  let options = CompileOptions {
    max_ident_len: 1,
    ..CompileOptions::default()
  };
  let program = compile_with("int x; x = 2; print x;", &options).unwrap();
  assert_eq!(program.symbols.find_global("x"), Some(0));
}

#[test]
fn overlong_expression_is_an_error() {
  let options = CompileOptions::default();
  let source = format!("print 1{};", "+1".repeat(options.max_expr_ops + 1));
  let err = compile_with(&source, &options).unwrap_err();
  assert!(matches!(err, CompileError::ExpressionTooLong { line: 1, .. }));

  let source = format!("print 1{};", "+1".repeat(options.max_expr_ops));
  let program = compile_with(&source, &options).unwrap();
  assert!(body(&program.ops).ends_with(&[Op::Print { reg: Register(0) }]));
}
