use exprc_common::{Constant, ScalarType};
use exprc_frontend::{
    BinaryOp, Expression, ExpressionKind, Frontend, Program as SourceProgram, RelationalOp, Statement, UnaryOp,
};
use exprc_ir::{Instruction, Label, Linker, Program};
use exprc_vm::{
    default_capabilities, Capability, Interpreter, NativeFunction, UnknownOpcodePolicy, VMState, Value, VmConfig,
    VmError,
};
use pretty_assertions::assert_eq;

fn compile(statements: Vec<Statement>) -> Program {
    Frontend::compile(&SourceProgram::new(statements)).unwrap()
}

fn run_with(program: &Program, capabilities: Vec<Box<dyn Capability>>, config: VmConfig) -> (Result<(), VmError>, String) {
    let mut interpreter = Interpreter::with_output(program, capabilities, Vec::<u8>::new()).with_config(config);
    let result = interpreter.run();
    let output = String::from_utf8(interpreter.into_output()).unwrap();
    (result, output)
}

fn run(program: &Program) -> Result<String, VmError> {
    let (result, output) = run_with(program, default_capabilities(), VmConfig::default());
    result.map(|()| output)
}

fn int_var(name: &str) -> Expression {
    Expression::load(name, ScalarType::Int)
}

fn counting_loop(bound: i64) -> Vec<Statement> {
    vec![
        Statement::var_decl("i", ScalarType::Int, Some(Expression::int(0))),
        Statement::while_loop(
            Expression::relational(RelationalOp::Less, int_var("i"), Expression::int(bound)),
            vec![
                Statement::print(int_var("i")),
                Statement::assign("i", Expression::binary(BinaryOp::Add, int_var("i"), Expression::int(1))),
            ],
        ),
    ]
}

#[test]
fn test_arithmetic_precedence() {
    // 2 + 3*4 - 5
    let expr = Expression::binary(
        BinaryOp::Sub,
        Expression::binary(
            BinaryOp::Add,
            Expression::int(2),
            Expression::binary(BinaryOp::Mul, Expression::int(3), Expression::int(4)),
        ),
        Expression::int(5),
    );
    let program = compile(vec![Statement::print(expr)]);
    assert_eq!(run(&program).unwrap(), "9\n");
}

#[test]
fn test_variable_update() {
    let program = compile(vec![
        Statement::var_decl("a", ScalarType::Int, Some(Expression::int(5))),
        Statement::assign("a", Expression::binary(BinaryOp::Add, int_var("a"), Expression::int(1))),
        Statement::print(int_var("a")),
    ]);
    assert_eq!(run(&program).unwrap(), "6\n");
}

#[test]
fn test_if_else_takes_true_branch() {
    let program = compile(vec![Statement::if_else(
        Expression::relational(RelationalOp::Less, Expression::int(1), Expression::int(2)),
        vec![Statement::print(Expression::int(10))],
        Some(vec![Statement::print(Expression::int(20))]),
    )]);
    assert_eq!(run(&program).unwrap(), "10\n");
}

#[test]
fn test_if_without_else_skips_to_merge() {
    let program = compile(vec![
        Statement::if_else(
            Expression::relational(RelationalOp::Greater, Expression::int(1), Expression::int(2)),
            vec![Statement::print(Expression::string("never"))],
            None,
        ),
        Statement::print(Expression::string("after")),
    ]);
    assert_eq!(run(&program).unwrap(), "after\n");
}

#[test]
fn test_while_loop_counts() {
    let program = compile(counting_loop(3));
    assert_eq!(run(&program).unwrap(), "0\n1\n2\n");
}

#[test]
fn test_string_concatenation() {
    let program = compile(vec![Statement::print(Expression::binary(
        BinaryOp::Add,
        Expression::string("Hello"),
        Expression::string("World"),
    ))]);
    assert_eq!(run(&program).unwrap(), "HelloWorld\n");
}

#[test]
fn test_missing_extern_aborts_before_output() {
    let program = compile(vec![
        Statement::extern_func("frobnicate", &[("x", ScalarType::Int)], ScalarType::Int),
        Statement::print(Expression::string("unreachable")),
    ]);
    let (result, output) = run_with(&program, default_capabilities(), VmConfig::default());
    assert_eq!(result, Err(VmError::ExternNotFound("frobnicate".to_string())));
    assert_eq!(output, "");
    assert!(result.unwrap_err().to_string().contains("not found in any capability namespace"));

    // a real math function is not reachable without the math namespace either
    let program = compile(vec![
        Statement::extern_func("sqrt", &[("x", ScalarType::Float)], ScalarType::Float),
        Statement::print(Expression::int(1)),
    ]);
    let (result, output) = run_with(&program, Vec::new(), VmConfig::default());
    assert_eq!(result, Err(VmError::ExternNotFound("sqrt".to_string())));
    assert_eq!(output, "");
}

#[test]
fn test_loop_header_hit_count() {
    for iterations in [0, 1, 5] {
        let graph = Frontend::generate(&SourceProgram::new(counting_loop(iterations))).unwrap();
        let mut linker = Linker::new();
        let program = linker.link(&graph).unwrap();
        let header = linker.block_start(1).unwrap();

        let (cbranch, _) = program
            .iter()
            .enumerate()
            .find(|(_, instr)| matches!(instr, Instruction::CBranch { .. }))
            .unwrap();

        let mut interpreter = Interpreter::with_output(&program, default_capabilities(), Vec::<u8>::new());
        interpreter.run().unwrap();
        assert_eq!(interpreter.hit_count(cbranch), iterations as u64 + 1);
        assert_eq!(interpreter.hit_count(header), iterations as u64 + 1);

        // the body closes with a jump to the header's own start
        let closing = program.iter().rev().find(|i| matches!(i, Instruction::Jump(_))).unwrap();
        assert_eq!(closing, &Instruction::Jump(Label::Address(header)));
    }
}

/// Direct evaluation with the interpreter's semantics
fn eval(expr: &Expression) -> Value {
    match &expr.kind {
        ExpressionKind::Literal(c) => Value::from(c.clone()),
        ExpressionKind::Group(inner) => eval(inner),
        ExpressionKind::Unary { op: UnaryOp::Minus, operand } => match eval(operand) {
            Value::Int(v) => Value::Int(-v),
            Value::Float(v) => Value::Float(-v),
            other => panic!("cannot negate {other}"),
        },
        ExpressionKind::Unary { operand, .. } => eval(operand),
        ExpressionKind::Binary { op, left, right } => match (eval(left), eval(right)) {
            (Value::Int(a), Value::Int(b)) => Value::Int(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => (a as f64 / b as f64).floor() as i64,
            }),
            (Value::Float(a), Value::Float(b)) => Value::Float(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
            }),
            other => panic!("mixed operands {other:?}"),
        },
        other => panic!("not an arithmetic node: {other:?}"),
    }
}

#[test]
fn test_arithmetic_matches_direct_evaluation() {
    let i = Expression::int;
    let f = Expression::float;
    let bin = Expression::binary;
    let cases = vec![
        bin(BinaryOp::Div, i(7), i(2)),
        bin(BinaryOp::Div, i(-7), i(2)),
        bin(BinaryOp::Div, i(7), Expression::unary(UnaryOp::Minus, i(2))),
        bin(BinaryOp::Mul, Expression::group(bin(BinaryOp::Add, i(1), i(2))), i(-4)),
        bin(BinaryOp::Sub, i(10), bin(BinaryOp::Sub, i(4), i(20))),
        bin(BinaryOp::Div, f(1.0), f(4.0)),
        bin(BinaryOp::Add, f(0.5), bin(BinaryOp::Mul, f(2.0), f(3.25))),
        bin(BinaryOp::Sub, Expression::unary(UnaryOp::Plus, f(2.0)), f(5.5)),
        bin(BinaryOp::Div, bin(BinaryOp::Mul, i(123), i(45)), bin(BinaryOp::Sub, i(3), i(10))),
    ];

    for expr in cases {
        let expected = format!("{}\n", eval(&expr));
        let program = compile(vec![Statement::print(expr)]);
        assert_eq!(run(&program).unwrap(), expected);
    }
}

#[test]
fn test_print_formats() {
    let program = compile(vec![
        Statement::print(Expression::binary(BinaryOp::Add, Expression::float(1.5), Expression::float(1.5))),
        Statement::print(Expression::relational(RelationalOp::LessEqual, Expression::int(1), Expression::int(2))),
        Statement::print(Expression::unary(UnaryOp::Not, Expression::bool(true))),
        Statement::var_decl("s", ScalarType::String, None),
        Statement::print(Expression::load("s", ScalarType::String)),
    ]);
    assert_eq!(run(&program).unwrap(), "3.0\ntrue\nfalse\n\n");
}

#[test]
fn test_extern_calls() {
    let program = compile(vec![
        Statement::extern_func("sqrt", &[("x", ScalarType::Float)], ScalarType::Float),
        Statement::extern_func("floor", &[("x", ScalarType::Float)], ScalarType::Int),
        Statement::print(Expression::call("sqrt", vec![Expression::float(16.0)], ScalarType::Float)),
        Statement::print(Expression::call("floor", vec![Expression::float(2.7)], ScalarType::Int)),
    ]);
    assert_eq!(run(&program).unwrap(), "4.0\n2\n");
}

struct Doubler;

fn double(args: &[Value]) -> Result<Value, String> {
    match args {
        [Value::Int(v)] => Ok(Value::Int(v * 2)),
        _ => Err("expected one int".to_string()),
    }
}

impl Capability for Doubler {
    fn namespace(&self) -> &'static str {
        "doubler"
    }

    fn lookup(&self, name: &str) -> Option<NativeFunction> {
        (name == "double").then(|| NativeFunction::raw(1, double))
    }
}

#[test]
fn test_injected_capability() {
    let program = compile(vec![
        Statement::extern_func("double", &[("n", ScalarType::Int)], ScalarType::Int),
        Statement::print(Expression::call("double", vec![Expression::int(21)], ScalarType::Int)),
    ]);
    let (result, output) = run_with(&program, vec![Box::new(Doubler)], VmConfig::default());
    assert_eq!(result, Ok(()));
    assert_eq!(output, "42\n");

    let (result, _) = run_with(&program, default_capabilities(), VmConfig::default());
    assert_eq!(result, Err(VmError::ExternNotFound("double".to_string())));
}

#[test]
fn test_extern_arity_mismatch() {
    let program = compile(vec![Statement::extern_func(
        "pow",
        &[("x", ScalarType::Float)],
        ScalarType::Float,
    )]);
    assert_eq!(
        run(&program),
        Err(VmError::ArityMismatch { function: "pow".to_string(), expected: 2, found: 1 })
    );
}

#[test]
fn test_division_by_zero() {
    let program = compile(vec![Statement::print(Expression::binary(
        BinaryOp::Div,
        Expression::int(1),
        Expression::int(0),
    ))]);
    assert_eq!(run(&program), Err(VmError::DivisionByZero));
}

#[test]
fn test_unbound_variable() {
    let program = Program::new(vec![Instruction::Print { ty: ScalarType::Int, source: "ghost".to_string() }]);
    assert_eq!(run(&program), Err(VmError::UnboundVariable("ghost".to_string())));
}

#[test]
fn test_store_requires_alloc() {
    let program = Program::new(vec![
        Instruction::Literal { ty: ScalarType::Int, value: Constant::Int(1), target: "__int_0".to_string() },
        Instruction::Store { ty: ScalarType::Int, source: "__int_0".to_string(), name: "x".to_string() },
    ]);
    assert_eq!(run(&program), Err(VmError::UnallocatedVariable("x".to_string())));
}

#[test]
fn test_pc_out_of_range() {
    let program = Program::new(vec![Instruction::Jump(Label::Address(5))]);
    let (result, _) = run_with(&program, Vec::new(), VmConfig::default());
    assert_eq!(result, Err(VmError::PcOutOfRange { pc: 5, len: 1 }));
}

#[test]
fn test_jump_to_end_halts() {
    let program = Program::new(vec![
        Instruction::Jump(Label::Address(2)),
        Instruction::Print { ty: ScalarType::Int, source: "ghost".to_string() },
    ]);
    let mut interpreter = Interpreter::with_output(&program, Vec::new(), Vec::<u8>::new());
    interpreter.run().unwrap();
    assert_eq!(interpreter.state(), &VMState::Halted);
    assert_eq!(interpreter.steps(), 1);
}

#[test]
fn test_unlinked_label() {
    let program = Program::new(vec![Instruction::Jump(Label::Block(3))]);
    assert_eq!(run(&program), Err(VmError::UnresolvedLabel(3)));
}

#[test]
fn test_unknown_opcode_policies() {
    let program: Program = serde_json::from_str(
        r#"[["halt"], ["literal_int", 1, "__int_0"], ["print_int", "__int_0"]]"#,
    )
    .unwrap();

    let (result, output) = run_with(&program, Vec::new(), VmConfig::default());
    assert_eq!(result, Err(VmError::UnknownOpcode { opcode: "halt".to_string(), pc: 0 }));
    assert_eq!(output, "");

    let lenient = VmConfig { unknown_opcode: UnknownOpcodePolicy::Warn, ..VmConfig::default() };
    let (result, output) = run_with(&program, Vec::new(), lenient);
    assert_eq!(result, Ok(()));
    assert_eq!(output, "1\n");
}

#[test]
fn test_step_limit() {
    let program = compile(vec![Statement::while_loop(Expression::bool(true), vec![])]);
    let config = VmConfig { step_limit: Some(100), ..VmConfig::default() };
    let (result, _) = run_with(&program, Vec::new(), config);
    assert_eq!(result, Err(VmError::StepLimitExceeded(100)));
}

#[test]
fn test_state_transitions() {
    let program = compile(vec![Statement::print(Expression::int(1))]);
    let mut interpreter = Interpreter::with_output(&program, Vec::new(), Vec::<u8>::new());
    assert_eq!(interpreter.state(), &VMState::Setup);
    assert_eq!(interpreter.step(), Err(VmError::NotStarted));

    interpreter.reset();
    interpreter.step().unwrap();
    interpreter.step().unwrap();
    assert_eq!(interpreter.pc(), 2);
    assert_eq!(interpreter.state(), &VMState::Running);
    interpreter.step().unwrap();
    assert_eq!(interpreter.state(), &VMState::Halted);
    // halted interpreters stay put
    interpreter.step().unwrap();
    assert_eq!(interpreter.output().as_slice(), b"1\n");

    let failing = compile(vec![Statement::print(Expression::binary(
        BinaryOp::Div,
        Expression::int(1),
        Expression::int(0),
    ))]);
    let mut interpreter = Interpreter::with_output(&failing, Vec::new(), Vec::<u8>::new());
    assert!(interpreter.run().is_err());
    assert_eq!(interpreter.state(), &VMState::Error(VmError::DivisionByZero));
    assert_eq!(interpreter.step(), Err(VmError::DivisionByZero));
}

#[test]
fn test_store_contents_after_run() {
    let program = compile(vec![
        Statement::const_decl("greeting", Expression::string("hi")),
        Statement::var_decl("ratio", ScalarType::Float, Some(Expression::float(0.25))),
    ]);
    let mut interpreter = Interpreter::with_output(&program, Vec::new(), Vec::<u8>::new());
    interpreter.run().unwrap();
    assert_eq!(interpreter.store().get("greeting"), Some(&Value::String("hi".to_string())));
    assert_eq!(interpreter.store().get("ratio"), Some(&Value::Float(0.25)));
}

#[test]
fn test_program_from_wire_format() {
    let json = r#"[
        ["alloc_int", "n"],
        ["literal_int", 2, "__int_0"],
        ["store_int", "__int_0", "n"],
        ["load_int", "n", "__int_1"],
        ["literal_int", 0, "__int_2"],
        ["cmp_int", "gt", "__int_1", "__int_2", "__bool_0"],
        ["cbranch", "__bool_0", 7, 13],
        ["load_int", "n", "__int_3"],
        ["print_int", "__int_3"],
        ["literal_int", 1, "__int_4"],
        ["sub_int", "__int_3", "__int_4", "__int_5"],
        ["store_int", "__int_5", "n"],
        ["jump", 3]
    ]"#;
    let program: Program = serde_json::from_str(json).unwrap();
    assert_eq!(run(&program).unwrap(), "2\n1\n");
}

fn decrement(name: &str) -> Statement {
    Statement::assign(name, Expression::binary(BinaryOp::Sub, int_var(name), Expression::int(1)))
}

fn positive(name: &str) -> Expression {
    Expression::relational(RelationalOp::Greater, int_var(name), Expression::int(0))
}

#[test]
fn test_nested_loops_and_else_chain() {
    let is = |value| Expression::relational(RelationalOp::Equal, int_var("i"), Expression::int(value));
    let program = compile(vec![
        Statement::var_decl("i", ScalarType::Int, Some(Expression::int(2))),
        Statement::var_decl("j", ScalarType::Int, None),
        Statement::while_loop(
            positive("i"),
            vec![
                Statement::if_else(
                    is(2),
                    vec![Statement::print(Expression::int(200))],
                    Some(vec![Statement::if_else(
                        is(1),
                        vec![Statement::print(Expression::int(100))],
                        Some(vec![Statement::print(Expression::string("never"))]),
                    )]),
                ),
                Statement::assign("j", Expression::int(2)),
                Statement::while_loop(positive("j"), vec![Statement::print(int_var("j")), decrement("j")]),
                decrement("i"),
            ],
        ),
        Statement::print(Expression::string("end")),
    ]);

    for instr in program.iter() {
        for label in instr.labels() {
            assert!(matches!(label, Label::Address(addr) if addr <= program.len()));
        }
    }
    assert_eq!(run(&program).unwrap(), "200\n2\n1\n100\n2\n1\nend\n");
}

fn demo(name: &str) -> String {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../demos").join(name);
    std::fs::read_to_string(path).unwrap()
}

fn compile_demo(name: &str) -> Program {
    Frontend::compile(&Frontend::parse_json(&demo(name)).unwrap()).unwrap()
}

#[test]
fn test_linked_demo_matches_build() {
    let built = compile_demo("countdown.json");
    let linked: Program = serde_json::from_str(&demo("countdown.linked.json")).unwrap();
    assert_eq!(built, linked);
    assert_eq!(run(&built).unwrap(), "3\n2\n1\nliftoff\n");
    assert_eq!(run(&linked).unwrap(), run(&built).unwrap());
}

#[test]
fn test_demo_programs_run() {
    assert_eq!(run(&compile_demo("arithmetic.json")).unwrap(), "9\nHelloWorld\n");
    assert_eq!(run(&compile_demo("extern_math.json")).unwrap(), "5.0\n");
}

#[test]
fn test_branch_on_non_bool_is_rejected() {
    let program = Program::new(vec![
        Instruction::Literal { ty: ScalarType::Int, value: Constant::Int(1), target: "t".to_string() },
        Instruction::CBranch { test: "t".to_string(), if_true: Label::Address(0), if_false: Label::Address(2) },
    ]);
    assert_eq!(
        run(&program),
        Err(VmError::TypeMismatch { name: "t".to_string(), expected: "bool".to_string(), found: "int".to_string() })
    );
}
