mod common;

use common::*;
use dexpatch_ir::*;
use dexpatch_isa::*;

#[test]
fn test_assemble_with_forward_label() {
    let mut pool = ConstantPool::new();
    let program = assemble_method(
        &lines(
            "invoke-virtual {v1}, Landroid/location/Location;->isMock()Z
             move-result v0
             if-eqz v0, :real   # jump when genuine
             const/4 v0, 0x1
             return v0
             :real
             const/4 v0, 0x0
             return v0",
        ),
        &mut pool,
    )
    .unwrap();

    let method = pool.find_method(&is_mock()).unwrap();
    assert_eq!(
        program,
        vec![
            insn::invoke(Opcode::InvokeVirtual, &[Reg(1)], method),
            insn::move_result(Reg(0)),
            insn::if_eqz(Reg(0), Label(5)),
            insn::const4(Reg(0), 1),
            insn::return_(Reg(0)),
            insn::const4(Reg(0), 0),
            insn::return_(Reg(0)),
        ]
    );
}

#[test]
fn test_disassemble_round_trip() {
    let mut pool = ConstantPool::new();
    let source = lines(
        "packed-switch v1, :table
         const-string v0, \"a # b\"  # not part of the string
         sget-object v0, Lcom/example/Config;->NAME:Ljava/lang/String;
         new-instance v0, Ljava/lang/Object;
         :one
         invoke-static/range {v0 .. v1}, Lcom/example/Util;->pick(Ljava/lang/Object;I)V
         goto :one
         :table
         .packed-switch 0x0 {:one, :one}",
    );
    let program = assemble_method(&source, &mut pool).unwrap();
    assert_eq!(pool.string(0), Some("a # b"));

    let listing = disassemble(&program, &pool);
    assert_eq!(
        listing,
        vec![
            "packed-switch v1, :L6",
            "const-string v0, \"a # b\"",
            "sget-object v0, Lcom/example/Config;->NAME:Ljava/lang/String;",
            "new-instance v0, Ljava/lang/Object;",
            ":L4",
            "invoke-static/range {v0 .. v1}, Lcom/example/Util;->pick(Ljava/lang/Object;I)V",
            "goto :L4",
            ":L6",
            ".packed-switch 0x0 {:L4, :L4}",
        ]
    );

    let methods = pool.method_count();
    let again = assemble_method(&listing, &mut pool).unwrap();
    assert_eq!(again, program);
    assert_eq!(pool.method_count(), methods, "re-assembly must reuse pool entries");
    assert!(encode(&again).is_ok());
}

#[test]
fn test_payload_directives() {
    let mut pool = ConstantPool::new();
    let program = assemble_method(
        &lines(
            "sparse-switch v0, :keys
             fill-array-data v1, :data
             :end
             return-void
             :keys
             .sparse-switch {-0x5 -> :end, 0x64 -> :end}
             :data
             .array-data 2 {0x1, -0x1, 0xffff}",
        ),
        &mut pool,
    )
    .unwrap();
    assert_eq!(program[3], insn::sparse_switch_payload(&[(-5, Label(2)), (100, Label(2))]));
    assert_eq!(program[4], insn::array_payload(2, &[1, 0, 0xff, 0xff, 0xff, 0xff]));
}

#[test]
fn test_single_instruction_numeric_labels() {
    let mut pool = ConstantPool::new();
    assert_eq!(assemble_instruction("goto :L3", &mut pool).unwrap(), insn::goto(Label(3)));
    assert_eq!(
        assemble_instruction("const/16 v20, -0x1", &mut pool).unwrap(),
        insn::const16(Reg(20), -1)
    );
    assert_eq!(
        assemble_instruction("invoke-static {}, Lcom/example/Util;->reset()V", &mut pool).unwrap(),
        insn::invoke(Opcode::InvokeStatic, &[], 0)
    );
    // the raw index form resolves against what is already interned
    assert_eq!(
        assemble_instruction("invoke-static {v1}, method@0", &mut pool).unwrap(),
        insn::invoke(Opcode::InvokeStatic, &[Reg(1)], 0)
    );
    assert_eq!(
        assemble_instruction("goto :back", &mut pool).unwrap_err().kind,
        AssembleErrorKind::UndefinedLabel(":back".to_string())
    );
}

#[test]
fn test_error_lines_and_kinds() {
    let mut pool = ConstantPool::new();
    let err = assemble_method(&lines("nop\n\n# comment\ngoto :missing"), &mut pool).unwrap_err();
    assert_eq!(err.line, 4);
    assert_eq!(err.kind, AssembleErrorKind::UndefinedLabel(":missing".to_string()));

    let err = assemble_method(&lines(":a\nnop\n:a\nnop"), &mut pool).unwrap_err();
    assert_eq!(err.line, 3);
    assert_eq!(err.kind, AssembleErrorKind::DuplicateLabel(":a".to_string()));

    let cases: &[(&str, AssembleErrorKind)] = &[
        ("frobnicate v0", AssembleErrorKind::UnknownMnemonic("frobnicate".to_string())),
        (
            "move v0",
            AssembleErrorKind::OperandCount {
                mnemonic: "move",
                expected: 2,
                found: 1,
            },
        ),
        ("return r0", AssembleErrorKind::InvalidRegister("r0".to_string())),
        ("const/4 v0, ten", AssembleErrorKind::InvalidLiteral("ten".to_string())),
        (
            "invoke-static v0, Lcom/example/Util;->reset()V",
            AssembleErrorKind::InvalidRegisterList("v0".to_string()),
        ),
        (
            ".array-data 1 {0x100}",
            AssembleErrorKind::InvalidLiteral("0x100".to_string()),
        ),
        (
            ".array-data 3 {0x1}",
            AssembleErrorKind::Directive(".array-data 3 {0x1}".to_string()),
        ),
        (
            "new-instance v0, Lcom/example/Broken",
            AssembleErrorKind::Reference(ReferenceError::InvalidType("Lcom/example/Broken".to_string())),
        ),
    ];
    for (text, expected) in cases {
        let err = assemble_instruction(text, &mut pool).unwrap_err();
        assert_eq!(&err.kind, expected, "{text}");
        assert_eq!(err.line, 1);
    }
}

#[test]
fn test_operand_limits_are_checked() {
    let mut pool = ConstantPool::new();
    let err = assemble_instruction("const/4 v0, 0x8", &mut pool).unwrap_err();
    assert!(matches!(
        err.kind,
        AssembleErrorKind::Operands(OperandError::LiteralOutOfRange { literal: 8, .. })
    ));

    let err = assemble_instruction("move v16, v0", &mut pool).unwrap_err();
    assert!(matches!(
        err.kind,
        AssembleErrorKind::Operands(OperandError::RegisterOutOfRange { register: 16, .. })
    ));

    let err = assemble_instruction(".sparse-switch {0x1 -> :L0, -0x1 -> :L0}", &mut pool).unwrap_err();
    assert_eq!(err.kind, AssembleErrorKind::Operands(OperandError::UnsortedKeys));

    let err = assemble_instruction(
        "invoke-static {v0, v1, v2, v3, v4, v5}, Lcom/example/Util;->six(IIIIII)V",
        &mut pool,
    )
    .unwrap_err();
    assert!(matches!(
        err.kind,
        AssembleErrorKind::Operands(OperandError::TooManyRegisters { count: 6, .. })
    ));
}
