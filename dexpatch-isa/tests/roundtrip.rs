mod common;

use dexpatch_isa::*;
use common::assert_roundtrip;

#[test]
fn invoke_then_capture() {
    assert_roundtrip(&[
        insn::invoke(Opcode::InvokeVirtual, &[Reg(2)], 7),
        insn::move_result(Reg(0)),
        insn::return_(Reg(0)),
    ]);
}

#[test]
fn fixed_invokes_with_every_register_count() {
    let registers = [Reg(1), Reg(2), Reg(3), Reg(14), Reg(15)];
    let kinds = [
        Opcode::InvokeVirtual,
        Opcode::InvokeSuper,
        Opcode::InvokeDirect,
        Opcode::InvokeStatic,
        Opcode::InvokeInterface,
    ];
    let mut program = Vec::new();
    for kind in kinds {
        for count in 0..=registers.len() {
            program.push(insn::invoke(kind, &registers[..count], count as u32));
        }
    }
    program.push(insn::return_void());
    assert_roundtrip(&program);
}

#[test]
fn range_invokes() {
    assert_roundtrip(&[
        insn::invoke_range(Opcode::InvokeVirtualRange, Reg(0), 1, 0),
        insn::invoke_range(Opcode::InvokeStaticRange, Reg(300), 3, 0xffff),
        insn::invoke_range(Opcode::InvokeInterfaceRange, Reg(20), 255, 12),
        insn::move_result_object(Reg(255)),
        insn::return_object(Reg(255)),
    ]);
}

#[test]
fn polymorphic_invokes() {
    assert_roundtrip(&[
        Instruction::new(
            Opcode::InvokePolymorphic,
            Operands::FixedRegistersProto {
                registers: vec![Reg(1), Reg(2)],
                index: 3,
                proto: 4,
            },
        )
        .unwrap(),
        Instruction::new(
            Opcode::InvokePolymorphicRange,
            Operands::RegisterRangeProto {
                start: Reg(10),
                count: 2,
                index: 5,
                proto: 6,
            },
        )
        .unwrap(),
        insn::return_void(),
    ]);
}

#[test]
fn literal_boundaries() {
    let wide = |opcode, value| Instruction::new(opcode, Operands::Literal(Reg(0), value)).unwrap();
    assert_roundtrip(&[
        insn::const4(Reg(0), -8),
        insn::const4(Reg(15), 7),
        insn::const16(Reg(255), i16::MIN as i64),
        insn::const16(Reg(1), i16::MAX as i64),
        insn::const_(Reg(2), i32::MIN as i64),
        insn::const_(Reg(2), i32::MAX as i64),
        wide(Opcode::ConstHigh16, 0x7fff_0000),
        wide(Opcode::ConstHigh16, -0x8000_0000),
        wide(Opcode::ConstWide16, -1),
        wide(Opcode::ConstWide32, i32::MIN as i64),
        wide(Opcode::ConstWide, i64::MIN),
        wide(Opcode::ConstWide, 0x0123_4567_89ab_cdef),
        wide(Opcode::ConstWideHigh16, i64::MIN),
        insn::return_void(),
    ]);
}

#[test]
fn register_formats() {
    let pair_lit = |opcode, value| {
        Instruction::new(opcode, Operands::RegisterPairLiteral(Reg(1), Reg(2), value)).unwrap()
    };
    assert_roundtrip(&[
        insn::move_(Reg(15), Reg(0)),
        Instruction::new(Opcode::MoveFrom16, Operands::RegisterPair(Reg(255), Reg(65535))).unwrap(),
        Instruction::new(Opcode::Move16, Operands::RegisterPair(Reg(65535), Reg(300))).unwrap(),
        insn::add_int(Reg(0), Reg(128), Reg(255)),
        pair_lit(Opcode::AddIntLit8, -128),
        pair_lit(Opcode::AddIntLit8, 127),
        pair_lit(Opcode::RsubInt, i16::MIN as i32),
        insn::const_string(Reg(3), 0xffff),
        Instruction::new(Opcode::ConstStringJumbo, Operands::RegisterIndex(Reg(3), 0x1_0000)).unwrap(),
        Instruction::new(Opcode::IgetObject, Operands::RegisterPairIndex(Reg(4), Reg(5), 9)).unwrap(),
        insn::return_void(),
    ]);
}

#[test]
fn branches_forward_and_backward() {
    assert_roundtrip(&[
        insn::const4(Reg(0), 0),
        insn::if_eqz(Reg(0), Label(4)),
        insn::if_eq(Reg(0), Reg(1), Label(0)),
        insn::goto(Label(1)),
        insn::return_void(),
    ]);
}

#[test]
fn packed_switch_with_padding() {
    // switch (3 units) + two returns leave the payload at an odd offset.
    let program = [
        insn::packed_switch(Reg(0), Label(3)),
        insn::return_void(),
        insn::return_void(),
        insn::packed_switch_payload(10, &[Label(1), Label(2)]),
    ];
    let (units, offsets) = encode(&program).unwrap();
    assert_eq!(offsets, vec![0, 3, 4, 6]);
    assert_eq!(units[5], 0, "alignment padding should be a nop unit");
    assert_roundtrip(&program);
}

#[test]
fn sparse_switch_and_array_data() {
    assert_roundtrip(&[
        insn::sparse_switch(Reg(0), Label(4)),
        insn::fill_array_data(Reg(1), Label(5)),
        insn::return_void(),
        insn::return_void(),
        insn::sparse_switch_payload(&[(-5, Label(2)), (100, Label(3))]),
        insn::array_payload(2, &[1, 0, 0xff, 0xff, 7, 0]),
    ]);
}

#[test]
fn odd_length_array_payload() {
    assert_roundtrip(&[
        insn::fill_array_data(Reg(0), Label(2)),
        insn::return_void(),
        insn::array_payload(1, &[1, 2, 3]),
    ]);
}

#[test]
fn switch_payload_shared_by_two_switches() {
    let program = [
        insn::packed_switch(Reg(0), Label(4)),
        insn::packed_switch(Reg(1), Label(4)),
        insn::return_void(),
        insn::return_void(),
        insn::packed_switch_payload(0, &[Label(2), Label(3)]),
    ];
    let (units, _) = encode(&program).unwrap();
    let decoded = decode(&units).unwrap();
    assert_eq!(decoded.len(), program.len());
    assert_eq!(decoded[4].0, program[4]);
}
