use std::collections::HashSet;

use dexpatch_isa::*;

const INVOKES: [Opcode; 10] = [
    Opcode::InvokeVirtual,
    Opcode::InvokeSuper,
    Opcode::InvokeDirect,
    Opcode::InvokeStatic,
    Opcode::InvokeInterface,
    Opcode::InvokeVirtualRange,
    Opcode::InvokeSuperRange,
    Opcode::InvokeDirectRange,
    Opcode::InvokeStaticRange,
    Opcode::InvokeInterfaceRange,
];

#[test]
fn table_size() {
    // 224 one-byte opcodes and three payload pseudo-opcodes.
    assert_eq!(opcode_count(), 227);
    assert_eq!(opcode_table().len(), opcode_count());
}

#[test]
fn raw_values_round_trip() {
    for &op in opcode_table() {
        assert_eq!(Opcode::from_u16(op.raw()), Some(op), "{op}");
    }
}

#[test]
fn mnemonics_are_unique_and_resolvable() {
    let mut seen = HashSet::new();
    for &op in opcode_table() {
        assert!(seen.insert(op.mnemonic()), "duplicate mnemonic {op}");
        assert_eq!(Opcode::from_mnemonic(op.mnemonic()), Some(op));
    }
    assert_eq!(Opcode::from_mnemonic("invoke-everything"), None);
}

#[test]
fn every_byte_opcode_has_a_fixed_size() {
    for &op in opcode_table() {
        assert_eq!(op.code_units().is_none(), op.is_payload(), "{op}");
    }
}

#[test]
fn invoke_forms() {
    for op in INVOKES {
        assert!(op.is_invoke(), "{op}");
        assert!(op.sets_result(), "{op}");
        assert_eq!(op.reference_type(), ReferenceType::Method, "{op}");
        assert_eq!(op.is_range(), op.format() == Format::F3rc, "{op}");
    }
    assert!(Opcode::InvokeCustom.is_invoke());
    assert!(!Opcode::FilledNewArray.is_invoke());
    assert!(Opcode::FilledNewArray.sets_result());
}

#[test]
fn result_captures() {
    assert!(Opcode::MoveResult.captures_result());
    assert!(Opcode::MoveResultObject.captures_result());
    assert!(!Opcode::MoveResultWide.captures_result());
    assert!(Opcode::MoveResultWide.captures_wide_result());
    assert!(!Opcode::MoveException.captures_result());
}

#[test]
fn method_exits() {
    for op in [
        Opcode::ReturnVoid,
        Opcode::Return,
        Opcode::ReturnWide,
        Opcode::ReturnObject,
        Opcode::Throw,
    ] {
        assert!(op.is_method_exit(), "{op}");
        assert!(!op.has_flag(OpcodeFlags::CAN_CONTINUE), "{op}");
    }
    assert!(!Opcode::Nop.is_method_exit());
}

#[test]
fn branch_kinds() {
    for op in [Opcode::Goto, Opcode::Goto16, Opcode::Goto32] {
        assert!(op.is_unconditional_jump(), "{op}");
        assert!(!op.is_conditional_branch(), "{op}");
    }
    for op in [Opcode::IfEq, Opcode::IfLez, Opcode::PackedSwitch, Opcode::SparseSwitch] {
        assert!(op.is_conditional_branch(), "{op}");
        assert!(!op.is_unconditional_jump(), "{op}");
    }
    assert!(!Opcode::FillArrayData.is_jump());
}

#[test]
fn display_and_debug() {
    assert_eq!(Opcode::MoveResultObject.to_string(), "move-result-object");
    assert_eq!(format!("{:?}", Opcode::Const4), "Opcode(const/4)");
    assert_eq!(Format::F35c.to_string(), "35c");
}
