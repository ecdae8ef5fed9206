use dexpatch_isa::*;

#[test]
fn encode_empty_is_ok() {
    let (units, offsets) = encode(&[]).unwrap();
    assert!(units.is_empty());
    assert!(offsets.is_empty());
}

#[test]
fn encode_label_out_of_bounds() {
    let err = encode(&[insn::goto(Label(1))]).unwrap_err();
    assert!(
        matches!(err, EncodeError::LabelOutOfBounds(1, 1)),
        "expected LabelOutOfBounds(1, 1), got {err}"
    );
}

#[test]
fn encode_switch_target_out_of_bounds() {
    let err = encode(&[
        insn::packed_switch(Reg(0), Label(1)),
        insn::packed_switch_payload(0, &[Label(9)]),
    ])
    .unwrap_err();
    assert!(
        matches!(err, EncodeError::LabelOutOfBounds(9, 2)),
        "expected LabelOutOfBounds(9, 2), got {err}"
    );
}

#[test]
fn encode_short_goto_out_of_range() {
    let mut program = vec![insn::goto(Label(201))];
    program.extend(std::iter::repeat_with(insn::nop).take(200));
    program.push(insn::return_void());
    let err = encode(&program).unwrap_err();
    assert!(
        matches!(
            err,
            EncodeError::BranchOutOfRange {
                index: 0,
                distance: 201,
                format: Format::F10t
            }
        ),
        "expected BranchOutOfRange, got {err}"
    );
}

#[test]
fn encode_switch_pointing_at_code() {
    let err = encode(&[insn::packed_switch(Reg(0), Label(1)), insn::return_void()]).unwrap_err();
    assert!(
        matches!(err, EncodeError::PayloadMismatch { index: 0 }),
        "expected PayloadMismatch, got {err}"
    );
}

#[test]
fn encode_wrong_payload_kind() {
    let err = encode(&[
        insn::sparse_switch(Reg(0), Label(2)),
        insn::return_void(),
        insn::packed_switch_payload(0, &[Label(1)]),
    ])
    .unwrap_err();
    assert!(
        matches!(err, EncodeError::PayloadMismatch { index: 0 }),
        "expected PayloadMismatch, got {err}"
    );
}

#[test]
fn encode_unreferenced_switch_payload() {
    let err = encode(&[
        insn::return_void(),
        insn::packed_switch_payload(0, &[Label(0)]),
    ])
    .unwrap_err();
    assert!(
        matches!(err, EncodeError::UnreferencedPayload(1)),
        "expected UnreferencedPayload(1), got {err}"
    );
}

#[test]
fn encode_unreferenced_array_payload_is_ok() {
    let (units, offsets) = encode(&[insn::return_void(), insn::array_payload(1, &[7])]).unwrap();
    assert_eq!(offsets, vec![0, 2]);
    assert_eq!(units, vec![0x000e, 0x0000, 0x0300, 0x0001, 0x0001, 0x0000, 0x0007]);
}
