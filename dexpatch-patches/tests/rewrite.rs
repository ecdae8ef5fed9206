mod common;

use common::*;
use dexpatch_ir::*;
use dexpatch_isa::*;
use dexpatch_patches::*;

#[test]
fn test_capture_after_fixed_invoke() {
    let mut image = image(3, "invoke-virtual {v2}, {IS_MOCK}\nmove-result v2\nreturn v2");
    let report = hide(&mut image);
    assert_eq!(report.call_sites, 1);
    assert_eq!(report.applied, 1);
    assert_eq!(
        listing(&image),
        vec![
            format!("invoke-virtual {{v2}}, {IS_MOCK}"),
            "const/4 v2, 0x0".to_string(),
            "return v2".to_string(),
        ]
    );
}

#[test]
fn test_capture_after_range_invoke() {
    let mut image = image(6, "invoke-static/range {v5 .. v5}, {FROM_MOCK_PROVIDER}\nmove-result v5");
    hide(&mut image);
    assert_eq!(body(&image).instructions()[1], insn::const4(Reg(5), 0));
}

#[test]
fn test_constant_form_follows_register_number() {
    let mut image = image(16, "invoke-virtual {v15}, {IS_MOCK}\nmove-result v15\nreturn v15");
    hide(&mut image);
    assert_eq!(body(&image).instructions()[1], insn::const4(Reg(15), 0));

    let mut image = common::image(
        21,
        "invoke-virtual/range {v20 .. v20}, {IS_MOCK}\nmove-result v20\nreturn v20",
    );
    hide(&mut image);
    assert_eq!(body(&image).instructions()[1], insn::const16(Reg(20), 0));
    assert_eq!(listing(&image)[1], "const/16 v20, 0x0");
    assert!(body(&image).encode().is_ok());
}

/// `goto :end` over `nops` filler, then a call capturing into v20.
fn jump_over_call(nops: usize) -> String {
    let mut code = vec!["goto :end".to_string()];
    code.extend(std::iter::repeat_n("nop".to_string(), nops));
    code.push("invoke-virtual/range {v20 .. v20}, {IS_MOCK}".to_string());
    code.push("move-result v20".to_string());
    code.push(":end".to_string());
    code.push("return-void".to_string());
    code.join("\n")
}

#[test]
fn test_wide_constant_keeps_branches_encodable() {
    // goto reaches exactly 127 code units before the rewrite
    let mut image = image(21, &jump_over_call(122));
    assert!(body(&image).encode().is_ok());
    let before = body(&image).clone();
    assert_eq!(hide(&mut image), skipped(SkipReason::BranchOutOfRange));
    assert_eq!(body(&image), &before);
    assert!(body(&image).encode().is_ok());

    let mut image = common::image(21, &jump_over_call(121));
    assert_eq!(hide(&mut image).applied, 1);
    assert_eq!(body(&image).instructions()[123], insn::const16(Reg(20), 0));
    assert!(body(&image).encode().is_ok());
}

#[test]
fn test_object_capture() {
    let mut image = image(
        3,
        "invoke-virtual {v1}, {IS_MOCK}\nmove-result-object v1\nreturn-object v1",
    );
    assert_eq!(hide(&mut image).applied, 1);
    assert_eq!(body(&image).instructions()[1], insn::const4(Reg(1), 0));
    assert_eq!(body(&image).instructions()[2], insn::return_object(Reg(1)));
}

#[test]
fn test_register_beyond_v255() {
    let code = "invoke-virtual/range {v300 .. v300}, {IS_MOCK}\nmove-result v0\nreturn v0";
    let mut image = image(301, code);
    let before = body(&image).clone();
    assert_eq!(hide(&mut image), skipped(SkipReason::UnencodableRegister));
    assert_eq!(body(&image), &before);

    // the capture's own register is addressable
    let options = PatchOptions {
        register_source: RegisterSource::Capture,
        ..PatchOptions::default()
    };
    let mut image = common::image(301, code);
    assert_eq!(hide_with(&mut image, &options).applied, 1);
    assert_eq!(body(&image).instructions()[1], insn::const4(Reg(0), 0));
}

#[test]
fn test_register_source() {
    let code = "invoke-virtual {v1}, {IS_MOCK}\nmove-result v0\nreturn v0";

    let mut by_call_site = image(2, code);
    hide(&mut by_call_site);
    assert_eq!(body(&by_call_site).instructions()[1], insn::const4(Reg(1), 0));

    let mut by_capture = image(2, code);
    let options = PatchOptions {
        register_source: RegisterSource::Capture,
        ..PatchOptions::default()
    };
    hide_with(&mut by_capture, &options);
    assert_eq!(body(&by_capture).instructions()[1], insn::const4(Reg(0), 0));
}

#[test]
fn test_non_target_is_untouched() {
    let mut image = image(
        3,
        "invoke-virtual {v2}, Lcom/example/Fake;->isMock()Z\nmove-result v2\nreturn v2",
    );
    let before = body(&image).clone();
    let report = hide(&mut image);
    assert_eq!(report, TransformReport::default());
    assert_eq!(body(&image), &before);
}

#[test]
fn test_safety_skips() {
    let cases = [
        ("return-void\nmove-result v2", SkipReason::MethodExit),
        ("return v2\nmove-result v2", SkipReason::MethodExit),
        ("throw v0\nmove-result v2", SkipReason::MethodExit),
        (
            "if-eqz v0, :end\nmove-result v2\n:end\nreturn-void",
            SkipReason::ConditionalBranch,
        ),
        (
            "packed-switch v0, :table\nmove-result v2\n:end\nreturn-void\n:table\n.packed-switch 0x0 {:end}",
            SkipReason::ConditionalBranch,
        ),
        (
            "goto :end\nmove-result v2\n:end\nreturn-void",
            SkipReason::UnconditionalJump,
        ),
        ("move-result-wide v2\nreturn-void", SkipReason::WideResult),
        (
            "invoke-static {}, Lcom/example/Util;->next()I\nmove-result v2\nreturn-void",
            SkipReason::ResultOverwritten,
        ),
        (
            "filled-new-array {v0}, [I\nmove-result-object v2\nreturn-void",
            SkipReason::ResultOverwritten,
        ),
    ];
    for (tail, reason) in cases {
        let mut image = image(4, &format!("invoke-virtual {{v2}}, {{IS_MOCK}}\n{tail}"));
        let before = body(&image).clone();
        assert_eq!(hide(&mut image), skipped(reason), "{tail}");
        assert_eq!(body(&image), &before, "{tail}");
    }
}

#[test]
fn test_scan_passes_over_unrelated_instructions() {
    let mut image = image(
        4,
        "invoke-virtual {v2}, {IS_MOCK}\nnop\nconst/4 v0, 0x1\nadd-int v1, v0, v0\nmove-result v2\nreturn v2",
    );
    assert_eq!(hide(&mut image).applied, 1);
    assert_eq!(body(&image).instructions()[4], insn::const4(Reg(2), 0));
}

#[test]
fn test_lookahead_window() {
    let options = PatchOptions::default();
    let within = "nop\n".repeat(options.lookahead - 1);
    let mut image = image(3, &format!("invoke-virtual {{v2}}, {{IS_MOCK}}\n{within}move-result v2\nreturn v2"));
    assert_eq!(hide(&mut image).applied, 1);
    assert_eq!(body(&image).instructions()[options.lookahead], insn::const4(Reg(2), 0));

    let beyond = "nop\n".repeat(options.lookahead + 1);
    let mut image = common::image(
        3,
        &format!("invoke-virtual {{v2}}, {{IS_MOCK}}\n{beyond}move-result v2\nreturn v2"),
    );
    let before = body(&image).clone();
    assert_eq!(hide(&mut image), skipped(SkipReason::WindowExhausted));
    assert_eq!(body(&image), &before);

    let wide = PatchOptions {
        lookahead: 32,
        ..PatchOptions::default()
    };
    assert_eq!(hide_with(&mut image, &wide).applied, 1);
}

#[test]
fn test_call_site_at_end_of_method() {
    let mut image = image(3, "invoke-virtual {v2}, {IS_MOCK}");
    assert_eq!(hide(&mut image), skipped(SkipReason::OutOfBounds));
}

const TWO_SITES: &str = "invoke-virtual {v2}, {IS_MOCK}
move-result v2
if-eqz v2, :next
const-string v0, \"mocked\"
:next
invoke-static/range {v3 .. v3}, {FROM_MOCK_PROVIDER}
nop
move-result v3
invoke-virtual {v2}, Lcom/example/Fake;->isMock()Z
move-result v1
return v3";

#[test]
fn test_length_invariance_and_locality() {
    let mut image = image(4, TWO_SITES);
    let before = body(&image).clone();
    let report = hide(&mut image);
    assert_eq!(report.call_sites, 2);
    assert_eq!(report.applied, 2);

    let after = body(&image);
    assert_eq!(after.len(), before.len());
    assert_eq!(after.registers_count(), before.registers_count());
    for (i, (a, b)) in before.instructions().iter().zip(after.instructions()).enumerate() {
        match i {
            1 => assert_eq!(b, &insn::const4(Reg(2), 0)),
            6 => assert_eq!(b, &insn::const4(Reg(3), 0)),
            _ => assert_eq!(a, b, "instruction {i} changed"),
        }
    }
    assert!(after.encode().is_ok());
}

#[test]
fn test_idempotence() {
    let mut image = image(4, TWO_SITES);
    hide(&mut image);
    let once = body(&image).clone();

    let report = hide(&mut image);
    assert_eq!(report.applied, 0);
    assert_eq!(report.call_sites, 2);
    assert_eq!(
        report.skipped.into_iter().collect::<Vec<_>>(),
        vec![(SkipReason::ConditionalBranch, 1), (SkipReason::ResultOverwritten, 1)]
    );
    assert_eq!(body(&image), &once);
}

#[test]
fn test_direct_api() {
    let mut image = image(3, "invoke-virtual {v2}, {IS_MOCK}\nmove-result v2\nreturn v2");
    let options = PatchOptions::default();
    let site = CallSite {
        index: 0,
        result_register: Reg(2),
    };

    let planned = plan(body(&image).instructions(), &site, &options).unwrap();
    assert_eq!(
        planned,
        Rewrite {
            index: 1,
            replacement: insn::const4(Reg(2), 0)
        }
    );

    let wrong_slot = CallSite { index: 1, ..site };
    assert_eq!(
        plan(body(&image).instructions(), &wrong_slot, &options),
        Err(SkipReason::NotAnInvoke)
    );
    let past_end = CallSite { index: 9, ..site };
    assert_eq!(
        plan(body(&image).instructions(), &past_end, &options),
        Err(SkipReason::OutOfBounds)
    );

    let method = &mut image.classes[0].methods[0];
    assert_eq!(rewrite(method, &site, &options).unwrap(), RewriteOutcome::Applied { index: 1 });

    let mut declared = method.clone();
    declared.implementation = None;
    assert_eq!(
        rewrite(&mut declared, &site, &options).unwrap(),
        RewriteOutcome::Skipped(SkipReason::NoImplementation)
    );
}

#[test]
fn test_rejected_replacement_is_an_error() {
    // a call site register outside the declared frame
    let mut image = image(3, "invoke-virtual/range {v7 .. v7}, {IS_MOCK}\nmove-result v2\nreturn v2");
    let err = HideMockLocation
        .execute(&mut image, &PatchOptions::default())
        .unwrap_err();
    match err {
        PatchError::Replace { method, index, source } => {
            assert_eq!(method, "Lcom/example/Tracker;->check()Z");
            assert_eq!(index, 1);
            assert_eq!(
                source,
                dexpatch_ir::Error::RegisterOutsideFrame {
                    register: 7,
                    registers: 3
                }
            );
        }
        other => panic!("unexpected {other}"),
    }
}
