mod common;

use common::*;
use dexpatch_ir::*;
use dexpatch_isa::*;
use dexpatch_patches::*;

fn classify_one(text: &str) -> Option<CallSite> {
    let mut pool = ConstantPool::new();
    let text = text
        .replace("{IS_MOCK}", IS_MOCK)
        .replace("{FROM_MOCK_PROVIDER}", FROM_MOCK_PROVIDER);
    let instruction = assemble_instruction(&text, &mut pool).unwrap();
    classify(&instruction, 7, &pool, MOCK_LOCATION_METHODS)
}

#[test]
fn test_fixed_register_forms_use_first_register() {
    for mnemonic in [
        "invoke-virtual",
        "invoke-super",
        "invoke-direct",
        "invoke-static",
        "invoke-interface",
    ] {
        assert_eq!(
            classify_one(&format!("{mnemonic} {{v2, v9}}, {{IS_MOCK}}")),
            Some(CallSite {
                index: 7,
                result_register: Reg(2)
            }),
            "{mnemonic}"
        );
    }
}

#[test]
fn test_range_forms_use_start_register() {
    for mnemonic in [
        "invoke-virtual/range",
        "invoke-super/range",
        "invoke-direct/range",
        "invoke-static/range",
        "invoke-interface/range",
    ] {
        assert_eq!(
            classify_one(&format!("{mnemonic} {{v5 .. v6}}, {{FROM_MOCK_PROVIDER}}")),
            Some(CallSite {
                index: 7,
                result_register: Reg(5)
            }),
            "{mnemonic}"
        );
    }
    assert_eq!(
        classify_one("invoke-static/range {v300 .. v300}, {IS_MOCK}").map(|s| s.result_register),
        Some(Reg(300))
    );
}

#[test]
fn test_non_targets_are_ignored() {
    // same shape, different method
    assert_eq!(classify_one("invoke-virtual {v2}, Lcom/example/Fake;->isMock()Z"), None);
    assert_eq!(classify_one("invoke-virtual {v2}, Landroid/location/Location;->isMock(I)Z"), None);
    assert_eq!(classify_one("invoke-virtual {v2}, Landroid/location/Location;->isMock()I"), None);
    assert_eq!(classify_one("invoke-virtual {v2}, Landroid/location/Location;->getTime()J"), None);
    assert_eq!(classify_one("const-string v2, \"isMock\""), None);
    assert_eq!(classify_one("move-result v2"), None);
}

#[test]
fn test_matching_reference_outside_the_ten_forms() {
    assert_eq!(classify_one("invoke-polymorphic {v1}, {IS_MOCK}, ()Z"), None);
    // no register to stand in for the result
    assert_eq!(classify_one("invoke-static {}, {IS_MOCK}"), None);
}

#[test]
fn test_classify_is_pure() {
    let mut pool = ConstantPool::new();
    let instruction = assemble_instruction(&format!("invoke-virtual {{v0}}, {IS_MOCK}"), &mut pool).unwrap();
    let methods = pool.method_count();
    let first = classify(&instruction, 0, &pool, MOCK_LOCATION_METHODS);
    let second = classify(&instruction, 0, &pool, MOCK_LOCATION_METHODS);
    assert_eq!(first, second);
    assert_eq!(pool.method_count(), methods);
}

#[test]
fn test_target_table() {
    let references: Vec<String> = MOCK_LOCATION_METHODS
        .iter()
        .map(|t| t.to_reference().to_string())
        .collect();
    assert_eq!(references, vec![IS_MOCK, FROM_MOCK_PROVIDER]);
    assert!(MOCK_LOCATION_METHODS.iter().all(|t| t.parameter_types().is_empty()));
}
