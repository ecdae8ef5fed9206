#![allow(dead_code)]

use dexpatch_ir::*;
use dexpatch_patches::*;

pub const IS_MOCK: &str = "Landroid/location/Location;->isMock()Z";
pub const FROM_MOCK_PROVIDER: &str = "Landroid/location/Location;->isFromMockProvider()Z";

/// An image with a single method, `Lcom/example/Tracker;->check()Z`, whose
/// body is assembled from `code`. `{IS_MOCK}` and `{FROM_MOCK_PROVIDER}` are
/// substituted first.
pub fn image(registers: u16, code: &str) -> DexImage {
    let code = code
        .replace("{IS_MOCK}", IS_MOCK)
        .replace("{FROM_MOCK_PROVIDER}", FROM_MOCK_PROVIDER);
    let lines: Vec<&str> = code.lines().collect();
    let mut image = DexImage::new();
    let instructions = assemble_method(&lines, &mut image.pool).unwrap();
    let mut class = ClassDef::new("Lcom/example/Tracker;");
    class.methods.push(Method {
        defining_class: "Lcom/example/Tracker;".to_string(),
        name: "check".to_string(),
        parameters: Vec::new(),
        return_type: "Z".to_string(),
        access_flags: AccessFlags::PUBLIC,
        implementation: Some(MethodImplementation::new(registers, instructions)),
    });
    image.classes.push(class);
    image
}

pub fn body(image: &DexImage) -> &MethodImplementation {
    image.classes[0].methods[0].implementation().unwrap()
}

pub fn listing(image: &DexImage) -> Vec<String> {
    disassemble(body(image).instructions(), &image.pool)
}

pub fn hide_with(image: &mut DexImage, options: &PatchOptions) -> TransformReport {
    HideMockLocation.execute(image, options).unwrap()
}

pub fn hide(image: &mut DexImage) -> TransformReport {
    hide_with(image, &PatchOptions::default())
}

/// Report of a run where the only call site was skipped for `reason`.
pub fn skipped(reason: SkipReason) -> TransformReport {
    TransformReport {
        call_sites: 1,
        applied: 0,
        skipped: [(reason, 1)].into_iter().collect(),
    }
}
