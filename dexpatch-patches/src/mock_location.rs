//! Hide mock location.
//!
//! Forces `Location.isMock()` and `Location.isFromMockProvider()` to read as
//! `false` at every call site whose result can be rewritten safely.

use dexpatch_ir::{ClassDef, ConstantPool, DexImage, Method};
use dexpatch_isa::Instruction;

use crate::call_site::{CallSite, classify};
use crate::error::Result;
use crate::options::PatchOptions;
use crate::patch::{BytecodePatch, PatchInfo};
use crate::rewrite::{RewriteOutcome, rewrite};
use crate::target::TargetDescriptor;
use crate::transform::{InstructionTransform, TransformReport, transform_instructions};

/// `isFromMockProvider` up to API 30, `isMock` from API 31.
pub const MOCK_LOCATION_METHODS: &[TargetDescriptor] = &[
    TargetDescriptor::new("Landroid/location/Location;", "isMock", &[], "Z"),
    TargetDescriptor::new("Landroid/location/Location;", "isFromMockProvider", &[], "Z"),
];

static INFO: PatchInfo = PatchInfo {
    name: "Hide mock location",
    description: "Prevents the app from knowing the device location is being mocked by a third party app.",
    version: env!("CARGO_PKG_VERSION"),
    use_by_default: false,
};

/// Rewrites the captured result of calls to any method in `targets` to a
/// constant `false`.
pub struct ForceFalseResult<'a> {
    pub targets: &'a [TargetDescriptor],
    pub options: &'a PatchOptions,
}

impl InstructionTransform for ForceFalseResult<'_> {
    type Entry = CallSite;

    fn filter_map(
        &self,
        _class: &ClassDef,
        _method: &Method,
        instruction: &Instruction,
        index: usize,
        pool: &ConstantPool,
    ) -> Option<CallSite> {
        classify(instruction, index, pool, self.targets)
    }

    fn transform(&self, method: &mut Method, entry: CallSite) -> Result<RewriteOutcome> {
        rewrite(method, &entry, self.options)
    }
}

pub struct HideMockLocation;

impl BytecodePatch for HideMockLocation {
    fn info(&self) -> &PatchInfo {
        &INFO
    }

    fn execute(&self, image: &mut DexImage, options: &PatchOptions) -> Result<TransformReport> {
        transform_instructions(
            image,
            &ForceFalseResult {
                targets: MOCK_LOCATION_METHODS,
                options,
            },
        )
    }
}
