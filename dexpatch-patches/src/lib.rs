//! Bytecode patches over [`dexpatch_ir::DexImage`]s.
//!
//! The core is a call-site result rewriter: [`classify`] finds invocations
//! of tracked methods, [`rewrite`] forces the value they return to `false`
//! by replacing the capturing `move-result` in place. Patches built on it
//! are registered in a [`PatchRegistry`] and driven by
//! [`transform_instructions`].

pub mod call_site;
pub mod error;
pub mod mock_location;
pub mod options;
pub mod patch;
pub mod rewrite;
pub mod target;
pub mod transform;

pub use call_site::{CallSite, classify, is_call_opcode, result_register};
pub use error::{PatchError, Result};
pub use mock_location::{ForceFalseResult, HideMockLocation, MOCK_LOCATION_METHODS};
pub use options::{PatchOptions, RegisterSource};
pub use patch::{BytecodePatch, PatchInfo, PatchRegistry};
pub use rewrite::{Rewrite, RewriteOutcome, SkipReason, apply, const_false_for, plan, rewrite};
pub use target::{MethodCall, TargetDescriptor, from_method_reference};
pub use transform::{InstructionTransform, TransformReport, transform_instructions};
