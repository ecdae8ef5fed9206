//! Patch registration and the host pipeline.

use dexpatch_ir::DexImage;
use log::info;

use crate::error::{PatchError, Result};
use crate::mock_location::HideMockLocation;
use crate::options::PatchOptions;
use crate::transform::TransformReport;

/// Metadata the host shows and filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    /// Run without being named in [`PatchOptions::enabled`].
    pub use_by_default: bool,
}

/// A named transformation over a whole [`DexImage`].
pub trait BytecodePatch {
    fn info(&self) -> &PatchInfo;

    fn execute(&self, image: &mut DexImage, options: &PatchOptions) -> Result<TransformReport>;
}

/// Built-in patches in registration order.
pub struct PatchRegistry {
    patches: Vec<Box<dyn BytecodePatch>>,
}

impl Default for PatchRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(HideMockLocation));
        registry
    }
}

impl PatchRegistry {
    /// An empty registry; [`Default`] holds the built-in patches.
    pub fn new() -> Self {
        Self { patches: Vec::new() }
    }

    pub fn register(&mut self, patch: Box<dyn BytecodePatch>) {
        self.patches.push(patch);
    }

    pub fn patches(&self) -> impl Iterator<Item = &dyn BytecodePatch> {
        self.patches.iter().map(|p| p.as_ref())
    }

    /// Look a patch up by name, ignoring ASCII case.
    pub fn find(&self, name: &str) -> Option<&dyn BytecodePatch> {
        self.patches().find(|p| p.info().name.eq_ignore_ascii_case(name))
    }

    /// Patches that run under `options`: the defaults plus every named one,
    /// in registration order.
    pub fn enabled(&self, options: &PatchOptions) -> Result<Vec<&dyn BytecodePatch>> {
        if let Some(unknown) = options.enabled.iter().find(|name| self.find(name).is_none()) {
            return Err(PatchError::UnknownPatch(unknown.clone()));
        }
        Ok(self
            .patches()
            .filter(|p| {
                let info = p.info();
                info.use_by_default
                    || options.enabled.iter().any(|n| info.name.eq_ignore_ascii_case(n))
            })
            .collect())
    }

    /// Execute the enabled patches one after another over `image`.
    pub fn run(
        &self,
        image: &mut DexImage,
        options: &PatchOptions,
    ) -> Result<Vec<(&'static str, TransformReport)>> {
        let mut reports = Vec::new();
        for patch in self.enabled(options)? {
            let name = patch.info().name;
            let report = patch.execute(image, options)?;
            info!("{name}: {report}");
            reports.push((name, report));
        }
        Ok(reports)
    }
}
