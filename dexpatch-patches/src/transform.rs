//! Per-instruction transform driver.

use std::collections::BTreeMap;
use std::fmt;

use dexpatch_ir::{ClassDef, ConstantPool, DexImage, Method};
use dexpatch_isa::Instruction;
use log::debug;

use crate::error::Result;
use crate::rewrite::{RewriteOutcome, SkipReason};

/// A two-phase rewrite over every instruction of every method.
///
/// `filter_map` sees the untouched method and picks entries; `transform` is
/// then called once per entry, in instruction order, on the method as left
/// by the previous entries.
pub trait InstructionTransform {
    type Entry;

    fn filter_map(
        &self,
        class: &ClassDef,
        method: &Method,
        instruction: &Instruction,
        index: usize,
        pool: &ConstantPool,
    ) -> Option<Self::Entry>;

    fn transform(&self, method: &mut Method, entry: Self::Entry) -> Result<RewriteOutcome>;
}

/// Call-site tallies of a transform run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformReport {
    pub call_sites: usize,
    pub applied: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl TransformReport {
    pub fn record(&mut self, outcome: RewriteOutcome) {
        match outcome {
            RewriteOutcome::Applied { .. } => self.applied += 1,
            RewriteOutcome::Skipped(reason) => *self.skipped.entry(reason).or_default() += 1,
        }
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn merge(&mut self, other: &TransformReport) {
        self.call_sites += other.call_sites;
        self.applied += other.applied;
        for (reason, count) in &other.skipped {
            *self.skipped.entry(*reason).or_default() += count;
        }
    }
}

impl fmt::Display for TransformReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} call sites, {} rewritten, {} skipped",
            self.call_sites,
            self.applied,
            self.skipped_total()
        )?;
        if !self.skipped.is_empty() {
            f.write_str(" (")?;
            for (i, (reason, count)) in self.skipped.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{reason}: {count}")?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// Run `transform` over every method with code in `image`.
///
/// Methods are independent; a skipped entry never stops the run, an error
/// from `transform` does.
pub fn transform_instructions<T: InstructionTransform>(
    image: &mut DexImage,
    transform: &T,
) -> Result<TransformReport> {
    let mut report = TransformReport::default();
    let (pool, classes) = image.parts_mut();
    let pool: &ConstantPool = pool;

    for class in classes.iter_mut() {
        for m in 0..class.methods.len() {
            let entries: Vec<T::Entry> = {
                let class: &ClassDef = class;
                let method = &class.methods[m];
                let Some(body) = method.implementation() else {
                    continue;
                };
                body.instructions()
                    .iter()
                    .enumerate()
                    .filter_map(|(index, instruction)| {
                        transform.filter_map(class, method, instruction, index, pool)
                    })
                    .collect()
            };
            if entries.is_empty() {
                continue;
            }

            let method = &mut class.methods[m];
            debug!("{}: {} entries", method.reference(), entries.len());
            report.call_sites += entries.len();
            for entry in entries {
                report.record(transform.transform(method, entry)?);
            }
        }
    }
    Ok(report)
}
