//! Static tables of methods whose call sites a patch acts on.

use dexpatch_ir::MethodReference;

/// A method signature to match invocations against.
pub trait MethodCall {
    fn defining_class(&self) -> &str;
    fn name(&self) -> &str;
    fn parameter_types(&self) -> &[&str];
    fn return_type(&self) -> &str;

    /// Exact structural match on class, name, parameters and return type.
    fn matches(&self, reference: &MethodReference) -> bool {
        self.defining_class() == reference.defining_class
            && self.name() == reference.name
            && self.return_type() == reference.return_type
            && self.parameter_types().len() == reference.parameter_types.len()
            && self
                .parameter_types()
                .iter()
                .zip(&reference.parameter_types)
                .all(|(a, b)| *a == b.as_str())
    }
}

/// A read-only table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub defining_class: &'static str,
    pub name: &'static str,
    pub parameter_types: &'static [&'static str],
    pub return_type: &'static str,
}

impl TargetDescriptor {
    pub const fn new(
        defining_class: &'static str,
        name: &'static str,
        parameter_types: &'static [&'static str],
        return_type: &'static str,
    ) -> Self {
        Self {
            defining_class,
            name,
            parameter_types,
            return_type,
        }
    }

    pub fn to_reference(&self) -> MethodReference {
        MethodReference::new(
            self.defining_class,
            self.name,
            self.parameter_types.iter().copied(),
            self.return_type,
        )
    }
}

impl MethodCall for TargetDescriptor {
    fn defining_class(&self) -> &str {
        self.defining_class
    }

    fn name(&self) -> &str {
        self.name
    }

    fn parameter_types(&self) -> &[&str] {
        self.parameter_types
    }

    fn return_type(&self) -> &str {
        self.return_type
    }
}

/// The table entry `reference` names, if any.
pub fn from_method_reference<'a, T: MethodCall>(table: &'a [T], reference: &MethodReference) -> Option<&'a T> {
    table.iter().find(|entry| entry.matches(reference))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &[TargetDescriptor] = &[
        TargetDescriptor::new("La;", "f", &[], "Z"),
        TargetDescriptor::new("La;", "f", &["I"], "Z"),
    ];

    #[test]
    fn lookup_is_structural() {
        let plain = MethodReference::new("La;", "f", Vec::<String>::new(), "Z");
        let with_int = MethodReference::new("La;", "f", ["I"], "Z");
        let other_return = MethodReference::new("La;", "f", ["I"], "I");
        assert_eq!(from_method_reference(TABLE, &plain), Some(&TABLE[0]));
        assert_eq!(from_method_reference(TABLE, &with_int), Some(&TABLE[1]));
        assert_eq!(from_method_reference(TABLE, &other_return), None);
        assert_eq!(TABLE[1].to_reference(), with_int);
    }
}
