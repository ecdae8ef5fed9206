use crate::method::Method;
use crate::pool::ConstantPool;

/// A class definition and its methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    /// Type descriptor, e.g. `Lcom/example/Main;`.
    pub type_name: String,
    pub methods: Vec<Method>,
}

impl ClassDef {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            methods: Vec::new(),
        }
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter()
    }

    pub fn methods_mut(&mut self) -> impl Iterator<Item = &mut Method> {
        self.methods.iter_mut()
    }

    pub fn find_method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn find_method_mut(&mut self, name: &str) -> Option<&mut Method> {
        self.methods.iter_mut().find(|m| m.name == name)
    }
}

/// The unit patches run against: one constant pool and the classes whose
/// instructions index into it.
#[derive(Debug, Clone, Default)]
pub struct DexImage {
    pub pool: ConstantPool,
    pub classes: Vec<ClassDef>,
}

impl DexImage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDef> {
        self.classes.iter()
    }

    pub fn classes_mut(&mut self) -> impl Iterator<Item = &mut ClassDef> {
        self.classes.iter_mut()
    }

    /// Split borrow: the pool and the classes at once, so a method can be
    /// edited while references are resolved or interned.
    pub fn parts_mut(&mut self) -> (&mut ConstantPool, &mut [ClassDef]) {
        (&mut self.pool, &mut self.classes)
    }

    pub fn find_class(&self, type_name: &str) -> Option<&ClassDef> {
        self.classes.iter().find(|c| c.type_name == type_name)
    }

    pub fn find_class_mut(&mut self, type_name: &str) -> Option<&mut ClassDef> {
        self.classes.iter_mut().find(|c| c.type_name == type_name)
    }

    /// Methods across all classes, with code or without.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.classes.iter().flat_map(ClassDef::methods)
    }
}
