//! Interned constant-pool tables.

use std::collections::HashMap;
use std::hash::Hash;

use dexpatch_isa::{Instruction, ReferenceType};

use crate::error::ReferenceError;
use crate::reference::{FieldReference, MethodReference, ProtoReference, Reference, unquote};

/// Append-only table that hands out stable `u32` indices.
#[derive(Debug, Clone)]
struct Interner<T> {
    items: Vec<T>,
    index: HashMap<T, u32>,
}

impl<T> Default for Interner<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Clone + Eq + Hash> Interner<T> {
    fn intern(&mut self, item: T) -> u32 {
        if let Some(&idx) = self.index.get(&item) {
            return idx;
        }
        let idx = self.items.len() as u32;
        self.items.push(item.clone());
        self.index.insert(item, idx);
        idx
    }

    fn get(&self, idx: u32) -> Option<&T> {
        self.items.get(idx as usize)
    }

    fn find(&self, item: &T) -> Option<u32> {
        self.index.get(item).copied()
    }
}

/// String, type, field, method, proto, call-site and method-handle tables
/// shared by every method of a [`DexImage`](crate::DexImage).
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    strings: Interner<String>,
    types: Interner<String>,
    fields: Interner<FieldReference>,
    methods: Interner<MethodReference>,
    protos: Interner<ProtoReference>,
    call_sites: Interner<String>,
    method_handles: Interner<String>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern_string(&mut self, s: &str) -> u32 {
        self.strings.intern(s.to_string())
    }

    pub fn intern_type(&mut self, descriptor: &str) -> u32 {
        self.types.intern(descriptor.to_string())
    }

    pub fn intern_field(&mut self, field: FieldReference) -> u32 {
        self.fields.intern(field)
    }

    pub fn intern_method(&mut self, method: MethodReference) -> u32 {
        self.methods.intern(method)
    }

    pub fn intern_proto(&mut self, proto: ProtoReference) -> u32 {
        self.protos.intern(proto)
    }

    pub fn intern_call_site(&mut self, call_site: &str) -> u32 {
        self.call_sites.intern(call_site.to_string())
    }

    pub fn intern_method_handle(&mut self, handle: &str) -> u32 {
        self.method_handles.intern(handle.to_string())
    }

    pub fn string(&self, idx: u32) -> Option<&str> {
        self.strings.get(idx).map(String::as_str)
    }

    pub fn type_descriptor(&self, idx: u32) -> Option<&str> {
        self.types.get(idx).map(String::as_str)
    }

    pub fn field(&self, idx: u32) -> Option<&FieldReference> {
        self.fields.get(idx)
    }

    pub fn method(&self, idx: u32) -> Option<&MethodReference> {
        self.methods.get(idx)
    }

    pub fn proto(&self, idx: u32) -> Option<&ProtoReference> {
        self.protos.get(idx)
    }

    /// Index of an already interned method, without adding it.
    pub fn find_method(&self, method: &MethodReference) -> Option<u32> {
        self.methods.find(method)
    }

    pub fn method_count(&self) -> usize {
        self.methods.items.len()
    }

    /// Look up entry `idx` of the table selected by `kind`.
    pub fn reference(&self, kind: ReferenceType, idx: u32) -> Option<Reference<'_>> {
        Some(match kind {
            ReferenceType::None => return None,
            ReferenceType::String => Reference::String(self.string(idx)?),
            ReferenceType::Type => Reference::Type(self.type_descriptor(idx)?),
            ReferenceType::Field => Reference::Field(self.field(idx)?),
            ReferenceType::Method => Reference::Method(self.method(idx)?),
            ReferenceType::MethodProto => Reference::Proto(self.proto(idx)?),
            ReferenceType::CallSite => Reference::CallSite(self.call_sites.get(idx)?),
            ReferenceType::MethodHandle => Reference::MethodHandle(self.method_handles.get(idx)?),
        })
    }

    /// The symbolic reference carried by `instruction`, if its opcode takes
    /// one and the index is in the pool.
    pub fn resolve(&self, instruction: &Instruction) -> Option<Reference<'_>> {
        let idx = instruction.reference_index()?;
        self.reference(instruction.opcode().reference_type(), idx)
    }

    /// The proto operand of `invoke-polymorphic*`.
    pub fn resolve_proto(&self, instruction: &Instruction) -> Option<&ProtoReference> {
        self.proto(instruction.proto_index()?)
    }

    /// Parse `text` as a reference of `kind` and intern it.
    ///
    /// `kind@N` (the unresolved display form) is accepted when `N` is
    /// already in the table.
    pub fn intern_text(&mut self, kind: ReferenceType, text: &str) -> Result<u32, ReferenceError> {
        if let Some(idx) = text
            .strip_prefix(kind.prefix())
            .and_then(|rest| rest.strip_prefix('@'))
        {
            if kind == ReferenceType::None {
                return Err(ReferenceError::NotAReference);
            }
            let idx = idx.parse::<u32>().map_err(|_| ReferenceError::Malformed {
                kind: kind.prefix(),
                text: text.to_string(),
            })?;
            return match self.reference(kind, idx) {
                Some(_) => Ok(idx),
                None => Err(ReferenceError::UnknownIndex {
                    prefix: kind.prefix(),
                    index: idx,
                }),
            };
        }

        match kind {
            ReferenceType::None => Err(ReferenceError::NotAReference),
            ReferenceType::String => Ok(self.intern_string(&unquote(text)?)),
            ReferenceType::Type => {
                if !crate::reference::is_type_descriptor(text) {
                    return Err(ReferenceError::InvalidType(text.to_string()));
                }
                Ok(self.intern_type(text))
            }
            ReferenceType::Field => Ok(self.intern_field(text.parse()?)),
            ReferenceType::Method => Ok(self.intern_method(text.parse()?)),
            ReferenceType::MethodProto => Ok(self.intern_proto(text.parse()?)),
            ReferenceType::CallSite => Ok(self.intern_call_site(text)),
            ReferenceType::MethodHandle => Ok(self.intern_method_handle(text)),
        }
    }
}
