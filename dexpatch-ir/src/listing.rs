//! YAML listing files.
//!
//! ```yaml
//! classes:
//!   - name: Lcom/example/Tracker;
//!     methods:
//!       - name: isFake
//!         parameters: [Landroid/location/Location;]
//!         return_type: Z
//!         access_flags: [public]
//!         registers: 2
//!         code:
//!           - invoke-virtual {v1}, Landroid/location/Location;->isMock()Z
//!           - move-result v1
//!           - return v1
//! ```
//!
//! A method without `code` has no implementation (abstract or native).

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::access::AccessFlags;
use crate::assemble::assemble_method;
use crate::class::{ClassDef, DexImage};
use crate::disassemble::disassemble;
use crate::error::{ListingError, ReferenceError};
use crate::method::{Method, MethodImplementation};
use crate::reference::is_type_descriptor;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub classes: Vec<ClassListing>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassListing {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<MethodListing>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodListing {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default = "default_return_type")]
    pub return_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub access_flags: Vec<String>,
    #[serde(default)]
    pub registers: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Vec<String>>,
}

fn default_return_type() -> String {
    "V".to_string()
}

impl Listing {
    pub fn from_yaml(text: &str) -> Result<Self, ListingError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn to_yaml(&self) -> Result<String, ListingError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn read(path: &Path) -> Result<Self, ListingError> {
        let text = std::fs::read_to_string(path).map_err(|e| ListingError::Io(e.to_string()))?;
        Self::from_yaml(&text)
    }

    pub fn write(&self, path: &Path) -> Result<(), ListingError> {
        std::fs::write(path, self.to_yaml()?).map_err(|e| ListingError::Io(e.to_string()))
    }

    /// Assemble every method into a fresh [`DexImage`].
    ///
    /// Each method body must fit its declared register frame and encode
    /// cleanly.
    pub fn to_image(&self) -> Result<DexImage, ListingError> {
        let mut image = DexImage::new();
        for class in &self.classes {
            check_type(&class.name, &class.name)?;
            let mut def = ClassDef::new(class.name.clone());
            for method in &class.methods {
                let context = format!("{}->{}", class.name, method.name);
                for ty in &method.parameters {
                    check_type(&context, ty)?;
                }
                check_type(&context, &method.return_type)?;
                let access_flags = method.access_flags.iter().try_fold(AccessFlags::empty(), |acc, name| {
                    AccessFlags::from_keyword(name)
                        .map(|flag| acc | flag)
                        .ok_or_else(|| ListingError::AccessFlag(name.clone()))
                })?;

                let implementation = match &method.code {
                    Some(lines) => Some(assemble_body(&class.name, method, lines, &mut image)?),
                    None => None,
                };

                def.methods.push(Method {
                    defining_class: class.name.clone(),
                    name: method.name.clone(),
                    parameters: method.parameters.clone(),
                    return_type: method.return_type.clone(),
                    access_flags,
                    implementation,
                });
            }
            image.classes.push(def);
        }
        debug!(
            "assembled {} classes, {} methods",
            image.classes.len(),
            image.methods().count()
        );
        Ok(image)
    }

    /// Disassemble an image back into listing form.
    pub fn from_image(image: &DexImage) -> Self {
        let classes = image
            .classes()
            .map(|class| ClassListing {
                name: class.type_name.clone(),
                methods: class
                    .methods()
                    .map(|method| MethodListing {
                        name: method.name.clone(),
                        parameters: method.parameters.clone(),
                        return_type: method.return_type.clone(),
                        access_flags: method
                            .access_flags
                            .names()
                            .into_iter()
                            .map(str::to_string)
                            .collect(),
                        registers: method
                            .implementation()
                            .map_or(0, MethodImplementation::registers_count),
                        code: method
                            .implementation()
                            .map(|imp| disassemble(imp.instructions(), &image.pool)),
                    })
                    .collect(),
            })
            .collect();
        Self { classes }
    }
}

fn check_type(context: &str, descriptor: &str) -> Result<(), ListingError> {
    if is_type_descriptor(descriptor) {
        Ok(())
    } else {
        Err(ListingError::Reference {
            context: context.to_string(),
            source: ReferenceError::InvalidType(descriptor.to_string()),
        })
    }
}

fn assemble_body(
    class: &str,
    method: &MethodListing,
    lines: &[String],
    image: &mut DexImage,
) -> Result<MethodImplementation, ListingError> {
    let instructions = assemble_method(lines, &mut image.pool).map_err(|source| ListingError::Assemble {
        class: class.to_string(),
        method: method.name.clone(),
        source,
    })?;

    if let Some(register) = instructions.iter().filter_map(|i| i.max_register()).max() {
        if register >= method.registers as u32 {
            return Err(ListingError::RegisterOutsideFrame {
                class: class.to_string(),
                method: method.name.clone(),
                register,
                registers: method.registers,
            });
        }
    }

    let implementation = MethodImplementation::new(method.registers, instructions);
    implementation.encode().map_err(|source| ListingError::Encode {
        class: class.to_string(),
        method: method.name.clone(),
        source,
    })?;
    Ok(implementation)
}
