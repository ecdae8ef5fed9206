//! Symbolic references in smali descriptor form.

use std::fmt;
use std::str::FromStr;

use crate::error::ReferenceError;

/// A method identified by defining class, name and prototype.
///
/// Renders as `Landroid/location/Location;->isMock()Z` and parses from the
/// same text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodReference {
    pub defining_class: String,
    pub name: String,
    pub parameter_types: Vec<String>,
    pub return_type: String,
}

impl MethodReference {
    pub fn new(
        defining_class: impl Into<String>,
        name: impl Into<String>,
        parameter_types: impl IntoIterator<Item = impl Into<String>>,
        return_type: impl Into<String>,
    ) -> Self {
        Self {
            defining_class: defining_class.into(),
            name: name.into(),
            parameter_types: parameter_types.into_iter().map(Into::into).collect(),
            return_type: return_type.into(),
        }
    }

    pub fn proto(&self) -> ProtoReference {
        ProtoReference {
            parameter_types: self.parameter_types.clone(),
            return_type: self.return_type.clone(),
        }
    }
}

impl fmt::Display for MethodReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}(", self.defining_class, self.name)?;
        for ty in &self.parameter_types {
            f.write_str(ty)?;
        }
        write!(f, "){}", self.return_type)
    }
}

impl FromStr for MethodReference {
    type Err = ReferenceError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let malformed = || ReferenceError::Malformed {
            kind: "method",
            text: text.to_string(),
        };
        let (class, rest) = text.split_once("->").ok_or_else(malformed)?;
        let open = rest.find('(').ok_or_else(malformed)?;
        let name = &rest[..open];
        if name.is_empty() {
            return Err(malformed());
        }
        let proto: ProtoReference = rest[open..].parse().map_err(|_| malformed())?;
        Ok(Self {
            defining_class: parse_type(class)?,
            name: name.to_string(),
            parameter_types: proto.parameter_types,
            return_type: proto.return_type,
        })
    }
}

/// A field identified by defining class, name and type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldReference {
    pub defining_class: String,
    pub name: String,
    pub field_type: String,
}

impl fmt::Display for FieldReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}:{}", self.defining_class, self.name, self.field_type)
    }
}

impl FromStr for FieldReference {
    type Err = ReferenceError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let malformed = || ReferenceError::Malformed {
            kind: "field",
            text: text.to_string(),
        };
        let (class, rest) = text.split_once("->").ok_or_else(malformed)?;
        let (name, field_type) = rest.split_once(':').ok_or_else(malformed)?;
        if name.is_empty() {
            return Err(malformed());
        }
        Ok(Self {
            defining_class: parse_type(class)?,
            name: name.to_string(),
            field_type: parse_type(field_type)?,
        })
    }
}

/// A method prototype: `(ILjava/lang/String;)Z`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProtoReference {
    pub parameter_types: Vec<String>,
    pub return_type: String,
}

impl fmt::Display for ProtoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for ty in &self.parameter_types {
            f.write_str(ty)?;
        }
        write!(f, "){}", self.return_type)
    }
}

impl FromStr for ProtoReference {
    type Err = ReferenceError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let malformed = || ReferenceError::Malformed {
            kind: "proto",
            text: text.to_string(),
        };
        let inner = text.strip_prefix('(').ok_or_else(malformed)?;
        let (params, ret) = inner.split_once(')').ok_or_else(malformed)?;
        Ok(Self {
            parameter_types: parse_type_list(params)?,
            return_type: parse_type(ret)?,
        })
    }
}

/// A resolved constant-pool entry, borrowed from the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference<'a> {
    String(&'a str),
    Type(&'a str),
    Field(&'a FieldReference),
    Method(&'a MethodReference),
    Proto(&'a ProtoReference),
    CallSite(&'a str),
    MethodHandle(&'a str),
}

impl<'a> Reference<'a> {
    pub fn as_method(&self) -> Option<&'a MethodReference> {
        match *self {
            Reference::Method(method) => Some(method),
            _ => None,
        }
    }
}

impl fmt::Display for Reference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::String(s) => f.write_str(&quote(s)),
            Reference::Type(t) | Reference::CallSite(t) | Reference::MethodHandle(t) => f.write_str(t),
            Reference::Field(r) => fmt::Display::fmt(r, f),
            Reference::Method(r) => fmt::Display::fmt(r, f),
            Reference::Proto(r) => fmt::Display::fmt(r, f),
        }
    }
}

/// Length in bytes of the type descriptor starting at `start`.
fn descriptor_len(bytes: &[u8], start: usize) -> Option<usize> {
    let mut pos = start;
    while bytes.get(pos) == Some(&b'[') {
        pos += 1;
    }
    match bytes.get(pos)? {
        b'V' | b'Z' | b'B' | b'S' | b'C' | b'I' | b'J' | b'F' | b'D' => Some(pos + 1 - start),
        b'L' => {
            let end = bytes[pos..].iter().position(|&b| b == b';')?;
            // `L;` names nothing
            (end > 1).then_some(pos + end + 1 - start)
        }
        _ => None,
    }
}

/// Check a single type descriptor (`I`, `[J`, `Ljava/lang/Object;`).
pub fn is_type_descriptor(text: &str) -> bool {
    descriptor_len(text.as_bytes(), 0) == Some(text.len())
}

fn parse_type(text: &str) -> Result<String, ReferenceError> {
    if is_type_descriptor(text) {
        Ok(text.to_string())
    } else {
        Err(ReferenceError::InvalidType(text.to_string()))
    }
}

/// Split a concatenated descriptor list (`ILjava/lang/String;[J`) into its
/// types.
pub fn parse_type_list(text: &str) -> Result<Vec<String>, ReferenceError> {
    let bytes = text.as_bytes();
    let mut types = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let len = descriptor_len(bytes, pos)
            .ok_or_else(|| ReferenceError::InvalidType(text[pos..].to_string()))?;
        types.push(text[pos..pos + len].to_string());
        pos += len;
    }
    Ok(types)
}

/// Quote a string constant the way smali prints it.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{unit:04x}"));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Inverse of [`quote`].
pub fn unquote(text: &str) -> Result<String, ReferenceError> {
    let malformed = || ReferenceError::Malformed {
        kind: "string",
        text: text.to_string(),
    };
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .ok_or_else(malformed)?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '"' {
            return Err(malformed());
        }
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next().ok_or_else(malformed)? {
            '"' => out.push('"'),
            '\'' => out.push('\''),
            '\\' => out.push('\\'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'u' => {
                let hex: String = chars.by_ref().take(4).collect();
                let unit = u16::from_str_radix(&hex, 16).map_err(|_| malformed())?;
                let decoded = char::decode_utf16([unit]).next().and_then(|r| r.ok());
                out.push(decoded.ok_or_else(malformed)?);
            }
            _ => return Err(malformed()),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_lengths() {
        assert_eq!(descriptor_len(b"I", 0), Some(1));
        assert_eq!(descriptor_len(b"[[J", 0), Some(3));
        assert_eq!(descriptor_len(b"Ljava/lang/String;I", 0), Some(18));
        assert_eq!(descriptor_len(b"L;", 0), None);
        assert_eq!(descriptor_len(b"Lunterminated", 0), None);
        assert_eq!(descriptor_len(b"[", 0), None);
        assert_eq!(descriptor_len(b"X", 0), None);
    }

    #[test]
    fn quote_round_trip() {
        let text = "tab\there \"quoted\" back\\slash\u{1}";
        let quoted = quote(text);
        assert_eq!(quoted, "\"tab\\there \\\"quoted\\\" back\\\\slash\\u0001\"");
        assert_eq!(unquote(&quoted).unwrap(), text);
    }

    #[test]
    fn unquote_rejects_bare_quote() {
        assert!(unquote("\"a\"b\"").is_err());
        assert!(unquote("no quotes").is_err());
    }
}
