//! Method access flags.

use bitflags::bitflags;

bitflags! {
    /// `access_flags` of a dex `encoded_method`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AccessFlags: u32 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const CONSTRUCTOR = 0x1_0000;
        const DECLARED_SYNCHRONIZED = 0x2_0000;
    }
}

const NAMES: &[(AccessFlags, &str)] = &[
    (AccessFlags::PUBLIC, "public"),
    (AccessFlags::PRIVATE, "private"),
    (AccessFlags::PROTECTED, "protected"),
    (AccessFlags::STATIC, "static"),
    (AccessFlags::FINAL, "final"),
    (AccessFlags::SYNCHRONIZED, "synchronized"),
    (AccessFlags::BRIDGE, "bridge"),
    (AccessFlags::VARARGS, "varargs"),
    (AccessFlags::NATIVE, "native"),
    (AccessFlags::ABSTRACT, "abstract"),
    (AccessFlags::STRICT, "strictfp"),
    (AccessFlags::SYNTHETIC, "synthetic"),
    (AccessFlags::CONSTRUCTOR, "constructor"),
    (AccessFlags::DECLARED_SYNCHRONIZED, "declared-synchronized"),
];

impl AccessFlags {
    /// Smali keyword for a single flag.
    pub fn from_keyword(name: &str) -> Option<Self> {
        NAMES.iter().find(|(_, n)| *n == name).map(|(flag, _)| *flag)
    }

    /// Smali keywords of the set flags, in declaration order.
    pub fn names(self) -> Vec<&'static str> {
        NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, n)| *n)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        let flags = AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::CONSTRUCTOR;
        let names = flags.names();
        assert_eq!(names, vec!["public", "static", "constructor"]);
        let back = names
            .iter()
            .fold(AccessFlags::empty(), |acc, n| acc | AccessFlags::from_keyword(n).unwrap());
        assert_eq!(back, flags);
        assert_eq!(AccessFlags::from_keyword("volatile"), None);
    }

    #[test]
    fn keywords_are_not_flag_identifiers() {
        assert_eq!(AccessFlags::from_keyword("PUBLIC"), None);
        assert_eq!(AccessFlags::from_name("PUBLIC"), Some(AccessFlags::PUBLIC));
        assert_eq!(
            AccessFlags::from_keyword("declared-synchronized"),
            Some(AccessFlags::DECLARED_SYNCHRONIZED)
        );
    }
}
