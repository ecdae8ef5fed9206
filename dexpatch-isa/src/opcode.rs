//! Dalvik opcode table.
//!
//! Every assigned opcode byte `0x00..=0xff` is listed together with its
//! mnemonic, instruction [`Format`], the kind of constant-pool entry its index
//! operand refers to and a set of [`OpcodeFlags`]. The three payload
//! pseudo-instructions (`packed-switch`, `sparse-switch` and `fill-array-data`
//! payloads) are encoded as a `nop` with a non-zero high byte and appear here
//! under their 16-bit identifiers.

use std::fmt;

use bitflags::bitflags;

/// Instruction encoding format, named after the Dalvik format identifiers
/// (`35c` = 3 code units, 5 registers, constant-pool index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    F10x,
    F10t,
    F11n,
    F11x,
    F12x,
    F20t,
    F21c,
    F21h,
    F21s,
    F21t,
    F22b,
    F22c,
    F22s,
    F22t,
    F22x,
    F23x,
    F30t,
    F31c,
    F31i,
    F31t,
    F32x,
    F35c,
    F3rc,
    F45cc,
    F4rcc,
    F51l,
    /// Variable-length payload (switch tables and array data).
    Payload,
}

impl Format {
    /// Size in 16-bit code units, or `None` for variable-length payloads.
    pub const fn code_units(self) -> Option<usize> {
        match self {
            Format::F10x | Format::F10t | Format::F11n | Format::F11x | Format::F12x => Some(1),
            Format::F20t
            | Format::F21c
            | Format::F21h
            | Format::F21s
            | Format::F21t
            | Format::F22b
            | Format::F22c
            | Format::F22s
            | Format::F22t
            | Format::F22x
            | Format::F23x => Some(2),
            Format::F30t
            | Format::F31c
            | Format::F31i
            | Format::F31t
            | Format::F32x
            | Format::F35c
            | Format::F3rc => Some(3),
            Format::F45cc | Format::F4rcc => Some(4),
            Format::F51l => Some(5),
            Format::Payload => None,
        }
    }

    /// The Dalvik identifier of this format (`"35c"`, `"3rc"`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            Format::F10x => "10x",
            Format::F10t => "10t",
            Format::F11n => "11n",
            Format::F11x => "11x",
            Format::F12x => "12x",
            Format::F20t => "20t",
            Format::F21c => "21c",
            Format::F21h => "21h",
            Format::F21s => "21s",
            Format::F21t => "21t",
            Format::F22b => "22b",
            Format::F22c => "22c",
            Format::F22s => "22s",
            Format::F22t => "22t",
            Format::F22x => "22x",
            Format::F23x => "23x",
            Format::F30t => "30t",
            Format::F31c => "31c",
            Format::F31i => "31i",
            Format::F31t => "31t",
            Format::F32x => "32x",
            Format::F35c => "35c",
            Format::F3rc => "3rc",
            Format::F45cc => "45cc",
            Format::F4rcc => "4rcc",
            Format::F51l => "51l",
            Format::Payload => "payload",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of constant-pool entry referenced by an instruction's index operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceType {
    None,
    String,
    Type,
    Field,
    Method,
    CallSite,
    MethodProto,
    MethodHandle,
}

impl ReferenceType {
    /// Prefix used when an index is printed without resolving it
    /// (`method@3`).
    pub const fn prefix(self) -> &'static str {
        match self {
            ReferenceType::None => "",
            ReferenceType::String => "string",
            ReferenceType::Type => "type",
            ReferenceType::Field => "field",
            ReferenceType::Method => "method",
            ReferenceType::CallSite => "call_site",
            ReferenceType::MethodProto => "proto",
            ReferenceType::MethodHandle => "method_handle",
        }
    }
}

bitflags! {
    /// Static properties of an opcode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpcodeFlags: u32 {
        const CAN_THROW = 1 << 0;
        /// Execution may fall through to the next instruction.
        const CAN_CONTINUE = 1 << 1;
        /// Sets the hidden result register read by `move-result*`.
        const SETS_RESULT = 1 << 2;
        /// Writes its first register operand.
        const SETS_REGISTER = 1 << 3;
        /// Writes a register pair starting at its first register operand.
        const SETS_WIDE_REGISTER = 1 << 4;
        /// Transfers control to a label.
        const JUMP = 1 << 5;
        const CONDITIONAL = 1 << 6;
        const SWITCH = 1 << 7;
        const RETURN = 1 << 8;
        const THROW = 1 << 9;
        const INVOKE = 1 << 10;
        const PAYLOAD = 1 << 11;
    }
}

const NONE: OpcodeFlags = OpcodeFlags::empty();
const CONT: OpcodeFlags = OpcodeFlags::CAN_CONTINUE;
const THROWS: OpcodeFlags = CONT.union(OpcodeFlags::CAN_THROW);
const REG: OpcodeFlags = CONT.union(OpcodeFlags::SETS_REGISTER);
const WIDE: OpcodeFlags = REG.union(OpcodeFlags::SETS_WIDE_REGISTER);
const REG_THROWS: OpcodeFlags = REG.union(OpcodeFlags::CAN_THROW);
const WIDE_THROWS: OpcodeFlags = WIDE.union(OpcodeFlags::CAN_THROW);
const RESULT: OpcodeFlags = THROWS.union(OpcodeFlags::SETS_RESULT);
const INVOKE: OpcodeFlags = RESULT.union(OpcodeFlags::INVOKE);
const RETURN: OpcodeFlags = OpcodeFlags::RETURN;
const GOTO: OpcodeFlags = OpcodeFlags::JUMP;
const BRANCH: OpcodeFlags = CONT.union(OpcodeFlags::JUMP).union(OpcodeFlags::CONDITIONAL);
const SWITCH: OpcodeFlags = BRANCH.union(OpcodeFlags::SWITCH);
const THROW: OpcodeFlags = OpcodeFlags::CAN_THROW.union(OpcodeFlags::THROW);
const PAYLOAD: OpcodeFlags = OpcodeFlags::PAYLOAD;

macro_rules! opcodes {
    ($($raw:literal => $name:ident, $mnemonic:literal, $format:ident, $reference:ident, $flags:expr;)*) => {
        /// A Dalvik opcode. The discriminant is the raw opcode byte, or the
        /// 16-bit identifier for payload pseudo-instructions.
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        pub enum Opcode {
            $($name = $raw,)*
        }

        static OPCODE_TABLE: &[Opcode] = &[$(Opcode::$name,)*];

        impl Opcode {
            /// Look up an opcode by its 16-bit identifier.
            pub const fn from_u16(raw: u16) -> Option<Self> {
                match raw {
                    $($raw => Some(Opcode::$name),)*
                    _ => None,
                }
            }

            /// Mnemonic as written in smali (`invoke-virtual/range`).
            pub const fn mnemonic(self) -> &'static str {
                match self {
                    $(Opcode::$name => $mnemonic,)*
                }
            }

            pub const fn format(self) -> Format {
                match self {
                    $(Opcode::$name => Format::$format,)*
                }
            }

            pub const fn reference_type(self) -> ReferenceType {
                match self {
                    $(Opcode::$name => ReferenceType::$reference,)*
                }
            }

            pub const fn flags(self) -> OpcodeFlags {
                match self {
                    $(Opcode::$name => $flags,)*
                }
            }
        }
    };
}

opcodes! {
    0x00 => Nop, "nop", F10x, None, CONT;
    0x01 => Move, "move", F12x, None, REG;
    0x02 => MoveFrom16, "move/from16", F22x, None, REG;
    0x03 => Move16, "move/16", F32x, None, REG;
    0x04 => MoveWide, "move-wide", F12x, None, WIDE;
    0x05 => MoveWideFrom16, "move-wide/from16", F22x, None, WIDE;
    0x06 => MoveWide16, "move-wide/16", F32x, None, WIDE;
    0x07 => MoveObject, "move-object", F12x, None, REG;
    0x08 => MoveObjectFrom16, "move-object/from16", F22x, None, REG;
    0x09 => MoveObject16, "move-object/16", F32x, None, REG;
    0x0a => MoveResult, "move-result", F11x, None, REG;
    0x0b => MoveResultWide, "move-result-wide", F11x, None, WIDE;
    0x0c => MoveResultObject, "move-result-object", F11x, None, REG;
    0x0d => MoveException, "move-exception", F11x, None, REG;
    0x0e => ReturnVoid, "return-void", F10x, None, RETURN;
    0x0f => Return, "return", F11x, None, RETURN;
    0x10 => ReturnWide, "return-wide", F11x, None, RETURN;
    0x11 => ReturnObject, "return-object", F11x, None, RETURN;
    0x12 => Const4, "const/4", F11n, None, REG;
    0x13 => Const16, "const/16", F21s, None, REG;
    0x14 => Const, "const", F31i, None, REG;
    0x15 => ConstHigh16, "const/high16", F21h, None, REG;
    0x16 => ConstWide16, "const-wide/16", F21s, None, WIDE;
    0x17 => ConstWide32, "const-wide/32", F31i, None, WIDE;
    0x18 => ConstWide, "const-wide", F51l, None, WIDE;
    0x19 => ConstWideHigh16, "const-wide/high16", F21h, None, WIDE;
    0x1a => ConstString, "const-string", F21c, String, REG_THROWS;
    0x1b => ConstStringJumbo, "const-string/jumbo", F31c, String, REG_THROWS;
    0x1c => ConstClass, "const-class", F21c, Type, REG_THROWS;
    0x1d => MonitorEnter, "monitor-enter", F11x, None, THROWS;
    0x1e => MonitorExit, "monitor-exit", F11x, None, THROWS;
    0x1f => CheckCast, "check-cast", F21c, Type, REG_THROWS;
    0x20 => InstanceOf, "instance-of", F22c, Type, REG_THROWS;
    0x21 => ArrayLength, "array-length", F12x, None, REG_THROWS;
    0x22 => NewInstance, "new-instance", F21c, Type, REG_THROWS;
    0x23 => NewArray, "new-array", F22c, Type, REG_THROWS;
    0x24 => FilledNewArray, "filled-new-array", F35c, Type, RESULT;
    0x25 => FilledNewArrayRange, "filled-new-array/range", F3rc, Type, RESULT;
    0x26 => FillArrayData, "fill-array-data", F31t, None, THROWS;
    0x27 => Throw, "throw", F11x, None, THROW;
    0x28 => Goto, "goto", F10t, None, GOTO;
    0x29 => Goto16, "goto/16", F20t, None, GOTO;
    0x2a => Goto32, "goto/32", F30t, None, GOTO;
    0x2b => PackedSwitch, "packed-switch", F31t, None, SWITCH;
    0x2c => SparseSwitch, "sparse-switch", F31t, None, SWITCH;
    0x2d => CmplFloat, "cmpl-float", F23x, None, REG;
    0x2e => CmpgFloat, "cmpg-float", F23x, None, REG;
    0x2f => CmplDouble, "cmpl-double", F23x, None, REG;
    0x30 => CmpgDouble, "cmpg-double", F23x, None, REG;
    0x31 => CmpLong, "cmp-long", F23x, None, REG;
    0x32 => IfEq, "if-eq", F22t, None, BRANCH;
    0x33 => IfNe, "if-ne", F22t, None, BRANCH;
    0x34 => IfLt, "if-lt", F22t, None, BRANCH;
    0x35 => IfGe, "if-ge", F22t, None, BRANCH;
    0x36 => IfGt, "if-gt", F22t, None, BRANCH;
    0x37 => IfLe, "if-le", F22t, None, BRANCH;
    0x38 => IfEqz, "if-eqz", F21t, None, BRANCH;
    0x39 => IfNez, "if-nez", F21t, None, BRANCH;
    0x3a => IfLtz, "if-ltz", F21t, None, BRANCH;
    0x3b => IfGez, "if-gez", F21t, None, BRANCH;
    0x3c => IfGtz, "if-gtz", F21t, None, BRANCH;
    0x3d => IfLez, "if-lez", F21t, None, BRANCH;
    0x44 => Aget, "aget", F23x, None, REG_THROWS;
    0x45 => AgetWide, "aget-wide", F23x, None, WIDE_THROWS;
    0x46 => AgetObject, "aget-object", F23x, None, REG_THROWS;
    0x47 => AgetBoolean, "aget-boolean", F23x, None, REG_THROWS;
    0x48 => AgetByte, "aget-byte", F23x, None, REG_THROWS;
    0x49 => AgetChar, "aget-char", F23x, None, REG_THROWS;
    0x4a => AgetShort, "aget-short", F23x, None, REG_THROWS;
    0x4b => Aput, "aput", F23x, None, THROWS;
    0x4c => AputWide, "aput-wide", F23x, None, THROWS;
    0x4d => AputObject, "aput-object", F23x, None, THROWS;
    0x4e => AputBoolean, "aput-boolean", F23x, None, THROWS;
    0x4f => AputByte, "aput-byte", F23x, None, THROWS;
    0x50 => AputChar, "aput-char", F23x, None, THROWS;
    0x51 => AputShort, "aput-short", F23x, None, THROWS;
    0x52 => Iget, "iget", F22c, Field, REG_THROWS;
    0x53 => IgetWide, "iget-wide", F22c, Field, WIDE_THROWS;
    0x54 => IgetObject, "iget-object", F22c, Field, REG_THROWS;
    0x55 => IgetBoolean, "iget-boolean", F22c, Field, REG_THROWS;
    0x56 => IgetByte, "iget-byte", F22c, Field, REG_THROWS;
    0x57 => IgetChar, "iget-char", F22c, Field, REG_THROWS;
    0x58 => IgetShort, "iget-short", F22c, Field, REG_THROWS;
    0x59 => Iput, "iput", F22c, Field, THROWS;
    0x5a => IputWide, "iput-wide", F22c, Field, THROWS;
    0x5b => IputObject, "iput-object", F22c, Field, THROWS;
    0x5c => IputBoolean, "iput-boolean", F22c, Field, THROWS;
    0x5d => IputByte, "iput-byte", F22c, Field, THROWS;
    0x5e => IputChar, "iput-char", F22c, Field, THROWS;
    0x5f => IputShort, "iput-short", F22c, Field, THROWS;
    0x60 => Sget, "sget", F21c, Field, REG_THROWS;
    0x61 => SgetWide, "sget-wide", F21c, Field, WIDE_THROWS;
    0x62 => SgetObject, "sget-object", F21c, Field, REG_THROWS;
    0x63 => SgetBoolean, "sget-boolean", F21c, Field, REG_THROWS;
    0x64 => SgetByte, "sget-byte", F21c, Field, REG_THROWS;
    0x65 => SgetChar, "sget-char", F21c, Field, REG_THROWS;
    0x66 => SgetShort, "sget-short", F21c, Field, REG_THROWS;
    0x67 => Sput, "sput", F21c, Field, THROWS;
    0x68 => SputWide, "sput-wide", F21c, Field, THROWS;
    0x69 => SputObject, "sput-object", F21c, Field, THROWS;
    0x6a => SputBoolean, "sput-boolean", F21c, Field, THROWS;
    0x6b => SputByte, "sput-byte", F21c, Field, THROWS;
    0x6c => SputChar, "sput-char", F21c, Field, THROWS;
    0x6d => SputShort, "sput-short", F21c, Field, THROWS;
    0x6e => InvokeVirtual, "invoke-virtual", F35c, Method, INVOKE;
    0x6f => InvokeSuper, "invoke-super", F35c, Method, INVOKE;
    0x70 => InvokeDirect, "invoke-direct", F35c, Method, INVOKE;
    0x71 => InvokeStatic, "invoke-static", F35c, Method, INVOKE;
    0x72 => InvokeInterface, "invoke-interface", F35c, Method, INVOKE;
    0x74 => InvokeVirtualRange, "invoke-virtual/range", F3rc, Method, INVOKE;
    0x75 => InvokeSuperRange, "invoke-super/range", F3rc, Method, INVOKE;
    0x76 => InvokeDirectRange, "invoke-direct/range", F3rc, Method, INVOKE;
    0x77 => InvokeStaticRange, "invoke-static/range", F3rc, Method, INVOKE;
    0x78 => InvokeInterfaceRange, "invoke-interface/range", F3rc, Method, INVOKE;
    0x7b => NegInt, "neg-int", F12x, None, REG;
    0x7c => NotInt, "not-int", F12x, None, REG;
    0x7d => NegLong, "neg-long", F12x, None, WIDE;
    0x7e => NotLong, "not-long", F12x, None, WIDE;
    0x7f => NegFloat, "neg-float", F12x, None, REG;
    0x80 => NegDouble, "neg-double", F12x, None, WIDE;
    0x81 => IntToLong, "int-to-long", F12x, None, WIDE;
    0x82 => IntToFloat, "int-to-float", F12x, None, REG;
    0x83 => IntToDouble, "int-to-double", F12x, None, WIDE;
    0x84 => LongToInt, "long-to-int", F12x, None, REG;
    0x85 => LongToFloat, "long-to-float", F12x, None, REG;
    0x86 => LongToDouble, "long-to-double", F12x, None, WIDE;
    0x87 => FloatToInt, "float-to-int", F12x, None, REG;
    0x88 => FloatToLong, "float-to-long", F12x, None, WIDE;
    0x89 => FloatToDouble, "float-to-double", F12x, None, WIDE;
    0x8a => DoubleToInt, "double-to-int", F12x, None, REG;
    0x8b => DoubleToLong, "double-to-long", F12x, None, WIDE;
    0x8c => DoubleToFloat, "double-to-float", F12x, None, REG;
    0x8d => IntToByte, "int-to-byte", F12x, None, REG;
    0x8e => IntToChar, "int-to-char", F12x, None, REG;
    0x8f => IntToShort, "int-to-short", F12x, None, REG;
    0x90 => AddInt, "add-int", F23x, None, REG;
    0x91 => SubInt, "sub-int", F23x, None, REG;
    0x92 => MulInt, "mul-int", F23x, None, REG;
    0x93 => DivInt, "div-int", F23x, None, REG_THROWS;
    0x94 => RemInt, "rem-int", F23x, None, REG_THROWS;
    0x95 => AndInt, "and-int", F23x, None, REG;
    0x96 => OrInt, "or-int", F23x, None, REG;
    0x97 => XorInt, "xor-int", F23x, None, REG;
    0x98 => ShlInt, "shl-int", F23x, None, REG;
    0x99 => ShrInt, "shr-int", F23x, None, REG;
    0x9a => UshrInt, "ushr-int", F23x, None, REG;
    0x9b => AddLong, "add-long", F23x, None, WIDE;
    0x9c => SubLong, "sub-long", F23x, None, WIDE;
    0x9d => MulLong, "mul-long", F23x, None, WIDE;
    0x9e => DivLong, "div-long", F23x, None, WIDE_THROWS;
    0x9f => RemLong, "rem-long", F23x, None, WIDE_THROWS;
    0xa0 => AndLong, "and-long", F23x, None, WIDE;
    0xa1 => OrLong, "or-long", F23x, None, WIDE;
    0xa2 => XorLong, "xor-long", F23x, None, WIDE;
    0xa3 => ShlLong, "shl-long", F23x, None, WIDE;
    0xa4 => ShrLong, "shr-long", F23x, None, WIDE;
    0xa5 => UshrLong, "ushr-long", F23x, None, WIDE;
    0xa6 => AddFloat, "add-float", F23x, None, REG;
    0xa7 => SubFloat, "sub-float", F23x, None, REG;
    0xa8 => MulFloat, "mul-float", F23x, None, REG;
    0xa9 => DivFloat, "div-float", F23x, None, REG;
    0xaa => RemFloat, "rem-float", F23x, None, REG;
    0xab => AddDouble, "add-double", F23x, None, WIDE;
    0xac => SubDouble, "sub-double", F23x, None, WIDE;
    0xad => MulDouble, "mul-double", F23x, None, WIDE;
    0xae => DivDouble, "div-double", F23x, None, WIDE;
    0xaf => RemDouble, "rem-double", F23x, None, WIDE;
    0xb0 => AddInt2addr, "add-int/2addr", F12x, None, REG;
    0xb1 => SubInt2addr, "sub-int/2addr", F12x, None, REG;
    0xb2 => MulInt2addr, "mul-int/2addr", F12x, None, REG;
    0xb3 => DivInt2addr, "div-int/2addr", F12x, None, REG_THROWS;
    0xb4 => RemInt2addr, "rem-int/2addr", F12x, None, REG_THROWS;
    0xb5 => AndInt2addr, "and-int/2addr", F12x, None, REG;
    0xb6 => OrInt2addr, "or-int/2addr", F12x, None, REG;
    0xb7 => XorInt2addr, "xor-int/2addr", F12x, None, REG;
    0xb8 => ShlInt2addr, "shl-int/2addr", F12x, None, REG;
    0xb9 => ShrInt2addr, "shr-int/2addr", F12x, None, REG;
    0xba => UshrInt2addr, "ushr-int/2addr", F12x, None, REG;
    0xbb => AddLong2addr, "add-long/2addr", F12x, None, WIDE;
    0xbc => SubLong2addr, "sub-long/2addr", F12x, None, WIDE;
    0xbd => MulLong2addr, "mul-long/2addr", F12x, None, WIDE;
    0xbe => DivLong2addr, "div-long/2addr", F12x, None, WIDE_THROWS;
    0xbf => RemLong2addr, "rem-long/2addr", F12x, None, WIDE_THROWS;
    0xc0 => AndLong2addr, "and-long/2addr", F12x, None, WIDE;
    0xc1 => OrLong2addr, "or-long/2addr", F12x, None, WIDE;
    0xc2 => XorLong2addr, "xor-long/2addr", F12x, None, WIDE;
    0xc3 => ShlLong2addr, "shl-long/2addr", F12x, None, WIDE;
    0xc4 => ShrLong2addr, "shr-long/2addr", F12x, None, WIDE;
    0xc5 => UshrLong2addr, "ushr-long/2addr", F12x, None, WIDE;
    0xc6 => AddFloat2addr, "add-float/2addr", F12x, None, REG;
    0xc7 => SubFloat2addr, "sub-float/2addr", F12x, None, REG;
    0xc8 => MulFloat2addr, "mul-float/2addr", F12x, None, REG;
    0xc9 => DivFloat2addr, "div-float/2addr", F12x, None, REG;
    0xca => RemFloat2addr, "rem-float/2addr", F12x, None, REG;
    0xcb => AddDouble2addr, "add-double/2addr", F12x, None, WIDE;
    0xcc => SubDouble2addr, "sub-double/2addr", F12x, None, WIDE;
    0xcd => MulDouble2addr, "mul-double/2addr", F12x, None, WIDE;
    0xce => DivDouble2addr, "div-double/2addr", F12x, None, WIDE;
    0xcf => RemDouble2addr, "rem-double/2addr", F12x, None, WIDE;
    0xd0 => AddIntLit16, "add-int/lit16", F22s, None, REG;
    0xd1 => RsubInt, "rsub-int", F22s, None, REG;
    0xd2 => MulIntLit16, "mul-int/lit16", F22s, None, REG;
    0xd3 => DivIntLit16, "div-int/lit16", F22s, None, REG_THROWS;
    0xd4 => RemIntLit16, "rem-int/lit16", F22s, None, REG_THROWS;
    0xd5 => AndIntLit16, "and-int/lit16", F22s, None, REG;
    0xd6 => OrIntLit16, "or-int/lit16", F22s, None, REG;
    0xd7 => XorIntLit16, "xor-int/lit16", F22s, None, REG;
    0xd8 => AddIntLit8, "add-int/lit8", F22b, None, REG;
    0xd9 => RsubIntLit8, "rsub-int/lit8", F22b, None, REG;
    0xda => MulIntLit8, "mul-int/lit8", F22b, None, REG;
    0xdb => DivIntLit8, "div-int/lit8", F22b, None, REG_THROWS;
    0xdc => RemIntLit8, "rem-int/lit8", F22b, None, REG_THROWS;
    0xdd => AndIntLit8, "and-int/lit8", F22b, None, REG;
    0xde => OrIntLit8, "or-int/lit8", F22b, None, REG;
    0xdf => XorIntLit8, "xor-int/lit8", F22b, None, REG;
    0xe0 => ShlIntLit8, "shl-int/lit8", F22b, None, REG;
    0xe1 => ShrIntLit8, "shr-int/lit8", F22b, None, REG;
    0xe2 => UshrIntLit8, "ushr-int/lit8", F22b, None, REG;
    0xfa => InvokePolymorphic, "invoke-polymorphic", F45cc, Method, INVOKE;
    0xfb => InvokePolymorphicRange, "invoke-polymorphic/range", F4rcc, Method, INVOKE;
    0xfc => InvokeCustom, "invoke-custom", F35c, CallSite, INVOKE;
    0xfd => InvokeCustomRange, "invoke-custom/range", F3rc, CallSite, INVOKE;
    0xfe => ConstMethodHandle, "const-method-handle", F21c, MethodHandle, REG_THROWS;
    0xff => ConstMethodType, "const-method-type", F21c, MethodProto, REG_THROWS;
    0x0100 => PackedSwitchPayload, "packed-switch-payload", Payload, None, PAYLOAD;
    0x0200 => SparseSwitchPayload, "sparse-switch-payload", Payload, None, PAYLOAD;
    0x0300 => ArrayPayload, "array-payload", Payload, None, PAYLOAD;
}

/// All opcodes, in ascending identifier order.
pub fn opcode_table() -> &'static [Opcode] {
    OPCODE_TABLE
}

/// Number of entries in [`opcode_table`].
pub fn opcode_count() -> usize {
    OPCODE_TABLE.len()
}

impl Opcode {
    /// Look up a real (non-payload) opcode by its first code-unit byte.
    pub const fn from_raw(raw: u8) -> Option<Self> {
        Self::from_u16(raw as u16)
    }

    /// Look up an opcode by its smali mnemonic.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        OPCODE_TABLE
            .iter()
            .copied()
            .find(|op| op.mnemonic() == mnemonic)
    }

    /// The opcode byte, or the 16-bit payload identifier.
    #[inline]
    pub const fn raw(self) -> u16 {
        self as u16
    }

    #[inline]
    pub const fn has_flag(self, flag: OpcodeFlags) -> bool {
        self.flags().contains(flag)
    }

    pub const fn is_payload(self) -> bool {
        self.has_flag(OpcodeFlags::PAYLOAD)
    }

    pub const fn is_invoke(self) -> bool {
        self.has_flag(OpcodeFlags::INVOKE)
    }

    /// Register-range encoding (`3rc` / `4rcc`).
    pub const fn is_range(self) -> bool {
        matches!(self.format(), Format::F3rc | Format::F4rcc)
    }

    pub const fn is_return(self) -> bool {
        self.has_flag(OpcodeFlags::RETURN)
    }

    pub const fn is_throw(self) -> bool {
        self.has_flag(OpcodeFlags::THROW)
    }

    /// `return*` or `throw`: control leaves the method.
    pub const fn is_method_exit(self) -> bool {
        self.is_return() || self.is_throw()
    }

    pub const fn is_jump(self) -> bool {
        self.has_flag(OpcodeFlags::JUMP)
    }

    /// `if-*`, `packed-switch` and `sparse-switch`.
    pub const fn is_conditional_branch(self) -> bool {
        self.has_flag(OpcodeFlags::CONDITIONAL)
    }

    /// `goto`, `goto/16` and `goto/32`.
    pub const fn is_unconditional_jump(self) -> bool {
        self.is_jump() && !self.is_conditional_branch()
    }

    pub const fn sets_result(self) -> bool {
        self.has_flag(OpcodeFlags::SETS_RESULT)
    }

    /// `move-result` and `move-result-object`: single-register captures of
    /// the pending invocation result.
    pub const fn captures_result(self) -> bool {
        matches!(self, Opcode::MoveResult | Opcode::MoveResultObject)
    }

    /// `move-result-wide`: a register-pair capture.
    pub const fn captures_wide_result(self) -> bool {
        matches!(self, Opcode::MoveResultWide)
    }

    /// Number of code units, or `None` for payloads.
    pub const fn code_units(self) -> Option<usize> {
        self.format().code_units()
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl fmt::Debug for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opcode({})", self.mnemonic())
    }
}
