use serde::Serialize;

/// Operand syntax of an instruction. Each variant selects one encoder in
/// the assembler and one renderer in the disassembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Format {
    /// `op rd, rs, rt`
    RegisterRegister,
    /// `op rt, rs, imm`
    RegisterImmediate,
    /// `op target`, absolute
    Jump,
    /// `op rs`
    JumpRegister,
    /// `op rt, offset(rs)`
    LoadStore,
    /// `op rd, rt, shamt`
    Shift,
    /// `op rt, imm`
    LoadUpperImmediate,
    /// `op rs, rt, target`, PC-relative
    Branch,
}

/// Bit layout of the encoded word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Shape {
    R,
    I,
    J,
}

impl Format {
    pub fn shape(self) -> Shape {
        match self {
            Format::RegisterRegister | Format::JumpRegister | Format::Shift => Shape::R,
            Format::RegisterImmediate
            | Format::LoadStore
            | Format::LoadUpperImmediate
            | Format::Branch => Shape::I,
            Format::Jump => Shape::J,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrDesc {
    pub mnemonic: &'static str,
    pub opcode: u8,
    /// Present exactly when `opcode` is 0.
    pub function: Option<u8>,
    pub format: Format,
}

const fn r(mnemonic: &'static str, function: u8, format: Format) -> InstrDesc {
    InstrDesc { mnemonic, opcode: 0, function: Some(function), format }
}

const fn op(mnemonic: &'static str, opcode: u8, format: Format) -> InstrDesc {
    InstrDesc { mnemonic, opcode, function: None, format }
}

use Format::*;

pub const TABLE: &[InstrDesc] = &[
    r("add", 0x20, RegisterRegister),
    op("addi", 0x08, RegisterImmediate),
    op("addiu", 0x09, RegisterImmediate),
    r("addu", 0x21, RegisterRegister),
    r("and", 0x24, RegisterRegister),
    op("andi", 0x0C, RegisterImmediate),
    op("beq", 0x04, Branch),
    op("bne", 0x05, Branch),
    op("j", 0x02, Jump),
    op("jal", 0x03, Jump),
    r("jr", 0x08, JumpRegister),
    op("lbu", 0x24, LoadStore),
    op("lhu", 0x25, LoadStore),
    op("lui", 0x0F, LoadUpperImmediate),
    op("lw", 0x23, LoadStore),
    r("nor", 0x27, RegisterRegister),
    r("or", 0x25, RegisterRegister),
    op("ori", 0x0D, RegisterImmediate),
    r("slt", 0x2A, RegisterRegister),
    op("slti", 0x0A, RegisterImmediate),
    op("sltiu", 0x0B, RegisterImmediate),
    r("sltu", 0x2B, RegisterRegister),
    r("sll", 0x00, Shift),
    r("srl", 0x02, Shift),
    op("sb", 0x28, LoadStore),
    op("sh", 0x29, LoadStore),
    op("sw", 0x2B, LoadStore),
    r("sub", 0x22, RegisterRegister),
    r("subu", 0x23, RegisterRegister),
];

/// Register aliases; the position is the register number.
pub const REGISTERS: [&str; 32] = [
    "zero", "at", "v0", "v1", "a0", "a1", "a2", "a3", //
    "t0", "t1", "t2", "t3", "t4", "t5", "t6", "t7", //
    "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", //
    "t8", "t9", "k0", "k1", "gp", "sp", "fp", "ra",
];

/// Case-insensitive mnemonic lookup.
pub fn by_mnemonic(name: &str) -> Option<&'static InstrDesc> {
    TABLE.iter().find(|d| d.mnemonic.eq_ignore_ascii_case(name))
}

/// Opcode 0 is shared by every R-shape instruction, so the function code
/// alone picks the mnemonic there.
pub fn by_encoding(opcode: u8, function: u8) -> Option<&'static InstrDesc> {
    if opcode == 0 {
        TABLE.iter().find(|d| d.function == Some(function))
    } else {
        TABLE.iter().find(|d| d.opcode == opcode && d.function.is_none())
    }
}

/// Resolves `zero`..`ra` (case-insensitive) or a decimal index 0..=31.
pub fn register_index(name: &str) -> Option<u8> {
    if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
        return name.parse::<u8>().ok().filter(|&n| n < 32);
    }
    REGISTERS
        .iter()
        .position(|r| r.eq_ignore_ascii_case(name))
        .map(|i| i as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_has_29_unique_encodings() {
        assert_eq!(TABLE.len(), 29);
        let keys: HashSet<(u8, Option<u8>)> =
            TABLE.iter().map(|d| (d.opcode, d.function)).collect();
        assert_eq!(keys.len(), TABLE.len());
        for d in TABLE {
            assert_eq!(d.opcode == 0, d.function.is_some(), "{}", d.mnemonic);
            assert_eq!(by_encoding(d.opcode, d.function.unwrap_or(0)), Some(d));
        }
    }

    #[test]
    fn opcode_zero_needs_function() {
        assert_eq!(by_encoding(0, 0x20).unwrap().mnemonic, "add");
        assert_eq!(by_encoding(0, 0x00).unwrap().mnemonic, "sll");
        assert!(by_encoding(0, 0x3F).is_none());
        assert!(by_encoding(0x3F, 0).is_none());
    }

    #[test]
    fn registers_resolve_by_alias_or_number() {
        assert_eq!(register_index("zero"), Some(0));
        assert_eq!(register_index("T0"), Some(8));
        assert_eq!(register_index("ra"), Some(31));
        assert_eq!(register_index("17"), Some(17));
        assert_eq!(register_index("32"), None);
        assert_eq!(register_index("x9"), None);
        assert_eq!(register_index(""), None);
    }

    #[test]
    fn mnemonics_are_case_insensitive() {
        assert_eq!(by_mnemonic("ADDIU").unwrap().opcode, 0x09);
        assert!(by_mnemonic("foo").is_none());
    }
}
