//! Two-pass assembler.
//!
//! Pass 1 walks the source once, binds every label to the slot of the
//! instruction that follows it and checks that each instruction line starts
//! with a known mnemonic. Nothing is encoded unless pass 1 succeeds. Pass 2
//! encodes the collected statements in order, resolving label operands
//! against the table built by pass 1.
//!
//! Slots are 1-based and count instruction lines only; blank lines, comment
//! lines and label-only lines do not take a slot.

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::codec::{self, IFields, JFields, RFields};
use crate::config::{Config, RegisterPolicy};
use crate::error::{Error, FieldError, Result};
use crate::instructions::{self, Format, InstrDesc};
use crate::symbol::SymbolTable;

/// One encoded instruction together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub slot: u32,
    pub word: u32,
    pub line: usize,
    pub source: String,
}

#[derive(Debug)]
pub struct Program {
    pub listing: Vec<Listing>,
    pub symbols: SymbolTable,
}

impl Program {
    pub fn words(&self) -> Vec<u32> {
        self.listing.iter().map(|l| l.word).collect()
    }
}

/// An instruction line found by pass 1.
#[derive(Debug)]
struct Stmt<'a> {
    line: usize,
    slot: u32,
    desc: &'static InstrDesc,
    operands: &'a str,
    text: &'a str,
}

/// Assembles `source` into an ordered word sequence.
pub fn assemble(source: &str, cfg: &Config) -> Result<Program> {
    let mut asm = Assembler::new(cfg);
    let stmts = asm.collect(source)?;
    let listing = asm.encode_all(&stmts)?;
    Ok(Program { listing, symbols: asm.symbols })
}

/// State for a single run; never reused across inputs.
struct Assembler<'c> {
    cfg: &'c Config,
    symbols: SymbolTable,
    slot: u32,
}

impl<'c> Assembler<'c> {
    fn new(cfg: &'c Config) -> Self {
        Self {
            cfg,
            symbols: SymbolTable::new(),
            slot: 1,
        }
    }

    fn collect<'a>(&mut self, source: &'a str) -> Result<Vec<Stmt<'a>>> {
        let mut stmts = Vec::new();
        for (idx, raw) in source.lines().enumerate() {
            let line = idx + 1;
            let text = match raw.split_once(self.cfg.comment) {
                Some((code, _)) => code.trim(),
                None => raw.trim(),
            };
            if text.is_empty() {
                continue;
            }

            let body = match text.split_once(':') {
                Some((label, rest)) => {
                    let label = label.trim();
                    if !is_label(label) {
                        return Err(Error::operand(line, format!("invalid label \"{label}\"")));
                    }
                    self.symbols.declare(label, self.slot, line)?;
                    trace!(line, slot = self.slot, label, "label");
                    rest.trim()
                }
                None => text,
            };
            if body.is_empty() {
                continue;
            }

            let (mnemonic, operands) = match body.split_once(char::is_whitespace) {
                Some((m, rest)) => (m, rest.trim()),
                None => (body, ""),
            };
            let desc = instructions::by_mnemonic(mnemonic).ok_or_else(|| {
                Error::UnknownInstruction { line, mnemonic: mnemonic.to_ascii_lowercase() }
            })?;
            stmts.push(Stmt { line, slot: self.slot, desc, operands, text });
            self.slot += 1;
        }
        debug!(instructions = stmts.len(), labels = self.symbols.len(), "pass 1 complete");
        Ok(stmts)
    }

    fn encode_all(&self, stmts: &[Stmt<'_>]) -> Result<Vec<Listing>> {
        let mut listing = Vec::with_capacity(stmts.len());
        for st in stmts {
            let word = self.encode(st)?;
            trace!(line = st.line, slot = st.slot, "{word:08X}  {}", st.text);
            listing.push(Listing {
                slot: st.slot,
                word,
                line: st.line,
                source: st.text.to_string(),
            });
        }
        debug!(words = listing.len(), "pass 2 complete");
        Ok(listing)
    }

    fn encode(&self, st: &Stmt<'_>) -> Result<u32> {
        let line = st.line;
        let desc = st.desc;
        let ops = operands(st.operands);
        let field = |source: FieldError| Error::Field { line, source };

        let want = match desc.format {
            Format::RegisterRegister | Format::RegisterImmediate | Format::Branch | Format::Shift => 3,
            Format::LoadStore | Format::LoadUpperImmediate => 2,
            Format::Jump | Format::JumpRegister => 1,
        };
        if ops.len() != want {
            return Err(Error::operand(
                line,
                format!("{} expects {want} operands, found {}", desc.mnemonic, ops.len()),
            ));
        }
        let function = desc.function.unwrap_or(0);

        match desc.format {
            Format::RegisterRegister => {
                let f = RFields {
                    opcode: desc.opcode,
                    dest: self.register(ops[0], line)?,
                    src: self.register(ops[1], line)?,
                    temp: self.register(ops[2], line)?,
                    shift: 0,
                    function,
                };
                codec::encode_r(&f).map_err(field)
            }
            Format::JumpRegister => {
                let f = RFields {
                    opcode: desc.opcode,
                    src: self.register(ops[0], line)?,
                    function,
                    ..RFields::default()
                };
                codec::encode_r(&f).map_err(field)
            }
            Format::Shift => {
                let amount = number(ops[2], line)?;
                let shift = u8::try_from(amount)
                    .ok()
                    .filter(|s| *s < 32)
                    .ok_or(Error::Field {
                        line,
                        source: FieldError { field: "shift", value: amount, width: 5 },
                    })?;
                let f = RFields {
                    opcode: desc.opcode,
                    src: 0,
                    temp: self.register(ops[1], line)?,
                    dest: self.register(ops[0], line)?,
                    shift,
                    function,
                };
                codec::encode_r(&f).map_err(field)
            }
            Format::RegisterImmediate => {
                let imm = number(ops[2], line)?;
                self.encode_i(desc, ops[1], ops[0], imm, line)
            }
            Format::LoadUpperImmediate => {
                let imm = number(ops[1], line)?;
                self.encode_i(desc, "0", ops[0], imm, line)
            }
            Format::LoadStore => {
                let (offset, base) = memory_operand(ops[1], line)?;
                self.encode_i(desc, base, ops[0], offset, line)
            }
            Format::Branch => {
                let disp = match parse_number(ops[2]) {
                    // Hex is taken as the raw field pattern; decimal must be a signed displacement.
                    Some(n) if !is_hex(ops[2]) && !(-0x8000..=0x7FFF).contains(&n) => {
                        return Err(Error::Field {
                            line,
                            source: FieldError { field: "displacement", value: n, width: codec::IMM_WIDTH },
                        });
                    }
                    Some(n) => n,
                    None => {
                        let target = self.symbols.resolve(ops[2], line)?;
                        target as i64 - (st.slot as i64 + 1)
                    }
                };
                self.encode_i(desc, ops[0], ops[1], disp, line)
            }
            Format::Jump => {
                let addr = match parse_number(ops[0]) {
                    Some(n) => n,
                    None => {
                        let target = self.symbols.resolve(ops[0], line)?;
                        self.cfg.base_address as i64 + (target as i64 - 1)
                    }
                };
                let f = JFields {
                    opcode: desc.opcode,
                    address: codec::to_field("address", addr, codec::ADDR_WIDTH).map_err(field)?,
                };
                codec::encode_j(&f).map_err(field)
            }
        }
    }

    fn encode_i(&self, desc: &InstrDesc, src: &str, temp: &str, imm: i64, line: usize) -> Result<u32> {
        let field = |source: FieldError| Error::Field { line, source };
        let f = IFields {
            opcode: desc.opcode,
            src: self.register(src, line)?,
            temp: self.register(temp, line)?,
            immediate: codec::to_field("immediate", imm, codec::IMM_WIDTH).map_err(field)? as u16,
        };
        codec::encode_i(&f).map_err(field)
    }

    fn register(&self, tok: &str, line: usize) -> Result<u8> {
        let name = tok.strip_prefix('$').unwrap_or(tok);
        let numeric = !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit());
        match instructions::register_index(name) {
            Some(r) => Ok(r),
            None if !numeric && self.cfg.registers == RegisterPolicy::Lenient => {
                warn!(line, register = tok, "unknown register, using $zero");
                Ok(0)
            }
            None => Err(Error::UnknownRegister { line, name: tok.to_string() }),
        }
    }
}

fn is_label(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with(|c: char| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Splits on commas and whitespace outside parentheses, so both
/// `add $1, $2, $3` and `add $1 $2 $3` give three operands.
fn operands(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if depth == 0 && (c == ',' || c.is_whitespace()) => {
                if start < i {
                    out.push(&s[start..i]);
                }
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if start < s.len() {
        out.push(&s[start..]);
    }
    out
}

fn is_hex(tok: &str) -> bool {
    let digits = tok.trim_start_matches(['-', '+']);
    digits.starts_with("0x") || digits.starts_with("0X")
}

/// Decimal or `0x` hexadecimal, with an optional leading sign.
fn parse_number(tok: &str) -> Option<i64> {
    let (neg, digits) = match tok.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, tok.strip_prefix('+').unwrap_or(tok)),
    };
    let value = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
            i64::from_str_radix(hex, 16).ok()?
        }
        Some(_) => return None,
        None if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => digits.parse().ok()?,
        None => return None,
    };
    Some(if neg { -value } else { value })
}

fn number(tok: &str, line: usize) -> Result<i64> {
    parse_number(tok).ok_or_else(|| Error::operand(line, format!("invalid number \"{tok}\"")))
}

/// Splits `offset(reg)`; an empty offset means 0.
fn memory_operand(tok: &str, line: usize) -> Result<(i64, &str)> {
    let bad = || Error::operand(line, format!("expected offset(register), found \"{tok}\""));
    let (offset, rest) = tok.split_once('(').ok_or_else(bad)?;
    let base = rest.strip_suffix(')').ok_or_else(bad)?.trim();
    let offset = offset.trim();
    let offset = if offset.is_empty() { 0 } else { number(offset, line)? };
    Ok((offset, base))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers() {
        assert_eq!(parse_number("10"), Some(10));
        assert_eq!(parse_number("-4"), Some(-4));
        assert_eq!(parse_number("0x1F"), Some(0x1F));
        assert_eq!(parse_number("0XfF"), Some(0xFF));
        assert_eq!(parse_number("-0x10"), Some(-16));
        assert_eq!(parse_number("0x"), None);
        assert_eq!(parse_number("loop"), None);
        assert_eq!(parse_number("1a"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("0x-5"), None);
        assert_eq!(parse_number("-0x-5"), None);
        assert_eq!(parse_number("0x+5"), None);
    }

    #[test]
    fn operand_splitting() {
        assert_eq!(operands(""), Vec::<&str>::new());
        assert_eq!(operands("$1, $2, $3"), ["$1", "$2", "$3"]);
        assert_eq!(operands("$1 $2 $3"), ["$1", "$2", "$3"]);
        assert_eq!(operands("$1,$2 , $3"), ["$1", "$2", "$3"]);
        assert_eq!(operands("$t0, -0x8( $sp )"), ["$t0", "-0x8( $sp )"]);
        assert!(is_hex("-0x10"));
        assert!(!is_hex("16"));
    }

    #[test]
    fn memory_operands() {
        assert_eq!(memory_operand("4($sp)", 1).unwrap(), (4, "$sp"));
        assert_eq!(memory_operand("-0x8( $t0 )", 1).unwrap(), (-8, "$t0"));
        assert_eq!(memory_operand("($a0)", 1).unwrap(), (0, "$a0"));
        assert!(memory_operand("4$sp", 1).is_err());
        assert!(memory_operand("4($sp", 1).is_err());
    }

    #[test]
    fn labels() {
        assert!(is_label("loop"));
        assert!(is_label("end_2"));
        assert!(!is_label(""));
        assert!(!is_label("2nd"));
        assert!(!is_label("a b"));
    }
}
