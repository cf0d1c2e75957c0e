//! Reverse translation: encoded words back to assembly text.
//!
//! Branch and jump targets are rendered as the raw numeric fields; label
//! names are never reconstructed.

use serde::Serialize;
use tracing::{debug, trace};

use crate::codec::{self, IFields, JFields, RFields};
use crate::decoder::{Decoded, Decoder, Fields};
use crate::error::{Error, Result};
use crate::instructions::Format;
use crate::isa::mips29::Mips29Decoder;
use crate::mif;

pub fn fmt_decoded(d: &Decoded) -> String {
    match d.fields {
        Fields::R(f) => fmt_r(d.mnemonic, d.format, &f),
        Fields::I(f) => fmt_i(d.mnemonic, d.format, &f),
        Fields::J(f) => fmt_j(d.mnemonic, &f),
    }
}

fn fmt_r(mn: &str, format: Format, f: &RFields) -> String {
    match format {
        Format::JumpRegister => format!("{mn} ${}", f.src),
        Format::Shift => format!("{mn} ${}, ${}, {}", f.dest, f.temp, f.shift),
        _ => format!("{mn} ${}, ${}, ${}", f.dest, f.src, f.temp),
    }
}

fn fmt_i(mn: &str, format: Format, f: &IFields) -> String {
    match format {
        Format::Branch => format!("{mn} ${}, ${}, {}", f.src, f.temp, hex16(f.immediate)),
        Format::LoadStore => {
            let off = codec::to_signed(f.immediate as u32, codec::IMM_WIDTH);
            format!("{mn} ${}, {off}(${})", f.temp, f.src)
        }
        Format::LoadUpperImmediate => format!("{mn} ${}, {}", f.temp, hex16(f.immediate)),
        _ => format!("{mn} ${}, ${}, {}", f.temp, f.src, hex16(f.immediate)),
    }
}

fn fmt_j(mn: &str, f: &JFields) -> String {
    format!("{mn} 0x{:07X}", f.address)
}

fn hex16(v: u16) -> String {
    format!("0x{v:04X}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub slot: u32,
    pub word: u32,
    pub text: String,
}

/// Decodes every word in order, stopping at the first one that matches no
/// instruction.
pub fn disassemble_words<D: Decoder>(dec: &D, words: &[(u32, u32)]) -> Result<Vec<Line>> {
    let mut out = Vec::with_capacity(words.len());
    for &(slot, word) in words {
        let d = dec.decode(word).ok_or(Error::UnknownOpcode {
            slot,
            opcode: codec::opcode(word),
            function: codec::function(word),
        })?;
        let text = fmt_decoded(&d);
        trace!(slot, "{word:08X} -> {text}");
        out.push(Line { slot, word, text });
    }
    debug!(words = out.len(), "disassembly complete");
    Ok(out)
}

/// Disassembles the content lines of a memory-initialization file.
pub fn disassemble_text(text: &str) -> Result<Vec<Line>> {
    let words = mif::read_words(text);
    disassemble_words(&Mips29Decoder::new(), &words)
}
