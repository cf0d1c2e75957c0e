//! Bit-field packing for the three instruction shapes.
//!
//! Bit 0 is the most significant bit of the word, so the opcode lives in
//! bits 0..6 and the function code in bits 26..32.
//!
//! ```text
//! R: opcode(6) src(5) temp(5) dest(5) shift(5) function(6)
//! I: opcode(6) src(5) temp(5) immediate(16)
//! J: opcode(6) address(26)
//! ```

use bitvec::prelude::*;
use serde::Serialize;
use std::ops::Range;

use crate::error::FieldError;

pub const OPCODE: Range<usize> = 0..6;
pub const SRC: Range<usize> = 6..11;
pub const TEMP: Range<usize> = 11..16;
pub const DEST: Range<usize> = 16..21;
pub const SHIFT: Range<usize> = 21..26;
pub const FUNCTION: Range<usize> = 26..32;
pub const IMMEDIATE: Range<usize> = 16..32;
pub const ADDRESS: Range<usize> = 6..32;

pub const IMM_WIDTH: u32 = 16;
pub const ADDR_WIDTH: u32 = 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RFields {
    pub opcode: u8,
    pub src: u8,
    pub temp: u8,
    pub dest: u8,
    pub shift: u8,
    pub function: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IFields {
    pub opcode: u8,
    pub src: u8,
    pub temp: u8,
    /// Raw 16-bit field; see [`to_signed`] for the two's-complement view.
    pub immediate: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct JFields {
    pub opcode: u8,
    /// Raw 26-bit field.
    pub address: u32,
}

/// Converts a signed value to its `width`-bit two's-complement pattern.
///
/// Accepts `-2^(width-1) ..= 2^width - 1`: negative values wrap, positive
/// values up to the unsigned maximum pass through unchanged.
pub fn to_field(field: &'static str, value: i64, width: u32) -> Result<u32, FieldError> {
    let min = -(1i64 << (width - 1));
    let max = (1i64 << width) - 1;
    if value < min || value > max {
        return Err(FieldError { field, value, width });
    }
    let raw = if value < 0 { (1i64 << width) + value } else { value };
    Ok(raw as u32)
}

/// Sign-extends a `width`-bit two's-complement pattern.
pub fn to_signed(raw: u32, width: u32) -> i64 {
    let raw = raw as i64 & ((1i64 << width) - 1);
    if raw & (1i64 << (width - 1)) != 0 {
        raw - (1i64 << width)
    } else {
        raw
    }
}

fn check(field: &'static str, value: u32, width: usize) -> Result<(), FieldError> {
    if value >> width != 0 {
        return Err(FieldError { field, value: value as i64, width: width as u32 });
    }
    Ok(())
}

fn put(word: &mut u32, range: Range<usize>, field: &'static str, value: u32) -> Result<(), FieldError> {
    check(field, value, range.len())?;
    word.view_bits_mut::<Msb0>()[range].store_be(value);
    Ok(())
}

fn get(word: u32, range: Range<usize>) -> u32 {
    word.view_bits::<Msb0>()[range].load_be::<u32>()
}

pub fn opcode(word: u32) -> u8 {
    get(word, OPCODE) as u8
}

pub fn function(word: u32) -> u8 {
    get(word, FUNCTION) as u8
}

pub fn encode_r(f: &RFields) -> Result<u32, FieldError> {
    let mut word = 0u32;
    put(&mut word, OPCODE, "opcode", f.opcode as u32)?;
    put(&mut word, SRC, "src", f.src as u32)?;
    put(&mut word, TEMP, "temp", f.temp as u32)?;
    put(&mut word, DEST, "dest", f.dest as u32)?;
    put(&mut word, SHIFT, "shift", f.shift as u32)?;
    put(&mut word, FUNCTION, "function", f.function as u32)?;
    Ok(word)
}

pub fn encode_i(f: &IFields) -> Result<u32, FieldError> {
    let mut word = 0u32;
    put(&mut word, OPCODE, "opcode", f.opcode as u32)?;
    put(&mut word, SRC, "src", f.src as u32)?;
    put(&mut word, TEMP, "temp", f.temp as u32)?;
    put(&mut word, IMMEDIATE, "immediate", f.immediate as u32)?;
    Ok(word)
}

pub fn encode_j(f: &JFields) -> Result<u32, FieldError> {
    let mut word = 0u32;
    put(&mut word, OPCODE, "opcode", f.opcode as u32)?;
    put(&mut word, ADDRESS, "address", f.address)?;
    Ok(word)
}

pub fn decode_r(word: u32) -> RFields {
    RFields {
        opcode: get(word, OPCODE) as u8,
        src: get(word, SRC) as u8,
        temp: get(word, TEMP) as u8,
        dest: get(word, DEST) as u8,
        shift: get(word, SHIFT) as u8,
        function: get(word, FUNCTION) as u8,
    }
}

pub fn decode_i(word: u32) -> IFields {
    IFields {
        opcode: get(word, OPCODE) as u8,
        src: get(word, SRC) as u8,
        temp: get(word, TEMP) as u8,
        immediate: get(word, IMMEDIATE) as u16,
    }
}

pub fn decode_j(word: u32) -> JFields {
    JFields {
        opcode: get(word, OPCODE) as u8,
        address: get(word, ADDRESS),
    }
}
