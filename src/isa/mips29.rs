use crate::codec;
use crate::decoder::{Decoded, Decoder, Fields};
use crate::instructions::{self, Shape};

/// Decoder for the 29-instruction subset.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mips29Decoder;

impl Mips29Decoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for Mips29Decoder {
    fn decode(&self, word: u32) -> Option<Decoded> {
        let desc = instructions::by_encoding(codec::opcode(word), codec::function(word))?;
        let fields = match desc.format.shape() {
            Shape::R => Fields::R(codec::decode_r(word)),
            Shape::I => Fields::I(codec::decode_i(word)),
            Shape::J => Fields::J(codec::decode_j(word)),
        };
        Some(Decoded {
            mnemonic: desc.mnemonic,
            format: desc.format,
            fields,
        })
    }
}
