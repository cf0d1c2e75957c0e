use serde::Serialize;

use crate::codec::{IFields, JFields, RFields};
use crate::instructions::Format;

/// Raw fields of a word, split per its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Fields {
    R(RFields),
    I(IFields),
    J(JFields),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decoded {
    pub mnemonic: &'static str,
    pub format: Format,
    pub fields: Fields,
}

pub trait Decoder {
    fn decode(&self, word: u32) -> Option<Decoded>;
}
