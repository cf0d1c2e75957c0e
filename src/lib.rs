pub mod asm;
pub mod codec;
pub mod config;
pub mod decoder;
pub mod disasm;
pub mod error;
pub mod instructions;
pub mod mif;
pub mod symbol;

pub mod isa {
    pub mod mips29; // the 29-instruction teaching subset
}

pub use asm::{assemble, Listing, Program};
pub use config::{Config, RegisterPolicy};
pub use disasm::{disassemble_text, disassemble_words, Line};
pub use error::{Error, FieldError, Result};
