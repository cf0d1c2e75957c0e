/// A value that does not fit the bit field it is packed into.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{field} value {value} does not fit in {width} bits")]
pub struct FieldError {
    pub field: &'static str,
    pub value: i64,
    pub width: u32,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown instruction \"{mnemonic}\" at line #{line}")]
    UnknownInstruction { line: usize, mnemonic: String },
    #[error("Label \"{label}\" is already defined! Line #{line}")]
    DuplicateLabel { line: usize, label: String },
    #[error("Undefined label \"{label}\" at line #{line}")]
    UndefinedLabel { line: usize, label: String },
    #[error("Unknown register \"{name}\" at line #{line}")]
    UnknownRegister { line: usize, name: String },
    #[error("Invalid operand at line #{line}: {message}")]
    InvalidOperand { line: usize, message: String },
    #[error("Line #{line}: {source}")]
    Field {
        line: usize,
        #[source]
        source: FieldError,
    },
    #[error("Unknown opcode: \"{opcode:#04X}\" (function {function:#04X}) at slot {slot:#05X}")]
    UnknownOpcode { slot: u32, opcode: u8, function: u8 },
    #[error("Program has {words} words but memory depth is {depth}")]
    ProgramTooLarge { words: usize, depth: usize },
}

impl Error {
    pub(crate) fn operand(line: usize, message: impl Into<String>) -> Self {
        Error::InvalidOperand {
            line,
            message: message.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
