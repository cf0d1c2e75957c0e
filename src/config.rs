use serde::{Deserialize, Serialize};

/// How register names that are not in the alias table are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegisterPolicy {
    /// Reject unknown names with `Error::UnknownRegister`.
    #[default]
    Strict,
    /// Map unknown names to `$zero`, as older tooling did.
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Load address of slot 1; absolute jump targets are computed from it.
    pub base_address: u32,
    /// Word width in bits written to the memory-initialization header.
    pub width: u32,
    /// Number of words in the target memory.
    pub depth: usize,
    pub comment: char,
    pub registers: RegisterPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_address: 0x0040_0000,
            width: 32,
            depth: 256,
            comment: ';',
            registers: RegisterPolicy::Strict,
        }
    }
}

impl Config {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
