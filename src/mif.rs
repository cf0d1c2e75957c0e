//! Memory-initialization file (MIF) output and the matching word reader.
//!
//! ```text
//! WIDTH=32;
//! DEPTH=256;
//!
//! ADDRESS_RADIX=HEX;
//! DATA_RADIX=HEX;
//!
//! CONTENT BEGIN
//!     00  :   00430820;
//!     [01..FF]  :   00000000;
//! END;
//! ```

use std::fmt::Write;

use tracing::trace;

use crate::config::Config;
use crate::error::{Error, Result};

fn address_digits(depth: usize) -> usize {
    let bits = usize::BITS - depth.saturating_sub(1).leading_zeros();
    (bits as usize).div_ceil(4).max(1)
}

/// Renders `words` starting at address 0 and fills the rest of the depth
/// with zero.
pub fn write(words: &[u32], cfg: &Config) -> Result<String> {
    if words.len() > cfg.depth {
        return Err(Error::ProgramTooLarge { words: words.len(), depth: cfg.depth });
    }
    let ad = address_digits(cfg.depth);
    let dd = (cfg.width as usize).div_ceil(4);

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "WIDTH={};", cfg.width);
    let _ = writeln!(out, "DEPTH={};\n", cfg.depth);
    let _ = writeln!(out, "ADDRESS_RADIX=HEX;");
    let _ = writeln!(out, "DATA_RADIX=HEX;\n");
    let _ = writeln!(out, "CONTENT BEGIN");
    for (i, w) in words.iter().enumerate() {
        let _ = writeln!(out, "    {i:0ad$X}  :   {w:0dd$X};");
    }
    if words.len() < cfg.depth {
        let _ = writeln!(
            out,
            "    [{:0ad$X}..{:0ad$X}]  :   {:0dd$X};",
            words.len(),
            cfg.depth - 1,
            0
        );
    }
    let _ = writeln!(out, "END;");
    Ok(out)
}

fn parse_content(line: &str) -> Option<(u32, u32)> {
    let (addr, data) = line.split_once(':')?;
    let addr = u32::from_str_radix(addr.trim(), 16).ok()?;
    let data = data.trim().strip_suffix(';')?.trim();
    let word = u32::from_str_radix(data, 16).ok()?;
    Some((addr, word))
}

/// Collects `(address, word)` pairs from `<hex> : <hex>;` lines. Headers,
/// range fills and anything else are skipped.
pub fn read_words(text: &str) -> Vec<(u32, u32)> {
    text.lines()
        .filter_map(|line| {
            let pair = parse_content(line);
            if pair.is_none() {
                trace!(line, "skipping non-content line");
            }
            pair
        })
        .collect()
}
