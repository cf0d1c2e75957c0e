//! Label name to instruction-slot mapping for one assembly run.
//!
//! Slots are 1-based logical positions, not byte addresses. Names are
//! case-folded so that `Loop:` and `j loop` refer to the same label.

use std::collections::HashMap;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub slot: u32,
    /// Source line of the declaration.
    pub line: usize,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    table: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `slot`. A name may be declared only once.
    pub fn declare(&mut self, name: &str, slot: u32, line: usize) -> Result<()> {
        let key = name.to_ascii_lowercase();
        if self.table.contains_key(&key) {
            return Err(Error::DuplicateLabel { line, label: key });
        }
        self.table.insert(key, Symbol { slot, line });
        Ok(())
    }

    /// `line` is the referencing line, reported if the label is missing.
    pub fn resolve(&self, name: &str, line: usize) -> Result<u32> {
        let key = name.to_ascii_lowercase();
        match self.table.get(&key) {
            Some(sym) => Ok(sym.slot),
            None => Err(Error::UndefinedLabel { line, label: key }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.table.get(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Symbol)> {
        self.table.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn declare_then_resolve() {
        let mut st = SymbolTable::new();
        assert!(st.is_empty());
        st.declare("loop", 3, 4).unwrap();
        st.declare("End", 7, 9).unwrap();
        assert_eq!(st.len(), 2);
        assert_eq!(st.resolve("loop", 12).unwrap(), 3);
        assert_eq!(st.resolve("END", 12).unwrap(), 7);
        assert_eq!(st.get("end"), Some(&Symbol { slot: 7, line: 9 }));
    }

    #[test]
    fn redeclaration_keeps_first_binding() {
        let mut st = SymbolTable::new();
        st.declare("a", 1, 1).unwrap();
        let err = st.declare("A", 5, 6).unwrap_err();
        assert_eq!(err, Error::DuplicateLabel { line: 6, label: "a".into() });
        assert_eq!(st.resolve("a", 7).unwrap(), 1);
        assert_eq!(st.len(), 1);
    }

    #[test]
    fn missing_label_reports_reference_line() {
        let st = SymbolTable::new();
        assert_eq!(
            st.resolve("nowhere", 42).unwrap_err(),
            Error::UndefinedLabel { line: 42, label: "nowhere".into() }
        );
    }
}
