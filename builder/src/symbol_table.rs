// Licensed under the Apache-2.0 license

use std::fmt;
use std::io;

use crate::elf_symbols::{find_symbol, Symbol};

/// Maps simulator trap labels to host code addresses. The testbench ends the
/// simulation when the host reaches one of them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SymbolTable {
    entries: Vec<(String, u64)>,
}
impl SymbolTable {
    /// `good_trap` at the host's `pass` label, `bad_trap` at `fail`.
    pub fn traps(symbols: &[Symbol]) -> io::Result<Self> {
        let mut table = Self::default();
        table.push("good_trap", find_symbol(symbols, "pass")?.value);
        table.push("bad_trap", find_symbol(symbols, "fail")?.value);
        Ok(table)
    }

    pub fn push(&mut self, label: impl Into<String>, addr: u64) {
        self.entries.push((label.into(), addr));
    }
}
impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, addr) in &self.entries {
            writeln!(f, "{label} {addr:016x} X {addr:016x}")?;
        }
        Ok(())
    }
}
