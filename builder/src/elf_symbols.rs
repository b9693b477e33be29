// Licensed under the Apache-2.0 license

use std::io;

use elf::endian::LittleEndian;

use super::other_err;

/// Reads the static symbol table (`.symtab`) of a little-endian ELF file of
/// either class. An executable without a symbol table yields an empty list.
pub fn elf_symbols(elf_bytes: &[u8]) -> io::Result<Vec<Symbol>> {
    let elf = elf::ElfBytes::<LittleEndian>::minimal_parse(elf_bytes).map_err(other_err)?;
    let Some((symbols, strings)) = elf.symbol_table().map_err(other_err)? else {
        return Ok(vec![]);
    };
    let mut result = vec![];
    for sym in symbols.iter() {
        let name = strings.get(sym.st_name as usize).map_err(|e| {
            other_err(format!(
                "Could not parse symbol string at index {}: {e}",
                sym.st_name
            ))
        })?;
        result.push(Symbol {
            name: name.to_owned(),
            value: sym.st_value,
            ty: SymbolType::from(sym.st_symtype()),
        });
    }
    Ok(result)
}

/// Looks up the symbol called `name`. Section and file symbols never match.
pub fn find_symbol<'a>(symbols: &'a [Symbol], name: &str) -> io::Result<&'a Symbol> {
    symbols
        .iter()
        .filter(|s| !matches!(s.ty, SymbolType::Section | SymbolType::File))
        .find(|s| s.name == name)
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("Symbol {name:?} not found in ELF symbol table"),
            )
        })
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub value: u64,
    pub ty: SymbolType,
}
impl Symbol {
    /// The low 32 bits of the address, as the RV32 device sees it.
    pub fn addr32(&self) -> u32 {
        self.value as u32
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SymbolType {
    None,
    Object,
    Func,
    Section,
    File,
    Other(u8),
}
impl From<u8> for SymbolType {
    fn from(value: u8) -> Self {
        match value {
            elf::abi::STT_NOTYPE => Self::None,
            elf::abi::STT_OBJECT => Self::Object,
            elf::abi::STT_FUNC => Self::Func,
            elf::abi::STT_SECTION => Self::Section,
            elf::abi::STT_FILE => Self::File,
            other => Self::Other(other),
        }
    }
}
