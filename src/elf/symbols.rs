use super::{Reader, Stream, StringIndex, WordWidth};
use std::error::Error;

pub struct SymbolTableEntry {
    // see https://refspecs.linuxbase.org/elf/gabi4+/ch4.symtab.html
    /// Index into the symbol string table.
    pub name: StringIndex,

    /// Can be an address, absolute value, etc.
    pub value: u64,

    pub stype: SymbolType,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SymbolType {
    None,

    /// A data object, variable, array, etc.
    Object,

    /// Function or other executable code.
    Func,

    /// Another section. Used for relocation.
    Section,

    /// Source file associated with the symbol table.
    File,

    /// Uninitialized common blocks. Used by the linker.
    Common,

    /// Thread Local Storage data. Value is an offset to the data.
    Tls,

    /// For use by OS or CPU, e.g. GNU indirect functions.
    Reserved,
}

impl SymbolTableEntry {
    /// Size of an entry on disk.
    pub fn file_size(width: WordWidth) -> u64 {
        match width {
            WordWidth::Bits32 => 16,
            WordWidth::Bits64 => 24,
        }
    }

    pub fn new(reader: &Reader, offset: usize) -> Result<Self, Box<dyn Error>> {
        // Field order is different so we need both cases.
        let mut s = Stream::new(reader, offset);
        match reader.width {
            WordWidth::Bits64 => {
                let name = s.read_word()?; // 4
                let info = s.read_byte()?; // 1
                let _other = s.read_byte()?; // 1
                let _shndx = s.read_half()?; // 2
                let value = s.read_addr()?; // 8
                Ok(SymbolTableEntry::from_parts(name, info, value))
            }
            WordWidth::Bits32 => {
                let name = s.read_word()?;
                let value = s.read_addr()?;
                let _size = s.read_word()?;
                let info = s.read_byte()?;
                Ok(SymbolTableEntry::from_parts(name, info, value))
            }
        }
    }

    fn from_parts(name: u32, info: u8, value: u64) -> Self {
        // the high nibble of info is the binding, which doesn't matter here
        SymbolTableEntry {
            name: StringIndex(name),
            value,
            stype: SymbolType::from_u8(info),
        }
    }

    pub fn is_function(&self) -> bool {
        self.stype == SymbolType::Func
    }
}

impl SymbolType {
    pub fn from_u8(value: u8) -> Self {
        match value & 0xf {
            0 => SymbolType::None,
            1 => SymbolType::Object,
            2 => SymbolType::Func,
            3 => SymbolType::Section,
            4 => SymbolType::File,
            5 => SymbolType::Common,
            6 => SymbolType::Tls,
            _ => SymbolType::Reserved,
        }
    }
}
