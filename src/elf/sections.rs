//! Used by the linker and debugger. Also see segments.
use super::{Reader, Stream, WordWidth};
use crate::elf::{Bytes, Offset, StringIndex};
use std::error::Error;

pub const WRITE_FLAG: u64 = 1 << 0; // Writable
pub const ALLOC_FLAG: u64 = 1 << 1; // Occupies memory during execution
pub const EXECINSTR_FLAG: u64 = 1 << 2; // Executable
const MERGE_FLAG: u64 = 1 << 4; // Might be merged
const STRINGS_FLAG: u64 = 1 << 5; // Contains nul-terminated strings
const INFO_LINK_FLAG: u64 = 1 << 6; // `sh_info' contains SHT index
const LINK_ORDER_FLAG: u64 = 1 << 7; // Preserve order after combining
const OS_NONCONFORMING_FLAG: u64 = 1 << 8; // Non-standard OS specific handling required
const GROUP_FLAG: u64 = 1 << 9; // Section is member of a group.
const TLS_FLAG: u64 = 1 << 10; // Section hold thread-local data.
const COMPRESSED_FLAG: u64 = 1 << 11; // Section with compressed data.

/// Describes a section.
#[derive(Clone, Debug)]
pub struct SectionHeader {
    // Elf32_Shdr or Elf64_Shdr, see https://gist.github.com/x0nu11byt3/bcb35c3de461e5fb66173071a2379779
    /// Index into the section name string table. Zero means no name.
    pub name: StringIndex,

    /// Type of the section.
    pub stype: SectionType,

    /// Write, alloc, and/or exec.
    pub flags: u64,

    /// Addressing for the bytes in the section using offsets from the start of the ELF file.
    pub obytes: Bytes<Offset>,

    /// Link to another section with related information, usually a string
    /// or symbol table.
    pub link: u32,

    /// Additional section info.
    pub info: u32,

    /// Section alignment.
    pub align: u64,

    /// Set if the section holds a table of entries.
    pub entry_size: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SectionType {
    /// Dynamic linking information.
    Dynamic,

    /// Dynamic linker symbol table.
    DynamicSymbolTable,

    /// Array of pointers to termination functions.
    FiniArray,

    /// GNU style hash table.
    Hash,

    /// Array of pointers to initialization functions.
    InitArray,

    /// Uninitialized data. Occupies no bytes in the file.
    NoBits,

    /// Arbitrary metadata, e.g. build ids or SDT probes.
    Note,

    /// Not to be used.
    Null,

    /// Array of pointers to functions to be called before the regular
    /// initialization functions.
    PreinitArray,

    /// CPU instructions or constant data.
    ProgBits,

    /// Relocation entries with addends.
    RelocationsWith,

    /// Relocation entries without addends.
    RelocationsWithout,

    /// Strings for use by the linker and debugger.
    StringTable,

    /// Symbol hash table.
    SymbolHashTable,

    /// Full symbol table, removed by strip.
    SymbolTable,

    /// Extended section indices for a symbol table.
    SymbolTableIndex,

    /// GNU symbol versions that are provided.
    VerDef,

    /// GNU symbol versions that are required.
    VerNeed,

    /// GNU symbol version table.
    VerSym,

    /// OS, processor, or user specific.
    Other(u32),
}

impl SectionType {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0x0 => SectionType::Null,
            0x1 => SectionType::ProgBits,
            0x2 => SectionType::SymbolTable,
            0x3 => SectionType::StringTable,
            0x4 => SectionType::RelocationsWith,
            0x5 => SectionType::SymbolHashTable,
            0x6 => SectionType::Dynamic,
            0x7 => SectionType::Note,
            0x8 => SectionType::NoBits,
            0x9 => SectionType::RelocationsWithout,
            0xb => SectionType::DynamicSymbolTable,
            0xe => SectionType::InitArray,
            0xf => SectionType::FiniArray,
            0x10 => SectionType::PreinitArray,
            0x12 => SectionType::SymbolTableIndex,
            0x6ffffff6 => SectionType::Hash,
            0x6ffffffd => SectionType::VerDef,
            0x6ffffffe => SectionType::VerNeed,
            0x6fffffff => SectionType::VerSym,
            _ => SectionType::Other(value),
        }
    }
}

impl SectionHeader {
    pub fn flags(flags: u64) -> String {
        let names = [
            (WRITE_FLAG, "WRITE"),
            (ALLOC_FLAG, "ALLOC"),
            (EXECINSTR_FLAG, "EXEC"),
            (MERGE_FLAG, "MERGE"),
            (STRINGS_FLAG, "STRINGS"),
            (INFO_LINK_FLAG, "INFO"),
            (LINK_ORDER_FLAG, "LINK"),
            (OS_NONCONFORMING_FLAG, "OS_NONCONFORMING"),
            (GROUP_FLAG, "GROUP"),
            (TLS_FLAG, "TLS"),
            (COMPRESSED_FLAG, "COMPRESSED"),
        ];
        let result: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| flags & flag != 0)
            .map(|(_, name)| *name)
            .collect();
        if result.is_empty() {
            "none".to_string()
        } else {
            result.join(" ")
        }
    }

    /// True if the section is mapped into the process when it runs.
    pub fn is_alloc(&self) -> bool {
        self.flags & ALLOC_FLAG != 0
    }
}

impl SectionHeader {
    pub fn new(reader: &Reader, offset: usize) -> Result<Self, Box<dyn Error>> {
        let mut s = Stream::new(reader, offset);
        let name = s.read_word()?;
        let stype = SectionType::from_u32(s.read_word()?);
        let (flags, _vaddr, offset, size, link, info, align, entry_size) = match reader.width {
            WordWidth::Bits64 => (
                s.read_xword()?,
                s.read_addr()?,
                s.read_offset()?,
                s.read_xword()?,
                s.read_word()?,
                s.read_word()?,
                s.read_xword()?,
                s.read_xword()?,
            ),
            WordWidth::Bits32 => (
                s.read_word()? as u64,
                s.read_addr()?,
                s.read_offset()?,
                s.read_word()? as u64,
                s.read_word()?,
                s.read_word()?,
                s.read_word()? as u64,
                s.read_word()? as u64,
            ),
        };
        Ok(SectionHeader {
            name: StringIndex(name),
            stype,
            flags,
            obytes: Bytes::<Offset>::from_raw(offset, size),
            link,
            info,
            align,
            entry_size,
        })
    }
}
