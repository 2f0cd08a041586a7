//! The ELF file header. This is at offset zero and tells us where the program and
//! section header tables are.
use super::{Reader, Stream, WordWidth};
use crate::utils;
use std::error::Error;

const EV_CURRENT: u32 = 1;

/// Index used when the real section string table index doesn't fit in e_shstrndx.
pub const SHN_XINDEX: u16 = 0xffff;

/// Value used when the real program header count doesn't fit in e_phnum.
pub const PN_XNUM: u16 = 0xffff;

pub struct ElfHeader {
    /// Relocatable, executable, shared object, or core.
    pub etype: u16,

    /// Target CPU.
    pub machine: u16,

    pub osabi: u8,

    pub abiversion: u8,

    /// Address of the entry point, zero if there isn't one.
    pub entry: u64,

    /// Offset to the program header table.
    pub ph_offset: u64,

    /// Offset to the section header table.
    pub section_offset: u64,

    /// Processor specific flags.
    pub flags: u32,

    pub ph_entry_size: u16,

    /// Number of program headers. See ElfFile for how PN_XNUM is handled.
    pub num_ph_entries: u32,

    pub section_entry_size: u16,

    /// Number of section headers. Zero can mean that there are too many to fit here.
    pub num_section_entries: u32,

    /// Index of the section holding section names, may be SHN_XINDEX.
    pub string_table_index: u32,
}

impl ElfHeader {
    pub fn new(reader: &Reader) -> Result<Self, Box<dyn Error>> {
        let mut s = Stream::new(reader, 7);
        let osabi = s.read_byte()?;
        let abiversion = s.read_byte()?;

        // Past e_ident the layout is the same for both classes except that addresses
        // and offsets change size.
        let mut s = Stream::new(reader, 16);
        let etype = s.read_half()?;
        let machine = s.read_half()?;
        let version = s.read_word()?;
        utils::require(
            version == EV_CURRENT,
            &format!("unsupported elf version: {version}"),
        )?;
        let entry = s.read_addr()?;
        let ph_offset = s.read_offset()?;
        let section_offset = s.read_offset()?;
        let flags = s.read_word()?;
        let _header_size = s.read_half()?;
        let ph_entry_size = s.read_half()?;
        let num_ph_entries = s.read_half()? as u32;
        let section_entry_size = s.read_half()?;
        let num_section_entries = s.read_half()? as u32;
        let string_table_index = s.read_half()? as u32;

        Ok(ElfHeader {
            etype,
            machine,
            osabi,
            abiversion,
            entry,
            ph_offset,
            section_offset,
            flags,
            ph_entry_size,
            num_ph_entries,
            section_entry_size,
            num_section_entries,
            string_table_index,
        })
    }

    pub fn stype(&self) -> &'static str {
        match self.etype {
            0 => "none",
            1 => "relocatable",
            2 => "executable",
            3 => "shared object",
            4 => "core",
            _ => "unknown",
        }
    }

    pub fn machine(&self) -> &'static str {
        // see https://refspecs.linuxfoundation.org/elf/gabi4+/ch4.eheader.html
        match self.machine {
            0x03 => "x86",
            0x08 => "MIPS",
            0x14 => "PowerPC",
            0x15 => "PowerPC 64",
            0x16 => "S390",
            0x28 => "ARM",
            0x2b => "SPARC v9",
            0x3e => "x86-64",
            0xb7 => "AArch64",
            0xf3 => "RISC-V",
            0xf7 => "BPF",
            0x102 => "LoongArch",
            _ => "unknown",
        }
    }

    pub fn abi(&self) -> &'static str {
        match self.osabi {
            0x00 => "System V",
            0x03 => "Linux",
            0x06 => "Solaris",
            0x09 => "FreeBSD",
            0x0c => "OpenBSD",
            _ => "unknown",
        }
    }

    pub fn class(width: WordWidth) -> &'static str {
        match width {
            WordWidth::Bits32 => "ELF32",
            WordWidth::Bits64 => "ELF64",
        }
    }
}
