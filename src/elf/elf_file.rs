//! An ELF image along with its program and section headers.
use super::{
    ElfHeader, Notes, PN_XNUM, ProgramHeader, Reader, SHN_XINDEX, SectionHeader, SectionIndex,
    SectionType, StringIndex, SymbolTableEntry, VirtualAddr, WordWidth, find_load_bias,
    split_cstr,
};
use crate::utils;
use memmap2::Mmap;
use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

pub struct ElfFile {
    pub header: ElfHeader,
    pub path: PathBuf,
    pub reader: Reader,
    pub segments: Vec<ProgramHeader>,
    pub sections: Vec<SectionHeader>,
}

impl ElfFile {
    pub fn new(path: PathBuf) -> Result<Self, Box<dyn Error>> {
        let file = File::open(&path)?;

        // This is unsafe because it has undefined behavior if the underlying file is
        // modified while the memory map is in use. The map stays valid after file is
        // dropped.
        let bytes = unsafe { Mmap::map(&file) }?;
        let reader = Reader::new(bytes)?;
        ElfFile::with_reader(path, reader)
    }

    /// For images that are already in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Box<dyn Error>> {
        let reader = Reader::from_slice(bytes)?;
        ElfFile::with_reader(PathBuf::from("<memory>"), reader)
    }

    fn with_reader(path: PathBuf, reader: Reader) -> Result<Self, Box<dyn Error>> {
        let mut header = ElfHeader::new(&reader)?;
        ElfFile::resolve_extended_numbering(&reader, &mut header);

        let (ph_size, sh_size) = match reader.width {
            WordWidth::Bits32 => (32, 40),
            WordWidth::Bits64 => (56, 64),
        };
        let segments = load_table(
            &reader,
            "program header",
            (header.ph_offset, header.num_ph_entries),
            (header.ph_entry_size as usize, ph_size),
            ProgramHeader::new,
        );
        let sections = load_table(
            &reader,
            "section header",
            (header.section_offset, header.num_section_entries),
            (header.section_entry_size as usize, sh_size),
            SectionHeader::new,
        );
        Ok(ElfFile {
            header,
            path,
            reader,
            segments,
            sections,
        })
    }

    /// Link-time address of the segment mapping the start of the file, zero if there
    /// isn't one.
    pub fn load_bias(&self) -> VirtualAddr {
        find_load_bias(&self.segments)
    }

    pub fn find_section(&self, index: SectionIndex) -> Option<&SectionHeader> {
        let section = self.sections.get(index.0 as usize);
        if section.is_none() {
            utils::warn(&format!("bad section index: {}", index.0));
        }
        section
    }

    /// The bytes of a section within the file. NOBITS sections are empty.
    pub fn section_bytes(&self, section: &SectionHeader) -> Result<&[u8], Box<dyn Error>> {
        if section.stype == SectionType::NoBits {
            return Ok(&[]);
        }
        let start = usize::try_from(section.obytes.start.0)?;
        let size = usize::try_from(section.obytes.size)?;
        self.reader.slice(start, size)
    }

    /// Returns the NUL terminated string at index within a string table section (without
    /// the NUL). None if the index or the terminator is outside the section.
    pub fn find_str_bytes(&self, table: SectionIndex, index: StringIndex) -> Option<&[u8]> {
        let section = self.find_section(table)?;
        let bytes = self.section_bytes(section).ok()?;
        let tail = bytes.get(index.0 as usize..)?;
        split_cstr(tail).map(|(s, _)| s)
    }

    /// Note that index can point into the middle of a string.
    pub fn find_string(&self, table: SectionIndex, index: StringIndex) -> Option<String> {
        self.find_str_bytes(table, index)
            .map(|s| String::from_utf8_lossy(s).into_owned())
    }

    pub fn find_section_name(&self, index: SectionIndex) -> Option<String> {
        if !self.section_names_readable() {
            return None;
        }
        let section = self.sections.get(index.0 as usize)?;
        self.find_string(self.names_index(), section.name)
    }

    /// True if the section name string table exists, has bytes, and is entirely within
    /// the file.
    pub fn section_names_readable(&self) -> bool {
        let index = self.names_index();
        if index.0 == 0 {
            return false;
        }
        let Some(section) = self.sections.get(index.0 as usize) else {
            return false;
        };
        section.stype != SectionType::NoBits
            && section.obytes.size != 0
            && section
                .obytes
                .start
                .0
                .checked_add(section.obytes.size)
                .is_some_and(|end| end <= self.reader.len() as u64)
    }

    /// First section (after the null section) whose name is exactly name.
    pub fn find_section_by_name(&self, name: &str) -> Option<(SectionIndex, &SectionHeader)> {
        if !self.section_names_readable() {
            return None;
        }
        let names = self.names_index();
        self.sections
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, section)| self.find_str_bytes(names, section.name) == Some(name.as_bytes()))
            .map(|(i, section)| (SectionIndex(i as u32), section))
    }

    /// All sections of the given type, e.g. SymbolTable or DynamicSymbolTable.
    pub fn sections_of(
        &self,
        stype: SectionType,
    ) -> impl Iterator<Item = (SectionIndex, &SectionHeader)> {
        self.sections
            .iter()
            .enumerate()
            .filter(move |(_, section)| section.stype == stype)
            .map(|(i, section)| (SectionIndex(i as u32), section))
    }

    /// Decodes every entry in a symbol table section (including the null entry).
    pub fn symbol_entries(
        &self,
        section: &SectionHeader,
    ) -> Result<Vec<SymbolTableEntry>, Box<dyn Error>> {
        let min_size = SymbolTableEntry::file_size(self.reader.width);
        utils::require(
            section.entry_size >= min_size,
            &format!("bad symbol entry size: {}", section.entry_size),
        )?;
        let bytes = self.section_bytes(section)?;

        let start = section.obytes.start.0;
        let count = bytes.len() as u64 / section.entry_size;
        let mut entries = Vec::with_capacity(count as usize);
        for i in 0..count {
            let offset = start + i * section.entry_size;
            entries.push(SymbolTableEntry::new(&self.reader, usize::try_from(offset)?)?);
        }
        Ok(entries)
    }

    pub fn notes(&self, section: &SectionHeader) -> Notes<'_> {
        let mut region = section.obytes;
        if section.stype == SectionType::NoBits {
            region.size = 0;
        }
        Notes::new(&self.reader, region, section.align)
    }
}

impl ElfFile {
    fn names_index(&self) -> SectionIndex {
        SectionIndex(self.header.string_table_index)
    }

    // Images with lots of sections (or program headers) stash the real counts in the
    // null section.
    fn resolve_extended_numbering(reader: &Reader, header: &mut ElfHeader) {
        let needed = header.num_section_entries == 0
            || header.string_table_index == SHN_XINDEX as u32
            || header.num_ph_entries == PN_XNUM as u32;
        if !needed || header.section_offset == 0 {
            return;
        }

        let section0 = usize::try_from(header.section_offset)
            .map_err(|err| -> Box<dyn Error> { err.into() })
            .and_then(|offset| SectionHeader::new(reader, offset));
        match section0 {
            Ok(section) => {
                if header.num_section_entries == 0 {
                    header.num_section_entries =
                        u32::try_from(section.obytes.size).unwrap_or(u32::MAX);
                }
                if header.string_table_index == SHN_XINDEX as u32 {
                    header.string_table_index = section.link;
                }
                if header.num_ph_entries == PN_XNUM as u32 {
                    header.num_ph_entries = section.info;
                }
            }
            Err(err) => utils::warn(&format!("failed to read the null section: {err}")),
        }
    }
}

type Parser<T> = fn(&Reader, usize) -> Result<T, Box<dyn Error>>;

// Reads a header table, clamping the count to what the file can actually hold.
fn load_table<T>(
    reader: &Reader,
    what: &str,
    (offset, count): (u64, u32),
    (entry_size, min_size): (usize, usize),
    parse: Parser<T>,
) -> Vec<T> {
    let mut entries = Vec::new();
    if offset == 0 || count == 0 {
        return entries;
    }
    if entry_size < min_size {
        utils::warn(&format!("bad {what} entry size: {entry_size}"));
        return entries;
    }

    let available = (reader.len() as u64).saturating_sub(offset) / entry_size as u64;
    let mut count = count as u64;
    if count > available {
        utils::warn(&format!(
            "{what} table claims {count} entries but only {available} fit in the file"
        ));
        count = available;
    }

    for i in 0..count {
        let at = offset + i * entry_size as u64;
        match usize::try_from(at)
            .map_err(|err| -> Box<dyn Error> { err.into() })
            .and_then(|at| parse(reader, at))
        {
            Ok(entry) => entries.push(entry),
            Err(err) => utils::warn(&format!("failed to read {what} at {at:#x}: {err}")),
        }
    }
    entries
}
