//! Builds small synthetic ELF images for unit tests. Layout is: file header, program
//! headers, section contents, section name table, section headers.
use super::{ByteOrder, ElfFile, WordWidth};
use std::ops::Deref;
use std::path::{Path, PathBuf};

pub const PT_LOAD: u32 = 1;
pub const PT_NOTE: u32 = 4;

pub const SHT_PROGBITS: u32 = 1;
pub const SHT_SYMTAB: u32 = 2;
pub const SHT_STRTAB: u32 = 3;
pub const SHT_NOTE: u32 = 7;
pub const SHT_NOBITS: u32 = 8;
pub const SHT_DYNSYM: u32 = 11;

pub const SHF_ALLOC: u64 = 0x2;

// st_info values
pub const GLOBAL_FUNC: u8 = 0x12;
pub const LOCAL_FUNC: u8 = 0x02;
pub const GLOBAL_OBJECT: u8 = 0x11;
pub const LOCAL_SECTION: u8 = 0x03;
pub const GNU_IFUNC: u8 = 0x1a;

/// A file in the temp directory that is removed when this goes out of scope.
pub struct TempImage {
    path: PathBuf,
}

impl TempImage {
    pub fn new(tag: &str, contents: &[u8]) -> Self {
        let path = std::env::temp_dir().join(format!("dsosyms-{}-{tag}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        TempImage { path }
    }
}

impl Deref for TempImage {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for TempImage {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempImage {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

pub struct TestSegment {
    pub stype: u32,
    pub offset: u64,
    pub vaddr: u64,
}

#[derive(Clone)]
pub struct TestSection {
    pub name: String,
    pub stype: u32,
    pub flags: u64,
    pub data: Vec<u8>,
    pub link: u32,
    pub align: u64,
    pub entry_size: u64,
}

impl TestSection {
    pub fn new(name: &str, stype: u32, data: Vec<u8>) -> Self {
        TestSection {
            name: name.to_string(),
            stype,
            flags: 0,
            data,
            link: 0,
            align: 1,
            entry_size: 0,
        }
    }
}

pub struct ImageBuilder {
    pub width: WordWidth,
    pub order: ByteOrder,
    pub segments: Vec<TestSegment>,
    pub sections: Vec<TestSection>,

    /// Give .shstrtab a size of zero.
    pub empty_section_names: bool,

    /// Use section zero for the section count and .shstrtab index (and the program
    /// header count if there are any).
    pub extended_numbering: bool,
}

impl ImageBuilder {
    pub fn new(width: WordWidth, order: ByteOrder) -> Self {
        ImageBuilder {
            width,
            order,
            segments: Vec::new(),
            sections: Vec::new(),
            empty_section_names: false,
            extended_numbering: false,
        }
    }

    /// 64-bit little endian, i.e. x86-64.
    pub fn x86_64() -> Self {
        ImageBuilder::new(WordWidth::Bits64, ByteOrder::Little)
    }

    pub fn segment(&mut self, stype: u32, offset: u64, vaddr: u64) -> &mut Self {
        self.segments.push(TestSegment {
            stype,
            offset,
            vaddr,
        });
        self
    }

    pub fn load(&mut self, offset: u64, vaddr: u64) -> &mut Self {
        self.segment(PT_LOAD, offset, vaddr)
    }

    /// Returns the index of the new section.
    pub fn section(&mut self, section: TestSection) -> u32 {
        self.sections.push(section);
        self.sections.len() as u32 // section zero is the null section
    }

    /// Adds .strtab and .symtab sections. Entries are (name, value, st_info). Returns the
    /// index of the symbol table.
    pub fn symbols(&mut self, entries: &[(&str, u64, u8)]) -> u32 {
        self.symbol_table(".symtab", SHT_SYMTAB, entries)
    }

    pub fn symbol_table(&mut self, name: &str, stype: u32, entries: &[(&str, u64, u8)]) -> u32 {
        let mut strings = vec![0u8];
        let mut table = vec![0u8; self.symbol_size()]; // null symbol
        for (sym_name, value, info) in entries {
            let name_index = strings.len() as u32;
            strings.extend_from_slice(sym_name.as_bytes());
            strings.push(0);
            self.put_symbol(&mut table, name_index, *value, *info);
        }

        let strtab = self.section(TestSection::new(
            &format!("{name}.strtab"),
            SHT_STRTAB,
            strings,
        ));
        let mut symtab = TestSection::new(name, stype, table);
        symtab.link = strtab;
        symtab.align = 8;
        symtab.entry_size = self.symbol_size() as u64;
        self.section(symtab)
    }

    /// Adds a .note.stapsdt section holding the records.
    pub fn sdt_section(&mut self, records: &[Vec<u8>], flags: u64) -> u32 {
        let mut section = TestSection::new(".note.stapsdt", SHT_NOTE, records.concat());
        section.flags = flags;
        section.align = 4;
        self.section(section)
    }

    /// Encodes a note record using 4-byte alignment.
    pub fn note(&self, name: &[u8], ntype: u32, desc: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.put32(&mut bytes, name.len() as u32);
        self.put32(&mut bytes, desc.len() as u32);
        self.put32(&mut bytes, ntype);
        bytes.extend_from_slice(name);
        pad(&mut bytes, 4);
        bytes.extend_from_slice(desc);
        pad(&mut bytes, 4);
        bytes
    }

    /// Descriptor for an SDT probe: pc, base, semaphore, provider, name.
    pub fn sdt_desc(&self, addrs: [u64; 3], provider: &str, name: &str) -> Vec<u8> {
        let mut desc = Vec::new();
        for addr in addrs {
            self.put_addr(&mut desc, addr);
        }
        desc.extend_from_slice(provider.as_bytes());
        desc.push(0);
        desc.extend_from_slice(name.as_bytes());
        desc.push(0);
        desc
    }

    pub fn sdt_note(&self, pc: u64, provider: &str, name: &str) -> Vec<u8> {
        let desc = self.sdt_desc([pc, 0, 0], provider, name);
        self.note(b"stapsdt\0", 3, &desc)
    }

    pub fn build(&self) -> Vec<u8> {
        let (eh_size, ph_size, sh_size) = match self.width {
            WordWidth::Bits32 => (52, 32, 40),
            WordWidth::Bits64 => (64, 56, 64),
        };

        let ph_offset = eh_size;
        let mut out = vec![0u8; eh_size + ph_size * self.segments.len()];

        let mut names = vec![0u8];
        let mut placed = Vec::new(); // (name index, file offset)
        for section in self.sections.iter() {
            let name = names.len() as u32;
            names.extend_from_slice(section.name.as_bytes());
            names.push(0);
            pad(&mut out, 8);
            placed.push((name, out.len() as u64));
            if section.stype != SHT_NOBITS {
                out.extend_from_slice(&section.data);
            }
        }
        let shstrtab_name = names.len() as u32;
        names.extend_from_slice(b".shstrtab\0");
        let shstrtab_offset = out.len() as u64;
        out.extend_from_slice(&names);

        pad(&mut out, 8);
        let sh_offset = out.len() as u64;
        let num_sections = self.sections.len() as u32 + 2;
        let shstrndx = num_sections - 1;
        let num_segments = self.segments.len() as u32;

        // null section, doubles as storage for extended numbering
        if self.extended_numbering {
            let (size, link) = (num_sections as u64, shstrndx);
            self.put_section(&mut out, 0, 0, 0, 0, size, link, num_segments, 0, 0);
        } else {
            out.extend(std::iter::repeat_n(0u8, sh_size));
        }
        for (section, (name, offset)) in self.sections.iter().zip(placed.iter()) {
            self.put_section(
                &mut out,
                *name,
                section.stype,
                section.flags,
                *offset,
                section.data.len() as u64,
                section.link,
                0,
                section.align,
                section.entry_size,
            );
        }
        let names_size = if self.empty_section_names {
            0
        } else {
            names.len() as u64
        };
        self.put_section(
            &mut out,
            shstrtab_name,
            SHT_STRTAB,
            0,
            shstrtab_offset,
            names_size,
            0,
            0,
            1,
            0,
        );

        let mut phdrs = Vec::new();
        for segment in self.segments.iter() {
            self.put_segment(&mut phdrs, segment);
        }
        out[ph_offset..ph_offset + phdrs.len()].copy_from_slice(&phdrs);

        let mut header = Vec::new();
        header.extend_from_slice(b"\x7fELF");
        header.push(match self.width {
            WordWidth::Bits32 => 1,
            WordWidth::Bits64 => 2,
        });
        header.push(match self.order {
            ByteOrder::Little => 1,
            ByteOrder::Big => 2,
        });
        header.push(1); // EI_VERSION
        header.resize(16, 0);
        self.put16(&mut header, 2); // ET_EXEC
        self.put16(&mut header, 0x3e);
        self.put32(&mut header, 1); // EV_CURRENT
        self.put_addr(&mut header, 0x401000); // entry
        self.put_addr(
            &mut header,
            if self.segments.is_empty() {
                0
            } else {
                ph_offset as u64
            },
        );
        self.put_addr(&mut header, sh_offset);
        self.put32(&mut header, 0); // flags
        self.put16(&mut header, eh_size as u16);
        self.put16(&mut header, ph_size as u16);
        if self.extended_numbering && num_segments > 0 {
            self.put16(&mut header, 0xffff);
        } else {
            self.put16(&mut header, num_segments as u16);
        }
        self.put16(&mut header, sh_size as u16);
        if self.extended_numbering {
            self.put16(&mut header, 0);
            self.put16(&mut header, 0xffff);
        } else {
            self.put16(&mut header, num_sections as u16);
            self.put16(&mut header, shstrndx as u16);
        }
        out[..eh_size].copy_from_slice(&header);
        out
    }

    pub fn open(&self) -> ElfFile {
        ElfFile::from_bytes(&self.build()).unwrap()
    }

    /// Writes the image to the temp directory. Tests run in parallel so tag should be
    /// unique.
    pub fn write_temp(&self, tag: &str) -> TempImage {
        TempImage::new(tag, &self.build())
    }

    fn symbol_size(&self) -> usize {
        match self.width {
            WordWidth::Bits32 => 16,
            WordWidth::Bits64 => 24,
        }
    }

    fn put_symbol(&self, out: &mut Vec<u8>, name: u32, value: u64, info: u8) {
        let shndx = 1;
        match self.width {
            WordWidth::Bits64 => {
                self.put32(out, name);
                out.push(info);
                out.push(0);
                self.put16(out, shndx);
                self.put64(out, value);
                self.put64(out, 0x10);
            }
            WordWidth::Bits32 => {
                self.put32(out, name);
                self.put32(out, value as u32);
                self.put32(out, 0x10);
                out.push(info);
                out.push(0);
                self.put16(out, shndx);
            }
        }
    }

    fn put_segment(&self, out: &mut Vec<u8>, segment: &TestSegment) {
        let flags = 0x5; // r-x
        match self.width {
            WordWidth::Bits64 => {
                self.put32(out, segment.stype);
                self.put32(out, flags);
                self.put64(out, segment.offset);
                self.put64(out, segment.vaddr);
                self.put64(out, segment.vaddr);
                self.put64(out, 0x1000);
                self.put64(out, 0x1000);
                self.put64(out, 0x1000);
            }
            WordWidth::Bits32 => {
                self.put32(out, segment.stype);
                self.put32(out, segment.offset as u32);
                self.put32(out, segment.vaddr as u32);
                self.put32(out, segment.vaddr as u32);
                self.put32(out, 0x1000);
                self.put32(out, 0x1000);
                self.put32(out, flags);
                self.put32(out, 0x1000);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn put_section(
        &self,
        out: &mut Vec<u8>,
        name: u32,
        stype: u32,
        flags: u64,
        offset: u64,
        size: u64,
        link: u32,
        info: u32,
        align: u64,
        entry_size: u64,
    ) {
        self.put32(out, name);
        self.put32(out, stype);
        self.put_addr(out, flags);
        self.put_addr(out, 0); // vaddr
        self.put_addr(out, offset);
        self.put_addr(out, size);
        self.put32(out, link);
        self.put32(out, info);
        self.put_addr(out, align);
        self.put_addr(out, entry_size);
    }

    fn put16(&self, out: &mut Vec<u8>, value: u16) {
        match self.order {
            ByteOrder::Little => out.extend_from_slice(&value.to_le_bytes()),
            ByteOrder::Big => out.extend_from_slice(&value.to_be_bytes()),
        }
    }

    fn put32(&self, out: &mut Vec<u8>, value: u32) {
        match self.order {
            ByteOrder::Little => out.extend_from_slice(&value.to_le_bytes()),
            ByteOrder::Big => out.extend_from_slice(&value.to_be_bytes()),
        }
    }

    fn put64(&self, out: &mut Vec<u8>, value: u64) {
        match self.order {
            ByteOrder::Little => out.extend_from_slice(&value.to_le_bytes()),
            ByteOrder::Big => out.extend_from_slice(&value.to_be_bytes()),
        }
    }

    /// Addresses, offsets, and the word sized section header fields.
    fn put_addr(&self, out: &mut Vec<u8>, value: u64) {
        match self.width {
            WordWidth::Bits32 => self.put32(out, value as u32),
            WordWidth::Bits64 => self.put64(out, value),
        }
    }
}

fn pad(out: &mut Vec<u8>, align: usize) {
    while out.len() % align != 0 {
        out.push(0);
    }
}
