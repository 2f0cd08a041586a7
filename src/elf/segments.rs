//! Used by the run-time loader. Also see sections.
use super::{Reader, Stream, VirtualAddr, WordWidth};
use std::error::Error;

const EXECUTE_FLAG: u32 = 0x1;
const WRITE_FLAG: u32 = 0x2;
const READ_FLAG: u32 = 0x4;

/// Describes a segment.
pub struct ProgramHeader {
    // Elf64_Phdr or Elf32_Phdr, see https://llvm.org/doxygen/BinaryFormat_2ELF_8h_source.html
    pub stype: SegmentType,

    /// Offset to the first byte of the segment.
    pub offset: u64,

    /// Virtual address of the first byte in the segment.
    pub vaddr: u64,

    /// Number of bytes in the segment in the file.
    pub file_size: u64,

    /// Number of bytes in the segment in memory.
    pub mem_size: u64,

    /// Read/Write/Execute flags.
    pub flags: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SegmentType {
    /// Not to be used: either it's a segment that is intended to be not used or one
    /// that is not recognized.
    Null,

    /// A loadable segment, described by p_filesz and p_memsz.
    Load,

    /// Specifies dynamic linking information.
    Dynamic,

    /// Location and size of a null-terminated path name to invoke as an interpreter.
    Interpreter,

    /// The location and size of auxiliary information.
    Note,

    /// Reserved but has unspecified semantics.
    Shlib,

    /// The location and size of the program header table itself.
    Phdr,

    /// The Thread-Local Storage template.
    Tls,

    /// Exception handling frame table.
    GnuEhFrame,

    /// Stack permissions.
    GnuStack,

    /// Made read-only after relocation.
    GnuRelro,

    /// GNU property notes.
    GnuProperty,

    /// OS, processor, or future use.
    Other(u32),
}

impl SegmentType {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => SegmentType::Null,
            1 => SegmentType::Load,
            2 => SegmentType::Dynamic,
            3 => SegmentType::Interpreter,
            4 => SegmentType::Note,
            5 => SegmentType::Shlib,
            6 => SegmentType::Phdr,
            7 => SegmentType::Tls,
            0x6474e550 => SegmentType::GnuEhFrame,
            0x6474e551 => SegmentType::GnuStack,
            0x6474e552 => SegmentType::GnuRelro,
            0x6474e553 => SegmentType::GnuProperty,
            _ => SegmentType::Other(value),
        }
    }
}

impl ProgramHeader {
    pub fn new(reader: &Reader, offset: usize) -> Result<Self, Box<dyn Error>> {
        // Field sizes and order differ between 32-bit and 64-bit ELF files,
        // see https://llvm.org/doxygen/BinaryFormat_2ELF_8h_source.html.
        let mut s = Stream::new(reader, offset);
        match reader.width {
            WordWidth::Bits64 => {
                let p_type = SegmentType::from_u32(s.read_word()?);
                let p_flags = s.read_word()?;
                let p_offset = s.read_offset()?;
                let p_vaddr = s.read_addr()?;
                let _p_paddr = s.read_addr()?;
                let p_filesz = s.read_xword()?;
                let p_memsz = s.read_xword()?;
                let _p_align = s.read_xword()?;
                Ok(ProgramHeader {
                    stype: p_type,
                    flags: p_flags,
                    offset: p_offset,
                    vaddr: p_vaddr,
                    file_size: p_filesz,
                    mem_size: p_memsz,
                })
            }
            WordWidth::Bits32 => {
                let p_type = SegmentType::from_u32(s.read_word()?);
                let p_offset = s.read_offset()?;
                let p_vaddr = s.read_addr()?;
                let _p_paddr = s.read_addr()?;
                let p_filesz = s.read_word()? as u64;
                let p_memsz = s.read_word()? as u64;
                let p_flags = s.read_word()?;
                let _p_align = s.read_word()?;
                Ok(ProgramHeader {
                    stype: p_type,
                    flags: p_flags,
                    offset: p_offset,
                    vaddr: p_vaddr,
                    file_size: p_filesz,
                    mem_size: p_memsz,
                })
            }
        }
    }

    /// True for the segment that maps the start of the file.
    pub fn is_load_base(&self) -> bool {
        self.stype == SegmentType::Load && self.offset == 0
    }

    pub fn flags(flags: u32) -> String {
        let mut result = String::new();
        if flags & READ_FLAG != 0 {
            result.push('r');
        } else {
            result.push('-');
        }
        if flags & WRITE_FLAG != 0 {
            result.push('w');
        } else {
            result.push('-');
        }
        if flags & EXECUTE_FLAG != 0 {
            result.push('x');
        } else {
            result.push('-');
        }
        result
    }
}

/// Returns the link-time address of the load segment that starts at file offset zero.
/// Symbol values minus this are offsets from wherever the loader maps the image. Zero
/// means there is no such segment.
pub fn find_load_bias(segments: &[ProgramHeader]) -> VirtualAddr {
    segments
        .iter()
        .find(|ph| ph.is_load_base())
        .map(|ph| VirtualAddr(ph.vaddr))
        .unwrap_or(VirtualAddr(0))
}
