//! SystemTap statically defined tracing probes. Each probe site adds a record to the
//! .note.stapsdt section whose descriptor is:
//!
//! * pc: address of the probe site.
//! * base: link-time address of .stapsdt.base, used to adjust for prelinking.
//! * semaphore: address of the probe's enable counter, zero if there isn't one.
//! * provider: NUL terminated.
//! * name: NUL terminated.
//!
//! The three addresses are 4 or 8 bytes depending on the ELF class and use the image's
//! byte order.
use super::{ListFull, SymbolListBuilder};
use crate::elf::{ByteOrder, ElfFile, SectionType, WordWidth, split_cstr, xlate_addrs};

pub const SDT_NOTE_SECTION: &str = ".note.stapsdt";

/// Includes the NUL.
pub const SDT_NOTE_NAME: &[u8] = b"stapsdt\0";

pub const NT_STAPSDT: u32 = 3;

/// A decoded stapsdt descriptor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SdtNote {
    pub pc: u64,
    pub base: u64,
    pub semaphore: u64,
    pub provider: String,
    pub name: String,
}

impl SdtNote {
    /// None if the descriptor is too short, a string isn't terminated, or the probe
    /// name is empty.
    pub fn decode(desc: &[u8], width: WordWidth, order: ByteOrder) -> Option<SdtNote> {
        let addrs_size = width.fsize(3);
        if desc.len() < addrs_size + 3 {
            return None;
        }

        let mut addrs = [0u64; 3];
        xlate_addrs(&desc[..addrs_size], width, order, &mut addrs).ok()?;

        let (provider, rest) = split_cstr(&desc[addrs_size..])?;
        let (name, _) = split_cstr(rest)?;
        if name.is_empty() {
            return None;
        }

        Some(SdtNote {
            pc: addrs[0],
            base: addrs[1],
            semaphore: addrs[2],
            provider: String::from_utf8_lossy(provider).into_owned(),
            name: String::from_utf8_lossy(name).into_owned(),
        })
    }
}

/// Well formed stapsdt records from an unallocated .note.stapsdt section.
pub fn sdt_notes(elf: &ElfFile) -> impl Iterator<Item = SdtNote> + '_ {
    let section = elf
        .find_section_by_name(SDT_NOTE_SECTION)
        .map(|(_, section)| section)
        .filter(|section| section.stype == SectionType::Note && !section.is_alloc());
    section
        .into_iter()
        .flat_map(move |section| elf.notes(section))
        .filter(|note| note.has_name(SDT_NOTE_NAME) && note.ntype == NT_STAPSDT)
        .filter_map(move |note| SdtNote::decode(note.desc, elf.reader.width, elf.reader.order))
}

/// Appends the probe name and pc of every probe site. Unlike functions the pc is not
/// adjusted by the load bias.
pub fn find_probes(elf: &ElfFile, list: &mut SymbolListBuilder) -> Result<(), ListFull> {
    for note in sdt_notes(elf) {
        if note.pc == 0 {
            continue;
        }
        list.append(&note.name, note.pc)?;
    }
    Ok(())
}
