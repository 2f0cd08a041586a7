//! Note records. These appear in SHT_NOTE sections (and PT_NOTE segments) and carry
//! arbitrary vendor metadata, e.g. the GNU build id or SystemTap SDT probes.
use super::{Bytes, Offset, Reader, Stream};
use crate::utils;
use std::error::Error;

const NOTE_HEADER_SIZE: u64 = 12;

/// One undecoded note record.
#[derive(Debug)]
pub struct RawNote<'a> {
    /// Length of the name including the terminating NUL.
    pub name_size: u32,

    /// Length of the descriptor (the payload).
    pub desc_size: u32,

    /// Meaning depends on the name, e.g. NT_GNU_BUILD_ID for "GNU".
    pub ntype: u32,

    /// The name_size bytes of the name.
    pub name: &'a [u8],

    /// The desc_size bytes of the descriptor.
    pub desc: &'a [u8],

    /// Where the record starts in the ELF file.
    pub offset: Offset,
}

impl RawNote<'_> {
    /// Marker should include the NUL, e.g. b"stapsdt\0".
    pub fn has_name(&self, marker: &[u8]) -> bool {
        self.name_size as usize == marker.len() && self.name == marker
    }
}

/// Iterates over the notes within a section. Iteration stops at the first record that
/// would run past the end of the section.
pub struct Notes<'a> {
    reader: &'a Reader,
    region: Bytes<Offset>,
    next: u64, // relative to region.start
    align: u64,
}

impl<'a> Notes<'a> {
    /// Records are normally 4-byte aligned but some sections (e.g. .note.gnu.property
    /// on 64-bit) use 8.
    pub fn new(reader: &'a Reader, region: Bytes<Offset>, align: u64) -> Self {
        let align = if align == 8 { 8 } else { 4 };
        Notes {
            reader,
            region,
            next: 0,
            align,
        }
    }

    fn read_note(&mut self) -> Result<Option<RawNote<'a>>, Box<dyn Error>> {
        let rel = self.next;
        if rel.checked_add(NOTE_HEADER_SIZE).is_none_or(|n| n > self.region.size) {
            return Ok(None);
        }

        let start = self.region.start.0.checked_add(rel).ok_or("note offset overflows")?;
        let mut s = Stream::new(self.reader, usize::try_from(start)?);
        let name_size = s.read_word()?;
        let desc_size = s.read_word()?;
        let ntype = s.read_word()?;

        let name_rel = rel + NOTE_HEADER_SIZE;
        let desc_rel = name_rel
            .checked_add(name_size as u64)
            .and_then(|n| utils::align_to(n, self.align))
            .ok_or("note name overflows")?;
        let end_rel = desc_rel
            .checked_add(desc_size as u64)
            .ok_or("note descriptor overflows")?;
        if end_rel > self.region.size {
            return Ok(None);
        }

        let name = self.section_slice(name_rel, name_size as u64)?;
        let desc = self.section_slice(desc_rel, desc_size as u64)?;

        // The last record's padding may be missing.
        self.next = utils::align_to(end_rel, self.align)
            .unwrap_or(self.region.size)
            .min(self.region.size);

        Ok(Some(RawNote {
            name_size,
            desc_size,
            ntype,
            name,
            desc,
            offset: Offset(start),
        }))
    }

    fn section_slice(&self, rel: u64, size: u64) -> Result<&'a [u8], Box<dyn Error>> {
        let start = self.region.start.0.checked_add(rel).ok_or("note offset overflows")?;
        let start = usize::try_from(start)?;
        self.reader.slice(start, usize::try_from(size)?)
    }
}

impl<'a> Iterator for Notes<'a> {
    type Item = RawNote<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_note() {
            Ok(note) => note,
            Err(err) => {
                utils::warn(&format!(
                    "failed to read note at section offset {}: {err}",
                    self.next
                ));
                self.next = self.region.size;
                None
            }
        }
    }
}
