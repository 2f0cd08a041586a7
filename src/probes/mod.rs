//! Turns an image into a list of names and addresses that tracing tools can attach to:
//! either the defined functions (relative to the load bias) or the SystemTap SDT probe
//! sites.
pub mod functions;
pub mod sdt;
pub mod symbol_list;

pub use functions::*;
pub use sdt::*;
pub use symbol_list::*;

use crate::elf::ElfFile;
use crate::utils;
use std::error::Error;
use std::path::Path;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExtractMode {
    /// Functions from the symbol tables.
    Symbols,

    /// Probes from .note.stapsdt.
    ProbeNotes,
}

#[derive(Clone, Debug)]
pub struct Extractor {
    pub mode: ExtractMode,

    /// Appending more than this many entries fails the extraction.
    pub max_symbols: Option<usize>,
}

impl Extractor {
    pub fn new(mode: ExtractMode) -> Self {
        Extractor {
            mode,
            max_symbols: None,
        }
    }

    pub fn with_max_symbols(self, max_symbols: Option<usize>) -> Self {
        Extractor {
            max_symbols,
            ..self
        }
    }

    /// Never fails: problems are logged and yield an empty list.
    pub fn extract(&self, path: &Path) -> SymbolList {
        match self.try_extract(path) {
            Ok(list) => list,
            Err(err) => {
                utils::warn(&format!("{}: {err}", path.display()));
                SymbolList::new()
            }
        }
    }

    /// Missing symbol tables or note sections are not errors, they just produce an
    /// empty list.
    pub fn try_extract(&self, path: &Path) -> Result<SymbolList, Box<dyn Error>> {
        let elf = ElfFile::new(path.to_path_buf())?;
        Ok(self.extract_file(&elf)?)
    }

    pub fn extract_file(&self, elf: &ElfFile) -> Result<SymbolList, ListFull> {
        let mut list = SymbolListBuilder::new(self.max_symbols);
        match self.mode {
            ExtractMode::Symbols => find_functions(elf, &mut list)?,
            ExtractMode::ProbeNotes => find_probes(elf, &mut list)?,
        }
        list.build()
    }
}

pub fn extract(path: impl AsRef<Path>, mode: ExtractMode) -> SymbolList {
    Extractor::new(mode).extract(path.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elf::test_image::*;
    use crate::elf::{ByteOrder, WordWidth};

    fn pairs(list: &SymbolList) -> Vec<(&str, u64)> {
        list.iter().map(|s| (s.name.as_str(), s.address)).collect()
    }

    fn traced(width: WordWidth, order: ByteOrder) -> ImageBuilder {
        let mut image = ImageBuilder::new(width, order);
        image.segment(PT_NOTE, 0x2c4, 0x4002c4);
        image.load(0, 0x400000).load(0x1000, 0x401000);
        image.symbols(&[
            ("main", 0x401126, GLOBAL_FUNC),
            ("counter", 0x404028, GLOBAL_OBJECT),
            ("helper", 0x401180, LOCAL_FUNC),
        ]);
        let records = vec![
            image.sdt_note(0x401136, "test", "probe1"),
            image.note(b"other\0", 3, &image.sdt_desc([0x401140, 0, 0], "test", "nope")),
            image.sdt_note(0x401190, "test", "probe2"),
        ];
        image.sdt_section(&records, 0);
        image
    }

    #[test]
    fn bias_correction() {
        let mut image = ImageBuilder::x86_64();
        image.load(0, 0x400000);
        image.symbols(&[("main", 0x400000 + 0x1126, GLOBAL_FUNC)]);
        let path = image.write_temp("bias");
        let list = extract(&path, ExtractMode::Symbols);
        assert_eq!(pairs(&list), [("main", 0x1126)]);
    }

    #[test]
    fn no_bias() {
        let mut image = ImageBuilder::x86_64();
        image.load(0x1000, 0x401000);
        image.symbols(&[("main", 0x401126, GLOBAL_FUNC)]);
        let path = image.write_temp("no-bias");
        assert!(extract(&path, ExtractMode::Symbols).is_empty());
    }

    #[test]
    fn only_data_symbols() {
        let mut image = ImageBuilder::x86_64();
        image.load(0, 0x400000);
        image.symbols(&[
            ("counter", 0x404028, GLOBAL_OBJECT),
            ("", 0x401000, LOCAL_SECTION),
        ]);
        let path = image.write_temp("data");
        assert!(extract(&path, ExtractMode::Symbols).is_empty());
    }

    #[test]
    fn probes_are_not_bias_corrected() {
        let path = traced(WordWidth::Bits64, ByteOrder::Little).write_temp("probes");
        let list = extract(&path, ExtractMode::ProbeNotes);
        assert_eq!(pairs(&list), [("probe1", 0x401136), ("probe2", 0x401190)]);

        let list = extract(&path, ExtractMode::Symbols);
        assert_eq!(pairs(&list), [("main", 0x1126), ("helper", 0x1180)]);
    }

    #[test]
    fn zero_pc() {
        let mut image = ImageBuilder::x86_64();
        let records = vec![image.sdt_note(0, "test", "probe1")];
        image.sdt_section(&records, 0);
        let path = image.write_temp("zero-pc");
        assert!(extract(&path, ExtractMode::ProbeNotes).is_empty());
    }

    #[test]
    fn growth_failure() {
        let path = traced(WordWidth::Bits64, ByteOrder::Little).write_temp("growth");
        let extractor = Extractor::new(ExtractMode::Symbols).with_max_symbols(Some(1));
        assert!(extractor.extract(&path).is_empty());

        let err = extractor.try_extract(&path).err().unwrap();
        assert_eq!(err.downcast_ref::<ListFull>(), Some(&ListFull::Limit(1)));

        let extractor = Extractor::new(ExtractMode::ProbeNotes).with_max_symbols(Some(2));
        assert_eq!(extractor.extract(&path).len(), 2);
    }

    #[test]
    fn name_fidelity() {
        let path = traced(WordWidth::Bits64, ByteOrder::Little).write_temp("names");
        let list = extract(&path, ExtractMode::ProbeNotes);
        assert_eq!(list.find("probe1").unwrap().name, "probe1");
        assert!(list.find("test").is_none());
        assert!(list.iter().all(|s| !s.name.contains('\0')));
    }

    #[test]
    fn truncated_section_names() {
        let mut image = traced(WordWidth::Bits64, ByteOrder::Little);
        image.empty_section_names = true;
        let path = image.write_temp("no-names");
        assert!(extract(&path, ExtractMode::ProbeNotes).is_empty());

        // symbol tables are found by type, not name
        assert_eq!(extract(&path, ExtractMode::Symbols).len(), 2);
    }

    #[test]
    fn classes_and_byte_orders() {
        for width in [WordWidth::Bits32, WordWidth::Bits64] {
            for order in [ByteOrder::Little, ByteOrder::Big] {
                let elf = traced(width, order).open();
                let probes = Extractor::new(ExtractMode::ProbeNotes)
                    .extract_file(&elf)
                    .unwrap();
                assert_eq!(pairs(&probes), [("probe1", 0x401136), ("probe2", 0x401190)]);

                let functions = Extractor::new(ExtractMode::Symbols)
                    .extract_file(&elf)
                    .unwrap();
                assert_eq!(pairs(&functions), [("main", 0x1126), ("helper", 0x1180)]);
            }
        }
    }

    #[test]
    fn adversarial_headers() {
        let image = traced(WordWidth::Bits64, ByteOrder::Little);
        let mut bytes = image.build();
        bytes[0x3c..0x3e].copy_from_slice(&0xffffu16.to_le_bytes());
        let past_end = bytes.len() as u64 + 0x1000;
        bytes[0x28..0x30].copy_from_slice(&past_end.to_le_bytes());
        let elf = ElfFile::from_bytes(&bytes).unwrap();
        for mode in [ExtractMode::Symbols, ExtractMode::ProbeNotes] {
            assert!(Extractor::new(mode).extract_file(&elf).unwrap().is_empty());
        }

        // every field after e_version is garbage
        let mut bytes = image.build();
        for b in bytes[0x18..0x40].iter_mut() {
            *b = 0xff;
        }
        let elf = ElfFile::from_bytes(&bytes).unwrap();
        assert!(elf.sections.is_empty());
        for mode in [ExtractMode::Symbols, ExtractMode::ProbeNotes] {
            assert!(Extractor::new(mode).extract_file(&elf).unwrap().is_empty());
        }
    }

    #[test]
    fn wrapped_subtraction() {
        let mut image = ImageBuilder::x86_64();
        image.load(0, 0x400000);
        image.symbols(&[("low", 0x1000, GLOBAL_FUNC)]);
        let list = Extractor::new(ExtractMode::Symbols)
            .extract_file(&image.open())
            .unwrap();
        assert_eq!(pairs(&list), [("low", 0x1000u64.wrapping_sub(0x400000))]);
    }

    #[test]
    fn allocated_note_section() {
        let mut image = ImageBuilder::x86_64();
        let records = vec![image.sdt_note(0x401136, "test", "probe1")];
        image.sdt_section(&records, SHF_ALLOC);
        let path = image.write_temp("alloc");
        assert!(extract(&path, ExtractMode::ProbeNotes).is_empty());
    }

    #[test]
    fn environment_errors() {
        let missing = std::env::temp_dir().join("dsosyms-missing-image");
        assert!(extract(&missing, ExtractMode::Symbols).is_empty());
        assert!(
            Extractor::new(ExtractMode::Symbols)
                .try_extract(&missing)
                .is_err()
        );

        let script = "#!/bin/sh\n# this is a shell script and not an executable image\necho hi\n";
        let path = TempImage::new("text", script.as_bytes());
        let err = Extractor::new(ExtractMode::ProbeNotes)
            .try_extract(&path)
            .err()
            .unwrap();
        insta::assert_snapshot!(err.to_string(), @"not an ELF image (bad magic)");
        assert!(extract(&path, ExtractMode::ProbeNotes).is_empty());
    }
}
