//! Defined functions from the symbol tables.
use super::{ListFull, SymbolListBuilder};
use crate::elf::{ElfFile, SectionIndex, SectionType};
use crate::utils;

/// Appends every function in every SHT_SYMTAB section. Addresses are relative to the
/// load bias (and wrap if a symbol is below it). Images without a load bias yield nothing.
pub fn find_functions(elf: &ElfFile, list: &mut SymbolListBuilder) -> Result<(), ListFull> {
    let bias = elf.load_bias().0;
    if bias == 0 {
        return Ok(());
    }

    for (index, section) in elf.sections_of(SectionType::SymbolTable) {
        let entries = match elf.symbol_entries(section) {
            Ok(entries) => entries,
            Err(err) => {
                utils::warn(&format!("skipping symbol table {}: {err}", index.0));
                continue;
            }
        };
        let strings = SectionIndex(section.link);
        if elf.sections.get(strings.0 as usize).is_none() {
            utils::warn(&format!(
                "skipping symbol table {}: bad string table index {}",
                index.0, strings.0
            ));
            continue;
        }

        for entry in entries.iter().filter(|e| e.is_function()) {
            let Some(name) = elf.find_str_bytes(strings, entry.name) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            list.append(&String::from_utf8_lossy(name), entry.value.wrapping_sub(bias))?;
        }
    }
    Ok(())
}
