use super::Session;
use super::tables::{SimpleTableBuilder, TableBuilder, add_field, add_simple};
use crate::elf::{ByteOrder, ElfHeader, ProgramHeader, SectionHeader, SectionIndex};
use crate::probes::sdt_notes;
use crate::repl::{ExplainArgs, TableArgs};
use crate::utils::{Styling, uwriteln};
use std::io::Write;

pub fn elf_header(session: &Session, args: &ExplainArgs, out: impl Write) {
    let Some(file) = session.open() else {
        return;
    };
    let header = &file.header;

    let mut b = SimpleTableBuilder::new();
    add_simple!(
        b,
        "class",
        ElfHeader::class(file.reader.width),
        "ELF32 uses four byte addresses, ELF64 eight"
    );
    let order = match file.reader.order {
        ByteOrder::Little => "little endian",
        ByteOrder::Big => "big endian",
    };
    add_simple!(b, "byte order", order, "how multi-byte fields are laid out");
    add_simple!(b, "type", header.stype(), "type of ELF file");
    add_simple!(b, "machine", header.machine(), "CPU architecture");
    add_simple!(b, "osabi", header.abi(), "the OS the binary was compiled for");
    add_simple!(b, "entry", format!("{:x}", header.entry), "address of the first instruction");
    add_simple!(
        b,
        "ph_offset",
        format!("{:x}", header.ph_offset),
        "offset in the ELF file to the program header table"
    );
    add_simple!(
        b,
        "num_ph_entries",
        header.num_ph_entries,
        "number of entries in the program header table"
    );
    add_simple!(
        b,
        "section_offset",
        format!("{:x}", header.section_offset),
        "offset in the ELF file to the section header table"
    );
    add_simple!(
        b,
        "num_section_entries",
        header.num_section_entries,
        "number of entries in the section header table"
    );
    add_simple!(
        b,
        "string_table_index",
        header.string_table_index,
        "section index containing the section names"
    );
    add_simple!(
        b,
        "load bias",
        format!("{:x}", file.load_bias().0),
        "vaddr of the load segment at file offset zero, function addresses are relative to this"
    );
    b.writeln(out, args.explain);
}

pub fn elf_segments(session: &Session, args: &TableArgs, mut out: impl Write) {
    let Some(file) = session.open() else {
        return;
    };

    let mut builder = TableBuilder::new();
    builder.add_col_l("type", "the segment type");
    builder.add_col_r(
        "offset",
        "the offset into the ELF file at which the segment appears",
    );
    builder.add_col_r("vaddr", "the link-time address the segment starts at");
    builder.add_col_r("file size", "the size of the segment on disk");
    builder.add_col_r("memory size", "the size of the segment in memory");
    builder.add_col_r("flags", "readable, writeable, and/or executable");
    builder.add_col_l("note", "set for the segment that determines the load bias");

    let mut found_bias = false;
    for segment in file.segments.iter() {
        add_field!(builder, "type", "{:?}", segment.stype);
        add_field!(builder, "offset", "{:x}", segment.offset);
        add_field!(builder, "vaddr", "{:x}", segment.vaddr);
        add_field!(builder, "file size", "{:x}", segment.file_size);
        add_field!(builder, "memory size", "{:x}", segment.mem_size);
        add_field!(builder, "flags", ProgramHeader::flags(segment.flags));
        if !found_bias && segment.is_load_base() {
            add_field!(builder, "note", "load bias");
            found_bias = true;
        } else {
            add_field!(builder, "note", "");
        }
    }

    builder.writeln(&mut out, args.titles, args.explain);
    if args.explain {
        uwriteln!(out);
        uwriteln!(out, "Numeric fields are all in hex.");
    }
}

pub fn elf_sections(session: &Session, args: &TableArgs, out: impl Write) {
    let Some(file) = session.open() else {
        return;
    };

    let mut builder = TableBuilder::new();
    builder.add_col_r("index", "index into sections");
    builder.add_col_l("name", "section name, or the string index if that can't be read");
    builder.add_col_l("type", "type of the section");
    builder.add_col_r(
        "offset",
        "offset into the ELF file for the start of the section (hex)",
    );
    builder.add_col_r("size", "section size in bytes (hex)");
    builder.add_col_r("entry_size", "set if the section holds a table of entries");
    builder.add_col_r("align", "section alignment");
    builder.add_col_r(
        "link",
        "link to another section with related information, usually a string table",
    );
    builder.add_col_l("flags", "write, alloc, exec, etc");

    for (i, section) in file.sections.iter().enumerate() {
        add_field!(builder, "index", i);
        match file.find_section_name(SectionIndex(i as u32)) {
            Some(name) => {
                add_field!(builder, "name", name);
            }
            None => {
                add_field!(builder, "name", section.name.0);
            }
        }
        add_field!(builder, "type", "{:?}", section.stype);
        add_field!(builder, "offset", "{:x}", section.obytes.start.0);
        add_field!(builder, "size", "{:x}", section.obytes.size);
        add_field!(builder, "entry_size", section.entry_size);
        add_field!(builder, "align", section.align);
        add_field!(builder, "link", section.link);
        add_field!(builder, "flags", SectionHeader::flags(section.flags));
    }

    builder.writeln(out, args.titles, args.explain);
}

pub fn elf_notes(session: &Session, args: &TableArgs, mut out: impl Write) {
    let Some(file) = session.open() else {
        return;
    };

    let mut builder = TableBuilder::new();
    builder.add_col_l("provider", "probe namespace, e.g. the library or program");
    builder.add_col_l("name", "probe name");
    builder.add_col_r("pc", "link-time address of the probe site (hex)");
    builder.add_col_r("base", "link-time address of .stapsdt.base (hex)");
    builder.add_col_r("semaphore", "address of the enable counter, zero if none (hex)");

    for note in sdt_notes(&file) {
        add_field!(builder, "provider", note.provider);
        add_field!(builder, "name", note.name);
        add_field!(builder, "pc", "{:x}", note.pc);
        add_field!(builder, "base", "{:x}", note.base);
        add_field!(builder, "semaphore", "{:x}", note.semaphore);
    }

    if builder.num_rows() == 0 {
        uwriteln!(out, "no stapsdt notes");
    } else {
        builder.writeln(out, args.titles, args.explain);
    }
}
