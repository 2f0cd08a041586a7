use super::Session;
use super::tables::{TableBuilder, add_field};
use crate::probes::{ExtractMode, SymbolList};
use crate::repl::{ListArgs, ResolveArgs};
use crate::utils::{Styling, uwriteln};
use std::io::Write;

pub fn symbols(session: &Session, args: &ListArgs, out: impl Write) {
    let list = session.extractor(ExtractMode::Symbols).extract(&session.path);
    write_list(
        &list,
        args,
        ("function name", "offset of the function from the load bias (hex)"),
        out,
    );
}

pub fn probes(session: &Session, args: &ListArgs, out: impl Write) {
    let list = session.extractor(ExtractMode::ProbeNotes).extract(&session.path);
    write_list(
        &list,
        args,
        ("SDT probe name", "link-time address of the probe site (hex)"),
        out,
    );
}

pub fn resolve(session: &Session, args: &ResolveArgs, mut out: impl Write) {
    let mode = if args.probe {
        ExtractMode::ProbeNotes
    } else {
        ExtractMode::Symbols
    };
    let list = session.extractor(mode).extract(&session.path);
    let addresses = list.addresses(&args.name);
    if addresses.is_empty() {
        uwriteln!(out, "couldn't find {}", args.name);
    }
    for addr in addresses {
        uwriteln!(
            out,
            "{} {}",
            args.name.as_str().symbol_name(),
            format!("0x{addr:x}").address()
        );
    }
}

fn write_list(
    list: &SymbolList,
    args: &ListArgs,
    (name_help, addr_help): (&str, &str),
    mut out: impl Write,
) {
    let mut builder = TableBuilder::new();
    builder.add_col_l("name", name_help);
    builder.add_col_r("address", addr_help);

    let matching = list.iter().filter(|s| {
        args.filter
            .as_ref()
            .is_none_or(|filter| s.name.contains(filter.as_str()))
    });
    let mut count = 0;
    for symbol in matching {
        count += 1;
        if args.max_results == 0 || count <= args.max_results {
            add_field!(builder, "name", symbol.name);
            add_field!(builder, "address", "{:x}", symbol.address);
        }
    }

    if count == 0 {
        uwriteln!(out, "none found");
        return;
    }
    builder.writeln(&mut out, args.titles, args.explain);
    if builder.num_rows() < count {
        uwriteln!(out, "... {} more", count - builder.num_rows());
    }
}
