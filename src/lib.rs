//! Finds the function symbols and SystemTap SDT probes of an ELF executable or shared
//! object without running it. Function addresses are offsets from the load bias so they
//! can be added to wherever the image gets mapped. Probe addresses are the link-time
//! addresses recorded in the notes.
//!
//! ```no_run
//! use dsosyms::{ExtractMode, extract};
//!
//! for probe in extract("/usr/bin/python3", ExtractMode::ProbeNotes).iter() {
//!     println!("{} {:x}", probe.name, probe.address);
//! }
//! ```
pub mod commands;
pub mod elf;
pub mod probes;
pub mod repl;
pub mod utils;

pub use probes::{ExtractMode, Extractor, ListFull, Symbol, SymbolList, extract};
