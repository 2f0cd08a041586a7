//! Generic ELF support: enough to find the symbol tables and note sections of an
//! executable or shared object.
//! Quick ELF reference: https://gist.github.com/x0nu11byt3/bcb35c3de461e5fb66173071a2379779
//!
//! ELF files start with an ELF header which includes:
//! * A magic number to identify the file as an ELF file.
//! * The class (32 or 64-bit) and the byte order. These change the layout of nearly
//!   every other record.
//! * The offset to and number of program headers.
//! * The offset to and number of section headers.
//!
//! Program headers identify segments. Segments are used by the OS to load an exe into
//! memory. The load segment at file offset zero gives us the load bias: the link-time
//! address that the loader is free to move.
//!
//! Section headers identify sections. These have names (stored in yet another section),
//! and types like symbol table, string table, and note.
pub mod elf_file;
pub mod header;
pub mod io;
pub mod notes;
pub mod primitives;
pub mod sections;
pub mod segments;
pub mod symbols;

#[cfg(test)]
pub mod test_image;

pub use elf_file::*;
pub use header::*;
pub use io::*;
pub use notes::*;
pub use primitives::*;
pub use sections::*;
pub use segments::*;
pub use symbols::*;
