//! Handlers for the commands users type, e.g. `probes -t`.
pub mod elf;
pub mod probes;
pub mod tables;

pub use elf::*;
pub use probes::*;

use crate::elf::ElfFile;
use crate::probes::{ExtractMode, Extractor};
use crate::utils;
use std::path::PathBuf;

/// What the commands work on. The image is re-opened by every command so that a rebuilt
/// image is picked up without restarting.
pub struct Session {
    pub path: PathBuf,
    pub max_symbols: Option<usize>,
}

impl Session {
    pub fn new(path: PathBuf, max_symbols: Option<usize>) -> Self {
        Session { path, max_symbols }
    }

    pub fn extractor(&self, mode: ExtractMode) -> Extractor {
        Extractor::new(mode).with_max_symbols(self.max_symbols)
    }

    fn open(&self) -> Option<ElfFile> {
        match ElfFile::new(self.path.clone()) {
            Ok(elf) => Some(elf),
            Err(err) => {
                utils::warn(&format!("couldn't load {}: {err}", self.path.display()));
                None
            }
        }
    }
}
