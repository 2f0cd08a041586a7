/// Index into the section table.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct SectionIndex(pub u32);

/// Index into a string table.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct StringIndex(pub u32);

/// An index into a byte within an ELF file.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct Offset(pub u64);

/// The address of a byte once the image has been loaded. For executables these are
/// link-time addresses: the loader may slide them (see `find_load_bias`).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct VirtualAddr(pub u64);

/// A range of bytes within an ELF file.
#[derive(Copy, Clone, Debug)]
pub struct Bytes<A> {
    pub start: A,
    pub size: u64,
}

impl Bytes<Offset> {
    pub fn from_raw(start: u64, size: u64) -> Self {
        Bytes {
            start: Offset(start),
            size,
        }
    }

    /// One past the last byte. Adversarial headers can make this overflow so it
    /// saturates.
    pub fn end(&self) -> Offset {
        Offset(self.start.0.saturating_add(self.size))
    }
}
