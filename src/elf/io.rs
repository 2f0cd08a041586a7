use crate::utils;
use memmap2::{Mmap, MmapMut};
use std::error::Error;

const EI_NIDENT: usize = 16;
const ELF32_HEADER_SIZE: usize = 52;

/// Size of addresses and offsets, set by EI_CLASS.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WordWidth {
    Bits32,
    Bits64,
}

/// Data encoding, set by EI_DATA.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl WordWidth {
    pub fn from_class(ei_class: u8) -> Result<Self, Box<dyn Error>> {
        match ei_class {
            1 => Ok(WordWidth::Bits32),
            2 => Ok(WordWidth::Bits64),
            _ => Err(format!("unsupported elf class: {ei_class}").into()),
        }
    }

    /// Number of bytes used on disk for an address.
    pub fn bytes(self) -> usize {
        match self {
            WordWidth::Bits32 => 4,
            WordWidth::Bits64 => 8,
        }
    }

    /// File size of count addresses.
    pub fn fsize(self, count: usize) -> usize {
        self.bytes() * count
    }
}

impl ByteOrder {
    pub fn from_data(ei_data: u8) -> Result<Self, Box<dyn Error>> {
        match ei_data {
            1 => Ok(ByteOrder::Little),
            2 => Ok(ByteOrder::Big),
            _ => Err(format!("unsupported elf data encoding: {ei_data}").into()),
        }
    }

    pub fn u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Little => u16::from_le_bytes(bytes),
            ByteOrder::Big => u16::from_be_bytes(bytes),
        }
    }

    pub fn u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        }
    }

    pub fn u64(self, bytes: [u8; 8]) -> u64 {
        match self {
            ByteOrder::Little => u64::from_le_bytes(bytes),
            ByteOrder::Big => u64::from_be_bytes(bytes),
        }
    }
}

/// Translates a block of on-disk addresses into native u64s. src must hold exactly
/// dst.len() addresses of the given width. Returns the number of bytes consumed.
pub fn xlate_addrs(
    src: &[u8],
    width: WordWidth,
    order: ByteOrder,
    dst: &mut [u64],
) -> Result<usize, Box<dyn Error>> {
    let size = width.fsize(dst.len());
    utils::require(
        src.len() == size,
        &format!("can't translate {} bytes into {} addresses", src.len(), dst.len()),
    )?;

    let chunks = src.chunks_exact(width.bytes());
    for (addr, chunk) in dst.iter_mut().zip(chunks) {
        *addr = match width {
            WordWidth::Bits32 => order.u32(chunk.try_into()?) as u64,
            WordWidth::Bits64 => order.u64(chunk.try_into()?),
        };
    }
    Ok(size)
}

/// Bounds checked access to the bytes of an ELF image. The accessors all return a
/// Result because images can be truncated or corrupted and we want to keep going as
/// well as we can when that happens.
pub struct Reader {
    pub order: ByteOrder,
    pub width: WordWidth,
    bytes: Mmap,
}

impl Reader {
    pub fn new(bytes: Mmap) -> Result<Self, Box<dyn Error>> {
        // see https://en.wikipedia.org/wiki/Executable_and_Linkable_Format
        utils::require(bytes.len() >= ELF32_HEADER_SIZE, "image is much too small")?;
        let ident = &bytes[0..EI_NIDENT];
        utils::require(
            ident[0] == 0x7f && ident[1] == b'E' && ident[2] == b'L' && ident[3] == b'F',
            "not an ELF image (bad magic)",
        )?;

        let width = WordWidth::from_class(ident[4])?;
        let order = ByteOrder::from_data(ident[5])?;
        let ei_version = ident[6];
        utils::require(ei_version == 1, &format!("bad elf version: {ei_version}"))?;

        Ok(Reader {
            bytes,
            width,
            order,
        })
    }

    /// Copies bytes into an anonymous mapping. Handy for images that never hit the disk.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Box<dyn Error>> {
        utils::require(!bytes.is_empty(), "image is empty")?;
        let mut map = MmapMut::map_anon(bytes.len())?;
        map.copy_from_slice(bytes);
        Reader::new(map.make_read_only()?)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn slice(&self, offset: usize, size: usize) -> Result<&[u8], Box<dyn Error>> {
        let end = offset.checked_add(size).ok_or("slice overflows")?;
        self.bytes
            .get(offset..end)
            .ok_or_else(|| format!("slice {offset:x}..{end:x} is out of bounds").into())
    }

    pub fn read_byte(&self, offset: usize) -> Result<u8, Box<dyn Error>> {
        self.bytes
            .get(offset)
            .ok_or("couldn't read byte at offset".into())
            .copied()
    }

    pub fn read_half(&self, offset: usize) -> Result<u16, Box<dyn Error>> {
        let slice = self.slice(offset, 2)?;
        Ok(self.order.u16(slice.try_into()?))
    }

    pub fn read_word(&self, offset: usize) -> Result<u32, Box<dyn Error>> {
        let slice = self.slice(offset, 4)?;
        Ok(self.order.u32(slice.try_into()?))
    }

    pub fn read_xword(&self, offset: usize) -> Result<u64, Box<dyn Error>> {
        let slice = self.slice(offset, 8)?;
        Ok(self.order.u64(slice.try_into()?))
    }

    /// Read either a u32 or u64 word depending on whether the image is 64-bit.
    /// But, for sanity, always return the result as 64 bits.
    pub fn read_addr(&self, offset: usize) -> Result<u64, Box<dyn Error>> {
        match self.width {
            WordWidth::Bits64 => self.read_xword(offset),
            WordWidth::Bits32 => Ok(self.read_word(offset)? as u64),
        }
    }
}

/// Sequential reads from a Reader.
pub struct Stream<'a> {
    pub reader: &'a Reader,
    pub offset: usize,
}

impl<'a> Stream<'a> {
    pub fn new(reader: &'a Reader, offset: usize) -> Self {
        Stream { reader, offset }
    }

    fn advance(&mut self, n: usize) -> Result<(), Box<dyn Error>> {
        self.offset = self.offset.checked_add(n).ok_or("stream offset overflows")?;
        Ok(())
    }

    pub fn read_byte(&mut self) -> Result<u8, Box<dyn Error>> {
        let byte = self.reader.read_byte(self.offset)?;
        self.advance(1)?;
        Ok(byte)
    }

    pub fn read_half(&mut self) -> Result<u16, Box<dyn Error>> {
        let half = self.reader.read_half(self.offset)?;
        self.advance(2)?;
        Ok(half)
    }

    pub fn read_word(&mut self) -> Result<u32, Box<dyn Error>> {
        let word = self.reader.read_word(self.offset)?;
        self.advance(4)?;
        Ok(word)
    }

    pub fn read_xword(&mut self) -> Result<u64, Box<dyn Error>> {
        let xword = self.reader.read_xword(self.offset)?;
        self.advance(8)?;
        Ok(xword)
    }

    pub fn read_addr(&mut self) -> Result<u64, Box<dyn Error>> {
        let addr = self.reader.read_addr(self.offset)?;
        self.advance(self.reader.width.bytes())?;
        Ok(addr)
    }

    /// Offsets have the same width as addresses.
    pub fn read_offset(&mut self) -> Result<u64, Box<dyn Error>> {
        self.read_addr()
    }
}

/// Splits bytes at the first NUL returning the string (without the NUL) and whatever
/// follows the NUL. None if there is no NUL.
pub fn split_cstr(bytes: &[u8]) -> Option<(&[u8], &[u8])> {
    let n = bytes.iter().position(|&b| b == 0)?;
    Some((&bytes[..n], &bytes[n + 1..]))
}
