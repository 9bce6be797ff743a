//! The string table: three USB string descriptors packed after the fixed
//! field region, each located by a two-byte pointer in the fixed region.
//!
//! On the wire a pointer is `(offset | image size) as u8` followed by the
//! descriptor length. Reading masks the offset byte with `size - 1`; the
//! result is carried around as an explicit [`DescriptorPointer`] and checked
//! against the string table bounds before anything is dereferenced.

use log::{debug, warn};

use crate::constants::*;
use crate::error::{Error, Result};

/// A decoded descriptor pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorPointer {
    /// Start of the descriptor within the image.
    pub offset: usize,
    /// Descriptor length in bytes, header included.
    pub len: u8,
}

impl DescriptorPointer {
    /// Read the pointer stored at `at` in a `size`-byte image.
    pub fn read(buf: &[u8], size: usize, at: usize) -> Self {
        Self {
            offset: (buf[at] as usize) & (size - 1),
            len: buf[at + 1],
        }
    }

    /// Store the pointer at `at` in a `size`-byte image.
    fn write(self, buf: &mut [u8], size: usize, at: usize) {
        buf[at] = (self.offset | size) as u8;
        buf[at + 1] = self.len;
    }

    /// Check that the pointer lands inside the string table.
    pub fn check(self, size: usize) -> Result<()> {
        if self.offset < STRING_TABLE_START || self.offset >= size {
            return Err(Error::Format(format!(
                "string descriptor at {:#04x} is outside {STRING_TABLE_START:#04x}..{size:#x}",
                self.offset
            )));
        }
        Ok(())
    }
}

/// The first `size` bytes of `buf` must exist and hold the fixed region and
/// the checksum.
fn check_buffer(buf: &[u8], size: usize) -> Result<()> {
    if size < STRING_TABLE_START + CHECKSUM_SIZE || buf.len() < size {
        return Err(Error::Format(format!(
            "buffer holds {} bytes, image size is {size}",
            buf.len()
        )));
    }
    Ok(())
}

/// Encoded size of `text` as a string descriptor: header plus UTF-16LE units.
pub fn descriptor_len(text: &str) -> usize {
    text.encode_utf16().count() * 2 + 2
}

/// Pack `text` as a string descriptor at `cursor` and point the descriptor
/// pointer at `pointer_at` to it.
///
/// Returns the cursor just past the written descriptor. Nothing is written
/// when the descriptor would run into the checksum trailer, would not be
/// addressable by a one-byte pointer, or is too long for its length byte.
pub fn pack_string(
    buf: &mut [u8],
    size: usize,
    cursor: usize,
    pointer_at: usize,
    text: &str,
) -> Result<usize> {
    check_buffer(buf, size)?;
    let total_len = descriptor_len(text);
    let available = size - CHECKSUM_SIZE;

    if cursor + total_len > available {
        return Err(Error::OutOfSpace {
            needed: cursor + total_len,
            available,
        });
    }
    // The pointer keeps only the low byte of the offset (plus the size bit).
    if ((cursor | size) as u8 as usize) & (size - 1) != cursor {
        return Err(Error::OutOfSpace {
            needed: cursor + total_len,
            available: 0x100,
        });
    }
    let len = u8::try_from(total_len).map_err(|_| Error::OutOfSpace {
        needed: total_len,
        available: u8::MAX as usize,
    })?;

    DescriptorPointer {
        offset: cursor,
        len,
    }
    .write(buf, size, pointer_at);

    let mut pos = cursor;
    buf[pos] = len;
    buf[pos + 1] = STRING_DESCRIPTOR_TAG;
    pos += 2;

    for unit in text.encode_utf16() {
        buf[pos..pos + 2].copy_from_slice(&unit.to_le_bytes());
        pos += 2;
    }

    Ok(pos)
}

/// Decode the string descriptor referenced by the pointer at `pointer_at`.
pub fn decode_string(buf: &[u8], size: usize, pointer_at: usize) -> Result<String> {
    check_buffer(buf, size)?;
    let pointer = DescriptorPointer::read(buf, size, pointer_at);
    pointer.check(size)?;

    let start = pointer.offset;
    let raw_len = buf[start] as usize;
    if raw_len < 2 {
        debug!("empty string descriptor at {start:#04x}");
        return Ok(String::new());
    }
    if start + raw_len > size - CHECKSUM_SIZE {
        return Err(Error::Format(format!(
            "string descriptor at {start:#04x} ({raw_len} bytes) runs into the checksum"
        )));
    }
    if buf[start + 1] != STRING_DESCRIPTOR_TAG {
        warn!(
            "string descriptor at {start:#04x} has tag {:#04x}, expected {STRING_DESCRIPTOR_TAG:#04x}",
            buf[start + 1]
        );
    }
    if raw_len != pointer.len as usize {
        warn!(
            "string descriptor at {start:#04x} is {raw_len} bytes, pointer says {}",
            pointer.len
        );
    }

    let units: Vec<u16> = buf[start + 2..start + raw_len]
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    Ok(String::from_utf16_lossy(&units))
}
