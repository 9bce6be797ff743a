//! The running checksum stored in the last word of every image.

use crate::constants::{CHECKSUM_SEED, CHECKSUM_SIZE};
use crate::error::{Error, Result};

/// Compute the EEPROM checksum over the first `size` bytes of `buf`.
///
/// The algorithm is: XOR each little-endian 16-bit word into the
/// accumulator, then rotate-left-1 the accumulator. Starting seed is 0xAAAA.
/// The final word (the stored checksum itself) is not covered.
pub fn checksum(buf: &[u8], size: usize) -> u16 {
    let covered = size.saturating_sub(CHECKSUM_SIZE).min(buf.len());
    buf[..covered]
        .chunks_exact(2)
        .fold(CHECKSUM_SEED, |csum, word| {
            let value = u16::from_le_bytes([word[0], word[1]]);
            (csum ^ value).rotate_left(1)
        })
}

/// Read the checksum stored in the last two bytes of a `size`-byte image.
pub fn stored_checksum(buf: &[u8], size: usize) -> Result<u16> {
    if size < CHECKSUM_SIZE || buf.len() < size {
        return Err(Error::Format(format!(
            "buffer holds {} bytes, cannot read the checksum of a {size}-byte image",
            buf.len()
        )));
    }
    Ok(u16::from_le_bytes([buf[size - 2], buf[size - 1]]))
}

/// Recompute the checksum and store it in the last two bytes, low byte first.
pub(crate) fn write_checksum(buf: &mut [u8], size: usize) -> u16 {
    let csum = checksum(buf, size);
    buf[size - 2..size].copy_from_slice(&csum.to_le_bytes());
    csum
}

/// Whether the stored checksum matches the contents.
pub fn verify(buf: &[u8], size: usize) -> bool {
    matches!(stored_checksum(buf, size), Ok(stored) if stored == checksum(buf, size))
}
