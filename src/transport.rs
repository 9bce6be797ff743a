//! The seam between the image pipeline and whatever moves bytes to and from
//! a chip.

use crate::error::Result;

/// A device whose EEPROM can be read and written as one flat image.
///
/// [`FtdiDevice`](crate::FtdiDevice) is the USB implementation; tests use
/// in-memory ones.
pub trait EepromTransport {
    /// Size of the device's EEPROM in bytes.
    fn eeprom_size(&self) -> usize;

    /// Read the whole EEPROM. The result is exactly
    /// [`eeprom_size`](Self::eeprom_size) bytes long.
    fn read_eeprom(&mut self) -> Result<Vec<u8>>;

    /// Write a whole image. `image` must be exactly
    /// [`eeprom_size`](Self::eeprom_size) bytes long.
    fn write_eeprom(&mut self, image: &[u8]) -> Result<()>;
}
