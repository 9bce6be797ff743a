//! Images stored as flat binary files, no header or framing.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, warn};

use crate::constants::MAX_EEPROM_SIZE;
use crate::error::{Error, Result};

/// Size of an input file in bytes, or 0 if it cannot be inspected.
pub fn file_size(path: impl AsRef<Path>) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Read an image file, keeping at most [`MAX_EEPROM_SIZE`] bytes.
pub fn read_image(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let mut data = Vec::with_capacity(MAX_EEPROM_SIZE);
    File::open(path)?
        .take(MAX_EEPROM_SIZE as u64)
        .read_to_end(&mut data)?;

    if data.is_empty() {
        return Err(Error::Options(format!(
            "input file {} is empty",
            path.display()
        )));
    }
    if file_size(path) > MAX_EEPROM_SIZE as u64 {
        warn!(
            "{} is larger than {MAX_EEPROM_SIZE} bytes, ignoring the rest",
            path.display()
        );
    }
    debug!("read {} bytes from {}", data.len(), path.display());
    Ok(data)
}

/// Write an image file, replacing any existing contents.
pub fn write_image(path: impl AsRef<Path>, image: &[u8]) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        warn!("output file {} already exists, overwriting", path.display());
    }
    std::fs::write(path, image)?;
    debug!("wrote {} bytes to {}", image.len(), path.display());
    Ok(())
}
