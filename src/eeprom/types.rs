//! EEPROM data types and structures.

use crate::constants::*;
use crate::error::{Error, Result};

/// One of the two images held during an edit.
///
/// `In` is what was read; `Out` is what will be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The image as read from the chip or a file.
    In,
    /// The image that will be written to the chip or a file.
    Out,
}

impl Slot {
    /// Both slots, `In` first.
    pub const ALL: [Slot; 2] = [Slot::In, Slot::Out];

    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            Self::In => 0,
            Self::Out => 1,
        }
    }

    /// Short label used in dumps and log lines.
    pub fn label(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
        }
    }
}

/// Decoded EEPROM contents.
///
/// Populated by [`decode`](super::decode::decode) and consumed by
/// [`build`](super::build::build). Fields that this layout does not model
/// stay in the byte image untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EepromFields {
    // ---- Identification ----
    /// USB Vendor ID.
    pub vendor_id: u16,
    /// USB Product ID.
    pub product_id: u16,
    /// Device release number (bcdDevice).
    pub release_number: u16,

    // ---- Power / USB configuration ----
    /// Device is self-powered (vs bus-powered).
    pub self_powered: bool,
    /// Device supports USB remote wakeup.
    pub remote_wakeup: bool,
    /// Maximum power consumption in mA.
    pub max_power: u16,

    // ---- String descriptors ----
    /// Manufacturer name.
    pub manufacturer: String,
    /// Product description.
    pub product: String,
    /// Serial number.
    pub serial: String,
}

impl Default for EepromFields {
    fn default() -> Self {
        Self {
            vendor_id: FTDI_VID,
            product_id: pid::FT232,
            release_number: 0,
            self_powered: false,
            remote_wakeup: false,
            max_power: 100,
            manufacturer: String::new(),
            product: String::new(),
            serial: String::new(),
        }
    }
}

impl EepromFields {
    /// Get the EEPROM strings as a tuple.
    pub fn strings(&self) -> (&str, &str, &str) {
        (&self.manufacturer, &self.product, &self.serial)
    }

    /// Replace any of the three descriptor strings.
    pub fn set_strings(
        &mut self,
        manufacturer: Option<&str>,
        product: Option<&str>,
        serial: Option<&str>,
    ) {
        if let Some(m) = manufacturer {
            self.manufacturer = m.to_owned();
        }
        if let Some(p) = product {
            self.product = p.to_owned();
        }
        if let Some(s) = serial {
            self.serial = s.to_owned();
        }
    }
}

/// Check that `size` is an image length the layout can address.
///
/// Descriptor pointers are masked with `size - 1`, so the size has to be a
/// power of two large enough to hold the fixed region and the checksum.
pub fn check_image_size(size: usize) -> Result<()> {
    if !size.is_power_of_two() || !(MIN_EEPROM_SIZE..=MAX_EEPROM_SIZE).contains(&size) {
        return Err(Error::Format(format!(
            "image size {size:#x} is not a power of two in {MIN_EEPROM_SIZE:#x}..={MAX_EEPROM_SIZE:#x}"
        )));
    }
    Ok(())
}
