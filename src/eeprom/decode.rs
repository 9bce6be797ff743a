//! EEPROM decoding: parse a binary EEPROM image into an [`EepromFields`] struct.

use log::{debug, warn};

use crate::constants::*;
use crate::error::{Error, Result};

use super::checksum;
use super::strings::decode_string;
use super::types::check_image_size;
use super::EepromFields;

/// Decode the first `size` bytes of `buf` into an [`EepromFields`] structure.
///
/// A checksum mismatch is logged but does not fail the decode: blank and
/// foreign-format chips are ordinary input. A descriptor pointer outside the
/// string table is a [`Error::Format`].
pub fn decode(buf: &[u8], size: usize) -> Result<EepromFields> {
    check_image_size(size)?;
    if buf.len() < size {
        return Err(Error::Format(format!(
            "buffer holds {} bytes, image size is {size}",
            buf.len()
        )));
    }

    let computed = checksum::checksum(buf, size);
    let stored = checksum::stored_checksum(buf, size)?;
    if computed != stored {
        warn!("EEPROM checksum mismatch: stored {stored:#06x}, computed {computed:#06x}");
    }

    let attributes = buf[CONFIG_ATTRIBUTES_OFFSET];
    let fields = EepromFields {
        vendor_id: read_u16(buf, VENDOR_ID_OFFSET),
        product_id: read_u16(buf, PRODUCT_ID_OFFSET),
        release_number: read_u16(buf, RELEASE_NUMBER_OFFSET),
        self_powered: attributes & ATTR_SELF_POWERED != 0,
        remote_wakeup: attributes & ATTR_REMOTE_WAKEUP != 0,
        max_power: buf[MAX_POWER_OFFSET] as u16 * MAX_POWER_MILLIAMP_PER_UNIT,
        manufacturer: decode_string(buf, size, MANUFACTURER_POINTER_OFFSET)?,
        product: decode_string(buf, size, PRODUCT_POINTER_OFFSET)?,
        serial: decode_string(buf, size, SERIAL_POINTER_OFFSET)?,
    };

    debug!(
        "decoded {size}-byte image: {:04x}:{:04x} {:?} {:?} {:?}",
        fields.vendor_id, fields.product_id, fields.manufacturer, fields.product, fields.serial
    );
    Ok(fields)
}

fn read_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}
