//! EEPROM encoding: write a decoded [`EepromFields`] struct back into its image.
//!
//! Building rewrites an existing image in place. The string table must
//! already start at [`STRING_TABLE_START`]; the three strings are repacked
//! there and the checksum is recomputed. Bytes the record does not model
//! (including whatever follows the new string table) are left as they were.

use log::debug;

use crate::constants::*;
use crate::error::{Error, Result};

use super::checksum::write_checksum;
use super::strings::{pack_string, DescriptorPointer};
use super::types::check_image_size;
use super::EepromFields;

/// Find where the current image's string table begins.
///
/// This is the lowest offset any of the three descriptor pointers refers to.
pub fn string_table_start(buf: &[u8], size: usize) -> usize {
    [
        MANUFACTURER_POINTER_OFFSET,
        PRODUCT_POINTER_OFFSET,
        SERIAL_POINTER_OFFSET,
    ]
    .into_iter()
    .map(|at| DescriptorPointer::read(buf, size, at).offset)
    .min()
    .unwrap_or(0)
}

/// Point all three descriptors at an empty string table at 0x1A.
///
/// Turns a zero-filled buffer into one [`build`] accepts.
pub fn prepare_string_table(buf: &mut [u8], size: usize) -> Result<()> {
    check_image_size(size)?;
    for at in [
        MANUFACTURER_POINTER_OFFSET,
        PRODUCT_POINTER_OFFSET,
        SERIAL_POINTER_OFFSET,
    ] {
        buf[at] = (STRING_TABLE_START | size) as u8;
        buf[at + 1] = 0;
    }
    Ok(())
}

/// Build the first `size` bytes of `buf` from `fields`.
///
/// Precondition: `buf` holds a conforming image (decoded earlier, or
/// prepared with [`prepare_string_table`]). Returns the offset just past the
/// packed string table. On error `buf` is left unmodified.
pub fn build(buf: &mut [u8], size: usize, fields: &EepromFields) -> Result<usize> {
    check_image_size(size)?;
    if buf.len() < size {
        return Err(Error::Format(format!(
            "buffer holds {} bytes, image size is {size}",
            buf.len()
        )));
    }

    let start = string_table_start(buf, size);
    if start != STRING_TABLE_START {
        return Err(Error::Format(format!(
            "strings start at {start:#04x}, expected {STRING_TABLE_START:#04x}"
        )));
    }

    let mut image = buf[..size].to_vec();

    image[VENDOR_ID_OFFSET..VENDOR_ID_OFFSET + 2].copy_from_slice(&fields.vendor_id.to_le_bytes());
    image[PRODUCT_ID_OFFSET..PRODUCT_ID_OFFSET + 2]
        .copy_from_slice(&fields.product_id.to_le_bytes());
    image[RELEASE_NUMBER_OFFSET..RELEASE_NUMBER_OFFSET + 2]
        .copy_from_slice(&fields.release_number.to_le_bytes());

    let mut cfg = image[CONFIG_ATTRIBUTES_OFFSET] & !(ATTR_SELF_POWERED | ATTR_REMOTE_WAKEUP);
    if fields.self_powered {
        cfg |= ATTR_SELF_POWERED;
    }
    if fields.remote_wakeup {
        cfg |= ATTR_REMOTE_WAKEUP;
    }
    image[CONFIG_ATTRIBUTES_OFFSET] = cfg;
    image[MAX_POWER_OFFSET] = (fields.max_power / MAX_POWER_MILLIAMP_PER_UNIT).min(0xFF) as u8;

    // Manufacturer, product, serial: the order is part of the format.
    let mut pos = start;
    pos = pack_string(&mut image, size, pos, MANUFACTURER_POINTER_OFFSET, &fields.manufacturer)?;
    pos = pack_string(&mut image, size, pos, PRODUCT_POINTER_OFFSET, &fields.product)?;
    pos = pack_string(&mut image, size, pos, SERIAL_POINTER_OFFSET, &fields.serial)?;

    let csum = write_checksum(&mut image, size);
    debug!("built {size}-byte image, strings end at {pos:#04x}, checksum {csum:#06x}");

    buf[..size].copy_from_slice(&image);
    Ok(pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eeprom::{checksum, decode::decode};

    fn blank(size: usize) -> Vec<u8> {
        let mut buf = vec![0u8; size];
        prepare_string_table(&mut buf, size).unwrap();
        buf
    }

    #[test]
    fn prepared_pointers() {
        let buf = blank(128);
        assert_eq!(&buf[0x0E..0x14], &[0x9A, 0, 0x9A, 0, 0x9A, 0]);
        assert_eq!(string_table_start(&buf, 128), STRING_TABLE_START);
    }

    #[test]
    fn order_is_manufacturer_product_serial() {
        let mut buf = blank(256);
        let fields = EepromFields {
            manufacturer: "A".into(),
            product: "B".into(),
            serial: "C".into(),
            ..Default::default()
        };
        let end = build(&mut buf, 256, &fields).unwrap();
        assert_eq!(end, 0x1A + 12);
        assert_eq!(
            &buf[0x1A..0x26],
            &[4, 3, b'A', 0, 4, 3, b'B', 0, 4, 3, b'C', 0]
        );
        assert_eq!(&buf[0x0E..0x14], &[0x1A, 4, 0x1E, 4, 0x22, 4]);
    }

    #[test]
    fn ftdi_scenario() {
        let mut buf = vec![0u8; 128];
        buf[2..6].copy_from_slice(&[0x03, 0x04, 0x01, 0x60]);
        prepare_string_table(&mut buf, 128).unwrap();

        let mut fields = decode(&buf, 128).unwrap();
        assert_eq!(fields.vendor_id, 0x0403);
        assert_eq!(fields.product_id, 0x6001);
        fields.set_strings(Some("FTDI"), Some("X"), Some("1"));

        build(&mut buf, 128, &fields).unwrap();
        assert_eq!(checksum::stored_checksum(&buf, 128).unwrap(), checksum::checksum(&buf[..126], 128));

        let decoded = decode(&buf, 128).unwrap();
        assert_eq!(decoded, fields);
        assert_eq!(decoded.strings(), ("FTDI", "X", "1"));
    }

    #[test]
    fn relocated_table_is_rejected_untouched() {
        let mut buf = blank(128);
        buf[PRODUCT_POINTER_OFFSET] = 0x80 | 0x20;
        buf[SERIAL_POINTER_OFFSET] = 0x80 | 0x18;
        let before = buf.clone();

        let fields = EepromFields {
            vendor_id: 0x1234,
            ..Default::default()
        };
        assert!(matches!(build(&mut buf, 128, &fields), Err(Error::Format(_))));
        assert_eq!(buf, before);
    }

    #[test]
    fn overflow_is_rejected_untouched() {
        let mut buf = blank(128);
        let before = buf.clone();
        let fields = EepromFields {
            vendor_id: 0x1234,
            manufacturer: "m".repeat(20),
            product: "p".repeat(20),
            serial: "s".repeat(20),
            ..Default::default()
        };
        assert!(matches!(
            build(&mut buf, 128, &fields),
            Err(Error::OutOfSpace { available: 126, .. })
        ));
        assert_eq!(buf, before);
    }

    #[test]
    fn large_image_refuses_unaddressable_strings() {
        // The manufacturer ends at 0x10C, past what a pointer byte can
        // reach, although the whole table would fit in 512 bytes.
        let mut buf = blank(512);
        let before = buf.clone();
        let fields = EepromFields {
            manufacturer: "m".repeat(120),
            product: "B".into(),
            serial: "C".into(),
            ..Default::default()
        };
        assert!(matches!(
            build(&mut buf, 512, &fields),
            Err(Error::OutOfSpace { available: 0x100, .. })
        ));
        assert_eq!(buf, before);

        let fields = EepromFields {
            manufacturer: "m".repeat(100),
            ..fields
        };
        assert_eq!(build(&mut buf, 512, &fields).unwrap(), 0x1A + 202 + 4 + 4);
    }

    #[test]
    fn preserves_unmodelled_bytes() {
        let mut buf = blank(128);
        buf[0x00] = 0x08;
        buf[0x08] = 0x80;
        buf[0x0A] = 0x08;
        buf[0x16] = 0x46;
        let fields = EepromFields {
            self_powered: true,
            ..Default::default()
        };
        build(&mut buf, 128, &fields).unwrap();
        assert_eq!(buf[0x00], 0x08);
        assert_eq!(buf[0x08], 0xC0);
        assert_eq!(buf[0x0A], 0x08);
        assert_eq!(buf[0x16], 0x46);
        assert_eq!(buf[0x09], 50);
    }
}
