//! Text views of images and records, used by the verbose and dump options.

use std::fmt;

use crate::eeprom::{EepromFields, Slot};

const BYTES_PER_ROW: usize = 16;
const FIELD_WIDTH: usize = 22;
const GAP_WIDTH: usize = 2;

/// Classic hex dump: offset, 16 bytes split in two groups of 8, ASCII column.
#[derive(Debug, Clone, Copy)]
pub struct HexDump<'a> {
    bytes: &'a [u8],
}

impl<'a> HexDump<'a> {
    /// Wrap a byte slice for display.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }
}

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, chunk) in self.bytes.chunks(BYTES_PER_ROW).enumerate() {
            write!(f, "{:08x}", row * BYTES_PER_ROW)?;
            for i in 0..BYTES_PER_ROW {
                if i % 8 == 0 {
                    f.write_str(" ")?;
                }
                match chunk.get(i) {
                    Some(b) => write!(f, " {b:02x}")?,
                    None => f.write_str("   ")?,
                }
            }
            f.write_str("  ")?;
            for i in 0..BYTES_PER_ROW {
                let ch = match chunk.get(i) {
                    Some(&b) if (0x20..=0x7E).contains(&b) => b as char,
                    _ => '.',
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// One slot's record, one field per line.
#[derive(Debug, Clone, Copy)]
pub struct SlotView<'a> {
    slot: Slot,
    fields: &'a EepromFields,
}

impl<'a> SlotView<'a> {
    /// Wrap a record for display.
    pub fn new(slot: Slot, fields: &'a EepromFields) -> Self {
        Self { slot, fields }
    }
}

impl fmt::Display for SlotView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ee = self.fields;
        writeln!(f, "---------- < {} > ----------", self.slot.label())?;
        writeln!(f, " vendor ID: 0x{:04x}", ee.vendor_id)?;
        writeln!(f, "product ID: 0x{:04x}", ee.product_id)?;
        writeln!(f, "Manufacturer: {}", ee.manufacturer)?;
        writeln!(f, "Product:      {}", ee.product)?;
        writeln!(f, "Serial:       {}", ee.serial)
    }
}

/// Both records side by side.
#[derive(Debug, Clone, Copy)]
pub struct InOutView<'a> {
    input: &'a EepromFields,
    output: &'a EepromFields,
}

impl<'a> InOutView<'a> {
    /// Wrap both records for display.
    pub fn new(input: &'a EepromFields, output: &'a EepromFields) -> Self {
        Self { input, output }
    }

    fn row(&self, f: &mut fmt::Formatter<'_>, label: &str, a: &str, b: &str) -> fmt::Result {
        writeln!(
            f,
            "{label:<15}{a:>w$}{:gap$}{b:>w$}",
            "",
            w = FIELD_WIDTH,
            gap = GAP_WIDTH
        )
    }
}

impl fmt::Display for InOutView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (i, o) = (self.input, self.output);
        writeln!(f, "               -----===   IN ===-----  -----===  OUT ===-----")?;
        self.row(f, " vendor ID:", &format!("{:04x}", i.vendor_id), &format!("{:04x}", o.vendor_id))?;
        self.row(f, "product ID:", &format!("{:04x}", i.product_id), &format!("{:04x}", o.product_id))?;
        self.row(f, "Self powered:", &i.self_powered.to_string(), &o.self_powered.to_string())?;
        self.row(f, "Max power:", &i.max_power.to_string(), &o.max_power.to_string())?;
        self.row(f, "Manufacturer:", &i.manufacturer, &o.manufacturer)?;
        self.row(f, "Product:", &i.product, &o.product)?;
        self.row(f, "Serial:", &i.serial, &o.serial)
    }
}
