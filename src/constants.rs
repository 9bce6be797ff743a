//! Protocol and layout constants.
//!
//! The first group are the USB vendor requests used to move EEPROM words
//! between host and chip. The second group describes the one image layout
//! this crate understands.

// ---- FTDI Vendor ID and known Product IDs ----

/// Default FTDI vendor ID.
pub const FTDI_VID: u16 = 0x0403;

/// Known FTDI product IDs.
pub mod pid {
    /// FT232AM, FT232BM, FT232R.
    pub const FT232: u16 = 0x6001;
    /// FT2232C/D/H.
    pub const FT2232: u16 = 0x6010;
    /// FT4232H.
    pub const FT4232: u16 = 0x6011;
    /// FT232H.
    pub const FT232H: u16 = 0x6014;
    /// FT230X.
    pub const FT230X: u16 = 0x6015;
}

// ---- SIO vendor request codes ----

/// Reset the port.
pub(crate) const SIO_RESET_REQUEST: u8 = 0x00;
/// Read EEPROM.
pub(crate) const SIO_READ_EEPROM_REQUEST: u8 = 0x90;
/// Write EEPROM.
pub(crate) const SIO_WRITE_EEPROM_REQUEST: u8 = 0x91;

/// SIO reset (device reset).
pub(crate) const SIO_RESET_SIO: u16 = 0;

/// Number of bytes the chip exposes through the read request, regardless of
/// the part actually fitted. Smaller parts wrap around.
pub(crate) const FTDI_READABLE_EEPROM_SIZE: usize = 256;

// ---- Image layout ----

/// Largest image the codec accepts (93x86-class parts).
pub const MAX_EEPROM_SIZE: usize = 512;
/// Smallest image the codec accepts (93x46-class parts).
pub const MIN_EEPROM_SIZE: usize = 64;

/// Vendor ID, little-endian.
pub const VENDOR_ID_OFFSET: usize = 0x02;
/// Product ID, little-endian.
pub const PRODUCT_ID_OFFSET: usize = 0x04;
/// Release number (bcdDevice), little-endian.
pub const RELEASE_NUMBER_OFFSET: usize = 0x06;
/// USB configuration attributes byte.
pub const CONFIG_ATTRIBUTES_OFFSET: usize = 0x08;
/// Max power, in units of 2 mA.
pub const MAX_POWER_OFFSET: usize = 0x09;

/// Manufacturer string descriptor pointer (offset byte, length byte).
pub const MANUFACTURER_POINTER_OFFSET: usize = 0x0E;
/// Product string descriptor pointer.
pub const PRODUCT_POINTER_OFFSET: usize = 0x10;
/// Serial string descriptor pointer.
pub const SERIAL_POINTER_OFFSET: usize = 0x12;

/// First byte of the string table; 0x00..0x1A is the fixed field region.
pub const STRING_TABLE_START: usize = 0x1A;
/// Bytes reserved at the end of the image for the checksum.
pub const CHECKSUM_SIZE: usize = 2;
/// Starting value of the running checksum.
pub const CHECKSUM_SEED: u16 = 0xAAAA;

/// Tag byte following the length of every packed string.
pub const STRING_DESCRIPTOR_TAG: u8 = 0x03;

/// Self-powered bit of the configuration attributes byte.
pub(crate) const ATTR_SELF_POWERED: u8 = 0x40;
/// Remote wakeup bit of the configuration attributes byte.
pub(crate) const ATTR_REMOTE_WAKEUP: u8 = 0x20;
/// Max power is stored as value * 2 mA.
pub(crate) const MAX_POWER_MILLIAMP_PER_UNIT: u16 = 2;
