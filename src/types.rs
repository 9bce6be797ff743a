//! Type definitions for FTDI chip identification.

/// Supported FTDI chip types.
///
/// The chip type is auto-detected when a device is opened, based on the
/// USB `bcdDevice` descriptor field. It only matters for guessing the size
/// of the EEPROM fitted to the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChipType {
    /// Original FTDI chip (FT8U232AM).
    Am,
    /// B-type chip (FT232BM, FT245BM).
    Bm,
    /// Dual-port chip (FT2232C/D/L).
    Ft2232C,
    /// FT232R / FT245R.
    Ft232R,
    /// Dual hi-speed chip (FT2232H).
    Ft2232H,
    /// Quad-port chip (FT4232H).
    Ft4232H,
    /// Single hi-speed chip (FT232H).
    Ft232H,
    /// FT230X / FT231X / FT234XD.
    Ft230X,
}

impl ChipType {
    /// Identify the chip from its `bcdDevice` value.
    ///
    /// BM chips report 0x0200 instead of 0x0400 when they have no serial
    /// number, so `has_serial` is needed to tell them from AM chips.
    pub fn from_bcd_device(bcd: u16, has_serial: bool) -> Self {
        match bcd {
            0x0400 => Self::Bm,
            0x0200 if !has_serial => Self::Bm,
            0x0200 => Self::Am,
            0x0500 => Self::Ft2232C,
            0x0600 => Self::Ft232R,
            0x0700 => Self::Ft2232H,
            0x0800 => Self::Ft4232H,
            0x0900 => Self::Ft232H,
            0x1000 => Self::Ft230X,
            _ => Self::Bm, // Default fallback
        }
    }

    /// Whether this is an H-type (hi-speed) chip.
    #[inline]
    pub fn is_h_type(self) -> bool {
        matches!(self, Self::Ft2232H | Self::Ft4232H | Self::Ft232H)
    }
}
