//! Error types for the ftdi-eeprom crate.

use crate::eeprom::Slot;

/// The error type for EEPROM image operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error from the nusb USB layer.
    #[error("USB error: {0}")]
    Usb(#[from] nusb::Error),

    /// A USB transfer error.
    #[error("USB transfer error: {0}")]
    Transfer(#[from] nusb::transfer::TransferError),

    /// A file source or sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No matching device was found.
    #[error("device not found")]
    DeviceNotFound,

    /// The options do not describe a runnable edit.
    #[error("invalid options: {0}")]
    Options(String),

    /// A device-level EEPROM transfer failed.
    #[error("EEPROM error: {0}")]
    Eeprom(String),

    /// The image does not follow the expected layout.
    #[error("EEPROM format error: {0}")]
    Format(String),

    /// The string table does not fit in front of the checksum trailer.
    #[error("EEPROM string table needs {needed} bytes, only {available} available")]
    OutOfSpace {
        /// Bytes the string table would end at.
        needed: usize,
        /// Bytes usable before the checksum trailer.
        available: usize,
    },

    /// Data is longer than the destination can hold.
    #[error("image of {len} bytes does not fit a {capacity}-byte destination")]
    SizeMismatch {
        /// Length of the offered data.
        len: usize,
        /// Capacity of the destination.
        capacity: usize,
    },

    /// The slot holds edits that were never built into its image.
    #[error("{0:?} image is not ready to be written")]
    NotReady(Slot),
}

/// A specialized `Result` type for EEPROM image operations.
pub type Result<T> = std::result::Result<T, Error>;
