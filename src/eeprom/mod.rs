//! FTDI EEPROM image codec: decoding, building, and checksumming.
//!
//! The image layout handled here is a fixed field region (0x00..0x1A), a
//! string table of three USB string descriptors starting at 0x1A, and a
//! 16-bit checksum in the last two bytes. This module provides:
//!
//! - [`EepromFields`] - The decoded EEPROM structure.
//! - [`build`] - Encode the structure back into an existing binary image.
//! - [`decode`] - Decode a binary image into the structure.
//! - [`checksum`] - The running checksum over an image.
//! - [`strings`] - The string table and its descriptor pointers.

pub mod build;
pub mod checksum;
pub mod decode;
pub mod strings;
mod types;

pub use types::{check_image_size, EepromFields, Slot};
