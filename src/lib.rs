//! Inspect and edit the configuration EEPROM of FTDI USB chips.
//!
//! The EEPROM of an FTDI chip holds its USB vendor and product IDs, its
//! manufacturer, product and serial number strings, and a checksum. This
//! crate reads such an image from a chip (over [nusb](https://crates.io/crates/nusb),
//! no `libftdi` required) or from a file, decodes it, lets you change those
//! fields, rebuilds the image and writes it back.
//!
//! # Quick Start
//!
//! ```no_run
//! use ftdi_eeprom::{pipeline, EditOptions};
//!
//! // Give the FT232R on the bus a new serial number.
//! let opts = EditOptions::new()
//!     .device(0x0403, 0x6001)
//!     .update_serial("LAB-0042");
//! let report = pipeline::run_with_usb(opts)?;
//! assert!(report.written);
//! # Ok::<(), ftdi_eeprom::Error>(())
//! ```
//!
//! # Layers
//!
//! - **Codec** ([`eeprom`]): checksum, string table, decode and build of a
//!   single image.
//! - **Image pair** ([`ImagePair`]): the IN and OUT images of one edit.
//! - **Endpoints**: [`FtdiDevice`] (USB, via [`EepromTransport`]) and flat
//!   binary files ([`file`]).
//! - **Pipeline** ([`pipeline`]): read, decode, update, build, write, driven
//!   by [`EditOptions`].

pub mod constants;
pub mod context;
pub mod dump;
pub mod eeprom;
pub mod error;
pub mod file;
pub mod image;
pub mod options;
pub mod pipeline;
pub mod transport;
pub mod types;

// ---- Convenience re-exports ----

pub use constants::FTDI_VID;
pub use context::FtdiDevice;
pub use eeprom::{EepromFields, Slot};
pub use error::{Error, Result};
pub use image::ImagePair;
pub use options::{EditOptions, Endpoint, FieldUpdates};
pub use transport::EepromTransport;
pub use types::ChipType;
