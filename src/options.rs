//! What an edit run should read, change, show, and write.
//!
//! [`EditOptions`] is the configuration a front end (command line, GUI,
//! script) hands to [`pipeline::run`](crate::pipeline::run).
//!
//! # Example
//!
//! ```
//! use ftdi_eeprom::{EditOptions, Endpoint};
//!
//! let opts = EditOptions::new()
//!     .input(Endpoint::file("ft232r.bin"))
//!     .update_serial("A50285BI")
//!     .view_human(true);
//! ```

use std::path::PathBuf;

use crate::constants::MAX_EEPROM_SIZE;
use crate::error::{Error, Result};

/// Where an image comes from or goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// The EEPROM of the selected USB device.
    Device,
    /// A flat binary file.
    File(PathBuf),
}

impl Endpoint {
    /// A file endpoint.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }
}

/// Field overrides applied to the `Out` record.
///
/// `None` leaves the field as read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldUpdates {
    /// New USB vendor ID.
    pub vendor_id: Option<u16>,
    /// New USB product ID.
    pub product_id: Option<u16>,
    /// New manufacturer string.
    pub manufacturer: Option<String>,
    /// New product string.
    pub product: Option<String>,
    /// New serial number string.
    pub serial: Option<String>,
}

impl FieldUpdates {
    /// Whether no field is overridden.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Options for one edit run.
#[derive(Debug, Clone, Default)]
pub struct EditOptions {
    /// USB vendor ID of the device to open.
    pub vendor_id: Option<u16>,
    /// USB product ID of the device to open.
    pub product_id: Option<u16>,
    /// Source of the `In` image.
    pub input: Option<Endpoint>,
    /// Destination of the `Out` image; `None` only inspects.
    pub output: Option<Endpoint>,
    /// Field overrides.
    pub updates: FieldUpdates,
    /// Dump the input image as it is read.
    pub verbose: bool,
    /// Dump the output image.
    pub view_binary: bool,
    /// Show IN and OUT records side by side.
    pub view_human: bool,
}

impl EditOptions {
    /// Options that do nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the USB device by vendor and product ID.
    pub fn device(mut self, vendor_id: u16, product_id: u16) -> Self {
        self.vendor_id = Some(vendor_id);
        self.product_id = Some(product_id);
        self
    }

    /// Set the input endpoint.
    pub fn input(mut self, input: Endpoint) -> Self {
        self.input = Some(input);
        self
    }

    /// Set the output endpoint.
    pub fn output(mut self, output: Endpoint) -> Self {
        self.output = Some(output);
        self
    }

    /// Override the vendor ID. Zero means "leave as read".
    pub fn update_vendor_id(mut self, vid: u16) -> Self {
        self.updates.vendor_id = (vid != 0).then_some(vid);
        self
    }

    /// Override the product ID. Zero means "leave as read".
    pub fn update_product_id(mut self, pid: u16) -> Self {
        self.updates.product_id = (pid != 0).then_some(pid);
        self
    }

    /// Override the manufacturer string. Empty means "leave as read".
    pub fn update_manufacturer(mut self, s: impl Into<String>) -> Self {
        self.updates.manufacturer = non_empty(s.into());
        self
    }

    /// Override the product string. Empty means "leave as read".
    pub fn update_product(mut self, s: impl Into<String>) -> Self {
        self.updates.product = non_empty(s.into());
        self
    }

    /// Override the serial number string. Empty means "leave as read".
    pub fn update_serial(mut self, s: impl Into<String>) -> Self {
        self.updates.serial = non_empty(s.into());
        self
    }

    /// Dump the input image as it is read.
    pub fn verbose(mut self, on: bool) -> Self {
        self.verbose = on;
        self
    }

    /// Dump the output image.
    pub fn view_binary(mut self, on: bool) -> Self {
        self.view_binary = on;
        self
    }

    /// Show the records in human-readable form.
    pub fn view_human(mut self, on: bool) -> Self {
        self.view_human = on;
        self
    }

    /// Both device IDs, if set.
    pub fn device_ids(&self) -> Option<(u16, u16)> {
        self.vendor_id.zip(self.product_id)
    }

    /// Whether either endpoint is the USB device.
    pub fn uses_device(&self) -> bool {
        self.input == Some(Endpoint::Device) || self.output == Some(Endpoint::Device)
    }

    /// Fill in endpoints the caller left implicit.
    ///
    /// - No input but a device selected: read the device.
    /// - Updates requested but no output: write back where the input came from.
    pub fn apply_implicit_rules(&mut self) {
        if self.input.is_none() && self.device_ids().is_some() {
            self.input = Some(Endpoint::Device);
        }
        if self.output.is_none() && !self.updates.is_empty() {
            self.output = self.input.clone();
        }
    }

    /// Check that the options describe a run that can happen.
    ///
    /// `eeprom_size` is the opened device's EEPROM size, `input_file_size`
    /// the size of the input file (0 if it does not exist).
    pub fn validate(&self, eeprom_size: Option<usize>, input_file_size: Option<u64>) -> Result<()> {
        let input = self
            .input
            .as_ref()
            .ok_or_else(|| Error::Options("no input (EEPROM or file) specified".into()))?;

        if self.uses_device() && self.device_ids().is_none() {
            return Err(Error::Options("VID/PID is not defined".into()));
        }

        if let Endpoint::File(path) = input {
            let size = input_file_size.unwrap_or(0);
            if size == 0 {
                return Err(Error::Options(format!(
                    "input file {} does not exist or is empty",
                    path.display()
                )));
            }
            if let (Some(Endpoint::Device), Some(capacity)) = (&self.output, eeprom_size) {
                if size > capacity as u64 {
                    return Err(Error::SizeMismatch {
                        len: size as usize,
                        capacity,
                    });
                }
            }
        }

        Ok(())
    }

    /// Capacities of the `In` and `Out` images.
    ///
    /// Whenever the device is involved both images take the EEPROM size, so
    /// a file written to the chip is padded to it. File-only runs use the
    /// input file size, capped to [`MAX_EEPROM_SIZE`].
    pub fn image_sizes(
        &self,
        eeprom_size: Option<usize>,
        input_file_size: Option<u64>,
    ) -> Result<(usize, usize)> {
        let size = if self.uses_device() {
            eeprom_size.ok_or(Error::DeviceNotFound)?
        } else {
            let file = input_file_size
                .ok_or_else(|| Error::Options("input file size unknown".into()))?;
            file.min(MAX_EEPROM_SIZE as u64) as usize
        };
        Ok((size, size))
    }
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_ids_imply_device_input() {
        let mut opts = EditOptions::new().device(0x0403, 0x6001);
        opts.apply_implicit_rules();
        assert_eq!(opts.input, Some(Endpoint::Device));
        assert_eq!(opts.output, None);
    }

    #[test]
    fn updates_imply_write_back() {
        let mut opts = EditOptions::new()
            .input(Endpoint::file("a.bin"))
            .update_serial("X1");
        opts.apply_implicit_rules();
        assert_eq!(opts.output, Some(Endpoint::file("a.bin")));

        let mut opts = EditOptions::new().device(1, 2).update_product_id(0x6015);
        opts.apply_implicit_rules();
        assert_eq!(opts.output, Some(Endpoint::Device));
    }

    #[test]
    fn zero_and_empty_overrides_are_unset() {
        let opts = EditOptions::new()
            .update_vendor_id(0)
            .update_product_id(0)
            .update_manufacturer("")
            .update_product("")
            .update_serial("");
        assert!(opts.updates.is_empty());
    }

    #[test]
    fn validation() {
        assert!(matches!(EditOptions::new().validate(None, None), Err(Error::Options(_))));

        let to_device = EditOptions::new()
            .input(Endpoint::file("a.bin"))
            .output(Endpoint::Device);
        assert!(matches!(to_device.validate(Some(128), Some(128)), Err(Error::Options(_))));

        let to_device = to_device.device(0x0403, 0x6001);
        assert!(to_device.validate(Some(128), Some(128)).is_ok());
        assert!(matches!(to_device.validate(Some(128), Some(0)), Err(Error::Options(_))));
        assert!(matches!(
            to_device.validate(Some(128), Some(256)),
            Err(Error::SizeMismatch { len: 256, capacity: 128 })
        ));
    }

    #[test]
    fn sizes() {
        let file_only = EditOptions::new()
            .input(Endpoint::file("a.bin"))
            .output(Endpoint::file("b.bin"));
        assert_eq!(file_only.image_sizes(None, Some(256)).unwrap(), (256, 256));
        assert_eq!(file_only.image_sizes(None, Some(4096)).unwrap(), (512, 512));

        let to_device = file_only.output(Endpoint::Device);
        assert_eq!(to_device.image_sizes(Some(128), Some(64)).unwrap(), (128, 128));
    }
}
