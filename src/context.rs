//! USB access to the EEPROM of an FTDI chip.
//!
//! [`FtdiDevice`] opens a chip with nusb and moves its EEPROM contents with
//! vendor control transfers, one 16-bit word per transfer. It implements
//! [`EepromTransport`] so it can feed and drain the image pipeline.

use std::time::Duration;

use log::{debug, warn};
use nusb::transfer::{ControlIn, ControlOut, ControlType, Recipient};
use nusb::{self, DeviceInfo, MaybeFuture};

use crate::constants::*;
use crate::error::{Error, Result};
use crate::transport::EepromTransport;
use crate::types::ChipType;

/// Default control transfer timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Interface claimed for EEPROM access (interface A).
const INTERFACE_NUM: u8 = 0;
/// `wIndex` addressing interface A in SIO requests.
const USB_INDEX: u16 = 1;

/// An opened FTDI USB device.
///
/// ```no_run
/// use ftdi_eeprom::{EepromTransport, FtdiDevice};
///
/// let mut dev = FtdiDevice::open(0x0403, 0x6001)?;
/// let image = dev.read_eeprom()?;
/// println!("{} byte EEPROM on a {:?}", image.len(), dev.chip_type());
/// # Ok::<(), ftdi_eeprom::Error>(())
/// ```
pub struct FtdiDevice {
    #[allow(dead_code)] // Kept to ensure the USB device stays open
    device: nusb::Device,
    interface: nusb::Interface,
    chip_type: ChipType,
    eeprom_size: usize,
    timeout: Duration,
}

impl std::fmt::Debug for FtdiDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FtdiDevice")
            .field("chip_type", &self.chip_type)
            .field("eeprom_size", &self.eeprom_size)
            .finish_non_exhaustive()
    }
}

// ---- Construction / Opening ----

impl FtdiDevice {
    /// Open the first FTDI device matching the given vendor and product IDs.
    pub fn open(vendor: u16, product: u16) -> Result<Self> {
        let dev_info = nusb::list_devices()
            .wait()?
            .find(|d| d.vendor_id() == vendor && d.product_id() == product)
            .ok_or(Error::DeviceNotFound)?;

        Self::from_device_info(dev_info)
    }

    /// Open a device from an already-discovered [`nusb::DeviceInfo`].
    ///
    /// The EEPROM is read once here to find out how large it is.
    pub fn from_device_info(dev_info: DeviceInfo) -> Result<Self> {
        let device = dev_info.open().wait()?;

        // Detach kernel driver and claim interface
        let interface = device.detach_and_claim_interface(INTERFACE_NUM).wait()?;

        let desc = device.device_descriptor();
        let chip_type = ChipType::from_bcd_device(
            desc.device_version(),
            desc.serial_number_string_index().is_some(),
        );

        let mut ftdi = Self {
            device,
            interface,
            chip_type,
            eeprom_size: 0,
            timeout: DEFAULT_TIMEOUT,
        };

        let raw = ftdi.read_raw_eeprom()?;
        ftdi.eeprom_size = detect_eeprom_size(chip_type, &raw);
        debug!(
            "opened {:?}, EEPROM size {} bytes",
            ftdi.chip_type, ftdi.eeprom_size
        );

        Ok(ftdi)
    }

    /// The detected FTDI chip type.
    pub fn chip_type(&self) -> ChipType {
        self.chip_type
    }

    /// Set the timeout used for every control transfer.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}

// ---- Internal USB helpers ----

impl FtdiDevice {
    /// Send a vendor OUT control transfer to the device.
    fn control_out(&self, request: u8, value: u16, index: u16) -> Result<()> {
        self.interface
            .control_out(
                ControlOut {
                    control_type: ControlType::Vendor,
                    recipient: Recipient::Device,
                    request,
                    value,
                    index,
                    data: &[],
                },
                self.timeout,
            )
            .wait()?;
        Ok(())
    }

    /// Send a vendor IN control transfer to the device.
    fn control_in(&self, request: u8, value: u16, index: u16, length: u16) -> Result<Vec<u8>> {
        let data = self
            .interface
            .control_in(
                ControlIn {
                    control_type: ControlType::Vendor,
                    recipient: Recipient::Device,
                    request,
                    value,
                    index,
                    length,
                },
                self.timeout,
            )
            .wait()?;
        Ok(data)
    }

    /// Perform a USB reset on the FTDI device.
    pub fn usb_reset(&self) -> Result<()> {
        self.control_out(SIO_RESET_REQUEST, SIO_RESET_SIO, USB_INDEX)
    }

    /// Read a single 16-bit EEPROM word (word address, not byte offset).
    pub fn read_eeprom_location(&self, addr: u16) -> Result<u16> {
        let data = self.control_in(SIO_READ_EEPROM_REQUEST, 0, addr, 2)?;
        if data.len() < 2 {
            return Err(Error::Eeprom(format!(
                "EEPROM read of word {addr:#04x} failed: short transfer"
            )));
        }
        Ok(u16::from_le_bytes([data[0], data[1]]))
    }

    /// Read everything the read request can reach.
    ///
    /// Parts smaller than this window repeat their contents.
    fn read_raw_eeprom(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(FTDI_READABLE_EEPROM_SIZE);
        for i in 0..(FTDI_READABLE_EEPROM_SIZE / 2) {
            let word = self.read_eeprom_location(i as u16)?;
            buf.extend_from_slice(&word.to_le_bytes());
        }
        Ok(buf)
    }
}

impl EepromTransport for FtdiDevice {
    fn eeprom_size(&self) -> usize {
        self.eeprom_size
    }

    fn read_eeprom(&mut self) -> Result<Vec<u8>> {
        let mut buf = self.read_raw_eeprom()?;
        buf.truncate(self.eeprom_size);
        Ok(buf)
    }

    /// Write the image word by word after a SIO reset.
    fn write_eeprom(&mut self, image: &[u8]) -> Result<()> {
        if image.len() > self.eeprom_size {
            return Err(Error::SizeMismatch {
                len: image.len(),
                capacity: self.eeprom_size,
            });
        }
        if image.len() < self.eeprom_size {
            return Err(Error::Eeprom(format!(
                "refusing to write a {}-byte image to a {}-byte EEPROM",
                image.len(),
                self.eeprom_size
            )));
        }

        self.usb_reset()?;

        for (i, word) in image.chunks_exact(2).enumerate() {
            let val = u16::from_le_bytes([word[0], word[1]]);
            self.control_out(SIO_WRITE_EEPROM_REQUEST, val, i as u16)?;
        }
        debug!("wrote {} bytes to the EEPROM", image.len());

        Ok(())
    }
}

/// Work out how large the fitted EEPROM is from a full read window.
///
/// FT232R parts have a fixed 128-byte internal EEPROM. External 93xx parts
/// smaller than the window wrap around, so equal halves mean 128 bytes and
/// equal quarters mean 64. A blank (all 0xFF) part cannot be sized this way;
/// the usual part for the chip family is assumed.
pub(crate) fn detect_eeprom_size(chip_type: ChipType, buf: &[u8]) -> usize {
    if chip_type == ChipType::Ft232R {
        return 0x80;
    }
    if buf.iter().all(|&b| b == 0xFF) {
        let guess = if chip_type.is_h_type() { 0x100 } else { 0x80 };
        warn!("EEPROM appears blank, assuming {guess} bytes");
        return guess;
    }
    if buf[..0x80] == buf[0x80..0x100] {
        0x80
    } else if buf[..0x40] == buf[0x40..0x80] {
        0x40
    } else {
        0x100
    }
}
