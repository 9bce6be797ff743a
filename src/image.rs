//! The IN/OUT image pair an edit works on.
//!
//! [`ImagePair`] owns one byte image and one decoded record per [`Slot`].
//! A run loads bytes into `In`, decodes them, copies them to `Out`, applies
//! edits to the `Out` record, builds `Out` and exports it:
//!
//! ```
//! use ftdi_eeprom::{eeprom::build::prepare_string_table, ImagePair, Slot};
//!
//! let mut raw = vec![0u8; 128];
//! prepare_string_table(&mut raw, 128)?;
//!
//! let mut pair = ImagePair::new(128, 128)?;
//! pair.load(Slot::In, &raw)?;
//! pair.decode(Slot::In)?;
//! pair.copy_buffer(Slot::Out, Slot::In);
//! pair.copy_record(Slot::Out, Slot::In);
//! pair.set_product_id(0x6015);
//! pair.set_serial("A1B2C3");
//! pair.build(Slot::Out)?;
//! let image = pair.export(Slot::Out)?;
//! assert_eq!(image.len(), 128);
//! # Ok::<(), ftdi_eeprom::Error>(())
//! ```

use log::{debug, warn};

use crate::dump::{HexDump, InOutView, SlotView};
use crate::constants::{CHECKSUM_SIZE, MAX_EEPROM_SIZE, STRING_TABLE_START};
use crate::eeprom::{build, checksum, decode, EepromFields, Slot};
use crate::error::{Error, Result};

const MIN_CAPACITY: usize = STRING_TABLE_START + CHECKSUM_SIZE;

fn check_capacity(capacity: usize) -> Result<()> {
    if !(MIN_CAPACITY..=MAX_EEPROM_SIZE).contains(&capacity) {
        return Err(Error::Format(format!(
            "image capacity {capacity} is outside {MIN_CAPACITY}..={MAX_EEPROM_SIZE}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct Image {
    buf: Vec<u8>,
    fields: EepromFields,
    // The bytes form a complete image: loaded, copied from a ready image,
    // or built without pending edits.
    ready: bool,
    // `fields` came from decoding or building these bytes.
    has_record: bool,
}

impl Image {
    fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity],
            fields: EepromFields::default(),
            ready: false,
            has_record: false,
        }
    }
}

/// The two images of one edit, each with its own fixed capacity.
#[derive(Debug, Clone)]
pub struct ImagePair {
    images: [Image; 2],
}

impl ImagePair {
    /// Allocate zeroed images of the given capacities.
    ///
    /// Capacities are fixed for the lifetime of the pair. Any length up to
    /// [`MAX_EEPROM_SIZE`] that holds the fixed region and the checksum is
    /// accepted, so odd-sized files can still be loaded, dumped and copied;
    /// only decode and build insist on a size the layout can address.
    pub fn new(in_capacity: usize, out_capacity: usize) -> Result<Self> {
        check_capacity(in_capacity)?;
        check_capacity(out_capacity)?;
        Ok(Self {
            images: [Image::new(in_capacity), Image::new(out_capacity)],
        })
    }

    fn image(&self, slot: Slot) -> &Image {
        &self.images[slot.index()]
    }

    fn image_mut(&mut self, slot: Slot) -> &mut Image {
        &mut self.images[slot.index()]
    }

    fn out_fields_mut(&mut self) -> &mut EepromFields {
        let out = self.image_mut(Slot::Out);
        out.ready = false;
        &mut out.fields
    }

    /// Capacity of a slot's image in bytes.
    pub fn capacity(&self, slot: Slot) -> usize {
        self.image(slot).buf.len()
    }

    /// Raw bytes of a slot, whether or not they are ready to be written.
    pub fn buffer(&self, slot: Slot) -> &[u8] {
        &self.image(slot).buf
    }

    /// Decoded record of a slot.
    pub fn fields(&self, slot: Slot) -> &EepromFields {
        &self.image(slot).fields
    }

    /// Whether a slot's bytes can be exported.
    pub fn is_ready(&self, slot: Slot) -> bool {
        self.image(slot).ready
    }

    /// Fill a slot from a source.
    ///
    /// Data shorter than the slot is zero-padded; longer data is refused
    /// with [`Error::SizeMismatch`].
    pub fn load(&mut self, slot: Slot, data: &[u8]) -> Result<()> {
        let image = self.image_mut(slot);
        let capacity = image.buf.len();
        if data.len() > capacity {
            return Err(Error::SizeMismatch {
                len: data.len(),
                capacity,
            });
        }
        if data.len() < capacity {
            warn!(
                "{} image: padding {} bytes of input to {capacity}",
                slot.label(),
                data.len()
            );
        }
        image.buf.fill(0);
        image.buf[..data.len()].copy_from_slice(data);
        image.ready = true;
        image.has_record = false;
        debug!("{} image: loaded {} bytes", slot.label(), data.len());
        Ok(())
    }

    /// Decode a slot's bytes into its record.
    ///
    /// On error the slot's previous record is kept but no longer shown.
    pub fn decode(&mut self, slot: Slot) -> Result<&EepromFields> {
        let image = self.image_mut(slot);
        let size = image.buf.len();
        match decode::decode(&image.buf, size) {
            Ok(fields) => {
                image.fields = fields;
                image.has_record = true;
                Ok(&image.fields)
            }
            Err(e) => {
                image.has_record = false;
                Err(e)
            }
        }
    }

    /// Whether the checksum stored in a slot matches its contents.
    pub fn verify_checksum(&self, slot: Slot) -> bool {
        let buf = &self.image(slot).buf;
        checksum::verify(buf, buf.len())
    }

    /// The checksum a slot's contents should carry.
    pub fn calculate_checksum(&self, slot: Slot) -> u16 {
        let buf = &self.image(slot).buf;
        checksum::checksum(buf, buf.len())
    }

    /// Copy raw bytes between slots, up to the smaller capacity.
    ///
    /// Copying between slots of different capacity leaves the destination
    /// without a valid checksum, so it has to be built before export.
    pub fn copy_buffer(&mut self, to: Slot, from: Slot) {
        if to == from {
            return;
        }
        let [a, b] = &mut self.images;
        let (dst, src) = match to {
            Slot::In => (a, &*b),
            Slot::Out => (b, &*a),
        };
        let n = dst.buf.len().min(src.buf.len());
        if src.buf.len() > n {
            warn!(
                "copying {} -> {}: dropping {} trailing bytes",
                from.label(),
                to.label(),
                src.buf.len() - n
            );
        }
        dst.buf[..n].copy_from_slice(&src.buf[..n]);
        dst.ready = src.ready && dst.buf.len() == src.buf.len();
    }

    /// Copy the decoded record between slots.
    pub fn copy_record(&mut self, to: Slot, from: Slot) {
        let src = self.image(from);
        let (fields, has_record) = (src.fields.clone(), src.has_record);
        let dst = self.image_mut(to);
        dst.fields = fields;
        dst.has_record = has_record;
    }

    /// Set the vendor ID of the `Out` record.
    pub fn set_vendor_id(&mut self, vid: u16) {
        self.out_fields_mut().vendor_id = vid;
    }

    /// Set the product ID of the `Out` record.
    pub fn set_product_id(&mut self, pid: u16) {
        self.out_fields_mut().product_id = pid;
    }

    /// Set the manufacturer string of the `Out` record.
    pub fn set_manufacturer(&mut self, manufacturer: impl Into<String>) {
        self.out_fields_mut().manufacturer = manufacturer.into();
    }

    /// Set the product string of the `Out` record.
    pub fn set_product(&mut self, product: impl Into<String>) {
        self.out_fields_mut().product = product.into();
    }

    /// Set the serial number string of the `Out` record.
    pub fn set_serial(&mut self, serial: impl Into<String>) {
        self.out_fields_mut().serial = serial.into();
    }

    /// Serialize a slot's record into its bytes.
    ///
    /// A failed build leaves the bytes untouched but marks the slot as not
    /// ready, so a half-finished edit can never be exported.
    pub fn build(&mut self, slot: Slot) -> Result<()> {
        let image = self.image_mut(slot);
        let size = image.buf.len();
        match build::build(&mut image.buf, size, &image.fields) {
            Ok(_) => {
                image.ready = true;
                image.has_record = true;
                Ok(())
            }
            Err(e) => {
                image.ready = false;
                Err(e)
            }
        }
    }

    /// Bytes of a slot, ready to hand to a sink.
    pub fn export(&self, slot: Slot) -> Result<&[u8]> {
        let image = self.image(slot);
        if !image.ready {
            return Err(Error::NotReady(slot));
        }
        Ok(&image.buf)
    }

    /// Hex dump of a slot's bytes.
    pub fn dump(&self, slot: Slot) -> HexDump<'_> {
        HexDump::new(self.buffer(slot))
    }

    /// Human-readable view of a slot's record.
    ///
    /// `None` if the slot's bytes were never decoded or built, since its
    /// record would not describe them.
    pub fn show(&self, slot: Slot) -> Option<SlotView<'_>> {
        let image = self.image(slot);
        image
            .has_record
            .then(|| SlotView::new(slot, &image.fields))
    }

    /// Side-by-side view of both records.
    ///
    /// `None` unless both slots hold a record.
    pub fn show_in_out(&self) -> Option<InOutView<'_>> {
        let (i, o) = (self.image(Slot::In), self.image(Slot::Out));
        (i.has_record && o.has_record).then(|| InOutView::new(&i.fields, &o.fields))
    }
}
