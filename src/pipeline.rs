//! One complete edit: read, decode, update, build, write.

use log::{debug, info, warn};

use crate::context::FtdiDevice;
use crate::eeprom::Slot;
use crate::error::{Error, Result};
use crate::file;
use crate::image::ImagePair;
use crate::options::{EditOptions, Endpoint, FieldUpdates};
use crate::transport::EepromTransport;

/// What a run did.
#[derive(Debug)]
pub struct RunReport {
    /// Both images as they stood at the end of the run.
    pub pair: ImagePair,
    /// Whether the output image was handed to its sink.
    pub written: bool,
    /// Why the input image could not be decoded, if it could not.
    pub decode_error: Option<Error>,
    /// Why the output image could not be built, if it could not.
    pub build_error: Option<Error>,
}

impl RunReport {
    /// Whether the run finished without cancelling its output.
    pub fn is_success(&self) -> bool {
        self.build_error.is_none()
    }
}

/// Run an edit, opening the USB device named in `options` when needed.
pub fn run_with_usb(mut options: EditOptions) -> Result<RunReport> {
    options.apply_implicit_rules();
    if !options.uses_device() {
        return run(options, None);
    }
    let (vid, pid) = options
        .device_ids()
        .ok_or_else(|| Error::Options("VID/PID is not defined".into()))?;
    let mut dev = FtdiDevice::open(vid, pid)?;
    debug!("{dev:?}");
    run(options, Some(&mut dev))
}

/// Run an edit against an already opened device (if any).
///
/// Decode and build failures do not abort the run: they are reported in the
/// returned [`RunReport`], the output is cancelled, and any requested views
/// are still produced. Errors reading input or writing output are returned.
pub fn run(
    mut options: EditOptions,
    mut device: Option<&mut dyn EepromTransport>,
) -> Result<RunReport> {
    options.apply_implicit_rules();
    debug!("{options:?}");

    if options.uses_device() && device.is_none() {
        return Err(Error::DeviceNotFound);
    }
    let eeprom_size = device.as_deref().map(|d| d.eeprom_size());
    let input_file_size = match &options.input {
        Some(Endpoint::File(path)) => Some(file::file_size(path)),
        _ => None,
    };
    options.validate(eeprom_size, input_file_size)?;

    let (in_size, out_size) = options.image_sizes(eeprom_size, input_file_size)?;
    debug!("image sizes (in, out) = ({in_size}, {out_size})");
    let mut pair = ImagePair::new(in_size, out_size)?;

    // 1. Read
    let data = match (&options.input, device.as_deref_mut()) {
        (Some(Endpoint::Device), Some(dev)) => dev.read_eeprom()?,
        (Some(Endpoint::File(path)), _) => file::read_image(path)?,
        _ => return Err(Error::DeviceNotFound),
    };
    pair.load(Slot::In, &data)?;
    if options.verbose {
        info!("----- <  IN  > -----\n{}", pair.dump(Slot::In));
    }

    // 2. Decode, and start OUT as a copy of IN
    let decode_error = match pair.decode(Slot::In) {
        Ok(_) => None,
        Err(e) => {
            warn!("failed to decode input image: {e}");
            Some(e)
        }
    };
    pair.copy_buffer(Slot::Out, Slot::In);
    pair.copy_record(Slot::Out, Slot::In);

    // 3. Update and 4. build
    let mut build_error = None;
    let updating = options.output.is_some() && !options.updates.is_empty();
    if updating {
        if decode_error.is_some() {
            warn!("input image did not decode, not applying updates. No output!");
            build_error = Some(Error::Format(
                "input image did not decode, updates not applied".into(),
            ));
            options.output = None;
        } else {
            apply_updates(&mut pair, &options.updates);
            if let Err(e) = pair.build(Slot::Out) {
                warn!("failed to build output image: {e}. No output!");
                build_error = Some(e);
                options.output = None;
            }
        }
    }

    if options.output.is_some() || !options.updates.is_empty() {
        if options.view_binary {
            info!("----- <  OUT > -----\n{}", pair.dump(Slot::Out));
        }
        if options.view_human {
            match pair.show_in_out() {
                Some(view) => info!("\n{view}"),
                None => warn!("input image did not decode, no human-readable view"),
            }
        }
    } else if options.view_human {
        match pair.show(Slot::In) {
            Some(view) => info!("\n{view}"),
            None => warn!("input image did not decode, no human-readable view"),
        }
    }

    // 5. Write
    let mut written = false;
    if let Some(output) = &options.output {
        let image = pair.export(Slot::Out)?;
        match (output, device.as_deref_mut()) {
            (Endpoint::Device, Some(dev)) => dev.write_eeprom(image)?,
            (Endpoint::File(path), _) => file::write_image(path, image)?,
            (Endpoint::Device, None) => return Err(Error::DeviceNotFound),
        }
        written = true;
    }

    Ok(RunReport {
        pair,
        written,
        decode_error,
        build_error,
    })
}

fn apply_updates(pair: &mut ImagePair, updates: &FieldUpdates) {
    if let Some(vid) = updates.vendor_id {
        pair.set_vendor_id(vid);
    }
    if let Some(pid) = updates.product_id {
        pair.set_product_id(pid);
    }
    if let Some(m) = &updates.manufacturer {
        pair.set_manufacturer(m.as_str());
    }
    if let Some(p) = &updates.product {
        pair.set_product(p.as_str());
    }
    if let Some(s) = &updates.serial {
        pair.set_serial(s.as_str());
    }
}
