//! End-to-end runs of the edit pipeline against an in-memory chip and files.

use ftdi_eeprom::eeprom::build::{build, prepare_string_table};
use ftdi_eeprom::eeprom::checksum;
use ftdi_eeprom::eeprom::decode::decode;
use ftdi_eeprom::pipeline::run;
use ftdi_eeprom::{EditOptions, EepromFields, EepromTransport, Endpoint, Error, Result, Slot};

/// A chip whose EEPROM lives in memory.
struct FakeChip {
    eeprom: Vec<u8>,
    writes: usize,
}

impl FakeChip {
    fn new(eeprom: Vec<u8>) -> Self {
        Self { eeprom, writes: 0 }
    }
}

impl EepromTransport for FakeChip {
    fn eeprom_size(&self) -> usize {
        self.eeprom.len()
    }

    fn read_eeprom(&mut self) -> Result<Vec<u8>> {
        Ok(self.eeprom.clone())
    }

    fn write_eeprom(&mut self, image: &[u8]) -> Result<()> {
        if image.len() != self.eeprom.len() {
            return Err(Error::SizeMismatch {
                len: image.len(),
                capacity: self.eeprom.len(),
            });
        }
        self.eeprom.copy_from_slice(image);
        self.writes += 1;
        Ok(())
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn ft232r_image(size: usize) -> Vec<u8> {
    let mut buf = vec![0u8; size];
    prepare_string_table(&mut buf, size).unwrap();
    let fields = EepromFields {
        vendor_id: 0x0403,
        product_id: 0x6001,
        release_number: 0x0600,
        max_power: 90,
        manufacturer: "FTDI".into(),
        product: "FT232R USB UART".into(),
        serial: "A50285BI".into(),
        ..Default::default()
    };
    build(&mut buf, size, &fields).unwrap();
    buf
}

#[test]
fn device_to_device_update() {
    init_logging();
    let mut chip = FakeChip::new(ft232r_image(128));
    let opts = EditOptions::new()
        .device(0x0403, 0x6001)
        .update_product_id(0x6015)
        .update_serial("LAB-0042")
        .view_binary(true)
        .view_human(true);

    let report = run(opts, Some(&mut chip)).unwrap();
    assert!(report.written);
    assert!(report.is_success());
    assert_eq!(chip.writes, 1);

    let fields = decode(&chip.eeprom, 128).unwrap();
    assert_eq!(fields.product_id, 0x6015);
    assert_eq!(fields.serial, "LAB-0042");
    assert_eq!(fields.manufacturer, "FTDI");
    assert!(checksum::verify(&chip.eeprom, 128));

    assert_eq!(report.pair.fields(Slot::In).serial, "A50285BI");
}

#[test]
fn inspect_only_writes_nothing() {
    init_logging();
    let original = ft232r_image(128);
    let mut chip = FakeChip::new(original.clone());
    let opts = EditOptions::new().device(0x0403, 0x6001).verbose(true);

    let report = run(opts, Some(&mut chip)).unwrap();
    assert!(!report.written);
    assert_eq!(chip.writes, 0);
    assert_eq!(chip.eeprom, original);
    assert_eq!(report.pair.fields(Slot::In).product, "FT232R USB UART");
}

#[test]
fn device_to_file_backup() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let backup = dir.path().join("backup.bin");
    let original = ft232r_image(256);
    let mut chip = FakeChip::new(original.clone());

    let opts = EditOptions::new()
        .device(0x0403, 0x6001)
        .output(Endpoint::file(&backup));
    let report = run(opts, Some(&mut chip)).unwrap();
    assert!(report.written);
    assert_eq!(std::fs::read(&backup).unwrap(), original);
}

#[test]
fn file_edit_in_place() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eeprom.bin");
    std::fs::write(&path, ft232r_image(128)).unwrap();

    let opts = EditOptions::new()
        .input(Endpoint::file(&path))
        .update_vendor_id(0x1209)
        .update_manufacturer("pid.codes");
    let report = run(opts, None).unwrap();
    assert!(report.written);

    let written = std::fs::read(&path).unwrap();
    assert_eq!(written.len(), 128);
    let fields = decode(&written, 128).unwrap();
    assert_eq!(fields.vendor_id, 0x1209);
    assert_eq!(fields.manufacturer, "pid.codes");
    assert_eq!(fields.product, "FT232R USB UART");
}

#[test]
fn small_file_is_padded_onto_device() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("small.bin");
    // The first half of a 256-byte image; its checksum is lost.
    let mut image = ft232r_image(256);
    image.truncate(128);
    std::fs::write(&path, image).unwrap();

    let mut chip = FakeChip::new(vec![0xFF; 256]);
    let opts = EditOptions::new()
        .device(0x0403, 0x6001)
        .input(Endpoint::file(&path))
        .output(Endpoint::Device)
        .update_serial("PADDED");
    let report = run(opts, Some(&mut chip)).unwrap();
    assert!(report.written);

    let fields = decode(&chip.eeprom, 256).unwrap();
    assert_eq!(fields.serial, "PADDED");
    assert!(chip.eeprom[0x80..0xFE].iter().all(|&b| b == 0));
}

#[test]
fn large_file_is_refused_by_device() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("large.bin");
    std::fs::write(&path, ft232r_image(256)).unwrap();

    let mut chip = FakeChip::new(ft232r_image(128));
    let opts = EditOptions::new()
        .device(0x0403, 0x6001)
        .input(Endpoint::file(&path))
        .output(Endpoint::Device);
    let err = run(opts, Some(&mut chip)).unwrap_err();
    assert!(matches!(err, Error::SizeMismatch { len: 256, capacity: 128 }));
    assert_eq!(chip.writes, 0);
}

#[test]
fn oversized_strings_cancel_the_write() {
    init_logging();
    let original = ft232r_image(128);
    let mut chip = FakeChip::new(original.clone());
    let opts = EditOptions::new()
        .device(0x0403, 0x6001)
        .update_product(&"P".repeat(40))
        .update_serial(&"S".repeat(20))
        .view_human(true);

    let report = run(opts, Some(&mut chip)).unwrap();
    assert!(!report.written);
    assert!(!report.is_success());
    assert!(matches!(report.build_error, Some(Error::OutOfSpace { .. })));
    assert_eq!(chip.writes, 0);
    assert_eq!(chip.eeprom, original);

    // IN can still be inspected.
    assert_eq!(report.pair.fields(Slot::In).serial, "A50285BI");
    assert!(report.pair.dump(Slot::In).to_string().contains("46 00 54 00"));
}

#[test]
fn foreign_layout_cancels_the_write() {
    init_logging();
    // libftdi places the FT232R string table at 0x18, before 0x1A.
    let mut image = ft232r_image(128);
    for at in [0x0E, 0x10, 0x12] {
        image[at] = (image[at] & 0x7F).wrapping_sub(2) | 0x80;
    }
    image.copy_within(0x1A..0x7E, 0x18);
    let mut chip = FakeChip::new(image.clone());

    let opts = EditOptions::new()
        .device(0x0403, 0x6001)
        .update_serial("X");
    let report = run(opts, Some(&mut chip)).unwrap();
    assert!(!report.written);
    assert!(report.decode_error.is_some());
    assert!(report.build_error.is_some());
    assert_eq!(chip.eeprom, image);
}

#[test]
fn missing_input_file() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let opts = EditOptions::new()
        .input(Endpoint::file(dir.path().join("nope.bin")))
        .update_serial("X");
    assert!(matches!(run(opts, None), Err(Error::Options(_))));
}

#[test]
fn device_required() {
    init_logging();
    let opts = EditOptions::new().device(0x0403, 0x6001);
    assert!(matches!(run(opts, None), Err(Error::DeviceNotFound)));
}

#[test]
fn empty_pair_blank_prepared_image() {
    // A zeroed buffer prepared for a string table can be built from scratch.
    let mut buf = vec![0u8; 128];
    buf[2..6].copy_from_slice(&[0x03, 0x04, 0x01, 0x60]);
    prepare_string_table(&mut buf, 128).unwrap();

    let mut pair = ftdi_eeprom::ImagePair::new(128, 128).unwrap();
    pair.load(Slot::In, &buf).unwrap();
    pair.decode(Slot::In).unwrap();
    pair.copy_buffer(Slot::Out, Slot::In);
    pair.copy_record(Slot::Out, Slot::In);
    pair.set_manufacturer("FTDI");
    pair.set_product("X");
    pair.set_serial("1");
    pair.build(Slot::Out).unwrap();

    let out = pair.export(Slot::Out).unwrap();
    assert_eq!(
        checksum::stored_checksum(out, 128).unwrap(),
        checksum::checksum(&out[..126], 128)
    );
    let fields = decode(out, 128).unwrap();
    assert_eq!((fields.vendor_id, fields.product_id), (0x0403, 0x6001));
    assert_eq!(fields.strings(), ("FTDI", "X", "1"));
}

#[test]
fn odd_sized_file_can_be_inspected() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("odd.bin");
    let data: Vec<u8> = (0..100u8).collect();
    std::fs::write(&path, &data).unwrap();

    let opts = EditOptions::new()
        .input(Endpoint::file(&path))
        .verbose(true)
        .view_human(true);
    let report = run(opts, None).unwrap();
    assert!(!report.written);
    assert!(matches!(report.decode_error, Some(Error::Format(_))));
    assert!(report.build_error.is_none());
    assert_eq!(report.pair.buffer(Slot::In), &data[..]);
    assert!(report.pair.show(Slot::In).is_none());
    assert!(report.pair.dump(Slot::In).to_string().starts_with("00000000  00 01 02 03"));
}

#[test]
fn odd_sized_file_copies_verbatim() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("odd.bin");
    let dst = dir.path().join("copy.bin");
    let data: Vec<u8> = (0..300u32).map(|i| (i * 3) as u8).collect();
    std::fs::write(&src, &data).unwrap();

    let opts = EditOptions::new()
        .input(Endpoint::file(&src))
        .output(Endpoint::file(&dst))
        .view_human(true);
    let report = run(opts, None).unwrap();
    assert!(report.written);
    assert!(report.decode_error.is_some());
    assert_eq!(std::fs::read(&dst).unwrap(), data);
}

#[test]
fn odd_sized_file_refuses_updates() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("odd.bin");
    std::fs::write(&path, [0u8; 100]).unwrap();

    let opts = EditOptions::new()
        .input(Endpoint::file(&path))
        .update_serial("X");
    let report = run(opts, None).unwrap();
    assert!(!report.written);
    assert!(!report.is_success());
    assert_eq!(std::fs::read(&path).unwrap(), vec![0u8; 100]);
}
