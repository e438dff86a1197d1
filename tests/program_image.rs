// Program image integration tests
//
// Load LAV programs from memory, readers and files, then walk them the way
// an interpreter does: typed reads interleaved with jumps.

mod common;

use common::{build_image, build_image_with_header};
use gvm_rs::image::{ImageError, ProgramImage, HEADER_SIZE};
use std::fs;
use std::io::{self, Read};

#[test]
fn test_seventeen_byte_program() {
    let mut image = ProgramImage::from_bytes(build_image(&[0x2A])).unwrap();

    assert_eq!(image.size(), 17);
    assert_eq!(image.position(), 16);
    assert_eq!(image.read_byte().unwrap(), 42);
    assert_eq!(image.position(), 17);

    // Nothing left past the single body byte
    assert!(matches!(
        image.read_byte(),
        Err(ImageError::OutOfBounds { position: 17, .. })
    ));
}

#[test]
fn test_magic_order_matters() {
    let mut data = build_image(&[0x00]);
    data[..3].copy_from_slice(b"ALV");

    let err = ProgramImage::from_bytes(data).unwrap_err();
    assert!(err.is_format_error());
    assert!(matches!(err, ImageError::BadMagic { found } if &found == b"ALV"));
}

#[test]
fn test_any_length_above_header_loads() {
    for body_len in [1usize, 2, 255, 4096] {
        let image = ProgramImage::from_bytes(build_image(&vec![0u8; body_len])).unwrap();
        assert_eq!(image.size(), HEADER_SIZE + body_len);
        assert_eq!(image.remaining(), body_len);
    }
}

#[test]
fn test_reserved_header_bytes_are_kept() {
    let reserved = [9, 8, 7, 6, 5, 4, 3, 2, 1, 0, 0xFF, 0xFE, 0xFD];
    let image = ProgramImage::from_bytes(build_image_with_header(reserved, &[0x00])).unwrap();

    let header = image.header();
    assert_eq!(header.magic_str(), "LAV");
    assert_eq!(header.reserved, reserved);
    // The cursor does not care what the header holds
    assert_eq!(image.position(), HEADER_SIZE);
}

#[test]
fn test_typed_values_round_trip() {
    let words: [i16; 4] = [0, 1, -1, i16::MAX];
    let addrs: [u32; 3] = [0, 0x00AB_CDEF, 0x00FF_FFFF];
    let longs: [i32; 3] = [i32::MIN, -123_456, i32::MAX];

    let mut body = Vec::new();
    for w in words {
        body.extend_from_slice(&w.to_le_bytes());
    }
    for a in addrs {
        body.extend_from_slice(&a.to_le_bytes()[..3]);
    }
    for l in longs {
        body.extend_from_slice(&l.to_le_bytes());
    }

    let mut image = ProgramImage::from_bytes(build_image(&body)).unwrap();
    for w in words {
        assert_eq!(image.read_int16().unwrap(), w);
    }
    for a in addrs {
        assert_eq!(image.read_addr().unwrap(), a);
    }
    for l in longs {
        assert_eq!(image.read_int32().unwrap(), l);
    }
    assert_eq!(image.remaining(), 0);
}

#[test]
fn test_mixed_reads_advance_by_width() {
    // char, int, addr, long
    let body = [0x7F, 0x02, 0x01, 0x03, 0x02, 0x01, 0x04, 0x03, 0x02, 0x01];
    let mut image = ProgramImage::from_bytes(build_image(&body)).unwrap();

    assert_eq!(image.read_byte().unwrap(), 0x7F);
    assert_eq!(image.position(), 17);
    assert_eq!(image.read_int16().unwrap(), 0x0102);
    assert_eq!(image.position(), 19);
    assert_eq!(image.read_addr().unwrap(), 0x01_0203);
    assert_eq!(image.position(), 22);
    assert_eq!(image.read_int32().unwrap(), 0x0102_0304);
    assert_eq!(image.position(), 26);
}

#[test]
fn test_jump_then_read() {
    // A tiny "program": an address operand pointing at a long constant
    let target = 0x18u32;
    let mut body = target.to_le_bytes()[..3].to_vec();
    body.resize(target as usize - HEADER_SIZE, 0);
    body.extend_from_slice(&(-2i32).to_le_bytes());

    let mut image = ProgramImage::from_bytes(build_image(&body)).unwrap();
    let addr = image.read_addr().unwrap();
    image.set_position(addr as usize).unwrap();
    assert_eq!(image.read_int32().unwrap(), -2);
    assert_eq!(image.remaining(), 0);

    // Jumping back replays the same operand
    image.set_position(HEADER_SIZE).unwrap();
    assert_eq!(image.read_addr().unwrap(), target);
}

#[test]
fn test_failed_reads_do_not_move_cursor() {
    let mut image = ProgramImage::from_bytes(build_image(&[0x01, 0x02, 0x03])).unwrap();

    assert!(image.read_int32().is_err());
    assert_eq!(image.position(), HEADER_SIZE);
    assert_eq!(image.read_addr().unwrap(), 0x03_0201);

    assert!(image.read_int16().is_err());
    assert!(image.read_byte().is_err());
    assert_eq!(image.position(), image.size());
}

#[test]
fn test_load_from_reader_and_file() {
    let data = build_image(&[0xEF, 0xBE]);

    let mut image = ProgramImage::from_reader(io::Cursor::new(data.clone())).unwrap();
    assert_eq!(image.read_int16().unwrap(), 0xBEEFu16 as i16);

    let path = std::env::temp_dir().join(format!("gvm_image_{}.lav", std::process::id()));
    fs::write(&path, &data).unwrap();
    let from_file = ProgramImage::from_file(&path).unwrap();
    assert_eq!(from_file.as_bytes(), data.as_slice());
    let _ = fs::remove_file(&path);
}

#[test]
fn test_missing_file_is_io_error() {
    let path = std::env::temp_dir().join("gvm_no_such_program.lav");
    let err = ProgramImage::from_file(&path).unwrap_err();
    assert!(matches!(err, ImageError::Io(_)));
    assert!(std::error::Error::source(&err).is_some());
}

/// A reader that fails after handing out part of the data
struct FailingReader {
    sent: bool,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.sent {
            return Err(io::Error::other("device unplugged"));
        }
        self.sent = true;
        buf[..3].copy_from_slice(b"LAV");
        Ok(3)
    }
}

#[test]
fn test_read_failure_rejects_image() {
    let err = ProgramImage::from_reader(FailingReader { sent: false }).unwrap_err();
    assert!(err.is_format_error());
    assert!(err.to_string().contains("device unplugged"));
}
