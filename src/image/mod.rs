// Program image - LAV program loading and sequential decoding
//
// A LAV program is a flat binary container: a 16-byte header starting with
// the magic "LAV", followed by the program body. The interpreter walks the
// body with a cursor that it can also reposition directly to implement
// jumps and calls.
//
// # Layout
//
// ```text
// 0x00-0x02: Magic "LAV" (0x4C 0x41 0x56)
// 0x03-0x0F: Reserved header bytes (not interpreted here)
// 0x10-....: Program body
// ```
//
// All multi-byte values are little-endian.

pub mod header;

pub use header::ImageHeader;

use log::debug;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Magic bytes every LAV program starts with
pub const MAGIC: [u8; 3] = *b"LAV";

/// Size of the program header in bytes
///
/// The cursor of a freshly loaded image points just past the header.
pub const HEADER_SIZE: usize = 16;

/// Errors that can occur while loading or decoding a program image
#[derive(Debug)]
pub enum ImageError {
    /// The data is not longer than the header
    Truncated { len: usize },

    /// The first three bytes are not "LAV"
    BadMagic { found: [u8; 3] },

    /// Reading the program source failed
    Io(io::Error),

    /// A read or seek would leave the image
    OutOfBounds {
        position: usize,
        width: usize,
        size: usize,
    },
}

impl ImageError {
    /// Whether this error means the input is not a usable LAV program
    ///
    /// Truncated data, a wrong magic and a failed read of the source all
    /// reject the image at load time.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            ImageError::Truncated { .. } | ImageError::BadMagic { .. } | ImageError::Io(_)
        )
    }
}

impl std::fmt::Display for ImageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageError::Truncated { len } => write!(
                f,
                "Invalid LAV file: {} bytes is too short (need more than {})",
                len, HEADER_SIZE
            ),
            ImageError::BadMagic { found } => write!(
                f,
                "Invalid LAV file: bad magic {:02X} {:02X} {:02X}",
                found[0], found[1], found[2]
            ),
            ImageError::Io(e) => write!(f, "Invalid LAV file: read failed: {}", e),
            ImageError::OutOfBounds {
                position,
                width,
                size,
            } => write!(
                f,
                "Access of {} byte(s) at offset {} is outside the image ({} bytes)",
                width, position, size
            ),
        }
    }
}

impl std::error::Error for ImageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImageError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ImageError {
    fn from(e: io::Error) -> Self {
        ImageError::Io(e)
    }
}

/// A loaded LAV program with a read cursor
///
/// The program bytes are immutable once loaded. The cursor starts right
/// after the header and advances with every typed read; `set_position`
/// moves it anywhere in `0..=size()`.
///
/// # Examples
///
/// ```
/// use gvm_rs::image::ProgramImage;
///
/// let mut data = b"LAV".to_vec();
/// data.resize(16, 0);
/// data.extend_from_slice(&[0x2A, 0x34, 0x12]);
///
/// let mut image = ProgramImage::from_bytes(data).unwrap();
/// assert_eq!(image.position(), 16);
/// assert_eq!(image.read_byte().unwrap(), 0x2A);
/// assert_eq!(image.read_int16().unwrap(), 0x1234);
/// ```
#[derive(Debug, Clone)]
pub struct ProgramImage {
    data: Vec<u8>,
    cursor: usize,
}

impl ProgramImage {
    /// Validate program bytes and create an image over them
    ///
    /// # Errors
    /// `ImageError::Truncated` if the data is 16 bytes or shorter,
    /// `ImageError::BadMagic` if it does not start with "LAV".
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ImageError> {
        if data.len() <= HEADER_SIZE {
            return Err(ImageError::Truncated { len: data.len() });
        }
        if data[..MAGIC.len()] != MAGIC {
            return Err(ImageError::BadMagic {
                found: [data[0], data[1], data[2]],
            });
        }

        debug!("Loaded LAV program image ({} bytes)", data.len());

        Ok(ProgramImage {
            data,
            cursor: HEADER_SIZE,
        })
    }

    /// Drain a reader completely and load the result as a program image
    ///
    /// Any I/O failure while reading rejects the whole image.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, ImageError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Load a program image from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ImageError> {
        let path = path.as_ref();
        debug!("Reading LAV program from {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(io::BufReader::new(file))
    }

    /// Total size of the image in bytes, header included
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Current cursor position
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Move the cursor
    ///
    /// `pos` may equal `size()`, which leaves nothing to read.
    ///
    /// # Errors
    /// `ImageError::OutOfBounds` if `pos` is past the end; the cursor is
    /// not moved in that case.
    pub fn set_position(&mut self, pos: usize) -> Result<(), ImageError> {
        if pos > self.data.len() {
            return Err(ImageError::OutOfBounds {
                position: pos,
                width: 0,
                size: self.data.len(),
            });
        }
        self.cursor = pos;
        Ok(())
    }

    /// Number of bytes between the cursor and the end of the image
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    /// The raw program bytes, header included
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The fixed program header
    pub fn header(&self) -> ImageHeader {
        ImageHeader::from_bytes(&self.data)
    }

    /// Read an unsigned byte (LAV `char`)
    #[inline]
    pub fn read_byte(&mut self) -> Result<u8, ImageError> {
        let [b0] = self.take::<1>()?;
        Ok(b0)
    }

    /// Read a signed little-endian 16-bit value (LAV `int`)
    #[inline]
    pub fn read_int16(&mut self) -> Result<i16, ImageError> {
        Ok(i16::from_le_bytes(self.take::<2>()?))
    }

    /// Read an unsigned little-endian 24-bit program address
    ///
    /// # Returns
    /// The address widened to `u32`, in `0..=0xFF_FFFF`
    #[inline]
    pub fn read_addr(&mut self) -> Result<u32, ImageError> {
        let [b0, b1, b2] = self.take::<3>()?;
        Ok(u32::from(b0) | u32::from(b1) << 8 | u32::from(b2) << 16)
    }

    /// Read a signed little-endian 32-bit value (LAV `long`)
    #[inline]
    pub fn read_int32(&mut self) -> Result<i32, ImageError> {
        Ok(i32::from_le_bytes(self.take::<4>()?))
    }

    /// Take `N` bytes at the cursor and advance past them
    fn take<const N: usize>(&mut self) -> Result<[u8; N], ImageError> {
        let end = self
            .cursor
            .checked_add(N)
            .filter(|&end| end <= self.data.len())
            .ok_or(ImageError::OutOfBounds {
                position: self.cursor,
                width: N,
                size: self.data.len(),
            })?;

        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.data[self.cursor..end]);
        self.cursor = end;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_with_body(body: &[u8]) -> ProgramImage {
        let mut data = MAGIC.to_vec();
        data.resize(HEADER_SIZE, 0);
        data.extend_from_slice(body);
        ProgramImage::from_bytes(data).unwrap()
    }

    #[test]
    fn test_minimal_image() {
        let mut image = image_with_body(&[0x2A]);
        assert_eq!(image.size(), 17);
        assert_eq!(image.position(), HEADER_SIZE);
        assert_eq!(image.read_byte().unwrap(), 42);
        assert_eq!(image.position(), 17);
        assert_eq!(image.remaining(), 0);
    }

    #[test]
    fn test_header_only_is_truncated() {
        let mut data = MAGIC.to_vec();
        data.resize(HEADER_SIZE, 0);
        let err = ProgramImage::from_bytes(data).unwrap_err();
        assert!(matches!(err, ImageError::Truncated { len: 16 }));
        assert!(err.is_format_error());
    }

    #[test]
    fn test_empty_input_is_truncated() {
        let err = ProgramImage::from_bytes(Vec::new()).unwrap_err();
        assert!(matches!(err, ImageError::Truncated { len: 0 }));
    }

    #[test]
    fn test_swapped_magic_rejected() {
        let mut data = vec![0x41, 0x4C, 0x56];
        data.resize(20, 0);
        let err = ProgramImage::from_bytes(data).unwrap_err();
        assert!(matches!(
            err,
            ImageError::BadMagic {
                found: [0x41, 0x4C, 0x56]
            }
        ));
        assert!(err.to_string().contains("bad magic"));
    }

    #[test]
    fn test_truncated_and_bad_magic_messages_differ() {
        let short = ProgramImage::from_bytes(vec![0x4C, 0x41, 0x56]).unwrap_err();
        let mut data = vec![0u8; 32];
        data[0] = b'X';
        let wrong = ProgramImage::from_bytes(data).unwrap_err();
        assert_ne!(short.to_string(), wrong.to_string());
    }

    #[test]
    fn test_read_int16_little_endian_signed() {
        let mut image = image_with_body(&[0x34, 0x12, 0x00, 0x80, 0xFF, 0xFF]);
        assert_eq!(image.read_int16().unwrap(), 0x1234);
        assert_eq!(image.read_int16().unwrap(), i16::MIN);
        assert_eq!(image.read_int16().unwrap(), -1);
        assert_eq!(image.position(), HEADER_SIZE + 6);
    }

    #[test]
    fn test_read_addr_is_unsigned_24_bit() {
        let mut image = image_with_body(&[0xFF, 0xFF, 0xFF, 0x56, 0x34, 0x12]);
        assert_eq!(image.read_addr().unwrap(), 0x00FF_FFFF);
        assert_eq!(image.read_addr().unwrap(), 0x0012_3456);
        assert_eq!(image.position(), HEADER_SIZE + 6);
    }

    #[test]
    fn test_read_int32_little_endian_signed() {
        let mut image = image_with_body(&[0x78, 0x56, 0x34, 0x12, 0x00, 0x00, 0x00, 0x80]);
        assert_eq!(image.read_int32().unwrap(), 0x1234_5678);
        assert_eq!(image.read_int32().unwrap(), i32::MIN);
    }

    #[test]
    fn test_read_byte_is_unsigned() {
        let mut image = image_with_body(&[0xFF, 0x80]);
        assert_eq!(image.read_byte().unwrap(), 255);
        assert_eq!(image.read_byte().unwrap(), 128);
    }

    #[test]
    fn test_set_position_rereads() {
        let mut image = image_with_body(&[0x01, 0x02, 0x03]);
        image.read_byte().unwrap();
        image.read_byte().unwrap();
        image.set_position(HEADER_SIZE).unwrap();
        assert_eq!(image.read_byte().unwrap(), 0x01);

        // The header is addressable too
        image.set_position(0).unwrap();
        assert_eq!(image.read_byte().unwrap(), b'L');
    }

    #[test]
    fn test_set_position_to_end_allowed() {
        let mut image = image_with_body(&[0x01, 0x02]);
        image.set_position(image.size()).unwrap();
        assert_eq!(image.remaining(), 0);
        assert!(image.read_byte().is_err());
    }

    #[test]
    fn test_set_position_past_end_rejected() {
        let mut image = image_with_body(&[0x01]);
        let err = image.set_position(100).unwrap_err();
        assert!(matches!(
            err,
            ImageError::OutOfBounds {
                position: 100,
                size: 17,
                ..
            }
        ));
        assert!(!err.is_format_error());
        assert_eq!(image.position(), HEADER_SIZE);
    }

    #[test]
    fn test_partial_read_leaves_cursor() {
        let mut image = image_with_body(&[0x01, 0x02]);
        let err = image.read_int32().unwrap_err();
        assert!(matches!(
            err,
            ImageError::OutOfBounds {
                position: 16,
                width: 4,
                size: 18
            }
        ));
        assert_eq!(image.position(), HEADER_SIZE);
        assert_eq!(image.read_int16().unwrap(), 0x0201);
    }

    #[test]
    fn test_from_reader() {
        let mut data = MAGIC.to_vec();
        data.resize(HEADER_SIZE, 0);
        data.push(7);
        let mut image = ProgramImage::from_reader(io::Cursor::new(data)).unwrap();
        assert_eq!(image.read_byte().unwrap(), 7);
    }

    #[test]
    fn test_from_reader_io_error_is_format_error() {
        struct FailingReader;

        impl Read for FailingReader {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "device gone"))
            }
        }

        let err = ProgramImage::from_reader(FailingReader).unwrap_err();
        assert!(matches!(err, ImageError::Io(_)));
        assert!(err.is_format_error());
        assert!(err.to_string().contains("device gone"));
    }

    #[test]
    fn test_from_file_missing() {
        let err = ProgramImage::from_file("does/not/exist.lav").unwrap_err();
        assert!(matches!(err, ImageError::Io(_)));
    }
}
