// Program header - the fixed 16 bytes in front of every LAV program

use super::{HEADER_SIZE, MAGIC};
use serde::Serialize;

/// Number of reserved bytes following the magic
pub const RESERVED_SIZE: usize = HEADER_SIZE - MAGIC.len();

/// Copy of a program image's header
///
/// The reserved bytes are carried along for inspection tools only; nothing
/// in this crate gives them a meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageHeader {
    /// Magic bytes ("LAV" for every successfully loaded image)
    pub magic: [u8; 3],

    /// Format-specific bytes at offsets 0x03-0x0F
    pub reserved: [u8; RESERVED_SIZE],
}

impl ImageHeader {
    /// Build a header from the first 16 bytes of a validated image
    pub(crate) fn from_bytes(data: &[u8]) -> Self {
        let mut magic = [0u8; 3];
        let mut reserved = [0u8; RESERVED_SIZE];
        magic.copy_from_slice(&data[..MAGIC.len()]);
        reserved.copy_from_slice(&data[MAGIC.len()..HEADER_SIZE]);
        ImageHeader { magic, reserved }
    }

    /// The magic as text
    pub fn magic_str(&self) -> String {
        String::from_utf8_lossy(&self.magic).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ProgramImage;

    #[test]
    fn test_header_fields() {
        let mut data = MAGIC.to_vec();
        data.extend(1..=13u8);
        data.push(0xAA);

        let image = ProgramImage::from_bytes(data).unwrap();
        let header = image.header();
        assert_eq!(header.magic_str(), "LAV");
        assert_eq!(header.reserved[0], 1);
        assert_eq!(header.reserved[12], 13);
    }

    #[test]
    fn test_header_serializes() {
        let mut data = MAGIC.to_vec();
        data.resize(17, 0);
        let header = ProgramImage::from_bytes(data).unwrap().header();

        let json = serde_json::to_value(header).unwrap();
        assert_eq!(json["magic"], serde_json::json!([0x4C, 0x41, 0x56]));
        assert_eq!(json["reserved"].as_array().unwrap().len(), RESERVED_SIZE);
    }
}
