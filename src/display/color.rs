// Color conversions between exported screen pixels and display formats
//
// The screen exports 32-bit RGB values (0xRRGGBB). The window surface wants
// RGBA bytes and PNG screenshots want packed RGB bytes.

/// Convert RGB color to RGBA format expected by pixels crate
///
/// # Arguments
/// * `rgb` - 32-bit RGB color (0xRRGGBB)
///
/// # Returns
/// Array of [R, G, B, A] bytes
#[inline]
pub fn rgb_to_rgba(rgb: u32) -> [u8; 4] {
    [
        ((rgb >> 16) & 0xFF) as u8, // Red
        ((rgb >> 8) & 0xFF) as u8,  // Green
        (rgb & 0xFF) as u8,         // Blue
        0xFF,                       // Alpha (fully opaque)
    ]
}

/// Pack exported pixels as RGB888 bytes
///
/// # Returns
/// `pixels.len() * 3` bytes, R, G, B per pixel
pub fn rgb_to_bytes(pixels: &[u32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(pixels.len() * 3);
    for &rgb in pixels {
        let [r, g, b, _] = rgb_to_rgba(rgb);
        bytes.extend_from_slice(&[r, g, b]);
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_rgba() {
        let rgba = rgb_to_rgba(0x123456);
        assert_eq!(rgba, [0x12, 0x34, 0x56, 0xFF]);
    }

    #[test]
    fn test_rgb_to_rgba_ignores_high_byte() {
        assert_eq!(rgb_to_rgba(0xFF00_0000), [0, 0, 0, 0xFF]);
    }

    #[test]
    fn test_rgb_to_bytes() {
        let bytes = rgb_to_bytes(&[0xFFFFFF, 0x000000, 0x0A0B0C]);
        assert_eq!(bytes, vec![0xFF, 0xFF, 0xFF, 0, 0, 0, 0x0A, 0x0B, 0x0C]);
    }
}
