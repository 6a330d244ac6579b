use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage, RgbaImage};

use crate::error::VerifyError;

/// Composites a possibly transparent drawing over opaque white so untouched
/// canvas reads as paper instead of black.
pub fn flatten_on_white(drawing: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(drawing.width(), drawing.height(), |x, y| {
        let [r, g, b, a] = drawing.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, VerifyError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(VerifyError::EmptyCanvas);
    }
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_transparent_becomes_white() {
        let drawing = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0]));
        let flat = flatten_on_white(&drawing);
        assert!(flat.pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn test_opaque_strokes_kept() {
        let mut drawing = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 0]));
        drawing.put_pixel(0, 0, Rgba([10, 20, 30, 255]));
        let flat = flatten_on_white(&drawing);
        assert_eq!(flat.get_pixel(0, 0).0, [10, 20, 30]);
        assert_eq!(flat.get_pixel(1, 0).0, [255, 255, 255]);
    }

    #[test]
    fn test_half_alpha_blends_toward_white() {
        let drawing = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128]));
        let flat = flatten_on_white(&drawing);
        assert_eq!(flat.get_pixel(0, 0).0, [127, 127, 127]);
    }

    #[test]
    fn test_png_signature() {
        let flat = flatten_on_white(&RgbaImage::new(8, 8));
        let png = encode_png(&flat).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_empty_canvas_rejected() {
        let flat = RgbImage::new(0, 0);
        assert!(matches!(encode_png(&flat), Err(VerifyError::EmptyCanvas)));
    }
}
