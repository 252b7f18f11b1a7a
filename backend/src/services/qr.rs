//! QR code rendering shared by the verification pages and the PDF stamper.

use crate::error::AppError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::Luma;
use png::{BitDepth as PngBitDepth, ColorType as PngColorType, Encoder as PngEncoder};
use qrcode::QrCode;

/// An 8-bit grayscale QR bitmap, one byte per pixel, row-major.
#[derive(Debug, Clone)]
pub struct QrImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Renders `data` with `module_px` pixels per module and the standard quiet zone.
pub fn render(data: &str, module_px: u32) -> Result<QrImage, AppError> {
    let code = QrCode::new(data.as_bytes())?;
    let img = code
        .render::<Luma<u8>>()
        .module_dimensions(module_px, module_px)
        .quiet_zone(true)
        .build();
    let (width, height) = img.dimensions();
    Ok(QrImage {
        width,
        height,
        pixels: img.into_raw(),
    })
}

impl QrImage {
    pub fn to_png(&self) -> Result<Vec<u8>, AppError> {
        let mut out = Vec::new();
        {
            let mut encoder = PngEncoder::new(&mut out, self.width, self.height);
            encoder.set_color(PngColorType::Grayscale);
            encoder.set_depth(PngBitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.pixels)?;
            writer.finish()?;
        }
        Ok(out)
    }

    /// PNG bytes as base64, ready for a `data:image/png;base64,` URI.
    pub fn to_base64_png(&self) -> Result<String, AppError> {
        Ok(BASE64.encode(self.to_png()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_square_grayscale_bitmap() {
        let qr = render("http://portal.test/wassce-list/1/a/2/3/4/X-1", 4).unwrap();
        assert_eq!(qr.width, qr.height);
        assert_eq!(qr.pixels.len(), (qr.width * qr.height) as usize);
        assert!(qr.pixels.iter().any(|&p| p == 0));
        assert!(qr.pixels.iter().any(|&p| p == 255));
    }

    #[test]
    fn png_output_has_signature() {
        let qr = render("hello", 2).unwrap();
        let png = qr.to_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = BASE64.decode(qr.to_base64_png().unwrap()).unwrap();
        assert_eq!(decoded, png);
    }
}
