//! 1-bit conversion and printer encodings
//!
//! Thermal heads print black or nothing. The receipt is cropped on the left
//! to compensate the printer's margin, reduced to luma and thresholded at
//! 128. Rows are packed MSB first with 1 meaning a black dot, which is what
//! both ESC/POS raster and a monochrome BMP expect (the BMP palette handles
//! the inversion).

use std::path::Path;

use image::{GrayImage, imageops};

use crate::error::{RenderError, Result};
use crate::renderer::ReceiptImage;

/// Luma below this prints as a dot
pub const THRESHOLD: u8 = 128;

const ESC: u8 = 0x1B;
const GS: u8 = 0x1D;

/// `GS v 0` carries width in bytes and height in dots as 16-bit values
const RASTER_MAX: usize = u16::MAX as usize;

/// Packed 1-bit bitmap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonoBitmap {
    width: u32,
    height: u32,
    /// `height` rows of `row_bytes()` bytes, 1 = black
    bits: Vec<u8>,
}

impl MonoBitmap {
    /// Crop `crop_left` pixels, then threshold
    pub fn from_receipt(receipt: &ReceiptImage, crop_left: u32) -> Self {
        let rgba = receipt.as_rgba();
        let crop = crop_left.min(rgba.width().saturating_sub(1));
        let cropped = imageops::crop_imm(rgba, crop, 0, rgba.width() - crop, rgba.height());
        let gray = imageops::grayscale(&cropped.to_image());
        Self::from_gray(&gray)
    }

    pub fn from_gray(gray: &GrayImage) -> Self {
        let (width, height) = gray.dimensions();
        let row_bytes = width.div_ceil(8) as usize;
        let mut bits = vec![0u8; row_bytes * height as usize];

        for (x, y, pixel) in gray.enumerate_pixels() {
            if pixel.0[0] < THRESHOLD {
                let idx = y as usize * row_bytes + (x / 8) as usize;
                bits[idx] |= 0x80 >> (x % 8);
            }
        }

        Self {
            width,
            height,
            bits,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn row_bytes(&self) -> usize {
        self.width.div_ceil(8) as usize
    }

    pub fn is_black(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = y as usize * self.row_bytes() + (x / 8) as usize;
        self.bits[idx] & (0x80 >> (x % 8)) != 0
    }

    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &[u8]> {
        self.bits.chunks(self.row_bytes().max(1))
    }

    /// Monochrome BMP, bottom-up rows padded to 4 bytes
    pub fn to_bmp(&self) -> Vec<u8> {
        const FILE_HEADER: u32 = 14;
        const INFO_HEADER: u32 = 40;
        const PALETTE: u32 = 8;

        let stride = self.row_bytes().div_ceil(4) * 4;
        let image_size = (stride * self.height as usize) as u32;
        let offset = FILE_HEADER + INFO_HEADER + PALETTE;

        let mut out = Vec::with_capacity((offset + image_size) as usize);

        out.extend_from_slice(b"BM");
        out.extend_from_slice(&(offset + image_size).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&offset.to_le_bytes());

        out.extend_from_slice(&INFO_HEADER.to_le_bytes());
        out.extend_from_slice(&(self.width as i32).to_le_bytes());
        out.extend_from_slice(&(self.height as i32).to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&image_size.to_le_bytes());
        // 203 dpi
        out.extend_from_slice(&7992i32.to_le_bytes());
        out.extend_from_slice(&7992i32.to_le_bytes());
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&2u32.to_le_bytes());

        // Index 0 white, index 1 black
        out.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0x00]);
        out.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

        let padding = stride - self.row_bytes();
        for row in self.rows().rev() {
            out.extend_from_slice(row);
            out.extend(std::iter::repeat_n(0u8, padding));
        }

        out
    }

    pub fn save_bmp<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_bmp())?;
        Ok(())
    }
}

/// ESC/POS command stream
#[derive(Debug, Clone)]
pub struct EscPos {
    buf: Vec<u8>,
}

impl EscPos {
    /// Starts with `ESC @`
    pub fn new() -> Self {
        Self {
            buf: vec![ESC, b'@'],
        }
    }

    /// `GS v 0` raster image, normal density
    ///
    /// Bitmaps taller than one command allows are sent as consecutive bands.
    pub fn raster(mut self, bitmap: &MonoBitmap) -> Result<Self> {
        let row_bytes = bitmap.row_bytes();
        let x = u16::try_from(row_bytes).map_err(|_| {
            RenderError::Layout(format!(
                "raster row of {} bytes exceeds {}",
                row_bytes, RASTER_MAX
            ))
        })?;

        if row_bytes == 0 {
            return Ok(self);
        }

        for band in bitmap.bits.chunks(row_bytes * RASTER_MAX) {
            let y = (band.len() / row_bytes) as u16;
            self.buf.extend_from_slice(&[GS, b'v', b'0', 0]);
            self.buf.extend_from_slice(&x.to_le_bytes());
            self.buf.extend_from_slice(&y.to_le_bytes());
            self.buf.extend_from_slice(band);
        }
        Ok(self)
    }

    /// `ESC d n`
    pub fn feed(mut self, lines: u8) -> Self {
        if lines > 0 {
            self.buf.extend_from_slice(&[ESC, b'd', lines]);
        }
        self
    }

    /// `GS V 1`
    pub fn partial_cut(mut self) -> Self {
        self.buf.extend_from_slice(&[GS, b'V', 1]);
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba, RgbaImage};

    fn checker() -> MonoBitmap {
        // 10x2: row 0 black at x=0 and x=9, row 1 all white
        let mut gray = GrayImage::from_pixel(10, 2, Luma([255]));
        gray.put_pixel(0, 0, Luma([0]));
        gray.put_pixel(9, 0, Luma([127]));
        gray.put_pixel(5, 1, Luma([128]));
        MonoBitmap::from_gray(&gray)
    }

    #[test]
    fn test_threshold_and_packing() {
        let bitmap = checker();
        assert_eq!(bitmap.row_bytes(), 2);
        assert!(bitmap.is_black(0, 0));
        assert!(bitmap.is_black(9, 0));
        assert!(!bitmap.is_black(5, 1));
        assert_eq!(bitmap.rows().next().unwrap(), &[0x80, 0x40]);
    }

    #[test]
    fn test_crop_left_shifts_content() {
        let mut rgba = RgbaImage::from_pixel(20, 1, Rgba([255, 255, 255, 255]));
        rgba.put_pixel(7, 0, Rgba([0, 0, 0, 255]));

        let bitmap = MonoBitmap::from_receipt(&ReceiptImage::new(rgba), 7);
        assert_eq!(bitmap.width(), 13);
        assert!(bitmap.is_black(0, 0));
    }

    #[test]
    fn test_escpos_raster_layout() {
        let bitmap = checker();
        let bytes = EscPos::new()
            .raster(&bitmap)
            .unwrap()
            .feed(3)
            .partial_cut()
            .into_bytes();

        assert_eq!(&bytes[..2], &[0x1B, b'@']);
        assert_eq!(&bytes[2..10], &[0x1D, b'v', b'0', 0, 2, 0, 2, 0]);
        assert_eq!(bytes.len(), 10 + 4 + 3 + 3);
        assert_eq!(&bytes[bytes.len() - 6..], &[0x1B, b'd', 3, 0x1D, b'V', 1]);
    }

    #[test]
    fn test_tall_bitmap_is_split_into_bands() {
        let bitmap = MonoBitmap::from_gray(&GrayImage::new(8, 70_000));
        let bytes = EscPos::new().raster(&bitmap).unwrap().into_bytes();

        assert_eq!(&bytes[2..10], &[0x1D, b'v', b'0', 0, 1, 0, 0xFF, 0xFF]);
        let second = 10 + RASTER_MAX;
        assert_eq!(
            &bytes[second..second + 8],
            &[0x1D, b'v', b'0', 0, 1, 0, 0x71, 0x11]
        );
        assert_eq!(bytes.len(), 2 + 8 + RASTER_MAX + 8 + 4465);
    }

    #[test]
    fn test_too_wide_bitmap_is_rejected() {
        let bitmap = MonoBitmap::from_gray(&GrayImage::new(8 * 65_536, 1));
        assert!(matches!(
            EscPos::new().raster(&bitmap),
            Err(RenderError::Layout(_))
        ));
    }

    #[test]
    fn test_feed_zero_is_omitted() {
        assert_eq!(EscPos::new().feed(0).into_bytes(), vec![0x1B, b'@']);
    }

    #[test]
    fn test_bmp_header() {
        let bmp = checker().to_bmp();

        assert_eq!(&bmp[..2], b"BM");
        let file_size = u32::from_le_bytes(bmp[2..6].try_into().unwrap());
        assert_eq!(file_size as usize, bmp.len());
        // 2 rows padded to 4 bytes each
        assert_eq!(bmp.len(), 62 + 8);
        assert_eq!(u16::from_le_bytes(bmp[28..30].try_into().unwrap()), 1);
        // Bottom-up: first stored row is the all-white one
        assert_eq!(&bmp[62..66], &[0, 0, 0, 0]);
        assert_eq!(&bmp[66..68], &[0x80, 0x40]);
    }

    #[test]
    fn test_bmp_decodes_with_image_crate() {
        let decoded = image::load_from_memory(&checker().to_bmp()).unwrap().to_luma8();
        assert_eq!(decoded.dimensions(), (10, 2));
        assert_eq!(decoded.get_pixel(0, 0).0[0], 0);
        assert_eq!(decoded.get_pixel(1, 0).0[0], 255);
    }
}
