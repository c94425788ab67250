//! Print job

use gs_core::PrinterConfig;
use gs_receipt::{EscPos, MonoBitmap, ReceiptImage};

use crate::error::Result;

/// A receipt ready for the printer
#[derive(Debug, Clone)]
pub struct PrintJob {
    bitmap: MonoBitmap,
    feed_lines: u8,
    cut: bool,
}

impl PrintJob {
    pub fn new(bitmap: MonoBitmap, feed_lines: u8, cut: bool) -> Self {
        Self {
            bitmap,
            feed_lines,
            cut,
        }
    }

    /// Crop and threshold a rendered receipt per printer settings
    pub fn from_receipt(receipt: &ReceiptImage, config: &PrinterConfig) -> Self {
        Self::new(
            MonoBitmap::from_receipt(receipt, config.crop_left),
            config.feed_lines,
            config.cut,
        )
    }

    pub fn bitmap(&self) -> &MonoBitmap {
        &self.bitmap
    }

    pub fn feed_lines(&self) -> u8 {
        self.feed_lines
    }

    pub fn cut(&self) -> bool {
        self.cut
    }

    /// Complete ESC/POS stream: raster, feed, optional partial cut
    pub fn escpos(&self) -> Result<Vec<u8>> {
        let cmd = EscPos::new().raster(&self.bitmap)?.feed(self.feed_lines);
        if self.cut {
            Ok(cmd.partial_cut().into_bytes())
        } else {
            Ok(cmd.into_bytes())
        }
    }
}
