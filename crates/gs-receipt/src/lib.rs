//! gs-receipt: receipt rendering
//!
//! Draws an order onto the receipt art for its persona type and turns the
//! result into something a thermal printer accepts: a 1-bit bitmap, ESC/POS
//! raster bytes, or a monochrome BMP for the vendor SDK.

pub mod error;
pub mod layout;
pub mod raster;
pub mod renderer;

pub use error::{RenderError, Result};
pub use layout::{Align, Field, TextSlot};
pub use raster::{EscPos, MonoBitmap};
pub use renderer::{ReceiptImage, ReceiptRenderer};
