//! Receipt Renderer
//!
//! Each persona type has its own receipt art at `<templates_dir>/<n>.png`;
//! orders without a type, or whose art is missing, use `1.png`. Text slots
//! are drawn in order with one font. A slot's size steps down 1 px at a
//! time until the text fits its width, never below [`MIN_FONT_SIZE`].

use std::io::Cursor;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use gs_core::{OrderRecord, ReceiptConfig};
use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use tracing::{debug, warn};

use crate::error::{RenderError, Result};
use crate::layout::{MIN_FONT_SIZE, TextSlot, slots_from_config};

const DEFAULT_TEMPLATE: u8 = 1;
const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// A rendered receipt
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptImage {
    image: RgbaImage,
}

impl ReceiptImage {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }

    /// PNG encoding
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        self.image.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_png()?)?;
        Ok(())
    }
}

/// Draws order records onto receipt templates
pub struct ReceiptRenderer {
    font: FontVec,
    templates_dir: PathBuf,
    slots: Vec<TextSlot>,
}

impl ReceiptRenderer {
    /// Load the font and layout named in the receipt configuration
    pub fn new(config: &ReceiptConfig) -> Result<Self> {
        let font_bytes = std::fs::read(&config.font_path).map_err(|e| {
            RenderError::Font(format!("Failed to read {}: {}", config.font_path, e))
        })?;

        Self::from_font(
            font_bytes,
            &config.templates_dir,
            slots_from_config(&config.slots)?,
        )
    }

    pub fn from_font(
        font_bytes: Vec<u8>,
        templates_dir: impl Into<PathBuf>,
        slots: Vec<TextSlot>,
    ) -> Result<Self> {
        let font = FontVec::try_from_vec(font_bytes)
            .map_err(|e| RenderError::Font(format!("Invalid font: {}", e)))?;

        Ok(Self {
            font,
            templates_dir: templates_dir.into(),
            slots,
        })
    }

    /// Template for a persona type, falling back to the default art
    pub fn template_path(&self, type_number: Option<u8>) -> Result<PathBuf> {
        let wanted = type_number.unwrap_or(DEFAULT_TEMPLATE);
        let path = self.templates_dir.join(format!("{}.png", wanted));
        if path.is_file() {
            return Ok(path);
        }

        let fallback = self.templates_dir.join(format!("{}.png", DEFAULT_TEMPLATE));
        if wanted != DEFAULT_TEMPLATE {
            warn!(
                "Receipt template {} not found, using {}",
                path.display(),
                fallback.display()
            );
        }

        if fallback.is_file() {
            Ok(fallback)
        } else {
            Err(RenderError::TemplateMissing(fallback))
        }
    }

    pub fn render(&self, record: &OrderRecord) -> Result<ReceiptImage> {
        let template = self.template_path(record.type_number)?;
        let mut image = image::open(&template)?.to_rgba8();

        for slot in &self.slots {
            let text = slot.field.value(record);
            if text.is_empty() {
                continue;
            }

            let scale = self.fit_scale(text, slot);
            let (width, _) = text_size(scale, &self.font, text);
            let x = slot.left_edge(width);
            let ascent = self.font.as_scaled(scale).ascent();
            let y = slot.baseline - ascent.round() as i32;

            debug!(
                "Drawing {:?} at ({}, {}) size {}",
                slot.field, x, y, scale.y
            );

            draw_text_mut(&mut image, INK, x, y, scale, &self.font, text);
        }

        Ok(ReceiptImage::new(image))
    }

    /// Largest size from the slot's start size that fits its width
    fn fit_scale(&self, text: &str, slot: &TextSlot) -> PxScale {
        let mut size = slot.font_size;
        while size > MIN_FONT_SIZE {
            let (width, _) = text_size(PxScale::from(size), &self.font, text);
            if width <= slot.max_width {
                break;
            }
            size -= 1.0;
        }
        PxScale::from(size.max(MIN_FONT_SIZE))
    }
}
