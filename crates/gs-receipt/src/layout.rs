//! Text slots on the receipt art

use gs_core::{OrderRecord, TextSlotConfig};

use crate::error::{RenderError, Result};

/// Smallest font size tried before the text is drawn regardless of width
pub const MIN_FONT_SIZE: f32 = 6.0;

/// Order field drawn into a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Item,
    Notes,
}

impl Field {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "name" => Some(Self::Name),
            "item" => Some(Self::Item),
            "notes" => Some(Self::Notes),
            _ => None,
        }
    }

    pub fn value<'a>(&self, record: &'a OrderRecord) -> &'a str {
        match self {
            Field::Name => &record.name,
            Field::Item => &record.item,
            Field::Notes => &record.notes,
        }
    }
}

/// Horizontal anchoring of a slot's `x`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// Text starts at `x`
    Left,
    /// Text ends at `x`
    Right,
}

impl Align {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// One positioned text field
#[derive(Debug, Clone, PartialEq)]
pub struct TextSlot {
    pub field: Field,
    pub x: i32,
    pub baseline: i32,
    pub max_width: u32,
    pub min_x: i32,
    pub font_size: f32,
    pub align: Align,
}

impl TextSlot {
    pub fn from_config(config: &TextSlotConfig) -> Result<Self> {
        let field = Field::parse(&config.field)
            .ok_or_else(|| RenderError::Layout(format!("unknown field: {}", config.field)))?;
        let align = Align::parse(&config.align)
            .ok_or_else(|| RenderError::Layout(format!("unknown alignment: {}", config.align)))?;

        if config.font_size < MIN_FONT_SIZE {
            return Err(RenderError::Layout(format!(
                "font size {} for {} is below {}",
                config.font_size, config.field, MIN_FONT_SIZE
            )));
        }

        Ok(Self {
            field,
            x: config.x,
            baseline: config.baseline,
            max_width: config.max_width,
            min_x: config.min_x,
            font_size: config.font_size,
            align,
        })
    }

    /// Left edge for text of `width` pixels, clamped to `min_x`
    pub fn left_edge(&self, width: u32) -> i32 {
        let x = match self.align {
            Align::Left => self.x,
            Align::Right => self.x - width as i32,
        };
        x.max(self.min_x)
    }
}

/// Parse every configured slot
pub fn slots_from_config(configs: &[TextSlotConfig]) -> Result<Vec<TextSlot>> {
    configs.iter().map(TextSlot::from_config).collect()
}
