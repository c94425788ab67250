//! Order Record: the structured result of one trigger event

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Highest persona type number a receipt template can exist for
pub const MAX_TYPE_NUMBER: u8 = 24;

/// Fields extracted from one chat order
///
/// Built once per trigger event, consumed once by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Customer name as printed on the receipt
    pub name: String,
    /// Item or selection ordered
    pub item: String,
    /// Free-form notes (may be empty)
    #[serde(default)]
    pub notes: String,
    /// Persona type; selects the receipt template when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_number: Option<u8>,
}

impl OrderRecord {
    pub fn new(name: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            item: item.into(),
            notes: String::new(),
            type_number: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_type_number(mut self, type_number: u8) -> Self {
        self.type_number = Some(type_number);
        self
    }

    /// Name and item must be non-empty before anything is printed
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidOrder("name is empty".to_string()));
        }
        if self.item.trim().is_empty() {
            return Err(Error::InvalidOrder("item is empty".to_string()));
        }
        if let Some(n) = self.type_number {
            if n == 0 || n > MAX_TYPE_NUMBER {
                return Err(Error::InvalidOrder(format!(
                    "type number {} outside 1..={}",
                    n, MAX_TYPE_NUMBER
                )));
            }
        }
        Ok(())
    }

    /// Write the record as pretty JSON (debug artifact)
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
