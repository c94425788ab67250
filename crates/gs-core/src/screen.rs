//! Screen Controller seam
//!
//! Two full-window overlays: the idle screen shown between customers and
//! the printing screen shown while a receipt is produced.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Which overlay is in the foreground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenMode {
    /// Waiting for the next customer
    #[default]
    Idle,
    /// Receipt is being produced
    Printing,
}

impl std::fmt::Display for ScreenMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScreenMode::Idle => write!(f, "idle"),
            ScreenMode::Printing => write!(f, "printing"),
        }
    }
}

/// Switches the foreground overlay
pub trait ScreenController: Send + Sync {
    /// Bring the overlay for `mode` to the foreground
    fn show(&self, mode: ScreenMode) -> Result<()>;

    /// Whether the overlay's own interaction has finished
    ///
    /// Idle: the operator pressed continue and the chat page is loaded.
    /// Printing: the transition animation completed. Callers poll this
    /// between sleeps and apply their own time bound.
    fn is_settled(&self, mode: ScreenMode) -> Result<bool>;

    /// Hide the chat page controls a customer could leave the kiosk with
    ///
    /// Called each time the chat page is reached from the idle screen.
    fn lock_down_chat(&self) -> Result<()> {
        Ok(())
    }
}
