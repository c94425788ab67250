//! Transcript Source seam
//!
//! The browser session is the production implementation; tests feed
//! canned snapshots.

use crate::command::OperatorCommand;
use crate::error::Result;

/// Produces the visible text of the current chat page
pub trait TranscriptSource: Send + Sync {
    /// Capture one immutable snapshot of the transcript
    ///
    /// Failures here mean the browser session is gone and are fatal to the
    /// kiosk loop.
    fn snapshot(&self) -> Result<String>;

    /// Take a command word sitting in the chat input, clearing it
    fn take_command(&self) -> Result<Option<OperatorCommand>> {
        Ok(None)
    }
}
