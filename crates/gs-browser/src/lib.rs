//! gs-browser: kiosk browser session
//!
//! Drives a visible Chrome window through headless_chrome:
//!
//! - launch with a persistent profile and kiosk flags
//! - sign in to the chat service (email pre-filled, operator finishes)
//! - read the chat transcript and chat-input commands ([`gs_core::TranscriptSource`])
//! - swap between the idle and printing overlays ([`gs_core::ScreenController`])

pub mod error;
pub mod screens;
pub mod session;
pub mod transcript;

pub use error::{BrowserError, Result};
pub use screens::{BrowserScreens, ScreenDocuments};
pub use session::{BrowserSession, LoginState, SessionConfig, SessionConfigBuilder, origin_of};
pub use transcript::{TRANSCRIPT_SCRIPT, command_script};
