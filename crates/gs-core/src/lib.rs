//! gs-core: Gems Station kiosk core library
//!
//! Configuration, credentials, the LLM completion client, and the
//! trigger-and-parse workflow that turns a chat transcript into an
//! [`OrderRecord`]. The browser, renderer and printer crates plug into the
//! seams defined in [`screen`] and [`transcript`].

pub mod command;
pub mod config;
pub mod credentials;
pub mod error;
pub mod extractor;
pub mod llm;
pub mod menu;
pub mod order;
pub mod screen;
pub mod transcript;
pub mod trigger;

pub use command::OperatorCommand;
pub use config::{
    BrowserConfig, Config, LlmConfig, LlmProvider, PrinterConfig, ReceiptConfig, TextSlotConfig,
    TriggerConfig,
};
pub use credentials::Credentials;
pub use error::{Error, Result};
pub use extractor::{FieldExtractor, LlmFieldExtractor, parse_order_response};
pub use llm::LlmClient;
pub use menu::{MenuReference, PersonaType};
pub use order::OrderRecord;
pub use screen::{ScreenController, ScreenMode};
pub use transcript::TranscriptSource;
pub use trigger::{Trigger, TriggerDetector};
