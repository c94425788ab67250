//! Idle and printing overlays
//!
//! Both overlays are plain HTML documents opened in the kiosk tab. The
//! defaults ship inside the binary; a deployment can point at its own files.
//! `{{CHAT_URL}}` in either document is replaced with the configured chat
//! URL as a JavaScript string literal.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use gs_core::{BrowserConfig, ScreenController, ScreenMode};
use tracing::{debug, info};

use crate::error::{BrowserError, Result};
use crate::session::BrowserSession;

const IDLE_HTML: &str = include_str!("../assets/idle.html");
const PRINTING_HTML: &str = include_str!("../assets/printing.html");
/// Hides chat page controls; a second run on the same page is a no-op
const LOCKDOWN_SCRIPT: &str = include_str!("../assets/lockdown.js");
const CHAT_URL_PLACEHOLDER: &str = "{{CHAT_URL}}";

/// Set by the printing overlay once its animation has finished
const TRANSITION_CHECK: &str = "window.transitionComplete === true";

/// Overlay documents materialized on disk
#[derive(Debug, Clone)]
pub struct ScreenDocuments {
    idle: PathBuf,
    printing: PathBuf,
}

impl ScreenDocuments {
    /// Write both overlays into `dir`, substituting the chat URL
    pub fn prepare(config: &BrowserConfig, dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| {
            BrowserError::Screen(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        let idle = write_document(
            dir.join("idle.html"),
            config.idle_screen.as_deref(),
            IDLE_HTML,
            &config.chat_url,
        )?;
        let printing = write_document(
            dir.join("printing.html"),
            config.printing_screen.as_deref(),
            PRINTING_HTML,
            &config.chat_url,
        )?;

        debug!("Overlay documents written to {}", dir.display());

        Ok(Self { idle, printing })
    }

    pub fn path(&self, mode: ScreenMode) -> &Path {
        match mode {
            ScreenMode::Idle => &self.idle,
            ScreenMode::Printing => &self.printing,
        }
    }

    /// `file://` URL for the overlay
    pub fn url(&self, mode: ScreenMode) -> Result<String> {
        file_url(self.path(mode))
    }
}

fn write_document(
    target: PathBuf,
    custom: Option<&str>,
    embedded: &str,
    chat_url: &str,
) -> Result<PathBuf> {
    let source = match custom {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            BrowserError::Screen(format!("Failed to read overlay {}: {}", path, e))
        })?,
        None => embedded.to_string(),
    };

    let html = render_document(&source, chat_url);
    std::fs::write(&target, html).map_err(|e| {
        BrowserError::Screen(format!("Failed to write {}: {}", target.display(), e))
    })?;

    Ok(target)
}

fn render_document(source: &str, chat_url: &str) -> String {
    let literal = serde_json::Value::String(chat_url.to_string()).to_string();
    source.replace(CHAT_URL_PLACEHOLDER, &literal)
}

fn file_url(path: &Path) -> Result<String> {
    let absolute = path.canonicalize().map_err(|e| {
        BrowserError::Screen(format!("Failed to resolve {}: {}", path.display(), e))
    })?;

    let raw = absolute.to_string_lossy();
    // Windows verbatim prefix and separators
    let raw = raw.strip_prefix(r"\\?\").unwrap_or(&raw).replace('\\', "/");

    if raw.starts_with('/') {
        Ok(format!("file://{}", raw))
    } else {
        Ok(format!("file:///{}", raw))
    }
}

/// [`ScreenController`] driving the kiosk tab
pub struct BrowserScreens {
    session: Arc<BrowserSession>,
    documents: ScreenDocuments,
    chat_url: String,
}

impl BrowserScreens {
    pub fn new(
        session: Arc<BrowserSession>,
        documents: ScreenDocuments,
        chat_url: impl Into<String>,
    ) -> Self {
        Self {
            session,
            documents,
            chat_url: chat_url.into(),
        }
    }
}

impl ScreenController for BrowserScreens {
    fn show(&self, mode: ScreenMode) -> gs_core::Result<()> {
        info!("Showing {} screen", mode);
        let url = self.documents.url(mode)?;
        self.session.navigate(&url)?;
        Ok(())
    }

    fn is_settled(&self, mode: ScreenMode) -> gs_core::Result<bool> {
        match mode {
            ScreenMode::Idle => Ok(self.session.is_at(&self.chat_url)?),
            ScreenMode::Printing => Ok(self.session.evaluate_js(TRANSITION_CHECK)?
                == serde_json::Value::Bool(true)),
        }
    }

    fn lock_down_chat(&self) -> gs_core::Result<()> {
        if self.session.evaluate_js(LOCKDOWN_SCRIPT)? == serde_json::Value::Bool(true) {
            debug!("Chat page controls hidden");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config() -> BrowserConfig {
        BrowserConfig {
            chat_url: "https://gemini.google.com/gem/abc".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_embedded_documents_carry_placeholder() {
        assert!(IDLE_HTML.contains(CHAT_URL_PLACEHOLDER));
        assert!(PRINTING_HTML.contains("transitionComplete"));
    }

    #[test]
    fn test_lockdown_script_hides_navigation() {
        let script = LOCKDOWN_SCRIPT.trim();
        assert!(script.starts_with("(() =>"));
        assert!(script.ends_with("})()"));
        for selector in ["'bard-sidenav'", "'.bot-recent-chats'", "'.mic-button-container'"] {
            assert!(script.contains(selector), "missing {}", selector);
        }
    }

    #[test]
    fn test_render_document_quotes_url() {
        let html = render_document("location.href = {{CHAT_URL}};", "https://x/\"y\"");
        assert_eq!(html, r#"location.href = "https://x/\"y\"";"#);
    }

    #[test]
    fn test_prepare_writes_both_documents() {
        let dir = TempDir::new().unwrap();
        let docs = ScreenDocuments::prepare(&config(), dir.path()).unwrap();

        let idle = std::fs::read_to_string(docs.path(ScreenMode::Idle)).unwrap();
        assert!(idle.contains("\"https://gemini.google.com/gem/abc\""));
        assert!(!idle.contains(CHAT_URL_PLACEHOLDER));
        assert!(docs.path(ScreenMode::Printing).ends_with("printing.html"));
    }

    #[test]
    fn test_custom_document_is_used() {
        let dir = TempDir::new().unwrap();
        let custom = dir.path().join("my-idle.html");
        std::fs::write(&custom, "<a href='#' data-url={{CHAT_URL}}>go</a>").unwrap();

        let mut cfg = config();
        cfg.idle_screen = Some(custom.to_string_lossy().into_owned());

        let docs = ScreenDocuments::prepare(&cfg, dir.path().join("out")).unwrap();
        let idle = std::fs::read_to_string(docs.path(ScreenMode::Idle)).unwrap();
        assert!(idle.starts_with("<a href='#' data-url=\"https://gemini.google.com/gem/abc\""));
    }

    #[test]
    fn test_missing_custom_document_is_error() {
        let dir = TempDir::new().unwrap();
        let mut cfg = config();
        cfg.printing_screen = Some("/nonexistent/printing.html".to_string());

        assert!(matches!(
            ScreenDocuments::prepare(&cfg, dir.path()),
            Err(BrowserError::Screen(_))
        ));
    }

    #[test]
    fn test_url_is_file_scheme() {
        let dir = TempDir::new().unwrap();
        let docs = ScreenDocuments::prepare(&config(), dir.path()).unwrap();
        let url = docs.url(ScreenMode::Idle).unwrap();

        assert!(url.starts_with("file:///"));
        assert!(url.ends_with("/idle.html"));
        assert!(!url.contains('\\'));
    }
}
