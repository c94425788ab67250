//! Browser session management
//!
//! One visible Chrome window for the lifetime of the kiosk. The profile
//! directory is persistent so the chat service login survives restarts.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use gs_core::Credentials;
use headless_chrome::{Browser, LaunchOptionsBuilder, Tab};
use tracing::{debug, info, warn};

use crate::error::{BrowserError, Result};

/// Browser launch configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Whether to run in headless mode
    pub headless: bool,
    /// Fullscreen kiosk window
    pub kiosk: bool,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Element wait timeout in seconds
    pub element_timeout: u64,
    /// Persistent profile directory
    pub user_data_dir: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: false,
            kiosk: true,
            width: 1920,
            height: 1080,
            element_timeout: 10,
            user_data_dir: None,
        }
    }
}

impl SessionConfig {
    /// Create a new configuration builder
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }
}

impl From<&gs_core::BrowserConfig> for SessionConfig {
    fn from(config: &gs_core::BrowserConfig) -> Self {
        Self::builder()
            .headless(config.headless)
            .kiosk(config.kiosk)
            .user_data_dir(&config.user_data_dir)
            .build()
    }
}

/// Builder for SessionConfig
#[derive(Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn kiosk(mut self, kiosk: bool) -> Self {
        self.config.kiosk = kiosk;
        self
    }

    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    pub fn element_timeout(mut self, seconds: u64) -> Self {
        self.config.element_timeout = seconds;
        self
    }

    pub fn user_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.user_data_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> SessionConfig {
        self.config
    }
}

/// Outcome of starting the sign-in flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    /// The profile was already signed in
    SignedIn,
    /// Credentials were entered as far as possible; the operator finishes
    AwaitingOperator,
}

/// Managed browser session
pub struct BrowserSession {
    browser: Browser,
    config: SessionConfig,
}

impl BrowserSession {
    /// Launch Chrome with the given configuration
    pub fn launch(config: SessionConfig) -> Result<Self> {
        use std::ffi::OsStr;

        info!(
            "Launching browser (headless: {}, kiosk: {})",
            config.headless, config.kiosk
        );

        let args = launch_args(&config);
        let os_args: Vec<&OsStr> = args.iter().map(OsStr::new).collect();

        if let Some(dir) = &config.user_data_dir {
            std::fs::create_dir_all(dir).map_err(|e| {
                BrowserError::Initialization(format!(
                    "Failed to create profile dir {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        let launch_options = LaunchOptionsBuilder::default()
            .headless(config.headless)
            .window_size(Some((config.width, config.height)))
            .user_data_dir(config.user_data_dir.clone())
            .idle_browser_timeout(Duration::from_secs(u32::MAX as u64))
            .args(os_args)
            .build()
            .map_err(|e| {
                BrowserError::Initialization(format!("Failed to build launch options: {}", e))
            })?;

        let browser = Browser::new(launch_options).map_err(|e| {
            BrowserError::Initialization(format!("Failed to launch browser: {}", e))
        })?;

        info!("Browser session created successfully");

        Ok(Self { browser, config })
    }

    /// Get the active tab
    pub fn active_tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.browser.get_tabs();
        let tabs_guard = tabs
            .lock()
            .map_err(|e| BrowserError::TabError(format!("Failed to lock tabs: {}", e)))?;

        tabs_guard
            .first()
            .cloned()
            .ok_or_else(|| BrowserError::TabError("No active tab available".to_string()))
    }

    /// Navigate to a URL and wait for the load to finish
    pub fn navigate(&self, url: &str) -> Result<()> {
        let tab = self.active_tab()?;

        debug!("Navigating to: {}", url);

        tab.navigate_to(url).map_err(|e| {
            BrowserError::Navigation(format!("Failed to navigate to {}: {}", url, e))
        })?;

        tab.wait_until_navigated()
            .map_err(|e| BrowserError::Navigation(format!("Navigation timeout: {}", e)))?;

        Ok(())
    }

    /// URL currently shown in the active tab
    pub fn current_url(&self) -> Result<String> {
        Ok(self.active_tab()?.get_url())
    }

    /// Whether the active tab's URL starts with `prefix`
    pub fn is_at(&self, prefix: &str) -> Result<bool> {
        Ok(self.current_url()?.starts_with(prefix))
    }

    /// Type text into an element
    pub fn type_text(&self, selector: &str, text: &str) -> Result<()> {
        let tab = self.active_tab()?;

        debug!("Typing into element: {} ({} chars)", selector, text.len());

        let element = tab
            .wait_for_element_with_custom_timeout(
                selector,
                Duration::from_secs(self.config.element_timeout),
            )
            .map_err(|e| {
                BrowserError::ElementNotFound(format!("Element '{}' not found: {}", selector, e))
            })?;

        element.click().map_err(|e| {
            BrowserError::Interaction(format!("Failed to focus '{}': {}", selector, e))
        })?;

        element.type_into(text).map_err(|e| {
            BrowserError::Interaction(format!("Failed to type into '{}': {}", selector, e))
        })?;

        Ok(())
    }

    /// Click an element
    pub fn click(&self, selector: &str) -> Result<()> {
        let tab = self.active_tab()?;

        debug!("Clicking element: {}", selector);

        tab.wait_for_element_with_custom_timeout(
            selector,
            Duration::from_secs(self.config.element_timeout),
        )
        .map_err(|e| {
            BrowserError::ElementNotFound(format!("Element '{}' not found: {}", selector, e))
        })?
        .click()
        .map_err(|e| BrowserError::Interaction(format!("Failed to click '{}': {}", selector, e)))?;

        Ok(())
    }

    /// Execute JavaScript and return its value
    pub fn evaluate_js(&self, script: &str) -> Result<serde_json::Value> {
        let tab = self.active_tab()?;

        let result = tab.evaluate(script, false).map_err(|e| {
            BrowserError::Interaction(format!("JavaScript execution failed: {}", e))
        })?;

        Ok(result.value.unwrap_or(serde_json::Value::Null))
    }

    /// Start the sign-in flow
    ///
    /// Opens `login_url`; when the browser lands on `home_origin` the
    /// profile is already signed in. Otherwise the email (and password, if
    /// configured) are entered. Anything past that, such as 2FA or passkey
    /// prompts, is left to the operator.
    pub fn begin_login(
        &self,
        login_url: &str,
        home_origin: &str,
        credentials: &Credentials,
    ) -> Result<LoginState> {
        info!("Opening sign-in page");
        self.navigate(login_url)?;

        if self.is_at(home_origin)? {
            info!("Already signed in");
            return Ok(LoginState::SignedIn);
        }

        info!("Sign-in required for {}", credentials.email);

        if let Err(e) = self.enter_credentials(credentials) {
            warn!("Automated sign-in stopped: {}", e);
        }

        if self.is_at(home_origin)? {
            return Ok(LoginState::SignedIn);
        }

        info!("Waiting for the operator to finish signing in");
        Ok(LoginState::AwaitingOperator)
    }

    fn enter_credentials(&self, credentials: &Credentials) -> Result<()> {
        self.type_text("#identifierId", &credentials.email)?;
        self.click("#identifierNext")?;

        if let Some(password) = &credentials.password {
            self.type_text("input[type='password']", password)?;
            self.click("#passwordNext")?;
        }

        Ok(())
    }

    /// Get the session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        info!("Closing browser session");
    }
}

fn launch_args(config: &SessionConfig) -> Vec<String> {
    let mut args = vec![
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-gpu".to_string(),
        "--disable-software-rasterizer".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--start-maximized".to_string(),
    ];

    if config.kiosk {
        if cfg!(windows) {
            args.push("--kiosk".to_string());
        } else {
            args.push("--start-fullscreen".to_string());
        }
    }

    args
}

/// Scheme and host of a URL, e.g. `https://gemini.google.com`
pub fn origin_of(url: &str) -> &str {
    let Some(scheme_end) = url.find("://") else {
        return url;
    };
    let host_start = scheme_end + 3;
    match url[host_start..].find('/') {
        Some(i) => &url[..host_start + i],
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert!(!config.headless);
        assert!(config.kiosk);
        assert_eq!(config.width, 1920);
        assert!(config.user_data_dir.is_none());
    }

    #[test]
    fn test_session_config_builder() {
        let config = SessionConfig::builder()
            .headless(true)
            .kiosk(false)
            .window_size(1280, 720)
            .element_timeout(3)
            .user_data_dir("profile")
            .build();

        assert!(config.headless);
        assert!(!config.kiosk);
        assert_eq!(config.width, 1280);
        assert_eq!(config.height, 720);
        assert_eq!(config.element_timeout, 3);
        assert_eq!(config.user_data_dir, Some(PathBuf::from("profile")));
    }

    #[test]
    fn test_session_config_from_core() {
        let core = gs_core::BrowserConfig {
            headless: true,
            user_data_dir: "chrome_user_data".to_string(),
            ..Default::default()
        };
        let config = SessionConfig::from(&core);
        assert!(config.headless);
        assert_eq!(config.user_data_dir, Some(PathBuf::from("chrome_user_data")));
    }

    #[test]
    fn test_launch_args_kiosk() {
        let args = launch_args(&SessionConfig::default());
        assert!(args.iter().any(|a| a == "--kiosk" || a == "--start-fullscreen"));

        let args = launch_args(&SessionConfig::builder().kiosk(false).build());
        assert!(!args.iter().any(|a| a == "--kiosk" || a == "--start-fullscreen"));
    }

    #[test]
    fn test_origin_of() {
        assert_eq!(
            origin_of("https://gemini.google.com/gem/abc?x=1"),
            "https://gemini.google.com"
        );
        assert_eq!(origin_of("https://gemini.google.com"), "https://gemini.google.com");
        assert_eq!(origin_of("not a url"), "not a url");
    }
}
