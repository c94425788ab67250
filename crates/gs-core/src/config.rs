//! Configuration management
//!
//! Settings are resolved in this order (later wins):
//! 1. Defaults
//! 2. `gems-station.toml` (or the file named by `GEMS_STATION_CONFIG`)
//! 3. Environment variables
//!
//! `${VAR_NAME}` inside the TOML file is expanded from the environment
//! before parsing.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "gems-station.toml";

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "GEMS_STATION_CONFIG";

/// LLM Provider type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Google Gemini `generateContent`
    #[default]
    Gemini,
    /// Anthropic Claude Messages API
    Claude,
    /// OpenAI-compatible chat completions
    OpenAi,
}

impl LlmProvider {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "claude" | "anthropic" => LlmProvider::Claude,
            "openai" | "glm" | "zai" => LlmProvider::OpenAi,
            _ => LlmProvider::Gemini,
        }
    }

    /// Default API endpoint for the provider
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            LlmProvider::Claude => "https://api.anthropic.com/v1",
            LlmProvider::OpenAi => "https://api.openai.com/v1",
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key (resolved from `api_key_file` when empty)
    #[serde(skip_serializing)]
    pub api_key: String,

    /// File holding the API key on a single line
    pub api_key_file: Option<String>,

    /// Model to use
    pub model: String,

    /// API provider
    pub provider: LlmProvider,

    /// Base URL (optional, for custom endpoints)
    pub base_url: Option<String>,

    /// Whole-request timeout in seconds
    pub timeout_secs: u64,

    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,

    /// Upper bound on generated tokens
    pub max_tokens: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_key_file: Some(default_api_key_file()),
            model: default_model(),
            provider: LlmProvider::Gemini,
            base_url: None,
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_tokens: 1024,
        }
    }
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_api_key_file() -> String {
    "gemini_api_key.txt".to_string()
}

/// Browser session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Chat page the idle screen continues to
    pub chat_url: String,
    /// Sign-in page opened at startup
    pub login_url: String,
    /// JSON file holding the login email
    pub credentials_file: String,
    /// Persistent Chrome profile so the login survives restarts
    pub user_data_dir: String,
    /// Run without a visible window
    pub headless: bool,
    /// Launch fullscreen in kiosk mode
    pub kiosk: bool,
    /// Custom idle overlay document (embedded default when unset)
    pub idle_screen: Option<String>,
    /// Custom printing overlay document (embedded default when unset)
    pub printing_screen: Option<String>,
    /// Upper bound on how long the printing overlay stays up
    pub printing_screen_secs: u64,
    /// How long to wait for the operator to finish a manual login (0 = forever)
    pub login_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            chat_url: "https://gemini.google.com/gem/".to_string(),
            login_url: "https://accounts.google.com/v3/signin/identifier?continue=https://gemini.google.com/&hl=en".to_string(),
            credentials_file: "credentials.json".to_string(),
            user_data_dir: "chrome_user_data".to_string(),
            headless: false,
            kiosk: true,
            idle_screen: None,
            printing_screen: None,
            printing_screen_secs: 15,
            login_timeout_secs: 0,
        }
    }
}

/// Trigger detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Keyword whose appearance starts order processing
    pub keyword: String,
    /// Sleep between transcript polls in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            keyword: "Gems Station".to_string(),
            poll_interval_ms: 500,
        }
    }
}

/// One text slot of the receipt layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextSlotConfig {
    /// Record field drawn in this slot (`name`, `item` or `notes`)
    pub field: String,
    /// Anchor x: right edge for right alignment, left edge otherwise
    pub x: i32,
    /// Baseline y
    pub baseline: i32,
    /// Maximum text width before the font shrinks
    pub max_width: u32,
    /// Text never starts left of this x
    #[serde(default)]
    pub min_x: i32,
    /// Starting font size in pixels
    pub font_size: f32,
    /// `left` or `right`
    #[serde(default = "default_align")]
    pub align: String,
}

fn default_align() -> String {
    "left".to_string()
}

/// Receipt rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptConfig {
    /// Directory holding `<type>.png` templates
    pub templates_dir: String,
    /// TrueType font used for all slots
    pub font_path: String,
    /// Persona/menu reference table included in the extraction prompt
    pub menu_csv: Option<String>,
    /// Where to keep a copy of the last rendered receipt
    pub debug_image: Option<String>,
    /// Where to keep the last parsed order as JSON
    pub debug_record: Option<String>,
    /// Text slots, drawn in order
    pub slots: Vec<TextSlotConfig>,
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self {
            templates_dir: "res/receipt".to_string(),
            font_path: "res/NotoSansKR-Medium.ttf".to_string(),
            menu_csv: Some("res/GML25_F&B Menu.csv".to_string()),
            debug_image: Some("thermal_print.png".to_string()),
            debug_record: Some("parsed_conversation.json".to_string()),
            slots: default_slots(),
        }
    }
}

/// Stock layout: the name sits right-aligned in the header box of the
/// receipt art, item and notes run underneath.
pub fn default_slots() -> Vec<TextSlotConfig> {
    vec![
        TextSlotConfig {
            field: "name".to_string(),
            x: 302,
            baseline: 66,
            max_width: 162,
            min_x: 140,
            font_size: 36.0,
            align: "right".to_string(),
        },
        TextSlotConfig {
            field: "item".to_string(),
            x: 24,
            baseline: 120,
            max_width: 336,
            min_x: 0,
            font_size: 28.0,
            align: "left".to_string(),
        },
        TextSlotConfig {
            field: "notes".to_string(),
            x: 24,
            baseline: 156,
            max_width: 336,
            min_x: 0,
            font_size: 20.0,
            align: "left".to_string(),
        },
    ]
}

/// Printer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrinterConfig {
    /// Backends in the order they are tried
    pub backends: Vec<String>,
    /// Installed printer name used by the spooler backend
    pub printer_name: String,
    /// Directory holding `x64/HW_API.dll` and `x86/HW_API.dll`
    pub dll_dir: String,
    /// Raw device path for the device backend
    pub device_path: Option<String>,
    /// Pixels cropped from the left edge to compensate the printer margin
    pub crop_left: u32,
    /// Lines fed before cutting
    pub feed_lines: u8,
    /// Partial cut after the receipt
    pub cut: bool,
    /// 1-bit bitmap handed to the DLL backend
    pub bitmap_path: String,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            backends: vec!["spooler".to_string(), "hw_api".to_string()],
            printer_name: "HWASUNG HMK-072".to_string(),
            dll_dir: "thermal/windows SDK/bin".to_string(),
            device_path: None,
            crop_left: 7,
            feed_lines: 3,
            cut: true,
            bitmap_path: "thermal_print.bmp".to_string(),
        }
    }
}

/// Main configuration for the kiosk
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub llm: LlmConfig,
    pub browser: BrowserConfig,
    pub trigger: TriggerConfig,
    pub receipt: ReceiptConfig,
    pub printer: PrinterConfig,
}

impl Config {
    /// Expand `${VAR_NAME}` from the environment; unknown variables become empty
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::with_capacity(value.len());
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let mut cfg = Self::from_toml_str(&toml_content)?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Parse configuration from TOML text (no environment overrides)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let expanded = Self::expand_env_vars(content);

        let toml: TomlConfig = toml::from_str(&expanded)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        Ok(Self::from_toml_config(toml))
    }

    /// Load from the default location
    ///
    /// Uses `GEMS_STATION_CONFIG` when set, else `./gems-station.toml`, else
    /// defaults plus environment.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Self::from_toml_file(path);
        }

        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_toml_file(DEFAULT_CONFIG_FILE);
        }

        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Fill `llm.api_key` from `llm.api_key_file` when no key was given
    ///
    /// A missing file or an empty key is a startup-fatal configuration error.
    pub fn resolve_api_key(&mut self) -> Result<()> {
        if !self.llm.api_key.trim().is_empty() {
            return Ok(());
        }

        let path = self.llm.api_key_file.as_deref().ok_or_else(|| {
            Error::Config("No API key configured (set LLM_API_KEY or llm.api_key_file)".to_string())
        })?;

        let key = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read API key file {}: {}", path, e)))?;
        let key = key.trim();

        if key.is_empty() {
            return Err(Error::Config(format!("API key file {} is empty", path)));
        }

        self.llm.api_key = key.to_string();
        Ok(())
    }

    fn from_toml_config(toml: TomlConfig) -> Self {
        let defaults = Config::default();

        let llm = toml.llm.unwrap_or_default();
        let llm_config = LlmConfig {
            api_key: llm.api_key.unwrap_or_default(),
            api_key_file: llm.api_key_file.or(defaults.llm.api_key_file),
            model: llm.model.unwrap_or(defaults.llm.model),
            provider: llm
                .provider
                .as_deref()
                .map(LlmProvider::parse)
                .unwrap_or_default(),
            base_url: llm.base_url,
            timeout_secs: llm.timeout_secs.unwrap_or(defaults.llm.timeout_secs),
            connect_timeout_secs: llm
                .connect_timeout_secs
                .unwrap_or(defaults.llm.connect_timeout_secs),
            max_tokens: llm.max_tokens.unwrap_or(defaults.llm.max_tokens),
        };

        let browser = toml.browser.unwrap_or_default();
        let browser_config = BrowserConfig {
            chat_url: browser.chat_url.unwrap_or(defaults.browser.chat_url),
            login_url: browser.login_url.unwrap_or(defaults.browser.login_url),
            credentials_file: browser
                .credentials_file
                .unwrap_or(defaults.browser.credentials_file),
            user_data_dir: browser.user_data_dir.unwrap_or(defaults.browser.user_data_dir),
            headless: browser.headless.unwrap_or(defaults.browser.headless),
            kiosk: browser.kiosk.unwrap_or(defaults.browser.kiosk),
            idle_screen: browser.idle_screen,
            printing_screen: browser.printing_screen,
            printing_screen_secs: browser
                .printing_screen_secs
                .unwrap_or(defaults.browser.printing_screen_secs),
            login_timeout_secs: browser
                .login_timeout_secs
                .unwrap_or(defaults.browser.login_timeout_secs),
        };

        let trigger = toml.trigger.unwrap_or_default();
        let trigger_config = TriggerConfig {
            keyword: trigger.keyword.unwrap_or(defaults.trigger.keyword),
            poll_interval_ms: trigger
                .poll_interval_ms
                .unwrap_or(defaults.trigger.poll_interval_ms),
        };

        let receipt = toml.receipt.unwrap_or_default();
        let receipt_config = ReceiptConfig {
            templates_dir: receipt.templates_dir.unwrap_or(defaults.receipt.templates_dir),
            font_path: receipt.font_path.unwrap_or(defaults.receipt.font_path),
            menu_csv: receipt.menu_csv.or(defaults.receipt.menu_csv),
            debug_image: receipt.debug_image.or(defaults.receipt.debug_image),
            debug_record: receipt.debug_record.or(defaults.receipt.debug_record),
            slots: receipt
                .slots
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.receipt.slots),
        };

        let printer = toml.printer.unwrap_or_default();
        let printer_config = PrinterConfig {
            backends: printer
                .backends
                .filter(|b| !b.is_empty())
                .unwrap_or(defaults.printer.backends),
            printer_name: printer.printer_name.unwrap_or(defaults.printer.printer_name),
            dll_dir: printer.dll_dir.unwrap_or(defaults.printer.dll_dir),
            device_path: printer.device_path,
            crop_left: printer.crop_left.unwrap_or(defaults.printer.crop_left),
            feed_lines: printer.feed_lines.unwrap_or(defaults.printer.feed_lines),
            cut: printer.cut.unwrap_or(defaults.printer.cut),
            bitmap_path: printer.bitmap_path.unwrap_or(defaults.printer.bitmap_path),
        };

        Config {
            llm: llm_config,
            browser: browser_config,
            trigger: trigger_config,
            receipt: receipt_config,
            printer: printer_config,
        }
    }

    /// Override settings from environment variables
    fn apply_env_overrides(&mut self) {
        if let Some(key) = non_empty_env("GEMINI_API_KEY") {
            self.llm.api_key = key;
        }
        if let Some(key) = non_empty_env("LLM_API_KEY") {
            self.llm.api_key = key;
        }
        if let Some(model) = non_empty_env("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(provider) = non_empty_env("LLM_PROVIDER") {
            self.llm.provider = LlmProvider::parse(&provider);
        }
        if let Some(base_url) = non_empty_env("LLM_BASE_URL") {
            self.llm.base_url = Some(base_url);
        }
        if let Some(url) = non_empty_env("CHAT_URL") {
            self.browser.chat_url = url;
        }
        if let Some(keyword) = non_empty_env("TRIGGER_KEYWORD") {
            self.trigger.keyword = keyword;
        }
        if let Some(name) = non_empty_env("PRINTER_NAME") {
            self.printer.printer_name = name;
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

// ============================================================================
// TOML mirror structs (file parsing only)
// ============================================================================

#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    llm: Option<TomlLlmConfig>,
    browser: Option<TomlBrowserConfig>,
    trigger: Option<TomlTriggerConfig>,
    receipt: Option<TomlReceiptConfig>,
    printer: Option<TomlPrinterConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlLlmConfig {
    provider: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    api_key_file: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    connect_timeout_secs: Option<u64>,
    max_tokens: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlBrowserConfig {
    chat_url: Option<String>,
    login_url: Option<String>,
    credentials_file: Option<String>,
    user_data_dir: Option<String>,
    headless: Option<bool>,
    kiosk: Option<bool>,
    idle_screen: Option<String>,
    printing_screen: Option<String>,
    printing_screen_secs: Option<u64>,
    login_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlTriggerConfig {
    keyword: Option<String>,
    poll_interval_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlReceiptConfig {
    templates_dir: Option<String>,
    font_path: Option<String>,
    menu_csv: Option<String>,
    debug_image: Option<String>,
    debug_record: Option<String>,
    slots: Option<Vec<TextSlotConfig>>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlPrinterConfig {
    backends: Option<Vec<String>>,
    printer_name: Option<String>,
    dll_dir: Option<String>,
    device_path: Option<String>,
    crop_left: Option<u32>,
    feed_lines: Option<u8>,
    cut: Option<bool>,
    bitmap_path: Option<String>,
}
