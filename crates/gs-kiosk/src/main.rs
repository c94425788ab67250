//! gs-kiosk: Gems Station kiosk binary
//!
//! Usage:
//!   gs-kiosk               - Run the kiosk (browser, trigger loop, printer)
//!   gs-kiosk --test-print  - Print a random sample receipt and exit
//!   gs-kiosk --help        - Show help

mod error;
mod output;
mod session;
mod test_print;

use std::sync::Arc;
use std::time::{Duration, Instant};

use gs_browser::{
    BrowserScreens, BrowserSession, LoginState, ScreenDocuments, SessionConfig, origin_of,
};
use gs_core::{BrowserConfig, Config, Credentials, LlmClient, LlmFieldExtractor, MenuReference};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::{KioskError, Result};
use crate::output::ThermalOutput;
use crate::session::{KioskSession, LoopSettings};

const LOGIN_POLL: Duration = Duration::from_secs(2);

/// Run mode
enum RunMode {
    /// Kiosk loop
    Kiosk,
    /// One sample receipt
    TestPrint,
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mode = parse_args();

    match mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("gs-kiosk {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(KioskError::from)?;

    match mode {
        RunMode::TestPrint => {
            info!("Running test print");
            test_print::run(&config)?;
        }
        RunMode::Kiosk => {
            info!("Starting gs-kiosk...");
            info!("Model: {} ({:?})", config.llm.model, config.llm.provider);

            tokio::select! {
                result = run_kiosk(config) => result?,
                _ = tokio::signal::ctrl_c() => info!("Shutting down..."),
            }
        }
        _ => {}
    }

    Ok(())
}

/// Parse command line arguments
fn parse_args() -> RunMode {
    let args: Vec<String> = std::env::args().collect();

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--test-print" | "-t" => return RunMode::TestPrint,
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Kiosk
}

/// Print help message
fn print_help() {
    println!("gs-kiosk - Gems Station receipt kiosk");
    println!();
    println!("Usage:");
    println!("  gs-kiosk               Run the kiosk");
    println!("  gs-kiosk --test-print  Print a random sample receipt and exit");
    println!("  gs-kiosk --help        Show this help message");
    println!("  gs-kiosk --version     Show version");
    println!();
    println!("Chat input commands (typed on their own):");
    println!("  종료                   Abandon the conversation, back to the idle screen");
    println!("  출력테스트             Print a random sample receipt");
    println!();
    println!("Configuration:");
    println!("  gems-station.toml      Settings file (override with GEMS_STATION_CONFIG)");
    println!("  credentials.json       Sign-in email and optional password");
    println!("  gemini_api_key.txt     API key, unless LLM_API_KEY is set");
    println!();
    println!("Environment Variables:");
    println!("  LLM_API_KEY            API key (or GEMINI_API_KEY)");
    println!("  LLM_MODEL              Model name (default: gemini-1.5-flash)");
    println!("  LLM_PROVIDER           gemini, claude or openai (default: gemini)");
    println!("  LLM_BASE_URL           Custom API endpoint");
    println!("  TRIGGER_KEYWORD        Trigger keyword (default: Gems Station)");
    println!("  PRINTER_NAME           Installed printer name");
    println!("  CHAT_URL               Chat page opened from the idle screen");
    println!("  RUST_LOG               Log filter (default: info)");
}

/// Startup, sign-in, then the polling loop
async fn run_kiosk(mut config: Config) -> Result<()> {
    config.resolve_api_key()?;
    let credentials = Credentials::from_file(&config.browser.credentials_file)?;

    let client =
        LlmClient::new(&config.llm).map_err(|e| KioskError::ConfigMissing(e.to_string()))?;
    let mut extractor = LlmFieldExtractor::new(client);

    if let Some(path) = &config.receipt.menu_csv {
        match MenuReference::from_csv_path(path) {
            Ok(menu) => {
                info!("Loaded {} persona types from {}", menu.len(), path);
                extractor = extractor.with_menu(menu);
            }
            Err(e) => warn!("Menu reference not loaded: {}", e),
        }
    }

    let output = ThermalOutput::from_config(&config.receipt, &config.printer)?;

    let browser = Arc::new(BrowserSession::launch(SessionConfig::from(&config.browser))?);
    sign_in(&browser, &config.browser, &credentials).await?;

    let documents =
        ScreenDocuments::prepare(&config.browser, std::env::temp_dir().join("gems-station"))?;
    let screens = BrowserScreens::new(browser.clone(), documents, &config.browser.chat_url);

    info!("gs-kiosk initialized successfully");
    info!("Press Ctrl+C to exit");

    let mut session = KioskSession::new(
        config.trigger.keyword.clone(),
        browser,
        Arc::new(screens),
        Arc::new(extractor),
        Arc::new(output),
        LoopSettings::from_config(&config),
    );

    session.run().await
}

/// Wait until the browser reaches the chat host
async fn sign_in(
    browser: &BrowserSession,
    config: &BrowserConfig,
    credentials: &Credentials,
) -> Result<()> {
    let home = origin_of(&config.chat_url);

    if browser.begin_login(&config.login_url, home, credentials)? == LoginState::SignedIn {
        return Ok(());
    }

    let started = Instant::now();
    let bound = Duration::from_secs(config.login_timeout_secs);

    loop {
        tokio::time::sleep(LOGIN_POLL).await;

        if browser.is_at(home)? {
            info!("Signed in");
            return Ok(());
        }

        if !bound.is_zero() && started.elapsed() >= bound {
            return Err(KioskError::BrowserSession(format!(
                "sign-in not completed within {:?}",
                bound
            )));
        }
    }
}
