//! Kiosk polling loop
//!
//! One [`KioskSession`] owns everything that changes while the kiosk runs:
//! the trigger detector's state and the current screen mode. Each poll
//! first checks the chat input for an operator command, then reads the
//! transcript. On a new trigger the printing screen goes up at once, and
//! extraction and printing run behind it before the kiosk returns to idle.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gs_core::{
    Config, FieldExtractor, OperatorCommand, OrderRecord, ScreenController, ScreenMode,
    TranscriptSource, TriggerDetector,
};
use tokio::time::{MissedTickBehavior, interval, sleep};
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::output::ReceiptOutput;
use crate::test_print::sample_order;

/// Loop timing and debug output
#[derive(Debug, Clone)]
pub struct LoopSettings {
    /// Pause between transcript polls
    pub poll_interval: Duration,
    /// Pause between screen settle checks
    pub settle_poll: Duration,
    /// Longest the printing screen stays up
    pub printing_screen_timeout: Duration,
    /// Where to keep the last parsed order
    pub debug_record: Option<PathBuf>,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            settle_poll: Duration::from_millis(500),
            printing_screen_timeout: Duration::from_secs(15),
            debug_record: None,
        }
    }
}

impl LoopSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.trigger.poll_interval_ms.max(1)),
            printing_screen_timeout: Duration::from_secs(config.browser.printing_screen_secs),
            debug_record: config.receipt.debug_record.as_ref().map(PathBuf::from),
            ..Default::default()
        }
    }
}

/// Polling loop state and collaborators
pub struct KioskSession {
    transcript: Arc<dyn TranscriptSource>,
    screens: Arc<dyn ScreenController>,
    extractor: Arc<dyn FieldExtractor>,
    output: Arc<dyn ReceiptOutput>,
    detector: TriggerDetector,
    screen_mode: ScreenMode,
    settings: LoopSettings,
}

impl KioskSession {
    pub fn new(
        keyword: impl Into<String>,
        transcript: Arc<dyn TranscriptSource>,
        screens: Arc<dyn ScreenController>,
        extractor: Arc<dyn FieldExtractor>,
        output: Arc<dyn ReceiptOutput>,
        settings: LoopSettings,
    ) -> Self {
        Self {
            transcript,
            screens,
            extractor,
            output,
            detector: TriggerDetector::new(keyword),
            screen_mode: ScreenMode::Idle,
            settings,
        }
    }

    pub fn screen_mode(&self) -> ScreenMode {
        self.screen_mode
    }

    /// Show idle, then poll until a fatal error
    pub async fn run(&mut self) -> Result<()> {
        info!(
            "Watching for \"{}\" every {:?}",
            self.detector.keyword(),
            self.settings.poll_interval
        );

        self.return_to_idle().await?;

        let mut ticker = interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match self.poll_once().await {
                Ok(_) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => error!("{}", e),
            }
        }
    }

    /// One poll; `Some` when an order was printed
    pub async fn poll_once(&mut self) -> Result<Option<OrderRecord>> {
        if let Some(command) = self.transcript.take_command()? {
            return self.run_command(command).await;
        }

        let snapshot = self.transcript.snapshot()?;

        let Some(trigger) = self.detector.detect(&snapshot) else {
            return Ok(None);
        };

        info!(
            "Trigger keyword detected (occurrence {}, {} chars of order text)",
            trigger.occurrence,
            trigger.order_text.len()
        );

        self.show(ScreenMode::Printing)?;
        let printed = self.produce(&trigger.order_text).await;
        self.finish_printing().await?;

        printed.map(Some)
    }

    async fn run_command(&mut self, command: OperatorCommand) -> Result<Option<OrderRecord>> {
        match command {
            OperatorCommand::Reset => {
                info!("Conversation reset by operator");
                self.detector.discard_pending();
                self.return_to_idle().await?;
                Ok(None)
            }
            OperatorCommand::TestPrint => {
                let record = sample_order(&mut rand::thread_rng());
                info!("Test print for {} (type {:?})", record.name, record.type_number);

                self.show(ScreenMode::Printing)?;
                self.save_debug_record(&record);
                let printed = self.output.print(&record).map(|_| record);
                self.finish_printing().await?;

                printed.map(Some)
            }
        }
    }

    /// Extract, keep a debug copy, print
    async fn produce(&self, order_text: &str) -> Result<OrderRecord> {
        let record = self.extractor.extract(order_text).await?;
        info!(
            "Order parsed: name={}, item={}, type={:?}",
            record.name, record.item, record.type_number
        );

        self.save_debug_record(&record);
        self.output.print(&record)?;
        Ok(record)
    }

    fn save_debug_record(&self, record: &OrderRecord) {
        if let Some(path) = &self.settings.debug_record {
            if let Err(e) = record.save_json(path) {
                warn!("Failed to write {}: {}", path.display(), e);
            }
        }
    }

    /// Let the printing animation finish, then back to idle
    async fn finish_printing(&mut self) -> Result<()> {
        self.wait_settled(ScreenMode::Printing, Some(self.settings.printing_screen_timeout))
            .await?;
        self.return_to_idle().await
    }

    fn show(&mut self, mode: ScreenMode) -> Result<()> {
        self.screens.show(mode)?;
        self.screen_mode = mode;
        Ok(())
    }

    /// Idle screen, then wait for the customer to continue to the chat
    async fn return_to_idle(&mut self) -> Result<()> {
        self.show(ScreenMode::Idle)?;
        self.wait_settled(ScreenMode::Idle, None).await?;
        self.screens.lock_down_chat()?;
        debug!("Chat page ready");
        Ok(())
    }

    /// Poll the screen until settled; `false` when the bound ran out
    async fn wait_settled(&self, mode: ScreenMode, bound: Option<Duration>) -> Result<bool> {
        let started = Instant::now();

        loop {
            if self.screens.is_settled(mode)? {
                return Ok(true);
            }

            if let Some(bound) = bound {
                if started.elapsed() >= bound {
                    warn!("{} screen did not settle within {:?}", mode, bound);
                    return Ok(false);
                }
            }

            sleep(self.settings.settle_poll).await;
        }
    }
}
