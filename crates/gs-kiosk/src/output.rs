//! Receipt output: render, keep a debug copy, print

use std::path::PathBuf;

use gs_core::{OrderRecord, PrinterConfig, ReceiptConfig};
use gs_printer::{PrintDispatcher, PrintJob};
use gs_receipt::ReceiptRenderer;
use tracing::{info, warn};

use crate::error::{KioskError, Result};

/// Turns an order into paper
pub trait ReceiptOutput: Send + Sync {
    fn print(&self, record: &OrderRecord) -> Result<()>;
}

/// Renderer plus thermal printer dispatch
pub struct ThermalOutput {
    renderer: ReceiptRenderer,
    dispatcher: PrintDispatcher,
    printer: PrinterConfig,
    debug_image: Option<PathBuf>,
}

impl ThermalOutput {
    pub fn new(
        renderer: ReceiptRenderer,
        dispatcher: PrintDispatcher,
        printer: PrinterConfig,
    ) -> Self {
        Self {
            renderer,
            dispatcher,
            printer,
            debug_image: None,
        }
    }

    /// Build from configuration; asset problems are startup errors
    pub fn from_config(receipt: &ReceiptConfig, printer: &PrinterConfig) -> Result<Self> {
        let renderer = ReceiptRenderer::new(receipt)
            .map_err(|e| KioskError::ConfigMissing(e.to_string()))?;
        let dispatcher = PrintDispatcher::from_config(printer)
            .map_err(|e| KioskError::ConfigMissing(e.to_string()))?;

        info!("Print backends: {:?}", dispatcher.backend_names());

        let mut output = Self::new(renderer, dispatcher, printer.clone());
        output.debug_image = receipt.debug_image.as_ref().map(PathBuf::from);
        Ok(output)
    }
}

impl ReceiptOutput for ThermalOutput {
    fn print(&self, record: &OrderRecord) -> Result<()> {
        let receipt = self.renderer.render(record)?;

        if let Some(path) = &self.debug_image {
            if let Err(e) = receipt.save_png(path) {
                warn!("Failed to write {}: {}", path.display(), e);
            }
        }

        let job = PrintJob::from_receipt(&receipt, &self.printer);
        let backend = self.dispatcher.dispatch(&job)?;

        info!("Receipt for {} printed via {}", record.name, backend);
        Ok(())
    }
}
