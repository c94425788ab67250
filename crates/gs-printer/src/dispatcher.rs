//! Print Dispatcher
//!
//! Backends are tried in order. One that is unavailable, either by its
//! capability check or by reporting [`PrintError::Unavailable`], hands over
//! to the next. One that started a job and failed ends the dispatch: paper
//! may already be out, so nothing is retried without the operator.

use tracing::{debug, info, warn};

use gs_core::PrinterConfig;

use crate::backend::PrintBackend;
use crate::device::DeviceBackend;
use crate::error::{PrintError, Result};
use crate::hw_api::HwApiBackend;
use crate::job::PrintJob;
use crate::spooler::SpoolerBackend;

/// Ordered, capability-checked printer backends
pub struct PrintDispatcher {
    backends: Vec<Box<dyn PrintBackend>>,
}

impl PrintDispatcher {
    pub fn new(backends: Vec<Box<dyn PrintBackend>>) -> Self {
        Self { backends }
    }

    /// Build the backend list named in `config.backends`
    pub fn from_config(config: &PrinterConfig) -> Result<Self> {
        let mut backends: Vec<Box<dyn PrintBackend>> = Vec::new();

        for name in &config.backends {
            let backend: Box<dyn PrintBackend> = match name.trim().to_lowercase().as_str() {
                "spooler" => Box::new(SpoolerBackend::new(&config.printer_name)),
                "hw_api" => Box::new(HwApiBackend::from_sdk_dir(
                    &config.dll_dir,
                    &config.bitmap_path,
                )),
                "device" => {
                    let path = config.device_path.as_deref().ok_or_else(|| {
                        PrintError::UnknownBackend(
                            "device backend needs printer.device_path".to_string(),
                        )
                    })?;
                    Box::new(DeviceBackend::new(path))
                }
                other => return Err(PrintError::UnknownBackend(other.to_string())),
            };
            backends.push(backend);
        }

        debug!("Print backends: {:?}", config.backends);
        Ok(Self::new(backends))
    }

    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Print through the first backend that can reach the printer
    pub fn dispatch(&self, job: &PrintJob) -> Result<&str> {
        let mut skipped = Vec::new();

        for backend in &self.backends {
            if !backend.is_available() {
                debug!("Print backend {} unavailable", backend.name());
                skipped.push(backend.name());
                continue;
            }

            match backend.print(job) {
                Ok(()) => {
                    info!("Printed via {}", backend.name());
                    return Ok(backend.name());
                }
                Err(e) if e.is_unavailable() => {
                    warn!("Print backend {} unavailable: {}", backend.name(), e);
                    skipped.push(backend.name());
                }
                Err(e) => {
                    return Err(PrintError::Failed(format!("{}: {}", backend.name(), e)));
                }
            }
        }

        Err(PrintError::Failed(format!(
            "no printer backend available (tried: {})",
            if skipped.is_empty() {
                "none".to_string()
            } else {
                skipped.join(", ")
            }
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gs_receipt::MonoBitmap;
    use image::GrayImage;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Copy)]
    enum Outcome {
        Ok,
        Unavailable,
        Failed,
    }

    struct FakeBackend {
        name: &'static str,
        available: bool,
        outcome: Outcome,
        calls: Arc<AtomicUsize>,
    }

    impl FakeBackend {
        fn boxed(
            name: &'static str,
            available: bool,
            outcome: Outcome,
        ) -> (Box<dyn PrintBackend>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let backend = FakeBackend {
                name,
                available,
                outcome,
                calls: calls.clone(),
            };
            (Box::new(backend), calls)
        }
    }

    impl PrintBackend for FakeBackend {
        fn name(&self) -> &str {
            self.name
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn print(&self, _job: &PrintJob) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Outcome::Ok => Ok(()),
                Outcome::Unavailable => Err(PrintError::Unavailable("offline".to_string())),
                Outcome::Failed => Err(PrintError::Failed("jammed".to_string())),
            }
        }
    }

    fn job() -> PrintJob {
        PrintJob::new(MonoBitmap::from_gray(&GrayImage::new(8, 1)), 0, false)
    }

    #[test]
    fn test_primary_prints() {
        let (primary, primary_calls) = FakeBackend::boxed("spooler", true, Outcome::Ok);
        let (secondary, secondary_calls) = FakeBackend::boxed("hw_api", true, Outcome::Ok);

        let dispatcher = PrintDispatcher::new(vec![primary, secondary]);
        assert_eq!(dispatcher.dispatch(&job()).unwrap(), "spooler");
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unavailable_primary_falls_back_exactly_once() {
        let (primary, primary_calls) = FakeBackend::boxed("spooler", false, Outcome::Ok);
        let (secondary, secondary_calls) = FakeBackend::boxed("hw_api", true, Outcome::Ok);

        let dispatcher = PrintDispatcher::new(vec![primary, secondary]);
        assert_eq!(dispatcher.dispatch(&job()).unwrap(), "hw_api");
        assert_eq!(primary_calls.load(Ordering::SeqCst), 0);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_primary_reporting_unavailable_falls_back() {
        let (primary, primary_calls) = FakeBackend::boxed("spooler", true, Outcome::Unavailable);
        let (secondary, secondary_calls) = FakeBackend::boxed("hw_api", true, Outcome::Ok);

        let dispatcher = PrintDispatcher::new(vec![primary, secondary]);
        assert_eq!(dispatcher.dispatch(&job()).unwrap(), "hw_api");
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_started_job_failure_stops_dispatch() {
        let (primary, _) = FakeBackend::boxed("spooler", true, Outcome::Failed);
        let (secondary, secondary_calls) = FakeBackend::boxed("hw_api", true, Outcome::Ok);

        let dispatcher = PrintDispatcher::new(vec![primary, secondary]);
        let err = dispatcher.dispatch(&job()).unwrap_err();
        assert!(matches!(err, PrintError::Failed(msg) if msg.contains("jammed")));
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_all_unavailable_is_failed_without_retry() {
        let (primary, primary_calls) = FakeBackend::boxed("spooler", true, Outcome::Unavailable);
        let (secondary, secondary_calls) =
            FakeBackend::boxed("hw_api", true, Outcome::Unavailable);

        let dispatcher = PrintDispatcher::new(vec![primary, secondary]);
        let err = dispatcher.dispatch(&job()).unwrap_err();
        assert!(matches!(err, PrintError::Failed(msg) if msg.contains("spooler, hw_api")));
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_from_config_order() {
        let config = PrinterConfig {
            backends: vec!["hw_api".to_string(), "Spooler".to_string()],
            ..Default::default()
        };
        let dispatcher = PrintDispatcher::from_config(&config).unwrap();
        assert_eq!(dispatcher.backend_names(), vec!["hw_api", "spooler"]);
    }

    #[test]
    fn test_from_config_rejects_unknown_backend() {
        let config = PrinterConfig {
            backends: vec!["fax".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            PrintDispatcher::from_config(&config),
            Err(PrintError::UnknownBackend(name)) if name == "fax"
        ));
    }

    #[test]
    fn test_device_backend_needs_path() {
        let config = PrinterConfig {
            backends: vec!["device".to_string()],
            device_path: None,
            ..Default::default()
        };
        assert!(PrintDispatcher::from_config(&config).is_err());
    }
}
