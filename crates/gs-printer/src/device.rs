//! Raw device backend

use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::backend::PrintBackend;
use crate::error::{PrintError, Result};
use crate::job::PrintJob;

/// Writes ESC/POS bytes to a device node such as `/dev/usb/lp0`
pub struct DeviceBackend {
    path: PathBuf,
}

impl DeviceBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PrintBackend for DeviceBackend {
    fn name(&self) -> &str {
        "device"
    }

    fn is_available(&self) -> bool {
        self.path.exists()
    }

    fn print(&self, job: &PrintJob) -> Result<()> {
        let bytes = job.escpos()?;

        let mut device = std::fs::OpenOptions::new()
            .write(true)
            .open(&self.path)
            .map_err(|e| {
                PrintError::Unavailable(format!("{}: {}", self.path.display(), e))
            })?;

        debug!("Writing {} bytes to {}", bytes.len(), self.path.display());

        device
            .write_all(&bytes)
            .and_then(|_| device.flush())
            .map_err(|e| PrintError::Failed(format!("{}: {}", self.path.display(), e)))?;

        info!("Receipt sent to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gs_receipt::MonoBitmap;
    use image::GrayImage;
    use tempfile::TempDir;

    fn job() -> PrintJob {
        PrintJob::new(MonoBitmap::from_gray(&GrayImage::new(8, 2)), 1, true)
    }

    #[test]
    fn test_missing_device_is_unavailable() {
        let backend = DeviceBackend::new("/nonexistent/lp0");
        assert!(!backend.is_available());
        assert!(backend.print(&job()).unwrap_err().is_unavailable());
    }

    #[test]
    fn test_writes_escpos_stream() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lp0");
        std::fs::write(&path, b"").unwrap();

        let backend = DeviceBackend::new(&path);
        assert!(backend.is_available());
        backend.print(&job()).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), job().escpos().unwrap());
    }
}
