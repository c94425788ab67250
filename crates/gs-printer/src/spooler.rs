//! Windows print spooler backend
//!
//! Sends the ESC/POS stream as a RAW document to an installed printer, so
//! the driver passes it through untouched.

use tracing::info;

use crate::backend::PrintBackend;
use crate::error::Result;
use crate::job::PrintJob;

/// RAW spooler job to a named printer
pub struct SpoolerBackend {
    printer_name: String,
}

impl SpoolerBackend {
    pub fn new(printer_name: impl Into<String>) -> Self {
        Self {
            printer_name: printer_name.into(),
        }
    }

    pub fn printer_name(&self) -> &str {
        &self.printer_name
    }
}

impl PrintBackend for SpoolerBackend {
    fn name(&self) -> &str {
        "spooler"
    }

    fn is_available(&self) -> bool {
        imp::can_open(&self.printer_name)
    }

    fn print(&self, job: &PrintJob) -> Result<()> {
        let bytes = job.escpos()?;
        imp::write_raw(&self.printer_name, "Gems Station receipt", &bytes)?;
        info!("Receipt spooled to {}", self.printer_name);
        Ok(())
    }
}

#[cfg(windows)]
mod imp {
    use windows::Win32::Foundation::BOOL;
    use windows::Win32::Graphics::Printing::{
        ClosePrinter, DOC_INFO_1W, EndDocPrinter, EndPagePrinter, OpenPrinterW, PRINTER_HANDLE,
        StartDocPrinterW, StartPagePrinter, WritePrinter,
    };
    use windows::core::{PCWSTR, PWSTR};

    use crate::error::{PrintError, Result};

    /// Spooler calls return either `BOOL` or `Result<()>` depending on the binding
    trait Succeeded {
        fn succeeded(self) -> bool;
    }

    impl Succeeded for BOOL {
        fn succeeded(self) -> bool {
            self.as_bool()
        }
    }

    impl Succeeded for windows::core::Result<()> {
        fn succeeded(self) -> bool {
            self.is_ok()
        }
    }

    fn wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    struct Printer(PRINTER_HANDLE);

    impl Printer {
        fn open(name: &str) -> Option<Self> {
            let name = wide(name);
            let mut handle = PRINTER_HANDLE::default();
            let opened = unsafe { OpenPrinterW(PCWSTR(name.as_ptr()), &mut handle, None) };
            opened.succeeded().then_some(Self(handle))
        }
    }

    impl Drop for Printer {
        fn drop(&mut self) {
            let _ = unsafe { ClosePrinter(self.0) }.succeeded();
        }
    }

    pub fn can_open(name: &str) -> bool {
        Printer::open(name).is_some()
    }

    pub fn write_raw(name: &str, doc_name: &str, bytes: &[u8]) -> Result<()> {
        let printer = Printer::open(name)
            .ok_or_else(|| PrintError::Unavailable(format!("cannot open printer {}", name)))?;

        let mut doc_name = wide(doc_name);
        let mut datatype = wide("RAW");
        let info = DOC_INFO_1W {
            pDocName: PWSTR(doc_name.as_mut_ptr()),
            pOutputFile: PWSTR::null(),
            pDatatype: PWSTR(datatype.as_mut_ptr()),
        };

        let job = unsafe { StartDocPrinterW(printer.0, 1, &info) };
        if job == 0 {
            return Err(PrintError::Unavailable(format!(
                "spooler refused a document for {}",
                name
            )));
        }

        let mut written = 0u32;
        let ok = unsafe {
            StartPagePrinter(printer.0).succeeded()
                && WritePrinter(
                    printer.0,
                    bytes.as_ptr().cast(),
                    bytes.len() as u32,
                    &mut written,
                )
                .succeeded()
                && EndPagePrinter(printer.0).succeeded()
        };
        let ended = unsafe { EndDocPrinter(printer.0) }.succeeded();

        if !ok || !ended || written as usize != bytes.len() {
            return Err(PrintError::Failed(format!(
                "spooler wrote {} of {} bytes to {}",
                written,
                bytes.len(),
                name
            )));
        }

        Ok(())
    }
}

#[cfg(not(windows))]
mod imp {
    use crate::error::{PrintError, Result};

    pub fn can_open(_name: &str) -> bool {
        false
    }

    pub fn write_raw(name: &str, _doc_name: &str, _bytes: &[u8]) -> Result<()> {
        Err(PrintError::Unavailable(format!(
            "print spooler is Windows only ({})",
            name
        )))
    }
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;
    use gs_receipt::MonoBitmap;
    use image::GrayImage;

    #[test]
    fn test_unavailable_off_windows() {
        let backend = SpoolerBackend::new("HWASUNG HMK-072");
        assert_eq!(backend.name(), "spooler");
        assert!(!backend.is_available());

        let job = PrintJob::new(MonoBitmap::from_gray(&GrayImage::new(8, 1)), 0, false);
        assert!(backend.print(&job).unwrap_err().is_unavailable());
    }
}
