//! Vendor SDK backend
//!
//! Loads the printer vendor's `HW_API.dll` at runtime and prints a
//! monochrome BMP through it. The SDK ships 32-bit and 64-bit builds under
//! `<dll_dir>/x86` and `<dll_dir>/x64`.

use std::ffi::{CString, c_char, c_int};
use std::path::{Path, PathBuf};

use libloading::Library;
use tracing::{debug, info, warn};

use crate::backend::PrintBackend;
use crate::error::{PrintError, Result};
use crate::job::PrintJob;

pub const DLL_NAME: &str = "HW_API.dll";

const MODEL: &[u8] = b"HMK-072\0";
const INTERFACE_USB: c_int = 0;
const FLOW_XON_XOFF: c_int = 0;
const BAUD_RATE: c_int = 19200;
const ALIGN_CENTER: c_int = 1;
const CUT_PARTIAL: c_int = 1;

type OpenFn = unsafe extern "C" fn(c_int, c_int, *const c_char, c_int, c_int) -> c_int;
type CloseFn = unsafe extern "C" fn() -> c_int;
type IntFn = unsafe extern "C" fn(c_int) -> c_int;
type ImageFn = unsafe extern "C" fn(c_int, *const c_char) -> c_int;

/// SDK subdirectory matching this build
pub fn arch_dir() -> &'static str {
    if cfg!(target_pointer_width = "64") {
        "x64"
    } else {
        "x86"
    }
}

/// Resolved SDK entry points
struct HwApi {
    open: OpenFn,
    close: CloseFn,
    align: IntFn,
    bold: IntFn,
    image: ImageFn,
    feed: IntFn,
    cut: IntFn,
    _library: Library,
}

impl HwApi {
    fn load(path: &Path) -> Result<Self> {
        unsafe {
            let library = Library::new(path).map_err(|e| {
                PrintError::Unavailable(format!("Failed to load {}: {}", path.display(), e))
            })?;

            Ok(Self {
                open: symbol(&library, b"printerOpen\0")?,
                close: symbol(&library, b"printerClose\0")?,
                align: symbol(&library, b"textAlign\0")?,
                bold: symbol(&library, b"textBold\0")?,
                image: symbol(&library, b"printImage\0")?,
                feed: symbol(&library, b"feedLine\0")?,
                cut: symbol(&library, b"cut\0")?,
                _library: library,
            })
        }
    }
}

/// # Safety
/// `T` must match the exported function's signature.
unsafe fn symbol<T: Copy>(library: &Library, name: &[u8]) -> Result<T> {
    unsafe {
        library.get::<T>(name).map(|s| *s).map_err(|e| {
            PrintError::Unavailable(format!(
                "Missing export {}: {}",
                String::from_utf8_lossy(name.strip_suffix(b"\0").unwrap_or(name)),
                e
            ))
        })
    }
}

/// Log a non-zero status from a call whose failure does not stop the job
fn check(call: &str, rc: c_int) -> bool {
    if rc != 0 {
        warn!("{} returned {}", call, rc);
    }
    rc == 0
}

/// Open printer connection; closed on drop
struct Connection<'a> {
    api: &'a HwApi,
}

impl<'a> Connection<'a> {
    fn open(api: &'a HwApi) -> Result<Self> {
        let rc = unsafe {
            (api.open)(
                INTERFACE_USB,
                0,
                MODEL.as_ptr().cast(),
                FLOW_XON_XOFF,
                BAUD_RATE,
            )
        };
        if rc != 0 {
            return Err(PrintError::Unavailable(format!(
                "printerOpen returned {}",
                rc
            )));
        }
        Ok(Self { api })
    }
}

impl Drop for Connection<'_> {
    fn drop(&mut self) {
        check("printerClose", unsafe { (self.api.close)() });
    }
}

/// Prints through `HW_API.dll`
pub struct HwApiBackend {
    dll_path: PathBuf,
    bitmap_path: PathBuf,
}

impl HwApiBackend {
    pub fn new(dll_path: impl Into<PathBuf>, bitmap_path: impl Into<PathBuf>) -> Self {
        Self {
            dll_path: dll_path.into(),
            bitmap_path: bitmap_path.into(),
        }
    }

    /// DLL for this architecture under the SDK's `bin` directory
    pub fn from_sdk_dir(dll_dir: impl AsRef<Path>, bitmap_path: impl Into<PathBuf>) -> Self {
        Self::new(
            dll_dir.as_ref().join(arch_dir()).join(DLL_NAME),
            bitmap_path,
        )
    }

    pub fn dll_path(&self) -> &Path {
        &self.dll_path
    }
}

impl PrintBackend for HwApiBackend {
    fn name(&self) -> &str {
        "hw_api"
    }

    fn is_available(&self) -> bool {
        self.dll_path.is_file()
    }

    fn print(&self, job: &PrintJob) -> Result<()> {
        job.bitmap().save_bmp(&self.bitmap_path).map_err(|e| {
            PrintError::Unavailable(format!(
                "Failed to write {}: {}",
                self.bitmap_path.display(),
                e
            ))
        })?;

        let bitmap = self
            .bitmap_path
            .to_str()
            .and_then(|p| CString::new(p).ok())
            .ok_or_else(|| {
                PrintError::Unavailable(format!(
                    "Bitmap path not representable: {}",
                    self.bitmap_path.display()
                ))
            })?;

        let api = HwApi::load(&self.dll_path)?;
        let conn = Connection::open(&api)?;

        debug!("Printing {} through {}", self.bitmap_path.display(), DLL_NAME);

        unsafe {
            check("textAlign", (conn.api.align)(ALIGN_CENTER));
            check("textBold", (conn.api.bold)(0));

            let rc = (conn.api.image)(0, bitmap.as_ptr());
            if rc != 0 {
                return Err(PrintError::Failed(format!("printImage returned {}", rc)));
            }

            if job.feed_lines() > 0 {
                check("feedLine", (conn.api.feed)(c_int::from(job.feed_lines())));
            }
            if job.cut() {
                check("cut", (conn.api.cut)(CUT_PARTIAL));
            }
        }

        info!("Receipt printed through {}", DLL_NAME);
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
        PrintJob::new(MonoBitmap::from_gray(&GrayImage::new(8, 2)), 3, true)
    }

    #[test]
    fn test_check_status_codes() {
        assert!(check("cut", 0));
        assert!(!check("cut", 3));
        assert!(!check("feedLine", -1));
    }

    #[test]
    fn test_sdk_dir_layout() {
        let backend = HwApiBackend::from_sdk_dir("thermal/windows SDK/bin", "out.bmp");
        let expected = Path::new("thermal/windows SDK/bin")
            .join(arch_dir())
            .join("HW_API.dll");
        assert_eq!(backend.dll_path(), expected);
    }

    #[test]
    fn test_missing_dll_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let backend = HwApiBackend::new(dir.path().join("HW_API.dll"), dir.path().join("r.bmp"));

        assert!(!backend.is_available());
        assert!(backend.print(&job()).unwrap_err().is_unavailable());
    }

    #[test]
    fn test_unloadable_dll_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let dll = dir.path().join("HW_API.dll");
        std::fs::write(&dll, b"not a library").unwrap();

        let backend = HwApiBackend::new(&dll, dir.path().join("r.bmp"));
        assert!(backend.is_available());
        assert!(backend.print(&job()).unwrap_err().is_unavailable());

        // The bitmap was prepared before loading
        assert!(dir.path().join("r.bmp").is_file());
    }
}
