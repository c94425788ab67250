//! gs-printer: thermal printer output
//!
//! A [`PrintDispatcher`] holds an ordered list of [`PrintBackend`]s. Each is
//! asked whether it can reach the printer; the first that can prints the
//! job. Backends:
//!
//! - `spooler`: RAW ESC/POS job through the Windows print spooler
//! - `hw_api`: the printer vendor's `HW_API.dll`
//! - `device`: ESC/POS bytes written straight to a device file

pub mod backend;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod hw_api;
pub mod job;
pub mod spooler;

pub use backend::PrintBackend;
pub use device::DeviceBackend;
pub use dispatcher::PrintDispatcher;
pub use error::{PrintError, Result};
pub use hw_api::HwApiBackend;
pub use job::PrintJob;
pub use spooler::SpoolerBackend;
