//! Print backend trait

use crate::error::Result;
use crate::job::PrintJob;

/// One way of reaching the printer
pub trait PrintBackend: Send + Sync {
    /// Short name used in configuration and logs
    fn name(&self) -> &str;

    /// Cheap capability check; no paper is used
    fn is_available(&self) -> bool;

    /// Print the job
    ///
    /// Return [`PrintError::Unavailable`](crate::PrintError::Unavailable)
    /// only when nothing reached the printer.
    fn print(&self, job: &PrintJob) -> Result<()>;
}
