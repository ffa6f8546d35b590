//! Platform collaborators: the print trigger and the session reset service
//!
//! The compositor only hands a finished [`CompositionResult`] to a
//! [`PrintTrigger`] and asks a [`SessionService`] to reset server-side state.
//! Both are traits so the booth can print through CUPS, to a file, or into an
//! in-memory recorder in tests.

pub mod printer;
pub mod session;

pub use printer::{printer_info, FilePrinter, LpPrinter, PrinterInfo, RecordingPrinter};
pub use session::{NoopSessionService, SessionReset};

#[cfg(feature = "http")]
pub use session::HttpSessionService;

use crate::rendering::CompositionResult;
use crate::Result;

/// Sends a finished sheet to the physical (or simulated) printer.
pub trait PrintTrigger: Send + Sync {
    fn print(&self, sheet: &CompositionResult) -> Result<()>;
}

impl<T: PrintTrigger + ?Sized> PrintTrigger for &T {
    fn print(&self, sheet: &CompositionResult) -> Result<()> {
        (**self).print(sheet)
    }
}

impl<T: PrintTrigger + ?Sized> PrintTrigger for Box<T> {
    fn print(&self, sheet: &CompositionResult) -> Result<()> {
        (**self).print(sheet)
    }
}

/// Resets the backend's session state for the booth.
#[allow(async_fn_in_trait)]
pub trait SessionService {
    async fn start_new(&self) -> Result<SessionReset>;
}
