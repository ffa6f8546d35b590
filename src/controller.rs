//! User actions on the print page: first load, print, and start-new.

use crate::compositor::{Compositor, PreviewBinding};
use crate::platform::{PrintTrigger, SessionReset, SessionService};
use crate::rendering::CompositionResult;
use crate::source::SourceLoader;
use crate::{Error, Result};

/// Binds the print page's actions to a [`Compositor`], a [`PrintTrigger`]
/// and a [`SessionService`].
pub struct PrintController<L, P, S> {
    compositor: Compositor<L>,
    preview: PreviewBinding,
    printer: P,
    session: S,
}

impl<L, P, S> PrintController<L, P, S>
where
    L: SourceLoader,
    P: PrintTrigger,
    S: SessionService,
{
    pub fn new(compositor: Compositor<L>, printer: P, session: S) -> Self {
        Self {
            compositor,
            preview: PreviewBinding::new(),
            printer,
            session,
        }
    }

    pub fn compositor(&self) -> &Compositor<L> {
        &self.compositor
    }

    pub fn printer(&self) -> &P {
        &self.printer
    }

    /// The sheet currently bound to the preview.
    pub fn preview(&self) -> Option<&CompositionResult> {
        self.preview.current()
    }

    pub fn preview_data_url(&self) -> Option<String> {
        self.preview.data_url()
    }

    /// First composition when the print page opens.
    pub async fn load(&mut self) -> Result<&CompositionResult> {
        let result = self.compositor.compose().await?;
        self.bind(result)
    }

    /// Recompose and print. The printer is only invoked with the sheet
    /// produced by this call; if composing fails the print is aborted.
    pub async fn print(&mut self) -> Result<()> {
        let result = match self.compositor.compose().await {
            Ok(r) => r,
            Err(cause) => {
                log::warn!("print aborted: {}", cause);
                return Err(Error::PrintAborted(Box::new(cause)));
            }
        };
        let sheet = self.bind(result)?.clone();
        log::info!("printing sheet revision {}", sheet.revision);
        self.printer.print(&sheet)
    }

    /// Ask the backend to reset the session. Local images, revision and
    /// preview are dropped whether or not the backend call succeeds.
    pub async fn start_new_session(&mut self) -> Result<SessionReset> {
        let outcome = self.session.start_new().await;
        self.compositor.reset_session();
        self.preview.clear();
        match &outcome {
            Ok(reset) => log::info!("new session started, redirect to {}", reset.redirect),
            Err(e) => log::warn!("session reset failed: {}", e),
        }
        outcome
    }

    fn bind(&mut self, result: CompositionResult) -> Result<&CompositionResult> {
        let revision = result.revision;
        if !self.preview.offer(result) {
            return Err(Error::Other(format!("revision {} was superseded", revision)));
        }
        self.preview
            .current()
            .ok_or_else(|| Error::Other("preview binding is empty".into()))
    }
}
