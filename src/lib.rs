//! Sheetprint: print sheet compositor for a photo booth
//!
//! Lays one or four approved photographs onto a fixed-size printable sheet,
//! optionally draws cut guides, and exports a pixel-exact PNG for preview and
//! printing.
//!
//! # Features
//!
//! - **Two layouts**: percentage margin + gutter, or millimeter margin + per-cell inset
//! - **Two selections**: one image tiled four times, or four distinct images
//! - **HTTP backend** (default `http` feature): approved images and session reset
//!   are fetched from the booth backend's JSON endpoints
//!
//! # Example
//!
//! ```no_run
//! use sheetprint::{BoothConfig, Compositor, ImageSelection, StaticSourceLoader};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BoothConfig {
//!     selection: ImageSelection::Single,
//!     ..Default::default()
//! };
//! let loader = StaticSourceLoader::from_files(&["approved.png"])?;
//! let mut compositor = Compositor::new(config.compositor_config()?, loader)?;
//! let sheet = compositor.compose().await?;
//! std::fs::write("sheet.png", &sheet.png_data)?;
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub mod error;
pub use error::{Error, Recovery, Result};

// Backend HTTP client shared by the loaders and the session service
#[cfg(feature = "http")]
pub mod backend;

pub mod compositor;
pub mod controller;
pub mod platform;
pub mod rendering;
pub mod source;

pub use compositor::{Compositor, CompositorConfig, ImageSelection, Placement, PreviewBinding};
pub use controller::PrintController;
pub use rendering::guides::GuideStyle;
pub use rendering::layout::{CellRect, LayoutPreset, LayoutSpec, SheetSpec};
pub use rendering::CompositionResult;
pub use source::{ImageSource, SourceLoader, StaticSourceLoader};

#[cfg(feature = "http")]
pub use source::HttpSourceLoader;

/// Configuration for a booth's print page
///
/// The defaults match the reference sheet: A4 at 300 DPI (2480x3508 px),
/// four distinct images, 5% margins and 4% gutters, no cut guides.
///
/// # Examples
///
/// ```
/// let cfg = sheetprint::BoothConfig::default();
/// assert_eq!(cfg.sheet.width(), 2480);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoothConfig {
    /// Base URL of the booth backend
    pub base_url: String,
    /// User agent sent with backend requests
    pub user_agent: String,
    /// Timeout for backend requests in milliseconds
    pub timeout_ms: u64,
    /// Extra HTTP headers for backend requests
    pub headers: HashMap<String, String>,
    pub sheet: SheetSpec,
    pub layout: LayoutPreset,
    pub selection: ImageSelection,
    /// Cut guides; `None` disables them
    pub guides: Option<GuideStyle>,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5005".to_string(),
            user_agent: concat!("sheetprint/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_ms: 30000,
            headers: HashMap::new(),
            sheet: SheetSpec::default(),
            layout: LayoutPreset::default(),
            selection: ImageSelection::default(),
            guides: None,
        }
    }
}

impl BoothConfig {
    /// Load a JSON config file; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Failed to read {}: {}", path.display(), e)))?;
        let cfg: BoothConfig = serde_json::from_str(&text)
            .map_err(|e| Error::ConfigError(format!("Failed to parse {}: {}", path.display(), e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(Error::ConfigError("timeout_ms must be positive".into()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::ConfigError(format!("base_url must be http(s), got {}", self.base_url)));
        }
        let layout = self.layout.resolve(&self.sheet)?;
        rendering::layout::plan(&self.sheet, &layout)?;
        if let Some(guides) = &self.guides {
            guides.validate(self.sheet.width(), self.sheet.height())?;
        }
        Ok(())
    }

    /// Resolve the layout preset against the sheet.
    pub fn compositor_config(&self) -> Result<CompositorConfig> {
        Ok(CompositorConfig {
            sheet: self.sheet,
            layout: self.layout.resolve(&self.sheet)?,
            selection: self.selection,
            guides: self.guides,
        })
    }
}
