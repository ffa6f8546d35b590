//! The sheet compositor.
//!
//! A [`Compositor`] owns its raster surface, the decoded sources for the
//! current session and the revision counter. Each call to
//! [`Compositor::compose`] runs the full sequence (clear, load if needed,
//! plan, fit and draw every cell, guides, export) and either returns a new
//! [`CompositionResult`] or fails without touching the previous one.

use crate::rendering::fit::fit;
use crate::rendering::guides::{draw_guides, GuideStyle};
use crate::rendering::layout::{plan, CellRect, LayoutSpec, SheetSpec};
use crate::rendering::paint::Color;
use crate::rendering::raster::{resample, Surface};
use crate::rendering::CompositionResult;
use crate::source::{ImageSource, SourceLoader, SHEET_CELLS};
use crate::{Error, Result};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// How approved images are assigned to the four cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSelection {
    /// One approved image, tiled into every cell
    Single,
    /// Four approved images, cell `i` gets image `i`
    #[default]
    Four,
}

/// Resolved configuration for one compositor.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositorConfig {
    pub sheet: SheetSpec,
    pub layout: LayoutSpec,
    pub selection: ImageSelection,
    pub guides: Option<GuideStyle>,
}

/// Decoded sources held for the session.
#[derive(Debug, Clone)]
pub enum SourceSet {
    Single(ImageSource),
    Four([ImageSource; SHEET_CELLS]),
}

impl SourceSet {
    pub fn for_cell(&self, cell: usize) -> &ImageSource {
        match self {
            SourceSet::Single(src) => src,
            SourceSet::Four(srcs) => &srcs[cell],
        }
    }
}

/// Where one image lands on the sheet.
#[derive(Debug, Clone)]
pub struct Placement {
    pub cell: usize,
    pub source: ImageSource,
    /// Absolute destination rectangle in sheet pixels
    pub dest: CellRect,
}

/// Compute the four placements for `sources` on `cells`.
pub fn place(layout: &LayoutSpec, cells: &[CellRect; SHEET_CELLS], sources: &SourceSet) -> Result<Vec<Placement>> {
    cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let source = sources.for_cell(i).clone();
            let content = layout.content_box(cell)?;
            let f = fit(source.width(), source.height(), content.width, content.height)?;
            Ok(Placement {
                cell: i,
                source,
                dest: CellRect {
                    x: content.x + f.offset_x,
                    y: content.y + f.offset_y,
                    width: f.draw_w,
                    height: f.draw_h,
                },
            })
        })
        .collect()
}

pub struct Compositor<L> {
    config: CompositorConfig,
    loader: L,
    surface: Surface,
    cache: Option<SourceSet>,
    revision: u64,
    last: Option<CompositionResult>,
}

impl<L: SourceLoader> Compositor<L> {
    /// Create a compositor with its own surface sized to the sheet.
    pub fn new(config: CompositorConfig, loader: L) -> Result<Self> {
        let surface = Surface::new(config.sheet.width(), config.sheet.height());
        Self::with_surface(config, loader, surface)
    }

    /// Create a compositor drawing into an injected surface.
    pub fn with_surface(config: CompositorConfig, loader: L, surface: Surface) -> Result<Self> {
        if surface.width() != config.sheet.width() || surface.height() != config.sheet.height() {
            return Err(Error::ConfigError(format!(
                "surface is {}x{} but sheet is {}x{}",
                surface.width(),
                surface.height(),
                config.sheet.width(),
                config.sheet.height()
            )));
        }
        // fail fast on layouts that can never produce a cell
        let cells = plan(&config.sheet, &config.layout)?;
        log::debug!("planned cells {:?}", cells);

        Ok(Self {
            config,
            loader,
            surface,
            cache: None,
            revision: 0,
            last: None,
        })
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Revision of the most recently started composition (0 before the first).
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The last successful composition, if any.
    pub fn last_result(&self) -> Option<&CompositionResult> {
        self.last.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.is_some()
    }

    /// Placements for the cached sources; fails if nothing is loaded yet.
    pub fn placements(&self) -> Result<Vec<Placement>> {
        let sources = self
            .cache
            .as_ref()
            .ok_or_else(|| Error::Other("no images loaded for this session".into()))?;
        let cells = plan(&self.config.sheet, &self.config.layout)?;
        place(&self.config.layout, &cells, sources)
    }

    /// Drop the decoded sources, revision counter and last result.
    pub fn reset_session(&mut self) {
        log::info!("discarding compositor session state at revision {}", self.revision);
        self.cache = None;
        self.revision = 0;
        self.last = None;
        self.surface.clear(Color::WHITE);
    }

    /// Compose the sheet and export it.
    pub async fn compose(&mut self) -> Result<CompositionResult> {
        self.revision += 1;
        let revision = self.revision;

        match self.run(revision).await {
            Ok(result) => {
                log::info!(
                    "composed sheet revision {} ({}x{}, {} bytes, sha256 {})",
                    revision,
                    result.width,
                    result.height,
                    result.png_data.len(),
                    result.digest()
                );
                self.last = Some(result.clone());
                Ok(result)
            }
            Err(e) => {
                log::warn!("composition {} failed: {}", revision, e);
                Err(e)
            }
        }
    }

    async fn run(&mut self, revision: u64) -> Result<CompositionResult> {
        // opaque white so transparent regions never export as black
        self.surface.clear(Color::WHITE);

        let sources = match self.cache.clone() {
            Some(s) => s,
            None => {
                let loaded = self.load_sources().await?;
                self.cache = Some(loaded.clone());
                loaded
            }
        };

        let cells = plan(&self.config.sheet, &self.config.layout)?;
        let placements = place(&self.config.layout, &cells, &sources)?;

        // tiled sources share one resampled buffer
        let mut scaled: Option<(ImageSource, RgbaImage)> = None;
        for p in &placements {
            let reuse = matches!(&scaled, Some((src, img))
                if src.same_source(&p.source) && img.dimensions() == (p.dest.width, p.dest.height));
            if !reuse {
                let img = resample(p.source.pixels(), p.dest.width, p.dest.height);
                scaled = Some((p.source.clone(), img));
            }
            if let Some((_, img)) = &scaled {
                log::debug!("cell {} -> {:?}", p.cell, p.dest);
                self.surface.blit(img, p.dest.x, p.dest.y);
            }
        }

        if let Some(style) = &self.config.guides {
            draw_guides(&mut self.surface, &cells, style);
        }

        let png_data = self.surface.encode_png()?;
        Ok(CompositionResult {
            revision,
            width: self.surface.width(),
            height: self.surface.height(),
            png_data,
        })
    }

    async fn load_sources(&self) -> Result<SourceSet> {
        match self.config.selection {
            ImageSelection::Single => Ok(SourceSet::Single(self.loader.load_one().await?)),
            ImageSelection::Four => Ok(SourceSet::Four(self.loader.load_four().await?)),
        }
    }
}

/// The result currently shown as the sheet preview.
///
/// Results are only accepted when newer than the bound one, so a superseded
/// composition can never replace a fresher preview.
#[derive(Debug, Default)]
pub struct PreviewBinding {
    current: Option<CompositionResult>,
}

impl PreviewBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `result` if it is newer than the current one.
    pub fn offer(&mut self, result: CompositionResult) -> bool {
        match &self.current {
            Some(cur) if cur.revision >= result.revision => {
                log::debug!("discarding stale revision {} (bound {})", result.revision, cur.revision);
                false
            }
            _ => {
                self.current = Some(result);
                true
            }
        }
    }

    pub fn current(&self) -> Option<&CompositionResult> {
        self.current.as_ref()
    }

    pub fn revision(&self) -> Option<u64> {
        self.current.as_ref().map(|r| r.revision)
    }

    pub fn data_url(&self) -> Option<String> {
        self.current.as_ref().map(|r| r.to_data_url())
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
