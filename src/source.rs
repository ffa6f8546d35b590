//! Approved-image sources.
//!
//! A [`SourceLoader`] fetches the approved image(s) for the current session and
//! decodes them before returning, so the compositor never sees a partially
//! available set. Loaders do not retry: one failed attempt is returned to the
//! caller as is.

use crate::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::RgbaImage;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Number of cells on a sheet.
pub const SHEET_CELLS: usize = 4;

/// A decoded, immutable raster. Clones share the pixel buffer.
#[derive(Debug, Clone)]
pub struct ImageSource {
    pixels: Arc<RgbaImage>,
}

impl ImageSource {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels: Arc::new(pixels) }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Whether two handles point at the same decoded buffer.
    pub fn same_source(&self, other: &ImageSource) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

/// Decode an encoded image (PNG/JPEG/WebP) into an [`ImageSource`].
pub fn decode_bytes(bytes: &[u8]) -> Result<ImageSource> {
    let img = image::load_from_memory(bytes).map_err(|e| Error::DecodeFailed(e.to_string()))?;
    Ok(ImageSource::new(img.to_rgba8()))
}

/// Decode a `data:image/<type>;base64,<payload>` URL.
pub fn decode_data_url(data_url: &str) -> Result<ImageSource> {
    let (header, payload) = data_url
        .split_once(',')
        .ok_or_else(|| Error::DecodeFailed("data URL has no payload".into()))?;
    if !header.starts_with("data:image/") || !header.ends_with(";base64") {
        let shown: String = header.chars().take(40).collect();
        return Err(Error::DecodeFailed(format!("unsupported data URL header: {}", shown)));
    }
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| Error::DecodeFailed(format!("bad base64 payload: {}", e)))?;
    decode_bytes(&bytes)
}

#[cfg_attr(not(feature = "http"), allow(dead_code))]
fn decode_all(data_urls: &[String]) -> Result<[ImageSource; SHEET_CELLS]> {
    if data_urls.len() != SHEET_CELLS {
        return Err(Error::CountMismatch {
            expected: SHEET_CELLS,
            actual: data_urls.len(),
        });
    }
    let decoded = data_urls
        .iter()
        .map(|u| decode_data_url(u))
        .collect::<Result<Vec<_>>>()?;
    decoded.try_into().map_err(|v: Vec<ImageSource>| Error::CountMismatch {
        expected: SHEET_CELLS,
        actual: v.len(),
    })
}

/// Fetches and decodes the approved images.
#[allow(async_fn_in_trait)]
pub trait SourceLoader {
    /// The single approved image.
    async fn load_one(&self) -> Result<ImageSource>;

    /// Exactly four approved images, in cell order.
    async fn load_four(&self) -> Result<[ImageSource; SHEET_CELLS]>;
}

impl<L: SourceLoader> SourceLoader for &L {
    async fn load_one(&self) -> Result<ImageSource> {
        (**self).load_one().await
    }

    async fn load_four(&self) -> Result<[ImageSource; SHEET_CELLS]> {
        (**self).load_four().await
    }
}

/// `GET /api/approved`
#[derive(Debug, Deserialize)]
pub struct ApprovedResponse {
    pub ok: bool,
    #[serde(default)]
    pub data_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `GET /api/approved-list`
#[derive(Debug, Deserialize)]
pub struct ApprovedListResponse {
    pub ok: bool,
    #[serde(default)]
    pub data_urls: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Loads approved images from the booth backend.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpSourceLoader {
    backend: crate::backend::BackendClient,
}

#[cfg(feature = "http")]
impl HttpSourceLoader {
    pub fn new(backend: crate::backend::BackendClient) -> Self {
        Self { backend }
    }
}

#[cfg(feature = "http")]
impl SourceLoader for HttpSourceLoader {
    async fn load_one(&self) -> Result<ImageSource> {
        let resp: ApprovedResponse = self.backend.get_json(crate::backend::APPROVED_PATH).await?;
        let data_url = match (resp.ok, resp.data_url) {
            (true, Some(u)) => u,
            _ => {
                return Err(Error::MissingApproved(
                    resp.error.unwrap_or_else(|| "backend reported no approved image".into()),
                ))
            }
        };
        let src = decode_data_url(&data_url)?;
        log::info!("loaded approved image {}x{}", src.width(), src.height());
        Ok(src)
    }

    async fn load_four(&self) -> Result<[ImageSource; SHEET_CELLS]> {
        let resp: ApprovedListResponse = self.backend.get_json(crate::backend::APPROVED_LIST_PATH).await?;
        if !resp.ok {
            return Err(Error::MissingApproved(
                resp.error.unwrap_or_else(|| "backend reported no approved images".into()),
            ));
        }
        let urls = resp.data_urls.unwrap_or_default();
        let sources = decode_all(&urls)?;
        log::info!("loaded {} approved images", sources.len());
        Ok(sources)
    }
}

/// Serves encoded payloads held in memory (local files, fixtures).
#[derive(Debug, Clone, Default)]
pub struct StaticSourceLoader {
    payloads: Vec<Vec<u8>>,
}

impl StaticSourceLoader {
    pub fn new(payloads: Vec<Vec<u8>>) -> Self {
        Self { payloads }
    }

    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let payloads = paths
            .iter()
            .map(|p| {
                std::fs::read(p.as_ref())
                    .map_err(|e| Error::Other(format!("Failed to read {}: {}", p.as_ref().display(), e)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { payloads })
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

impl SourceLoader for StaticSourceLoader {
    async fn load_one(&self) -> Result<ImageSource> {
        let first = self
            .payloads
            .first()
            .ok_or_else(|| Error::MissingApproved("no image supplied".into()))?;
        decode_bytes(first)
    }

    async fn load_four(&self) -> Result<[ImageSource; SHEET_CELLS]> {
        if self.payloads.is_empty() {
            return Err(Error::MissingApproved("no images supplied".into()));
        }
        if self.payloads.len() != SHEET_CELLS {
            return Err(Error::CountMismatch {
                expected: SHEET_CELLS,
                actual: self.payloads.len(),
            });
        }
        let decoded = self
            .payloads
            .iter()
            .map(|b| decode_bytes(b))
            .collect::<Result<Vec<_>>>()?;
        decoded.try_into().map_err(|v: Vec<ImageSource>| Error::CountMismatch {
            expected: SHEET_CELLS,
            actual: v.len(),
        })
    }
}
