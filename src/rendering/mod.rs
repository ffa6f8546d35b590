//! Sheet rendering: geometry planning, fitting, guides and the raster surface.

pub mod fit;
pub mod guides;
pub mod layout;
pub mod paint;
pub mod raster;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

/// An exported sheet raster together with the revision that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionResult {
    pub revision: u64,
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl CompositionResult {
    /// `data:image/png;base64,...` for embedding as an image source.
    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.png_data))
    }

    /// Hex SHA-256 of the encoded payload.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.png_data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_and_digest() {
        let r = CompositionResult { revision: 1, width: 1, height: 1, png_data: b"abc".to_vec() };
        assert_eq!(r.to_data_url(), "data:image/png;base64,YWJj");
        assert_eq!(
            r.digest(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
