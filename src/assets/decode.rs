use std::sync::Arc;

use anyhow::Context;

use crate::{assets::frames::FrameImage, foundation::error::CineResult};

/// Decode encoded still-frame bytes (webp, png, jpeg, ...) into straight RGBA8.
pub fn decode_frame(bytes: &[u8]) -> CineResult<FrameImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode frame from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(FrameImage {
        width,
        height,
        rgba8: Arc::new(rgba.into_raw()),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
