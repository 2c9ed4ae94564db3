use image::{RgbaImage, imageops::FilterType};

use crate::{
    assets::frames::FrameImage, foundation::core::DeviceSize, playback::surface::FrameCanvas,
};

/// CPU backing store for frame-sequence scenes.
///
/// Pixels are straight RGBA8, row-major. A resize reallocates and clears, the
/// same as assigning a new width/height to a browser canvas.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterCanvas {
    size: DeviceSize,
    pixels: Vec<u8>,
    draws: u64,
}

impl std::fmt::Debug for RasterCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterCanvas")
            .field("size", &self.size)
            .field("draws", &self.draws)
            .finish()
    }
}

fn buffer_len(size: DeviceSize) -> usize {
    (size.width as usize) * (size.height as usize) * 4
}

impl RasterCanvas {
    pub fn new(size: DeviceSize) -> Self {
        Self {
            size,
            pixels: vec![0; buffer_len(size)],
            draws: 0,
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let i = ((y as usize) * (self.size.width as usize) + (x as usize)) * 4;
        let px = self.pixels.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Number of `draw_frame` calls that reached the backing store.
    pub fn draw_count(&self) -> u64 {
        self.draws
    }

    pub fn to_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.size.width, self.size.height, self.pixels.clone())
    }
}

impl FrameCanvas for RasterCanvas {
    fn resize(&mut self, size: DeviceSize) {
        self.size = size;
        self.pixels = vec![0; buffer_len(size)];
    }

    fn size(&self) -> DeviceSize {
        self.size
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn draw_frame(&mut self, frame: &FrameImage) {
        if frame.width == self.size.width && frame.height == self.size.height {
            if frame.rgba8.len() == self.pixels.len() {
                self.pixels.copy_from_slice(&frame.rgba8);
                self.draws += 1;
            } else {
                tracing::warn!(?frame, "frame buffer length does not match its dimensions");
            }
            return;
        }

        let Some(src) = RgbaImage::from_raw(frame.width, frame.height, frame.rgba8.to_vec()) else {
            tracing::warn!(?frame, "frame buffer length does not match its dimensions");
            return;
        };
        let scaled = image::imageops::resize(
            &src,
            self.size.width,
            self.size.height,
            FilterType::Triangle,
        );
        self.pixels.copy_from_slice(scaled.as_raw());
        self.draws += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
