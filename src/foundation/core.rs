use crate::foundation::error::{CineError, CineResult};

pub use kurbo::{Size, Vec2};

/// Stacking order of a composited layer. Higher values paint on top.
pub type ZIndex = i32;

/// Normalized playback position of one scene, always in `[0, 1]`.
///
/// Construction clamps; `NaN` collapses to the start so a broken measurement
/// can never leak an out-of-range value into the driver.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Progress(f64);

impl Progress {
    /// Progress at the very start of a scene.
    pub const START: Self = Self(0.0);
    /// Progress at the very end of a scene.
    pub const END: Self = Self(1.0);

    /// Clamp `value` into `[0, 1]`.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::START;
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Raw scalar value.
    pub fn get(self) -> f64 {
        self.0
    }
}

impl From<f64> for Progress {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

/// Backing-store size in device pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeviceSize {
    /// Width in device pixels.
    pub width: u32,
    /// Height in device pixels.
    pub height: u32,
}

/// Visible area of the host window, in CSS pixels, plus its pixel density.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Width and height in CSS pixels.
    pub size: Size,
    /// Device pixels per CSS pixel.
    pub device_pixel_ratio: f64,
}

impl Viewport {
    /// Viewport at a device pixel ratio of 1.
    pub fn new(width: f64, height: f64) -> CineResult<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(CineError::validation(
                "viewport width/height must be finite and > 0",
            ));
        }
        Ok(Self {
            size: Size::new(width, height),
            device_pixel_ratio: 1.0,
        })
    }

    /// Replace the pixel density.
    pub fn with_device_pixel_ratio(mut self, dpr: f64) -> CineResult<Self> {
        if !dpr.is_finite() || dpr <= 0.0 {
            return Err(CineError::validation(
                "device pixel ratio must be finite and > 0",
            ));
        }
        self.device_pixel_ratio = dpr;
        Ok(self)
    }

    pub fn width(self) -> f64 {
        self.size.width
    }

    pub fn height(self) -> f64 {
        self.size.height
    }

    /// Backing-store dimensions for a canvas covering the whole viewport.
    pub fn device_size(self) -> DeviceSize {
        fn to_device(css: f64, dpr: f64) -> u32 {
            (css * dpr).round().clamp(1.0, f64::from(u32::MAX)) as u32
        }

        DeviceSize {
            width: to_device(self.size.width, self.device_pixel_ratio),
            height: to_device(self.size.height, self.device_pixel_ratio),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
