//! Timed caption evaluation.
//!
//! A caption is visible over `[start, end]` of its scene's progress. Opacity and
//! vertical offset follow a four-point piecewise-linear curve through
//! `[start, start + ramp, end - ramp, end]`:
//!
//! | point   | opacity | offset    |
//! |---------|---------|-----------|
//! | start   | 0       | `+travel` |
//! | rise    | 1       | 0         |
//! | fall    | 1       | 0         |
//! | end     | 0       | `-travel` |
//!
//! When the window is narrower than two ramps, rise and fall are clamped onto
//! the window midpoint, so the caption peaks at full opacity exactly once in
//! the middle instead of producing inverted control points.

use crate::{
    composition::config::EngineConfig,
    composition::model::TimedOverlay,
    foundation::core::{Progress, Vec2},
    foundation::math::interpolate,
};

/// Presentation values for one caption at one progress value.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct OverlayState {
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Vertical offset in CSS pixels; positive is below the resting position.
    pub translate_y: f64,
}

impl OverlayState {
    pub fn is_visible(self) -> bool {
        self.opacity > 0.0
    }

    pub fn offset(self) -> Vec2 {
        Vec2::new(0.0, self.translate_y)
    }
}

/// Ramp shape shared by all captions of an experience.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayCurve {
    pub ramp: f64,
    pub travel: f64,
}

impl Default for OverlayCurve {
    fn default() -> Self {
        Self {
            ramp: 0.05,
            travel: 50.0,
        }
    }
}

impl OverlayCurve {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            ramp: config.overlay_ramp,
            travel: config.overlay_travel,
        }
    }

    /// `[start, rise, fall, end]`, or `None` for an empty/inverted/non-finite window.
    pub fn control_points(self, start: f64, end: f64) -> Option<[f64; 4]> {
        if !(start.is_finite() && end.is_finite()) || start >= end {
            return None;
        }
        let ramp = if self.ramp.is_finite() { self.ramp.max(0.0) } else { 0.0 };
        let mid = (start + end) / 2.0;
        let rise = (start + ramp).min(mid);
        let fall = (end - ramp).max(mid);
        Some([start, rise, fall, end])
    }

    pub fn evaluate(self, progress: Progress, overlay: &TimedOverlay) -> OverlayState {
        let Some(stops) = self.control_points(overlay.start, overlay.end) else {
            return OverlayState {
                opacity: 0.0,
                translate_y: self.travel,
            };
        };

        let p = progress.get();
        OverlayState {
            opacity: interpolate(p, &stops, &[0.0, 1.0, 1.0, 0.0]).clamp(0.0, 1.0),
            translate_y: interpolate(p, &stops, &[self.travel, 0.0, 0.0, -self.travel]),
        }
    }

    pub fn evaluate_all(self, progress: Progress, overlays: &[TimedOverlay]) -> Vec<OverlayState> {
        overlays
            .iter()
            .map(|overlay| self.evaluate(progress, overlay))
            .collect()
    }
}

/// Evaluate `overlay` with the default 5% ramps and 50px travel.
pub fn evaluate_overlay(progress: Progress, overlay: &TimedOverlay) -> OverlayState {
    OverlayCurve::default().evaluate(progress, overlay)
}

#[cfg(test)]
#[path = "../../tests/unit/eval/overlay.rs"]
mod tests;
