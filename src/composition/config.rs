use crate::{
    animation::ease::Ease,
    foundation::core::ZIndex,
    foundation::error::{CineError, CineResult},
};

/// Tuning constants shared by every scene of an experience.
///
/// Every field has a default, so an experience file may omit the whole block
/// or any subset of it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Share of a scene's progress range over which a later scene fades in.
    pub fade_window: f64,
    /// Width of each caption ramp (fade/slide in and out), in progress units.
    pub overlay_ramp: f64,
    /// Vertical caption travel during its ramps, in CSS pixels.
    pub overlay_travel: f64,
    /// z-index of scene 0; scene `i` sits at `base_z + i`.
    pub base_z: ZIndex,
    /// Default spacer height as a multiple of viewport height.
    pub spacer_height_ratio: f64,
    /// Overlap between consecutive spacers, as a multiple of viewport height.
    pub scene_overlap_ratio: f64,
    /// Height of the trailing footer region, as a multiple of viewport height.
    pub footer_height_ratio: f64,
    /// The reveal trigger fires once the footer top is this far above the viewport bottom.
    pub reveal_offset_px: f64,
    /// Visible ratio at which a carousel scene becomes active.
    pub carousel_threshold: f64,
    /// Delay between reaching the last carousel scene and `StackCompleted`.
    pub settle_delay_ms: u64,
    /// How long a carousel caption stays up after activation.
    pub caption_hold_ms: u64,
    /// Carousel caption fade duration (applies to both fade in and fade out).
    pub caption_fade_ms: u64,
    /// Carousel caption timing curve.
    pub caption_ease: Ease,
    /// Viewports narrower than this are treated as small/touch.
    pub small_viewport_breakpoint_px: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fade_window: 0.2,
            overlay_ramp: 0.05,
            overlay_travel: 50.0,
            base_z: 10,
            spacer_height_ratio: 2.0,
            scene_overlap_ratio: 0.3,
            footer_height_ratio: 0.5,
            reveal_offset_px: 100.0,
            carousel_threshold: 0.6,
            settle_delay_ms: 2000,
            caption_hold_ms: 3000,
            caption_fade_ms: 800,
            caption_ease: Ease::OutQuad,
            small_viewport_breakpoint_px: 768.0,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> CineResult<()> {
        fn positive(name: &str, v: f64) -> CineResult<()> {
            if !v.is_finite() || v <= 0.0 {
                return Err(CineError::validation(format!(
                    "config.{name} must be finite and > 0"
                )));
            }
            Ok(())
        }

        positive("fade_window", self.fade_window)?;
        positive("overlay_ramp", self.overlay_ramp)?;
        if self.overlay_ramp > 0.5 {
            return Err(CineError::validation("config.overlay_ramp must be <= 0.5"));
        }
        if !self.overlay_travel.is_finite() {
            return Err(CineError::validation("config.overlay_travel must be finite"));
        }
        positive("spacer_height_ratio", self.spacer_height_ratio)?;
        positive("footer_height_ratio", self.footer_height_ratio)?;
        positive(
            "small_viewport_breakpoint_px",
            self.small_viewport_breakpoint_px,
        )?;
        if !self.scene_overlap_ratio.is_finite() || self.scene_overlap_ratio < 0.0 {
            return Err(CineError::validation(
                "config.scene_overlap_ratio must be finite and >= 0",
            ));
        }
        if !self.reveal_offset_px.is_finite() {
            return Err(CineError::validation(
                "config.reveal_offset_px must be finite",
            ));
        }
        if !(self.carousel_threshold > 0.0 && self.carousel_threshold <= 1.0) {
            return Err(CineError::validation(
                "config.carousel_threshold must be in (0, 1]",
            ));
        }
        Ok(())
    }

    /// Convenience breakpoint check for hosts that have no opinion of their own.
    pub fn is_small_viewport(&self, width_css_px: f64) -> bool {
        width_css_px < self.small_viewport_breakpoint_px
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/config.rs"]
mod tests;
