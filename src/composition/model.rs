use std::path::Path;

use anyhow::Context as _;

use crate::{
    composition::config::EngineConfig,
    foundation::error::{CineError, CineResult},
};

/// A complete scroll experience: tuning plus the ordered scene list.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Experience {
    #[serde(default)]
    pub config: EngineConfig,
    pub scenes: Vec<Scene>,
}

/// One full-viewport segment of the experience.
///
/// A scene's index is its position in [`Experience::scenes`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    pub visual: VisualSource,
    /// Replacement source used when the session runs on a small viewport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_viewport_visual: Option<VisualSource>,
    #[serde(default)]
    pub overlays: Vec<TimedOverlay>,
    /// Overrides [`EngineConfig::spacer_height_ratio`] for this scene.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacer_height_ratio: Option<f64>,
}

/// What a scene shows: continuous media or a discrete still-frame sequence.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VisualSource {
    Video(VideoSource),
    Frames(FrameSequence),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VideoSource {
    /// Opaque media URL or path.
    pub source: String,
}

/// Ordered stills named `{folder}/frame_{NNNN}.{extension}`, numbered from 1.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameSequence {
    pub folder: String,
    pub frame_count: usize,
    #[serde(default = "default_frame_extension")]
    pub extension: String,
}

fn default_frame_extension() -> String {
    "webp".to_string()
}

/// A caption bound to a sub-range of its scene's progress.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimedOverlay {
    pub content: String,
    pub start: f64,
    pub end: f64,
}

impl Experience {
    pub fn from_json_str(s: &str) -> CineResult<Self> {
        let exp: Self = serde_json::from_str(s)?;
        exp.validate()?;
        Ok(exp)
    }

    pub fn from_json_file(path: &Path) -> CineResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read experience '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    pub fn to_json_pretty(&self) -> CineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> CineResult<()> {
        self.config.validate()?;
        if self.scenes.is_empty() {
            return Err(CineError::validation(
                "experience must contain at least one scene",
            ));
        }
        for (index, scene) in self.scenes.iter().enumerate() {
            scene
                .validate()
                .map_err(|e| e.context(format!("scene {index}")))?;
        }
        Ok(())
    }
}

impl Scene {
    pub fn validate(&self) -> CineResult<()> {
        self.visual.validate()?;
        if let Some(alt) = &self.small_viewport_visual {
            alt.validate()?;
        }
        if let Some(ratio) = self.spacer_height_ratio
            && (!ratio.is_finite() || ratio <= 0.0)
        {
            return Err(CineError::validation(
                "spacer_height_ratio must be finite and > 0",
            ));
        }
        for overlay in &self.overlays {
            overlay.validate()?;
        }
        Ok(())
    }

    /// Source to drive for the given viewport class.
    pub fn visual_for(&self, small_viewport: bool) -> &VisualSource {
        match (&self.small_viewport_visual, small_viewport) {
            (Some(alt), true) => alt,
            _ => &self.visual,
        }
    }

    pub fn spacer_ratio(&self, config: &EngineConfig) -> f64 {
        self.spacer_height_ratio
            .unwrap_or(config.spacer_height_ratio)
    }
}

impl VisualSource {
    pub fn validate(&self) -> CineResult<()> {
        match self {
            Self::Video(v) => {
                if v.source.trim().is_empty() {
                    return Err(CineError::validation("video source must be non-empty"));
                }
            }
            Self::Frames(f) => {
                if f.folder.trim().is_empty() {
                    return Err(CineError::validation("frame folder must be non-empty"));
                }
                if f.frame_count == 0 {
                    return Err(CineError::validation("frame_count must be >= 1"));
                }
                if f.extension.trim().is_empty() {
                    return Err(CineError::validation(
                        "frame extension must be non-empty",
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Video(_) => "video",
            Self::Frames(_) => "frames",
        }
    }
}

impl FrameSequence {
    /// Source of the frame in slot `slot` (0-based); file numbering starts at 1.
    pub fn frame_source(&self, slot: usize) -> String {
        let folder = self.folder.trim_end_matches('/');
        format!("{folder}/frame_{:04}.{}", slot + 1, self.extension)
    }

    pub fn frame_sources(&self) -> Vec<String> {
        (0..self.frame_count).map(|i| self.frame_source(i)).collect()
    }
}

impl TimedOverlay {
    pub fn new(content: impl Into<String>, start: f64, end: f64) -> CineResult<Self> {
        let overlay = Self {
            content: content.into(),
            start,
            end,
        };
        overlay.validate()?;
        Ok(overlay)
    }

    pub fn validate(&self) -> CineResult<()> {
        if !(self.start.is_finite() && self.end.is_finite()) {
            return Err(CineError::validation(format!(
                "overlay '{}' window must be finite",
                self.content
            )));
        }
        if !(0.0 <= self.start && self.start < self.end && self.end <= 1.0) {
            return Err(CineError::validation(format!(
                "overlay '{}' needs 0 <= start < end <= 1 (got {}..{})",
                self.content, self.start, self.end
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/model.rs"]
mod tests;
