use crate::{
    composition::config::EngineConfig,
    composition::model::{Experience, FrameSequence, Scene, TimedOverlay, VideoSource, VisualSource},
    foundation::error::CineResult,
};

pub struct ExperienceBuilder {
    config: EngineConfig,
    scenes: Vec<Scene>,
}

impl Default for ExperienceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExperienceBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            scenes: Vec::new(),
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn scene(mut self, scene: Scene) -> Self {
        self.scenes.push(scene);
        self
    }

    pub fn build(self) -> CineResult<Experience> {
        let exp = Experience {
            config: self.config,
            scenes: self.scenes,
        };
        exp.validate()?;
        Ok(exp)
    }
}

pub fn video_source(source: impl Into<String>) -> VisualSource {
    VisualSource::Video(VideoSource {
        source: source.into(),
    })
}

pub fn frame_sequence(folder: impl Into<String>, frame_count: usize) -> VisualSource {
    VisualSource::Frames(FrameSequence {
        folder: folder.into(),
        frame_count,
        extension: "webp".to_string(),
    })
}

pub struct SceneBuilder {
    visual: VisualSource,
    small_viewport_visual: Option<VisualSource>,
    overlays: Vec<TimedOverlay>,
    spacer_height_ratio: Option<f64>,
}

impl SceneBuilder {
    pub fn new(visual: VisualSource) -> Self {
        Self {
            visual,
            small_viewport_visual: None,
            overlays: Vec::new(),
            spacer_height_ratio: None,
        }
    }

    pub fn video(source: impl Into<String>) -> Self {
        Self::new(video_source(source))
    }

    pub fn frames(folder: impl Into<String>, frame_count: usize) -> Self {
        Self::new(frame_sequence(folder, frame_count))
    }

    pub fn small_viewport(mut self, visual: VisualSource) -> Self {
        self.small_viewport_visual = Some(visual);
        self
    }

    pub fn spacer_height_ratio(mut self, ratio: f64) -> Self {
        self.spacer_height_ratio = Some(ratio);
        self
    }

    pub fn overlay(mut self, content: impl Into<String>, start: f64, end: f64) -> CineResult<Self> {
        self.overlays.push(TimedOverlay::new(content, start, end)?);
        Ok(self)
    }

    pub fn build(self) -> CineResult<Scene> {
        let scene = Scene {
            visual: self.visual,
            small_viewport_visual: self.small_viewport_visual,
            overlays: self.overlays,
            spacer_height_ratio: self.spacer_height_ratio,
        };
        scene
            .validate()
            .map_err(|e| e.context("scene builder"))?;
        Ok(scene)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/dsl.rs"]
mod tests;
