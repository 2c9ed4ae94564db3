//! Continuous-mode scene stack.
//!
//! Owns one [`SceneDriver`] per scene in index order, the spacer geometry they
//! are measured against, and the footer reveal trigger. Every scroll tick is
//! fanned out to all scenes; each scene only ever sees its own progress.

use crate::{
    assets::frames::FrameImage,
    composition::config::EngineConfig,
    composition::model::Experience,
    foundation::core::Viewport,
    foundation::error::CineResult,
    playback::driver::{CompositedLayer, DriverState, SceneDriver, SceneUpdate},
    playback::surface::{HostBindings, SurfaceProvider},
    progress::scroll::{PageLayout, RevealEvent, RevealTrigger, ScrollProgressSource},
};

/// Output of one scroll tick.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct StackTick {
    pub scroll_top: f64,
    pub updates: Vec<SceneUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveal: Option<RevealEvent>,
}

#[derive(Debug)]
pub struct SceneStack {
    config: EngineConfig,
    experience: Experience,
    viewport: Viewport,
    layout: PageLayout,
    sources: Vec<ScrollProgressSource>,
    drivers: Vec<SceneDriver>,
    reveal: RevealTrigger,
    scroll_top: f64,
}

impl SceneStack {
    /// Build drivers for every scene, asking `provider` for each surface.
    ///
    /// `small_viewport` selects each scene's small-viewport visual where one is set.
    #[tracing::instrument(skip(experience, provider), fields(scenes = experience.scenes.len()))]
    pub fn new(
        experience: &Experience,
        viewport: Viewport,
        small_viewport: bool,
        provider: &mut dyn SurfaceProvider,
    ) -> CineResult<Self> {
        experience.validate()?;
        let config = experience.config.clone();

        let mut drivers = Vec::with_capacity(experience.scenes.len());
        for (index, scene) in experience.scenes.iter().enumerate() {
            let visual = scene.visual_for(small_viewport);
            let surface = provider.surface_for(index, visual)?;
            drivers.push(SceneDriver::new(index, scene, visual, surface, &config)?);
        }

        let layout = PageLayout::measure(experience, viewport);
        let sources = layout
            .spacers
            .iter()
            .copied()
            .map(ScrollProgressSource::new)
            .collect();

        Ok(Self {
            reveal: RevealTrigger::new(config.reveal_offset_px),
            config,
            experience: experience.clone(),
            viewport,
            layout,
            sources,
            drivers,
            scroll_top: 0.0,
        })
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn drivers(&self) -> &[SceneDriver] {
        &self.drivers
    }

    pub fn driver(&self, scene: usize) -> Option<&SceneDriver> {
        self.drivers.get(scene)
    }

    /// Layer snapshot in paint order (lowest z first).
    pub fn layers(&self) -> Vec<CompositedLayer> {
        let mut layers: Vec<_> = self.drivers.iter().map(SceneDriver::layer).collect();
        layers.sort_by_key(|l| l.z_index);
        layers
    }

    /// Whether every scene has left the loading phase.
    pub fn is_ready(&self) -> bool {
        self.drivers
            .iter()
            .all(|d| matches!(d.state(), DriverState::Ready | DriverState::Scrubbing))
    }

    /// Attach every driver and push the current viewport to them.
    #[tracing::instrument(skip_all, fields(scenes = self.drivers.len()))]
    pub fn attach(&mut self, host: &mut dyn HostBindings) {
        for driver in &mut self.drivers {
            driver.attach(host);
            driver.on_resize(self.viewport);
        }
    }

    /// Fan a scroll offset out to every scene's progress source and driver.
    pub fn on_scroll(&mut self, scroll_top: f64) -> StackTick {
        let scroll_top = if scroll_top.is_finite() {
            scroll_top.max(0.0)
        } else {
            tracing::debug!(scroll_top, "non-finite scroll offset treated as 0");
            0.0
        };
        self.scroll_top = scroll_top;

        let mut updates = Vec::new();
        for (source, driver) in self.sources.iter().zip(self.drivers.iter_mut()) {
            let progress = source.sample(scroll_top, self.viewport);
            if let Some(update) = driver.on_progress(progress) {
                updates.push(update);
            }
        }

        let viewport_bottom = scroll_top + self.viewport.height();
        let reveal = self.reveal.update(self.layout.footer.top, viewport_bottom);
        if let Some(event) = reveal {
            tracing::debug!(?event, scroll_top, "footer reveal");
        }
        tracing::trace!(scroll_top, updated = updates.len(), "scroll tick");

        StackTick {
            scroll_top,
            updates,
            reveal,
        }
    }

    /// Re-measure geometry for `viewport`. Stored progress is left untouched.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn on_resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.layout = PageLayout::measure(&self.experience, viewport);
        for (source, region) in self.sources.iter_mut().zip(&self.layout.spacers) {
            source.on_resize(*region);
        }
        for driver in &mut self.drivers {
            driver.on_resize(viewport);
        }
    }

    /// Forward a media duration; returns the update applied if the scene became ready.
    pub fn on_media_metadata(&mut self, scene: usize, seconds: f64) -> Option<SceneUpdate> {
        match self.drivers.get_mut(scene) {
            Some(driver) => driver.on_media_metadata(seconds),
            None => {
                tracing::debug!(scene, "metadata for unknown scene");
                None
            }
        }
    }

    pub fn on_frame_resolved(
        &mut self,
        scene: usize,
        slot: usize,
        result: CineResult<FrameImage>,
    ) -> Option<SceneUpdate> {
        match self.drivers.get_mut(scene) {
            Some(driver) => driver.on_frame_resolved(slot, result),
            None => {
                tracing::debug!(scene, slot, "frame for unknown scene");
                None
            }
        }
    }

    /// Tear down every driver. Safe to call more than once.
    pub fn teardown(&mut self, host: &mut dyn HostBindings) {
        for driver in &mut self.drivers {
            driver.teardown(host);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/stack.rs"]
mod tests;
