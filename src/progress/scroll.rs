//! Continuous-mode progress: each scene's progress is a pure function of how far
//! the viewport bottom has travelled through that scene's spacer region.
//!
//! Spacers are laid out top to bottom in document coordinates (CSS pixels):
//! scene 0 starts at 0 and every later spacer is pulled up by
//! `scene_overlap_ratio * viewport_height`, so consecutive scenes share a stretch
//! of scroll distance. The footer region follows the last spacer.

use crate::{
    composition::model::Experience,
    foundation::core::{Progress, Viewport},
};

/// Latest progress value of one scene. Written by its progress source only.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProgressCell {
    value: Progress,
    writes: u64,
}

impl ProgressCell {
    pub fn get(&self) -> Progress {
        self.value
    }

    pub fn set(&mut self, progress: Progress) {
        self.writes += 1;
        self.value = progress;
    }

    /// Number of writes since construction. Zero means no scroll position has
    /// been seen yet.
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

/// A vertical span of the document, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct SpacerRegion {
    pub top: f64,
    pub height: f64,
}

impl SpacerRegion {
    pub fn bottom(self) -> f64 {
        self.top + self.height
    }

    /// Progress once the viewport bottom sits at `viewport_bottom`.
    ///
    /// 0 while the region's top is still below the viewport, 1 once its bottom
    /// has reached the viewport bottom.
    pub fn progress_at(self, viewport_bottom: f64) -> Progress {
        if self.height <= 0.0 {
            return if viewport_bottom >= self.top {
                Progress::END
            } else {
                Progress::START
            };
        }
        Progress::new((viewport_bottom - self.top) / self.height)
    }
}

/// Document geometry for a given viewport.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PageLayout {
    pub spacers: Vec<SpacerRegion>,
    pub footer: SpacerRegion,
    pub document_height: f64,
}

impl PageLayout {
    pub fn measure(experience: &Experience, viewport: Viewport) -> Self {
        let vh = viewport.height();
        let config = &experience.config;
        let overlap = config.scene_overlap_ratio * vh;

        let mut spacers = Vec::with_capacity(experience.scenes.len());
        let mut cursor = 0.0_f64;
        for (index, scene) in experience.scenes.iter().enumerate() {
            let top = if index == 0 { 0.0 } else { cursor - overlap };
            let height = scene.spacer_ratio(config) * vh;
            spacers.push(SpacerRegion { top, height });
            cursor = top + height;
        }

        let footer = SpacerRegion {
            top: cursor,
            height: config.footer_height_ratio * vh,
        };
        Self {
            spacers,
            document_height: footer.bottom(),
            footer,
        }
    }

    /// Largest reachable scroll offset for `viewport`.
    pub fn max_scroll(&self, viewport: Viewport) -> f64 {
        (self.document_height - viewport.height()).max(0.0)
    }
}

/// Progress source for one continuous-mode scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollProgressSource {
    region: SpacerRegion,
}

impl ScrollProgressSource {
    pub fn new(region: SpacerRegion) -> Self {
        Self { region }
    }

    pub fn region(&self) -> SpacerRegion {
        self.region
    }

    /// Replace the geometry after a resize. The next sample uses it.
    pub fn on_resize(&mut self, region: SpacerRegion) {
        self.region = region;
    }

    pub fn sample(&self, scroll_top: f64, viewport: Viewport) -> Progress {
        self.region.progress_at(scroll_top + viewport.height())
    }
}

/// Edge of the footer reveal trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealEvent {
    /// Scrolled forward past the reveal line.
    Entered,
    /// Scrolled back above the reveal line.
    LeftBack,
}

/// Fires when the footer top crosses `offset_px` above the viewport bottom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealTrigger {
    offset_px: f64,
    revealed: bool,
}

impl RevealTrigger {
    pub fn new(offset_px: f64) -> Self {
        Self {
            offset_px,
            revealed: false,
        }
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Only edges produce events; repeated samples on one side are silent.
    pub fn update(&mut self, footer_top: f64, viewport_bottom: f64) -> Option<RevealEvent> {
        let inside = footer_top <= viewport_bottom - self.offset_px;
        match (self.revealed, inside) {
            (false, true) => {
                self.revealed = true;
                Some(RevealEvent::Entered)
            }
            (true, false) => {
                self.revealed = false;
                Some(RevealEvent::LeftBack)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/progress/scroll.rs"]
mod tests;
