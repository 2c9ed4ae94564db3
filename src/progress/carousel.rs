//! Discrete (carousel) progress for small viewports.
//!
//! Instead of scrubbing, each scene is a full-screen slide whose media plays
//! freely. The host reports slide visibility; a slide becomes active once its
//! visible ratio reaches the configured threshold. Reaching the last slide
//! schedules a single `StackCompleted` after the settle delay.

use crate::{
    animation::ease::Ease,
    composition::config::EngineConfig,
    composition::model::{Experience, VideoSource, VisualSource},
    foundation::error::{CineError, CineResult},
    playback::surface::{HostBindings, ListenerKind, MediaElement, Subscriptions, SurfaceProvider},
};

/// Caption slides up from this offset (CSS pixels) while fading in.
pub const CAPTION_ENTER_OFFSET: f64 = 30.0;
/// Caption drifts toward this offset while fading out.
pub const CAPTION_EXIT_OFFSET: f64 = -20.0;

/// Visibility report for one slide.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEntry {
    pub index: usize,
    pub visible_ratio: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CarouselEvent {
    ActiveIndexChanged { index: usize },
    StackCompleted,
}

/// Presentation of the active slide's caption.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CaptionState {
    pub scene: usize,
    pub content: String,
    pub opacity: f64,
    pub translate_y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Completion {
    Idle,
    Pending { due_ms: u64 },
    Fired,
}

struct Slide {
    media: Box<dyn MediaElement>,
    caption: Option<String>,
}

pub struct CarouselController {
    slides: Vec<Slide>,
    threshold: f64,
    settle_delay_ms: u64,
    caption_hold_ms: u64,
    caption_fade_ms: u64,
    caption_ease: Ease,
    active: Option<usize>,
    activated_at_ms: u64,
    completion: Completion,
    subscriptions: Subscriptions,
    attached: bool,
    torn_down: bool,
}

impl std::fmt::Debug for CarouselController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarouselController")
            .field("slides", &self.slides.len())
            .field("active", &self.active)
            .field("completion", &self.completion)
            .finish_non_exhaustive()
    }
}

/// Video that backs scene `index` in carousel mode.
fn carousel_video(index: usize, visual: &VisualSource, alt: Option<&VisualSource>) -> CineResult<VideoSource> {
    let candidates = std::iter::once(visual).chain(alt);
    for candidate in candidates {
        if let VisualSource::Video(v) = candidate {
            return Ok(v.clone());
        }
    }
    Err(CineError::validation(format!(
        "scene {index}: carousel mode needs a video source"
    )))
}

impl CarouselController {
    #[tracing::instrument(skip_all, fields(scenes = experience.scenes.len()))]
    pub fn new(experience: &Experience, provider: &mut dyn SurfaceProvider) -> CineResult<Self> {
        let mut slides = Vec::with_capacity(experience.scenes.len());
        for (index, scene) in experience.scenes.iter().enumerate() {
            let video = carousel_video(index, &scene.visual, scene.small_viewport_visual.as_ref())?;
            let media = provider.media_for(index, &video)?;
            slides.push(Slide {
                media,
                caption: scene.overlays.first().map(|o| o.content.clone()),
            });
        }
        Ok(Self::from_parts(slides, &experience.config))
    }

    fn from_parts(slides: Vec<Slide>, config: &EngineConfig) -> Self {
        Self {
            slides,
            threshold: config.carousel_threshold,
            settle_delay_ms: config.settle_delay_ms,
            caption_hold_ms: config.caption_hold_ms,
            caption_fade_ms: config.caption_fade_ms,
            caption_ease: config.caption_ease,
            active: None,
            activated_at_ms: 0,
            completion: Completion::Idle,
            subscriptions: Subscriptions::default(),
            attached: false,
            torn_down: false,
        }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn is_completed(&self) -> bool {
        self.completion == Completion::Fired
    }

    /// Observe every slide's visibility.
    pub fn attach(&mut self, host: &mut dyn HostBindings) {
        if self.attached || self.torn_down {
            return;
        }
        for index in 0..self.slides.len() {
            self.subscriptions
                .acquire(host, index, ListenerKind::Intersection);
        }
        self.attached = true;
    }

    /// Apply visibility reports; each slide crossing the threshold becomes active.
    pub fn on_intersection(&mut self, now_ms: u64, entries: &[IntersectionEntry]) -> Vec<CarouselEvent> {
        let mut events = Vec::new();
        if self.torn_down {
            return events;
        }
        for entry in entries {
            if entry.index >= self.slides.len() {
                tracing::debug!(index = entry.index, "intersection for unknown slide");
                continue;
            }
            let below = entry.visible_ratio.is_nan() || entry.visible_ratio < self.threshold;
            if below || self.active == Some(entry.index) {
                continue;
            }
            self.activate(now_ms, entry.index);
            events.push(CarouselEvent::ActiveIndexChanged { index: entry.index });
        }
        events
    }

    /// Advance timers. Emits `StackCompleted` once its settle delay has elapsed.
    pub fn tick(&mut self, now_ms: u64) -> Vec<CarouselEvent> {
        if self.torn_down {
            return Vec::new();
        }
        match self.completion {
            Completion::Pending { due_ms } if now_ms >= due_ms => {
                self.completion = Completion::Fired;
                tracing::debug!(now_ms, "carousel completed");
                vec![CarouselEvent::StackCompleted]
            }
            _ => Vec::new(),
        }
    }

    /// Caption of the active slide at `now_ms`, or `None` once it has faded out.
    pub fn caption_at(&self, now_ms: u64) -> Option<CaptionState> {
        let scene = self.active?;
        let content = self.slides.get(scene)?.caption.clone()?;
        let elapsed = now_ms.saturating_sub(self.activated_at_ms);
        let fade = self.caption_fade_ms.max(1) as f64;
        let ease = self.caption_ease;

        let (opacity, translate_y) = if elapsed < self.caption_fade_ms.min(self.caption_hold_ms) {
            let t = elapsed as f64 / fade;
            (ease.apply(t), ease.tween(CAPTION_ENTER_OFFSET, 0.0, t))
        } else if elapsed < self.caption_hold_ms {
            (1.0, 0.0)
        } else if elapsed < self.caption_hold_ms + self.caption_fade_ms {
            let t = (elapsed - self.caption_hold_ms) as f64 / fade;
            (1.0 - ease.apply(t), ease.tween(0.0, CAPTION_EXIT_OFFSET, t))
        } else {
            return None;
        };

        Some(CaptionState {
            scene,
            content,
            opacity,
            translate_y,
        })
    }

    /// Release the visibility listeners. Later events are ignored.
    pub fn teardown(&mut self, host: &mut dyn HostBindings) {
        if self.torn_down {
            return;
        }
        self.subscriptions.release_all(host);
        self.torn_down = true;
    }

    fn activate(&mut self, now_ms: u64, index: usize) {
        for (i, slide) in self.slides.iter_mut().enumerate() {
            if i == index {
                slide.media.set_current_time(0.0);
                if let Err(err) = slide.media.play() {
                    tracing::warn!(scene = i, error = %err, "slide playback refused");
                }
            } else {
                slide.media.pause();
            }
        }
        self.active = Some(index);
        self.activated_at_ms = now_ms;
        tracing::debug!(index, now_ms, "slide active");

        if index + 1 == self.slides.len() && self.completion == Completion::Idle {
            self.completion = Completion::Pending {
                due_ms: now_ms.saturating_add(self.settle_delay_ms),
            };
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/progress/carousel.rs"]
mod tests;
