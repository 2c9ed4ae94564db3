//! Per-scene playback driver.
//!
//! A driver owns one scene's surface, its composited layer and its progress cell,
//! and turns progress updates into visual, opacity and caption changes:
//!
//! ```text
//! Unattached --attach--> Loading --ready--> Ready --progress--> Scrubbing
//!      \                    \                 \                   |
//!       +--------------------+-----------------+---teardown--> TornDown
//! ```
//!
//! Readiness means a finite positive duration for continuous media, or every
//! frame slot resolved (loaded or failed) for a frame sequence. Progress that
//! arrives while loading is recorded without touching the surface, then applied
//! in full when the scene becomes ready.

use crate::{
    assets::frames::FrameImage,
    composition::config::EngineConfig,
    composition::model::{Scene, TimedOverlay, VisualSource},
    eval::overlay::{OverlayCurve, OverlayState},
    foundation::core::{Progress, Viewport, ZIndex},
    foundation::error::{CineError, CineResult},
    playback::surface::{
        FrameCanvas, HostBindings, ListenerKind, MediaElement, SceneSurface, Subscriptions,
    },
    progress::scroll::ProgressCell,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverState {
    Unattached,
    Loading,
    Ready,
    Scrubbing,
    TornDown,
}

impl DriverState {
    /// Whether progress updates reach the surface.
    pub fn accepts_progress(self) -> bool {
        matches!(self, Self::Ready | Self::Scrubbing)
    }
}

/// Presentation properties of a scene's full-viewport layer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CompositedLayer {
    pub opacity: f64,
    pub z_index: ZIndex,
}

/// What the driver did to its surface for one progress update.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VisualUpdate {
    /// Media seeked to `seconds`.
    MediaTime { seconds: f64 },
    /// Frame `index` is on the canvas.
    Frame { index: usize },
    /// Frame `index` failed to load; the canvas keeps its previous content.
    FrameMissing { index: usize },
    /// No usable duration; nothing was written.
    Skipped,
}

/// Everything one progress update changed for a scene.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SceneUpdate {
    pub scene: usize,
    pub progress: Progress,
    pub visual: VisualUpdate,
    pub layer: CompositedLayer,
    pub overlays: Vec<OverlayState>,
}

/// Index of the frame shown at `progress`: `floor(p * n)`, capped to the last frame.
pub fn frame_index(progress: Progress, frame_count: usize) -> usize {
    if frame_count == 0 {
        return 0;
    }
    let raw = (progress.get() * frame_count as f64).floor() as usize;
    raw.min(frame_count - 1)
}

/// Cross-fade opacity of scene `index` at `progress`.
///
/// The first scene is always opaque; later scenes fade in over `[0, fade_window]`.
pub fn crossfade_opacity(index: usize, progress: Progress, fade_window: f64) -> f64 {
    if index == 0 || fade_window <= 0.0 {
        return 1.0;
    }
    (progress.get() / fade_window).min(1.0)
}

/// Initial layer written at attach time: only the first scene starts visible.
pub fn initial_layer(index: usize, base_z: ZIndex) -> CompositedLayer {
    CompositedLayer {
        opacity: if index == 0 { 1.0 } else { 0.0 },
        z_index: base_z.saturating_add(ZIndex::try_from(index).unwrap_or(ZIndex::MAX)),
    }
}

#[derive(Clone, Debug)]
enum FrameSlot {
    Pending,
    Loaded(FrameImage),
    Failed,
}

enum Visual {
    Timed {
        media: Box<dyn MediaElement>,
        duration: Option<f64>,
    },
    Frames {
        canvas: Box<dyn FrameCanvas>,
        slots: Vec<FrameSlot>,
        resolved: usize,
        current: Option<usize>,
        viewport: Option<Viewport>,
    },
}

impl Visual {
    fn is_ready(&self) -> bool {
        match self {
            Self::Timed { duration, .. } => duration.is_some(),
            Self::Frames { slots, resolved, .. } => *resolved == slots.len(),
        }
    }
}

pub struct SceneDriver {
    index: usize,
    state: DriverState,
    layer: CompositedLayer,
    progress: ProgressCell,
    fade_window: f64,
    curve: OverlayCurve,
    overlays: Vec<TimedOverlay>,
    visual: Visual,
    subscriptions: Subscriptions,
}

impl std::fmt::Debug for SceneDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneDriver")
            .field("index", &self.index)
            .field("state", &self.state)
            .field("layer", &self.layer)
            .field("progress", &self.progress.get())
            .finish_non_exhaustive()
    }
}

impl SceneDriver {
    /// Pair `scene` (presented through `visual`) with the host `surface`.
    ///
    /// Fails when the surface kind does not match the visual source.
    pub fn new(
        index: usize,
        scene: &Scene,
        visual: &VisualSource,
        surface: SceneSurface,
        config: &EngineConfig,
    ) -> CineResult<Self> {
        let visual = match (visual, surface) {
            (VisualSource::Video(_), SceneSurface::Media(media)) => Visual::Timed {
                media,
                duration: None,
            },
            (VisualSource::Frames(seq), SceneSurface::Canvas(canvas)) => Visual::Frames {
                canvas,
                slots: vec![FrameSlot::Pending; seq.frame_count],
                resolved: 0,
                current: None,
                viewport: None,
            },
            (source, surface) => {
                return Err(CineError::playback(format!(
                    "scene {index}: {} source cannot drive a {} surface",
                    source.kind_name(),
                    surface.kind_name()
                )));
            }
        };

        Ok(Self {
            index,
            state: DriverState::Unattached,
            layer: initial_layer(index, config.base_z),
            progress: ProgressCell::default(),
            fade_window: config.fade_window,
            curve: OverlayCurve::from_config(config),
            overlays: scene.overlays.clone(),
            visual,
            subscriptions: Subscriptions::default(),
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn layer(&self) -> CompositedLayer {
        self.layer
    }

    pub fn progress(&self) -> Progress {
        self.progress.get()
    }

    /// Known media duration, if this is a continuous-media scene past metadata.
    pub fn duration(&self) -> Option<f64> {
        match &self.visual {
            Visual::Timed { duration, .. } => *duration,
            Visual::Frames { .. } => None,
        }
    }

    /// Frame currently on the canvas, if this is a frame-sequence scene.
    pub fn current_frame(&self) -> Option<usize> {
        match &self.visual {
            Visual::Frames { current, .. } => *current,
            Visual::Timed { .. } => None,
        }
    }

    /// `(resolved, total)` frame slots, if this is a frame-sequence scene.
    pub fn frames_resolved(&self) -> Option<(usize, usize)> {
        match &self.visual {
            Visual::Frames { slots, resolved, .. } => Some((*resolved, slots.len())),
            Visual::Timed { .. } => None,
        }
    }

    /// Number of host listeners currently held.
    pub fn listener_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn overlay_states(&self) -> Vec<OverlayState> {
        self.curve.evaluate_all(self.progress.get(), &self.overlays)
    }

    /// Write the initial layer and register host listeners. Only valid once.
    #[tracing::instrument(level = "debug", skip(self, host), fields(scene = self.index))]
    pub fn attach(&mut self, host: &mut dyn HostBindings) {
        if self.state != DriverState::Unattached {
            tracing::debug!(state = ?self.state, "attach ignored");
            return;
        }

        self.subscriptions
            .acquire(host, self.index, ListenerKind::ScrollTrigger);
        let kind = match self.visual {
            Visual::Timed { .. } => ListenerKind::MediaReady,
            Visual::Frames { .. } => ListenerKind::Resize,
        };
        self.subscriptions.acquire(host, self.index, kind);

        self.state = DriverState::Loading;
        self.try_ready();
    }

    /// Media metadata arrived. Non-finite or non-positive durations are ignored.
    ///
    /// Returns the update applied on becoming ready, if any.
    pub fn on_media_metadata(&mut self, seconds: f64) -> Option<SceneUpdate> {
        if self.state == DriverState::TornDown {
            tracing::trace!(scene = self.index, "metadata after teardown dropped");
            return None;
        }
        let Visual::Timed { duration, .. } = &mut self.visual else {
            tracing::warn!(scene = self.index, "media metadata for a frame-sequence scene");
            return None;
        };
        if !seconds.is_finite() || seconds <= 0.0 {
            tracing::debug!(scene = self.index, seconds, "unusable media duration");
            return None;
        }
        *duration = Some(seconds);
        self.try_ready()
    }

    /// One frame slot finished loading, successfully or not.
    ///
    /// A failed slot still counts toward readiness; the sequence plays with a gap.
    /// Returns the update applied when the last slot makes the scene ready.
    pub fn on_frame_resolved(
        &mut self,
        slot: usize,
        result: CineResult<FrameImage>,
    ) -> Option<SceneUpdate> {
        if self.state == DriverState::TornDown {
            tracing::trace!(scene = self.index, slot, "frame after teardown dropped");
            return None;
        }
        let Visual::Frames { slots, resolved, .. } = &mut self.visual else {
            tracing::warn!(scene = self.index, slot, "frame for a continuous-media scene");
            return None;
        };
        let Some(entry) = slots.get_mut(slot) else {
            tracing::warn!(scene = self.index, slot, total = slots.len(), "frame slot out of range");
            return None;
        };
        if !matches!(entry, FrameSlot::Pending) {
            tracing::debug!(scene = self.index, slot, "frame slot already resolved");
            return None;
        }

        *entry = match result {
            Ok(image) => FrameSlot::Loaded(image),
            Err(err) => {
                tracing::warn!(scene = self.index, slot, error = %err, "frame failed to load");
                FrameSlot::Failed
            }
        };
        *resolved += 1;
        self.try_ready()
    }

    /// Viewport changed. Frame canvases are resized and redrawn right away once ready.
    pub fn on_resize(&mut self, next: Viewport) {
        if self.state == DriverState::TornDown {
            return;
        }
        let live = self.state.accepts_progress();
        let progress = self.progress.get();
        if let Visual::Frames {
            canvas,
            slots,
            current,
            viewport,
            ..
        } = &mut self.visual
        {
            *viewport = Some(next);
            if live {
                canvas.resize(next.device_size());
                // The backing store is blank now; fall back to the last shown
                // frame when the selected slot has nothing to draw.
                let shown = current.take();
                let index = frame_index(progress, slots.len());
                let drawn = draw_slot(canvas.as_mut(), slots, current, index);
                if let (VisualUpdate::FrameMissing { .. }, Some(prev)) = (drawn, shown) {
                    draw_slot(canvas.as_mut(), slots, current, prev);
                }
            }
        }
    }

    /// Apply a new progress value.
    ///
    /// Returns `None` when nothing was presented (not yet ready, or torn down).
    pub fn on_progress(&mut self, progress: Progress) -> Option<SceneUpdate> {
        match self.state {
            DriverState::TornDown | DriverState::Unattached => {
                tracing::trace!(scene = self.index, state = ?self.state, "progress dropped");
                return None;
            }
            DriverState::Loading => {
                self.progress.set(progress);
                tracing::trace!(scene = self.index, p = progress.get(), "progress recorded while loading");
                return None;
            }
            DriverState::Ready | DriverState::Scrubbing => {}
        }

        self.progress.set(progress);
        self.state = DriverState::Scrubbing;
        Some(self.present())
    }

    /// Release every host listener. Repeated calls do nothing.
    #[tracing::instrument(level = "debug", skip(self, host), fields(scene = self.index))]
    pub fn teardown(&mut self, host: &mut dyn HostBindings) {
        if self.state == DriverState::TornDown {
            return;
        }
        self.subscriptions.release_all(host);
        self.state = DriverState::TornDown;
    }

    fn try_ready(&mut self) -> Option<SceneUpdate> {
        if self.state != DriverState::Loading || !self.visual.is_ready() {
            return None;
        }
        self.state = DriverState::Ready;
        tracing::debug!(scene = self.index, writes = self.progress.writes(), "scene ready");

        match &mut self.visual {
            Visual::Frames {
                canvas,
                viewport: Some(vp),
                ..
            } => canvas.resize(vp.device_size()),
            // Media with no recorded scroll position stays where the host put it.
            Visual::Timed { .. } if self.progress.writes() == 0 => return None,
            _ => {}
        }
        Some(self.present())
    }

    /// Visual selection, cross-fade and overlays for the recorded progress.
    fn present(&mut self) -> SceneUpdate {
        let progress = self.progress.get();
        let visual = self.present_visual();
        self.layer.opacity = crossfade_opacity(self.index, progress, self.fade_window);
        SceneUpdate {
            scene: self.index,
            progress,
            visual,
            layer: self.layer,
            overlays: self.overlay_states(),
        }
    }

    fn present_visual(&mut self) -> VisualUpdate {
        let progress = self.progress.get();
        match &mut self.visual {
            Visual::Timed { media, duration } => match duration {
                Some(d) if d.is_finite() => {
                    let seconds = progress.get() * *d;
                    media.set_current_time(seconds);
                    VisualUpdate::MediaTime { seconds }
                }
                _ => {
                    tracing::trace!(scene = self.index, "no usable duration, scrub skipped");
                    VisualUpdate::Skipped
                }
            },
            Visual::Frames {
                canvas,
                slots,
                current,
                ..
            } => {
                let index = frame_index(progress, slots.len());
                draw_slot(canvas.as_mut(), slots, current, index)
            }
        }
    }
}

/// Put slot `index` on the canvas unless it is already there.
fn draw_slot(
    canvas: &mut dyn FrameCanvas,
    slots: &[FrameSlot],
    current: &mut Option<usize>,
    index: usize,
) -> VisualUpdate {
    match slots.get(index) {
        Some(FrameSlot::Loaded(image)) => {
            if *current != Some(index) {
                canvas.clear();
                canvas.draw_frame(image);
                *current = Some(index);
            }
            VisualUpdate::Frame { index }
        }
        _ => {
            tracing::trace!(index, "frame unavailable, keeping previous content");
            VisualUpdate::FrameMissing { index }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/driver.rs"]
mod tests;
