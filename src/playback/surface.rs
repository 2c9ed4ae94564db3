//! Host-facing seams of the playback engine.
//!
//! The engine never touches a real media element, canvas or event system. A host
//! implements these traits and feeds events back through the driver and stack
//! entry points.

use crate::{
    assets::frames::FrameImage,
    composition::model::{VideoSource, VisualSource},
    foundation::core::DeviceSize,
    foundation::error::CineResult,
};

/// A seekable, playable media element (one per continuous-media scene).
pub trait MediaElement {
    /// Seek to `seconds` from the start of the media.
    fn set_current_time(&mut self, seconds: f64);

    /// Start free-running playback. Hosts may refuse, e.g. under an autoplay policy.
    fn play(&mut self) -> CineResult<()>;

    fn pause(&mut self);
}

/// A drawable 2D surface backing a frame-sequence scene.
pub trait FrameCanvas {
    /// Reallocate the backing store. Hosts are expected to clear it as a side effect.
    fn resize(&mut self, size: DeviceSize);

    fn size(&self) -> DeviceSize;

    fn clear(&mut self);

    /// Draw `frame` stretched over the full backing store.
    fn draw_frame(&mut self, frame: &FrameImage);
}

/// Host event sources a scene can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerKind {
    /// Scroll-position updates for the scene's spacer region.
    ScrollTrigger,
    /// Window resize.
    Resize,
    /// Media metadata becoming available.
    MediaReady,
    /// Visibility changes of a carousel slide.
    Intersection,
}

/// Handle returned by [`HostBindings::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Registration of host event listeners.
pub trait HostBindings {
    fn subscribe(&mut self, scene: usize, kind: ListenerKind) -> ListenerId;

    fn unsubscribe(&mut self, id: ListenerId);
}

/// A live listener registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListenerRecord {
    pub id: ListenerId,
    pub scene: usize,
    pub kind: ListenerKind,
}

/// In-memory [`HostBindings`] that only tracks which listeners are live.
///
/// Useful for headless hosts (the CLI) and for asserting release-once behaviour.
#[derive(Clone, Debug, Default)]
pub struct ListenerLedger {
    next_id: u64,
    active: Vec<ListenerRecord>,
    released: Vec<ListenerId>,
}

impl ListenerLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &[ListenerRecord] {
        &self.active
    }

    /// Every id passed to `unsubscribe`, in call order, including repeats.
    pub fn released(&self) -> &[ListenerId] {
        &self.released
    }

    pub fn active_for(&self, scene: usize) -> impl Iterator<Item = &ListenerRecord> {
        self.active.iter().filter(move |r| r.scene == scene)
    }
}

impl HostBindings for ListenerLedger {
    fn subscribe(&mut self, scene: usize, kind: ListenerKind) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.active.push(ListenerRecord { id, scene, kind });
        id
    }

    fn unsubscribe(&mut self, id: ListenerId) {
        self.released.push(id);
        self.active.retain(|r| r.id != id);
    }
}

/// Listener handles owned by one component, released exactly once.
#[derive(Debug, Default)]
pub(crate) struct Subscriptions {
    ids: Vec<ListenerId>,
}

impl Subscriptions {
    pub(crate) fn acquire(&mut self, host: &mut dyn HostBindings, scene: usize, kind: ListenerKind) {
        self.ids.push(host.subscribe(scene, kind));
    }

    pub(crate) fn release_all(&mut self, host: &mut dyn HostBindings) {
        for id in self.ids.drain(..) {
            host.unsubscribe(id);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }
}

/// The drawable a scene driver owns, matching its [`VisualSource`].
pub enum SceneSurface {
    Media(Box<dyn MediaElement>),
    Canvas(Box<dyn FrameCanvas>),
}

impl SceneSurface {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Media(_) => "media",
            Self::Canvas(_) => "canvas",
        }
    }
}

impl std::fmt::Debug for SceneSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SceneSurface").field(&self.kind_name()).finish()
    }
}

/// Factory for host surfaces, asked once per scene at construction.
pub trait SurfaceProvider {
    /// Surface for the scrubbed (continuous) presentation of `visual`.
    fn surface_for(&mut self, scene: usize, visual: &VisualSource) -> CineResult<SceneSurface>;

    /// Free-running media element for the carousel presentation of `video`.
    fn media_for(&mut self, scene: usize, video: &VideoSource) -> CineResult<Box<dyn MediaElement>>;
}

#[cfg(test)]
#[path = "../../tests/unit/playback/surface.rs"]
mod tests;
