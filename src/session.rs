use crate::{
    assets::frames::FrameImage,
    composition::model::Experience,
    compositor::stack::SceneStack,
    foundation::core::Viewport,
    foundation::error::CineResult,
    playback::driver::SceneUpdate,
    playback::surface::{HostBindings, SurfaceProvider},
    progress::carousel::{CaptionState, CarouselController, CarouselEvent, IntersectionEntry},
    progress::scroll::RevealEvent,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// Scroll-scrubbed scene stack.
    Continuous,
    /// Free-playing slides with discrete activation.
    Carousel,
}

impl PlaybackMode {
    pub fn for_viewport(small_viewport: bool) -> Self {
        if small_viewport {
            Self::Carousel
        } else {
            Self::Continuous
        }
    }
}

/// Everything a session produced for one host event.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct SessionTick {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scenes: Vec<SceneUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveal: Option<RevealEvent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub carousel: Vec<CarouselEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<CaptionState>,
}

impl SessionTick {
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
            && self.reveal.is_none()
            && self.carousel.is_empty()
            && self.caption.is_none()
    }
}

/// One mounted experience, in whichever mode the viewport calls for.
///
/// Events that do not apply to the active mode are ignored. A host whose
/// viewport crosses the small-viewport breakpoint tears the session down and
/// builds a new one.
#[derive(Debug)]
pub enum PlaybackSession {
    Continuous(SceneStack),
    Carousel(CarouselController),
}

impl PlaybackSession {
    #[tracing::instrument(skip(experience, provider), fields(scenes = experience.scenes.len()))]
    pub fn new(
        experience: &Experience,
        viewport: Viewport,
        small_viewport: bool,
        provider: &mut dyn SurfaceProvider,
    ) -> CineResult<Self> {
        experience.validate()?;
        let session = match PlaybackMode::for_viewport(small_viewport) {
            PlaybackMode::Continuous => Self::Continuous(SceneStack::new(
                experience,
                viewport,
                small_viewport,
                provider,
            )?),
            PlaybackMode::Carousel => {
                Self::Carousel(CarouselController::new(experience, provider)?)
            }
        };
        tracing::debug!(mode = ?session.mode(), "session created");
        Ok(session)
    }

    /// Build a session, deciding the mode from the viewport width and the
    /// experience's breakpoint.
    pub fn for_viewport(
        experience: &Experience,
        viewport: Viewport,
        provider: &mut dyn SurfaceProvider,
    ) -> CineResult<Self> {
        let small = experience.config.is_small_viewport(viewport.width());
        Self::new(experience, viewport, small, provider)
    }

    pub fn mode(&self) -> PlaybackMode {
        match self {
            Self::Continuous(_) => PlaybackMode::Continuous,
            Self::Carousel(_) => PlaybackMode::Carousel,
        }
    }

    pub fn as_stack(&self) -> Option<&SceneStack> {
        match self {
            Self::Continuous(stack) => Some(stack),
            Self::Carousel(_) => None,
        }
    }

    pub fn as_carousel(&self) -> Option<&CarouselController> {
        match self {
            Self::Carousel(carousel) => Some(carousel),
            Self::Continuous(_) => None,
        }
    }

    pub fn attach(&mut self, host: &mut dyn HostBindings) {
        match self {
            Self::Continuous(stack) => stack.attach(host),
            Self::Carousel(carousel) => carousel.attach(host),
        }
    }

    pub fn on_scroll(&mut self, scroll_top: f64) -> SessionTick {
        match self {
            Self::Continuous(stack) => {
                let tick = stack.on_scroll(scroll_top);
                SessionTick {
                    scenes: tick.updates,
                    reveal: tick.reveal,
                    ..SessionTick::default()
                }
            }
            Self::Carousel(_) => SessionTick::default(),
        }
    }

    pub fn on_intersection(&mut self, now_ms: u64, entries: &[IntersectionEntry]) -> SessionTick {
        match self {
            Self::Carousel(carousel) => SessionTick {
                carousel: carousel.on_intersection(now_ms, entries),
                caption: carousel.caption_at(now_ms),
                ..SessionTick::default()
            },
            Self::Continuous(_) => SessionTick::default(),
        }
    }

    /// Advance carousel timers and sample the caption.
    pub fn tick(&mut self, now_ms: u64) -> SessionTick {
        match self {
            Self::Carousel(carousel) => SessionTick {
                carousel: carousel.tick(now_ms),
                caption: carousel.caption_at(now_ms),
                ..SessionTick::default()
            },
            Self::Continuous(_) => SessionTick::default(),
        }
    }

    pub fn on_resize(&mut self, viewport: Viewport) {
        if let Self::Continuous(stack) = self {
            stack.on_resize(viewport);
        }
    }

    /// A scene that becomes ready applies its recorded progress; that update is
    /// returned here.
    pub fn on_media_metadata(&mut self, scene: usize, seconds: f64) -> SessionTick {
        match self {
            Self::Continuous(stack) => SessionTick {
                scenes: stack.on_media_metadata(scene, seconds).into_iter().collect(),
                ..SessionTick::default()
            },
            Self::Carousel(_) => SessionTick::default(),
        }
    }

    pub fn on_frame_resolved(
        &mut self,
        scene: usize,
        slot: usize,
        result: CineResult<FrameImage>,
    ) -> SessionTick {
        match self {
            Self::Continuous(stack) => SessionTick {
                scenes: stack.on_frame_resolved(scene, slot, result).into_iter().collect(),
                ..SessionTick::default()
            },
            Self::Carousel(_) => SessionTick::default(),
        }
    }

    pub fn teardown(&mut self, host: &mut dyn HostBindings) {
        match self {
            Self::Continuous(stack) => stack.teardown(host),
            Self::Carousel(carousel) => carousel.teardown(host),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
