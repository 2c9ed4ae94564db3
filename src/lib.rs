//! Cinescroll is a headless scroll-to-playback engine for cinematic, scroll-driven pages.
//!
//! A page is an ordered stack of full-viewport scenes. Each scene's playback position
//! is bound to how far the reader has scrolled through that scene's spacer region:
//!
//! - Describe the page as an [`Experience`] (JSON or the builder DSL)
//! - Create a [`PlaybackSession`] against host-provided surfaces
//! - Feed it scroll offsets, resizes, asset completions and, on small viewports,
//!   slide intersections; apply the returned [`SceneUpdate`]s
//!
//! The engine never touches a real media element or canvas. Hosts implement
//! [`MediaElement`], [`FrameCanvas`], [`HostBindings`] and [`SurfaceProvider`].
#![forbid(unsafe_code)]

pub mod animation;
pub mod assets;
pub mod composition;
pub mod compositor;
pub mod eval;
pub mod foundation;
pub mod playback;
pub mod progress;
pub mod render;
pub mod session;

pub use crate::foundation::core::{DeviceSize, Progress, Size, Vec2, Viewport, ZIndex};
pub use crate::foundation::error::{CineError, CineResult};

pub use crate::animation::ease::Ease;
pub use crate::assets::frames::{FrameImage, FsFrameLoader};
pub use crate::composition::config::EngineConfig;
pub use crate::composition::dsl::{ExperienceBuilder, SceneBuilder, frame_sequence, video_source};
pub use crate::composition::model::{
    Experience, FrameSequence, Scene, TimedOverlay, VideoSource, VisualSource,
};
pub use crate::compositor::stack::{SceneStack, StackTick};
pub use crate::eval::overlay::{OverlayCurve, OverlayState, evaluate_overlay};
pub use crate::playback::driver::{
    CompositedLayer, DriverState, SceneDriver, SceneUpdate, VisualUpdate, frame_index,
};
pub use crate::playback::surface::{
    FrameCanvas, HostBindings, ListenerId, ListenerKind, ListenerLedger, MediaElement,
    SceneSurface, SurfaceProvider,
};
pub use crate::progress::carousel::{
    CaptionState, CarouselController, CarouselEvent, IntersectionEntry,
};
pub use crate::progress::scroll::{PageLayout, RevealEvent, SpacerRegion};
pub use crate::render::raster::RasterCanvas;
pub use crate::session::{PlaybackMode, PlaybackSession, SessionTick};
