use std::{cell::RefCell, rc::Rc};

use super::*;
use crate::{
    composition::dsl::SceneBuilder,
    foundation::core::DeviceSize,
    playback::surface::ListenerLedger,
};

#[derive(Debug, Default)]
struct MediaLog {
    seeks: Vec<f64>,
    plays: usize,
    pauses: usize,
}

struct FakeMedia(Rc<RefCell<MediaLog>>);

impl MediaElement for FakeMedia {
    fn set_current_time(&mut self, seconds: f64) {
        self.0.borrow_mut().seeks.push(seconds);
    }

    fn play(&mut self) -> CineResult<()> {
        self.0.borrow_mut().plays += 1;
        Ok(())
    }

    fn pause(&mut self) {
        self.0.borrow_mut().pauses += 1;
    }
}

#[derive(Debug, Default)]
struct CanvasLog {
    size: Option<DeviceSize>,
    resizes: Vec<DeviceSize>,
    clears: usize,
    drawn: Vec<u8>,
}

struct FakeCanvas(Rc<RefCell<CanvasLog>>);

impl FrameCanvas for FakeCanvas {
    fn resize(&mut self, size: DeviceSize) {
        let mut log = self.0.borrow_mut();
        log.size = Some(size);
        log.resizes.push(size);
    }

    fn size(&self) -> DeviceSize {
        self.0
            .borrow()
            .size
            .unwrap_or(DeviceSize { width: 300, height: 150 })
    }

    fn clear(&mut self) {
        self.0.borrow_mut().clears += 1;
    }

    fn draw_frame(&mut self, frame: &FrameImage) {
        // Frames in these tests are 1x1; the red channel tags the slot.
        self.0.borrow_mut().drawn.push(frame.rgba8[0]);
    }
}

fn video_driver(index: usize) -> (SceneDriver, Rc<RefCell<MediaLog>>) {
    let scene = SceneBuilder::video("/videos/scene1.mp4")
        .overlay("Arquitetura que Acolhe.", 0.40, 0.55)
        .unwrap()
        .build()
        .unwrap();
    let log = Rc::new(RefCell::new(MediaLog::default()));
    let driver = SceneDriver::new(
        index,
        &scene,
        &scene.visual,
        SceneSurface::Media(Box::new(FakeMedia(log.clone()))),
        &EngineConfig::default(),
    )
    .unwrap();
    (driver, log)
}

fn frames_driver(count: usize) -> (SceneDriver, Rc<RefCell<CanvasLog>>) {
    let scene = SceneBuilder::frames("/frames/entrada", count).build().unwrap();
    let log = Rc::new(RefCell::new(CanvasLog::default()));
    let driver = SceneDriver::new(
        0,
        &scene,
        &scene.visual,
        SceneSurface::Canvas(Box::new(FakeCanvas(log.clone()))),
        &EngineConfig::default(),
    )
    .unwrap();
    (driver, log)
}

fn tagged(slot: usize) -> CineResult<FrameImage> {
    Ok(FrameImage::solid(1, 1, [slot as u8, 0, 0, 255]))
}

#[test]
fn frame_index_maps_progress() {
    assert_eq!(frame_index(Progress::START, 73), 0);
    assert_eq!(frame_index(Progress::new(0.5), 73), 36);
    assert_eq!(frame_index(Progress::new(0.99), 73), 72);
    assert_eq!(frame_index(Progress::END, 73), 72);
    assert_eq!(frame_index(Progress::END, 1), 0);
    assert_eq!(frame_index(Progress::new(0.5), 0), 0);
}

#[test]
fn crossfade_ramps_over_fade_window() {
    assert_eq!(crossfade_opacity(0, Progress::START, 0.2), 1.0);
    assert_eq!(crossfade_opacity(2, Progress::START, 0.2), 0.0);
    assert!((crossfade_opacity(2, Progress::new(0.1), 0.2) - 0.5).abs() < 1e-12);
    assert_eq!(crossfade_opacity(2, Progress::new(0.2), 0.2), 1.0);
    assert_eq!(crossfade_opacity(2, Progress::new(0.9), 0.2), 1.0);
}

#[test]
fn initial_layer_stacks_by_index() {
    assert_eq!(initial_layer(0, 10), CompositedLayer { opacity: 1.0, z_index: 10 });
    assert_eq!(initial_layer(3, 10), CompositedLayer { opacity: 0.0, z_index: 13 });
}

#[test]
fn mismatched_surface_is_rejected() {
    let scene = SceneBuilder::video("/videos/a.mp4").build().unwrap();
    let log = Rc::new(RefCell::new(CanvasLog::default()));
    let err = SceneDriver::new(
        0,
        &scene,
        &scene.visual,
        SceneSurface::Canvas(Box::new(FakeCanvas(log))),
        &EngineConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CineError::Playback(_)));
}

#[test]
fn video_scrubs_after_metadata() {
    let (mut driver, log) = video_driver(1);
    let mut host = ListenerLedger::new();
    driver.attach(&mut host);
    assert_eq!(driver.state(), DriverState::Loading);
    assert_eq!(driver.listener_count(), 2);
    assert_eq!(driver.layer(), CompositedLayer { opacity: 0.0, z_index: 11 });

    assert!(driver.on_progress(Progress::new(0.25)).is_none());
    assert!(log.borrow().seeks.is_empty());
    assert_eq!(driver.progress().get(), 0.25);

    driver.on_media_metadata(8.0);
    assert_eq!(driver.state(), DriverState::Ready);

    let update = driver.on_progress(Progress::new(0.5)).unwrap();
    assert_eq!(driver.state(), DriverState::Scrubbing);
    assert_eq!(update.visual, VisualUpdate::MediaTime { seconds: 4.0 });
    assert_eq!(update.layer.opacity, 1.0);
    assert_eq!(update.overlays.len(), 1);
    assert_eq!(update.overlays[0].opacity, 1.0);
    assert_eq!(log.borrow().seeks, vec![2.0, 4.0]);
    assert_eq!(log.borrow().plays, 0);
    assert_eq!(log.borrow().pauses, 0);
}

#[test]
fn readiness_applies_progress_recorded_while_loading() {
    let (mut driver, log) = video_driver(1);
    let mut host = ListenerLedger::new();
    driver.attach(&mut host);
    assert!(driver.on_progress(Progress::new(0.5)).is_none());
    assert_eq!(driver.layer().opacity, 0.0);

    let update = driver.on_media_metadata(8.0).unwrap();
    assert_eq!(driver.state(), DriverState::Ready);
    assert_eq!(update.visual, VisualUpdate::MediaTime { seconds: 4.0 });
    assert_eq!(update.layer, CompositedLayer { opacity: 1.0, z_index: 11 });
    assert_eq!(driver.layer().opacity, 1.0);
    assert_eq!(update.overlays[0].opacity, 1.0);
    assert_eq!(log.borrow().seeks, vec![4.0]);
}

#[test]
fn readiness_without_scroll_position_leaves_media_alone() {
    let (mut driver, log) = video_driver(1);
    let mut host = ListenerLedger::new();
    driver.attach(&mut host);
    assert!(driver.on_media_metadata(8.0).is_none());
    assert_eq!(driver.layer().opacity, 0.0);
    assert!(log.borrow().seeks.is_empty());
}

#[test]
fn frames_ready_mid_scroll_fade_in_at_recorded_progress() {
    let scene = SceneBuilder::frames("/frames/entrada", 4).build().unwrap();
    let log = Rc::new(RefCell::new(CanvasLog::default()));
    let mut driver = SceneDriver::new(
        2,
        &scene,
        &scene.visual,
        SceneSurface::Canvas(Box::new(FakeCanvas(log.clone()))),
        &EngineConfig::default(),
    )
    .unwrap();
    let mut host = ListenerLedger::new();
    driver.attach(&mut host);
    driver.on_progress(Progress::new(0.6));

    let mut ready = None;
    for slot in 0..4 {
        ready = driver.on_frame_resolved(slot, tagged(slot));
    }
    let update = ready.unwrap();
    assert_eq!(update.visual, VisualUpdate::Frame { index: 2 });
    assert_eq!(update.layer.opacity, 1.0);
    assert_eq!(driver.layer().opacity, 1.0);
    assert_eq!(log.borrow().drawn, vec![2]);
}

#[test]
fn video_ignores_unusable_durations() {
    let (mut driver, _log) = video_driver(0);
    let mut host = ListenerLedger::new();
    driver.attach(&mut host);
    driver.on_media_metadata(f64::INFINITY);
    driver.on_media_metadata(f64::NAN);
    driver.on_media_metadata(0.0);
    assert_eq!(driver.state(), DriverState::Loading);
    assert_eq!(driver.duration(), None);
}

#[test]
fn metadata_before_attach_is_kept() {
    let (mut driver, _log) = video_driver(0);
    driver.on_media_metadata(5.0);
    assert_eq!(driver.state(), DriverState::Unattached);
    let mut host = ListenerLedger::new();
    driver.attach(&mut host);
    assert_eq!(driver.state(), DriverState::Ready);
}

#[test]
fn frames_become_ready_when_every_slot_resolves() {
    let (mut driver, log) = frames_driver(73);
    let mut host = ListenerLedger::new();
    driver.attach(&mut host);
    driver.on_resize(Viewport::new(400.0, 300.0).unwrap().with_device_pixel_ratio(2.0).unwrap());

    for slot in 0..73 {
        let result = if slot == 10 {
            Err(CineError::asset("404"))
        } else {
            tagged(slot)
        };
        driver.on_frame_resolved(slot, result);
    }
    assert_eq!(driver.frames_resolved(), Some((73, 73)));
    assert_eq!(driver.state(), DriverState::Ready);

    // Ready resizes to the latest viewport and draws the frame for progress 0.
    let log_ref = log.borrow();
    assert_eq!(log_ref.resizes, vec![DeviceSize { width: 800, height: 600 }]);
    assert_eq!(log_ref.drawn, vec![0]);
    drop(log_ref);

    let update = driver.on_progress(Progress::new(0.5)).unwrap();
    assert_eq!(update.visual, VisualUpdate::Frame { index: 36 });
    assert_eq!(driver.current_frame(), Some(36));

    let update = driver.on_progress(Progress::new(10.5 / 73.0)).unwrap();
    assert_eq!(update.visual, VisualUpdate::FrameMissing { index: 10 });
    assert_eq!(driver.current_frame(), Some(36));

    let update = driver.on_progress(Progress::END).unwrap();
    assert_eq!(update.visual, VisualUpdate::Frame { index: 72 });
    assert_eq!(log.borrow().drawn, vec![0, 36, 72]);
}

#[test]
fn repeated_frame_is_not_redrawn() {
    let (mut driver, log) = frames_driver(4);
    let mut host = ListenerLedger::new();
    driver.attach(&mut host);
    for slot in 0..4 {
        driver.on_frame_resolved(slot, tagged(slot));
    }
    driver.on_progress(Progress::new(0.3));
    driver.on_progress(Progress::new(0.4));
    assert_eq!(log.borrow().drawn, vec![0, 1]);
}

#[test]
fn resize_while_loading_uses_latest_dimensions() {
    let (mut driver, log) = frames_driver(2);
    let mut host = ListenerLedger::new();
    driver.attach(&mut host);
    driver.on_resize(Viewport::new(100.0, 100.0).unwrap());
    driver.on_resize(Viewport::new(640.0, 360.0).unwrap());
    assert!(log.borrow().resizes.is_empty());

    driver.on_progress(Progress::END);
    driver.on_frame_resolved(0, tagged(0));
    driver.on_frame_resolved(1, tagged(1));

    let log = log.borrow();
    assert_eq!(log.resizes, vec![DeviceSize { width: 640, height: 360 }]);
    assert_eq!(log.drawn, vec![1]);
}

#[test]
fn resize_when_live_redraws_immediately() {
    let (mut driver, log) = frames_driver(2);
    let mut host = ListenerLedger::new();
    driver.attach(&mut host);
    driver.on_frame_resolved(0, tagged(0));
    driver.on_frame_resolved(1, tagged(1));
    driver.on_progress(Progress::new(0.75));
    assert_eq!(log.borrow().drawn, vec![0, 1]);

    driver.on_resize(Viewport::new(320.0, 200.0).unwrap());
    let log = log.borrow();
    assert_eq!(log.resizes, vec![DeviceSize { width: 320, height: 200 }]);
    assert_eq!(log.drawn, vec![0, 1, 1]);
}

#[test]
fn resize_onto_failed_slot_restores_previous_frame() {
    let (mut driver, log) = frames_driver(4);
    let mut host = ListenerLedger::new();
    driver.attach(&mut host);
    for slot in 0..4 {
        let result = if slot == 2 {
            Err(CineError::asset("404"))
        } else {
            tagged(slot)
        };
        driver.on_frame_resolved(slot, result);
    }
    driver.on_progress(Progress::new(0.3));
    let update = driver.on_progress(Progress::new(0.6)).unwrap();
    assert_eq!(update.visual, VisualUpdate::FrameMissing { index: 2 });
    assert_eq!(log.borrow().drawn, vec![0, 1]);

    driver.on_resize(Viewport::new(320.0, 200.0).unwrap());
    assert_eq!(log.borrow().drawn, vec![0, 1, 1]);
    assert_eq!(driver.current_frame(), Some(1));
}

#[test]
fn duplicate_and_out_of_range_slots_are_ignored() {
    let (mut driver, _log) = frames_driver(2);
    let mut host = ListenerLedger::new();
    driver.attach(&mut host);
    driver.on_frame_resolved(0, tagged(0));
    driver.on_frame_resolved(0, tagged(0));
    driver.on_frame_resolved(5, tagged(5));
    assert_eq!(driver.frames_resolved(), Some((1, 2)));
    assert_eq!(driver.state(), DriverState::Loading);
}

#[test]
fn teardown_releases_listeners_once_and_drops_late_events() {
    let (mut driver, log) = video_driver(0);
    let mut host = ListenerLedger::new();
    driver.attach(&mut host);
    driver.on_media_metadata(4.0);
    assert_eq!(host.active().len(), 2);

    driver.teardown(&mut host);
    driver.teardown(&mut host);
    assert_eq!(driver.state(), DriverState::TornDown);
    assert!(host.active().is_empty());
    assert_eq!(host.released().len(), 2);

    assert!(driver.on_progress(Progress::END).is_none());
    driver.on_media_metadata(9.0);
    assert_eq!(driver.duration(), Some(4.0));
    assert!(log.borrow().seeks.is_empty());

    driver.attach(&mut host);
    assert!(host.active().is_empty());
}

#[test]
fn unattached_driver_ignores_progress() {
    let (mut driver, _log) = video_driver(0);
    assert!(driver.on_progress(Progress::new(0.4)).is_none());
    assert_eq!(driver.progress(), Progress::START);
}
