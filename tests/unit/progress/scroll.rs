use super::*;
use crate::composition::dsl::{ExperienceBuilder, SceneBuilder};

fn three_scenes() -> Experience {
    ExperienceBuilder::new()
        .scene(SceneBuilder::video("/videos/scene1.mp4").build().unwrap())
        .scene(SceneBuilder::video("/videos/scene2.mp4").build().unwrap())
        .scene(
            SceneBuilder::video("/videos/scene3.mp4")
                .spacer_height_ratio(1.0)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

fn vp(h: f64) -> Viewport {
    Viewport::new(1280.0, h).unwrap()
}

#[test]
fn layout_applies_overlap_after_first_scene() {
    let layout = PageLayout::measure(&three_scenes(), vp(1000.0));
    assert_eq!(
        layout.spacers,
        vec![
            SpacerRegion { top: 0.0, height: 2000.0 },
            SpacerRegion { top: 1700.0, height: 2000.0 },
            SpacerRegion { top: 3400.0, height: 1000.0 },
        ]
    );
    assert_eq!(layout.footer, SpacerRegion { top: 4400.0, height: 500.0 });
    assert_eq!(layout.document_height, 4900.0);
    assert_eq!(layout.max_scroll(vp(1000.0)), 3900.0);
}

#[test]
fn layout_scales_with_viewport_height() {
    let small = PageLayout::measure(&three_scenes(), vp(500.0));
    assert_eq!(small.spacers[1].top, 850.0);
    assert_eq!(small.document_height, 2450.0);
}

#[test]
fn progress_runs_from_top_at_bottom_to_bottom_at_bottom() {
    let region = SpacerRegion { top: 1700.0, height: 2000.0 };
    assert_eq!(region.progress_at(1000.0), Progress::START);
    assert_eq!(region.progress_at(1700.0), Progress::START);
    assert_eq!(region.progress_at(2700.0).get(), 0.5);
    assert_eq!(region.progress_at(3700.0), Progress::END);
    assert_eq!(region.progress_at(9000.0), Progress::END);
}

#[test]
fn degenerate_region_is_a_step() {
    let region = SpacerRegion { top: 100.0, height: 0.0 };
    assert_eq!(region.progress_at(99.0), Progress::START);
    assert_eq!(region.progress_at(100.0), Progress::END);
}

#[test]
fn source_samples_with_viewport_bottom() {
    let source = ScrollProgressSource::new(SpacerRegion { top: 1700.0, height: 2000.0 });
    assert_eq!(source.sample(1700.0, vp(1000.0)).get(), 0.5);
}

#[test]
fn resize_changes_geometry_not_cell() {
    let mut cell = ProgressCell::default();
    let mut source = ScrollProgressSource::new(SpacerRegion { top: 0.0, height: 2000.0 });
    cell.set(source.sample(0.0, vp(1000.0)));
    assert_eq!(cell.get().get(), 0.5);

    source.on_resize(SpacerRegion { top: 0.0, height: 1000.0 });
    assert_eq!(cell.get().get(), 0.5);
    assert_eq!(cell.writes(), 1);

    cell.set(source.sample(0.0, vp(800.0)));
    assert_eq!(cell.get().get(), 0.8);
}

#[test]
fn cell_counts_every_write() {
    let mut cell = ProgressCell::default();
    assert_eq!(cell.writes(), 0);
    cell.set(Progress::START);
    cell.set(Progress::new(0.3));
    cell.set(Progress::new(0.3));
    assert_eq!(cell.writes(), 3);
    assert_eq!(cell.get(), Progress::new(0.3));
}

#[test]
fn reveal_trigger_fires_on_edges_only() {
    let mut trigger = RevealTrigger::new(100.0);
    assert_eq!(trigger.update(4400.0, 4000.0), None);
    assert_eq!(trigger.update(4400.0, 4499.0), None);
    assert_eq!(trigger.update(4400.0, 4500.0), Some(RevealEvent::Entered));
    assert!(trigger.is_revealed());
    assert_eq!(trigger.update(4400.0, 4900.0), None);
    assert_eq!(trigger.update(4400.0, 4450.0), Some(RevealEvent::LeftBack));
    assert_eq!(trigger.update(4400.0, 4000.0), None);
    assert!(!trigger.is_revealed());
}
