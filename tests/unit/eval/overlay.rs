use super::*;

fn overlay(start: f64, end: f64) -> TimedOverlay {
    TimedOverlay {
        content: "Arquitetura que Acolhe.".to_string(),
        start,
        end,
    }
}

fn at(p: f64, o: &TimedOverlay) -> OverlayState {
    evaluate_overlay(Progress::new(p), o)
}

#[test]
fn hidden_outside_window() {
    let o = overlay(0.40, 0.55);
    for p in [0.0, 0.2, 0.39, 0.40, 0.55, 0.56, 1.0] {
        assert_eq!(at(p, &o).opacity, 0.0, "p={p}");
    }
    assert_eq!(at(0.1, &o).translate_y, 50.0);
    assert_eq!(at(0.9, &o).translate_y, -50.0);
}

#[test]
fn fully_visible_on_plateau() {
    let o = overlay(0.40, 0.55);
    for p in [0.46, 0.475, 0.49] {
        let s = at(p, &o);
        assert_eq!(s.opacity, 1.0, "p={p}");
        assert_eq!(s.translate_y, 0.0, "p={p}");
    }
}

#[test]
fn ramps_are_linear() {
    let o = overlay(0.0, 1.0);
    let s = at(0.025, &o);
    assert!((s.opacity - 0.5).abs() < 1e-9);
    assert!((s.translate_y - 25.0).abs() < 1e-9);

    let s = at(0.975, &o);
    assert!((s.opacity - 0.5).abs() < 1e-9);
    assert!((s.translate_y + 25.0).abs() < 1e-9);
}

#[test]
fn narrow_window_peaks_at_midpoint() {
    let o = overlay(0.40, 0.46);
    let mid = (o.start + o.end) / 2.0;
    let peak = at(mid, &o);
    assert_eq!(peak.opacity, 1.0);
    assert_eq!(peak.translate_y, 0.0);

    let before = at(mid - 0.015, &o);
    let after = at(mid + 0.015, &o);
    assert!((before.opacity - 0.5).abs() < 1e-9);
    assert!((after.opacity - 0.5).abs() < 1e-9);
    assert!(before.translate_y > 0.0);
    assert!(after.translate_y < 0.0);
}

#[test]
fn control_points_clamp_to_midpoint() {
    let curve = OverlayCurve::default();
    let [s, rise, fall, e] = curve.control_points(0.2, 0.26).unwrap();
    assert_eq!(s, 0.2);
    assert_eq!(e, 0.26);
    assert_eq!(rise, fall);
    assert!(rise > s && rise < e);

    let [_, rise, fall, _] = curve.control_points(0.15, 0.30).unwrap();
    assert!(rise < fall);
}

#[test]
fn inverted_window_is_hidden_not_a_panic() {
    let curve = OverlayCurve::default();
    assert!(curve.control_points(0.5, 0.5).is_none());
    assert!(curve.control_points(0.6, 0.2).is_none());
    assert!(curve.control_points(f64::NAN, 0.2).is_none());

    let s = at(0.5, &overlay(0.6, 0.2));
    assert_eq!(s.opacity, 0.0);
    assert!(!s.is_visible());
}

#[test]
fn custom_curve_from_config() {
    let mut cfg = EngineConfig::default();
    cfg.overlay_ramp = 0.1;
    cfg.overlay_travel = 30.0;
    let curve = OverlayCurve::from_config(&cfg);
    let o = overlay(0.2, 0.8);
    let s = curve.evaluate(Progress::new(0.25), &o);
    assert!((s.opacity - 0.5).abs() < 1e-9);
    assert!((s.translate_y - 15.0).abs() < 1e-9);
    assert_eq!(s.offset(), Vec2::new(0.0, s.translate_y));
}

#[test]
fn overlapping_captions_are_independent() {
    let overlays = vec![overlay(0.1, 0.4), overlay(0.3, 0.6)];
    let states = OverlayCurve::default().evaluate_all(Progress::new(0.35), &overlays);
    assert_eq!(states.len(), 2);
    assert!(states[0].is_visible());
    assert!(states[1].is_visible());
}
