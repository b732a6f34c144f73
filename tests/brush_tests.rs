use chart_join::core::{Key, LinearScale};
use chart_join::interaction::{BrushGesture, BrushPhase, BrushRect, hit_test};

struct Point {
    name: &'static str,
    urban: f64,
    internet: f64,
}

fn points() -> Vec<Point> {
    vec![
        Point { name: "Norway", urban: 79.0, internet: 95.0 },
        Point { name: "Mexico", urban: 78.0, internet: 31.0 },
        Point { name: "Niger", urban: 17.0, internet: 0.8 },
        Point { name: "Broken", urban: f64::NAN, internet: 50.0 },
    ]
}

fn scales() -> (LinearScale, LinearScale) {
    let x = LinearScale::new((0.0, 100.0), (0.0, 500.0)).expect("x scale");
    let y = LinearScale::new((0.0, 100.0), (400.0, 0.0)).expect("y scale");
    (x, y)
}

fn accessor(point: &Point) -> (Key, f64, f64) {
    (Key::from(point.name), point.urban, point.internet)
}

#[test]
fn full_plot_brush_selects_every_finite_point() {
    let (x, y) = scales();
    let rect = BrushRect::new(0.0, 0.0, 500.0, 400.0);
    let hits = hit_test(Some(&rect), &points(), x, y, accessor);
    let names: Vec<&str> = hits.iter().map(Key::as_str).collect();
    assert_eq!(names, vec!["Norway", "Mexico", "Niger"]);
}

#[test]
fn zero_area_brush_selects_nothing() {
    let (x, y) = scales();
    let line = BrushRect::new(0.0, 0.0, 500.0, 0.0);
    assert!(hit_test(Some(&line), &points(), x, y, accessor).is_empty());
    assert!(hit_test(None, &points(), x, y, accessor).is_empty());
}

#[test]
fn brush_edges_are_inclusive() {
    let x = LinearScale::new((0.0, 128.0), (0.0, 512.0)).expect("x scale");
    let y = LinearScale::new((0.0, 128.0), (512.0, 0.0)).expect("y scale");
    let data = vec![Point { name: "Edge", urban: 32.0, internet: 64.0 }];
    // Projects to (128, 256).
    let rect = BrushRect::new(128.0, 256.0, 200.0, 300.0);
    let hits = hit_test(Some(&rect), &data, x, y, accessor);
    assert!(hits.contains("Edge"));

    let beside = BrushRect::new(128.5, 256.0, 200.0, 300.0);
    assert!(hit_test(Some(&beside), &data, x, y, accessor).is_empty());
}

#[test]
fn high_internet_region_selects_only_matching_points() {
    let (x, y) = scales();
    // Internet above 50% means pixel y below 200.
    let rect = BrushRect::new(0.0, 0.0, 500.0, 200.0);
    let hits = hit_test(Some(&rect), &points(), x, y, accessor);
    assert_eq!(hits.len(), 1);
    assert!(hits.contains("Norway"));
}

#[test]
fn gesture_reports_start_brush_and_end() {
    let mut gesture = BrushGesture::new(BrushRect::new(0.0, 0.0, 500.0, 400.0));
    let start = gesture.pointer_down(10.0, 10.0);
    assert_eq!(start.phase, BrushPhase::Start);
    assert!(start.selection.is_some_and(BrushRect::is_degenerate));

    let moved = gesture.pointer_move(600.0, 120.0).expect("dragging");
    assert_eq!(moved.phase, BrushPhase::Brush);
    assert_eq!(moved.selection, Some(BrushRect::new(10.0, 10.0, 500.0, 120.0)));

    let end = gesture.pointer_up(600.0, 120.0).expect("dragging");
    assert_eq!(end.phase, BrushPhase::End);
    assert_eq!(gesture.selection(), Some(BrushRect::new(10.0, 10.0, 500.0, 120.0)));
    assert!(!gesture.is_dragging());
}

#[test]
fn moves_without_a_drag_are_ignored() {
    let mut gesture = BrushGesture::new(BrushRect::new(0.0, 0.0, 100.0, 100.0));
    assert!(gesture.pointer_move(5.0, 5.0).is_none());
    assert!(gesture.pointer_up(5.0, 5.0).is_none());
}

#[test]
fn clear_resets_the_selection() {
    let mut gesture = BrushGesture::new(BrushRect::new(0.0, 0.0, 100.0, 100.0));
    gesture.pointer_down(10.0, 10.0);
    gesture.pointer_up(50.0, 50.0);
    assert!(gesture.selection().is_some());

    let event = gesture.clear();
    assert_eq!(event.selection, None);
    assert_eq!(gesture.selection(), None);
}
