use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use chart_join::charts::{ChartView, ScatterChart, ScatterChartConfig};
use chart_join::core::CountryIndicators;
use chart_join::core::dataset::derive_code;
use chart_join::interaction::{BrushOutcome, BrushRect};
use chart_join::join::Attr;

fn country(name: &str, internet_rate: f64, urban_rate: f64) -> CountryIndicators {
    CountryIndicators {
        name: name.to_owned(),
        code: derive_code(name),
        internet_rate,
        urban_rate,
        income_per_person: None,
    }
}

fn many(count: usize) -> Vec<CountryIndicators> {
    (0..count)
        .map(|i| {
            let share = (i % 100) as f64;
            country(&format!("Country {i:03}"), share, 100.0 - share)
        })
        .collect()
}

fn settle(chart: &mut ScatterChart) {
    let mut now = 0.0;
    while chart.is_animating() {
        now += 16.0;
        chart.tick(now);
    }
}

fn full_plot(chart: &ScatterChart) -> BrushRect {
    let plot = chart.plot_area();
    BrushRect::new(0.0, 0.0, plot.width, plot.height)
}

#[test]
fn cap_input_is_clamped_or_falls_back() {
    let mut chart = ScatterChart::new(many(600), ScatterChartConfig::default()).expect("chart");
    assert_eq!(chart.cap(), 150);
    assert_eq!(chart.visible().len(), 150);

    assert_eq!(chart.set_cap_input("9999").expect("cap"), 500);
    assert_eq!(chart.visible().len(), 500);
    assert_eq!(chart.set_cap_input("abc").expect("cap"), 150);
    assert_eq!(chart.set_cap_input("5").expect("cap"), 20);
    assert_eq!(chart.set_cap_input("42.9").expect("cap"), 42);
    assert_eq!(chart.set_cap_input("").expect("cap"), 150);
    assert_eq!(chart.count_label(), "Showing 150 countries");
}

#[test]
fn cap_keeps_file_order() {
    let mut chart = ScatterChart::new(many(40), ScatterChartConfig::default()).expect("chart");
    chart.set_cap(20).expect("cap");
    let names: Vec<&str> = chart.visible().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names.first(), Some(&"Country 000"));
    assert_eq!(names.last(), Some(&"Country 019"));

    settle(&mut chart);
    assert_eq!(chart.dots().len(), 20);
}

#[test]
fn fewer_records_than_cap_shows_them_all() {
    let chart = ScatterChart::new(many(12), ScatterChartConfig::default()).expect("chart");
    assert_eq!(chart.count_label(), "Showing 12 countries");
}

#[test]
fn countries_sharing_a_code_are_distinct_points() {
    let records = vec![country("Niger", 1.0, 17.0), country("Nigeria", 28.0, 49.0)];
    let mut chart = ScatterChart::new(records, ScatterChartConfig::default()).expect("chart");
    settle(&mut chart);
    assert!(chart.dots().get("Niger").is_some());
    assert!(chart.dots().get("Nigeria").is_some());
}

#[test]
fn radius_encodes_internet_use_after_settling() {
    let records = vec![country("Norway", 95.0, 79.4)];
    let mut chart = ScatterChart::new(records, ScatterChartConfig::default()).expect("chart");
    settle(&mut chart);

    let dot = chart.dots().get("Norway").expect("dot");
    assert_relative_eq!(
        dot.number(Attr::R).expect("radius"),
        chart.radius_scale().map(95.0),
        epsilon = 1e-9
    );
    assert_relative_eq!(
        dot.number(Attr::Cx).expect("cx"),
        chart.x_scale().map(79.4),
        epsilon = 1e-9
    );
}

#[test]
fn brushing_the_whole_plot_selects_every_visible_point() {
    let mut chart = ScatterChart::new(many(30), ScatterChartConfig::default()).expect("chart");
    let notifications = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&notifications);
    chart.subscribe(move |event| sink.borrow_mut().push(event.selection.len()));

    let rect = full_plot(&chart);
    let outcome = chart.brush_region(rect);
    match outcome {
        BrushOutcome::Region(keys) => assert_eq!(keys.len(), 30),
        BrushOutcome::Cleared => panic!("expected a region"),
    }
    assert_eq!(*notifications.borrow(), vec![0, 30, 30]);
    assert!(chart.selection().filtering);
    assert!(chart
        .dots()
        .elements()
        .all(|dot| dot.number(Attr::StrokeWidth) == Some(1.6)));
}

#[test]
fn empty_region_dims_every_point() {
    let records = vec![country("Norway", 95.0, 79.4), country("Niger", 1.0, 17.0)];
    let mut chart = ScatterChart::new(records, ScatterChartConfig::default()).expect("chart");

    // Low urbanization with high internet use: nobody lives there.
    let x = chart.x_scale();
    let y = chart.y_scale();
    let rect = BrushRect::new(x.map(0.0), y.map(100.0), x.map(10.0), y.map(90.0));
    let outcome = chart.brush_region(rect);

    assert_eq!(outcome, BrushOutcome::Region(Default::default()));
    assert!(chart
        .dots()
        .elements()
        .all(|dot| dot.number(Attr::Opacity) == Some(0.2)));
}

#[test]
fn click_without_drag_clears_the_selection() {
    let mut chart = ScatterChart::new(many(30), ScatterChartConfig::default()).expect("chart");
    let rect = full_plot(&chart);
    chart.brush_region(rect);

    assert_eq!(chart.brush_start(50.0, 50.0), BrushOutcome::Cleared);
    assert_eq!(chart.brush_end(50.0, 50.0), Some(BrushOutcome::Cleared));
    assert!(!chart.selection().filtering);
    assert!(chart.brush_selection().is_none());
    assert!(chart
        .dots()
        .elements()
        .all(|dot| dot.number(Attr::Opacity) == Some(0.95)));
}

#[test]
fn brush_clear_and_cap_change_reset_the_selection() {
    let mut chart = ScatterChart::new(many(30), ScatterChartConfig::default()).expect("chart");
    let rect = full_plot(&chart);

    chart.brush_region(rect);
    assert_eq!(chart.brush_clear(), BrushOutcome::Cleared);
    assert!(!chart.selection().filtering);

    chart.brush_region(rect);
    chart.set_cap(20).expect("cap");
    assert!(!chart.selection().filtering);
    assert!(chart.brush_selection().is_none());
}

#[test]
fn hover_shows_a_tooltip_and_thickens_the_stroke() {
    let records = vec![country("Norway", 95.0, 79.4)];
    let mut chart = ScatterChart::new(records, ScatterChartConfig::default()).expect("chart");

    let tooltip = chart.pointer_enter("Norway").expect("tooltip");
    assert_eq!(tooltip.title, "Norway");
    assert_eq!(tooltip.lines, vec!["Urban rate: 79.4%", "Internet: 95.0%"]);
    let stroke = |chart: &ScatterChart| {
        chart
            .dots()
            .get("Norway")
            .and_then(|dot| dot.number(Attr::StrokeWidth))
    };
    assert_eq!(stroke(&chart), Some(1.2));

    chart.pointer_leave();
    assert_eq!(stroke(&chart), Some(0.6));
    assert!(chart.pointer_enter("Atlantis").is_none());
}

#[test]
fn frame_includes_brush_and_count_label() {
    let mut chart = ScatterChart::new(many(25), ScatterChartConfig::default()).expect("chart");
    settle(&mut chart);
    chart.brush_start(10.0, 10.0);
    chart.brush_move(200.0, 200.0);

    let frame = chart.render_frame();
    frame.validate().expect("valid frame");
    assert_eq!(frame.circles.len(), 25);
    assert_eq!(frame.rects.len(), 1);
    assert!(frame.texts.iter().any(|text| text.text == "Showing 25 countries"));
}
