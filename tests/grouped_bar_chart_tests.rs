use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use chart_join::charts::{ChartView, GroupedBarChart, GroupedBarChartConfig, SelectionListener};
use chart_join::core::dataset::derive_code;
use chart_join::core::{CountryIndicators, Key};
use chart_join::interaction::{SelectionChanged, SelectionSnapshot};
use chart_join::join::Attr;

fn country(name: &str, income: Option<f64>, internet_rate: f64) -> CountryIndicators {
    CountryIndicators {
        name: name.to_owned(),
        code: derive_code(name),
        internet_rate,
        urban_rate: 50.0,
        income_per_person: income,
    }
}

fn records() -> Vec<CountryIndicators> {
    vec![
        country("Liechtenstein", Some(81_647.1), 81.0),
        country("Luxembourg", Some(52_301.6), 90.1),
        country("Norway", Some(39_972.3), 95.0),
        country("Burundi", Some(115.3), 1.3),
        country("Bermuda", None, 84.2),
    ]
}

fn config() -> GroupedBarChartConfig {
    GroupedBarChartConfig::default().with_codes(
        ["LIE", "LUX", "NOR", "BER", "BUR"]
            .into_iter()
            .map(Key::from)
            .collect(),
    )
}

fn settle(chart: &mut GroupedBarChart) {
    let mut now = 0.0;
    while chart.is_animating() {
        now += 16.0;
        chart.tick(now);
    }
}

fn codes(chart: &GroupedBarChart) -> Vec<String> {
    chart.selected_codes().iter().map(Key::to_string).collect()
}

#[test]
fn chips_start_inactive_and_skip_countries_without_income() {
    let chart = GroupedBarChart::new(&records(), config()).expect("chart");
    let chips = chart.chips();
    let chip_codes: Vec<&str> = chips.iter().map(|chip| chip.code.as_str()).collect();
    assert_eq!(chip_codes, vec!["LIE", "LUX", "NOR", "BUR"]);
    assert!(chips.iter().all(|chip| !chip.active));
    assert_eq!(chips[0].text, "~81.0% online");
    assert!(chart.bars().is_empty());
}

#[test]
fn toggling_chips_follows_selection_semantics() {
    let mut chart = GroupedBarChart::new(&records(), config()).expect("chart");
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    chart.subscribe(move |event| {
        let keys: Vec<String> = event.selection.keys.iter().map(Key::to_string).collect();
        sink.borrow_mut().push(keys);
    });

    assert!(chart.toggle_chip("LIE").expect("toggle"));
    assert!(chart.toggle_chip("LUX").expect("toggle"));
    assert_eq!(codes(&chart), vec!["LIE", "LUX"]);
    assert!(!chart.toggle_chip("LIE").expect("toggle"));
    assert_eq!(codes(&chart), vec!["LUX"]);

    assert_eq!(
        *seen.borrow(),
        vec![
            vec!["LIE".to_owned()],
            vec!["LIE".to_owned(), "LUX".to_owned()],
            vec!["LUX".to_owned()],
        ]
    );
}

#[test]
fn unknown_chip_is_ignored_without_notification() {
    let mut chart = GroupedBarChart::new(&records(), config()).expect("chart");
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    chart.subscribe(move |_| *sink.borrow_mut() += 1);

    assert!(!chart.toggle_chip("XYZ").expect("toggle"));
    assert!(!chart.toggle_chip("BER").expect("toggle"));
    assert_eq!(*count.borrow(), 0);
}

#[test]
fn each_selected_country_gets_two_nested_bars() {
    let mut chart = GroupedBarChart::new(&records(), config()).expect("chart");
    chart.toggle_chip("LIE").expect("toggle");
    chart.toggle_chip("LUX").expect("toggle");
    settle(&mut chart);

    assert_eq!(chart.groups().len(), 2);
    assert_eq!(chart.bars().len(), 4);
    assert_eq!(chart.names().len(), 2);
    let bar = chart.bars().get("LUX/net").expect("net bar");
    assert_eq!(bar.parent().map(Key::as_str), Some("LUX"));

    let group_x = chart
        .groups()
        .get("LUX")
        .and_then(|group| group.number(Attr::TranslateX))
        .expect("group offset");
    assert_eq!(Some(group_x), chart.group_scale().map("LUX"));

    let height = chart.internet_scale().range().0;
    let top = chart.internet_scale().map(90.1);
    assert_relative_eq!(bar.number(Attr::Y).expect("y"), top, epsilon = 1e-9);
    assert_relative_eq!(bar.number(Attr::Height).expect("height"), height - top, epsilon = 1e-9);
}

#[test]
fn gdp_axis_leaves_headroom_over_the_largest_income() {
    let mut chart = GroupedBarChart::new(&records(), config()).expect("chart");
    chart.toggle_chip("LUX").expect("toggle");
    let (lo, hi) = chart.gdp_scale().domain();
    assert_eq!(lo, 0.0);
    assert!(hi >= 52_301.6 * 1.1);

    chart.toggle_chip("LIE").expect("toggle");
    assert!(chart.gdp_scale().domain().1 >= 81_647.1 * 1.1);
}

#[test]
fn value_labels_format_currency_and_percent() {
    let mut chart = GroupedBarChart::new(&records(), config()).expect("chart");
    chart.toggle_chip("LIE").expect("toggle");
    settle(&mut chart);

    let text = |key: &str| {
        chart
            .value_labels()
            .get(key)
            .and_then(|label| label.attributes().text(Attr::Text).map(str::to_owned))
    };
    assert_eq!(text("LIE/gdp").as_deref(), Some("$81,647"));
    assert_eq!(text("LIE/net").as_deref(), Some("81.0%"));
}

#[test]
fn deselected_country_animates_out() {
    let mut chart = GroupedBarChart::new(&records(), config()).expect("chart");
    chart.toggle_chip("LIE").expect("toggle");
    chart.toggle_chip("NOR").expect("toggle");
    settle(&mut chart);

    chart.toggle_chip("LIE").expect("toggle");
    assert!(chart.bars().get("LIE/gdp").is_some_and(|bar| bar.is_exiting()));
    assert!(chart.groups().get("LIE").is_some());

    settle(&mut chart);
    assert!(chart.bars().get("LIE/gdp").is_none());
    assert!(chart.groups().get("LIE").is_none());
    assert!(chart.names().get("LIE").is_none());
    assert_eq!(chart.bars().len(), 2);
}

#[test]
fn clear_chips_empties_the_chart() {
    let mut chart = GroupedBarChart::new(&records(), config()).expect("chart");
    chart.toggle_chip("LIE").expect("toggle");
    chart.toggle_chip("BUR").expect("toggle");
    chart.clear_chips().expect("clear");
    assert!(chart.selected_codes().is_empty());
    assert!(!chart.selection().filtering);

    settle(&mut chart);
    assert!(chart.bars().is_empty());
}

#[test]
fn brushed_countries_keep_full_opacity() {
    let mut chart = GroupedBarChart::new(&records(), config()).expect("chart");
    chart.toggle_chip("LIE").expect("toggle");
    chart.toggle_chip("LUX").expect("toggle");

    chart.on_selection(&SelectionChanged {
        source: "scatter".to_owned(),
        selection: SelectionSnapshot {
            keys: [Key::from("Luxembourg")].into_iter().collect(),
            filtering: true,
        },
    });
    let opacity = |chart: &GroupedBarChart, key: &str| {
        chart.bars().get(key).and_then(|bar| bar.number(Attr::Opacity))
    };
    assert_eq!(opacity(&chart, "LUX/gdp"), Some(0.9));
    assert_eq!(opacity(&chart, "LIE/gdp"), Some(0.25));

    chart.toggle_chip("NOR").expect("toggle");
    assert_eq!(opacity(&chart, "NOR/net"), Some(0.25));
}

#[test]
fn frame_offsets_bars_by_their_group() {
    let mut chart = GroupedBarChart::new(&records(), config()).expect("chart");
    chart.toggle_chip("LIE").expect("toggle");
    chart.toggle_chip("LUX").expect("toggle");
    settle(&mut chart);

    let frame = chart.render_frame();
    frame.validate().expect("valid frame");
    let origin_x = 70.0;
    let lux_x = chart.group_scale().map("LUX").expect("lux band");
    let inner_x = chart.bars().get("LUX/gdp").and_then(|b| b.number(Attr::X)).expect("x");
    assert!(frame
        .rects
        .iter()
        .any(|rect| (rect.x - (origin_x + lux_x + inner_x)).abs() < 1e-9));
    assert!(frame.texts.iter().any(|text| text.text == "Luxembourg"));
}

#[test]
fn dimmed_opacity_comes_from_config() {
    let mut chart =
        GroupedBarChart::new(&records(), config().with_dimmed_opacity(0.4)).expect("chart");
    chart.toggle_chip("LIE").expect("toggle");
    chart.toggle_chip("NOR").expect("toggle");

    chart.on_selection(&SelectionChanged {
        source: "scatter".to_owned(),
        selection: SelectionSnapshot {
            keys: [Key::from("Norway")].into_iter().collect(),
            filtering: true,
        },
    });
    let opacity = |key: &str| chart.bars().get(key).and_then(|bar| bar.number(Attr::Opacity));
    assert_eq!(opacity("NOR/gdp"), Some(0.9));
    assert_eq!(opacity("LIE/net"), Some(0.4));
}
