use approx::assert_relative_eq;
use chart_join::core::{BandScale, Key, LinearScale, SqrtScale, extent};

fn keys(codes: &[&str]) -> Vec<Key> {
    codes.iter().copied().map(Key::from).collect()
}

#[test]
fn linear_scale_maps_and_inverts() {
    let scale = LinearScale::new((0.0, 82.0), (0.0, 600.0)).expect("valid scale");
    assert_relative_eq!(scale.map(41.0), 300.0, epsilon = 1e-9);
    assert_relative_eq!(scale.invert(300.0), 41.0, epsilon = 1e-9);
}

#[test]
fn inverted_range_flips_the_axis() {
    let scale = LinearScale::new((0.0, 100.0), (400.0, 0.0)).expect("valid scale");
    assert_relative_eq!(scale.map(0.0), 400.0);
    assert_relative_eq!(scale.map(75.0), 100.0);
}

#[test]
fn zero_width_domain_maps_to_range_midpoint() {
    let scale = LinearScale::new((5.0, 5.0), (0.0, 200.0)).expect("valid scale");
    assert_relative_eq!(scale.map(5.0), 100.0);
    assert_relative_eq!(scale.map(123.0), 100.0);
}

#[test]
fn non_finite_bounds_are_rejected() {
    assert!(LinearScale::new((0.0, f64::NAN), (0.0, 1.0)).is_err());
    assert!(LinearScale::new((0.0, 1.0), (f64::INFINITY, 1.0)).is_err());
    assert!(SqrtScale::new((0.0, f64::NAN), (0.0, 1.0)).is_err());
}

#[test]
fn nice_rounds_the_domain_outwards() {
    let scale = LinearScale::new((0.0, 82.0), (0.0, 1.0))
        .expect("valid scale")
        .nice(10);
    assert_eq!(scale.domain(), (0.0, 90.0));
}

#[test]
fn nice_leaves_a_zero_width_domain_alone() {
    for bound in [5.0, 0.0, -3.5] {
        let scale = LinearScale::new((bound, bound), (0.0, 100.0))
            .expect("valid scale")
            .nice(10);
        assert_eq!(scale.domain(), (bound, bound));
        assert_relative_eq!(scale.map(bound), 50.0);
    }
}

#[test]
fn nice_keeps_a_reversed_domain_reversed() {
    let scale = LinearScale::new((82.0, 3.0), (0.0, 1.0))
        .expect("valid scale")
        .nice(10);
    assert_eq!(scale.domain(), (90.0, 0.0));
}

#[test]
fn nice_with_zero_count_is_a_no_op() {
    let scale = LinearScale::new((0.3, 82.7), (0.0, 1.0)).expect("valid scale");
    assert_eq!(scale.nice(0), scale);
}

#[test]
fn extent_skips_non_finite_values() {
    assert_eq!(extent([3.0, f64::NAN, -1.0, 7.5]), Some((-1.0, 7.5)));
    assert_eq!(extent([f64::NAN]), None);
    assert_eq!(extent(Vec::<f64>::new()), None);
}

#[test]
fn from_extent_uses_the_fallback_when_empty() {
    let scale = LinearScale::from_extent(Vec::new(), (0.0, 10.0), (0.0, 1.0)).expect("valid scale");
    assert_eq!(scale.domain(), (0.0, 1.0));
}

#[test]
fn band_scale_without_padding_tiles_the_range() {
    let scale = BandScale::new(keys(&["DEU", "USA", "MEX"]), (0.0, 300.0), 0.0).expect("valid bands");
    assert_relative_eq!(scale.bandwidth(), 100.0);
    assert_eq!(scale.map("DEU"), Some(0.0));
    assert_eq!(scale.map("USA"), Some(100.0));
    assert_eq!(scale.center("MEX"), Some(250.0));
    assert_eq!(scale.map("GBR"), None);
}

#[test]
fn padded_bands_stay_inside_the_range_without_overlap() {
    let codes = ["LIE", "LUX", "NOR", "SWI", "USA"];
    let scale = BandScale::new(keys(&codes), (0.0, 500.0), 0.2).expect("valid bands");

    let starts: Vec<f64> = codes
        .iter()
        .map(|code| scale.map(code).expect("known band"))
        .collect();
    assert!(starts[0] >= 0.0);
    assert!(starts[4] + scale.bandwidth() <= 500.0 + 1e-9);
    for pair in starts.windows(2) {
        assert!(pair[0] + scale.bandwidth() < pair[1]);
    }
    assert_relative_eq!(scale.bandwidth(), scale.step() * 0.8, epsilon = 1e-9);
}

#[test]
fn band_padding_outside_unit_interval_is_rejected() {
    assert!(BandScale::new(keys(&["A"]), (0.0, 10.0), 1.5).is_err());
    assert!(BandScale::with_paddings(keys(&["A"]), (0.0, 10.0), 0.1, -1.0).is_err());
}

#[test]
fn sqrt_scale_radius_follows_square_root() {
    let scale = SqrtScale::area_proportional(100.0, 10.0).expect("valid scale");
    assert_relative_eq!(scale.map(0.0), 0.0);
    assert_relative_eq!(scale.map(25.0), 5.0, epsilon = 1e-9);
    assert_relative_eq!(scale.map(100.0), 10.0, epsilon = 1e-9);
}
