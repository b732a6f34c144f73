use crate::join::AttrValue;

/// Value between `from` and `to` at eased progress `t`.
///
/// Numbers move linearly and colors blend per channel. Text, and any pair of
/// differently typed values, switches straight to `to`.
#[must_use]
pub fn interpolate(from: &AttrValue, to: &AttrValue, t: f64) -> AttrValue {
    match (from, to) {
        (AttrValue::Number(a), AttrValue::Number(b)) => AttrValue::Number(a * (1.0 - t) + b * t),
        (AttrValue::Color(a), AttrValue::Color(b)) => AttrValue::Color(a.lerp(*b, t)),
        _ => to.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::interpolate;
    use crate::core::Color;
    use crate::join::AttrValue;

    #[test]
    fn numbers_interpolate_linearly() {
        let value = interpolate(&AttrValue::Number(0.0), &AttrValue::Number(100.0), 0.25);
        assert_eq!(value, AttrValue::Number(25.0));
    }

    #[test]
    fn colors_blend_per_channel() {
        let value = interpolate(
            &AttrValue::Color(Color::rgb(0.0, 0.0, 0.0)),
            &AttrValue::Color(Color::rgb(1.0, 0.5, 0.0)),
            0.5,
        );
        assert_eq!(value, AttrValue::Color(Color::rgb(0.5, 0.25, 0.0)));
    }

    #[test]
    fn text_switches_immediately() {
        let value = interpolate(
            &AttrValue::Text("old".to_owned()),
            &AttrValue::Text("new".to_owned()),
            0.0,
        );
        assert_eq!(value, AttrValue::Text("new".to_owned()));
    }
}
