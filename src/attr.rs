//! Conversion of attribute values into their stored string form.
//!
//! Attributes are stored as strings regardless of the type they were set
//! with. Integers keep their canonical decimal form, floating point values
//! are rendered with eight fractional digits and then stripped of trailing
//! zeros, so `1.5` stores as `"1.5"` and `3.0` as `"3"`.

/// A value that can be stored as a node attribute.
///
/// Implemented for string and numeric types. [`Node::set_attribute`] is
/// generic over this trait, so call sites can pass whichever form the
/// surrounding code produces.
///
/// [`Node::set_attribute`]: crate::Node::set_attribute
pub trait IntoAttribute {
    /// Converts the value into the string that is stored in the node.
    fn into_attribute(self) -> String;
}

impl IntoAttribute for String {
    fn into_attribute(self) -> String {
        self
    }
}

impl IntoAttribute for &str {
    fn into_attribute(self) -> String {
        self.to_owned()
    }
}

impl IntoAttribute for &String {
    fn into_attribute(self) -> String {
        self.clone()
    }
}

impl IntoAttribute for i32 {
    fn into_attribute(self) -> String {
        self.to_string()
    }
}

impl IntoAttribute for i64 {
    fn into_attribute(self) -> String {
        self.to_string()
    }
}

impl IntoAttribute for u32 {
    fn into_attribute(self) -> String {
        self.to_string()
    }
}

impl IntoAttribute for u64 {
    fn into_attribute(self) -> String {
        self.to_string()
    }
}

impl IntoAttribute for usize {
    fn into_attribute(self) -> String {
        self.to_string()
    }
}

impl IntoAttribute for f64 {
    fn into_attribute(self) -> String {
        format_fixed(self)
    }
}

impl IntoAttribute for f32 {
    fn into_attribute(self) -> String {
        format_fixed(self as f64)
    }
}

/// Renders a float with eight fractional digits, then strips trailing
/// zeros and a trailing decimal point.
fn format_fixed(value: f64) -> String {
    let mut text = format!("{value:.8}");

    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }

    text
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, "0")]
    #[case(3.0, "3")]
    #[case(0.5, "0.5")]
    #[case(1.25, "1.25")]
    #[case(10.0, "10")]
    #[case(-2.5, "-2.5")]
    #[case(0.00000001, "0.00000001")]
    #[case(1.123456789, "1.12345679")]
    fn float_formatting(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(value.into_attribute(), expected);
    }

    #[test]
    fn integer_formatting() {
        assert_eq!(42i32.into_attribute(), "42");
        assert_eq!((-7i64).into_attribute(), "-7");
        assert_eq!(0usize.into_attribute(), "0");
    }

    #[test]
    fn string_formatting() {
        assert_eq!("high".into_attribute(), "high");
        assert_eq!(String::from("low").into_attribute(), "low");
    }
}
