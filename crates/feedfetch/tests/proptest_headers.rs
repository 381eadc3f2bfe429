//! Property-based tests for header storage
//!
//! Lookups must ignore case, keep every repeated value in order, and never
//! panic on arbitrary names and values.

use feedfetch::{HeaderValue, Headers};
use proptest::prelude::*;

mod strategies {
    use proptest::prelude::*;

    /// Header field names (RFC 7230 token subset)
    pub fn name() -> impl Strategy<Value = String> {
        prop::string::string_regex("[A-Za-z][A-Za-z0-9-]{0,20}").unwrap()
    }

    /// Values without commas, so scalar splitting leaves them whole
    pub fn plain_value() -> impl Strategy<Value = String> {
        prop::string::string_regex("[A-Za-z0-9/;=. ]{0,30}")
            .unwrap()
            .prop_map(|v| v.trim().to_string())
    }

    /// Flip the case of every other ASCII letter.
    pub fn recase(name: &str) -> String {
        name.chars()
            .enumerate()
            .map(|(i, c)| {
                if i % 2 == 0 {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                }
            })
            .collect()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any spelling of a stored name finds the value.
    #[test]
    fn lookup_ignores_case(name in strategies::name(), value in strategies::plain_value()) {
        let mut headers = Headers::new();
        headers.append(name.as_str(), value.as_str());

        prop_assert_eq!(headers.get(&name.to_ascii_uppercase()), vec![value.clone()]);
        prop_assert_eq!(headers.get(&strategies::recase(&name)), vec![value.clone()]);
        prop_assert!(headers.contains(&name.to_ascii_lowercase()));
        prop_assert_eq!(headers.len(), 1);
    }

    /// Repeated names keep every value, in arrival order, under the first spelling.
    #[test]
    fn repeats_preserved(name in strategies::name(), values in prop::collection::vec(strategies::plain_value(), 2..6)) {
        let mut headers = Headers::new();
        for (i, value) in values.iter().enumerate() {
            let spelling = if i % 2 == 0 { name.clone() } else { strategies::recase(&name) };
            headers.append(spelling, value.as_str());
        }

        let expected = HeaderValue::List(values.clone());
        prop_assert_eq!(headers.raw(&name), Some(&expected));
        prop_assert_eq!(headers.get(&name), values.clone());
        prop_assert_eq!(headers.get_line(&name), values.join(", "));
        let (stored, _) = headers.iter().next().unwrap();
        prop_assert_eq!(stored, name.as_str());
    }

    /// A comma-joined scalar splits into trimmed parts.
    #[test]
    fn scalar_splits_on_commas(parts in prop::collection::vec("[a-z0-9]{1,8}", 1..5)) {
        let mut headers = Headers::new();
        headers.insert("Vary", HeaderValue::Scalar(parts.join(" , ")));
        prop_assert_eq!(headers.get("vary"), parts.clone());
        prop_assert_eq!(headers.get_line("VARY"), parts.join(", "));
    }

    /// Absent names are empty, never an error.
    #[test]
    fn absent_is_empty(name in strategies::name(), other in strategies::name()) {
        prop_assume!(!name.eq_ignore_ascii_case(&other));
        let mut headers = Headers::new();
        headers.append(other.as_str(), "x");
        prop_assert!(headers.get(&name).is_empty());
        prop_assert_eq!(headers.get_line(&name), "");
        prop_assert!(!headers.contains(&name));
    }

    /// Arbitrary bytes never panic header storage or display.
    #[test]
    fn arbitrary_input_never_panics(name in ".{0,30}", value in ".{0,60}") {
        let mut headers = Headers::new();
        headers.append(name.as_str(), value.as_str());
        headers.append(name.as_str(), value.as_str());
        let _ = headers.get(&name);
        let _ = headers.to_string();
    }
}
