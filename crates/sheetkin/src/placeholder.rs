//! Placeholder substitution for Scenario Outline text.
//!
//! `<name>` tokens in titles, steps and background lines are replaced with
//! the value of the same-named column in an Examples row. Names the row does
//! not know are left exactly as written, so a typo stays visible in the
//! output instead of vanishing.

use std::borrow::Cow;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::{Captures, Regex};

/// Regex pattern matching `<placeholder>` tokens.
///
/// The name must not start with whitespace and cannot contain `>`, which
/// keeps comparisons such as `a < b` out of the match.
pub(crate) static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Safe: The regex pattern is a compile-time constant and is valid.
    Regex::new(r"<([^>\s][^>]*)>").unwrap_or_else(|_| unreachable!("placeholder regex is valid"))
});

/// An Examples data row: column name to cell value, in header order.
pub type ExampleRow = IndexMap<String, String>;

/// Replace every known `<name>` in `text` with its value from `row`.
///
/// Returns the input unchanged (borrowed) when nothing matches.
///
/// # Examples
///
/// ```
/// use sheetkin::placeholder::{substitute, ExampleRow};
///
/// let mut row = ExampleRow::new();
/// row.insert("role".to_string(), "admin".to_string());
/// assert_eq!(substitute("Login as <role>", &row), "Login as admin");
/// assert_eq!(substitute("Keep <missing>", &row), "Keep <missing>");
/// ```
#[must_use]
pub fn substitute<'a>(text: &'a str, row: &ExampleRow) -> Cow<'a, str> {
    PLACEHOLDER_RE.replace_all(text, |caps: &Captures<'_>| {
        let name = caps.get(1).map_or("", |m| m.as_str());
        match row.get(name) {
            Some(value) => value.clone(),
            None => caps
                .get(0)
                .map_or_else(String::new, |m| m.as_str().to_string()),
        }
    })
}

/// Substitute every entry of `lines`, producing owned strings.
#[must_use]
pub fn substitute_all<S: AsRef<str>>(lines: &[S], row: &ExampleRow) -> Vec<String> {
    lines
        .iter()
        .map(|line| substitute(line.as_ref(), row).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn row() -> ExampleRow {
        [("count", "5"), ("item", "apples"), ("first name", "Ada"), ("blank", "")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[rstest]
    #[case("I have <count> <item>", "I have 5 apples")]
    #[case("<count><count>", "55")]
    #[case("Hello <first name>", "Hello Ada")]
    #[case("value is '<blank>'", "value is ''")]
    #[case("keep <unknownColumn>", "keep <unknownColumn>")]
    #[case("a < b and c > d", "a < b and c > d")]
    #[case("no tokens", "no tokens")]
    fn substitutes_known_names(row: ExampleRow, #[case] text: &str, #[case] expected: &str) {
        assert_eq!(substitute(text, &row), expected);
    }

    #[rstest]
    fn leaves_untouched_text_borrowed(row: ExampleRow) {
        assert!(matches!(substitute("plain", &row), Cow::Borrowed("plain")));
    }

    #[rstest]
    fn substitute_all_maps_each_line(row: ExampleRow) {
        let lines = ["Given <count>", "Then <item>"];
        assert_eq!(substitute_all(&lines, &row), vec!["Given 5", "Then apples"]);
    }
}
