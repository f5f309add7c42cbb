//! Tag roles and their resolution into sheet columns.
//!
//! Every `@tag` plays exactly one role. Priority tags (`@p0`..`@p3` and the
//! aliases `@critical`, `@blocker`, `@high`, `@medium`, `@low`) fill the
//! Priority column, `@positive`/`@negative` fill the Type column, and
//! everything else becomes a free-form label.

use std::fmt;

/// Canonical priority level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// Highest priority; also `@critical` and `@blocker`.
    P0,
    /// Also `@high`.
    P1,
    /// Also `@medium`.
    P2,
    /// Also `@low`.
    P3,
}

impl Priority {
    /// Canonical column text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::P0 => "P0",
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Positive or negative test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioType {
    /// `@positive`
    Positive,
    /// `@negative`
    Negative,
}

impl ScenarioType {
    /// Column text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
        }
    }
}

impl fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The role a single tag plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagRole {
    /// A priority tag.
    Priority(Priority),
    /// A type tag.
    Type(ScenarioType),
    /// Any other tag, without its leading `@`.
    Label(String),
}

/// Classify one tag. Priority wins over type, type over label.
///
/// # Examples
///
/// ```
/// use sheetkin::tags::{classify_tag, Priority, ScenarioType, TagRole};
///
/// assert_eq!(classify_tag("@Critical"), TagRole::Priority(Priority::P0));
/// assert_eq!(classify_tag("@NEGATIVE"), TagRole::Type(ScenarioType::Negative));
/// assert_eq!(classify_tag("@Smoke"), TagRole::Label("Smoke".into()));
/// ```
#[must_use]
pub fn classify_tag(tag: &str) -> TagRole {
    let name = tag.strip_prefix('@').unwrap_or(tag);
    let lower = name.to_ascii_lowercase();
    let priority = match lower.as_str() {
        "p0" | "critical" | "blocker" => Some(Priority::P0),
        "p1" | "high" => Some(Priority::P1),
        "p2" | "medium" => Some(Priority::P2),
        "p3" | "low" => Some(Priority::P3),
        _ => None,
    };
    if let Some(priority) = priority {
        return TagRole::Priority(priority);
    }
    match lower.as_str() {
        "positive" => TagRole::Type(ScenarioType::Positive),
        "negative" => TagRole::Type(ScenarioType::Negative),
        _ => TagRole::Label(name.to_string()),
    }
}

/// Tags with exact duplicates removed, first occurrence kept.
#[must_use]
pub fn dedupe<'a, I>(tags: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: Vec<&str> = Vec::new();
    for tag in tags {
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

/// Resolved sheet columns for one tag list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSummary {
    /// First priority tag in scan order, if any.
    pub priority: Option<Priority>,
    /// First type tag in scan order, if any.
    pub scenario_type: Option<ScenarioType>,
    /// Label tags without `@`, de-duplicated, first occurrence kept.
    pub labels: Vec<String>,
}

impl TagSummary {
    /// Resolve `tags`, given in scan order (Feature, Rule, Scenario,
    /// Examples).
    ///
    /// When several priority or type tags are present the first one wins,
    /// so `@p1 @critical` resolves to `P1`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetkin::tags::{Priority, TagSummary};
    ///
    /// let summary = TagSummary::resolve(["@p1", "@critical", "@ui", "@ui"]);
    /// assert_eq!(summary.priority, Some(Priority::P1));
    /// assert_eq!(summary.labels, vec!["ui"]);
    /// ```
    #[must_use]
    pub fn resolve<'a, I>(tags: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut summary = Self::default();
        for tag in dedupe(tags) {
            match classify_tag(tag) {
                TagRole::Priority(priority) => {
                    summary.priority.get_or_insert(priority);
                }
                TagRole::Type(kind) => {
                    summary.scenario_type.get_or_insert(kind);
                }
                TagRole::Label(label) => {
                    if !summary.labels.contains(&label) {
                        summary.labels.push(label);
                    }
                }
            }
        }
        summary
    }

    /// Priority column text; empty when unset.
    #[must_use]
    pub fn priority_text(&self) -> &'static str {
        self.priority.map_or("", Priority::as_str)
    }

    /// Type column text; empty when unset.
    #[must_use]
    pub fn type_text(&self) -> &'static str {
        self.scenario_type.map_or("", ScenarioType::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("@p0", TagRole::Priority(Priority::P0))]
    #[case("@P3", TagRole::Priority(Priority::P3))]
    #[case("@blocker", TagRole::Priority(Priority::P0))]
    #[case("@High", TagRole::Priority(Priority::P1))]
    #[case("@medium", TagRole::Priority(Priority::P2))]
    #[case("@LOW", TagRole::Priority(Priority::P3))]
    #[case("@positive", TagRole::Type(ScenarioType::Positive))]
    #[case("@p4", TagRole::Label("p4".into()))]
    #[case("@JIRA-12", TagRole::Label("JIRA-12".into()))]
    fn classifies_roles(#[case] tag: &str, #[case] expected: TagRole) {
        assert_eq!(classify_tag(tag), expected);
    }

    #[rstest]
    #[case(&["@p1", "@critical"], Some(Priority::P1))]
    #[case(&["@critical", "@p1"], Some(Priority::P0))]
    #[case(&["@low", "@P2", "@low"], Some(Priority::P3))]
    #[case(&["@smoke"], None)]
    fn first_priority_wins(#[case] tags: &[&str], #[case] expected: Option<Priority>) {
        let summary = TagSummary::resolve(tags.iter().copied());
        assert_eq!(summary.priority, expected);
    }

    #[test]
    fn first_type_wins_and_texts_render() {
        let summary = TagSummary::resolve(["@negative", "@positive", "@p2"]);
        assert_eq!(summary.type_text(), "Negative");
        assert_eq!(summary.priority_text(), "P2");
        assert!(summary.labels.is_empty());
    }

    #[test]
    fn empty_summary_renders_blank_columns() {
        let summary = TagSummary::resolve([]);
        assert_eq!(summary.type_text(), "");
        assert_eq!(summary.priority_text(), "");
    }

    #[test]
    fn labels_keep_case_and_first_occurrence() {
        let summary = TagSummary::resolve(["@Smoke", "@api", "@Smoke", "@smoke"]);
        assert_eq!(summary.labels, vec!["Smoke", "api", "smoke"]);
    }

    #[test]
    fn dedupe_is_exact_match() {
        assert_eq!(dedupe(["@a", "@A", "@a"]), vec!["@a", "@A"]);
    }
}
