//! Test-case rows built from Scenario records.
//!
//! A plain Scenario gives one row. An outline gives one row per Examples
//! data row across all of its blocks, each with the title, steps and
//! background substituted from that row.

use crate::keyword::StepKeyword;
use crate::model::{Scenario, Step};
use crate::placeholder::{ExampleRow, substitute};
use crate::tags::{Priority, ScenarioType, TagSummary};

/// One test case, ready to be laid out as a sheet row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestCaseRow {
    /// Feature name.
    pub feature: String,
    /// Rule name, empty outside a Rule.
    pub rule: String,
    /// Resolved scenario type.
    pub scenario_type: Option<ScenarioType>,
    /// Resolved priority.
    pub priority: Option<Priority>,
    /// Scenario title with placeholders substituted.
    pub title: String,
    /// Precondition steps: Given background steps, then Given steps.
    pub given: Vec<String>,
    /// Action steps.
    pub when: Vec<String>,
    /// Expected results.
    pub then: Vec<String>,
    /// The Examples row the case was expanded from; empty for plain
    /// scenarios.
    pub test_data: ExampleRow,
    /// All tags as written, space separated, duplicates kept.
    pub tags: String,
    /// Label tags without `@`, de-duplicated.
    pub labels: Vec<String>,
}

impl TestCaseRow {
    /// Render the Examples row as `1. key = value` lines.
    ///
    /// Empty values are shown as `(empty)`.
    #[must_use]
    pub fn test_data_text(&self) -> String {
        self.test_data
            .iter()
            .enumerate()
            .map(|(idx, (key, value))| {
                let value = if value.is_empty() { "(empty)" } else { value.as_str() };
                format!("{}. {key} = {value}", idx + 1)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Build the rows for one scenario.
///
/// Outlines without any Examples data row produce no rows.
#[must_use]
pub fn scenario_rows(scenario: &Scenario) -> Vec<TestCaseRow> {
    if !scenario.is_outline() {
        return vec![build_row(scenario, &[], &ExampleRow::new())];
    }
    scenario
        .examples
        .iter()
        .flat_map(|block| {
            block
                .rows
                .iter()
                .map(move |row| build_row(scenario, &block.tags, row))
        })
        .collect()
}

/// Rows for every scenario in order.
#[must_use]
pub fn feature_rows(scenarios: &[Scenario]) -> Vec<TestCaseRow> {
    scenarios.iter().flat_map(scenario_rows).collect()
}

fn build_row(scenario: &Scenario, block_tags: &[String], row: &ExampleRow) -> TestCaseRow {
    let all_tags: Vec<&str> = scenario
        .effective_tags
        .iter()
        .chain(block_tags)
        .map(String::as_str)
        .collect();
    let summary = TagSummary::resolve(all_tags.iter().copied());

    let mut given = Vec::new();
    let mut when = Vec::new();
    let mut then = Vec::new();
    for step in scenario.background.iter().chain(&scenario.steps) {
        let column = match step.base {
            StepKeyword::When => &mut when,
            StepKeyword::Then => &mut then,
            StepKeyword::Given | StepKeyword::And | StepKeyword::But => &mut given,
        };
        column.push(step_text(step, row));
    }

    TestCaseRow {
        feature: scenario.feature.clone(),
        rule: scenario.rule.clone(),
        scenario_type: summary.scenario_type,
        priority: summary.priority,
        title: substitute(&scenario.name, row).into_owned(),
        given,
        when,
        then,
        test_data: row.clone(),
        tags: all_tags.join(" "),
        labels: summary.labels,
    }
}

fn step_text(step: &Step, row: &ExampleRow) -> String {
    substitute(&step.text, row).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_feature;

    fn rows_of(source: &str) -> Vec<TestCaseRow> {
        feature_rows(&parse_feature(source).scenarios)
    }

    #[test]
    fn background_steps_lead_each_column() {
        let rows = rows_of(concat!(
            "Feature: Shop\n",
            "  Background:\n",
            "    Given a shop\n",
            "    When it opens\n",
            "  Rule: Pay\n",
            "    Background:\n",
            "      Given a wallet\n",
            "    Scenario: buy\n",
            "      Given an item\n",
            "      When I pay\n",
            "      Then I own it\n",
            "      But the shop does not\n",
        ));
        let [row] = rows.as_slice() else {
            panic!("expected one row, got {rows:?}");
        };
        assert_eq!(row.feature, "Shop");
        assert_eq!(row.rule, "Pay");
        assert_eq!(row.given, vec!["a shop", "a wallet", "an item"]);
        assert_eq!(row.when, vec!["it opens", "I pay"]);
        assert_eq!(row.then, vec!["I own it", "the shop does not"]);
        assert_eq!(row.test_data_text(), "");
    }

    #[test]
    fn outline_yields_one_row_per_data_row_across_blocks() {
        let rows = rows_of(concat!(
            "@p2 @ui\n",
            "Feature: Login\n",
            "  Background:\n",
            "    Given the <role> exists\n",
            "  @negative\n",
            "  Scenario Outline: Login as <role>\n",
            "    When I sign in with '<pin>'\n",
            "    @p0 @ui @admin\n",
            "    Examples:\n",
            "      | role  | pin |\n",
            "      | admin |     |\n",
            "    Examples:\n",
            "      | role  | pin  |\n",
            "      | guest | 1234 |\n",
        ));
        assert_eq!(rows.len(), 2);
        let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Login as admin", "Login as guest"]);

        let admin = rows.first().cloned().unwrap_or_default();
        assert_eq!(admin.given, vec!["the admin exists"]);
        assert_eq!(admin.when, vec!["I sign in with ''"]);
        assert_eq!(admin.tags, "@p2 @ui @negative @p0 @ui @admin");
        assert_eq!(admin.priority, Some(Priority::P2));
        assert_eq!(admin.scenario_type, Some(ScenarioType::Negative));
        assert_eq!(admin.labels, vec!["ui", "admin"]);
        assert_eq!(admin.test_data_text(), "1. role = admin\n2. pin = (empty)");

        let guest = rows.get(1).cloned().unwrap_or_default();
        assert_eq!(guest.tags, "@p2 @ui @negative");
        assert_eq!(guest.test_data_text(), "1. role = guest\n2. pin = 1234");
    }

    #[test]
    fn outline_without_examples_yields_no_rows() {
        let rows = rows_of("Scenario Outline: o\n  Given <x>\n  Examples:\n    | x |\n");
        assert!(rows.is_empty());
    }

    #[test]
    fn step_continuations_are_substituted() {
        let rows = rows_of(concat!(
            "Scenario Outline: o\n",
            "  Given users\n",
            "    | name   |\n",
            "    | <name> |\n",
            "  Examples:\n",
            "    | name |\n",
            "    | ada  |\n",
        ));
        let given = rows.first().map(|r| r.given.clone()).unwrap_or_default();
        assert_eq!(given, vec!["users\n| name   |\n| ada |"]);
    }
}
