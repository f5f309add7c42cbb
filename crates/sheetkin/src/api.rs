//! API-oriented test-case rows.
//!
//! Scenarios that drive an HTTP API read better as one row per request:
//! method and endpoint from the first `When` naming them, headers and body
//! fields summarised from attached tables and doc strings, and the expected
//! status and assertions pulled from the `Then` steps.
//!
//! Background `Given` steps count as preconditions and background `When`
//! steps as actions; background `Then` steps are not used. Outline rows are
//! substituted per Examples row, and an outline with no Examples data still
//! yields one row from its template.

use std::sync::LazyLock;

use indexmap::{IndexMap, IndexSet};
use regex::Regex;

use crate::keyword::StepKeyword;
use crate::model::{Scenario, Step};
use crate::placeholder::{ExampleRow, substitute};
use crate::sheet::{SheetTable, test_case_id};
use crate::tags::TagSummary;

/// Columns of an API sheet, in order.
pub const API_COLUMNS: [&str; 14] = [
    "TC_ID",
    "Priority",
    "Type",
    "Rule",
    "Title",
    "Method",
    "Endpoint",
    "Preconditions",
    "Headers",
    "Body Params",
    "Steps",
    "Expected Status",
    "Assertions",
    "Test Data",
];

const MAX_BODY_KEYS: usize = 10;
const MAX_BODY_LABELS: usize = 8;
const MAX_ASSERTION_ROWS: usize = 5;
const MAX_HEADER_KEYS: usize = 4;

/// Header names recognised in header tables, with their short labels.
const KNOWN_HEADERS: [(&str, &str); 7] = [
    ("content-type", "Content-Type"),
    ("accept", "Accept"),
    ("x-tenant", "Tenant"),
    ("x-idempotency-key", "Idempotency"),
    ("x-signature", "Signature"),
    ("x-timestamp", "Timestamp"),
    ("x-request-trace", "Trace"),
];

static REQUEST_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Safe: The regex pattern is a compile-time constant and is valid.
    Regex::new(r#"(?i)\b(GET|POST|PUT|PATCH|DELETE)\b\s+"([^"]+)""#)
        .unwrap_or_else(|_| unreachable!("request regex is valid"))
});

static BODY_STEP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)with (json )?body").unwrap_or_else(|_| unreachable!("body regex is valid"))
});

static LABELLED_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z0-9_\-\s]+?)\s*"[^"]*""#)
        .unwrap_or_else(|_| unreachable!("label regex is valid"))
});

static STATUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)I get status\s+"?(\d{3})"?"#)
        .unwrap_or_else(|_| unreachable!("status regex is valid"))
});

static ERROR_BODY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)error JSON contains code\s+"([^"]+)"\s+and message\s+"([^"]+)""#)
        .unwrap_or_else(|_| unreachable!("error regex is valid"))
});

/// One API test case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiCaseRow {
    /// Resolved tag columns.
    pub tags: TagSummary,
    /// Rule name, empty outside a Rule.
    pub rule: String,
    /// Scenario title with placeholders substituted.
    pub title: String,
    /// Upper-cased HTTP method, empty when no step names one.
    pub method: String,
    /// Endpoint quoted after the method.
    pub endpoint: String,
    /// Highlights of the precondition steps, `; ` separated.
    pub preconditions: String,
    /// Summary of the first header table.
    pub headers: String,
    /// Body field names, `, ` separated.
    pub body_params: String,
    /// Short action description.
    pub steps: String,
    /// Three-digit status code, when asserted.
    pub expected_status: String,
    /// Response checks in step order, table checks last.
    pub assertions: Vec<String>,
    /// Examples values after the first column, as `key=value` pairs.
    pub test_data: String,
}

/// A step after placeholder substitution.
struct ConcreteStep {
    text: String,
    table: Vec<Vec<String>>,
    doc_string: Option<String>,
}

impl ConcreteStep {
    fn new(step: &Step, row: &ExampleRow) -> Self {
        Self {
            text: substitute(&step.text, row).into_owned(),
            table: step
                .table
                .iter()
                .map(|cells| cells.iter().map(|c| substitute(c, row).into_owned()).collect())
                .collect(),
            doc_string: step
                .doc_string
                .as_deref()
                .map(|body| substitute(body, row).into_owned()),
        }
    }

    fn sentence(&self) -> &str {
        self.text.lines().next().unwrap_or_default()
    }

    /// Whether the step describes a header table.
    fn carries_headers(&self) -> bool {
        self.text.to_lowercase().contains("header") && self.text.contains('|')
    }

    /// Rows of exactly two cells, as `(key, value)`.
    fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.table.iter().filter_map(|cells| match cells.as_slice() {
            [key, value] => Some((key.as_str(), value.as_str())),
            _ => None,
        })
    }
}

/// Build the API rows for one scenario.
#[must_use]
pub fn api_scenario_rows(scenario: &Scenario) -> Vec<ApiCaseRow> {
    if !scenario.is_outline() {
        return vec![build_row(scenario, &[], &ExampleRow::new())];
    }
    let rows: Vec<ApiCaseRow> = scenario
        .examples
        .iter()
        .flat_map(|block| {
            block
                .rows
                .iter()
                .map(move |row| build_row(scenario, &block.tags, row))
        })
        .collect();
    if rows.is_empty() {
        return vec![build_row(scenario, &[], &ExampleRow::new())];
    }
    rows
}

/// API rows for every scenario in order.
#[must_use]
pub fn api_feature_rows(scenarios: &[Scenario]) -> Vec<ApiCaseRow> {
    scenarios.iter().flat_map(api_scenario_rows).collect()
}

fn build_row(scenario: &Scenario, block_tags: &[String], row: &ExampleRow) -> ApiCaseRow {
    let tags = TagSummary::resolve(
        scenario
            .effective_tags
            .iter()
            .chain(block_tags)
            .map(String::as_str),
    );

    let mut given = Vec::new();
    let mut when = Vec::new();
    let mut then = Vec::new();
    for step in &scenario.background {
        match step.base {
            StepKeyword::When => when.push(ConcreteStep::new(step, row)),
            StepKeyword::Then => {}
            StepKeyword::Given | StepKeyword::And | StepKeyword::But => {
                given.push(ConcreteStep::new(step, row));
            }
        }
    }
    for step in &scenario.steps {
        let column = match step.base {
            StepKeyword::When => &mut when,
            StepKeyword::Then => &mut then,
            StepKeyword::Given | StepKeyword::And | StepKeyword::But => &mut given,
        };
        column.push(ConcreteStep::new(step, row));
    }

    let (method, endpoint) = when
        .iter()
        .find_map(|step| request_line(&step.text))
        .unwrap_or_default();
    let steps = if method.is_empty() {
        when.first()
            .map(|step| format!("1) {}", step.sentence()))
            .unwrap_or_default()
    } else {
        format!("1) {method} {endpoint}")
    };
    let then_text = then
        .iter()
        .map(|step| step.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    ApiCaseRow {
        tags,
        rule: scenario.rule.clone(),
        title: substitute(&scenario.name, row).into_owned(),
        method,
        endpoint,
        preconditions: preconditions(&given),
        headers: given
            .iter()
            .chain(&when)
            .filter(|step| step.carries_headers())
            .map(summarize_headers)
            .find(|summary| !summary.is_empty())
            .unwrap_or_default(),
        body_params: when
            .iter()
            .filter(|step| BODY_STEP_RE.is_match(&step.text))
            .map(summarize_body)
            .find(|summary| !summary.is_empty())
            .unwrap_or_default(),
        steps,
        expected_status: STATUS_RE
            .captures(&then_text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
        assertions: assertions(&then),
        test_data: test_data(row),
    }
}

fn request_line(text: &str) -> Option<(String, String)> {
    let caps = REQUEST_RE.captures(text)?;
    let method = caps.get(1)?.as_str().to_uppercase();
    let endpoint = caps.get(2)?.as_str().to_string();
    Some((method, endpoint))
}

fn preconditions(given: &[ConcreteStep]) -> String {
    let mut highlights: IndexSet<String> = IndexSet::new();
    for step in given {
        let lower = step.text.to_lowercase();
        if lower.contains("default currency") {
            highlights.insert("default currency set".to_string());
        }
        if lower.contains("idempotency") {
            highlights.insert("idempotency key set".to_string());
        }
        if lower.contains("base url") {
            highlights.insert("base URL".to_string());
        }
        if step.carries_headers() {
            let summary = summarize_headers(step);
            if !summary.is_empty() {
                highlights.insert(format!("headers: {summary}"));
            }
        }
    }
    if !highlights.is_empty() {
        return highlights.into_iter().collect::<Vec<_>>().join("; ");
    }
    if given.is_empty() {
        String::new()
    } else {
        format!("{} item(s)", given.len())
    }
}

/// Summarise a `| key | value |` header table.
///
/// Well-known headers are reported by short label. Without any, the first
/// few header names are listed instead.
fn summarize_headers(step: &ConcreteStep) -> String {
    let keys: Vec<&str> = step
        .pairs()
        .map(|(key, _)| key)
        .filter(|key| !key.is_empty())
        .collect();
    if keys.is_empty() {
        return String::new();
    }
    let lower: Vec<String> = keys.iter().map(|key| key.to_lowercase()).collect();
    let mut flags = Vec::new();
    if lower.iter().any(|key| key.contains("authorization")) {
        flags.push("Auth");
    }
    for (name, label) in KNOWN_HEADERS {
        if lower.iter().any(|key| key == name) {
            flags.push(label);
        }
    }
    if flags.is_empty() {
        keys.iter()
            .take(MAX_HEADER_KEYS)
            .copied()
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        flags.join(", ")
    }
}

/// Summarise a request body: top-level JSON keys from a doc string, or the
/// labels in front of quoted values in the step text.
fn summarize_body(step: &ConcreteStep) -> String {
    if let Some(body) = &step.doc_string {
        return serde_json::from_str::<IndexMap<String, serde_json::Value>>(body).map_or_else(
            |_| "payload sample".to_string(),
            |object| {
                object
                    .keys()
                    .take(MAX_BODY_KEYS)
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            },
        );
    }
    LABELLED_VALUE_RE
        .captures_iter(&step.text)
        .filter_map(|caps| caps.get(1))
        .map(|label| label.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|label| !label.is_empty())
        .take(MAX_BODY_LABELS)
        .collect::<Vec<_>>()
        .join(", ")
}

fn assertions(then: &[ConcreteStep]) -> Vec<String> {
    let mut items = Vec::new();
    let mut checks = Vec::new();
    for step in then {
        if let Some(caps) = ERROR_BODY_RE.captures(step.sentence()) {
            let code = caps.get(1).map_or("", |m| m.as_str());
            let message = caps.get(2).map_or("", |m| m.as_str());
            items.push(format!("code={code}, message={message}"));
        }
        if step.doc_string.is_some() {
            items.push("sample provided".to_string());
        }
        checks.extend(
            step.pairs()
                .filter(|(path, expected)| !path.is_empty() && !expected.is_empty())
                .map(|(path, expected)| format!("{path}={expected}")),
        );
    }
    items.extend(checks.into_iter().take(MAX_ASSERTION_ROWS));
    items
}

fn test_data(row: &ExampleRow) -> String {
    row.iter()
        .skip(1)
        .map(|(key, value)| {
            let value = if value.is_empty() { "empty" } else { value.as_str() };
            format!("{key}={value}")
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// The API rows of one feature file under a unique sheet name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSheet {
    /// Unique sheet name.
    pub name: String,
    /// Test cases in source order.
    pub rows: Vec<ApiCaseRow>,
}

impl ApiSheet {
    /// Lay the rows out under [`API_COLUMNS`].
    #[must_use]
    pub fn table(&self) -> SheetTable {
        let headers = API_COLUMNS.iter().map(|c| (*c).to_string()).collect();
        let records = self
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                vec![
                    test_case_id(&self.name, idx + 1),
                    row.tags.priority_text().to_string(),
                    row.tags.type_text().to_string(),
                    row.rule.clone(),
                    row.title.clone(),
                    row.method.clone(),
                    row.endpoint.clone(),
                    row.preconditions.clone(),
                    row.headers.clone(),
                    row.body_params.clone(),
                    row.steps.clone(),
                    row.expected_status.clone(),
                    row.assertions.join("; "),
                    row.test_data.clone(),
                ]
            })
            .collect();
        SheetTable { headers, records }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_feature;
    use crate::tags::{Priority, ScenarioType};

    fn rows_of(source: &str) -> Vec<ApiCaseRow> {
        api_feature_rows(&parse_feature(source).scenarios)
    }

    const PAYMENTS: &str = concat!(
        "@api @p1\n",
        "Feature: Payments\n",
        "  Background:\n",
        "    Given the base URL is configured\n",
        "    And headers\n",
        "      | Authorization | Bearer t |\n",
        "      | Content-Type  | application/json |\n",
        "      | X-Tenant      | acme |\n",
        "    Then nothing happens\n",
        "\n",
        "  Rule: Create\n",
        "    @negative\n",
        "    Scenario Outline: Reject <currency> payment\n",
        "      Given a default currency of EUR\n",
        "      When I send POST \"/v1/payments\" with JSON body\n",
        "        \"\"\"\n",
        "        {\"amount\": <amount>, \"currency\": \"<currency>\", \"meta\": {}}\n",
        "        \"\"\"\n",
        "      Then I get status \"422\"\n",
        "      And the error JSON contains code \"E1\" and message \"bad <currency>\"\n",
        "      And response JSON path equals\n",
        "        | $.error | true |\n",
        "\n",
        "      Examples:\n",
        "        | currency | amount | note |\n",
        "        | XYZ      | 10     |      |\n",
    );

    #[test]
    fn outline_row_summarises_request_and_response() {
        let rows = rows_of(PAYMENTS);
        let [row] = rows.as_slice() else {
            panic!("expected one row, got {rows:?}");
        };
        assert_eq!(row.tags.priority, Some(Priority::P1));
        assert_eq!(row.tags.scenario_type, Some(ScenarioType::Negative));
        assert_eq!(row.rule, "Create");
        assert_eq!(row.title, "Reject XYZ payment");
        assert_eq!(row.method, "POST");
        assert_eq!(row.endpoint, "/v1/payments");
        assert_eq!(
            row.preconditions,
            "base URL; headers: Auth, Content-Type, Tenant; default currency set"
        );
        assert_eq!(row.headers, "Auth, Content-Type, Tenant");
        assert_eq!(row.body_params, "amount, currency, meta");
        assert_eq!(row.steps, "1) POST /v1/payments");
        assert_eq!(row.expected_status, "422");
        assert_eq!(
            row.assertions,
            vec!["code=E1, message=bad XYZ", "$.error=true"]
        );
        assert_eq!(row.test_data, "amount=10; note=empty");
    }

    #[test]
    fn plain_scenario_falls_back_to_first_action() {
        let rows = rows_of(concat!(
            "Scenario: ping\n",
            "  Given a client\n",
            "  And a server\n",
            "  When I ping the server\n",
            "    | ttl | 5 |\n",
            "  Then I get status 204\n",
            "    \"\"\"\n",
            "    empty\n",
            "    \"\"\"\n",
        ));
        let [row] = rows.as_slice() else {
            panic!("expected one row, got {rows:?}");
        };
        assert_eq!(row.method, "");
        assert_eq!(row.steps, "1) I ping the server");
        assert_eq!(row.preconditions, "2 item(s)");
        assert_eq!(row.headers, "");
        assert_eq!(row.expected_status, "204");
        assert_eq!(row.assertions, vec!["sample provided"]);
        assert_eq!(row.test_data, "");
    }

    #[test]
    fn body_labels_come_from_quoted_values() {
        let rows = rows_of(concat!(
            "Scenario: s\n",
            "  When I call get \"/users\" with body name \"ann\" and  role \"admin\"\n",
        ));
        let row = rows.first().cloned().unwrap_or_default();
        assert_eq!(row.method, "GET");
        assert_eq!(row.body_params, "I call get, with body name, and role");
    }

    #[test]
    fn invalid_json_body_is_reported_as_sample() {
        let rows = rows_of(concat!(
            "Scenario: s\n",
            "  When I PUT \"/a\" with JSON body\n",
            "    \"\"\"\n",
            "    not json\n",
            "    \"\"\"\n",
        ));
        let row = rows.first().cloned().unwrap_or_default();
        assert_eq!(row.body_params, "payload sample");
    }

    #[test]
    fn unknown_headers_are_listed_by_name() {
        let rows = rows_of(concat!(
            "Scenario: s\n",
            "  When I DELETE \"/a\" with headers\n",
            "    | X-One | 1 |\n",
            "    | X-Two | 2 |\n",
            "    | X-Three | 3 |\n",
            "    | X-Four | 4 |\n",
            "    | X-Five | 5 |\n",
        ));
        let row = rows.first().cloned().unwrap_or_default();
        assert_eq!(row.headers, "X-One, X-Two, X-Three, X-Four");
        assert_eq!(row.preconditions, "");
    }

    #[test]
    fn outline_without_examples_keeps_its_template() {
        let rows = rows_of("Scenario Outline: get <id>\n  When I GET \"/items/<id>\"\n");
        let [row] = rows.as_slice() else {
            panic!("expected one row, got {rows:?}");
        };
        assert_eq!(row.title, "get <id>");
        assert_eq!(row.endpoint, "/items/<id>");
    }

    #[test]
    fn only_five_table_checks_are_kept() {
        let rows = rows_of(concat!(
            "Scenario: s\n",
            "  Then response JSON path equals\n",
            "    | a | 1 |\n",
            "    | b | 2 |\n",
            "    | c | 3 |\n",
            "    | d | 4 |\n",
            "    | e | 5 |\n",
            "    | f | 6 |\n",
        ));
        let row = rows.first().cloned().unwrap_or_default();
        assert_eq!(row.assertions, vec!["a=1", "b=2", "c=3", "d=4", "e=5"]);
    }

    #[test]
    fn table_uses_api_columns() {
        let sheet = ApiSheet {
            name: "payments".into(),
            rows: rows_of(PAYMENTS),
        };
        let table = sheet.table();
        assert_eq!(table.headers.len(), API_COLUMNS.len());
        let record = table.records.first().cloned().unwrap_or_default();
        assert_eq!(record.first().map(String::as_str), Some("PAYMENTS-001"));
        assert_eq!(record.get(1).map(String::as_str), Some("P1"));
        assert_eq!(record.get(2).map(String::as_str), Some("Negative"));
        assert_eq!(
            record.get(12).map(String::as_str),
            Some("code=E1, message=bad XYZ; $.error=true")
        );
    }
}
