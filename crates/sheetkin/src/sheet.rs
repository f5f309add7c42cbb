//! Sheet layout: names, test-case IDs, columns and CSV output.
//!
//! Each feature file becomes one sheet. Sheet names are derived from the
//! file stem and kept within the 31-character limit spreadsheet tools
//! impose. Every row gets an ID built from the sheet name and a running
//! counter, e.g. `LOGIN-001`.

use std::collections::HashSet;
use std::io;

use crate::error::SheetError;
use crate::rows::TestCaseRow;

/// Longest sheet name accepted by spreadsheet tools.
pub const MAX_SHEET_NAME: usize = 31;

const COLLISION_BASE: usize = 28;

/// Columns that precede the `Tag N` label columns.
pub const BASE_COLUMNS: [&str; 11] = [
    "TC_ID",
    "Feature",
    "Rule",
    "Type",
    "Priority",
    "Title",
    "Precondition (Given)",
    "Test Steps (When)",
    "Expected Result (Then)",
    "Test Data",
    "Tags",
];

/// Reduce `stem` to a safe sheet name.
///
/// Runs of characters outside `[A-Za-z0-9_-]` collapse to one `_`. An
/// empty result becomes `Sheet`.
///
/// # Examples
///
/// ```
/// use sheetkin::sheet::sanitize_sheet_name;
///
/// assert_eq!(sanitize_sheet_name("user login (v2)"), "user_login_v2_");
/// assert_eq!(sanitize_sheet_name(""), "Sheet");
/// ```
#[must_use]
pub fn sanitize_sheet_name(stem: &str) -> String {
    let mut name = String::with_capacity(stem.len());
    let mut in_run = false;
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            name.push(c);
            in_run = false;
        } else if !in_run {
            name.push('_');
            in_run = true;
        }
    }
    if name.is_empty() {
        return "Sheet".to_string();
    }
    truncate_chars(&name, MAX_SHEET_NAME)
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Hands out unique sheet names in input order.
///
/// Names compare case-insensitively, as spreadsheet tools do.
#[derive(Debug, Default)]
pub struct SheetNamer {
    used: HashSet<String>,
}

impl SheetNamer {
    /// Create a namer with no names taken.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a unique name for `stem`, suffixing `_2`, `_3`, … on
    /// collision.
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetkin::sheet::SheetNamer;
    ///
    /// let mut namer = SheetNamer::new();
    /// assert_eq!(namer.assign("login"), "login");
    /// assert_eq!(namer.assign("Login"), "Login_2");
    /// ```
    pub fn assign(&mut self, stem: &str) -> String {
        let base = sanitize_sheet_name(stem);
        if self.used.insert(base.to_ascii_lowercase()) {
            return base;
        }
        let short = truncate_chars(&base, COLLISION_BASE);
        let mut suffix = 2_usize;
        loop {
            let candidate = format!("{short}_{suffix}");
            if self.used.insert(candidate.to_ascii_lowercase()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

/// ID prefix for a sheet: whitespace becomes `_`, letters are upper-cased.
#[must_use]
pub fn id_prefix(sheet_name: &str) -> String {
    sheet_name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect::<String>()
        .to_uppercase()
}

/// Test-case ID: `<PREFIX>-<NNN>`, counting from 1.
///
/// # Examples
///
/// ```
/// use sheetkin::sheet::test_case_id;
///
/// assert_eq!(test_case_id("login", 7), "LOGIN-007");
/// ```
#[must_use]
pub fn test_case_id(sheet_name: &str, sequence: usize) -> String {
    format!("{}-{sequence:03}", id_prefix(sheet_name))
}

/// Render list items as `1. item` lines.
#[must_use]
pub fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| format!("{}. {item}", idx + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The rows of one feature file under a unique sheet name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    /// Unique sheet name.
    pub name: String,
    /// Test cases in source order.
    pub rows: Vec<TestCaseRow>,
}

/// A rendered sheet: header row plus one record per test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTable {
    /// Column headers.
    pub headers: Vec<String>,
    /// Cell values, one vector per row, aligned with `headers`.
    pub records: Vec<Vec<String>>,
}

impl Sheet {
    /// Number of `Tag N` columns: the largest label count of any row.
    #[must_use]
    pub fn label_columns(&self) -> usize {
        self.rows.iter().map(|row| row.labels.len()).max().unwrap_or(0)
    }

    /// Lay the rows out as cells.
    #[must_use]
    pub fn table(&self) -> SheetTable {
        let label_columns = self.label_columns();
        let headers = BASE_COLUMNS
            .iter()
            .map(|column| (*column).to_string())
            .chain((1..=label_columns).map(|n| format!("Tag {n}")))
            .collect();
        let records = self
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                let mut record = vec![
                    test_case_id(&self.name, idx + 1),
                    row.feature.clone(),
                    row.rule.clone(),
                    row.scenario_type.map(|t| t.to_string()).unwrap_or_default(),
                    row.priority.map(|p| p.to_string()).unwrap_or_default(),
                    row.title.clone(),
                    numbered(&row.given),
                    numbered(&row.when),
                    numbered(&row.then),
                    row.test_data_text(),
                    row.tags.clone(),
                ];
                record.extend(
                    (0..label_columns).map(|n| row.labels.get(n).cloned().unwrap_or_default()),
                );
                record
            })
            .collect();
        SheetTable { headers, records }
    }
}

impl SheetTable {
    /// Write the table as CSV.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::Csv`] when a record cannot be written.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), SheetError> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(&self.headers)?;
        for record in &self.records {
            csv.write_record(record)?;
        }
        csv.flush().map_err(|source| SheetError::Csv(source.into()))?;
        Ok(())
    }

    /// Render the table as a CSV string.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::Csv`] when a record cannot be written.
    pub fn to_csv_string(&self) -> Result<String, SheetError> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::Priority;
    use rstest::rstest;

    #[rstest]
    #[case("login", "login")]
    #[case("a b  c", "a_b_c")]
    #[case("über-feature", "_ber-feature")]
    #[case("...", "_")]
    #[case("", "Sheet")]
    #[case("abcdefghijklmnopqrstuvwxyz0123456789", "abcdefghijklmnopqrstuvwxyz01234")]
    fn sanitizes_names(#[case] stem: &str, #[case] expected: &str) {
        assert_eq!(sanitize_sheet_name(stem), expected);
    }

    #[test]
    fn collisions_get_numbered_suffixes_within_limit() {
        let long = "abcdefghijklmnopqrstuvwxyz0123456789";
        let mut namer = SheetNamer::new();
        assert_eq!(namer.assign(long), "abcdefghijklmnopqrstuvwxyz01234");
        let second = namer.assign(long);
        assert_eq!(second, "abcdefghijklmnopqrstuvwxyz01_2");
        assert!(second.len() <= MAX_SHEET_NAME);
        assert_eq!(namer.assign(long), "abcdefghijklmnopqrstuvwxyz01_3");
    }

    #[test]
    fn suffixed_name_skips_existing_names() {
        let mut namer = SheetNamer::new();
        assert_eq!(namer.assign("a_2"), "a_2");
        assert_eq!(namer.assign("a"), "a");
        assert_eq!(namer.assign("a"), "a_3");
    }

    #[rstest]
    #[case("login", 1, "LOGIN-001")]
    #[case("my sheet", 42, "MY_SHEET-042")]
    #[case("x", 1234, "X-1234")]
    fn formats_ids(#[case] name: &str, #[case] seq: usize, #[case] expected: &str) {
        assert_eq!(test_case_id(name, seq), expected);
    }

    #[test]
    fn table_adds_one_tag_column_per_label_slot() {
        let sheet = Sheet {
            name: "cart".into(),
            rows: vec![
                TestCaseRow {
                    title: "one".into(),
                    labels: vec!["ui".into()],
                    priority: Some(Priority::P1),
                    given: vec!["a".into(), "b".into()],
                    ..TestCaseRow::default()
                },
                TestCaseRow {
                    title: "two".into(),
                    labels: vec!["api".into(), "slow".into()],
                    ..TestCaseRow::default()
                },
            ],
        };
        let table = sheet.table();
        assert_eq!(table.headers.len(), BASE_COLUMNS.len() + 2);
        assert_eq!(table.headers.last().map(String::as_str), Some("Tag 2"));
        let first = table.records.first().cloned().unwrap_or_default();
        assert_eq!(first.first().map(String::as_str), Some("CART-001"));
        assert_eq!(first.get(4).map(String::as_str), Some("P1"));
        assert_eq!(first.get(6).map(String::as_str), Some("1. a\n2. b"));
        assert_eq!(first.last().map(String::as_str), Some(""));
    }

    #[test]
    fn csv_quotes_multiline_cells() {
        let table = SheetTable {
            headers: vec!["A".into(), "B".into()],
            records: vec![vec!["1. x\n2. y".into(), "plain".into()]],
        };
        let csv = table.to_csv_string().unwrap_or_default();
        assert_eq!(csv, "A,B\n\"1. x\n2. y\",plain\n");
    }
}
