//! CSV rows to Gherkin `Examples:` tables.
//!
//! A sheet may hold several tables separated by blank rows. Each table
//! becomes one width-aligned `Examples:` block. Single-value rows at the top
//! of a table that start with `#` or look like a ticket key (`ABC-123`) are
//! lifted out as comment lines above the block.

use std::collections::HashSet;
use std::io;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::SheetError;

static TICKET_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Safe: The regex pattern is a compile-time constant and is valid.
    Regex::new(r"(?i)^[A-Z][A-Z0-9]+-\d+$").unwrap_or_else(|_| unreachable!("ticket regex is valid"))
});

const MASK: &str = "****";

/// Layout and selection options for [`render_sheet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeTableOptions {
    /// Spaces written before each `|` row.
    pub indent: usize,
    /// Column whitelist: header names (case-insensitive) or `#index`.
    /// Empty keeps every column.
    pub columns: Vec<String>,
    /// Header names whose non-empty values are replaced by `****`.
    pub mask: Vec<String>,
    /// Treat every row as data and name the columns `c0`, `c1`, …
    pub no_header: bool,
    /// Number of consecutive blank rows that separate two tables.
    pub table_gap: usize,
}

impl Default for PipeTableOptions {
    fn default() -> Self {
        Self {
            indent: 4,
            columns: Vec::new(),
            mask: Vec::new(),
            no_header: false,
            table_gap: 1,
        }
    }
}

/// One CSV record.
pub type Row = Vec<String>;

fn is_blank(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
}

fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|cell| is_blank(cell))
}

fn escape(cell: &str) -> String {
    cell.replace('|', "\\|").trim().to_string()
}

fn normalise(cell: &str) -> String {
    let escaped = escape(cell);
    if escaped.eq_ignore_ascii_case("true") || escaped.eq_ignore_ascii_case("false") {
        escaped.to_ascii_uppercase()
    } else {
        escaped
    }
}

/// Read every CSV record as a row of cells, with no header handling.
///
/// Empty lines are kept as empty rows so that blank-row gaps between
/// tables survive.
///
/// # Errors
///
/// Returns [`SheetError::Csv`] when the input is not valid CSV.
pub fn read_rows<R: io::Read>(reader: R) -> Result<Vec<Row>, SheetError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();
    let mut expected_line = 1_u64;
    for record in csv.records() {
        let record = record?;
        if let Some(position) = record.position() {
            let skipped = position.line().saturating_sub(expected_line);
            for _ in 0..skipped {
                rows.push(Vec::new());
            }
            let embedded: usize = record.iter().map(|field| field.matches('\n').count()).sum();
            expected_line = position.line() + u64::try_from(embedded).unwrap_or(0) + 1;
        }
        if record.len() == 1 && record.get(0).is_some_and(str::is_empty) {
            rows.push(Vec::new());
        } else {
            rows.push(record.iter().map(str::to_string).collect());
        }
    }
    Ok(rows)
}

/// Split rows into tables at runs of at least `gap` blank rows.
fn split_blocks(rows: &[Row], gap: usize) -> Vec<Vec<Row>> {
    let gap = gap.max(1);
    let mut blocks = Vec::new();
    let mut current: Vec<Row> = Vec::new();
    let mut blanks = 0_usize;
    for row in rows {
        if is_blank_row(row) {
            blanks += 1;
            if blanks >= gap && !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            blanks = 0;
            current.push(row.clone());
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// Remove leading comment rows from `block` and return them as lines.
fn take_leading_comments(block: &mut Vec<Row>) -> Vec<String> {
    let mut comments = Vec::new();
    loop {
        let Some(first) = block.first() else {
            break;
        };
        let values: Vec<&str> = first
            .iter()
            .filter(|cell| !is_blank(cell))
            .map(|cell| cell.trim())
            .collect();
        let [value] = values.as_slice() else {
            break;
        };
        if value.starts_with('#') {
            comments.push((*value).to_string());
        } else if TICKET_RE.is_match(value) {
            comments.push(format!("# {value}"));
        } else {
            break;
        }
        block.remove(0);
    }
    comments
}

fn selected_columns(header: &[String], column_count: usize, columns: &[String]) -> Vec<usize> {
    if columns.is_empty() {
        return (0..column_count).collect();
    }
    let lowered: Vec<String> = header
        .iter()
        .take(column_count)
        .map(|h| escape(h).to_lowercase())
        .collect();
    columns
        .iter()
        .filter_map(|column| match column.strip_prefix('#') {
            Some(index) if !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()) => {
                index.parse::<usize>().ok()
            }
            _ => {
                let wanted = column.to_lowercase();
                lowered.iter().position(|h| *h == wanted)
            }
        })
        .filter(|idx| *idx < column_count)
        .collect()
}

/// Render one table as `Examples:` lines, or `None` when it has no
/// usable data.
fn render_block(block: &[Row], options: &PipeTableOptions) -> Option<Vec<String>> {
    if block.len() < 2 {
        return None;
    }
    let (header, data): (Row, &[Row]) = if options.no_header {
        let width = block.iter().map(Vec::len).max().unwrap_or(0);
        ((0..width).map(|i| format!("c{i}")).collect(), block)
    } else {
        let (first, rest) = block.split_first()?;
        (first.clone(), rest)
    };

    let column_count = header
        .iter()
        .rposition(|h| !is_blank(h))
        .map_or(header.len(), |last| last + 1);
    let indices = selected_columns(&header, column_count, &options.columns);
    if indices.is_empty() {
        return None;
    }

    let cell = |row: &Row, idx: usize| normalise(row.get(idx).map_or("", String::as_str));
    let headers: Row = indices.iter().map(|&idx| cell(&header, idx)).collect();
    let masked: HashSet<String> = options.mask.iter().map(|m| m.trim().to_lowercase()).collect();
    let mask_flags: Vec<bool> = headers
        .iter()
        .map(|h| masked.contains(&h.to_lowercase()))
        .collect();

    let rows: Vec<Row> = data
        .iter()
        .map(|row| {
            indices
                .iter()
                .zip(&mask_flags)
                .map(|(&idx, &mask)| {
                    let value = cell(row, idx);
                    if mask && !value.is_empty() {
                        MASK.to_string()
                    } else {
                        value
                    }
                })
                .collect::<Row>()
        })
        .filter(|row| !is_blank_row(row))
        .collect();
    if rows.is_empty() {
        return None;
    }

    let widths: Vec<usize> = (0..headers.len())
        .map(|col| {
            std::iter::once(&headers)
                .chain(&rows)
                .filter_map(|row| row.get(col))
                .map(|c| c.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();
    let pad = " ".repeat(options.indent);
    let format_row = |row: &Row| {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(c, &width)| format!("{c:<width$}"))
            .collect();
        format!("{pad}| {} |", cells.join(" | "))
    };

    let mut lines = vec!["Examples:".to_string(), format_row(&headers)];
    lines.extend(rows.iter().map(format_row));
    Some(lines)
}

/// Render one sheet: a `# Sheet:` header, then every usable table with its
/// comment lines. Returns an empty list when no table is usable.
#[must_use]
pub fn render_sheet(name: &str, rows: &[Row], options: &PipeTableOptions) -> Vec<String> {
    let mut lines = vec![format!("# Sheet: {name}")];
    let mut any = false;
    for mut block in split_blocks(rows, options.table_gap) {
        let comments = take_leading_comments(&mut block);
        match render_block(&block, options) {
            Some(table) => {
                lines.extend(comments);
                lines.extend(table);
                lines.push(String::new());
                any = true;
            }
            None => debug!(sheet = name, "table without usable rows skipped"),
        }
    }
    if any { lines } else { Vec::new() }
}

/// Render several named sheets into one feature-text document ending in
/// exactly one newline.
///
/// # Examples
///
/// ```
/// use sheetkin::pipe_table::{render_document, PipeTableOptions};
///
/// let rows = vec![
///     vec!["role".to_string(), "active".to_string()],
///     vec!["admin".to_string(), "true".to_string()],
/// ];
/// let text = render_document(&[("users".to_string(), rows)], &PipeTableOptions::default());
/// assert_eq!(
///     text,
///     "# Sheet: users\nExamples:\n    | role  | active |\n    | admin | TRUE   |\n"
/// );
/// ```
#[must_use]
pub fn render_document(sheets: &[(String, Vec<Row>)], options: &PipeTableOptions) -> String {
    let mut lines = Vec::new();
    for (name, rows) in sheets {
        lines.extend(render_sheet(name, rows, options));
        lines.push(String::new());
    }
    let mut text = lines.join("\n").trim_end().to_string();
    text.push('\n');
    text
}
