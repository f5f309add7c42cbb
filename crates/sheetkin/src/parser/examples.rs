//! Examples table scanning.

use crate::line::{Line, LineKind, split_cells};
use crate::model::ExamplesBlock;
use crate::placeholder::ExampleRow;

/// Table rows following an `Examples:` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TableRegion {
    /// Cells of every table row, header first.
    pub rows: Vec<Vec<String>>,
    /// Index one past the region.
    pub end: usize,
}

/// Collect the table region starting at `start`.
///
/// Blank and comment lines inside the region are skipped; the region ends
/// at the first line that is neither.
pub(crate) fn scan_table(lines: &[Line<'_>], start: usize) -> TableRegion {
    let mut rows = Vec::new();
    let mut end = start;
    for line in lines.iter().skip(start) {
        match line.kind {
            LineKind::TableRow => rows.push(split_cells(line.content())),
            kind if kind.is_trivia() => {}
            _ => break,
        }
        end += 1;
    }
    TableRegion { rows, end }
}

/// Key each data row by the header row.
///
/// Returns `None` when there is no data row. Missing cells become `""`,
/// surplus cells are ignored, and a repeated header keeps its first
/// position with the later value.
pub(crate) fn build_block(
    tags: Vec<String>,
    rows: Vec<Vec<String>>,
    line: usize,
) -> Option<ExamplesBlock> {
    let mut rows = rows.into_iter();
    let headers = rows.next()?;
    let data: Vec<ExampleRow> = rows
        .map(|cells| {
            headers
                .iter()
                .enumerate()
                .map(|(idx, header)| (header.clone(), cells.get(idx).cloned().unwrap_or_default()))
                .collect()
        })
        .collect();
    if data.is_empty() {
        return None;
    }
    Some(ExamplesBlock {
        tags,
        headers,
        rows: data,
        line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::classify_source;

    fn cells(row: &[&str]) -> Vec<String> {
        row.iter().map(|c| (*c).to_string()).collect()
    }

    #[test]
    fn region_skips_blank_and_comment_lines() {
        let lines = classify_source("| a |\n\n# note\n| 1 |\nScenario: next");
        let region = scan_table(&lines, 0);
        assert_eq!(region.rows, vec![cells(&["a"]), cells(&["1"])]);
        assert_eq!(region.end, 4);
    }

    #[test]
    fn short_rows_are_padded() {
        let block = build_block(
            Vec::new(),
            vec![cells(&["a", "b"]), cells(&["1"])],
            3,
        );
        let Some(block) = block else {
            panic!("expected a block");
        };
        assert_eq!(block.rows.len(), 1);
        assert_eq!(block.rows.first().and_then(|r| r.get("b")), Some(&String::new()));
    }

    #[test]
    fn header_only_table_is_discarded() {
        assert!(build_block(Vec::new(), vec![cells(&["a"])], 1).is_none());
        assert!(build_block(Vec::new(), Vec::new(), 1).is_none());
    }

    #[test]
    fn duplicate_header_keeps_first_position_and_last_value() {
        let block = build_block(
            Vec::new(),
            vec![cells(&["x", "y", "x"]), cells(&["1", "2", "3"])],
            1,
        );
        let Some(block) = block else {
            panic!("expected a block");
        };
        let row = block.rows.first().cloned().unwrap_or_default();
        let pairs: Vec<(&str, &str)> = row.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(pairs, vec![("x", "3"), ("y", "2")]);
    }
}
