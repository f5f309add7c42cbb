//! Expansion of one Scenario Outline block.

use tracing::debug;

use crate::docstring;
use crate::line::{HeaderKind, Line, LineKind, classify_source};
use crate::parser::examples::{build_block, scan_table};
use crate::placeholder::{ExampleRow, substitute, substitute_all};

use super::ensure_single_trailing_blank;

/// Expand a Scenario Outline block into concrete Scenarios.
///
/// `block` starts at the outline header and runs to the end of the
/// outline, Examples tables included. `outline_tags` are the raw tag lines
/// written above the header and `background` the raw lines to inject after
/// every title. Both are repeated for each data row.
///
/// When no Examples table has a data row the tag lines and the block are
/// returned verbatim.
///
/// # Examples
///
/// ```
/// use sheetkin::expand_outline;
///
/// let block = [
///     "Scenario Outline: Login as <role>",
///     "  Given user is <role>",
///     "Examples:",
///     "  | role  |",
///     "  | admin |",
/// ];
/// let out = expand_outline(&block, &[], &[]);
/// assert_eq!(out, vec!["Scenario: Login as admin", "  Given user is admin", ""]);
/// ```
#[must_use]
pub fn expand_outline(block: &[&str], outline_tags: &[&str], background: &[&str]) -> Vec<String> {
    let source = block.join("\n");
    let lines = classify_source(&source);
    expand_lines(&lines, outline_tags, background)
}

/// Examples rows with the raw tag lines written above their table.
struct RowGroup<'a> {
    tag_lines: Vec<&'a str>,
    rows: Vec<ExampleRow>,
}

pub(crate) fn expand_lines(
    block: &[Line<'_>],
    outline_tags: &[&str],
    background: &[&str],
) -> Vec<String> {
    let Some(header) = block.first() else {
        return Vec::new();
    };
    let (steps, examples_start) = split_steps(block);
    let groups = row_groups(block, examples_start);
    if groups.is_empty() {
        debug!(line = header.number, "outline has no usable examples; kept verbatim");
        return outline_tags
            .iter()
            .copied()
            .chain(block.iter().map(|line| line.raw))
            .map(str::to_string)
            .collect();
    }

    let indent = header.indent();
    let title = header.raw_header_title().unwrap_or_default();
    let mut out = Vec::new();
    let mut produced = 0_usize;
    for group in &groups {
        for row in &group.rows {
            out.extend(outline_tags.iter().map(|tag| (*tag).to_string()));
            out.extend(group.tag_lines.iter().map(|tag| (*tag).to_string()));
            let concrete = substitute(title, row);
            if concrete.is_empty() {
                out.push(format!("{indent}Scenario:"));
            } else {
                out.push(format!("{indent}Scenario: {concrete}"));
            }
            out.extend(substitute_all(background, row));
            out.extend(substitute_all(&steps, row));
            ensure_single_trailing_blank(&mut out);
            produced += 1;
        }
    }
    debug!(line = header.number, scenarios = produced, "expanded outline");
    out
}

/// Raw step lines after the header, and the index where they stop.
///
/// Steps end at the first `Examples:` header or tag line outside a
/// doc-string.
fn split_steps<'a>(block: &[Line<'a>]) -> (Vec<&'a str>, usize) {
    let mut steps = Vec::new();
    let mut idx = 1;
    while let Some(line) = block.get(idx) {
        match line.kind {
            LineKind::Header(HeaderKind::Examples) | LineKind::Tags => break,
            LineKind::DocStringFence(fence) => {
                let span = docstring::scan(block, idx, fence);
                let body = block.get(idx..span.end).unwrap_or_default();
                steps.extend(body.iter().map(|l| l.raw));
                idx = span.end;
            }
            _ => {
                steps.push(line.raw);
                idx += 1;
            }
        }
    }
    (steps, idx)
}

/// Examples tables with at least one data row, in source order.
fn row_groups<'a>(block: &[Line<'a>], start: usize) -> Vec<RowGroup<'a>> {
    let mut groups = Vec::new();
    let mut tag_lines = Vec::new();
    let mut idx = start;
    while let Some(line) = block.get(idx) {
        match line.kind {
            LineKind::Tags => {
                tag_lines.push(line.raw);
                idx += 1;
            }
            LineKind::Header(HeaderKind::Examples) => {
                let region = scan_table(block, idx + 1);
                let tag_lines = std::mem::take(&mut tag_lines);
                match build_block(Vec::new(), region.rows, line.number) {
                    Some(table) => groups.push(RowGroup {
                        tag_lines,
                        rows: table.rows,
                    }),
                    None => debug!(line = line.number, "examples table without data rows skipped"),
                }
                idx = region.end;
            }
            _ => idx += 1,
        }
    }
    groups
}
