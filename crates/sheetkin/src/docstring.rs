//! Doc-string block scanning shared by the parser and the expander.

use crate::line::{Fence, Line};

/// Extent of a doc-string block starting at an opening fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DocStringSpan {
    /// Index one past the last line of the block (closing fence included).
    pub end: usize,
    /// `false` when input ended before the closing fence.
    pub terminated: bool,
}

/// Find the end of the doc-string opened at `lines[start]`.
///
/// Interior lines are not classified; only a line opening with the same
/// fence closes the block.
pub(crate) fn scan(lines: &[Line<'_>], start: usize, fence: Fence) -> DocStringSpan {
    let close = lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, line)| fence.closes(line.raw))
        .map(|(idx, _)| idx);
    match close {
        Some(idx) => DocStringSpan {
            end: idx + 1,
            terminated: true,
        },
        None => DocStringSpan {
            end: lines.len(),
            terminated: false,
        },
    }
}

/// Remove up to `width` leading whitespace characters from `raw`.
pub(crate) fn dedent(raw: &str, width: usize) -> &str {
    let strip: usize = raw
        .chars()
        .take(width)
        .take_while(|c| c.is_whitespace())
        .map(char::len_utf8)
        .sum();
    raw.get(strip..).unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::classify_source;
    use rstest::rstest;

    #[test]
    fn finds_matching_close() {
        let lines = classify_source("  \"\"\"\n  '''\n  body\n  \"\"\"\nafter");
        let span = scan(&lines, 0, Fence::DoubleQuote);
        assert_eq!(span, DocStringSpan { end: 4, terminated: true });
    }

    #[test]
    fn unterminated_runs_to_end() {
        let lines = classify_source("```\nGiven not a step\n");
        let span = scan(&lines, 0, Fence::Backtick);
        assert_eq!(span, DocStringSpan { end: 3, terminated: false });
    }

    #[rstest]
    #[case("      text", 4, "  text")]
    #[case("  text", 4, "text")]
    #[case("text", 4, "text")]
    #[case("\t\tx", 1, "\tx")]
    fn dedents_by_fence_width(#[case] raw: &str, #[case] width: usize, #[case] expected: &str) {
        assert_eq!(dedent(raw, width), expected);
    }
}
