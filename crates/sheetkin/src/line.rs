//! Line classification for feature text.
//!
//! Every line of a document is classified exactly once into a [`LineKind`].
//! Both the scope-tracking parser and the outline expander consume the same
//! classified lines, so the keyword rules live in one place.
//!
//! Classification works on the comment-stripped, trimmed line. A comment
//! starts at the first ` #`; a line whose first non-blank character is `#`
//! is a comment line. A line that is already a complete `| ... |` row is
//! never comment-stripped, so cells such as `#fff` or `PR #42` survive. Doc-string interiors are never classified by callers:
//! they track the open fence and only look for the matching close.

use crate::keyword::{ALL_KEYWORDS, StepKeyword};

/// Delimiter that opens or closes a doc-string block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fence {
    /// `"""`
    DoubleQuote,
    /// `'''`
    SingleQuote,
    /// Three backticks.
    Backtick,
}

impl Fence {
    const ALL: [Self; 3] = [Self::DoubleQuote, Self::SingleQuote, Self::Backtick];

    /// Return the literal delimiter text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DoubleQuote => "\"\"\"",
            Self::SingleQuote => "'''",
            Self::Backtick => "```",
        }
    }

    /// Return `true` when `raw` closes a block opened with this fence.
    ///
    /// Only the same delimiter closes a block: a `'''` line inside a `"""`
    /// block is content.
    #[must_use]
    pub fn closes(self, raw: &str) -> bool {
        raw.trim_start().starts_with(self.as_str())
    }
}

/// Declarative header recognised by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    /// `Feature:`
    Feature,
    /// `Rule:`
    Rule,
    /// `Background:`
    Background,
    /// `Scenario:` or its alias `Example:`.
    Scenario,
    /// `Scenario Outline:` or its alias `Scenario Template:`.
    ScenarioOutline,
    /// `Examples:`
    Examples,
}

/// Header keywords, longest aliases first so `Scenario Outline:` is never
/// mistaken for a truncated `Scenario:`.
const HEADERS: [(&str, HeaderKind); 8] = [
    ("Scenario Outline:", HeaderKind::ScenarioOutline),
    ("Scenario Template:", HeaderKind::ScenarioOutline),
    ("Background:", HeaderKind::Background),
    ("Examples:", HeaderKind::Examples),
    ("Scenario:", HeaderKind::Scenario),
    ("Example:", HeaderKind::Scenario),
    ("Feature:", HeaderKind::Feature),
    ("Rule:", HeaderKind::Rule),
];

/// Classification of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Empty or whitespace-only line.
    Blank,
    /// Line whose first non-blank character is `#`.
    Comment,
    /// Line of `@tag` tokens.
    Tags,
    /// A declarative header.
    Header(HeaderKind),
    /// A step opened by one of the step keywords.
    Step(StepKeyword),
    /// A pipe-delimited table row.
    TableRow,
    /// A doc-string delimiter.
    DocStringFence(Fence),
    /// Anything else, such as free-form description text.
    Other,
}

impl LineKind {
    /// Return `true` for headers that end a Scenario or Background body.
    #[must_use]
    pub const fn ends_block(self) -> bool {
        matches!(
            self,
            Self::Header(
                HeaderKind::Feature
                    | HeaderKind::Rule
                    | HeaderKind::Background
                    | HeaderKind::Scenario
                    | HeaderKind::ScenarioOutline
            )
        )
    }

    /// Return `true` for blank and comment lines.
    #[must_use]
    pub const fn is_trivia(self) -> bool {
        matches!(self, Self::Blank | Self::Comment)
    }
}

/// Drop a trailing same-line comment (everything from the first ` #`).
///
/// # Examples
///
/// ```
/// use sheetkin::line::strip_comment;
///
/// assert_eq!(strip_comment("Given a user # flaky"), "Given a user");
/// assert_eq!(strip_comment("Given item #3"), "Given item");
/// assert_eq!(strip_comment("Given a#b"), "Given a#b");
/// ```
#[must_use]
pub fn strip_comment(line: &str) -> &str {
    line.find(" #")
        .and_then(|idx| line.get(..idx))
        .unwrap_or(line)
}

/// Classify one raw line.
///
/// # Examples
///
/// ```
/// use sheetkin::line::{classify, HeaderKind, LineKind};
/// use sheetkin::StepKeyword;
///
/// assert_eq!(classify("  @smoke @p1"), LineKind::Tags);
/// assert_eq!(
///     classify("scenario template: x"),
///     LineKind::Header(HeaderKind::ScenarioOutline)
/// );
/// assert_eq!(classify("    And more # note"), LineKind::Step(StepKeyword::And));
/// assert_eq!(classify("  | a | b |"), LineKind::TableRow);
/// ```
#[must_use]
pub fn classify(raw: &str) -> LineKind {
    let leading = raw.trim_start();
    if leading.starts_with('#') {
        return LineKind::Comment;
    }
    if let Some(fence) = Fence::ALL
        .into_iter()
        .find(|fence| leading.starts_with(fence.as_str()))
    {
        return LineKind::DocStringFence(fence);
    }
    if is_table_row(raw.trim()) {
        return LineKind::TableRow;
    }
    let content = strip_comment(raw).trim();
    if content.is_empty() {
        return LineKind::Blank;
    }
    if is_tag_line(content) {
        return LineKind::Tags;
    }
    if let Some((_, kind)) = match_header(content) {
        return LineKind::Header(kind);
    }
    if is_table_row(content) {
        return LineKind::TableRow;
    }
    if let Some((keyword, _)) = match_step(content) {
        return LineKind::Step(keyword);
    }
    LineKind::Other
}

fn is_tag_line(content: &str) -> bool {
    content
        .strip_prefix('@')
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| !c.is_whitespace())
}

fn is_table_row(content: &str) -> bool {
    content.len() >= 2 && content.starts_with('|') && content.ends_with('|')
}

fn match_header(content: &str) -> Option<(&str, HeaderKind)> {
    HEADERS.into_iter().find_map(|(keyword, kind)| {
        let prefix = content.get(..keyword.len())?;
        if !prefix.eq_ignore_ascii_case(keyword) {
            return None;
        }
        let title = content.get(keyword.len()..).unwrap_or_default().trim();
        Some((title, kind))
    })
}

fn match_step(content: &str) -> Option<(StepKeyword, &str)> {
    ALL_KEYWORDS.into_iter().find_map(|keyword| {
        let rest = content.strip_prefix(keyword.as_str())?;
        let at_boundary = rest
            .chars()
            .next()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_'));
        at_boundary.then(|| (keyword, rest.trim()))
    })
}

/// Split a pipe-delimited row into trimmed cells.
///
/// The outer pipes are optional; `\|` yields a literal pipe and `\\` a
/// literal backslash.
///
/// # Examples
///
/// ```
/// use sheetkin::line::split_cells;
///
/// assert_eq!(split_cells("| role | a\\|b |"), vec!["role", "a|b"]);
/// ```
#[must_use]
pub fn split_cells(row: &str) -> Vec<String> {
    let trimmed = row.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next @ ('|' | '\\')) => current.push(next),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => current.push('\\'),
            },
            '|' => cells.push(std::mem::take(&mut current).trim().to_string()),
            other => current.push(other),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

/// Split source text into lines, normalising `\r\n` to `\n`.
///
/// A trailing newline produces a final empty line, so joining the result
/// with `\n` reproduces the normalised input.
#[must_use]
pub fn split_lines(source: &str) -> Vec<&str> {
    source
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// A raw line together with its 1-based number and classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number in the source.
    pub number: usize,
    /// The line exactly as written (without the newline).
    pub raw: &'a str,
    /// Classification computed by [`classify`].
    pub kind: LineKind,
}

impl<'a> Line<'a> {
    /// Classify `raw` as line `number`.
    #[must_use]
    pub fn new(number: usize, raw: &'a str) -> Self {
        Self {
            number,
            raw,
            kind: classify(raw),
        }
    }

    /// The comment-stripped, trimmed content.
    ///
    /// Complete table rows are returned trimmed but otherwise untouched.
    #[must_use]
    pub fn content(&self) -> &'a str {
        let trimmed = self.raw.trim();
        if is_table_row(trimmed) {
            trimmed
        } else {
            strip_comment(self.raw).trim()
        }
    }

    /// Leading whitespace of the raw line.
    #[must_use]
    pub fn indent(&self) -> &'a str {
        let width = self.raw.len() - self.raw.trim_start().len();
        self.raw.get(..width).unwrap_or_default()
    }

    /// Title text after a header keyword, or `None` for non-header lines.
    #[must_use]
    pub fn header_title(&self) -> Option<&'a str> {
        match self.kind {
            LineKind::Header(_) => match_header(self.content()).map(|(title, _)| title),
            _ => None,
        }
    }

    /// Title text after a header keyword with any trailing comment kept.
    ///
    /// Text mode rewrites headers with this so a `# note` after the title
    /// stays in the output.
    #[must_use]
    pub fn raw_header_title(&self) -> Option<&'a str> {
        match self.kind {
            LineKind::Header(_) => match_header(self.raw.trim()).map(|(title, _)| title),
            _ => None,
        }
    }

    /// Step text after the keyword, or `None` for non-step lines.
    #[must_use]
    pub fn step_text(&self) -> Option<&'a str> {
        match self.kind {
            LineKind::Step(_) => match_step(self.content()).map(|(_, text)| text),
            _ => None,
        }
    }

    /// `@`-prefixed tokens of a tag line, in source order.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        self.content()
            .split_whitespace()
            .filter(|token| token.starts_with('@'))
            .map(str::to_string)
            .collect()
    }
}

/// Classify every line of `source`.
#[must_use]
pub fn classify_source(source: &str) -> Vec<Line<'_>> {
    split_lines(source)
        .into_iter()
        .enumerate()
        .map(|(idx, raw)| Line::new(idx + 1, raw))
        .collect()
}

/// Decide whether the tag line at `idx` opens an Examples block.
///
/// Skips further tag, blank and comment lines; the tags belong to an
/// Examples block when the next significant line is an `Examples:` header.
/// Any other line means the tags belong to the next declarative entity.
#[must_use]
pub fn tags_introduce_examples(lines: &[Line<'_>], idx: usize) -> bool {
    lines
        .iter()
        .skip(idx)
        .find(|line| !matches!(line.kind, LineKind::Tags) && !line.kind.is_trivia())
        .is_some_and(|line| line.kind == LineKind::Header(HeaderKind::Examples))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", LineKind::Blank)]
    #[case("   \t", LineKind::Blank)]
    #[case("  # a comment", LineKind::Comment)]
    #[case("#Feature: hidden", LineKind::Comment)]
    #[case("@wip", LineKind::Tags)]
    #[case("  @smoke @P1 # why", LineKind::Tags)]
    #[case("@ lonely", LineKind::Other)]
    #[case("Feature: Login", LineKind::Header(HeaderKind::Feature))]
    #[case("  feature: lower", LineKind::Header(HeaderKind::Feature))]
    #[case("  Rule: only admins", LineKind::Header(HeaderKind::Rule))]
    #[case("Background:", LineKind::Header(HeaderKind::Background))]
    #[case("  Scenario: a", LineKind::Header(HeaderKind::Scenario))]
    #[case("  Example: a", LineKind::Header(HeaderKind::Scenario))]
    #[case("  Scenario Outline: a", LineKind::Header(HeaderKind::ScenarioOutline))]
    #[case("  SCENARIO TEMPLATE: a", LineKind::Header(HeaderKind::ScenarioOutline))]
    #[case("    Examples:", LineKind::Header(HeaderKind::Examples))]
    #[case("    Given a user", LineKind::Step(StepKeyword::Given))]
    #[case("    When", LineKind::Step(StepKeyword::When))]
    #[case("    Then: done", LineKind::Step(StepKeyword::Then))]
    #[case("    But not this", LineKind::Step(StepKeyword::But))]
    #[case("    Andrew logs in", LineKind::Other)]
    #[case("    given lower case", LineKind::Other)]
    #[case("      | a | b |", LineKind::TableRow)]
    #[case("      | a | b | # trailing", LineKind::TableRow)]
    #[case("      | open", LineKind::Other)]
    #[case("      | #fff |", LineKind::TableRow)]
    #[case("      | PR #42 | open |", LineKind::TableRow)]
    #[case("      \"\"\"", LineKind::DocStringFence(Fence::DoubleQuote))]
    #[case("      '''json", LineKind::DocStringFence(Fence::SingleQuote))]
    #[case("      ```", LineKind::DocStringFence(Fence::Backtick))]
    #[case("  As a user I want things", LineKind::Other)]
    fn classifies_lines(#[case] raw: &str, #[case] expected: LineKind) {
        assert_eq!(classify(raw), expected);
    }

    #[test]
    fn comment_inside_header_is_stripped_before_matching() {
        let line = Line::new(1, "  Scenario: pay # JIRA-1");
        assert_eq!(line.header_title(), Some("pay"));
    }

    #[test]
    fn raw_header_title_keeps_comment() {
        let line = Line::new(1, "  Scenario Outline: pay <n> # JIRA-1 ");
        assert_eq!(line.raw_header_title(), Some("pay <n> # JIRA-1"));
        assert_eq!(line.header_title(), Some("pay <n>"));
    }

    #[test]
    fn hash_inside_table_cell_is_content() {
        let line = Line::new(4, "      | PR #42 | #fff |");
        assert_eq!(line.content(), "| PR #42 | #fff |");
        assert_eq!(split_cells(line.content()), vec!["PR #42", "#fff"]);
    }

    #[test]
    fn header_title_trims_after_colon() {
        let line = Line::new(1, "Scenario Outline:   Login as <role>  ");
        assert_eq!(line.header_title(), Some("Login as <role>"));
    }

    #[test]
    fn step_text_drops_keyword() {
        let line = Line::new(3, "    And the cart has 3 items");
        assert_eq!(line.step_text(), Some("the cart has 3 items"));
        assert_eq!(line.indent(), "    ");
    }

    #[test]
    fn tags_keep_only_at_tokens() {
        let line = Line::new(1, "  @smoke stray @Regression");
        assert_eq!(line.tags(), vec!["@smoke", "@Regression"]);
    }

    #[test]
    fn fence_only_closes_same_type() {
        assert!(Fence::DoubleQuote.closes("   \"\"\""));
        assert!(!Fence::DoubleQuote.closes("   '''"));
        assert!(Fence::SingleQuote.closes("'''"));
    }

    #[test]
    fn split_lines_normalises_crlf() {
        assert_eq!(split_lines("a\r\nb\r\n"), vec!["a", "b", ""]);
    }

    #[rstest]
    #[case("| a | b |", vec!["a", "b"])]
    #[case("|a||c|", vec!["a", "", "c"])]
    #[case("| only |", vec!["only"])]
    #[case("| back\\\\slash |", vec!["back\\slash"])]
    fn splits_cells(#[case] row: &str, #[case] expected: Vec<&str>) {
        assert_eq!(split_cells(row), expected);
    }

    #[test]
    fn tags_followed_by_examples_belong_to_examples() {
        let lines = classify_source("  @fast\n\n  # note\n  @slow\n  Examples:\n");
        assert!(tags_introduce_examples(&lines, 0));
    }

    #[test]
    fn tags_followed_by_scenario_do_not_belong_to_examples() {
        let lines = classify_source("  @fast\n  Scenario: next\n");
        assert!(!tags_introduce_examples(&lines, 0));
    }
}
