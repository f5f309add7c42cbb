//! Scenario records produced by the parser.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::keyword::StepKeyword;
use crate::line::split_cells;
use crate::placeholder::ExampleRow;

/// A step with any attached table or doc-string lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    /// The keyword as written (`And`/`But` kept).
    pub keyword: StepKeyword,
    /// `Given`, `When` or `Then` after resolving conjunctions.
    pub base: StepKeyword,
    /// Step text, followed by `\n`-separated continuation lines.
    pub text: String,
    /// 1-based source line of the step.
    pub line: usize,
    /// Cells of the attached data table, one vector per row.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub table: Vec<Vec<String>>,
    /// Body of the attached doc string, fences excluded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_string: Option<String>,
}

impl Step {
    /// Start a step with no attachments.
    #[must_use]
    pub fn new(keyword: StepKeyword, base: StepKeyword, text: &str, line: usize) -> Self {
        Self {
            keyword,
            base,
            text: text.to_string(),
            line,
            table: Vec::new(),
            doc_string: None,
        }
    }

    /// Append a table or doc-string line to the step text.
    pub fn push_continuation(&mut self, line: &str) {
        self.text.push('\n');
        self.text.push_str(line);
    }

    /// Attach a table row, keeping it in the text as well.
    pub fn push_table_row(&mut self, row: &str) {
        self.push_continuation(row);
        self.table.push(split_cells(row));
    }

    /// Attach doc-string lines, keeping them in the text as well.
    ///
    /// A second doc string on the same step is joined to the first.
    pub fn push_doc_string<'l>(&mut self, lines: impl IntoIterator<Item = &'l str>) {
        let mut body = self.doc_string.take().unwrap_or_default();
        for line in lines {
            self.push_continuation(line);
            if !body.is_empty() {
                body.push('\n');
            }
            body.push_str(line);
        }
        self.doc_string = Some(body);
    }

    /// The step sentence without continuation lines.
    #[must_use]
    pub fn sentence(&self) -> &str {
        self.text.lines().next().unwrap_or_default()
    }
}

/// Whether a scenario is concrete or a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScenarioKind {
    /// `Scenario:` or `Example:`.
    Scenario,
    /// `Scenario Outline:` or `Scenario Template:`.
    Outline,
}

/// One `Examples:` table of an outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExamplesBlock {
    /// Tags declared on the block itself.
    pub tags: Vec<String>,
    /// Header cells in column order.
    pub headers: Vec<String>,
    /// Data rows keyed by header. Short rows are padded with `""`.
    pub rows: Vec<ExampleRow>,
    /// 1-based line of the `Examples:` header.
    pub line: usize,
}

/// A Scenario with everything it inherits from its Feature and Rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scenario {
    /// Originating file, when parsed from disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Concrete scenario or outline.
    pub kind: ScenarioKind,
    /// Title after the header keyword.
    pub name: String,
    /// 1-based line of the header.
    pub line: usize,
    /// Enclosing Feature name; empty before any Feature header.
    pub feature: String,
    /// Tags declared on the Feature.
    pub feature_tags: Vec<String>,
    /// Enclosing Rule name; empty outside a Rule.
    pub rule: String,
    /// Tags declared on the Rule.
    pub rule_tags: Vec<String>,
    /// Tags declared on the Scenario itself.
    pub tags: Vec<String>,
    /// Feature tags, then Rule tags, then own tags. Duplicates are kept.
    pub effective_tags: Vec<String>,
    /// Feature background steps followed by Rule background steps.
    pub background: Vec<Step>,
    /// The scenario's own steps in source order.
    pub steps: Vec<Step>,
    /// Examples tables, in source order. Always empty for plain scenarios.
    pub examples: Vec<ExamplesBlock>,
}

impl Scenario {
    /// Return `true` for Scenario Outlines.
    #[must_use]
    pub fn is_outline(&self) -> bool {
        self.kind == ScenarioKind::Outline
    }
}

/// Non-fatal observation made while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// A tag line ended a Background body and was kept for the next header.
    TagsEndedBackground,
    /// Tags were attached to a Background or left at end of input.
    UnattachedTags,
    /// A table row or doc-string appeared with no step to attach to.
    DroppedContinuation,
    /// An Examples table had fewer than two rows.
    DiscardedExamples,
    /// A doc-string was still open at end of input.
    UnterminatedDocString,
    /// An Examples table followed a plain Scenario and was ignored.
    ExamplesOnPlainScenario,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TagsEndedBackground => "tag line ended background; tags kept for next header",
            Self::UnattachedTags => "tags not attached to any scenario",
            Self::DroppedContinuation => "table or doc string with no preceding step dropped",
            Self::DiscardedExamples => "examples table without data rows discarded",
            Self::UnterminatedDocString => "doc string not closed before end of input",
            Self::ExamplesOnPlainScenario => "examples under a plain scenario ignored",
        })
    }
}

/// A diagnostic with the line it refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// 1-based source line.
    pub line: usize,
    /// What was observed.
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

/// Parse result for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedFeature {
    /// Name of the last Feature header; empty when none was seen.
    pub feature: String,
    /// Scenarios in source order.
    pub scenarios: Vec<Scenario>,
    /// Non-fatal diagnostics in source order.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedFeature {
    /// Record `file` as the origin of every scenario.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        let file = file.into();
        for scenario in &mut self.scenarios {
            scenario.file = Some(file.clone());
        }
        self
    }
}
