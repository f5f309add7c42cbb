//! Scope-tracking parser.
//!
//! A single forward pass over classified lines builds one [`Scenario`]
//! record per Scenario or Scenario Outline. The parser tracks which Feature
//! and Rule are open, the tags waiting for the next header, and the
//! Background steps of both scopes, so every record carries its effective
//! tags and background.
//!
//! The parser never fails. Anything it does not recognise is skipped, and
//! the handful of recoverable surprises are reported as [`Diagnostic`]s.

use tracing::debug;

use crate::docstring;
use crate::keyword::StepKeyword;
use crate::line::{Fence, HeaderKind, Line, LineKind, classify_source, tags_introduce_examples};
use crate::model::{
    Diagnostic, DiagnosticKind, ExamplesBlock, ParsedFeature, Scenario, ScenarioKind, Step,
};

pub(crate) mod examples;

/// Parse a whole document.
///
/// # Examples
///
/// ```
/// use sheetkin::parse_feature;
///
/// let parsed = parse_feature(
///     "@web\nFeature: Login\n  Scenario: ok\n    Given a user\n    And a password\n",
/// );
/// let scenario = &parsed.scenarios[0];
/// assert_eq!(scenario.effective_tags, vec!["@web"]);
/// assert_eq!(scenario.steps[1].base.as_str(), "Given");
/// ```
#[must_use]
pub fn parse_feature(source: &str) -> ParsedFeature {
    let lines = classify_source(source);
    Parser::new(&lines).run()
}

/// Which declarative scope is currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Top,
    InFeature,
    InRule,
}

/// Name, tags and background of a Feature or Rule.
#[derive(Debug, Default)]
struct Scope {
    name: String,
    tags: Vec<String>,
    background: Vec<Step>,
}

/// Steps collected for one Background or Scenario body.
#[derive(Debug, Default)]
struct Body {
    steps: Vec<Step>,
    previous: Option<StepKeyword>,
}

struct Parser<'s, 'a> {
    lines: &'s [Line<'a>],
    pos: usize,
    state: State,
    pending_tags: Vec<String>,
    pending_line: usize,
    feature: Scope,
    rule: Scope,
    parsed: ParsedFeature,
}

impl<'s, 'a> Parser<'s, 'a> {
    fn new(lines: &'s [Line<'a>]) -> Self {
        Self {
            lines,
            pos: 0,
            state: State::Top,
            pending_tags: Vec::new(),
            pending_line: 0,
            feature: Scope::default(),
            rule: Scope::default(),
            parsed: ParsedFeature::default(),
        }
    }

    fn current(&self) -> Option<Line<'a>> {
        self.lines.get(self.pos).copied()
    }

    fn run(mut self) -> ParsedFeature {
        while let Some(line) = self.current() {
            match line.kind {
                LineKind::Tags => {
                    self.push_pending_tags(line);
                    self.pos += 1;
                }
                LineKind::Header(HeaderKind::Feature) => self.open_feature(line),
                LineKind::Header(HeaderKind::Rule) => self.open_rule(line),
                LineKind::Header(HeaderKind::Background) => self.parse_background(line),
                LineKind::Header(HeaderKind::Scenario) => {
                    self.parse_scenario(line, ScenarioKind::Scenario);
                }
                LineKind::Header(HeaderKind::ScenarioOutline) => {
                    self.parse_scenario(line, ScenarioKind::Outline);
                }
                LineKind::DocStringFence(fence) => self.skip_docstring(line, fence),
                _ => self.pos += 1,
            }
        }
        if !self.pending_tags.is_empty() {
            self.diagnose(self.pending_line, DiagnosticKind::UnattachedTags);
        }
        self.parsed
    }

    fn diagnose(&mut self, line: usize, kind: DiagnosticKind) {
        debug!(line, %kind, "parse diagnostic");
        self.parsed.diagnostics.push(Diagnostic { line, kind });
    }

    fn push_pending_tags(&mut self, line: Line<'a>) {
        if self.pending_tags.is_empty() {
            self.pending_line = line.number;
        }
        self.pending_tags.extend(line.tags());
    }

    fn take_pending_tags(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_tags)
    }

    fn open_feature(&mut self, line: Line<'a>) {
        let name = line.header_title().unwrap_or_default().to_string();
        self.parsed.feature.clone_from(&name);
        self.feature = Scope {
            name,
            tags: self.take_pending_tags(),
            background: Vec::new(),
        };
        self.rule = Scope::default();
        self.state = State::InFeature;
        self.pos += 1;
    }

    fn open_rule(&mut self, line: Line<'a>) {
        self.rule = Scope {
            name: line.header_title().unwrap_or_default().to_string(),
            tags: self.take_pending_tags(),
            background: Vec::new(),
        };
        self.state = State::InRule;
        self.pos += 1;
    }

    fn parse_background(&mut self, header: Line<'a>) {
        if !self.pending_tags.is_empty() {
            self.pending_tags.clear();
            self.diagnose(self.pending_line, DiagnosticKind::UnattachedTags);
        }
        self.pos += 1;
        let mut body = Body::default();
        while let Some(line) = self.current() {
            match line.kind {
                LineKind::Header(_) => break,
                LineKind::Tags => {
                    debug!(
                        background = header.number,
                        line = line.number,
                        "tag line ends background scan"
                    );
                    self.diagnose(line.number, DiagnosticKind::TagsEndedBackground);
                    break;
                }
                _ => self.consume_body_line(line, &mut body),
            }
        }
        match self.state {
            State::InRule => self.rule.background = body.steps,
            State::Top | State::InFeature => self.feature.background = body.steps,
        }
    }

    fn parse_scenario(&mut self, header: Line<'a>, kind: ScenarioKind) {
        let tags = self.take_pending_tags();
        self.pos += 1;
        let mut body = Body::default();
        let mut examples: Vec<ExamplesBlock> = Vec::new();
        let mut block_tags: Vec<String> = Vec::new();
        while let Some(line) = self.current() {
            match line.kind {
                other if other.ends_block() => break,
                LineKind::Tags => {
                    if !tags_introduce_examples(self.lines, self.pos) {
                        break;
                    }
                    block_tags.extend(line.tags());
                    self.pos += 1;
                }
                LineKind::Header(HeaderKind::Examples) => {
                    let region = examples::scan_table(self.lines, self.pos + 1);
                    self.pos = region.end;
                    let tags = std::mem::take(&mut block_tags);
                    match examples::build_block(tags, region.rows, line.number) {
                        Some(block) => examples.push(block),
                        None => self.diagnose(line.number, DiagnosticKind::DiscardedExamples),
                    }
                }
                _ => self.consume_body_line(line, &mut body),
            }
        }
        if kind == ScenarioKind::Scenario {
            for block in examples.drain(..) {
                self.diagnose(block.line, DiagnosticKind::ExamplesOnPlainScenario);
            }
        }
        let scenario = self.scenario_record(header, kind, tags, body.steps, examples);
        self.parsed.scenarios.push(scenario);
    }

    fn scenario_record(
        &self,
        header: Line<'a>,
        kind: ScenarioKind,
        tags: Vec<String>,
        steps: Vec<Step>,
        examples: Vec<ExamplesBlock>,
    ) -> Scenario {
        let effective_tags = self
            .feature
            .tags
            .iter()
            .chain(&self.rule.tags)
            .chain(&tags)
            .cloned()
            .collect();
        let background = self
            .feature
            .background
            .iter()
            .chain(&self.rule.background)
            .cloned()
            .collect();
        Scenario {
            file: None,
            kind,
            name: header.header_title().unwrap_or_default().to_string(),
            line: header.number,
            feature: self.feature.name.clone(),
            feature_tags: self.feature.tags.clone(),
            rule: self.rule.name.clone(),
            rule_tags: self.rule.tags.clone(),
            tags,
            effective_tags,
            background,
            steps,
            examples,
        }
    }

    /// Handle one line of a Background or Scenario body and advance.
    fn consume_body_line(&mut self, line: Line<'a>, body: &mut Body) {
        match line.kind {
            LineKind::Step(keyword) => {
                let base = keyword.resolve(&mut body.previous);
                body.steps.push(Step::new(
                    keyword,
                    base,
                    line.step_text().unwrap_or_default(),
                    line.number,
                ));
                self.pos += 1;
            }
            LineKind::TableRow => {
                match body.steps.last_mut() {
                    Some(step) => step.push_table_row(line.content()),
                    None => self.diagnose(line.number, DiagnosticKind::DroppedContinuation),
                }
                self.pos += 1;
            }
            LineKind::DocStringFence(fence) => self.attach_docstring(line, fence, body),
            _ => self.pos += 1,
        }
    }

    fn attach_docstring(&mut self, open: Line<'a>, fence: Fence, body: &mut Body) {
        let span = docstring::scan(self.lines, self.pos, fence);
        let width = open.indent().chars().count();
        let interior_end = if span.terminated { span.end - 1 } else { span.end };
        let interior = self
            .lines
            .get(self.pos + 1..interior_end)
            .unwrap_or_default();
        match body.steps.last_mut() {
            Some(step) => {
                step.push_doc_string(
                    interior
                        .iter()
                        .map(|line| docstring::dedent(line.raw, width)),
                );
            }
            None => self.diagnose(open.number, DiagnosticKind::DroppedContinuation),
        }
        if !span.terminated {
            self.diagnose(open.number, DiagnosticKind::UnterminatedDocString);
        }
        self.pos = span.end;
    }

    fn skip_docstring(&mut self, open: Line<'a>, fence: Fence) {
        let span = docstring::scan(self.lines, self.pos, fence);
        if !span.terminated {
            self.diagnose(open.number, DiagnosticKind::UnterminatedDocString);
        }
        self.pos = span.end;
    }
}
