//! Text-mode transform: expand Scenario Outlines in place.
//!
//! The document is re-serialised line by line. Everything except Scenario
//! Outlines is copied verbatim, so the layout of hand-written feature files
//! survives. Outlines become one concrete `Scenario:` per Examples data row.
//!
//! With [`ExpandOptions::inject_background`] set, Background blocks are
//! removed and their lines are copied under every Scenario title in scope
//! instead. This is the layout test-case sheets expect, where each row must
//! stand on its own.

use crate::docstring;
use crate::line::{HeaderKind, Line, LineKind, classify_source, tags_introduce_examples};

mod outline;

pub use outline::expand_outline;

/// Options for [`expand_document`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Inline Feature and Rule Background lines into every Scenario and
    /// drop the Background blocks themselves.
    pub inject_background: bool,
}

/// Expand every Scenario Outline in `source`.
///
/// `\r\n` line endings are normalised and the result always ends with
/// exactly one newline. Without background injection, a document that has
/// no outlines comes back unchanged.
///
/// # Examples
///
/// ```
/// use sheetkin::{expand_document, ExpandOptions};
///
/// let source = "Scenario Outline: Login as <role>\n  Given user is <role>\nExamples:\n  | role |\n  | admin |\n  | guest |";
/// let expanded = expand_document(source, ExpandOptions::default());
/// assert_eq!(
///     expanded,
///     "Scenario: Login as admin\n  Given user is admin\n\nScenario: Login as guest\n  Given user is guest\n"
/// );
/// ```
#[must_use]
pub fn expand_document(source: &str, options: ExpandOptions) -> String {
    let lines = classify_source(source);
    let out = DocumentExpander::new(&lines, options).run();
    let mut text = out.join("\n");
    text.truncate(text.trim_end_matches('\n').len());
    text.push('\n');
    text
}

/// Pop trailing blank lines and push exactly one.
pub(crate) fn ensure_single_trailing_blank(out: &mut Vec<String>) {
    while out.last().is_some_and(|line| line.trim().is_empty()) {
        out.pop();
    }
    out.push(String::new());
}

/// Index one past the Scenario or Outline block starting at `start`.
///
/// The block ends at the next Feature, Rule, Background or Scenario header,
/// or at a tag line that does not introduce an Examples table.
fn block_end(lines: &[Line<'_>], start: usize) -> usize {
    let mut idx = start + 1;
    while let Some(line) = lines.get(idx) {
        match line.kind {
            kind if kind.ends_block() => break,
            LineKind::Tags if !tags_introduce_examples(lines, idx) => break,
            LineKind::DocStringFence(fence) => idx = docstring::scan(lines, idx, fence).end,
            _ => idx += 1,
        }
    }
    idx
}

/// Raw lines of the Background body starting after `start`, blank edges
/// trimmed, and the index one past the body.
fn background_body<'a>(lines: &[Line<'a>], start: usize) -> (Vec<&'a str>, usize) {
    let mut body = Vec::new();
    let mut idx = start + 1;
    while let Some(line) = lines.get(idx) {
        match line.kind {
            LineKind::Header(_) | LineKind::Tags => break,
            LineKind::DocStringFence(fence) => {
                let end = docstring::scan(lines, idx, fence).end;
                body.extend(lines.get(idx..end).unwrap_or_default().iter().map(|l| l.raw));
                idx = end;
            }
            _ => {
                body.push(line.raw);
                idx += 1;
            }
        }
    }
    let first = body.iter().position(|l| !l.trim().is_empty());
    let last = body.iter().rposition(|l| !l.trim().is_empty());
    let trimmed = match (first, last) {
        (Some(first), Some(last)) => body.get(first..=last).map(|kept| kept.to_vec()).unwrap_or_default(),
        _ => Vec::new(),
    };
    (trimmed, idx)
}

struct DocumentExpander<'s, 'a> {
    lines: &'s [Line<'a>],
    pos: usize,
    options: ExpandOptions,
    out: Vec<String>,
    pending_tags: Vec<&'a str>,
    in_rule: bool,
    feature_background: Vec<&'a str>,
    rule_background: Vec<&'a str>,
}

impl<'s, 'a> DocumentExpander<'s, 'a> {
    fn new(lines: &'s [Line<'a>], options: ExpandOptions) -> Self {
        Self {
            lines,
            pos: 0,
            options,
            out: Vec::with_capacity(lines.len()),
            pending_tags: Vec::new(),
            in_rule: false,
            feature_background: Vec::new(),
            rule_background: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<String> {
        while let Some(line) = self.lines.get(self.pos).copied() {
            match line.kind {
                LineKind::Tags => {
                    self.pending_tags.push(line.raw);
                    self.pos += 1;
                }
                LineKind::Header(HeaderKind::Feature) => {
                    self.in_rule = false;
                    self.feature_background.clear();
                    self.rule_background.clear();
                    self.copy_line(line);
                }
                LineKind::Header(HeaderKind::Rule) => {
                    self.in_rule = true;
                    self.rule_background.clear();
                    self.copy_line(line);
                }
                LineKind::Header(HeaderKind::Background) if self.options.inject_background => {
                    self.collect_background();
                }
                LineKind::Header(HeaderKind::Scenario) if self.options.inject_background => {
                    self.inject_into_scenario(line);
                }
                LineKind::Header(HeaderKind::ScenarioOutline) => self.expand_outline_block(),
                LineKind::DocStringFence(fence) => {
                    self.flush_tags();
                    let end = docstring::scan(self.lines, self.pos, fence).end;
                    self.copy_until(end);
                }
                _ => self.copy_line(line),
            }
        }
        self.flush_tags();
        self.out
    }

    fn flush_tags(&mut self) {
        self.out
            .extend(self.pending_tags.drain(..).map(str::to_string));
    }

    fn copy_line(&mut self, line: Line<'a>) {
        self.flush_tags();
        self.out.push(line.raw.to_string());
        self.pos += 1;
    }

    fn copy_until(&mut self, end: usize) {
        let block = self.lines.get(self.pos..end).unwrap_or_default();
        self.out.extend(block.iter().map(|l| l.raw.to_string()));
        self.pos = end;
    }

    fn background(&self) -> Vec<&'a str> {
        if !self.options.inject_background {
            return Vec::new();
        }
        self.feature_background
            .iter()
            .chain(&self.rule_background)
            .copied()
            .collect()
    }

    fn collect_background(&mut self) {
        self.flush_tags();
        let (body, end) = background_body(self.lines, self.pos);
        if self.in_rule {
            self.rule_background = body;
        } else {
            self.feature_background = body;
        }
        self.pos = end;
    }

    fn inject_into_scenario(&mut self, header: Line<'a>) {
        self.flush_tags();
        let end = block_end(self.lines, self.pos);
        self.out.push(header.raw.to_string());
        let background = self.background();
        self.out.extend(background.into_iter().map(str::to_string));
        self.pos += 1;
        self.copy_until(end);
        ensure_single_trailing_blank(&mut self.out);
    }

    fn expand_outline_block(&mut self) {
        let tags = std::mem::take(&mut self.pending_tags);
        let end = block_end(self.lines, self.pos);
        let block = self.lines.get(self.pos..end).unwrap_or_default();
        let background = self.background();
        let expanded = outline::expand_lines(block, &tags, &background);
        self.out.extend(expanded);
        self.pos = end;
    }
}

#[cfg(test)]
mod tests;
