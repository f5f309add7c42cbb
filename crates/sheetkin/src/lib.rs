//! Permissive Gherkin scanning, Scenario Outline expansion and test-case
//! sheets.
//!
//! The crate reads Gherkin-style feature files without validating them
//! against the full grammar. Each line is classified once (see [`line`]),
//! then either:
//!
//! - [`parse_feature`] walks the lines with Feature and Rule scope tracking
//!   and returns [`Scenario`] records carrying their effective tags and
//!   background, which [`rows`] and [`sheet`] turn into test-case sheets; or
//! - [`expand_document`] rewrites the text, replacing every Scenario Outline
//!   with one concrete Scenario per Examples row while keeping the
//!   surrounding layout.
//!
//! [`api`] lays the same scenarios out as API requests instead, with method,
//! endpoint, headers and expected status columns.
//!
//! [`pipe_table`] covers the opposite direction: CSV rows to aligned
//! `Examples:` tables.

pub mod api;
mod docstring;
pub mod discovery;
pub mod error;
pub mod expand;
pub mod keyword;
pub mod line;
pub mod model;
pub mod parser;
pub mod pipe_table;
pub mod placeholder;
pub mod rows;
pub mod sheet;
pub mod tags;

pub use api::{ApiCaseRow, ApiSheet, api_feature_rows, api_scenario_rows};
pub use discovery::{
    build_api_sheets, build_sheets, collect_feature_files, collect_files, read_feature,
};
pub use error::SheetError;
pub use expand::{ExpandOptions, expand_document, expand_outline};
pub use keyword::StepKeyword;
pub use model::{
    Diagnostic, DiagnosticKind, ExamplesBlock, ParsedFeature, Scenario, ScenarioKind, Step,
};
pub use parser::parse_feature;
pub use rows::{TestCaseRow, feature_rows, scenario_rows};
pub use sheet::{Sheet, SheetTable};
