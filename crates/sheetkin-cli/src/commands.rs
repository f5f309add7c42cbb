//! Subcommand handlers.
//!
//! Handlers write their primary output through the supplied writer so tests
//! can capture it; files named on the command line are written directly.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr, bail};
use sheetkin::pipe_table::{PipeTableOptions, Row, read_rows, render_document};
use sheetkin::{
    ExpandOptions, SheetTable, build_api_sheets, build_sheets, collect_feature_files,
    collect_files, expand_document, read_feature,
};
use tracing::{info, warn};

use crate::cli::{ExpandArgs, SheetArgs, SheetMode, TableArgs};
use crate::config::AppConfig;

/// Write one CSV sheet per feature file, or the parsed features as JSON.
pub(crate) fn run_sheet(args: &SheetArgs, writer: &mut dyn Write) -> Result<()> {
    let files = collect_feature_files(&args.input)
        .wrap_err_with(|| format!("discover feature files under {}", args.input.display()))?;
    if files.is_empty() {
        bail!("no .feature files found under {}", args.input.display());
    }

    if args.json {
        let features = files
            .iter()
            .map(|path| read_feature(path))
            .collect::<Result<Vec<_>, _>>()?;
        serde_json::to_writer_pretty(&mut *writer, &features).wrap_err("serialise features")?;
        writeln!(writer).wrap_err("write output")?;
        return Ok(());
    }

    let tables: Vec<(String, SheetTable)> = match args.mode {
        SheetMode::Standard => build_sheets(&files)?
            .into_iter()
            .map(|sheet| {
                let table = sheet.table();
                (sheet.name, table)
            })
            .collect(),
        SheetMode::Api => build_api_sheets(&files)?
            .into_iter()
            .map(|sheet| {
                let table = sheet.table();
                (sheet.name, table)
            })
            .collect(),
    };
    fs::create_dir_all(&args.out_dir)
        .wrap_err_with(|| format!("create output directory {}", args.out_dir.display()))?;
    for (name, table) in &tables {
        let path = args.out_dir.join(format!("{name}.csv"));
        let file = fs::File::create(&path)
            .wrap_err_with(|| format!("create {}", path.display()))?;
        table
            .write_csv(file)
            .wrap_err_with(|| format!("write {}", path.display()))?;
        writeln!(writer, "{}", path.display()).wrap_err("write output")?;
    }
    info!(
        sheets = tables.len(),
        mode = ?args.mode,
        dir = %args.out_dir.display(),
        "wrote sheets"
    );
    Ok(())
}

/// Where expanded documents go.
#[derive(Debug, PartialEq, Eq)]
enum ExpandTarget<'a> {
    Stdout,
    File(&'a Path),
    Dir(&'a Path),
}

impl<'a> ExpandTarget<'a> {
    /// An existing directory, or a path without a `.feature` extension,
    /// is a directory target.
    fn from_output(output: Option<&'a Path>) -> Self {
        let Some(path) = output else {
            return Self::Stdout;
        };
        let dir_like = if path.exists() {
            path.is_dir()
        } else {
            !path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("feature"))
        };
        if dir_like { Self::Dir(path) } else { Self::File(path) }
    }

    fn write(&self, name: &str, text: &str, writer: &mut dyn Write) -> Result<()> {
        match self {
            Self::Stdout => writer.write_all(text.as_bytes()).wrap_err("write output")?,
            Self::File(path) => write_file(path, text)?,
            Self::Dir(dir) => {
                fs::create_dir_all(dir)
                    .wrap_err_with(|| format!("create output directory {}", dir.display()))?;
                write_file(&dir.join(format!("{name}-expand.feature")), text)?;
            }
        }
        Ok(())
    }
}

/// Expand every Scenario Outline in the given feature files, or in
/// standard input when none are given.
///
/// Inputs that are not files are skipped with a warning.
pub(crate) fn run_expand(
    args: &ExpandArgs,
    config: &AppConfig,
    stdin: &mut dyn Read,
    writer: &mut dyn Write,
) -> Result<()> {
    let options = ExpandOptions {
        inject_background: config.inject_background,
    };
    let target = ExpandTarget::from_output(args.output.as_deref());

    if args.inputs.is_empty() {
        let mut source = String::new();
        stdin
            .read_to_string(&mut source)
            .wrap_err("read standard input")?;
        return target.write("stdin", &expand_document(&source, options), writer);
    }

    if let ExpandTarget::File(path) = &target {
        if args.inputs.len() > 1 {
            bail!(
                "{} names a file but {} inputs were given; pass a directory instead",
                path.display(),
                args.inputs.len()
            );
        }
    }

    let mut expanded = 0_usize;
    for input in &args.inputs {
        if !input.is_file() {
            warn!(path = %input.display(), "skipping input that is not a file");
            continue;
        }
        let source = fs::read_to_string(input)
            .wrap_err_with(|| format!("read {}", input.display()))?;
        let name = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        target.write(&name, &expand_document(&source, options), writer)?;
        expanded += 1;
    }
    if expanded == 0 {
        bail!("no readable feature files among the inputs");
    }
    Ok(())
}

/// Convert CSV files into `Examples:` tables, one `# Sheet:` section per
/// file.
pub(crate) fn run_table(args: &TableArgs, writer: &mut dyn Write) -> Result<()> {
    let mut files: Vec<PathBuf> = args.inputs.clone();
    if let Some(dir) = &args.dir {
        let found = collect_files(dir, "csv", args.recursive)
            .wrap_err_with(|| format!("list CSV files in {}", dir.display()))?;
        files.extend(found);
    }
    if files.is_empty() {
        bail!("no CSV files to convert; name files or pass --dir");
    }

    let sheets = files
        .iter()
        .map(|path| read_sheet(path))
        .collect::<Result<Vec<_>>>()?;
    let options = PipeTableOptions {
        indent: args.indent,
        columns: args.columns.clone(),
        mask: args.mask.clone(),
        no_header: args.no_header,
        table_gap: usize::from(args.table_gap),
    };
    let text = render_document(&sheets, &options);
    info!(files = sheets.len(), "converted CSV files");
    match &args.output {
        Some(path) => write_file(path, &text),
        None => writer.write_all(text.as_bytes()).wrap_err("write output"),
    }
}

fn read_sheet(path: &Path) -> Result<(String, Vec<Row>)> {
    let file = fs::File::open(path).wrap_err_with(|| format!("open {}", path.display()))?;
    let rows = read_rows(file).wrap_err_with(|| format!("read {}", path.display()))?;
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok((name, rows))
}

fn write_file(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).wrap_err_with(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), "wrote output");
    Ok(())
}
