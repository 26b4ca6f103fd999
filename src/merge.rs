use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use survey_recon::*;

pub mod io_csv;
pub mod io_xlsx;
pub mod questions;

#[derive(Debug, Snafu)]
pub enum MergeError {
    #[snafu(display("No CSV or XLSX survey files found under {path}"))]
    NoInputFiles { path: String },
    #[snafu(display("Error listing directory {path}"))]
    ListingDir {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading file {path}"))]
    ReadingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing CSV content of {path}"))]
    ParsingCsv { source: csv::Error, path: String },
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Workbook {path} has no data"))]
    EmptyExcel { path: String },
    #[snafu(display("File {path} has an unsupported extension"))]
    UnsupportedExtension { path: String },
    #[snafu(display("Error writing the aggregate output {path}"))]
    WritingOutput { source: csv::Error, path: String },
    #[snafu(display("Error flushing the aggregate output {path}"))]
    FlushingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The question catalogue is inconsistent"))]
    InvalidCatalogue { source: CatalogueErrors },
}

pub type MergeResult<T> = Result<T, MergeError>;

/// One parsed source file: the stable header list plus every data row keyed
/// by header. How the bytes turned into this is a format concern of the
/// `io_csv`/`io_xlsx` readers; everything downstream only sees this shape.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SourceTable {
    pub fieldnames: Vec<String>,
    pub rows: Vec<HashMap<String, String>>,
}

const SUPPORTED_EXTENSIONS: [&str; 2] = ["csv", "xlsx"];

// Words removed from the parenthesized group of a file name when deriving
// the district name.
const DISTRICT_WORDS: [&str; 3] = ["район", "raion", "district"];

/// Splits a file stem like `Lyceum A (Hmilnyk raion)` into school and
/// district names. The text before the parenthesized group is the school;
/// the text inside it, minus the district word, is the district. No
/// parentheses means no district.
pub fn parse_school_district(stem: &str) -> (String, String) {
    match stem.find('(') {
        Some(open) => {
            let school = stem[..open].trim().to_string();
            let district = match stem[open + 1..].find(')') {
                Some(close) => strip_district_word(&stem[open + 1..open + 1 + close]),
                None => MISSING.to_string(),
            };
            (school, district)
        }
        None => (stem.trim().to_string(), MISSING.to_string()),
    }
}

fn strip_district_word(raw: &str) -> String {
    let kept: Vec<&str> = raw
        .split_whitespace()
        .filter(|word| {
            let lower = word.to_lowercase();
            !DISTRICT_WORDS.contains(&lower.as_str())
        })
        .collect();
    if kept.is_empty() {
        MISSING.to_string()
    } else {
        kept.join(" ")
    }
}

fn area_name(path: &Path) -> String {
    path.parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn list_data_files(dir: &Path, output: &Path) -> MergeResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).context(ListingDirSnafu { path: display(dir) })?;
    let mut res: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry
            .context(ListingDirSnafu { path: display(dir) })?
            .path();
        if !path.is_file() {
            continue;
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        if !matches!(ext.as_deref(), Some(e) if SUPPORTED_EXTENSIONS.contains(&e)) {
            continue;
        }
        // The aggregate output itself may live under the input root.
        if path.file_name() == output.file_name() {
            continue;
        }
        res.push(path);
    }
    res.sort();
    Ok(res)
}

/// Collects the survey files directly under the root and in its immediate
/// subdirectories. Deeper nesting is intentionally not traversed.
fn discover_files(root: &Path, output: &Path) -> MergeResult<Vec<PathBuf>> {
    let mut files = list_data_files(root, output)?;
    let mut subdirs: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(root).context(ListingDirSnafu { path: display(root) })? {
        let path = entry
            .context(ListingDirSnafu { path: display(root) })?
            .path();
        if path.is_dir() {
            subdirs.push(path);
        }
    }
    subdirs.sort();
    for sub in subdirs {
        files.extend(list_data_files(&sub, output)?);
    }
    Ok(files)
}

fn read_table(path: &Path, catalogue: &Catalogue) -> MergeResult<SourceTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("csv") => io_csv::read_table(path, catalogue),
        Some("xlsx") => io_xlsx::read_table(path, catalogue),
        _ => UnsupportedExtensionSnafu {
            path: display(path),
        }
        .fail(),
    }
}

/// Runs the whole corpus: discovers the survey files, reconciles every file
/// against the question catalogue, writes the unified dataset and logs the
/// coverage report.
pub fn run_merge(root: &Path, output: &Path) -> MergeResult<()> {
    let catalogue = questions::catalogue().context(InvalidCatalogueSnafu {})?;

    let files = discover_files(root, output)?;
    ensure!(
        !files.is_empty(),
        NoInputFilesSnafu {
            path: display(root)
        }
    );

    let mut writer = csv::Writer::from_path(output).context(WritingOutputSnafu {
        path: display(output),
    })?;
    writer
        .write_record(output_header(&catalogue))
        .context(WritingOutputSnafu {
            path: display(output),
        })?;

    let mut tracker = CoverageTracker::new(&catalogue);
    let mut processed: usize = 0;

    for path in &files {
        info!("processing file {:?}", path);
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let (school, district) = parse_school_district(stem);
        let meta = FileMetadata {
            school: school.clone(),
            area: area_name(path),
            district,
        };

        let table = match read_table(path, &catalogue) {
            Ok(t) => t,
            Err(e) => {
                warn!("skipping file {:?}: {}", path, e);
                continue;
            }
        };

        let mapping = map_columns(&catalogue, &table.fieldnames);
        debug!("column mapping for {:?}: {:?}", path, mapping);

        for row in &table.rows {
            if let Some(record) = reconcile_row(&catalogue, &mapping, &meta, row) {
                writer.write_record(&record).context(WritingOutputSnafu {
                    path: display(output),
                })?;
            }
        }

        // Coverage is per file, not per row: one update after the whole file.
        tracker.record(&school, &mapping);
        processed += 1;
    }

    writer.flush().context(FlushingOutputSnafu {
        path: display(output),
    })?;
    info!("aggregate dataset written to {:?}", output);

    let gaps = tracker.report(processed);
    if gaps.is_empty() {
        info!("all questions were found in all files");
    } else {
        // Not necessarily a defect in the inputs: some surveys genuinely skip
        // questions. This is how threshold tuning gets checked.
        for gap in gaps {
            warn!(
                "- {}: not found in {} files ({})",
                gap.question,
                gap.missing_count,
                gap.missing_files.join(", ")
            );
        }
    }
    Ok(())
}
