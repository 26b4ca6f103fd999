// Primitives for reading CSV survey exports.

use std::fs;
use std::path::Path;

use log::debug;
use snafu::prelude::*;

use survey_recon::Catalogue;

use crate::merge::{MergeResult, ParsingCsvSnafu, ReadingFileSnafu, SourceTable};

/// Reads one CSV export. Some exports carry free-form preamble lines above
/// the real header row; parsing starts at the first line that mentions a
/// catalogue question, or at the top of the file when no such line exists.
pub fn read_table(path: &Path, catalogue: &Catalogue) -> MergeResult<SourceTable> {
    let content = fs::read_to_string(path).context(ReadingFileSnafu {
        path: path.display().to_string(),
    })?;
    let lines: Vec<&str> = content.lines().collect();
    let header_index = lines
        .iter()
        .position(|line| catalogue.contains_question_text(line))
        .unwrap_or(0);
    debug!("{:?}: header found at line {}", path, header_index);
    parse_csv(&lines[header_index..].join("\n"), path)
}

fn parse_csv(content: &str, path: &Path) -> MergeResult<SourceTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());
    let fieldnames: Vec<String> = reader
        .headers()
        .context(ParsingCsvSnafu {
            path: path.display().to_string(),
        })?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context(ParsingCsvSnafu {
            path: path.display().to_string(),
        })?;
        // Short records simply lack the trailing columns.
        let row = fieldnames
            .iter()
            .cloned()
            .zip(record.iter().map(|v| v.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(SourceTable { fieldnames, rows })
}
