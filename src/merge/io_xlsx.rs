// Primitives for reading XLSX survey exports.

use std::path::Path;

use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;

use survey_recon::Catalogue;

use crate::merge::{EmptyExcelSnafu, MergeResult, OpeningExcelSnafu, SourceTable};

/// Reads the first worksheet of one XLSX export. The same header-row scan as
/// the CSV reader applies: data starts at the first row mentioning a
/// catalogue question. An empty workbook is an error, which the driver
/// downgrades to a skip.
pub fn read_table(path: &Path, catalogue: &Catalogue) -> MergeResult<SourceTable> {
    let p = path.display().to_string();
    let mut workbook: Xlsx<_> =
        open_workbook(path).context(OpeningExcelSnafu { path: p.clone() })?;
    let wrange = workbook
        .worksheet_range_at(0)
        .context(EmptyExcelSnafu { path: p.clone() })?
        .context(OpeningExcelSnafu { path: p.clone() })?;

    let cells: Vec<Vec<String>> = wrange
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();
    let header_index = cells
        .iter()
        .position(|row| row.iter().any(|c| catalogue.contains_question_text(c)))
        .unwrap_or(0);
    debug!("{:?}: header found at row {}", path, header_index);

    let fieldnames: Vec<String> = cells
        .get(header_index)
        .context(EmptyExcelSnafu { path: p })?
        .clone();
    let rows = cells[header_index + 1..]
        .iter()
        .map(|row| {
            fieldnames
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect()
        })
        .collect();
    Ok(SourceTable { fieldnames, rows })
}

/// Renders one cell the way a text export would: fractionless numbers print
/// without a decimal point.
fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        DataType::DateTime(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        DataType::DateTime(f) => f.to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Bool(b) => b.to_string(),
        DataType::Empty => String::new(),
        DataType::Error(e) => {
            debug!("unreadable cell: {:?}", e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_render_like_a_text_export() {
        assert_eq!(cell_to_string(&DataType::String("так".to_string())), "так");
        assert_eq!(cell_to_string(&DataType::Float(15.0)), "15");
        assert_eq!(cell_to_string(&DataType::Float(3.5)), "3.5");
        assert_eq!(cell_to_string(&DataType::Int(4)), "4");
        assert_eq!(cell_to_string(&DataType::Empty), "");
    }
}
