//! Fuzzy column-to-question reconciliation engine.
//!
//! Survey exports coming out of different tools never agree on column
//! headers: the same canonical question shows up reworded, truncated or
//! split across several columns. This crate decides, for one file's header
//! list, which columns answer which canonical question, assembles unified
//! output rows from the raw data rows, and keeps per-question coverage
//! statistics across a whole corpus of files.
//!
//! ```
//! use survey_recon::*;
//!
//! let catalogue = Catalogue::new(
//!     vec!["How do you feel about your school?".to_string()],
//!     vec!["Please state your age".to_string()],
//! )?
//! .with_display_label("Please state your age", "Age")?;
//!
//! let headers = vec![
//!     "How do you feel about school?".to_string(),
//!     "Please state your age".to_string(),
//! ];
//! let mapping = map_columns(&catalogue, &headers);
//! assert!(mapping.is_matched("How do you feel about your school?"));
//! assert!(mapping.is_matched("Please state your age"));
//! # Ok::<(), CatalogueErrors>(())
//! ```

mod catalogue;

use log::debug;

use std::collections::HashMap;

pub use crate::catalogue::*;

/// Number of fixed metadata fields at the front of every output row
/// (school, area, district, submission date).
pub const FIXED_FIELDS: usize = 4;

// **** Value normalization ****

/// Canonicalizes one raw cell value into a reporting-safe token.
///
/// A trimmed `"0"` becomes `"1"`: the source surveys reverse-code one scale,
/// and a zero there stands for a positive answer. Anything empty, absent or
/// whitespace-only becomes the [MISSING] sentinel. Everything else is the
/// trimmed text. Total: never fails, never returns an empty string.
pub fn normalize(raw: Option<&str>) -> String {
    match raw {
        Some(s) if s.trim() == "0" => "1".to_string(),
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => MISSING.to_string(),
    }
}

/// Variant of [normalize] for the one question whose answers carry stray
/// hyphens in some exports. The hyphens are dropped first, then the default
/// normalization applies, so a hyphen-only cell still collapses to the
/// sentinel.
pub fn normalize_hyphenless(raw: Option<&str>) -> String {
    match raw {
        Some(s) => normalize(Some(s.replace('-', "").as_str())),
        None => normalize(None),
    }
}

// **** Similarity scoring ****

/// Similarity between a column header and a question text, on a 0-100 scale.
///
/// This is the edit distance normalized by the longer of the two texts. The
/// division is kept in integer terms as long as possible so that threshold
/// comparisons at exactly 52 or 95 behave predictably.
pub fn similarity(header: &str, question: &str) -> f64 {
    let len = header.chars().count().max(question.chars().count());
    if len == 0 {
        return 100.0;
    }
    let distance = strsim::levenshtein(header, question);
    100.0 * (len - distance) as f64 / len as f64
}

fn best_match<'a>(header: &str, questions: &'a [String]) -> Option<(&'a str, f64)> {
    let mut best: Option<(&'a str, f64)> = None;
    for q in questions {
        let score = similarity(header, q);
        // Strictly greater: ties resolve to the first question in catalogue order.
        if best.map(|(_, s)| score > s).unwrap_or(true) {
            best = Some((q.as_str(), score));
        }
    }
    best
}

// **** Column matching ****

/// The per-file mapping from canonical questions to source column names.
///
/// Built once per file from its header list and discarded after the file's
/// rows have been reconciled.
#[derive(Debug, Clone, Default)]
pub struct ColumnMapping {
    standard: HashMap<String, String>,
    priority: HashMap<String, Vec<String>>,
}

impl ColumnMapping {
    /// The source column matched to a standard question, if any.
    pub fn standard_column(&self, question: &str) -> Option<&str> {
        self.standard.get(question).map(|c| c.as_str())
    }

    /// The source columns linked to a priority question, in header-encounter
    /// order. Empty when none qualified.
    pub fn priority_columns(&self, question: &str) -> &[String] {
        self.priority
            .get(question)
            .map(|c| c.as_slice())
            .unwrap_or(&[])
    }

    /// True when the question was found in this file's headers.
    pub fn is_matched(&self, question: &str) -> bool {
        self.standard.contains_key(question)
            || self
                .priority
                .get(question)
                .map(|c| !c.is_empty())
                .unwrap_or(false)
    }
}

/// Computes the best-fit mapping from canonical questions to the given
/// column headers.
///
/// Each header goes through two independent passes: the best-scoring
/// standard question claims it when the score reaches
/// [STANDARD_THRESHOLD], and the best-scoring priority question gets it
/// appended when the score reaches [PRIORITY_THRESHOLD]. A single header
/// may therefore end up registered under a standard question and also
/// linked to a priority question. Headers that clear neither bar are left
/// unmatched without error.
pub fn map_columns(catalogue: &Catalogue, fieldnames: &[String]) -> ColumnMapping {
    let mut mapping = ColumnMapping::default();
    for column in fieldnames {
        if let Some((question, score)) = best_match(column, catalogue.standard()) {
            if score >= STANDARD_THRESHOLD {
                debug!(
                    "column {:?} matched standard question {:?} (score {:.1})",
                    column, question, score
                );
                // A later header above the threshold overwrites an earlier
                // one: last match wins when headers are near-duplicates.
                mapping
                    .standard
                    .insert(question.to_string(), column.clone());
            }
        }
        if let Some((question, score)) = best_match(column, catalogue.priority()) {
            if score >= PRIORITY_THRESHOLD {
                debug!(
                    "column {:?} linked to priority question {:?} (score {:.1})",
                    column, question, score
                );
                mapping
                    .priority
                    .entry(question.to_string())
                    .or_default()
                    .push(column.clone());
            }
        }
    }
    mapping
}

// **** Row reconciliation ****

/// Per-file metadata derived from the file and directory naming convention.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FileMetadata {
    pub school: String,
    pub area: String,
    pub district: String,
}

/// The header row of the aggregate dataset: the fixed metadata fields, then
/// every standard question identifier, then every priority question under
/// its display label, all in catalogue order.
pub fn output_header(catalogue: &Catalogue) -> Vec<String> {
    let mut header: Vec<String> = ["School", "Area", "District", "Submission Date"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.extend(catalogue.standard().iter().cloned());
    header.extend(
        catalogue
            .priority()
            .iter()
            .map(|q| catalogue.display_label(q).to_string()),
    );
    header
}

/// Assembles one output row from a source row and the file's column mapping.
///
/// Standard questions yield the normalized value of their mapped column, or
/// the sentinel when unmapped or absent from the row. Priority questions
/// gather every non-empty value across their mapped columns: none yields the
/// sentinel, a single value passes through directly, and several are
/// rendered as a JSON array string so downstream consumers can recover the
/// list.
///
/// Returns `None` for a dead row, one where every question-derived value is
/// the sentinel: such rows carry no answers and are suppressed from the
/// output entirely.
pub fn reconcile_row(
    catalogue: &Catalogue,
    mapping: &ColumnMapping,
    meta: &FileMetadata,
    row: &HashMap<String, String>,
) -> Option<Vec<String>> {
    let date = match row.get(DATE_COLUMN) {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => MISSING.to_string(),
    };
    let mut out = vec![
        meta.school.clone(),
        meta.area.clone(),
        meta.district.clone(),
        date,
    ];

    for question in catalogue.standard() {
        let raw = mapping
            .standard_column(question)
            .and_then(|column| row.get(column))
            .map(|v| v.as_str());
        let value = if catalogue.strips_hyphens(question) {
            normalize_hyphenless(raw)
        } else {
            normalize(raw)
        };
        out.push(value);
    }

    for question in catalogue.priority() {
        let values: Vec<String> = mapping
            .priority_columns(question)
            .iter()
            .filter_map(|column| row.get(column))
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| normalize(Some(raw)))
            .collect();
        let rendered = match values.len() {
            0 => MISSING.to_string(),
            1 => values[0].clone(),
            _ => serde_json::json!(values).to_string(),
        };
        out.push(rendered);
    }

    if out[FIXED_FIELDS..]
        .iter()
        .all(|v| v == MISSING || v.is_empty())
    {
        return None;
    }
    Some(out)
}

// **** Coverage tracking ****

#[derive(Eq, PartialEq, Debug, Clone, Default)]
struct CoverageRecord {
    match_count: usize,
    missing_files: Vec<String>,
}

/// Process-wide accumulator recording, per canonical question, in how many
/// files it was matched and which files lacked it.
///
/// Owned by the corpus driver and updated exactly once per processed file,
/// after all of that file's rows have been reconciled.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CoverageTracker {
    // Catalogue order, standard questions first.
    records: Vec<(String, CoverageRecord)>,
}

/// One entry of the final coverage report.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CoverageGap {
    pub question: String,
    pub missing_count: usize,
    pub missing_files: Vec<String>,
}

impl CoverageTracker {
    pub fn new(catalogue: &Catalogue) -> CoverageTracker {
        let records = catalogue
            .standard()
            .iter()
            .chain(catalogue.priority().iter())
            .map(|q| (q.clone(), CoverageRecord::default()))
            .collect();
        CoverageTracker { records }
    }

    /// Records one file's matching outcome under the given label.
    pub fn record(&mut self, file_label: &str, mapping: &ColumnMapping) {
        for (question, record) in self.records.iter_mut() {
            if mapping.is_matched(question) {
                record.match_count += 1;
            } else {
                record.missing_files.push(file_label.to_string());
            }
        }
    }

    /// The questions with incomplete coverage, in catalogue order. Empty when
    /// every question was matched in every file.
    pub fn report(&self, total_files: usize) -> Vec<CoverageGap> {
        self.records
            .iter()
            .filter_map(|(question, record)| {
                let missing_count = total_files.saturating_sub(record.match_count);
                if missing_count > 0 {
                    Some(CoverageGap {
                        question: question.clone(),
                        missing_count,
                        missing_files: record.missing_files.clone(),
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue() -> Catalogue {
        Catalogue::new(
            vec![
                "What do you think about the future?".to_string(),
                "Who is the elite?".to_string(),
            ],
            vec![
                "Please state your age".to_string(),
                "Please state your gender".to_string(),
            ],
        )
        .unwrap()
        .with_display_label("Please state your age", "Age")
        .unwrap()
        .with_hyphen_stripping("Who is the elite?")
        .unwrap()
    }

    fn row(cells: &[(&str, &str)]) -> HashMap<String, String> {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn meta() -> FileMetadata {
        FileMetadata {
            school: "Lyceum A".to_string(),
            area: "Vinnytsia".to_string(),
            district: "Hmilnyk".to_string(),
        }
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn normalize_collapses_zero() {
        assert_eq!(normalize(Some("0")), "1");
        assert_eq!(normalize(Some("  0  ")), "1");
        // One-directional: a literal one stays a one.
        assert_eq!(normalize(Some("1")), "1");
    }

    #[test]
    fn normalize_is_total() {
        assert_eq!(normalize(None), MISSING);
        assert_eq!(normalize(Some("")), MISSING);
        assert_eq!(normalize(Some("   ")), MISSING);
    }

    #[test]
    fn normalize_trims() {
        assert_eq!(normalize(Some("  yes  ")), "yes");
    }

    #[test]
    fn normalize_is_idempotent_on_normalized_values() {
        for v in ["1", "NA", "yes", "maybe not"] {
            assert_eq!(normalize(Some(v)), v);
            assert_eq!(normalize(Some(normalize(Some(v)).as_str())), v);
        }
    }

    #[test]
    fn normalize_hyphenless_strips_before_trimming() {
        assert_eq!(normalize_hyphenless(Some("-deputies-")), "deputies");
        assert_eq!(normalize_hyphenless(Some(" - the rich - ")), "the rich");
        // Hyphen-only input collapses to the sentinel, not an empty string.
        assert_eq!(normalize_hyphenless(Some("---")), MISSING);
        assert_eq!(normalize_hyphenless(Some("-0-")), "1");
        assert_eq!(normalize_hyphenless(None), MISSING);
    }

    #[test]
    fn similarity_scale() {
        assert_eq!(similarity("abc", "abc"), 100.0);
        assert_eq!(similarity("", ""), 100.0);
        assert_eq!(similarity("", "abcd"), 0.0);
        assert_eq!(similarity("ab", "abcd"), 50.0);
    }

    #[test]
    fn standard_threshold_boundary() {
        let question = "a".repeat(100);
        let catalogue = Catalogue::new(vec![question.clone()], vec![]).unwrap();
        // 48 edits away from a 100-char question: score exactly 52, accepted.
        let at_threshold = format!("{}{}", "a".repeat(52), "b".repeat(48));
        // 49 edits away: score 51, rejected.
        let below_threshold = format!("{}{}", "a".repeat(51), "b".repeat(49));
        assert_eq!(similarity(&at_threshold, &question), 52.0);
        assert_eq!(similarity(&below_threshold, &question), 51.0);

        let mapping = map_columns(&catalogue, &[at_threshold.clone()]);
        assert_eq!(mapping.standard_column(&question), Some(at_threshold.as_str()));

        let mapping = map_columns(&catalogue, &[below_threshold]);
        assert_eq!(mapping.standard_column(&question), None);
    }

    #[test]
    fn priority_threshold_boundary() {
        let question = "a".repeat(100);
        let catalogue = Catalogue::new(vec![], vec![question.clone()]).unwrap();
        let at_threshold = format!("{}{}", "a".repeat(95), "b".repeat(5));
        let below_threshold = format!("{}{}", "a".repeat(94), "b".repeat(6));
        assert_eq!(similarity(&at_threshold, &question), 95.0);
        assert_eq!(similarity(&below_threshold, &question), 94.0);

        let mapping = map_columns(&catalogue, &[at_threshold.clone()]);
        assert_eq!(mapping.priority_columns(&question), &[at_threshold]);

        let mapping = map_columns(&catalogue, &[below_threshold]);
        assert!(mapping.priority_columns(&question).is_empty());
    }

    #[test]
    fn tie_breaks_to_first_question_in_catalogue_order() {
        let catalogue =
            Catalogue::new(vec!["aaab".to_string(), "aaba".to_string()], vec![]).unwrap();
        // "aaaa" is one edit away from both questions.
        let mapping = map_columns(&catalogue, &headers(&["aaaa"]));
        assert_eq!(mapping.standard_column("aaab"), Some("aaaa"));
        assert_eq!(mapping.standard_column("aaba"), None);
    }

    #[test]
    fn header_may_satisfy_both_passes() {
        let catalogue = Catalogue::new(
            vec!["Please state your age bracket".to_string()],
            vec!["Please state your age".to_string()],
        )
        .unwrap();
        let mapping = map_columns(&catalogue, &headers(&["Please state your age"]));
        // The same header clears the standard bar against the long question
        // and matches the priority question exactly.
        assert_eq!(
            mapping.standard_column("Please state your age bracket"),
            Some("Please state your age")
        );
        assert_eq!(
            mapping.priority_columns("Please state your age"),
            &["Please state your age".to_string()]
        );
    }

    #[test]
    fn later_near_duplicate_header_overwrites() {
        let catalogue = catalogue();
        let mapping = map_columns(
            &catalogue,
            &headers(&["Who is the elite?", "Who is the elite??"]),
        );
        assert_eq!(
            mapping.standard_column("Who is the elite?"),
            Some("Who is the elite??")
        );
    }

    #[test]
    fn unmatched_headers_are_silently_dropped() {
        let catalogue = catalogue();
        let mapping = map_columns(&catalogue, &headers(&["Timestamp", "Respondent ID"]));
        for q in catalogue.standard().iter().chain(catalogue.priority()) {
            assert!(!mapping.is_matched(q));
        }
    }

    #[test]
    fn reconcile_assembles_full_row() {
        let catalogue = catalogue();
        let mapping = map_columns(
            &catalogue,
            &headers(&[
                "What do you think about the future?",
                "Who is the elite?",
                "Please state your age",
            ]),
        );
        let row = row(&[
            ("Date", "2024-05-01"),
            ("What do you think about the future?", "0"),
            ("Who is the elite?", "-deputies-"),
            ("Please state your age", "15"),
        ]);
        let out = reconcile_row(&catalogue, &mapping, &meta(), &row).unwrap();
        assert_eq!(
            out,
            vec![
                "Lyceum A",
                "Vinnytsia",
                "Hmilnyk",
                "2024-05-01",
                "1",        // reverse-coded zero
                "deputies", // hyphens stripped
                "15",
                "NA", // gender never matched
            ]
        );
    }

    #[test]
    fn reconcile_defaults_missing_date_to_sentinel() {
        let catalogue = catalogue();
        let mapping = map_columns(&catalogue, &headers(&["Who is the elite?"]));
        let row = row(&[("Who is the elite?", "nobody")]);
        let out = reconcile_row(&catalogue, &mapping, &meta(), &row).unwrap();
        assert_eq!(out[3], MISSING);
    }

    #[test]
    fn reconcile_suppresses_dead_rows() {
        let catalogue = catalogue();
        let mapping = map_columns(&catalogue, &headers(&["Who is the elite?"]));
        // Metadata is populated but every answer is empty.
        let row = row(&[("Date", "2024-05-01"), ("Who is the elite?", "  ")]);
        assert_eq!(reconcile_row(&catalogue, &mapping, &meta(), &row), None);
    }

    #[test]
    fn priority_multiplicity_renders_as_json_array() {
        let catalogue = catalogue();
        let split_a = "Please state your age";
        let split_b = "Please state your age.";
        let mapping = map_columns(&catalogue, &headers(&[split_a, split_b]));
        assert_eq!(
            mapping.priority_columns("Please state your age"),
            &[split_a.to_string(), split_b.to_string()]
        );

        let both = row(&[(split_a, "A"), (split_b, "B")]);
        let out = reconcile_row(&catalogue, &mapping, &meta(), &both).unwrap();
        assert_eq!(out[6], r#"["A","B"]"#);
        // Round trip back to the list of values.
        let recovered: Vec<String> = serde_json::from_str(&out[6]).unwrap();
        assert_eq!(recovered, vec!["A", "B"]);

        // A single surviving value passes through directly.
        let one = row(&[(split_a, "A")]);
        let out = reconcile_row(&catalogue, &mapping, &meta(), &one).unwrap();
        assert_eq!(out[6], "A");

        // None surviving yields the sentinel.
        let neither = row(&[(split_a, " "), (split_b, "")]);
        assert_eq!(reconcile_row(&catalogue, &mapping, &meta(), &neither), None);
    }

    #[test]
    fn output_header_order_is_catalogue_order() {
        let catalogue = catalogue();
        assert_eq!(
            output_header(&catalogue),
            vec![
                "School",
                "Area",
                "District",
                "Submission Date",
                "What do you think about the future?",
                "Who is the elite?",
                "Age",                      // display label override
                "Please state your gender", // falls back to the identifier
            ]
        );
    }

    #[test]
    fn catalogue_rejects_overlapping_sets() {
        let res = Catalogue::new(
            vec!["Who is the elite?".to_string()],
            vec!["Who is the elite?".to_string()],
        );
        assert_eq!(
            res,
            Err(CatalogueErrors::OverlappingSets(
                "Who is the elite?".to_string()
            ))
        );
    }

    #[test]
    fn catalogue_rejects_overrides_for_unknown_questions() {
        let catalogue = catalogue();
        assert!(catalogue
            .clone()
            .with_display_label("Who is the elite?", "Elite")
            .is_err());
        assert!(catalogue
            .with_hyphen_stripping("Please state your age")
            .is_err());
    }

    #[test]
    fn coverage_accounting() {
        let catalogue = catalogue();
        let mut tracker = CoverageTracker::new(&catalogue);

        let full = map_columns(
            &catalogue,
            &headers(&[
                "What do you think about the future?",
                "Who is the elite?",
                "Please state your age",
                "Please state your gender",
            ]),
        );
        let partial = map_columns(
            &catalogue,
            &headers(&[
                "What do you think about the future?",
                "Please state your age",
                "Please state your gender",
            ]),
        );

        tracker.record("School One", &full);
        tracker.record("School Two", &partial);
        tracker.record("School Three", &full);

        let gaps = tracker.report(3);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].question, "Who is the elite?");
        assert_eq!(gaps[0].missing_count, 1);
        assert_eq!(gaps[0].missing_files, vec!["School Two"]);
    }

    #[test]
    fn coverage_report_is_empty_when_fully_covered() {
        let catalogue = catalogue();
        let mut tracker = CoverageTracker::new(&catalogue);
        let full = map_columns(
            &catalogue,
            &headers(&[
                "What do you think about the future?",
                "Who is the elite?",
                "Please state your age",
                "Please state your gender",
            ]),
        );
        tracker.record("School One", &full);
        assert!(tracker.report(1).is_empty());
    }

    #[test]
    fn coverage_report_follows_catalogue_order() {
        let catalogue = catalogue();
        let mut tracker = CoverageTracker::new(&catalogue);
        tracker.record("School One", &ColumnMapping::default());
        let gaps = tracker.report(1);
        let questions: Vec<&str> = gaps.iter().map(|g| g.question.as_str()).collect();
        assert_eq!(
            questions,
            vec![
                "What do you think about the future?",
                "Who is the elite?",
                "Please state your age",
                "Please state your gender",
            ]
        );
    }
}
