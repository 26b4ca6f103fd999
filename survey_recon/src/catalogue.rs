// ********* Reference data structures ***********

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;

/// Placeholder written in place of any missing or empty answer.
pub const MISSING: &str = "NA";

/// Minimum similarity (0-100 scale) for a column header to claim a standard question.
pub const STANDARD_THRESHOLD: f64 = 52.0;

/// Minimum similarity (0-100 scale) for a column header to be linked to a
/// priority question. Priority questions tend to be short and easily confused
/// with each other, hence the much stricter bar.
pub const PRIORITY_THRESHOLD: f64 = 95.0;

/// Name of the source column holding the submission date, when present.
pub const DATE_COLUMN: &str = "Date";

/// Errors that prevent the catalogue from being assembled.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum CatalogueErrors {
    /// A question appears in both the standard and the priority set.
    OverlappingSets(String),
    /// A question referenced by a label or normalizer override is not part of
    /// the relevant set.
    UnknownQuestion(String),
}

impl Error for CatalogueErrors {}

impl Display for CatalogueErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogueErrors::OverlappingSets(q) => {
                write!(
                    f,
                    "question {:?} appears in both the standard and the priority sets",
                    q
                )
            }
            CatalogueErrors::UnknownQuestion(q) => {
                write!(f, "question {:?} is not part of the catalogue", q)
            }
        }
    }
}

/// The immutable set of canonical questions that every source file is
/// reconciled against.
///
/// The two sets are disjoint. Iteration order is the insertion order and is
/// stable for the lifetime of the catalogue: the output column order of the
/// aggregate dataset depends on it.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Catalogue {
    standard: Vec<String>,
    priority: Vec<String>,
    display_labels: HashMap<String, String>,
    hyphen_stripped: Option<String>,
}

impl Catalogue {
    pub fn new(
        standard: Vec<String>,
        priority: Vec<String>,
    ) -> Result<Catalogue, CatalogueErrors> {
        for q in priority.iter() {
            if standard.contains(q) {
                return Err(CatalogueErrors::OverlappingSets(q.clone()));
            }
        }
        Ok(Catalogue {
            standard,
            priority,
            display_labels: HashMap::new(),
            hyphen_stripped: None,
        })
    }

    /// Registers an output label for a priority question. Questions without a
    /// label are written out under their own identifier.
    pub fn with_display_label(
        mut self,
        question: &str,
        label: &str,
    ) -> Result<Catalogue, CatalogueErrors> {
        if !self.priority.iter().any(|q| q == question) {
            return Err(CatalogueErrors::UnknownQuestion(question.to_string()));
        }
        self.display_labels
            .insert(question.to_string(), label.to_string());
        Ok(self)
    }

    /// Designates the standard question whose answers pass through the
    /// hyphen-stripping normalizer variant.
    pub fn with_hyphen_stripping(
        mut self,
        question: &str,
    ) -> Result<Catalogue, CatalogueErrors> {
        if !self.standard.iter().any(|q| q == question) {
            return Err(CatalogueErrors::UnknownQuestion(question.to_string()));
        }
        self.hyphen_stripped = Some(question.to_string());
        Ok(self)
    }

    pub fn standard(&self) -> &[String] {
        &self.standard
    }

    pub fn priority(&self) -> &[String] {
        &self.priority
    }

    pub fn display_label<'a>(&'a self, question: &'a str) -> &'a str {
        self.display_labels
            .get(question)
            .map(|l| l.as_str())
            .unwrap_or(question)
    }

    pub fn strips_hyphens(&self, question: &str) -> bool {
        self.hyphen_stripped.as_deref() == Some(question)
    }

    /// True when any catalogue question text occurs verbatim in the given
    /// line. The file readers use this to locate the real header row below
    /// free-form preamble junk.
    pub fn contains_question_text(&self, line: &str) -> bool {
        self.standard
            .iter()
            .chain(self.priority.iter())
            .any(|q| line.contains(q.as_str()))
    }
}
