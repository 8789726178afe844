//! Survey table model and persistence.
//!
//! A [`Dataset`] is the ordered set of survey rows read from the input table.
//! Rows are identified by position; the output table has the same schema plus
//! a trailing `feedback` column. Rerunning the generator seeds prior feedback
//! from an existing output file so only unfinished rows are resubmitted.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One survey respondent's row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub hardest_part: String,
    pub most_interesting: String,
    pub most_appealing: String,
    pub help_needed: String,
    #[serde(default)]
    pub feedback: Option<String>,
}

impl Record {
    /// Whether this row already carries a usable feedback value.
    ///
    /// Empty and whitespace-only strings count as absent, so a row that was
    /// interrupted before any content arrived is retried on the next run.
    pub fn has_feedback(&self) -> bool {
        self.feedback
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty())
    }
}

/// Ordered collection of survey rows, mergeable with a prior output table.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Read a table from `path`. Fails if the file is missing or unreadable.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            records.push(row?);
        }
        Ok(Self { records })
    }

    /// Copy feedback values positionally from an existing output table.
    ///
    /// Absent file means a fresh run; an output lacking the feedback column
    /// deserializes with all-`None` feedback. When the two tables differ in
    /// length only the common prefix is seeded. Returns how many rows were
    /// seeded.
    pub fn seed_from_existing(&mut self, path: &Path) -> Result<usize> {
        if !path.exists() {
            return Ok(0);
        }

        let existing = Dataset::load(path)?;
        let mut seeded = 0;
        for (record, prior) in self.records.iter_mut().zip(existing.records) {
            if prior.has_feedback() {
                record.feedback = prior.feedback;
                seeded += 1;
            }
        }
        log::debug!("seeded {seeded} rows from {}", path.display());
        Ok(seeded)
    }

    /// Rewrite the full table at `path`, input schema plus feedback column.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn set_feedback(&mut self, index: usize, feedback: String) {
        self.records[index].feedback = Some(feedback);
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
