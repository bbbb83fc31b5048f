//! Core data models used throughout Cellar Digest.
//!
//! These types represent the rating records, reviewer profiles, and selection
//! results that flow through the load and selection pipeline.

use chrono::{DateTime, Utc};

/// One customer review of one wine, as parsed from the corpus file.
///
/// Numeric and time columns are nullable: values the corpus carries in a
/// malformed form coerce to `None` at load time rather than failing the load.
/// Text columns default to the empty string when the source block omits them.
#[derive(Debug, Clone)]
pub struct RatingRecord {
    pub wine_id: Option<i64>,
    pub user_id: Option<i64>,
    /// Wine category (e.g. "Cabernet Sauvignon").
    pub variant: String,
    /// Specific wine name.
    pub name: String,
    /// Vintage year.
    pub year: Option<i32>,
    /// Review timestamp, from the corpus' epoch-seconds field.
    pub time: Option<DateTime<Utc>>,
    /// Integer rating, out of 100.
    pub points: Option<i64>,
    /// Free-form review body, HTML-entity-decoded.
    pub text: String,
}

/// The full in-memory collection of rating records.
///
/// Built once at startup from the corpus file and read-only afterwards.
/// Every downstream component borrows it; nothing mutates it.
#[derive(Debug, Clone, Default)]
pub struct RatingTable {
    pub records: Vec<RatingRecord>,
}

impl RatingTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Per-reviewer engagement statistics derived from the rating table.
///
/// One profile per distinct non-null `user_id`; rows without a user id
/// produce no profile.
#[derive(Debug, Clone)]
pub struct ReviewerProfile {
    pub user_id: i64,
    /// Number of records carrying this user id.
    pub num_reviews: i64,
    /// Elapsed weeks between the user's earliest and latest timestamped
    /// review, rounded to one decimal. `0.0` when fewer than two of the
    /// user's rows carry a timestamp.
    pub weeks_as_reviewer: f64,
}

/// One row of a selection result: a matching record joined with its
/// reviewer's profile figures. Both joined columns are null when the row's
/// user has no profile.
#[derive(Debug, Clone)]
pub struct SelectedReview {
    pub record: RatingRecord,
    pub num_reviews: Option<i64>,
    pub weeks_as_reviewer: Option<f64>,
}
