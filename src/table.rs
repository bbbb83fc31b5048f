//! Typed projection of raw corpus records into the rating table.
//!
//! The integer columns (`wineId`, `userId`, `year`, `time`, `points`) use
//! lenient coercion: any value that fails integer parsing becomes null
//! instead of an error, because the upstream corpus is known to contain
//! malformed rows. `time` is interpreted as Unix epoch seconds and converted
//! to an absolute timestamp; out-of-range values also coerce to null. All
//! other columns stay text.
//!
//! Loading is fatal only when the corpus file itself cannot be read.

use anyhow::{Context, Result};
use chrono::DateTime;
use std::path::Path;

use crate::corpus::{parse_records, RawRecord};
use crate::models::{RatingRecord, RatingTable};

impl RatingTable {
    /// Load the corpus file and build the table.
    ///
    /// The file is read as raw bytes and decoded lossily, so undecodable
    /// byte sequences cannot fail the load.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read corpus file: {}", path.display()))?;
        let blob = String::from_utf8_lossy(&bytes);

        Ok(Self::from_blob(&blob))
    }

    /// Build the table from corpus text already in memory.
    pub fn from_blob(blob: &str) -> Self {
        let records = parse_records(blob)
            .into_iter()
            .map(project_record)
            .collect();

        RatingTable { records }
    }
}

/// Project one raw field map into a typed record.
fn project_record(raw: RawRecord) -> RatingRecord {
    RatingRecord {
        wine_id: parse_int(raw.get("wineId")),
        user_id: parse_int(raw.get("userId")),
        variant: text_field(raw.get("variant")),
        name: text_field(raw.get("name")),
        year: parse_int(raw.get("year")).and_then(|y| i32::try_from(y).ok()),
        time: parse_int(raw.get("time")).and_then(|secs| DateTime::from_timestamp(secs, 0)),
        points: parse_int(raw.get("points")),
        text: text_field(raw.get("text")),
    }
}

fn parse_int(value: Option<&String>) -> Option<i64> {
    value.and_then(|v| v.trim().parse::<i64>().ok())
}

fn text_field(value: Option<&String>) -> String {
    value.cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn one_record(blob: &str) -> RatingRecord {
        let table = RatingTable::from_blob(blob);
        assert_eq!(table.len(), 1);
        table.records.into_iter().next().unwrap()
    }

    #[test]
    fn test_typed_projection() {
        let record = one_record(
            "wine/wineId: 12\nwine/name: Ridge Monte Bello\nwine/variant: Cabernet Sauvignon\n\
             wine/year: 2016\nreview/points: 95\nreview/time: 1500000000\nreview/userId: 7\n\
             review/text: Dense and structured.",
        );
        assert_eq!(record.wine_id, Some(12));
        assert_eq!(record.user_id, Some(7));
        assert_eq!(record.variant, "Cabernet Sauvignon");
        assert_eq!(record.name, "Ridge Monte Bello");
        assert_eq!(record.year, Some(2016));
        assert_eq!(record.points, Some(95));
        assert_eq!(record.text, "Dense and structured.");
    }

    #[test]
    fn test_null_coercion_survives_record() {
        let record = one_record("review/points: N/A\nwine/name: Mystery Red");
        assert_eq!(record.points, None);
        assert_eq!(record.name, "Mystery Red");
    }

    #[test]
    fn test_time_zero_is_epoch() {
        let record = one_record("review/time: 0");
        assert_eq!(record.time, Some(Utc.timestamp_opt(0, 0).unwrap()));
    }

    #[test]
    fn test_time_non_numeric_is_null() {
        let record = one_record("review/time: abc");
        assert_eq!(record.time, None);
    }

    #[test]
    fn test_time_out_of_range_is_null() {
        let record = one_record("review/time: 99999999999999999");
        assert_eq!(record.time, None);
    }

    #[test]
    fn test_missing_fields_default() {
        let record = one_record("review/points: 88");
        assert_eq!(record.variant, "");
        assert_eq!(record.user_id, None);
        assert_eq!(record.time, None);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = RatingTable::load(Path::new("/nonexistent/corpus.txt")).unwrap_err();
        assert!(err.to_string().contains("corpus"));
    }
}
