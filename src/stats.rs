//! Corpus statistics and health overview.
//!
//! Provides a quick summary of what loaded: record counts, per-column parse
//! coverage, distinct variants and reviewers, and the corpus time span. Used
//! by `cellar stats` to give confidence that the corpus parsed as expected
//! before spending a generation call on it.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::config::Config;
use crate::models::RatingTable;
use crate::profiles::build_profiles;

/// Run the stats command: load the corpus and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let table = RatingTable::load(&config.corpus.path)?;
    let profiles = build_profiles(&table);

    let file_size = std::fs::metadata(&config.corpus.path)
        .map(|m| m.len())
        .unwrap_or(0);

    let distinct_variants: HashSet<&str> = table
        .records
        .iter()
        .map(|r| r.variant.as_str())
        .filter(|v| !v.is_empty())
        .collect();

    let mut earliest: Option<DateTime<Utc>> = None;
    let mut latest: Option<DateTime<Utc>> = None;
    for record in &table.records {
        if let Some(time) = record.time {
            earliest = Some(earliest.map_or(time, |t| t.min(time)));
            latest = Some(latest.map_or(time, |t| t.max(time)));
        }
    }

    println!("Cellar Digest — Corpus Stats");
    println!("============================");
    println!();
    println!("  Corpus:      {}", config.corpus.path.display());
    println!("  Size:        {}", format_bytes(file_size));
    println!();
    println!("  Records:     {}", table.len());
    println!("  Variants:    {}", distinct_variants.len());
    println!("  Reviewers:   {}", profiles.len());
    println!(
        "  Span:        {} .. {}",
        format_date(earliest),
        format_date(latest)
    );

    if !table.is_empty() {
        println!();
        println!("  Column coverage:");
        println!("  {:<12} {:>10} {:>8}", "COLUMN", "NON-NULL", "PCT");
        println!("  {}", "-".repeat(32));

        let total = table.len();
        let columns: [(&str, usize); 5] = [
            ("wineId", count_some(&table, |r| r.wine_id.is_some())),
            ("userId", count_some(&table, |r| r.user_id.is_some())),
            ("year", count_some(&table, |r| r.year.is_some())),
            ("time", count_some(&table, |r| r.time.is_some())),
            ("points", count_some(&table, |r| r.points.is_some())),
        ];
        for (name, non_null) in columns {
            println!(
                "  {:<12} {:>10} {:>7}%",
                name,
                non_null,
                (non_null * 100) / total
            );
        }
    }

    println!();
    Ok(())
}

fn count_some(table: &RatingTable, pred: impl Fn(&crate::models::RatingRecord) -> bool) -> usize {
    table.records.iter().filter(|r| pred(r)).count()
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

fn format_date(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(None), "-");
        let epoch = chrono::DateTime::from_timestamp(0, 0);
        assert_eq!(format_date(epoch), "1970-01-01");
    }
}
