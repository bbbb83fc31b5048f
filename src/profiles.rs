//! Reviewer profile aggregation.
//!
//! Groups the rating table by user id and derives per-reviewer engagement
//! metrics: how many reviews the user has written and over how many weeks.
//! Rows without a user id produce no profile. `num_reviews` counts all of a
//! user's rows; the week span is computed over the rows that carry a
//! timestamp.

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::models::{RatingTable, ReviewerProfile};

const SECONDS_PER_WEEK: f64 = 7.0 * 24.0 * 3600.0;

struct Accumulator {
    count: i64,
    first: Option<DateTime<Utc>>,
    last: Option<DateTime<Utc>>,
}

/// Build one profile per distinct non-null user id.
///
/// Profiles are ordered by `num_reviews` descending, ties broken by
/// `weeks_as_reviewer` descending. Selection re-sorts, so this ordering only
/// matters for presentation.
pub fn build_profiles(table: &RatingTable) -> Vec<ReviewerProfile> {
    let mut groups: HashMap<i64, Accumulator> = HashMap::new();

    for record in &table.records {
        let Some(user_id) = record.user_id else {
            continue;
        };

        let acc = groups.entry(user_id).or_insert(Accumulator {
            count: 0,
            first: None,
            last: None,
        });
        acc.count += 1;

        if let Some(time) = record.time {
            acc.first = Some(acc.first.map_or(time, |t| t.min(time)));
            acc.last = Some(acc.last.map_or(time, |t| t.max(time)));
        }
    }

    let mut profiles: Vec<ReviewerProfile> = groups
        .into_iter()
        .map(|(user_id, acc)| ReviewerProfile {
            user_id,
            num_reviews: acc.count,
            weeks_as_reviewer: week_span(acc.first, acc.last),
        })
        .collect();

    profiles.sort_by(|a, b| {
        b.num_reviews.cmp(&a.num_reviews).then(
            b.weeks_as_reviewer
                .partial_cmp(&a.weeks_as_reviewer)
                .unwrap_or(std::cmp::Ordering::Equal),
        )
    });

    profiles
}

/// Index profiles by user id for join lookups.
pub fn index_by_user(profiles: &[ReviewerProfile]) -> HashMap<i64, &ReviewerProfile> {
    profiles.iter().map(|p| (p.user_id, p)).collect()
}

/// Elapsed weeks between two timestamps, rounded to one decimal.
fn week_span(first: Option<DateTime<Utc>>, last: Option<DateTime<Utc>>) -> f64 {
    match (first, last) {
        (Some(first), Some(last)) => {
            let weeks = (last - first).num_seconds() as f64 / SECONDS_PER_WEEK;
            (weeks * 10.0).round() / 10.0
        }
        _ => 0.0,
    }
}

/// CLI entry point for `cellar reviewers` — print the top profiles.
pub async fn run_reviewers(config: &Config, limit: usize) -> Result<()> {
    let table = RatingTable::load(&config.corpus.path)?;
    let profiles = build_profiles(&table);

    if profiles.is_empty() {
        println!("No reviewers.");
        return Ok(());
    }

    println!("{:<12} {:>10} {:>10}", "USER", "REVIEWS", "WEEKS");
    println!("{}", "-".repeat(34));
    for profile in profiles.iter().take(limit) {
        println!(
            "{:<12} {:>10} {:>10.1}",
            profile.user_id, profile.num_reviews, profile.weeks_as_reviewer
        );
    }
    println!();
    println!(
        "{} reviewers ({} shown)",
        profiles.len(),
        profiles.len().min(limit)
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RatingRecord;
    use chrono::TimeZone;

    fn record(user_id: Option<i64>, time_secs: Option<i64>) -> RatingRecord {
        RatingRecord {
            wine_id: None,
            user_id,
            variant: String::new(),
            name: String::new(),
            year: None,
            time: time_secs.map(|s| Utc.timestamp_opt(s, 0).unwrap()),
            points: None,
            text: String::new(),
        }
    }

    const WEEK: i64 = 7 * 24 * 3600;

    #[test]
    fn test_aggregation_counts_and_spans() {
        let table = RatingTable {
            records: vec![
                record(Some(1), Some(0)),
                record(Some(1), Some(WEEK)),
                record(Some(1), Some(2 * WEEK)),
                record(Some(2), Some(1000)),
                record(Some(2), Some(1000)),
            ],
        };

        let profiles = build_profiles(&table);
        assert_eq!(profiles.len(), 2);

        // user 1 ranks first: 3 reviews over exactly 2 weeks
        assert_eq!(profiles[0].user_id, 1);
        assert_eq!(profiles[0].num_reviews, 3);
        assert_eq!(profiles[0].weeks_as_reviewer, 2.0);

        assert_eq!(profiles[1].user_id, 2);
        assert_eq!(profiles[1].num_reviews, 2);
        assert_eq!(profiles[1].weeks_as_reviewer, 0.0);
    }

    #[test]
    fn test_null_user_produces_no_profile() {
        let table = RatingTable {
            records: vec![record(None, Some(0)), record(Some(1), Some(0))],
        };
        let profiles = build_profiles(&table);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].user_id, 1);
    }

    #[test]
    fn test_null_time_counted_but_not_spanned() {
        let table = RatingTable {
            records: vec![
                record(Some(1), Some(0)),
                record(Some(1), None),
                record(Some(1), Some(WEEK)),
            ],
        };
        let profiles = build_profiles(&table);
        assert_eq!(profiles[0].num_reviews, 3);
        assert_eq!(profiles[0].weeks_as_reviewer, 1.0);
    }

    #[test]
    fn test_week_span_rounds_to_one_decimal() {
        let table = RatingTable {
            // 10.25 days = ~1.464 weeks -> 1.5
            records: vec![record(Some(1), Some(0)), record(Some(1), Some(885_600))],
        };
        let profiles = build_profiles(&table);
        assert_eq!(profiles[0].weeks_as_reviewer, 1.5);
    }

    #[test]
    fn test_ordering_ties_broken_by_weeks() {
        let table = RatingTable {
            records: vec![
                record(Some(1), Some(0)),
                record(Some(1), Some(WEEK)),
                record(Some(2), Some(0)),
                record(Some(2), Some(4 * WEEK)),
            ],
        };
        let profiles = build_profiles(&table);
        // Same count; user 2 has the longer span and ranks first.
        assert_eq!(profiles[0].user_id, 2);
        assert_eq!(profiles[1].user_id, 1);
    }
}
