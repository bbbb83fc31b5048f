//! Review selection: filter, join, rank, sample, truncate.
//!
//! Given a wine category (or a specific wine name), matching rows are joined
//! with their reviewer's profile, ranked by reviewer experience, reduced to
//! one row per reviewer by a seeded draw, and truncated to a bounded count.
//! Fixed seed + fixed input produce a byte-identical selection across runs.

use std::cmp::Ordering;
use std::collections::HashMap;

use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::Config;
use crate::models::{RatingTable, ReviewerProfile, SelectedReview};
use crate::profiles::{build_profiles, index_by_user};

/// What the selection matches against.
///
/// A category query caps the result at one review per reviewer; a name query
/// (a single specific wine) keeps every matching row.
#[derive(Debug, Clone, Copy)]
pub enum ReviewFilter<'a> {
    Variant(&'a str),
    Name(&'a str),
}

impl ReviewFilter<'_> {
    pub fn query(&self) -> &str {
        match self {
            ReviewFilter::Variant(q) | ReviewFilter::Name(q) => q,
        }
    }

    /// Prompt noun for the composer: a category is summarized as a
    /// "wine category", a single wine as a "wine".
    pub fn group_input(&self) -> &'static str {
        match self {
            ReviewFilter::Variant(_) => "wine category",
            ReviewFilter::Name(_) => "wine",
        }
    }
}

/// Select a bounded, reviewer-diverse, reproducible subset of reviews.
///
/// 1. Filter rows case-insensitively on the requested field; no matches is
///    an empty result, not an error.
/// 2. Left-join with reviewer profiles; unprofiled rows carry nulls.
/// 3. Stable sort by (`num_reviews`, `weeks_as_reviewer`, `points`), each
///    descending with nulls last.
/// 4. Category queries only: keep one row per reviewer, chosen by a single
///    RNG seeded with `seed`, consuming one draw per reviewer group in
///    order of first appearance in the sorted sequence. Rows without a user
///    id carry no reviewer identity and are dropped here.
/// 5. Truncate to `max_results`.
pub fn select_reviews(
    table: &RatingTable,
    profiles: &HashMap<i64, &ReviewerProfile>,
    filter: ReviewFilter,
    max_results: usize,
    seed: u64,
) -> Vec<SelectedReview> {
    let query = filter.query().to_lowercase();

    let mut rows: Vec<SelectedReview> = table
        .records
        .iter()
        .filter(|record| {
            let field = match filter {
                ReviewFilter::Variant(_) => &record.variant,
                ReviewFilter::Name(_) => &record.name,
            };
            field.to_lowercase() == query
        })
        .map(|record| {
            let profile = record.user_id.and_then(|id| profiles.get(&id));
            SelectedReview {
                record: record.clone(),
                num_reviews: profile.map(|p| p.num_reviews),
                weeks_as_reviewer: profile.map(|p| p.weeks_as_reviewer),
            }
        })
        .collect();

    rows.sort_by(rank_ordering);

    let mut rows = match filter {
        ReviewFilter::Variant(_) => sample_one_per_user(rows, seed),
        ReviewFilter::Name(_) => rows,
    };

    rows.truncate(max_results);
    rows
}

/// Composite ranking: `num_reviews` desc, `weeks_as_reviewer` desc,
/// `points` desc, nulls last at every key.
fn rank_ordering(a: &SelectedReview, b: &SelectedReview) -> Ordering {
    desc_nulls_last(a.num_reviews, b.num_reviews)
        .then_with(|| desc_nulls_last_f64(a.weeks_as_reviewer, b.weeks_as_reviewer))
        .then_with(|| desc_nulls_last(a.record.points, b.record.points))
}

fn desc_nulls_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn desc_nulls_last_f64(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Reduce sorted rows to one per reviewer.
///
/// Groups keep the sorted sequence's first-appearance order; the kept row
/// within each group is a uniform draw from one RNG seeded per call, so the
/// choice is stable for a fixed seed and input ordering.
fn sample_one_per_user(rows: Vec<SelectedReview>, seed: u64) -> Vec<SelectedReview> {
    let mut group_order: Vec<i64> = Vec::new();
    let mut groups: HashMap<i64, Vec<SelectedReview>> = HashMap::new();

    for row in rows {
        let Some(user_id) = row.record.user_id else {
            continue;
        };
        let group = groups.entry(user_id).or_insert_with(|| {
            group_order.push(user_id);
            Vec::new()
        });
        group.push(row);
    }

    let mut rng = StdRng::seed_from_u64(seed);

    group_order
        .into_iter()
        .map(|user_id| {
            let mut group = groups.remove(&user_id).unwrap();
            let pick = rng.gen_range(0..group.len());
            group.swap_remove(pick)
        })
        .collect()
}

/// CLI entry point for `cellar reviews` — print a selection without
/// generating a summary.
pub async fn run_reviews(
    config: &Config,
    query: &str,
    by_name: bool,
    max_results: Option<usize>,
    seed: Option<u64>,
) -> Result<()> {
    let table = RatingTable::load(&config.corpus.path)?;
    let profiles = build_profiles(&table);
    let profile_index = index_by_user(&profiles);

    let filter = if by_name {
        ReviewFilter::Name(query)
    } else {
        ReviewFilter::Variant(query)
    };

    let selection = select_reviews(
        &table,
        &profile_index,
        filter,
        max_results.unwrap_or(config.selection.max_results),
        seed.unwrap_or(config.selection.seed),
    );

    if selection.is_empty() {
        println!("No reviews.");
        return Ok(());
    }

    for (i, review) in selection.iter().enumerate() {
        let user = review
            .record
            .user_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        let points = review
            .record
            .points
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        let experience = match (review.num_reviews, review.weeks_as_reviewer) {
            (Some(n), Some(w)) => format!("{} reviews over {:.1} weeks", n, w),
            _ => "unprofiled".to_string(),
        };

        println!("{}. [{} pts] user {} ({})", i + 1, points, user, experience);
        println!("    {}", excerpt(&review.record.text, 160));
        println!();
    }
    println!("{} reviews selected", selection.len());

    Ok(())
}

fn excerpt(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    let flat = flat.trim();
    if flat.chars().count() <= max_chars {
        return flat.to_string();
    }
    let cut: String = flat.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}
