//! Summary composition.
//!
//! Formats a selection of reviews into model input, builds instructions from
//! the prompt template, delegates to the generation provider, and appends a
//! quantitative sentence computed from the selection itself. The narrative
//! part comes from the model; the numbers never do.

use anyhow::{bail, Context, Result};
use rand::Rng;

use crate::config::Config;
use crate::generation;
use crate::models::{RatingTable, SelectedReview};
use crate::profiles::{build_profiles, index_by_user};
use crate::select::{select_reviews, ReviewFilter};

/// The summarization instructions. Policy text, carried verbatim from the
/// retailer engagement; `{group_input}`, `{group_name}` and `{num_sentences}`
/// are substituted at compose time.
const PROMPT_TEMPLATE: &str = r#"You are an expert sommelier, wine-reviewer, and copy-writer.
 You have deep empathy in understanding the nuances of brief individual wine reviews and excel at distilling user reviews into a single coherent, easy-to-understand, summary that respects all user viewpoints and experiences for a given wine or generic category of wine.
 Recently, a large online retailer has employed your wine review summarization services to help them present concise but informative summary reviews that make it easier for prospective customers to choose a wine to purchase.

 In the next message, they will provide you with a list of textual customer reviews about the {group_input}: {group_name}.

 Your task is to write a concise, informative summary review that leverages the key points from all user reviews.

Ensure that your summary:
 - Captures the most common adjectives, themes, praises and criticisms from the provided reviews.
 - Delivers critical aspect and negative sentiments of reviews professionally and without malice.
 - Does not aim to persuade or dissuade, but rather aims to inform.
 - Highlights taste notes, aromas, body, and any unique qualities mentioned.
 - Avoids copying any single review verbatim.
 - Is exactly {num_sentences} long.
 - Does not mention the word "reviews". Simply describe the wine as if you, yourself are reviewing it, pulling details only from that of the reviews you are provided.
 - Mentions the wine category or name in full in the very first sentence of the summary.
"#;

/// Equivalent wordings for the quantitative sentence. The numbers are the
/// contract; the wording is not.
const SUFFIX_TEMPLATES: &[&str] = &[
    "Based on the thoughts of {num_reviews} experienced wine lovers, the wine holds an average rating of {average_points} points out of 100.",
    "Across the tastes of {num_reviews} experienced wine enthusiasts, the wine earns an average rating of {average_points} points out of 100.",
    "Drawing on the opinions of {num_reviews} experienced wine lovers, the wine achieves an average rating of {average_points} points out of 100.",
    "With feedback from {num_reviews} experienced wine enthusiasts, this wine stands at an average rating of {average_points} points out of 100.",
];

/// Requested summary length, mapped to an exact sentence count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryLength {
    Short,
    Medium,
    Long,
}

impl SummaryLength {
    /// Parse the CLI/config selector. Any value outside the three known
    /// selectors is a configuration error.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "short" => Ok(SummaryLength::Short),
            "medium" => Ok(SummaryLength::Medium),
            "long" => Ok(SummaryLength::Long),
            other => bail!(
                "Invalid summary length: '{}'. Use short, medium, or long.",
                other
            ),
        }
    }

    pub fn num_sentences(&self) -> usize {
        match self {
            SummaryLength::Short => 3,
            SummaryLength::Medium => 6,
            SummaryLength::Long => 9,
        }
    }
}

/// Compose a summary for an already-selected set of reviews.
///
/// Rejects an empty selection up front — degenerate input is never sent to
/// the generation service. Issues exactly one generation call.
pub async fn compose(
    config: &Config,
    group_input: &str,
    group_name: &str,
    length: SummaryLength,
    selection: &[SelectedReview],
) -> Result<String> {
    if selection.is_empty() {
        bail!("No reviews to summarize for {}: {}", group_input, group_name);
    }

    // Constructing the provider validates model and credentials before any
    // request goes out.
    let provider = generation::create_provider(&config.generation)?;

    let template = load_template(config)?;
    let instructions = render_instructions(&template, group_input, group_name, length);
    let input = format_reviews(selection);

    let narrative = generation::generate(&config.generation, &instructions, &input)
        .await
        .with_context(|| format!("generation service unavailable ({})", provider.model_name()))?;

    Ok(match quantitative_suffix(selection) {
        Some(suffix) => format!("{}\n\n{}", narrative, suffix),
        None => narrative,
    })
}

fn load_template(config: &Config) -> Result<String> {
    match &config.summary.prompt_template_path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt template: {}", path.display())),
        None => Ok(PROMPT_TEMPLATE.to_string()),
    }
}

/// Substitute the template placeholders.
fn render_instructions(
    template: &str,
    group_input: &str,
    group_name: &str,
    length: SummaryLength,
) -> String {
    template
        .replace("{group_input}", group_input)
        .replace("{group_name}", group_name)
        .replace("{num_sentences}", &length.num_sentences().to_string())
}

/// Format the selection as generation input: `"<name>: <text>"` per review,
/// joined by blank lines.
fn format_reviews(selection: &[SelectedReview]) -> String {
    selection
        .iter()
        .map(|review| format!("{}: {}", review.record.name, review.record.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The deterministic quantitative sentence: review count and the rounded
/// mean of non-null points. Wording is drawn at random from the equivalent
/// templates; `None` when no selected review carries points.
fn quantitative_suffix(selection: &[SelectedReview]) -> Option<String> {
    let average = mean_points(selection)?;
    let template = SUFFIX_TEMPLATES[rand::thread_rng().gen_range(0..SUFFIX_TEMPLATES.len())];

    Some(
        template
            .replace("{num_reviews}", &selection.len().to_string())
            .replace("{average_points}", &average.to_string()),
    )
}

/// Mean of non-null points, rounded half-to-even.
fn mean_points(selection: &[SelectedReview]) -> Option<i64> {
    let points: Vec<i64> = selection.iter().filter_map(|r| r.record.points).collect();
    if points.is_empty() {
        return None;
    }

    let mean = points.iter().sum::<i64>() as f64 / points.len() as f64;
    Some(round_half_to_even(mean) as i64)
}

/// Banker's rounding to the nearest integer.
fn round_half_to_even(x: f64) -> f64 {
    let floor = x.floor();
    let frac = x - floor;
    if (frac - 0.5).abs() < f64::EPSILON {
        if (floor as i64) % 2 == 0 {
            floor
        } else {
            floor + 1.0
        }
    } else {
        x.round()
    }
}

/// CLI entry point for `cellar summarize` — the full pipeline.
///
/// The length selector is validated before anything else; the corpus is
/// loaded and the selection made before the provider is touched, so a
/// degenerate (empty) selection never reaches the network.
pub async fn run_summarize(
    config: &Config,
    query: &str,
    by_name: bool,
    length: &str,
    max_results: Option<usize>,
    seed: Option<u64>,
) -> Result<()> {
    let length = SummaryLength::parse(length)?;

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

    let summary = compose(config, filter.group_input(), query, length, &selection).await?;

    println!("{}", summary);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RatingRecord;

    fn review(name: &str, text: &str, points: Option<i64>) -> SelectedReview {
        SelectedReview {
            record: RatingRecord {
                wine_id: None,
                user_id: Some(1),
                variant: "Merlot".to_string(),
                name: name.to_string(),
                year: None,
                time: None,
                points,
                text: text.to_string(),
            },
            num_reviews: Some(1),
            weeks_as_reviewer: Some(0.0),
        }
    }

    #[test]
    fn test_length_mapping() {
        assert_eq!(SummaryLength::parse("short").unwrap().num_sentences(), 3);
        assert_eq!(SummaryLength::parse("medium").unwrap().num_sentences(), 6);
        assert_eq!(SummaryLength::parse("long").unwrap().num_sentences(), 9);
    }

    #[test]
    fn test_invalid_length_is_config_error() {
        let err = SummaryLength::parse("epic").unwrap_err();
        assert!(err.to_string().contains("Invalid summary length"));
    }

    #[test]
    fn test_render_instructions_substitutes() {
        let rendered = render_instructions(
            PROMPT_TEMPLATE,
            "wine category",
            "Merlot",
            SummaryLength::Medium,
        );
        assert!(rendered.contains("the wine category: Merlot"));
        assert!(rendered.contains("exactly 6"));
        assert!(!rendered.contains("{group_name}"));
        assert!(!rendered.contains("{num_sentences}"));
    }

    #[test]
    fn test_format_reviews_name_prefixed_blank_line_joined() {
        let selection = vec![
            review("Estate A", "plummy", Some(90)),
            review("Estate B", "oaky", Some(88)),
        ];
        assert_eq!(
            format_reviews(&selection),
            "Estate A: plummy\n\nEstate B: oaky"
        );
    }

    #[test]
    fn test_suffix_numeric_content() {
        let selection = vec![
            review("A", "x", Some(88)),
            review("B", "y", Some(92)),
        ];
        let suffix = quantitative_suffix(&selection).unwrap();
        assert!(suffix.contains('2'));
        assert!(suffix.contains("average rating of 90 points out of 100"));
    }

    #[test]
    fn test_suffix_skips_null_points() {
        let selection = vec![
            review("A", "x", Some(88)),
            review("B", "y", None),
            review("C", "z", Some(92)),
        ];
        let suffix = quantitative_suffix(&selection).unwrap();
        // Count is 3, mean over the two non-null values is 90.
        assert!(suffix.contains('3'));
        assert!(suffix.contains("average rating of 90 points"));
    }

    #[test]
    fn test_suffix_omitted_without_points() {
        let selection = vec![review("A", "x", None)];
        assert!(quantitative_suffix(&selection).is_none());
    }

    #[test]
    fn test_round_half_to_even() {
        assert_eq!(round_half_to_even(90.5), 90.0);
        assert_eq!(round_half_to_even(91.5), 92.0);
        assert_eq!(round_half_to_even(90.4), 90.0);
        assert_eq!(round_half_to_even(90.6), 91.0);
        assert_eq!(round_half_to_even(90.0), 90.0);
    }

    #[tokio::test]
    async fn test_compose_rejects_empty_selection() {
        let config = Config::minimal();
        let err = compose(&config, "wine category", "Gamay", SummaryLength::Short, &[])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No reviews to summarize"));
    }

    #[tokio::test]
    async fn test_compose_fails_before_network_when_disabled() {
        // Provider is disabled in the minimal config: the selection passes
        // validation, then the provider layer errors without any request.
        let config = Config::minimal();
        let selection = vec![review("A", "x", Some(90))];
        let err = compose(
            &config,
            "wine category",
            "Merlot",
            SummaryLength::Short,
            &selection,
        )
        .await
        .unwrap_err();
        assert!(format!("{:#}", err).contains("generation service unavailable"));
    }
}
