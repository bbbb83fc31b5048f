//! Recall-oriented n-gram overlap scores.
//!
//! Implements the three overlap metrics used for offline summary quality
//! assessment: unigram recall (ROUGE-1), bigram recall (ROUGE-2), and
//! longest-common-subsequence recall (ROUGE-L). Scores are in `[0, 1]`;
//! with multiple references, each metric takes the best score across them.
//!
//! Tokenization is deliberately simple: lowercase, split on any
//! non-alphanumeric run.

use std::collections::HashMap;

/// The three overlap scores for one prediction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RougeScores {
    pub rouge_1: f64,
    pub rouge_2: f64,
    pub rouge_l: f64,
}

/// Score a prediction against one or more references.
///
/// Empty references (or an empty reference list) score zero.
pub fn compute_rouge(prediction: &str, references: &[String]) -> RougeScores {
    let pred_tokens = tokenize(prediction);

    let mut best = RougeScores::default();
    for reference in references {
        let ref_tokens = tokenize(reference);
        best.rouge_1 = best.rouge_1.max(ngram_recall(&pred_tokens, &ref_tokens, 1));
        best.rouge_2 = best.rouge_2.max(ngram_recall(&pred_tokens, &ref_tokens, 2));
        best.rouge_l = best.rouge_l.max(lcs_recall(&pred_tokens, &ref_tokens));
    }

    best
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// Clipped n-gram recall: matched reference n-grams over total reference
/// n-grams.
fn ngram_recall(prediction: &[String], reference: &[String], n: usize) -> f64 {
    if reference.len() < n {
        return 0.0;
    }

    let mut pred_counts: HashMap<&[String], usize> = HashMap::new();
    for gram in prediction.windows(n) {
        *pred_counts.entry(gram).or_insert(0) += 1;
    }

    let total = reference.len() - n + 1;
    let mut matched = 0usize;
    for gram in reference.windows(n) {
        if let Some(count) = pred_counts.get_mut(gram) {
            if *count > 0 {
                *count -= 1;
                matched += 1;
            }
        }
    }

    matched as f64 / total as f64
}

/// LCS length over reference length.
fn lcs_recall(prediction: &[String], reference: &[String]) -> f64 {
    if reference.is_empty() {
        return 0.0;
    }

    lcs_length(prediction, reference) as f64 / reference.len() as f64
}

fn lcs_length(a: &[String], b: &[String]) -> usize {
    // Single-row DP over b.
    let mut row = vec![0usize; b.len() + 1];

    for token_a in a {
        let mut prev_diag = 0;
        for (j, token_b) in b.iter().enumerate() {
            let current = row[j + 1];
            row[j + 1] = if token_a == token_b {
                prev_diag + 1
            } else {
                row[j + 1].max(row[j])
            };
            prev_diag = current;
        }
    }

    row[b.len()]
}
