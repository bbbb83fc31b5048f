//! Offline summary evaluation.
//!
//! Scores generated summaries against reference texts with the n-gram
//! overlap metrics from [`crate::rouge`]. Input is a JSONL dataset, one
//! prediction/reference pair per line:
//!
//! ```text
//! {"prediction": "generated summary ...", "references": ["reference ..."]}
//! ```
//!
//! This path never touches the network; it exists for quality assessment of
//! previously generated output.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::rouge::{compute_rouge, RougeScores};

/// One line of the evaluation dataset.
#[derive(Debug, Deserialize)]
pub struct EvalRecord {
    pub prediction: String,
    #[serde(default)]
    pub references: Vec<String>,
}

/// Parse a JSONL dataset file. Blank lines are skipped; a malformed line is
/// an error (the dataset is hand-assembled and small — silently dropping
/// lines would skew the means).
pub fn load_dataset(path: &Path) -> Result<Vec<EvalRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read eval dataset: {}", path.display()))?;

    let mut records = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: EvalRecord = serde_json::from_str(line)
            .with_context(|| format!("Malformed eval record on line {}", lineno + 1))?;
        records.push(record);
    }

    if records.is_empty() {
        bail!("Eval dataset is empty: {}", path.display());
    }

    Ok(records)
}

/// CLI entry point for `cellar eval` — score the dataset and print per-pair
/// and mean scores.
pub async fn run_eval(dataset_path: &Path) -> Result<()> {
    let records = load_dataset(dataset_path)?;

    let mut sums = RougeScores::default();

    println!("{:<6} {:>8} {:>8} {:>8}", "PAIR", "ROUGE-1", "ROUGE-2", "ROUGE-L");
    println!("{}", "-".repeat(34));

    for (i, record) in records.iter().enumerate() {
        let scores = compute_rouge(&record.prediction, &record.references);
        sums.rouge_1 += scores.rouge_1;
        sums.rouge_2 += scores.rouge_2;
        sums.rouge_l += scores.rouge_l;

        println!(
            "{:<6} {:>8.3} {:>8.3} {:>8.3}",
            i + 1,
            scores.rouge_1,
            scores.rouge_2,
            scores.rouge_l
        );
    }

    let n = records.len() as f64;
    println!("{}", "-".repeat(34));
    println!(
        "{:<6} {:>8.3} {:>8.3} {:>8.3}",
        "mean",
        sums.rouge_1 / n,
        sums.rouge_2 / n,
        sums.rouge_l / n
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_dataset_jsonl() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"prediction": "plum and oak", "references": ["plum and oak"]}}"#
        )
        .unwrap();
        writeln!(file).unwrap();
        writeln!(
            file,
            r#"{{"prediction": "bright citrus", "references": ["flint", "bright citrus"]}}"#
        )
        .unwrap();

        let records = load_dataset(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].references.len(), 2);
    }

    #[test]
    fn test_load_dataset_rejects_malformed_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();

        let err = load_dataset(file.path()).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_load_dataset_rejects_empty() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = load_dataset(file.path()).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }
}
