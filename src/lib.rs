//! # Cellar Digest
//!
//! Review selection and LLM summarization for flat-file wine tasting corpora.
//!
//! Cellar Digest loads a flat-file corpus of customer wine reviews, derives
//! per-reviewer engagement statistics, selects a bounded, reviewer-diverse,
//! reproducible sample of reviews for a requested wine category, and produces
//! a narrative summary by delegating to an external text-generation service —
//! with a deterministic quantitative sentence computed locally.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌───────────┐   ┌──────────┐
//! │  Corpus   │──▶│ RatingTable │──▶│ Reviewer  │──▶│ Selector  │
//! │  (file)   │   │  (typed)    │   │ Profiles  │   │ rank+samp │
//! └──────────┘   └────────────┘   └───────────┘   └────┬─────┘
//!                                                      │
//!                                                      ▼
//!                                                ┌──────────┐
//!                                                │ Composer  │──▶ summary
//!                                                │ (LLM call)│
//!                                                └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! cellar stats                              # corpus overview
//! cellar reviewers --limit 20               # most engaged reviewers
//! cellar reviews "Cabernet Sauvignon"       # inspect a selection
//! cellar summarize "Cabernet Sauvignon" --length medium
//! cellar eval runs.jsonl                    # offline quality scoring
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`corpus`] | Flat-file record parser |
//! | [`table`] | Typed projection into the rating table |
//! | [`profiles`] | Per-reviewer aggregation |
//! | [`select`] | Ranked, seeded, one-per-reviewer selection |
//! | [`compose`] | Prompt templating and summary assembly |
//! | [`generation`] | Generation provider abstraction |
//! | [`rouge`] | N-gram overlap scoring |
//! | [`eval`] | Offline evaluation command |
//! | [`stats`] | Corpus statistics command |

pub mod compose;
pub mod config;
pub mod corpus;
pub mod eval;
pub mod generation;
pub mod models;
pub mod profiles;
pub mod rouge;
pub mod select;
pub mod stats;
pub mod table;
