//! # Workout Ingest
//!
//! Resilient extraction of day-by-day workout schedules from arbitrary,
//! possibly corrupted documents.
//!
//! Given the bytes of a PDF, Word document, or text file that claims to
//! describe a training program, the pipeline produces a structured schedule
//! (days, exercises, sets, reps, rest) with a confidence score. Extraction
//! degrades through ordered fallbacks instead of failing: every input yields
//! a [`ProcessingResult`](models::ProcessingResult), at worst a `manual`
//! placeholder asking for hand entry.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌───────┐   ┌──────────┐   ┌─────────┐   ┌────────┐
//! │  extract   │──▶│ clean │──▶│ classify │──▶│ segment │──▶│  line  │
//! │ pdf/docx/  │   └───────┘   └──────────┘   └─────────┘   └───┬────┘
//! │ raw/name   │                                                │
//! └────────────┘               ┌────────────┐   0 exercises     │
//!                              │ vocabulary │◀──────────────────┤
//!                              └─────┬──────┘                   ▼
//!                                    └──────────────────▶ ┌──────────┐
//!                                                         │ template │
//!                                                         └────┬─────┘
//!                                        ┌─────────────────────┤
//!                                        ▼                     ▼
//!                                   ┌─────────┐          ┌──────────┐
//!                                   │  store  │          │   CLI    │
//!                                   │ SQLite  │          │  (wki)   │
//!                                   └─────────┘          └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! wki init                          # create database
//! wki parse plan.pdf --debug        # print the ProcessingResult as JSON
//! wki import ./programs             # parse and store a directory
//! wki list                          # most recent templates
//! wki get <id>                      # one template, day by day
//! ```
//!
//! ## Library use
//!
//! ```rust
//! use workout_ingest::config::PipelineSettings;
//! use workout_ingest::models::{ExtractionMethod, SourceDocument};
//! use workout_ingest::pipeline::process;
//!
//! let text = "Day 1\nBench Press - 3 sets x 8-10 reps - Rest 90 seconds\n\
//!             Day 2\nSquat - 4 sets x 5 reps - Rest 120 seconds";
//! let doc = SourceDocument::new("plan.txt", text.as_bytes().to_vec());
//! let result = process(&doc, &PipelineSettings::default());
//! assert_eq!(result.method, ExtractionMethod::Pattern);
//! assert_eq!(result.extracted_days, 2);
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`pipeline`] | End-to-end orchestration |
//! | [`strategy`] | Ordered strategy chains and the debug trace |
//! | [`extract`] | Text extraction tiers |
//! | [`clean`] | Noise removal and garbage detection |
//! | [`classify`] | Advisory format classification |
//! | [`segment`] | Day segmentation |
//! | [`line`] | Exercise line grammars and name filter |
//! | [`vocabulary`] | Dictionary and token fallback |
//! | [`template`] | Template assembly and confidence scoring |
//! | [`tables`] | Static heuristic tables |
//! | [`models`] | Core data types |
//! | [`config`] | TOML configuration parsing |
//! | [`store`] | Template store trait, SQLite and in-memory backends |
//! | [`import`] | Concurrent batch import |
//! | [`narrative`] | Optional narrative summaries |
//! | [`progress`] | Import progress reporting |
//! | [`get`] | Template retrieval for the CLI |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod classify;
pub mod clean;
pub mod config;
pub mod db;
pub mod extract;
pub mod get;
pub mod import;
pub mod line;
pub mod migrate;
pub mod models;
pub mod narrative;
pub mod pipeline;
pub mod progress;
pub mod segment;
pub mod store;
pub mod strategy;
pub mod tables;
pub mod template;
pub mod vocabulary;
