//! # pacto-oracle
//!
//! Gemini oracle client plus the extraction adapter that turns free text
//! into structured goal lists and progress analyses.

pub mod extract;
pub mod gemini;

pub use extract::{AnalysisItem, Extractor, ProgressAnalysis};
pub use gemini::GeminiOracle;
