//! ATS parseability engine: independent text detectors, the aggregator that
//! scores their findings, and the validator that folds in an optional AI review.

pub mod ai;
pub mod bullets;
pub mod config;
pub mod content;
pub mod experience;
pub mod format;
pub mod handlers;
pub mod length;
pub mod metrics;
pub mod models;
pub mod parseability;
pub mod patterns;
pub mod prompts;
pub mod validator;
