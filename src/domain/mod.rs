//! Core domain types and logic.

pub mod error;
pub mod series;
pub mod columns;
pub mod frame;
pub mod feature;
pub mod feature_helpers;
pub mod rule;
pub mod rule_parser;
pub mod rule_eval;
pub mod policy;
pub mod signal;
pub mod engine;
pub mod metadata;
pub mod strategy;
pub mod presets;
pub mod config_validation;
