//! Ceviri - Translate to Turkish and auto-evaluate
//!
//! Translates text into Turkish through a pretrained translation model and,
//! when a reference translation is supplied, scores the output with BLEU,
//! BERTScore and COMET.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod language;
pub mod metrics;
pub mod report;
pub mod services;
pub mod translate;
pub mod workflow;
