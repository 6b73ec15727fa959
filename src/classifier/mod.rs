// LLM classification: prompt building, provider calls, two-level cache

pub mod cache;
pub mod engine;
pub mod prompt;
pub mod provider;

pub use engine::{Classifier, PreloadStatus};
pub use provider::Provider;
