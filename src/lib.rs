//! Turns an API documentation page into a structured description of its
//! endpoints and authentication, plus generated wrapper code and a `.env`
//! template, using a generative model for the semantic extraction.

pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod scraper;
pub mod web;

pub use config::Config;
pub use error::{ConfigError, FetchError, ModelError, PipelineError};
pub use pipeline::Orchestrator;
