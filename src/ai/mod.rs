//! AI-powered semantic rating
//!
//! This module asks a language model to rate a rule document for semantic
//! complexity and tooling compatibility. Supports multiple LLM backends
//! (OpenAI, Anthropic, OpenAI-compatible hosts, Ollama) with a BYOK (bring
//! your own key) model: API keys are read from environment variables.
//!
//! The core never depends on a concrete backend. It talks to a
//! [`RatingProvider`], which [`AiClient`] implements and tests stub out.
//!
//! # Environment Variables
//!
//! - `OPENAI_API_KEY`: Required for OpenAI backend
//! - `ANTHROPIC_API_KEY`: Required for Anthropic backend
//!
//! # Example
//!
//! ```rust,ignore
//! use rulegauge::ai::{AiClient, AiConfig, SemanticAnalyzer};
//!
//! let client = AiClient::from_env_with_config(AiConfig::from_semantic(&config.semantic)?)?;
//! let mut analyzer = SemanticAnalyzer::from_config(Box::new(client), &config.semantic);
//! let rating = analyzer.rate_document(&document)?;
//! ```

mod client;
mod prompts;
mod semantic;

pub use client::{AiClient, AiConfig, LlmBackend, Message, Role};
pub use prompts::{truncate_chars, RatingPrompt};
pub use semantic::{parse_rating, Pacer, RatingProvider, SemanticAnalyzer};

use thiserror::Error;

/// Errors that can occur in the AI module
#[derive(Error, Debug)]
pub enum AiError {
    #[error("Missing API key: {env_var} not set. Get your key at {signup_url}")]
    MissingApiKey { env_var: String, signup_url: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

pub type AiResult<T> = Result<T, AiError>;
