#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod schema;

pub use schema::{
    AgentConfig, AgentsConfig, Config, GEMINI_API_KEY_ENV, GeminiConfig, HttpConfig,
    PODCHASER_API_KEY_ENV, PodchaserConfig, ProvidersConfig,
};
