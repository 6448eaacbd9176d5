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

//! Remote collaborators: the Gemini language model and the Podchaser catalog.

mod gemini;
mod podchaser;
#[cfg(test)]
mod test_support;

pub use gemini::GeminiProvider;
pub use podchaser::PodchaserCatalog;
