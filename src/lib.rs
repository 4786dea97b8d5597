//! OneSeed verse service: uniform verse selection over a precomputed
//! scripture corpus, plus a best-effort verse-of-the-day provider chain.

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

pub use error::{ProviderError, ResolveError};
pub use models::{Manifest, ResolvedVerse, VerseSource};
pub use services::resolver::VerseResolver;
pub use services::selection::SelectionMode;
