// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod config;
pub mod dedupe;
pub mod extract;
pub mod language;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod publish;
pub mod translate;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::config::AppConfig;
pub use crate::pipeline::Pipeline;
pub use crate::publish::{NotePublisher, NoteSink};
pub use crate::translate::{TranslationResult, Translator};
