// Intelligence module - page and video summaries through a generative text model

pub mod gemini_provider;
pub mod provider;
pub mod summarizer;

pub use gemini_provider::GeminiProvider;
pub use provider::TextGenerator;
pub use summarizer::{Summarizer, Summary, SummaryKind};
