//! Template resolution across layered themes.

pub mod cache;
pub mod resolver;
pub mod types;

pub use cache::ResolutionCache;
pub use resolver::TemplateResolver;
pub use types::{Candidate, ResolvedTemplate, TemplateOrigin};
