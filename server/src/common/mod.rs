pub mod errors;
pub mod ttl_cache;

pub use errors::{ThemeError, ThemeResult};
pub use ttl_cache::TtlCache;
