//! Small helpers shared by the file manager and the CLI front end.

pub mod format;

pub use format::human_size;
