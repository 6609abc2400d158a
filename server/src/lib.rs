//! # Themekit Server Library
//!
//! Core library for layered themes: picks which theme's copy of a template
//! wins for a given user, and provides path-safe browsing and editing of the
//! files inside each theme.
//!
//! ## Modules
//!
//! - [`storage`] - Storage adapter contract, virtual paths and reference backends
//! - [`registry`] - Theme records and the ordered theme listing
//! - [`preview`] - Per-user preview overrides with expiry
//! - [`resolution`] - Template resolution and its cache
//! - [`file_manager`] - Theme file browser/editor operations
//! - [`engine`] - Facade wiring the components together
//! - [`config`] - Engine configuration
//! - [`validation`] - Path and form validators
//! - [`utils`] - Utility functions and helpers
//! - [`common`] - Error types and shared caches

pub mod common;
pub mod config;
pub mod engine;
pub mod file_manager;
pub mod preview;
pub mod registry;
pub mod resolution;
pub mod storage;
pub mod utils;
pub mod validation;
