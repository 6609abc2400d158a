//! Command-line front end for the theme engine.
//!
//! Loads `themekit.toml`, installs logging, registers the configured themes
//! and runs one command against the engine.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
