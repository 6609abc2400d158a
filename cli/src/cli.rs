use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "themekit",
    version,
    about = "Resolve templates across layered themes and edit theme files"
)]
pub struct Cli {
    /// Configuration file (default: ./themekit.toml, then the user config dir)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Identity used for previews and file edits
    #[arg(short, long, global = true, default_value = "cli")]
    pub principal: String,

    /// Override the configured logging level
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List themes in resolution order
    Themes {
        /// Include inactive themes, in registration order
        #[arg(long)]
        all: bool,
        /// Print the records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which theme provides a template
    Resolve {
        name: String,
        /// Preview a theme by name (repeatable)
        #[arg(long = "preview", value_name = "THEME")]
        preview: Vec<String>,
        /// Look in the static folder instead of templates
        #[arg(long = "static")]
        static_file: bool,
        /// List every theme providing the file, winner first
        #[arg(long)]
        candidates: bool,
    },

    /// List a folder inside a theme
    Ls {
        theme: String,
        #[arg(default_value = "")]
        path: String,
    },

    /// Print a file from a theme
    Cat { theme: String, path: String },

    /// Create a new file; fails if it already exists
    New {
        theme: String,
        path: String,
        #[command(flatten)]
        source: ContentSource,
    },

    /// Replace a file's content, optionally renaming it
    Edit {
        theme: String,
        path: String,
        /// Save under this path and delete the old file
        #[arg(long, value_name = "PATH")]
        rename: Option<String>,
        #[command(flatten)]
        source: ContentSource,
    },

    /// Delete a file or folder
    Rm { theme: String, path: String },

    /// Copy local files into a theme folder, overwriting existing ones
    Upload {
        theme: String,
        folder: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Create a folder (filesystem storage only)
    Mkdir { theme: String, path: String },
}

/// Where new file content comes from.
#[derive(Debug, Clone, Default, Args)]
#[group(multiple = false)]
pub struct ContentSource {
    /// Literal content
    #[arg(long)]
    pub content: Option<String>,
    /// Read content from a local file
    #[arg(long, value_name = "FILE")]
    pub from: Option<PathBuf>,
}

impl ContentSource {
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.from.is_none()
    }
}
