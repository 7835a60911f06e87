//! Collageify Library
//!
//! Turns a Spotify listener's top tracks into a square grid of album covers.
//! The crate ships a small web app (OAuth login, a collage builder page and a
//! JSON proxy for the top-tracks endpoint) plus a CLI that renders the same
//! collage to a PNG file.
//!
//! # Modules
//!
//! - `api` - HTTP routes, cookies and page handlers
//! - `cli` - Command-line interface implementations
//! - `collage` - Top-tracks pipeline and renderers
//! - `config` - Configuration management and environment variables
//! - `server` - HTTP server bootstrap
//! - `spotify` - Spotify accounts and Web API client
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//! - `widget` - Single/multi selection button group

pub mod api;
pub mod cli;
pub mod collage;
pub mod config;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;
pub mod widget;

/// A convenient Result type alias for operations that may fail.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green check mark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message and exits the process with status 1.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning in yellow. Execution continues.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
