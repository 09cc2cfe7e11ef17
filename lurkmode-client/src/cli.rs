//! Command-line argument parsing for lurkmode
//!
//! Uses clap for argument parsing with derive macros.

use clap::Parser;

/// lurkmode - read-only Twitch chat in the terminal
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Channel to join, with or without the leading '#'
    ///
    /// Optional at the parser level so that a missing channel prints the
    /// short usage line instead of clap's error.
    pub channel: Option<String>,

    /// Show message timestamps from the start (toggle with 't')
    #[arg(long, short = 't', default_value_t = false)]
    pub timestamps: bool,

    /// Number of messages kept in the chat view
    #[arg(long, allow_negative_numbers = true)]
    pub history_size: Option<i64>,

    /// Chat server address (host:port)
    #[arg(long, env = "LURKMODE_SERVER")]
    pub server: Option<String>,
}

impl Args {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
