//! CLI definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// Summer school client - announcements, schedule, lecturers and forum
#[derive(Parser, Debug)]
#[command(name = "summer", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Cache database path (default: ~/.summerschool/data/cache.db)
    #[arg(long, global = true, env = "SUMMER_DB")]
    pub db: Option<PathBuf>,

    /// Settings file path (default: ~/.summerschool/settings.json)
    #[arg(long, global = true, env = "SUMMER_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// API root URL
    #[arg(long, global = true, env = "SUMMER_API_URL")]
    pub api_url: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with the code from your welcome letter
    Login {
        /// Login code (letters and digits)
        code: String,
    },

    /// Show the lock screen again on next launch
    Lock,

    /// Fetch a collection from the server and update the cache
    Refresh {
        /// Collection (announcements, info, events, lecturers, forum)
        collection: String,

        /// Calendar week offset for events (0 = this week)
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        week: i32,

        /// Also download lecturer portraits / thread images
        #[arg(long)]
        images: bool,
    },

    /// Show a cached collection without contacting the server
    List {
        /// Collection (announcements, info, events, lecturers, forum)
        collection: String,
    },

    /// Show the comments of a forum thread
    Comments {
        /// Thread ID
        thread_id: String,
    },

    /// Show login and cache status
    Status,

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
