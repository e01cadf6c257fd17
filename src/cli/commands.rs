//! CLI commands and argument parsing

use crate::discogs::ArtistReleaseSort;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Browse Discogs release listings page by page
#[derive(Parser, Debug)]
#[command(name = "discogs-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Personal access token (overrides config and DISCOGS_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show label details
    Label {
        /// Label id
        id: u64,
    },

    /// List releases, loading further pages as the listing scrolls
    Releases {
        /// Label id (artist id with --artist)
        id: u64,

        /// Treat the id as an artist
        #[arg(long)]
        artist: bool,

        /// Items per page (defaults to the configured value)
        #[arg(long)]
        per_page: Option<u32>,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<u32>,

        /// Sort key (artist listings only)
        #[arg(long)]
        sort: Option<SortKey>,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one record per line)
    Json,
    /// Human-readable output
    Pretty,
}

/// Sort key for artist listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortKey {
    /// Release year
    Year,
    /// Release title
    Title,
    /// Format name
    Format,
}

impl From<SortKey> for ArtistReleaseSort {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::Year => ArtistReleaseSort::Year,
            SortKey::Title => ArtistReleaseSort::Title,
            SortKey::Format => ArtistReleaseSort::Format,
        }
    }
}
