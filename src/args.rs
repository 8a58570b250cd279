use clap::Parser;
use std::path::PathBuf;

use crate::github_searcher::DEFAULT_API_URL;
use crate::render::Format;

/// Keeps a list of repositories with your merged GitHub pull requests inside
/// a marked section of a file such as a profile README.
#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about,
    long_about = "Searches GitHub for merged pull requests by a user and writes the repositories they landed in, most recent first, between <!--START_SECTION:prlist--> and <!--END_SECTION:prlist--> in the target file."
)]
pub struct Args {
    /// File to update. It must contain the prlist section markers.
    #[clap(short, long)]
    pub file: PathBuf,

    /// GitHub user whose merged pull requests are listed.
    #[clap(short, long)]
    pub user: String,

    /// Colon-separated repositories to leave out, e.g. "org/*:*/dotfiles:me/blog".
    #[clap(short, long, default_value = "")]
    pub ignore: String,

    /// Output format of the list.
    #[clap(long, value_enum, default_value_t = Format::Markdown)]
    pub format: Format,

    /// GitHub API token. Falls back to the GITHUB_TOKEN environment variable.
    #[clap(short, long)]
    pub token: Option<String>,

    /// Seconds the whole search may take before giving up.
    #[clap(long, value_name = "SECS", default_value = "300")]
    pub timeout: u64,

    /// GitHub API root to search.
    #[clap(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,
}
