//! # prlist
//!
//! Keeps a list of the GitHub repositories where a user has merged pull
//! requests inside a marked section of a file, typically a profile README.
//!
//! ## Main Components
//!
//! - [`Ignore`]: Which repositories, owners or names to leave out
//! - [`find_merged_pr_repos`]: Walks the search results and orders repositories by latest merge
//! - [`GitHubSearcher`]: The [`SearchService`] backed by the GitHub REST API
//! - [`Format`]: Markdown, HTML list or `<br>`-separated HTML rendering
//! - [`splice`] / [`update_file`]: Rewrites the `<!--START_SECTION:prlist-->` section
//!
//! ## Example
//!
//! ```no_run
//! use prlist_lib::{find_merged_pr_repos, update_file, Format, GitHubSearcher, Ignore};
//!
//! #[tokio::main]
//! async fn main() -> prlist_lib::Result<()> {
//!     let ignore = Ignore::from_spec("torvalds/*");
//!     let searcher = GitHubSearcher::new("https://api.github.com", None)?;
//!
//!     let repos = find_merged_pr_repos(&searcher, "torvalds", &ignore).await?;
//!     let text = Format::Markdown.render("torvalds", &repos);
//!     update_file("README.md", &text).await?;
//!
//!     Ok(())
//! }
//! ```

mod aggregate;
mod args;
mod github_searcher;
mod ignore;
mod link;
mod render;
mod splice;

// Re-export main components for documentation and external use
pub use crate::aggregate::{find_merged_pr_repos, merged_prs_query, repo_from_api_url};
pub use crate::args::Args;
pub use crate::github_searcher::{GitHubSearcher, SearchHit, SearchPage, SearchService};
pub use crate::ignore::{Ignore, Repo};
pub use crate::link::search_link;
pub use crate::render::{repos_to_br_html, repos_to_html, repos_to_md, Format};
pub use crate::splice::{splice, update_file, END_MARKER, START_MARKER};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
