use clap::Parser;
use dotenv::dotenv;
use prlist_lib::{find_merged_pr_repos, update_file, Args, GitHubSearcher, Ignore};
use std::env;
use std::error::Error;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // Initialize the tracing logger
    tracing_subscriber::fmt::init();

    dotenv().ok();

    let args = Args::parse();

    // Token from arguments or environment; searching without one is allowed
    let token = match &args.token {
        Some(t) if !t.trim().is_empty() => Some(t.clone()),
        _ => match env::var("GITHUB_TOKEN") {
            Ok(token) if !token.trim().is_empty() => Some(token),
            _ => {
                warn!("No GitHub token provided, searching unauthenticated");
                None
            }
        },
    };

    let ignore = Ignore::from_spec(&args.ignore);
    if ignore.is_empty() {
        debug!("No ignore rules set");
    }
    let searcher = GitHubSearcher::new(&args.api_url, token)?;

    info!("Searching merged pull requests by '{}'", args.user);
    let deadline = Duration::from_secs(args.timeout);
    let result = timeout(deadline, find_merged_pr_repos(&searcher, &args.user, &ignore)).await;

    let repos = match result {
        Ok(Ok(repos)) => {
            searcher.finish(format!("✓ Found {} repositories", repos.len()));
            repos
        }
        Ok(Err(e)) => {
            searcher.finish(format!("✗ Search for '{}' failed", args.user));
            return Err(e);
        }
        Err(_) => {
            searcher.finish(format!("✗ Search for '{}' timed out", args.user));
            error!("Search did not finish within {} seconds", args.timeout);
            return Err(format!("search timed out after {} seconds", args.timeout).into());
        }
    };

    let text = args.format.render(&args.user, &repos);
    let updated = match update_file(&args.file, &text).await {
        Ok(updated) => updated,
        Err(e) => {
            error!("Failed to update '{}': {}", args.file.display(), e);
            return Err(e);
        }
    };
    if updated {
        info!(
            "Wrote {} repositories as {} to '{}'",
            repos.len(),
            args.format,
            args.file.display()
        );
    } else {
        info!("'{}' is already up to date", args.file.display());
    }

    Ok(())
}
