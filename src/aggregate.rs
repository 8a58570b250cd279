use reqwest::Url;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

use crate::github_searcher::SearchService;
use crate::ignore::{Ignore, Repo};
use crate::Result;

/// Search query for pull requests by `user` that have been merged.
pub fn merged_prs_query(user: &str) -> String {
    format!("is:pr author:{} is:merged", user)
}

/// Find every repository where `user` has a merged pull request, most
/// recently merged first. Repositories matched by `ignore` are left out.
///
/// Any search error aborts the whole walk.
pub async fn find_merged_pr_repos<S: SearchService>(
    service: &S,
    user: &str,
    ignore: &Ignore,
) -> Result<Vec<Repo>> {
    let query = merged_prs_query(user);
    let mut found: HashMap<Repo, i64> = HashMap::new();
    let mut page: u32 = 1;

    loop {
        let result = match service.search_page(&query, page).await {
            Ok(result) => result,
            Err(e) => {
                error!("Error searching '{}' page {}: {}", query, page, e);
                return Err(e);
            }
        };

        for hit in result.hits {
            let Some(repo) = repo_from_api_url(&hit.repository_url) else {
                debug!("Skipping result with repository URL '{}'", hit.repository_url);
                continue;
            };
            if repo.owner.is_empty() || repo.name.is_empty() {
                debug!("Skipping result with repository URL '{}'", hit.repository_url);
                continue;
            }
            if ignore.matches(&repo) {
                debug!("Ignoring {}", repo);
                continue;
            }
            let Some(merged_at) = hit.merged_at else {
                warn!("Result in {} has no merge time, skipping", repo);
                continue;
            };
            record_merge(&mut found, repo, merged_at);
        }

        match result.next_page {
            Some(next) if next > page => page = next,
            _ => break,
        }
    }

    info!("Found {} repositories with merged pull requests", found.len());
    Ok(sort_by_recency(found))
}

/// Keep the latest merge time seen for `repo`.
pub fn record_merge(found: &mut HashMap<Repo, i64>, repo: Repo, merged_at: i64) {
    found
        .entry(repo)
        .and_modify(|latest| *latest = (*latest).max(merged_at))
        .or_insert(merged_at);
}

/// Order repositories by descending merge time, then by owner and name.
pub fn sort_by_recency(found: HashMap<Repo, i64>) -> Vec<Repo> {
    let mut sorted: Vec<(Repo, i64)> = found.into_iter().collect();
    sorted.sort_by(|(a, a_time), (b, b_time)| b_time.cmp(a_time).then_with(|| a.cmp(b)));
    sorted.into_iter().map(|(repo, _)| repo).collect()
}

/// Parse `https://api.github.com/repos/owner/name` into a [`Repo`].
///
/// The `repos` segment may sit below a prefix such as `/api/v3` on GitHub
/// Enterprise. URLs without a `repos` segment are read as `/owner/name`.
pub fn repo_from_api_url(api_url: &str) -> Option<Repo> {
    let url = Url::parse(api_url).ok()?;
    let parts: Vec<&str> = url.path().trim_start_matches('/').split('/').collect();

    let rest = match parts.iter().position(|p| *p == "repos") {
        Some(at) => &parts[at + 1..],
        None => parts.as_slice(),
    };
    match rest {
        [owner, name, ..] => Some(Repo::new(*owner, *name)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github_searcher::{SearchHit, SearchPage};
    use std::cell::RefCell;

    /// Serves canned pages and records the requests it receives.
    struct FakeSearch {
        pages: Vec<SearchPage>,
        fail_on: Option<u32>,
        requests: RefCell<Vec<(String, u32)>>,
    }

    impl FakeSearch {
        fn new(pages: Vec<Vec<SearchHit>>) -> Self {
            let count = pages.len() as u32;
            let pages = pages
                .into_iter()
                .enumerate()
                .map(|(i, hits)| {
                    let page = i as u32 + 1;
                    SearchPage {
                        hits,
                        next_page: (page < count).then_some(page + 1),
                    }
                })
                .collect();
            FakeSearch {
                pages,
                fail_on: None,
                requests: RefCell::new(Vec::new()),
            }
        }

        fn failing_on(mut self, page: u32) -> Self {
            self.fail_on = Some(page);
            self
        }
    }

    impl SearchService for FakeSearch {
        async fn search_page(&self, query: &str, page: u32) -> Result<SearchPage> {
            self.requests.borrow_mut().push((query.to_string(), page));
            if self.fail_on == Some(page) {
                return Err("connection reset".into());
            }
            Ok(self.pages[(page - 1) as usize].clone())
        }
    }

    fn hit(owner: &str, name: &str, merged_at: i64) -> SearchHit {
        SearchHit {
            repository_url: format!("https://api.github.com/repos/{}/{}", owner, name),
            merged_at: Some(merged_at),
        }
    }

    fn repos(list: &[(&str, &str)]) -> Vec<Repo> {
        list.iter().map(|(o, n)| Repo::new(*o, *n)).collect()
    }

    #[tokio::test]
    async fn orders_by_latest_merge_across_pages() {
        let search = FakeSearch::new(vec![
            vec![hit("libgit2", "libgit2", 100), hit("subsurface", "subsurface", 200)],
            vec![hit("subsurface", "libdc", 300), hit("libgit2", "libgit2", 50)],
        ]);

        let found = find_merged_pr_repos(&search, "torvalds", &Ignore::default())
            .await
            .unwrap();

        assert_eq!(
            found,
            repos(&[
                ("subsurface", "libdc"),
                ("subsurface", "subsurface"),
                ("libgit2", "libgit2"),
            ])
        );
        assert_eq!(
            *search.requests.borrow(),
            vec![
                ("is:pr author:torvalds is:merged".to_string(), 1),
                ("is:pr author:torvalds is:merged".to_string(), 2),
            ]
        );
    }

    #[tokio::test]
    async fn later_merge_wins_in_any_order() {
        for pages in [
            vec![vec![hit("a", "x", 10)], vec![hit("a", "x", 500)], vec![hit("b", "y", 100)]],
            vec![vec![hit("a", "x", 500)], vec![hit("a", "x", 10)], vec![hit("b", "y", 100)]],
        ] {
            let search = FakeSearch::new(pages);
            let found = find_merged_pr_repos(&search, "u", &Ignore::default())
                .await
                .unwrap();
            assert_eq!(found, repos(&[("a", "x"), ("b", "y")]));
        }
    }

    #[tokio::test]
    async fn ignored_repos_never_appear() {
        let search = FakeSearch::new(vec![vec![
            hit("subsurface", "libdc", 300),
            hit("subsurface", "subsurface", 200),
            hit("libgit2", "libgit2", 100),
            hit("alice", "dotfiles", 400),
            hit("bob", "site", 250),
        ]]);
        let ignore = Ignore::from_spec("subsurface/*:*/dotfiles:bob/site");

        let found = find_merged_pr_repos(&search, "u", &ignore).await.unwrap();

        assert_eq!(found, repos(&[("libgit2", "libgit2")]));
        assert!(found.iter().all(|r| !ignore.matches(r)));
    }

    #[tokio::test]
    async fn skips_unusable_hits() {
        let search = FakeSearch::new(vec![vec![
            SearchHit {
                repository_url: String::new(),
                merged_at: Some(1),
            },
            SearchHit {
                repository_url: "https://api.github.com/repos/owner".to_string(),
                merged_at: Some(1),
            },
            SearchHit {
                repository_url: "https://api.github.com/repos/a/b".to_string(),
                merged_at: None,
            },
            hit("c", "d", 5),
        ]]);

        let found = find_merged_pr_repos(&search, "u", &Ignore::default())
            .await
            .unwrap();

        assert_eq!(found, repos(&[("c", "d")]));
    }

    #[tokio::test]
    async fn enterprise_repository_urls_keep_their_identity() {
        let ghe = |repo: &str, merged_at: i64| SearchHit {
            repository_url: format!("https://ghe.example.com/api/v3/repos/{}", repo),
            merged_at: Some(merged_at),
        };
        let search = FakeSearch::new(vec![vec![ghe("team/service", 20), ghe("team/web", 10)]]);

        let found = find_merged_pr_repos(&search, "u", &Ignore::default())
            .await
            .unwrap();

        assert_eq!(found, repos(&[("team", "service"), ("team", "web")]));
    }

    #[tokio::test]
    async fn search_error_aborts() {
        let search = FakeSearch::new(vec![vec![hit("a", "b", 1)], vec![hit("c", "d", 2)]])
            .failing_on(2);

        let result = find_merged_pr_repos(&search, "u", &Ignore::default()).await;

        assert!(result.is_err());
        assert_eq!(search.requests.borrow().len(), 2);
    }

    #[tokio::test]
    async fn empty_results() {
        let search = FakeSearch::new(vec![vec![]]);
        let found = find_merged_pr_repos(&search, "u", &Ignore::default())
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn ties_break_on_owner_then_name() {
        let mut found = HashMap::new();
        record_merge(&mut found, Repo::new("b", "a"), 7);
        record_merge(&mut found, Repo::new("a", "z"), 7);
        record_merge(&mut found, Repo::new("a", "b"), 7);
        record_merge(&mut found, Repo::new("c", "c"), 9);

        let expected = repos(&[("c", "c"), ("a", "b"), ("a", "z"), ("b", "a")]);
        for _ in 0..5 {
            assert_eq!(sort_by_recency(found.clone()), expected);
        }
    }

    #[test]
    fn record_merge_keeps_maximum() {
        let mut found = HashMap::new();
        let repo = Repo::new("o", "n");
        record_merge(&mut found, repo.clone(), 20);
        record_merge(&mut found, repo.clone(), 10);
        assert_eq!(found[&repo], 20);
        record_merge(&mut found, repo.clone(), 30);
        assert_eq!(found[&repo], 30);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn parses_repository_urls() {
        assert_eq!(
            repo_from_api_url("https://api.github.com/repos/rust-lang/rust"),
            Some(Repo::new("rust-lang", "rust"))
        );
        assert_eq!(
            repo_from_api_url("https://ghe.example.com/owner/name"),
            Some(Repo::new("owner", "name"))
        );
        assert_eq!(
            repo_from_api_url("https://api.github.com/repos/owner/"),
            Some(Repo::new("owner", ""))
        );
        assert_eq!(
            repo_from_api_url("https://ghe.example.com/api/v3/repos/team/service"),
            Some(Repo::new("team", "service"))
        );
        assert_eq!(repo_from_api_url("https://ghe.example.com/api/v3/repos/team"), None);
        assert_eq!(repo_from_api_url("https://api.github.com/repos/owner"), None);
        assert_eq!(repo_from_api_url("https://api.github.com/"), None);
        assert_eq!(repo_from_api_url("not a url"), None);
    }
}
