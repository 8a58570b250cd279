use reqwest::Url;

use crate::ignore::Repo;

/// Web root that the rendered links point at.
pub const GITHUB_WEB_URL: &str = "https://github.com";

/// Link to the list of pull requests `user` opened in `repo`, e.g.
/// `https://github.com/rpgp/rpgp/pulls?q=is%3Apr+author%3Aasciimoth`.
pub fn search_link(user: &str, repo: &Repo) -> String {
    let mut url = Url::parse(GITHUB_WEB_URL).expect("GITHUB_WEB_URL is a valid base URL");
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(&repo.owner).push(&repo.name).push("pulls");
    }
    url.query_pairs_mut()
        .append_pair("q", &format!("is:pr author:{}", user));
    url.to_string()
}
