use std::collections::HashSet;
use std::fmt;

/// A GitHub repository identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Repo {
    pub owner: String,
    pub name: String,
}

impl Repo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Repo {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Repositories, owners and names excluded from the search results.
///
/// Built from a colon-separated list of `owner/name` tokens:
///
/// - `owner/*` skips every repository of `owner`
/// - `*/name` skips every repository called `name`
/// - `owner/name` skips exactly that repository
///
/// Tokens without a `/` or with an empty side are dropped.
#[derive(Debug, Clone, Default)]
pub struct Ignore {
    owners: HashSet<String>,
    names: HashSet<String>,
    repos: HashSet<Repo>,
}

impl Ignore {
    pub fn from_spec(spec: &str) -> Self {
        let mut ignore = Ignore::default();

        for token in spec.split(':') {
            let Some((owner, name)) = token.split_once('/') else {
                continue;
            };
            if owner.is_empty() || name.is_empty() {
                continue;
            }

            match (owner, name) {
                ("*", name) => {
                    ignore.names.insert(name.to_string());
                }
                (owner, "*") => {
                    ignore.owners.insert(owner.to_string());
                }
                (owner, name) => {
                    ignore.repos.insert(Repo::new(owner, name));
                }
            }
        }

        ignore
    }

    /// Reports whether `repo` should be left out.
    pub fn matches(&self, repo: &Repo) -> bool {
        self.repos.contains(repo)
            || self.owners.contains(&repo.owner)
            || self.names.contains(&repo.name)
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty() && self.names.is_empty() && self.repos.is_empty()
    }
}
