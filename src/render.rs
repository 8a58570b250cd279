use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

use crate::ignore::Repo;
use crate::link::search_link;

/// Output format of the rendered repository list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Markdown bullet list
    #[default]
    #[value(name = "md")]
    Markdown,
    /// `<ul>` list of links
    #[value(name = "html")]
    Html,
    /// Links separated by `<br>`
    #[value(name = "html-br")]
    HtmlBr,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Markdown => "md",
            Format::Html => "html",
            Format::HtmlBr => "html-br",
        }
    }

    pub fn render(&self, user: &str, repos: &[Repo]) -> String {
        match self {
            Format::Markdown => repos_to_md(user, repos),
            Format::Html => repos_to_html(user, repos),
            Format::HtmlBr => repos_to_br_html(user, repos),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "md" => Ok(Format::Markdown),
            "html" => Ok(Format::Html),
            "html-br" => Ok(Format::HtmlBr),
            other => Err(format!(
                "unknown format '{}', expected one of: md, html, html-br",
                other
            )),
        }
    }
}

/// Renders `- [owner/name](link)` lines joined by newlines.
pub fn repos_to_md(user: &str, repos: &[Repo]) -> String {
    repos
        .iter()
        .map(|repo| {
            format!(
                "- [{}]({})",
                escape_md_link_text(&repo.to_string()),
                search_link(user, repo)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders an HTML `<ul>` with one `<li>` link per repository.
pub fn repos_to_html(user: &str, repos: &[Repo]) -> String {
    let mut html = String::from("<ul>\n");
    for repo in repos {
        html.push_str("<li> ");
        html.push_str(&html_anchor(user, repo));
        html.push_str(" </li>\n");
    }
    html.push_str("</ul>");
    html
}

/// Renders one HTML link per line, each followed by `<br>`.
pub fn repos_to_br_html(user: &str, repos: &[Repo]) -> String {
    let mut html = String::new();
    for repo in repos {
        html.push_str(&html_anchor(user, repo));
        html.push_str(" <br>\n");
    }
    html
}

fn html_anchor(user: &str, repo: &Repo) -> String {
    format!(
        "<a href=\"{}\">{}</a>",
        html_escape::encode_double_quoted_attribute(&search_link(user, repo)),
        html_escape::encode_text(&repo.to_string())
    )
}

fn escape_md_link_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
