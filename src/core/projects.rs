//! Project gallery pipeline
//!
//! Turns the code-hosting account's repository listing into gallery entries:
//! page collection, exclusion filter, category lookup, search and ordering,
//! plus the one-hour cache used by the listing endpoint.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Repository names never shown in the gallery (compared normalized)
pub const DEFAULT_EXCLUDED: &[&str] = &["ticktacktoe", "ticktacktow", "tictactoe"];

/// Repository record as returned by the hosting API. Unknown fields are ignored.
#[derive(Clone, Debug, Deserialize)]
pub struct RepoRecord {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub fork: bool,
    pub updated_at: String,
}

/// Gallery entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub homepage: Option<String>,
    /// RFC 3339 UTC timestamp
    pub updated_at: String,
}

impl From<RepoRecord> for Project {
    fn from(repo: RepoRecord) -> Self {
        Self {
            name: repo.name,
            description: repo.description,
            html_url: repo.html_url,
            homepage: repo.homepage.filter(|h| !h.is_empty()),
            updated_at: repo.updated_at,
        }
    }
}

/// Lowercase, trim and drop whitespace, `_` and `-`
fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

pub struct RepoFilter {
    account: String,
    excluded: HashSet<String>,
}

impl RepoFilter {
    pub fn new(account: &str) -> Self {
        Self::with_excluded(account, DEFAULT_EXCLUDED.iter().copied())
    }

    pub fn with_excluded<'a>(account: &str, excluded: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            account: account.to_lowercase(),
            excluded: excluded.into_iter().map(normalize_name).collect(),
        }
    }

    pub fn accepts(&self, repo: &RepoRecord) -> bool {
        let name = repo.name.to_lowercase();
        !(repo.private
            || repo.fork
            || name.contains("readme")
            || name == self.account
            || name == format!("{}.github.io", self.account)
            || self.excluded.contains(&normalize_name(&repo.name)))
    }

    /// Keep publishable repositories, in input order
    pub fn apply(&self, repos: impl IntoIterator<Item = RepoRecord>) -> Vec<Project> {
        let mut rejected = 0usize;
        let projects: Vec<Project> = repos
            .into_iter()
            .filter(|repo| {
                let keep = self.accepts(repo);
                if !keep {
                    rejected += 1;
                }
                keep
            })
            .map(Project::from)
            .collect();
        debug!(kept = projects.len(), rejected, "Repositories filtered");
        projects
    }
}

/// Fetch every page of a listing.
///
/// Pages are requested from 1 upward until one comes back empty or shorter
/// than `per_page`. The first error aborts collection.
pub fn collect_pages<E>(
    per_page: usize,
    mut fetch: impl FnMut(u32) -> Result<Vec<RepoRecord>, E>,
) -> Result<Vec<RepoRecord>, E> {
    let mut all = Vec::new();
    let mut page = 1;
    loop {
        let repos = fetch(page)?;
        let len = repos.len();
        all.extend(repos);
        if len == 0 || len < per_page {
            break;
        }
        page += 1;
    }
    debug!(pages = page, repos = all.len(), "Listing collected");
    Ok(all)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Project,
    Fun,
    Pitch,
}

/// Explicit category assignments; everything else is `Fun`
const CATEGORY_BY_REPO: &[(&str, Category)] = &[
    ("AI-Search-Agent", Category::Project),
    ("PackMan", Category::Project),
    ("Packman", Category::Project),
    ("packman", Category::Project),
    ("PacMan", Category::Project),
    ("Pacman", Category::Project),
    ("pack-man", Category::Project),
    ("pac-man", Category::Project),
];

/// Exact name first, then trimmed case-insensitive match, else `Fun`
pub fn category_for(name: &str) -> Category {
    if let Some(&(_, category)) = CATEGORY_BY_REPO.iter().find(|(n, _)| *n == name) {
        return category;
    }
    let wanted = name.trim().to_lowercase();
    CATEGORY_BY_REPO
        .iter()
        .find(|(n, _)| n.trim().to_lowercase() == wanted)
        .map_or(Category::Fun, |&(_, category)| category)
}

/// Gallery search box + category pill
#[derive(Clone, Debug, Default)]
pub struct ProjectQuery {
    pub search: String,
    /// `None` shows every category
    pub category: Option<Category>,
}

impl ProjectQuery {
    fn matches(&self, needle: &str, project: &Project) -> bool {
        let text_match = needle.is_empty()
            || project.name.to_lowercase().contains(needle)
            || project
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle));
        let category_match = self
            .category
            .map_or(true, |category| category_for(&project.name) == category);
        text_match && category_match
    }

    /// Matching projects, most recently updated first
    pub fn select<'a>(&self, projects: &'a [Project]) -> Vec<&'a Project> {
        let needle = self.search.trim().to_lowercase();
        let mut selected: Vec<&Project> = projects.iter().filter(|p| self.matches(&needle, p)).collect();
        // RFC 3339 UTC timestamps order lexicographically
        selected.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        selected
    }
}

/// Listing cache with a fixed time-to-live
pub struct ProjectCache {
    ttl_secs: f64,
    entry: Option<(f64, Vec<Project>)>,
}

impl Default for ProjectCache {
    fn default() -> Self {
        Self::new(3600.0)
    }
}

impl ProjectCache {
    pub fn new(ttl_secs: f64) -> Self {
        Self { ttl_secs, entry: None }
    }

    pub fn is_fresh(&self, now_secs: f64) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|(fetched_at, _)| now_secs - fetched_at < self.ttl_secs)
    }

    /// Cached projects while fresh; otherwise run `refresh` and store its result.
    /// A failed refresh leaves the cache as it was.
    pub fn get_or_refresh<E: std::fmt::Display>(
        &mut self,
        now_secs: f64,
        refresh: impl FnOnce() -> Result<Vec<Project>, E>,
    ) -> Result<&[Project], E> {
        if !self.is_fresh(now_secs) {
            match refresh() {
                Ok(projects) => {
                    info!(count = projects.len(), "Project listing refreshed");
                    self.entry = Some((now_secs, projects));
                }
                Err(e) => {
                    warn!(error = %e, "Project listing refresh failed");
                    return Err(e);
                }
            }
        }
        Ok(self.entry.as_ref().map_or(&[][..], |(_, projects)| projects.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str, updated_at: &str) -> RepoRecord {
        RepoRecord {
            name: name.to_string(),
            description: None,
            html_url: format!("https://github.com/someone/{name}"),
            homepage: None,
            private: false,
            fork: false,
            updated_at: updated_at.to_string(),
        }
    }

    fn project(name: &str, description: Option<&str>, updated_at: &str) -> Project {
        Project {
            description: description.map(str::to_string),
            ..Project::from(repo(name, updated_at))
        }
    }

    #[test]
    fn parses_api_listing_ignoring_unknown_fields() {
        let json = r#"[{
            "id": 1,
            "name": "ray-tracer",
            "description": null,
            "html_url": "https://github.com/someone/ray-tracer",
            "homepage": "",
            "language": "Rust",
            "stargazers_count": 3,
            "private": false,
            "fork": false,
            "updated_at": "2024-05-01T10:00:00Z",
            "pushed_at": "2024-05-01T10:00:00Z"
        }]"#;
        let repos: Vec<RepoRecord> = serde_json::from_str(json).unwrap();
        let projects = RepoFilter::new("someone").apply(repos);
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].homepage, None);
        assert_eq!(projects[0].description, None);
    }

    #[test]
    fn filter_rejects_unpublishable_repos() {
        let filter = RepoFilter::new("SomeOne");
        let mut private = repo("secret", "2024-01-01T00:00:00Z");
        private.private = true;
        let mut fork = repo("forked", "2024-01-01T00:00:00Z");
        fork.fork = true;

        let rejected = [
            private,
            fork,
            repo("README", "2024-01-01T00:00:00Z"),
            repo("my-readme-notes", "2024-01-01T00:00:00Z"),
            repo("someone", "2024-01-01T00:00:00Z"),
            repo("SomeOne.github.io", "2024-01-01T00:00:00Z"),
            repo("Tic-Tac_Toe", "2024-01-01T00:00:00Z"),
            repo(" tick tack toe ", "2024-01-01T00:00:00Z"),
        ];
        for r in &rejected {
            assert!(!filter.accepts(r), "{} should be rejected", r.name);
        }
        assert!(filter.accepts(&repo("someone-tools", "2024-01-01T00:00:00Z")));
        assert!(filter.accepts(&repo("tictactoe-ai", "2024-01-01T00:00:00Z")));
    }

    #[test]
    fn collects_until_short_page() {
        let mut calls = Vec::new();
        let repos = collect_pages::<String>(2, |page| {
            calls.push(page);
            Ok(match page {
                1 | 2 => vec![repo("a", "x"), repo("b", "x")],
                _ => vec![repo("c", "x")],
            })
        })
        .unwrap();
        assert_eq!(calls, vec![1, 2, 3]);
        assert_eq!(repos.len(), 5);
    }

    #[test]
    fn collects_until_empty_page() {
        let repos = collect_pages::<String>(1, |page| {
            Ok(if page <= 2 { vec![repo("a", "x")] } else { Vec::new() })
        })
        .unwrap();
        assert_eq!(repos.len(), 2);
    }

    #[test]
    fn paging_error_propagates() {
        let result = collect_pages(1, |page| {
            if page == 2 {
                Err("rate limited".to_string())
            } else {
                Ok(vec![repo("a", "x")])
            }
        });
        assert_eq!(result.unwrap_err(), "rate limited");
    }

    #[test]
    fn category_lookup() {
        assert_eq!(category_for("AI-Search-Agent"), Category::Project);
        assert_eq!(category_for("PACMAN"), Category::Project);
        assert_eq!(category_for(" ai-search-agent "), Category::Project);
        assert_eq!(category_for("weekend-hack"), Category::Fun);
    }

    #[test]
    fn query_filters_and_sorts_newest_first() {
        let projects = vec![
            project("old-game", Some("A small Game"), "2022-03-01T00:00:00Z"),
            project("Pacman", None, "2024-02-01T00:00:00Z"),
            project("notes", None, "2023-06-01T00:00:00Z"),
            project("game-engine", None, "2023-01-01T00:00:00Z"),
        ];

        let all = ProjectQuery::default().select(&projects);
        let names: Vec<&str> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Pacman", "notes", "game-engine", "old-game"]);

        let query = ProjectQuery { search: "  GAME ".to_string(), category: None };
        let names: Vec<&str> = query.select(&projects).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["game-engine", "old-game"]);

        let query = ProjectQuery { search: String::new(), category: Some(Category::Project) };
        let names: Vec<&str> = query.select(&projects).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Pacman"]);

        let query = ProjectQuery { search: "game".to_string(), category: Some(Category::Pitch) };
        assert!(query.select(&projects).is_empty());
    }

    #[test]
    fn cache_serves_fresh_entries_and_keeps_them_on_error() {
        let mut cache = ProjectCache::default();
        let listing = vec![project("a", None, "2024-01-01T00:00:00Z")];

        let got = cache.get_or_refresh::<String>(0.0, || Ok(listing.clone())).unwrap();
        assert_eq!(got.len(), 1);
        assert!(cache.is_fresh(3599.0));

        let got = cache
            .get_or_refresh::<String>(1800.0, || panic!("fresh cache must not refresh"))
            .unwrap();
        assert_eq!(got.len(), 1);

        assert!(!cache.is_fresh(3600.0));
        let err = cache.get_or_refresh(3600.0, || Err("offline".to_string()));
        assert!(err.is_err());
        assert!(!cache.is_fresh(3600.0));

        let got = cache.get_or_refresh::<String>(3601.0, || Ok(Vec::new())).unwrap();
        assert!(got.is_empty());
        assert!(cache.is_fresh(3602.0));
    }
}
