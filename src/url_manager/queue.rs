//! Crawl queue with normalization, dedupe and a visited budget
//!
//! Entries move Discovered → Queued → Visited and never go back. The visited
//! set belongs to one `UrlManager`, which belongs to one crawl run.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Represents an item in the crawl queue with URL and depth tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlQueueEntry {
    /// Normalized URL
    pub url: String,
    /// Link distance from the seed page
    pub depth: u32,
}

/// Limits applied by a [`UrlManager`]
#[derive(Debug, Clone, Default)]
pub struct UrlManagerOptions {
    /// Hosts that may be queued; empty means "the seed URL's host"
    pub allowed_domains: Vec<String>,
    /// Maximum number of URLs visited during the run
    pub max_depth: usize,
}

/// Normalize a URL for deduplication.
///
/// Relative input is resolved against `base`. Fragment and query string are
/// removed, as are trailing slashes. Anything that does not resolve to an
/// http(s) URL yields an empty string.
#[must_use]
pub fn normalize_url(url: &str, base: Option<&Url>) -> String {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let parsed = match base {
        Some(base) => Url::options().base_url(Some(base)).parse(trimmed),
        None => Url::parse(trimmed),
    };

    let mut parsed = match parsed {
        Ok(parsed) => parsed,
        Err(_) => return String::new(),
    };

    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return String::new();
    }

    parsed.set_fragment(None);
    parsed.set_query(None);

    parsed.as_str().trim_end_matches('/').to_string()
}

/// Manages the crawl queue and visited set for one fetch run
#[derive(Debug)]
pub struct UrlManager {
    base_url: Option<Url>,
    allowed_domains: HashSet<String>,
    max_depth: usize,
    queue: VecDeque<CrawlQueueEntry>,
    queued: HashSet<String>,
    visited: HashSet<String>,
}

impl UrlManager {
    /// Create a manager seeded with `seed_url`.
    ///
    /// The seed is the base for relative links and, when no allowed domains
    /// are configured, the only allowed host. It is queued immediately.
    #[must_use]
    pub fn new(seed_url: &str, options: UrlManagerOptions) -> Self {
        let base_url = Url::parse(seed_url).ok();

        let mut allowed_domains: HashSet<String> = options
            .allowed_domains
            .iter()
            .map(|d| d.trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        if allowed_domains.is_empty()
            && let Some(host) = base_url.as_ref().and_then(Url::host_str)
        {
            allowed_domains.insert(host.to_lowercase());
        }

        let mut manager = Self {
            base_url,
            allowed_domains,
            max_depth: options.max_depth,
            queue: VecDeque::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
        };
        manager.add_to_queue(seed_url);
        manager
    }

    /// Normalize `url` against this run's seed URL
    #[must_use]
    pub fn normalize_url(&self, url: &str) -> String {
        normalize_url(url, self.base_url.as_ref())
    }

    /// Queue `url` as a depth-0 entry. See [`UrlManager::add_discovered`].
    pub fn add_to_queue(&mut self, url: &str) -> bool {
        self.add_discovered(url, 0)
    }

    /// Queue a URL found at `depth`.
    ///
    /// Silently ignored when the URL normalizes to nothing, was already
    /// visited or queued, is outside the allowed domains, or when the visited
    /// budget is used up. Returns whether the URL was queued.
    pub fn add_discovered(&mut self, url: &str, depth: u32) -> bool {
        let normalized = self.normalize_url(url);
        if normalized.is_empty() {
            return false;
        }

        if self.visited.contains(&normalized) || self.queued.contains(&normalized) {
            return false;
        }

        if !self.is_allowed_domain(&normalized) {
            debug!(target: "docs_fetcher::urls", "Skipping off-domain URL {normalized}");
            return false;
        }

        if self.visited.len() >= self.max_depth {
            return false;
        }

        self.queued.insert(normalized.clone());
        self.queue.push_back(CrawlQueueEntry {
            url: normalized,
            depth,
        });
        true
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Pop the oldest queued entry and mark it visited
    pub fn get_next(&mut self) -> Option<CrawlQueueEntry> {
        let entry = self.queue.pop_front()?;
        self.queued.remove(&entry.url);
        self.visited.insert(entry.url.clone());
        Some(entry)
    }

    #[must_use]
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(&self.normalize_url(url))
    }

    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    #[must_use]
    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn allowed_domains(&self) -> &HashSet<String> {
        &self.allowed_domains
    }

    fn is_allowed_domain(&self, normalized: &str) -> bool {
        let Some(host) = Url::parse(normalized)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
        else {
            return false;
        };

        self.allowed_domains
            .iter()
            .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
    }
}
