use super::extract::canonical_references;
use super::traits::Filter;
use super::verdict::{FilterResult, Verdict};
use crate::message::Update;
use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Parameters of a `filter = "blocklist"` record.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct BlocklistParams {
    pub filename: String,
    #[serde(default)]
    pub allowlist: Vec<String>,
    #[serde(default)]
    pub match_subdomains: bool,
}

/// Flags messages referencing any listed host or handle.
#[derive(Debug)]
pub struct BlocklistFilter {
    entries: FxHashSet<Box<str>>,
    allowlist: FxHashSet<Box<str>>,
    match_subdomains: bool,
}

impl BlocklistFilter {
    pub fn new(entries: impl IntoIterator<Item = String>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .filter_map(|s| Self::parse_line(&s))
                .collect(),
            allowlist: FxHashSet::default(),
            match_subdomains: false,
        }
    }

    pub fn with_allowlist(mut self, allowlist: impl IntoIterator<Item = String>) -> Self {
        self.allowlist = allowlist
            .into_iter()
            .filter_map(|s| Self::parse_line(&s))
            .collect();
        self
    }

    pub fn with_subdomain_matching(mut self, enable: bool) -> Self {
        self.match_subdomains = enable;
        self
    }

    pub fn from_params(params: &BlocklistParams) -> Result<Self> {
        let filter = Self::load(&params.filename)?
            .with_allowlist(params.allowlist.iter().cloned())
            .with_subdomain_matching(params.match_subdomains);
        info!(
            "Blocklist '{}': {} entries, {} allowlisted, subdomains {}",
            params.filename,
            filter.entries.len(),
            filter.allowlist.len(),
            if filter.match_subdomains { "on" } else { "off" }
        );
        Ok(filter)
    }

    /// Reads a line-delimited blocklist file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read blocklist {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    pub fn parse(text: &str) -> Self {
        Self {
            entries: text.lines().filter_map(Self::parse_line).collect(),
            allowlist: FxHashSet::default(),
            match_subdomains: false,
        }
    }

    fn parse_line(line: &str) -> Option<Box<str>> {
        let line = line.trim();
        // Skip comments and empty lines
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        Some(line.to_lowercase().into_boxed_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a canonical reference is blocked.
    pub fn check(&self, reference: &str) -> bool {
        if self.allowlist.contains(reference) {
            return false;
        }
        if self.entries.contains(reference) {
            return true;
        }
        if !self.match_subdomains || reference.starts_with('@') {
            return false;
        }

        // Iterative suffix match
        let mut part = reference;
        while let Some(idx) = part.find('.') {
            part = &part[idx + 1..];
            if part.is_empty() {
                break;
            }
            if self.entries.contains(part) {
                return true;
            }
        }
        false
    }
}

impl Filter for BlocklistFilter {
    fn name(&self) -> &str {
        "blocklist"
    }

    fn assess(&self, update: &Update) -> FilterResult {
        let mut hits: Vec<String> = canonical_references(update)
            .into_iter()
            .filter(|r| self.check(r))
            .collect();
        if hits.is_empty() {
            return FilterResult::new(Verdict::Safe);
        }
        hits.sort();
        FilterResult::with_explanation(
            Verdict::Scam,
            vec![format!("Message mentions blocked content: {}", hits.join(" "))],
        )
    }
}
