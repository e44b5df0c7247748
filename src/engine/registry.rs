//! Builds the configured filter chain from `[[filters]]` records.

use super::blocklist::{BlocklistFilter, BlocklistParams};
use super::traits::Filter;
use crate::config::FilterConfig;
use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use tracing::info;

pub type FilterConstructor = fn(&toml::Table) -> Result<Box<dyn Filter>>;

/// Type-name to constructor lookup. Unknown names are a startup error.
pub struct FilterRegistry {
    constructors: Vec<(&'static str, FilterConstructor)>,
}

impl FilterRegistry {
    /// Registry with every built-in filter.
    pub fn standard() -> Self {
        let mut registry = Self {
            constructors: Vec::new(),
        };
        registry.register("blocklist", build_blocklist);
        registry
    }

    pub fn register(&mut self, name: &'static str, constructor: FilterConstructor) {
        self.constructors.retain(|(n, _)| *n != name);
        self.constructors.push((name, constructor));
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.constructors.iter().map(|(n, _)| *n).collect()
    }

    pub fn build(&self, config: &FilterConfig) -> Result<Box<dyn Filter>> {
        let constructor = self
            .constructors
            .iter()
            .find(|(name, _)| *name == config.filter)
            .map(|(_, c)| c)
            .ok_or_else(|| {
                anyhow!(
                    "Unknown filter type '{}' (known: {})",
                    config.filter,
                    self.names().join(", ")
                )
            })?;
        constructor(&config.params)
            .with_context(|| format!("Failed to build '{}' filter", config.filter))
    }

    /// Builds all filters in configured order.
    pub fn build_all(&self, configs: &[FilterConfig]) -> Result<Vec<Box<dyn Filter>>> {
        let filters = configs
            .iter()
            .map(|c| self.build(c))
            .collect::<Result<Vec<_>>>()?;
        info!(
            "Loaded {} filter(s): [{}]",
            filters.len(),
            filters
                .iter()
                .map(|f| f.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(filters)
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn parse_params<T: DeserializeOwned>(params: &toml::Table) -> Result<T> {
    toml::Value::Table(params.clone())
        .try_into()
        .context("Invalid filter parameters")
}

fn build_blocklist(params: &toml::Table) -> Result<Box<dyn Filter>> {
    let params: BlocklistParams = parse_params(params)?;
    Ok(Box::new(BlocklistFilter::from_params(&params)?))
}
