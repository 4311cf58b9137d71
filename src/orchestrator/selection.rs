//! Target selection between discovery and fetching.
//!
//! Candidates arrive as sorted chain ids followed by sorted pool names. A
//! selector picks the targets to report on and the USD threshold applied to
//! chain balances.

use std::collections::HashSet;

use crate::config::{SelectionConfig, SelectionMode};

/// Outcome of target selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub targets: Vec<String>,
    pub min_usd: f64,
}

/// Chooses which discovered chains and pools to fetch.
pub trait TargetSelector: Send + Sync {
    fn select(&self, candidates: &[String]) -> Selection;
}

/// Takes every candidate.
#[derive(Debug, Clone)]
pub struct AutoSelector {
    pub min_usd: f64,
}

impl Default for AutoSelector {
    fn default() -> Self {
        Self { min_usd: 7.0 }
    }
}

impl TargetSelector for AutoSelector {
    fn select(&self, candidates: &[String]) -> Selection {
        Selection {
            targets: candidates.to_vec(),
            min_usd: self.min_usd,
        }
    }
}

/// Takes an explicit list, in the order given. Names that were not
/// discovered are dropped with a warning.
#[derive(Debug, Clone)]
pub struct ConfiguredSelector {
    pub targets: Vec<String>,
    pub min_usd: f64,
}

impl TargetSelector for ConfiguredSelector {
    fn select(&self, candidates: &[String]) -> Selection {
        let known: HashSet<&str> = candidates.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();
        let mut targets = Vec::with_capacity(self.targets.len());

        for target in &self.targets {
            if !known.contains(target.as_str()) {
                tracing::warn!(target = %target, "Configured target was not discovered, skipping");
                continue;
            }
            if seen.insert(target.as_str()) {
                targets.push(target.clone());
            }
        }

        Selection {
            targets,
            min_usd: self.min_usd,
        }
    }
}

/// Selector matching the configured mode.
pub fn selector_from_config(config: &SelectionConfig) -> Box<dyn TargetSelector> {
    match config.mode {
        SelectionMode::Auto => Box::new(AutoSelector {
            min_usd: config.min_usd,
        }),
        SelectionMode::Configured => Box::new(ConfiguredSelector {
            targets: config.targets.clone(),
            min_usd: config.min_usd,
        }),
    }
}
