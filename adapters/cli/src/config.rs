//! Optional TOML settings file for the command-line adapter.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use atron_mining_system_dispatch::DispatchConfig;
use atron_mining_system_expedition::ExpeditionConfig;
use atron_mining_world::GenerationConfig;
use serde::Deserialize;

/// Settings read from `--config`. Every field is optional; command-line
/// flags take precedence over anything set here.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) map: MapSection,
    pub(crate) expedition: ExpeditionSection,
    pub(crate) dispatch: DispatchSection,
}

/// Procedural generation overrides.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MapSection {
    pub(crate) width: Option<u32>,
    pub(crate) height: Option<u32>,
    pub(crate) mineral_density: Option<f64>,
    pub(crate) acid_density: Option<f64>,
}

/// Budget overrides.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ExpeditionSection {
    pub(crate) ticks: Option<u32>,
    pub(crate) quota: Option<u32>,
}

/// Roster overrides.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DispatchSection {
    pub(crate) scouts: Option<u32>,
    pub(crate) miners: Option<u32>,
    pub(crate) scout_sorties: Option<u32>,
}

impl FileConfig {
    /// Reads and parses a settings file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid config toml")
    }

    /// Applies the map section on top of `base`.
    pub(crate) fn generation(&self, base: GenerationConfig) -> GenerationConfig {
        GenerationConfig {
            width: self.map.width.unwrap_or(base.width),
            height: self.map.height.unwrap_or(base.height),
            mineral_density: self.map.mineral_density.unwrap_or(base.mineral_density),
            acid_density: self.map.acid_density.unwrap_or(base.acid_density),
        }
    }

    /// Applies the expedition and dispatch sections on top of the defaults.
    pub(crate) fn expedition(&self) -> ExpeditionConfig {
        let defaults = ExpeditionConfig::default();
        ExpeditionConfig {
            tick_budget: self.expedition.ticks.unwrap_or(defaults.tick_budget),
            refined_quota: self.expedition.quota.unwrap_or(defaults.refined_quota),
            dispatch: DispatchConfig {
                scouts: self.dispatch.scouts.unwrap_or(defaults.dispatch.scouts),
                miners: self.dispatch.miners.unwrap_or(defaults.dispatch.miners),
                scout_sorties: self
                    .dispatch
                    .scout_sorties
                    .unwrap_or(defaults.dispatch.scout_sorties),
            },
        }
    }
}
