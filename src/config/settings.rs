//! Configuration settings for the search compiler

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub search: SearchConfig,
    pub solver: SolverConfig,
    pub output: OutputConfig,
}

/// The geometry and symmetry of the search.
///
/// The search grid spans width x height cells over generations
/// 0..=generations, with the spatial border held dead. A single temporal
/// symmetry (x, y, t) -> (x + translate_x, y + translate_y, t + period)
/// constrains the interior: period 1 with no translation finds still lifes,
/// period p finds oscillators, and a nonzero translation finds spaceships.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub width: i32,
    pub height: i32,
    pub generations: i32,
    pub period: i32,
    pub translate_x: i32,
    pub translate_y: i32,
    /// RLE file fixing generation 0 completely; absent means fully unknown.
    pub seed_file: Option<PathBuf>,
    /// Rule out the all-dead solution with an at-least-one-alive clause.
    pub require_live_cell: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    pub name: String,
    pub path: Option<PathBuf>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Write the DIMACS instance here for inspection.
    pub cnf_file: Option<PathBuf>,
    /// Write the composed variable grid here as CSV.
    pub csv_file: Option<PathBuf>,
    pub overwrite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search: SearchConfig {
                width: 6,
                height: 6,
                generations: 2,
                period: 2,
                translate_x: 0,
                translate_y: 0,
                seed_file: None,
                require_live_cell: true,
            },
            solver: SolverConfig {
                name: "kissat".to_string(),
                path: None,
                timeout_seconds: Some(300),
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                cnf_file: None,
                csv_file: None,
                overwrite: false,
            },
        }
    }
}

impl Settings {
    /// Load settings from a YAML file.
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file.
    pub fn to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_yaml::to_string(self).context("failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create directory: {}", parent.display()))?;
            }
        }

        std::fs::write(path, content)
            .with_context(|| format!("failed to write config file: {}", path.display()))
    }

    /// Validate the settings.
    pub fn validate(&self) -> Result<()> {
        if self.search.width < 3 || self.search.height < 3 {
            anyhow::bail!("search grid must be at least 3x3");
        }
        if self.search.generations < 1 {
            anyhow::bail!("number of generations must be positive");
        }
        if self.search.period < 1 {
            anyhow::bail!("period must be positive");
        }
        if self.search.period > self.search.generations {
            anyhow::bail!(
                "period {} exceeds the {} searched generations",
                self.search.period,
                self.search.generations
            );
        }
        if self.solver.name.is_empty() {
            anyhow::bail!("solver name must not be empty");
        }
        if let Some(seed) = &self.search.seed_file {
            if !seed.exists() {
                anyhow::bail!("seed file does not exist: {}", seed.display());
            }
        }
        Ok(())
    }

    /// Merge settings with command line overrides.
    pub fn merge_with_cli(&mut self, overrides: &CliOverrides) {
        if let Some(width) = overrides.width {
            self.search.width = width;
        }
        if let Some(height) = overrides.height {
            self.search.height = height;
        }
        if let Some(generations) = overrides.generations {
            self.search.generations = generations;
        }
        if let Some(period) = overrides.period {
            self.search.period = period;
        }
        if let Some(ref seed) = overrides.seed_file {
            self.search.seed_file = Some(seed.clone());
        }
        if let Some(ref solver) = overrides.solver {
            self.solver.name = solver.clone();
        }
        if let Some(ref cnf) = overrides.cnf_file {
            self.output.cnf_file = Some(cnf.clone());
        }
    }
}

/// Command line overrides for settings.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub generations: Option<i32>,
    pub period: Option<i32>,
    pub seed_file: Option<PathBuf>,
    pub solver: Option<String>,
    pub cnf_file: Option<PathBuf>,
}
